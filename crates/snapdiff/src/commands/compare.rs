use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use image::RgbaImage;
use snapdiff::{
    AreaCalculator, AreaSpec, Comparison, DifferenceFinder, ElementResolver, StaticResolver,
    image_io,
};
use tracing::{debug, info};

use crate::config::ResolvedDiffConfig;
use crate::report::{annotate, terminal};

/// Inputs of `snapdiff compare` that are not diff options.
pub struct CompareArgs {
    pub base: PathBuf,
    pub new: PathBuf,
    pub skip_area: Vec<AreaSpec>,
    pub crop: Option<AreaSpec>,
    pub elements: Option<PathBuf>,
    pub quick: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
}

/// `snapdiff compare`: evaluate one baseline/candidate pair.
/// Returns exit code: 0 = equal or tolerable, 1 = different.
pub fn compare(config: ResolvedDiffConfig, args: CompareArgs) -> Result<i32> {
    let resolver = match &args.elements {
        Some(path) => StaticResolver::from_json_file(path)?,
        None => StaticResolver::default(),
    };

    let mut skip_specs: Vec<AreaSpec> = config
        .skip_area
        .iter()
        .map(|coords| AreaSpec::Coordinates(*coords))
        .collect();
    skip_specs.extend(args.skip_area);
    let mut areas = AreaCalculator::new(args.crop, skip_specs);

    let base = image_io::load(&args.base)
        .with_context(|| format!("Failed to load baseline {}", args.base.display()))?;
    let new = image_io::load(&args.new)
        .with_context(|| format!("Failed to load candidate {}", args.new.display()))?;

    let comparison =
        prepare(&config, &mut areas, &resolver, base, new)?.with_paths(&args.base, &args.new);
    let finder = DifferenceFinder::new(&comparison);

    let started = Instant::now();
    let (equal, difference) = if args.quick {
        finder.quick_equal()
    } else {
        let difference = finder.find();
        (!difference.is_different(), Some(difference))
    };
    let elapsed = started.elapsed();
    info!(
        backend = %comparison.backend(),
        equal,
        elapsed_ms = elapsed.as_millis() as u64,
        "comparison finished"
    );

    let name = args.new.display().to_string();
    if args.json {
        terminal::print_json(&name, equal, difference.as_ref())?;
    } else {
        terminal::print_line(&name, equal, difference.as_ref(), elapsed);
    }

    if let (Some(dir), Some(difference)) = (&args.output, &difference)
        && !equal
    {
        for path in annotate::write_annotations(difference, dir)? {
            println!("  wrote {}", path.display());
        }
    }

    Ok(if equal { 0 } else { 1 })
}

/// Crop both screenshots to the crop window and build the comparison with
/// skip areas rebased into crop-local coordinates.
///
/// The crop keeps columns `left..right` and rows `top..bottom`; the crop's
/// right and bottom edge lines are not compared.
fn prepare(
    config: &ResolvedDiffConfig,
    areas: &mut AreaCalculator,
    resolver: &dyn ElementResolver,
    mut base: RgbaImage,
    mut new: RgbaImage,
) -> Result<Comparison> {
    let crop = areas.calculate_crop(resolver)?;
    let skip_area = areas.calculate_skip_area(resolver)?;
    debug!(crop = ?crop, skip_areas = skip_area.len(), "areas resolved");

    if let Some(crop) = crop {
        base = image_io::crop(&base, &crop);
        new = image_io::crop(&new, &crop);
    }

    let options = config.options_with_skip_area(skip_area);
    Ok(Comparison::new(base, new, options, config.backend)?)
}
