use std::path::Path;

use anyhow::{Context, Result};

use super::{CONFIG_DIR, CONFIG_FILE};

/// Hand-crafted config template with commented-out keys, so users can see
/// the available knobs.
const CONFIG_TEMPLATE: &str = r#"# ─────────────────────────────────────────────────────────
# Comparison: all fields optional. Omitted = exact match.
# ─────────────────────────────────────────────────────────
[diff]
backend = "{backend}"               # "pixel-scan" | "mask-projection"
# tolerance = 0.001                 # max diff area / image area
# area_size_limit = 100             # max diff area in pixels
# color_distance_limit = 10.0       # max RGBA distance for equal pixels (0-510)
# shift_distance_limit = 2          # anti-aliasing search radius (pixel-scan only)
# median_filter_window_size = 3     # noise smoothing (mask-projection only)
# skip_area = [[0, 0, 1365, 40]]    # [left, top, right, bottom] always ignored
"#;

pub fn config_file_exists() -> bool {
    Path::new(CONFIG_DIR).join(CONFIG_FILE).exists()
}

pub fn write_gitignore(force: bool) -> Result<()> {
    let path = Path::new(CONFIG_DIR).join(".gitignore");
    if !force && path.exists() {
        return Ok(());
    }
    std::fs::write(&path, "output/\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn render_template(backend: &str) -> String {
    CONFIG_TEMPLATE.replace("{backend}", backend)
}

/// Write the hand-crafted config template (with commented-out keys).
pub fn write_template(backend: &str) -> Result<()> {
    let dir = Path::new(CONFIG_DIR);
    std::fs::create_dir_all(dir).context("Failed to create .snapdiff directory")?;
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, render_template(backend))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::Config;
    use super::*;

    #[test]
    fn template_parses_as_config() {
        let config: Config = toml::from_str(&render_template("mask-projection")).unwrap();
        assert_eq!(config.diff.backend, Some(snapdiff::Backend::MaskProjection));
        assert_eq!(config.diff.tolerance, None);
        assert!(config.diff.skip_area.is_empty());
    }
}
