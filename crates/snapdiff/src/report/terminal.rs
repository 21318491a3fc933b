use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use snapdiff::Difference;

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Status label and detail text for one comparison.
pub fn summarize(equal: bool, difference: Option<&Difference<'_>>) -> (&'static str, String) {
    match (equal, difference) {
        (true, Some(d)) if d.region().is_some() => {
            ("PASS", format!("within tolerance: {}", d.describe()))
        }
        (true, _) => ("PASS", String::new()),
        (false, Some(d)) => ("FAIL", d.describe()),
        (false, None) => ("FAIL", "images differ".to_string()),
    }
}

/// Print a single comparison result line.
pub fn print_line(
    name: &str,
    equal: bool,
    difference: Option<&Difference<'_>>,
    elapsed: Duration,
) {
    let time_suffix = format!("  \x1b[2m{}\x1b[0m", format_duration(elapsed));
    let (label, detail) = summarize(equal, difference);
    let color = if equal { "32" } else { "31" };
    if detail.is_empty() {
        println!("  \x1b[{color}m{label}\x1b[0m  {name}{time_suffix}");
    } else {
        println!("  \x1b[{color}m{label}\x1b[0m  {name}  ({detail}){time_suffix}");
    }
}

#[derive(Serialize)]
struct JsonReport<'r, 'a> {
    name: &'r str,
    equal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    difference: Option<&'r Difference<'a>>,
}

pub fn print_json(name: &str, equal: bool, difference: Option<&Difference<'_>>) -> Result<()> {
    let report = JsonReport {
        name,
        equal,
        difference,
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use snapdiff::{Backend, Comparison, DiffOptions, DifferenceFinder};

    use super::*;

    fn pair(options: DiffOptions) -> Comparison {
        let base = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let mut new = base.clone();
        new.put_pixel(2, 3, Rgba([0, 0, 0, 255]));
        Comparison::new(base, new, options, Backend::PixelScan).unwrap()
    }

    #[test]
    fn format_duration_switches_units() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }

    #[test]
    fn summarize_failure_names_region() {
        let c = pair(DiffOptions::default());
        let d = DifferenceFinder::new(&c).find();
        let (label, detail) = summarize(false, Some(&d));
        assert_eq!(label, "FAIL");
        assert!(detail.starts_with("region [2, 3, 2, 3]"), "{detail}");
    }

    #[test]
    fn summarize_tolerated_difference() {
        let c = pair(DiffOptions {
            area_size_limit: Some(1),
            ..Default::default()
        });
        let (equal, d) = DifferenceFinder::new(&c).quick_equal();
        let (label, detail) = summarize(equal, d.as_ref());
        assert_eq!(label, "PASS");
        assert!(detail.starts_with("within tolerance"), "{detail}");
    }

    #[test]
    fn summarize_quick_failure_without_details() {
        let (label, detail) = summarize(false, None);
        assert_eq!((label, detail.as_str()), ("FAIL", "images differ"));
    }
}
