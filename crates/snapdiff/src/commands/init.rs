use anyhow::{Result, bail};
use snapdiff::Backend;

use crate::config;

/// `snapdiff init`: create .snapdiff/config.toml.
pub fn init(backend: Backend, force: bool) -> Result<()> {
    if !force && config::config_file_exists() {
        bail!(".snapdiff/config.toml already exists (use --force to overwrite)");
    }

    config::write_template(backend.name())?;
    config::write_gitignore(force)?;

    let verb = if force { "Regenerated" } else { "Created" };
    println!("{verb} .snapdiff/config.toml");
    println!("  diff.backend = {backend}");
    Ok(())
}
