//! `customrpc init` command — write the configuration template.

use std::fs;
use std::path::Path;

use crate::config::{EnvLookup, generate_default_config, load_config_with_env};
use crate::error::Error;

/// Execute the `init` command.
///
/// Writes the configuration template to `output`, creating missing parent
/// directories, and reports where the registry snapshot will be kept. An
/// existing file is only replaced when `force` is `true`.
///
/// # Errors
///
/// Returns an error if the file already exists (without `--force`), or the
/// directory or file cannot be written.
pub fn run(output: &Path, force: bool, env: EnvLookup<'_>) -> Result<String, Error> {
    if output.exists() && !force {
        return Err(Error::config(format!(
            "'{}' already exists, use --force to overwrite",
            output.display()
        )));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::config_with(format!("failed to create '{}'", parent.display()), e)
        })?;
    }
    fs::write(output, generate_default_config())
        .map_err(|e| Error::config_with(format!("failed to write '{}'", output.display()), e))?;

    let config = load_config_with_env(output, env)?;
    Ok(format!(
        "Config file written to {}\nCustom RPCs will be stored in {}",
        output.display(),
        config.store().display()
    ))
}
