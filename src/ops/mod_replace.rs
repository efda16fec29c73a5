//! Implementation of `mkrules mod replace`.

use anyhow::Result;

use crate::gomod::{GoToolchain, ModError, ModFile, Pinner};

/// Options for the replace command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOptions {
    pub old_path: String,
    pub new_path: String,
    pub version: String,
}

impl ReplaceOptions {
    /// Build from positional `<path> <version>` or `<old> <new> <version>`.
    pub fn from_args(args: &[String]) -> Result<Self, ModError> {
        let (old, new, version) = match args {
            [path, version] => (path, path, version),
            [old, new, version] => (old, new, version),
            _ => {
                return Err(ModError::Usage(
                    "`mod replace` takes a module path, an optional new path and a version"
                        .to_string(),
                ))
            }
        };
        Ok(ReplaceOptions {
            old_path: old.clone(),
            new_path: new.clone(),
            version: version.clone(),
        })
    }
}

/// Redirect a module path.
pub fn mod_replace<T: GoToolchain>(modfile: ModFile<T>, opts: &ReplaceOptions) -> Result<()> {
    let mut pinner = Pinner::new(modfile);
    pinner.replace(&opts.old_path, &opts.new_path, &opts.version)?;
    Ok(())
}
