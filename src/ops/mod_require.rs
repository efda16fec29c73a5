//! Implementation of `mkrules mod require`.

use anyhow::Result;

use crate::gomod::{GoToolchain, ModError, ModFile, Pinner};

/// Options for the require command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireOptions {
    pub path: String,
    pub version: String,
    /// Do not copy the module's own requirements
    pub skip_deps: bool,
}

impl RequireOptions {
    /// Build from positional `<path> <version>`.
    pub fn from_args(args: &[String], skip_deps: bool) -> Result<Self, ModError> {
        match args {
            [path, version] => Ok(RequireOptions {
                path: path.clone(),
                version: version.clone(),
                skip_deps,
            }),
            _ => Err(ModError::Usage(
                "`mod require` takes a module path and a version".to_string(),
            )),
        }
    }
}

/// Pin a module and its own requirements.
pub fn mod_require<T: GoToolchain>(modfile: ModFile<T>, opts: &RequireOptions) -> Result<()> {
    let mut pinner = Pinner::new(modfile);
    pinner.require(&opts.path, &opts.version, opts.skip_deps)?;
    Ok(())
}
