//! High-level operations.
//!
//! This module contains the implementation of mkrules commands.

pub mod describe;
pub mod mod_replace;
pub mod mod_require;
pub mod mod_tidy;
pub mod mod_update;
pub mod toolchain;

pub use describe::{describe, VersionInfo};
pub use mod_replace::{mod_replace, ReplaceOptions};
pub use mod_require::{mod_require, RequireOptions};
pub use mod_tidy::{mod_format, mod_tidy};
pub use mod_update::mod_update;
pub use toolchain::{go_command, open_modfile};
