//! Go module dependency pinning.
//!
//! Manifest reads and edits go through the `go` toolchain ([`ModFile`]);
//! [`Pinner`] pins single modules and [`Reconciler`] drives a manifest to a
//! converged, minimal set of pins.

pub mod errors;
pub mod list;
pub mod modfile;
pub mod pin;
pub mod staging;
pub mod tidy;
pub mod toolchain;
pub mod types;
pub mod version;

pub use errors::{ModError, TidyPhase};
pub use modfile::{ModFile, GO_MOD};
pub use pin::Pinner;
pub use tidy::Reconciler;
pub use toolchain::{GoCommand, GoToolchain};
pub use types::{GoMod, ListModule, PinKind, PinRequest};
pub use version::is_valid_version;
