//! mkrules - pin and reconcile Go module dependencies
//!
//! This crate provides the library behind the `mkrules` CLI: pinning
//! requirements and replacements in a `go.mod`, reconciling the manifest to
//! a converged set of pins, and deriving build versions from git.

pub mod gomod;
pub mod ops;
pub mod util;

/// Test utilities and fakes for mkrules unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted Go toolchain and fixtures for
/// manifests and git repositories.
#[cfg(test)]
pub mod test_support;

pub use gomod::{GoMod, ModError, ModFile, Pinner, Reconciler};
pub use util::context::GlobalContext;
