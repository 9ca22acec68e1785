//! Cached entities and their fact population
//!
//! An entity is created at most once per key through a cache on the
//! [`Context`](crate::context::Context) and populated at most once by the
//! context's population driver.

pub mod file;
pub mod folder;

pub use file::{File, FileOrigin};
pub use folder::Folder;

use crate::context::Context;
use crate::error::SrcFactsError;
use crate::types::Key;

/// Behaviour shared by everything the population driver handles
pub trait Entity: Send + Sync + std::fmt::Debug {
    /// Stable key referenced by emitted facts
    fn key(&self) -> &Key;

    /// Whether the run needs this entity's facts.
    ///
    /// Pure over entity state and run configuration.
    fn needs_population(&self, cx: &Context) -> bool;

    /// Compute and emit this entity's facts.
    ///
    /// Facts are staged and emitted together once everything that can fail has
    /// succeeded. A second call is a no-op.
    fn populate(&self, cx: &Context) -> Result<(), SrcFactsError>;
}
