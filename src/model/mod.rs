//! Record types shared by the store, editor, sync, and transfer layers.
//!
//! - [`Process`] - a documented business process
//! - [`Step`] - one step of a process, ordered by `index`
//! - [`Artifact`] - an example file attached to a step
//!
//! Field names serialize in camelCase so stored records and export
//! documents read the same way.

mod artifact;
mod ids;
mod process;
mod step;

pub use artifact::{Artifact, ArtifactKind, FileMeta, DEFAULT_MIME_TYPE};
pub use ids::{ArtifactId, ProcessId, StepId, StepKey};
pub use process::Process;
pub use step::{reindex, Frequency, NextRef, NextType, Step};
