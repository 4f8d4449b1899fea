//! Editing sessions.
//!
//! An [`Editor`] holds the step list of one process in memory, records
//! undo history before each structural change, and commits to the local
//! store on save. It is the surface a user interface drives.

mod patch;
mod session;

pub use patch::{Route, StepPatch};
pub use session::{Direction, Editor};
