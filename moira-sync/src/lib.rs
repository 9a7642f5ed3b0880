//! # moira-sync
//!
//! Filesystem side of the tool.
//!
//! - [`dump_to_dir`] fetches remote state and writes one YAML file per object.
//! - [`apply_file`] / [`apply_dir`] read local YAML documents and hand them to
//!   the reconciler.

pub mod apply;
pub mod dump;
pub mod error;
mod writer;

pub use apply::{apply_dir, apply_file, check_dir, check_file, FileOutcome, FileReport};
pub use dump::{dump_to_dir, Category, DumpSummary, SavedFile};
pub use error::SyncError;
