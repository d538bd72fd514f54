//! Upload widget state: the select → upload → result flow as an explicit
//! state machine, plus the transient notice queue front ends render from.
//!
//! Pure state, no I/O. A front end (the CLI, or any UI shell) feeds
//! `TransferEvent`s in and renders phase, progress, and notices out.

mod notice;
mod state;

pub use notice::{Notice, NoticeKind, NoticeQueue};
pub use state::{SelectedFile, UploadPhase, UploadWidget};
