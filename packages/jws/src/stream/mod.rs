//! Streaming sign and verify
//!
//! Each stream owns two inputs that are written and closed independently, in any
//! order. When the second one closes the stream finalizes exactly once, emitting
//! `Done`/`Data`/`End` on success or `Error`/`Close` on failure, and resolving every
//! future obtained from `completion()`. A stream whose inputs never both close
//! stays `Waiting`; callers wanting a deadline wrap `completion()` in a timeout.

mod barrier;
mod cell;
mod sign;
mod verify;

pub use barrier::{Listener, StreamEvent, StreamState};
pub use cell::{CellValue, InputCell};
pub use sign::{SignStream, SignStreamBuilder};
pub use verify::{Verified, VerifyStream, VerifyStreamBuilder};
