// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pagelift — frame acquisition and the interactive scan session.
//!
//! This crate defines the [`FrameSource`] abstraction over anything that can
//! produce frames (a live camera, a directory of stills, a test fixture) and
//! the [`ScanSession`] state machine that drives the preview/capture/assemble
//! loop on top of `pagelift-document`.

pub mod session;
pub mod sources;
pub mod traits;

pub use session::{CaptureOutcome, ScanSession};
pub use sources::{FileSource, StillSource};
pub use traits::FrameSource;
