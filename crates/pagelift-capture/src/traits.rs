// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Source-agnostic trait for frame acquisition.
//
// The scan session only ever sees this trait, so a live camera, a folder of
// stills, and a test fixture all drive the identical pipeline.

use pagelift_core::error::Result;
use pagelift_document::Frame;

/// Anything that can hand the session frames, one at a time.
pub trait FrameSource {
    /// Grab the next frame.
    ///
    /// Returns `Ok(None)` when the source is exhausted (end of a still
    /// sequence) or has no frame ready yet; a broken device reports an
    /// error instead.
    fn grab(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying device or handle.
    ///
    /// Called once when the session shuts down. Sources without a device to
    /// release can rely on the default.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
