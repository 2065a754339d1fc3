// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Concrete frame sources: an in-memory still sequence (tests, replay) and a
// single-file source for the scan-from-image path.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use pagelift_core::error::{PageliftError, Result};
use pagelift_document::Frame;
use tracing::{debug, info};

use crate::traits::FrameSource;

/// Frame source backed by a pre-built sequence of frames.
///
/// Frames are handed out in insertion order, then the source reports
/// exhaustion. Doubles as the session test fixture and as a replay source
/// for recorded sequences.
pub struct StillSource {
    frames: VecDeque<Frame>,
    released: bool,
}

impl StillSource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            released: false,
        }
    }

    /// Whether [`FrameSource::release`] has been called.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for StillSource {
    fn grab(&mut self) -> Result<Option<Frame>> {
        if self.released {
            return Err(PageliftError::CameraUnavailable(
                "source already released".into(),
            ));
        }
        Ok(self.frames.pop_front())
    }

    fn release(&mut self) -> Result<()> {
        debug!(remaining = self.frames.len(), "Still source released");
        self.released = true;
        Ok(())
    }
}

/// Frame source that re-reads a single image file on every grab.
///
/// Used for the scan-from-file path: the session sees a steady "feed" of the
/// same image, so detection and capture work exactly as they do live.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for FileSource {
    fn grab(&mut self) -> Result<Option<Frame>> {
        let frame = Frame::open(&self.path)?;
        info!(path = %self.path.display(), "Loaded frame from file");
        Ok(Some(frame))
    }
}
