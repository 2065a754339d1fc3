// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scan session — the preview/capture/assemble state machine.
//
// One session owns one frame source and accumulates pages until they are
// assembled into a PDF. The loop is: `tick()` pulls a frame and refreshes
// detection for the preview overlay; `capture()` freezes the current frame
// into a page; `assemble_pdf()` writes the document and, only then, clears
// the page list.

use std::path::Path;

use pagelift_core::error::{PageliftError, Result};
use pagelift_core::{DetectionState, PageId, PageSource, ScanConfig};
use pagelift_document::{
    DocumentDetector, DocumentProcessor, Frame, Page, PageCollection, PdfWriter,
};
use tracing::{info, instrument, warn};

use crate::traits::FrameSource;

/// Result of a capture: which page was stored and whether rectification ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub page_id: PageId,
    /// False when no document was detected and the raw frame was kept.
    pub rectified: bool,
}

/// Interactive scanning session over an arbitrary frame source.
pub struct ScanSession<S: FrameSource> {
    source: S,
    detector: DocumentDetector,
    processor: DocumentProcessor,
    writer: PdfWriter,
    pages: PageCollection,
    last_frame: Option<Frame>,
    detection: DetectionState,
}

impl<S: FrameSource> ScanSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, ScanConfig::default())
    }

    pub fn with_config(source: S, config: ScanConfig) -> Self {
        Self {
            source,
            detector: DocumentDetector::new(config.detector),
            processor: DocumentProcessor::new(config.rectify, config.enhance),
            writer: PdfWriter::a4(),
            pages: PageCollection::new(),
            last_frame: None,
            detection: DetectionState::NotFound,
        }
    }

    /// Detection state for the most recent frame, for the preview overlay.
    pub fn detection(&self) -> &DetectionState {
        &self.detection
    }

    /// Pull the next frame and refresh detection.
    ///
    /// Returns the frame for display, or `Ok(None)` when the source has no
    /// frame to give (the previous frame and detection state are kept so the
    /// preview does not flicker).
    #[instrument(skip_all)]
    pub fn tick(&mut self) -> Result<Option<&Frame>> {
        let Some(frame) = self.source.grab()? else {
            return Ok(None);
        };
        self.detection = self.detector.detect(&frame);
        self.last_frame = Some(frame);
        Ok(self.last_frame.as_ref())
    }

    /// Capture the current frame as a page.
    ///
    /// With a detected document the page is rectified and enhanced; without
    /// one, or when rectification fails on bad geometry, the raw frame is
    /// stored so the capture is never lost.
    #[instrument(skip_all)]
    pub fn capture(&mut self) -> Result<CaptureOutcome> {
        let frame = self.last_frame.clone().ok_or_else(|| {
            PageliftError::Capture("capture requested before any frame was grabbed".into())
        })?;
        let detection = self.detection;
        self.store_page(&frame, &detection, PageSource::Camera)
    }

    /// Scan a single image file as a page, leaving the live feed untouched.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn capture_file(&mut self, path: impl AsRef<Path>) -> Result<CaptureOutcome> {
        let frame = Frame::open(path)?;
        let detection = self.detector.detect(&frame);
        self.store_page(&frame, &detection, PageSource::File)
    }

    fn store_page(
        &mut self,
        frame: &Frame,
        detection: &DetectionState,
        source: PageSource,
    ) -> Result<CaptureOutcome> {
        let (image, rectified) = match detection.corners() {
            Some(corners) => match self.processor.process(frame, corners) {
                Ok(rectified) => (rectified, true),
                Err(err) => {
                    warn!(%err, "Rectification failed, keeping raw frame");
                    (frame.to_rgb(), false)
                }
            },
            None => (frame.to_rgb(), false),
        };

        let page_id = self.pages.add(Page::new(image, source, rectified));
        info!(%page_id, rectified, total = self.pages.count(), "Page captured");
        Ok(CaptureOutcome { page_id, rectified })
    }

    pub fn page_count(&self) -> usize {
        self.pages.count()
    }

    /// Discard the most recently captured page.
    pub fn remove_last_page(&mut self) -> bool {
        self.pages.remove_last()
    }

    /// Discard every captured page.
    pub fn clear_pages(&mut self) {
        self.pages.clear();
    }

    /// Assemble all captured pages into a PDF at `path`.
    ///
    /// Pages are cleared only after the file is written; any failure leaves
    /// the collection intact so the user can fix the destination and retry.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn assemble_pdf(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let count = self.pages.count();
        self.writer.assemble_to_file(self.pages.pages(), path)?;
        self.pages.clear();
        info!(pages = count, "PDF saved, page list cleared");
        Ok(count)
    }

    /// Release the frame source.
    pub fn release(&mut self) -> Result<()> {
        self.source.release()
    }
}
