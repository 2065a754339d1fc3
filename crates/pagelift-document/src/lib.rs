// SPDX-License-Identifier: PMPL-1.0-or-later
//
// pagelift-document — the Pagelift scanning core: the owned frame value type,
// document quadrilateral detection, perspective rectification, scan
// enhancement, the captured-page collection, and multi-page PDF assembly.

pub mod image;
pub mod pdf;
pub mod scan;

// Re-export the primary types so callers can use `pagelift_document::Frame` etc.
pub use crate::image::frame::Frame;
pub use pdf::pages::{Page, PageCollection};
pub use pdf::writer::PdfWriter;
pub use scan::detect::DocumentDetector;
pub use scan::rectify::DocumentProcessor;
