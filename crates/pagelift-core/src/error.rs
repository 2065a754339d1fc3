// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Unified error types for Pagelift.

use thiserror::Error;

/// Top-level error type for all Pagelift operations.
///
/// Per-frame processing failures are expected and frequent; callers convert
/// them into a raw-capture fallback rather than aborting the session. Only
/// source construction (no camera at startup) is treated as hard.
#[derive(Debug, Error)]
pub enum PageliftError {
    // -- Acquisition errors --
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("frame capture failed: {0}")]
    Capture(String),

    // -- Processing errors --
    #[error("image processing failed: {0}")]
    Image(String),

    #[error("degenerate document quadrilateral: {0}")]
    DegenerateQuad(String),

    #[error("perspective transform failed: {0}")]
    Transform(String),

    // -- Output errors --
    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("no pages to assemble")]
    EmptyPageList,

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PageliftError>;
