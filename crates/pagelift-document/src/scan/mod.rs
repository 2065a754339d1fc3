// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanning pipeline — document quadrilateral detection, perspective
// rectification, and scan enhancement.

pub mod detect;
pub mod enhance;
pub mod rectify;

pub use detect::DocumentDetector;
pub use rectify::DocumentProcessor;
