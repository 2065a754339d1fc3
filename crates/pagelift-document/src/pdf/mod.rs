// SPDX-License-Identifier: PMPL-1.0-or-later
//
// PDF module — the captured-page collection and multi-page PDF assembly.

pub mod pages;
pub mod writer;

pub use pages::{Page, PageCollection};
pub use writer::PdfWriter;
