// SPDX-License-Identifier: PMPL-1.0-or-later
//
// PDF writer — assemble captured pages into a multi-page PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;

use image::RgbImage;
use pagelift_core::PaperSize;
use pagelift_core::error::{PageliftError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

use crate::pdf::pages::Page;

/// Assembles captured pages into a print-ready PDF, one PDF page per
/// capture, in insertion order.
pub struct PdfWriter {
    /// Paper size for page creation.
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    /// Create a new writer targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
        }
    }

    /// Create a new writer defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Assemble the full page sequence into PDF bytes.
    ///
    /// An empty sequence is an error, not an empty document; the caller
    /// keeps its pages and can retry. Nothing here mutates the input, so a
    /// failed assembly leaves the collection exactly as it was.
    #[instrument(skip_all, fields(pages = pages.len(), paper = ?self.paper_size))]
    pub fn assemble(&self, pages: &[Page]) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(PageliftError::EmptyPageList);
        }

        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("Pagelift Scan");
        info!(title, "Assembling PDF");

        let mut doc = PdfDocument::new(title);
        let mut pdf_pages: Vec<PdfPage> = Vec::with_capacity(pages.len());
        for page in pages {
            let ops = place_image(&mut doc, &page.image, page_w, page_h);
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }
        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(bytes = bytes.len(), "PDF assembly complete");
        Ok(bytes)
    }

    /// Assemble and write directly to a file.
    pub fn assemble_to_file(&self, pages: &[Page], path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.assemble(pages)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}

/// Register a page image with the document and produce the placement ops.
///
/// The image is scaled to fit within the page margins while preserving its
/// aspect ratio (never upscaled) and centred on the page.
fn place_image(doc: &mut PdfDocument, image: &RgbImage, page_w: Mm, page_h: Mm) -> Vec<Op> {
    let raw = RawImage {
        pixels: RawImageData::U8(image.as_raw().clone()),
        width: image.width() as usize,
        height: image.height() as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };
    let xobject_id = doc.add_image(&raw);

    let margin_mm: f32 = 15.0;
    let usable_w_pt = Mm(page_w.0 - 2.0 * margin_mm).into_pt().0;
    let usable_h_pt = Mm(page_h.0 - 2.0 * margin_mm).into_pt().0;

    // Image native size at 150 DPI, a reasonable default for scans.
    let dpi: f32 = 150.0;
    let img_w_pt = image.width() as f32 / dpi * 72.0;
    let img_h_pt = image.height() as f32 / dpi * 72.0;

    let scale = (usable_w_pt / img_w_pt)
        .min(usable_h_pt / img_h_pt)
        .min(1.0);

    let margin_pt = Mm(margin_mm).into_pt().0;
    let x_offset = margin_pt + (usable_w_pt - img_w_pt * scale) / 2.0;
    let y_offset = margin_pt + (usable_h_pt - img_h_pt * scale) / 2.0;

    vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(x_offset)),
            translate_y: Some(Pt(y_offset)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(dpi),
            rotate: None,
        },
    }]
}
