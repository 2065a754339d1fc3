// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Captured page collection — the ordered list of processed pages awaiting
// PDF assembly.

use chrono::{DateTime, Utc};
use image::RgbImage;
use pagelift_core::{PageId, PageSource};
use tracing::{debug, info};

/// A fully processed page: the rectified and enhanced output, or the raw
/// capture when rectification was not possible.
///
/// Pages own an independent copy of their pixels; later frames never alias
/// into an accepted page.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: PageId,
    pub source: PageSource,
    pub captured_at: DateTime<Utc>,
    /// Whether the rectification pipeline ran (false means raw fallback).
    pub rectified: bool,
    pub image: RgbImage,
}

impl Page {
    pub fn new(image: RgbImage, source: PageSource, rectified: bool) -> Self {
        Self {
            id: PageId::new(),
            source,
            captured_at: Utc::now(),
            rectified,
            image,
        }
    }
}

/// Ordered collection of captured pages.
///
/// Pages accumulate in insertion order and leave the collection only via
/// [`remove_last`](Self::remove_last), [`clear`](Self::clear), or a
/// successful PDF assembly (the caller clears after the file is written).
#[derive(Debug, Default)]
pub struct PageCollection {
    pages: Vec<Page>,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page and return its id.
    pub fn add(&mut self, page: Page) -> PageId {
        let id = page.id;
        self.pages.push(page);
        info!(%id, total = self.pages.len(), "Page added");
        id
    }

    /// Drop the most recently added page. Returns false if there was none.
    pub fn remove_last(&mut self) -> bool {
        let removed = self.pages.pop().is_some();
        debug!(removed, total = self.pages.len(), "Remove-last requested");
        removed
    }

    /// Drop every page.
    pub fn clear(&mut self) {
        self.pages.clear();
        debug!("Page collection cleared");
    }

    pub fn count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All pages in insertion order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page() -> Page {
        Page::new(
            RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])),
            PageSource::Camera,
            true,
        )
    }

    #[test]
    fn add_and_count_in_order() {
        let mut pages = PageCollection::new();
        assert_eq!(pages.count(), 0);

        let first = pages.add(page());
        let second = pages.add(page());
        assert_eq!(pages.count(), 2);
        assert_eq!(pages.pages()[0].id, first);
        assert_eq!(pages.pages()[1].id, second);
    }

    #[test]
    fn remove_last_pops_in_reverse_order() {
        let mut pages = PageCollection::new();
        let first = pages.add(page());
        pages.add(page());

        assert!(pages.remove_last());
        assert_eq!(pages.count(), 1);
        assert_eq!(pages.pages()[0].id, first);

        assert!(pages.remove_last());
        assert!(!pages.remove_last());
    }

    #[test]
    fn clear_empties_the_collection() {
        let mut pages = PageCollection::new();
        pages.add(page());
        pages.add(page());
        pages.clear();
        assert!(pages.is_empty());
    }
}
