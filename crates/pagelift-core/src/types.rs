// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Core domain types for the Pagelift scanner.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a captured page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a captured page originated from.
///
/// Live camera frames and file-loaded frames go through the same detection
/// and rectification path; the source only matters for bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSource {
    /// Captured from the live camera feed.
    Camera,
    /// Loaded from an image file on disk.
    File,
}

/// A single 2D point in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub x: f32,
    pub y: f32,
}

impl Corner {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Exactly four points in contour-walk order — a quadrilateral hypothesis
/// for a document boundary.
///
/// The points carry no semantic corner labels until [`CornerSet::ordered`]
/// assigns them. The fixed-size array makes a wrong point count
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet(pub [Corner; 4]);

impl CornerSet {
    pub const fn new(points: [Corner; 4]) -> Self {
        Self(points)
    }

    /// Whether any two points lie closer than `min_separation` pixels.
    ///
    /// A quadrilateral with coincident corners cannot anchor a perspective
    /// transform and is rejected before the solver sees it.
    pub fn is_degenerate(&self, min_separation: f32) -> bool {
        for i in 0..4 {
            for j in (i + 1)..4 {
                let dx = self.0[i].x - self.0[j].x;
                let dy = self.0[i].y - self.0[j].y;
                if (dx * dx + dy * dy).sqrt() < min_separation {
                    return true;
                }
            }
        }
        false
    }

    /// Assign corner roles with the sum/difference rule:
    ///
    /// - top-left minimises `x + y`
    /// - bottom-right maximises `x + y`
    /// - bottom-left maximises `y - x`
    /// - top-right minimises `y - x`
    ///
    /// The rule is insensitive to the contour's walk direction and starting
    /// point, so the result is identical under any cyclic permutation or
    /// reflection of the input points.
    pub fn ordered(&self) -> OrderedQuad {
        let mut top_left = self.0[0];
        let mut bottom_right = self.0[0];
        let mut bottom_left = self.0[0];
        let mut top_right = self.0[0];

        for p in self.0 {
            if p.x + p.y < top_left.x + top_left.y {
                top_left = p;
            }
            if p.x + p.y > bottom_right.x + bottom_right.y {
                bottom_right = p;
            }
            if p.y - p.x > bottom_left.y - bottom_left.x {
                bottom_left = p;
            }
            if p.y - p.x < top_right.y - top_right.x {
                top_right = p;
            }
        }

        OrderedQuad {
            top_left,
            bottom_left,
            bottom_right,
            top_right,
        }
    }
}

/// The four corners of a document with their roles resolved.
///
/// Built from a [`CornerSet`] immediately before the perspective transform;
/// nothing else consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedQuad {
    pub top_left: Corner,
    pub bottom_left: Corner,
    pub bottom_right: Corner,
    pub top_right: Corner,
}

/// Per-frame detector output.
///
/// Returned by value from every detection pass and overwritten by the next
/// one; there is no accumulation or history. `NotFound` is the common case
/// on a live feed and is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DetectionState {
    /// A document-shaped quadrilateral was found.
    Found(CornerSet),
    /// No qualifying contour in this frame.
    NotFound,
}

impl DetectionState {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn corners(&self) -> Option<&CornerSet> {
        match self {
            Self::Found(corners) => Some(corners),
            Self::NotFound => None,
        }
    }
}

impl Default for DetectionState {
    fn default() -> Self {
        Self::NotFound
    }
}

/// Standard paper sizes for PDF output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    Letter,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Letter => (216, 279),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}
