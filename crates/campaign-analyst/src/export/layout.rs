//! Page geometry and pagination of the captured content image.
//!
//! All values are millimetres on an A4 portrait page, measured from the top
//! left corner.

/// A4 width.
pub const PAGE_WIDTH: f64 = 210.0;

/// A4 height.
pub const PAGE_HEIGHT: f64 = 297.0;

/// Margin on every side.
pub const MARGIN: f64 = 15.0;

/// Width available for content.
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

/// Height available for content on a continuation page.
pub const USABLE_HEIGHT: f64 = PAGE_HEIGHT - 2.0 * MARGIN;

/// Height of the brand mark.
pub const BRAND_MARK_HEIGHT: f64 = 20.0;

/// Baseline of the report title.
pub const TITLE_Y: f64 = MARGIN + BRAND_MARK_HEIGHT + 10.0;

/// Baseline of the subtitle.
pub const SUBTITLE_Y: f64 = TITLE_Y + 6.0;

/// Top of the content image on the first page.
pub const CONTENT_TOP: f64 = SUBTITLE_Y + 15.0;

/// Baseline of the fallback title when the brand mark is missing.
pub const FALLBACK_TITLE_Y: f64 = MARGIN + 10.0;

/// Tolerance below which leftover content does not earn another page.
const EPSILON: f64 = 1e-6;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// The margin box of a page.
    pub const MARGIN_BOX: Self = Self { x: MARGIN, y: MARGIN, width: CONTENT_WIDTH, height: USABLE_HEIGHT };
}

/// One placement of the full content image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Zero-based page index. Page 0 carries the header.
    pub page: usize,
    /// Where the full image is drawn. `y` is negative-offset on
    /// continuation pages so the right band lands in the margin box.
    pub frame: Rect,
    /// Region the drawing is clipped to.
    pub clip: Option<Rect>,
}

/// Result of paginating one content image.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Total pages, including a header-only first page.
    pub page_count: usize,
    /// Image placements in page order.
    pub placements: Vec<Placement>,
}

/// Height in millimetres of an image scaled to [`CONTENT_WIDTH`].
#[must_use]
pub fn scaled_height(pixel_width: u32, pixel_height: u32) -> f64 {
    if pixel_width == 0 {
        return 0.0;
    }
    f64::from(pixel_height) * CONTENT_WIDTH / f64::from(pixel_width)
}

/// Lay out content of `content_height` mm below the first-page header.
///
/// Content that fits under the header is placed there unclipped. Otherwise
/// the first page keeps only the header, and the full image is re-placed on
/// each following page, shifted up by the height already shown and clipped
/// to the margin box.
#[must_use]
pub fn paginate(content_height: f64) -> PageLayout {
    let first_page_room = PAGE_HEIGHT - CONTENT_TOP - MARGIN;

    if content_height <= first_page_room {
        return PageLayout {
            page_count: 1,
            placements: vec![Placement {
                page: 0,
                frame: Rect { x: MARGIN, y: CONTENT_TOP, width: CONTENT_WIDTH, height: content_height },
                clip: None,
            }],
        };
    }

    let mut placements = Vec::new();
    let mut consumed = 0.0;
    let mut page = 1;
    while content_height - consumed > EPSILON {
        placements.push(Placement {
            page,
            frame: Rect { x: MARGIN, y: MARGIN - consumed, width: CONTENT_WIDTH, height: content_height },
            clip: Some(Rect::MARGIN_BOX),
        });
        consumed += USABLE_HEIGHT;
        page += 1;
    }

    PageLayout { page_count: page, placements }
}
