//! Minimal PDF 1.4 writer.
//!
//! Callers draw in millimetres from the top-left corner of an A4 page; the
//! writer converts to PDF points with the origin at the bottom left.

use std::io::Write as _;

use chrono::Utc;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbImage;

use super::layout::{PAGE_HEIGHT, PAGE_WIDTH, Rect};
use crate::config::branding;

/// Points per millimetre.
const MM_TO_PT: f64 = 2.834_65;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// An RGB colour with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    r: f64,
    g: f64,
    b: f64,
}

impl Color {
    /// Mid grey used for secondary text.
    pub const GREY: Self = Self::gray(100);

    /// Black.
    pub const BLACK: Self = Self::gray(0);

    /// A grey level out of 255.
    #[must_use]
    pub const fn gray(level: u8) -> Self {
        let v = level as f64 / 255.0;
        Self { r: v, g: v, b: v }
    }

    /// Parse a `#rrggbb` colour, falling back to black.
    #[must_use]
    pub fn hex(value: &str) -> Self {
        let digits = value.trim_start_matches('#');
        let channel = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .map_or(0.0, |c| f64::from(c) / 255.0)
        };
        if digits.len() != 6 {
            return Self::BLACK;
        }
        Self { r: channel(0), g: channel(2), b: channel(4) }
    }
}

/// Handle of an image registered with [`PdfDocument::add_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageId(usize);

struct EncodedImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

enum Op {
    Image { id: ImageId, frame: Rect, clip: Option<Rect> },
    Text { text: String, baseline: f64, size: f64, color: Color },
}

/// A PDF under construction.
pub struct PdfDocument {
    title: String,
    pages: Vec<Vec<Op>>,
    images: Vec<EncodedImage>,
}

impl PdfDocument {
    /// Start an empty document with the given title in its info dictionary.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), pages: Vec::new(), images: Vec::new() }
    }

    /// Append a blank page and return its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Vec::new());
        self.pages.len() - 1
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Register an RGB image. Pixel data is Flate-compressed once and may be
    /// drawn any number of times.
    pub fn add_image(&mut self, image: &RgbImage) -> std::io::Result<ImageId> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(image.as_raw())?;
        let data = encoder.finish()?;

        self.images.push(EncodedImage { width: image.width(), height: image.height(), data });
        Ok(ImageId(self.images.len() - 1))
    }

    /// Draw `id` into `frame` on `page`, optionally clipped.
    pub fn draw_image(&mut self, page: usize, id: ImageId, frame: Rect, clip: Option<Rect>) {
        if let Some(ops) = self.pages.get_mut(page) {
            ops.push(Op::Image { id, frame, clip });
        }
    }

    /// Draw Helvetica text centred horizontally on the page at `baseline` mm.
    pub fn text_centered(&mut self, page: usize, text: &str, baseline: f64, size: f64, color: Color) {
        if let Some(ops) = self.pages.get_mut(page) {
            ops.push(Op::Text { text: text.to_string(), baseline, size, color });
        }
    }

    /// Serialize the document.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let width_pt = PAGE_WIDTH * MM_TO_PT;
        let height_pt = PAGE_HEIGHT * MM_TO_PT;
        let page_count = self.pages.len().max(1);

        let font_id = 3 + page_count * 2;
        let image_start = font_id + 1;
        let info_id = image_start + self.images.len();

        let mut pdf = Vec::new();
        pdf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut xref_positions: Vec<usize> = Vec::new();

        // Catalog
        xref_positions.push(pdf.len());
        pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        // Pages tree
        let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 3 + i * 2)).collect();
        xref_positions.push(pdf.len());
        pdf.extend_from_slice(
            format!("2 0 obj\n<< /Type /Pages /Kids [{}] /Count {page_count} >>\nendobj\n", kids.join(" "))
                .as_bytes(),
        );

        let xobjects: String = (0..self.images.len())
            .map(|i| format!("/Im{} {} 0 R ", i + 1, image_start + i))
            .collect();

        let empty = Vec::new();
        for index in 0..page_count {
            let page_id = 3 + index * 2;
            let ops = self.pages.get(index).unwrap_or(&empty);
            let content = self.content_stream(ops, width_pt, height_pt);

            xref_positions.push(pdf.len());
            pdf.extend_from_slice(
                format!(
                    "{page_id} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width_pt:.2} {height_pt:.2}] /Contents {} 0 R /Resources << /Font << /F1 {font_id} 0 R >> /XObject << {xobjects}>> >> >>\nendobj\n",
                    page_id + 1
                )
                .as_bytes(),
            );

            xref_positions.push(pdf.len());
            pdf.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Length {} >>\nstream\n{content}\nendstream\nendobj\n",
                    page_id + 1,
                    content.len()
                )
                .as_bytes(),
            );
        }

        // Font
        xref_positions.push(pdf.len());
        pdf.extend_from_slice(
            format!(
                "{font_id} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj\n"
            )
            .as_bytes(),
        );

        // Images
        for (i, image) in self.images.iter().enumerate() {
            xref_positions.push(pdf.len());
            pdf.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
                    image_start + i,
                    image.width,
                    image.height,
                    image.data.len()
                )
                .as_bytes(),
            );
            pdf.extend_from_slice(&image.data);
            pdf.extend_from_slice(b"\nendstream\nendobj\n");
        }

        // Info dictionary
        xref_positions.push(pdf.len());
        let timestamp = Utc::now().format("D:%Y%m%d%H%M%S").to_string();
        pdf.extend_from_slice(
            format!(
                "{info_id} 0 obj\n<< /Title ({}) /Producer (campaign-analyst) /Creator ({}) /CreationDate ({timestamp}) >>\nendobj\n",
                escape_pdf_string(&self.title),
                escape_pdf_string(branding::SHORT_NAME),
            )
            .as_bytes(),
        );

        // Cross-reference table
        let xref_start = pdf.len();
        pdf.extend_from_slice(b"xref\n");
        pdf.extend_from_slice(format!("0 {}\n", xref_positions.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for pos in &xref_positions {
            pdf.extend_from_slice(format!("{pos:010} 00000 n \n").as_bytes());
        }

        // Trailer
        pdf.extend_from_slice(b"trailer\n");
        pdf.extend_from_slice(
            format!("<< /Size {} /Root 1 0 R /Info {info_id} 0 R >>\n", xref_positions.len() + 1).as_bytes(),
        );
        pdf.extend_from_slice(b"startxref\n");
        pdf.extend_from_slice(format!("{xref_start}\n").as_bytes());
        pdf.extend_from_slice(b"%%EOF\n");

        pdf
    }

    fn content_stream(&self, ops: &[Op], width_pt: f64, height_pt: f64) -> String {
        let mut stream = String::new();
        for op in ops {
            match op {
                Op::Image { id, frame, clip } => {
                    stream.push_str("q\n");
                    if let Some(clip) = clip {
                        stream.push_str(&format!(
                            "{:.2} {:.2} {:.2} {:.2} re W n\n",
                            clip.x * MM_TO_PT,
                            height_pt - (clip.y + clip.height) * MM_TO_PT,
                            clip.width * MM_TO_PT,
                            clip.height * MM_TO_PT
                        ));
                    }
                    stream.push_str(&format!(
                        "{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        frame.width * MM_TO_PT,
                        frame.height * MM_TO_PT,
                        frame.x * MM_TO_PT,
                        height_pt - (frame.y + frame.height) * MM_TO_PT,
                        id.0 + 1
                    ));
                }
                Op::Text { text, baseline, size, color } => {
                    let x = (width_pt - text_width(text, *size)) / 2.0;
                    let y = height_pt - baseline * MM_TO_PT;
                    stream.push_str(&format!(
                        "BT\n{:.3} {:.3} {:.3} rg\n/F1 {size:.1} Tf\n{x:.2} {y:.2} Td\n({}) Tj\nET\n",
                        color.r,
                        color.g,
                        color.b,
                        escape_pdf_string(text)
                    ));
                }
            }
        }
        stream
    }
}

/// Width in points of `text` set in Helvetica at `size`.
#[must_use]
pub fn text_width(text: &str, size: f64) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                556
            }
        })
        .sum();
    f64::from(units) * size / 1000.0
}

/// Escape a string for a PDF literal in WinAnsi encoding.
fn escape_pdf_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{2022}' => result.push_str("\\225"),
            '\u{2013}' => result.push_str("\\226"),
            '\u{2014}' => result.push_str("\\227"),
            _ if c.is_ascii() => result.push(c),
            _ => result.push('?'),
        }
    }
    result
}
