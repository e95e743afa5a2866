//! PDF export of a rendered analysis.
//!
//! The sequence is fixed: force the light theme, capture the view, restore
//! the theme, load the brand mark, compose the document, save it. When the
//! brand mark cannot be loaded a plain fallback document is saved instead
//! and the failure is still reported to the caller.

mod assets;
mod capture;
pub mod layout;
pub mod pdf;
mod sink;

pub use assets::{AssetLoader, DefaultAssetLoader, flatten_on_white};
pub use capture::{Rasterizer, SvgRasterizer};
pub use sink::{DirectorySink, DocumentSink, MemorySink, SavedDocument};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;
use tokio::sync::Mutex;

use crate::config::{BrandMarkSource, Config, branding};
use crate::error::{ExportError, ExportResult};
use crate::render::View;
use crate::theme::ThemeState;

use layout::{
    BRAND_MARK_HEIGHT, FALLBACK_TITLE_Y, MARGIN, PAGE_WIDTH, Rect, SUBTITLE_Y, TITLE_Y, paginate, scaled_height,
};
use pdf::{Color, PdfDocument};

/// Title of the exported report.
pub const REPORT_TITLE: &str = "Marketing Campaign Analysis Report";

/// Title of the fallback document saved when the brand mark is missing.
pub const FALLBACK_TITLE: &str = "Marketing Campaign Analysis Report (Logo Failed to Load)";

/// File name of a complete export.
pub const EXPORT_FILE_NAME: &str = "HERE_AND_NOW_AI_Campaign_Analysis.pdf";

/// File name of the fallback export.
pub const FALLBACK_FILE_NAME: &str = "HERE_AND_NOW_AI_Campaign_Analysis_NoLogo.pdf";

/// Device pixels per CSS pixel when capturing.
pub const CAPTURE_SCALE: f32 = 2.0;

const ASSET_TIMEOUT: Duration = Duration::from_secs(15);

/// Produces branded, paginated PDF documents from rendered views.
pub struct Exporter {
    rasterizer: Arc<dyn Rasterizer>,
    assets: Arc<dyn AssetLoader>,
    brand_mark: BrandMarkSource,
    in_flight: Mutex<()>,
}

impl Exporter {
    /// Exporter using the SVG rasterizer and the default asset loader.
    pub fn from_config(config: &Config) -> ExportResult<Self> {
        Ok(Self::new(
            Arc::new(SvgRasterizer::new()),
            Arc::new(DefaultAssetLoader::new(ASSET_TIMEOUT)?),
            config.brand_mark.clone(),
        ))
    }

    /// Exporter from explicit parts.
    #[must_use]
    pub fn new(rasterizer: Arc<dyn Rasterizer>, assets: Arc<dyn AssetLoader>, brand_mark: BrandMarkSource) -> Self {
        Self { rasterizer, assets, brand_mark, in_flight: Mutex::new(()) }
    }

    /// Export `view` to `sink`.
    ///
    /// The theme held by `theme` is forced to light for the capture and
    /// restored before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// [`ExportError::NoContent`] for a view without cards,
    /// [`ExportError::Busy`] if another export is running. On
    /// [`ExportError::BrandMarkUnavailable`] the fallback document has
    /// already been saved.
    pub async fn export(&self, view: &View, theme: &ThemeState, sink: &dyn DocumentSink) -> ExportResult<SavedDocument> {
        if view.is_empty() {
            tracing::warn!("Export rejected: no analysis content");
            return Err(ExportError::NoContent);
        }

        let Ok(_in_flight) = self.in_flight.try_lock() else {
            tracing::warn!("Export rejected: another export is in progress");
            return Err(ExportError::Busy);
        };

        tracing::info!("Starting PDF export");

        let captured = {
            let _presentation = theme.force_light();
            let rasterizer = Arc::clone(&self.rasterizer);
            let view = view.clone();
            let presentation = theme.current();
            tokio::task::spawn_blocking(move || rasterizer.capture(&view, presentation, CAPTURE_SCALE)).await
        };
        let content = captured??;

        match self.assets.load(&self.brand_mark).await {
            Ok(mark) => {
                let bytes = tokio::task::spawn_blocking(move || compose_report(&content, &mark)).await??;
                let saved = sink.save(EXPORT_FILE_NAME, bytes).await?;
                tracing::info!(file = %saved.file_name, size = saved.size, "PDF export complete");
                Ok(saved)
            }
            Err(err) => {
                let reason = match err {
                    ExportError::BrandMarkUnavailable { reason, .. } => reason,
                    other => other.to_string(),
                };
                tracing::error!(%reason, "Failed to load logo for PDF, saving fallback document");

                let saved = sink.save(FALLBACK_FILE_NAME, compose_fallback()).await?;
                Err(ExportError::BrandMarkUnavailable {
                    reason,
                    fallback: Some(saved.path.unwrap_or_else(|| PathBuf::from(saved.file_name))),
                })
            }
        }
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter").field("brand_mark", &self.brand_mark).finish()
    }
}

/// Compose the branded report: header on page one, content paginated below.
pub fn compose_report(content: &RgbImage, mark: &RgbImage) -> ExportResult<Vec<u8>> {
    let mut doc = PdfDocument::new(REPORT_TITLE);
    let first = doc.add_page();

    let mark_width = if mark.height() == 0 {
        0.0
    } else {
        BRAND_MARK_HEIGHT * f64::from(mark.width()) / f64::from(mark.height())
    };
    let mark_id = doc.add_image(mark)?;
    doc.draw_image(
        first,
        mark_id,
        Rect { x: (PAGE_WIDTH - mark_width) / 2.0, y: MARGIN, width: mark_width, height: BRAND_MARK_HEIGHT },
        None,
    );
    doc.text_centered(first, REPORT_TITLE, TITLE_Y, 16.0, Color::hex(branding::SECONDARY_COLOR));
    doc.text_centered(first, branding::SHORT_NAME, SUBTITLE_Y, 10.0, Color::GREY);

    let content_id = doc.add_image(content)?;
    let plan = paginate(scaled_height(content.width(), content.height()));
    while doc.page_count() < plan.page_count {
        doc.add_page();
    }
    for placement in &plan.placements {
        doc.draw_image(placement.page, content_id, placement.frame, placement.clip);
    }

    tracing::debug!(pages = plan.page_count, "Composed report");
    Ok(doc.to_bytes())
}

/// Compose the one-page fallback document.
#[must_use]
pub fn compose_fallback() -> Vec<u8> {
    let mut doc = PdfDocument::new(FALLBACK_TITLE);
    let page = doc.add_page();
    doc.text_centered(page, FALLBACK_TITLE, FALLBACK_TITLE_Y, 16.0, Color::BLACK);
    doc.to_bytes()
}
