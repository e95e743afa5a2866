//! Brand mark loading.

use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};

use crate::config::BrandMarkSource;
use crate::error::{ExportError, ExportResult};

/// Fetches images embedded in exported documents.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Load the image at `source`, flattened onto white.
    async fn load(&self, source: &BrandMarkSource) -> ExportResult<RgbImage>;
}

/// Loads images over HTTP or from the local filesystem.
#[derive(Debug, Clone)]
pub struct DefaultAssetLoader {
    http: reqwest::Client,
}

impl DefaultAssetLoader {
    /// Create a loader whose HTTP fetches give up after `timeout`.
    pub fn new(timeout: Duration) -> ExportResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExportError::brand_mark(e.to_string()))?;
        Ok(Self { http })
    }

    async fn fetch(&self, url: &str) -> ExportResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ExportError::brand_mark(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::brand_mark(format!("{url} returned HTTP {}", status.as_u16())));
        }

        let bytes = response.bytes().await.map_err(|e| ExportError::brand_mark(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AssetLoader for DefaultAssetLoader {
    async fn load(&self, source: &BrandMarkSource) -> ExportResult<RgbImage> {
        tracing::debug!(?source, "Loading brand mark");

        let bytes = match source {
            BrandMarkSource::Url(url) => self.fetch(url).await?,
            BrandMarkSource::Path(path) => tokio::fs::read(path)
                .await
                .map_err(|e| ExportError::brand_mark(format!("{}: {e}", path.display())))?,
        };

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| ExportError::brand_mark(format!("undecodable image: {e}")))?;
        Ok(flatten_on_white(&decoded))
    }
}

/// Composite an image with alpha onto a white background.
#[must_use]
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_transparent_pixels_become_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([0, 64, 64, 255]));
        let flat = flatten_on_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([0, 64, 64]));
    }

    #[tokio::test]
    async fn test_missing_file_is_brand_mark_error() {
        let loader = DefaultAssetLoader::new(Duration::from_secs(1)).unwrap();
        let err = loader
            .load(&BrandMarkSource::Path("/nonexistent/logo.png".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::BrandMarkUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_non_image_file_is_brand_mark_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        tokio::fs::write(&path, b"not an image").await.unwrap();

        let loader = DefaultAssetLoader::new(Duration::from_secs(1)).unwrap();
        let err = loader.load(&BrandMarkSource::Path(path)).await.unwrap_err();
        assert!(err.to_string().contains("undecodable image"));
    }
}
