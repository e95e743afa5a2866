//! PDF export flow: theme handling, fallback and concurrency.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campaign_analyst::config::BrandMarkSource;
use campaign_analyst::error::{ExportError, ExportResult};
use campaign_analyst::export::{
    AssetLoader, DefaultAssetLoader, DirectorySink, DocumentSink, EXPORT_FILE_NAME, Exporter, FALLBACK_FILE_NAME,
    MemorySink, Rasterizer, SvgRasterizer,
};
use campaign_analyst::models::{CitationRecord, ContentCard};
use campaign_analyst::parser::parse_analysis;
use campaign_analyst::render::View;
use campaign_analyst::theme::{Theme, ThemeState};

/// Records what the view looked like when it was captured.
#[derive(Default)]
struct RecordingRasterizer {
    observed: Mutex<Vec<(Theme, Option<Theme>)>>,
    live: Option<ThemeState>,
}

impl RecordingRasterizer {
    fn watching(theme: &ThemeState) -> Self {
        Self { observed: Mutex::default(), live: Some(theme.clone()) }
    }

    fn observed(&self) -> Vec<(Theme, Option<Theme>)> {
        self.observed.lock().unwrap().clone()
    }
}

impl Rasterizer for RecordingRasterizer {
    fn capture(&self, _view: &View, theme: Theme, _scale: f32) -> ExportResult<RgbImage> {
        let live = self.live.as_ref().map(ThemeState::current);
        self.observed.lock().unwrap().push((theme, live));
        Ok(RgbImage::from_pixel(1600, 900, Rgb([255, 255, 255])))
    }
}

struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn capture(&self, _view: &View, _theme: Theme, _scale: f32) -> ExportResult<RgbImage> {
        Err(ExportError::capture("canvas unavailable"))
    }
}

struct StaticAssets;

#[async_trait]
impl AssetLoader for StaticAssets {
    async fn load(&self, _source: &BrandMarkSource) -> ExportResult<RgbImage> {
        Ok(RgbImage::from_pixel(300, 100, Rgb([0, 64, 64])))
    }
}

struct MissingAssets;

#[async_trait]
impl AssetLoader for MissingAssets {
    async fn load(&self, _source: &BrandMarkSource) -> ExportResult<RgbImage> {
        Err(ExportError::brand_mark("logo host unreachable"))
    }
}

struct SlowAssets;

#[async_trait]
impl AssetLoader for SlowAssets {
    async fn load(&self, _source: &BrandMarkSource) -> ExportResult<RgbImage> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(RgbImage::new(10, 10))
    }
}

fn sample_view() -> View {
    View::from_cards(&parse_analysis("## Executive Summary\n* ROAS is below target\n\n## Next Steps\n1. Cut CPC"))
}

fn brand_mark() -> BrandMarkSource {
    BrandMarkSource::Url("https://brand.example/logo.png".to_string())
}

fn page_count(pdf: &[u8]) -> usize {
    String::from_utf8_lossy(pdf).matches("/Type /Page ").count()
}

#[tokio::test]
async fn test_dark_theme_is_light_during_capture_and_restored() {
    let theme = ThemeState::new(Theme::Dark);
    let rasterizer = Arc::new(RecordingRasterizer::watching(&theme));
    let exporter = Exporter::new(rasterizer.clone(), Arc::new(StaticAssets), brand_mark());
    let sink = MemorySink::new();

    let saved = exporter.export(&sample_view(), &theme, &sink).await.unwrap();

    assert_eq!(saved.file_name, EXPORT_FILE_NAME);
    assert_eq!(rasterizer.observed(), vec![(Theme::Light, Some(Theme::Light))]);
    assert_eq!(theme.current(), Theme::Dark);

    let (name, bytes) = sink.take_last().unwrap();
    assert_eq!(name, EXPORT_FILE_NAME);
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(page_count(&bytes), 1);
}

#[tokio::test]
async fn test_light_theme_is_left_alone() {
    let theme = ThemeState::new(Theme::Light);
    let rasterizer = Arc::new(RecordingRasterizer::watching(&theme));
    let exporter = Exporter::new(rasterizer.clone(), Arc::new(StaticAssets), brand_mark());

    exporter.export(&sample_view(), &theme, &MemorySink::new()).await.unwrap();

    assert_eq!(rasterizer.observed(), vec![(Theme::Light, Some(Theme::Light))]);
    assert_eq!(theme.current(), Theme::Light);
}

#[tokio::test]
async fn test_missing_brand_mark_saves_fallback_and_reports() {
    let theme = ThemeState::new(Theme::Dark);
    let exporter = Exporter::new(Arc::new(RecordingRasterizer::default()), Arc::new(MissingAssets), brand_mark());
    let sink = MemorySink::new();

    let err = exporter.export(&sample_view(), &theme, &sink).await.unwrap_err();

    match err {
        ExportError::BrandMarkUnavailable { reason, fallback } => {
            assert_eq!(reason, "logo host unreachable");
            assert_eq!(fallback.unwrap().to_str(), Some(FALLBACK_FILE_NAME));
        }
        other => panic!("expected BrandMarkUnavailable, got {other:?}"),
    }
    assert_eq!(theme.current(), Theme::Dark);
    assert_eq!(sink.file_names(), vec![FALLBACK_FILE_NAME.to_string()]);

    let (_, bytes) = sink.take_last().unwrap();
    assert_eq!(page_count(&bytes), 1);
    assert!(String::from_utf8_lossy(&bytes).contains("(Logo Failed to Load\\)"));
}

#[tokio::test]
async fn test_capture_failure_restores_theme_and_saves_nothing() {
    let theme = ThemeState::new(Theme::Dark);
    let exporter = Exporter::new(Arc::new(FailingRasterizer), Arc::new(StaticAssets), brand_mark());
    let sink = MemorySink::new();

    let err = exporter.export(&sample_view(), &theme, &sink).await.unwrap_err();

    assert!(matches!(err, ExportError::Capture(_)));
    assert_eq!(theme.current(), Theme::Dark);
    assert!(sink.file_names().is_empty());
}

#[tokio::test]
async fn test_concurrent_export_is_rejected() {
    let exporter = Arc::new(Exporter::new(
        Arc::new(RecordingRasterizer::default()),
        Arc::new(SlowAssets),
        brand_mark(),
    ));
    let theme = ThemeState::new(Theme::Light);

    let first = {
        let exporter = Arc::clone(&exporter);
        let theme = theme.clone();
        tokio::spawn(async move { exporter.export(&sample_view(), &theme, &MemorySink::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = exporter.export(&sample_view(), &theme, &MemorySink::new()).await;
    assert!(matches!(second, Err(ExportError::Busy)));

    assert!(first.await.unwrap().is_ok());
    assert!(exporter.export(&sample_view(), &theme, &MemorySink::new()).await.is_ok());
}

#[tokio::test]
async fn test_no_data_view_is_rejected() {
    let theme = ThemeState::new(Theme::Dark);
    let rasterizer = Arc::new(RecordingRasterizer::watching(&theme));
    let exporter = Exporter::new(rasterizer.clone(), Arc::new(StaticAssets), brand_mark());
    let sink = MemorySink::new();

    let err = exporter.export(&View::NoData, &theme, &sink).await.unwrap_err();

    assert!(matches!(err, ExportError::NoContent));
    assert_eq!(err.to_string(), "No analysis content available to download.");
    assert!(sink.take_last().is_none());
    assert!(rasterizer.observed().is_empty());
    assert_eq!(theme.current(), Theme::Dark);
}

/// Flips the live theme mid-capture, the way a user toggle would.
struct TogglingRasterizer {
    live: ThemeState,
    to: Theme,
}

impl Rasterizer for TogglingRasterizer {
    fn capture(&self, _view: &View, _theme: Theme, _scale: f32) -> ExportResult<RgbImage> {
        self.live.set(self.to);
        Ok(RgbImage::from_pixel(1600, 900, Rgb([255, 255, 255])))
    }
}

#[tokio::test]
async fn test_theme_chosen_during_export_survives_restore() {
    let theme = ThemeState::new(Theme::Dark);
    let rasterizer = TogglingRasterizer { live: theme.clone(), to: Theme::Light };
    let exporter = Exporter::new(Arc::new(rasterizer), Arc::new(StaticAssets), brand_mark());

    exporter.export(&sample_view(), &theme, &MemorySink::new()).await.unwrap();

    assert_eq!(theme.current(), Theme::Light);
}

#[tokio::test]
async fn test_directory_sink_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(Arc::new(RecordingRasterizer::default()), Arc::new(StaticAssets), brand_mark());
    let sink = DirectorySink::new(dir.path().join("exports"));

    let saved = exporter.export(&sample_view(), &ThemeState::default(), &sink).await.unwrap();

    let path = saved.path.unwrap();
    assert_eq!(path, dir.path().join("exports").join(EXPORT_FILE_NAME));
    let bytes = tokio::fs::read(&path).await.unwrap();
    assert_eq!(bytes.len(), saved.size);
    assert!(bytes.ends_with(b"%%EOF\n"));
}

#[test]
fn test_directory_sink_fallback_path_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(Arc::new(RecordingRasterizer::default()), Arc::new(MissingAssets), brand_mark());
    let sink = DirectorySink::new(dir.path());

    let result = tokio_test::block_on(exporter.export(&sample_view(), &ThemeState::default(), &sink));

    let path = match result {
        Err(ExportError::BrandMarkUnavailable { fallback: Some(path), .. }) => path,
        other => panic!("expected a saved fallback, got {other:?}"),
    };
    assert_eq!(path, dir.path().join(FALLBACK_FILE_NAME));
    assert!(path.exists());
}

fn png_bytes() -> Vec<u8> {
    let logo = RgbaImage::from_pixel(60, 20, Rgba([0, 64, 64, 255]));
    let mut out = Cursor::new(Vec::new());
    logo.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_real_pipeline_with_served_logo() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()).insert_header("content-type", "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    let exporter = Exporter::new(
        Arc::new(SvgRasterizer::new()),
        Arc::new(DefaultAssetLoader::new(Duration::from_secs(5)).unwrap()),
        BrandMarkSource::Url(format!("{}/logo.png", server.uri())),
    );
    let theme = ThemeState::new(Theme::Dark);
    let mut cards = parse_analysis("## Summary\n* Spend is up\n* Conversions are flat");
    cards.push(ContentCard::citations(vec![CitationRecord::new("https://news.example/a", "Trends")]));
    let sink = MemorySink::new();

    let saved = exporter.export(&View::from_cards(&cards), &theme, &sink).await.unwrap();

    assert_eq!(saved.file_name, EXPORT_FILE_NAME);
    assert_eq!(theme.current(), Theme::Dark);
    let (_, bytes) = sink.take_last().unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert_eq!(text.matches("/Subtype /Image").count(), 2);
}

#[tokio::test]
async fn test_logo_http_error_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let exporter = Exporter::new(
        Arc::new(RecordingRasterizer::default()),
        Arc::new(DefaultAssetLoader::new(Duration::from_secs(5)).unwrap()),
        BrandMarkSource::Url(format!("{}/logo.png", server.uri())),
    );
    let sink = MemorySink::new();

    let err = exporter.export(&sample_view(), &ThemeState::default(), &sink).await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to load logo for PDF:"), "{err}");
    assert!(err.to_string().contains("404"));
    assert_eq!(sink.file_names(), vec![FALLBACK_FILE_NAME.to_string()]);
}

#[tokio::test]
async fn test_logo_from_local_path() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    tokio::fs::write(&logo, png_bytes()).await.unwrap();

    let loaded = DefaultAssetLoader::new(Duration::from_secs(1))
        .unwrap()
        .load(&BrandMarkSource::Path(logo))
        .await
        .unwrap();
    assert_eq!(loaded.dimensions(), (60, 20));
    assert_eq!(loaded.get_pixel(0, 0), &Rgb([0, 64, 64]));
}

#[tokio::test]
async fn test_undecodable_logo_is_brand_mark_error() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    tokio::fs::write(&logo, b"not an image").await.unwrap();

    let err = DefaultAssetLoader::new(Duration::from_secs(1))
        .unwrap()
        .load(&BrandMarkSource::Path(logo))
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::BrandMarkUnavailable { fallback: None, .. }));
}

// Keeps the sink trait object-safe for callers that box it.
#[test]
fn test_sinks_are_object_safe() {
    let sinks: Vec<Box<dyn DocumentSink>> = vec![Box::new(MemorySink::new()), Box::new(DirectorySink::new("."))];
    assert_eq!(sinks.len(), 2);
}
