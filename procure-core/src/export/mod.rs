//! Card export: render a record, then deliver it.
//!
//! Delivery runs in a fixed order:
//! 1. hand the PNG to the share target, if one is available;
//! 2. otherwise, or if sharing fails, save it to the download directory;
//! 3. independently, push it to the webhook on a detached task, if a webhook
//!    is configured.
//!
//! The webhook push starts before anything touches the filesystem, so a
//! failed share or download never suppresses it. When delivery fails, the
//! export waits for the push (bounded by its own timeout) before returning
//! the error.
//!
//! The PNG is staged in a scratch directory that is removed when the export
//! returns, whatever the outcome.

mod card;
mod font;
mod share;
mod webhook;

pub use card::{
    card_dimensions, encode_png, file_name, format_colors, format_prices, format_stores,
    render_card, store_tokens, wrap_tokens, CardError, CardText, Caption, BANNER_HEIGHT,
    CARD_WIDTH, SCALE, TEXT_HEIGHT,
};
pub use font::CardFont;
pub use share::{CommandShare, ShareError, SharePayload, ShareTarget};
pub use webhook::{image_message, WebhookClient, WebhookError};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::models::ProcurementRecord;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Card(#[from] CardError),

    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Rendering task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Per-export destination settings, taken from the presets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSettings {
    pub webhook_url: Option<String>,
    pub target_group: Option<String>,
}

/// How the card reached the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Shared,
    Downloaded(PathBuf),
}

#[derive(Debug)]
pub struct ExportReport {
    pub file_name: String,
    pub delivery: Delivery,
    /// Detached webhook push, if one was started. Its outcome is only
    /// logged; the handle lets a short-lived process wait for it to finish.
    pub webhook: Option<JoinHandle<()>>,
}

pub struct Exporter<T: ShareTarget> {
    share: T,
    download_dir: PathBuf,
    font: Option<Arc<CardFont>>,
    webhook_timeout: Duration,
}

impl<T: ShareTarget> Exporter<T> {
    pub fn new(share: T, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            share,
            download_dir: download_dir.into(),
            font: None,
            webhook_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_font(mut self, font: Arc<CardFont>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_webhook_timeout(mut self, timeout: Duration) -> Self {
        self.webhook_timeout = timeout;
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Renders the record's card off the calling thread and delivers it.
    pub async fn export(
        &self,
        record: &ProcurementRecord,
        settings: &ExportSettings,
    ) -> Result<ExportReport, ExportError> {
        let font = self.font.clone().ok_or(CardError::FontNotFound)?;
        let png = rasterize(record.clone(), font).await?;
        self.deliver(png, record, settings).await
    }

    /// Delivers an already rendered card.
    pub async fn deliver(
        &self,
        png: Vec<u8>,
        record: &ProcurementRecord,
        settings: &ExportSettings,
    ) -> Result<ExportReport, ExportError> {
        let file_name = file_name(record);
        let webhook = self.dispatch_webhook(png.clone(), settings);

        match self.stage_and_deliver(&file_name, &png, settings).await {
            Ok(delivery) => Ok(ExportReport {
                file_name,
                delivery,
                webhook,
            }),
            Err(e) => {
                if let Some(handle) = webhook {
                    if let Err(join) = handle.await {
                        tracing::error!("Webhook task failed: {}", join);
                    }
                }
                Err(e)
            }
        }
    }

    async fn stage_and_deliver(
        &self,
        file_name: &str,
        png: &[u8],
        settings: &ExportSettings,
    ) -> Result<Delivery, ExportError> {
        let scratch = tempfile::Builder::new()
            .prefix("procure-card-")
            .tempdir()
            .map_err(|e| ExportError::Io(std::env::temp_dir(), e))?;
        let staged = scratch.path().join(file_name);
        std::fs::write(&staged, png).map_err(|e| ExportError::Io(staged.clone(), e))?;

        self.share_or_download(&staged, file_name, png, settings)
            .await
    }

    async fn share_or_download(
        &self,
        staged: &Path,
        file_name: &str,
        png: &[u8],
        settings: &ExportSettings,
    ) -> Result<Delivery, ExportError> {
        if self.share.can_share(staged) {
            let caption = Caption::new(settings.target_group.as_deref());
            let payload = SharePayload {
                file: staged,
                title: &caption.title,
                text: &caption.text,
            };
            match self.share.share(payload).await {
                Ok(()) => return Ok(Delivery::Shared),
                Err(e) => tracing::warn!("Share failed, falling back to download: {}", e),
            }
        }

        let path = self.download(file_name, png)?;
        Ok(Delivery::Downloaded(path))
    }

    fn download(&self, file_name: &str, png: &[u8]) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.download_dir)
            .map_err(|e| ExportError::Io(self.download_dir.clone(), e))?;

        let path = unique_path(&self.download_dir, file_name);
        std::fs::write(&path, png).map_err(|e| ExportError::Io(path.clone(), e))?;
        tracing::info!("Saved card to {}", path.display());
        Ok(path)
    }

    fn dispatch_webhook(&self, png: Vec<u8>, settings: &ExportSettings) -> Option<JoinHandle<()>> {
        let url = settings
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())?;

        match WebhookClient::new(url, self.webhook_timeout) {
            Ok(client) => Some(client.dispatch(png)),
            Err(e) => {
                tracing::error!("Webhook client setup failed: {}", e);
                None
            }
        }
    }
}

/// Renders and encodes a card on the blocking pool.
pub async fn rasterize(
    record: ProcurementRecord,
    font: Arc<CardFont>,
) -> Result<Vec<u8>, ExportError> {
    let png = tokio::task::spawn_blocking(move || {
        let card = render_card(&record, &font)?;
        encode_png(card)
    })
    .await??;
    Ok(png)
}

/// `dir/name`, or `dir/stem (n).ext` for the first `n` not already taken.
fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let first = dir.join(file_name);
    if !first.exists() {
        return first;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (2..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StoreAllocation, StoreId, Unit};
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Share target that records what it was given.
    #[derive(Default)]
    struct FakeShare {
        available: bool,
        fail: bool,
        shared: RefCell<Vec<(PathBuf, String)>>,
    }

    impl ShareTarget for FakeShare {
        fn can_share(&self, file: &Path) -> bool {
            self.available && file.is_file()
        }

        async fn share(&self, payload: SharePayload<'_>) -> Result<(), ShareError> {
            self.shared
                .borrow_mut()
                .push((payload.file.to_path_buf(), payload.text.to_string()));
            if self.fail {
                Err(ShareError::Unavailable)
            } else {
                Ok(())
            }
        }
    }

    fn record() -> ProcurementRecord {
        ProcurementRecord {
            id: "r1".to_string(),
            timestamp: 0,
            supplier: "华南布行".to_string(),
            model: "A123".to_string(),
            color: "黑色".to_string(),
            unit: Unit::Piece,
            cost_price: 35.0,
            sell_price: 89.0,
            image: String::new(),
            detail_allocations: vec![
                StoreAllocation::new(StoreId::new(1).unwrap()).with_item("黑色", 3)
            ],
        }
    }

    #[tokio::test]
    async fn test_share_when_available() {
        let downloads = TempDir::new().unwrap();
        let share = FakeShare {
            available: true,
            ..Default::default()
        };
        let exporter = Exporter::new(share, downloads.path());
        let settings = ExportSettings {
            webhook_url: None,
            target_group: Some("采购一部".to_string()),
        };

        let report = exporter
            .deliver(b"png".to_vec(), &record(), &settings)
            .await
            .unwrap();

        assert_eq!(report.delivery, Delivery::Shared);
        assert_eq!(report.file_name, "采购_华南布行_A123.png");
        let shared = exporter.share.shared.borrow();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].1, "发送至: 采购一部");
        assert_eq!(std::fs::read_dir(downloads.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_when_share_unavailable() {
        let downloads = TempDir::new().unwrap();
        let exporter = Exporter::new(FakeShare::default(), downloads.path());

        let report = exporter
            .deliver(b"png".to_vec(), &record(), &ExportSettings::default())
            .await
            .unwrap();

        let expected = downloads.path().join("采购_华南布行_A123.png");
        assert_eq!(report.delivery, Delivery::Downloaded(expected.clone()));
        assert_eq!(std::fs::read(expected).unwrap(), b"png");
        assert!(exporter.share.shared.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_download_when_share_fails() {
        let downloads = TempDir::new().unwrap();
        let share = FakeShare {
            available: true,
            fail: true,
            ..Default::default()
        };
        let exporter = Exporter::new(share, downloads.path());

        let report = exporter
            .deliver(b"png".to_vec(), &record(), &ExportSettings::default())
            .await
            .unwrap();

        assert!(matches!(report.delivery, Delivery::Downloaded(_)));
        assert_eq!(exporter.share.shared.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_scratch_removed_after_export() {
        let downloads = TempDir::new().unwrap();
        let share = FakeShare {
            available: true,
            ..Default::default()
        };
        let exporter = Exporter::new(share, downloads.path());

        exporter
            .deliver(b"png".to_vec(), &record(), &ExportSettings::default())
            .await
            .unwrap();

        let staged = exporter.share.shared.borrow()[0].0.clone();
        assert!(!staged.exists());
        assert!(!staged.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_repeated_downloads_do_not_overwrite() {
        let downloads = TempDir::new().unwrap();
        let exporter = Exporter::new(FakeShare::default(), downloads.path());
        let settings = ExportSettings::default();

        let first = exporter.deliver(b"1".to_vec(), &record(), &settings).await.unwrap();
        let second = exporter.deliver(b"2".to_vec(), &record(), &settings).await.unwrap();

        assert_ne!(first.delivery, second.delivery);
        let Delivery::Downloaded(path) = second.delivery else {
            panic!("expected download");
        };
        assert!(path.ends_with("采购_华南布行_A123 (2).png"));
    }

    #[tokio::test]
    async fn test_no_webhook_no_network() {
        let downloads = TempDir::new().unwrap();
        let exporter = Exporter::new(FakeShare::default(), downloads.path());
        let settings = ExportSettings {
            webhook_url: Some("   ".to_string()),
            target_group: None,
        };

        let report = exporter
            .deliver(b"png".to_vec(), &record(), &settings)
            .await
            .unwrap();
        assert!(report.webhook.is_none());
    }

    #[tokio::test]
    async fn test_webhook_failure_is_contained() {
        let downloads = TempDir::new().unwrap();
        let exporter = Exporter::new(FakeShare::default(), downloads.path())
            .with_webhook_timeout(Duration::from_secs(2));
        let settings = ExportSettings {
            webhook_url: Some("http://127.0.0.1:9/hook".to_string()),
            target_group: None,
        };

        let report = exporter
            .deliver(b"png".to_vec(), &record(), &settings)
            .await
            .unwrap();

        assert!(matches!(report.delivery, Delivery::Downloaded(_)));
        let handle = report.webhook.expect("webhook task spawned");
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_export_without_font_fails() {
        let downloads = TempDir::new().unwrap();
        let exporter = Exporter::new(FakeShare::default(), downloads.path());

        let result = exporter.export(&record(), &ExportSettings::default()).await;
        assert!(matches!(result, Err(ExportError::Card(CardError::FontNotFound))));
    }

    #[tokio::test]
    async fn test_webhook_sent_when_download_fails() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await;
        });

        // A download directory below a regular file can never be created
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let exporter = Exporter::new(FakeShare::default(), blocker.join("downloads"))
            .with_webhook_timeout(Duration::from_secs(2));
        let settings = ExportSettings {
            webhook_url: Some(url),
            target_group: None,
        };

        let result = exporter.deliver(b"png".to_vec(), &record(), &settings).await;
        assert!(matches!(result, Err(ExportError::Io(_, _))));

        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("webhook received a request")
            .unwrap();
    }

    #[tokio::test]
    async fn test_export_renders_and_downloads_png() {
        let downloads = TempDir::new().unwrap();
        let exporter = Exporter::new(FakeShare::default(), downloads.path())
            .with_font(Arc::new(super::font::test_font()));

        let photo = image::RgbaImage::from_pixel(64, 48, image::Rgba([20, 120, 200, 255]));
        let mut record = record();
        record.image = crate::models::to_data_uri(&encode_png(photo).unwrap()).unwrap();

        let report = exporter
            .export(&record, &ExportSettings::default())
            .await
            .unwrap();

        let Delivery::Downloaded(path) = report.delivery else {
            panic!("expected download");
        };
        let card = image::load_from_memory(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!((card.width(), card.height()), card_dimensions());
    }

    #[test]
    fn test_unique_path() {
        let dir = TempDir::new().unwrap();
        assert_eq!(unique_path(dir.path(), "a.png"), dir.path().join("a.png"));

        std::fs::write(dir.path().join("a.png"), b"").unwrap();
        assert_eq!(unique_path(dir.path(), "a.png"), dir.path().join("a (2).png"));

        std::fs::write(dir.path().join("a (2).png"), b"").unwrap();
        assert_eq!(unique_path(dir.path(), "a.png"), dir.path().join("a (3).png"));
    }
}
