use std::sync::Arc;
use std::time::Duration;

use procure_core::{CardFont, CommandShare, Delivery, ExportSettings, Exporter, ProcurementRecord};

use crate::config::Config;

/// Renders the record's card and delivers it.
///
/// Builds a runtime for the duration of the export. A webhook push still in
/// flight is given `webhook.grace_secs` to finish before it is abandoned.
pub fn export_record(
    record: &ProcurementRecord,
    settings: &ExportSettings,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let font = CardFont::discover(config.font_path.value.as_deref())?;
    tracing::debug!("Using font {}", font.path().display());

    let share = CommandShare::new(config.share.command.clone());
    let exporter = Exporter::new(share, &config.download_dir.value)
        .with_font(Arc::new(font))
        .with_webhook_timeout(Duration::from_secs(config.webhook.timeout_secs));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let report = exporter.export(record, settings).await?;

        match &report.delivery {
            Delivery::Shared => println!("Shared card: {}", report.file_name),
            Delivery::Downloaded(path) => println!("Saved card: {}", path.display()),
        }

        if let Some(handle) = report.webhook {
            println!("Sending to webhook...");
            let grace = Duration::from_secs(config.webhook.grace_secs);
            if tokio::time::timeout(grace, handle).await.is_err() {
                tracing::warn!(
                    "Webhook push still pending after {}s, giving up",
                    grace.as_secs()
                );
            }
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
