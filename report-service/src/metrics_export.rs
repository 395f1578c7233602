use std::{fs, path::Path};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init() -> anyhow::Result<()> {
    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus metrics recorder: {e}"))?;

    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

/// Write the current exposition text to `path` for a textfile collector.
///
/// Does nothing when [`init`] was never called.
pub fn write_textfile(path: &Path) -> anyhow::Result<()> {
    let Some(handle) = PROM_HANDLE.get() else {
        return Ok(());
    };

    // Write then rename so a scraper never sees a half-written file.
    let tmp = path.with_extension("prom.tmp");
    fs::write(&tmp, handle.render())?;
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), "metrics textfile written");
    Ok(())
}
