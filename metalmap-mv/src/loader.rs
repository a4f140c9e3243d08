//! Background data loading
//!
//! The band table and the topology load concurrently; both must succeed
//! before the session exists. A failure is logged once and leaves the
//! service inert. There is no retry.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use metalmap_common::band::{load_bands_file, BandRecord};
use metalmap_common::config::{is_remote_source, DataConfig};
use metalmap_common::events::MapEvent;
use metalmap_common::topology::Atlas;
use metalmap_common::Session;

use crate::{AppState, LoadState};

/// Load both sources into a fresh session
pub async fn load_session(data: &DataConfig, pulse_duration: Duration) -> Result<Session> {
    let (records, atlas) = tokio::try_join!(
        load_records(data.bands_csv.clone()),
        load_atlas(&data.topology)
    )?;

    info!(
        "Loaded {} bands and {} map features",
        records.len(),
        atlas.len()
    );

    Ok(Session::new(records, atlas).with_pulse_duration(pulse_duration))
}

async fn load_records(path: PathBuf) -> Result<Vec<BandRecord>> {
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || load_bands_file(&path))
        .await
        .context("Band table loader panicked")?
        .with_context(|| format!("Failed to read band table {}", display))
}

async fn load_atlas(source: &str) -> Result<Atlas> {
    let text = if is_remote_source(source) {
        info!("Fetching topology from {}", source);
        reqwest::get(source)
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| metalmap_common::Error::Http(e.to_string()))
            .with_context(|| format!("Failed to fetch topology {}", source))?
            .text()
            .await
            .map_err(|e| metalmap_common::Error::Http(e.to_string()))
            .with_context(|| format!("Failed to read topology body {}", source))?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read topology {}", source))?
    };

    Atlas::from_topojson(&text).with_context(|| format!("Failed to decode topology {}", source))
}

/// Load data into `state`, publishing the outcome on the event bus
pub async fn load_into(state: AppState, data: DataConfig) {
    let pulse_duration = state.ui.pulse_duration();

    match load_session(&data, pulse_duration).await {
        Ok(session) => {
            let bands = session.records().len();
            let countries = session.atlas().len();
            *state.load.write().await = LoadState::Ready(Box::new(session));
            state.event_bus.emit_lossy(MapEvent::DataLoaded {
                bands,
                countries,
                timestamp: chrono::Utc::now(),
            });
        }
        Err(e) => {
            let message = format!("{:#}", e);
            error!("Map data failed to load: {}", message);
            *state.load.write().await = LoadState::Failed(message.clone());
            state.event_bus.emit_lossy(MapEvent::LoadFailed {
                message,
                timestamp: chrono::Utc::now(),
            });
        }
    }
}
