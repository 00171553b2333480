//! Wordle Tracker Driver
//!
//! Loads the snapshot, then runs the rollover scheduler on a one-minute
//! interval for every bound room, delivering events through the outbound
//! relay and persisting after each mutating tick.
//!
//! The chat-platform connection itself is out of scope; this binary wires
//! the core to a logging relay so the whole state machine can run and be
//! observed standalone.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wordle_tracker::relay::{deliver, Outbound, RelayError};
use wordle_tracker::store::{self, Snapshot};
use wordle_tracker::{PlayerId, RoomId, Tracker, TICK_INTERVAL_SECS, VERSION};

/// Relay that logs instead of talking to a chat platform.
struct LogOutbound;

impl Outbound for LogOutbound {
    fn resolve_handle(&self, player: PlayerId) -> Result<String, RelayError> {
        Ok(format!("<@{player}>"))
    }

    fn notify_player(&mut self, player: PlayerId, text: &str) -> Result<(), RelayError> {
        info!(%player, %text, "notify");
        Ok(())
    }

    fn broadcast_to_room(
        &mut self,
        room: RoomId,
        text: &str,
        attachments: &[String],
    ) -> Result<(), RelayError> {
        info!(%room, %text, attachments = attachments.len(), "broadcast");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Wordle Tracker v{}", VERSION);

    let snapshot_path = std::env::var("TRACKER_SNAPSHOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("tracker.json"));

    let rng_seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let snapshot = store::load(&snapshot_path)
        .with_context(|| format!("loading snapshot {}", snapshot_path.display()))?;
    let mut tracker: Tracker = snapshot.restore(rng_seed).context("restoring snapshot")?;

    let rooms = tracker.rooms().count();
    info!(rooms, interval_secs = TICK_INTERVAL_SECS, "scheduler starting");

    let mut outbound = LogOutbound;
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(TICK_INTERVAL_SECS));
    loop {
        interval.tick().await;
        let now = Utc::now();

        let mut mutated = false;
        for (room, events) in tracker.tick_all(now) {
            if events.is_empty() {
                continue;
            }
            mutated = true;
            deliver(room, &events, &mut outbound);
        }

        if mutated {
            if let Err(err) = store::save(&snapshot_path, &Snapshot::capture(&tracker)) {
                // An unpersisted tick is acceptable to lose; the scheduler
                // keeps running.
                error!(%err, path = %snapshot_path.display(), "snapshot write failed");
            }
        }
    }
}
