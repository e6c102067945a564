//! Periodic chart refresh for a live bot view.

use chrono::{DateTime, Utc};
use ethers::types::Address;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::errors::Result;
use crate::pipeline::{ChartSettings, ChartSnapshot, build_snapshot};
use crate::subgraph::SubgraphClient;

/// Which pool to chart and over how much history.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub pool: Address,
    pub lookback_days: u32,
    pub settings: ChartSettings,
}

impl ChartRequest {
    /// First timestamp of the lookback window ending at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp() - i64::from(self.lookback_days) * 86_400
    }
}

/// Fetch the request's window and build a fresh snapshot from it.
pub async fn fetch_snapshot(client: &SubgraphClient, request: &ChartRequest) -> Result<ChartSnapshot> {
    let since = request.since(Utc::now());
    let swaps = client.fetch_swaps(request.pool, since).await?;
    build_snapshot(&swaps, &request.settings)
}

/// Spawn the refresh loop. Each tick rebuilds the chart from scratch and
/// publishes it on `tx`; a failed refresh leaves the last snapshot in place.
/// The task ends once every receiver is gone.
pub fn spawn_chart_monitor(
    client: SubgraphClient,
    request: ChartRequest,
    interval_secs: u64,
    tx: watch::Sender<ChartSnapshot>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
        let mut ticks: u64 = 0;

        loop {
            ticker.tick().await;
            ticks += 1;

            match fetch_snapshot(&client, &request).await {
                Ok(snapshot) => {
                    if tx.send(snapshot).is_err() {
                        info!("[MONITOR] no subscribers left, stopping");
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "[MONITOR] refresh failed, keeping previous snapshot");
                }
            }

            if ticks % 5 == 0 {
                info!(ticks, pool = ?request.pool, "[HEARTBEAT] chart monitor running");
            }
        }
    })
}
