use anyhow::Result;
use dexter_charts::{
    config::{AppConfig, SwapSource},
    monitor::{ChartRequest, fetch_snapshot, spawn_chart_monitor},
    pipeline::{ChartSnapshot, build_snapshot},
    subgraph::SubgraphClient,
    utils,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    tracing::info!(
        mode = %config.chart.mode,
        interval = %config.chart.interval,
        lookback_days = config.lookback_days,
        watch_interval_secs = ?config.watch_interval_secs,
        "[INIT] dexter-charts starting"
    );

    let (url, pool, flavor, page_size) = match config.source {
        SwapSource::File(path) => {
            if config.watch_interval_secs.is_some() {
                tracing::warn!("[INIT] WATCH_INTERVAL_SECS ignored for file input");
            }
            let swaps = utils::load_swaps_file(&path)?;
            print_snapshot(&build_snapshot(&swaps, &config.chart)?)?;
            return Ok(());
        }
        SwapSource::Subgraph {
            url,
            pool,
            flavor,
            page_size,
        } => (url, pool, flavor, page_size),
    };

    tracing::info!(%url, pool = ?pool, ?flavor, page_size, "[INIT] subgraph source");
    let client = SubgraphClient::new(url, flavor).with_page_size(page_size);
    let request = ChartRequest {
        pool,
        lookback_days: config.lookback_days,
        settings: config.chart,
    };

    let Some(interval_secs) = config.watch_interval_secs else {
        print_snapshot(&fetch_snapshot(&client, &request).await?)?;
        return Ok(());
    };

    // Monitor mode: print every snapshot the refresher publishes
    let (tx, mut rx) = watch::channel(ChartSnapshot::default());
    let monitor = spawn_chart_monitor(client, request, interval_secs, tx);
    tracing::info!(interval_secs, "[INIT] chart monitor started");

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                print_snapshot(&snapshot)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("[SHUTDOWN] interrupt received");
                break;
            }
        }
    }

    monitor.abort();
    Ok(())
}

fn print_snapshot(snapshot: &ChartSnapshot) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}
