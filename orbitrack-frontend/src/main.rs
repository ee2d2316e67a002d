use orbitrack_common::{Catalog, logging};
use orbitrack_frontend::app::{Reply, Viewer};
use orbitrack_frontend::backend::BackendClient;
use orbitrack_frontend::command::Command;
use orbitrack_frontend::config;
use orbitrack_frontend::pipeline::{GlobeMapping, PositionPipeline, Sgp4Propagator};
use orbitrack_frontend::scene::{HeadlessScene, Viewport};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

const COMMAND_QUEUE: usize = 32;

/// Forward stdin lines to the animation loop
fn spawn_command_reader() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(Command::parse(&line)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::read_config()?;

    let _logging_guard = logging::init_logging(&config.log_dir, "orbitrack-frontend", &config.log_level)?;

    tracing::info!("Orbitrack Frontend starting...");

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path).await.unwrap_or_else(|e| {
            tracing::warn!("Continuing without a local catalog: {:#}", e);
            Catalog::default()
        }),
        None => Catalog::default(),
    };

    let mapping = GlobeMapping {
        base_radius: config.base_radius,
        reference_radius_km: config.reference_radius_km,
    };
    let mut viewer = Viewer::new(
        PositionPipeline::new(Sgp4Propagator, mapping),
        HeadlessScene::with_globe(config.point_radius, config.base_radius),
        Viewport::new(config.width, config.height),
        catalog,
    );

    let client = BackendClient::new(config.backend_url.clone(), config.fetch_timeout())?;
    tracing::info!("Fetching element sets from {}", client.url());
    let mut pending_fetch = Some(client.spawn_initial_fetch());

    let mut commands = spawn_command_reader();
    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    println!("{}", Command::HELP);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(rx) = pending_fetch.as_mut() {
                    match rx.try_recv() {
                        Ok(records) => {
                            viewer.load_records(&records, chrono::Utc::now());
                            pending_fetch = None;
                        }
                        Err(oneshot::error::TryRecvError::Empty) => {}
                        Err(oneshot::error::TryRecvError::Closed) => {
                            tracing::warn!("Initial fetch task ended without a result");
                            pending_fetch = None;
                        }
                    }
                }
                viewer.tick(chrono::Utc::now(), std::time::Instant::now());
            }
            Some(command) = commands.recv() => {
                match viewer.handle_command(command, std::time::Instant::now()) {
                    Reply::Message(text) => println!("{}", text),
                    Reply::Silent => {}
                    Reply::Quit => break,
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received.");
                break;
            }
        }
    }

    tracing::info!("Orbitrack Frontend stopped after {} frames", viewer.renderer().frames());
    Ok(())
}
