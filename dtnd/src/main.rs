use anyhow::Context;
use clap::Parser;
use dtnd_cla::{self as cla, Receiver, Sender};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

mod config;
mod peers;
mod sink;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logger(log_level: &str) -> anyhow::Result<()> {
    let log_level = log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .with_context(|| format!("Invalid 'log_level' value '{log_level}' in configuration"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .with_target(
            log_level > tracing_subscriber::filter::LevelFilter::from_level(tracing::Level::INFO),
        )
        .init();
    Ok(())
}

fn receiver(listen: config::ListenConfig, node_id: &dtnd_bpv7::eid::Eid) -> Arc<dyn Receiver> {
    let node = listen.node.unwrap_or_else(|| node_id.clone());
    match listen.protocol {
        config::ListenProtocol::Stcp(config) => Arc::new(dtnd_stcp::StcpReceiver::new(config, node)),
    }
}

fn sender(peer: config::PeerConfig) -> Option<Arc<dyn Sender>> {
    match peer.protocol {
        config::PeerProtocol::Stcp(config) => Some(Arc::new(dtnd_stcp::StcpSender::new(
            &config, peer.node, true,
        ))),
        config::PeerProtocol::Unknown => {
            warn!("Ignoring peer {} with an unknown protocol", peer.node);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = config::load(args.config)?;

    init_logger(&config.log_level)?;
    info!(
        "{} version {} starting...",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    info!("Node id {}", config.node_id);

    let sink: Arc<dyn cla::Sink> = Arc::new(sink::LoggingSink);
    let mut receivers = Vec::new();
    for listen in config.listen {
        let receiver = receiver(listen, &config.node_id);
        receiver
            .start(sink.clone())
            .await
            .with_context(|| format!("Failed to start listener {}", receiver.address()))?;
        receivers.push(receiver);
    }

    let cancel_token = tokio_util::sync::CancellationToken::new();
    let task_tracker = tokio_util::task::TaskTracker::new();
    let mut senders = Vec::new();
    for peer in config.peer {
        if let Some(sender) = sender(peer) {
            task_tracker.spawn(peers::connect(sender.clone(), cancel_token.clone()));
            senders.push(sender);
        }
    }
    task_tracker.close();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    cancel_token.cancel();
    task_tracker.wait().await;
    for sender in senders {
        sender.close().await;
    }
    for receiver in receivers {
        receiver.close().await;
    }

    info!("Stopped");
    Ok(())
}
