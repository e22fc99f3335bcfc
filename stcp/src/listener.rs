use super::*;
use futures::StreamExt;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::FramedRead;

/// The receiving half of STCP.
///
/// Every accepted connection is decoded on its own task. A connection ends on
/// EOF or on the first structurally malformed message; bundles that decode but
/// fail validation are logged and dropped, and the connection carries on.
pub struct StcpReceiver {
    config: config::ListenerConfig,
    node: Eid,
    local_addr: std::sync::OnceLock<SocketAddr>,
    cancel_token: tokio_util::sync::CancellationToken,
    task_tracker: tokio_util::task::TaskTracker,
}

impl StcpReceiver {
    pub fn new(config: config::ListenerConfig, node: Eid) -> Self {
        Self {
            config,
            node,
            local_addr: std::sync::OnceLock::new(),
            cancel_token: tokio_util::sync::CancellationToken::new(),
            task_tracker: tokio_util::task::TaskTracker::new(),
        }
    }

    /// The bound address, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }
}

impl std::fmt::Debug for StcpReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StcpReceiver")
            .field("config", &self.config)
            .field("node", &self.node)
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for StcpReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stcp://{}",
            self.local_addr.get().unwrap_or(&self.config.endpoint)
        )
    }
}

#[async_trait::async_trait]
impl cla::Convergence for StcpReceiver {
    async fn close(&self) {
        self.cancel_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;
    }

    fn address(&self) -> String {
        self.local_addr
            .get()
            .unwrap_or(&self.config.endpoint)
            .to_string()
    }

    fn is_permanent(&self) -> bool {
        true
    }
}

#[async_trait::async_trait]
impl cla::Receiver for StcpReceiver {
    async fn start(&self, sink: Arc<dyn cla::Sink>) -> cla::Result<()> {
        if self.cancel_token.is_cancelled() {
            return Err(cla::Error::Closed);
        }
        if self.local_addr.get().is_some() {
            return Err(cla::Error::AlreadyStarted);
        }

        let listener = TcpListener::bind(self.config.endpoint)
            .await
            .inspect_err(|e| warn!("Failed to bind TCP listener to {}: {e}", self.config.endpoint))?;
        let local_addr = listener.local_addr()?;
        self.local_addr
            .set(local_addr)
            .map_err(|_| cla::Error::AlreadyStarted)?;

        info!("STCP receiver for {} listening on {local_addr}", self.node);

        self.task_tracker.spawn(accept(
            listener,
            sink,
            self.config.max_bundle_size,
            self.cancel_token.clone(),
            self.task_tracker.clone(),
        ));
        Ok(())
    }

    fn endpoint_id(&self) -> Eid {
        self.node.clone()
    }
}

async fn accept(
    listener: TcpListener,
    sink: Arc<dyn cla::Sink>,
    max_bundle_size: usize,
    cancel_token: tokio_util::sync::CancellationToken,
    task_tracker: tokio_util::task::TaskTracker,
) {
    loop {
        tokio::select! {
            r = listener.accept() => match r {
                Ok((stream, remote_addr)) => {
                    debug!(%remote_addr, "Accepted connection");
                    task_tracker.spawn(connection(
                        stream,
                        remote_addr,
                        sink.clone(),
                        max_bundle_size,
                        cancel_token.clone(),
                    ));
                }
                Err(e) => warn!("Failed to accept connection: {e}"),
            },
            _ = cancel_token.cancelled() => break,
        }
    }
    debug!("Listener closed");
}

async fn connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    sink: Arc<dyn cla::Sink>,
    max_bundle_size: usize,
    cancel_token: tokio_util::sync::CancellationToken,
) {
    let from = remote_addr.to_string();
    let mut transport = FramedRead::new(stream, codec::BundleCodec::new(max_bundle_size));
    loop {
        let next = tokio::select! {
            next = transport.next() => next,
            _ = cancel_token.cancelled() => break,
        };

        match next {
            None => {
                debug!(%remote_addr, "Connection closed by peer");
                break;
            }
            Some(Err(e)) => {
                info!(%remote_addr, "Dropping connection: {e}");
                metrics::counter!("stcp_connections_dropped").increment(1);
                break;
            }
            Some(Ok(ValidBundle::Invalid(bundle, errors))) => {
                warn!(%remote_addr, "Discarding invalid bundle {bundle}: {errors:?}");
                metrics::counter!("stcp_bundles_discarded").increment(1);
            }
            Some(Ok(ValidBundle::Valid(bundle))) => {
                metrics::counter!("stcp_bundles_received").increment(1);
                debug!(%remote_addr, "Received bundle {bundle}");
                if let Err(e) = sink.dispatch(bundle, &from).await {
                    warn!(%remote_addr, "Sink rejected bundle: {e}");
                }
            }
        }
    }
}
