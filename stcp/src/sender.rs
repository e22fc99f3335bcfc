use super::*;
use futures::SinkExt;
use tokio::{io::AsyncWriteExt, net::TcpStream, sync::Mutex};
use tokio_util::codec::FramedWrite;

enum State {
    Unconnected,
    Connected(FramedWrite<TcpStream, codec::BundleCodec>),
    Closed,
}

/// The sending half of STCP: one persistent connection to one peer.
///
/// A single mutex guards the connection, so concurrent sends never interleave
/// their bytes, and a `close` waits for any send in progress.
pub struct StcpSender {
    address: String,
    peer: Eid,
    permanent: bool,
    connect_timeout: std::time::Duration,
    state: Mutex<State>,
}

impl StcpSender {
    pub fn new(config: &config::SenderConfig, peer: Eid, permanent: bool) -> Self {
        Self {
            address: config.endpoint.clone(),
            peer,
            permanent,
            connect_timeout: config.connect_timeout_duration(),
            state: Mutex::new(State::Unconnected),
        }
    }

    /// A sender whose peer identity is not known
    pub fn new_anonymous(address: impl Into<String>, permanent: bool) -> Self {
        Self::new(&config::SenderConfig::new(address), Eid::Null, permanent)
    }
}

impl std::fmt::Debug for StcpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StcpSender")
            .field("address", &self.address)
            .field("peer", &self.peer)
            .field("permanent", &self.permanent)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for StcpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stcp://{}", self.address)
    }
}

#[async_trait::async_trait]
impl cla::Convergence for StcpSender {
    async fn close(&self) {
        let mut state = self.state.lock().await;
        if let State::Connected(mut transport) = std::mem::replace(&mut *state, State::Closed) {
            if let Err(e) = transport.get_mut().shutdown().await {
                debug!(address = %self.address, "Failed to shut down connection: {e}");
            }
            debug!(address = %self.address, "Connection closed");
        }
    }

    fn address(&self) -> String {
        self.address.clone()
    }

    fn is_permanent(&self) -> bool {
        self.permanent
    }
}

#[async_trait::async_trait]
impl cla::Sender for StcpSender {
    async fn start(&self) -> cla::Result<()> {
        let mut state = self.state.lock().await;
        if let State::Closed = *state {
            return Err(cla::Error::Closed);
        }

        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| cla::Error::Timeout(self.address.clone()))
            .inspect_err(|_| debug!(address = %self.address, "Connection timed out"))?
            .map_err(|source| cla::Error::Connect {
                address: self.address.clone(),
                source,
            })
            .inspect_err(|e| debug!(address = %self.address, "{e}"))?;

        if let Ok(remote_addr) = stream.peer_addr() {
            info!(%remote_addr, "Connected to {}", self.peer);
        }

        // Any previous connection is dropped here
        *state = State::Connected(FramedWrite::new(
            stream,
            codec::BundleCodec::new(usize::MAX),
        ));
        Ok(())
    }

    async fn send(&self, bundle: &Bundle) -> cla::Result<()> {
        let mut state = self.state.lock().await;
        match &mut *state {
            State::Unconnected => Err(cla::Error::NotConnected),
            State::Closed => Err(cla::Error::Closed),
            State::Connected(transport) => {
                transport
                    .send(bundle)
                    .await
                    .inspect_err(|e| warn!(address = %self.address, "Failed to send bundle {bundle}: {e}"))?;

                metrics::counter!("stcp_bundles_sent").increment(1);
                debug!(address = %self.address, "Sent bundle {bundle}");
                Ok(())
            }
        }
    }

    fn peer_endpoint_id(&self) -> Eid {
        self.peer.clone()
    }
}
