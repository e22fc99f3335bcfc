/*!
The seam between the bundle node and the transports that carry bundles.

A convergence layer adapter comes in two halves. A [`Sender`] owns the
outbound connection to one peer, and a [`Receiver`] accepts inbound traffic
and hands every decoded bundle to a [`Sink`].
*/

use async_trait::async_trait;
use dtnd_bpv7::{bundle::Bundle, eid::Eid};
use std::sync::Arc;
use thiserror::Error;

/// A specialized `Result` type for CLA operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during CLA operations.
#[derive(Debug, Error)]
pub enum Error {
    /// `send` was called before a successful `start`.
    #[error("The sender is not connected")]
    NotConnected,

    /// The adapter has been closed and will not be used again.
    #[error("The adapter is closed")]
    Closed,

    #[error("Timed out connecting to {0}")]
    Timeout(String),

    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The receiver is already running.
    #[error("The receiver has already been started")]
    AlreadyStarted,

    #[error(transparent)]
    InvalidBundle(#[from] dtnd_bpv7::Error),

    /// An internal error occurred.
    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether trying again later might succeed.
    ///
    /// This is advice for whoever owns the adapter; nothing here retries.
    pub fn should_retry(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::Connect { .. } | Error::Io(_)
        )
    }
}

/// Behaviour shared by both halves of an adapter.
#[async_trait]
pub trait Convergence: Send + Sync {
    /// Releases the underlying transport. Once closed, an adapter stays closed.
    async fn close(&self);

    /// The transport address, e.g. `host:port` for TCP.
    fn address(&self) -> String;

    /// Whether the owner should keep the adapter alive across transient failures.
    fn is_permanent(&self) -> bool;
}

/// The outbound half of an adapter, delivering bundles to a single peer.
#[async_trait]
pub trait Sender: Convergence {
    /// Establishes the connection, replacing any existing one.
    ///
    /// A failure carries [`Error::should_retry`] as advice.
    async fn start(&self) -> Result<()>;

    /// Transmits one bundle as a single unit on the connection.
    async fn send(&self, bundle: &Bundle) -> Result<()>;

    /// The node at the other end, or the null endpoint if not known.
    fn peer_endpoint_id(&self) -> Eid;
}

/// The inbound half of an adapter.
#[async_trait]
pub trait Receiver: Convergence {
    /// Begins accepting traffic, dispatching every valid bundle to `sink`.
    async fn start(&self, sink: Arc<dyn Sink>) -> Result<()>;

    /// The local node this receiver accepts bundles for.
    fn endpoint_id(&self) -> Eid;
}

/// Where a [`Receiver`] delivers the bundles it decodes.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Accepts a bundle received from the transport address `from`.
    async fn dispatch(&self, bundle: Bundle, from: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtnd_bpv7::builder::Builder;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(Bundle, String)>>);

    #[async_trait]
    impl Sink for Collect {
        async fn dispatch(&self, bundle: Bundle, from: &str) -> Result<()> {
            self.0.lock().await.push((bundle, from.to_string()));
            Ok(())
        }
    }

    #[test]
    fn retry_advice() {
        assert!(Error::Timeout("localhost:1".into()).should_retry());
        assert!(
            Error::Connect {
                address: "localhost:1".into(),
                source: std::io::ErrorKind::ConnectionRefused.into(),
            }
            .should_retry()
        );
        assert!(Error::Io(std::io::ErrorKind::BrokenPipe.into()).should_retry());

        assert!(!Error::NotConnected.should_retry());
        assert!(!Error::Closed.should_retry());
        assert!(!Error::AlreadyStarted.should_retry());
        assert!(!Error::InvalidBundle(dtnd_bpv7::Error::AdditionalData).should_retry());
    }

    #[tokio::test]
    async fn sink_as_trait_object() {
        let collect = Arc::new(Collect::default());
        let sink: Arc<dyn Sink> = collect.clone();

        let bundle = Builder::new(
            "ipn:1.1".parse().unwrap(),
            "ipn:2.1".parse().unwrap(),
        )
        .build(b"hello".as_slice())
        .unwrap();
        sink.dispatch(bundle.clone(), "127.0.0.1:4556").await.unwrap();

        let received = collect.0.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, bundle);
        assert_eq!(received[0].1, "127.0.0.1:4556");
    }
}
