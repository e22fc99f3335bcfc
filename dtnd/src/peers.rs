use dtnd_cla::{self as cla, Sender};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Starts `sender`, retrying with exponential back-off while that is worthwhile.
///
/// Only permanent senders are retried, and only for errors that advise it.
/// Returns whether the sender ended up connected.
pub async fn connect(
    sender: Arc<dyn Sender>,
    cancel_token: tokio_util::sync::CancellationToken,
) -> bool {
    let address = sender.address();
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match sender.start().await {
            Ok(()) => {
                info!(%address, "Connected to peer {}", sender.peer_endpoint_id());
                return true;
            }
            Err(e) if e.should_retry() && sender.is_permanent() => {
                warn!(%address, "Failed to connect to peer, retrying in {backoff:?}: {e}");
            }
            Err(e) => {
                error!(%address, "Failed to connect to peer: {e}");
                return false;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = cancel_token.cancelled() => return false,
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cla::Convergence;
    use dtnd_bpv7::{bundle::Bundle, eid::Eid};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        failures: usize,
        permanent: bool,
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Convergence for Flaky {
        async fn close(&self) {}

        fn address(&self) -> String {
            "flaky".to_string()
        }

        fn is_permanent(&self) -> bool {
            self.permanent
        }
    }

    #[async_trait::async_trait]
    impl Sender for Flaky {
        async fn start(&self) -> cla::Result<()> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) < self.failures {
                Err(cla::Error::Timeout(self.address()))
            } else {
                Ok(())
            }
        }

        async fn send(&self, _: &Bundle) -> cla::Result<()> {
            Err(cla::Error::NotConnected)
        }

        fn peer_endpoint_id(&self) -> Eid {
            Eid::Null
        }
    }

    fn flaky(failures: usize, permanent: bool) -> Arc<Flaky> {
        Arc::new(Flaky {
            failures,
            permanent,
            attempts: AtomicUsize::new(0),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn retries_permanent_peers() {
        let sender = flaky(3, true);
        assert!(connect(sender.clone(), Default::default()).await);
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_on_opportunistic_peers() {
        let sender = flaky(3, false);
        assert!(!connect(sender.clone(), Default::default()).await);
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled() {
        let sender = flaky(usize::MAX, true);
        let cancel_token = tokio_util::sync::CancellationToken::new();
        cancel_token.cancel();
        assert!(!connect(sender.clone(), cancel_token).await);
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 1);
    }
}
