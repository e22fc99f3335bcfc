use dtnd_bpv7::bundle::Bundle;
use dtnd_cla as cla;
use tracing::info;

/// Accepts every received bundle and records it in the log.
///
/// Delivery to local applications and forwarding are out of scope for this
/// node, so a received bundle ends here.
#[derive(Debug, Default)]
pub struct LoggingSink;

#[async_trait::async_trait]
impl cla::Sink for LoggingSink {
    async fn dispatch(&self, bundle: Bundle, from: &str) -> cla::Result<()> {
        info!(
            %from,
            destination = %bundle.primary().destination,
            "Received bundle {bundle} with {} payload bytes",
            bundle.payload().map_or(0, <[u8]>::len)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cla::Sink;
    use dtnd_bpv7::builder::Builder;

    #[tokio::test]
    async fn accepts_everything() {
        let bundle = Builder::new("ipn:1.1".parse().unwrap(), "ipn:2.1".parse().unwrap())
            .build(b"hello".as_slice())
            .unwrap();
        assert!(LoggingSink.dispatch(bundle, "127.0.0.1:1").await.is_ok());
    }
}
