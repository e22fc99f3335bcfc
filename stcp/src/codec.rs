use super::*;
use thiserror::Error;
use tokio_util::bytes::BytesMut;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Malformed CBOR on the stream: {0}")]
    Cbor(#[from] cbor::decode::Error),

    #[error(transparent)]
    Bundle(#[from] dtnd_bpv7::Error),

    #[error("Bundle exceeds the maximum size of {0} bytes")]
    TooLarge(usize),
}

impl From<Error> for cla::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::Io(e) => cla::Error::Io(e),
            Error::Bundle(e) => cla::Error::InvalidBundle(e),
            e => cla::Error::Internal(Box::new(e)),
        }
    }
}

/// Frames back-to-back bundle encodings on a byte stream.
#[derive(Debug, Clone, Copy)]
pub struct BundleCodec {
    max_bundle_size: usize,
}

impl BundleCodec {
    pub fn new(max_bundle_size: usize) -> Self {
        Self { max_bundle_size }
    }
}

impl tokio_util::codec::Decoder for BundleCodec {
    type Item = ValidBundle;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let len = match cbor::decode::item_length(src) {
            Ok(len) => len,
            Err(cbor::decode::Error::NeedMoreData(_)) => {
                if src.len() >= self.max_bundle_size {
                    return Err(Error::TooLarge(self.max_bundle_size));
                }
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if len > self.max_bundle_size {
            return Err(Error::TooLarge(self.max_bundle_size));
        }

        let frame = src.split_to(len);
        let (bundle, _) = ValidBundle::parse(&frame)?;
        Ok(Some(bundle))
    }
}

impl tokio_util::codec::Encoder<&Bundle> for BundleCodec {
    type Error = Error;

    fn encode(&mut self, item: &Bundle, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.emit());
        Ok(())
    }
}
