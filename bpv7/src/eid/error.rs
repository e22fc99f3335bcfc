use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid ipn node number {0}")]
    IpnInvalidNodeNumber(u64),

    #[error("Invalid ipn service number {0}")]
    IpnInvalidServiceNumber(u64),

    #[error("'dtn' scheme name 'none' is reserved for the null endpoint")]
    DtnNoneName,

    #[error("Empty 'dtn' scheme name")]
    DtnEmptyName,

    #[error("Unknown EID scheme '{0}'")]
    UnknownScheme(String),

    #[error("Unsupported EID scheme {0}")]
    UnsupportedScheme(u64),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Failed to parse {field}: {source}")]
    InvalidField {
        field: &'static str,
        source: Box<dyn core::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    InvalidCBOR(#[from] dtnd_cbor::decode::Error),
}

pub trait CaptureFieldErr<T> {
    fn map_field_err(self, field: &'static str) -> Result<T, Error>;
}

impl<T, E: Into<Box<dyn core::error::Error + Send + Sync>>> CaptureFieldErr<T>
    for core::result::Result<T, E>
{
    fn map_field_err(self, field: &'static str) -> Result<T, Error> {
        self.map_err(|e| Error::InvalidField {
            field,
            source: e.into(),
        })
    }
}
