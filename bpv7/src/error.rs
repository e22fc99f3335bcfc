/*!
The primary error type for the crate.

Validation reports every rule a bundle breaks, so most variants describe a
single violation and [`Error::InvalidBundle`] carries the complete list.
*/

use super::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// There is data after the end of the bundle's CBOR array.
    #[error("Bundle has additional data after end of CBOR array")]
    AdditionalData,

    #[error("Unsupported bundle protocol version {0}")]
    InvalidVersion(u64),

    #[error("{1:?} block cannot be block number {0}")]
    InvalidBlockNumber(u64, block::Type),

    /// A canonical block claims a reserved type code.
    #[error("Block type code {0} cannot be used by a canonical block")]
    InvalidBlockType(u64),

    #[error("Bundle has more than one block with block number {0}")]
    DuplicateBlockNumber(u64),

    #[error("Bundle has multiple {0:?} blocks")]
    DuplicateBlocks(block::Type),

    #[error("Bundle source has no clock, and there is no Bundle Age extension block")]
    MissingBundleAge,

    /// Block `0` is the primary block.
    #[error("Block {0} has an invalid combination of flags")]
    InvalidFlags(u64),

    #[error("Invalid fragment information: offset {0}, total length {1}")]
    InvalidFragmentInfo(u64, u64),

    #[error("Block {block_number} failed its integrity check: {source}")]
    InvalidCrc {
        block_number: u64,
        source: crc::Error,
    },

    /// The bundle was assembled or decoded, but breaks one or more rules.
    #[error("Bundle is invalid, with {} errors", .errors.len())]
    InvalidBundle {
        bundle: Box<bundle::Bundle>,
        errors: Vec<Error>,
    },

    #[error(transparent)]
    InvalidEid(#[from] eid::Error),

    #[error(transparent)]
    InvalidCBOR(#[from] cbor::decode::Error),

    #[error("Failed to parse {field}: {source}")]
    InvalidField {
        field: &'static str,
        source: Box<dyn core::error::Error + Send + Sync>,
    },
}

/// Maps a failure into an [`Error::InvalidField`] naming the field being parsed.
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
