/*!
The bundle data model: endpoint identifiers, primary and canonical blocks, and
the [`bundle::Bundle`] aggregate that ties them together.

Bundles are encoded as an indefinite-length CBOR array holding the primary
block followed by each canonical block in transmission order. Decoding goes
through [`bundle::ValidBundle::parse`], which separates structurally broken
input (an `Err`) from bundles that decode but break a validation rule.
*/

use dtnd_cbor as cbor;

pub mod block;
pub mod block_flags;
pub mod builder;
pub mod bundle;
pub mod bundle_flags;
pub mod constraint;
pub mod crc;
pub mod creation_timestamp;
pub mod dtn_time;
pub mod eid;
pub mod error;
pub mod hop_info;

pub use error::Error;

use block_flags::BlockFlags;
use bundle::Bundle;
use bundle_flags::BundleFlags;
use crc::CrcType;
use creation_timestamp::CreationTimestamp;
use dtn_time::DtnTime;
use eid::Eid;
use hop_info::HopInfo;

pub mod prelude {
    pub use super::block::{BlockIntegrity, CanonicalBlock, Data, Type as BlockType};
    pub use super::block_flags::BlockFlags;
    pub use super::builder::Builder;
    pub use super::bundle::{Bundle, FragmentInfo, PrimaryBlock, ValidBundle};
    pub use super::bundle_flags::BundleFlags;
    pub use super::constraint::Constraint;
    pub use super::crc::CrcType;
    pub use super::creation_timestamp::CreationTimestamp;
    pub use super::dtn_time::DtnTime;
    pub use super::eid::Eid;
    pub use super::hop_info::HopInfo;
}
