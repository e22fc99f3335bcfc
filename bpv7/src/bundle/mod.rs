use super::*;
use block::BlockIntegrity;
use std::collections::HashSet;

mod parse;
mod primary_block;


pub use parse::ValidBundle;
pub use primary_block::{FragmentInfo, PrimaryBlock, VERSION};

/// A primary block and its canonical blocks, in transmission order.
///
/// A `Bundle` only changes through [`Bundle::set_crc_type`] and
/// [`Bundle::calculate_crc`]; everything else is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    primary: PrimaryBlock,
    blocks: Vec<block::CanonicalBlock>,
}

impl Bundle {
    /// Assembles a bundle, failing with [`Error::InvalidBundle`] if it breaks any rule.
    pub fn new(
        mut primary: PrimaryBlock,
        blocks: Vec<block::CanonicalBlock>,
    ) -> Result<Self, Error> {
        // Normalise to what the wire form can carry: time 0 is the no-clock sentinel
        primary.timestamp.creation_time = primary
            .timestamp
            .creation_time
            .filter(|t| t.millisecs() != 0);
        primary.lifetime = core::time::Duration::from_millis(
            u64::try_from(primary.lifetime.as_millis()).unwrap_or(u64::MAX),
        );
        let bundle = Self { primary, blocks };
        match bundle.check_valid() {
            Ok(()) => Ok(bundle),
            Err(errors) => Err(Error::InvalidBundle {
                bundle: Box::new(bundle),
                errors,
            }),
        }
    }

    pub fn primary(&self) -> &PrimaryBlock {
        &self.primary
    }

    pub fn blocks(&self) -> &[block::CanonicalBlock] {
        &self.blocks
    }

    /// The first canonical block of `block_type`
    pub fn extension_block(&self, block_type: block::Type) -> Option<&block::CanonicalBlock> {
        self.blocks.iter().find(|b| b.block_type() == block_type)
    }

    pub fn payload_block(&self) -> Option<&block::CanonicalBlock> {
        self.extension_block(block::Type::Payload)
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match &self.payload_block()?.data {
            block::Data::Payload(data) => Some(&data[..]),
            _ => None,
        }
    }

    pub fn is_administrative_record(&self) -> bool {
        self.primary.flags.is_admin_record
    }

    /// A textual id, unique per source: `<source>-<time>-<seq>`, plus `-<offset>` for fragments.
    pub fn id(&self) -> String {
        let mut id = format!(
            "{}-{}-{}",
            self.primary.source,
            self.primary.timestamp.creation_millisecs(),
            self.primary.timestamp.sequence_number
        );
        if let Some(fragment_info) = &self.primary.fragment_info {
            id.push_str(&format!("-{}", fragment_info.offset));
        }
        id
    }

    /// Sets the CRC type of every block, discarding the stored values
    pub fn set_crc_type(&mut self, crc_type: CrcType) {
        self.primary.set_crc_type(crc_type);
        for block in &mut self.blocks {
            block.set_crc_type(crc_type);
        }
    }

    /// Recomputes the CRC of every block
    pub fn calculate_crc(&mut self) {
        self.primary.calculate_crc();
        for block in &mut self.blocks {
            block.calculate_crc();
        }
    }

    /// Checks every block and cross-block rule, returning all violations
    pub fn check_valid(&self) -> Result<(), Vec<Error>> {
        let mut errors = self.check_structure();
        for (block_number, r) in core::iter::once((0, self.primary.check_crc())).chain(
            self.blocks
                .iter()
                .map(|block| (block.block_number, block.check_crc())),
        ) {
            if let Err(source) = r {
                errors.push(Error::InvalidCrc {
                    block_number,
                    source,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Every rule except the CRCs, which are checked against the encoding they arrived in
    fn check_structure(&self) -> Vec<Error> {
        let mut errors = Vec::new();
        self.primary.check_valid(&mut errors);

        let mut block_numbers = HashSet::new();
        let mut unique_types = HashSet::new();
        let mut has_bundle_age = false;
        let no_reports =
            self.primary.flags.is_admin_record || self.primary.source.is_null();

        for block in &self.blocks {
            block.check_valid(&mut errors);

            if !block_numbers.insert(block.block_number) {
                errors.push(Error::DuplicateBlockNumber(block.block_number));
            }

            let block_type = block.block_type();
            if matches!(
                block_type,
                block::Type::PreviousNode | block::Type::BundleAge | block::Type::HopCount
            ) && !unique_types.insert(block_type)
            {
                errors.push(Error::DuplicateBlocks(block_type));
            }
            has_bundle_age |= block_type == block::Type::BundleAge;

            if no_reports && block.flags.report_on_failure {
                errors.push(Error::InvalidFlags(block.block_number));
            }
        }

        if self.primary.timestamp.creation_millisecs() == 0 && !has_bundle_age {
            errors.push(Error::MissingBundleAge);
        }
        errors
    }

    pub fn emit(&self) -> Vec<u8> {
        cbor::encode::emit(self)
    }
}

impl cbor::encode::ToCbor for Bundle {
    fn to_cbor(&self, encoder: &mut cbor::encode::Encoder) {
        encoder.emit_array(None, |a| {
            a.emit_raw(&self.primary.emit());
            for block in &self.blocks {
                a.emit_raw(&block.emit());
            }
        })
    }
}

impl core::fmt::Display for Bundle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.id())
    }
}
