use super::*;
use block::{BlockIntegrity, CanonicalBlock, Data};

/// Assembles a valid bundle with sensible defaults.
///
/// The payload is block number 1 and is emitted last; extension blocks are
/// numbered from 2 in the order they are added.
pub struct Builder {
    flags: BundleFlags,
    crc_type: CrcType,
    source: Eid,
    destination: Eid,
    report_to: Option<Eid>,
    lifetime: core::time::Duration,
    timestamp: Option<CreationTimestamp>,
    payload_flags: BlockFlags,
    extensions: Vec<(BlockFlags, Data)>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            flags: BundleFlags::default(),
            crc_type: CrcType::CRC32_CASTAGNOLI,
            source: Eid::default(),
            destination: Eid::default(),
            report_to: None,
            lifetime: core::time::Duration::from_secs(24 * 60 * 60),
            timestamp: None,
            payload_flags: BlockFlags::default(),
            extensions: Vec::new(),
        }
    }
}

impl Builder {
    pub fn new(source: Eid, destination: Eid) -> Self {
        Self {
            source,
            destination,
            ..Default::default()
        }
    }

    pub fn flags(mut self, flags: BundleFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn crc_type(mut self, crc_type: CrcType) -> Self {
        self.crc_type = crc_type;
        self
    }

    /// Defaults to the source
    pub fn report_to(mut self, report_to: Eid) -> Self {
        self.report_to = Some(report_to);
        self
    }

    pub fn lifetime(mut self, lifetime: core::time::Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Defaults to [`CreationTimestamp::now`] when the bundle is built
    pub fn timestamp(mut self, timestamp: CreationTimestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn payload_flags(mut self, flags: BlockFlags) -> Self {
        self.payload_flags = flags;
        self
    }

    pub fn add_extension_block(mut self, flags: BlockFlags, data: Data) -> Self {
        self.extensions.push((flags, data));
        self
    }

    pub fn hop_limit(self, limit: u64) -> Self {
        self.add_extension_block(
            BlockFlags::default(),
            Data::HopCount(HopInfo { limit, count: 0 }),
        )
    }

    pub fn build(self, payload: impl Into<Box<[u8]>>) -> Result<Bundle, Error> {
        let crc_type = self.crc_type;
        let mut primary = bundle::PrimaryBlock {
            flags: self.flags,
            crc_type,
            report_to: self.report_to.unwrap_or_else(|| self.source.clone()),
            destination: self.destination,
            source: self.source,
            timestamp: self.timestamp.unwrap_or_else(CreationTimestamp::now),
            lifetime: self.lifetime,
            ..Default::default()
        };
        primary.calculate_crc();

        let mut blocks = self
            .extensions
            .into_iter()
            .zip(2..)
            .map(|((flags, data), block_number)| {
                CanonicalBlock::new(block_number, flags, crc_type, data)
            })
            .chain(core::iter::once(CanonicalBlock::new(
                1,
                self.payload_flags,
                crc_type,
                Data::Payload(payload.into()),
            )))
            .collect::<Vec<_>>();
        for block in &mut blocks {
            block.calculate_crc();
        }

        Bundle::new(primary, blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let bundle = Builder::new("ipn:1.1".parse().unwrap(), "dtn:node2".parse().unwrap())
            .hop_limit(30)
            .build(&b"Hello"[..])
            .unwrap();

        assert_eq!(bundle.primary().report_to, bundle.primary().source);
        assert_eq!(bundle.primary().crc_type, CrcType::CRC32_CASTAGNOLI);
        assert!(bundle.primary().timestamp.creation_time.is_some());

        let numbers: Vec<u64> = bundle.blocks().iter().map(|b| b.block_number).collect();
        assert_eq!(numbers, [2, 1]);
        assert_eq!(bundle.payload(), Some(&b"Hello"[..]));
        assert!(bundle.check_valid().is_ok());
    }

    #[test]
    fn no_clock_needs_bundle_age() {
        let builder = Builder::new("ipn:1.1".parse().unwrap(), "ipn:2.1".parse().unwrap())
            .timestamp(CreationTimestamp {
                creation_time: None,
                sequence_number: 1,
            });

        match builder.build(&b"x"[..]) {
            Err(Error::InvalidBundle { errors, .. }) => {
                assert!(matches!(errors[..], [Error::MissingBundleAge]))
            }
            r => panic!("Unexpected result {r:?}"),
        }

        let bundle = Builder::new("ipn:1.1".parse().unwrap(), "ipn:2.1".parse().unwrap())
            .timestamp(CreationTimestamp {
                creation_time: None,
                sequence_number: 1,
            })
            .add_extension_block(BlockFlags::default(), Data::BundleAge(0))
            .build(&b"x"[..])
            .unwrap();
        assert!(bundle.extension_block(block::Type::BundleAge).is_some());
    }
}
