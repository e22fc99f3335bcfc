use super::*;
use error::CaptureFieldErr;

/// The only bundle protocol version this crate speaks
pub const VERSION: u64 = 7;

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FragmentInfo {
    pub offset: u64,
    pub total_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryBlock {
    pub version: u64,
    pub flags: BundleFlags,
    pub crc_type: CrcType,
    pub crc_value: Option<u32>,
    pub destination: Eid,
    pub source: Eid,
    pub report_to: Eid,
    pub timestamp: CreationTimestamp,
    /// Carried in whole milliseconds; [`Bundle::new`] drops any finer precision
    pub lifetime: core::time::Duration,
    /// Present exactly when `flags.is_fragment` is set
    pub fragment_info: Option<FragmentInfo>,
}

impl Default for PrimaryBlock {
    fn default() -> Self {
        Self {
            version: VERSION,
            flags: BundleFlags::default(),
            crc_type: CrcType::default(),
            crc_value: None,
            destination: Eid::default(),
            source: Eid::default(),
            report_to: Eid::default(),
            timestamp: CreationTimestamp::default(),
            lifetime: core::time::Duration::from_secs(24 * 60 * 60),
            fragment_info: None,
        }
    }
}

impl PrimaryBlock {
    pub(crate) fn parse(
        buf: &[u8],
        start: usize,
        block: &mut cbor::decode::Array,
    ) -> Result<(Self, Result<(), crc::Error>), Error> {
        let version = block.parse::<u64>().map_field_err("version")?;
        if version != VERSION {
            // The remaining layout is unknown
            return Err(Error::InvalidVersion(version));
        }

        let flags = BundleFlags::from(
            block
                .parse::<u64>()
                .map_field_err("bundle processing control flags")?,
        );
        let crc_type = block.parse::<CrcType>().map_field_err("CRC type")?;
        let destination = block.parse::<Eid>().map_field_err("destination EID")?;
        let source = block.parse::<Eid>().map_field_err("source EID")?;
        let report_to = block.parse::<Eid>().map_field_err("report-to EID")?;
        let timestamp = block
            .parse::<CreationTimestamp>()
            .map_field_err("creation timestamp")?;
        let lifetime = core::time::Duration::from_millis(
            block.parse::<u64>().map_field_err("lifetime")?,
        );
        let fragment_info = if flags.is_fragment {
            Some(FragmentInfo {
                offset: block.parse().map_field_err("fragment offset")?,
                total_len: block
                    .parse()
                    .map_field_err("total application data unit length")?,
            })
        } else {
            None
        };
        let crc = crc::parse_crc_value(block, crc_type).map_field_err("CRC value")?;
        let end = block.complete()?;

        let crc_value = crc.as_ref().map(|(v, _)| *v);
        let crc_check = crc::check_received(crc_type, buf, start..end, crc);

        Ok((
            Self {
                version,
                flags,
                crc_type,
                crc_value,
                destination,
                source,
                report_to,
                timestamp,
                lifetime,
                fragment_info,
            },
            crc_check,
        ))
    }
}

impl block::BlockIntegrity for PrimaryBlock {
    fn crc_type(&self) -> CrcType {
        self.crc_type
    }

    fn crc_value(&self) -> Option<u32> {
        self.crc_value
    }

    fn set_crc(&mut self, crc_type: CrcType, crc_value: Option<u32>) {
        self.crc_type = crc_type;
        self.crc_value = crc_value;
    }

    fn emit_with_crc(&self, crc_value: u32) -> Vec<u8> {
        let has_crc = self.crc_type != CrcType::None;
        let mut count = 8;
        if self.flags.is_fragment {
            count += 2;
        }
        if has_crc {
            count += 1;
        }

        let mut encoder = cbor::encode::Encoder::new();
        encoder.emit_array(Some(count), |a| {
            a.emit(&self.version);
            a.emit(&self.flags);
            a.emit(&self.crc_type);
            a.emit(&self.destination);
            a.emit(&self.source);
            a.emit(&self.report_to);
            a.emit(&self.timestamp);
            a.emit(&u64::try_from(self.lifetime.as_millis()).unwrap_or(u64::MAX));
            if self.flags.is_fragment {
                let fragment_info = self.fragment_info.unwrap_or_default();
                a.emit(&fragment_info.offset);
                a.emit(&fragment_info.total_len);
            }
            if has_crc {
                a.skip_value();
            }
        });
        crc::emit_crc_value(self.crc_type, crc_value, &mut encoder);
        encoder.build()
    }

    fn check_valid(&self, errors: &mut Vec<Error>) {
        if self.version != VERSION {
            errors.push(Error::InvalidVersion(self.version));
        }
        for eid in [&self.destination, &self.source, &self.report_to] {
            if let Err(e) = eid.check_valid() {
                errors.push(e.into());
            }
        }
        match (self.flags.is_fragment, &self.fragment_info) {
            (true, Some(fragment_info)) => {
                if fragment_info.offset >= fragment_info.total_len {
                    errors.push(Error::InvalidFragmentInfo(
                        fragment_info.offset,
                        fragment_info.total_len,
                    ));
                }
            }
            (false, None) => {}
            _ => errors.push(Error::InvalidFlags(0)),
        }
    }
}
