/*!
Canonical blocks, and the integrity behaviour shared with the primary block.
*/

use super::*;
use error::CaptureFieldErr;

/// The type of a block, as defined in RFC 9171 Section 4.2.1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Primary Block (type code 0).
    Primary,
    /// Payload Block (type code 1).
    Payload,
    /// Previous Node Block (type code 6).
    PreviousNode,
    /// Bundle Age Block (type code 7).
    BundleAge,
    /// Hop Count Block (type code 10).
    HopCount,
    Unrecognised(u64),
}

impl From<Type> for u64 {
    fn from(value: Type) -> Self {
        match value {
            Type::Primary => 0,
            Type::Payload => 1,
            Type::PreviousNode => 6,
            Type::BundleAge => 7,
            Type::HopCount => 10,
            Type::Unrecognised(v) => v,
        }
    }
}

impl From<u64> for Type {
    fn from(value: u64) -> Self {
        match value {
            0 => Type::Primary,
            1 => Type::Payload,
            6 => Type::PreviousNode,
            7 => Type::BundleAge,
            10 => Type::HopCount,
            value => Type::Unrecognised(value),
        }
    }
}

/// Block-type-specific data, decoded according to the block type.
#[derive(Clone, PartialEq, Eq)]
pub enum Data {
    Payload(Box<[u8]>),
    PreviousNode(Eid),
    /// Milliseconds since bundle creation
    BundleAge(u64),
    HopCount(HopInfo),
    /// Preserved byte for byte
    Unrecognised { block_type: u64, data: Box<[u8]> },
}

impl core::fmt::Debug for Data {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Data::Payload(data) => write!(f, "Payload {} bytes", data.len()),
            Data::PreviousNode(eid) => write!(f, "PreviousNode({eid})"),
            Data::BundleAge(age) => write!(f, "BundleAge({age}ms)"),
            Data::HopCount(hop_info) => write!(f, "HopCount({hop_info:?})"),
            Data::Unrecognised { block_type, data } => {
                write!(f, "Unrecognised type {block_type}, {} bytes", data.len())
            }
        }
    }
}

fn parse_exact<T>(data: &[u8]) -> Result<T, Box<dyn core::error::Error + Send + Sync>>
where
    T: cbor::decode::FromCbor,
    T::Error: Into<Box<dyn core::error::Error + Send + Sync>>,
{
    let (v, len) = cbor::decode::parse::<T>(data).map_err(Into::into)?;
    if len != data.len() {
        return Err(Error::AdditionalData.into());
    }
    Ok(v)
}

impl Data {
    pub fn block_type(&self) -> Type {
        match self {
            Data::Payload(_) => Type::Payload,
            Data::PreviousNode(_) => Type::PreviousNode,
            Data::BundleAge(_) => Type::BundleAge,
            Data::HopCount(_) => Type::HopCount,
            Data::Unrecognised { block_type, .. } => Type::Unrecognised(*block_type),
        }
    }

    fn parse(block_type: Type, data: Box<[u8]>) -> Result<Self, Error> {
        match block_type {
            Type::Primary => Err(Error::InvalidBlockType(0)),
            Type::Payload => Ok(Data::Payload(data)),
            Type::PreviousNode => parse_exact(&data)
                .map(Data::PreviousNode)
                .map_field_err("previous node EID"),
            Type::BundleAge => parse_exact(&data)
                .map(Data::BundleAge)
                .map_field_err("bundle age"),
            Type::HopCount => parse_exact(&data)
                .map(Data::HopCount)
                .map_field_err("hop count"),
            Type::Unrecognised(block_type) => Ok(Data::Unrecognised { block_type, data }),
        }
    }

    fn emit(&self, a: &mut cbor::encode::Array) {
        match self {
            Data::Payload(data) | Data::Unrecognised { data, .. } => {
                a.emit_bytes(data);
            }
            Data::PreviousNode(eid) => {
                a.emit_bytes(&cbor::encode::emit(eid));
            }
            Data::BundleAge(age) => {
                a.emit_bytes(&cbor::encode::emit(age));
            }
            Data::HopCount(hop_info) => {
                a.emit_bytes(&cbor::encode::emit(hop_info));
            }
        }
    }
}

/// CRC handling common to the primary block and canonical blocks.
///
/// CRCs are always computed over a scratch encoding with the CRC field zeroed,
/// so checking never touches the block itself.
pub trait BlockIntegrity {
    fn crc_type(&self) -> CrcType;

    fn crc_value(&self) -> Option<u32>;

    fn set_crc(&mut self, crc_type: CrcType, crc_value: Option<u32>);

    /// Encodes the block with `crc_value` written into the CRC field, if the block has one.
    fn emit_with_crc(&self, crc_value: u32) -> Vec<u8>;

    /// Pushes each rule the block breaks on its own onto `errors`.
    fn check_valid(&self, errors: &mut Vec<Error>);

    fn emit(&self) -> Vec<u8> {
        self.emit_with_crc(self.crc_value().unwrap_or(0))
    }

    fn computed_crc(&self) -> Option<u32> {
        crc::digest(self.crc_type(), &self.emit_with_crc(0))
    }

    /// Changes the CRC type, discarding any stored value
    fn set_crc_type(&mut self, crc_type: CrcType) {
        self.set_crc(crc_type, None)
    }

    fn calculate_crc(&mut self) {
        let crc_value = self.computed_crc();
        self.set_crc(self.crc_type(), crc_value)
    }

    fn check_crc(&self) -> Result<(), crc::Error> {
        match (self.crc_type(), self.crc_value()) {
            (CrcType::None, None) => Ok(()),
            (CrcType::None, Some(_)) => Err(crc::Error::UnexpectedCrcValue),
            (_, None) => Err(crc::Error::MissingCrc),
            (_, Some(crc_value)) if self.computed_crc() == Some(crc_value) => Ok(()),
            _ => Err(crc::Error::IncorrectCrc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBlock {
    pub block_number: u64,
    pub flags: BlockFlags,
    pub crc_type: CrcType,
    pub crc_value: Option<u32>,
    pub data: Data,
}

impl CanonicalBlock {
    pub fn new(block_number: u64, flags: BlockFlags, crc_type: CrcType, data: Data) -> Self {
        Self {
            block_number,
            flags,
            crc_type,
            crc_value: None,
            data,
        }
    }

    pub fn block_type(&self) -> Type {
        self.data.block_type()
    }

    /// Parses the items of a canonical block array.
    ///
    /// `start` is the offset of the block within `buf`, the buffer being parsed.
    /// The CRC outcome is returned alongside the block rather than failing the parse.
    pub(crate) fn parse(
        buf: &[u8],
        start: usize,
        block: &mut cbor::decode::Array,
    ) -> Result<(Self, Result<(), crc::Error>), Error> {
        let block_type =
            Type::from(block.parse::<u64>().map_field_err("block type code")?);
        let block_number = block.parse::<u64>().map_field_err("block number")?;
        let flags = BlockFlags::from(
            block
                .parse::<u64>()
                .map_field_err("block processing control flags")?,
        );
        let crc_type = block.parse::<CrcType>().map_field_err("CRC type")?;
        let data = Data::parse(
            block_type,
            block
                .parse::<Box<[u8]>>()
                .map_field_err("block-type-specific data")?,
        )?;
        let crc = crc::parse_crc_value(block, crc_type).map_field_err("CRC value")?;
        let end = block.complete()?;

        let crc_value = crc.as_ref().map(|(v, _)| *v);
        let crc_check = crc::check_received(crc_type, buf, start..end, crc);

        Ok((
            Self {
                block_number,
                flags,
                crc_type,
                crc_value,
                data,
            },
            crc_check,
        ))
    }
}

impl BlockIntegrity for CanonicalBlock {
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
        let mut encoder = cbor::encode::Encoder::new();
        encoder.emit_array(Some(if has_crc { 6 } else { 5 }), |a| {
            a.emit(&u64::from(self.block_type()));
            a.emit(&self.block_number);
            a.emit(&self.flags);
            a.emit(&self.crc_type);
            self.data.emit(a);
            if has_crc {
                a.skip_value();
            }
        });
        crc::emit_crc_value(self.crc_type, crc_value, &mut encoder);
        encoder.build()
    }

    fn check_valid(&self, errors: &mut Vec<Error>) {
        if self.block_number == 0 {
            errors.push(Error::InvalidBlockNumber(0, self.block_type()));
        }
        match &self.data {
            Data::Unrecognised { block_type, .. } => {
                if !matches!(Type::from(*block_type), Type::Unrecognised(_)) {
                    errors.push(Error::InvalidBlockType(*block_type));
                }
            }
            Data::PreviousNode(eid) => {
                if let Err(e) = eid.check_valid() {
                    errors.push(e.into());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn parse(data: &[u8]) -> Result<(CanonicalBlock, Result<(), crc::Error>), Error> {
        cbor::decode::parse_array(data, |a, _| CanonicalBlock::parse(data, 0, a)).map(|r| r.0)
    }

    #[test]
    fn encoding() {
        let mut block = CanonicalBlock::new(
            2,
            BlockFlags::default(),
            CrcType::None,
            Data::HopCount(HopInfo { limit: 30, count: 0 }),
        );
        assert_eq!(*block.emit(), hex!("85 0A 02 00 00 44 82181E00"));

        block.set_crc_type(CrcType::CRC16_X25);
        assert!(matches!(block.check_crc(), Err(crc::Error::MissingCrc)));
        block.calculate_crc();
        assert!(block.check_crc().is_ok());

        let data = block.emit();
        assert_eq!(data.len(), 5 + 5 + 3);
        assert_eq!(data[0], 0x86);
        assert_eq!(data[data.len() - 3], 0x42);

        let (parsed, crc_check) = parse(&data).unwrap();
        assert!(crc_check.is_ok());
        assert_eq!(parsed, block);
    }

    #[test]
    fn received_crc_mismatch() {
        let mut block = CanonicalBlock::new(
            1,
            BlockFlags::default(),
            CrcType::CRC32_CASTAGNOLI,
            Data::Payload(b"hello"[..].into()),
        );
        block.calculate_crc();
        let mut data = block.emit();
        // Corrupt the payload, leaving the structure intact
        data[6] ^= 0x01;

        let (parsed, crc_check) = parse(&data).unwrap();
        assert!(matches!(crc_check, Err(crc::Error::IncorrectCrc)));
        assert!(matches!(parsed.check_crc(), Err(crc::Error::IncorrectCrc)));
    }

    #[test]
    fn unrecognised_preserved() {
        let data = hex!("85 18C0 03 10 00 44 DEADBEEF");
        let (block, crc_check) = parse(&data).unwrap();
        assert!(crc_check.is_ok());
        assert_eq!(block.block_type(), Type::Unrecognised(192));
        assert!(block.flags.delete_block_on_failure);
        assert_eq!(*block.emit(), data);
    }

    #[test]
    fn malformed() {
        // Primary block type code in a canonical block
        assert!(matches!(
            parse(&hex!("85 00 02 00 00 40")),
            Err(Error::InvalidBlockType(0))
        ));
        // Unknown CRC type
        assert!(matches!(
            parse(&hex!("85 01 01 00 03 40")),
            Err(Error::InvalidField {
                field: "CRC type",
                ..
            })
        ));
        // Bundle age that is not an integer
        assert!(matches!(
            parse(&hex!("85 07 02 00 00 41 60")),
            Err(Error::InvalidField {
                field: "bundle age",
                ..
            })
        ));
        // Trailing data inside the hop count
        assert!(matches!(
            parse(&hex!("85 0A 02 00 00 45 82181E00 00")),
            Err(Error::InvalidField {
                field: "hop count",
                ..
            })
        ));
        // CRC of the wrong width
        assert!(matches!(
            parse(&hex!("86 01 01 00 01 40 44 00000000")),
            Err(Error::InvalidField {
                field: "CRC value",
                ..
            })
        ));
        // Too many items
        assert!(matches!(
            parse(&hex!("86 01 01 00 00 40 00")),
            Err(Error::InvalidField {
                field: "CRC value",
                ..
            })
        ));
    }

    #[test]
    fn validation() {
        let mut errors = Vec::new();
        CanonicalBlock::new(
            0,
            BlockFlags::default(),
            CrcType::None,
            Data::Unrecognised {
                block_type: 7,
                data: Box::default(),
            },
        )
        .check_valid(&mut errors);
        assert!(matches!(
            errors[..],
            [
                Error::InvalidBlockNumber(0, Type::Unrecognised(7)),
                Error::InvalidBlockType(7)
            ]
        ));
    }
}
