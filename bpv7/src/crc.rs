use super::*;
use core::ops::Range;
use thiserror::Error;

const X25: ::crc::Crc<u16> = ::crc::Crc::<u16>::new(&::crc::CRC_16_IBM_SDLC);
const CASTAGNOLI: ::crc::Crc<u32> = ::crc::Crc::<u32>::new(&::crc::CRC_32_ISCSI);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid CRC Type {0}")]
    InvalidType(u64),

    #[error("Block has unexpected CRC value length {0}")]
    InvalidLength(usize),

    #[error("Block has a CRC value with no CRC type specified")]
    UnexpectedCrcValue,

    #[error("Incorrect CRC value")]
    IncorrectCrc,

    #[error("Missing CRC value")]
    MissingCrc,

    #[error(transparent)]
    InvalidCBOR(#[from] cbor::decode::Error),
}

#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CrcType {
    #[default]
    None,
    CRC16_X25,
    CRC32_CASTAGNOLI,
}

impl CrcType {
    /// Width in bytes of the CRC value carried in the block
    pub fn value_len(&self) -> usize {
        match self {
            CrcType::None => 0,
            CrcType::CRC16_X25 => 2,
            CrcType::CRC32_CASTAGNOLI => 4,
        }
    }
}

impl TryFrom<u64> for CrcType {
    type Error = self::Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::CRC16_X25),
            2 => Ok(Self::CRC32_CASTAGNOLI),
            v => Err(Error::InvalidType(v)),
        }
    }
}

impl From<CrcType> for u64 {
    fn from(value: CrcType) -> Self {
        match value {
            CrcType::None => 0,
            CrcType::CRC16_X25 => 1,
            CrcType::CRC32_CASTAGNOLI => 2,
        }
    }
}

impl cbor::encode::ToCbor for CrcType {
    fn to_cbor(&self, encoder: &mut cbor::encode::Encoder) {
        encoder.emit(&u64::from(*self))
    }
}

impl cbor::decode::FromCbor for CrcType {
    type Error = self::Error;

    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error> {
        let (v, len) = cbor::decode::parse::<u64>(data)?;
        Ok((v.try_into()?, len))
    }
}

/// Computes the CRC of `data`, which must already hold a zeroed CRC field.
pub fn digest(crc_type: CrcType, data: &[u8]) -> Option<u32> {
    match crc_type {
        CrcType::None => None,
        CrcType::CRC16_X25 => Some(X25.checksum(data) as u32),
        CrcType::CRC32_CASTAGNOLI => Some(CASTAGNOLI.checksum(data)),
    }
}

/// Appends the encoded CRC value as a byte string of the type's width
pub fn emit_crc_value(crc_type: CrcType, crc_value: u32, encoder: &mut cbor::encode::Encoder) {
    match crc_type {
        CrcType::None => {}
        CrcType::CRC16_X25 => {
            encoder.emit_bytes(&(crc_value as u16).to_be_bytes());
        }
        CrcType::CRC32_CASTAGNOLI => {
            encoder.emit_bytes(&crc_value.to_be_bytes());
        }
    }
}

/// Parses the trailing CRC field of a block, if present.
///
/// Returns the value along with the range its bytes occupy in the buffer being parsed.
pub fn parse_crc_value(
    block: &mut cbor::decode::Array,
    crc_type: CrcType,
) -> Result<Option<(u32, Range<usize>)>, Error> {
    let crc_value = block.try_parse_value(|value, _, _| match value {
        cbor::decode::Value::Bytes(crc) => match (crc_type, crc.len()) {
            (CrcType::None, _) => Err(Error::UnexpectedCrcValue),
            (CrcType::CRC16_X25, 2) => Ok(u16::from_be_bytes([crc[0], crc[1]]) as u32),
            (CrcType::CRC32_CASTAGNOLI, 4) => {
                Ok(u32::from_be_bytes([crc[0], crc[1], crc[2], crc[3]]))
            }
            (_, len) => Err(Error::InvalidLength(len)),
        },
        value => Err(cbor::decode::Error::IncorrectType(
            "Definite-length Byte String".to_string(),
            value.type_name(),
        )
        .into()),
    })?;

    let end = block.offset();
    Ok(crc_value.map(|v| (v, end - crc_type.value_len()..end)))
}

/// Checks a received CRC against the raw bytes of the block that carried it.
///
/// `block` is the range of the encoded block within `buf`, and the range paired
/// with the CRC value locates the CRC bytes within `buf`.
pub fn check_received(
    crc_type: CrcType,
    buf: &[u8],
    block: Range<usize>,
    crc: Option<(u32, Range<usize>)>,
) -> Result<(), Error> {
    match (crc_type, crc) {
        (CrcType::None, None) => Ok(()),
        (CrcType::None, Some(_)) => Err(Error::UnexpectedCrcValue),
        (_, None) => Err(Error::MissingCrc),
        (crc_type, Some((crc_value, value))) => {
            let zeros = [0u8; 4];
            let zeros = &zeros[..value.len()];
            let head = &buf[block.start..value.start];
            let tail = &buf[value.end..block.end];
            let computed = match crc_type {
                CrcType::CRC16_X25 => {
                    let mut digest = X25.digest();
                    digest.update(head);
                    digest.update(zeros);
                    digest.update(tail);
                    digest.finalize() as u32
                }
                _ => {
                    let mut digest = CASTAGNOLI.digest();
                    digest.update(head);
                    digest.update(zeros);
                    digest.update(tail);
                    digest.finalize()
                }
            };
            if computed == crc_value {
                Ok(())
            } else {
                Err(Error::IncorrectCrc)
            }
        }
    }
}
