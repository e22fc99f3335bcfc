use super::*;
use error::CaptureFieldErr;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HopInfo {
    pub limit: u64,
    pub count: u64,
}

impl HopInfo {
    pub fn exceeded(&self) -> bool {
        self.count > self.limit
    }
}

impl cbor::encode::ToCbor for HopInfo {
    fn to_cbor(&self, encoder: &mut cbor::encode::Encoder) {
        encoder.emit(&(self.limit, self.count))
    }
}

impl cbor::decode::FromCbor for HopInfo {
    type Error = Error;

    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error> {
        cbor::decode::parse_array(data, |a, _| {
            Ok(HopInfo {
                limit: a.parse().map_field_err("hop limit")?,
                count: a.parse().map_field_err("hop count")?,
            })
        })
    }
}
