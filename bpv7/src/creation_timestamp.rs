use super::*;
use error::CaptureFieldErr;
use trace_err::*;

/// Bundle creation time and sequence number; a `None` time means the source has no clock.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CreationTimestamp {
    pub creation_time: Option<DtnTime>,
    pub sequence_number: u64,
}

impl CreationTimestamp {
    pub fn now() -> Self {
        let timestamp = time::OffsetDateTime::now_utc();
        Self {
            creation_time: Some(
                timestamp
                    .try_into()
                    .trace_expect("System clock is before the DTN epoch"),
            ),
            sequence_number: (timestamp.nanosecond() % 1_000_000) as u64,
        }
    }

    pub fn creation_millisecs(&self) -> u64 {
        self.creation_time.map_or(0, |t| t.millisecs())
    }
}

impl cbor::encode::ToCbor for CreationTimestamp {
    fn to_cbor(&self, encoder: &mut cbor::encode::Encoder) {
        encoder.emit(&(self.creation_millisecs(), self.sequence_number))
    }
}

impl cbor::decode::FromCbor for CreationTimestamp {
    type Error = Error;

    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error> {
        cbor::decode::parse_array(data, |a, _| {
            let timestamp = a.parse::<u64>().map_field_err("bundle creation time")?;
            Ok(CreationTimestamp {
                creation_time: (timestamp != 0).then(|| DtnTime::new(timestamp)),
                sequence_number: a.parse().map_field_err("sequence number")?,
            })
        })
    }
}
