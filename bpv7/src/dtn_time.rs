use super::*;

const DTN_EPOCH: time::OffsetDateTime = time::macros::datetime!(2000-01-01 00:00:00 UTC);

/// Milliseconds since 2000-01-01T00:00:00Z
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DtnTime {
    millisecs: u64,
}

impl DtnTime {
    pub fn now() -> Self {
        Self {
            millisecs: (time::OffsetDateTime::now_utc() - DTN_EPOCH)
                .whole_milliseconds()
                .clamp(0, u64::MAX as i128) as u64,
        }
    }

    pub fn new(millisecs: u64) -> Self {
        Self { millisecs }
    }

    pub fn millisecs(&self) -> u64 {
        self.millisecs
    }
}

impl cbor::encode::ToCbor for DtnTime {
    fn to_cbor(&self, encoder: &mut cbor::encode::Encoder) {
        encoder.emit(&self.millisecs)
    }
}

impl TryFrom<time::OffsetDateTime> for DtnTime {
    type Error = time::error::ConversionRange;

    fn try_from(instant: time::OffsetDateTime) -> Result<Self, Self::Error> {
        let millisecs = (instant - DTN_EPOCH).whole_milliseconds();
        if millisecs < 0 || millisecs > u64::MAX as i128 {
            Err(time::error::ConversionRange)
        } else {
            Ok(Self {
                millisecs: millisecs as u64,
            })
        }
    }
}

impl From<DtnTime> for time::OffsetDateTime {
    fn from(dtn_time: DtnTime) -> Self {
        DTN_EPOCH.saturating_add(time::Duration::milliseconds(
            dtn_time.millisecs.min(i64::MAX as u64) as i64,
        ))
    }
}

impl core::fmt::Display for DtnTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", time::OffsetDateTime::from(*self))
    }
}
