use super::*;
use error::CaptureFieldErr;

mod error;
mod parse;

pub use error::Error;


#[cfg(test)]
mod cbor_tests;

/// CBOR scheme code of the `dtn` URI scheme
pub const DTN_SCHEME: u64 = 1;

/// CBOR scheme code of the `ipn` URI scheme
pub const IPN_SCHEME: u64 = 2;

/// A bundle endpoint identifier.
///
/// The variant fixes the scheme, and so the shape of the scheme-specific part.
#[derive(Default, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
pub enum Eid {
    /// `dtn:none`
    #[default]
    Null,
    Dtn {
        name: Box<str>,
    },
    Ipn {
        node_number: u64,
        service_number: u64,
    },
}

impl Eid {
    pub fn null() -> Self {
        Self::Null
    }

    /// Returns `true` if the Eid is the 'null endpoint'.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Eid::Null)
    }

    pub fn dtn(name: &str) -> Result<Self, Error> {
        match name {
            "" => Err(Error::DtnEmptyName),
            "none" => Err(Error::DtnNoneName),
            name => Ok(Eid::Dtn { name: name.into() }),
        }
    }

    pub fn ipn(node_number: u64, service_number: u64) -> Result<Self, Error> {
        if node_number == 0 {
            Err(Error::IpnInvalidNodeNumber(node_number))
        } else if service_number == 0 {
            Err(Error::IpnInvalidServiceNumber(service_number))
        } else {
            Ok(Eid::Ipn {
                node_number,
                service_number,
            })
        }
    }

    pub fn scheme(&self) -> u64 {
        match self {
            Eid::Null | Eid::Dtn { .. } => DTN_SCHEME,
            Eid::Ipn { .. } => IPN_SCHEME,
        }
    }

    /// Checks the scheme constraints of an explicitly constructed Eid
    pub fn check_valid(&self) -> Result<(), Error> {
        match self {
            Eid::Null => Ok(()),
            Eid::Dtn { name } => Eid::dtn(name).map(|_| ()),
            Eid::Ipn {
                node_number,
                service_number,
            } => Eid::ipn(*node_number, *service_number).map(|_| ()),
        }
    }
}

impl cbor::encode::ToCbor for Eid {
    fn to_cbor(&self, encoder: &mut cbor::encode::Encoder) {
        match self {
            Eid::Null => encoder.emit(&(DTN_SCHEME, 0u64)),
            Eid::Dtn { name } => encoder.emit(&(DTN_SCHEME, &**name)),
            Eid::Ipn {
                node_number,
                service_number,
            } => encoder.emit(&(IPN_SCHEME, [*node_number, *service_number])),
        }
    }
}

/// Decoding rejects only malformed shapes; `check_valid` reports bad values.
impl cbor::decode::FromCbor for Eid {
    type Error = Error;

    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error> {
        cbor::decode::parse_array(data, |a, _| {
            match a.parse::<u64>().map_field_err("EID scheme")? {
                DTN_SCHEME => match a.parse_value(|value, _, _| match value {
                    cbor::decode::Value::UnsignedInteger(0) => Ok(Eid::Null),
                    cbor::decode::Value::Text(s) => Ok(Eid::Dtn { name: s.into() }),
                    cbor::decode::Value::TextStream(chunks) => Ok(Eid::Dtn {
                        name: chunks.concat().into(),
                    }),
                    value => Err(cbor::decode::Error::IncorrectType(
                        "Text String or 0".to_string(),
                        value.type_name(),
                    )
                    .into()),
                }) {
                    Err(Error::InvalidCBOR(e)) => {
                        Err(e).map_field_err("'dtn' scheme-specific part")
                    }
                    r => r,
                },
                IPN_SCHEME => match a.parse_value(|value, _, _| match value {
                    cbor::decode::Value::Array(a) => {
                        let node_number = a.parse::<u64>().map_field_err("ipn node number")?;
                        let service_number =
                            a.parse::<u64>().map_field_err("ipn service number")?;
                        Ok(Eid::Ipn {
                            node_number,
                            service_number,
                        })
                    }
                    value => Err(cbor::decode::Error::IncorrectType(
                        "Array".to_string(),
                        value.type_name(),
                    )
                    .into()),
                }) {
                    Err(Error::InvalidCBOR(e)) => {
                        Err(e).map_field_err("'ipn' scheme-specific part")
                    }
                    r => r,
                },
                scheme => Err(Error::UnsupportedScheme(scheme)),
            }
        })
    }
}

impl From<Eid> for String {
    fn from(value: Eid) -> Self {
        value.to_string()
    }
}

impl core::fmt::Display for Eid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Eid::Null => f.write_str("dtn:none"),
            Eid::Dtn { name } => write!(f, "dtn:{name}"),
            Eid::Ipn {
                node_number,
                service_number,
            } => write!(f, "ipn:{node_number}.{service_number}"),
        }
    }
}
