use super::*;
use error::CaptureFieldErr;

/// The outcome of decoding a structurally sound bundle.
#[derive(Debug)]
pub enum ValidBundle {
    Valid(Bundle),
    /// The bundle decoded, but breaks the listed rules
    Invalid(Bundle, Vec<Error>),
}

impl ValidBundle {
    /// Decodes one bundle from the start of `data`, returning it with the number of bytes consumed.
    ///
    /// Structural failures are an `Err`. CRCs are checked against the received
    /// bytes, so a bundle sent in a non-canonical encoding still verifies.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), Error> {
        let ((bundle, crc_errors), len) = cbor::decode::parse_array(data, |a, _| {
            let mut crc_errors = Vec::new();

            let primary = a
                .parse_value(|value, start, _| match value {
                    cbor::decode::Value::Array(block) => PrimaryBlock::parse(data, start, block),
                    value => Err(cbor::decode::Error::IncorrectType(
                        "Array".to_string(),
                        value.type_name(),
                    )
                    .into()),
                })
                .map(|(primary, crc_check)| {
                    if let Err(source) = crc_check {
                        crc_errors.push(Error::InvalidCrc {
                            block_number: 0,
                            source,
                        });
                    }
                    primary
                })
                .map_field_err("primary block")?;

            let mut blocks = Vec::new();
            while let Some((block, crc_check)) = a
                .try_parse_value(|value, start, _| match value {
                    cbor::decode::Value::Array(block) => {
                        block::CanonicalBlock::parse(data, start, block)
                    }
                    value => Err(cbor::decode::Error::IncorrectType(
                        "Array".to_string(),
                        value.type_name(),
                    )
                    .into()),
                })
                .map_field_err("canonical block")?
            {
                if let Err(source) = crc_check {
                    crc_errors.push(Error::InvalidCrc {
                        block_number: block.block_number,
                        source,
                    });
                }
                blocks.push(block);
            }

            Ok::<_, Error>((Bundle { primary, blocks }, crc_errors))
        })?;

        let mut errors = bundle.check_structure();
        errors.extend(crc_errors);
        if errors.is_empty() {
            Ok((ValidBundle::Valid(bundle), len))
        } else {
            Ok((ValidBundle::Invalid(bundle, errors), len))
        }
    }
}

impl Bundle {
    /// Decodes `data`, which must hold exactly one valid bundle.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        match ValidBundle::parse(data)? {
            (ValidBundle::Valid(bundle), len) if len == data.len() => Ok(bundle),
            (ValidBundle::Valid(_), _) => Err(Error::AdditionalData),
            (ValidBundle::Invalid(bundle, errors), _) => Err(Error::InvalidBundle {
                bundle: Box::new(bundle),
                errors,
            }),
        }
    }
}
