use super::*;
use winnow::{
    ModalResult, Parser,
    combinator::{preceded, terminated},
    token::take_while,
};

fn parse_scheme<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    terminated(take_while(1.., |c: char| c.is_ascii_alphanumeric()), ":").parse_next(input)
}

fn parse_parts<'s>(input: &mut &'s str) -> ModalResult<(&'s str, &'s str)> {
    (parse_scheme, take_while(1.., |_: char| true)).parse_next(input)
}

/// A decimal number in canonical form, so "01" is rejected
fn parse_number(input: &mut &str) -> ModalResult<u64> {
    take_while(1.., |c: char| c.is_ascii_digit())
        .verify(|s: &str| s == "0" || !s.starts_with('0'))
        .try_map(str::parse::<u64>)
        .parse_next(input)
}

fn parse_ipn(input: &mut &str) -> ModalResult<(u64, u64)> {
    (parse_number, preceded(".", parse_number)).parse_next(input)
}

impl core::str::FromStr for Eid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, ssp) = parse_parts
            .parse(s)
            .map_err(|e| Error::ParseError(e.to_string()))?;

        match scheme {
            "dtn" if ssp == "none" => Ok(Eid::Null),
            "dtn" => Eid::dtn(ssp),
            "ipn" => {
                let (node_number, service_number) = parse_ipn
                    .parse(ssp)
                    .map_err(|e| Error::ParseError(e.to_string()))?;
                Eid::ipn(node_number, service_number)
            }
            scheme => Err(Error::UnknownScheme(scheme.to_string())),
        }
    }
}

impl TryFrom<&str> for Eid {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Eid {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
