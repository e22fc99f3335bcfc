use super::*;
use hex_literal::hex;

fn parse(data: &[u8]) -> Result<Eid, Error> {
    cbor::decode::parse::<Eid>(data).map(|(eid, len)| {
        assert_eq!(len, data.len());
        eid
    })
}

fn expect_error(data: &[u8]) -> Error {
    match parse(data) {
        Ok(eid) => panic!("Parsed as {eid:?}"),
        Err(e) => e,
    }
}

#[test]
fn tests() {
    // Positive tests
    assert_eq!(parse(&hex!("82 01 00")).unwrap(), Eid::Null);
    assert_eq!(
        parse(&hex!("82 02 82 05 02")).unwrap(),
        Eid::ipn(5, 2).unwrap()
    );
    assert_eq!(
        parse(&hex!("82 02 82 1A 000EE868 01")).unwrap(),
        Eid::ipn(977000, 1).unwrap()
    );
    assert_eq!(
        parse(&hex!("82 01 65 6E6F646531")).unwrap(),
        Eid::dtn("node1").unwrap()
    );
    assert_eq!(
        parse(&hex!("82 01 7F 63 6E6F64 62 6531 FF")).unwrap(),
        Eid::dtn("node1").unwrap()
    );

    // Negative tests
    assert!(matches!(
        expect_error(&[]),
        Error::InvalidCBOR(cbor::decode::Error::NeedMoreData(1))
    ));
    assert!(matches!(
        expect_error(&hex!("82 01 01")),
        Error::InvalidField {
            field: "'dtn' scheme-specific part",
            ..
        }
    ));
    assert!(matches!(
        expect_error(&hex!("82 01 82 01 01")),
        Error::InvalidField {
            field: "'dtn' scheme-specific part",
            ..
        }
    ));
    assert!(matches!(
        expect_error(&hex!("82 02 65 6E6F646531")),
        Error::InvalidField {
            field: "'ipn' scheme-specific part",
            ..
        }
    ));
    assert!(matches!(
        expect_error(&hex!("82 02 81 01")),
        Error::InvalidField {
            field: "ipn service number",
            ..
        }
    ));
    assert!(matches!(
        expect_error(&hex!("82 02 83 01 01 01")),
        Error::InvalidField {
            field: "'ipn' scheme-specific part",
            ..
        }
    ));
    assert!(matches!(
        expect_error(&hex!("82 03 00")),
        Error::UnsupportedScheme(3)
    ));
    assert!(matches!(
        expect_error(&hex!("82 00 00")),
        Error::UnsupportedScheme(0)
    ));
    assert!(matches!(
        expect_error(&hex!("83 01 00 00")),
        Error::InvalidCBOR(cbor::decode::Error::AdditionalItems)
    ));
}

#[test]
fn invalid_values_decode() {
    let eid = parse(&hex!("82 01 64 6E6F6E65")).unwrap();
    assert_eq!(
        eid,
        Eid::Dtn {
            name: "none".into()
        }
    );
    assert!(matches!(eid.check_valid(), Err(Error::DtnNoneName)));

    let eid = parse(&hex!("82 01 60")).unwrap();
    assert!(matches!(eid.check_valid(), Err(Error::DtnEmptyName)));

    let eid = parse(&hex!("82 02 82 00 01")).unwrap();
    assert_eq!(
        eid,
        Eid::Ipn {
            node_number: 0,
            service_number: 1
        }
    );
    assert!(matches!(
        eid.check_valid(),
        Err(Error::IpnInvalidNodeNumber(0))
    ));

    let eid = parse(&hex!("82 02 82 01 00")).unwrap();
    assert!(matches!(
        eid.check_valid(),
        Err(Error::IpnInvalidServiceNumber(0))
    ));
}

#[test]
fn encoding() {
    assert_eq!(*cbor::encode::emit(&Eid::Null), hex!("82 01 00"));
    assert_eq!(
        *cbor::encode::emit(&Eid::ipn(5, 2).unwrap()),
        hex!("82 02 82 05 02")
    );
    assert_eq!(
        *cbor::encode::emit(&Eid::dtn("node1").unwrap()),
        hex!("82 01 65 6E6F646531")
    );

    for eid in ["dtn:none", "dtn:node1", "ipn:977000.1", "ipn:1.18446744073709551615"] {
        let eid: Eid = eid.parse().unwrap();
        assert_eq!(parse(&cbor::encode::emit(&eid)).unwrap(), eid);
    }
}
