use super::encode::*;
use hex_literal::hex;

#[test]
fn rfc_tests() {
    // RFC 8949, Appendix A:
    // https://www.rfc-editor.org/rfc/rfc8949.html#section-appendix.a

    assert_eq!(*emit(&0u64), hex!("00"));
    assert_eq!(*emit(&1u64), hex!("01"));
    assert_eq!(*emit(&10u64), hex!("0a"));
    assert_eq!(*emit(&23u64), hex!("17"));
    assert_eq!(*emit(&24u64), hex!("1818"));
    assert_eq!(*emit(&25u64), hex!("1819"));
    assert_eq!(*emit(&100u64), hex!("1864"));
    assert_eq!(*emit(&1000u64), hex!("1903e8"));
    assert_eq!(*emit(&1000000u64), hex!("1a000f4240"));
    assert_eq!(*emit(&1000000000000u64), hex!("1b000000e8d4a51000"));
    assert_eq!(*emit(&18446744073709551615u64), hex!("1bffffffffffffffff"));

    assert_eq!(*emit(&-1i64), hex!("20"));
    assert_eq!(*emit(&-10i64), hex!("29"));
    assert_eq!(*emit(&-100i64), hex!("3863"));
    assert_eq!(*emit(&-1000i64), hex!("3903e7"));

    assert_eq!(*emit(&false), hex!("f4"));
    assert_eq!(*emit(&true), hex!("f5"));

    assert_eq!(*emit(&Bytes(&[])), hex!("40"));
    assert_eq!(*emit(&Bytes(&hex!("01020304"))), hex!("4401020304"));
    assert_eq!(*emit(""), hex!("60"));
    assert_eq!(*emit("a"), hex!("6161"));
    assert_eq!(*emit("IETF"), hex!("6449455446"));
    assert_eq!(*emit("\"\\"), hex!("62225c"));
    assert_eq!(*emit("\u{00fc}"), hex!("62c3bc"));
    assert_eq!(*emit("\u{6c34}"), hex!("63e6b0b4"));

    assert_eq!(*emit::<[u64; 0]>(&[]), hex!("80"));
    assert_eq!(*emit(&[1u64, 2, 3]), hex!("83010203"));
    assert_eq!(
        *emit_array(Some(3), |a| {
            a.emit(&1u64);
            a.emit(&[2u64, 3]);
            a.emit(&[4u64, 5]);
        }),
        hex!("8301820203820405")
    );
    assert_eq!(
        *emit(&[
            1u64, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
            24, 25
        ]),
        hex!("98190102030405060708090a0b0c0d0e0f101112131415161718181819")
    );

    assert_eq!(*emit_array(None, |_| {}), hex!("9fff"));
    assert_eq!(
        *emit_array(None, |a| {
            a.emit(&1u64);
            a.emit(&[2u64, 3]);
            a.emit_array(None, |a| {
                a.emit(&4u64);
                a.emit(&5u64);
            });
        }),
        hex!("9f018202039f0405ffff")
    );
}

#[test]
fn bytes_range() {
    let mut e = Encoder::new();
    e.emit(&7u64);
    let range = e.emit_bytes(&hex!("aabbcc"));
    let data = e.build();
    assert_eq!(range, 2..5);
    assert_eq!(data[range], hex!("aabbcc"));
}

#[test]
fn skipped_value_is_appended_raw() {
    let mut e = Encoder::new();
    e.emit_array(Some(2), |a| {
        a.emit(&1u64);
        a.skip_value();
    });
    e.emit_raw(&hex!("420000"));
    assert_eq!(*e.build(), hex!("8201420000"));
}

#[test]
fn tuples() {
    assert_eq!(*emit(&(1u64, "x")), hex!("82016178"));
}

#[test]
#[should_panic]
fn definite_array_overflow() {
    emit_array(Some(1), |a| {
        a.emit(&1u64);
        a.emit(&2u64);
    });
}

#[test]
#[should_panic]
fn definite_array_short() {
    emit_array(Some(2), |a| {
        a.emit(&1u64);
    });
}
