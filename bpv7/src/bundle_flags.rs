#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BundleFlags {
    pub is_fragment: bool,
    pub is_admin_record: bool,
    pub do_not_fragment: bool,
    pub app_ack_requested: bool,
    pub report_status_time: bool,
    pub receipt_report_requested: bool,
    pub forward_report_requested: bool,
    pub delivery_report_requested: bool,
    pub delete_report_requested: bool,
    pub unrecognised: u64,
}

impl From<u64> for BundleFlags {
    fn from(value: u64) -> Self {
        let mut flags = Self::default();
        for b in 0..u64::BITS {
            if value & (1 << b) != 0 {
                match b {
                    0 => flags.is_fragment = true,
                    1 => flags.is_admin_record = true,
                    2 => flags.do_not_fragment = true,
                    5 => flags.app_ack_requested = true,
                    6 => flags.report_status_time = true,
                    14 => flags.receipt_report_requested = true,
                    16 => flags.forward_report_requested = true,
                    17 => flags.delivery_report_requested = true,
                    18 => flags.delete_report_requested = true,
                    b => flags.unrecognised |= 1 << b,
                }
            }
        }
        flags
    }
}

impl From<BundleFlags> for u64 {
    fn from(value: BundleFlags) -> Self {
        let mut flags = value.unrecognised;
        if value.is_fragment {
            flags |= 1 << 0;
        }
        if value.is_admin_record {
            flags |= 1 << 1;
        }
        if value.do_not_fragment {
            flags |= 1 << 2;
        }
        if value.app_ack_requested {
            flags |= 1 << 5;
        }
        if value.report_status_time {
            flags |= 1 << 6;
        }
        if value.receipt_report_requested {
            flags |= 1 << 14;
        }
        if value.forward_report_requested {
            flags |= 1 << 16;
        }
        if value.delivery_report_requested {
            flags |= 1 << 17;
        }
        if value.delete_report_requested {
            flags |= 1 << 18;
        }
        flags
    }
}

impl crate::cbor::encode::ToCbor for BundleFlags {
    fn to_cbor(&self, encoder: &mut crate::cbor::encode::Encoder) {
        encoder.emit(&u64::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits() {
        let flags = BundleFlags::from((1u64 << 0) | (1 << 2) | (1 << 17));
        assert!(flags.is_fragment);
        assert!(!flags.is_admin_record);
        assert!(flags.do_not_fragment);
        assert!(flags.delivery_report_requested);
        assert_eq!(flags.unrecognised, 0);

        let raw: u64 = (1 << 1) | (1 << 3) | (1 << 14) | (1 << 63);
        let flags = BundleFlags::from(raw);
        assert!(flags.is_admin_record);
        assert!(flags.receipt_report_requested);
        assert_eq!(flags.unrecognised, (1 << 3) | (1 << 63));
        assert_eq!(u64::from(flags), raw);
    }
}
