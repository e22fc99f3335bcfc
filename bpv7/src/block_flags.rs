#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlockFlags {
    pub must_replicate: bool,
    pub report_on_failure: bool,
    pub delete_bundle_on_failure: bool,
    pub delete_block_on_failure: bool,
    pub unrecognised: u64,
}

impl From<BlockFlags> for u64 {
    fn from(value: BlockFlags) -> Self {
        let mut flags = value.unrecognised;
        if value.must_replicate {
            flags |= 1 << 0;
        }
        if value.report_on_failure {
            flags |= 1 << 1;
        }
        if value.delete_bundle_on_failure {
            flags |= 1 << 2;
        }
        if value.delete_block_on_failure {
            flags |= 1 << 4;
        }
        flags
    }
}

impl From<u64> for BlockFlags {
    fn from(value: u64) -> Self {
        let mut flags = Self::default();
        for b in 0..u64::BITS {
            if value & (1 << b) != 0 {
                match b {
                    0 => flags.must_replicate = true,
                    1 => flags.report_on_failure = true,
                    2 => flags.delete_bundle_on_failure = true,
                    4 => flags.delete_block_on_failure = true,
                    b => flags.unrecognised |= 1 << b,
                }
            }
        }
        flags
    }
}

impl crate::cbor::encode::ToCbor for BlockFlags {
    fn to_cbor(&self, encoder: &mut crate::cbor::encode::Encoder) {
        encoder.emit(&u64::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits() {
        let flags = BlockFlags::from(0b10110u64);
        assert!(!flags.must_replicate);
        assert!(flags.report_on_failure);
        assert!(flags.delete_bundle_on_failure);
        assert!(flags.delete_block_on_failure);
        assert_eq!(flags.unrecognised, 0);

        let raw: u64 = (1 << 3) | (1 << 40) | 1;
        let flags = BlockFlags::from(raw);
        assert!(flags.must_replicate);
        assert_eq!(flags.unrecognised, (1 << 3) | (1 << 40));
        assert_eq!(u64::from(flags), raw);
    }
}
