use core::ops::Range;

pub trait ToCbor {
    fn to_cbor(&self, encoder: &mut Encoder);
}

/// A CBOR byte string, as opposed to an array of small integers.
pub struct Bytes<'a>(pub &'a [u8]);

/// Pre-encoded CBOR, copied verbatim.
pub struct Raw<'a>(pub &'a [u8]);

#[derive(Default)]
pub struct Encoder {
    data: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn offset(&self) -> usize {
        self.data.len()
    }

    fn emit_uint_minor(&mut self, major: u8, val: u64) {
        if val < 24 {
            self.data.push((major << 5) | (val as u8))
        } else if val <= u8::MAX as u64 {
            self.data.push((major << 5) | 24);
            self.data.push(val as u8)
        } else if val <= u16::MAX as u64 {
            self.data.push((major << 5) | 25);
            self.data.extend((val as u16).to_be_bytes())
        } else if val <= u32::MAX as u64 {
            self.data.push((major << 5) | 26);
            self.data.extend((val as u32).to_be_bytes())
        } else {
            self.data.push((major << 5) | 27);
            self.data.extend(val.to_be_bytes())
        }
    }

    pub fn emit<T>(&mut self, value: &T)
    where
        T: ToCbor + ?Sized,
    {
        value.to_cbor(self)
    }

    /// Emits a byte string and returns the range of its content within the output.
    pub fn emit_bytes(&mut self, data: &[u8]) -> Range<usize> {
        self.emit_uint_minor(2, data.len() as u64);
        let start = self.data.len();
        self.data.extend_from_slice(data);
        start..self.data.len()
    }

    pub fn emit_raw(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data)
    }

    pub fn emit_array<F>(&mut self, count: Option<usize>, f: F)
    where
        F: FnOnce(&mut Array),
    {
        let mut a = Array::new(self, count);
        f(&mut a);
        a.end()
    }
}

pub struct Array<'a> {
    encoder: &'a mut Encoder,
    count: Option<usize>,
    idx: usize,
}

impl<'a> Array<'a> {
    fn new(encoder: &'a mut Encoder, count: Option<usize>) -> Self {
        match count {
            Some(count) => encoder.emit_uint_minor(4, count as u64),
            None => encoder.data.push((4 << 5) | 31),
        }
        Self {
            encoder,
            count,
            idx: 0,
        }
    }

    fn next_field(&mut self) -> &mut Encoder {
        self.idx += 1;
        if let Some(count) = self.count {
            if self.idx > count {
                panic!("Too many items added to definite length array")
            }
        }
        self.encoder
    }

    fn end(self) {
        match self.count {
            None => self.encoder.data.push(0xFF),
            Some(count) if self.idx != count => panic!(
                "Definite length array is short of items: {}, expected {count}",
                self.idx
            ),
            _ => {}
        }
    }

    /// Offset of the next item within the underlying encoder
    pub fn offset(&self) -> usize {
        self.encoder.offset()
    }

    /// Counts an item that the caller will append with `Encoder::emit_raw` after the array is closed.
    pub fn skip_value(&mut self) {
        self.next_field();
    }

    pub fn emit<T>(&mut self, value: &T)
    where
        T: ToCbor + ?Sized,
    {
        self.next_field().emit(value)
    }

    pub fn emit_bytes(&mut self, data: &[u8]) -> Range<usize> {
        self.next_field().emit_bytes(data)
    }

    pub fn emit_raw(&mut self, data: &[u8]) {
        self.next_field().emit_raw(data)
    }

    pub fn emit_array<F>(&mut self, count: Option<usize>, f: F)
    where
        F: FnOnce(&mut Array),
    {
        self.next_field().emit_array(count, f)
    }
}

pub fn emit<T>(value: &T) -> Vec<u8>
where
    T: ToCbor + ?Sized,
{
    let mut e = Encoder::new();
    e.emit(value);
    e.build()
}

pub fn emit_array<F>(count: Option<usize>, f: F) -> Vec<u8>
where
    F: FnOnce(&mut Array),
{
    let mut e = Encoder::new();
    e.emit_array(count, f);
    e.build()
}

impl<T> ToCbor for &T
where
    T: ToCbor + ?Sized,
{
    fn to_cbor(&self, encoder: &mut Encoder) {
        (**self).to_cbor(encoder)
    }
}

macro_rules! impl_uint_to_cbor {
    ($($ty:ty),*) => {
        $(
            impl ToCbor for $ty {
                fn to_cbor(&self, encoder: &mut Encoder) {
                    encoder.emit_uint_minor(0, *self as u64)
                }
            }
        )*
    };
}

impl_uint_to_cbor!(u8, u16, u32, u64, usize);

impl ToCbor for i64 {
    fn to_cbor(&self, encoder: &mut Encoder) {
        if *self >= 0 {
            encoder.emit_uint_minor(0, *self as u64)
        } else {
            encoder.emit_uint_minor(1, (-1 - *self) as u64)
        }
    }
}

impl ToCbor for bool {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.data.push(if *self { 0xF5 } else { 0xF4 })
    }
}

impl ToCbor for str {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_uint_minor(3, self.len() as u64);
        encoder.data.extend_from_slice(self.as_bytes())
    }
}

impl ToCbor for String {
    fn to_cbor(&self, encoder: &mut Encoder) {
        self.as_str().to_cbor(encoder)
    }
}

impl ToCbor for Bytes<'_> {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_bytes(self.0);
    }
}

impl ToCbor for Raw<'_> {
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_raw(self.0)
    }
}

impl<T> ToCbor for [T]
where
    T: ToCbor,
{
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_array(Some(self.len()), |a| {
            for v in self {
                a.emit(v);
            }
        })
    }
}

impl<T, const N: usize> ToCbor for [T; N]
where
    T: ToCbor,
{
    fn to_cbor(&self, encoder: &mut Encoder) {
        self.as_slice().to_cbor(encoder)
    }
}

impl<A, B> ToCbor for (A, B)
where
    A: ToCbor,
    B: ToCbor,
{
    fn to_cbor(&self, encoder: &mut Encoder) {
        encoder.emit_array(Some(2), |a| {
            a.emit(&self.0);
            a.emit(&self.1);
        })
    }
}
