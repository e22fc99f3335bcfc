use thiserror::Error;

/// Nesting limit applied when walking arbitrary input
pub const MAX_DEPTH: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Need at least {0} more bytes of data")]
    NeedMoreData(usize),

    #[error("Invalid minor-type value {0}")]
    InvalidMinorValue(u8),

    #[error("Incorrect type, expecting {0}, found {1}")]
    IncorrectType(String, String),

    #[error("Chunked string contains an invalid chunk")]
    InvalidChunk,

    #[error("Invalid simple value {0}")]
    InvalidSimpleValue(u8),

    #[error("Unexpected break marker")]
    UnexpectedBreak,

    #[error("Value is too long to be held in memory")]
    TooLong,

    #[error("Maximum nesting depth exceeded")]
    MaxRecursion,

    #[error("Array has fewer items than expected")]
    NotEnoughItems,

    #[error("Array has additional items")]
    AdditionalItems,

    #[error(transparent)]
    InvalidUtf8(#[from] core::str::Utf8Error),
}

pub trait FromCbor: Sized {
    type Error: From<Error>;

    /// Parses one item from the start of `data`, returning the value and the number of bytes consumed
    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error>;
}

pub enum Value<'a, 'b> {
    UnsignedInteger(u64),
    NegativeInteger(u64),
    Bytes(&'a [u8]),
    ByteStream(Vec<&'a [u8]>),
    Text(&'a str),
    TextStream(Vec<&'a str>),
    Array(&'b mut Array<'a>),
    Map(&'b mut Array<'a>),
    False,
    True,
    Null,
    Undefined,
    Simple(u8),
    Float(f64),
}

impl Value<'_, '_> {
    pub fn type_name(&self) -> String {
        match self {
            Value::UnsignedInteger(_) => "Unsigned Integer",
            Value::NegativeInteger(_) => "Negative Integer",
            Value::Bytes(_) => "Byte String",
            Value::ByteStream(_) => "Indefinite-length Byte String",
            Value::Text(_) => "Text String",
            Value::TextStream(_) => "Indefinite-length Text String",
            Value::Array(a) if a.is_definite() => "Array",
            Value::Array(_) => "Indefinite-length Array",
            Value::Map(_) => "Map",
            Value::False | Value::True => "Boolean",
            Value::Null => "Null",
            Value::Undefined => "Undefined",
            Value::Simple(_) => "Simple Value",
            Value::Float(_) => "Float",
        }
        .to_string()
    }

    /// Consumes any nested content so the enclosing array can continue
    pub fn skip(&mut self, max_depth: usize) -> Result<(), Error> {
        match self {
            Value::Array(a) | Value::Map(a) => {
                if max_depth == 0 {
                    return Err(Error::MaxRecursion);
                }
                a.depth = a.depth.min(max_depth);
                a.skip_to_end()
            }
            _ => Ok(()),
        }
    }
}

impl core::fmt::Debug for Value<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::UnsignedInteger(v) => write!(f, "{v}"),
            Value::NegativeInteger(v) => write!(f, "-{}", *v as u128 + 1),
            Value::Bytes(b) => write!(f, "h'{}'", hex(b)),
            Value::ByteStream(chunks) => {
                f.write_str("(_ ")?;
                for (i, b) in chunks.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "h'{}'", hex(b))?;
                }
                f.write_str(")")
            }
            Value::Text(s) => write!(f, "{s:?}"),
            Value::TextStream(chunks) => write!(f, "(_ {chunks:?})"),
            Value::Array(a) => write!(f, "[{:?} items]", a.count()),
            Value::Map(a) => write!(f, "{{{:?} items}}", a.count().map(|c| c / 2)),
            Value::False => f.write_str("false"),
            Value::True => f.write_str("true"),
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Simple(v) => write!(f, "simple({v})"),
            Value::Float(v) => write!(f, "{v:?}"),
        }
    }
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

/// A cursor over the items of a CBOR array (or the key/value items of a map).
pub struct Array<'a> {
    data: &'a [u8],
    offset: usize,
    count: Option<usize>,
    definite: bool,
    idx: usize,
    depth: usize,
}

impl<'a> Array<'a> {
    fn new(data: &'a [u8], offset: usize, count: Option<usize>, depth: usize) -> Self {
        Self {
            data,
            offset,
            count,
            definite: count.is_some(),
            idx: 0,
            depth,
        }
    }

    pub fn is_definite(&self) -> bool {
        self.definite
    }

    /// The number of items, once known
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Offset of the next item within the buffer being parsed
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn check_for_end(&mut self) -> Result<bool, Error> {
        match self.count {
            Some(count) => Ok(self.idx >= count),
            None => match self.data.get(self.offset) {
                None => Err(Error::NeedMoreData(1)),
                Some(0xFF) => {
                    self.offset += 1;
                    self.count = Some(self.idx);
                    Ok(true)
                }
                Some(_) => Ok(false),
            },
        }
    }

    /// Returns the end offset if all items have been consumed
    pub fn end(&mut self) -> Result<Option<usize>, Error> {
        if self.check_for_end()? {
            Ok(Some(self.offset))
        } else {
            Ok(None)
        }
    }

    /// Like `end`, but additional items are an error
    pub fn complete(&mut self) -> Result<usize, Error> {
        self.end()?.ok_or(Error::AdditionalItems)
    }

    pub fn try_parse_value<T, F, E>(&mut self, f: F) -> Result<Option<T>, E>
    where
        F: FnOnce(Value<'a, '_>, usize, &[u64]) -> Result<T, E>,
        E: From<Error>,
    {
        if self.check_for_end()? {
            return Ok(None);
        }
        let start = self.offset;
        let (v, len) = parse_value_at(self.data, start, self.depth, |value, tags| {
            f(value, start, tags)
        })?;
        self.offset = start + len;
        self.idx += 1;
        Ok(Some(v))
    }

    pub fn parse_value<T, F, E>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(Value<'a, '_>, usize, &[u64]) -> Result<T, E>,
        E: From<Error>,
    {
        self.try_parse_value(f)?
            .ok_or_else(|| Error::NotEnoughItems.into())
    }

    pub fn try_parse<T>(&mut self) -> Result<Option<T>, T::Error>
    where
        T: FromCbor,
    {
        if self.check_for_end()? {
            return Ok(None);
        }
        let (v, len) = T::from_cbor(&self.data[self.offset..])?;
        self.offset += len;
        self.idx += 1;
        Ok(Some(v))
    }

    pub fn parse<T>(&mut self) -> Result<T, T::Error>
    where
        T: FromCbor,
    {
        self.try_parse::<T>()?
            .ok_or_else(|| Error::NotEnoughItems.into())
    }

    pub fn skip_value(&mut self) -> Result<bool, Error> {
        let depth = self.depth;
        self.try_parse_value(|mut value, _, _| value.skip(depth))
            .map(|o| o.is_some())
    }

    pub fn skip_to_end(&mut self) -> Result<(), Error> {
        while self.skip_value()? {}
        Ok(())
    }
}

fn read_be<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], Error> {
    data.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::NeedMoreData(offset + N - data.len()))
}

/// Parses the initial byte and argument of an item at `offset`.
///
/// Returns `(major, minor, argument, header length)`; the argument is `None` for
/// indefinite-length items and for the simple/float minors of major type 7.
fn parse_header(data: &[u8], offset: usize) -> Result<(u8, u8, Option<u64>, usize), Error> {
    let Some(&initial) = data.get(offset) else {
        return Err(Error::NeedMoreData(1));
    };
    let (major, minor) = (initial >> 5, initial & 0x1F);
    if major == 7 {
        return Ok((major, minor, None, 1));
    }
    let o = offset + 1;
    match minor {
        0..=23 => Ok((major, minor, Some(minor as u64), 1)),
        24 => Ok((major, minor, Some(read_be::<1>(data, o)?[0] as u64), 2)),
        25 => Ok((
            major,
            minor,
            Some(u16::from_be_bytes(read_be(data, o)?) as u64),
            3,
        )),
        26 => Ok((
            major,
            minor,
            Some(u32::from_be_bytes(read_be(data, o)?) as u64),
            5,
        )),
        27 => Ok((major, minor, Some(u64::from_be_bytes(read_be(data, o)?)), 9)),
        31 if matches!(major, 2..=5) => Ok((major, minor, None, 1)),
        _ => Err(Error::InvalidMinorValue(minor)),
    }
}

fn definite_slice(data: &[u8], offset: usize, len: u64) -> Result<&[u8], Error> {
    let len = usize::try_from(len).map_err(|_| Error::TooLong)?;
    let end = offset.checked_add(len).ok_or(Error::TooLong)?;
    data.get(offset..end)
        .ok_or_else(|| Error::NeedMoreData(end - data.len()))
}

/// Collects the chunks of an indefinite-length string of `major` type.
fn parse_chunks(data: &[u8], mut offset: usize, major: u8) -> Result<(Vec<&[u8]>, usize), Error> {
    let mut chunks = Vec::new();
    loop {
        match data.get(offset) {
            None => return Err(Error::NeedMoreData(1)),
            Some(0xFF) => return Ok((chunks, offset + 1)),
            Some(_) => {
                let (m, _, arg, hdr) = parse_header(data, offset)?;
                let Some(len) = arg.filter(|_| m == major) else {
                    return Err(Error::InvalidChunk);
                };
                let chunk = definite_slice(data, offset + hdr, len)?;
                offset += hdr + chunk.len();
                chunks.push(chunk);
            }
        }
    }
}

fn parse_value_at<'a, T, F, E>(
    data: &'a [u8],
    start: usize,
    depth: usize,
    f: F,
) -> Result<(T, usize), E>
where
    F: FnOnce(Value<'a, '_>, &[u64]) -> Result<T, E>,
    E: From<Error>,
{
    let mut offset = start;
    let mut tags = Vec::new();
    loop {
        let (major, _, arg, hdr) = parse_header(data, offset)?;
        if major != 6 {
            break;
        }
        // Tags always carry a definite argument
        tags.push(arg.ok_or(Error::InvalidMinorValue(31))?);
        offset += hdr;
    }

    let (major, minor, arg, hdr) = parse_header(data, offset)?;
    offset += hdr;

    let v = match (major, arg) {
        (0, Some(v)) => {
            let r = f(Value::UnsignedInteger(v), &tags)?;
            (r, offset)
        }
        (1, Some(v)) => {
            let r = f(Value::NegativeInteger(v), &tags)?;
            (r, offset)
        }
        (2, Some(len)) => {
            let b = definite_slice(data, offset, len)?;
            let r = f(Value::Bytes(b), &tags)?;
            (r, offset + b.len())
        }
        (2, None) => {
            let (chunks, end) = parse_chunks(data, offset, 2)?;
            (f(Value::ByteStream(chunks), &tags)?, end)
        }
        (3, Some(len)) => {
            let b = definite_slice(data, offset, len)?;
            let s = core::str::from_utf8(b).map_err(Error::from)?;
            (f(Value::Text(s), &tags)?, offset + b.len())
        }
        (3, None) => {
            let (chunks, end) = parse_chunks(data, offset, 3)?;
            let chunks = chunks
                .into_iter()
                .map(core::str::from_utf8)
                .collect::<Result<Vec<_>, _>>()
                .map_err(Error::from)?;
            (f(Value::TextStream(chunks), &tags)?, end)
        }
        (4 | 5, count) => {
            if depth == 0 {
                return Err(Error::MaxRecursion.into());
            }
            let count = match count {
                Some(c) => {
                    let c = usize::try_from(c).map_err(|_| Error::TooLong)?;
                    Some(if major == 5 {
                        c.checked_mul(2).ok_or(Error::TooLong)?
                    } else {
                        c
                    })
                }
                None => None,
            };
            let mut a = Array::new(data, offset, count, depth - 1);
            let r = if major == 4 {
                f(Value::Array(&mut a), &tags)?
            } else {
                f(Value::Map(&mut a), &tags)?
            };
            let end = a.complete()?;
            (r, end)
        }
        (7, _) => {
            let value = match minor {
                20 => Value::False,
                21 => Value::True,
                22 => Value::Null,
                23 => Value::Undefined,
                0..=19 => Value::Simple(minor),
                24 => {
                    let v = read_be::<1>(data, offset)?[0];
                    if v < 32 {
                        return Err(Error::InvalidSimpleValue(v).into());
                    }
                    offset += 1;
                    Value::Simple(v)
                }
                25 => {
                    let v = half::f16::from_be_bytes(read_be(data, offset)?);
                    offset += 2;
                    Value::Float(v.to_f64())
                }
                26 => {
                    let v = f32::from_be_bytes(read_be(data, offset)?);
                    offset += 4;
                    Value::Float(v as f64)
                }
                27 => {
                    let v = f64::from_be_bytes(read_be(data, offset)?);
                    offset += 8;
                    Value::Float(v)
                }
                31 => return Err(Error::UnexpectedBreak.into()),
                m => return Err(Error::InvalidMinorValue(m).into()),
            };
            (f(value, &tags)?, offset)
        }
        _ => return Err(Error::InvalidMinorValue(minor).into()),
    };
    Ok((v.0, v.1 - start))
}

/// Parses a single item from the start of `data`, returning the result of `f` and the item length
pub fn parse_value<'a, T, F, E>(data: &'a [u8], f: F) -> Result<(T, usize), E>
where
    F: FnOnce(Value<'a, '_>, &[u64]) -> Result<T, E>,
    E: From<Error>,
{
    parse_value_at(data, 0, MAX_DEPTH, f)
}

/// Parses an array from the start of `data`; `f` must consume every item
pub fn parse_array<'a, T, F, E>(data: &'a [u8], f: F) -> Result<(T, usize), E>
where
    F: FnOnce(&mut Array<'a>, &[u64]) -> Result<T, E>,
    E: From<Error>,
{
    parse_value(data, |value, tags| match value {
        Value::Array(a) => f(a, tags),
        value => Err(Error::IncorrectType("Array".to_string(), value.type_name()).into()),
    })
}

pub fn parse<T>(data: &[u8]) -> Result<(T, usize), T::Error>
where
    T: FromCbor,
{
    T::from_cbor(data)
}

/// Returns the length of the first complete item in `data` without interpreting it
pub fn item_length(data: &[u8]) -> Result<usize, Error> {
    parse_value(data, |mut value, _| value.skip(MAX_DEPTH)).map(|((), len)| len)
}

impl FromCbor for u64 {
    type Error = Error;

    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error> {
        parse_value(data, |value, tags| match value {
            Value::UnsignedInteger(v) if tags.is_empty() => Ok(v),
            value => Err(Error::IncorrectType(
                "Untagged Unsigned Integer".to_string(),
                value.type_name(),
            )),
        })
    }
}

impl FromCbor for bool {
    type Error = Error;

    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error> {
        parse_value(data, |value, _| match value {
            Value::False => Ok(false),
            Value::True => Ok(true),
            value => Err(Error::IncorrectType(
                "Boolean".to_string(),
                value.type_name(),
            )),
        })
    }
}

impl FromCbor for Box<[u8]> {
    type Error = Error;

    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error> {
        parse_value(data, |value, _| match value {
            Value::Bytes(b) => Ok(b.into()),
            Value::ByteStream(chunks) => Ok(chunks.concat().into()),
            value => Err(Error::IncorrectType(
                "Byte String".to_string(),
                value.type_name(),
            )),
        })
    }
}

impl FromCbor for String {
    type Error = Error;

    fn from_cbor(data: &[u8]) -> Result<(Self, usize), Self::Error> {
        parse_value(data, |value, _| match value {
            Value::Text(s) => Ok(s.to_string()),
            Value::TextStream(chunks) => Ok(chunks.concat()),
            value => Err(Error::IncorrectType(
                "Text String".to_string(),
                value.type_name(),
            )),
        })
    }
}
