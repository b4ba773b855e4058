//! Canonical CBOR codec for [`PlutusData`].
//!
//! The encoding matches the reference off-chain serializer byte for byte:
//!
//! | Value            | Encoding                                              |
//! |------------------|-------------------------------------------------------|
//! | `Constr` 0..=6   | tag 121 + i, fields as list                           |
//! | `Constr` 7..=127 | tag 1280 + (i - 7), fields as list                    |
//! | other `Constr`   | tag 102, definite array `[i, fields]`                 |
//! | `List`           | `0x80` when empty, else indefinite array `0x9f .. ff` |
//! | `Map`            | definite map                                          |
//! | `Bytes`          | definite when <= 64 bytes, else 64-byte chunks inside |
//! |                  | an indefinite byte string                             |
//! | `Integer`        | major type 0/1, bignum tags 2/3 beyond 64 bits        |
//!
//! Decoding is lenient about definite/indefinite lengths. Nesting deeper
//! than [`MAX_NESTING_DEPTH`] is rejected.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::ToPrimitive;

use crate::PrimitivesError;

use super::PlutusData;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;

const INDEFINITE: u8 = 31;
const BREAK: u8 = 0xff;

const TAG_POSITIVE_BIGNUM: u64 = 2;
const TAG_NEGATIVE_BIGNUM: u64 = 3;
const TAG_CONSTR_GENERAL: u64 = 102;
const TAG_CONSTR_SMALL: u64 = 121;
const TAG_CONSTR_LARGE: u64 = 1280;

/// Byte strings longer than this are chunked.
const BYTES_CHUNK_SIZE: usize = 64;

/// Deepest nesting of lists, maps and constructors the reader accepts.
pub const MAX_NESTING_DEPTH: usize = 256;

// ---------------------------------------------------------------------------
// CborWriter
// ---------------------------------------------------------------------------

/// A buffer-based CBOR writer.
pub struct CborWriter {
    buf: Vec<u8>,
}

impl CborWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        CborWriter { buf: Vec::new() }
    }

    /// Append an item head with the shortest argument encoding.
    pub fn write_head(&mut self, major: u8, value: u64) {
        let major = major << 5;
        if value < 24 {
            self.buf.push(major | value as u8);
        } else if value <= u8::MAX as u64 {
            self.buf.push(major | 24);
            self.buf.push(value as u8);
        } else if value <= u16::MAX as u64 {
            self.buf.push(major | 25);
            self.buf.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= u32::MAX as u64 {
            self.buf.push(major | 26);
            self.buf.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buf.push(major | 27);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    }

    /// Append a byte string, chunking values longer than 64 bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if bytes.len() <= BYTES_CHUNK_SIZE {
            self.write_head(MAJOR_BYTES, bytes.len() as u64);
            self.buf.extend_from_slice(bytes);
            return;
        }
        self.buf.push((MAJOR_BYTES << 5) | INDEFINITE);
        for chunk in bytes.chunks(BYTES_CHUNK_SIZE) {
            self.write_head(MAJOR_BYTES, chunk.len() as u64);
            self.buf.extend_from_slice(chunk);
        }
        self.buf.push(BREAK);
    }

    /// Append a signed integer.
    pub fn write_integer(&mut self, value: &BigInt) {
        // CBOR stores negative n as -1 - n.
        let (major, tag, magnitude) = match value.sign() {
            Sign::Minus => {
                let shifted: BigInt = -value - 1u32;
                (MAJOR_NEGATIVE, TAG_NEGATIVE_BIGNUM, shifted.magnitude().clone())
            }
            _ => (MAJOR_UNSIGNED, TAG_POSITIVE_BIGNUM, value.magnitude().clone()),
        };
        match magnitude.to_u64() {
            Some(v) => self.write_head(major, v),
            None => {
                self.write_head(MAJOR_TAG, tag);
                self.write_bytes(&magnitude.to_bytes_be());
            }
        }
    }

    fn write_list(&mut self, items: &[PlutusData]) {
        if items.is_empty() {
            self.write_head(MAJOR_ARRAY, 0);
            return;
        }
        self.buf.push((MAJOR_ARRAY << 5) | INDEFINITE);
        for item in items {
            self.write_data(item);
        }
        self.buf.push(BREAK);
    }

    /// Append a Plutus data value.
    pub fn write_data(&mut self, data: &PlutusData) {
        match data {
            PlutusData::Constr { tag, fields } => match *tag {
                0..=6 => {
                    self.write_head(MAJOR_TAG, TAG_CONSTR_SMALL + tag);
                    self.write_list(fields);
                }
                7..=127 => {
                    self.write_head(MAJOR_TAG, TAG_CONSTR_LARGE + (tag - 7));
                    self.write_list(fields);
                }
                _ => {
                    self.write_head(MAJOR_TAG, TAG_CONSTR_GENERAL);
                    self.write_head(MAJOR_ARRAY, 2);
                    self.write_head(MAJOR_UNSIGNED, *tag);
                    self.write_list(fields);
                }
            },
            PlutusData::Map(entries) => {
                self.write_head(MAJOR_MAP, entries.len() as u64);
                for (k, v) in entries {
                    self.write_data(k);
                    self.write_data(v);
                }
            }
            PlutusData::List(items) => self.write_list(items),
            PlutusData::Integer(i) => self.write_integer(i),
            PlutusData::Bytes(b) => self.write_bytes(b),
        }
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for CborWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// CborReader
// ---------------------------------------------------------------------------

/// A cursor-based CBOR reader.
pub struct CborReader<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

/// A decoded item head. `value` is `None` for indefinite lengths.
struct Head {
    major: u8,
    value: Option<u64>,
}

impl<'a> CborReader<'a> {
    /// Create a new reader over the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        CborReader { data, pos: 0, depth: 0 }
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes_raw(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_bytes_raw(1)?[0])
    }

    fn peek_break(&self) -> bool {
        self.data.get(self.pos) == Some(&BREAK)
    }

    fn read_head(&mut self) -> Result<Head, PrimitivesError> {
        let initial = self.read_u8()?;
        let major = initial >> 5;
        let info = initial & 0x1f;
        let value = match info {
            0..=23 => Some(info as u64),
            24 => Some(self.read_u8()? as u64),
            25 => {
                let b = self.read_bytes_raw(2)?;
                Some(u16::from_be_bytes([b[0], b[1]]) as u64)
            }
            26 => {
                let b = self.read_bytes_raw(4)?;
                Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64)
            }
            27 => {
                let b = self.read_bytes_raw(8)?;
                let mut arr = [0u8; 8];
                arr.copy_from_slice(b);
                Some(u64::from_be_bytes(arr))
            }
            INDEFINITE => None,
            other => {
                return Err(PrimitivesError::InvalidCbor(format!(
                    "reserved additional info {other}"
                )))
            }
        };
        Ok(Head { major, value })
    }

    fn read_length(&mut self, value: u64) -> Result<usize, PrimitivesError> {
        let len = usize::try_from(value).map_err(|_| PrimitivesError::UnexpectedEof)?;
        if len > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        Ok(len)
    }

    fn read_byte_string(&mut self, value: Option<u64>) -> Result<Vec<u8>, PrimitivesError> {
        match value {
            Some(len) => {
                let len = self.read_length(len)?;
                Ok(self.read_bytes_raw(len)?.to_vec())
            }
            None => {
                let mut out = Vec::new();
                while !self.peek_break() {
                    let chunk = self.read_head()?;
                    match (chunk.major, chunk.value) {
                        (MAJOR_BYTES, Some(len)) => {
                            let len = self.read_length(len)?;
                            out.extend_from_slice(self.read_bytes_raw(len)?);
                        }
                        _ => {
                            return Err(PrimitivesError::InvalidCbor(
                                "indefinite byte string chunk is not a definite byte string".into(),
                            ))
                        }
                    }
                }
                self.read_u8()?;
                Ok(out)
            }
        }
    }

    fn read_items(&mut self, value: Option<u64>) -> Result<Vec<PlutusData>, PrimitivesError> {
        match value {
            Some(n) => {
                // Every item takes at least one byte.
                let n = self.read_length(n)?;
                let mut items = Vec::with_capacity(n);
                for _ in 0..n {
                    items.push(self.read_data()?);
                }
                Ok(items)
            }
            None => {
                let mut items = Vec::new();
                while !self.peek_break() {
                    items.push(self.read_data()?);
                }
                self.read_u8()?;
                Ok(items)
            }
        }
    }

    fn read_array(&mut self) -> Result<Vec<PlutusData>, PrimitivesError> {
        let head = self.read_head()?;
        if head.major != MAJOR_ARRAY {
            return Err(PrimitivesError::InvalidCbor(format!(
                "expected array, found major type {}",
                head.major
            )));
        }
        self.read_items(head.value)
    }

    fn read_bignum(&mut self) -> Result<BigInt, PrimitivesError> {
        let head = self.read_head()?;
        if head.major != MAJOR_BYTES {
            return Err(PrimitivesError::InvalidCbor("bignum payload is not a byte string".into()));
        }
        let bytes = self.read_byte_string(head.value)?;
        Ok(BigInt::from(BigUint::from_bytes_be(&bytes)))
    }

    /// Read one Plutus data value.
    ///
    /// Fails with [`PrimitivesError::InvalidCbor`] once lists, maps and
    /// constructors nest deeper than [`MAX_NESTING_DEPTH`].
    pub fn read_data(&mut self) -> Result<PlutusData, PrimitivesError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(PrimitivesError::InvalidCbor("nesting too deep".into()));
        }
        self.depth += 1;
        let data = self.read_item();
        self.depth -= 1;
        data
    }

    fn read_item(&mut self) -> Result<PlutusData, PrimitivesError> {
        let head = self.read_head()?;
        match (head.major, head.value) {
            (MAJOR_UNSIGNED, Some(v)) => Ok(PlutusData::integer(v)),
            (MAJOR_NEGATIVE, Some(v)) => Ok(PlutusData::Integer(-BigInt::from(v) - 1u32)),
            (MAJOR_BYTES, value) => Ok(PlutusData::Bytes(self.read_byte_string(value)?)),
            (MAJOR_ARRAY, value) => Ok(PlutusData::List(self.read_items(value)?)),
            (MAJOR_MAP, value) => {
                let mut entries = Vec::new();
                match value {
                    Some(n) => {
                        let n = self.read_length(n)?;
                        for _ in 0..n {
                            let k = self.read_data()?;
                            let v = self.read_data()?;
                            entries.push((k, v));
                        }
                    }
                    None => {
                        while !self.peek_break() {
                            let k = self.read_data()?;
                            let v = self.read_data()?;
                            entries.push((k, v));
                        }
                        self.read_u8()?;
                    }
                }
                Ok(PlutusData::Map(entries))
            }
            (MAJOR_TAG, Some(tag)) => self.read_tagged(tag),
            (major, _) => Err(PrimitivesError::InvalidCbor(format!(
                "unsupported major type {major}"
            ))),
        }
    }

    fn read_tagged(&mut self, tag: u64) -> Result<PlutusData, PrimitivesError> {
        match tag {
            TAG_POSITIVE_BIGNUM => Ok(PlutusData::Integer(self.read_bignum()?)),
            TAG_NEGATIVE_BIGNUM => Ok(PlutusData::Integer(-self.read_bignum()? - 1u32)),
            121..=127 => Ok(PlutusData::Constr {
                tag: tag - TAG_CONSTR_SMALL,
                fields: self.read_array()?,
            }),
            1280..=1400 => Ok(PlutusData::Constr {
                tag: tag - TAG_CONSTR_LARGE + 7,
                fields: self.read_array()?,
            }),
            TAG_CONSTR_GENERAL => {
                let pair = self.read_array()?;
                match pair.as_slice() {
                    [PlutusData::Integer(alt), PlutusData::List(fields)] => Ok(PlutusData::Constr {
                        tag: alt.to_u64().ok_or(PrimitivesError::IntegerOverflow)?,
                        fields: fields.clone(),
                    }),
                    _ => Err(PrimitivesError::InvalidCbor(
                        "tag 102 payload is not [alternative, fields]".into(),
                    )),
                }
            }
            other => Err(PrimitivesError::InvalidCbor(format!("unsupported tag {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(data: &PlutusData) -> String {
        data.to_hex()
    }

    #[test]
    fn void_is_tag_121_empty_array() {
        assert_eq!(hex_of(&PlutusData::void()), "d87980");
    }

    #[test]
    fn constr_with_fields_uses_indefinite_array() {
        let data = PlutusData::constr(1, vec![PlutusData::integer(5)]);
        assert_eq!(hex_of(&data), "d87a9f05ff");
    }

    #[test]
    fn constr_alternative_seven_uses_tag_1280() {
        let data = PlutusData::constr(7, vec![]);
        assert_eq!(hex_of(&data), "d9050080");
    }

    #[test]
    fn constr_general_form() {
        let data = PlutusData::constr(200, vec![]);
        assert_eq!(hex_of(&data), "d8668218c880");
        assert_eq!(PlutusData::from_hex("d8668218c880").unwrap(), data);
    }

    #[test]
    fn integers() {
        assert_eq!(hex_of(&PlutusData::integer(0)), "00");
        assert_eq!(hex_of(&PlutusData::integer(23)), "17");
        assert_eq!(hex_of(&PlutusData::integer(24)), "1818");
        assert_eq!(hex_of(&PlutusData::integer(1000)), "1903e8");
        assert_eq!(hex_of(&PlutusData::integer(-1)), "20");
        assert_eq!(hex_of(&PlutusData::integer(-1000)), "3903e7");
    }

    #[test]
    fn bignum_roundtrip() {
        let big = PlutusData::integer(u64::MAX as i128 + 1);
        assert_eq!(hex_of(&big), "c249010000000000000000");
        assert_eq!(PlutusData::from_cbor(&big.to_cbor()).unwrap(), big);

        let negative = PlutusData::integer(-(u64::MAX as i128) - 2);
        assert_eq!(hex_of(&negative), "c349010000000000000000");
        assert_eq!(PlutusData::from_cbor(&negative.to_cbor()).unwrap(), negative);
    }

    #[test]
    fn bignum_wider_than_128_bits() {
        // tag 2, 17-byte magnitude 0x0101..01
        let cbor = hex::decode(format!("c251{}", "01".repeat(17))).unwrap();
        let data = PlutusData::from_cbor(&cbor).unwrap();
        let expected = BigInt::from(BigUint::from_bytes_be(&[0x01; 17]));
        assert_eq!(data, PlutusData::Integer(expected.clone()));
        assert_eq!(data.as_big_integer(), Some(&expected));
        assert_eq!(data.as_integer(), None);
        assert_eq!(data.to_cbor(), cbor);

        // tag 3 encodes -1 - n
        let cbor = hex::decode(format!("c351{}", "ff".repeat(17))).unwrap();
        let data = PlutusData::from_cbor(&cbor).unwrap();
        let magnitude = BigInt::from(BigUint::from_bytes_be(&[0xff; 17]));
        assert_eq!(data, PlutusData::Integer(-magnitude - 1u32));
        assert_eq!(data.to_cbor(), cbor);
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut cbor = vec![0x81; 200_000];
        cbor.push(0x00);
        match PlutusData::from_cbor(&cbor) {
            Err(PrimitivesError::InvalidCbor(msg)) => assert_eq!(msg, "nesting too deep"),
            other => panic!("expected InvalidCbor, got {other:?}"),
        }

        // Nested constructors count too.
        let mut cbor = [0xd8, 0x79, 0x81].repeat(MAX_NESTING_DEPTH);
        cbor.push(0x00);
        assert!(PlutusData::from_cbor(&cbor).is_err());
    }

    #[test]
    fn nesting_within_limit_decodes() {
        let depth = MAX_NESTING_DEPTH - 1;
        let mut cbor = vec![0x81; depth];
        cbor.push(0x07);
        let mut data = PlutusData::from_cbor(&cbor).unwrap();
        for _ in 0..depth {
            data = match data {
                PlutusData::List(mut items) if items.len() == 1 => items.remove(0),
                other => panic!("expected single-item list, got {other:?}"),
            };
        }
        assert_eq!(data, PlutusData::integer(7));
    }

    #[test]
    fn long_bytes_are_chunked() {
        let data = PlutusData::bytes(vec![0xab; 70]);
        let cbor = data.to_cbor();
        assert_eq!(cbor[0], 0x5f);
        assert_eq!(cbor[1], 0x58);
        assert_eq!(cbor[2], 64);
        assert_eq!(*cbor.last().unwrap(), 0xff);
        assert_eq!(PlutusData::from_cbor(&cbor).unwrap(), data);
    }

    #[test]
    fn empty_list_is_definite() {
        assert_eq!(hex_of(&PlutusData::List(vec![])), "80");
    }

    #[test]
    fn decodes_definite_arrays() {
        // [1, 2] as a definite array.
        let data = PlutusData::from_hex("820102").unwrap();
        assert_eq!(
            data,
            PlutusData::List(vec![PlutusData::integer(1), PlutusData::integer(2)])
        );
    }

    #[test]
    fn map_roundtrip() {
        let data = PlutusData::Map(vec![(PlutusData::bytes(b"k".to_vec()), PlutusData::integer(1))]);
        assert_eq!(hex_of(&data), "a1416b01");
        assert_eq!(PlutusData::from_hex("a1416b01").unwrap(), data);
    }

    #[test]
    fn rejects_trailing_bytes_and_truncation() {
        assert!(matches!(
            PlutusData::from_hex("0000"),
            Err(PrimitivesError::TrailingBytes(1))
        ));
        assert!(matches!(
            PlutusData::from_hex("9f01"),
            Err(PrimitivesError::UnexpectedEof)
        ));
        assert!(PlutusData::from_hex("5820ab").is_err());
    }
}
