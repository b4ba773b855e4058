//! Plutus `Data` values.
//!
//! `PlutusData` is the argument type of every on-chain script: datums,
//! redeemers and script parameters are all encoded as this tree. The
//! canonical CBOR form lives in [`cbor`].

pub mod cbor;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::PrimitivesError;

/// A Plutus data value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlutusData {
    /// A constructor application: alternative index plus fields.
    Constr {
        /// Constructor alternative.
        tag: u64,
        /// Constructor fields.
        fields: Vec<PlutusData>,
    },
    /// Association list of key/value pairs.
    Map(Vec<(PlutusData, PlutusData)>),
    /// A list.
    List(Vec<PlutusData>),
    /// A signed integer of any size.
    Integer(BigInt),
    /// A byte string.
    Bytes(Vec<u8>),
}

impl PlutusData {
    /// The unit value `Constr(0, [])`.
    pub fn void() -> Self {
        PlutusData::Constr { tag: 0, fields: Vec::new() }
    }

    /// Build a constructor application.
    pub fn constr(tag: u64, fields: Vec<PlutusData>) -> Self {
        PlutusData::Constr { tag, fields }
    }

    /// Build a byte-string value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        PlutusData::Bytes(bytes.into())
    }

    /// Build an integer value.
    pub fn integer(value: impl Into<BigInt>) -> Self {
        PlutusData::Integer(value.into())
    }

    /// Borrow the bytes of a byte-string value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PlutusData::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The value of an integer, `None` if it is not one or does not fit in 128 bits.
    pub fn as_integer(&self) -> Option<i128> {
        self.as_big_integer().and_then(ToPrimitive::to_i128)
    }

    /// Borrow the value of an integer.
    pub fn as_big_integer(&self) -> Option<&BigInt> {
        match self {
            PlutusData::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Borrow the items of a list.
    pub fn as_list(&self) -> Option<&[PlutusData]> {
        match self {
            PlutusData::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the alternative and fields of a constructor application.
    pub fn as_constr(&self) -> Option<(u64, &[PlutusData])> {
        match self {
            PlutusData::Constr { tag, fields } => Some((*tag, fields)),
            _ => None,
        }
    }

    /// Encode to canonical CBOR.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut writer = cbor::CborWriter::new();
        writer.write_data(self);
        writer.into_bytes()
    }

    /// Encode to canonical CBOR, hex-encoded.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_cbor())
    }

    /// Decode a single CBOR item; trailing bytes are an error.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let mut reader = cbor::CborReader::new(bytes);
        let data = reader.read_data()?;
        if reader.remaining() != 0 {
            return Err(PrimitivesError::TrailingBytes(reader.remaining()));
        }
        Ok(data)
    }

    /// Decode from a hex-encoded CBOR string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_cbor(&hex::decode(hex_str)?)
    }
}
