//! Payment and staking credentials.

use progtoken_primitives::{Hash28, KeyHash, PlutusData, ScriptHash};

use crate::LedgerError;

/// A credential: the hash of a verification key or of a script.
///
/// The hash is kept as raw bytes so that the empty placeholder credential
/// stored in a directory HEAD node round-trips bit-exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Credential {
    /// Controlled by a verification key.
    VerificationKey(Vec<u8>),
    /// Controlled by a script.
    Script(Vec<u8>),
}

impl Credential {
    /// Credential of a verification key hash.
    pub fn key(hash: KeyHash) -> Self {
        Credential::VerificationKey(hash.as_bytes().to_vec())
    }

    /// Credential of a script hash.
    pub fn script(hash: ScriptHash) -> Self {
        Credential::Script(hash.as_bytes().to_vec())
    }

    /// The empty key credential used where no logic is attached.
    pub fn placeholder() -> Self {
        Credential::VerificationKey(Vec::new())
    }

    /// The raw hash bytes.
    pub fn hash_bytes(&self) -> &[u8] {
        match self {
            Credential::VerificationKey(h) | Credential::Script(h) => h,
        }
    }

    /// The script hash, if this is a script credential.
    pub fn script_hash(&self) -> Option<ScriptHash> {
        match self {
            Credential::Script(h) => Hash28::from_bytes(h).ok(),
            Credential::VerificationKey(_) => None,
        }
    }

    /// Encode as `Constr(0, [hash])` for keys, `Constr(1, [hash])` for scripts.
    pub fn to_data(&self) -> PlutusData {
        match self {
            Credential::VerificationKey(h) => PlutusData::constr(0, vec![PlutusData::bytes(h.clone())]),
            Credential::Script(h) => PlutusData::constr(1, vec![PlutusData::bytes(h.clone())]),
        }
    }

    /// Decode from the constructor form produced by [`to_data`](Self::to_data).
    pub fn from_data(data: &PlutusData) -> Result<Self, LedgerError> {
        let (tag, fields) = data
            .as_constr()
            .ok_or_else(|| LedgerError::InvalidCredential("not a constructor".into()))?;
        let hash = match fields {
            [PlutusData::Bytes(h)] => h.clone(),
            _ => {
                return Err(LedgerError::InvalidCredential(format!(
                    "expected one byte-string field, found {} fields",
                    fields.len()
                )))
            }
        };
        if !hash.is_empty() && hash.len() != progtoken_primitives::policy::HASH28_SIZE {
            return Err(LedgerError::InvalidCredential(format!(
                "hash of {} bytes",
                hash.len()
            )));
        }
        match tag {
            0 => Ok(Credential::VerificationKey(hash)),
            1 => Ok(Credential::Script(hash)),
            other => Err(LedgerError::InvalidCredential(format!("unknown alternative {other}"))),
        }
    }
}
