//! Scripts attached to or referenced by transactions.

use serde::{Deserialize, Serialize};

use progtoken_primitives::hash::script_hash;
use progtoken_primitives::{Hash28, ScriptHash};

/// Script language, which also selects the hashing prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScriptLanguage {
    /// Native (timelock / multisig) script.
    Native,
    /// Plutus V1.
    PlutusV1,
    /// Plutus V2.
    PlutusV2,
    /// Plutus V3.
    PlutusV3,
}

impl ScriptLanguage {
    /// The byte prepended to the script before hashing.
    pub fn tag(&self) -> u8 {
        match self {
            ScriptLanguage::Native => 0,
            ScriptLanguage::PlutusV1 => 1,
            ScriptLanguage::PlutusV2 => 2,
            ScriptLanguage::PlutusV3 => 3,
        }
    }
}

/// A compiled, fully parameterized script.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    /// Script language.
    pub language: ScriptLanguage,
    /// Script bytes as carried in a witness set.
    #[serde(with = "progtoken_primitives::serde_hex")]
    pub bytes: Vec<u8>,
}

impl Script {
    /// Create a script from its language and bytes.
    pub fn new(language: ScriptLanguage, bytes: impl Into<Vec<u8>>) -> Self {
        Script { language, bytes: bytes.into() }
    }

    /// Compute the script hash (also the policy id of a minting script).
    pub fn hash(&self) -> ScriptHash {
        Hash28::new(script_hash(self.language.tag(), &self.bytes))
    }
}
