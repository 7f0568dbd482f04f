use {
    super::*,
    bitcoin::{
        opcodes::all::{OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160},
        script::Builder,
    },
};

/// Base58check version bytes for a coin's legacy address formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressVersions {
    pub pubkey_hash: u8,
    pub script_hash: u8,
}

impl AddressVersions {
    pub const MAINNET: Self = Self {
        pubkey_hash: 0x00,
        script_hash: 0x05,
    };

    pub const TESTNET: Self = Self {
        pubkey_hash: 0x6f,
        script_hash: 0xc4,
    };
}

impl Default for AddressVersions {
    fn default() -> Self {
        Self::MAINNET
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    PubKeyHash(PubkeyHash),
    ScriptHash(ScriptHash),
}

impl Destination {
    pub fn from_address(address: &str, versions: AddressVersions) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidAddress {
            address: address.into(),
            reason,
        };

        let payload = base58::decode_check(address).map_err(|err| invalid(err.to_string()))?;

        let [version, hash @ ..] = payload.as_slice() else {
            return Err(invalid("empty payload".into()));
        };

        let hash = <[u8; 20]>::try_from(hash)
            .map_err(|_| invalid(format!("expected 20 byte hash, got {}", hash.len())))?;

        if *version == versions.pubkey_hash {
            Ok(Self::PubKeyHash(PubkeyHash::from_byte_array(hash)))
        } else if *version == versions.script_hash {
            Ok(Self::ScriptHash(ScriptHash::from_byte_array(hash)))
        } else {
            Err(invalid(format!("unknown version byte {version:#04x}")))
        }
    }

    pub fn script_pubkey(&self) -> ScriptBuf {
        match self {
            Self::PubKeyHash(hash) => Builder::new()
                .push_opcode(OP_DUP)
                .push_opcode(OP_HASH160)
                .push_slice(hash.to_byte_array())
                .push_opcode(OP_EQUALVERIFY)
                .push_opcode(OP_CHECKSIG)
                .into_script(),
            Self::ScriptHash(hash) => Builder::new()
                .push_opcode(OP_HASH160)
                .push_slice(hash.to_byte_array())
                .push_opcode(OP_EQUAL)
                .into_script(),
        }
    }
}
