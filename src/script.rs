//! Coinbase signature script construction.
//!
//! ```text
//! initial: [height push] [aux flags] [timestamp push] [push opcode N]
//!          <N extranonce bytes supplied by the job layer>
//! final:   [varint len] [pool tag]
//! ```

use super::*;

pub const MAX_SCRIPT_SIG_SIZE: usize = 100;

/// Largest data push expressible as a single-byte opcode (`OP_PUSHBYTES_75`).
pub const MAX_EXTRANONCE_SIZE: usize = 75;

/// The tag's varint prefix doubles as its push opcode, so it shares the same limit.
pub const MAX_POOL_TAG_SIZE: usize = 75;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureScript {
    initial: Vec<u8>,
    extranonce_len: usize,
    final_: Vec<u8>,
}

impl SignatureScript {
    pub fn new(
        height: u32,
        aux_flags: &[u8],
        timestamp: u64,
        extranonce_len: usize,
        tag: &str,
    ) -> Result<Self> {
        if extranonce_len > MAX_EXTRANONCE_SIZE {
            return Err(Error::EncodingOverflow {
                field: "extranonce length",
                value: extranonce_len as u128,
                max: MAX_EXTRANONCE_SIZE as u128,
            });
        }

        if tag.len() > MAX_POOL_TAG_SIZE {
            return Err(Error::EncodingOverflow {
                field: "pool tag length",
                value: tag.len() as u128,
                max: MAX_POOL_TAG_SIZE as u128,
            });
        }

        let timestamp = i64::try_from(timestamp).map_err(|_| Error::EncodingOverflow {
            field: "timestamp",
            value: timestamp.into(),
            max: i64::MAX as u128,
        })?;

        let mut initial = Encoder::new();
        push_int(&mut initial, height.into());
        initial.write_bytes(aux_flags);
        push_int(&mut initial, timestamp);
        initial.write_u8(extranonce_len as u8);

        let mut final_ = Encoder::new();
        final_.write_var_bytes(tag.as_bytes());

        let script = Self {
            initial: initial.into_bytes(),
            extranonce_len,
            final_: final_.into_bytes(),
        };

        let size = script.declared_len();

        if size > MAX_SCRIPT_SIG_SIZE {
            return Err(Error::EncodingOverflow {
                field: "signature script size",
                value: size as u128,
                max: MAX_SCRIPT_SIG_SIZE as u128,
            });
        }

        Ok(script)
    }

    pub fn initial(&self) -> &[u8] {
        &self.initial
    }

    pub fn final_(&self) -> &[u8] {
        &self.final_
    }

    pub fn extranonce_len(&self) -> usize {
        self.extranonce_len
    }

    /// Size of the script once the extranonce has been spliced in.
    pub fn declared_len(&self) -> usize {
        self.initial.len() + self.extranonce_len + self.final_.len()
    }
}

/// Minimal script number push, as required for the BIP34 height.
pub fn push_int(encoder: &mut Encoder, n: i64) {
    match n {
        0 => encoder.write_u8(opcodes::OP_0.to_u8()),
        1..=16 => encoder.write_u8(OP_PUSHNUM_1.to_u8() + (n - 1) as u8),
        _ => {
            let mut data = [0u8; 8];
            let len = write_scriptint(&mut data, n);
            encoder.write_u8(len as u8);
            encoder.write_bytes(&data[..len]);
        }
    }
}
