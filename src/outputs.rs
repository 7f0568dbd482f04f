use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub amount: u64,
    pub script_pubkey: ScriptBuf,
}

/// Transaction outputs in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outputs(Vec<TxOut>);

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, amount: u64, script_pubkey: ScriptBuf) {
        self.0.push(TxOut {
            amount,
            script_pubkey,
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TxOut> {
        self.0.iter()
    }

    pub fn total(&self) -> Result<u64> {
        self.0
            .iter()
            .try_fold(0u64, |total, output| total.checked_add(output.amount))
            .ok_or_else(|| Error::EncodingOverflow {
                field: "output total",
                value: self.0.iter().map(|output| u128::from(output.amount)).sum(),
                max: u64::MAX.into(),
            })
    }

    /// `amount || varint(len) || script` per output. The caller writes the
    /// `varint(count)` prefix.
    pub fn serialize(&self) -> Vec<u8> {
        let mut encoder = Encoder::new();

        for output in &self.0 {
            encoder.write_u64_le(output.amount);
            encoder.write_var_bytes(output.script_pubkey.as_bytes());
        }

        encoder.into_bytes()
    }
}

impl FromIterator<(Destination, u64)> for Outputs {
    fn from_iter<I: IntoIterator<Item = (Destination, u64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(destination, amount)| TxOut {
                    amount,
                    script_pubkey: destination.script_pubkey(),
                })
                .collect(),
        )
    }
}
