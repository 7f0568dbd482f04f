//! The coinbase ("generation") transaction, split around the extranonce.
//!
//! ```text
//! initial: version | input count | outpoint | script len | script initial
//!          <extranonce1> <extranonce2>
//! final:   script final | sequence | outputs | lock time | [message]
//! ```
//!
//! The script length written into `initial` already accounts for the
//! extranonce bytes, so `initial ++ extranonce ++ final` is a complete
//! transaction for any extranonce of the declared length.

use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationOptions {
    pub pool_tag: String,
    pub message: String,
    pub support_transaction_messages: bool,
    /// Unix seconds embedded in the signature script.
    pub timestamp: u64,
}

impl GenerationOptions {
    pub fn version(&self) -> u32 {
        if self.support_transaction_messages {
            GenerationTransaction::VERSION_WITH_MESSAGE
        } else {
            GenerationTransaction::VERSION
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            pool_tag: DEFAULT_POOL_TAG.into(),
            message: DEFAULT_MESSAGE.into(),
            support_transaction_messages: false,
            timestamp: 0,
        }
    }
}

/// The single coinbase input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub previous_output: OutPoint,
    pub sequence: u32,
    pub signature_script: SignatureScript,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationTransaction {
    version: u32,
    input: TxIn,
    outputs: Outputs,
    lock_time: u32,
    message: Option<Vec<u8>>,
    initial: Vec<u8>,
    final_: Vec<u8>,
}

impl GenerationTransaction {
    pub const VERSION: u32 = 1;
    pub const VERSION_WITH_MESSAGE: u32 = 2;
    pub const SEQUENCE: u32 = 0;
    pub const LOCK_TIME: u32 = 0;

    pub fn create(
        template: &BlockTemplate,
        placeholder: &ExtraNoncePlaceholder,
        rewards: &ResolvedRewards,
        options: &GenerationOptions,
    ) -> Result<Self> {
        let height = u32::try_from(template.height).map_err(|_| Error::EncodingOverflow {
            field: "block height",
            value: template.height.into(),
            max: u32::MAX.into(),
        })?;

        let input = TxIn {
            previous_output: OutPoint::null(),
            sequence: Self::SEQUENCE,
            signature_script: SignatureScript::new(
                height,
                &template.coinbaseaux.flags,
                options.timestamp,
                placeholder.len(),
                &options.pool_tag,
            )?,
        };

        let version = options.version();

        let message = options.support_transaction_messages.then(|| {
            let mut encoder = Encoder::new();
            encoder.write_var_bytes(options.message.as_bytes());
            encoder.into_bytes()
        });

        let mut initial = Encoder::new();
        initial.write_u32_le(version);
        initial.write_varint(1);
        initial.write_bytes(&input.previous_output.txid.to_byte_array());
        initial.write_u32_le(input.previous_output.vout);
        initial.write_varint(input.signature_script.declared_len() as u64);
        initial.write_bytes(input.signature_script.initial());

        let outputs = rewards
            .distribute(template.coinbase_value)
            .into_iter()
            .collect::<Outputs>();

        let total = outputs.total()?;

        debug_assert_eq!(total, template.coinbase_value);

        let mut final_ = Encoder::new();
        final_.write_bytes(input.signature_script.final_());
        final_.write_u32_le(input.sequence);
        final_.write_varint(outputs.len() as u64);
        final_.write_bytes(&outputs.serialize());
        final_.write_u32_le(Self::LOCK_TIME);

        if let Some(message) = &message {
            final_.write_bytes(message);
        }

        let initial = initial.into_bytes();
        let final_ = final_.into_bytes();

        debug!(
            "Created generation transaction for height {height}: {} initial bytes, {} extranonce bytes, {} final bytes, {} outputs paying {total}",
            initial.len(),
            placeholder.len(),
            final_.len(),
            outputs.len(),
        );

        trace!(
            "coinb1 {} coinb2 {}",
            hex::encode(&initial),
            hex::encode(&final_)
        );

        Ok(Self {
            version,
            input,
            outputs,
            lock_time: Self::LOCK_TIME,
            message,
            initial,
            final_,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn input(&self) -> &TxIn {
        &self.input
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    /// Length-prefixed transaction comment, present only when messages are enabled.
    pub fn message(&self) -> Option<&[u8]> {
        self.message.as_deref()
    }

    pub fn initial(&self) -> &[u8] {
        &self.initial
    }

    pub fn final_(&self) -> &[u8] {
        &self.final_
    }

    /// Combined length of `extranonce1 ++ extranonce2` the buffers were built for.
    pub fn extranonce_len(&self) -> usize {
        self.input.signature_script.extranonce_len()
    }

    pub fn coinb1(&self) -> String {
        hex::encode(&self.initial)
    }

    pub fn coinb2(&self) -> String {
        hex::encode(&self.final_)
    }

    pub fn assemble(&self, extranonce1: &[u8], extranonce2: &[u8]) -> Result<Vec<u8>> {
        let actual = extranonce1.len() + extranonce2.len();

        if actual != self.extranonce_len() {
            return Err(Error::ExtraNonceSizeMismatch {
                expected: self.extranonce_len(),
                actual,
            });
        }

        let mut bytes = Vec::with_capacity(self.initial.len() + actual + self.final_.len());
        bytes.extend_from_slice(&self.initial);
        bytes.extend_from_slice(extranonce1);
        bytes.extend_from_slice(extranonce2);
        bytes.extend_from_slice(&self.final_);

        Ok(bytes)
    }

    /// Double-SHA256 of the assembled transaction, the coinbase leaf of the merkle tree.
    pub fn hash(&self, extranonce1: &[u8], extranonce2: &[u8]) -> Result<Txid> {
        Ok(Txid::hash(&self.assemble(extranonce1, extranonce2)?))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        bitcoin::{Transaction, consensus},
        pretty_assertions::assert_eq as pretty_assert_eq,
    };

    const POOL_WALLET: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
    const FEE_ADDRESS: &str = "33FFrcn4Tv1qgGEuXPkkPdr44DuWp3RzPo";
    const TIMESTAMP: u64 = 1_700_000_000;

    fn template() -> BlockTemplate {
        BlockTemplate {
            height: 500_000,
            coinbaseaux: CoinbaseAux::default(),
            coinbase_value: 5_000_000_000,
            version: None,
            previous_block_hash: None,
            current_time: None,
            bits: None,
        }
    }

    fn rewards() -> ResolvedRewards {
        RewardConfig::new(
            vec![RewardRecipient {
                address: FEE_ADDRESS.into(),
                share_percent: SharePercent::from_percent(1),
            }],
            POOL_WALLET,
        )
        .unwrap()
        .resolve(AddressVersions::MAINNET)
        .unwrap()
    }

    fn options(support_transaction_messages: bool) -> GenerationOptions {
        GenerationOptions {
            support_transaction_messages,
            timestamp: TIMESTAMP,
            ..Default::default()
        }
    }

    fn create(placeholder_len: usize, support_transaction_messages: bool) -> GenerationTransaction {
        GenerationTransaction::create(
            &template(),
            &ExtraNoncePlaceholder::with_len(placeholder_len),
            &rewards(),
            &options(support_transaction_messages),
        )
        .unwrap()
    }

    #[test]
    fn golden_vector() {
        let tx = create(8, false);

        pretty_assert_eq!(
            tx.coinb1(),
            "01000000\
             01\
             0000000000000000000000000000000000000000000000000000000000000000ffffffff\
             1a\
             0320a107\
             0400f15365\
             08"
        );

        pretty_assert_eq!(
            tx.coinb2(),
            "072f67656e74782f\
             00000000\
             02\
             80f0fa0200000000\
             17a914111111111111111111111111111111111111111187\
             80010b2701000000\
             1976a91462e907b15cbf27d5425399ebf6f0fb50ebb88f1888ac\
             00000000"
        );
    }

    #[test]
    fn assembled_transaction_decodes() {
        let tx = create(8, false);

        let extranonce1 = [0xde, 0xad, 0xbe, 0xef];
        let extranonce2 = [0x00, 0x00, 0x00, 0x2a];

        let bytes = tx.assemble(&extranonce1, &extranonce2).unwrap();
        let decoded = consensus::deserialize::<Transaction>(&bytes).unwrap();

        assert!(decoded.is_coinbase());
        assert_eq!(decoded.version.0, 1);
        assert_eq!(decoded.input.len(), 1);
        assert_eq!(decoded.input[0].sequence.0, GenerationTransaction::SEQUENCE);

        let script_sig = decoded.input[0].script_sig.as_bytes();
        let signature_script = &tx.input().signature_script;

        assert_eq!(script_sig.len(), signature_script.declared_len());

        let mut expected = signature_script.initial().to_vec();
        expected.extend_from_slice(&extranonce1);
        expected.extend_from_slice(&extranonce2);
        expected.extend_from_slice(signature_script.final_());
        pretty_assert_eq!(script_sig, expected.as_slice());

        assert_eq!(
            decoded
                .output
                .iter()
                .map(|output| output.value.to_sat())
                .collect::<Vec<_>>(),
            [50_000_000, 4_950_000_000]
        );

        assert_eq!(
            tx.hash(&extranonce1, &extranonce2).unwrap(),
            decoded.compute_txid()
        );

        pretty_assert_eq!(consensus::serialize(&decoded), bytes);
    }

    #[test]
    fn extranonce_only_changes_the_spliced_bytes() {
        let tx = create(8, false);

        let a = tx.assemble(&[0; 4], &[0; 4]).unwrap();
        let b = tx.assemble(&[0xff; 4], &[0xff; 4]).unwrap();

        assert_eq!(a.len(), b.len());
        assert_eq!(a[..tx.initial().len()], b[..tx.initial().len()]);
        assert_eq!(
            a[tx.initial().len() + 8..],
            b[tx.initial().len() + 8..]
        );
        assert_ne!(tx.hash(&[0; 4], &[0; 4]), tx.hash(&[0xff; 4], &[0xff; 4]));
    }

    #[test]
    fn messages_extend_final_only() {
        let plain = create(8, false);
        let with_message = create(8, true);

        let mut message = Encoder::new();
        message.write_var_bytes(DEFAULT_MESSAGE.as_bytes());
        let message = message.into_bytes();

        assert_eq!(plain.message(), None);
        assert_eq!(with_message.message(), Some(message.as_slice()));

        assert_eq!(
            with_message.final_().len(),
            plain.final_().len() + message.len()
        );
        assert!(with_message.final_().ends_with(&message));
        assert_eq!(
            &with_message.final_()[..plain.final_().len()],
            plain.final_()
        );

        assert_eq!(plain.version(), 1);
        assert_eq!(with_message.version(), 2);
        assert_eq!(&with_message.initial()[..4], 2u32.to_le_bytes());
        assert_eq!(with_message.initial()[4..], plain.initial()[4..]);

        let bytes = with_message.assemble(&[1; 4], &[2; 4]).unwrap();
        let (decoded, consumed) = consensus::deserialize_partial::<Transaction>(&bytes).unwrap();
        assert_eq!(decoded.version.0, 2);
        assert_eq!(&bytes[consumed..], message.as_slice());
    }

    #[test]
    fn empty_placeholder_is_still_valid() {
        let tx = create(0, false);

        assert_eq!(tx.extranonce_len(), 0);

        let bytes = tx.assemble(&[], &[]).unwrap();
        let decoded = consensus::deserialize::<Transaction>(&bytes).unwrap();

        assert!(decoded.is_coinbase());
        assert_eq!(
            decoded.input[0].script_sig.len(),
            tx.input().signature_script.declared_len()
        );
    }

    #[test]
    fn declared_length_tracks_placeholder() {
        for len in [0, 1, 4, 8, 16, 32] {
            let tx = create(len, false);
            let bytes = tx.assemble(&vec![0xab; len], &[]).unwrap();
            let decoded = consensus::deserialize::<Transaction>(&bytes).unwrap();

            assert_eq!(
                decoded.input[0].script_sig.len(),
                tx.input().signature_script.declared_len(),
                "placeholder length {len}"
            );
        }
    }

    #[test]
    fn assemble_rejects_wrong_extranonce_size() {
        let tx = create(8, false);

        assert_eq!(
            tx.assemble(&[0; 4], &[0; 2]).unwrap_err(),
            Error::ExtraNonceSizeMismatch {
                expected: 8,
                actual: 6,
            }
        );
    }

    #[test]
    fn aux_flags_land_in_initial() {
        let mut template = template();
        template.coinbaseaux.flags = vec![0x06, 0x2f, 0x50, 0x32, 0x53, 0x48, 0x2f];

        let tx = GenerationTransaction::create(
            &template,
            &ExtraNoncePlaceholder::default(),
            &rewards(),
            &options(false),
        )
        .unwrap();

        assert!(tx.coinb1().contains("062f503253482f"));
        assert!(!tx.coinb2().contains("062f503253482f"));

        let bytes = tx.assemble(&[0; 4], &[0; 4]).unwrap();
        assert!(consensus::deserialize::<Transaction>(&bytes).is_ok());
    }

    #[test]
    fn pool_tag_lands_in_final() {
        let tx = GenerationTransaction::create(
            &template(),
            &ExtraNoncePlaceholder::default(),
            &rewards(),
            &GenerationOptions {
                pool_tag: "|parasite|".into(),
                ..options(false)
            },
        )
        .unwrap();

        let tag = hex::encode("|parasite|");
        assert!(!tx.coinb1().contains(&tag));
        assert!(tx.coinb2().contains(&tag));
    }

    #[test]
    fn deterministic_with_same_inputs() {
        assert_eq!(create(8, true), create(8, true));
    }

    #[test]
    fn height_beyond_u32_is_rejected() {
        let mut template = template();
        template.height = u64::from(u32::MAX) + 1;

        assert_eq!(
            GenerationTransaction::create(
                &template,
                &ExtraNoncePlaceholder::default(),
                &rewards(),
                &options(false),
            )
            .unwrap_err(),
            Error::EncodingOverflow {
                field: "block height",
                value: 1 << 32,
                max: u32::MAX.into(),
            }
        );
    }

    #[test]
    fn oversized_placeholder_is_rejected() {
        assert!(matches!(
            GenerationTransaction::create(
                &template(),
                &ExtraNoncePlaceholder::with_len(80),
                &rewards(),
                &options(false),
            ),
            Err(Error::EncodingOverflow { .. })
        ));
    }

    #[test]
    fn output_amounts_sum_to_coinbase_value() {
        let mut template = template();

        for value in [0, 1, 99, 312_500_000, 625_000_123] {
            template.coinbase_value = value;

            let tx = GenerationTransaction::create(
                &template,
                &ExtraNoncePlaceholder::default(),
                &rewards(),
                &options(false),
            )
            .unwrap();

            assert_eq!(tx.outputs().total().unwrap(), value);
        }
    }
}
