use {
    super::*,
    bitcoin::{Transaction, consensus},
};

#[derive(Debug, Parser)]
pub struct Assemble {
    #[arg(long, help = "Hex encoded transaction prefix <COINB1>.")]
    coinb1: String,
    #[arg(long, help = "Hex encoded transaction suffix <COINB2>.")]
    coinb2: String,
    #[arg(long, help = "Splice in <EXTRANONCE1>.")]
    extranonce1: Extranonce,
    #[arg(long, help = "Splice in <EXTRANONCE2>.")]
    extranonce2: Extranonce,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub transaction: String,
    pub txid: Txid,
    pub size: usize,
    pub value: u64,
}

impl Assemble {
    pub fn run(self) -> anyhow::Result<()> {
        let coinb1 = hex::decode(&self.coinb1).context("failed to decode coinb1")?;
        let coinb2 = hex::decode(&self.coinb2).context("failed to decode coinb2")?;

        let mut bytes = coinb1;
        bytes.extend_from_slice(self.extranonce1.as_bytes());
        bytes.extend_from_slice(self.extranonce2.as_bytes());
        bytes.extend_from_slice(&coinb2);

        let (transaction, consumed) = consensus::deserialize_partial::<Transaction>(&bytes)
            .context("assembled bytes are not a valid transaction")?;

        ensure!(
            transaction.is_coinbase(),
            "assembled transaction is not a coinbase"
        );

        if consumed < bytes.len() {
            debug!(
                "{} trailing bytes after transaction, treating as message",
                bytes.len() - consumed
            );
        }

        let mut outputs = Outputs::new();

        for output in &transaction.output {
            outputs.push(output.value.to_sat(), output.script_pubkey.clone());
        }

        let output = Output {
            transaction: hex::encode(&bytes),
            txid: Txid::hash(&bytes),
            size: bytes.len(),
            value: outputs.total()?,
        };

        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(())
    }
}
