use super::*;

#[derive(Debug, Parser)]
pub struct Build {
    #[arg(help = "Read the `getblocktemplate` response from <TEMPLATE>.")]
    template: PathBuf,
    #[arg(long, help = "Embed <TIMESTAMP> instead of the current time.")]
    timestamp: Option<u64>,
    #[arg(long, requires = "extranonce2", help = "Assemble the transaction with <EXTRANONCE1>.")]
    extranonce1: Option<Extranonce>,
    #[arg(long, requires = "extranonce1", help = "Assemble the transaction with <EXTRANONCE2>.")]
    extranonce2: Option<Extranonce>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub height: u64,
    pub version: u32,
    pub coinb1: String,
    pub coinb2: String,
    pub extranonce1_size: usize,
    pub extranonce2_size: usize,
    pub outputs: Vec<TxOutInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<Txid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutInfo {
    pub amount: u64,
    pub script_pubkey: ScriptBuf,
}

impl Build {
    pub fn run(self, settings: Settings) -> anyhow::Result<()> {
        let template = BlockTemplate::load(&self.template)?;

        let timestamp = match self.timestamp {
            Some(timestamp) => timestamp,
            None => unix_now()?,
        };

        let counter = settings.extranonce_counter();

        let generation = GenerationTransaction::create(
            &template,
            &counter.placeholder(),
            settings.resolved_rewards(),
            &settings.generation_options(timestamp),
        )
        .with_context(|| {
            format!(
                "failed to build generation transaction for height {}",
                template.height
            )
        })?;

        info!(
            "Built generation transaction for height {} paying {} sats",
            template.height, template.coinbase_value
        );

        let (transaction, txid) = match (&self.extranonce1, &self.extranonce2) {
            (Some(extranonce1), Some(extranonce2)) => (
                Some(hex::encode(
                    generation.assemble(extranonce1.as_bytes(), extranonce2.as_bytes())?,
                )),
                Some(generation.hash(extranonce1.as_bytes(), extranonce2.as_bytes())?),
            ),
            _ => (None, None),
        };

        let output = Output {
            height: template.height,
            version: generation.version(),
            coinb1: generation.coinb1(),
            coinb2: generation.coinb2(),
            extranonce1_size: counter.enonce1_size(),
            extranonce2_size: counter.enonce2_size(),
            outputs: generation
                .outputs()
                .iter()
                .map(|output| TxOutInfo {
                    amount: output.amount,
                    script_pubkey: output.script_pubkey.clone(),
                })
                .collect(),
            transaction,
            txid,
        };

        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(())
    }
}
