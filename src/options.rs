use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
    #[arg(long, help = "Load configuration from <CONFIG>.")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Load configuration from <CONFIG_DIR>/gentx.json.")]
    pub config_dir: Option<PathBuf>,

    #[arg(
        long,
        value_enum,
        help = "Decode addresses for <NETWORK>. [default: mainnet]"
    )]
    pub network: Option<Network>,

    #[arg(long, help = "Decode pay-to-pubkey-hash addresses with version byte <PUBKEY_HASH_VERSION>.")]
    pub pubkey_hash_version: Option<u8>,

    #[arg(long, help = "Decode pay-to-script-hash addresses with version byte <SCRIPT_HASH_VERSION>.")]
    pub script_hash_version: Option<u8>,

    #[arg(long, help = "Pay the remaining block reward to <POOL_WALLET_ADDRESS>.")]
    pub pool_wallet_address: Option<String>,

    #[arg(
        long = "recipient",
        value_name = "ADDRESS:PERCENT",
        help = "Pay <PERCENT> of the remaining block reward to <ADDRESS>. May be repeated."
    )]
    pub recipients: Vec<RewardRecipient>,

    #[arg(long, help = "Append the pool message to the generation transaction.")]
    pub support_transaction_messages: bool,

    #[arg(long, help = "Tag the signature script with <POOL_TAG>. [default: /gentx/]")]
    pub pool_tag: Option<String>,

    #[arg(long, help = "Embed <MESSAGE> when transaction messages are enabled.")]
    pub message: Option<String>,

    #[arg(long, help = "Reserve <EXTRANONCE2_SIZE> bytes for extranonce2. [default: 4]")]
    pub extranonce2_size: Option<usize>,
}
