use super::*;

/// The fields of a `getblocktemplate` response the generation transaction depends on.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct BlockTemplate {
    pub height: u64,
    #[serde(default)]
    pub coinbaseaux: CoinbaseAux,
    #[serde(rename = "coinbasevalue")]
    pub coinbase_value: u64,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(rename = "previousblockhash", default)]
    pub previous_block_hash: Option<bitcoin::BlockHash>,
    #[serde(rename = "curtime", default)]
    pub current_time: Option<u64>,
    #[serde(default)]
    pub bits: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Deserialize, Serialize)]
pub struct CoinbaseAux {
    #[serde(
        default,
        deserialize_with = "bytes_from_hex",
        serialize_with = "bytes_to_hex"
    )]
    pub flags: Vec<u8>,
}

impl BlockTemplate {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        serde_json::from_str(
            &fs::read_to_string(path)
                .with_context(|| format!("failed to read block template `{}`", path.display()))?,
        )
        .with_context(|| format!("failed to deserialize block template `{}`", path.display()))
    }
}

fn bytes_from_hex<'de, D>(d: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    hex::decode(s).map_err(de::Error::custom)
}

fn bytes_to_hex<S>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&hex::encode(bytes))
}
