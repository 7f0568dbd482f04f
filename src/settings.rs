use {super::*, options::Options};

pub const MIN_ENONCE2_SIZE: usize = 2;
pub const MAX_ENONCE2_SIZE: usize = 8;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn address_versions(self) -> AddressVersions {
        match self {
            Self::Mainnet => AddressVersions::MAINNET,
            Self::Testnet | Self::Regtest => AddressVersions::TESTNET,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        })
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" | "main" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            _ => Err(anyhow!("invalid network `{s}`")),
        }
    }
}

/// JSON config file structure. Every field is optional so that a file, the
/// environment and the command line can each contribute part of it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
    pub recipients: Option<Vec<RewardRecipient>>,
    pub pool_wallet_address: Option<String>,
    pub support_transaction_messages: Option<bool>,
    pub pool_tag: Option<String>,
    pub message: Option<String>,
    pub network: Option<Network>,
    pub pubkey_hash_version: Option<u8>,
    pub script_hash_version: Option<u8>,
    pub extranonce2_size: Option<usize>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        serde_json::from_str(
            &fs::read_to_string(path)
                .with_context(|| format!("failed to open config file `{}`", path.display()))?,
        )
        .with_context(|| format!("failed to deserialize config file `{}`", path.display()))
    }

    fn from_options(options: &Options) -> Self {
        Self {
            recipients: (!options.recipients.is_empty()).then(|| options.recipients.clone()),
            pool_wallet_address: options.pool_wallet_address.clone(),
            support_transaction_messages: options.support_transaction_messages.then_some(true),
            pool_tag: options.pool_tag.clone(),
            message: options.message.clone(),
            network: options.network,
            pubkey_hash_version: options.pubkey_hash_version,
            script_hash_version: options.script_hash_version,
            extranonce2_size: options.extranonce2_size,
        }
    }

    fn from_env(env: &BTreeMap<String, String>) -> anyhow::Result<Self> {
        let get_bool = |key: &str| {
            env.get(key)
                .map(|value| !value.is_empty() && value != "0" && value.to_lowercase() != "false")
        };

        let get_string = |key: &str| env.get(key).cloned();

        let get_u8 = |key: &str| -> anyhow::Result<Option<u8>> {
            env.get(key)
                .map(|int| int.parse::<u8>())
                .transpose()
                .with_context(|| format!("failed to parse environment variable GENTX_{key} as u8"))
        };

        let get_usize = |key: &str| -> anyhow::Result<Option<usize>> {
            env.get(key)
                .map(|int| int.parse::<usize>())
                .transpose()
                .with_context(|| {
                    format!("failed to parse environment variable GENTX_{key} as usize")
                })
        };

        let network = env
            .get("NETWORK")
            .map(|network| network.parse::<Network>())
            .transpose()
            .context("failed to parse environment variable GENTX_NETWORK as network")?;

        let recipients = env
            .get("RECIPIENTS")
            .map(|recipients| {
                recipients
                    .split(',')
                    .map(str::trim)
                    .filter(|recipient| !recipient.is_empty())
                    .map(|recipient| recipient.parse::<RewardRecipient>())
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()
            .context("failed to parse environment variable GENTX_RECIPIENTS")?;

        Ok(Self {
            recipients,
            pool_wallet_address: get_string("POOL_WALLET_ADDRESS"),
            support_transaction_messages: get_bool("SUPPORT_TRANSACTION_MESSAGES"),
            pool_tag: get_string("POOL_TAG"),
            message: get_string("MESSAGE"),
            network,
            pubkey_hash_version: get_u8("PUBKEY_HASH_VERSION")?,
            script_hash_version: get_u8("SCRIPT_HASH_VERSION")?,
            extranonce2_size: get_usize("EXTRANONCE2_SIZE")?,
        })
    }

    /// Merge self with another layer, self takes priority.
    fn or(self, other: Self) -> Self {
        Self {
            recipients: self.recipients.or(other.recipients),
            pool_wallet_address: self.pool_wallet_address.or(other.pool_wallet_address),
            support_transaction_messages: self
                .support_transaction_messages
                .or(other.support_transaction_messages),
            pool_tag: self.pool_tag.or(other.pool_tag),
            message: self.message.or(other.message),
            network: self.network.or(other.network),
            pubkey_hash_version: self.pubkey_hash_version.or(other.pubkey_hash_version),
            script_hash_version: self.script_hash_version.or(other.script_hash_version),
            extranonce2_size: self.extranonce2_size.or(other.extranonce2_size),
        }
    }
}

/// Fully resolved and validated configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    network: Network,
    address_versions: AddressVersions,
    rewards: RewardConfig,
    #[serde(skip)]
    resolved: ResolvedRewards,
    support_transaction_messages: bool,
    pool_tag: String,
    message: String,
    extranonce2_size: usize,
}

impl Settings {
    /// Load settings from all sources with proper priority
    pub fn load(options: Options) -> anyhow::Result<Self> {
        let mut env = BTreeMap::<String, String>::new();

        for (var, value) in std::env::vars_os() {
            let Some(var) = var.to_str() else {
                continue;
            };

            let Some(key) = var.strip_prefix("GENTX_") else {
                continue;
            };

            env.insert(
                key.into(),
                value.into_string().map_err(|value| {
                    anyhow!(
                        "environment variable `{var}` not valid unicode: `{}`",
                        value.to_string_lossy()
                    )
                })?,
            );
        }

        Self::merge(options, env)
    }

    /// Merge command line options, environment, config file and defaults, in that order.
    pub fn merge(options: Options, env: BTreeMap<String, String>) -> anyhow::Result<Self> {
        let config = Config::from_options(&options).or(Config::from_env(&env)?);

        let config = match Self::find_config_path(&options, &env) {
            Some(path) => {
                debug!("Loading config file `{}`", path.display());
                config.or(Config::load(&path)?)
            }
            None => config,
        };

        Self::from_config(config)
    }

    fn find_config_path(options: &Options, env: &BTreeMap<String, String>) -> Option<PathBuf> {
        if let Some(path) = options
            .config
            .clone()
            .or_else(|| env.get("CONFIG").map(PathBuf::from))
        {
            return Some(path);
        }

        if let Some(dir) = options
            .config_dir
            .clone()
            .or_else(|| env.get("CONFIG_DIR").map(PathBuf::from))
        {
            let path = dir.join("gentx.json");
            if path.exists() {
                return Some(path);
            }
        }

        let path = dirs::config_dir()?.join("gentx").join("gentx.json");

        path.exists().then_some(path)
    }

    /// Apply defaults and validate.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let network = config.network.unwrap_or_default();

        let defaults = network.address_versions();

        let address_versions = AddressVersions {
            pubkey_hash: config.pubkey_hash_version.unwrap_or(defaults.pubkey_hash),
            script_hash: config.script_hash_version.unwrap_or(defaults.script_hash),
        };

        ensure!(
            address_versions.pubkey_hash != address_versions.script_hash,
            "pubkey hash and script hash version bytes must differ, both are {:#04x}",
            address_versions.pubkey_hash
        );

        let extranonce2_size = config.extranonce2_size.unwrap_or(DEFAULT_ENONCE2_SIZE);

        ensure!(
            (MIN_ENONCE2_SIZE..=MAX_ENONCE2_SIZE).contains(&extranonce2_size),
            "extranonce2 size must be between {MIN_ENONCE2_SIZE} and {MAX_ENONCE2_SIZE} bytes, got {extranonce2_size}"
        );

        let pool_wallet_address = config.pool_wallet_address.context(
            "no pool wallet address configured, pass `--pool-wallet-address` or set `poolWalletAddress`",
        )?;

        let rewards = RewardConfig::new(config.recipients.unwrap_or_default(), pool_wallet_address)
            .context("invalid reward configuration")?;

        let resolved = rewards
            .resolve(address_versions)
            .context("invalid reward configuration")?;

        let settings = Self {
            network,
            address_versions,
            rewards,
            resolved,
            support_transaction_messages: config.support_transaction_messages.unwrap_or_default(),
            pool_tag: config.pool_tag.unwrap_or_else(|| DEFAULT_POOL_TAG.into()),
            message: config.message.unwrap_or_else(|| DEFAULT_MESSAGE.into()),
            extranonce2_size,
        };

        info!(
            "Paying {} recipients and pool wallet {} on {network}",
            settings.rewards.recipients().len(),
            settings.rewards.pool_wallet(),
        );

        Ok(settings)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn address_versions(&self) -> AddressVersions {
        self.address_versions
    }

    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    pub fn resolved_rewards(&self) -> &ResolvedRewards {
        &self.resolved
    }

    pub fn extranonce2_size(&self) -> usize {
        self.extranonce2_size
    }

    pub fn extranonce_counter(&self) -> ExtraNonceCounter {
        ExtraNonceCounter::new(0, self.extranonce2_size)
    }

    pub fn generation_options(&self, timestamp: u64) -> GenerationOptions {
        GenerationOptions {
            pool_tag: self.pool_tag.clone(),
            message: self.message.clone(),
            support_transaction_messages: self.support_transaction_messages,
            timestamp,
        }
    }
}
