use {
    anyhow::{Context, anyhow, ensure},
    arguments::Arguments,
    bitcoin::{
        OutPoint, PubkeyHash, ScriptBuf, ScriptHash, Txid, base58,
        hashes::Hash,
        opcodes::{self, all::OP_PUSHNUM_1},
        script::write_scriptint,
    },
    byteorder::{ByteOrder, LittleEndian},
    clap::Parser,
    serde::{
        Deserialize, Serialize,
        de::{self, Deserializer},
    },
    snafu::Snafu,
    std::{
        collections::BTreeMap,
        env,
        fmt::{self, Display, Formatter},
        fs,
        io,
        path::{Path, PathBuf},
        process,
        str::FromStr,
        sync::atomic::{AtomicU32, Ordering},
        time::{SystemTime, UNIX_EPOCH},
    },
    tracing::{debug, info, trace},
};

pub use {
    block_template::{BlockTemplate, CoinbaseAux},
    destination::{AddressVersions, Destination},
    encoder::{Encoder, varint, varint_len},
    error::Error,
    extranonce::{ExtraNonceCounter, ExtraNoncePlaceholder, Extranonce},
    generation::{GenerationOptions, GenerationTransaction, TxIn},
    outputs::{Outputs, TxOut},
    reward::{ResolvedRewards, RewardConfig, RewardRecipient, SharePercent},
    script::SignatureScript,
    settings::{Network, Settings},
};

mod arguments;
pub mod block_template;
pub mod destination;
pub mod encoder;
pub mod error;
pub mod extranonce;
pub mod generation;
mod logs;
pub mod options;
pub mod outputs;
pub mod reward;
pub mod script;
pub mod settings;
pub mod subcommand;

pub const DEFAULT_POOL_TAG: &str = "/gentx/";
pub const DEFAULT_MESSAGE: &str = "https://github.com/parasitepool/gentx";
pub const ENONCE1_SIZE: usize = 4;
pub const DEFAULT_ENONCE2_SIZE: usize = 4;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

fn unix_now() -> anyhow::Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?
        .as_secs())
}

pub fn main() {
    logs::init();

    let args = Arguments::parse();

    match args.run() {
        Err(err) => {
            eprintln!("error: {err}");

            for (i, cause) in err.chain().skip(1).enumerate() {
                if i == 0 {
                    eprintln!();
                    eprintln!("because:");
                }
                eprintln!("- {cause}");
            }

            if env::var_os("RUST_BACKTRACE")
                .map(|val| val == "1")
                .unwrap_or_default()
            {
                eprintln!();
                eprintln!("{}", err.backtrace());
            }

            process::exit(1);
        }
        Ok(()) => process::exit(0),
    }
}
