//! Env parsing and constants.

use std::path::PathBuf;

use alloy::signers::local::PrivateKeySigner;
use url::Url;

const DEFAULT_RPC: &str = "http://127.0.0.1:8545";

/// Anvil's pre-funded development account #0. Public test key, devnet only.
const DEV_ACCOUNT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

const OWNERSHIP_FILE: &str = "owned_models.json";

/// Runtime configuration for the museum app.
#[derive(Clone, Debug)]
pub struct MuseumConfig {
    pub rpc_url: Url,
    pub signer: Option<PrivateKeySigner>,
    pub auto_connect: bool,
    pub ownership_path: PathBuf,
    pub demo_owned: Vec<String>,
}

impl Default for MuseumConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC.parse().expect("default RPC URL is valid"),
            signer: DEV_ACCOUNT_KEY.parse().ok(),
            auto_connect: true,
            ownership_path: default_ownership_path(),
            demo_owned: Vec::new(),
        }
    }
}

/// Reads `RPC_URL`, `WALLET_PRIVATE_KEY`, `WALLET_AUTO_CONNECT`,
/// `OWNERSHIP_PATH` and `DEMO_OWNED`, falling back to devnet defaults.
pub fn museum_config() -> MuseumConfig {
    let defaults = MuseumConfig::default();

    let rpc_url = match std::env::var("RPC_URL") {
        Ok(raw) => raw.parse::<Url>().unwrap_or_else(|err| {
            eprintln!("sector77: invalid RPC_URL {raw:?}: {err}, using {DEFAULT_RPC}");
            defaults.rpc_url.clone()
        }),
        Err(_) => defaults.rpc_url.clone(),
    };

    let signer = match std::env::var("WALLET_PRIVATE_KEY") {
        Ok(raw) => match raw.trim().parse::<PrivateKeySigner>() {
            Ok(signer) => Some(signer),
            Err(err) => {
                eprintln!("sector77: invalid WALLET_PRIVATE_KEY: {err}; wallet disabled");
                None
            }
        },
        Err(_) => defaults.signer,
    };

    let auto_connect = match std::env::var("WALLET_AUTO_CONNECT") {
        Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
            eprintln!("sector77: invalid WALLET_AUTO_CONNECT {raw:?}, expected true/false");
            defaults.auto_connect
        }),
        Err(_) => defaults.auto_connect,
    };

    let ownership_path = std::env::var("OWNERSHIP_PATH")
        .map(PathBuf::from)
        .unwrap_or(defaults.ownership_path);

    let demo_owned = std::env::var("DEMO_OWNED")
        .map(|raw| parse_name_list(&raw))
        .unwrap_or_default();

    MuseumConfig {
        rpc_url,
        signer,
        auto_connect,
        ownership_path,
        demo_owned,
    }
}

fn default_ownership_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("sector77").join(OWNERSHIP_FILE))
        .unwrap_or_else(|| PathBuf::from(OWNERSHIP_FILE))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
