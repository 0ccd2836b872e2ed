// Reader settings for the hivex terminal client
// Priority: CLI args > Environment variables > Config file > Defaults

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.hive.blog/";
pub const DEFAULT_VIEWER_URL: &str = "view-post-hive";
pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_CONFIG_PATH: &str = "hivex.toml";

/// Hivex - Hive Blog Terminal Reader
///
/// Terminal UI for reading a Hive account's blog over the condenser API.
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "hivex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hive Blog Terminal Reader", long_about = None)]
pub struct CliArgs {
    /// Hive account whose blog to read (leading '@' accepted)
    #[arg(short, long, env = "HIVE_ACCOUNT")]
    pub account: Option<String>,

    /// Condenser API endpoint URL
    #[arg(long, env = "HIVE_API_URL")]
    pub api_url: Option<String>,

    /// Number of posts to list (1-100)
    #[arg(short, long, env = "HIVE_LIST_LIMIT")]
    pub limit: Option<u32>,

    /// Viewer page URL or slug embedded in shareable post links
    #[arg(long, env = "HIVE_VIEWER_URL")]
    pub viewer_url: Option<String>,

    /// RPC request timeout in milliseconds (1000-60000)
    #[arg(long, env = "HIVE_RPC_TIMEOUT_MS")]
    pub rpc_timeout_ms: Option<u64>,

    /// Open a single post instead of the list ("@author/permlink")
    #[arg(long)]
    pub post: Option<String>,

    /// Config file path (TOML format)
    #[arg(long, env = "HIVEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the resolved settings to the config file and exit
    #[arg(long)]
    pub save: bool,
}

/// Settings loaded from the TOML config file. Every key is optional; the
/// file only pins what the user saved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub account: Option<String>,
    pub api_url: Option<String>,
    pub limit: Option<u32>,
    pub viewer_url: Option<String>,
    pub rpc_timeout_ms: Option<u64>,
}

/// Fully resolved settings. `account` may still be empty, which the
/// assemblers report as not-configured without touching the network.
#[derive(Clone, Debug)]
pub struct Config {
    pub account: String,
    pub api_url: String,
    pub limit: u32,
    pub viewer_url: String,
    pub rpc_timeout_ms: u64,
    pub post: Option<String>,
    pub save: bool,
    pub config_path: PathBuf,
}

/// Load configuration with the full priority chain: CLI > Env > File > Defaults.
/// CLI and env are already merged by the arg parser.
pub fn load() -> Result<Config> {
    resolve(CliArgs::parse())
}

/// Resolve parsed args against the config file and defaults.
pub fn resolve(args: CliArgs) -> Result<Config> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let file = if config_path.exists() {
        log::info!("📄 loading settings from {}", config_path.display());
        load_from_file(&config_path)?
    } else {
        ConfigFile::default()
    };

    let account = normalize_account(
        &args
            .account
            .or(file.account)
            .unwrap_or_default(),
    );

    // An empty URL means "use the public node", not an error.
    let api_url = args
        .api_url
        .or(file.api_url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    validate_url(&api_url, "HIVE_API_URL")?;

    let limit = args.limit.or(file.limit).unwrap_or(DEFAULT_LIMIT);
    let limit = validate_in_range(limit, 1, 100, "HIVE_LIST_LIMIT")?;

    let viewer_url = args
        .viewer_url
        .or(file.viewer_url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_VIEWER_URL.to_string());

    let rpc_timeout_ms = args
        .rpc_timeout_ms
        .or(file.rpc_timeout_ms)
        .unwrap_or(DEFAULT_RPC_TIMEOUT_MS);
    let rpc_timeout_ms = validate_in_range(rpc_timeout_ms, 1000, 60000, "HIVE_RPC_TIMEOUT_MS")?;

    Ok(Config {
        account,
        api_url,
        limit,
        viewer_url,
        rpc_timeout_ms,
        post: args.post,
        save: args.save,
        config_path,
    })
}

fn load_from_file(path: &PathBuf) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

/// Trim whitespace and an optional leading '@' from an account name.
pub fn normalize_account(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_string()
}

/// Split a `--post` argument of the form `@author/permlink`. Missing parts
/// come back empty; the assembler rejects those before any network call.
pub fn parse_post_arg(arg: &str) -> (String, String) {
    match arg.split_once('/') {
        Some((author, permlink)) => (normalize_account(author), permlink.trim().to_string()),
        None => (normalize_account(arg), String::new()),
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

impl Config {
    /// Persist the resolved settings back to the config file.
    pub fn save(&self) -> Result<()> {
        let file = ConfigFile {
            account: Some(self.account.clone()).filter(|a| !a.is_empty()),
            api_url: Some(self.api_url.clone()),
            limit: Some(self.limit),
            viewer_url: Some(self.viewer_url.clone()),
            rpc_timeout_ms: Some(self.rpc_timeout_ms),
        };
        let text = toml::to_string_pretty(&file).context("Failed to serialize settings")?;
        std::fs::write(&self.config_path, text)
            .with_context(|| format!("Failed to write config file: {}", self.config_path.display()))?;
        Ok(())
    }

    /// Log the settings a run starts with (useful for debugging)
    pub fn log_summary(&self) {
        log::info!("⚙️  hivex configuration:");
        if self.account.is_empty() {
            log::info!("  👤 Account: (not set)");
        } else {
            log::info!("  👤 Account: @{}", self.account);
        }
        log::info!("  🌐 API URL: {}", self.api_url);
        log::info!("  📃 List limit: {}", self.limit);
        log::info!("  ⏱️  RPC timeout: {}ms", self.rpc_timeout_ms);
    }
}
