use std::time::Duration;

use clap::Args;
use serde::Deserialize;

use super::error::EmitterError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5005;
pub const DEFAULT_INTERVAL_SECONDS: f64 = 1.0;

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub interval_seconds: Option<f64>,
    pub seed: Option<u64>,
    pub count: Option<u64>,
    pub file: Option<String>,
}

pub fn load_config(path: &str) -> Result<Config, EmitterError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| EmitterError::Config(format!("cannot read config {path}: {e}")))?;
    toml::from_str(&content).map_err(|e| EmitterError::Config(format!("bad config {path}: {e}")))
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug, Default)]
pub struct EmitArgs {
    /// Path to the TOML config file
    #[arg(long, default_value = "emitter.toml", env = "VEHICLE_EMITTER_CONFIG")]
    pub config: String,

    /// Destination host (IP or hostname) [default: 127.0.0.1]
    #[arg(long)]
    pub host: Option<String>,

    /// Destination UDP port [default: 5005]
    #[arg(long)]
    pub port: Option<u16>,

    /// Pause between emissions, seconds [default: 1]
    #[arg(long)]
    pub interval_seconds: Option<f64>,

    /// PRNG seed (0 = OS entropy, non-reproducible)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after N emissions (0 = run until Ctrl+C)
    #[arg(long)]
    pub count: Option<u64>,

    /// Replay records from a file instead of generating random ones
    #[arg(long)]
    pub file: Option<String>,
}

// ═══════════════════════════════════════════════════════════════
//  Effective — merged config
// ═══════════════════════════════════════════════════════════════

/// Final configuration: defaults < config file < CLI/env.
#[derive(Debug)]
pub struct Effective {
    pub host: String,
    pub port: u16,
    pub interval: Duration,
    pub seed: u64,
    pub count: Option<u64>,
    pub file: Option<String>,
}

impl Effective {
    pub fn new(args: &EmitArgs) -> Result<Self, EmitterError> {
        let cfg = match load_config(&args.config) {
            Ok(c) => c,
            Err(e) => {
                if std::path::Path::new(&args.config).exists() {
                    return Err(e);
                }
                Config::default()
            }
        };

        let host = args
            .host
            .clone()
            .or(cfg.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        if host.trim().is_empty() {
            return Err(EmitterError::Config("host must not be empty".into()));
        }

        let port = args.port.or(cfg.port).unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(EmitterError::Config("port must not be 0".into()));
        }

        let secs = args
            .interval_seconds
            .or(cfg.interval_seconds)
            .unwrap_or(DEFAULT_INTERVAL_SECONDS);
        if secs.is_nan() || secs <= 0.0 {
            return Err(EmitterError::Config(format!("interval_seconds must be > 0, got {secs}")));
        }
        let interval = Duration::try_from_secs_f64(secs)
            .map_err(|e| EmitterError::Config(format!("interval_seconds {secs}: {e}")))?;
        if interval.is_zero() {
            return Err(EmitterError::Config(format!("interval_seconds {secs} rounds to zero")));
        }

        Ok(Self {
            host,
            port,
            interval,
            seed: args.seed.or(cfg.seed).unwrap_or(0),
            count: args.count.or(cfg.count).filter(|&n| n > 0),
            file: args.file.clone().or(cfg.file),
        })
    }
}
