//! Configuration file management for adsb-decode.
//!
//! Reads/writes `~/.adsb-decode/config.yaml` with the receiver name, the
//! feed source to connect to, the read chunk size and the output format.

use std::path::PathBuf;

use crate::types::{AdsbError, Result};

/// Beast feeds are served on 30005 by most decoders.
pub const DEFAULT_PORT: u16 = 30005;
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub receiver: ReceiverConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverConfig {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub host: String,
    pub port: u16,
    pub chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// How extracted frames are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Hex,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Hex => "hex",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = AdsbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(OutputFormat::Hex),
            "json" => Ok(OutputFormat::Json),
            other => Err(AdsbError::Config(format!("unknown output format: {other}"))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            receiver: ReceiverConfig {
                name: "default".into(),
            },
            source: SourceConfig {
                host: "127.0.0.1".into(),
                port: DEFAULT_PORT,
                chunk_size: DEFAULT_CHUNK_SIZE,
            },
            output: OutputConfig {
                format: OutputFormat::Hex,
            },
        }
    }
}

/// Get the config directory path (`~/.adsb-decode/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".adsb-decode")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.adsb-decode/config.yaml`.
///
/// Returns default config if file doesn't exist.
pub fn load_config() -> Config {
    let path = config_file();
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(text) => parse_config(&text),
        Err(_) => Config::default(),
    }
}

/// Save config to `~/.adsb-decode/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| AdsbError::Config(e.to_string()))?;

    let path = config_file();
    std::fs::write(&path, serialize_config(config)).map_err(|e| AdsbError::Config(e.to_string()))?;

    Ok(path)
}

/// Parse simple YAML-like config text. Unknown keys and bad values are ignored.
pub fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = strip_comment(val.trim());

        if !is_indented {
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }

        match (current_section.as_deref(), key) {
            (Some("receiver"), "name") => {
                if let Some(v) = parse_string_value(val) {
                    config.receiver.name = v;
                }
            }
            (Some("source"), "host") => {
                if let Some(v) = parse_string_value(val) {
                    config.source.host = v;
                }
            }
            (Some("source"), "port") => {
                if let Ok(v) = val.parse::<u16>() {
                    config.source.port = v;
                }
            }
            (Some("source"), "chunk_size") => {
                if let Some(v) = val.parse::<usize>().ok().filter(|&n| n > 0) {
                    config.source.chunk_size = v;
                }
            }
            (Some("output"), "format") => {
                if let Some(v) = parse_string_value(val).and_then(|s| s.parse().ok()) {
                    config.output.format = v;
                }
            }
            _ => {}
        }
    }

    config
}

fn strip_comment(val: &str) -> &str {
    if val.starts_with('"') || val.starts_with('\'') {
        return val;
    }
    match val.find(" #") {
        Some(idx) => val[..idx].trim_end(),
        None => val,
    }
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let lines = [
        "# adsb-decode configuration".to_string(),
        String::new(),
        "receiver:".into(),
        format!("  name: \"{}\"", config.receiver.name),
        String::new(),
        "source:".into(),
        format!("  host: \"{}\"", config.source.host),
        format!("  port: {}", config.source.port),
        format!("  chunk_size: {}", config.source.chunk_size),
        String::new(),
        "output:".into(),
        format!("  format: \"{}\"", config.output.format.as_str()),
    ];

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
