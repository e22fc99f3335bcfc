use dtnd_bpv7::eid::Eid;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    /// One of `trace`, `debug`, `info`, `warn` or `error`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// The endpoint identifier of this node
    pub node_id: Eid,

    #[serde(default)]
    pub listen: Vec<ListenConfig>,

    #[serde(default)]
    pub peer: Vec<PeerConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ListenConfig {
    /// The node the receiver accepts bundles for, defaulting to `node_id`
    pub node: Option<Eid>,

    #[serde(flatten)]
    pub protocol: ListenProtocol,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum ListenProtocol {
    Stcp(dtnd_stcp::config::ListenerConfig),
}

#[derive(Debug, Deserialize)]
pub struct PeerConfig {
    /// The node at the other end, if known
    #[serde(default)]
    pub node: Eid,

    #[serde(flatten)]
    pub protocol: PeerProtocol,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum PeerProtocol {
    Stcp(dtnd_stcp::config::SenderConfig),

    /// Skipped with a warning rather than failing the whole configuration
    #[serde(other)]
    Unknown,
}

pub fn load(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    } else {
        // Optional default config file in current directory
        builder = builder.add_source(config::File::from(Path::new("dtnd.toml")).required(false));
    }

    // Allow environment variables to override
    builder = builder.add_source(config::Environment::with_prefix("DTND"));

    builder.build()?.try_deserialize().map_err(Into::into)
}
