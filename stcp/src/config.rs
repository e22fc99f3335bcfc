use std::net::{IpAddr, Ipv6Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 35037;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ListenerConfig {
    // The TCP address:port to accept connections on
    pub endpoint: SocketAddr, // default = [::]:35037

    // Largest encoded bundle accepted from a connection
    pub max_bundle_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            endpoint: SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), DEFAULT_PORT),
            max_bundle_size: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SenderConfig {
    // The host:port to dial, also used verbatim as the sender's address
    pub endpoint: String,

    // Seconds to wait for the connection to be established
    #[cfg_attr(feature = "serde", serde(default = "default_connect_timeout"))]
    pub connect_timeout: u64,
}

fn default_connect_timeout() -> u64 {
    1
}

impl SenderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: default_connect_timeout(),
        }
    }

    pub fn connect_timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout)
    }
}
