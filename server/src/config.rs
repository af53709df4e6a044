use noor_core::config::{load_config, NoorConfig};
use noor_core::errors::NoorResult;
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub noor: NoorConfig,
}

impl AppConfig {
    /// Loads the shared NoorAI configuration (file, then environment).
    pub fn load(config_path: Option<&Path>, bind_addr: SocketAddr) -> NoorResult<Self> {
        Ok(AppConfig {
            bind_addr,
            noor: load_config(config_path)?,
        })
    }
}
