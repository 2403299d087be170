//! Command line arguments.

use bus_gateway::GatewayConfig;
use clap::Parser;
use std::path::PathBuf;

/// Default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// bus-jsonrpc: JSON-RPC 2.0 over WebSocket for the data bus
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "bus-jsonrpc")]
#[command(about = "JSON-RPC 2.0 WebSocket gateway for the data bus")]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Listen host, overrides the configuration file
    pub host: Option<String>,

    /// Listen port, overrides the configuration file
    pub port: Option<u16>,
}

impl Cli {
    /// Load the configuration file and apply command line overrides.
    pub fn load_config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::load(&self.config);
        self.apply(&mut config);
        config
    }

    /// Positional arguments win over the file.
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}
