/* -------------------------------------------------------------------------- *\
 *                |   █████╗ ██╗   ██╗██████╗  █████╗ ███████╗ |              *
 *                |  ██╔══██╗██║   ██║██╔══██╗██╔══██╗██╔════╝ |              *
 *                |  ███████║██║   ██║██████╔╝███████║█████╗   |              *
 *                |  ██╔══██║██║   ██║██╔══██╗██╔══██║██╔══╝   |              *
 *                |  ██║  ██║╚██████╔╝██║  ██║██║  ██║███████╗ |              *
 *                |  ╚═╝  ╚═╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚══════╝ |              *
 *                +--------------------------------------------+              *
 *                                                                            *
 *                         Distributed Systems Runtime                        *
 * -------------------------------------------------------------------------- *
 * Copyright 2022 - 2024, the aurae contributors                              *
 * SPDX-License-Identifier: Apache-2.0                                        *
\* -------------------------------------------------------------------------- */

//! Gateway configuration.
//!
//! [`GateConfig::try_default()`] follows an ordered priority for searching
//! for configuration on the machine:
//!
//! 1. ${HOME}/.zettagate/config
//! 2. /etc/zettagate/config

pub use self::{
    directory_config::DirectoryConfig,
    executor_config::ExecutorConfig,
    gateway_config::{AuthStrategy, GatewayConfig},
};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

mod directory_config;
mod executor_config;
mod gateway_config;

/// Top level configuration for the gateway daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Where the infrastructure report lives.
    pub directory: DirectoryConfig,
    /// How to reach the storage hosts.
    pub executor: ExecutorConfig,
    /// How the gateway itself serves and authenticates.
    pub gateway: GatewayConfig,
}

impl GateConfig {
    /// Attempt to load configuration from well-known locations.
    pub fn try_default() -> Result<Self> {
        let home = std::env::var("HOME").unwrap_or_default();

        let search_paths =
            [&format!("{home}/.zettagate/config"), "/etc/zettagate/config"];

        for path in search_paths {
            match Self::parse_from_toml_file(path) {
                Ok(config) => {
                    return Ok(config);
                }
                Err(e) => {
                    eprintln!(
                        "warning: failed to parse config at {path}: {e}"
                    );
                    continue;
                }
            }
        }

        Err(anyhow!("unable to find valid config file"))
    }

    /// Attempt to parse a config file into memory.
    pub fn parse_from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config_toml = String::new();
        let mut file = File::open(path)?;

        if file
            .read_to_string(&mut config_toml)
            .with_context(|| "could not read GateConfig toml")?
            == 0
        {
            return Err(anyhow!("empty config"));
        }

        Self::parse_from_toml(&config_toml)
    }

    pub fn parse_from_toml(config_toml: &str) -> Result<Self> {
        Ok(toml::from_str(config_toml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_complete_config() {
        let config = GateConfig::parse_from_toml(
            r#"
[directory]
report_url = "http://reports.internal:8080/latest"

[executor]
user = "zetta"
port = 22
key_file = "/etc/zettagate/id_ed25519"
timeout_secs = 30

[gateway]
bind_addr = "0.0.0.0:8085"
auth = "cookie"
salt = "s3cr3t"
"#,
        )
        .expect("config");

        assert_eq!(
            config.directory.report_url,
            "http://reports.internal:8080/latest"
        );
        assert_eq!(config.executor.user, "zetta");
        assert_eq!(config.executor.port, 22);
        assert_eq!(config.gateway.auth, AuthStrategy::Cookie);
        assert_eq!(config.gateway.salt.as_deref(), Some("s3cr3t"));
    }

    #[test]
    fn auth_defaults_to_ip_matching() {
        let config = GateConfig::parse_from_toml(
            r#"
[directory]
report_url = "http://reports.internal:8080/latest"

[executor]
user = "zetta"
key_file = "/etc/zettagate/id_ed25519"

[gateway]
bind_addr = "0.0.0.0:8085"
"#,
        )
        .expect("config");

        assert_eq!(config.gateway.auth, AuthStrategy::Ip);
        assert_eq!(config.executor.port, 22);
        assert_eq!(config.executor.timeout_secs, 60);
    }

    #[test]
    fn rejects_unknown_auth_strategy() {
        let result = GateConfig::parse_from_toml(
            r#"
[directory]
report_url = "http://reports.internal:8080/latest"

[executor]
user = "zetta"
key_file = "/etc/zettagate/id_ed25519"

[gateway]
bind_addr = "0.0.0.0:8085"
auth = "mtls"
"#,
        );
        assert!(result.is_err());
    }
}
