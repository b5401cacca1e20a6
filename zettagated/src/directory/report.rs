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

//! Shape of the infrastructure report: host name -> host facts, including
//! which containers live there. Producers emit more fields than we read;
//! everything we do not inspect is ignored.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Report(pub HashMap<String, Host>);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Host {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub net_addr: Vec<String>,
    #[serde(default)]
    pub pools: Vec<String>,
    #[serde(default)]
    pub containers: HashMap<String, Container>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub ip: String,
}

impl Report {
    /// The host a container lives on.
    pub fn host_of(&self, container: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, host)| host.containers.contains_key(container))
            .map(|(name, _)| name.as_str())
    }

    /// The container whose recorded address matches `ip`.
    pub fn tenant_by_ip(&self, ip: &str) -> Option<&str> {
        self.0.values().find_map(|host| {
            host.containers
                .iter()
                .find(|(_, container)| container.ip == ip)
                .map(|(name, _)| name.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub const REPORT_JSON: &str = r#"{
        "storage01": {
            "Hostname": "storage01.internal",
            "NetAddr": ["10.0.0.11"],
            "Pools": ["tank"],
            "CpuUsage": 12,
            "Containers": {
                "alpha": {"status": "running", "template": "ubuntu", "ip": "10.1.0.5"},
                "beta": {"status": "stopped", "template": "debian", "ip": "10.1.0.6"}
            }
        },
        "storage02": {
            "Hostname": "storage02.internal",
            "NetAddr": ["10.0.0.12"],
            "Pools": ["tank"],
            "Containers": {
                "gamma": {"status": "running", "template": "alpine", "ip": "10.1.0.7"}
            }
        }
    }"#;

    #[test]
    fn finds_host_by_container() {
        let report: Report =
            serde_json::from_str(REPORT_JSON).expect("report");
        assert_eq!(report.host_of("alpha"), Some("storage01"));
        assert_eq!(report.host_of("gamma"), Some("storage02"));
        assert_eq!(report.host_of("missing"), None);
    }

    #[test]
    fn finds_tenant_by_ip() {
        let report: Report =
            serde_json::from_str(REPORT_JSON).expect("report");
        assert_eq!(report.tenant_by_ip("10.1.0.5"), Some("alpha"));
        assert_eq!(report.tenant_by_ip("10.9.9.9"), None);
    }

    #[test]
    fn unknown_producer_fields_are_ignored() {
        let report: Report =
            serde_json::from_str(REPORT_JSON).expect("report");
        assert_eq!(report.0["storage01"].hostname, "storage01.internal");
        assert_eq!(report.0["storage01"].pools, vec!["tank"]);
    }
}
