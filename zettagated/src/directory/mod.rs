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

//! Tenant directory: which containers live on which hosts, and where each
//! container's storage root sits.
//!
//! Host and storage-root lookups derive from near-static infrastructure
//! facts, so they are cached for the process lifetime behind mutex-guarded
//! maps; the lock is held across first-time population so two
//! concurrent requests for the same tenant compute the value once.
//! IP-to-tenant resolution is deliberately *not* cached: addresses move when
//! containers do, and a stale answer would hand one tenant another's view.

pub use error::{DirectoryError, Result};
pub use report::{Container, Host, Report};

use crate::exec::Execute;
use crate::zfs::command::CommandLine;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

mod error;
mod report;

pub struct DirectoryClient {
    report_url: String,
    http: reqwest::Client,
    executor: Arc<dyn Execute>,
    hosts: Mutex<HashMap<String, String>>,
    roots: Mutex<HashMap<String, String>>,
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("report_url", &self.report_url)
            .finish_non_exhaustive()
    }
}

impl DirectoryClient {
    pub fn new<S: Into<String>>(
        report_url: S,
        executor: Arc<dyn Execute>,
    ) -> Self {
        Self {
            report_url: report_url.into(),
            http: reqwest::Client::new(),
            executor,
            hosts: Mutex::new(HashMap::new()),
            roots: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the current infrastructure report.
    pub async fn fetch_report(&self) -> Result<Report> {
        let response = self
            .http
            .get(&self.report_url)
            .send()
            .await
            .map_err(|source| DirectoryError::FetchReport { source })?;

        if !response.status().is_success() {
            return Err(DirectoryError::ReportStatus {
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|source| DirectoryError::FetchReport { source })
    }

    /// The storage host a tenant's container runs on.
    pub async fn host_for(&self, tenant: &str) -> Result<String> {
        let mut hosts = self.hosts.lock().await;
        if let Some(host) = hosts.get(tenant) {
            return Ok(host.clone());
        }

        let report = self.fetch_report().await?;
        let host = report.host_of(tenant).ok_or_else(|| {
            DirectoryError::UnknownContainer { container: tenant.to_string() }
        })?;

        debug!(tenant, host, "resolved tenant host");
        let _ = hosts.insert(tenant.to_string(), host.to_string());
        Ok(host.to_string())
    }

    /// The tenant whose container owns the given address.
    pub async fn tenant_for_ip(&self, ip: IpAddr) -> Result<String> {
        let report = self.fetch_report().await?;
        report
            .tenant_by_ip(&ip.to_string())
            .map(String::from)
            .ok_or(DirectoryError::UnknownIp { ip })
    }

    /// The absolute path prefix all of a tenant's datasets mount under.
    ///
    /// Derived from the container's lxc config on its host: the third
    /// whitespace field of the `lxc.rootfs` line.
    pub async fn storage_root_for(&self, tenant: &str) -> Result<String> {
        let mut roots = self.roots.lock().await;
        if let Some(root) = roots.get(tenant) {
            return Ok(root.clone());
        }

        let host = self.host_for(tenant).await?;
        let command = CommandLine::new("/usr/bin/grep")
            .args(["-e", "lxc.rootfs"])
            .arg(format!("/var/lib/lxc/{tenant}/config"))
            .render();
        let output = self.executor.exec(&host, &command).await?;

        if !output.success() {
            return Err(DirectoryError::StorageRoot {
                container: tenant.to_string(),
                reason: format!("grep exited {}: {}", output.code, output.stderr),
            });
        }

        let root = output
            .stdout
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(2))
            .ok_or_else(|| DirectoryError::StorageRoot {
                container: tenant.to_string(),
                reason: "no lxc.rootfs entry in container config".to_string(),
            })?;

        debug!(tenant, root, "resolved tenant storage root");
        let _ = roots.insert(tenant.to_string(), root.to_string());
        Ok(root.to_string())
    }

    #[cfg(test)]
    pub(crate) async fn cache_host(&self, tenant: &str, host: &str) {
        let _ = self
            .hosts
            .lock()
            .await
            .insert(tenant.to_string(), host.to_string());
    }

    #[cfg(test)]
    pub(crate) async fn cache_root(&self, tenant: &str, root: &str) {
        let _ = self
            .roots
            .lock()
            .await
            .insert(tenant.to_string(), root.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::fake::FakeExecutor;
    use pretty_assertions::assert_eq;

    const GREP_ALPHA: &str =
        "/usr/bin/grep -e lxc.rootfs /var/lib/lxc/alpha/config";

    #[tokio::test]
    async fn storage_root_parses_lxc_config_line() {
        let executor = Arc::new(FakeExecutor::new());
        executor.respond(
            GREP_ALPHA,
            "lxc.rootfs = /srv/lxc/alpha/rootfs\n",
        );
        let directory =
            DirectoryClient::new("http://unused.invalid", executor.clone());
        directory.cache_host("alpha", "storage01").await;

        let root = directory.storage_root_for("alpha").await.expect("root");
        assert_eq!(root, "/srv/lxc/alpha/rootfs");
    }

    #[tokio::test]
    async fn storage_root_is_cached_per_tenant() {
        let executor = Arc::new(FakeExecutor::new());
        executor.respond(
            GREP_ALPHA,
            "lxc.rootfs = /srv/lxc/alpha/rootfs\n",
        );
        let directory =
            DirectoryClient::new("http://unused.invalid", executor.clone());
        directory.cache_host("alpha", "storage01").await;

        let _ = directory.storage_root_for("alpha").await.expect("root");
        let _ = directory.storage_root_for("alpha").await.expect("root");
        // one remote call despite two lookups
        assert_eq!(executor.calls().len(), 1);
    }

    #[tokio::test]
    async fn missing_rootfs_entry_is_an_error() {
        let executor = Arc::new(FakeExecutor::new());
        executor.respond(GREP_ALPHA, "");
        let directory =
            DirectoryClient::new("http://unused.invalid", executor.clone());
        directory.cache_host("alpha", "storage01").await;

        let result = directory.storage_root_for("alpha").await;
        assert!(matches!(
            result,
            Err(DirectoryError::StorageRoot { .. })
        ));
    }
}
