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

//! The single enforcement point between a tenant-supplied target name and
//! the underlying pool.
//!
//! The accessible set is recomputed from a fresh listing on every check;
//! pool state changes between requests, and a cached answer here would be a
//! security defect, not an optimization.

use super::{
    command::CommandLine,
    namespace,
    run_checked,
    table::DatasetTable,
    Result,
};
use crate::directory::DirectoryClient;
use crate::exec::Execute;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct PermissionGuard {
    directory: Arc<DirectoryClient>,
    executor: Arc<dyn Execute>,
}

impl PermissionGuard {
    pub fn new(
        directory: Arc<DirectoryClient>,
        executor: Arc<dyn Execute>,
    ) -> Self {
        Self { directory, executor }
    }

    /// Decide whether `target` names a dataset or snapshot the tenant owns.
    ///
    /// Absolute paths are authorized unconditionally: in every code path
    /// that reaches this check, an absolute path was computed by the gateway
    /// itself, never taken from the caller. Listing failures propagate as
    /// execution errors; a transient backend fault must never read as a
    /// denial.
    pub async fn is_authorized(
        &self,
        tenant: &str,
        target: &str,
    ) -> Result<bool> {
        if target.starts_with('/') {
            return Ok(true);
        }

        let host = self.directory.host_for(tenant).await?;
        let root = self.directory.storage_root_for(tenant).await?;
        let accessible = self.accessible_set(&host, &root).await?;

        // A snapshot is authorized iff its parent dataset is.
        let parent = target.split('@').next().unwrap_or(target);
        let authorized = accessible
            .iter()
            .any(|name| name == target || name == parent);

        if !authorized {
            debug!(tenant, target, "target outside accessible set");
        }
        Ok(authorized)
    }

    /// All dataset names mounted under the tenant root, plus the snapshot
    /// names of those datasets.
    async fn accessible_set(
        &self,
        host: &str,
        root: &str,
    ) -> Result<Vec<String>> {
        let datasets = run_checked(
            self.executor.as_ref(),
            host,
            &CommandLine::zfs("list").render(),
        )
        .await?;
        let own: Vec<String> = row_names(&namespace::scope_to_root(
            &DatasetTable::parse(&datasets.stdout),
            root,
        ));

        let everything = run_checked(
            self.executor.as_ref(),
            host,
            &CommandLine::zfs("list").args(["-t", "all"]).render(),
        )
        .await?;
        let all_table = DatasetTable::parse(&everything.stdout);

        let mut accessible =
            row_names(&namespace::scope_to_root(&all_table, root));
        accessible
            .extend(row_names(&namespace::snapshot_rows(&all_table, &own)));
        Ok(accessible)
    }
}

fn row_names(rows: &[super::table::DatasetRow]) -> Vec<String> {
    rows.iter().filter_map(|row| row.name().map(String::from)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::fake::FakeExecutor;
    use crate::zfs::ZfsError;

    const LIST: &str = "/usr/bin/zfs list";
    const LIST_ALL: &str = "/usr/bin/zfs list -t all";

    const DATASETS: &str = "\
NAME        USED  AVAIL  REFER  MOUNTPOINT
tank        1.2G  10.0G   96K   /tank
tank/alpha  512M  10.0G   512M  /srv/lxc/alpha/rootfs/data
tank/beta   512M  10.0G   512M  /srv/lxc/beta/rootfs/data
";

    const EVERYTHING: &str = "\
NAME                USED  AVAIL  REFER  MOUNTPOINT
tank                1.2G  10.0G   96K   /tank
tank/alpha          512M  10.0G   512M  /srv/lxc/alpha/rootfs/data
tank/alpha@nightly    0B      -   512M  -
tank/beta           512M  10.0G   512M  /srv/lxc/beta/rootfs/data
tank/beta@nightly     0B      -   512M  -
";

    async fn alpha_guard() -> (PermissionGuard, Arc<FakeExecutor>) {
        let executor = Arc::new(FakeExecutor::new());
        executor.respond(LIST, DATASETS);
        executor.respond(LIST_ALL, EVERYTHING);
        let directory = Arc::new(DirectoryClient::new(
            "http://unused.invalid",
            executor.clone(),
        ));
        directory.cache_host("alpha", "storage01").await;
        directory.cache_root("alpha", "/srv/lxc/alpha/rootfs").await;
        (PermissionGuard::new(directory, executor.clone()), executor)
    }

    #[tokio::test]
    async fn own_dataset_is_authorized() {
        let (guard, _executor) = alpha_guard().await;
        assert!(guard
            .is_authorized("alpha", "tank/alpha")
            .await
            .expect("check"));
    }

    #[tokio::test]
    async fn own_snapshot_is_authorized() {
        let (guard, _executor) = alpha_guard().await;
        assert!(guard
            .is_authorized("alpha", "tank/alpha@nightly")
            .await
            .expect("check"));
    }

    #[tokio::test]
    async fn foreign_dataset_is_denied() {
        let (guard, _executor) = alpha_guard().await;
        assert!(!guard
            .is_authorized("alpha", "tank/beta")
            .await
            .expect("check"));
    }

    #[tokio::test]
    async fn foreign_snapshot_is_denied() {
        let (guard, _executor) = alpha_guard().await;
        assert!(!guard
            .is_authorized("alpha", "tank/beta@nightly")
            .await
            .expect("check"));
    }

    #[tokio::test]
    async fn absolute_target_is_authorized_without_listing() {
        let (guard, executor) = alpha_guard().await;
        assert!(guard
            .is_authorized("alpha", "/data")
            .await
            .expect("check"));
        // no listing was needed to decide
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn listing_failure_is_execution_error_not_denial() {
        let executor = Arc::new(FakeExecutor::new());
        executor.respond_failure(LIST, "pool is busy");
        let directory = Arc::new(DirectoryClient::new(
            "http://unused.invalid",
            executor.clone(),
        ));
        directory.cache_host("alpha", "storage01").await;
        directory.cache_root("alpha", "/srv/lxc/alpha/rootfs").await;
        let guard = PermissionGuard::new(directory, executor);

        let result = guard.is_authorized("alpha", "tank/alpha").await;
        assert!(matches!(result, Err(ZfsError::Execution { .. })));
    }
}
