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

//! Verb dispatch against the storage hosts.
//!
//! Single-step verbs are one rendered command each. `create` and `clone` are
//! a two-step saga: creation, then a remount into the tenant's running
//! container. The intermediate state is real: a failed second step leaves
//! the dataset created but unmounted, and the caller sees that distinctly
//! ([`ZfsError::CreatedNotMounted`]) rather than as a generic failure.
//! Nothing here retries; a partial outcome is reported, not undone.

use super::{
    command::CommandLine,
    namespace,
    run_checked,
    table::{DatasetRow, DatasetTable},
    Result, ZfsError,
};
use crate::directory::DirectoryClient;
use crate::exec::{Execute, Output};
use std::sync::Arc;
use tracing::info;

/// A scoped listing ready for the table reply shape.
#[derive(Debug, Clone)]
pub struct Listing {
    pub header: Vec<String>,
    pub rows: Vec<DatasetRow>,
    pub stderr: String,
}

#[derive(Debug)]
pub struct Dispatcher {
    directory: Arc<DirectoryClient>,
    executor: Arc<dyn Execute>,
}

impl Dispatcher {
    pub fn new(
        directory: Arc<DirectoryClient>,
        executor: Arc<dyn Execute>,
    ) -> Self {
        Self { directory, executor }
    }

    /// The bare usage verb relays whatever `zfs` prints; `zfs` without
    /// arguments exits nonzero after printing usage, so no exit check here.
    pub async fn usage(&self, tenant: &str) -> Result<Output> {
        let host = self.directory.host_for(tenant).await?;
        let command = CommandLine::zfs("").render();
        Ok(self.executor.exec(&host, &command).await?)
    }

    /// `zfs list <args>`, scoped to the tenant's subtree. When the caller
    /// asked for snapshots (`-t all` or `-t snap...`), the tenant's own
    /// snapshot rows are appended: they carry no mountpoint, so the root
    /// filter alone would drop them.
    pub async fn list(
        &self,
        tenant: &str,
        args: &[String],
    ) -> Result<Listing> {
        let host = self.directory.host_for(tenant).await?;
        let root = self.directory.storage_root_for(tenant).await?;

        let command = CommandLine::zfs("list").args(args.to_vec()).render();
        let output =
            run_checked(self.executor.as_ref(), &host, &command).await?;
        let table = DatasetTable::parse(&output.stdout);
        let mut rows = namespace::scope_to_root(&table, &root);

        if wants_snapshots(args) {
            let plain = run_checked(
                self.executor.as_ref(),
                &host,
                &CommandLine::zfs("list").render(),
            )
            .await?;
            let own: Vec<String> = namespace::scope_to_root(
                &DatasetTable::parse(&plain.stdout),
                &root,
            )
            .iter()
            .filter_map(|row| row.name().map(String::from))
            .collect();
            rows.extend(namespace::snapshot_rows(&table, &own));
        }

        Ok(Listing { header: table.header, rows, stderr: output.stderr })
    }

    /// Single-step pass-through verbs: snapshot, destroy, rename, mount,
    /// umount. The target was already authorized by the permission guard.
    pub async fn relay(
        &self,
        tenant: &str,
        verb: &str,
        args: &[String],
    ) -> Result<Output> {
        let host = self.directory.host_for(tenant).await?;
        let command = CommandLine::zfs(verb).args(args.to_vec()).render();
        info!(tenant, %command, "dispatching");
        run_checked(self.executor.as_ref(), &host, &command).await
    }

    /// `create` and `clone`: rewrite the argument list so the new dataset
    /// mounts under the tenant root, create it, then remount it into the
    /// tenant's container so it becomes visible inside.
    pub async fn create(
        &self,
        tenant: &str,
        verb: &str,
        args: &[String],
    ) -> Result<Output> {
        let dataset = args
            .last()
            .cloned()
            .ok_or(ZfsError::MissingArgument("dataset name"))?;
        let host = self.directory.host_for(tenant).await?;
        let root = self.directory.storage_root_for(tenant).await?;

        let rewritten = namespace::rewrite_mount_args(args, &root);
        let command = CommandLine::zfs(verb).args(rewritten).render();
        info!(tenant, %command, "dispatching");
        let created =
            run_checked(self.executor.as_ref(), &host, &command).await?;

        if let Err(e) = self.remount(tenant, &host, &root, &dataset).await {
            return Err(ZfsError::CreatedNotMounted {
                stdout: created.stdout,
                reason: e.to_string(),
            });
        }

        Ok(created)
    }

    /// `set` permits exactly one option: `mountpoint`. Anything else is
    /// rejected before a command line exists. `mountpoint=none` unmounts
    /// inside the tenant; any other value moves the mountpoint on the host
    /// and remounts inside the tenant.
    ///
    /// The argument list must be exactly `[option, dataset]`. The guard
    /// authorized the final argument, so the dataset acted on here has to
    /// be that same token; a stray extra token would let a caller split
    /// the authorized name from the mutated one.
    pub async fn set(&self, tenant: &str, args: &[String]) -> Result<Output> {
        let (option, dataset) = match args {
            [option, dataset] => (option, dataset),
            [] | [_] => {
                return Err(ZfsError::MissingArgument("option and dataset"))
            }
            [_, _, extra, ..] => {
                return Err(ZfsError::UnexpectedArgument {
                    argument: extra.clone(),
                })
            }
        };
        let (name, value) = option
            .split_once('=')
            .ok_or(ZfsError::MissingArgument("option value"))?;
        if name != "mountpoint" {
            return Err(ZfsError::ForbiddenOption {
                option: name.to_string(),
            });
        }

        let host = self.directory.host_for(tenant).await?;

        if value == "none" {
            let command = CommandLine::lxc_attach(tenant, "/bin/umount")
                .arg(dataset.clone())
                .render();
            return run_checked(self.executor.as_ref(), &host, &command)
                .await;
        }

        let root = self.directory.storage_root_for(tenant).await?;
        let set = CommandLine::zfs("set")
            .arg(format!("mountpoint={root}{value}"))
            .arg(dataset.clone())
            .render();
        let _ = run_checked(self.executor.as_ref(), &host, &set).await?;

        let mount = CommandLine::lxc_attach(tenant, "/bin/mount")
            .args(["-t", "zfs"])
            .arg(dataset.clone())
            .arg(value)
            .render();
        run_checked(self.executor.as_ref(), &host, &mount).await
    }

    /// Unmount the fresh dataset on the host, then mount it inside the
    /// tenant's container at its virtual path.
    async fn remount(
        &self,
        tenant: &str,
        host: &str,
        root: &str,
        dataset: &str,
    ) -> Result<()> {
        let listing = run_checked(
            self.executor.as_ref(),
            host,
            &CommandLine::zfs("list").render(),
        )
        .await?;
        let rows = namespace::scope_to_root(
            &DatasetTable::parse(&listing.stdout),
            root,
        );

        let umount =
            CommandLine::zfs("umount").arg(dataset.to_string()).render();
        let _ = run_checked(self.executor.as_ref(), host, &umount).await?;

        let mountpoint = rows
            .iter()
            .find(|row| row.name() == Some(dataset))
            .and_then(|row| row.mountpoint())
            .ok_or_else(|| ZfsError::NotListed {
                dataset: dataset.to_string(),
            })?;

        let mount = CommandLine::lxc_attach(tenant, "/bin/mount")
            .args(["-t", "zfs"])
            .arg(dataset.to_string())
            .arg(mountpoint)
            .render();
        let _ = run_checked(self.executor.as_ref(), host, &mount).await?;
        Ok(())
    }
}

fn wants_snapshots(args: &[String]) -> bool {
    args.iter().enumerate().any(|(i, arg)| {
        arg.starts_with('-')
            && arg.contains('t')
            && args
                .get(i + 1)
                .is_some_and(|kind| kind == "all" || kind.contains("snap"))
    })
}
