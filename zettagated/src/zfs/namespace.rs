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

//! Namespace translation between a tenant's virtual view and real pool
//! paths. Tenants only ever see mount paths relative to their own storage
//! root; creation-class argument lists are rewritten so the real destination
//! is computed by the gateway, never taken from caller input.

use super::table::{DatasetRow, DatasetTable};

/// Strip `storage_root` out of a real mountpoint and re-anchor at `/`.
///
/// An empty root is the identity transform; it would otherwise match
/// everywhere and collapse every path to `/`.
pub fn strip_root(mountpoint: &str, storage_root: &str) -> String {
    if storage_root.is_empty() {
        return mountpoint.to_string();
    }
    let stripped = mountpoint.replace(storage_root, "");
    let mut virtual_path = String::from("/");
    virtual_path.push_str(stripped.trim_start_matches('/'));
    virtual_path
}

/// Rows whose mountpoint falls under `storage_root`, with the mountpoint
/// rewritten to the tenant's virtual view.
pub fn scope_to_root(table: &DatasetTable, storage_root: &str) -> Vec<DatasetRow> {
    if storage_root.is_empty() {
        return Vec::new();
    }
    table
        .rows
        .iter()
        .filter(|row| {
            row.mountpoint().is_some_and(|mp| mp.contains(storage_root))
        })
        .map(|row| {
            let mut row = row.clone();
            if let Some(mountpoint) = row.mountpoint() {
                let virtual_path = strip_root(mountpoint, storage_root);
                row.set("mountpoint", virtual_path);
            }
            row
        })
        .collect()
}

/// Rows naming a snapshot of any dataset in `datasets`.
pub fn snapshot_rows(
    table: &DatasetTable,
    datasets: &[String],
) -> Vec<DatasetRow> {
    table
        .rows
        .iter()
        .filter(|row| {
            row.name().is_some_and(|name| {
                datasets
                    .iter()
                    .any(|dataset| name.contains(&format!("{dataset}@")))
            })
        })
        .cloned()
        .collect()
}

/// Rewrite a create/clone argument list so the new dataset mounts under
/// `storage_root` no matter what the caller asked for.
///
/// An explicit `mountpoint=` value inside a `-o` group gets the root
/// prefixed; a `-o` group without one gets `,mountpoint=<root>/<last>`
/// appended; no `-o` group at all gets a fresh `-o mountpoint=<root>/<last>`
/// pair in front of the final (dataset name) argument.
pub fn rewrite_mount_args(args: &[String], storage_root: &str) -> Vec<String> {
    let last = args.last().cloned().unwrap_or_default();
    let mut result = Vec::with_capacity(args.len() + 2);
    let mut in_options = false;
    let mut done = false;

    for (i, arg) in args.iter().enumerate() {
        let mut arg = arg.clone();
        if in_options {
            if let Some((_, value)) = arg.split_once("mountpoint=") {
                // Already rooted values stay put; rewriting is idempotent.
                // Path-component match, not a string prefix: a sibling such
                // as `<root>-evil` must still be rewritten.
                let rooted = value == storage_root
                    || value.starts_with(&format!("{storage_root}/"));
                if !rooted {
                    arg = arg.replacen(
                        "mountpoint=",
                        &format!("mountpoint={storage_root}"),
                        1,
                    );
                }
            } else {
                arg.push_str(&format!(",mountpoint={storage_root}/{last}"));
            }
            done = true;
            in_options = false;
        }
        if i == args.len() - 1 && !done {
            result.push("-o".to_string());
            result.push(format!("mountpoint={storage_root}/{arg}"));
        }
        if arg.starts_with('-') && arg.contains('o') {
            in_options = true;
        }
        result.push(arg);
    }

    result
}
