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

//! Multi-tenant HTTP gateway in front of a shared zfs pool.
//!
//! Each container tenant sees only the datasets mounted under its own
//! rootfs. The gateway authenticates the caller, translates dataset paths
//! between the host namespace and the tenant's view, and relays the
//! requested zfs verb to the storage host over ssh.
// Lint groups: https://doc.rust-lang.org/rustc/lints/groups.html
#![warn(future_incompatible, nonstandard_style, unused)]
#![warn(
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    unconditional_recursion,
    unused_comparisons,
    while_true
)]
#![warn(missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_results
)]
#![warn(clippy::unwrap_used)]

pub mod directory;
pub mod exec;
pub mod gateway;
pub mod logging;
pub mod zfs;

mod graceful_shutdown;

use crate::directory::DirectoryClient;
use crate::exec::{Execute, SshExecutor};
use crate::gateway::{identity, GatewayState};
use crate::zfs::dispatch::Dispatcher;
use crate::zfs::guard::PermissionGuard;
use client::GateConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Wire the executor, directory client, dispatcher and guard together and
/// serve until SIGTERM or SIGINT.
pub async fn run(config: GateConfig) -> anyhow::Result<()> {
    let executor: Arc<dyn Execute> =
        Arc::new(SshExecutor::new(&config.executor));
    let directory = Arc::new(DirectoryClient::new(
        config.directory.report_url.clone(),
        executor.clone(),
    ));
    let dispatcher =
        Arc::new(Dispatcher::new(directory.clone(), executor.clone()));
    let guard =
        Arc::new(PermissionGuard::new(directory.clone(), executor.clone()));
    let resolver = identity::from_config(&config.gateway, directory)?;

    let state = GatewayState { dispatcher, guard, resolver };
    let app = gateway::router(state);

    let listener =
        tokio::net::TcpListener::bind(&config.gateway.bind_addr).await?;
    info!("listening on {}", config.gateway.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(graceful_shutdown::shutdown_signal())
    .await?;

    Ok(())
}
