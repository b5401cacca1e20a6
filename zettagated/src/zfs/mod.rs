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

//! The namespace-translation and permission-boundary engine: table parsing,
//! virtual-path translation, the per-request permission guard, and the
//! command dispatcher that relays verbs to the storage hosts.

pub use error::{Result, ZfsError};

use crate::exec::{Execute, Output};

pub mod command;
pub mod dispatch;
pub mod guard;
pub mod namespace;
pub mod table;

mod error;

/// Run a command remotely and treat a nonzero exit as an execution failure.
pub(crate) async fn run_checked(
    executor: &dyn Execute,
    host: &str,
    command: &str,
) -> Result<Output> {
    let output = executor.exec(host, command).await?;
    if !output.success() {
        return Err(ZfsError::Execution {
            command: command.to_string(),
            stderr: output.stderr,
        });
    }
    Ok(output)
}
