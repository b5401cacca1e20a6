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

//! Remote command execution boundary.
//!
//! The gateway never interprets command output itself at this layer; it
//! hands a fully rendered command line to an [`Execute`] implementation and
//! gets back captured stdout/stderr plus the exit code. Transport problems
//! (cannot spawn, timed out) are errors; a command that ran and exited
//! nonzero is *not*; callers decide what a nonzero exit means for their
//! verb.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use ssh::SshExecutor;

mod ssh;

#[cfg(test)]
pub(crate) mod fake;

pub type Result<T> = std::result::Result<T, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn remote command: {source}")]
    Spawn { source: std::io::Error },
    #[error("remote command timed out after {timeout:?}")]
    TimedOut { timeout: Duration },
}

/// Captured result of a remote command that ran to completion.
#[derive(Debug, Clone, Default)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

impl Output {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

#[async_trait]
pub trait Execute: std::fmt::Debug + Send + Sync {
    /// Run `command` on `host` and capture its output.
    async fn exec(&self, host: &str, command: &str) -> Result<Output>;
}
