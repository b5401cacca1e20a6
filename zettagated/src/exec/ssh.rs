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

use super::{ExecError, Execute, Output, Result};
use async_trait::async_trait;
use client::ExecutorConfig;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::trace;

/// Key-authenticated SSH transport to the storage hosts.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    user: String,
    port: u16,
    key_file: String,
    timeout: Duration,
}

impl SshExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            user: config.user.clone(),
            port: config.port,
            key_file: config.key_file.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl Execute for SshExecutor {
    async fn exec(&self, host: &str, command: &str) -> Result<Output> {
        trace!(host, command, "executing remote command");

        let mut ssh = Command::new("ssh");
        let _ = ssh
            .arg("-i")
            .arg(&self.key_file)
            .arg("-p")
            .arg(self.port.to_string())
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(format!("{}@{host}", self.user))
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, ssh.output())
            .await
            .map_err(|_| ExecError::TimedOut { timeout: self.timeout })?
            .map_err(|source| ExecError::Spawn { source })?;

        Ok(Output {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code().unwrap_or(-1),
        })
    }
}
