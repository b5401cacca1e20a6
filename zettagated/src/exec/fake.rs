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

//! Scripted in-memory executor for tests. Every command a test expects must
//! be scripted; an unscripted command panics with the rendered line so the
//! test shows exactly what the code tried to run.

use super::{ExecError, Execute, Output, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct FakeExecutor {
    responses: Mutex<HashMap<String, Output>>,
    transport_failures: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful command.
    pub fn respond(&self, command: &str, stdout: &str) {
        let _ = self.responses.lock().expect("lock").insert(
            command.to_string(),
            Output { stdout: stdout.to_string(), ..Default::default() },
        );
    }

    /// Script a command that runs but exits nonzero.
    pub fn respond_failure(&self, command: &str, stderr: &str) {
        let _ = self.responses.lock().expect("lock").insert(
            command.to_string(),
            Output { stderr: stderr.to_string(), code: 1, ..Default::default() },
        );
    }

    /// Script a transport-level failure (timeout).
    pub fn fail_transport(&self, command: &str) {
        let _ = self
            .transport_failures
            .lock()
            .expect("lock")
            .insert(command.to_string());
    }

    /// Every `(host, command)` pair that reached the executor, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Execute for FakeExecutor {
    async fn exec(&self, host: &str, command: &str) -> Result<Output> {
        self.calls
            .lock()
            .expect("lock")
            .push((host.to_string(), command.to_string()));

        if self.transport_failures.lock().expect("lock").contains(command) {
            return Err(ExecError::TimedOut {
                timeout: Duration::from_secs(0),
            });
        }

        match self.responses.lock().expect("lock").get(command) {
            Some(output) => Ok(output.clone()),
            None => panic!("unscripted command on {host}: {command}"),
        }
    }
}
