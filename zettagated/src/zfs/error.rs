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

use crate::directory::DirectoryError;
use crate::exec::ExecError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ZfsError>;

#[derive(Debug, Error)]
pub enum ZfsError {
    #[error("remote execution failed: {source}")]
    Transport {
        #[from]
        source: ExecError,
    },
    #[error("'{command}' failed: {stderr}")]
    Execution { command: String, stderr: String },
    #[error("setting option '{option}' forbidden")]
    ForbiddenOption { option: String },
    /// The creation step succeeded; the remount into the tenant did not.
    /// Carries the creation stdout so the caller can see what already
    /// happened.
    #[error("created, but not mounted: {reason}; creation output: {stdout}")]
    CreatedNotMounted { stdout: String, reason: String },
    #[error("dataset '{dataset}' missing from listing after creation")]
    NotListed { dataset: String },
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("unexpected argument: {argument}")]
    UnexpectedArgument { argument: String },
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
