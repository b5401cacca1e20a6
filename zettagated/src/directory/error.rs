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

use crate::exec::ExecError;
use std::net::IpAddr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to fetch directory report: {source}")]
    FetchReport { source: reqwest::Error },
    #[error("directory report returned status {status}")]
    ReportStatus { status: u16 },
    #[error("container '{container}' not found in directory report")]
    UnknownContainer { container: String },
    #[error("no tenant recorded for address {ip}")]
    UnknownIp { ip: IpAddr },
    #[error("could not derive storage root for '{container}': {reason}")]
    StorageRoot { container: String, reason: String },
    #[error(transparent)]
    Exec(#[from] ExecError),
}
