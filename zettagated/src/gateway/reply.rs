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

//! The two success reply shapes, chosen explicitly by verb, plus the error
//! body. Tabular verbs answer with header + row objects; everything else
//! answers with raw output lines.

use crate::exec::Output;
use crate::zfs::dispatch::Listing;
use crate::zfs::table::DatasetRow;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Table { stdout: TableStdout, stderr: Vec<String> },
    Plain { stdout: PlainStdout, stderr: Vec<String> },
}

#[derive(Debug, Serialize)]
pub struct TableStdout {
    format: &'static str,
    header: Vec<String>,
    data: Vec<DatasetRow>,
}

#[derive(Debug, Serialize)]
pub struct PlainStdout {
    data: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl Reply {
    pub fn table(listing: Listing) -> Self {
        Reply::Table {
            stdout: TableStdout {
                format: "table",
                header: listing.header,
                data: listing.rows,
            },
            stderr: split_lines(&listing.stderr),
        }
    }

    pub fn plain(output: &Output) -> Self {
        Reply::Plain {
            stdout: PlainStdout { data: split_lines(&output.stdout) },
            stderr: split_lines(&output.stderr),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Split on newline, keeping the empty trailing segment after a final
/// newline. Clients of the JSON API grew around that behavior.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_reply_shape() {
        let listing = Listing {
            header: vec!["name".to_string(), "mountpoint".to_string()],
            rows: vec![DatasetRow::from_pairs(&[
                ("name", "tank/alpha"),
                ("mountpoint", "/data"),
            ])],
            stderr: String::new(),
        };
        let json =
            serde_json::to_value(Reply::table(listing)).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "stdout": {
                    "format": "table",
                    "header": ["name", "mountpoint"],
                    "data": [{"name": "tank/alpha", "mountpoint": "/data"}],
                },
                "stderr": [""],
            })
        );
    }

    #[test]
    fn plain_reply_preserves_trailing_empty_segment() {
        let output = Output {
            stdout: "one\ntwo\n".to_string(),
            stderr: String::new(),
            code: 0,
        };
        let json =
            serde_json::to_value(Reply::plain(&output)).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "stdout": {"data": ["one", "two", ""]},
                "stderr": [""],
            })
        );
    }
}
