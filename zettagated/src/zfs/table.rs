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

//! Parser for the whitespace-tabular text `zfs list` prints.
//!
//! The first line is the header; every following line is zipped against the
//! header positionally. A field value containing embedded whitespace
//! misaligns its row. The format gives us no way to detect that, so a short
//! row simply lacks its trailing fields and callers tolerate the absence.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One data line, keyed by lower-cased header column.
///
/// Field order is the header order; lookups are by name. Missing trailing
/// fields are simply absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    fields: Vec<(String, String)>,
}

impl DatasetRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn mountpoint(&self) -> Option<&str> {
        self.get("mountpoint")
    }

    pub(crate) fn set(&mut self, column: &str, value: String) {
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

// Rows serialize as JSON objects in header order.
impl Serialize for DatasetRow {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parsed listing: header columns plus data rows. Created fresh per list
/// invocation and consumed immediately by the filtering logic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetTable {
    pub header: Vec<String>,
    pub rows: Vec<DatasetRow>,
}

impl DatasetTable {
    pub fn parse(raw: &str) -> Self {
        let mut lines = raw
            .trim_end_matches('\n')
            .split('\n')
            .filter(|line| !line.trim().is_empty());

        let Some(header_line) = lines.next() else {
            return Self::default();
        };

        let header: Vec<String> = header_line
            .split_whitespace()
            .map(|token| token.to_lowercase())
            .collect();

        let rows = lines
            .map(|line| DatasetRow {
                fields: header
                    .iter()
                    .cloned()
                    .zip(line.split_whitespace().map(String::from))
                    .collect(),
            })
            .collect();

        Self { header, rows }
    }
}
