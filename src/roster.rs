//! The attendance roster: one row per signer, indexed from zero.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Stable identifier of a roster row (its 0-based index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub usize);

impl RowId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub id: RowId,
    pub name: String,
    pub designation: String,
}

const DEFAULT_NAMES: [&str; 9] = [
    "Prof.(Dr.) Ravi K Dhar",
    "Prof.(Dr.) Meenakshi Narula",
    "Dr. Harsha Ratnani",
    "Mr. Deepak Sharma",
    "Dr. Puja Munjal",
    "Dr. Anisha Tandon",
    "Dr. Abha Pandey",
    "Ms. Neha Chhabra",
    "Dr. Priti Sharma",
];

/// Entry as accepted in a roster file: a bare name or a full record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RosterEntry {
    Name(String),
    Record {
        name: String,
        #[serde(default)]
        designation: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    rows: Vec<RosterRow>,
}

impl Roster {
    /// Rows from plain names; designations default to `Designation {n}`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| RosterRow {
                id: RowId(i),
                name: name.into(),
                designation: default_designation(i),
            })
            .collect();
        Roster { rows }
    }

    /// Parse a JSON array of names or `{ "name", "designation"? }` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<RosterEntry> = serde_json::from_str(json)
            .map_err(|e| Error::RosterError(format!("expected a JSON array of rows: {}", e)))?;
        let mut rows = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            let (name, designation) = match entry {
                RosterEntry::Name(name) => (name, None),
                RosterEntry::Record { name, designation } => (name, designation),
            };
            if name.trim().is_empty() {
                return Err(Error::RosterError(format!("row {} has an empty name", i)));
            }
            rows.push(RosterRow {
                id: RowId(i),
                name,
                designation: designation.unwrap_or_else(|| default_designation(i)),
            });
        }
        Ok(Roster { rows })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn rows(&self) -> &[RosterRow] {
        &self.rows
    }

    pub fn get(&self, id: RowId) -> Option<&RosterRow> {
        self.rows.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::from_names(DEFAULT_NAMES)
    }
}

fn default_designation(index: usize) -> String {
    format!("Designation {}", index + 1)
}
