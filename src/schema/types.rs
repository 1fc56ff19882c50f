// src/schema/types.rs

use serde::Serialize;
use std::collections::HashMap;

use super::normalize::normalize;

/// One row of the dataset: header → value, in column order.
///
/// Values are stored exactly as read. A header is *present* when the row has
/// a cell for it; the value is *populated* when it is non-blank after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(header, value)` pairs. Repeated headers keep the first value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.insert(k, v);
        }
        record
    }

    /// Store `value` under `header` unless the header is already present.
    /// Returns `false` when the header was shadowed by an earlier cell.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) -> bool {
        let header = header.into();
        if self.get(&header).is_some() {
            return false;
        }
        self.fields.push((header, value.into()));
        true
    }

    /// Raw stored value for `header`.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed value for `header`, or `None` when absent or blank.
    pub fn populated(&self, header: &str) -> Option<&str> {
        self.get(header).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Headers and rows of one snapshot of the backing data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    /// Column names as they appear in the source, duplicates included.
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Record>) -> Self {
        Self { headers, rows }
    }
}

/// Normalized header → original spelling. The first spelling seen wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderIndex {
    map: HashMap<String, String>,
}

impl HeaderIndex {
    pub fn build<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = HashMap::with_capacity(headers.len());
        for header in headers {
            let header = header.as_ref();
            let norm = normalize(header);
            if norm.is_empty() {
                continue;
            }
            map.entry(norm).or_insert_with(|| header.to_string());
        }
        Self { map }
    }

    /// Original spelling for an already-normalized name.
    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.map.get(normalized).map(String::as_str)
    }

    /// Original spelling for any spelling of a header.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.get(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Which detection rule picked the key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDetection {
    /// Exact normalized match against a configured candidate name.
    Candidate,
    /// Header contains both the key token and the id token.
    TokenPair,
    /// Header contains the key token alone.
    KeyToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyColumn {
    pub name: String,
    pub detection: KeyDetection,
}

/// Output of schema resolution for one dataset snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaResult {
    pub headers: Vec<String>,
    #[serde(skip)]
    pub header_index: HeaderIndex,
    /// `None` means the schema is incomplete and no query can match.
    pub key_column: Option<KeyColumn>,
}

impl SchemaResult {
    pub fn key_name(&self) -> Option<&str> {
        self.key_column.as_ref().map(|k| k.name.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.key_column.is_some()
    }
}
