// src/lookup/locate.rs

use std::collections::HashMap;

use crate::schema::{normalize, Record, SchemaResult};

/// Outcome of resolving a query against the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located<'a> {
    /// Query was blank after normalization; nothing was searched.
    NoQuery,
    /// Query was searched and nothing matched (or there is no key column).
    NoMatch,
    Matched { index: usize, record: &'a Record },
}

/// Linear scan: first row (in row order) whose normalized key equals the normalized query.
pub fn locate<'a>(schema: &SchemaResult, rows: &'a [Record], query: &str) -> Located<'a> {
    let target = normalize(query);
    if target.is_empty() {
        return Located::NoQuery;
    }
    let Some(key) = schema.key_name() else {
        return Located::NoMatch;
    };
    rows.iter()
        .enumerate()
        .find(|(_, r)| r.get(key).map(normalize).as_deref() == Some(target.as_str()))
        .map_or(Located::NoMatch, |(index, record)| Located::Matched { index, record })
}

/// Normalized key value → first row index carrying it.
///
/// Same answers as [`locate`], for callers that run many queries against one snapshot.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    map: HashMap<String, usize>,
}

impl KeyIndex {
    pub fn build(schema: &SchemaResult, rows: &[Record]) -> Self {
        let mut map = HashMap::with_capacity(rows.len());
        if let Some(key) = schema.key_name() {
            for (idx, row) in rows.iter().enumerate() {
                let norm = row.get(key).map(normalize).unwrap_or_default();
                if !norm.is_empty() {
                    map.entry(norm).or_insert(idx);
                }
            }
        }
        Self { map }
    }

    pub fn locate<'a>(&self, rows: &'a [Record], query: &str) -> Located<'a> {
        let target = normalize(query);
        if target.is_empty() {
            return Located::NoQuery;
        }
        match self.map.get(&target).and_then(|&i| rows.get(i).map(|r| (i, r))) {
            Some((index, record)) => Located::Matched { index, record },
            None => Located::NoMatch,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
