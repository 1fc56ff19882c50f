// src/schema/resolve.rs

use tracing::{debug, warn};

use super::normalize::normalize;
use super::types::{Dataset, HeaderIndex, KeyColumn, KeyDetection, SchemaResult};
use crate::config::KeyConfig;

/// Build the header index and detect the key column for `dataset`.
///
/// Never fails: a dataset with no recognisable key column (including one with
/// zero headers) comes back with `key_column == None`.
pub fn resolve_schema(dataset: &Dataset, config: &KeyConfig) -> SchemaResult {
    let header_index = HeaderIndex::build(&dataset.headers);
    let key_column = detect_key_column(&dataset.headers, &header_index, config);

    match &key_column {
        Some(key) => debug!(
            key = %key.name,
            detection = ?key.detection,
            headers = dataset.headers.len(),
            rows = dataset.rows.len(),
            "resolved key column"
        ),
        None => warn!(
            headers = ?dataset.headers,
            "no key column found; lookups disabled for this snapshot"
        ),
    }

    SchemaResult {
        headers: dataset.headers.clone(),
        header_index,
        key_column,
    }
}

/// Run the detection rules in priority order; first hit wins.
pub fn detect_key_column<S: AsRef<str>>(
    headers: &[S],
    index: &HeaderIndex,
    config: &KeyConfig,
) -> Option<KeyColumn> {
    let key_token = normalize(&config.key_token);
    let id_token = normalize(&config.id_token);

    let (name, detection) = by_candidate(index, &config.candidates)
        .map(|name| (name, KeyDetection::Candidate))
        .or_else(|| {
            by_token_pair(headers, &key_token, &id_token).map(|name| (name, KeyDetection::TokenPair))
        })
        .or_else(|| by_key_token(headers, &key_token).map(|name| (name, KeyDetection::KeyToken)))?;

    Some(KeyColumn {
        name: name.to_string(),
        detection,
    })
}

/// Rule 1: exact normalized match against the candidate list, in list order.
pub fn by_candidate<'a, C: AsRef<str>>(index: &'a HeaderIndex, candidates: &[C]) -> Option<&'a str> {
    candidates.iter().find_map(|cand| {
        let norm = normalize(cand.as_ref());
        if norm.is_empty() {
            None
        } else {
            index.get(&norm)
        }
    })
}

/// Rule 2: first header containing both tokens.
pub fn by_token_pair<'a, S: AsRef<str>>(
    headers: &'a [S],
    key_token: &str,
    id_token: &str,
) -> Option<&'a str> {
    if key_token.is_empty() || id_token.is_empty() {
        return None;
    }
    headers.iter().map(AsRef::<str>::as_ref).find(|h| {
        let n = normalize(h);
        n.contains(key_token) && n.contains(id_token)
    })
}

/// Rule 3: first header containing the key token.
pub fn by_key_token<'a, S: AsRef<str>>(headers: &'a [S], key_token: &str) -> Option<&'a str> {
    if key_token.is_empty() {
        return None;
    }
    headers
        .iter()
        .map(AsRef::<str>::as_ref)
        .find(|h| normalize(h).contains(key_token))
}
