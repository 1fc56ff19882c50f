// src/lookup/group.rs

use serde::Serialize;
use std::collections::HashSet;

use super::render::{classify_value, ValueKind};
use crate::config::GroupingConfig;
use crate::schema::{normalize, Record};

/// One populated cell, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayField {
    pub header: String,
    /// Trimmed value.
    pub value: String,
    pub kind: ValueKind,
    /// Position of the header in the dataset.
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Up to and including the section boundary.
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayGroup {
    pub label: String,
    pub section: Section,
    pub fields: Vec<DisplayField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Primary group, secondary group.
    Flat,
    /// Primary section split in two at the sub-boundary, then the secondary group.
    Split,
}

impl GroupingMode {
    pub fn for_config(config: &GroupingConfig) -> Self {
        match config.sub_boundary.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => GroupingMode::Split,
            _ => GroupingMode::Flat,
        }
    }

    pub fn group_count(self) -> usize {
        match self {
            GroupingMode::Flat => 2,
            GroupingMode::Split => 3,
        }
    }
}

/// Populated fields of `record` in header order. Repeated header names are
/// emitted once; columns with a blank header are never shown.
pub fn populated_fields<S: AsRef<str>>(headers: &[S], record: &Record) -> Vec<DisplayField> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .map(AsRef::<str>::as_ref)
        .enumerate()
        .filter(|(_, h)| !normalize(h).is_empty() && seen.insert(*h))
        .filter_map(|(column, header)| {
            record.populated(header).map(|value| DisplayField {
                header: header.to_string(),
                value: value.to_string(),
                kind: classify_value(header, value),
                column,
            })
        })
        .collect()
}

/// Position of the first header whose normalized form equals `name`'s.
pub fn header_position<S: AsRef<str>>(headers: &[S], name: &str) -> Option<usize> {
    let target = normalize(name);
    if target.is_empty() {
        return None;
    }
    headers.iter().position(|h| normalize(h.as_ref()) == target)
}

/// Split point for `fields`: after every field at or before `boundary`, or
/// the rounded-up half when there is no boundary.
fn split_index(fields: &[DisplayField], boundary: Option<usize>) -> usize {
    match boundary {
        Some(pos) => fields.partition_point(|f| f.column <= pos),
        None => (fields.len() + 1) / 2,
    }
}

/// Partition the populated fields of `record` into display groups.
///
/// Every populated field lands in exactly one group, groups keep column order,
/// and the number of groups is fixed by the mode: two when flat, three when split.
pub fn group_fields<S: AsRef<str>>(
    headers: &[S],
    record: &Record,
    config: &GroupingConfig,
) -> (GroupingMode, Vec<DisplayGroup>) {
    let mode = GroupingMode::for_config(config);
    let mut primary = populated_fields(headers, record);

    // 1) section boundary, midpoint fallback
    let boundary = header_position(headers, &config.section_boundary);
    let secondary = primary.split_off(split_index(&primary, boundary));

    let group = |label: &str, section, fields| DisplayGroup {
        label: label.to_string(),
        section,
        fields,
    };

    let mut groups = Vec::with_capacity(mode.group_count());
    match mode {
        GroupingMode::Flat => {
            groups.push(group(config.primary_label.as_str(), Section::Primary, primary));
        }
        GroupingMode::Split => {
            // 2) sub-boundary counts only when it sits inside the primary section
            let primary_end = match boundary {
                Some(pos) => Some(pos),
                None => secondary.first().map(|f| f.column.saturating_sub(1)),
            };
            let sub = config
                .sub_boundary
                .as_deref()
                .and_then(|name| header_position(headers, name))
                .filter(|&pos| primary_end.map_or(true, |end| pos <= end));
            let right = primary.split_off(split_index(&primary, sub));
            groups.push(group(config.primary_label.as_str(), Section::Primary, primary));
            groups.push(group(config.primary_label.as_str(), Section::Primary, right));
        }
    }
    groups.push(group(config.secondary_label.as_str(), Section::Secondary, secondary));

    (mode, groups)
}
