// src/lookup/mod.rs

pub mod group;
pub mod locate;
pub mod render;

pub use group::{group_fields, populated_fields, DisplayField, DisplayGroup, GroupingMode, Section};
pub use locate::{locate, KeyIndex, Located};
pub use render::{classify_value, ValueKind};

use serde::Serialize;
use tracing::debug;

use crate::config::{GroupingConfig, LookupConfig};
use crate::schema::{normalize, resolve_schema, Dataset, Record, SchemaResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    /// Blank query; nothing searched.
    NoQuery,
    /// Query searched, no record matched.
    NoMatch,
    Matched,
}

/// Everything the presentation layer needs for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    pub status: LookupStatus,
    /// Query as supplied by the caller.
    pub query: String,
    pub key_column: Option<String>,
    /// No key column could be detected; queries can never match.
    pub schema_incomplete: bool,
    /// Row position of the matched record.
    pub record_index: Option<usize>,
    pub mode: GroupingMode,
    /// Empty unless `status` is `Matched`.
    pub groups: Vec<DisplayGroup>,
}

impl LookupResult {
    pub fn is_match(&self) -> bool {
        self.status == LookupStatus::Matched
    }
}

/// Find the record for `query` and build its display groups.
pub fn locate_and_group(
    schema: &SchemaResult,
    rows: &[Record],
    query: &str,
    config: &GroupingConfig,
) -> LookupResult {
    let located = locate(schema, rows, query);
    build_result(schema, located, query, config)
}

/// Like [`locate_and_group`], resolving through a prebuilt [`KeyIndex`].
pub fn locate_and_group_indexed(
    schema: &SchemaResult,
    index: &KeyIndex,
    rows: &[Record],
    query: &str,
    config: &GroupingConfig,
) -> LookupResult {
    let located = index.locate(rows, query);
    build_result(schema, located, query, config)
}

/// Resolve the schema of `dataset` and run one query against it.
pub fn lookup(dataset: &Dataset, query: &str, config: &LookupConfig) -> LookupResult {
    let schema = resolve_schema(dataset, &config.key);
    locate_and_group(&schema, &dataset.rows, query, &config.grouping)
}

fn build_result(
    schema: &SchemaResult,
    located: Located<'_>,
    query: &str,
    config: &GroupingConfig,
) -> LookupResult {
    let (status, record_index, mode, groups) = match located {
        Located::NoQuery => (
            LookupStatus::NoQuery,
            None,
            GroupingMode::for_config(config),
            Vec::new(),
        ),
        Located::NoMatch => {
            debug!(query = %normalize(query), "no match");
            (
                LookupStatus::NoMatch,
                None,
                GroupingMode::for_config(config),
                Vec::new(),
            )
        }
        Located::Matched { index, record } => {
            let (mode, groups) = group_fields(&schema.headers, record, config);
            debug!(row = index, groups = groups.len(), "matched");
            (LookupStatus::Matched, Some(index), mode, groups)
        }
    };

    LookupResult {
        status,
        query: query.to_string(),
        key_column: schema.key_name().map(str::to_string),
        schema_incomplete: !schema.is_complete(),
        record_index,
        mode,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::parse_csv_bytes;
    use anyhow::Result;

    const CSV: &str = "\
Template ID,Name,HPX Shutdown,Region,OUT_CHN,Cloud Provider,Runbook Link,Notes
 Tmpl-01 ,Alpha,Yes,EU,ch-1,AWS,https://wiki.test/alpha,
TMPL-02,Beta,,US,ch-2,GCP,wiki.test/beta,second
tmpl-01,Alpha duplicate,No,APAC,ch-3,Azure,,
";

    fn dataset() -> Result<Dataset> {
        parse_csv_bytes(CSV.as_bytes())
    }

    #[test]
    fn test_matched_three_groups() -> Result<()> {
        let ds = dataset()?;
        let res = lookup(&ds, "ＴＭＰＬ－０１", &LookupConfig::default());
        assert!(res.is_match());
        assert_eq!(res.record_index, Some(0));
        assert_eq!(res.key_column.as_deref(), Some("Template ID"));
        assert!(!res.schema_incomplete);
        assert_eq!(res.mode, GroupingMode::Split);
        assert_eq!(res.groups.len(), 3);

        let headers: Vec<Vec<&str>> = res
            .groups
            .iter()
            .map(|g| g.fields.iter().map(|f| f.header.as_str()).collect())
            .collect();
        assert_eq!(headers[0], vec!["Template ID", "Name", "HPX Shutdown"]);
        assert_eq!(headers[1], vec!["Region", "OUT_CHN"]);
        assert_eq!(headers[2], vec!["Cloud Provider", "Runbook Link"]);
        assert_eq!(res.groups[0].fields[0].value, "Tmpl-01");
        assert_eq!(res.groups[2].fields[1].kind, ValueKind::Link);
        Ok(())
    }

    #[test]
    fn test_matched_flat_groups() -> Result<()> {
        let ds = dataset()?;
        let mut config = LookupConfig::default();
        config.grouping.sub_boundary = None;
        let res = lookup(&ds, "tmpl-02", &config);
        assert_eq!(res.status, LookupStatus::Matched);
        assert_eq!(res.mode, GroupingMode::Flat);
        assert_eq!(res.groups.len(), 2);
        let first: Vec<&str> = res.groups[0].fields.iter().map(|f| f.header.as_str()).collect();
        assert_eq!(first, vec!["Template ID", "Name", "Region", "OUT_CHN"]);
        let link = &res.groups[1].fields[1];
        assert_eq!(link.header, "Runbook Link");
        assert_eq!(link.kind, ValueKind::Text);
        Ok(())
    }

    #[test]
    fn test_no_query_and_no_match_are_distinct() -> Result<()> {
        let ds = dataset()?;
        let cfg = LookupConfig::default();

        let res = lookup(&ds, "   ", &cfg);
        assert_eq!(res.status, LookupStatus::NoQuery);
        assert!(res.groups.is_empty());

        let res = lookup(&ds, "tmpl-99", &cfg);
        assert_eq!(res.status, LookupStatus::NoMatch);
        assert_eq!(res.query, "tmpl-99");
        assert!(res.groups.is_empty());
        assert_eq!(res.record_index, None);
        Ok(())
    }

    #[test]
    fn test_incomplete_schema() -> Result<()> {
        let ds = parse_csv_bytes(b"TID,Notes\nx,y\n")?;
        let cfg = LookupConfig::default();
        let res = lookup(&ds, "x", &cfg);
        assert!(res.schema_incomplete);
        assert_eq!(res.status, LookupStatus::NoMatch);
        assert_eq!(res.key_column, None);

        let res = lookup(&Dataset::default(), "", &cfg);
        assert!(res.schema_incomplete);
        assert_eq!(res.status, LookupStatus::NoQuery);
        Ok(())
    }

    #[test]
    fn test_indexed_lookup_matches_scan() -> Result<()> {
        let ds = dataset()?;
        let cfg = LookupConfig::default();
        let schema = resolve_schema(&ds, &cfg.key);
        let index = KeyIndex::build(&schema, &ds.rows);
        for q in ["", "tmpl-01", "TMPL-02", "tmpl-03"] {
            assert_eq!(
                locate_and_group_indexed(&schema, &index, &ds.rows, q, &cfg.grouping),
                locate_and_group(&schema, &ds.rows, q, &cfg.grouping),
            );
        }
        Ok(())
    }

    #[test]
    fn test_key_matches_under_full_case_folding() -> Result<()> {
        let ds = parse_csv_bytes("Template ID,Name\n\u{1f88}-01,Iota\n".as_bytes())?;
        let res = lookup(&ds, "\u{1f00}\u{3b9}-01", &LookupConfig::default());
        assert_eq!(res.status, LookupStatus::Matched);
        assert_eq!(res.record_index, Some(0));
        Ok(())
    }

    #[test]
    fn test_blank_header_column_not_displayed() -> Result<()> {
        let ds = parse_csv_bytes(b"Template ID,,Name\nT-1,orphan,Alpha\n")?;
        let res = lookup(&ds, "T-1", &LookupConfig::default());
        assert!(res.is_match());
        let shown: Vec<&str> = res
            .groups
            .iter()
            .flat_map(|g| g.fields.iter().map(|f| f.header.as_str()))
            .collect();
        assert_eq!(shown, vec!["Template ID", "Name"]);
        Ok(())
    }

    #[test]
    fn test_result_serializes() -> Result<()> {
        let ds = dataset()?;
        let res = lookup(&ds, "tmpl-01", &LookupConfig::default());
        let json = serde_json::to_value(&res)?;
        assert_eq!(json["status"], "matched");
        assert_eq!(json["mode"], "split");
        assert_eq!(json["groups"][0]["section"], "primary");
        assert_eq!(json["groups"][2]["fields"][1]["kind"], "link");
        Ok(())
    }
}
