//! Turns a job's raw deletion matches into typed column match groups for one
//! data mapper.
//!
//! Simple matches are searched for in every configured column. Composite
//! matches are grouped by the set of columns they name, with each tuple's
//! values ordered by column name. Simple groups come first, in configured
//! column order, followed by composite groups in order of first appearance.

use std::collections::{HashMap, HashSet};

use common::model::{
    ColumnMatchGroup, ColumnValue, DataMapperConfig, DeletionMatch, MatchValue, TableDescriptor,
    TypedValue,
};
use log::debug;

use crate::cast::cast;
use crate::error::CompileResult;

pub fn classify(
    matches: &[DeletionMatch],
    mapper: &DataMapperConfig,
    table: &TableDescriptor,
) -> CompileResult<Vec<ColumnMatchGroup>> {
    let mut seen = HashSet::new();
    let mut simple: Vec<&MatchValue> = Vec::new();
    let mut composite: Vec<&[ColumnValue]> = Vec::new();

    for deletion_match in matches {
        if !deletion_match.applies_to(&mapper.id) || !seen.insert(deletion_match) {
            continue;
        }
        match deletion_match {
            DeletionMatch::Simple { match_id, .. } => simple.push(match_id),
            DeletionMatch::Composite { columns, .. } => composite.push(columns),
        }
    }

    let mut groups = Vec::new();

    if !simple.is_empty() {
        // Dedup runs on raw values, so text "12345" and integer 12345 both
        // survive and cast to the same typed value here.
        for column in &mapper.columns {
            let match_ids = simple
                .iter()
                .map(|value| cast(value, column, &table.columns))
                .collect::<CompileResult<Vec<_>>>()?;
            groups.push(ColumnMatchGroup::Simple {
                column: column.clone(),
                match_ids,
            });
        }
    }

    let mut composite_groups: Vec<(Vec<String>, Vec<Vec<TypedValue>>)> = Vec::new();
    let mut group_index: HashMap<Vec<String>, usize> = HashMap::new();

    for pairs in composite {
        let mut pairs: Vec<&ColumnValue> = pairs.iter().collect();
        pairs.sort_by(|a, b| a.column.cmp(&b.column));

        if let Some(unknown) = pairs
            .iter()
            .find(|pair| !mapper.columns.contains(&pair.column))
        {
            debug!(
                "Dropping composite match for data mapper {}: column {} is not configured",
                mapper.id, unknown.column
            );
            continue;
        }

        let tuple = pairs
            .iter()
            .map(|pair| cast(&pair.value, &pair.column, &table.columns))
            .collect::<CompileResult<Vec<_>>>()?;

        let key: Vec<String> = pairs.iter().map(|pair| pair.column.clone()).collect();
        let index = *group_index.entry(key.clone()).or_insert_with(|| {
            composite_groups.push((key, Vec::new()));
            composite_groups.len() - 1
        });
        composite_groups[index].1.push(tuple);
    }

    groups.extend(
        composite_groups
            .into_iter()
            .map(|(columns, match_ids)| ColumnMatchGroup::Composite { columns, match_ids }),
    );

    Ok(groups)
}
