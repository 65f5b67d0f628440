use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A raw value taken from a deletion request, before it is cast to a column type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

// Floats compare by bit pattern so that equality agrees with `Hash`.
impl PartialEq for MatchValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MatchValue::Integer(a), MatchValue::Integer(b)) => a == b,
            (MatchValue::Float(a), MatchValue::Float(b)) => a.to_bits() == b.to_bits(),
            (MatchValue::Text(a), MatchValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for MatchValue {}

impl Hash for MatchValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            MatchValue::Integer(value) => value.hash(state),
            MatchValue::Float(value) => value.to_bits().hash(state),
            MatchValue::Text(value) => value.hash(state),
        }
    }
}

impl fmt::Display for MatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchValue::Integer(value) => write!(f, "{value}"),
            MatchValue::Float(value) => write!(f, "{value}"),
            MatchValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for MatchValue {
    fn from(value: &str) -> Self {
        MatchValue::Text(value.to_string())
    }
}

impl From<String> for MatchValue {
    fn from(value: String) -> Self {
        MatchValue::Text(value)
    }
}

impl From<i64> for MatchValue {
    fn from(value: i64) -> Self {
        MatchValue::Integer(value)
    }
}

impl From<f64> for MatchValue {
    fn from(value: f64) -> Self {
        MatchValue::Float(value)
    }
}

/// One column/value pair of a composite match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnValue {
    pub column: String,
    pub value: MatchValue,
}

impl ColumnValue {
    pub fn new(column: impl Into<String>, value: impl Into<MatchValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// A pending erasure request as held in the deletion queue.
///
/// An empty `data_mappers` list means the match applies to every data mapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DeletionQueueEntry", into = "DeletionQueueEntry")]
pub enum DeletionMatch {
    /// A single value searched for in every configured column
    Simple {
        match_id: MatchValue,
        data_mappers: Vec<String>,
    },
    /// A combination of column values that jointly identify a record
    Composite {
        columns: Vec<ColumnValue>,
        data_mappers: Vec<String>,
    },
}

impl DeletionMatch {
    pub fn simple(match_id: impl Into<MatchValue>) -> Self {
        DeletionMatch::Simple {
            match_id: match_id.into(),
            data_mappers: Vec::new(),
        }
    }

    pub fn composite<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = ColumnValue>,
    {
        DeletionMatch::Composite {
            columns: columns.into_iter().collect(),
            data_mappers: Vec::new(),
        }
    }

    /// Restrict the match to the given data mappers.
    pub fn with_data_mappers<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids.into_iter().map(Into::into).collect();
        match &mut self {
            DeletionMatch::Simple { data_mappers, .. }
            | DeletionMatch::Composite { data_mappers, .. } => *data_mappers = ids,
        }
        self
    }

    pub fn data_mappers(&self) -> &[String] {
        match self {
            DeletionMatch::Simple { data_mappers, .. }
            | DeletionMatch::Composite { data_mappers, .. } => data_mappers,
        }
    }

    /// Whether this match is in scope for the given data mapper.
    pub fn applies_to(&self, data_mapper_id: &str) -> bool {
        let data_mappers = self.data_mappers();
        data_mappers.is_empty() || data_mappers.iter().any(|id| id == data_mapper_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum MatchType {
    Simple,
    Composite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MatchIdentifier {
    Composite(Vec<ColumnValue>),
    Simple(MatchValue),
}

/// Wire shape of a deletion queue entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeletionQueueEntry {
    match_id: MatchIdentifier,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    match_type: Option<MatchType>,
    #[serde(default)]
    data_mappers: Vec<String>,
}

impl TryFrom<DeletionQueueEntry> for DeletionMatch {
    type Error = String;

    fn try_from(entry: DeletionQueueEntry) -> Result<Self, Self::Error> {
        let data_mappers = entry.data_mappers;
        match (entry.match_id, entry.match_type) {
            (MatchIdentifier::Simple(match_id), None | Some(MatchType::Simple)) => {
                Ok(DeletionMatch::Simple {
                    match_id,
                    data_mappers,
                })
            }
            (MatchIdentifier::Composite(columns), None | Some(MatchType::Composite)) => {
                if columns.is_empty() {
                    return Err("composite match must name at least one column".to_string());
                }
                Ok(DeletionMatch::Composite {
                    columns,
                    data_mappers,
                })
            }
            (MatchIdentifier::Simple(_), Some(MatchType::Composite)) => {
                Err("composite match must provide a list of column values".to_string())
            }
            (MatchIdentifier::Composite(_), Some(MatchType::Simple)) => {
                Err("simple match must provide a single value".to_string())
            }
        }
    }
}

impl From<DeletionMatch> for DeletionQueueEntry {
    fn from(deletion_match: DeletionMatch) -> Self {
        match deletion_match {
            DeletionMatch::Simple {
                match_id,
                data_mappers,
            } => DeletionQueueEntry {
                match_id: MatchIdentifier::Simple(match_id),
                match_type: Some(MatchType::Simple),
                data_mappers,
            },
            DeletionMatch::Composite {
                columns,
                data_mappers,
            } => DeletionQueueEntry {
                match_id: MatchIdentifier::Composite(columns),
                match_type: Some(MatchType::Composite),
                data_mappers,
            },
        }
    }
}
