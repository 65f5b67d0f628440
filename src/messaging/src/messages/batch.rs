use common::model::CompiledQuery;
use serde::{Deserialize, Serialize};

/// A slice of one job's compiled queries, in compilation order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QueryBatch {
    pub job_id: String,
    /// Zero-based position of this batch within the job
    pub sequence: usize,
    pub queries: Vec<CompiledQuery>,
}

impl QueryBatch {
    pub fn new(job_id: impl Into<String>, sequence: usize, queries: Vec<CompiledQuery>) -> Self {
        Self {
            job_id: job_id.into(),
            sequence,
            queries,
        }
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
