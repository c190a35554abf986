// Index/record consistency validation
// Position i of the index must describe record i, so both sides must agree on length

use tracing::{info, warn};

use super::faiss::Metric;

/// Consistency check results between the vector index and the record file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Number of vectors stored in the index
    pub vectors: usize,
    /// Number of records in the record file
    pub records: usize,
    pub dimension: usize,
    pub metric: Metric,
    /// Overall consistency status
    pub is_consistent: bool,
}

impl ConsistencyReport {
    #[inline]
    pub fn new(vectors: usize, records: usize, dimension: usize, metric: Metric) -> Self {
        Self {
            vectors,
            records,
            dimension,
            metric,
            is_consistent: vectors == records,
        }
    }

    /// Vectors whose position has no record; search hits there cannot be resolved
    #[inline]
    pub fn orphaned_vectors(&self) -> usize {
        self.vectors.saturating_sub(self.records)
    }

    /// Records that no vector points at; they can never be retrieved
    #[inline]
    pub fn unindexed_records(&self) -> usize {
        self.records.saturating_sub(self.vectors)
    }

    #[inline]
    pub fn summary(&self) -> String {
        if self.is_consistent {
            format!(
                "Index is consistent: {} vectors ({} dimensions, {}) aligned with {} records",
                self.vectors, self.dimension, self.metric, self.records
            )
        } else {
            format!(
                "Index inconsistencies found: {} vectors vs {} records ({} orphaned vectors, {} unindexed records)",
                self.vectors,
                self.records,
                self.orphaned_vectors(),
                self.unindexed_records()
            )
        }
    }

    pub(crate) fn log(&self) {
        if self.is_consistent {
            info!("{}", self.summary());
        } else {
            warn!("{}", self.summary());
        }
    }
}
