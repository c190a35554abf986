// Vector index store
// A FAISS flat index paired with the ordered record file it was built from

pub mod consistency;
pub mod faiss;
pub mod records;


pub use consistency::ConsistencyReport;
pub use faiss::{FlatIndex, Metric, Neighbor};
pub use records::Records;

use std::path::{Path, PathBuf};
use tracing::info;

use crate::Result;

/// Read-only pairing of index and records, loaded once and reused across queries
#[derive(Debug, Clone)]
pub struct IndexStore {
    index: FlatIndex,
    records: Records,
    index_path: Option<PathBuf>,
    records_path: Option<PathBuf>,
    report: ConsistencyReport,
}

impl IndexStore {
    /// Load both files and check that they line up
    ///
    /// A length mismatch does not fail here; it is reported and logged so that
    /// callers decide between strict and lenient retrieval.
    #[inline]
    pub fn open(index_path: &Path, records_path: &Path) -> Result<Self> {
        info!(
            "Opening index store ({}, {})",
            index_path.display(),
            records_path.display()
        );

        let index = FlatIndex::read(index_path)?;
        let records = Records::load(records_path)?;

        let mut store = Self::from_parts(index, records);
        store.index_path = Some(index_path.to_path_buf());
        store.records_path = Some(records_path.to_path_buf());
        Ok(store)
    }

    /// Pair an in-memory index with its records
    #[inline]
    pub fn from_parts(index: FlatIndex, records: Records) -> Self {
        let report =
            ConsistencyReport::new(index.len(), records.len(), index.dimension(), index.metric());
        report.log();

        Self {
            index,
            records,
            index_path: None,
            records_path: None,
            report,
        }
    }

    /// Reopen from the files this store was loaded from, re-validating consistency
    ///
    /// Stores built with `from_parts` have no backing files and are returned as is.
    #[inline]
    pub fn reopen(&self) -> Result<Self> {
        match (&self.index_path, &self.records_path) {
            (Some(index_path), Some(records_path)) => Self::open(index_path, records_path),
            _ => Ok(self.clone()),
        }
    }

    #[inline]
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    #[inline]
    pub fn records(&self) -> &Records {
        &self.records
    }

    #[inline]
    pub fn consistency(&self) -> &ConsistencyReport {
        &self.report
    }

    #[inline]
    pub fn index_path(&self) -> Option<&Path> {
        self.index_path.as_deref()
    }

    #[inline]
    pub fn records_path(&self) -> Option<&Path> {
        self.records_path.as_deref()
    }
}
