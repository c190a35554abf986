//! Reader for FAISS flat indexes
//!
//! Supports the on-disk layout `faiss.write_index` produces for `IndexFlatIP`
//! and `IndexFlatL2`. All integers and floats are little-endian:
//!
//! ```text
//! fourcc        [u8; 4]   "IxFI" (inner product) or "IxF2" (L2)
//! d             i32       vector dimension
//! ntotal        i64       number of vectors
//! (reserved)    i64 x 2
//! is_trained    u8
//! metric_type   i32       0 = inner product, 1 = L2
//! metric_arg    f32       only present when metric_type > 1
//! float count   u64       must equal ntotal * d
//! vectors       [f32]     row-major, vector i at [i * d, (i + 1) * d)
//! ```
//!
//! Search is exhaustive, so results are exact.


use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::{RagError, Result};

const FOURCC_FLAT_IP: [u8; 4] = *b"IxFI";
const FOURCC_FLAT_L2: [u8; 4] = *b"IxF2";
const RESERVED_HEADER_VALUE: i64 = 1 << 20;

/// Similarity metric an index was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    InnerProduct,
    L2,
}

impl Metric {
    fn code(self) -> i32 {
        match self {
            Self::InnerProduct => 0,
            Self::L2 => 1,
        }
    }

    fn fourcc(self) -> [u8; 4] {
        match self {
            Self::InnerProduct => FOURCC_FLAT_IP,
            Self::L2 => FOURCC_FLAT_L2,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InnerProduct => write!(f, "inner product"),
            Self::L2 => write!(f, "L2"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unsupported index type {0:?} (only flat IP/L2 indexes are readable)")]
    UnsupportedType(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("file is truncated")]
    Truncated,
    #[error("{0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(err)
        }
    }
}

/// A single search hit: index position and similarity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    /// Larger is more similar, regardless of metric
    pub score: f32,
}

/// Immutable flat vector index held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    metric: Metric,
    vectors: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from row-major vectors. Used for fixtures and small corpora.
    #[inline]
    pub fn new(dimension: usize, metric: Metric, vectors: Vec<f32>) -> Result<Self> {
        if dimension == 0 || vectors.len() % dimension != 0 {
            return Err(RagError::InvalidArgument(format!(
                "{} values cannot be split into vectors of dimension {}",
                vectors.len(),
                dimension
            )));
        }

        Ok(Self {
            dimension,
            metric,
            vectors,
        })
    }

    /// Read an index file, mapping any failure to `StorageUnavailable`
    #[inline]
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| RagError::storage(path, e))?;
        let index =
            Self::from_reader(BufReader::new(file)).map_err(|e| RagError::storage(path, e))?;

        debug!(
            "Loaded {} index from {}: {} vectors of dimension {}",
            index.metric,
            path.display(),
            index.len(),
            index.dimension
        );
        Ok(index)
    }

    #[inline]
    pub fn from_reader<R: Read>(mut reader: R) -> std::result::Result<Self, FormatError> {
        let fourcc: [u8; 4] = read_array(&mut reader)?;
        let metric = match fourcc {
            FOURCC_FLAT_IP => Metric::InnerProduct,
            FOURCC_FLAT_L2 => Metric::L2,
            other => {
                return Err(FormatError::UnsupportedType(
                    String::from_utf8_lossy(&other).into_owned(),
                ));
            }
        };

        let dimension = i32::from_le_bytes(read_array(&mut reader)?);
        let ntotal = i64::from_le_bytes(read_array(&mut reader)?);
        let _reserved: [u8; 16] = read_array(&mut reader)?;
        let _is_trained: [u8; 1] = read_array(&mut reader)?;
        let metric_type = i32::from_le_bytes(read_array(&mut reader)?);
        if metric_type > 1 {
            let _metric_arg: [u8; 4] = read_array(&mut reader)?;
        }

        if metric_type != metric.code() {
            return Err(FormatError::InvalidHeader(format!(
                "metric type {} does not match {} index",
                metric_type, metric
            )));
        }

        let dimension = usize::try_from(dimension)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| FormatError::InvalidHeader(format!("dimension {dimension}")))?;
        let count = usize::try_from(ntotal)
            .map_err(|_| FormatError::InvalidHeader(format!("vector count {ntotal}")))?;

        let float_count = u64::from_le_bytes(read_array(&mut reader)?);
        let expected = count
            .checked_mul(dimension)
            .ok_or_else(|| FormatError::InvalidHeader("vector block overflows".to_string()))?;
        if usize::try_from(float_count).ok() != Some(expected) {
            return Err(FormatError::InvalidHeader(format!(
                "vector block holds {float_count} floats, expected {count} x {dimension}"
            )));
        }

        let byte_len = expected
            .checked_mul(4)
            .ok_or_else(|| FormatError::InvalidHeader("vector block overflows".to_string()))?;
        // The header is untrusted: grow with the data actually present
        let limit = u64::try_from(byte_len)
            .map_err(|_| FormatError::InvalidHeader("vector block overflows".to_string()))?;
        let mut bytes = Vec::new();
        reader.take(limit).read_to_end(&mut bytes)?;
        if bytes.len() != byte_len {
            return Err(FormatError::Truncated);
        }

        let vectors = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self {
            dimension,
            metric,
            vectors,
        })
    }

    /// Write the index in the same layout `read` accepts
    #[inline]
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| RagError::storage(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|e| RagError::storage(path, e))
    }

    #[inline]
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let invalid = |what: &str| std::io::Error::new(std::io::ErrorKind::InvalidInput, what);
        let dimension = i32::try_from(self.dimension).map_err(|_| invalid("dimension"))?;
        let ntotal = i64::try_from(self.len()).map_err(|_| invalid("vector count"))?;
        let float_count = u64::try_from(self.vectors.len()).map_err(|_| invalid("vector block"))?;

        writer.write_all(&self.metric.fourcc())?;
        writer.write_all(&dimension.to_le_bytes())?;
        writer.write_all(&ntotal.to_le_bytes())?;
        writer.write_all(&RESERVED_HEADER_VALUE.to_le_bytes())?;
        writer.write_all(&RESERVED_HEADER_VALUE.to_le_bytes())?;
        writer.write_all(&[1])?;
        writer.write_all(&self.metric.code().to_le_bytes())?;
        writer.write_all(&float_count.to_le_bytes())?;
        for value in &self.vectors {
            writer.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of stored vectors
    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Exact top-k search ordered by descending score, ties to the lower position
    ///
    /// For L2 indexes the score is `1 - d / 2` with `d` the squared distance,
    /// which equals cosine similarity when both vectors have unit length.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<Neighbor> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                score: self.score(query, vector),
            })
            .collect();

        let ordering = |a: &Neighbor, b: &Neighbor| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.position.cmp(&b.position))
        };

        if k < scored.len() {
            scored.select_nth_unstable_by(k, ordering);
            scored.truncate(k);
        }
        scored.sort_by(ordering);

        Ok(scored)
    }

    fn score(&self, query: &[f32], vector: &[f32]) -> f32 {
        match self.metric {
            Metric::InnerProduct => query.iter().zip(vector).map(|(a, b)| a * b).sum(),
            Metric::L2 => {
                let distance: f32 = query
                    .iter()
                    .zip(vector)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                1.0 - distance / 2.0
            }
        }
    }
}

fn read_array<const N: usize, R: Read>(reader: &mut R) -> std::result::Result<[u8; N], FormatError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
