//! Image pair sets and the plain-text pair list format.
//!
//! A pair list holds one record per line: `<from> <to1> [<to2> ...]`,
//! separated by any run of spaces or tabs. Every accepted pair is stored as
//! `(min, max)` so a [`PairSet`] never contains both orientations.
//!
//! Self pairs (`from == to`) and pairs that are already known are treated
//! with the same severity, selected by [`AnomalyPolicy`]. Loading is atomic:
//! on error the caller's set is left untouched.

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unordered image pair stored as `(smaller, larger)`.
pub type Pair = (usize, usize);

/// Ordered set of unique image pairs.
pub type PairSet = BTreeSet<Pair>;

/// Normalize `(a, b)` to `(min, max)`.
#[inline]
pub fn make_pair(a: usize, b: usize) -> Pair {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Error)]
pub enum PairListError {
    #[error("cannot access pair list {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pair list io failed: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: expected an image index followed by at least one paired index")]
    MissingPairedIndex { line: usize },
    #[error("line {line}: invalid image index {token:?}")]
    InvalidIndex { line: usize, token: String },
    #[error("line {line}: image {index} is paired with itself")]
    SelfPair { line: usize, index: usize },
    #[error("line {line}: image pair ({}, {}) is listed more than once", .pair.0, .pair.1)]
    DuplicatePair { line: usize, pair: Pair },
}

/// Handling of self pairs and duplicate pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyPolicy {
    /// Abort the load with an error.
    #[default]
    Reject,
    /// Log a warning, skip the offending pair and continue.
    Warn,
}

/// Options for reading pair lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairListOptions {
    /// Only read lines whose zero-based index falls in this range.
    pub line_range: Option<Range<usize>>,
    pub anomaly_policy: AnomalyPolicy,
}

impl PairListOptions {
    pub fn lenient() -> Self {
        Self {
            anomaly_policy: AnomalyPolicy::Warn,
            ..Self::default()
        }
    }
}

/// Parse a pair list into a fresh set.
pub fn parse_pairs<R: BufRead>(
    reader: R,
    opts: &PairListOptions,
) -> Result<PairSet, PairListError> {
    let mut pairs = PairSet::new();
    extend_pairs(reader, opts, &mut pairs)?;
    Ok(pairs)
}

/// Parse a pair list and merge it into `pairs`.
///
/// Pairs already present in `pairs` count as duplicates. Returns the number of
/// newly inserted pairs. On error `pairs` is not modified.
pub fn extend_pairs<R: BufRead>(
    reader: R,
    opts: &PairListOptions,
    pairs: &mut PairSet,
) -> Result<usize, PairListError> {
    let mut added = PairSet::new();

    for (idx, line) in reader.lines().enumerate() {
        if let Some(range) = &opts.line_range {
            if idx < range.start {
                continue;
            }
            if idx >= range.end {
                break;
            }
        }
        let line = line?;
        let line_no = idx + 1;

        let tokens: Vec<&str> = line.split([' ', '\t']).filter(|t| !t.is_empty()).collect();
        if tokens.len() < 2 {
            return Err(PairListError::MissingPairedIndex { line: line_no });
        }
        let from = parse_index(tokens[0], line_no)?;

        for token in &tokens[1..] {
            let to = parse_index(token, line_no)?;
            if from == to {
                let err = PairListError::SelfPair {
                    line: line_no,
                    index: from,
                };
                anomaly(opts.anomaly_policy, err)?;
                continue;
            }
            let pair = make_pair(from, to);
            if pairs.contains(&pair) || added.contains(&pair) {
                let err = PairListError::DuplicatePair {
                    line: line_no,
                    pair,
                };
                anomaly(opts.anomaly_policy, err)?;
                continue;
            }
            trace!("image pair ({}, {}) added", pair.0, pair.1);
            added.insert(pair);
        }
    }

    let count = added.len();
    pairs.append(&mut added);
    Ok(count)
}

/// Load a pair list file and merge it into `pairs`.
pub fn load_pairs<P: AsRef<Path>>(
    path: P,
    opts: &PairListOptions,
    pairs: &mut PairSet,
) -> Result<usize, PairListError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| {
        warn!("cannot read pair list {}: {source}", path.display());
        PairListError::File {
            path: path.to_path_buf(),
            source,
        }
    })?;
    extend_pairs(BufReader::new(file), opts, pairs)
}

/// Write one `i j` record per pair in set order.
pub fn write_pairs<W: Write>(mut writer: W, pairs: &PairSet) -> io::Result<()> {
    for (i, j) in pairs {
        writeln!(writer, "{i} {j}")?;
    }
    writer.flush()
}

/// Save a pair set to a file, replacing its contents.
pub fn save_pairs<P: AsRef<Path>>(path: P, pairs: &PairSet) -> Result<(), PairListError> {
    let path = path.as_ref();
    let file_err = |source| PairListError::File {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(file_err)?;
    write_pairs(BufWriter::new(file), pairs).map_err(file_err)
}

fn parse_index(token: &str, line: usize) -> Result<usize, PairListError> {
    token.parse().map_err(|_| PairListError::InvalidIndex {
        line,
        token: token.to_string(),
    })
}

fn anomaly(policy: AnomalyPolicy, err: PairListError) -> Result<(), PairListError> {
    match policy {
        AnomalyPolicy::Reject => Err(err),
        AnomalyPolicy::Warn => {
            warn!("skipping pair: {err}");
            Ok(())
        }
    }
}
