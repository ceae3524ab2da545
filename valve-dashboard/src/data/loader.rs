//! Raw cycle-file parsing and dataset assembly
//!
//! Each stream file holds one cycle per line as whitespace-separated floats;
//! the profile file is tab-separated with the valve-condition code in its
//! second column. All three must agree on the number of cycles, and every
//! line of a stream must carry the width established by its first line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use ndarray::{s, Array1, Array2, Array3, Axis};
use thiserror::Error;

use super::resample::{fourier_resample, interpolate_to_len, ResamplingMethod};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: invalid numeric value '{token}'", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("{}:{line}: expected {expected} values per cycle, found {found}", path.display())]
    RaggedLine {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "cycle count mismatch: {} has {left_cycles} cycles, {} has {right_cycles}",
        left.display(),
        right.display()
    )]
    CycleCountMismatch {
        left: PathBuf,
        left_cycles: usize,
        right: PathBuf,
        right_cycles: usize,
    },

    #[error("{}:{line}: missing label column", path.display())]
    MissingLabel { path: PathBuf, line: usize },

    #[error("{}: {message}", path.display())]
    Shape { path: PathBuf, message: String },
}

/// Locations of the three raw input files.
#[derive(Debug, Clone)]
pub struct DatasetFiles {
    /// FS1 flow stream, 10 Hz
    pub low_rate: PathBuf,
    /// PS2 pressure stream, 100 Hz
    pub high_rate: PathBuf,
    /// Condition profile, one row per cycle
    pub labels: PathBuf,
}

impl DatasetFiles {
    /// Conventional layout: FS1.txt, PS2.txt and profile.txt in one
    /// directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            low_rate: dir.join("FS1.txt"),
            high_rate: dir.join("PS2.txt"),
            labels: dir.join("profile.txt"),
        }
    }
}

/// Load the three raw files and align the two streams with `method`.
///
/// Returns `(data, target)`: `data` has shape `(num_cycles, channel_len, 2)`
/// with channel 0 the low-rate-derived signal and channel 1 the
/// high-rate-derived one; `target` holds one condition code per cycle. The
/// stream that already has the target rate passes through untouched.
pub fn load_dataset(
    files: &DatasetFiles,
    method: ResamplingMethod,
) -> Result<(Array3<f64>, Array1<i64>), DataError> {
    let low = read_stream(&files.low_rate)?;
    let high = read_stream(&files.high_rate)?;
    let target = read_labels(&files.labels)?;

    let cycles = low.len_of(Axis(0));
    if high.len_of(Axis(0)) != cycles {
        return Err(DataError::CycleCountMismatch {
            left: files.low_rate.clone(),
            left_cycles: cycles,
            right: files.high_rate.clone(),
            right_cycles: high.len_of(Axis(0)),
        });
    }
    if target.len() != cycles {
        return Err(DataError::CycleCountMismatch {
            left: files.low_rate.clone(),
            left_cycles: cycles,
            right: files.labels.clone(),
            right_cycles: target.len(),
        });
    }

    let low_len = low.len_of(Axis(1));
    let high_len = high.len_of(Axis(1));

    let (channel_low, channel_high, channel_len) = match method {
        ResamplingMethod::Up => {
            let upsampled = map_cycles(&low, high_len, |row| interpolate_to_len(row, high_len));
            (upsampled, high, high_len)
        }
        ResamplingMethod::Down => {
            let downsampled = map_cycles(&high, low_len, |row| fourier_resample(row, low_len));
            (low, downsampled, low_len)
        }
    };

    let mut data = Array3::zeros((cycles, channel_len, 2));
    data.slice_mut(s![.., .., 0]).assign(&channel_low);
    data.slice_mut(s![.., .., 1]).assign(&channel_high);

    Ok((data, target))
}

/// Apply `f` to every cycle row, collecting the fixed-width results.
fn map_cycles<F>(stream: &Array2<f64>, out_len: usize, f: F) -> Array2<f64>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let cycles = stream.len_of(Axis(0));
    let mut out = Array2::zeros((cycles, out_len));
    for (i, row) in stream.rows().into_iter().enumerate() {
        let native = row.to_vec();
        out.row_mut(i).assign(&Array1::from_vec(f(&native)));
    }
    out
}

/// Parse a stream file into (num_cycles, samples_per_cycle), enforcing a
/// constant width derived from the first line.
fn read_stream(path: &Path) -> Result<Array2<f64>, DataError> {
    let file = File::open(path).map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut values = Vec::new();
    let mut width: Option<usize> = None;
    let mut cycles = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DataError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let before = values.len();
        for token in line.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| DataError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }
        let found = values.len() - before;

        let expected = *width.get_or_insert(found);
        if found != expected {
            return Err(DataError::RaggedLine {
                path: path.to_path_buf(),
                line: idx + 1,
                expected,
                found,
            });
        }
        cycles += 1;
    }

    Array2::from_shape_vec((cycles, width.unwrap_or(0)), values).map_err(|e| DataError::Shape {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse the profile file, taking the valve-condition code from the second
/// tab-separated column.
fn read_labels(path: &Path) -> Result<Array1<i64>, DataError> {
    let file = File::open(path).map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut labels = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DataError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let token = line
            .split('\t')
            .nth(1)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DataError::MissingLabel {
                path: path.to_path_buf(),
                line: idx + 1,
            })?;

        let label: i64 = token.parse().map_err(|_| DataError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            token: token.to_string(),
        })?;
        labels.push(label);
    }

    Ok(Array1::from_vec(labels))
}
