use crate::dataset::QualifiedName;
use crate::output::{format_scientific, write_text_artifact};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Multiplicative zero-point correction per filter.
pub type PhotometricCorrectionMap = BTreeMap<QualifiedName, f64>;

pub const CORRECTION_MAP_HEADER: &str = "# Filter Correction";

#[derive(Debug, thiserror::Error)]
pub enum CorrectionMapError {
    #[error("failed to read photometric correction map '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write photometric correction map '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("photometric correction map line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("photometric correction map line {line} repeats filter '{filter}'")]
    DuplicateFilter { line: usize, filter: String },
}

pub fn render_photometric_correction_map(map: &PhotometricCorrectionMap) -> String {
    let mut content = String::from(CORRECTION_MAP_HEADER);
    content.push('\n');
    for (filter, correction) in map {
        content.push_str(&format!("{filter} {}\n", format_scientific(*correction)));
    }
    content
}

pub fn write_photometric_correction_map(
    path: impl AsRef<Path>,
    map: &PhotometricCorrectionMap,
) -> Result<(), CorrectionMapError> {
    let path = path.as_ref();
    write_text_artifact(path, &render_photometric_correction_map(map)).map_err(|source| {
        CorrectionMapError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Parses the two-column `Filter Correction` table. Blank lines and `#`
/// comment lines are skipped.
pub fn parse_photometric_correction_map(
    content: &str,
) -> Result<PhotometricCorrectionMap, CorrectionMapError> {
    let mut map = PhotometricCorrectionMap::new();
    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = trimmed.split_whitespace().collect();
        let [filter, correction] = columns.as_slice() else {
            return Err(CorrectionMapError::Malformed {
                line: line_number,
                reason: format!("expected 2 columns, found {}", columns.len()),
            });
        };
        let correction = correction
            .parse::<f64>()
            .map_err(|_| CorrectionMapError::Malformed {
                line: line_number,
                reason: format!("correction '{correction}' is not a number"),
            })?;
        if !correction.is_finite() {
            return Err(CorrectionMapError::Malformed {
                line: line_number,
                reason: format!("correction must be finite, got {correction}"),
            });
        }

        let name = QualifiedName::parse(filter);
        if map.insert(name, correction).is_some() {
            return Err(CorrectionMapError::DuplicateFilter {
                line: line_number,
                filter: (*filter).to_string(),
            });
        }
    }
    Ok(map)
}

pub fn read_photometric_correction_map(
    path: impl AsRef<Path>,
) -> Result<PhotometricCorrectionMap, CorrectionMapError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| CorrectionMapError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_photometric_correction_map(&content)
}
