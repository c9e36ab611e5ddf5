//! Text and binary artifact writers plus the per-source result tables.

pub mod best_model_catalog;
pub mod pdf_output;

pub use best_model_catalog::{
    BEST_MODEL_CATALOG_HEADER, render_best_model_catalog, write_best_model_catalog,
};
pub use pdf_output::{render_pdf_table, write_catalog_pdfs, write_source_pdf};

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("PDF table needs exactly one axis, got {axes}")]
    UnsupportedPdfShape { axes: usize },
    #[error("best model of source '{id}' is not a cell of the model grid")]
    BestModelOutOfGrid { id: String },
    #[error("source id '{id}' cannot be used as an output file name")]
    InvalidSourceId { id: String },
}

/// Fixed-precision scientific notation used by every text artifact.
pub fn format_scientific(value: f64) -> String {
    format!("{value:.10E}")
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

pub fn write_binary_artifact(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(path, bytes)
}

pub(crate) fn write_text_output(path: &Path, content: &str) -> Result<(), OutputError> {
    write_text_artifact(path, content).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{format_scientific, normalize_text_artifact, write_text_artifact};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scientific_formatting_is_fixed_precision() {
        assert_eq!(format_scientific(1.5), "1.5000000000E0");
        assert_eq!(format_scientific(-0.00025), "-2.5000000000E-4");
    }

    #[test]
    fn text_artifacts_use_unix_line_endings() {
        assert_eq!(
            normalize_text_artifact("# Z Probability\r\n0 1\r2 3"),
            "# Z Probability\n0 1\n2 3\n"
        );
        assert_eq!(normalize_text_artifact(""), "");
    }

    #[test]
    fn text_writes_are_byte_stable() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("table.txt");

        write_text_artifact(&path, "a 1\r\nb 2").expect("first write");
        let first = fs::read(&path).expect("artifact should be readable");
        write_text_artifact(&path, "a 1\r\nb 2").expect("second write");
        let second = fs::read(&path).expect("artifact should be readable");

        assert_eq!(first, second);
        assert_eq!(second, b"a 1\nb 2\n");
    }
}
