use super::{OutputError, format_scientific, write_text_output};
use crate::data_model::PdfGrid;
use crate::likelihood::CatalogResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Two-column table `<axis value> <probability>` for a one-axis PDF, headed
/// by `# <axis name> Probability`.
pub fn render_pdf_table(pdf: &PdfGrid) -> Result<String, OutputError> {
    let [axis] = pdf.axes() else {
        return Err(OutputError::UnsupportedPdfShape {
            axes: pdf.axis_count(),
        });
    };

    let mut content = format!("# {} Probability\n", axis.name());
    for (index, probability) in pdf.cells().iter().enumerate() {
        if let Some(value) = axis.value(index) {
            content.push_str(&format!("{value} {}\n", format_scientific(*probability)));
        }
    }
    Ok(content)
}

/// Writes `<directory>/<id>.txt` and returns its path. Ids that would name a
/// file outside `directory` are rejected.
pub fn write_source_pdf(
    directory: impl AsRef<Path>,
    result: &CatalogResult,
) -> Result<PathBuf, OutputError> {
    let id = result.id.as_str();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
        return Err(OutputError::InvalidSourceId { id: id.to_string() });
    }
    let path = directory.as_ref().join(format!("{id}.txt"));
    write_text_output(&path, &render_pdf_table(&result.result.pdf)?)?;
    Ok(path)
}

pub fn write_catalog_pdfs(
    directory: impl AsRef<Path>,
    results: &[CatalogResult],
) -> Result<Vec<PathBuf>, OutputError> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory).map_err(|source| OutputError::Write {
        path: directory.to_path_buf(),
        source,
    })?;
    let paths = results
        .iter()
        .map(|result| write_source_pdf(directory, result))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(
        directory = %directory.display(),
        sources = paths.len(),
        "wrote PDF tables"
    );
    Ok(paths)
}
