use super::{OutputError, format_scientific, write_text_output};
use crate::data_model::ModelParameter;
use crate::grid::GridAxis;
use crate::likelihood::CatalogResult;
use std::path::Path;

pub const BEST_MODEL_CATALOG_HEADER: &str = "# ID SED ReddeningCurve E(B-V) Z Scale";

/// One row per source naming its best-fitting model. `axes` are the model
/// axes of the photometry grid the results were fitted against. A missing
/// scale factor is written as `nan`.
pub fn render_best_model_catalog(
    axes: &[GridAxis],
    results: &[CatalogResult],
) -> Result<String, OutputError> {
    let mut content = String::from(BEST_MODEL_CATALOG_HEADER);
    content.push('\n');
    for entry in results {
        let column = |parameter: ModelParameter| {
            let axis = parameter.axis();
            entry
                .result
                .best_model
                .get(axis)
                .and_then(|index| axes.get(axis)?.value(*index))
                .ok_or_else(|| OutputError::BestModelOutOfGrid {
                    id: entry.id.clone(),
                })
        };
        let scale = entry
            .result
            .best_scale_factor
            .map_or_else(|| "nan".to_string(), format_scientific);
        content.push_str(&format!(
            "{} {} {} {} {} {}\n",
            entry.id,
            column(ModelParameter::Sed)?,
            column(ModelParameter::ReddeningCurve)?,
            column(ModelParameter::Ebv)?,
            column(ModelParameter::Z)?,
            scale
        ));
    }
    Ok(content)
}

pub fn write_best_model_catalog(
    path: impl AsRef<Path>,
    axes: &[GridAxis],
    results: &[CatalogResult],
) -> Result<(), OutputError> {
    let path = path.as_ref();
    write_text_output(path, &render_best_model_catalog(axes, results)?)?;
    tracing::info!(path = %path.display(), sources = results.len(), "wrote best-model catalog");
    Ok(())
}
