use super::{BuildFilterInfoFunctor, ModelFluxAlgorithm, ModelingError};
use crate::data_model::{FilterInfo, Photometry};
use crate::dataset::{QualifiedName, XYDataset};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Advisory progress callback, notified once per processed model with the
/// number of models done so far and the total.
pub trait ProgressListener: Sync {
    fn notify(&self, done: usize, total: usize);
}

impl<F> ProgressListener for F
where
    F: Fn(usize, usize) + Sync,
{
    fn notify(&self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Computes photometry for many model spectra against a fixed filter list.
///
/// Filter metadata is derived once at construction. Every photometry produced
/// by one algorithm shares the same filter-name list, ordered as the filter
/// list given at construction.
#[derive(Debug, Clone)]
pub struct PhotometryAlgorithm {
    model_flux: ModelFluxAlgorithm,
    filter_infos: Vec<FilterInfo>,
    filter_names: Arc<Vec<String>>,
}

impl PhotometryAlgorithm {
    /// Fails with [`ModelingError::MissingFilter`] as soon as one listed
    /// filter is absent from `filter_map`.
    pub fn new(
        model_flux: ModelFluxAlgorithm,
        filter_map: &BTreeMap<QualifiedName, XYDataset>,
        filter_list: &[QualifiedName],
    ) -> Result<Self, ModelingError> {
        let builder = BuildFilterInfoFunctor;
        let mut filter_infos = Vec::with_capacity(filter_list.len());
        for filter in filter_list {
            let Some(transmission) = filter_map.get(filter) else {
                return Err(ModelingError::MissingFilter {
                    filter: filter.to_string(),
                });
            };
            let info = builder
                .build(transmission)
                .map_err(|source| ModelingError::FilterInfo {
                    filter: filter.to_string(),
                    source,
                })?;
            filter_infos.push(info);
        }
        let filter_names = Arc::new(filter_list.iter().map(QualifiedName::to_string).collect());
        Ok(Self {
            model_flux,
            filter_infos,
            filter_names,
        })
    }

    pub fn filter_names(&self) -> &Arc<Vec<String>> {
        &self.filter_names
    }

    pub fn filter_infos(&self) -> &[FilterInfo] {
        &self.filter_infos
    }

    pub fn photometry_for(&self, model: &XYDataset) -> Result<Photometry, ModelingError> {
        let values = self
            .model_flux
            .compute(model, &self.filter_infos)
            .map_err(|source| ModelingError::interpolation("model flux", source))?;
        Ok(Photometry::new(Arc::clone(&self.filter_names), values)?)
    }

    /// One photometry per model, in model order.
    pub fn compute(
        &self,
        models: &[XYDataset],
        progress: Option<&dyn ProgressListener>,
    ) -> Result<Vec<Photometry>, ModelingError> {
        let mut photometries = vec![Photometry::default(); models.len()];
        self.compute_into(&mut photometries, |index| Ok(models[index].clone()), progress)?;
        Ok(photometries)
    }

    /// Fills `cells[i]` with the photometry of `model_at(i)`.
    ///
    /// Cells are processed in parallel; each task owns exactly one cell, so
    /// writes never overlap. The first error aborts the remaining work.
    pub fn compute_into<F>(
        &self,
        cells: &mut [Photometry],
        model_at: F,
        progress: Option<&dyn ProgressListener>,
    ) -> Result<(), ModelingError>
    where
        F: Fn(usize) -> Result<XYDataset, ModelingError> + Sync,
    {
        let total = cells.len();
        let done = AtomicUsize::new(0);
        cells
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(index, cell)| {
                let model = model_at(index)?;
                *cell = self.photometry_for(&model)?;
                if let Some(listener) = progress {
                    let done = done.fetch_add(1, Ordering::Relaxed) + 1;
                    listener.notify(done, total);
                }
                Ok(())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::PhotometryAlgorithm;
    use crate::dataset::{QualifiedName, XYDataset};
    use crate::modeling::{ModelFluxAlgorithm, ModelingError};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn filter_map() -> BTreeMap<QualifiedName, XYDataset> {
        let mut map = BTreeMap::new();
        map.insert(
            QualifiedName::parse("filters/blue"),
            XYDataset::new(vec![(1000.0, 1.0), (2000.0, 1.0)]),
        );
        map.insert(
            QualifiedName::parse("filters/red"),
            XYDataset::new(vec![(3000.0, 1.0), (4000.0, 1.0)]),
        );
        map
    }

    fn flat_model(value: f64) -> XYDataset {
        (0..=50).map(|step| (500.0 + step as f64 * 100.0, value)).collect()
    }

    #[test]
    fn missing_filter_fails_at_construction() {
        let error = PhotometryAlgorithm::new(
            ModelFluxAlgorithm::default(),
            &filter_map(),
            &[
                QualifiedName::parse("filters/blue"),
                QualifiedName::parse("filters/green"),
            ],
        )
        .expect_err("green is not in the map");
        assert_eq!(
            error,
            ModelingError::MissingFilter {
                filter: "filters/green".to_string()
            }
        );
    }

    #[test]
    fn photometry_follows_the_filter_list_order_and_shares_names() {
        let algorithm = PhotometryAlgorithm::new(
            ModelFluxAlgorithm::default(),
            &filter_map(),
            &[
                QualifiedName::parse("filters/red"),
                QualifiedName::parse("filters/blue"),
            ],
        )
        .expect("algorithm");

        let photometries = algorithm
            .compute(&[flat_model(1.0), flat_model(2.0)], None)
            .expect("photometry");
        assert_eq!(photometries.len(), 2);
        assert_eq!(
            photometries[0].filter_names().as_slice(),
            ["filters/red".to_string(), "filters/blue".to_string()]
        );
        assert!(photometries[0].shares_filter_names(&photometries[1]));

        let ratio = photometries[1].values()[0].flux / photometries[0].values()[0].flux;
        assert!((ratio - 2.0).abs() < 1.0e-12);
        assert!(photometries[0].values()[0].flux > photometries[0].values()[1].flux);
    }

    #[test]
    fn progress_is_reported_once_per_model() {
        let algorithm = PhotometryAlgorithm::new(
            ModelFluxAlgorithm::default(),
            &filter_map(),
            &[QualifiedName::parse("filters/blue")],
        )
        .expect("algorithm");
        let calls = AtomicUsize::new(0);
        let listener = |_done: usize, total: usize| {
            assert_eq!(total, 4);
            calls.fetch_add(1, Ordering::Relaxed);
        };

        let models: Vec<XYDataset> = (1..=4).map(|value| flat_model(value as f64)).collect();
        let with_progress = algorithm.compute(&models, Some(&listener)).expect("photometry");
        let without_progress = algorithm.compute(&models, None).expect("photometry");

        assert_eq!(calls.load(Ordering::Relaxed), 4);
        assert_eq!(with_progress, without_progress);
    }
}
