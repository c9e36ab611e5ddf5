use super::{LikelihoodError, SourcePhzFunctor, SourcePhzResult};
use crate::data_model::Photometry;
use crate::modeling::ProgressListener;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One catalog entry: an identifier and its observed photometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSource {
    pub id: String,
    pub photometry: Photometry,
}

impl CatalogSource {
    pub fn new(id: impl Into<String>, photometry: Photometry) -> Self {
        Self {
            id: id.into(),
            photometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogResult {
    pub id: String,
    pub result: SourcePhzResult,
}

/// Runs [`SourcePhzFunctor`] over a whole catalog, one rayon task per source.
#[derive(Debug, Clone)]
pub struct CatalogHandler<'g> {
    source_phz: SourcePhzFunctor<'g>,
}

impl<'g> CatalogHandler<'g> {
    pub fn new(source_phz: SourcePhzFunctor<'g>) -> Self {
        Self { source_phz }
    }

    pub fn source_phz(&self) -> &SourcePhzFunctor<'g> {
        &self.source_phz
    }

    /// Results come back in catalog order. Every source is fitted; when any
    /// fails, the error of the earliest failing source in catalog order is
    /// returned, tagged with its id.
    pub fn process(
        &self,
        sources: &[CatalogSource],
        progress: Option<&dyn ProgressListener>,
    ) -> Result<Vec<CatalogResult>, LikelihoodError> {
        tracing::info!(sources = sources.len(), "fitting catalog");
        let done = AtomicUsize::new(0);
        let outcomes: Vec<Result<CatalogResult, LikelihoodError>> = sources
            .par_iter()
            .map(|source| {
                let outcome = self
                    .source_phz
                    .compute(&source.photometry)
                    .map(|result| CatalogResult {
                        id: source.id.clone(),
                        result,
                    })
                    .map_err(|error| LikelihoodError::Source {
                        id: source.id.clone(),
                        error: Box::new(error),
                    });
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(listener) = progress {
                    listener.notify(finished, sources.len());
                }
                outcome
            })
            .collect();
        let results = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(sources = results.len(), "catalog complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogHandler, CatalogSource};
    use crate::data_model::{
        FluxErrorPair, ModelParameter, PhotometricCorrectionMap, Photometry, PhotometryGrid,
    };
    use crate::dataset::QualifiedName;
    use crate::grid::{GridAxis, GridContainer};
    use crate::likelihood::{LikelihoodError, MaxMarginalizationFunctor, SourcePhzFunctor};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn names() -> Arc<Vec<String>> {
        Arc::new(vec!["u".to_string(), "g".to_string()])
    }

    fn photometry(names: &Arc<Vec<String>>, fluxes: [f64; 2], error: f64) -> Photometry {
        Photometry::new(
            Arc::clone(names),
            fluxes
                .iter()
                .map(|flux| FluxErrorPair::new(*flux, error))
                .collect(),
        )
        .expect("photometry")
    }

    fn grid(names: &Arc<Vec<String>>) -> PhotometryGrid {
        let axes = vec![GridAxis::numeric("Z", vec![0.0, 1.0, 2.0]).expect("axis")];
        let mut grid = GridContainer::<Vec<Photometry>>::new(axes).expect("grid");
        grid[[0]] = photometry(names, [1.0, 1.0], 0.0);
        grid[[1]] = photometry(names, [1.0, 2.0], 0.0);
        grid[[2]] = photometry(names, [2.0, 1.0], 0.0);
        grid
    }

    fn corrections() -> PhotometricCorrectionMap {
        [(QualifiedName::parse("u"), 1.0), (QualifiedName::parse("g"), 1.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn catalog_results_keep_source_order() {
        let names = names();
        let grid = grid(&names);
        let functor = SourcePhzFunctor::new(
            &corrections(),
            &grid,
            Arc::new(MaxMarginalizationFunctor::for_parameter(ModelParameter::Z)),
        )
        .expect("functor");
        let sources: Vec<_> = (0..12)
            .map(|index| {
                let fluxes = match index % 3 {
                    0 => [5.0, 5.0],
                    1 => [3.0, 6.0],
                    _ => [8.0, 4.0],
                };
                CatalogSource::new(format!("source-{index}"), photometry(&names, fluxes, 0.1))
            })
            .collect();

        let calls = AtomicUsize::new(0);
        let listener = |_done: usize, total: usize| {
            assert_eq!(total, 12);
            calls.fetch_add(1, Ordering::Relaxed);
        };
        let results = CatalogHandler::new(functor)
            .process(&sources, Some(&listener))
            .expect("catalog");

        assert_eq!(calls.load(Ordering::Relaxed), 12);
        assert_eq!(results.len(), 12);
        for (index, result) in results.iter().enumerate() {
            assert_eq!(result.id, format!("source-{index}"));
            assert_eq!(result.result.best_model, vec![index % 3]);
        }
    }

    #[test]
    fn failing_source_is_named_in_the_error() {
        let names = names();
        let grid = grid(&names);
        let functor = SourcePhzFunctor::new(
            &corrections(),
            &grid,
            Arc::new(MaxMarginalizationFunctor::new(0)),
        )
        .expect("functor");
        let other = Arc::new(vec!["u".to_string(), "r".to_string()]);
        let sources = vec![
            CatalogSource::new("good", photometry(&names, [1.0, 1.0], 0.1)),
            CatalogSource::new("bad", photometry(&other, [1.0, 1.0], 0.1)),
        ];

        let error = CatalogHandler::new(functor)
            .process(&sources, None)
            .expect_err("missing filter");
        assert_eq!(
            error,
            LikelihoodError::Source {
                id: "bad".to_string(),
                error: Box::new(LikelihoodError::MissingSourceFilter {
                    filter: "g".to_string()
                }),
            }
        );
    }

    #[test]
    fn earliest_failing_source_is_reported() {
        let names = names();
        let grid = grid(&names);
        let functor = SourcePhzFunctor::new(
            &corrections(),
            &grid,
            Arc::new(MaxMarginalizationFunctor::new(0)),
        )
        .expect("functor");
        let other = Arc::new(vec!["u".to_string(), "r".to_string()]);
        let sources: Vec<_> = (0..64)
            .map(|index| {
                let photometry = if index % 5 == 3 {
                    photometry(&other, [1.0, 1.0], 0.1)
                } else {
                    photometry(&names, [1.0, 1.0], 0.1)
                };
                CatalogSource::new(format!("source-{index}"), photometry)
            })
            .collect();

        let handler = CatalogHandler::new(functor);
        for _ in 0..8 {
            match handler.process(&sources, None) {
                Err(LikelihoodError::Source { id, .. }) => assert_eq!(id, "source-3"),
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
    }
}
