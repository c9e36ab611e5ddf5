use phz_core::data_model::{
    FluxErrorPair, ModelParameter, PhotometricCorrectionMap, Photometry, create_model_axes,
    read_photometry_grid, write_photometry_grid,
};
use phz_core::dataset::{QualifiedName, XYDataset};
use phz_core::likelihood::{
    CatalogHandler, CatalogSource, SourcePhzFunctor, SumMarginalizationFunctor,
};
use phz_core::modeling::{BuildFilterInfoFunctor, IntegrateDatasetFunctor, PhotometryGridCreator};
use phz_core::numerics::InterpolationType;
use phz_core::output::{write_best_model_catalog, write_catalog_pdfs};
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const Z_VALUES: [f64; 4] = [0.0, 0.25, 0.5, 1.0];
const FILTERS: [(&str, f64, f64); 4] = [
    ("filters/blue", 3000.0, 3900.0),
    ("filters/green", 4500.0, 5500.0),
    ("filters/red", 6500.0, 7500.0),
    ("filters/ir", 8500.0, 9500.0),
];

fn assert_scalar_close(label: &str, expected: f64, actual: f64, tolerance: f64) {
    assert!(
        (expected - actual).abs() <= tolerance * expected.abs().max(1.0),
        "{label}: expected={expected} actual={actual}"
    );
}

fn sampled(from: f64, to: f64, step: f64, value: impl Fn(f64) -> f64) -> XYDataset {
    let count = ((to - from) / step).round() as usize + 1;
    (0..count)
        .map(|index| {
            let lambda = from + index as f64 * step;
            (lambda, value(lambda))
        })
        .collect()
}

fn named(entries: Vec<(&str, XYDataset)>) -> BTreeMap<QualifiedName, XYDataset> {
    entries
        .into_iter()
        .map(|(name, dataset)| (QualifiedName::parse(name), dataset))
        .collect()
}

// A 4000 Å break moves through the filters as z grows, so each redshift
// produces a distinct colour.
fn seds() -> BTreeMap<QualifiedName, XYDataset> {
    named(vec![
        (
            "seds/break",
            sampled(500.0, 12_000.0, 50.0, |lambda| {
                if lambda < 4000.0 { 0.2 } else { 1.0 }
            }),
        ),
        ("seds/flat", sampled(500.0, 12_000.0, 50.0, |_| 1.0)),
    ])
}

fn curves() -> BTreeMap<QualifiedName, XYDataset> {
    named(vec![(
        "curves/linear",
        sampled(100.0, 30_000.0, 100.0, |lambda| 4.0 - lambda / 10_000.0),
    )])
}

fn filters() -> BTreeMap<QualifiedName, XYDataset> {
    named(
        FILTERS
            .iter()
            .map(|(name, from, to)| (*name, sampled(*from, *to, 50.0, |_| 1.0)))
            .collect(),
    )
}

fn filter_list() -> Vec<QualifiedName> {
    FILTERS
        .iter()
        .map(|(name, _, _)| QualifiedName::parse(name))
        .collect()
}

#[test]
fn filter_normalization_is_independent_of_sampling_density() {
    let coarse = XYDataset::new(vec![
        (1.0, 1.0),
        (2.0, 4.0),
        (3.0, 9.0),
        (4.0, 16.0),
        (5.0, 25.0),
    ]);
    let dense = sampled(1.0, 5.0, 0.125, |lambda| lambda * lambda);

    let coarse = BuildFilterInfoFunctor.build(&coarse).expect("coarse filter");
    let dense = BuildFilterInfoFunctor.build(&dense).expect("dense filter");
    assert_eq!(coarse.range(), (1.0, 5.0));
    assert_scalar_close(
        "normalization",
        coarse.normalization(),
        dense.normalization(),
        1.0e-12,
    );
}

#[test]
fn flat_model_flux_matches_the_closed_form() {
    let integrator = IntegrateDatasetFunctor::new(InterpolationType::Linear);
    let flat = sampled(1000.0, 2000.0, 10.0, |_| 3.0);
    let integral = integrator.integrate(&flat, (1200.0, 1700.0)).expect("integral");
    assert_scalar_close("integral", 1500.0, integral, 1.0e-12);
    assert_eq!(
        integrator.integrate(&flat, (2500.0, 3000.0)).expect("outside"),
        0.0
    );
}

#[test]
fn catalog_fit_recovers_the_generating_models() {
    let temp = TempDir::new().expect("tempdir should be created");
    let axes = create_model_axes(
        Z_VALUES.to_vec(),
        vec![0.0, 0.1],
        vec![QualifiedName::parse("curves/linear")],
        vec![QualifiedName::parse("seds/break"), QualifiedName::parse("seds/flat")],
    )
    .expect("axes");
    let creator =
        PhotometryGridCreator::new(axes, filter_list(), &seds(), &curves(), &filters())
            .expect("creator");
    let grid = creator.create(None).expect("photometry grid");

    let grid_path = temp.path().join("grid.phz");
    write_photometry_grid(&grid_path, &grid).expect("grid should be written");
    let grid = read_photometry_grid(&grid_path).expect("grid should be read");

    let names = Arc::new(
        FILTERS
            .iter()
            .rev()
            .map(|(name, _, _)| name.to_string())
            .collect::<Vec<_>>(),
    );
    let sources: Vec<CatalogSource> = Z_VALUES
        .iter()
        .enumerate()
        .map(|(z_index, _)| {
            let model = &grid[[z_index, 1, 0, 0]];
            let values = model
                .values()
                .iter()
                .rev()
                .map(|pair| FluxErrorPair::new(2.5 * pair.flux, 0.02 * pair.flux))
                .collect();
            let photometry =
                Photometry::new(Arc::clone(&names), values).expect("source photometry");
            CatalogSource::new(format!("{}", 100 + z_index), photometry)
        })
        .collect();

    let corrections: PhotometricCorrectionMap =
        filter_list().into_iter().map(|filter| (filter, 1.0)).collect();
    let functor = SourcePhzFunctor::new(
        &corrections,
        &grid,
        Arc::new(SumMarginalizationFunctor::for_parameter(ModelParameter::Z)),
    )
    .expect("functor");
    let results = CatalogHandler::new(functor)
        .process(&sources, None)
        .expect("catalog");

    let z_weights = grid.axes()[ModelParameter::Z.axis()].integration_weights();
    for (z_index, entry) in results.iter().enumerate() {
        assert_eq!(entry.id, format!("{}", 100 + z_index));
        let best = &entry.result.best_model;
        assert_eq!(best[ModelParameter::Z.axis()], z_index, "source {}", entry.id);
        assert_eq!(best[ModelParameter::Sed.axis()], 0, "source {}", entry.id);
        assert_eq!(best[ModelParameter::Ebv.axis()], 1, "source {}", entry.id);
        assert_scalar_close(
            "scale factor",
            2.5,
            entry.result.best_scale_factor.expect("scale"),
            1.0e-9,
        );

        let pdf = &entry.result.pdf;
        let integral: f64 = pdf
            .cells()
            .iter()
            .zip(&z_weights)
            .map(|(value, weight)| value * weight)
            .sum();
        assert_scalar_close("pdf integral", 1.0, integral, 1.0e-9);
        let peak = pdf
            .cells()
            .iter()
            .enumerate()
            .max_by(|left, right| left.1.total_cmp(right.1))
            .map(|(index, _)| index);
        assert_eq!(peak, Some(z_index));
    }

    let pdf_dir = temp.path().join("pdf");
    let paths = write_catalog_pdfs(&pdf_dir, &results).expect("pdf tables");
    assert_eq!(paths.len(), Z_VALUES.len());
    let table = fs::read_to_string(&paths[0]).expect("pdf table should be readable");
    assert!(table.starts_with("# Z Probability\n0 "));

    let catalog_path = temp.path().join("best_model.txt");
    write_best_model_catalog(&catalog_path, grid.axes(), &results).expect("catalog");
    let catalog = fs::read_to_string(&catalog_path).expect("catalog should be readable");
    let rows: Vec<&str> = catalog.lines().collect();
    assert_eq!(rows.len(), 1 + Z_VALUES.len());
    assert!(rows[3].starts_with("102 seds/break curves/linear 0.1 0.5 "));
}
