use super::{ExtinctionFunctor, ModelingError, RedshiftFunctor};
use crate::data_model::{ModelParameter, validate_model_axes};
use crate::dataset::{QualifiedName, XYDataset};
use crate::grid::{GridAxis, GridError, GridIndexHelper};
use crate::numerics::{InterpolationType, PiecewisePolynomial, interpolate};
use std::collections::BTreeMap;

/// Model spectra for every cell of a (Z, E(B-V), Reddening Curve, SED)
/// parameter space, addressed by the flat index of the matching grid cell.
///
/// A model is the SED reddened by `E(B-V)` along its reddening curve, then
/// redshifted to `Z`.
#[derive(Debug, Clone)]
pub struct ModelDatasetGenerator {
    index: GridIndexHelper,
    zs: Vec<f64>,
    ebvs: Vec<f64>,
    reddening_curves: Vec<PiecewisePolynomial>,
    seds: Vec<XYDataset>,
    reddening: ExtinctionFunctor,
    redshift: RedshiftFunctor,
}

impl ModelDatasetGenerator {
    pub fn new(
        axes: &[GridAxis],
        sed_map: &BTreeMap<QualifiedName, XYDataset>,
        reddening_curve_map: &BTreeMap<QualifiedName, XYDataset>,
    ) -> Result<Self, ModelingError> {
        validate_model_axes(axes)?;
        let zs = numeric_axis(axes, ModelParameter::Z)?;
        let ebvs = numeric_axis(axes, ModelParameter::Ebv)?;

        let mut reddening_curves = Vec::new();
        for name in categorical_axis(axes, ModelParameter::ReddeningCurve)? {
            let Some(curve) = reddening_curve_map.get(name) else {
                return Err(ModelingError::MissingReddeningCurve {
                    curve: name.to_string(),
                });
            };
            let function = interpolate(curve.points(), InterpolationType::Linear)
                .map_err(|source| {
                    ModelingError::interpolation(format!("reddening curve '{name}'"), source)
                })?;
            reddening_curves.push(function);
        }

        let mut seds = Vec::new();
        for name in categorical_axis(axes, ModelParameter::Sed)? {
            let Some(sed) = sed_map.get(name) else {
                return Err(ModelingError::MissingSed {
                    sed: name.to_string(),
                });
            };
            seds.push(sed.clone());
        }

        let shape: Vec<usize> = axes.iter().map(GridAxis::len).collect();
        let index =
            GridIndexHelper::new(shape.clone()).ok_or(GridError::TooManyCells { shape })?;
        Ok(Self {
            index,
            zs,
            ebvs,
            reddening_curves,
            seds,
            reddening: ExtinctionFunctor,
            redshift: RedshiftFunctor,
        })
    }

    pub fn len(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn model_at(&self, flat: usize) -> Result<XYDataset, ModelingError> {
        if flat >= self.len() {
            return Err(ModelingError::ModelIndexOutOfRange {
                index: flat,
                size: self.len(),
            });
        }
        let at = |parameter: ModelParameter| self.index.axis_index(parameter.axis(), flat);
        let reddened = self.reddening.apply(
            &self.seds[at(ModelParameter::Sed)],
            &self.reddening_curves[at(ModelParameter::ReddeningCurve)],
            self.ebvs[at(ModelParameter::Ebv)],
        );
        Ok(self.redshift.apply(&reddened, self.zs[at(ModelParameter::Z)]))
    }

    /// Every model in grid order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Result<XYDataset, ModelingError>> + '_ {
        (0..self.len()).map(|flat| self.model_at(flat))
    }
}

fn numeric_axis(axes: &[GridAxis], parameter: ModelParameter) -> Result<Vec<f64>, GridError> {
    let axis = &axes[parameter.axis()];
    axis.numeric_values()
        .map(<[f64]>::to_vec)
        .ok_or_else(|| GridError::invalid_axis(axis.name(), "model axis must be numeric"))
}

fn categorical_axis(
    axes: &[GridAxis],
    parameter: ModelParameter,
) -> Result<&[QualifiedName], GridError> {
    let axis = &axes[parameter.axis()];
    axis.categorical_values()
        .ok_or_else(|| GridError::invalid_axis(axis.name(), "model axis must be categorical"))
}

#[cfg(test)]
mod tests {
    use super::ModelDatasetGenerator;
    use crate::data_model::create_model_axes;
    use crate::dataset::{QualifiedName, XYDataset};
    use crate::modeling::ModelingError;
    use std::collections::BTreeMap;

    fn sed_map() -> BTreeMap<QualifiedName, XYDataset> {
        let mut map = BTreeMap::new();
        map.insert(
            QualifiedName::parse("Sed1"),
            XYDataset::new(vec![(1000.0, 1.0), (2000.0, 1.0)]),
        );
        map.insert(
            QualifiedName::parse("Sed2"),
            XYDataset::new(vec![(1000.0, 2.0), (2000.0, 2.0)]),
        );
        map
    }

    fn curve_map() -> BTreeMap<QualifiedName, XYDataset> {
        let mut map = BTreeMap::new();
        map.insert(
            QualifiedName::parse("Curve1"),
            XYDataset::new(vec![(500.0, 2.5), (5000.0, 2.5)]),
        );
        map
    }

    #[test]
    fn models_follow_the_grid_order() {
        let axes = create_model_axes(
            vec![0.0, 1.0],
            vec![0.0, 0.4],
            vec![QualifiedName::parse("Curve1")],
            vec![QualifiedName::parse("Sed1"), QualifiedName::parse("Sed2")],
        )
        .expect("axes");
        let generator = ModelDatasetGenerator::new(&axes, &sed_map(), &curve_map()).expect("generator");
        assert_eq!(generator.len(), 8);

        // flat 1 = (z 0, ebv 0, curve 0, Sed2)
        let model = generator.model_at(1).expect("model");
        assert_eq!(model.points(), [(1000.0, 2.0), (2000.0, 2.0)]);

        // flat 6 = (z 1, ebv 0.4, curve 0, Sed1): 10^(-0.4*2.5*0.4) / 4
        let model = generator.model_at(6).expect("model");
        let expected = 10_f64.powf(-0.4) / 4.0;
        assert_eq!(model.points()[0].0, 2000.0);
        assert!((model.points()[0].1 - expected).abs() < 1.0e-15);

        let collected: Vec<XYDataset> = generator
            .iter()
            .collect::<Result<_, _>>()
            .expect("models");
        assert_eq!(collected.len(), 8);
        assert_eq!(collected[6], generator.model_at(6).expect("model"));
        assert!(matches!(
            generator.model_at(8),
            Err(ModelingError::ModelIndexOutOfRange { index: 8, size: 8 })
        ));
    }

    #[test]
    fn unknown_templates_are_reported_by_kind() {
        let axes = create_model_axes(
            vec![0.0],
            vec![0.0],
            vec![QualifiedName::parse("Curve1")],
            vec![QualifiedName::parse("Sed3")],
        )
        .expect("axes");
        assert_eq!(
            ModelDatasetGenerator::new(&axes, &sed_map(), &curve_map()).expect_err("missing SED"),
            ModelingError::MissingSed {
                sed: "Sed3".to_string()
            }
        );

        let axes = create_model_axes(
            vec![0.0],
            vec![0.0],
            vec![QualifiedName::parse("Curve2")],
            vec![QualifiedName::parse("Sed1")],
        )
        .expect("axes");
        assert_eq!(
            ModelDatasetGenerator::new(&axes, &sed_map(), &curve_map()).expect_err("missing curve"),
            ModelingError::MissingReddeningCurve {
                curve: "Curve2".to_string()
            }
        );
    }
}
