use super::Photometry;
use crate::dataset::QualifiedName;
use crate::grid::{GridAxis, GridContainer, GridError};

pub const Z_AXIS_NAME: &str = "Z";
pub const EBV_AXIS_NAME: &str = "E(B-V)";
pub const REDDENING_CURVE_AXIS_NAME: &str = "Reddening Curve";
pub const SED_AXIS_NAME: &str = "SED";

/// Position of each model parameter in the model grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelParameter {
    Z = 0,
    Ebv = 1,
    ReddeningCurve = 2,
    Sed = 3,
}

impl ModelParameter {
    pub const ALL: [Self; 4] = [Self::Z, Self::Ebv, Self::ReddeningCurve, Self::Sed];

    pub const fn axis(self) -> usize {
        self as usize
    }

    pub const fn axis_name(self) -> &'static str {
        match self {
            Self::Z => Z_AXIS_NAME,
            Self::Ebv => EBV_AXIS_NAME,
            Self::ReddeningCurve => REDDENING_CURVE_AXIS_NAME,
            Self::Sed => SED_AXIS_NAME,
        }
    }
}

pub type PhotometryGrid = GridContainer<Vec<Photometry>>;
pub type LikelihoodGrid = GridContainer<Vec<f64>>;
pub type PdfGrid = GridContainer<Vec<f64>>;

/// Builds the (Z, E(B-V), Reddening Curve, SED) axes of a model grid.
pub fn create_model_axes(
    zs: Vec<f64>,
    ebvs: Vec<f64>,
    reddening_curves: Vec<QualifiedName>,
    seds: Vec<QualifiedName>,
) -> Result<Vec<GridAxis>, GridError> {
    Ok(vec![
        GridAxis::numeric(Z_AXIS_NAME, zs)?,
        GridAxis::numeric(EBV_AXIS_NAME, ebvs)?,
        GridAxis::categorical(REDDENING_CURVE_AXIS_NAME, reddening_curves)?,
        GridAxis::categorical(SED_AXIS_NAME, seds)?,
    ])
}

/// Checks that `axes` are laid out as a model grid.
pub fn validate_model_axes(axes: &[GridAxis]) -> Result<(), GridError> {
    if axes.len() != ModelParameter::ALL.len() {
        return Err(GridError::DimensionMismatch {
            expected: ModelParameter::ALL.len(),
            actual: axes.len(),
        });
    }
    for parameter in ModelParameter::ALL {
        let axis = &axes[parameter.axis()];
        if axis.name() != parameter.axis_name() {
            return Err(GridError::invalid_axis(
                axis.name(),
                format!(
                    "model axis {} must be named '{}'",
                    parameter.axis(),
                    parameter.axis_name()
                ),
            ));
        }
    }
    let numeric = [ModelParameter::Z, ModelParameter::Ebv];
    for parameter in ModelParameter::ALL {
        let axis = &axes[parameter.axis()];
        let expects_numeric = numeric.contains(&parameter);
        if axis.numeric_values().is_some() != expects_numeric {
            return Err(GridError::invalid_axis(
                axis.name(),
                if expects_numeric {
                    "model axis must be numeric"
                } else {
                    "model axis must be categorical"
                },
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ModelParameter, create_model_axes, validate_model_axes};
    use crate::dataset::QualifiedName;
    use crate::grid::{GridAxis, GridError};

    #[test]
    fn model_axes_use_the_canonical_names_and_order() {
        let axes = create_model_axes(
            vec![0.0, 1.0],
            vec![0.0],
            vec![QualifiedName::parse("Curve1")],
            vec![QualifiedName::parse("Sed1"), QualifiedName::parse("Sed2")],
        )
        .expect("axes");

        let names: Vec<&str> = axes.iter().map(GridAxis::name).collect();
        assert_eq!(names, ["Z", "E(B-V)", "Reddening Curve", "SED"]);
        assert_eq!(axes[ModelParameter::Sed.axis()].len(), 2);
        assert!(validate_model_axes(&axes).is_ok());
    }

    #[test]
    fn validation_rejects_reordered_axes() {
        let mut axes = create_model_axes(
            vec![0.0],
            vec![0.0],
            vec![QualifiedName::parse("Curve1")],
            vec![QualifiedName::parse("Sed1")],
        )
        .expect("axes");
        axes.swap(0, 1);
        assert!(matches!(
            validate_model_axes(&axes),
            Err(GridError::InvalidAxis { .. })
        ));
        assert!(matches!(
            validate_model_axes(&axes[..2]),
            Err(GridError::DimensionMismatch { .. })
        ));
    }
}
