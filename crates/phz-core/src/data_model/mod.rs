//! Value types shared across the modeling and likelihood stages, plus their
//! persistence.

pub mod filter_info;
pub mod photometric_correction;
pub mod photometry;
pub mod phz_model;
pub mod serialization;

pub use filter_info::FilterInfo;
pub use photometric_correction::{
    CORRECTION_MAP_HEADER, CorrectionMapError, PhotometricCorrectionMap,
    parse_photometric_correction_map, read_photometric_correction_map,
    render_photometric_correction_map, write_photometric_correction_map,
};
pub use photometry::{FluxErrorPair, Photometry, PhotometryError};
pub use phz_model::{
    EBV_AXIS_NAME, LikelihoodGrid, ModelParameter, PdfGrid, PhotometryGrid,
    REDDENING_CURVE_AXIS_NAME, SED_AXIS_NAME, Z_AXIS_NAME, create_model_axes, validate_model_axes,
};
pub use serialization::{
    PHOTOMETRY_GRID_MAGIC, SerializationError, decode_photometry_grid, encode_photometry_grid,
    read_photometry_grid, write_photometry_grid,
};
