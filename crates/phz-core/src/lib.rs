//! Photometric-redshift estimation: synthetic photometry over a model grid,
//! likelihood fitting of observed sources, marginalized redshift PDFs and
//! photometric zero-point calibration.

pub mod common;
pub mod data_model;
pub mod dataset;
pub mod domain;
pub mod grid;
pub mod likelihood;
pub mod modeling;
pub mod numerics;
pub mod output;
pub mod photometric_correction;

pub use domain::{PhzError, PhzErrorCategory, PhzResult};
