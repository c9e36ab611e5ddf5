//! Physical constants shared by the modeling functors.

/// Speed of light in Å/s; filter normalizations are expressed against it.
pub const C_LIGHT_ANGSTROM_PER_SECOND: f64 = 2.997_924_58e18;
