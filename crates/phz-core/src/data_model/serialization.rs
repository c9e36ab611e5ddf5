//! Binary persistence of photometry grids.
//!
//! Layout (little endian):
//!
//! ```text
//! magic "PHZGRID1"
//! u32 axis count
//!   per axis: string name, u8 kind (0 numeric, 1 categorical), u32 length,
//!             coordinates (f64, or string qualified names)
//! u32 filter count, then each filter name as a string
//! per cell in grid order, per filter in list order: f64 flux, f64 error
//! ```
//!
//! Strings are a u32 byte length followed by UTF-8 bytes. The filter names are
//! written once; decoding gives every cell the same newly allocated list.

use super::{FluxErrorPair, Photometry, PhotometryGrid};
use crate::dataset::QualifiedName;
use crate::grid::{AxisValues, GridAxis, GridContainer, GridError};
use crate::output::write_binary_artifact;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const PHOTOMETRY_GRID_MAGIC: &[u8; 8] = b"PHZGRID1";

const NUMERIC_AXIS_TAG: u8 = 0;
const CATEGORICAL_AXIS_TAG: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("cannot serialize a photometry grid with no cells")]
    EmptyGrid,
    #[error("cannot serialize a photometry grid whose cells carry no filters")]
    NoFilters,
    #[error("photometry grid cell {cell_index} has a different filter set: {detail}")]
    FilterMismatch { cell_index: usize, detail: String },
    #[error("corrupted photometry grid data: {reason}")]
    Corrupted { reason: String },
    #[error("photometry grid value does not fit the binary format: {reason}")]
    TooLarge { reason: String },
    #[error("photometry grid I/O failed for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Encodes `grid`, checking every precondition before producing any bytes.
pub fn encode_photometry_grid(grid: &PhotometryGrid) -> Result<Vec<u8>, SerializationError> {
    let cells = grid.cells();
    let Some(reference) = cells.first() else {
        return Err(SerializationError::EmptyGrid);
    };
    for (cell_index, cell) in cells.iter().enumerate().skip(1) {
        if !reference.has_same_filters(cell) {
            return Err(SerializationError::FilterMismatch {
                cell_index,
                detail: describe_filter_difference(reference.filter_names(), cell.filter_names()),
            });
        }
    }

    let filter_names = reference.filter_names();
    if filter_names.is_empty() {
        return Err(SerializationError::NoFilters);
    }
    let mut bytes = Vec::with_capacity(
        PHOTOMETRY_GRID_MAGIC.len() + cells.len() * filter_names.len() * 16,
    );
    bytes.extend_from_slice(PHOTOMETRY_GRID_MAGIC);

    push_len(&mut bytes, grid.axis_count())?;
    for axis in grid.axes() {
        push_string(&mut bytes, axis.name())?;
        match axis.values() {
            AxisValues::Numeric(values) => {
                bytes.push(NUMERIC_AXIS_TAG);
                push_len(&mut bytes, values.len())?;
                for value in values {
                    push_f64(&mut bytes, *value);
                }
            }
            AxisValues::Categorical(values) => {
                bytes.push(CATEGORICAL_AXIS_TAG);
                push_len(&mut bytes, values.len())?;
                for value in values {
                    push_string(&mut bytes, &value.to_string())?;
                }
            }
        }
    }

    push_len(&mut bytes, filter_names.len())?;
    for name in filter_names.iter() {
        push_string(&mut bytes, name)?;
    }

    for cell in cells {
        for pair in cell.values() {
            push_f64(&mut bytes, pair.flux);
            push_f64(&mut bytes, pair.error);
        }
    }
    Ok(bytes)
}

pub fn decode_photometry_grid(bytes: &[u8]) -> Result<PhotometryGrid, SerializationError> {
    if !bytes.starts_with(PHOTOMETRY_GRID_MAGIC) {
        return Err(corrupted("missing PHZGRID1 header"));
    }
    let mut offset = PHOTOMETRY_GRID_MAGIC.len();

    let axis_count = take_len(bytes, &mut offset, "axis count")?;
    let mut axes = Vec::with_capacity(axis_count.min(16));
    for _ in 0..axis_count {
        let name = take_string(bytes, &mut offset, "axis name")?;
        let tag = take_u8(bytes, &mut offset).ok_or_else(|| corrupted("missing axis kind"))?;
        let length = take_len(bytes, &mut offset, "axis length")?;
        let axis = match tag {
            NUMERIC_AXIS_TAG => {
                let mut values = Vec::with_capacity(length.min(bytes.len() / 8));
                for _ in 0..length {
                    values.push(
                        take_f64(bytes, &mut offset)
                            .ok_or_else(|| corrupted("truncated numeric axis coordinates"))?,
                    );
                }
                GridAxis::numeric(name, values)?
            }
            CATEGORICAL_AXIS_TAG => {
                let mut values = Vec::with_capacity(length.min(bytes.len() / 4));
                for _ in 0..length {
                    let value = take_string(bytes, &mut offset, "axis coordinate")?;
                    values.push(QualifiedName::parse(&value));
                }
                GridAxis::categorical(name, values)?
            }
            other => return Err(corrupted(format!("unknown axis kind {other}"))),
        };
        axes.push(axis);
    }

    let filter_count = take_len(bytes, &mut offset, "filter count")?;
    let mut filter_names = Vec::with_capacity(filter_count.min(bytes.len() / 4));
    for _ in 0..filter_count {
        filter_names.push(take_string(bytes, &mut offset, "filter name")?);
    }
    let filter_names = Arc::new(filter_names);

    let cell_count = axes
        .iter()
        .try_fold(1_usize, |cells, axis| cells.checked_mul(axis.len()))
        .map(|cells| if axes.is_empty() { 0 } else { cells })
        .ok_or_else(|| corrupted("axis lengths overflow the cell count"))?;
    if cell_count > 0 && filter_count == 0 {
        return Err(corrupted(format!("{cell_count} cells carry no filters")));
    }
    let payload = bytes.len() - offset;
    let expected_payload = cell_count
        .checked_mul(filter_count)
        .and_then(|pairs| pairs.checked_mul(16));
    if expected_payload != Some(payload) {
        return Err(corrupted(format!(
            "cell payload has {payload} bytes, expected {cell_count} cells of {filter_count} filters"
        )));
    }

    let mut grid = GridContainer::<Vec<Photometry>>::new(axes)?;
    for cell in grid.cells_mut() {
        let mut values = Vec::with_capacity(filter_count);
        for _ in 0..filter_count {
            let flux = take_f64(bytes, &mut offset).ok_or_else(|| corrupted("truncated flux"))?;
            let error = take_f64(bytes, &mut offset).ok_or_else(|| corrupted("truncated error"))?;
            values.push(FluxErrorPair::new(flux, error));
        }
        *cell = Photometry::new(Arc::clone(&filter_names), values)
            .map_err(|error| corrupted(error.to_string()))?;
    }
    Ok(grid)
}

pub fn write_photometry_grid(
    path: impl AsRef<Path>,
    grid: &PhotometryGrid,
) -> Result<(), SerializationError> {
    let path = path.as_ref();
    let bytes = encode_photometry_grid(grid)?;
    write_binary_artifact(path, &bytes).map_err(|source| SerializationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        cells = grid.size(),
        bytes = bytes.len(),
        "wrote photometry grid"
    );
    Ok(())
}

pub fn read_photometry_grid(path: impl AsRef<Path>) -> Result<PhotometryGrid, SerializationError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| SerializationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = decode_photometry_grid(&bytes)?;
    tracing::info!(path = %path.display(), cells = grid.size(), "read photometry grid");
    Ok(grid)
}

fn describe_filter_difference(expected: &[String], actual: &[String]) -> String {
    if expected.len() != actual.len() {
        return format!("expected {} filters, found {}", expected.len(), actual.len());
    }
    match expected
        .iter()
        .zip(actual)
        .position(|(expected, actual)| expected != actual)
    {
        Some(index) => format!(
            "filter {index} is '{}', expected '{}'",
            actual[index], expected[index]
        ),
        None => "filter lists differ".to_string(),
    }
}

fn corrupted(reason: impl Into<String>) -> SerializationError {
    SerializationError::Corrupted {
        reason: reason.into(),
    }
}

fn push_u32(target: &mut Vec<u8>, value: u32) {
    target.extend_from_slice(&value.to_le_bytes());
}

fn push_f64(target: &mut Vec<u8>, value: f64) {
    target.extend_from_slice(&value.to_le_bytes());
}

fn push_len(target: &mut Vec<u8>, value: usize) -> Result<(), SerializationError> {
    let value = u32::try_from(value).map_err(|_| SerializationError::TooLarge {
        reason: format!("length {value} exceeds u32"),
    })?;
    push_u32(target, value);
    Ok(())
}

fn push_string(target: &mut Vec<u8>, value: &str) -> Result<(), SerializationError> {
    push_len(target, value.len())?;
    target.extend_from_slice(value.as_bytes());
    Ok(())
}

fn take_u8(bytes: &[u8], offset: &mut usize) -> Option<u8> {
    let value = *bytes.get(*offset)?;
    *offset += 1;
    Some(value)
}

fn take_u32(bytes: &[u8], offset: &mut usize) -> Option<u32> {
    let end = offset.checked_add(std::mem::size_of::<u32>())?;
    let slice = bytes.get(*offset..end)?;
    let value = u32::from_le_bytes(slice.try_into().ok()?);
    *offset = end;
    Some(value)
}

fn take_f64(bytes: &[u8], offset: &mut usize) -> Option<f64> {
    let end = offset.checked_add(std::mem::size_of::<f64>())?;
    let slice = bytes.get(*offset..end)?;
    let value = f64::from_le_bytes(slice.try_into().ok()?);
    *offset = end;
    Some(value)
}

fn take_len(bytes: &[u8], offset: &mut usize, what: &str) -> Result<usize, SerializationError> {
    take_u32(bytes, offset)
        .map(|value| value as usize)
        .ok_or_else(|| corrupted(format!("missing {what}")))
}

fn take_string(bytes: &[u8], offset: &mut usize, what: &str) -> Result<String, SerializationError> {
    let length = take_len(bytes, offset, what)?;
    let end = offset
        .checked_add(length)
        .ok_or_else(|| corrupted(format!("{what} length overflows")))?;
    let slice = bytes
        .get(*offset..end)
        .ok_or_else(|| corrupted(format!("truncated {what}")))?;
    let value = std::str::from_utf8(slice)
        .map_err(|_| corrupted(format!("{what} is not valid UTF-8")))?
        .to_string();
    *offset = end;
    Ok(value)
}
