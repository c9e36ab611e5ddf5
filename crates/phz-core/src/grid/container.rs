use super::{
    CellManager, GridAxis, GridCoordinates, GridError, GridIndexHelper, GridIter, GridIterMut,
};
use std::collections::BTreeSet;
use std::ops::{Index, IndexMut};

/// N-dimensional grid of cells over named axes.
///
/// The container exclusively owns its storage manager. Every cell is default
/// constructed when the grid is created; mutation happens in place through
/// the references handed out by [`get_mut`](Self::get_mut), [`iter_mut`](Self::iter_mut)
/// and [`cells_mut`](Self::cells_mut).
#[derive(Debug, Clone, PartialEq)]
pub struct GridContainer<M: CellManager> {
    axes: Vec<GridAxis>,
    index: GridIndexHelper,
    manager: M,
}

impl<M: CellManager> GridContainer<M> {
    pub fn new(axes: Vec<GridAxis>) -> Result<Self, GridError> {
        let index = validate_axes(&axes)?;
        let manager = M::factory(index.size());
        Ok(Self {
            axes,
            index,
            manager,
        })
    }

    /// Wraps an already populated manager. Its size must match the axes.
    pub fn from_parts(axes: Vec<GridAxis>, manager: M) -> Result<Self, GridError> {
        let index = validate_axes(&axes)?;
        if manager.size() != index.size() {
            return Err(GridError::DimensionMismatch {
                expected: index.size(),
                actual: manager.size(),
            });
        }
        Ok(Self {
            axes,
            index,
            manager,
        })
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn axis(&self, axis: usize) -> Option<&GridAxis> {
        self.axes.get(axis)
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    pub fn axis_index_by_name(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|axis| axis.name() == name)
    }

    pub fn shape(&self) -> &[usize] {
        self.index.shape()
    }

    pub fn size(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn flat_index(&self, coordinates: &[usize]) -> Result<usize, GridError> {
        if coordinates.len() != self.axes.len() {
            return Err(GridError::DimensionMismatch {
                expected: self.axes.len(),
                actual: coordinates.len(),
            });
        }
        for (axis, (index, length)) in self.axes.iter().zip(coordinates.iter().zip(self.shape())) {
            if index >= length {
                return Err(GridError::invalid_axis(
                    axis.name(),
                    format!("index {index} is out of range for {length} coordinates"),
                ));
            }
        }
        self.index.flat_index(coordinates).ok_or_else(|| {
            GridError::invalid_axis("", format!("coordinates {coordinates:?} out of range"))
        })
    }

    pub fn coordinates_of(&self, flat: usize) -> Option<GridCoordinates> {
        self.index.coordinates(flat)
    }

    pub fn get(&self, coordinates: &[usize]) -> Result<&M::Cell, GridError> {
        let flat = self.flat_index(coordinates)?;
        Ok(&self.manager.cells()[flat])
    }

    pub fn get_mut(&mut self, coordinates: &[usize]) -> Result<&mut M::Cell, GridError> {
        let flat = self.flat_index(coordinates)?;
        Ok(&mut self.manager.cells_mut()[flat])
    }

    /// Every cell in iteration order.
    pub fn cells(&self) -> &[M::Cell] {
        self.manager.cells()
    }

    /// Every cell in iteration order. Callers that split this slice across
    /// threads get disjoint writes without any locking in the container.
    pub fn cells_mut(&mut self) -> &mut [M::Cell] {
        self.manager.cells_mut()
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn iter(&self) -> GridIter<'_, M::Cell> {
        GridIter::new(&self.axes, &self.index, self.manager.cells())
    }

    pub fn iter_mut(&mut self) -> GridIterMut<'_, M::Cell> {
        GridIterMut::new(&self.axes, &self.index, self.manager.cells_mut())
    }

    /// New default-initialized grid over `kept_axes`, in the listed order.
    pub fn rebuild<M2: CellManager>(
        &self,
        kept_axes: &[usize],
    ) -> Result<GridContainer<M2>, GridError> {
        let mut seen = BTreeSet::new();
        let mut axes = Vec::with_capacity(kept_axes.len());
        for &axis in kept_axes {
            let Some(definition) = self.axes.get(axis) else {
                return Err(GridError::invalid_axis(
                    format!("#{axis}"),
                    format!("grid has only {} axes", self.axes.len()),
                ));
            };
            if !seen.insert(axis) {
                return Err(GridError::invalid_axis(
                    definition.name(),
                    "axis listed more than once",
                ));
            }
            axes.push(definition.clone());
        }
        GridContainer::new(axes)
    }
}

impl<M: CellManager, const N: usize> Index<[usize; N]> for GridContainer<M> {
    type Output = M::Cell;

    fn index(&self, coordinates: [usize; N]) -> &Self::Output {
        match self.get(&coordinates) {
            Ok(cell) => cell,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<M: CellManager, const N: usize> IndexMut<[usize; N]> for GridContainer<M> {
    fn index_mut(&mut self, coordinates: [usize; N]) -> &mut Self::Output {
        match self.get_mut(&coordinates) {
            Ok(cell) => cell,
            Err(error) => panic!("{error}"),
        }
    }
}

fn validate_axes(axes: &[GridAxis]) -> Result<GridIndexHelper, GridError> {
    let mut names = BTreeSet::new();
    for axis in axes {
        if axis.is_empty() {
            return Err(GridError::EmptyAxis {
                axis: axis.name().to_string(),
            });
        }
        if !names.insert(axis.name()) {
            return Err(GridError::invalid_axis(
                axis.name(),
                "axis name is used more than once",
            ));
        }
    }
    let shape: Vec<usize> = axes.iter().map(GridAxis::len).collect();
    GridIndexHelper::new(shape.clone()).ok_or(GridError::TooManyCells { shape })
}

#[cfg(test)]
mod tests {
    use super::GridContainer;
    use crate::dataset::QualifiedName;
    use crate::grid::{GridAxis, GridError};

    fn sample_axes() -> Vec<GridAxis> {
        vec![
            GridAxis::numeric("Z", vec![0.0, 0.5, 1.0]).expect("Z axis"),
            GridAxis::categorical(
                "SED",
                vec![QualifiedName::parse("Sed1"), QualifiedName::parse("Sed2")],
            )
            .expect("SED axis"),
        ]
    }

    #[test]
    fn construction_sizes_the_grid_from_its_axes() {
        let grid = GridContainer::<Vec<f64>>::new(sample_axes()).expect("grid");
        assert_eq!(grid.axis_count(), 2);
        assert_eq!(grid.shape(), [3, 2]);
        assert_eq!(grid.size(), 6);
        assert_eq!(grid.axis_index_by_name("SED"), Some(1));
        assert_eq!(grid.axis_index_by_name("E(B-V)"), None);
        assert!(grid.cells().iter().all(|cell| *cell == 0.0));
    }

    #[test]
    fn grid_without_axes_is_empty() {
        let grid = GridContainer::<Vec<f64>>::new(Vec::new()).expect("grid");
        assert_eq!(grid.size(), 0);
        assert!(grid.is_empty());
        assert_eq!(grid.iter().count(), 0);
    }

    #[test]
    fn indexed_access_reads_and_writes_single_cells() {
        let mut grid = GridContainer::<Vec<f64>>::new(sample_axes()).expect("grid");
        *grid.get_mut(&[1, 1]).expect("cell") = 4.5;
        grid[[2, 0]] = 7.0;

        assert_eq!(grid[[1, 1]], 4.5);
        assert_eq!(*grid.get(&[2, 0]).expect("cell"), 7.0);
        assert_eq!(grid.cells()[3], 4.5);
        assert_eq!(grid.flat_index(&[2, 0]), Ok(4));
        assert_eq!(grid.coordinates_of(4), Some(vec![2, 0]));
    }

    #[test]
    fn indexed_access_rejects_bad_coordinates() {
        let grid = GridContainer::<Vec<f64>>::new(sample_axes()).expect("grid");
        assert_eq!(
            grid.get(&[0]),
            Err(GridError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            grid.get(&[0, 2]),
            Err(GridError::InvalidAxis { ref axis, .. }) if axis == "SED"
        ));
    }

    #[test]
    fn duplicate_axis_names_are_rejected() {
        let axes = vec![
            GridAxis::numeric("Z", vec![0.0]).expect("axis"),
            GridAxis::numeric("Z", vec![1.0]).expect("axis"),
        ];
        assert!(matches!(
            GridContainer::<Vec<f64>>::new(axes),
            Err(GridError::InvalidAxis { .. })
        ));
    }

    #[test]
    fn rebuild_keeps_listed_axes_in_listed_order() {
        let mut grid = GridContainer::<Vec<f64>>::new(sample_axes()).expect("grid");
        grid[[0, 0]] = 1.0;

        let rebuilt = grid.rebuild::<Vec<u32>>(&[1, 0]).expect("rebuilt");
        assert_eq!(rebuilt.axes()[0].name(), "SED");
        assert_eq!(rebuilt.axes()[1].name(), "Z");
        assert_eq!(rebuilt.shape(), [2, 3]);
        assert!(rebuilt.cells().iter().all(|cell| *cell == 0));

        let reduced = grid.rebuild::<Vec<f64>>(&[0]).expect("reduced");
        assert_eq!(reduced.size(), 3);
        assert_eq!(grid[[0, 0]], 1.0);
    }

    #[test]
    fn rebuild_rejects_unknown_and_repeated_axes() {
        let grid = GridContainer::<Vec<f64>>::new(sample_axes()).expect("grid");
        assert!(matches!(
            grid.rebuild::<Vec<f64>>(&[2]),
            Err(GridError::InvalidAxis { .. })
        ));
        assert!(matches!(
            grid.rebuild::<Vec<f64>>(&[0, 0]),
            Err(GridError::InvalidAxis { .. })
        ));
    }

    #[test]
    fn from_parts_checks_the_manager_size() {
        assert_eq!(
            GridContainer::from_parts(sample_axes(), vec![0.0_f64; 5]),
            Err(GridError::DimensionMismatch {
                expected: 6,
                actual: 5
            })
        );
        let grid =
            GridContainer::from_parts(sample_axes(), (0..6).map(f64::from).collect::<Vec<_>>())
                .expect("grid");
        assert_eq!(grid[[2, 1]], 5.0);
    }
}
