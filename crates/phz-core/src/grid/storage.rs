/// Backing storage for grid cells.
///
/// A manager is created for a fixed number of default-initialized cells and
/// exposes them as one contiguous run in grid iteration order. `Vec<T>` is the
/// in-memory implementation; arena or memory-mapped managers only need to
/// provide the same four entry points.
pub trait CellManager {
    type Cell;

    fn factory(size: usize) -> Self
    where
        Self: Sized;

    fn size(&self) -> usize;

    fn cells(&self) -> &[Self::Cell];

    fn cells_mut(&mut self) -> &mut [Self::Cell];
}

impl<T: Default + Clone> CellManager for Vec<T> {
    type Cell = T;

    fn factory(size: usize) -> Self {
        vec![T::default(); size]
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn cells(&self) -> &[T] {
        self.as_slice()
    }

    fn cells_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}
