use super::{AxisValue, GridAxis, GridCoordinates, GridError, GridIndexHelper};

/// Odometer over the free axes of a grid. Fixed axes stay at their pinned
/// index while the remaining ones advance, last axis fastest.
#[derive(Debug, Clone)]
struct Cursor {
    fixed: Vec<Option<usize>>,
    next: Option<GridCoordinates>,
    started: bool,
}

impl Cursor {
    fn new(shape: &[usize]) -> Self {
        let next = (!shape.is_empty() && !shape.contains(&0)).then(|| vec![0; shape.len()]);
        Self {
            fixed: vec![None; shape.len()],
            next,
            started: false,
        }
    }

    fn fix(
        &mut self,
        axes: &[GridAxis],
        axis: usize,
        index: usize,
    ) -> Result<(), GridError> {
        let Some(definition) = axes.get(axis) else {
            return Err(GridError::invalid_axis(
                format!("#{axis}"),
                format!("grid has only {} axes", axes.len()),
            ));
        };
        if index >= definition.len() {
            return Err(GridError::invalid_axis(
                definition.name(),
                format!(
                    "index {index} is out of range for {} coordinates",
                    definition.len()
                ),
            ));
        }
        if self.started {
            return Err(GridError::invalid_axis(
                definition.name(),
                "axes must be fixed before iteration starts",
            ));
        }
        if self.fixed[axis].is_some_and(|previous| previous != index) {
            // Two different pins on one axis select nothing.
            self.next = None;
        }
        self.fixed[axis] = Some(index);
        if let Some(next) = self.next.as_mut() {
            next[axis] = index;
        }
        Ok(())
    }

    fn advance(&mut self, shape: &[usize]) -> Option<GridCoordinates> {
        self.started = true;
        let current = self.next.take()?;
        let mut following = current.clone();
        for axis in (0..shape.len()).rev() {
            if self.fixed[axis].is_some() {
                continue;
            }
            following[axis] += 1;
            if following[axis] < shape[axis] {
                self.next = Some(following);
                return Some(current);
            }
            following[axis] = 0;
        }
        Some(current)
    }

    fn remaining(&self, shape: &[usize]) -> usize {
        let Some(next) = &self.next else {
            return 0;
        };
        let mut remaining = 0;
        let mut span = 1;
        for axis in (0..shape.len()).rev() {
            if self.fixed[axis].is_some() {
                continue;
            }
            remaining += (shape[axis] - 1 - next[axis]) * span;
            span *= shape[axis];
        }
        remaining + 1
    }
}

fn axis_index_for_value(
    axes: &[GridAxis],
    axis: usize,
    value: &AxisValue,
) -> Result<usize, GridError> {
    let Some(definition) = axes.get(axis) else {
        return Err(GridError::invalid_axis(
            format!("#{axis}"),
            format!("grid has only {} axes", axes.len()),
        ));
    };
    definition.index_of(value).ok_or_else(|| {
        GridError::invalid_axis(
            definition.name(),
            format!("coordinate {value} is not present on this axis"),
        )
    })
}

/// Shared-reference traversal of a grid in row-major order.
#[derive(Debug, Clone)]
pub struct GridIter<'a, C> {
    axes: &'a [GridAxis],
    index: &'a GridIndexHelper,
    cells: &'a [C],
    cursor: Cursor,
}

impl<'a, C> GridIter<'a, C> {
    pub(super) fn new(axes: &'a [GridAxis], index: &'a GridIndexHelper, cells: &'a [C]) -> Self {
        Self {
            axes,
            index,
            cells,
            cursor: Cursor::new(index.shape()),
        }
    }

    /// Restricts the traversal to cells whose `axis` coordinate is `index`.
    pub fn fix_axis_by_index(mut self, axis: usize, index: usize) -> Result<Self, GridError> {
        self.cursor.fix(self.axes, axis, index)?;
        Ok(self)
    }

    /// Restricts the traversal to cells whose `axis` coordinate equals
    /// `value`. Fails with [`GridError::InvalidAxis`] when the axis does not
    /// carry that coordinate.
    pub fn fix_axis_by_value(self, axis: usize, value: &AxisValue) -> Result<Self, GridError> {
        let index = axis_index_for_value(self.axes, axis, value)?;
        self.fix_axis_by_index(axis, index)
    }
}

impl<'a, C> Iterator for GridIter<'a, C> {
    type Item = (GridCoordinates, &'a C);

    fn next(&mut self) -> Option<Self::Item> {
        let coordinates = self.cursor.advance(self.index.shape())?;
        let flat = self.index.flat_index(&coordinates)?;
        Some((coordinates, &self.cells[flat]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining(self.index.shape());
        (remaining, Some(remaining))
    }
}

impl<C> ExactSizeIterator for GridIter<'_, C> {}

/// Exclusive-reference traversal of a grid in row-major order.
///
/// Visited flat offsets are strictly increasing, so each step splits the next
/// cell off the front of the remaining slice.
#[derive(Debug)]
pub struct GridIterMut<'a, C> {
    axes: &'a [GridAxis],
    index: &'a GridIndexHelper,
    rest: &'a mut [C],
    offset: usize,
    cursor: Cursor,
}

impl<'a, C> GridIterMut<'a, C> {
    pub(super) fn new(
        axes: &'a [GridAxis],
        index: &'a GridIndexHelper,
        cells: &'a mut [C],
    ) -> Self {
        Self {
            axes,
            index,
            rest: cells,
            offset: 0,
            cursor: Cursor::new(index.shape()),
        }
    }

    pub fn fix_axis_by_index(mut self, axis: usize, index: usize) -> Result<Self, GridError> {
        self.cursor.fix(self.axes, axis, index)?;
        Ok(self)
    }

    pub fn fix_axis_by_value(self, axis: usize, value: &AxisValue) -> Result<Self, GridError> {
        let index = axis_index_for_value(self.axes, axis, value)?;
        self.fix_axis_by_index(axis, index)
    }
}

impl<'a, C> Iterator for GridIterMut<'a, C> {
    type Item = (GridCoordinates, &'a mut C);

    fn next(&mut self) -> Option<Self::Item> {
        let coordinates = self.cursor.advance(self.index.shape())?;
        let flat = self.index.flat_index(&coordinates)?;
        let rest = std::mem::take(&mut self.rest);
        let (_, tail) = rest.split_at_mut(flat - self.offset);
        let (cell, remaining) = tail.split_first_mut()?;
        self.rest = remaining;
        self.offset = flat + 1;
        Some((coordinates, cell))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining(self.index.shape());
        (remaining, Some(remaining))
    }
}

impl<C> ExactSizeIterator for GridIterMut<'_, C> {}
