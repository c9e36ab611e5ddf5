/// Row-major index arithmetic: the first axis is outermost, the last axis
/// varies fastest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridIndexHelper {
    shape: Vec<usize>,
    strides: Vec<usize>,
    size: usize,
}

impl GridIndexHelper {
    /// `None` when the number of cells does not fit in `usize`.
    pub fn new(shape: Vec<usize>) -> Option<Self> {
        let mut strides = vec![0; shape.len()];
        let mut stride: usize = 1;
        for (axis, length) in shape.iter().enumerate().rev() {
            strides[axis] = stride;
            stride = stride.checked_mul(*length)?;
        }
        let size = if shape.is_empty() { 0 } else { stride };
        Some(Self {
            shape,
            strides,
            size,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Flat offset of `coordinates`, or `None` when the tuple has the wrong
    /// arity or any index is out of range.
    pub fn flat_index(&self, coordinates: &[usize]) -> Option<usize> {
        if coordinates.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for ((index, length), stride) in coordinates.iter().zip(&self.shape).zip(&self.strides) {
            if index >= length {
                return None;
            }
            flat += index * stride;
        }
        Some(flat)
    }

    pub fn axis_index(&self, axis: usize, flat: usize) -> usize {
        (flat / self.strides[axis]) % self.shape[axis]
    }

    pub fn coordinates(&self, flat: usize) -> Option<Vec<usize>> {
        (flat < self.size).then(|| {
            (0..self.shape.len())
                .map(|axis| self.axis_index(axis, flat))
                .collect()
        })
    }
}
