/// A dense row-major matrix of `f32`.
///
/// This is the only tensor shape that crosses the domain boundary:
/// samples are `(1, features)` rows and the engine answers with a
/// `(1, classes)` row. The engine converts to its own tensor type.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows:   usize,
    cols:   usize,
    values: Vec<f32>,
}

impl Matrix {
    /// A `rows × cols` matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, values: vec![0.0; rows * cols] }
    }

    /// Wrap an existing buffer. Returns `None` when the buffer length
    /// does not match `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f32>) -> Option<Self> {
        (values.len() == rows * cols).then_some(Self { rows, cols, values })
    }

    /// A single-row matrix holding `values`.
    pub fn row(values: Vec<f32>) -> Self {
        Self { rows: 1, cols: values.len(), values }
    }

    /// A `1 × width` row with a single `1.0` at `index`.
    pub fn one_hot(index: usize, width: usize) -> Self {
        let mut m = Self::zeros(1, width);
        m.values[index] = 1.0;
        m
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    #[cfg(test)]
    pub fn shape(&self) -> (usize, usize) { (self.rows, self.cols) }

    pub fn values(&self) -> &[f32] { &self.values }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.values[row * self.cols + col] = value;
    }

    /// Same buffer seen as `1 × (rows * cols)`.
    pub fn flatten(self) -> Self {
        Self { rows: 1, cols: self.values.len(), values: self.values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(Matrix::from_vec(2, 2, vec![0.0; 3]).is_none());
        assert!(Matrix::from_vec(2, 2, vec![0.0; 4]).is_some());
    }

    #[test]
    fn test_one_hot() {
        let m = Matrix::one_hot(3, 5);
        assert_eq!(m.values(), &[0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(m.shape(), (1, 5));
    }

    #[test]
    fn test_row_major_indexing_and_flatten() {
        let mut m = Matrix::zeros(2, 3);
        m.set(1, 2, 7.0);
        assert_eq!(m.values()[5], 7.0);
        assert_eq!(m.get(1, 2), 7.0);
        let flat = m.flatten();
        assert_eq!(flat.shape(), (1, 6));
    }
}
