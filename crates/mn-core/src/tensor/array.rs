//! Dense row-major `f64` array.
//!
//! Only the operations the distribution kernels need are provided. Binary
//! operations broadcast their operands; reductions run over the last axis,
//! which is always the class axis in this crate.

use mn_common::{Error, Result};

use super::shape::{numel, BroadcastIndexer};

/// Owned n-dimensional array of `f64` in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NdArray {
    /// Create an array, checking that `data` fills `shape` exactly.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected = numel(&shape);
        if data.len() != expected {
            return Err(Error::Shape(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(NdArray { shape, data })
    }

    /// Rank-0 array.
    pub fn scalar(value: f64) -> Self {
        NdArray {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    /// Rank-1 array.
    pub fn from_vec(data: Vec<f64>) -> Self {
        NdArray {
            shape: vec![data.len()],
            data,
        }
    }

    /// Rank-2 array from equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(Error::Shape(format!(
                "row {} has {} elements, expected {}",
                bad,
                rows[bad].len(),
                cols
            )));
        }
        Ok(NdArray {
            shape: vec![rows.len(), cols],
            data: rows.concat(),
        })
    }

    /// Array of the given shape with every element set to `value`.
    pub fn full(shape: &[usize], value: f64) -> Self {
        NdArray {
            shape: shape.to_vec(),
            data: vec![value; numel(shape)],
        }
    }

    pub fn ones_like(other: &NdArray) -> Self {
        Self::full(&other.shape, 1.0)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Size of the last axis, `None` for rank 0.
    pub fn last_dim(&self) -> Option<usize> {
        self.shape.last().copied()
    }

    /// Every axis but the last. Empty for rank 0 and rank 1.
    pub fn leading_shape(&self) -> &[usize] {
        &self.shape[..self.shape.len().saturating_sub(1)]
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        self.data.get(offset).copied()
    }

    /// The `index`-th slice along the last axis.
    pub fn row(&self, index: usize) -> &[f64] {
        let k = self.last_dim().unwrap_or(1);
        &self.data[index * k..(index + 1) * k]
    }

    pub fn reshape(&self, shape: Vec<usize>) -> Result<Self> {
        NdArray::new(shape, self.data.clone())
    }

    /// Insert a unit axis at `axis` (`0..=rank`).
    pub fn insert_axis(&self, axis: usize) -> Result<Self> {
        if axis > self.rank() {
            return Err(Error::Shape(format!(
                "cannot insert axis {} into rank {} array",
                axis,
                self.rank()
            )));
        }
        let mut shape = self.shape.clone();
        shape.insert(axis, 1);
        Ok(NdArray {
            shape,
            data: self.data.clone(),
        })
    }

    /// `x[..., None]`.
    pub fn expand_last(&self) -> Self {
        let mut shape = self.shape.clone();
        shape.push(1);
        NdArray {
            shape,
            data: self.data.clone(),
        }
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        NdArray {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Elementwise binary operation with broadcasting.
    pub fn zip_with(&self, other: &NdArray, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.shape == other.shape {
            let data = self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect();
            return Ok(NdArray {
                shape: self.shape.clone(),
                data,
            });
        }

        let indexer = BroadcastIndexer::new(&[&self.shape, &other.shape])?;
        let data = (0..indexer.len())
            .map(|i| f(self.data[indexer.offset(0, i)], other.data[indexer.offset(1, i)]))
            .collect();
        Ok(NdArray {
            shape: indexer.shape().to_vec(),
            data,
        })
    }

    /// Materialize this array at a broadcast shape.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        let target = NdArray::full(shape, 0.0);
        let out = self.zip_with(&target, |a, _| a)?;
        if out.shape != shape {
            return Err(Error::Shape(format!(
                "cannot broadcast {:?} to {:?}",
                self.shape, shape
            )));
        }
        Ok(out)
    }

    /// Reduce the last axis with `f`.
    pub fn reduce_last(&self, f: impl Fn(&[f64]) -> f64) -> Result<Self> {
        let k = self
            .last_dim()
            .ok_or_else(|| Error::Shape("cannot reduce the last axis of a scalar".into()))?;
        let shape = self.leading_shape().to_vec();
        let data = (0..numel(&shape))
            .map(|i| f(&self.data[i * k..(i + 1) * k]))
            .collect();
        Ok(NdArray { shape, data })
    }

    /// `sum(x, axis=-1)`.
    pub fn sum_last_axis(&self) -> Result<Self> {
        self.reduce_last(|row| row.iter().sum())
    }

    /// Apply `f` to every slice along the last axis in place.
    pub fn for_each_row_mut(&mut self, mut f: impl FnMut(&mut [f64])) {
        let Some(k) = self.last_dim() else {
            f(&mut self.data);
            return;
        };
        if k == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(k) {
            f(row);
        }
    }

    /// Batched outer product over the last axis: `[.., K] x [.., K] -> [.., K, K]`.
    ///
    /// Leading axes broadcast.
    pub fn outer(&self, other: &NdArray) -> Result<Self> {
        if self.rank() == 0 || other.rank() == 0 {
            return Err(Error::Shape("outer product needs rank >= 1".into()));
        }
        let column = self.expand_last();
        let row = other.insert_axis(other.rank() - 1)?;
        column.zip_with(&row, |a, b| a * b)
    }

    /// Main diagonal of the trailing `K x K` matrices: `[.., K, K] -> [.., K]`.
    pub fn diagonal(&self) -> Result<Self> {
        let k = self.square_size()?;
        let shape = self.leading_shape().to_vec();
        let batch = numel(&shape[..shape.len() - 1]);
        let mut data = Vec::with_capacity(batch * k);
        for b in 0..batch {
            for i in 0..k {
                data.push(self.data[b * k * k + i * k + i]);
            }
        }
        Ok(NdArray { shape, data })
    }

    /// Overwrite the diagonal of the trailing `K x K` matrices.
    ///
    /// `diag` must have exactly the shape `[.., K]` matching this array.
    pub fn set_diag(&mut self, diag: &NdArray) -> Result<()> {
        let k = self.square_size()?;
        if diag.shape() != self.leading_shape() {
            return Err(Error::Shape(format!(
                "diagonal of shape {:?} does not fit matrices of shape {:?}",
                diag.shape(),
                self.shape
            )));
        }
        let batch = diag.len() / k.max(1);
        for b in 0..batch {
            for i in 0..k {
                self.data[b * k * k + i * k + i] = diag.data[b * k + i];
            }
        }
        Ok(())
    }

    /// Overwrite a contiguous block of elements with NaN.
    pub(crate) fn fill_nan(&mut self, start: usize, len: usize) {
        for x in &mut self.data[start..start + len] {
            *x = f64::NAN;
        }
    }

    fn square_size(&self) -> Result<usize> {
        let r = self.rank();
        if r < 2 || self.shape[r - 1] != self.shape[r - 2] {
            return Err(Error::Shape(format!(
                "expected trailing square matrices, got shape {:?}",
                self.shape
            )));
        }
        Ok(self.shape[r - 1])
    }
}

impl From<f64> for NdArray {
    fn from(value: f64) -> Self {
        NdArray::scalar(value)
    }
}

impl From<Vec<f64>> for NdArray {
    fn from(data: Vec<f64>) -> Self {
        NdArray::from_vec(data)
    }
}

impl From<&[f64]> for NdArray {
    fn from(data: &[f64]) -> Self {
        NdArray::from_vec(data.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for NdArray {
    fn from(data: [f64; N]) -> Self {
        NdArray::from_vec(data.to_vec())
    }
}
