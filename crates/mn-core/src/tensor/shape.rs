//! Shape arithmetic and broadcasting.
//!
//! Broadcasting follows the usual right-aligned rule: two dimensions are
//! compatible when they are equal or one of them is 1. Missing leading
//! dimensions count as 1.

use mn_common::{Error, Result};

/// Number of elements in an array of the given shape. Rank 0 holds one.
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Row-major strides for a contiguous array.
pub fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Broadcast two shapes.
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut result = Vec::with_capacity(ndim);

    for i in 0..ndim {
        let a_dim = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let b_dim = if i < b.len() { b[b.len() - 1 - i] } else { 1 };

        if a_dim == b_dim || b_dim == 1 {
            result.push(a_dim);
        } else if a_dim == 1 {
            result.push(b_dim);
        } else {
            return Err(Error::Shape(format!(
                "shapes {:?} and {:?} are not broadcast-compatible",
                a, b
            )));
        }
    }

    result.reverse();
    Ok(result)
}

/// Broadcast any number of shapes.
pub fn broadcast_all(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    shapes
        .iter()
        .try_fold(Vec::new(), |acc, shape| broadcast_shapes(&acc, shape))
}

/// Strides that read `src` as if it had `target` shape.
///
/// Broadcast dimensions get stride 0 so every index along them maps to the
/// same source element. `target` must already be a valid broadcast of `src`.
pub fn broadcast_strides(src: &[usize], target: &[usize]) -> Vec<usize> {
    let src_strides = contiguous_strides(src);
    let pad = target.len() - src.len();
    let mut strides = vec![0usize; target.len()];
    for (i, (&dim, &stride)) in src.iter().zip(&src_strides).enumerate() {
        if dim != 1 {
            strides[pad + i] = stride;
        }
    }
    strides
}

/// Maps flat indices of a broadcast output to flat offsets into each input.
#[derive(Debug, Clone)]
pub struct BroadcastIndexer {
    shape: Vec<usize>,
    strides: Vec<Vec<usize>>,
}

impl BroadcastIndexer {
    /// Build an indexer over the broadcast of `inputs`.
    pub fn new(inputs: &[&[usize]]) -> Result<Self> {
        let shape = broadcast_all(inputs)?;
        let strides = inputs
            .iter()
            .map(|src| broadcast_strides(src, &shape))
            .collect();
        Ok(BroadcastIndexer { shape, strides })
    }

    /// Output shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of output elements.
    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset into input `input` for output element `linear`.
    pub fn offset(&self, input: usize, linear: usize) -> usize {
        let strides = &self.strides[input];
        let mut rem = linear;
        let mut offset = 0;
        for axis in (0..self.shape.len()).rev() {
            let dim = self.shape[axis];
            offset += (rem % dim) * strides[axis];
            rem /= dim;
        }
        offset
    }
}
