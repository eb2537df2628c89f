//! Dense tensor values.

use serde::{Deserialize, Serialize};

/// A dense, row-major tensor of `f32` elements.
///
/// Image batches travel as rank-4 tensors `[batch, height, width, channels]`;
/// the leading dimension is the number of logical elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TensorParts")]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

/// Unchecked wire form of a [`Tensor`].
#[derive(Deserialize)]
struct TensorParts {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl TryFrom<TensorParts> for Tensor {
    type Error = String;

    fn try_from(parts: TensorParts) -> Result<Self, Self::Error> {
        let expected = parts.shape.iter().product::<usize>();
        let actual = parts.data.len();
        Self::from_shape(parts.shape, parts.data).ok_or_else(|| {
            format!("tensor shape holds {expected} elements but data has {actual}")
        })
    }
}

impl Tensor {
    /// Creates a tensor, returning `None` if `data` does not fill `shape`.
    pub fn from_shape(shape: Vec<usize>, data: Vec<f32>) -> Option<Self> {
        (shape.iter().product::<usize>() == data.len()).then_some(Self { shape, data })
    }

    /// Creates a zero-filled tensor.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![0.0; len],
        }
    }

    /// Returns the shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the flat element buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns the single element of a one-element tensor.
    pub fn scalar(&self) -> Option<f32> {
        match self.data.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    /// Returns whether this tensor stacks more than one logical element.
    pub fn is_batch(&self) -> bool {
        self.shape.len() >= 2 && self.shape[0] > 1
    }

    /// Splits a batch along the leading dimension.
    ///
    /// Each part keeps the full rank with a leading dimension of one. A tensor
    /// that is not a batch is returned whole.
    pub fn split_batch(&self) -> Vec<Tensor> {
        if !self.is_batch() {
            return vec![self.clone()];
        }

        let count = self.shape[0];
        let mut shape = self.shape.clone();
        shape[0] = 1;
        let stride = self.numel() / count;

        (0..count)
            .map(|index| Tensor {
                shape: shape.clone(),
                data: self.data[index * stride..(index + 1) * stride].to_vec(),
            })
            .collect()
    }
}
