//! Reading tensor data back into host memory.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{Result, TrainError};

/// Copy any float tensor into a flat `Vec<f32>` (row-major).
pub fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| TrainError::Tensor(format!("{:?}", e)))
}

/// Read a single-element tensor back as `f32`.
pub fn scalar<B: Backend>(tensor: Tensor<B, 1>) -> Result<f32> {
    to_vec(tensor)?
        .first()
        .copied()
        .ok_or_else(|| TrainError::Tensor("empty tensor".to_string()))
}
