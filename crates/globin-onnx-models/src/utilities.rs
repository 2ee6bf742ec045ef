//! Conversion helpers between candle tensors and the ndarray values that
//! ONNX Runtime consumes and produces.
use anyhow::Result;
use candle_core::{Device, Tensor};
use ndarray::{ArrayD, IxDyn};

/// Convert an owned `f32` ndarray, such as a graph output, to a CPU tensor.
pub fn ndarray_to_tensor_f32(array: ArrayD<f32>) -> Result<Tensor> {
    let dims = array.shape().to_vec();
    let data: Vec<f32> = array.iter().copied().collect();
    Ok(Tensor::from_vec(data, dims, &Device::Cpu)?)
}

/// Convert an `i64` token-id tensor to the ndarray form a session expects.
pub fn tensor_to_ndarray_i64(tensor: &Tensor) -> Result<ArrayD<i64>> {
    let dims = tensor.dims().to_vec();
    let data = tensor.flatten_all()?.to_vec1::<i64>()?;
    Ok(ArrayD::from_shape_vec(IxDyn(&dims), data)?)
}
