//! # globin-onnx-models
//!
//! ONNX Runtime backends for the protein language models used to embed a
//! UniProt corpus. Checkpoints are downloaded from the HuggingFace hub and
//! run through [`ort`]; hidden-state outputs come back as candle tensors so
//! they drop straight into [`globin_plms::CorpusEmbedder`].
pub mod models;
pub mod utilities;

pub use models::esm2::{Esm2, Esm2Config, Esm2Models};
pub use utilities::{ndarray_to_tensor_f32, tensor_to_ndarray_i64};
