//! ESM2 protein language models executed through ONNX Runtime. Checkpoints
//! were converted from [ESM2](https://github.com/facebookresearch/esm) and
//! uploaded to the HuggingFace hub; the matching residue tokenizer is included
//! in this crate and loaded from memory. Each graph exposes one
//! `hidden_states.{layer}` output per transformer block, with the embedding
//! layer at index 0, so consecutive layers can be read out of a single run.
//!
//! # Models:
//! * Esm2_T6_8M - small 6-layer model, hidden size 320
//! * Esm2_T12_35M - medium 12-layer model, hidden size 480
//! * Esm2_T30_150M - large 30-layer model, hidden size 640
//!
use crate::{ndarray_to_tensor_f32, tensor_to_ndarray_i64};
use anyhow::{bail, Context, Result};
use candle_core::Tensor;
use globin_plms::{ProteinTokenizer, ResidueEmbedder};
use hf_hub::api::sync::Api;
use ort::{
    execution_providers::CUDAExecutionProvider,
    session::{
        builder::{GraphOptimizationLevel, SessionBuilder},
        Session,
    },
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Esm2Models {
    #[strum(serialize = "t6-8m")]
    Esm2_T6_8M,
    #[strum(serialize = "t12-35m")]
    Esm2_T12_35M,
    #[strum(serialize = "t30-150m")]
    Esm2_T30_150M,
}

impl Esm2Models {
    pub fn repo_id(&self) -> &'static str {
        match self {
            Esm2Models::Esm2_T6_8M => "zcpbx/esm2-t6-8m-UR50D-onnx",
            Esm2Models::Esm2_T12_35M => "zcpbx/esm2-t12-35M-UR50D-onnx",
            Esm2Models::Esm2_T30_150M => "zcpbx/esm2-t30-150M-UR50D-onnx",
        }
    }

    pub fn config(&self) -> Esm2Config {
        match self {
            Esm2Models::Esm2_T6_8M => Esm2Config::t6_8m(),
            Esm2Models::Esm2_T12_35M => Esm2Config::t12_35m(),
            Esm2Models::Esm2_T30_150M => Esm2Config::t30_150m(),
        }
    }
}

/// The slice of the HuggingFace `config.json` this crate needs. Unknown keys
/// in the file are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Esm2Config {
    pub num_hidden_layers: usize,
    pub hidden_size: usize,
}

impl Esm2Config {
    pub fn t6_8m() -> Self {
        Self {
            num_hidden_layers: 6,
            hidden_size: 320,
        }
    }

    pub fn t12_35m() -> Self {
        Self {
            num_hidden_layers: 12,
            hidden_size: 480,
        }
    }

    pub fn t30_150m() -> Self {
        Self {
            num_hidden_layers: 30,
            hidden_size: 640,
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.as_ref().display()))?;
        let config = serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse config {}", path.as_ref().display()))?;
        Ok(config)
    }
}

pub struct Esm2 {
    session: Session,
    tokenizer: ProteinTokenizer,
    config: Esm2Config,
}

impl Esm2 {
    /// Download a checkpoint from the hub and load it with its bundled
    /// tokenizer and configuration.
    pub fn new(which: Esm2Models) -> Result<Self> {
        let model_path = Self::load_model_path(which)?;
        Self::from_files(model_path, None, which.config())
    }

    /// Load a local ONNX export. When `tokenizer_path` is `None` the ESM2
    /// tokenizer embedded in this crate is used.
    pub fn from_files<P: AsRef<Path>>(
        model_path: P,
        tokenizer_path: Option<P>,
        config: Esm2Config,
    ) -> Result<Self> {
        let session = Self::create_session()?
            .commit_from_file(model_path.as_ref())
            .with_context(|| {
                format!("Failed to load ONNX graph {}", model_path.as_ref().display())
            })?;
        let tokenizer = match tokenizer_path {
            Some(path) => ProteinTokenizer::new(path)?,
            None => Self::load_tokenizer()?,
        };
        log::info!(
            "Loaded ESM2 graph with {} hidden layers, hidden size {}",
            config.num_hidden_layers,
            config.hidden_size
        );
        Ok(Self {
            session,
            tokenizer,
            config,
        })
    }

    pub fn load_model_path(which: Esm2Models) -> Result<PathBuf> {
        let repo_id = which.repo_id();
        log::info!("Fetching model.onnx from {}", repo_id);
        let api = Api::new()?;
        api.model(repo_id.to_string())
            .get("model.onnx")
            .with_context(|| format!("Failed to download model.onnx from {}", repo_id))
    }

    pub fn load_tokenizer() -> Result<ProteinTokenizer> {
        let tokenizer_bytes = include_bytes!("tokenizer.json");
        ProteinTokenizer::from_bytes(tokenizer_bytes)
    }

    pub fn config(&self) -> &Esm2Config {
        &self.config
    }

    pub fn tokenizer(&self) -> &ProteinTokenizer {
        &self.tokenizer
    }

    fn create_session() -> Result<SessionBuilder> {
        ort::init()
            .with_name("ESM2")
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .commit()?;

        Ok(Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level1)?
            .with_intra_threads(1)?)
    }

    fn hidden_state_output(layer: usize) -> String {
        format!("hidden_states.{}", layer)
    }
}

impl ResidueEmbedder for Esm2 {
    fn batch_encode(&self, batch: &[(String, String)]) -> Result<Tensor> {
        self.tokenizer.encode_batch(batch)
    }

    fn representations(&self, tokens: &Tensor, layers: &[usize]) -> Result<HashMap<usize, Tensor>> {
        let token_array = tensor_to_ndarray_i64(tokens)?;
        let pad_id = self.tokenizer.pad_token_id() as i64;
        let attention_mask = token_array.mapv(|id| i64::from(id != pad_id));

        let outputs = self.session.run(
            ort::inputs!["input_ids" => token_array, "attention_mask" => attention_mask]?,
        )?;

        let mut representations = HashMap::with_capacity(layers.len());
        for &layer in layers {
            let name = Self::hidden_state_output(layer);
            if !self.session.outputs.iter().any(|output| output.name == name) {
                let available = self
                    .session
                    .outputs
                    .iter()
                    .map(|output| output.name.clone())
                    .collect::<Vec<_>>()
                    .join(", ");
                bail!("Graph has no `{}` output; available outputs: {}", name, available);
            }
            let hidden = outputs[name.as_str()]
                .try_extract_tensor::<f32>()?
                .to_owned();
            representations.insert(layer, ndarray_to_tensor_f32(hidden)?);
        }
        Ok(representations)
    }

    fn num_layers(&self) -> usize {
        self.config.num_hidden_layers
    }
}
