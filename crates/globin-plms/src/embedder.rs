//! Per-record embedding extraction over a loaded corpus.
//!
//! [`CorpusEmbedder`] pairs a [`ProteinCorpus`] with a [`ResidueEmbedder`]
//! model and, per index, produces mean-pooled embeddings from two adjacent
//! layers of the model alongside the record's metadata.
use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use candle_core::Tensor;
use strum::{Display, EnumString};

use globin_corpus::{Annotations, ProteinCorpus};

/// Per-residue representation source, standing in for a pretrained protein
/// language model.
///
/// Calls are synchronous and must not mutate observable state; callers
/// invoking one instance from several threads serialize externally.
pub trait ResidueEmbedder {
    /// Tokenize `(identifier, sequence)` pairs into model-ready token ids
    /// of shape `[batch, tokens]`, special tokens included.
    fn batch_encode(&self, batch: &[(String, String)]) -> Result<Tensor>;

    /// Per-residue representations at the requested depths, keyed by layer
    /// index. Each tensor is `[batch, tokens, hidden]`.
    fn representations(
        &self,
        tokens: &Tensor,
        layers: &[usize],
    ) -> Result<HashMap<usize, Tensor>>;

    /// Depth of the underlying stack: the largest valid layer index.
    fn num_layers(&self) -> usize;
}

/// What the second tensor of an [`EmbeddedRecord`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum SecondaryMode {
    /// The pooled embedding of layer L+1.
    #[default]
    NextLayer,
    /// The elementwise difference between the pooled embeddings of
    /// layers L+1 and L.
    Difference,
}

/// One embedded corpus item: the pooled embedding pair plus the metadata of
/// the record it came from. Tensors have shape `[hidden]`.
#[derive(Debug, Clone)]
pub struct EmbeddedRecord {
    pub primary: Tensor,
    pub secondary: Tensor,
    pub entry: String,
    pub sequence: String,
    pub go_ids: Vec<String>,
    pub go_terms: Vec<String>,
    pub annotations: Annotations,
}

/// Indexed access to per-record embeddings: tokenize a batch of one, pull
/// representations at layers L and L+1, strip the special-token positions,
/// and mean-pool along the sequence axis.
pub struct CorpusEmbedder<M: ResidueEmbedder> {
    corpus: ProteinCorpus,
    model: M,
    layer: usize,
    mode: SecondaryMode,
}

impl<M: ResidueEmbedder> CorpusEmbedder<M> {
    /// `layer` is the base layer L; the embedder also reads L+1, so the
    /// model must be at least L+1 layers deep.
    pub fn new(
        corpus: ProteinCorpus,
        model: M,
        layer: usize,
        mode: SecondaryMode,
    ) -> Result<Self> {
        if layer < 1 {
            bail!("Layer index must be at least 1 (got {layer})");
        }
        let depth = model.num_layers();
        if layer + 1 > depth {
            bail!(
                "Layers {layer} and {} were requested but the model is only {depth} layers deep",
                layer + 1
            );
        }
        Ok(Self {
            corpus,
            model,
            layer,
            mode,
        })
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn corpus(&self) -> &ProteinCorpus {
        &self.corpus
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn mode(&self) -> SecondaryMode {
        self.mode
    }

    /// Embed the record at `idx`. Fails for an out-of-range index or a
    /// sequence that leaves no residue positions after stripping.
    pub fn embed(&self, idx: usize) -> Result<EmbeddedRecord> {
        let record = self.corpus.get(idx).ok_or_else(|| {
            anyhow!(
                "Index {idx} is out of range for a corpus of {} records",
                self.corpus.len()
            )
        })?;
        log::debug!("Embedding record {idx} ({})", record.entry);

        let batch = [(record.entry.clone(), record.sequence.clone())];
        let tokens = self.model.batch_encode(&batch)?;

        let layers = [self.layer, self.layer + 1];
        let representations = self.model.representations(&tokens, &layers)?;
        let current = representations
            .get(&self.layer)
            .ok_or_else(|| anyhow!("Model returned no representation for layer {}", self.layer))?;
        let next = representations.get(&(self.layer + 1)).ok_or_else(|| {
            anyhow!(
                "Model returned no representation for layer {}",
                self.layer + 1
            )
        })?;

        let current = pool_residues(current)?;
        let next = pool_residues(next)?;
        let (primary, secondary) = match self.mode {
            SecondaryMode::NextLayer => (current, next),
            SecondaryMode::Difference => {
                let difference = (&next - &current)?;
                (current, difference)
            }
        };

        Ok(EmbeddedRecord {
            primary,
            secondary,
            entry: record.entry.clone(),
            sequence: record.sequence.clone(),
            go_ids: record.go_ids.clone(),
            go_terms: record.go_terms.clone(),
            annotations: record.annotations.clone(),
        })
    }
}

/// Drop the first and last token positions (BOS/CLS and EOS) and mean-pool
/// the remaining residue positions, `[batch, tokens, hidden]` -> `[hidden]`.
fn pool_residues(representation: &Tensor) -> Result<Tensor> {
    let (_batch, tokens, _hidden) = representation.dims3()?;
    if tokens <= 2 {
        bail!("No residue positions remain after stripping the special tokens");
    }
    let residues = representation.narrow(1, 1, tokens - 2)?;
    Ok(residues.mean(1)?.squeeze(0)?)
}
