//! A protein tokenizer wrapper for encoding and decoding residue sequences.
//!
//! Wraps a `tokenizers::Tokenizer` vocabulary and resolves the special-token
//! ids (padding, masking, beginning/end of sequence, unknown) once at
//! construction. Sequences encode to `i64` id tensors ready for a language
//! model; batches are right-padded to the longest member.
use anyhow::{anyhow, bail, Result};
use candle_core::{Device, Tensor};
use std::collections::HashSet;
use std::path::Path;
use tokenizers::Tokenizer;

pub struct ProteinTokenizer {
    tokenizer: Tokenizer,
    pad_token_id: u32,
    mask_token_id: u32,
    bos_token_id: u32,
    eos_token_id: u32,
    unk_token_id: u32,
    special_token_ids: HashSet<u32>,
}

impl ProteinTokenizer {
    pub fn new<P: AsRef<Path>>(tokenizer_path: P) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        Self::from_tokenizer(tokenizer)
    }

    /// Load a vocabulary that ships embedded in a binary.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let tokenizer = Tokenizer::from_bytes(bytes)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        Self::from_tokenizer(tokenizer)
    }

    fn from_tokenizer(tokenizer: Tokenizer) -> Result<Self> {
        let pad_token_id = tokenizer
            .token_to_id("<pad>")
            .ok_or_else(|| anyhow!("Missing pad token"))?;
        let mask_token_id = tokenizer
            .token_to_id("<mask>")
            .ok_or_else(|| anyhow!("Missing mask token"))?;
        // ESM-style vocabularies call the leading special token <cls>.
        let bos_token_id = tokenizer
            .token_to_id("<bos>")
            .or_else(|| tokenizer.token_to_id("<cls>"))
            .ok_or_else(|| anyhow!("Missing bos/cls token"))?;
        let eos_token_id = tokenizer
            .token_to_id("<eos>")
            .ok_or_else(|| anyhow!("Missing eos token"))?;
        let unk_token_id = tokenizer
            .token_to_id("<unk>")
            .ok_or_else(|| anyhow!("Missing unk token"))?;

        let mut special_token_ids = HashSet::new();
        special_token_ids.insert(pad_token_id);
        special_token_ids.insert(mask_token_id);
        special_token_ids.insert(bos_token_id);
        special_token_ids.insert(eos_token_id);
        special_token_ids.insert(unk_token_id);

        Ok(Self {
            tokenizer,
            pad_token_id,
            mask_token_id,
            bos_token_id,
            eos_token_id,
            unk_token_id,
            special_token_ids,
        })
    }

    pub fn len(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    pub fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }

    pub fn mask_token_id(&self) -> u32 {
        self.mask_token_id
    }

    pub fn bos_token_id(&self) -> u32 {
        self.bos_token_id
    }

    pub fn eos_token_id(&self) -> u32 {
        self.eos_token_id
    }

    pub fn unk_token_id(&self) -> u32 {
        self.unk_token_id
    }

    pub fn token_to_id(&self, token: &str) -> u32 {
        self.tokenizer
            .token_to_id(token)
            .unwrap_or(self.unk_token_id)
    }

    pub fn id_to_token(&self, id: u32) -> String {
        self.tokenizer
            .id_to_token(id)
            .unwrap_or_else(|| "<unk>".to_string())
    }

    /// Encode one residue sequence to a 1-D `i64` id tensor.
    pub fn encode(&self, sequence: &str, add_special_tokens: bool) -> Result<Tensor> {
        let encoding = self
            .tokenizer
            .encode(sequence, add_special_tokens)
            .map_err(|e| anyhow!("Failed to encode sequence: {}", e))?;
        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        Tensor::new(ids, &Device::Cpu).map_err(|e| anyhow!("Failed to create tensor: {}", e))
    }

    /// Encode `(identifier, sequence)` pairs to a `[batch, tokens]` tensor
    /// with special tokens added, right-padded to the longest sequence.
    /// Identifiers are carried by the caller; only sequences are encoded.
    pub fn encode_batch(&self, batch: &[(String, String)]) -> Result<Tensor> {
        if batch.is_empty() {
            bail!("Cannot encode an empty batch");
        }
        let mut rows: Vec<Vec<i64>> = Vec::with_capacity(batch.len());
        for (_, sequence) in batch {
            let encoding = self
                .tokenizer
                .encode(sequence.as_str(), true)
                .map_err(|e| anyhow!("Failed to encode sequence: {}", e))?;
            rows.push(encoding.get_ids().iter().map(|&id| id as i64).collect());
        }
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, self.pad_token_id as i64);
        }
        let flat: Vec<i64> = rows.concat();
        Tensor::from_vec(flat, (batch.len(), width), &Device::Cpu)
            .map_err(|e| anyhow!("Failed to create token tensor: {}", e))
    }

    pub fn decode(&self, token_ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        if skip_special_tokens {
            let filtered: Vec<u32> = token_ids
                .iter()
                .filter(|&&id| !self.special_token_ids.contains(&id))
                .copied()
                .collect();
            self.tokenizer
                .decode(&filtered, true)
                .map_err(|e| anyhow!("Failed to decode: {}", e))
        } else {
            self.tokenizer
                .decode(token_ids, true)
                .map_err(|e| anyhow!("Failed to decode: {}", e))
        }
    }
}
