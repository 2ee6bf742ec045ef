//! # globin-plms
//!
//! Protein-language-model plumbing for embedding a loaded corpus.
//!
//! __globin-plms__ provides:
//! * [`ProteinTokenizer`], a wrapper over a `tokenizers` vocabulary with
//!   resolved special-token ids and batch encoding to id tensors
//! * [`ResidueEmbedder`], the trait a pretrained model backend implements
//!   to serve per-residue representations at chosen layers
//! * [`CorpusEmbedder`], indexed access that tokenizes one record, reads
//!   layers L and L+1, strips the special-token positions, and mean-pools
//!   each layer to a `[hidden]` vector
//!
mod embedder;
mod tokenizer;

pub use self::embedder::{CorpusEmbedder, EmbeddedRecord, ResidueEmbedder, SecondaryMode};
pub use self::tokenizer::ProteinTokenizer;
