//! # globin-corpus
//!
//! Loads UniProt-style tab-separated annotation exports into an ordered,
//! filtered, optionally subsampled corpus of protein sequences.
//!
//! __globin-corpus__ provides:
//! * TSV parsing of annotation tables (sequence, accession, Gene Ontology
//!   and feature columns)
//! * Eligibility filtering by maximum sequence length and exact organism
//! * Seeded uniform subsampling without replacement, retaining draw order
//!
//! The main entry point is [`ProteinCorpus::load`], configured through
//! [`CorpusOptions`].
//!
mod corpus;
mod record;

pub use self::corpus::{CorpusOptions, LoadStats, ProteinCorpus, HUMAN_ORGANISM};
pub use self::record::{Annotations, ProteinRecord};
