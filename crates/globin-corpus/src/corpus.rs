use std::path::Path;

use anyhow::{anyhow, Context, Result};
use bon::Builder;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::record::{opt_cell, split_go_list, Annotations, ProteinRecord};

/// Organism cell value retained when the human filter is active.
/// Matched exactly, including the parenthesized common name.
pub const HUMAN_ORGANISM: &str = "Homo sapiens (Human)";

/// Eligibility and sampling controls for [`ProteinCorpus::load`].
#[derive(Builder, Debug, Clone)]
pub struct CorpusOptions {
    /// Longest sequence (in residues) retained by the length filter.
    #[builder(default = 512)]
    pub max_seq_len: usize,
    /// Upper bound on retained records; when more rows are eligible the
    /// corpus is subsampled down to this many.
    #[builder(default = 50_000_000)]
    pub max_samples: usize,
    /// Seed for the subsampling draw.
    #[builder(default = 42)]
    pub seed: u64,
    /// Keep only rows whose organism cell is exactly [`HUMAN_ORGANISM`].
    #[builder(default = true)]
    pub human_only: bool,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Counters collected while filtering the annotation table.
///
/// The two skip counters are independent: a row that is both too long and
/// from the wrong organism increments both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub total_rows: usize,
    pub eligible: usize,
    pub skipped_too_long: usize,
    pub skipped_wrong_organism: usize,
}

/// An ordered, immutable set of protein records selected from one
/// UniProt-style annotation table.
///
/// Construction performs the whole pipeline: parse the TSV, filter rows by
/// sequence length and (optionally) organism, then subsample with a seeded
/// generator when more rows are eligible than `max_samples`. Record order is
/// file order, or draw order when subsampling occurred; it is never
/// re-sorted afterwards.
#[derive(Debug, Clone)]
pub struct ProteinCorpus {
    records: Vec<ProteinRecord>,
    stats: LoadStats,
}

impl ProteinCorpus {
    /// Load a corpus from a tab-separated annotation export, seeding the
    /// sampling generator from `options.seed`.
    pub fn load<P: AsRef<Path>>(path: P, options: &CorpusOptions) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(options.seed);
        Self::load_with_rng(path, options, &mut rng)
    }

    /// Load a corpus using a caller-supplied generator for the subsampling
    /// draw. `options.seed` is ignored here; the generator carries the state.
    pub fn load_with_rng<P: AsRef<Path>, R: Rng>(
        path: P,
        options: &CorpusOptions,
        rng: &mut R,
    ) -> Result<Self> {
        let path = path.as_ref();
        log::info!(
            "Loading sequences from {} (max_seq_len={}, max_samples={}, human_only={})",
            path.display(),
            options.max_seq_len,
            options.max_samples,
            options.human_only
        );

        let df = read_annotation_table(path)?;
        let columns = CorpusColumns::from_frame(&df)?;
        let total_rows = df.height();
        log::info!("Found {total_rows} entries in the annotation table");

        let mut stats = LoadStats {
            total_rows,
            ..LoadStats::default()
        };
        let mut eligible: Vec<ProteinRecord> = Vec::new();
        for row in 0..total_rows {
            let sequence = columns
                .sequence
                .get(row)
                .ok_or_else(|| missing_cell("Sequence", row))?;
            let organism = columns.organism.get(row);

            let length_ok = sequence.len() <= options.max_seq_len;
            let organism_ok = !options.human_only || organism == Some(HUMAN_ORGANISM);

            if length_ok && organism_ok {
                eligible.push(columns.record(row)?);
            } else {
                if !length_ok {
                    stats.skipped_too_long += 1;
                }
                if options.human_only && organism != Some(HUMAN_ORGANISM) {
                    stats.skipped_wrong_organism += 1;
                }
            }
        }
        stats.eligible = eligible.len();

        let records = if eligible.len() > options.max_samples {
            log::info!(
                "Sampling {} of {} eligible sequences",
                options.max_samples,
                eligible.len()
            );
            rand::seq::index::sample(rng, eligible.len(), options.max_samples)
                .iter()
                .map(|idx| eligible[idx].clone())
                .collect()
        } else {
            eligible
        };

        let corpus = Self { records, stats };
        corpus.log_report();
        Ok(corpus)
    }

    /// Number of retained records: `min(eligible, max_samples)`.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&ProteinRecord> {
        self.records.get(idx)
    }

    /// Iterate the retained records in corpus order.
    pub fn records(&self) -> impl Iterator<Item = &ProteinRecord> {
        self.records.iter()
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Mean retained sequence length, or `None` for an empty corpus.
    pub fn mean_sequence_length(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let total: usize = self.records.iter().map(|r| r.sequence.len()).sum();
        Some(total as f64 / self.records.len() as f64)
    }

    fn log_report(&self) {
        let stats = &self.stats;
        log::info!(
            "Corpus loaded: {} of {} rows retained ({} eligible, {} skipped too long, {} skipped wrong organism)",
            self.len(),
            stats.total_rows,
            stats.eligible,
            stats.skipped_too_long,
            stats.skipped_wrong_organism
        );
        match self.mean_sequence_length() {
            Some(mean) => log::info!("Mean sequence length: {mean:.1}"),
            None => log::warn!("Corpus is empty; no rows matched the filters"),
        }
    }
}

fn read_annotation_table(path: &Path) -> Result<DataFrame> {
    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_separator(b'\t'))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open annotation table {}", path.display()))?;
    reader
        .finish()
        .with_context(|| format!("Failed to parse annotation table {}", path.display()))
}

fn missing_cell(column: &str, row: usize) -> anyhow::Error {
    anyhow!("Missing `{column}` value at row {row} of the annotation table")
}

/// Typed views over the required columns. Columns are cast on extraction so
/// that all-null or oddly inferred columns still read as the expected type.
struct CorpusColumns {
    sequence: StringChunked,
    entry: StringChunked,
    organism: StringChunked,
    length: Int64Chunked,
    go_ids: StringChunked,
    go_terms: StringChunked,
    go_biological: StringChunked,
    go_cellular: StringChunked,
    go_molecular: StringChunked,
    entry_name: StringChunked,
    protein_names: StringChunked,
    gene_names: StringChunked,
    coiled_coil: StringChunked,
    compositional_bias: StringChunked,
    domain_cc: StringChunked,
    domain_ft: StringChunked,
    motif: StringChunked,
    protein_families: StringChunked,
    region: StringChunked,
    repeat: StringChunked,
    sequence_similarities: StringChunked,
    zinc_finger: StringChunked,
}

impl CorpusColumns {
    fn from_frame(df: &DataFrame) -> Result<Self> {
        Ok(Self {
            sequence: str_column(df, "Sequence")?,
            entry: str_column(df, "Entry")?,
            organism: str_column(df, "Organism")?,
            length: i64_column(df, "Length")?,
            go_ids: str_column(df, "Gene Ontology IDs")?,
            go_terms: str_column(df, "Gene Ontology (GO)")?,
            go_biological: str_column(df, "Gene Ontology (biological process)")?,
            go_cellular: str_column(df, "Gene Ontology (cellular component)")?,
            go_molecular: str_column(df, "Gene Ontology (molecular function)")?,
            entry_name: str_column(df, "Entry Name")?,
            protein_names: str_column(df, "Protein names")?,
            gene_names: str_column(df, "Gene Names")?,
            coiled_coil: str_column(df, "Coiled coil")?,
            compositional_bias: str_column(df, "Compositional bias")?,
            domain_cc: str_column(df, "Domain [CC]")?,
            domain_ft: str_column(df, "Domain [FT]")?,
            motif: str_column(df, "Motif")?,
            protein_families: str_column(df, "Protein families")?,
            region: str_column(df, "Region")?,
            repeat: str_column(df, "Repeat")?,
            sequence_similarities: str_column(df, "Sequence similarities")?,
            zinc_finger: str_column(df, "Zinc finger")?,
        })
    }

    /// Build the record for one row. Every field comes from this row alone.
    fn record(&self, row: usize) -> Result<ProteinRecord> {
        let annotations = Annotations {
            length: self.length.get(row),
            go_biological: split_go_list(self.go_biological.get(row)),
            go_cellular: split_go_list(self.go_cellular.get(row)),
            go_molecular: split_go_list(self.go_molecular.get(row)),
            entry_name: opt_cell(self.entry_name.get(row)),
            protein_names: opt_cell(self.protein_names.get(row)),
            gene_names: opt_cell(self.gene_names.get(row)),
            organism: opt_cell(self.organism.get(row)),
            coiled_coil: opt_cell(self.coiled_coil.get(row)),
            compositional_bias: opt_cell(self.compositional_bias.get(row)),
            domain_cc: opt_cell(self.domain_cc.get(row)),
            domain_ft: opt_cell(self.domain_ft.get(row)),
            motif: opt_cell(self.motif.get(row)),
            protein_families: opt_cell(self.protein_families.get(row)),
            region: opt_cell(self.region.get(row)),
            repeat: opt_cell(self.repeat.get(row)),
            sequence_similarities: opt_cell(self.sequence_similarities.get(row)),
            zinc_finger: opt_cell(self.zinc_finger.get(row)),
        };
        Ok(ProteinRecord {
            sequence: self
                .sequence
                .get(row)
                .ok_or_else(|| missing_cell("Sequence", row))?
                .to_string(),
            entry: self
                .entry
                .get(row)
                .ok_or_else(|| missing_cell("Entry", row))?
                .to_string(),
            go_ids: split_go_list(self.go_ids.get(row)),
            go_terms: split_go_list(self.go_terms.get(row)),
            annotations,
        })
    }
}

fn str_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let series = df
        .column(name)
        .with_context(|| format!("Required column `{name}` is missing"))?
        .as_materialized_series()
        .cast(&DataType::String)
        .with_context(|| format!("Failed to read column `{name}` as text"))?;
    Ok(series.str()?.clone())
}

fn i64_column(df: &DataFrame, name: &str) -> Result<Int64Chunked> {
    let series = df
        .column(name)
        .with_context(|| format!("Required column `{name}` is missing"))?
        .as_materialized_series()
        .cast(&DataType::Int64)
        .with_context(|| format!("Failed to read column `{name}` as integers"))?;
    Ok(series.i64()?.clone())
}
