//! globin-test-data
//!
//! A module to provide test files embedded in the crate for use in testing.
//! The fixtures are small UniProt-style annotation exports covering the
//! filtering, sampling, and missing-field paths of the corpus loader, plus
//! a character-level protein tokenizer vocabulary.
//!
//! The test files are represented as `TestFile` objects which package the raw
//! binary data and create temporary files for programs to operate on.
use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use globin_test_data::TestFile;
/// let (tsv_file, _temp) = TestFile::uniprot_01().create_temp().unwrap();
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// Six-row UniProt export: three human rows within typical length
    /// bounds, one long human row, one mouse row, and one long viral row.
    /// The first row's GO ID list carries stray whitespace on purpose.
    pub fn uniprot_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/uniprot/uniprot_sample.tsv"),
            suffix: "tsv",
        }
    }
    /// Three rows: two human (one of them long), one mouse.
    pub fn uniprot_three_rows() -> Self {
        Self {
            filebinary: include_bytes!("../data/uniprot/uniprot_three_rows.tsv"),
            suffix: "tsv",
        }
    }
    /// Ten short human rows with per-row gene names and GO IDs, for
    /// sampling determinism and record-atomicity checks.
    pub fn uniprot_ten_human() -> Self {
        Self {
            filebinary: include_bytes!("../data/uniprot/uniprot_ten_human.tsv"),
            suffix: "tsv",
        }
    }
    /// Same shape as `uniprot_three_rows` but without the `Organism` column.
    pub fn uniprot_missing_column() -> Self {
        Self {
            filebinary: include_bytes!("../data/uniprot/uniprot_missing_column.tsv"),
            suffix: "tsv",
        }
    }
    /// Character-level protein `tokenizer.json`: the twenty standard
    /// residues plus `<unk>/<pad>/<cls>/<eos>/<mask>`, with a
    /// `<cls> ... <eos>` template, matching the vocabulary layout of the
    /// ESM2 exports.
    pub fn protein_tokenizer_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/tokenizers/protein_char.json"),
            suffix: "json",
        }
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp_file = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;
        fs::write(temp_file.path(), self.filebinary)?;
        let file_path = temp_file.path().to_string_lossy().into_owned();
        Ok((file_path, temp_file))
    }
}
