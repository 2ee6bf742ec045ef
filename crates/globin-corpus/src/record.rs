use serde::{Deserialize, Serialize};

/// Optional annotation columns carried alongside each sequence.
///
/// One value per source column; a cell that is absent or blank in the table
/// becomes `None` (or an empty list for the Gene Ontology category columns),
/// never `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub length: Option<i64>,
    pub go_biological: Vec<String>,
    pub go_cellular: Vec<String>,
    pub go_molecular: Vec<String>,
    pub entry_name: Option<String>,
    pub protein_names: Option<String>,
    pub gene_names: Option<String>,
    pub organism: Option<String>,
    pub coiled_coil: Option<String>,
    pub compositional_bias: Option<String>,
    pub domain_cc: Option<String>,
    pub domain_ft: Option<String>,
    pub motif: Option<String>,
    pub protein_families: Option<String>,
    pub region: Option<String>,
    pub repeat: Option<String>,
    pub sequence_similarities: Option<String>,
    pub zinc_finger: Option<String>,
}

/// One protein drawn from the annotation table.
///
/// All fields originate from the same table row; `entry` is the stable
/// UniProt accession used as the record identifier downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinRecord {
    pub sequence: String,
    pub entry: String,
    pub go_ids: Vec<String>,
    pub go_terms: Vec<String>,
    pub annotations: Annotations,
}

/// Split a semicolon-delimited annotation cell into trimmed, non-empty items.
/// A missing cell yields an empty list.
pub(crate) fn split_go_list(cell: Option<&str>) -> Vec<String> {
    match cell {
        Some(text) => text
            .split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
        None => Vec::new(),
    }
}

/// Normalize an optional text cell: absent or blank becomes `None`.
pub(crate) fn opt_cell(cell: Option<&str>) -> Option<String> {
    cell.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(String::from)
}
