use anyhow::Result;
use globin_corpus::{CorpusOptions, ProteinCorpus};
use globin_test_data::TestFile;

#[test]
fn test_filters_and_stats() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_01().create_temp()?;
    let options = CorpusOptions::builder().max_seq_len(60).build();
    let corpus = ProteinCorpus::load(&tsv, &options)?;

    // Three human rows fit under 60 residues; the titin fragment (70) and
    // the SARS polyprotein fragment (65) are too long, and the SARS row is
    // also from the wrong organism, so it lands in both skip counters.
    assert_eq!(corpus.len(), 3);
    let stats = corpus.stats();
    assert_eq!(stats.total_rows, 6);
    assert_eq!(stats.eligible, 3);
    assert_eq!(stats.skipped_too_long, 2);
    assert_eq!(stats.skipped_wrong_organism, 2);

    let entries: Vec<&str> = corpus.records().map(|r| r.entry.as_str()).collect();
    assert_eq!(entries, vec!["P69905", "P68871", "A0A0C5B5G6"]);

    let mean = corpus.mean_sequence_length().unwrap();
    assert!((mean - 18.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_record_fields_come_from_one_row() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_01().create_temp()?;
    let options = CorpusOptions::builder().max_seq_len(60).build();
    let corpus = ProteinCorpus::load(&tsv, &options)?;

    let hba = corpus.get(0).unwrap();
    assert_eq!(hba.entry, "P69905");
    assert_eq!(hba.sequence, "MVLSPADKTNVKAAWGKVGA");
    // Items are trimmed even when the cell carries stray spaces.
    assert_eq!(hba.go_ids, vec!["GO:0005344", "GO:0019825", "GO:0020037"]);
    assert_eq!(
        hba.go_terms,
        vec![
            "oxygen carrier activity [GO:0005344]",
            "oxygen binding [GO:0019825]",
            "heme binding [GO:0020037]"
        ]
    );

    let ann = &hba.annotations;
    assert_eq!(ann.length, Some(20));
    assert_eq!(ann.organism.as_deref(), Some("Homo sapiens (Human)"));
    assert_eq!(ann.entry_name.as_deref(), Some("HBA_HUMAN"));
    assert_eq!(ann.protein_names.as_deref(), Some("Hemoglobin subunit alpha"));
    assert_eq!(ann.gene_names.as_deref(), Some("HBA1 HBA2"));
    assert_eq!(ann.go_biological, vec!["oxygen transport [GO:0015671]"]);
    assert_eq!(
        ann.go_cellular,
        vec![
            "hemoglobin complex [GO:0005833]",
            "blood microparticle [GO:0072562]"
        ]
    );
    assert_eq!(ann.go_molecular, vec!["oxygen carrier activity [GO:0005344]"]);
    assert_eq!(
        ann.compositional_bias.as_deref(),
        Some("COMPBIAS 1..10; /note=Polar residues")
    );
    assert_eq!(ann.domain_cc.as_deref(), Some("DOMAIN: Globin"));
    assert_eq!(ann.domain_ft.as_deref(), Some("DOMAIN 1..20; /note=Globin"));
    assert_eq!(ann.protein_families.as_deref(), Some("Globin family"));
    assert_eq!(
        ann.sequence_similarities.as_deref(),
        Some("Belongs to the globin family")
    );
    assert_eq!(ann.coiled_coil, None);
    assert_eq!(ann.motif, None);
    assert_eq!(ann.region, None);
    assert_eq!(ann.repeat, None);
    assert_eq!(ann.zinc_finger, None);
    Ok(())
}

#[test]
fn test_blank_optional_cells_are_absent() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_01().create_temp()?;
    let options = CorpusOptions::builder().max_seq_len(60).build();
    let corpus = ProteinCorpus::load(&tsv, &options)?;

    // MOTS-c row: every Gene Ontology and feature cell is empty.
    let motsc = corpus.get(2).unwrap();
    assert_eq!(motsc.entry, "A0A0C5B5G6");
    assert!(motsc.go_ids.is_empty());
    assert!(motsc.go_terms.is_empty());

    let ann = &motsc.annotations;
    assert_eq!(ann.length, Some(16));
    assert!(ann.go_biological.is_empty());
    assert!(ann.go_cellular.is_empty());
    assert!(ann.go_molecular.is_empty());
    assert_eq!(ann.coiled_coil, None);
    assert_eq!(ann.compositional_bias, None);
    assert_eq!(ann.domain_cc, None);
    assert_eq!(ann.domain_ft, None);
    assert_eq!(ann.motif, None);
    assert_eq!(ann.protein_families, None);
    assert_eq!(ann.region, None);
    assert_eq!(ann.repeat, None);
    assert_eq!(ann.sequence_similarities, None);
    assert_eq!(ann.zinc_finger, None);
    Ok(())
}

#[test]
fn test_organism_filter_with_short_table() -> Result<()> {
    // Two human rows, one mouse row; one human sequence is over the limit.
    let (tsv, _temp) = TestFile::uniprot_three_rows().create_temp()?;
    let options = CorpusOptions::builder().max_seq_len(30).build();
    let corpus = ProteinCorpus::load(&tsv, &options)?;

    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.get(0).unwrap().entry, "P69905");
    let stats = corpus.stats();
    assert_eq!(stats.total_rows, 3);
    assert_eq!(stats.eligible, 1);
    assert_eq!(stats.skipped_too_long, 1);
    assert_eq!(stats.skipped_wrong_organism, 1);
    Ok(())
}

#[test]
fn test_organism_filter_disabled() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_01().create_temp()?;
    let options = CorpusOptions::builder()
        .max_seq_len(60)
        .human_only(false)
        .build();
    let corpus = ProteinCorpus::load(&tsv, &options)?;

    // The mouse myoglobin fragment now passes; length still filters.
    assert_eq!(corpus.len(), 4);
    let stats = corpus.stats();
    assert_eq!(stats.eligible, 4);
    assert_eq!(stats.skipped_too_long, 2);
    assert_eq!(stats.skipped_wrong_organism, 0);
    let entries: Vec<&str> = corpus.records().map(|r| r.entry.as_str()).collect();
    assert_eq!(entries, vec!["P69905", "P68871", "P04247", "A0A0C5B5G6"]);
    Ok(())
}

#[test]
fn test_length_boundary_is_inclusive() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_ten_human().create_temp()?;

    // Longest fixture sequence is exactly 30 residues.
    let at_limit = CorpusOptions::builder().max_seq_len(30).build();
    assert_eq!(ProteinCorpus::load(&tsv, &at_limit)?.len(), 10);

    let below_limit = CorpusOptions::builder().max_seq_len(29).build();
    let corpus = ProteinCorpus::load(&tsv, &below_limit)?;
    assert_eq!(corpus.len(), 9);
    assert_eq!(corpus.stats().skipped_too_long, 1);
    Ok(())
}

#[test]
fn test_all_eligible_rows_kept_in_file_order() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_ten_human().create_temp()?;
    let corpus = ProteinCorpus::load(&tsv, &CorpusOptions::default())?;

    assert_eq!(corpus.len(), 10);
    let entries: Vec<&str> = corpus.records().map(|r| r.entry.as_str()).collect();
    let expected: Vec<String> = (0..10).map(|k| format!("P1000{k}")).collect();
    assert_eq!(entries, expected);
    Ok(())
}

#[test]
fn test_sampling_caps_corpus_size() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_ten_human().create_temp()?;
    let options = CorpusOptions::builder().max_samples(3).build();
    let corpus = ProteinCorpus::load(&tsv, &options)?;

    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus.stats().eligible, 10);

    // Sampled without replacement from the eligible set.
    let mut entries: Vec<&str> = corpus.records().map(|r| r.entry.as_str()).collect();
    entries.sort_unstable();
    entries.dedup();
    assert_eq!(entries.len(), 3);
    for entry in &entries {
        assert!(entry.starts_with("P1000"));
    }
    Ok(())
}

#[test]
fn test_sampling_is_seed_deterministic() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_ten_human().create_temp()?;

    let seed_42 = CorpusOptions::builder().max_samples(3).seed(42).build();
    let first: Vec<String> = ProteinCorpus::load(&tsv, &seed_42)?
        .records()
        .map(|r| r.entry.clone())
        .collect();
    let second: Vec<String> = ProteinCorpus::load(&tsv, &seed_42)?
        .records()
        .map(|r| r.entry.clone())
        .collect();
    assert_eq!(first, second);

    let seed_7 = CorpusOptions::builder().max_samples(3).seed(7).build();
    let other: Vec<String> = ProteinCorpus::load(&tsv, &seed_7)?
        .records()
        .map(|r| r.entry.clone())
        .collect();
    assert_ne!(first, other);
    Ok(())
}

#[test]
fn test_sampled_records_stay_atomic() -> Result<()> {
    // Fixture rows are constructed so entry k carries GENE{k+1}, entry name
    // TEST{k+1}_HUMAN and a sequence of 12 + 2k residues. Any mixup between
    // rows during sampling would break the correspondence.
    let (tsv, _temp) = TestFile::uniprot_ten_human().create_temp()?;
    let options = CorpusOptions::builder().max_samples(3).build();
    let corpus = ProteinCorpus::load(&tsv, &options)?;

    for record in corpus.records() {
        let k: usize = record.entry.trim_start_matches("P1000").parse()?;
        assert_eq!(record.sequence.len(), 12 + 2 * k);
        assert_eq!(record.annotations.length, Some((12 + 2 * k) as i64));
        assert_eq!(
            record.annotations.gene_names.as_deref(),
            Some(format!("GENE{}", k + 1).as_str())
        );
        assert_eq!(
            record.annotations.entry_name.as_deref(),
            Some(format!("TEST{}_HUMAN", k + 1).as_str())
        );
    }
    Ok(())
}

#[test]
fn test_empty_corpus_is_not_an_error() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_three_rows().create_temp()?;
    let options = CorpusOptions::builder().max_seq_len(5).build();
    let corpus = ProteinCorpus::load(&tsv, &options)?;

    assert_eq!(corpus.len(), 0);
    assert!(corpus.is_empty());
    assert!(corpus.get(0).is_none());
    assert_eq!(corpus.mean_sequence_length(), None);
    let stats = corpus.stats();
    assert_eq!(stats.eligible, 0);
    assert_eq!(stats.skipped_too_long, 3);
    assert_eq!(stats.skipped_wrong_organism, 1);
    Ok(())
}

#[test]
fn test_missing_required_column_fails() -> Result<()> {
    let (tsv, _temp) = TestFile::uniprot_missing_column().create_temp()?;
    let err = ProteinCorpus::load(&tsv, &CorpusOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("Organism"));
    Ok(())
}

#[test]
fn test_unreadable_path_fails() {
    let err = ProteinCorpus::load(
        "/no/such/dir/annotations.tsv",
        &CorpusOptions::default(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("annotations.tsv"));
}
