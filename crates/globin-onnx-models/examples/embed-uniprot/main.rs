use anyhow::Result;
use clap::Parser;
use globin_corpus::{CorpusOptions, ProteinCorpus};
use globin_onnx_models::{Esm2, Esm2Models};
use globin_plms::{CorpusEmbedder, SecondaryMode};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a UniProt annotation export (tab-separated, with header)
    #[arg(long)]
    tsv: std::path::PathBuf,

    /// Which ESM2 checkpoint to use
    #[arg(long, default_value = "t6-8m")]
    model: Esm2Models,

    /// Base layer; this layer and the next one are pooled per record
    #[arg(long, default_value_t = 5)]
    layer: usize,

    /// Drop sequences longer than this many residues
    #[arg(long, default_value_t = 512)]
    max_seq_len: usize,

    /// Subsample the corpus down to this many records
    #[arg(long, default_value_t = 50_000_000)]
    max_samples: usize,

    /// Seed for the subsampling draw
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Report the difference between the two layers instead of the next layer
    #[arg(long)]
    difference: bool,

    /// Keep records from every organism instead of human entries only
    #[arg(long)]
    all_organisms: bool,

    /// How many records to embed before stopping
    #[arg(long, default_value_t = 5)]
    count: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = CorpusOptions::builder()
        .max_seq_len(args.max_seq_len)
        .max_samples(args.max_samples)
        .seed(args.seed)
        .human_only(!args.all_organisms)
        .build();
    let corpus = ProteinCorpus::load(&args.tsv, &options)?;

    let model = Esm2::new(args.model)?;
    let mode = if args.difference {
        SecondaryMode::Difference
    } else {
        SecondaryMode::NextLayer
    };
    let embedder = CorpusEmbedder::new(corpus, model, args.layer, mode)?;

    let count = args.count.min(embedder.len());
    for idx in 0..count {
        let embedded = embedder.embed(idx)?;
        let primary = embedded.primary.to_vec1::<f32>()?;
        let norm: f32 = primary.iter().map(|v| v * v).sum::<f32>().sqrt();
        println!(
            "{}\t{} residues\t{} dims\tlayer {} ({}) norm {:.4}\t{} GO terms",
            embedded.entry,
            embedded.sequence.len(),
            primary.len(),
            args.layer,
            mode,
            norm,
            embedded.go_ids.len(),
        );
    }
    Ok(())
}
