use anyhow::Result;
use caption_negatives::generator::{DEFAULT_NEGATIVES, DEFAULT_REPLACEMENTS};
use caption_negatives::{
    process_file, GeneratorConfig, Language, LexiconTagger, NegativeGenerator, NlpruleTagger,
    RunSummary, Tagger, WordPools,
};
use clap::{Parser, ValueEnum};
use log::{error, info};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TaggerKind {
    /// nlprule English tokenizer (needs en_tokenizer.bin)
    Nlprule,
    /// Dictionary lookup over the word pools; no model files needed
    Lexicon,
}

#[derive(Parser)]
#[command(
    name = "caption-negatives",
    about = "Generate hard negative captions by swapping content words",
    long_about = "Reads newline-delimited JSON records with a `caption` field and writes them\n\
                  back as a JSON array, each with a `medium_negatives` list of captions that\n\
                  differ from the original in one or two verbs, adjectives or nouns."
)]
struct Args {
    /// Input file, one JSON object per line (.gz is decompressed)
    #[arg(short = 'i', long = "input", required = true)]
    input: PathBuf,

    /// Output JSON file
    #[arg(short = 'o', long = "output", required = true)]
    output: PathBuf,

    /// Distinct negatives to generate per caption
    #[arg(short = 'n', long = "negatives", default_value_t = DEFAULT_NEGATIVES)]
    negatives: usize,

    /// Words replaced per attempt
    #[arg(short = 'k', long = "replacements", default_value_t = DEFAULT_REPLACEMENTS)]
    replacements: usize,

    /// Attempts per caption before giving up (default: 10 x negatives)
    #[arg(long = "max-attempts")]
    max_attempts: Option<usize>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// YAML or JSON file with `verbs`, `adjectives` and `nouns` lists
    #[arg(long)]
    pools: Option<PathBuf>,

    /// Phrase that must never be modified; repeat for several (default: "in front of")
    #[arg(long = "protect")]
    protect: Vec<String>,

    /// Part-of-speech tagger to use
    #[arg(long, value_enum, default_value_t = TaggerKind::Nlprule)]
    tagger: TaggerKind,

    /// Path to an nlprule tokenizer binary (default: search the usual data directories)
    #[arg(long)]
    tokenizer: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn generator_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig {
            negatives: self.negatives,
            replacements: self.replacements,
            max_attempts: self.max_attempts,
            ..GeneratorConfig::default()
        };
        if !self.protect.is_empty() {
            config.protected_phrases = self.protect.clone();
        }
        config
    }
}

fn run<T: Tagger>(tagger: &T, pools: &WordPools, args: &Args) -> Result<RunSummary> {
    let generator = NegativeGenerator::new(tagger, pools, args.generator_config())?;
    info!(
        "Generating {} negatives per caption, {} replacements per attempt, attempt cap {}",
        generator.config().negatives,
        generator.config().replacements,
        generator.config().attempt_limit()
    );
    process_file(&generator, &args.input, &args.output, args.seed)
}

fn load_nlprule(path: Option<&Path>) -> Result<NlpruleTagger> {
    let result = match path {
        Some(path) => NlpruleTagger::from_path(path),
        None => NlpruleTagger::from_language(Language::English),
    };
    result.map_err(|e| {
        error!("Could not load the nlprule tokenizer: {:#}", e);
        error!("Download en_tokenizer.bin from https://github.com/bminixhofer/nlprule, pass --tokenizer, or use --tagger lexicon");
        e
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    let pools = match &args.pools {
        Some(path) => {
            info!("Loading word pools from {}", path.display());
            WordPools::from_path(path)?
        }
        None => WordPools::default(),
    };

    let summary = match args.tagger {
        TaggerKind::Nlprule => {
            info!("Loading nlprule tokenizer...");
            let tagger = load_nlprule(args.tokenizer.as_deref())?;
            run(&tagger, &pools, &args)?
        }
        TaggerKind::Lexicon => {
            let tagger = LexiconTagger::from_pools(&pools);
            run(&tagger, &pools, &args)?
        }
    };

    info!(
        "Wrote {} records with {} negatives to {} ({} skipped lines, {} starved, {} short after max attempts)",
        summary.records,
        summary.negatives,
        args.output.display(),
        summary.skipped_lines,
        summary.starved,
        summary.exhausted
    );
    Ok(())
}
