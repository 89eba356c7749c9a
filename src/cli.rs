use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use strand::aligner::matrix::DEFAULT_MAX_CELLS;

/// Output formats for sentence alignments
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum SentenceOutputType {
    /// One bead per line: ranges and joined text, tab separated
    Tsv,

    /// Full alignment as JSON
    Json,

    /// Two files, <PREFIX>.source and <PREFIX>.target, with one bead per line
    Parallel,
}

/// Output formats for markup stream alignments
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum StreamOutputType {
    /// One aligned item pair per line, preceded by the document features
    Tsv,

    /// Full alignment and features as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Set verbosity level. Use multiple times to increase the verbosity level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<CliSubcommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliSubcommand {
    /// Align two line-per-sentence files using sentence lengths (Gale & Church)
    Sentences(SentencesArgs),

    /// Align two linearized markup documents by their structure (STRAND)
    Markup(MarkupArgs),

    /// Extract sentence pairs from two linearized markup documents
    Extract(ExtractArgs),

    /// Sentence align many file pairs listed in a manifest
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct LengthModelArgs {
    /// JSON file with move priors, length model parameters and length cost policy
    #[arg(short, long)]
    #[clap(help_heading = "Alignment configuration")]
    pub config: Option<PathBuf>,

    /// Skip alignments whose DP grid has more cells than this. Overrides the configuration file.
    #[arg(long)]
    #[clap(help_heading = "Alignment configuration")]
    pub max_cells: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SentencesArgs {
    /// Source sentences, one per line. May be gzipped.
    #[clap(help_heading = "Inputs")]
    pub source: PathBuf,

    /// Target sentences, one per line. May be gzipped.
    #[clap(help_heading = "Inputs")]
    pub target: PathBuf,

    /// Output filename, or filename prefix for parallel output. If not given, defaults to stdout
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    pub output: Option<PathBuf>,

    /// Output file type.
    #[arg(value_enum, short = 'O', long, default_value = "tsv")]
    #[clap(help_heading = "Outputs")]
    pub output_type: SentenceOutputType,

    #[command(flatten)]
    pub model: LengthModelArgs,
}

#[derive(Args, Debug)]
pub struct MarkupArgs {
    /// Linearized source document: one tag ([START:x], [END:x]) or text chunk per line
    #[clap(help_heading = "Inputs")]
    pub source: PathBuf,

    /// Linearized target document
    #[clap(help_heading = "Inputs")]
    pub target: PathBuf,

    /// Output filename. If not given, defaults to stdout
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    pub output: Option<PathBuf>,

    /// Output file type.
    #[arg(value_enum, short = 'O', long, default_value = "tsv")]
    #[clap(help_heading = "Outputs")]
    pub output_type: StreamOutputType,

    /// Refuse to align documents whose DP grid has more cells than this
    #[arg(long, default_value_t = DEFAULT_MAX_CELLS)]
    #[clap(help_heading = "Alignment configuration")]
    pub max_cells: usize,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Linearized source document: one tag ([START:x], [END:x]) or text chunk per line. May be gzipped.
    #[clap(help_heading = "Inputs")]
    pub source: PathBuf,

    /// Linearized target document. May be gzipped.
    #[clap(help_heading = "Inputs")]
    pub target: PathBuf,

    /// Pair aligned text chunks as they are, without sentence splitting and alignment
    #[arg(long)]
    #[clap(help_heading = "Processing")]
    pub chunks_only: bool,

    /// Output filename, or filename prefix for parallel output. If not given, defaults to stdout
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    pub output: Option<PathBuf>,

    /// Output file type.
    #[arg(value_enum, short = 'O', long, default_value = "tsv")]
    #[clap(help_heading = "Outputs")]
    pub output_type: SentenceOutputType,

    #[command(flatten)]
    pub model: LengthModelArgs,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Manifest with one tab separated source and target file path per line
    #[clap(help_heading = "Inputs")]
    pub manifest: PathBuf,

    /// Number of aligner threads
    #[arg(short = 'j', long, default_value = "1")]
    #[clap(help_heading = "Processing")]
    pub num_threads: usize,

    /// Output filename for the per-pair summary. If not given, defaults to stdout
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub model: LengthModelArgs,
}
