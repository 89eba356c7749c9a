use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, stdout, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rustc_hash::FxHashMap;
use tracing::{debug, error, info, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Registry};

use strand::aligner::{GaussianLengthCost, LengthAligner, LengthAlignerConfig};
use strand::errors::StrandError;
use strand::io::{
    load_sentences, open_reader, read_lines, write_bitext_parallel, write_bitext_tsv, write_json, write_parallel,
    write_sentences_tsv, write_stream_tsv,
};
use strand::text::{align_sentences, parse_stream, BitextExtractor, PunctuationSplitter, StrandAligner, TagChunk};

mod cli;

use cli::{
    BatchArgs, CliSubcommand, ExtractArgs, LengthModelArgs, MarkupArgs, SentenceOutputType, SentencesArgs,
    StreamOutputType,
};

/// Build our base tracing subscriber with stderr logging.
fn build_base_subscriber(verbose: u8) -> impl Subscriber + for<'span> LookupSpan<'span> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(filter_layer);

    Registry::default().with(stderr_log)
}

/// Determine where to write output to
fn create_writer(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    let writer = if let Some(path) = path {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?
        }

        let file = File::create(path)
            .with_context(|| format!("Could not create output file {path:?}"))?;
        Box::new(BufWriter::new(file)) as Box<dyn Write + Send>
    } else {
        Box::new(BufWriter::new(stdout())) as Box<dyn Write + Send>
    };

    Ok(writer)
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = prefix.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);

    PathBuf::from(name)
}

fn load_config(model_args: &LengthModelArgs) -> Result<LengthAlignerConfig> {
    let mut config = if let Some(path) = &model_args.config {
        LengthAlignerConfig::load(path)
            .with_context(|| format!("Could not load alignment configuration from {path:?}"))?
    } else {
        LengthAlignerConfig::default()
    };

    if let Some(max_cells) = model_args.max_cells {
        config.max_cells = max_cells;
    }

    debug!("Alignment configuration: {:?}", config);

    Ok(config)
}

fn load_aligner(model_args: &LengthModelArgs) -> Result<LengthAligner<GaussianLengthCost>> {
    Ok(load_config(model_args)?.build())
}

fn load_stream(path: &Path) -> Result<Vec<TagChunk>> {
    let lines = open_reader(path)
        .and_then(read_lines)
        .with_context(|| format!("Could not read document {path:?}"))?;

    Ok(parse_stream(&lines))
}

fn sentences_subcommand(args: &SentencesArgs) -> Result<()> {
    let aligner = load_aligner(&args.model)?;

    let source = load_sentences(&args.source)
        .with_context(|| format!("Could not read source sentences from {:?}", args.source))?;
    let target = load_sentences(&args.target)
        .with_context(|| format!("Could not read target sentences from {:?}", args.target))?;

    info!("Aligning {} source sentences with {} target sentences...", source.len(), target.len());
    let aln = align_sentences(&aligner, &source, &target)?;
    info!("Done. Alignment score: {:.4}, {} beads", aln.score, aln.pairs.len());

    match args.output_type {
        SentenceOutputType::Tsv => {
            let mut writer = create_writer(args.output.as_deref())?;
            write_sentences_tsv(&mut writer, &aln)?;
            writer.flush()?;
        },
        SentenceOutputType::Json => {
            let mut writer = create_writer(args.output.as_deref())?;
            write_json(&mut writer, &aln)?;
            writer.flush()?;
        },
        SentenceOutputType::Parallel => {
            let prefix = args.output.as_deref()
                .ok_or_else(|| anyhow!("Parallel output requires an output filename prefix (-o)"))?;

            let mut source_out = create_writer(Some(&with_suffix(prefix, "source")))?;
            let mut target_out = create_writer(Some(&with_suffix(prefix, "target")))?;
            write_parallel(&mut source_out, &mut target_out, &aln)?;
            source_out.flush()?;
            target_out.flush()?;
        },
    }

    Ok(())
}

fn markup_subcommand(args: &MarkupArgs) -> Result<()> {
    let source = load_stream(&args.source)?;
    let target = load_stream(&args.target)?;

    info!("Aligning {} source items with {} target items...", source.len(), target.len());
    let aln = StrandAligner::with_max_cells(args.max_cells).align(&source, &target)?;
    info!("Done. Difference percentage: {:.4}", aln.features.difference_percentage);

    let mut writer = create_writer(args.output.as_deref())?;
    match args.output_type {
        StreamOutputType::Tsv => write_stream_tsv(&mut writer, &aln)?,
        StreamOutputType::Json => write_json(&mut writer, &aln)?,
    }
    writer.flush()?;

    Ok(())
}

fn extract_subcommand(args: &ExtractArgs) -> Result<()> {
    let config = load_config(&args.model)?;
    let sentence_aligner = (!args.chunks_only).then(|| config.build());
    let extractor = BitextExtractor::with_aligners(
        StrandAligner::with_max_cells(config.max_cells),
        sentence_aligner,
        PunctuationSplitter,
    );

    let source = load_stream(&args.source)?;
    let target = load_stream(&args.target)?;

    info!("Extracting bitext from {} source items and {} target items...", source.len(), target.len());
    let bitext = extractor.extract(&source, &target)?;
    info!("Done. {} pairs, difference percentage: {:.4}", bitext.pairs.len(), bitext.difference_percentage);

    match args.output_type {
        SentenceOutputType::Tsv => {
            let mut writer = create_writer(args.output.as_deref())?;
            write_bitext_tsv(&mut writer, &bitext)?;
            writer.flush()?;
        },
        SentenceOutputType::Json => {
            let mut writer = create_writer(args.output.as_deref())?;
            write_json(&mut writer, &bitext)?;
            writer.flush()?;
        },
        SentenceOutputType::Parallel => {
            let prefix = args.output.as_deref()
                .ok_or_else(|| anyhow!("Parallel output requires an output filename prefix (-o)"))?;

            let mut source_out = create_writer(Some(&with_suffix(prefix, "source")))?;
            let mut target_out = create_writer(Some(&with_suffix(prefix, "target")))?;
            write_bitext_parallel(&mut source_out, &mut target_out, &bitext)?;
            source_out.flush()?;
            target_out.flush()?;
        },
    }

    Ok(())
}

struct BatchJob {
    ix: usize,
    source: PathBuf,
    target: PathBuf,
}

fn read_manifest(path: &Path) -> Result<Vec<BatchJob>> {
    let lines = open_reader(path)
        .and_then(read_lines)
        .with_context(|| format!("Could not read manifest {path:?}"))?;

    let mut jobs = Vec::new();
    for (line_no, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (source, target) = line.split_once('\t')
            .ok_or_else(|| anyhow!("Manifest line {} should contain a source and target path separated by a tab", line_no + 1))?;

        jobs.push(BatchJob {
            ix: jobs.len(),
            source: PathBuf::from(source.trim()),
            target: PathBuf::from(target.trim()),
        });
    }

    Ok(jobs)
}

fn align_file_pair(aligner: &LengthAligner<GaussianLengthCost>, source: &Path, target: &Path) -> Result<(f64, usize)> {
    let source_sentences = load_sentences(source)
        .with_context(|| format!("Could not read {source:?}"))?;
    let target_sentences = load_sentences(target)
        .with_context(|| format!("Could not read {target:?}"))?;

    let aln = align_sentences(aligner, &source_sentences, &target_sentences)?;

    Ok((aln.score, aln.pairs.len()))
}

fn batch_subcommand(args: &BatchArgs) -> Result<()> {
    let aligner = load_aligner(&args.model)?;
    let jobs = read_manifest(&args.manifest)?;
    let num_threads = args.num_threads.max(1);
    info!("Aligning {} file pairs using {} threads...", jobs.len(), num_threads);

    let writer = create_writer(args.output.as_deref())?;

    run_batch(&aligner, jobs, num_threads, writer)
}

/// Align all jobs on `num_threads` worker threads, writing one summary line
/// per job in manifest order
fn run_batch<W>(aligner: &LengthAligner<GaussianLengthCost>, jobs: Vec<BatchJob>, num_threads: usize, writer: W) -> Result<()>
where
    W: Write + Send,
{
    let (tx, rx) = crossbeam_channel::unbounded::<BatchJob>();
    let (tx_out, rx_out) = crossbeam_channel::unbounded::<(usize, String)>();

    thread::scope(|scope| -> Result<()> {
        // Spawn thread that writes the output, in manifest order
        let output_thread = scope.spawn(move || -> Result<()> {
            let mut writer = writer;
            let mut pending = FxHashMap::default();
            let mut next_ix = 0;

            writeln!(writer, "#source\ttarget\tscore\tbeads")?;
            while let Ok((ix, line)) = rx_out.recv() {
                pending.insert(ix, line);

                while let Some(line) = pending.remove(&next_ix) {
                    writeln!(writer, "{line}")?;
                    next_ix += 1;
                }
            }

            writer.flush()?;

            Ok(())
        });

        // Spawn aligner threads
        let workers: Vec<_> = (0..num_threads)
            .map(|_| {
                let thread_rx = rx.clone();
                let tx_out_thread = tx_out.clone();

                scope.spawn(move || -> Result<()> {
                    while let Ok(job) = thread_rx.recv() {
                        let fields = match align_file_pair(aligner, &job.source, &job.target) {
                            Ok((score, num_beads)) => format!("{score}\t{num_beads}"),
                            Err(e) => {
                                error!("Could not align {:?} with {:?}: {e:#}", job.source, job.target);
                                "NA\tNA".to_string()
                            }
                        };

                        let line = format!("{}\t{}\t{fields}", job.source.display(), job.target.display());
                        tx_out_thread.send((job.ix, line))
                            .map_err(|_| anyhow!("Output thread stopped before job {} was written", job.ix))?;
                    }

                    Ok(())
                })
            })
            .collect();

        drop(tx_out);

        for job in jobs {
            tx.send(job)?;
        }
        drop(tx);

        let mut failed_workers = 0;
        for worker in workers {
            match worker.join() {
                Ok(Ok(())) => (),
                Ok(Err(e)) => {
                    error!("Aligner thread failed: {e:#}");
                    failed_workers += 1;
                },
                Err(_) => {
                    error!("Aligner thread panicked");
                    failed_workers += 1;
                }
            }
        }

        output_thread.join()
            .map_err(|_| anyhow!("Output thread panicked"))??;

        if failed_workers > 0 {
            return Err(anyhow!("{failed_workers} aligner threads failed"));
        }

        Ok(())
    })
}

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    build_base_subscriber(args.verbose).init();

    match &args.command {
        Some(CliSubcommand::Sentences(v)) => sentences_subcommand(v)?,
        Some(CliSubcommand::Markup(v)) => markup_subcommand(v)?,
        Some(CliSubcommand::Extract(v)) => extract_subcommand(v)?,
        Some(CliSubcommand::Batch(v)) => batch_subcommand(v)?,
        None => return Err(StrandError::Other).with_context(|| "No subcommand given.".to_string()),
    };

    Ok(())
}
