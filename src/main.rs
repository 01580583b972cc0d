use anyhow::{bail, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn, Level};

use realign::alignment::{AlignmentConfig, HintStrategy, PunctuationRules, ReferenceText};
use realign::output::{generate_output_path, write_text_file};
use realign::pipeline::correct_segments;
use realign::reader::{AsyncFileReader, ReaderConfig};
use realign::srt::{parse_srt, write_srt};
use realign::stats::{comparison_examples, render_examples, render_summary, RunStats};

#[derive(Parser, Debug)]
#[command(name = "realign")]
#[command(about = "Restore subtitle text and punctuation from a clean reference document")]
#[command(version)]
struct Args {
    /// SRT file whose text should be corrected
    srt_path: PathBuf,

    /// Reference text file holding the correct wording
    reference_path: PathBuf,

    /// Output SRT path (default: <stem>_corrected.srt next to the input)
    output: Option<PathBuf>,

    /// Minimum match score for a segment to be replaced
    #[arg(long, default_value_t = 0.65)]
    threshold: f64,

    /// Disable the sliding-window fuzzy tier
    #[arg(long)]
    no_fuzzy: bool,

    /// Boundary punctuation rules: complete or simple
    #[arg(long, default_value = "complete")]
    punctuation: String,

    /// Split segments into chunks corrected on separate threads
    #[arg(long)]
    parallel: bool,

    /// Number of chunks with --parallel (default: number of CPUs)
    #[arg(long, requires = "parallel")]
    chunks: Option<usize>,

    /// Use memory-mapped I/O instead of async buffered
    #[arg(long)]
    use_mmap: bool,

    /// Suppress console progress bar
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path (JSON)
    #[arg(long)]
    stats_out: Option<PathBuf>,

    /// Number of before/after examples to print
    #[arg(long, default_value_t = 8)]
    examples: usize,

    /// Log per-segment decisions
    #[arg(long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Abort on unreadable input or malformed subtitle blocks
    #[arg(long)]
    fail_fast: bool,
}

fn init_logging(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn alignment_config(args: &Args) -> Result<AlignmentConfig> {
    let hint_strategy = if args.parallel {
        HintStrategy::Chunked {
            chunks: args.chunks.unwrap_or_else(num_cpus::get),
        }
    } else {
        HintStrategy::Sequential
    };
    let config = AlignmentConfig {
        confidence_threshold: args.threshold,
        use_fuzzy: !args.no_fuzzy,
        punctuation: args.punctuation.parse::<PunctuationRules>()?,
        hint_strategy,
        ..Default::default()
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!("Starting realign");
    info!(?args, "Parsed CLI arguments");

    // WHY: validate inputs early to fail fast with clear error
    if !args.srt_path.is_file() {
        bail!("SRT file does not exist: {}", args.srt_path.display());
    }
    if !args.reference_path.is_file() {
        bail!("Reference file does not exist: {}", args.reference_path.display());
    }
    if !(0.0..=1.0).contains(&args.threshold) {
        bail!("Threshold must be within [0, 1], got {}", args.threshold);
    }
    let config = alignment_config(&args)?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| generate_output_path(&args.srt_path));

    let run_start = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let started = Instant::now();

    let file_reader = AsyncFileReader::new(ReaderConfig {
        fail_fast: args.fail_fast,
        use_mmap: args.use_mmap,
        ..Default::default()
    });

    let (srt_content, srt_stats) = file_reader.read_text_file(&args.srt_path).await?;
    if let Some(error) = &srt_stats.read_error {
        bail!("Cannot continue without subtitles: {error}");
    }
    let (reference_content, reference_stats) =
        file_reader.read_text_file(&args.reference_path).await?;
    if let Some(error) = &reference_stats.read_error {
        bail!("Cannot continue without reference text: {error}");
    }

    let document = parse_srt(&srt_content)?;
    if document.skipped_lines > 0 {
        if args.fail_fast {
            bail!(
                "{} lines outside valid subtitle blocks in {}",
                document.skipped_lines,
                args.srt_path.display()
            );
        }
        warn!(skipped = document.skipped_lines, "Skipped malformed subtitle lines");
    }
    if document.segments.is_empty() {
        warn!("No subtitle blocks found in {}", args.srt_path.display());
    }
    info!(
        segments = document.segments.len(),
        reference_chars = reference_stats.chars_read,
        "Inputs loaded"
    );

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(document.segments.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
                .progress_chars("#>-"),
        );
        pb
    };

    // WHY: correction is CPU-bound; keep it off the async worker threads
    let line_ending = document.line_ending;
    let mut segments = document.segments;
    let correction_config = config.clone();
    let observer_bar = progress.clone();
    let (segments, reports) = tokio::task::spawn_blocking(move || -> Result<_> {
        let reference = ReferenceText::new(reference_content);
        let reports = correct_segments(&reference, &mut segments, &correction_config, &|_| {
            observer_bar.inc(1)
        })?;
        Ok((segments, reports))
    })
    .await??;
    progress.finish_and_clear();

    write_text_file(&output_path, &write_srt(&segments, line_ending)).await?;
    info!("Wrote corrected subtitles to {}", output_path.display());

    let mut stats = RunStats::from_reports(&reports, &config);
    stats.run_start = run_start;
    stats.total_processing_time_ms = started.elapsed().as_millis() as u64;
    stats.srt_file = Some(srt_stats);
    stats.reference_file = Some(reference_stats);

    if let Some(stats_path) = &args.stats_out {
        stats.write_json(stats_path).await?;
        info!("Wrote run statistics to {}", stats_path.display());
    }

    println!("realign v{} - {}", env!("CARGO_PKG_VERSION"), output_path.display());
    println!();
    print!("{}", render_summary(&stats));
    let examples = comparison_examples(&segments, args.examples);
    if !examples.is_empty() {
        println!();
        print!("{}", render_examples(&examples));
    }

    info!(
        changed = stats.segments_changed,
        total = stats.segments_total,
        "Correction run completed"
    );
    Ok(())
}
