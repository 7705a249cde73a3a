use crate::config::{CodecConfig, SamplerConfig, SizeFormat};
use crate::model::{EncodedSegment, Segment};
use crate::pipeline::{CompressionStats, TripCodec};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = "Adaptive sampling and delta compression for trip telemetry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compresses a segment (or a JSON array of segments)
    Compress {
        /// Input JSON file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Decompresses an encoded segment (or a JSON array of them)
    Decompress {
        /// Input JSON file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,

        /// Number of threads to use (default: all available cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Reports point counts and payload sizes without writing anything
    Stats {
        /// Input JSON file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Serialization used for size measurement [json, bincode]
        #[arg(short, long, default_value = "json")]
        format: SizeFormat,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct TuningArgs {
    /// Never reduce segments with at most this many points
    #[arg(long)]
    min_points: Option<usize>,

    /// Force a kept sample after this many milliseconds
    #[arg(long)]
    max_gap_ms: Option<i64>,

    /// Acceleration magnitude variance that forces a kept sample
    #[arg(long)]
    variance_threshold: Option<f64>,

    /// Degree-space movement that forces a kept sample
    #[arg(long)]
    location_threshold: Option<f64>,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

impl TuningArgs {
    fn to_config(&self) -> CodecConfig {
        let defaults = SamplerConfig::default();
        let sampler = SamplerConfig {
            min_points: self.min_points.unwrap_or(defaults.min_points),
            max_gap_ms: self.max_gap_ms.unwrap_or(defaults.max_gap_ms),
            variance_threshold: self.variance_threshold.unwrap_or(defaults.variance_threshold),
            location_threshold: self.location_threshold.unwrap_or(defaults.location_threshold),
        };
        CodecConfig {
            sampler,
            threads: self.threads.unwrap_or_else(num_cpus::get),
            ..Default::default()
        }
    }
}

/// A file holds either a single value or an array of them.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }

    /// Re-wrap `items` in the same shape as `self`.
    pub fn same_shape<U>(&self, mut items: Vec<U>) -> OneOrMany<U> {
        match self {
            OneOrMany::One(_) if items.len() == 1 => OneOrMany::One(items.remove(0)),
            _ => OneOrMany::Many(items),
        }
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<OneOrMany<T>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(value)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writer.flush()?;
    Ok(())
}

fn progress_bar(len: usize) -> ProgressBar {
    // Single segments finish instantly, a bar would only be noise
    if len < 2 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] Segments {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn print_stats(stats: &CompressionStats) {
    println!("  Segments:         {}", stats.segments);
    println!("  Original Points:  {}", stats.original_points);
    println!("  Retained Points:  {}", stats.retained_points);
    println!("  Point Ratio:      {:.2}x", stats.point_ratio);
    println!("  Original Size:    {} bytes", stats.original_size);
    println!("  Compressed Size:  {} bytes", stats.compressed_size);
    println!("  Size Ratio:       {:.2}x", stats.ratio);
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Compress { input, output, pretty, tuning } => {
            println!("Compressing {} to {}...", input.display(), output.display());
            let codec = TripCodec::new(tuning.to_config())?;

            let parsed: OneOrMany<Segment> = read_json(input)?;
            let start = Instant::now();
            let segments = match &parsed {
                OneOrMany::Many(items) => items.as_slice(),
                OneOrMany::One(item) => std::slice::from_ref(item),
            };

            let pb = progress_bar(segments.len());
            let encoded = codec.compress_batch_with_progress(segments, &pb)?;
            pb.finish_and_clear();
            let stats = codec.batch_stats(segments, &encoded)?;
            let duration = start.elapsed();

            write_json(output, &parsed.same_shape(encoded), *pretty)?;

            println!("Compression successful!");
            print_stats(&stats);
            println!("  Elapsed Time:     {:.2?}", duration);
        }
        Commands::Decompress { input, output, pretty, threads } => {
            println!("Decompressing {} to {}...", input.display(), output.display());
            let config = CodecConfig {
                threads: threads.unwrap_or_else(num_cpus::get),
                ..Default::default()
            };
            let codec = TripCodec::new(config)?;

            let parsed: OneOrMany<EncodedSegment> = read_json(input)?;
            let start = Instant::now();
            let encoded = match &parsed {
                OneOrMany::Many(items) => items.as_slice(),
                OneOrMany::One(item) => std::slice::from_ref(item),
            };

            let pb = progress_bar(encoded.len());
            let segments = codec.decompress_batch_with_progress(encoded, &pb)?;
            pb.finish_and_clear();
            let restored_points: usize = segments.iter().map(|s| s.points.len()).sum();
            let duration = start.elapsed();

            write_json(output, &parsed.same_shape(segments), *pretty)?;

            println!("Decompression successful!");
            println!("  Segments:         {}", encoded.len());
            println!("  Restored Points:  {}", restored_points);
            println!("  Elapsed Time:     {:.2?}", duration);
        }
        Commands::Stats { input, format, json, tuning } => {
            let config = tuning.to_config().with_size_format(*format);
            let codec = TripCodec::new(config)?;
            let segments = read_json::<Segment>(input)?.into_vec();

            let encoded = codec.compress_batch(&segments)?;
            let stats = codec.batch_stats(&segments, &encoded)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Statistics for {} ({:?} sizes):", input.display(), format);
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tuning_overrides() {
        let cli = Cli::parse_from([
            "tripcodec", "compress", "-i", "in.json", "-o", "out.json", "--max-gap-ms", "5000", "--threads", "3",
        ]);
        match cli.command {
            Commands::Compress { tuning, .. } => {
                let config = tuning.to_config();
                assert_eq!(config.sampler.max_gap_ms, 5_000);
                assert_eq!(config.sampler.min_points, 10);
                assert_eq!(config.threads, 3);
            }
            _ => panic!("expected compress"),
        }
    }

    #[test]
    fn test_sampler_overrides_are_per_subcommand() {
        let stats = Cli::try_parse_from(["tripcodec", "stats", "-i", "in.json", "--variance-threshold", "1.5"]);
        assert!(stats.is_ok());
        let decompress = Cli::try_parse_from([
            "tripcodec", "decompress", "-i", "in.json", "-o", "out.json", "--variance-threshold", "1.5",
        ]);
        assert!(decompress.is_err());
        let threads = Cli::try_parse_from(["tripcodec", "decompress", "-i", "in.json", "-o", "out.json", "-t", "2"]);
        assert!(threads.is_ok());
    }

    #[test]
    fn test_one_or_many_shapes() {
        let one: OneOrMany<u32> = serde_json::from_str("7").unwrap();
        assert!(matches!(one.same_shape(vec![8]), OneOrMany::One(8)));
        let many: OneOrMany<u32> = serde_json::from_str("[7]").unwrap();
        assert!(matches!(many.same_shape(vec![8]), OneOrMany::Many(_)));
        assert_eq!(many.into_vec(), vec![7]);
    }
}
