//! Implementation of the `annotate position` subcommand.

use std::{io::BufRead, time::Instant};

use enum_map::EnumMap;
use indexmap::IndexMap;
use regex::Regex;
use thousands::Separable;

use super::{list::AnnotationList, vartype::VariantType, Annotator};
use crate::{
    common::{build_chrom_map, canonical_chrom},
    config::AnnotatorConfig,
    err::{AppError, ArgError},
    txs::catalog::Catalog,
    variant::Variant,
};

/// Command line arguments for `annotate position` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "annotate chromosomal changes", long_about = None)]
pub struct Args {
    /// Path to the transcript catalog (JSONL, optionally gzip-compressed).
    #[arg(long)]
    pub path_catalog: String,
    /// Chromosomal change, e.g., "chr1:12345C>A", or @ with path to file
    /// with one change per line.
    #[arg(long, required = true)]
    pub change: Vec<String>,
    /// Path to output TSV file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<String>,
    /// Write all annotations of a variant rather than the most severe ones.
    #[arg(long, default_value_t = false)]
    pub show_all: bool,
    /// Ignore predicted (XM_/XR_) transcripts.
    #[arg(long, default_value_t = false)]
    pub curated_only: bool,
    /// Annotator configuration as JSON or @ with path to JSON file.
    #[arg(long)]
    pub config: Option<String>,
    /// Override maximal distance for upstream/downstream annotation.
    #[arg(long)]
    pub flank_distance: Option<u32>,
    /// Override width of the splice window.
    #[arg(long)]
    pub splice_window: Option<u32>,
}

/// Parser for changes in the `CHROM:POSREF>ALT` syntax.
#[derive(Debug)]
pub struct ChangeParser {
    re: Regex,
    chrom_map: IndexMap<String, &'static str>,
}

impl ChangeParser {
    pub fn new() -> Result<Self, anyhow::Error> {
        Ok(Self {
            re: Regex::new(r"^([\w.]+):(\d+)([ACGTNacgtn]*|-)>([ACGTNacgtn]*|-)$")
                .map_err(|e| anyhow::anyhow!("invalid change regex: {}", e))?,
            chrom_map: build_chrom_map(),
        })
    }

    /// Parse one change, e.g., `"chr1:12345C>A"`, or `"1:100->T"` for an
    /// insertion.
    pub fn parse(&self, change: &str) -> Result<Variant, ArgError> {
        let caps = self
            .re
            .captures(change.trim())
            .ok_or_else(|| ArgError::ChangeInvalidFormat(change.to_string()))?;
        let pos = caps[2].parse::<u32>()?;
        if pos == 0 {
            return Err(ArgError::ChangeInvalidFormat(change.to_string()));
        }
        let ref_len = caps[3].len().max(caps[4].len()) as u32;
        if pos.checked_add(ref_len).is_none() {
            return Err(ArgError::ChangeOutOfRange(change.to_string()));
        }
        Ok(Variant::new(
            canonical_chrom(&self.chrom_map, &caps[1]),
            pos,
            &caps[3],
            &caps[4],
        ))
    }
}

/// Expand `@path` entries into the changes listed in the file.
fn load_changes(changes: &[String]) -> Result<Vec<String>, anyhow::Error> {
    let mut result = Vec::new();
    for change in changes {
        if let Some(path) = change.strip_prefix('@') {
            let path = shellexpand::tilde(path);
            let file = std::fs::File::open(&*path)
                .map_err(|e| anyhow::anyhow!("failed to open changes file {}: {}", &path, e))?;
            for line in std::io::BufReader::new(file).lines() {
                let line = line?;
                if !line.trim().is_empty() {
                    result.push(line.trim().to_string());
                }
            }
        } else {
            result.push(change.clone());
        }
    }
    Ok(result)
}

/// Build configuration from `--config` and the override flags.
fn load_config(args: &Args) -> Result<AnnotatorConfig, anyhow::Error> {
    let mut config = match &args.config {
        Some(config) => {
            if let Some(path) = config.strip_prefix('@') {
                let path = shellexpand::tilde(path);
                let json = std::fs::read_to_string(&*path)
                    .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", &path, e))?;
                AnnotatorConfig::from_json(&json)?
            } else {
                AnnotatorConfig::from_json(config)?
            }
        }
        None => AnnotatorConfig::default(),
    };
    if let Some(flank_distance) = args.flank_distance {
        config.flank_distance = flank_distance;
    }
    if let Some(splice_window) = args.splice_window {
        config.splice_window = splice_window;
    }
    Ok(config)
}

/// One line of the output.
#[derive(Debug, serde::Serialize)]
struct Record<'a> {
    change: &'a str,
    effect: VariantType,
    annotation: String,
}

/// Write annotations as TSV, one line per variant or per annotation.
fn write_tsv<W: std::io::Write>(
    writer: W,
    changes: &[String],
    lists: &[AnnotationList],
    show_all: bool,
) -> Result<(), anyhow::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    for (change, list) in changes.iter().zip(lists.iter()) {
        if show_all {
            for ann in list.ranked_view() {
                writer.serialize(Record {
                    change,
                    effect: ann.var_type(),
                    annotation: ann.symbol_and_annotation(),
                })?;
            }
        } else {
            writer.serialize(Record {
                change,
                effect: list.best_type(),
                annotation: list.summary(),
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Main entry point for the `annotate position` command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `annotate position`");
    tracing::info!("  args_common = {:?}", &args_common);
    tracing::info!("  args = {:?}", &args);

    let config = load_config(args)?;
    let parser = ChangeParser::new()?;
    let changes = load_changes(&args.change)?;
    let vars = changes
        .iter()
        .map(|change| parser.parse(change))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!("Loading transcript catalog...");
    let before_loading = Instant::now();
    let path_catalog = shellexpand::tilde(&args.path_catalog);
    let catalog = Catalog::load(&*path_catalog, args.curated_only)?;
    if catalog.is_empty() {
        return Err(AppError::EmptyCatalog.into());
    }
    tracing::info!(
        "... done loading {} transcripts in {:?}",
        catalog.len().separate_with_commas(),
        before_loading.elapsed()
    );

    tracing::info!("Annotating...");
    let before_annotation = Instant::now();
    let annotator = Annotator::new(&catalog, config);
    let lists = annotator.annotate_batch(&vars);
    let mut counts: EnumMap<VariantType, usize> = EnumMap::default();
    for list in &lists {
        counts[list.best_type()] += 1;
    }
    tracing::info!(
        "... done annotating {} variants in {:?}",
        vars.len().separate_with_commas(),
        before_annotation.elapsed()
    );
    for (var_type, count) in counts.iter().filter(|(_, count)| **count > 0) {
        tracing::info!("  {:<20} {:>10}", var_type, count.separate_with_commas());
    }

    match &args.path_output {
        Some(path) => {
            let path = shellexpand::tilde(path);
            let file = std::fs::File::create(&*path)
                .map_err(|e| anyhow::anyhow!("could not create output {}: {}", &path, e))?;
            write_tsv(std::io::BufWriter::new(file), &changes, &lists, args.show_all)?;
        }
        None => write_tsv(std::io::stdout().lock(), &changes, &lists, args.show_all)?,
    }

    tracing::info!("... done writing output");
    Ok(())
}
