//! Serialized transcript catalog and naive candidate lookup.
//!
//! The catalog file is JSON Lines (optionally gzip-compressed), one
//! `TranscriptRecord` per line.

use std::{io::BufRead, path::Path};

use thousands::Separable;

use super::{ExonSpan, Strand, TranscriptModel, TranscriptModelBuilder};
use crate::{
    annotate::provider::InMemoryProvider,
    common::{build_chrom_map, canonical_chrom, io::open_read_maybe_gz},
    err::Error,
    variant::Variant,
};

/// One line of the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptRecord {
    pub accession: String,
    pub gene_symbol: String,
    #[serde(default)]
    pub gene_id: Option<String>,
    pub chrom: String,
    pub strand: Strand,
    pub tx_start: u32,
    pub tx_end: u32,
    #[serde(default)]
    pub cds_start: Option<u32>,
    #[serde(default)]
    pub cds_end: Option<u32>,
    pub exons: Vec<ExonSpan>,
    /// CDS sequence in transcript orientation, used for codon context.
    #[serde(default)]
    pub cds_sequence: Option<String>,
}

impl TryFrom<&TranscriptRecord> for TranscriptModel {
    type Error = Error;

    fn try_from(record: &TranscriptRecord) -> Result<Self, Self::Error> {
        let mut builder = TranscriptModelBuilder::default();
        builder
            .accession(record.accession.as_str())
            .gene_symbol(record.gene_symbol.as_str())
            .chrom(record.chrom.as_str())
            .strand(record.strand)
            .tx_start(record.tx_start)
            .tx_end(record.tx_end)
            .exons(record.exons.clone());
        if let Some(gene_id) = &record.gene_id {
            builder.gene_id(gene_id.as_str());
        }
        if let Some(cds_start) = record.cds_start {
            builder.cds_start(cds_start);
        }
        if let Some(cds_end) = record.cds_end {
            builder.cds_end(cds_end);
        }
        builder.build()
    }
}

/// Whether `accession` is a RefSeq model (predicted) transcript.
fn is_predicted(accession: &str) -> bool {
    accession.starts_with("XM_") || accession.starts_with("XR_")
}

/// Validated transcripts together with their CDS sequences.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    /// Transcripts sorted by chromosome, start, and accession.
    txs: Vec<TranscriptModel>,
    /// CDS sequences by accession.
    provider: InMemoryProvider,
}

impl Catalog {
    /// Build catalog from `records`.
    ///
    /// Records violating the transcript invariants are skipped with a
    /// warning.  With `curated_only`, predicted `XM_`/`XR_` transcripts are
    /// dropped as well.
    pub fn from_records<I>(records: I, curated_only: bool) -> Self
    where
        I: IntoIterator<Item = TranscriptRecord>,
    {
        let chrom_map = build_chrom_map();
        let mut result = Self::default();
        let mut rejected = 0usize;
        for mut record in records {
            if curated_only && is_predicted(&record.accession) {
                tracing::debug!("skipping non-curated transcript {}", &record.accession);
                continue;
            }
            record.chrom = canonical_chrom(&chrom_map, &record.chrom);
            match TranscriptModel::try_from(&record) {
                Ok(tx) => {
                    if let Some(seq) = &record.cds_sequence {
                        result.provider.insert(tx.accession(), seq);
                    }
                    result.txs.push(tx);
                }
                Err(e) => {
                    tracing::warn!("skipping transcript {}: {}", &record.accession, &e);
                    rejected += 1;
                }
            }
        }
        result.txs.sort_by(|a, b| {
            (a.chrom(), a.tx_start(), a.accession()).cmp(&(b.chrom(), b.tx_start(), b.accession()))
        });
        if rejected > 0 {
            tracing::warn!(
                "rejected {} transcripts",
                rejected.separate_with_commas()
            );
        }
        result
    }

    /// Load catalog from a JSONL file, gzip-compressed if ending in `.gz`.
    pub fn load<P: AsRef<Path>>(path: P, curated_only: bool) -> Result<Self, anyhow::Error> {
        let reader = open_read_maybe_gz(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("could not open catalog {:?}: {}", path.as_ref(), e)
        })?;
        let mut records = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let record: TranscriptRecord = serde_json::from_str(&line).map_err(|e| {
                anyhow::anyhow!(
                    "could not parse catalog record in line {}: {}",
                    lineno + 1,
                    e
                )
            })?;
            records.push(record);
        }

        let result = Self::from_records(records, curated_only);
        tracing::debug!(
            "loaded {} transcripts from {:?}",
            result.len().separate_with_commas(),
            path.as_ref()
        );
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn transcripts(&self) -> &[TranscriptModel] {
        &self.txs
    }

    /// CDS sequences of the catalog's transcripts.
    pub fn provider(&self) -> &InMemoryProvider {
        &self.provider
    }

    /// Transcripts overlapping `var` or within `flank_distance` of it.
    pub fn candidates<'a>(
        &'a self,
        var: &'a Variant,
        flank_distance: u32,
    ) -> impl Iterator<Item = &'a TranscriptModel> + 'a {
        let (start, end) = (var.pos, var.end());
        self.txs.iter().filter(move |tx| {
            tx.chrom() == var.chrom
                && tx.tx_start().saturating_sub(flank_distance) <= end
                && start <= tx.tx_end().saturating_add(flank_distance)
        })
    }

    /// Closest transcripts entirely left and right of `var` on its
    /// chromosome, with their distance.
    pub fn neighbours(
        &self,
        var: &Variant,
    ) -> (
        Option<(&TranscriptModel, u32)>,
        Option<(&TranscriptModel, u32)>,
    ) {
        let (start, end) = (var.pos, var.end());
        let on_chrom = || self.txs.iter().filter(|tx| tx.chrom() == var.chrom);
        let left = on_chrom()
            .filter(|tx| tx.tx_end() < start)
            .map(|tx| (tx, start - tx.tx_end()))
            .min_by_key(|(_, dist)| *dist);
        let right = on_chrom()
            .filter(|tx| tx.tx_start() > end)
            .map(|tx| (tx, tx.tx_start() - end))
            .min_by_key(|(_, dist)| *dist);
        (left, right)
    }
}
