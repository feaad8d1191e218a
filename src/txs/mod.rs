//! Transcript models as consumed by the annotation core.
//!
//! A `TranscriptModel` is created once through `TranscriptModelBuilder`, which
//! checks all geometric invariants at `build()` time.  After that the value is
//! immutable and is shared read-only between annotation workers.
//!
//! All genomic coordinates are 1-based and inclusive.

pub mod catalog;

use crate::err::Error;

/// Orientation of a transcript relative to the reference.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Strand {
    #[serde(rename = "+")]
    #[strum(serialize = "+")]
    Forward,
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    Reverse,
}

/// One exon given by its genomic boundaries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct ExonSpan {
    /// First genomic base of the exon.
    pub start: u32,
    /// Last genomic base of the exon.
    pub end: u32,
}

impl ExonSpan {
    /// Number of bases in the exon.
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Whether the genomic position `pos` lies within the exon.
    pub fn contains(&self, pos: u32) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Immutable description of one transcript's exon/CDS/strand geometry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, derive_builder::Builder)]
#[builder(build_fn(validate = "Self::validate", error = "Error"))]
pub struct TranscriptModel {
    /// Transcript accession, e.g., `"NM_000546.5"`.
    #[builder(setter(into))]
    accession: String,
    /// Gene symbol, e.g., `"TP53"`.
    #[builder(setter(into))]
    gene_symbol: String,
    /// External gene identifier, e.g., an Entrez or HGNC id.
    #[builder(setter(into, strip_option), default)]
    gene_id: Option<String>,
    /// Chromosome name.
    #[builder(setter(into))]
    chrom: String,
    strand: Strand,
    /// Transcription start, leftmost genomic base regardless of strand.
    tx_start: u32,
    /// Transcription end, rightmost genomic base regardless of strand.
    tx_end: u32,
    /// Leftmost CDS base, `None` for non-coding transcripts.
    #[builder(setter(strip_option), default)]
    cds_start: Option<u32>,
    /// Rightmost CDS base, `None` for non-coding transcripts.
    #[builder(setter(strip_option), default)]
    cds_end: Option<u32>,
    /// Exons in ascending genomic order.
    #[builder(setter(each(name = "exon")))]
    exons: Vec<ExonSpan>,
}

impl TranscriptModelBuilder {
    /// Check the transcript invariants before the value is created.
    fn validate(&self) -> Result<(), Error> {
        let accession = self.accession.as_deref().unwrap_or("<unnamed>");
        let malformed = |msg: String| Err(Error::MalformedTranscript(format!("{accession}: {msg}")));

        let exons = match &self.exons {
            Some(exons) => exons,
            None => return Ok(()),
        };
        if exons.is_empty() {
            return malformed("no exons".into());
        }
        for exon in exons {
            if exon.start > exon.end {
                return malformed(format!("exon {}-{} is reversed", exon.start, exon.end));
            }
        }
        for pair in exons.windows(2) {
            if pair[0].end >= pair[1].start {
                return malformed(format!(
                    "exons {}-{} and {}-{} overlap or are unsorted",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                ));
            }
        }

        if let (Some(tx_start), Some(tx_end)) = (self.tx_start, self.tx_end) {
            if tx_start > tx_end {
                return malformed(format!("transcription start {tx_start} > end {tx_end}"));
            }
            let first = exons[0];
            let last = exons[exons.len() - 1];
            if first.start != tx_start || last.end != tx_end {
                return malformed(format!(
                    "exons span {}-{} but transcript spans {}-{}",
                    first.start, last.end, tx_start, tx_end
                ));
            }
        }

        match (self.cds_start.flatten(), self.cds_end.flatten()) {
            (None, None) => Ok(()),
            (Some(cds_start), Some(cds_end)) => {
                if cds_start > cds_end {
                    return malformed(format!("CDS start {cds_start} > CDS end {cds_end}"));
                }
                if !exons.iter().any(|e| e.contains(cds_start)) {
                    return malformed(format!("CDS start {cds_start} is not exonic (5' truncated)"));
                }
                if !exons.iter().any(|e| e.contains(cds_end)) {
                    return malformed(format!("CDS end {cds_end} is not exonic (3' truncated)"));
                }
                Ok(())
            }
            _ => malformed("only one of CDS start and end is given".into()),
        }
    }
}

impl TranscriptModel {
    pub fn accession(&self) -> &str {
        &self.accession
    }

    pub fn gene_symbol(&self) -> &str {
        &self.gene_symbol
    }

    pub fn gene_id(&self) -> Option<&str> {
        self.gene_id.as_deref()
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn tx_start(&self) -> u32 {
        self.tx_start
    }

    pub fn tx_end(&self) -> u32 {
        self.tx_end
    }

    /// Genomic CDS boundaries as `(start, end)`, if the transcript is coding.
    pub fn cds_range(&self) -> Option<(u32, u32)> {
        self.cds_start.zip(self.cds_end)
    }

    pub fn is_coding(&self) -> bool {
        self.cds_start.is_some()
    }

    /// Exons in ascending genomic order.
    pub fn exons(&self) -> &[ExonSpan] {
        &self.exons
    }

    /// Length of the spliced transcript.
    pub fn spliced_len(&self) -> u32 {
        self.exons.iter().map(ExonSpan::len).sum()
    }

    /// Index (genomic order) of the exon containing `pos`.
    pub fn exon_containing(&self, pos: u32) -> Option<usize> {
        let idx = self.exons.partition_point(|e| e.end < pos);
        (idx < self.exons.len() && self.exons[idx].contains(pos)).then_some(idx)
    }

    /// Convert a genomic-order exon index into transcript (5' to 3') order.
    pub fn tx_order(&self, genomic_idx: usize) -> usize {
        match self.strand {
            Strand::Forward => genomic_idx,
            Strand::Reverse => self.exons.len() - 1 - genomic_idx,
        }
    }
}
