//! Mapping of genomic variant positions onto a transcript model.
//!
//! Offsets are 0-based and counted from the transcript's own 5' end, so that
//! reverse-strand transcripts yield the same offsets as their mirrored
//! forward-strand counterparts.

use crate::{
    config::AnnotatorConfig,
    err::Error,
    txs::{Strand, TranscriptModel},
    variant::Variant,
};

/// Coarse location of a variant relative to one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum LocationKind {
    Exonic,
    Intronic,
    Utr5,
    Utr3,
    Upstream,
    Downstream,
}

/// Position of a variant as projected onto one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPosition {
    /// Location class of the variant's leftmost base (see `location_base()`).
    pub location: LocationKind,
    /// Transcript-order index of the containing exon; for intronic positions
    /// the index of the nearest exon.
    pub exon_index: usize,
    /// cDNA offset, present for exonic and UTR locations.
    pub cdna_offset: Option<u32>,
    /// CDS offset, present iff the position lies within the CDS bounds.
    pub cds_offset: Option<u32>,
    /// Distance to the nearest exon/intron boundary.
    ///
    /// Within exons this is the number of bases to the closest exon edge (`0`
    /// on the edge itself).  Within introns it is the distance of the closest
    /// affected base to the nearest exon (`1` next to the exon).  Up- and
    /// downstream it is the distance to the transcript.
    pub boundary_distance: u32,
    /// Signed intronic offset relative to the nearest exon, positive when
    /// the nearest exon lies 5' of the position (HGVS `+d`/`-d`).
    pub intron_offset: Option<i64>,
    /// cDNA offset of the exonic base the intronic offset is anchored on.
    pub anchor_cdna: Option<u32>,
    /// cDNA offsets of the first and last CDS base, for coding transcripts.
    pub cds_cdna_bounds: Option<(u32, u32)>,
    /// The allele span crosses an exon/intron boundary.
    pub crosses_exon_boundary: bool,
    /// The allele span crosses the CDS start or end.
    pub crosses_cds_boundary: bool,
}

/// Failure to map a variant onto a transcript.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The variant lies beyond the flank distance; callers report INTERGENIC.
    #[error("variant is {distance} bp away from the transcript")]
    Intergenic { distance: u32 },
    /// The transcript geometry could not be resolved consistently.
    #[error(transparent)]
    Inconsistent(#[from] Error),
}

/// Projects variants onto one transcript.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper<'a> {
    tx: &'a TranscriptModel,
    flank_distance: u32,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(tx: &'a TranscriptModel, config: &AnnotatorConfig) -> Self {
        Self {
            tx,
            flank_distance: config.flank_distance,
        }
    }

    /// cDNA offset of the genomic position `pos`, `None` if not exonic.
    pub fn cdna_offset(&self, pos: u32) -> Option<u32> {
        let exons = self.tx.exons();
        let idx = self.tx.exon_containing(pos)?;
        let exon = exons[idx];
        Some(match self.tx.strand() {
            Strand::Forward => {
                exons[..idx].iter().map(|e| e.len()).sum::<u32>() + (pos - exon.start)
            }
            Strand::Reverse => {
                exons[idx + 1..].iter().map(|e| e.len()).sum::<u32>() + (exon.end - pos)
            }
        })
    }

    /// cDNA offsets of the first and last CDS base in transcript orientation.
    pub fn cds_cdna_bounds(&self) -> Result<Option<(u32, u32)>, Error> {
        let (cds_start, cds_end) = match self.tx.cds_range() {
            Some(range) => range,
            None => return Ok(None),
        };
        let inconsistent = |pos: u32| {
            Error::CoordinateInconsistency(format!(
                "CDS boundary {} of {} is not exonic",
                pos,
                self.tx.accession()
            ))
        };
        let left = self
            .cdna_offset(cds_start)
            .ok_or_else(|| inconsistent(cds_start))?;
        let right = self.cdna_offset(cds_end).ok_or_else(|| inconsistent(cds_end))?;
        Ok(Some(match self.tx.strand() {
            Strand::Forward => (left, right),
            Strand::Reverse => (right, left),
        }))
    }

    /// Whether the span `[start, end]` crosses an internal exon/intron boundary.
    fn crosses_exon_boundary(&self, start: u32, end: u32) -> bool {
        self.tx.exons().windows(2).any(|pair| {
            let (left, right) = (pair[0], pair[1]);
            (start <= left.end && end > left.end) || (start < right.start && end >= right.start)
        })
    }

    fn in_cds(&self, pos: u32) -> bool {
        self.tx
            .cds_range()
            .map_or(false, |(cds_start, cds_end)| cds_start <= pos && pos <= cds_end)
    }

    /// Genomic base whose location classifies `var`.
    ///
    /// This is the leftmost reference base.  Insertions have none and use the
    /// flanking base on the transcript's 5' side, or the 3' one when only the
    /// 5' one is coding, so that insertions next to the CDS count as UTR.
    fn location_base(&self, var: &Variant, start: u32, end: u32) -> u32 {
        if !var.reference.is_empty() {
            return start;
        }
        let (five, three) = match self.tx.strand() {
            Strand::Forward => (start, end),
            Strand::Reverse => (end, start),
        };
        if self.in_cds(five) && !self.in_cds(three) {
            three
        } else {
            five
        }
    }

    /// Nearest exon of the intronic `base` measured from the closer end of
    /// `[start, end]`.
    fn nearest_exon(&self, base: u32, start: u32, end: u32) -> Result<NearestExon, Error> {
        let tx = self.tx;
        let exons = tx.exons();
        let right = exons.partition_point(|e| e.end < base);
        if right == 0 || right >= exons.len() {
            return Err(Error::CoordinateInconsistency(format!(
                "position {} is within {} but not between two exons",
                base,
                tx.accession()
            )));
        }
        let left = right - 1;
        let dist_left = start.saturating_sub(exons[left].end).max(1);
        let dist_right = exons[right].start.saturating_sub(end).max(1);
        // Ties go to the exon 5' of the position.
        let pick_left = match tx.strand() {
            Strand::Forward => dist_left <= dist_right,
            Strand::Reverse => dist_left < dist_right,
        };
        let (idx, distance, anchor) = if pick_left {
            (left, dist_left, exons[left].end)
        } else {
            (right, dist_right, exons[right].start)
        };
        let anchor_cdna = self.cdna_offset(anchor).ok_or_else(|| {
            Error::CoordinateInconsistency(format!(
                "exon boundary {} of {} has no cDNA offset",
                anchor,
                tx.accession()
            ))
        })?;
        // The nearest exon is 5' of the position iff it is the left one on
        // the forward strand or the right one on the reverse strand.
        let upstream_exon = pick_left == (tx.strand() == Strand::Forward);
        Ok(NearestExon {
            idx,
            distance,
            anchor_cdna,
            offset: if upstream_exon {
                distance as i64
            } else {
                -(distance as i64)
            },
        })
    }

    /// Position of the single base `pos` on the spliced transcript: its cDNA
    /// offset if exonic, else the cDNA offset of the nearest exon boundary
    /// and the signed intronic offset.  `None` outside of the transcript.
    pub fn tx_position(&self, pos: u32) -> Option<(u32, Option<i64>)> {
        if pos < self.tx.tx_start() || pos > self.tx.tx_end() {
            return None;
        }
        match self.cdna_offset(pos) {
            Some(cdna) => Some((cdna, None)),
            None => self
                .nearest_exon(pos, pos, pos)
                .ok()
                .map(|nearest| (nearest.anchor_cdna, Some(nearest.offset))),
        }
    }

    /// Map `var` (normalized) onto the transcript.
    pub fn map(&self, var: &Variant) -> Result<MappedPosition, MapError> {
        let tx = self.tx;
        if var.chrom != tx.chrom() {
            return Err(Error::CoordinateInconsistency(format!(
                "variant on {} but {} on {}",
                &var.chrom,
                tx.accession(),
                tx.chrom()
            ))
            .into());
        }

        let (start, end) = var.flanked_span();
        let base = self.location_base(var, start, end);
        let cds_cdna_bounds = self.cds_cdna_bounds()?;
        let crosses_cds_boundary = !var.reference.is_empty()
            && tx.cds_range().map_or(false, |(cds_start, cds_end)| {
                (start < cds_start && end >= cds_start) || (start <= cds_end && end > cds_end)
            });
        let mut result = MappedPosition {
            location: LocationKind::Exonic,
            exon_index: 0,
            cdna_offset: None,
            cds_offset: None,
            boundary_distance: 0,
            intron_offset: None,
            anchor_cdna: None,
            cds_cdna_bounds,
            crosses_exon_boundary: self.crosses_exon_boundary(start, end),
            crosses_cds_boundary,
        };

        // Outside of the transcript: upstream or downstream within the flank.
        if base < tx.tx_start() || base > tx.tx_end() {
            let is_left = base < tx.tx_start();
            let distance = if is_left {
                tx.tx_start().saturating_sub(end).max(1)
            } else {
                start.saturating_sub(tx.tx_end()).max(1)
            };
            if distance > self.flank_distance {
                return Err(MapError::Intergenic { distance });
            }
            result.location = match (tx.strand(), is_left) {
                (Strand::Forward, true) | (Strand::Reverse, false) => LocationKind::Upstream,
                (Strand::Forward, false) | (Strand::Reverse, true) => LocationKind::Downstream,
            };
            result.exon_index = if result.location == LocationKind::Upstream {
                0
            } else {
                tx.exons().len() - 1
            };
            result.boundary_distance = distance;
            tracing::trace!("{} is {:?} of {}", var, result.location, tx.accession());
            return Ok(result);
        }

        let exons = tx.exons();
        if let Some(idx) = tx.exon_containing(base) {
            let exon = exons[idx];
            let cdna_offset = self.cdna_offset(base).ok_or_else(|| {
                Error::CoordinateInconsistency(format!(
                    "exonic position {} has no cDNA offset in {}",
                    base,
                    tx.accession()
                ))
            })?;
            result.exon_index = tx.tx_order(idx);
            result.cdna_offset = Some(cdna_offset);
            result.boundary_distance = (base - exon.start).min(exon.end - base);
            result.location = match tx.cds_range() {
                None => LocationKind::Exonic,
                Some((cds_start, cds_end)) => {
                    if base < cds_start {
                        match tx.strand() {
                            Strand::Forward => LocationKind::Utr5,
                            Strand::Reverse => LocationKind::Utr3,
                        }
                    } else if base > cds_end {
                        match tx.strand() {
                            Strand::Forward => LocationKind::Utr3,
                            Strand::Reverse => LocationKind::Utr5,
                        }
                    } else {
                        let (cds_first, _) = cds_cdna_bounds.ok_or_else(|| {
                            Error::CoordinateInconsistency(format!(
                                "coding transcript {} without CDS offsets",
                                tx.accession()
                            ))
                        })?;
                        let cds_offset = cdna_offset.checked_sub(cds_first).ok_or_else(|| {
                            Error::CoordinateInconsistency(format!(
                                "position {} precedes the CDS of {}",
                                base,
                                tx.accession()
                            ))
                        })?;
                        result.cds_offset = Some(cds_offset);
                        LocationKind::Exonic
                    }
                }
            };
        } else {
            let nearest = self.nearest_exon(base, start, end)?;
            result.location = LocationKind::Intronic;
            result.exon_index = tx.tx_order(nearest.idx);
            result.boundary_distance = nearest.distance;
            result.intron_offset = Some(nearest.offset);
            result.anchor_cdna = Some(nearest.anchor_cdna);
        }

        tracing::trace!(
            "{} maps to {:?} of {} (exon index {}, cDNA {:?}, CDS {:?})",
            var,
            result.location,
            tx.accession(),
            result.exon_index,
            result.cdna_offset,
            result.cds_offset
        );
        Ok(result)
    }
}

/// Exon closest to an intronic position.
#[derive(Debug, Clone, Copy)]
struct NearestExon {
    /// Genomic-order index of the exon.
    idx: usize,
    distance: u32,
    /// cDNA offset of the exon's base next to the intron.
    anchor_cdna: u32,
    /// Signed HGVS-style offset, positive if the exon is 5' of the position.
    offset: i64,
}
