//! Classification of a mapped variant into a consequence kind.

use super::{
    ann::Annotation,
    codon::{self, STOP},
    mapper::{CoordinateMapper, LocationKind, MappedPosition},
    provider::SequenceProvider,
    vartype::VariantType,
};
use crate::{
    config::AnnotatorConfig,
    err::Error,
    txs::{Strand, TranscriptModel},
    variant::{Variant, VariantShape},
};

/// Classify the normalized `var` against `tx` given its mapped position.
///
/// Never fails: problems are reported as an ERROR annotation and logged.
pub fn classify(
    tx: &TranscriptModel,
    var: &Variant,
    mapped: &MappedPosition,
    config: &AnnotatorConfig,
    provider: &dyn SequenceProvider,
) -> Annotation {
    let res = var.shape().and_then(|shape| {
        Classifier {
            tx,
            var,
            mapped,
            shape,
            mapper: CoordinateMapper::new(tx, config),
            provider,
        }
        .run(config.splice_window)
    });
    match res {
        Ok(ann) => ann,
        Err(err) => {
            tracing::warn!(
                "could not annotate {} on {}: {}",
                var,
                tx.accession(),
                &err
            );
            Annotation::error(tx, &err)
        }
    }
}

struct Classifier<'a> {
    tx: &'a TranscriptModel,
    var: &'a Variant,
    mapped: &'a MappedPosition,
    shape: VariantShape,
    mapper: CoordinateMapper<'a>,
    provider: &'a dyn SequenceProvider,
}

impl<'a> Classifier<'a> {
    fn run(&self, splice_window: u32) -> Result<Annotation, Error> {
        let mapped = self.mapped;
        let coding = self.tx.is_coding();

        let in_splice_window = (mapped.location == LocationKind::Intronic
            && mapped.boundary_distance <= splice_window)
            || mapped.crosses_exon_boundary;
        if in_splice_window {
            let var_type = if coding {
                VariantType::Splicing
            } else {
                VariantType::NcRnaSplicing
            };
            return Ok(self.annotation(var_type, self.allele_string()?, None));
        }

        match mapped.location {
            LocationKind::Intronic => {
                let var_type = if coding {
                    VariantType::Intronic
                } else {
                    VariantType::NcRnaIntronic
                };
                Ok(self.annotation(var_type, self.gene_string(), None))
            }
            LocationKind::Exonic if !coding => Ok(self.annotation(
                VariantType::NcRnaExonic,
                self.allele_string()?,
                mapped.cdna_offset,
            )),
            LocationKind::Exonic => self.coding(),
            LocationKind::Utr5 | LocationKind::Utr3 => {
                let var_type = if mapped.crosses_cds_boundary {
                    VariantType::Utr53
                } else if mapped.location == LocationKind::Utr5 {
                    VariantType::Utr5
                } else {
                    VariantType::Utr3
                };
                Ok(self.annotation(var_type, self.allele_string()?, mapped.cdna_offset))
            }
            LocationKind::Upstream => {
                Ok(self.annotation(VariantType::Upstream, self.gene_string(), None))
            }
            LocationKind::Downstream => {
                Ok(self.annotation(VariantType::Downstream, self.gene_string(), None))
            }
        }
    }

    fn annotation(
        &self,
        var_type: VariantType,
        annotation: String,
        position: Option<u32>,
    ) -> Annotation {
        Annotation::new(self.tx, var_type, annotation, position)
    }

    /// Classification of variants starting within the CDS.
    fn coding(&self) -> Result<Annotation, Error> {
        let cds_offset = self.mapped.cds_offset.ok_or_else(|| {
            Error::CoordinateInconsistency(format!(
                "exonic position {} of coding {} has no CDS offset",
                self.var.pos,
                self.tx.accession()
            ))
        })?;

        if self.shape != VariantShape::Snv {
            let diff = self
                .var
                .reference
                .len()
                .abs_diff(self.var.alternative.len());
            let frameshift = diff % 3 != 0;
            let var_type = match (self.shape, frameshift) {
                (VariantShape::Insertion, true) => VariantType::FsInsertion,
                (VariantShape::Insertion, false) => VariantType::NonFsInsertion,
                (VariantShape::Deletion, true) => VariantType::FsDeletion,
                (VariantShape::Deletion, false) => VariantType::NonFsDeletion,
                (_, true) => VariantType::FsSubstitution,
                (_, false) => VariantType::NonFsSubstitution,
            };
            return Ok(self.annotation(var_type, self.allele_string()?, Some(cds_offset)));
        }

        let ref_base = self.tx_allele(&self.var.reference).as_bytes()[0];
        let alt_base = self.tx_allele(&self.var.alternative).as_bytes()[0];

        let codon_start = (cds_offset / 3 * 3) as usize;
        let in_codon = (cds_offset % 3) as usize;
        let ref_codon = self
            .provider
            .cds_bases(self.tx.accession(), codon_start..codon_start + 3)?
            .into_owned();
        if ref_codon.len() != 3 {
            return Err(Error::CoordinateInconsistency(format!(
                "provider returned {} bases for codon at CDS offset {} of {}",
                ref_codon.len(),
                codon_start,
                self.tx.accession()
            )));
        }
        if ref_codon[in_codon] != ref_base {
            return Err(Error::CoordinateInconsistency(format!(
                "reference base {} at CDS offset {} of {} does not match codon {}",
                ref_base as char,
                cds_offset,
                self.tx.accession(),
                String::from_utf8_lossy(&ref_codon)
            )));
        }
        let mut alt_codon = ref_codon.clone();
        alt_codon[in_codon] = alt_base;

        let untranslatable = |codon: &[u8]| {
            Error::UnsupportedVariantShape(format!(
                "codon {} cannot be translated",
                String::from_utf8_lossy(codon)
            ))
        };
        let ref_aa = codon::translate(&ref_codon).ok_or_else(|| untranslatable(&ref_codon))?;
        let alt_aa = codon::translate(&alt_codon).ok_or_else(|| untranslatable(&alt_codon))?;
        let var_type = if ref_aa == alt_aa {
            VariantType::Synonymous
        } else if alt_aa == STOP {
            VariantType::Stopgain
        } else if ref_aa == STOP {
            VariantType::Stoploss
        } else {
            VariantType::Nonsynonymous
        };

        let display_aa = |aa: u8| if aa == STOP { 'X' } else { aa as char };
        let annotation = format!(
            "{}:exon{}:c.{}{}{}:p.{}{}{}",
            self.tx.accession(),
            self.mapped.exon_index + 1,
            ref_base as char,
            cds_offset + 1,
            alt_base as char,
            display_aa(ref_aa),
            cds_offset / 3 + 1,
            display_aa(alt_aa)
        );
        Ok(self.annotation(var_type, annotation, Some(cds_offset)))
    }

    /// Allele in transcript orientation.
    fn tx_allele(&self, allele: &str) -> String {
        match self.tx.strand() {
            Strand::Forward => allele.to_string(),
            Strand::Reverse => codon::revcomp(allele),
        }
    }

    /// Gene symbol, or the accession for transcripts without symbol.
    fn gene_string(&self) -> String {
        if self.tx.gene_symbol().is_empty() {
            self.tx.accession().to_string()
        } else {
            self.tx.gene_symbol().to_string()
        }
    }

    /// `c.`/`n.` position of the cDNA offset `cdna`.
    fn position(&self, cdna: u32) -> String {
        match self.mapped.cds_cdna_bounds {
            Some((first, _)) if cdna < first => format!("-{}", first - cdna),
            Some((_, last)) if cdna > last => format!("*{}", cdna - last),
            Some((first, _)) => format!("{}", cdna - first + 1),
            None => format!("{}", cdna + 1),
        }
    }

    fn prefix(&self) -> &'static str {
        if self.tx.is_coding() {
            "c."
        } else {
            "n."
        }
    }

    /// Change part following the position, e.g. `A>G` or `delTT`.
    fn change(&self) -> String {
        let reference = self.tx_allele(&self.var.reference);
        let alternative = self.tx_allele(&self.var.alternative);
        match self.shape {
            VariantShape::Snv => format!("{}>{}", reference, alternative),
            VariantShape::Deletion => format!("del{}", reference),
            VariantShape::Insertion => format!("ins{}", alternative),
            VariantShape::BlockSubstitution | VariantShape::Delins => {
                format!("delins{}", alternative)
            }
        }
    }

    /// `c.`/`n.` position of the genomic base `pos`, with an intronic offset
    /// relative to the nearest exon boundary where needed (`50+2`).
    fn tx_position(&self, pos: u32) -> Option<String> {
        let (cdna, offset) = self.mapper.tx_position(pos)?;
        Some(match offset {
            Some(offset) => format!("{}{:+}", self.position(cdna), offset),
            None => self.position(cdna),
        })
    }

    /// Position or range of the affected transcript bases in transcript
    /// orientation, for insertions the two bases flanking the insertion
    /// point.
    fn span_string(&self) -> Option<String> {
        let (left, right) = self.var.flanked_span();
        let (first, last) = match self.tx.strand() {
            Strand::Forward => (left, right),
            Strand::Reverse => (right, left),
        };
        let first = self.tx_position(first)?;
        if left == right {
            Some(first)
        } else {
            Some(format!("{}_{}", first, self.tx_position(last)?))
        }
    }

    /// Annotation string for exonic, UTR, and splice site variants, e.g.,
    /// `NM_0001.1:exon2:c.51-1A>G`.
    fn allele_string(&self) -> Result<String, Error> {
        let span = self.span_string().ok_or_else(|| {
            Error::CoordinateInconsistency(format!(
                "variant at {} reaches beyond {}",
                self.var.pos,
                self.tx.accession()
            ))
        })?;
        Ok(format!(
            "{}:exon{}:{}{}{}",
            self.tx.accession(),
            self.mapped.exon_index + 1,
            self.prefix(),
            span,
            self.change()
        ))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{
        annotate::provider::InMemoryProvider,
        txs::{
            test::{fwd_tx, rev_tx},
            ExonSpan, TranscriptModelBuilder,
        },
    };

    /// CDS shared by both test transcripts: Met, 65 x Lys, stop.
    fn cds_seq() -> String {
        format!("ATG{}TAA", "AAA".repeat(65))
    }

    fn provider() -> InMemoryProvider {
        InMemoryProvider::from_iter([("NM_0001.1", cds_seq()), ("NM_0002.1", cds_seq())])
    }

    fn run(tx: &TranscriptModel, var: Variant) -> Annotation {
        run_with(tx, var, &AnnotatorConfig::default())
    }

    fn run_with(tx: &TranscriptModel, var: Variant, config: &AnnotatorConfig) -> Annotation {
        let var = var.normalized();
        let mapped = CoordinateMapper::new(tx, config).map(&var).unwrap();
        classify(tx, &var, &mapped, config, &provider())
    }

    #[rstest]
    #[case::missense_start(1052, "G", "C", VariantType::Nonsynonymous, "NM_0001.1:exon1:c.G3C:p.M1I")]
    #[case::synonymous(1055, "A", "G", VariantType::Synonymous, "NM_0001.1:exon1:c.A6G:p.K2K")]
    #[case::stopgain(1053, "A", "T", VariantType::Stopgain, "NM_0001.1:exon1:c.A4T:p.K2X")]
    #[case::stoploss(1448, "T", "C", VariantType::Stoploss, "NM_0001.1:exon3:c.T199C:p.X67Q")]
    #[case::missense_exon2(1201, "A", "G", VariantType::Nonsynonymous, "NM_0001.1:exon2:c.A52G:p.K18E")]
    fn coding_snv(
        fwd_tx: TranscriptModel,
        #[case] pos: u32,
        #[case] reference: &str,
        #[case] alternative: &str,
        #[case] var_type: VariantType,
        #[case] annotation: &str,
    ) {
        let ann = run(&fwd_tx, Variant::new("1", pos, reference, alternative));
        assert_eq!(ann.var_type(), var_type);
        assert_eq!(ann.annotation(), annotation);
        assert_eq!(ann.gene_symbol(), Some("GENE1"));
    }

    #[rstest]
    fn missense_records_position(fwd_tx: TranscriptModel) {
        let ann = run(&fwd_tx, Variant::new("1", 1052, "G", "C"));
        assert_eq!(ann.position(), Some(2));
    }

    #[rstest]
    fn reverse_strand_snv(rev_tx: TranscriptModel) {
        // Mirror of 1052 G>C on the forward transcript.
        let ann = run(&rev_tx, Variant::new("1", 1448, "C", "G"));
        assert_eq!(ann.var_type(), VariantType::Nonsynonymous);
        assert_eq!(ann.annotation(), "NM_0002.1:exon1:c.G3C:p.M1I");
        assert_eq!(ann.position(), Some(2));
    }

    #[rstest]
    #[case::del1(1060, "TA", "T", VariantType::FsDeletion, "NM_0001.1:exon1:c.12delA")]
    #[case::del3(1060, "TAAA", "T", VariantType::NonFsDeletion, "NM_0001.1:exon1:c.12_14delAAA")]
    #[case::ins1(1060, "A", "AC", VariantType::FsInsertion, "NM_0001.1:exon1:c.11_12insC")]
    #[case::ins3(1060, "A", "ACCC", VariantType::NonFsInsertion, "NM_0001.1:exon1:c.11_12insCCC")]
    #[case::delins(1060, "AAA", "G", VariantType::FsSubstitution, "NM_0001.1:exon1:c.11_13delinsG")]
    #[case::block(1060, "AA", "GC", VariantType::NonFsSubstitution, "NM_0001.1:exon1:c.11_12delinsGC")]
    fn coding_indel(
        fwd_tx: TranscriptModel,
        #[case] pos: u32,
        #[case] reference: &str,
        #[case] alternative: &str,
        #[case] var_type: VariantType,
        #[case] annotation: &str,
    ) {
        let ann = run(&fwd_tx, Variant::new("1", pos, reference, alternative));
        assert_eq!(ann.var_type(), var_type);
        assert_eq!(ann.annotation(), annotation);
    }

    #[rstest]
    fn frameshift_iff_length_diff_not_multiple_of_three(fwd_tx: TranscriptModel) {
        for len in 1..=9usize {
            let ann = run(&fwd_tx, Variant::new("1", 1060, "A".repeat(len + 1), "A"));
            let frameshift = ann.var_type() == VariantType::FsDeletion;
            assert_eq!(frameshift, len % 3 != 0, "len = {}", len);
        }
    }

    #[rstest]
    #[case::one_before_exon2(1199, VariantType::Splicing, "NM_0001.1:exon2:c.51-1A>G")]
    #[case::two_after_exon1(1101, VariantType::Splicing, "NM_0001.1:exon1:c.50+2A>G")]
    #[case::intronic(1103, VariantType::Intronic, "GENE1")]
    #[case::utr5(1010, VariantType::Utr5, "NM_0001.1:exon1:c.-40A>G")]
    #[case::utr3(1460, VariantType::Utr3, "NM_0001.1:exon3:c.*10A>G")]
    #[case::upstream(990, VariantType::Upstream, "GENE1")]
    #[case::downstream(1600, VariantType::Downstream, "GENE1")]
    fn non_coding_regions(
        fwd_tx: TranscriptModel,
        #[case] pos: u32,
        #[case] var_type: VariantType,
        #[case] annotation: &str,
    ) {
        let ann = run(&fwd_tx, Variant::new("1", pos, "A", "G"));
        assert_eq!(ann.var_type(), var_type);
        assert_eq!(ann.annotation(), annotation);
    }

    /// Each case is a forward-strand indel and its mirror image on the
    /// reverse-strand transcript, which must agree in kind and string.
    #[rstest]
    #[case::donor_insertion(1099, "A", "AC", 1400, "A", "AG", 2, VariantType::Splicing, "exon1:c.50_50+1insC")]
    #[case::acceptor_insertion(1199, "A", "AC", 1300, "T", "TG", 2, VariantType::Splicing, "exon2:c.51-1_51insC")]
    #[case::insertion_in_window(1100, "A", "AC", 1399, "A", "AG", 1, VariantType::Splicing, "exon1:c.50+1_50+2insC")]
    #[case::deletion_into_intron(1097, "AAAAA", "A", 1398, "TTTTT", "T", 2, VariantType::Splicing, "exon1:c.49_50+2delAAAA")]
    #[case::coding_deletion(1060, "TA", "T", 1438, "AT", "A", 2, VariantType::FsDeletion, "exon1:c.12delA")]
    #[case::coding_insertion(1060, "A", "AC", 1439, "T", "TG", 2, VariantType::FsInsertion, "exon1:c.11_12insC")]
    #[case::insertion_before_start(1049, "A", "AC", 1450, "A", "AG", 2, VariantType::Utr5, "exon1:c.-1_1insC")]
    #[case::insertion_after_stop(1450, "A", "AC", 1049, "T", "TG", 2, VariantType::Utr3, "exon3:c.201_*1insC")]
    #[allow(clippy::too_many_arguments)]
    fn indels_on_both_strands(
        fwd_tx: TranscriptModel,
        rev_tx: TranscriptModel,
        #[case] fwd_pos: u32,
        #[case] fwd_ref: &str,
        #[case] fwd_alt: &str,
        #[case] rev_pos: u32,
        #[case] rev_ref: &str,
        #[case] rev_alt: &str,
        #[case] splice_window: u32,
        #[case] var_type: VariantType,
        #[case] annotation: &str,
    ) {
        let config = AnnotatorConfig {
            splice_window,
            ..Default::default()
        };
        let fwd = run_with(&fwd_tx, Variant::new("1", fwd_pos, fwd_ref, fwd_alt), &config);
        let rev = run_with(&rev_tx, Variant::new("1", rev_pos, rev_ref, rev_alt), &config);
        assert_eq!(fwd.var_type(), var_type);
        assert_eq!(rev.var_type(), var_type);
        assert_eq!(fwd.annotation(), format!("NM_0001.1:{}", annotation));
        assert_eq!(rev.annotation(), format!("NM_0002.1:{}", annotation));
        assert_eq!(fwd.position(), rev.position());
    }

    #[rstest]
    fn insertion_outside_window_is_intronic(fwd_tx: TranscriptModel, rev_tx: TranscriptModel) {
        let config = AnnotatorConfig {
            splice_window: 1,
            ..Default::default()
        };
        let fwd = run_with(&fwd_tx, Variant::new("1", 1101, "A", "AC"), &config);
        let rev = run_with(&rev_tx, Variant::new("1", 1398, "A", "AG"), &config);
        assert_eq!(fwd.var_type(), VariantType::Intronic);
        assert_eq!(rev.var_type(), VariantType::Intronic);
    }

    #[rstest]
    fn intronic_deletion_string(fwd_tx: TranscriptModel) {
        let ann = run(&fwd_tx, Variant::new("1", 1194, "AAAAAA", "A"));
        assert_eq!(ann.var_type(), VariantType::Splicing);
        assert_eq!(ann.annotation(), "NM_0001.1:exon2:c.51-5_51-1delAAAAA");
    }

    #[rstest]
    fn splice_window_is_configurable(fwd_tx: TranscriptModel) {
        let config = AnnotatorConfig {
            splice_window: 5,
            ..Default::default()
        };
        let ann = run_with(&fwd_tx, Variant::new("1", 1104, "A", "G"), &config);
        assert_eq!(ann.var_type(), VariantType::Splicing);
        let ann = run_with(&fwd_tx, Variant::new("1", 1106, "A", "G"), &config);
        assert_eq!(ann.var_type(), VariantType::Intronic);
    }

    #[rstest]
    fn exon_boundary_deletion_is_splicing(fwd_tx: TranscriptModel) {
        let ann = run(&fwd_tx, Variant::new("1", 1097, "AAAAA", "A"));
        assert_eq!(ann.var_type(), VariantType::Splicing);
    }

    #[rstest]
    fn utr_deletion_into_cds(fwd_tx: TranscriptModel) {
        let ann = run(&fwd_tx, Variant::new("1", 1047, "AAAA", "A"));
        assert_eq!(ann.var_type(), VariantType::Utr53);
    }

    #[test]
    fn non_coding_transcript() -> Result<(), Error> {
        let tx = TranscriptModelBuilder::default()
            .accession("NR_0001.1")
            .gene_symbol("LNC1")
            .chrom("1")
            .strand(Strand::Forward)
            .tx_start(100)
            .tx_end(400)
            .exons(vec![ExonSpan::new(100, 200), ExonSpan::new(300, 400)])
            .build()?;

        let exonic = run(&tx, Variant::new("1", 110, "A", "G"));
        assert_eq!(exonic.var_type(), VariantType::NcRnaExonic);
        assert_eq!(exonic.annotation(), "NR_0001.1:exon1:n.11A>G");
        assert_eq!(exonic.position(), Some(10));

        let intronic = run(&tx, Variant::new("1", 250, "A", "G"));
        assert_eq!(intronic.var_type(), VariantType::NcRnaIntronic);
        assert_eq!(intronic.annotation(), "LNC1");

        let splicing = run(&tx, Variant::new("1", 201, "A", "G"));
        assert_eq!(splicing.var_type(), VariantType::NcRnaSplicing);
        assert_eq!(splicing.annotation(), "NR_0001.1:exon1:n.101+1A>G");

        Ok(())
    }

    #[rstest]
    #[tracing_test::traced_test]
    fn reference_mismatch_is_error(fwd_tx: TranscriptModel) {
        let ann = run(&fwd_tx, Variant::new("1", 1052, "T", "C"));
        assert_eq!(ann.var_type(), VariantType::Error);
        assert_eq!(ann.annotation(), "NM_0001.1:coordinate inconsistency");
        assert!(logs_contain("could not annotate"));
    }

    #[rstest]
    fn missing_sequence_is_error(fwd_tx: TranscriptModel) {
        let var = Variant::new("1", 1052, "G", "C");
        let config = AnnotatorConfig::default();
        let mapped = CoordinateMapper::new(&fwd_tx, &config).map(&var).unwrap();
        let ann = classify(&fwd_tx, &var, &mapped, &config, &InMemoryProvider::new());
        assert_eq!(ann.var_type(), VariantType::Error);
        assert_eq!(ann.annotation(), "NM_0001.1:reference sequence unavailable");
    }

    /// Provider returning a single base regardless of the requested range.
    struct ShortProvider;

    impl SequenceProvider for ShortProvider {
        fn cds_bases(
            &self,
            _accession: &str,
            _range: std::ops::Range<usize>,
        ) -> Result<std::borrow::Cow<'_, [u8]>, Error> {
            Ok(std::borrow::Cow::Borrowed(b"A"))
        }
    }

    #[rstest]
    fn short_codon_is_error(fwd_tx: TranscriptModel) {
        let var = Variant::new("1", 1054, "A", "G");
        let config = AnnotatorConfig::default();
        let mapped = CoordinateMapper::new(&fwd_tx, &config).map(&var).unwrap();
        let ann = classify(&fwd_tx, &var, &mapped, &config, &ShortProvider);
        assert_eq!(ann.var_type(), VariantType::Error);
        assert_eq!(ann.annotation(), "NM_0001.1:coordinate inconsistency");
    }

    #[rstest]
    fn unsupported_shape_is_error(fwd_tx: TranscriptModel) {
        let var = Variant::new("1", 1052, "G", "<DEL>");
        let config = AnnotatorConfig::default();
        let mapped = CoordinateMapper::new(&fwd_tx, &config).map(&var).unwrap();
        let ann = classify(&fwd_tx, &var, &mapped, &config, &provider());
        assert_eq!(ann.var_type(), VariantType::Error);
        assert_eq!(ann.annotation(), "NM_0001.1:unsupported variant");
    }
}
