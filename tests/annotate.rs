//! End-to-end tests of the annotation pipeline on a small catalog.

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use transcript_csq::{
    annotate::{mapper::CoordinateMapper, vartype::VariantType, Annotator},
    config::AnnotatorConfig,
    txs::catalog::Catalog,
    variant::Variant,
};

const PATH_CATALOG: &str = "tests/data/catalog.jsonl";

#[fixture]
fn catalog() -> Catalog {
    Catalog::load(PATH_CATALOG, false).unwrap()
}

#[rstest]
fn load_skips_truncated(catalog: Catalog) {
    let accessions = catalog
        .transcripts()
        .iter()
        .map(|tx| tx.accession())
        .collect::<Vec<_>>();
    assert_eq!(
        accessions,
        vec!["NM_0001.1", "NM_0001.2", "XM_0001.1", "NR_0003.1", "NM_0002.1"]
    );
}

#[test]
fn load_curated_only() -> Result<(), anyhow::Error> {
    let catalog = Catalog::load(PATH_CATALOG, true)?;
    assert_eq!(catalog.len(), 4);
    assert!(catalog
        .transcripts()
        .iter()
        .all(|tx| !tx.accession().starts_with("XM_")));

    Ok(())
}

#[test]
fn load_gzip() -> Result<(), anyhow::Error> {
    let tmp_dir = temp_testdir::TempDir::default();
    let path = tmp_dir.join("catalog.jsonl.gz");
    {
        let file = std::fs::File::create(&path)?;
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(&std::fs::read(PATH_CATALOG)?)?;
        encoder.finish()?;
    }

    assert_eq!(Catalog::load(&path, false)?.len(), 5);

    Ok(())
}

#[rstest]
#[case::utr5("1", 1010, "A", "G", VariantType::Utr5)]
#[case::start_codon("1", 1052, "G", "C", VariantType::Nonsynonymous)]
#[case::frameshift_deletion("1", 1060, "TA", "T", VariantType::FsDeletion)]
#[case::splice_acceptor("1", 1199, "A", "G", VariantType::Splicing)]
#[case::intronic("1", 1150, "A", "G", VariantType::Intronic)]
#[case::nc_rna("1", 5350, "A", "G", VariantType::NcRnaExonic)]
#[case::reverse_start_codon("2", 1448, "C", "G", VariantType::Nonsynonymous)]
#[case::intergenic("1", 100_000, "A", "G", VariantType::Intergenic)]
fn best_type(
    catalog: Catalog,
    #[case] chrom: &str,
    #[case] pos: u32,
    #[case] reference: &str,
    #[case] alternative: &str,
    #[case] expected: VariantType,
) {
    let annotator = Annotator::new(&catalog, AnnotatorConfig::default());
    let list = annotator.annotate(&Variant::new(chrom, pos, reference, alternative));
    assert_eq!(list.best_type(), expected);
}

#[rstest]
fn start_codon_records_position(catalog: Catalog) {
    let annotator = Annotator::new(&catalog, AnnotatorConfig::default());
    let list = annotator.annotate(&Variant::new("1", 1052, "G", "C"));
    let best = list.best();
    assert_eq!(best.position(), Some(2));
    assert_eq!(best.gene_id(), Some("1001"));
    assert_eq!(
        list.ranked_view()
            .into_iter()
            .map(|ann| ann.symbol_and_annotation())
            .collect::<Vec<_>>(),
        vec![
            "GENE1(NM_0001.1:exon1:c.G3C:p.M1I)",
            "GENE1(NM_0001.2:exon1:c.G3C:p.M1I)",
            "GENE1(XM_0001.1:exon1:c.G3C:p.M1I)",
        ]
    );
}

#[rstest]
#[case("1")]
#[case("chr1")]
fn chromosome_spelling(catalog: Catalog, #[case] chrom: &str) {
    let annotator = Annotator::new(&catalog, AnnotatorConfig::default());
    let best = annotator.annotate(&Variant::new(chrom, 1052, "G", "C")).best();
    assert_eq!(best.var_type(), VariantType::Nonsynonymous);
    assert_eq!(best.annotation(), "NM_0001.1:exon1:c.G3C:p.M1I");
}

#[rstest]
fn isoforms_collapse(catalog: Catalog) {
    let annotator = Annotator::new(&catalog, AnnotatorConfig::default());
    let list = annotator.annotate(&Variant::new("1", 1150, "A", "G"));
    assert_eq!(list.len(), 1);
    assert_eq!(list.gene_symbols(), vec!["GENE1"]);
    assert_eq!(list.summary(), "GENE1(GENE1)");
}

#[rstest]
fn intergenic_has_no_gene(catalog: Catalog) {
    let annotator = Annotator::new(&catalog, AnnotatorConfig::default());
    let best = annotator
        .annotate(&Variant::new("1", 100_000, "A", "G"))
        .best();
    assert_eq!(best.gene_symbol(), None);
    assert_eq!(best.annotation(), "LNC3(dist=94600),NONE(dist=NONE)");
}

#[rstest]
fn nc_rna_on_reverse_strand(catalog: Catalog) {
    let annotator = Annotator::new(&catalog, AnnotatorConfig::default());
    let best = annotator.annotate(&Variant::new("1", 5350, "A", "G")).best();
    assert_eq!(best.annotation(), "NR_0003.1:exon1:n.51T>C");
}

#[rstest]
fn strand_symmetry(catalog: Catalog) {
    let config = AnnotatorConfig::default();
    let find = |accession: &str| {
        catalog
            .transcripts()
            .iter()
            .find(|tx| tx.accession() == accession)
            .unwrap()
    };
    let fwd = CoordinateMapper::new(find("NM_0001.1"), &config);
    let rev = CoordinateMapper::new(find("NM_0002.1"), &config);
    for pos in 1050..=1450 {
        let lhs = fwd.map(&Variant::new("1", pos, "A", "G")).unwrap();
        let rhs = rev.map(&Variant::new("2", 2500 - pos, "T", "C")).unwrap();
        assert_eq!(lhs.cds_offset, rhs.cds_offset, "pos = {}", pos);
    }
}

#[rstest]
fn batch_matches_single(catalog: Catalog) {
    let annotator = Annotator::new(&catalog, AnnotatorConfig::default());
    let vars = (1000..1600)
        .step_by(13)
        .map(|pos| Variant::new("1", pos, "A", "G"))
        .collect::<Vec<_>>();
    let batch = annotator.annotate_batch(&vars);
    assert_eq!(batch.len(), vars.len());
    for (var, list) in vars.iter().zip(batch.iter()) {
        assert_eq!(list.summary(), annotator.annotate(var).summary());
    }
}
