//! Annotation of variants with their consequences on transcripts.
//!
//! The pipeline for one variant is synchronous: candidate transcripts from the
//! catalog are mapped (`mapper`), classified (`classify`), and collected
//! (`list`).  Batches of variants are annotated in parallel.

pub mod ann;
pub mod classify;
pub mod cli;
pub mod codon;
pub mod list;
pub mod mapper;
pub mod provider;
pub mod vartype;

use indexmap::IndexMap;
use rayon::prelude::*;

use self::{
    ann::Annotation,
    classify::classify,
    list::AnnotationList,
    mapper::{CoordinateMapper, MapError},
    provider::SequenceProvider,
};
use crate::{
    common::{build_chrom_map, canonical_chrom},
    config::AnnotatorConfig,
    txs::catalog::Catalog,
    variant::Variant,
};

/// Annotates variants against a read-only transcript catalog.
#[derive(Clone)]
pub struct Annotator<'a> {
    catalog: &'a Catalog,
    provider: &'a dyn SequenceProvider,
    config: AnnotatorConfig,
    /// Chromosome spellings to the catalog's canonical names.
    chrom_map: IndexMap<String, &'static str>,
}

impl<'a> Annotator<'a> {
    /// Construct annotator using the catalog's own CDS sequences.
    pub fn new(catalog: &'a Catalog, config: AnnotatorConfig) -> Self {
        Self::with_provider(catalog, catalog.provider(), config)
    }

    /// Construct annotator with an external sequence provider.
    pub fn with_provider(
        catalog: &'a Catalog,
        provider: &'a dyn SequenceProvider,
        config: AnnotatorConfig,
    ) -> Self {
        Self {
            catalog,
            provider,
            config,
            chrom_map: build_chrom_map(),
        }
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate one variant against all nearby transcripts.
    ///
    /// The chromosome may be given in any spelling known to the catalog,
    /// e.g., `chr1` or `1`.  The result is never empty: without any
    /// transcript within the flank distance it holds a single INTERGENIC
    /// annotation.
    pub fn annotate(&self, var: &Variant) -> AnnotationList {
        let mut var = var.normalized();
        var.chrom = canonical_chrom(&self.chrom_map, &var.chrom);
        let mut result = AnnotationList::new();
        for tx in self.catalog.candidates(&var, self.config.flank_distance) {
            match CoordinateMapper::new(tx, &self.config).map(&var) {
                Ok(mapped) => {
                    result.insert(classify(tx, &var, &mapped, &self.config, self.provider));
                }
                Err(MapError::Intergenic { distance }) => {
                    tracing::trace!("{} is {} bp from {}", &var, distance, tx.accession());
                }
                Err(MapError::Inconsistent(err)) => {
                    tracing::warn!("could not map {} on {}: {}", &var, tx.accession(), &err);
                    result.insert(Annotation::error(tx, &err));
                }
            }
        }

        if result.is_empty() {
            result.insert(Annotation::intergenic(self.intergenic_description(&var)));
        }
        result
    }

    /// Annotate `vars` in parallel, the result is in input order.
    pub fn annotate_batch(&self, vars: &[Variant]) -> Vec<AnnotationList> {
        vars.par_iter().map(|var| self.annotate(var)).collect()
    }

    /// Describe the flanking genes of an intergenic variant, e.g.,
    /// `"GENE1(dist=2000),GENE2(dist=500)"`.
    fn intergenic_description(&self, var: &Variant) -> String {
        let (left, right) = self.catalog.neighbours(var);
        [left, right]
            .into_iter()
            .map(|neighbour| match neighbour {
                Some((tx, dist)) => format!("{}(dist={})", tx.gene_symbol(), dist),
                None => "NONE(dist=NONE)".to_string(),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}
