//! Per-variant collection of annotations.

use indexmap::IndexSet;
use itertools::Itertools;

use super::{ann::Annotation, vartype::VariantType};

/// Deduplicating, rankable collection of the annotations of one variant.
///
/// The insertion order is kept and used as the final tie breaker when ranking.
#[derive(Debug, Clone, Default)]
pub struct AnnotationList {
    anns: IndexSet<Annotation>,
}

impl AnnotationList {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add `ann` unless an equal annotation is already present.
    ///
    /// Returns whether the annotation was added.
    pub fn insert(&mut self, ann: Annotation) -> bool {
        let added = self.anns.insert(ann);
        if !added {
            tracing::debug!("skipping duplicate annotation");
        }
        added
    }

    pub fn len(&self) -> usize {
        self.anns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anns.is_empty()
    }

    /// Annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.anns.iter()
    }

    /// All annotations, most severe first.
    ///
    /// Ties in priority are broken by position and then by insertion order.
    pub fn ranked_view(&self) -> Vec<&Annotation> {
        let mut result = self.anns.iter().collect::<Vec<_>>();
        result.sort_by(|a, b| a.cmp_rank(b));
        result
    }

    /// The most severe annotation or the UNKNOWN placeholder if empty.
    pub fn best(&self) -> Annotation {
        self.anns
            .iter()
            .min_by(|a, b| a.cmp_rank(b))
            .cloned()
            .unwrap_or_else(Annotation::unknown)
    }

    /// Kind of the most severe annotation.
    pub fn best_type(&self) -> VariantType {
        self.best().var_type()
    }

    /// All annotations sharing the best priority rank, in ranked order.
    pub fn highest_priority(&self) -> Vec<&Annotation> {
        let ranked = self.ranked_view();
        match ranked.first() {
            Some(first) => {
                let priority = first.var_type().priority();
                ranked
                    .into_iter()
                    .take_while(|ann| ann.var_type().priority() == priority)
                    .collect()
            }
            None => Vec::new(),
        }
    }

    /// Distinct gene symbols in ranked order.
    pub fn gene_symbols(&self) -> Vec<&str> {
        self.ranked_view()
            .into_iter()
            .filter_map(Annotation::gene_symbol)
            .unique()
            .collect()
    }

    /// The highest-priority annotations rendered with gene symbol and joined
    /// by `","`, e.g. `"GENE1(NM_0001.1:exon2:c.A151G:p.K51E),GENE2"`.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return Annotation::unknown().symbol_and_annotation();
        }
        self.highest_priority()
            .into_iter()
            .map(Annotation::symbol_and_annotation)
            .join(",")
    }
}

impl Extend<Annotation> for AnnotationList {
    fn extend<T: IntoIterator<Item = Annotation>>(&mut self, iter: T) {
        for ann in iter {
            self.insert(ann);
        }
    }
}

impl FromIterator<Annotation> for AnnotationList {
    fn from_iter<T: IntoIterator<Item = Annotation>>(iter: T) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}
