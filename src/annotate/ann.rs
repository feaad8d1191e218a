//! The annotation of one variant with respect to one transcript.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use super::vartype::VariantType;
use crate::{err::Error, txs::TranscriptModel};

/// Immutable result value for one (variant, transcript) pair.
///
/// Equality (and hashing) only considers the variant type, the gene symbol,
/// and the annotation string.  The position and the gene identifier are
/// ignored so that equivalent calls from several isoforms of one gene
/// collapse into one.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    /// The consequence kind.
    var_type: VariantType,
    /// CDS-relative (or cDNA-relative) position, only used for sorting.
    position: Option<u32>,
    /// Gene symbol, absent for intergenic annotations.
    gene_symbol: Option<String>,
    /// External gene identifier.
    gene_id: Option<String>,
    /// Transcript-qualified change descriptor without the gene symbol, e.g.,
    /// `"NM_000546.5:exon5:c.T455C:p.L152P"`.
    annotation: String,
}

impl Annotation {
    /// Construct annotation for transcript `tx`, copying its gene symbol and id.
    ///
    /// `position` is dropped for kinds that are not positioned, see
    /// `VariantType::is_positioned()`.
    pub fn new(
        tx: &TranscriptModel,
        var_type: VariantType,
        annotation: impl Into<String>,
        position: Option<u32>,
    ) -> Self {
        Self {
            var_type,
            position: position.filter(|_| var_type.is_positioned()),
            gene_symbol: Some(tx.gene_symbol().to_string()),
            gene_id: tx.gene_id().map(str::to_string),
            annotation: annotation.into(),
        }
    }

    /// Construct an intergenic annotation without gene information.
    ///
    /// `annotation` is free text chosen by the caller, e.g., naming the
    /// neighbouring genes.
    pub fn intergenic(annotation: impl Into<String>) -> Self {
        Self {
            var_type: VariantType::Intergenic,
            position: None,
            gene_symbol: None,
            gene_id: None,
            annotation: annotation.into(),
        }
    }

    /// Construct the ERROR annotation reporting `err` for transcript `tx`.
    pub fn error(tx: &TranscriptModel, err: &Error) -> Self {
        Self::new(
            tx,
            VariantType::Error,
            format!("{}:{}", tx.accession(), err.reason()),
            None,
        )
    }

    /// Construct the placeholder returned when nothing was annotated.
    pub fn unknown() -> Self {
        Self {
            var_type: VariantType::Unknown,
            position: None,
            gene_symbol: None,
            gene_id: None,
            annotation: ".".into(),
        }
    }

    pub fn var_type(&self) -> VariantType {
        self.var_type
    }

    pub fn position(&self) -> Option<u32> {
        self.position
    }

    pub fn gene_symbol(&self) -> Option<&str> {
        self.gene_symbol.as_deref()
    }

    pub fn gene_id(&self) -> Option<&str> {
        self.gene_id.as_deref()
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Full annotation with gene symbol, e.g. `"TP53(NM_000546.5:exon5:c.T455C:p.L152P)"`.
    ///
    /// Annotations without gene symbol only yield the annotation string.
    pub fn symbol_and_annotation(&self) -> String {
        match &self.gene_symbol {
            Some(symbol) => format!("{}({})", symbol, &self.annotation),
            None => self.annotation.clone(),
        }
    }

    pub fn is_coding_exonic(&self) -> bool {
        self.var_type.is_coding_exonic()
    }

    pub fn is_utr(&self) -> bool {
        self.var_type.is_utr()
    }

    pub fn is_noncoding_rna(&self) -> bool {
        self.var_type.is_noncoding_rna()
    }

    /// Ranking comparator: priority rank first, then position.
    ///
    /// Positions are compared only when both annotations have one, otherwise
    /// an annotation with position precedes one without.  Use with a stable
    /// sort to keep insertion order among ties.
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.var_type
            .priority()
            .cmp(&other.var_type.priority())
            .then_with(|| match (self.position, other.position) {
                (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
                (lhs, rhs) => lhs.is_none().cmp(&rhs.is_none()),
            })
    }
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.var_type == other.var_type
            && self.gene_symbol == other.gene_symbol
            && self.annotation == other.annotation
    }
}

impl Eq for Annotation {}

impl Hash for Annotation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.var_type.hash(state);
        self.gene_symbol.hash(state);
        self.annotation.hash(state);
    }
}
