//! Sequence variants as handed to the annotation core.

use crate::err::Error;

/// Sequence variant representation VCF-style.
///
/// The position is 1-based.  Alleles may carry a shared anchor base as in VCF;
/// use `normalized()` to strip it.  An empty allele may also be written as
/// `"-"`.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Variant {
    /// Chromosome.
    pub chrom: String,
    /// Position.
    pub pos: u32,
    /// Reference allele.
    pub reference: String,
    /// Alternate allele.
    pub alternative: String,
}

/// The shape of a normalized variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum VariantShape {
    /// Both alleles have length one and differ.
    Snv,
    /// Both alleles have the same length greater than one.
    BlockSubstitution,
    /// Empty reference allele.
    Insertion,
    /// Empty alternate allele.
    Deletion,
    /// Both alleles non-empty and of different length.
    Delins,
}

impl VariantShape {
    /// Whether this is an indel in the sense of differing allele lengths.
    pub fn is_indel(&self) -> bool {
        matches!(
            self,
            VariantShape::Insertion | VariantShape::Deletion | VariantShape::Delins
        )
    }
}

fn clean_allele(allele: &str) -> String {
    if allele == "-" || allele == "." {
        String::new()
    } else {
        allele.to_ascii_uppercase()
    }
}

impl Variant {
    pub fn new(
        chrom: impl Into<String>,
        pos: u32,
        reference: impl Into<String>,
        alternative: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            reference: reference.into(),
            alternative: alternative.into(),
        }
    }

    /// Return a copy with upper-case alleles and the shared prefix and suffix
    /// removed, the position being shifted by the prefix length.
    ///
    /// Variants that cannot be shifted without leaving the `u32` coordinate
    /// range are only upper-cased.
    pub fn normalized(&self) -> Variant {
        let reference = clean_allele(&self.reference);
        let alternative = clean_allele(&self.alternative);
        let (r, a) = (reference.as_bytes(), alternative.as_bytes());

        let prefix = r.iter().zip(a.iter()).take_while(|(x, y)| x == y).count();
        let (r, a) = (&r[prefix..], &a[prefix..]);
        let suffix = r
            .iter()
            .rev()
            .zip(a.iter().rev())
            .take_while(|(x, y)| x == y)
            .count();
        let (r, a) = (&r[..r.len() - suffix], &a[..a.len() - suffix]);

        match self.pos.checked_add(prefix as u32) {
            Some(pos) => Variant {
                chrom: self.chrom.clone(),
                pos,
                reference: String::from_utf8_lossy(r).into_owned(),
                alternative: String::from_utf8_lossy(a).into_owned(),
            },
            None => Variant {
                chrom: self.chrom.clone(),
                pos: self.pos,
                reference,
                alternative,
            },
        }
    }

    /// Classify the shape of the variant.
    ///
    /// Expects a normalized variant.  Alleles with characters other than
    /// `ACGTN`, alleles that do not describe a change, and reference alleles
    /// reaching beyond the largest representable position are rejected.
    pub fn shape(&self) -> Result<VariantShape, Error> {
        let ref_len = u32::try_from(self.reference.len()).unwrap_or(u32::MAX);
        if self.pos.checked_add(ref_len.saturating_sub(1)).is_none() {
            return Err(Error::UnsupportedVariantShape(format!(
                "reference allele at {} exceeds the coordinate range",
                self.pos
            )));
        }

        let valid = |s: &str| s.bytes().all(|b| b"ACGTN".contains(&b));
        if !valid(&self.reference) || !valid(&self.alternative) {
            return Err(Error::UnsupportedVariantShape(format!(
                "invalid allele characters in {}>{}",
                &self.reference, &self.alternative
            )));
        }

        if self.reference == self.alternative {
            return Err(Error::UnsupportedVariantShape(
                "reference and alternative allele are identical".into(),
            ));
        }

        Ok(match (self.reference.len(), self.alternative.len()) {
            (1, 1) => VariantShape::Snv,
            (0, _) => VariantShape::Insertion,
            (_, 0) => VariantShape::Deletion,
            (r, a) if r == a => VariantShape::BlockSubstitution,
            _ => VariantShape::Delins,
        })
    }

    /// Rightmost reference base affected by the variant.
    ///
    /// For insertions this is `pos` itself, the base following the insertion
    /// point.  Saturates at `u32::MAX`, see `shape()`.
    pub fn end(&self) -> u32 {
        if self.reference.is_empty() {
            self.pos
        } else {
            self.pos
                .saturating_add((self.reference.len() as u32).saturating_sub(1))
        }
    }

    /// The genomic span whose location decides the consequence, i.e., the
    /// affected reference bases or, for insertions, the two bases flanking
    /// the insertion point.
    pub fn flanked_span(&self) -> (u32, u32) {
        if self.reference.is_empty() {
            (self.pos.saturating_sub(1), self.pos)
        } else {
            (self.pos, self.end())
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let allele = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
        write!(
            f,
            "{}:{}{}>{}",
            &self.chrom,
            self.pos,
            allele(&self.reference),
            allele(&self.alternative)
        )
    }
}
