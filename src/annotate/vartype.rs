//! Closed set of variant consequence kinds and their priority table.

/// Consequence of a variant with respect to one transcript.
///
/// The `Display`/`FromStr` representation is the upper-case constant name
/// (e.g., `FS_DELETION`), see `label()` for the human readable form.
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
    strum::EnumIter,
    enum_map::Enum,
)]
pub enum VariantType {
    #[serde(rename = "INTERGENIC")]
    #[strum(serialize = "INTERGENIC")]
    Intergenic,
    #[serde(rename = "UPSTREAM")]
    #[strum(serialize = "UPSTREAM")]
    Upstream,
    #[serde(rename = "DOWNSTREAM")]
    #[strum(serialize = "DOWNSTREAM")]
    Downstream,
    #[serde(rename = "INTRONIC")]
    #[strum(serialize = "INTRONIC")]
    Intronic,
    #[serde(rename = "SPLICING")]
    #[strum(serialize = "SPLICING")]
    Splicing,
    #[serde(rename = "UTR5")]
    #[strum(serialize = "UTR5")]
    Utr5,
    #[serde(rename = "UTR3")]
    #[strum(serialize = "UTR3")]
    Utr3,
    #[serde(rename = "UTR53")]
    #[strum(serialize = "UTR53")]
    Utr53,
    #[serde(rename = "ncRNA_EXONIC")]
    #[strum(serialize = "ncRNA_EXONIC")]
    NcRnaExonic,
    #[serde(rename = "ncRNA_INTRONIC")]
    #[strum(serialize = "ncRNA_INTRONIC")]
    NcRnaIntronic,
    #[serde(rename = "ncRNA_SPLICING")]
    #[strum(serialize = "ncRNA_SPLICING")]
    NcRnaSplicing,
    #[serde(rename = "SYNONYMOUS")]
    #[strum(serialize = "SYNONYMOUS")]
    Synonymous,
    #[serde(rename = "NONSYNONYMOUS")]
    #[strum(serialize = "NONSYNONYMOUS")]
    Nonsynonymous,
    #[serde(rename = "STOPGAIN")]
    #[strum(serialize = "STOPGAIN")]
    Stopgain,
    #[serde(rename = "STOPLOSS")]
    #[strum(serialize = "STOPLOSS")]
    Stoploss,
    #[serde(rename = "FS_INSERTION")]
    #[strum(serialize = "FS_INSERTION")]
    FsInsertion,
    #[serde(rename = "FS_DELETION")]
    #[strum(serialize = "FS_DELETION")]
    FsDeletion,
    #[serde(rename = "FS_SUBSTITUTION")]
    #[strum(serialize = "FS_SUBSTITUTION")]
    FsSubstitution,
    #[serde(rename = "NON_FS_INSERTION")]
    #[strum(serialize = "NON_FS_INSERTION")]
    NonFsInsertion,
    #[serde(rename = "NON_FS_DELETION")]
    #[strum(serialize = "NON_FS_DELETION")]
    NonFsDeletion,
    #[serde(rename = "NON_FS_SUBSTITUTION")]
    #[strum(serialize = "NON_FS_SUBSTITUTION")]
    NonFsSubstitution,
    #[serde(rename = "ERROR")]
    #[strum(serialize = "ERROR")]
    Error,
    #[serde(rename = "UNKNOWN")]
    #[strum(serialize = "UNKNOWN")]
    Unknown,
}

/// Row of the priority table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    /// Severity rank, lower is more severe.
    pub priority: u8,
    /// Human readable label.
    pub label: &'static str,
    /// Affects the sequence of a coding exon (or its splice sites).
    pub coding_exonic: bool,
    /// Located in an untranslated region.
    pub utr: bool,
    /// Located in an exon of a non-coding RNA.
    pub noncoding_rna: bool,
    /// Canonical splice site, coding or non-coding.
    pub splicing: bool,
    /// Annotations of this kind carry a transcript position for ranking.
    /// Uniform among kinds of equal priority.
    pub positioned: bool,
}

const fn row(priority: u8, label: &'static str) -> TypeInfo {
    TypeInfo {
        priority,
        label,
        coding_exonic: false,
        utr: false,
        noncoding_rna: false,
        splicing: false,
        positioned: false,
    }
}

const fn coding(priority: u8, label: &'static str) -> TypeInfo {
    TypeInfo {
        coding_exonic: true,
        positioned: true,
        ..row(priority, label)
    }
}

impl VariantType {
    /// The priority table: one row per kind.
    pub const fn info(self) -> TypeInfo {
        use VariantType::*;
        match self {
            Splicing => TypeInfo {
                splicing: true,
                positioned: false,
                ..coding(1, "Splicing")
            },
            NcRnaSplicing => TypeInfo {
                splicing: true,
                ..row(1, "ncRNA splicing")
            },
            Stopgain => coding(2, "Stopgain"),
            Stoploss => coding(2, "Stoploss"),
            FsInsertion => coding(3, "Frameshift insertion"),
            FsDeletion => coding(3, "Frameshift deletion"),
            FsSubstitution => coding(3, "Frameshift substitution"),
            NonFsInsertion => coding(4, "Non-frameshift insertion"),
            NonFsDeletion => coding(4, "Non-frameshift deletion"),
            NonFsSubstitution => coding(4, "Non-frameshift substitution"),
            Nonsynonymous => coding(5, "Nonsynonymous"),
            Synonymous => coding(6, "Synonymous"),
            NcRnaExonic => TypeInfo {
                noncoding_rna: true,
                positioned: true,
                ..row(7, "ncRNA exonic")
            },
            NcRnaIntronic => row(8, "ncRNA intronic"),
            Utr5 => TypeInfo {
                utr: true,
                positioned: true,
                ..row(9, "UTR5")
            },
            Utr3 => TypeInfo {
                utr: true,
                positioned: true,
                ..row(9, "UTR3")
            },
            Utr53 => TypeInfo {
                utr: true,
                positioned: true,
                ..row(9, "UTR5,UTR3")
            },
            Intronic => row(10, "Intronic"),
            Upstream => row(11, "Upstream"),
            Downstream => row(11, "Downstream"),
            Intergenic => row(12, "Intergenic"),
            Unknown => row(13, "Unknown"),
            Error => row(14, "Potential database error"),
        }
    }

    /// Severity rank, lower is more severe.
    pub fn priority(&self) -> u8 {
        self.info().priority
    }

    /// Human readable label, e.g., "Frameshift deletion".
    pub fn label(&self) -> &'static str {
        self.info().label
    }

    pub fn is_coding_exonic(&self) -> bool {
        self.info().coding_exonic
    }

    pub fn is_utr(&self) -> bool {
        self.info().utr
    }

    pub fn is_noncoding_rna(&self) -> bool {
        self.info().noncoding_rna
    }

    pub fn is_splicing(&self) -> bool {
        self.info().splicing
    }

    /// Whether annotations of this kind carry a position.
    pub fn is_positioned(&self) -> bool {
        self.info().positioned
    }
}
