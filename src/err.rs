//! Error taxonomy of the annotation core.

use std::{
    num::ParseIntError,
    process::{ExitCode, Termination},
};

/// Errors raised while building transcripts or annotating a variant.
///
/// Only `MalformedTranscript` is fatal, and only at catalog-build time.  All
/// other variants are recovered into an ERROR-kind annotation by the
/// classifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed transcript: {0}")]
    MalformedTranscript(String),
    #[error("coordinate inconsistency: {0}")]
    CoordinateInconsistency(String),
    #[error("unsupported variant shape: {0}")]
    UnsupportedVariantShape(String),
    #[error("no sequence for {accession} in CDS range {start}..{end}")]
    SequenceUnavailable {
        accession: String,
        start: usize,
        end: usize,
    },
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        Error::MalformedTranscript(format!("missing field `{}`", value.field_name()))
    }
}

impl Error {
    /// Short reason used in the annotation string of ERROR annotations.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::MalformedTranscript(_) => "malformed transcript",
            Error::CoordinateInconsistency(_) => "coordinate inconsistency",
            Error::UnsupportedVariantShape(_) => "unsupported variant",
            Error::SequenceUnavailable { .. } => "reference sequence unavailable",
        }
    }
}

/// Errors of the command line application.
#[derive(thiserror::Error, Debug, Clone)]
pub enum AppError {
    #[error("Empty transcript catalog")]
    EmptyCatalog,
}

impl Termination for AppError {
    fn report(self) -> ExitCode {
        match self {
            AppError::EmptyCatalog => ExitCode::from(1),
        }
    }
}

/// Errors when parsing command line arguments.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("Invalid format in chromosomal change: {0:?}")]
    ChangeInvalidFormat(String),
    #[error("Invalid integer position in chromosomal change")]
    ChangeInvalidInt(#[from] ParseIntError),
    #[error("Reference allele of chromosomal change exceeds the coordinate range: {0:?}")]
    ChangeOutOfRange(String),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reason_is_short() {
        assert_eq!(
            Error::CoordinateInconsistency("x".into()).reason(),
            "coordinate inconsistency"
        );
        assert_eq!(
            Error::SequenceUnavailable {
                accession: "NM_1".into(),
                start: 3,
                end: 6
            }
            .to_string(),
            "no sequence for NM_1 in CDS range 3..6"
        );
    }

    #[test]
    fn uninitialized_field() {
        let err = Error::from(derive_builder::UninitializedFieldError::new("strand"));
        assert_eq!(
            err,
            Error::MalformedTranscript("missing field `strand`".into())
        );
    }
}
