//! Access to transcript reference sequence for codon context.

use std::{borrow::Cow, collections::HashMap, ops::Range};

use crate::err::Error;

/// Interface for looking up CDS bases of a transcript.
///
/// Implementations are shared read-only between annotation workers and must
/// therefore be safe for concurrent access.
pub trait SequenceProvider: Send + Sync {
    /// Return the bases at the 0-based CDS offsets `range` of the transcript
    /// `accession`, in transcript orientation.
    fn cds_bases(&self, accession: &str, range: Range<usize>) -> Result<Cow<'_, [u8]>, Error>;
}

/// Provider that keeps all CDS sequences in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    /// Mapping from transcript accession to upper-case CDS sequence.
    seqs: HashMap<String, Vec<u8>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register the CDS sequence of a transcript, replacing any previous one.
    pub fn insert(&mut self, accession: impl Into<String>, cds_seq: &str) {
        self.seqs
            .insert(accession.into(), cds_seq.to_ascii_uppercase().into_bytes());
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for InMemoryProvider {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut result = Self::new();
        for (accession, seq) in iter {
            result.insert(accession, seq.as_ref());
        }
        result
    }
}

impl SequenceProvider for InMemoryProvider {
    fn cds_bases(&self, accession: &str, range: Range<usize>) -> Result<Cow<'_, [u8]>, Error> {
        self.seqs
            .get(accession)
            .and_then(|seq| seq.get(range.clone()))
            .map(Cow::Borrowed)
            .ok_or_else(|| Error::SequenceUnavailable {
                accession: accession.to_string(),
                start: range.start,
                end: range.end,
            })
    }
}
