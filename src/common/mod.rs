//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use indexmap::IndexMap;

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Definition of canonical chromosome names.
pub const CHROMS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y", "M",
];

/// Build mapping of chromosome name spellings to the canonical name.
pub fn build_chrom_map() -> IndexMap<String, &'static str> {
    let mut result = IndexMap::new();
    for &chrom_name in CHROMS.iter() {
        result.insert(chrom_name.to_owned(), chrom_name);
        result.insert(format!("chr{chrom_name}"), chrom_name);
    }
    result.insert("x".to_owned(), "X");
    result.insert("y".to_owned(), "Y");
    result.insert("chrx".to_owned(), "X");
    result.insert("chry".to_owned(), "Y");
    result.insert("mt".to_owned(), "M");
    result.insert("m".to_owned(), "M");
    result.insert("chrmt".to_owned(), "M");
    result.insert("chrm".to_owned(), "M");
    result.insert("MT".to_owned(), "M");
    result.insert("chrMT".to_owned(), "M");
    result
}

/// Canonical name of the chromosome `name`, e.g., `"chr1"` becomes `"1"`.
///
/// Names not known (e.g., unplaced contigs) are returned unchanged.
pub fn canonical_chrom(chrom_map: &IndexMap<String, &'static str>, name: &str) -> String {
    chrom_map
        .get(name)
        .map(|s| s.to_string())
        .unwrap_or_else(|| name.to_string())
}
