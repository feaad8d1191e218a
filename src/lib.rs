//! Transcript-level consequence annotation of sequence variants.
//!
//! Variants are projected onto transcript models (`annotate::mapper`),
//! classified into a consequence kind (`annotate::classify`), and the
//! per-transcript results are collected into a ranked, deduplicated list
//! (`annotate::list`).

pub mod annotate;
pub mod common;
pub mod config;
pub mod err;
pub mod txs;
pub mod variant;
