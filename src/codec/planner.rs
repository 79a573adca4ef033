// In: src/codec/planner.rs

//! The column method planner for the Dimensional scheme.
//!
//! Two strategies, selected by the configured `CompressionProfile`:
//! 1. **Heuristic** (`Fast`): profile the column once (run count and shared
//!    high bits) and trust the size-estimate recommendation.
//! 2. **Empirical** (`Balanced`, `HighCompression`): encode the column with
//!    every candidate method and keep the smallest output.
//!
//! Either way a method only wins if it is strictly smaller than the raw column;
//! otherwise the column is stored as `None`.

use std::time::Instant;

use super::dimensional::{Column, ColumnMethod};
use super::dimstats;
use crate::config::PatchConfig;
use crate::error::Result;
use crate::kernels::{rle, sigbits};

/// Picks and applies the method for one column.
pub(crate) fn plan_column(column: &Column, config: &PatchConfig) -> Result<(ColumnMethod, Vec<u8>)> {
    let (method, encoded) = if config.profile.uses_trial_encoding() {
        find_best_method_by_trial(column, config)?
    } else {
        let recommended = recommend_for_column(column);
        encode_or_raw(column, recommended, config)?
    };

    log::debug!(
        "column '{}' ({}): {} -> {} bytes with {}",
        column.dim.name,
        column.dim.interpretation,
        column.bytes.len(),
        encoded.len(),
        method
    );
    log_metric!(
        "event" = "plan_column",
        "dimension" = &column.dim.name,
        "method" = &method,
        "raw_size" = &column.bytes.len(),
        "encoded_size" = &encoded.len()
    );
    Ok((method, encoded))
}

/// The heuristic recommendation for a single column in isolation.
fn recommend_for_column(column: &Column) -> ColumnMethod {
    let runs = rle::count_runs(&column.words) as u64;
    let (common, _) = sigbits::common_bits(&column.words, column.dim.interpretation.bit_width());
    dimstats::recommend(
        column.dim,
        column.words.len() as u64,
        1,
        runs,
        common as u64,
    )
}

/// Encodes with `method`, falling back to the raw column when the result is
/// not strictly smaller.
pub(crate) fn encode_or_raw(
    column: &Column,
    method: ColumnMethod,
    config: &PatchConfig,
) -> Result<(ColumnMethod, Vec<u8>)> {
    if method != ColumnMethod::None {
        let encoded = column.encode(method, config)?;
        if encoded.len() < column.bytes.len() {
            return Ok((method, encoded));
        }
    }
    Ok((ColumnMethod::None, column.bytes.clone()))
}

/// Encodes every candidate and keeps the smallest. Candidates are tried in
/// declaration order, so `None` wins ties.
fn find_best_method_by_trial(column: &Column, config: &PatchConfig) -> Result<(ColumnMethod, Vec<u8>)> {
    let start_overall = Instant::now();
    log::trace!(
        "--- column planner trial scoring for '{}' ({}) ---",
        column.dim.name,
        column.dim.interpretation
    );

    let mut best = (ColumnMethod::None, column.bytes.clone());
    for &method in ColumnMethod::candidates(column.dim) {
        if method == ColumnMethod::None {
            continue;
        }
        let start_candidate = Instant::now();
        match column.encode(method, config) {
            Ok(encoded) => {
                log::trace!(
                    "  - Candidate: {:<8} | Score (Size): {} | Time: {:.2?}",
                    method,
                    encoded.len(),
                    start_candidate.elapsed()
                );
                if encoded.len() < best.1.len() {
                    best = (method, encoded);
                }
            }
            Err(e) => {
                log::trace!("  - Candidate: {:<8} | Score (Size): FAILED ({})", method, e);
            }
        }
    }

    log::trace!(
        "--- column planner total time: {:.2?} ---",
        start_overall.elapsed()
    );
    Ok(best)
}
