//! Occurrence richness summary
//!
//! Fetches coordinate-bearing occurrence records for a taxon up to a fixed
//! cap, bins them into a degree grid, and counts distinct species per cell.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use lifetree_common::{LifetreeError, Result, TaxonKey};
use lifetree_gbif::{GbifClient, OccurrenceRecord};

/// Page size for occurrence queries
pub const DEFAULT_PAGE_LIMIT: u32 = 300;

/// Fixed cap on fetched occurrence records per taxon
pub const DEFAULT_MAX_RECORDS: usize = 2000;

/// One grid cell with its distinct-species count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichnessCell {
    /// Cell center latitude
    pub lat: f64,
    /// Cell center longitude
    pub lon: f64,
    /// Number of distinct species observed in the cell
    pub richness: usize,
    /// The species, sorted by name
    pub species: Vec<String>,
}

/// Richness summary for one taxon
#[derive(Debug, Clone, Serialize)]
pub struct RichnessSummary {
    /// Records fetched before binning
    pub total_records: usize,
    /// Records that carried usable coordinates
    pub located_records: usize,
    /// Cells, densest first
    pub cells: Vec<RichnessCell>,
}

/// Fetch occurrence pages for `key` up to `max_records` and summarize them
pub async fn occurrence_richness(
    client: &GbifClient,
    key: TaxonKey,
    cell_size: f64,
    max_records: usize,
) -> Result<RichnessSummary> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(LifetreeError::config("cell size must be positive"));
    }

    let mut records = Vec::new();
    let mut offset = 0usize;
    while offset < max_records {
        let page = client.search_occurrences(key, DEFAULT_PAGE_LIMIT, offset).await?;
        if page.results.is_empty() {
            break;
        }
        offset += page.results.len();
        let end = page.end_of_records.unwrap_or(false);
        records.extend(page.results);
        if end {
            break;
        }
    }
    debug!(taxon = %key, records = records.len(), "occurrence fetch complete");

    Ok(summarize(records, cell_size))
}

/// Bin records into a `cell_size`-degree grid and count distinct species
/// per cell
pub fn summarize(records: Vec<OccurrenceRecord>, cell_size: f64) -> RichnessSummary {
    let total_records = records.len();
    let mut located_records = 0usize;
    let mut grid: BTreeMap<(i64, i64), BTreeSet<String>> = BTreeMap::new();

    for record in records {
        let (Some(lat), Some(lon)) = (record.decimal_latitude, record.decimal_longitude) else {
            continue;
        };
        located_records += 1;
        let species = record
            .species
            .unwrap_or_else(|| "Unknown species".to_string());
        let cell = (
            (lat / cell_size).floor() as i64,
            (lon / cell_size).floor() as i64,
        );
        grid.entry(cell).or_default().insert(species);
    }

    let mut cells: Vec<RichnessCell> = grid
        .into_iter()
        .map(|((row, col), species)| RichnessCell {
            lat: (row as f64 + 0.5) * cell_size,
            lon: (col as f64 + 0.5) * cell_size,
            richness: species.len(),
            species: species.into_iter().collect(),
        })
        .collect();
    cells.sort_by(|a, b| b.richness.cmp(&a.richness));

    RichnessSummary {
        total_records,
        located_records,
        cells,
    }
}
