//! GBIF wire types
//!
//! Serde mappings for the JSON the API returns, plus conversions into the
//! shared [`Taxon`] domain type. Fields the browser never reads are not
//! modeled.

use serde::Deserialize;

use lifetree_common::{Rank, Taxon, TaxonKey};

/// Species detail as returned by `GET /species/{key}`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesDetail {
    pub key: i64,
    pub scientific_name: String,
    #[serde(default)]
    pub vernacular_name: Option<String>,
    #[serde(default)]
    pub rank: Rank,
}

impl From<SpeciesDetail> for Taxon {
    fn from(detail: SpeciesDetail) -> Self {
        Taxon::new(
            TaxonKey(detail.key),
            detail.scientific_name,
            detail.vernacular_name,
            detail.rank,
        )
    }
}

/// One raw child record from `GET /species/{key}/children`
///
/// The children endpoint returns taxa at multiple ranks below the parent;
/// rank narrowing happens later, in the filter.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub key: i64,
    pub scientific_name: String,
    #[serde(default)]
    pub rank: Rank,
}

impl ChildRecord {
    /// The record's key as a typed identifier
    pub fn taxon_key(&self) -> TaxonKey {
        TaxonKey(self.key)
    }
}

/// Paged response envelope used by the list endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub end_of_records: Option<bool>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Fuzzy match response from `GET /species/match`
///
/// A miss is signalled by the absence of `usageKey`, not by an HTTP error.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NameMatch {
    #[serde(default)]
    pub usage_key: Option<i64>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<i32>,
}

impl NameMatch {
    /// Convert a confident match into a Taxon; `None` when the API found
    /// no usable match
    pub fn into_taxon(self) -> Option<Taxon> {
        let key = self.usage_key?;
        Some(Taxon::new(
            TaxonKey(key),
            self.scientific_name.unwrap_or_default(),
            None,
            self.rank.unwrap_or_default(),
        ))
    }
}

/// One coordinate-bearing occurrence record
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceRecord {
    #[serde(default)]
    pub decimal_latitude: Option<f64>,
    #[serde(default)]
    pub decimal_longitude: Option<f64>,
    #[serde(default)]
    pub species: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_detail_to_taxon() {
        let json = r#"{"key":6,"scientificName":"Plantae","vernacularName":"plants","rank":"KINGDOM"}"#;
        let detail: SpeciesDetail = serde_json::from_str(json).unwrap();
        let taxon: Taxon = detail.into();
        assert_eq!(taxon.key, TaxonKey(6));
        assert_eq!(taxon.scientific_name, "Plantae");
        assert_eq!(taxon.common_name.as_deref(), Some("plants"));
        assert_eq!(taxon.rank, Rank::Kingdom);
    }

    #[test]
    fn test_species_detail_missing_optionals() {
        let json = r#"{"key":7707728,"scientificName":"Tracheophyta"}"#;
        let detail: SpeciesDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.vernacular_name, None);
        assert_eq!(detail.rank, Rank::Other);
    }

    #[test]
    fn test_paged_children() {
        let json = r#"{
            "offset": 0, "limit": 20, "endOfRecords": true,
            "results": [
                {"key": 7707728, "scientificName": "Tracheophyta", "rank": "PHYLUM"},
                {"key": 220, "scientificName": "Magnoliopsida", "rank": "CLASS"}
            ]
        }"#;
        let page: Paged<ChildRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(page.end_of_records, Some(true));
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].rank, Rank::Phylum);
        assert_eq!(page.results[1].taxon_key(), TaxonKey(220));
    }

    #[test]
    fn test_name_match_hit() {
        let json = r#"{"usageKey":6,"scientificName":"Plantae","rank":"KINGDOM","matchType":"EXACT","confidence":98}"#;
        let matched: NameMatch = serde_json::from_str(json).unwrap();
        let taxon = matched.into_taxon().unwrap();
        assert_eq!(taxon.key, TaxonKey(6));
        assert_eq!(taxon.rank, Rank::Kingdom);
    }

    #[test]
    fn test_name_match_miss_has_no_usage_key() {
        let json = r#"{"confidence":100,"matchType":"NONE"}"#;
        let matched: NameMatch = serde_json::from_str(json).unwrap();
        assert!(matched.into_taxon().is_none());
    }

    #[test]
    fn test_occurrence_record() {
        let json = r#"{"decimalLatitude":-33.9,"decimalLongitude":18.4,"species":"Protea cynaroides"}"#;
        let rec: OccurrenceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.decimal_latitude, Some(-33.9));
        assert_eq!(rec.species.as_deref(), Some("Protea cynaroides"));
    }
}
