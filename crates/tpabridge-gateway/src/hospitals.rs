//! Network-hospital search over heterogeneous provider tables.
//!
//! Every table-backed provider feeds hospital rows with its own column
//! names; the profile's column dictionary remaps each raw row into the
//! canonical record shape. A column a provider never supplies simply
//! yields an absent canonical field, never an error and never a mismap.
//!
//! This crate defines the row-source trait and an in-memory
//! implementation; database-backed sources live with the embedding
//! application.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use tpabridge_config::{HospitalTableMapping, ProviderProfile};
use tpabridge_core::{
    GatewayError, HospitalQuery, HospitalRecord, Result, SearchFacets, StateFacet,
};

/// One raw row of a provider's hospital table, column name to value.
pub type HospitalRow = HashMap<String, String>;

/// Supplier of raw hospital rows per provider table.
#[async_trait]
pub trait HospitalSource: Send + Sync {
    /// All rows of the named table. An unknown table yields no rows.
    async fn rows(&self, table: &str) -> Result<Vec<HospitalRow>>;
}

/// In-memory row source, used by tests and demo tooling.
#[derive(Debug, Default)]
pub struct MemoryHospitalSource {
    tables: HashMap<String, Vec<HospitalRow>>,
}

impl MemoryHospitalSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(
        mut self,
        table: impl Into<String>,
        rows: Vec<HospitalRow>,
    ) -> Self {
        self.tables.insert(table.into(), rows);
        self
    }
}

#[async_trait]
impl HospitalSource for MemoryHospitalSource {
    async fn rows(&self, table: &str) -> Result<Vec<HospitalRow>> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }
}

/// Search and facet projection over table-backed providers.
pub struct HospitalDirectory {
    source: Arc<dyn HospitalSource>,
}

impl HospitalDirectory {
    pub fn new(source: Arc<dyn HospitalSource>) -> Self {
        Self { source }
    }

    /// Filter the provider's table by the query and remap each matching
    /// row into the canonical shape.
    pub async fn search(
        &self,
        profile: &ProviderProfile,
        query: &HospitalQuery,
    ) -> Result<Vec<HospitalRecord>> {
        let mapping = profile.hospital_table.as_ref().ok_or_else(|| {
            GatewayError::internal("hospital search on a provider without a table mapping")
        })?;
        query.validate()?;

        let rows = self.source.rows(&mapping.table).await?;
        let records: Vec<HospitalRecord> = rows
            .iter()
            .filter(|row| row_matches(mapping, row, query))
            .map(|row| remap_row(mapping, row))
            .collect();

        debug!(
            provider_id = %profile.id,
            table = %mapping.table,
            matches = records.len(),
            "hospital search"
        );
        Ok(records)
    }

    /// Distinct state -> cities projection over the provider's table,
    /// used to drive search-option selection.
    pub async fn facets(
        &self,
        profile: &ProviderProfile,
        policy_id: &str,
    ) -> Result<SearchFacets> {
        let mapping = profile.hospital_table.as_ref().ok_or_else(|| {
            GatewayError::internal("hospital facets on a provider without a table mapping")
        })?;

        let rows = self.source.rows(&mapping.table).await?;
        let mut states: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for row in &rows {
            if !policy_allows(mapping, row, policy_id) {
                continue;
            }
            let Some(state) = mapped_value(mapping, row, "state") else {
                continue;
            };
            let cities = states.entry(state).or_default();
            if let Some(city) = mapped_value(mapping, row, "city") {
                cities.insert(city);
            }
        }

        Ok(SearchFacets::StateCity {
            states: states
                .into_iter()
                .map(|(state, cities)| StateFacet {
                    state,
                    cities: cities.into_iter().collect(),
                })
                .collect(),
        })
    }
}

/// Value of a canonical field in a raw row, trimmed; absent when the
/// provider maps no column for it or the cell is empty.
fn mapped_value(mapping: &HospitalTableMapping, row: &HospitalRow, field: &str) -> Option<String> {
    mapping
        .column_for(field)
        .and_then(|column| row.get(column))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Policy scoping: rows carrying the policy column must list the policy;
/// rows (or tables) without the column are never excluded by it.
fn policy_allows(mapping: &HospitalTableMapping, row: &HospitalRow, policy_id: &str) -> bool {
    match mapping.policy_column.as_deref().and_then(|c| row.get(c)) {
        Some(value) => value.contains(policy_id),
        None => true,
    }
}

fn row_matches(mapping: &HospitalTableMapping, row: &HospitalRow, query: &HospitalQuery) -> bool {
    if !policy_allows(mapping, row, &query.policy_id) {
        return false;
    }

    if let Some(pincode) = query.pincode.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        // Pincode is a substring match against the provider's column; a
        // table with no pincode column can never match a pincode search.
        return mapped_value(mapping, row, "pincode")
            .is_some_and(|value| value.contains(pincode));
    }

    let state_matches = match query.state.as_deref().map(str::trim) {
        Some(state) if !state.is_empty() => mapped_value(mapping, row, "state")
            .is_some_and(|value| value.eq_ignore_ascii_case(state)),
        _ => true,
    };
    let city_matches = match query.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => mapped_value(mapping, row, "city")
            .is_some_and(|value| value.eq_ignore_ascii_case(city)),
        _ => true,
    };
    state_matches && city_matches
}

fn remap_row(mapping: &HospitalTableMapping, row: &HospitalRow) -> HospitalRecord {
    HospitalRecord {
        name: mapped_value(mapping, row, "hospital_name"),
        address_line1: mapped_value(mapping, row, "address_line_1"),
        address_line2: mapped_value(mapping, row, "address_line_2"),
        city: mapped_value(mapping, row, "city"),
        state: mapped_value(mapping, row, "state"),
        pincode: mapped_value(mapping, row, "pincode"),
        phone: mapped_value(mapping, row, "phone"),
        email: mapped_value(mapping, row, "email"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpabridge_core::ProviderId;

    fn row(pairs: &[(&str, &str)]) -> HospitalRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Horizon-shaped table: columns Name,address,city,state,pincode and
    /// no phone column at all.
    fn horizon_profile() -> ProviderProfile {
        let mut profile = ProviderProfile::new(5u16, "Horizon General Insurance");
        profile.hospital_table = Some(HospitalTableMapping {
            table: "horizon_ppn".into(),
            policy_column: None,
            columns: [
                ("hospital_name", "Name"),
                ("address_line_1", "address"),
                ("city", "city"),
                ("state", "state"),
                ("pincode", "pincode"),
            ]
            .iter()
            .map(|(f, c)| (f.to_string(), c.to_string()))
            .collect(),
        });
        profile
    }

    fn horizon_rows() -> Vec<HospitalRow> {
        vec![
            row(&[
                ("Name", "City Care Hospital"),
                ("address", "14 MG Road"),
                ("city", "Bengaluru"),
                ("state", "Karnataka"),
                ("pincode", "560001"),
            ]),
            row(&[
                ("Name", "Lakeview Clinic"),
                ("address", "2 Lake Road"),
                ("city", "Bengaluru"),
                ("state", "Karnataka"),
                ("pincode", "560034"),
            ]),
            row(&[
                ("Name", "Marine Hospital"),
                ("address", "7 Shore Lane"),
                ("city", "Mumbai"),
                ("state", "Maharashtra"),
                ("pincode", "400001"),
            ]),
        ]
    }

    fn directory() -> HospitalDirectory {
        HospitalDirectory::new(Arc::new(
            MemoryHospitalSource::new().with_table("horizon_ppn", horizon_rows()),
        ))
    }

    #[tokio::test]
    async fn test_pincode_search_projects_mapped_columns_only() {
        let records = directory()
            .search(
                &horizon_profile(),
                &HospitalQuery::by_pincode(ProviderId(5), "POL1", "560001"),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name.as_deref(), Some("City Care Hospital"));
        assert_eq!(record.address_line1.as_deref(), Some("14 MG Road"));
        // No phone column mapped: the canonical field stays absent.
        assert_eq!(record.phone, None);
        assert_eq!(record.address_line2, None);
        assert_eq!(record.email, None);
    }

    #[tokio::test]
    async fn test_pincode_is_substring_match() {
        let records = directory()
            .search(
                &horizon_profile(),
                &HospitalQuery::by_pincode(ProviderId(5), "POL1", "5600"),
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_state_city_search_is_equality() {
        let records = directory()
            .search(
                &horizon_profile(),
                &HospitalQuery::by_location(ProviderId(5), "POL1", "karnataka", "BENGALURU"),
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 2);

        let records = directory()
            .search(
                &horizon_profile(),
                &HospitalQuery::by_location(ProviderId(5), "POL1", "Karnataka", "Mysuru"),
            )
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_policy_column_scopes_rows() {
        let mut profile = horizon_profile();
        let mapping = profile.hospital_table.as_mut().unwrap();
        mapping.policy_column = Some("Policies".into());

        let rows = vec![
            row(&[
                ("Name", "Scoped Hospital"),
                ("state", "Karnataka"),
                ("city", "Bengaluru"),
                ("pincode", "560001"),
                ("Policies", "POL1,POL9"),
            ]),
            row(&[
                ("Name", "Other Policy Hospital"),
                ("state", "Karnataka"),
                ("city", "Bengaluru"),
                ("pincode", "560001"),
                ("Policies", "POL7"),
            ]),
            // No policy cell: never excluded by the policy filter.
            row(&[
                ("Name", "Open Hospital"),
                ("state", "Karnataka"),
                ("city", "Bengaluru"),
                ("pincode", "560002"),
            ]),
        ];
        let directory = HospitalDirectory::new(Arc::new(
            MemoryHospitalSource::new().with_table("horizon_ppn", rows),
        ));

        let records = directory
            .search(
                &profile,
                &HospitalQuery::by_pincode(ProviderId(5), "POL1", "5600"),
            )
            .await
            .unwrap();
        let names: Vec<_> = records.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Scoped Hospital", "Open Hospital"]);
    }

    #[tokio::test]
    async fn test_unknown_table_yields_no_rows() {
        let directory = HospitalDirectory::new(Arc::new(MemoryHospitalSource::new()));
        let records = directory
            .search(
                &horizon_profile(),
                &HospitalQuery::by_pincode(ProviderId(5), "POL1", "560001"),
            )
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_filterless_query_is_validation_error() {
        let query = HospitalQuery {
            provider_id: ProviderId(5),
            policy_id: "POL1".into(),
            pincode: None,
            state: None,
            city: None,
        };
        let err = directory()
            .search(&horizon_profile(), &query)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn test_facets_group_cities_by_state() {
        let facets = directory()
            .facets(&horizon_profile(), "POL1")
            .await
            .unwrap();
        let SearchFacets::StateCity { states } = facets else {
            panic!("expected state/city facets");
        };
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].state, "Karnataka");
        assert_eq!(states[0].cities, vec!["Bengaluru"]);
        assert_eq!(states[1].state, "Maharashtra");
        assert_eq!(states[1].cities, vec!["Mumbai"]);
    }
}
