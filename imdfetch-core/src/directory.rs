//! In-memory city directory: the cached snapshot plus name and id lookups.

use crate::endpoints::Endpoints;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::{CityInfo, normalize_name};
use crate::parse;

/// Cached snapshot of the provider's city list.
///
/// Owned by exactly one client. A refresh replaces the snapshot wholesale in
/// a single assignment, so lookups never observe a partially-updated list.
#[derive(Debug, Default)]
pub struct CityDirectory {
    snapshot: Option<Vec<CityInfo>>,
}

impl CityDirectory {
    /// Returns the cached list, fetching and parsing a fresh copy first when
    /// the cache is empty or `refresh` is set.
    pub(crate) async fn load(
        &mut self,
        fetcher: &Fetcher,
        endpoints: &Endpoints,
        refresh: bool,
    ) -> Result<&[CityInfo]> {
        if self.snapshot.is_none() || refresh {
            let body = fetcher.get(endpoints.city_list_url()).await?;
            let cities = parse::parse_city_list(&body)?;
            tracing::debug!(count = cities.len(), "city directory refreshed");
            self.replace(cities);
        }
        Ok(self.cities())
    }

    /// Atomic swap of the whole snapshot.
    pub(crate) fn replace(&mut self, cities: Vec<CityInfo>) {
        self.snapshot = Some(cities);
    }

    /// Snapshot contents, empty if never loaded.
    pub fn cities(&self) -> &[CityInfo] {
        self.snapshot.as_deref().unwrap_or_default()
    }

    /// Case-insensitive matching against `clean_name`, in directory order.
    ///
    /// `exact_match` compares for equality, otherwise substring containment.
    /// An empty query yields an empty result, never the full list.
    pub fn find(&self, query: &str, exact_match: bool) -> Vec<&CityInfo> {
        let needle = normalize_name(query);
        if needle.is_empty() {
            return Vec::new();
        }
        self.cities()
            .iter()
            .filter(|city| {
                if exact_match {
                    city.clean_name == needle
                } else {
                    city.clean_name.contains(&needle)
                }
            })
            .collect()
    }

    /// Absence is a normal outcome, not an error.
    pub fn get_by_id(&self, city_id: u32) -> Option<&CityInfo> {
        self.cities().iter().find(|city| city.city_id == city_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> CityDirectory {
        let mut directory = CityDirectory::default();
        directory.replace(vec![
            CityInfo::new(12001, "Mumbai (Santacruz)", "12001MUM"),
            CityInfo::new(42182, "New Delhi", "42182"),
            CityInfo::new(43279, "Chennai (Nungambakkam)", "43279"),
            CityInfo::new(43280, "Chennai (Meenambakkam)", "43280"),
        ]);
        directory
    }

    #[test]
    fn find_mumbai_partial_returns_one_city() {
        let directory = seeded();
        let matches = directory.find("mumbai", false);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].city_id, 12001);
    }

    #[test]
    fn find_preserves_directory_order() {
        let directory = seeded();
        let matches = directory.find("chennai", false);
        let ids: Vec<u32> = matches.iter().map(|c| c.city_id).collect();
        assert_eq!(ids, vec![43279, 43280]);
    }

    #[test]
    fn exact_matches_are_a_subset_of_partial_matches() {
        let directory = seeded();
        for query in ["chennai", "chennai nungambakkam", "new delhi", "mumbai"] {
            let exact = directory.find(query, true);
            let partial = directory.find(query, false);
            for city in &exact {
                assert!(
                    partial.iter().any(|c| c.city_id == city.city_id),
                    "exact match for {query:?} missing from partial results"
                );
            }
        }
    }

    #[test]
    fn exact_match_requires_the_whole_name() {
        let directory = seeded();
        assert!(directory.find("chennai", true).is_empty());
        let matches = directory.find("Chennai (Nungambakkam)", true);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].city_id, 43279);
    }

    #[test]
    fn empty_query_yields_empty_result() {
        let directory = seeded();
        assert!(directory.find("", false).is_empty());
        assert!(directory.find("   ", false).is_empty());
    }

    #[test]
    fn get_by_id_absent_is_none() {
        let directory = seeded();
        assert_eq!(directory.get_by_id(42182).unwrap().display_name, "New Delhi");
        assert!(directory.get_by_id(99999).is_none());
    }

    #[test]
    fn unloaded_directory_is_empty() {
        let directory = CityDirectory::default();
        assert!(directory.cities().is_empty());
        assert!(directory.find("mumbai", false).is_empty());
        assert!(directory.get_by_id(12001).is_none());
    }
}
