use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::workflows::assessment::domain::{CompanyRecord, Officer, OfficerList, Urn};
use crate::workflows::assessment::sources::{CompanyProfiles, SourceError};

/// One enrichment-job entry, keyed by school URN in the cache file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CachedCompany {
    pub company_number: String,
    pub company_name: String,
    pub company_status: String,
    #[serde(alias = "type")]
    pub company_type: String,
    pub date_of_creation: String,
    pub has_charges: bool,
    pub has_insolvency_history: bool,
    pub registered_office: BTreeMap<String, Value>,
    pub sic_codes: Vec<String>,
    pub officers: Option<Vec<CachedOfficer>>,
    pub officers_total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CachedOfficer {
    pub name: String,
    pub role: String,
    pub appointed: String,
    pub resigned: String,
}

impl CachedCompany {
    pub fn profile(&self) -> CompanyRecord {
        CompanyRecord {
            company_name: self.company_name.clone(),
            company_number: self.company_number.clone(),
            company_status: self.company_status.clone(),
            company_type: self.company_type.clone(),
            date_of_creation: present(&self.date_of_creation),
            has_charges: self.has_charges,
            has_insolvency_history: self.has_insolvency_history,
            sic_codes: self.sic_codes.clone(),
            registered_office_address: self
                .registered_office
                .iter()
                .map(|(key, value)| {
                    let text = match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), text)
                })
                .collect(),
        }
    }

    pub fn officer_list(&self) -> Option<OfficerList> {
        let officers = self.officers.as_ref()?;
        Some(OfficerList {
            items: officers
                .iter()
                .map(|officer| Officer {
                    name: officer.name.clone(),
                    officer_role: officer.role.clone(),
                    appointed_on: present(&officer.appointed),
                    resigned_on: present(&officer.resigned),
                })
                .collect(),
            total_results: self.officers_total,
        })
    }
}

fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

type CacheEntries = HashMap<String, CachedCompany>;

/// Read-only company cache loaded from disk on first use and shared thereafter.
#[derive(Debug, Clone)]
pub struct CompanyCache {
    path: Option<PathBuf>,
    entries: Arc<OnceCell<CacheEntries>>,
}

impl CompanyCache {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: Arc::new(OnceCell::new()),
        }
    }

    pub fn from_entries(entries: CacheEntries) -> Self {
        Self {
            path: None,
            entries: Arc::new(OnceCell::new_with(Some(entries))),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries().await.is_empty()
    }

    pub async fn entry(&self, urn: &Urn) -> Option<&CachedCompany> {
        self.entries().await.get(urn.0.as_str())
    }

    async fn entries(&self) -> &CacheEntries {
        self.entries
            .get_or_init(|| async {
                match &self.path {
                    Some(path) => load_entries(path).await,
                    None => CacheEntries::new(),
                }
            })
            .await
    }
}

async fn load_entries(path: &Path) -> CacheEntries {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "company cache unavailable; continuing without it");
            return CacheEntries::new();
        }
    };

    match serde_json::from_slice::<CacheEntries>(&raw) {
        Ok(entries) => {
            info!(path = %path.display(), entries = entries.len(), "company cache loaded");
            entries
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "company cache malformed; continuing without it");
            CacheEntries::new()
        }
    }
}

#[async_trait]
impl CompanyProfiles for CompanyCache {
    async fn company_profile(&self, urn: &Urn) -> Result<Option<CompanyRecord>, SourceError> {
        Ok(self.entry(urn).await.map(CachedCompany::profile))
    }

    async fn officers(&self, urn: &Urn) -> Result<Option<OfficerList>, SourceError> {
        Ok(self.entry(urn).await.and_then(CachedCompany::officer_list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CACHE: &str = r#"{
        "140001": {
            "company_number": "07654321",
            "company_name": "Hillside Learning Ltd",
            "company_status": "active",
            "type": "ltd",
            "date_of_creation": "2011-06-01",
            "has_charges": true,
            "registered_office": {"locality": "Ashford", "postal_code": "TN24 8AA"},
            "sic_codes": ["85200"],
            "officers": [
                {"name": "DOE, Jane", "role": "director", "appointed": "2015-01-01", "resigned": ""}
            ],
            "officers_total": 4
        },
        "140002": {"company_name": "No Officers Ltd"}
    }"#;

    fn cache() -> CompanyCache {
        let entries: CacheEntries = serde_json::from_str(CACHE).expect("valid cache");
        CompanyCache::from_entries(entries)
    }

    #[tokio::test]
    async fn maps_cached_profile_fields() {
        let cache = cache();
        let profile = cache
            .company_profile(&Urn("140001".to_string()))
            .await
            .expect("lookup succeeds")
            .expect("cached");
        assert_eq!(profile.company_type, "ltd");
        assert_eq!(profile.date_of_creation.as_deref(), Some("2011-06-01"));
        assert!(profile.has_charges);
        assert_eq!(
            profile.registered_office_address.get("postal_code").map(String::as_str),
            Some("TN24 8AA")
        );
    }

    #[tokio::test]
    async fn officers_keep_cached_total_and_blank_dates_become_none() {
        let cache = cache();
        let officers = cache
            .officers(&Urn("140001".to_string()))
            .await
            .expect("lookup succeeds")
            .expect("cached");
        assert_eq!(officers.total_results, 4);
        assert_eq!(officers.items[0].officer_role, "director");
        assert_eq!(officers.items[0].resigned_on, None);

        let none = cache
            .officers(&Urn("140002".to_string()))
            .await
            .expect("lookup succeeds");
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn missing_file_behaves_as_empty_cache() {
        let cache = CompanyCache::from_path("/nonexistent/ch-cache.json");
        assert!(cache.is_empty().await);
        let profile = cache
            .company_profile(&Urn("140001".to_string()))
            .await
            .expect("absence is not an error");
        assert!(profile.is_none());
    }
}
