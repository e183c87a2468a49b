use async_trait::async_trait;

use super::domain::{
    CompanyRecord, ExternalRating, LocalAuthorityRecord, OfficerList, SchoolRecord, Urn,
};

/// Failure raised by a data collaborator. `Ok(None)` is the not-found case, never an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Primary registry of school records.
#[async_trait]
pub trait SchoolRegistry: Send + Sync {
    async fn school_record(&self, urn: &Urn) -> Result<Option<SchoolRecord>, SourceError>;
}

/// Local-authority SEND metrics looked up by authority name.
#[async_trait]
pub trait LocalAuthorityDirectory: Send + Sync {
    async fn local_authority(
        &self,
        name: &str,
    ) -> Result<Option<LocalAuthorityRecord>, SourceError>;
}

/// Company profiles and officers from the pre-built registry cache.
#[async_trait]
pub trait CompanyProfiles: Send + Sync {
    async fn company_profile(&self, urn: &Urn) -> Result<Option<CompanyRecord>, SourceError>;
    async fn officers(&self, urn: &Urn) -> Result<Option<OfficerList>, SourceError>;
}

/// Published regulatory ratings from the establishments registry.
#[async_trait]
pub trait RatingRegistry: Send + Sync {
    async fn external_rating(&self, urn: &Urn) -> Result<Option<ExternalRating>, SourceError>;
}
