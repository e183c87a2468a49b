//! Company registry access: the enrichment cache used during assessments and
//! the throttled relay that fronts the live registry API.

pub mod cache;
pub mod relay;
pub mod router;

pub use cache::{CachedCompany, CachedOfficer, CompanyCache};
pub use relay::{
    AllowList, Clock, FixedWindowThrottle, HttpUpstream, RegistryRelay, RegistryUpstream,
    RelayError, SystemClock, UpstreamResponse, PATH_PARAM,
};
pub use router::{relay_router, RELAY_CACHE_CONTROL};
