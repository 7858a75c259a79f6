//! Listing filters for the opportunity catalog.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional, AND-combined filters for `get_opportunities`.
///
/// Blank strings are treated the same as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpportunityFilter {
    /// Substring match on title or description.
    pub keyword: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Substring match on location.
    pub location: Option<String>,
    /// Exact commitment text.
    pub commitment: Option<String>,
    /// Exact owning organization.
    pub organization_id: Option<Uuid>,
}

impl OpportunityFilter {
    pub fn for_organization(organization_id: Uuid) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..Default::default()
        }
    }
}
