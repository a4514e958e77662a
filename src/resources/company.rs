//! Company resource, including the lookup lists the edit form needs.

use super::{LookupResource, TagResource, tags, timestamp, user::UserResource};
use crate::core::company::CompanyDetails;
use crate::entities::{company_status, company_type, team};
use serde::Serialize;

/// `{"uuid", "name"}` for a team
#[derive(Debug, Clone, Serialize)]
pub struct TeamResource {
    /// Team uuid
    pub uuid: String,
    /// Team name
    pub name: String,
}

impl From<&team::Model> for TeamResource {
    fn from(team: &team::Model) -> Self {
        Self {
            uuid: team.uuid.clone(),
            name: team.name.clone(),
        }
    }
}

impl From<&company_type::Model> for LookupResource {
    fn from(t: &company_type::Model) -> Self {
        Self::new(t.id, &t.name)
    }
}

impl From<&company_status::Model> for LookupResource {
    fn from(s: &company_status::Model) -> Self {
        Self::new(s.id, &s.name)
    }
}

/// JSON form of a company
#[derive(Debug, Clone, Serialize)]
pub struct CompanyResource {
    /// Numeric surrogate key
    pub id: i64,
    /// Public identifier used in routes
    pub uuid: String,
    /// Creation time
    pub created_at: String,
    /// Legacy status flag
    pub status: i32,
    /// Display name
    pub name: String,
    /// Street address
    pub address: Option<String>,
    /// Second address line
    pub address2: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub zip: Option<String>,
    /// Country
    pub country: Option<String>,
    /// Company website
    pub website: Option<String>,
    /// Free text notes
    pub notes: Option<String>,
    /// Logo path or URL
    pub logo: Option<String>,
    /// Users in the company, with `include=users`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<UserResource>>,
    /// Number of users
    pub members_count: u64,
    /// Teams, with `include=teams`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<TeamResource>>,
    /// Number of teams
    pub teams_count: u64,
    /// Applied tags
    pub tags: Vec<TagResource>,
    /// Administering user, with `include=admin`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<Option<UserResource>>,
    /// Every company type, for the edit form
    pub company_types: Vec<LookupResource>,
    /// This company's type
    pub company_type: Option<LookupResource>,
    /// This company's status
    pub company_status: Option<LookupResource>,
}

impl From<CompanyDetails> for CompanyResource {
    fn from(details: CompanyDetails) -> Self {
        let company = details.company;
        Self {
            id: company.id,
            uuid: company.uuid,
            created_at: timestamp(&company.created_at),
            status: company.status,
            name: company.name,
            address: company.address,
            address2: company.address2,
            city: company.city,
            state: company.state,
            zip: company.zip,
            country: company.country,
            website: company.website,
            notes: company.notes,
            logo: company.logo,
            members: details
                .members
                .map(|members| members.iter().map(UserResource::from).collect()),
            members_count: details.members_count,
            teams: details
                .teams
                .map(|teams| teams.iter().map(TeamResource::from).collect()),
            teams_count: details.teams_count,
            tags: tags(&details.tags),
            admin: details.admin.map(|a| a.as_ref().map(UserResource::from)),
            company_types: details
                .company_types
                .iter()
                .map(LookupResource::from)
                .collect(),
            company_type: details.company_type.as_ref().map(LookupResource::from),
            company_status: details.company_status.as_ref().map(LookupResource::from),
        }
    }
}

/// `meta` block of a single company response
#[derive(Debug, Clone, Serialize)]
pub struct CompanyMeta {
    /// Every company type
    pub types: Vec<LookupResource>,
    /// Every company status
    pub statuses: Vec<LookupResource>,
}

impl CompanyMeta {
    /// Meta built from the lookup rows.
    #[must_use]
    pub fn new(types: &[company_type::Model], statuses: &[company_status::Model]) -> Self {
        Self {
            types: types.iter().map(LookupResource::from).collect(),
            statuses: statuses.iter().map(LookupResource::from).collect(),
        }
    }
}
