//! Company business logic - Suppliers, their members, teams and tags.

use crate::{
    core::{lookup, new_uuid, now, user},
    entities::{
        Company, CompanyTag, Tag, Team, User, company, company_status, company_tag, company_type,
        tag, team, user as user_entity,
    },
    errors::{Error, Result},
    query::{ListQuery, Page, apply_sorts, paginate},
    validation::Validator,
};
use sea_orm::{
    Condition, QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Query, SimpleExpr},
};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Default `companies.status` for new rows
pub const STATUS_ACTIVE: i32 = 1;

/// Body accepted by create and update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyInput {
    /// Display name, required on create
    pub name: Option<String>,
    /// Legacy status flag, defaults to active
    pub status: Option<i32>,
    /// `company_types` id
    pub company_type_id: Option<i32>,
    /// `company_statuses` id
    pub company_status_id: Option<i32>,
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
    /// Must be a URL
    pub website: Option<String>,
    /// Free text notes
    pub notes: Option<String>,
    /// Logo path or URL
    pub logo: Option<String>,
    /// User administering the company
    pub admin_uuid: Option<String>,
    /// Tag uuids to sync
    pub tags: Option<Vec<String>>,
}

/// Which relations to load alongside a company
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyIncludes {
    /// `users`
    pub users: bool,
    /// `teams`
    pub teams: bool,
    /// `admin`
    pub admin: bool,
}

impl CompanyIncludes {
    /// Reads the `include` list.
    #[must_use]
    pub fn from_query(query: &ListQuery) -> Self {
        Self {
            users: query.includes("users"),
            teams: query.includes("teams"),
            admin: query.includes("admin"),
        }
    }
}

/// A company with the data its resource always shows, plus the requested
/// relations.
#[derive(Debug, Clone)]
pub struct CompanyDetails {
    /// The company row
    pub company: company::Model,
    /// Users in the company
    pub members: Option<Vec<user_entity::Model>>,
    /// Number of users
    pub members_count: u64,
    /// Teams in the company
    pub teams: Option<Vec<team::Model>>,
    /// Number of teams
    pub teams_count: u64,
    /// Applied tags
    pub tags: Vec<tag::Model>,
    /// Administering user
    pub admin: Option<Option<user_entity::Model>>,
    /// Every company type
    pub company_types: Vec<company_type::Model>,
    /// This company's type
    pub company_type: Option<company_type::Model>,
    /// This company's status
    pub company_status: Option<company_status::Model>,
}

/// Allowed `filter[...]` names
pub const FILTERS: &[&str] = &["name", "uuid", "company_type_id", "company_status_id", "tag"];
/// Allowed `sort` fields
pub const SORTS: &[&str] = &["name", "created_at"];
/// Allowed `include` names
pub const INCLUDES: &[&str] = &["users", "teams", "admin"];

fn tag_condition(query: &ListQuery) -> Option<SimpleExpr> {
    let tags = query.filter_values("tag")?;
    Some(
        company::Column::Uuid.in_subquery(
            Query::select()
                .column(company_tag::Column::CompanyUuid)
                .from(CompanyTag)
                .and_where(company_tag::Column::TagUuid.is_in(tags))
                .to_owned(),
        ),
    )
}

/// Lists companies with the filters and sorts in `query`.
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown filters, sorts or includes.
pub async fn list_companies(
    db: &DatabaseConnection,
    query: &ListQuery,
) -> Result<Page<company::Model>> {
    query.allow_filters(FILTERS)?;
    query.allow_sorts(SORTS)?;
    query.allow_includes(INCLUDES)?;

    let condition = Condition::all()
        .add_option(query.partial("name", company::Column::Name))
        .add_option(query.exact("uuid", company::Column::Uuid))
        .add_option(query.exact_int("company_type_id", company::Column::CompanyTypeId)?)
        .add_option(query.exact_int("company_status_id", company::Column::CompanyStatusId)?)
        .add_option(tag_condition(query));

    let select = apply_sorts(
        Company::find().filter(condition),
        query,
        &[
            ("name", company::Column::Name),
            ("created_at", company::Column::CreatedAt),
        ],
        company::Column::Id,
    );
    paginate(db, select, query.page()).await
}

/// Finds a company by uuid.
pub async fn get_company_by_uuid(
    db: &DatabaseConnection,
    uuid: &str,
) -> Result<Option<company::Model>> {
    Company::find()
        .filter(company::Column::Uuid.eq(uuid))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a company by uuid or fails with `Error::NotFound`.
pub async fn find_company(db: &DatabaseConnection, uuid: &str) -> Result<company::Model> {
    get_company_by_uuid(db, uuid)
        .await?
        .ok_or_else(|| Error::not_found("company", uuid))
}

async fn tags_exist(db: &DatabaseConnection, tags: &[String]) -> Result<bool> {
    let wanted: BTreeSet<&str> = tags.iter().map(String::as_str).collect();
    if wanted.is_empty() {
        return Ok(true);
    }
    let found = Tag::find()
        .filter(tag::Column::Uuid.is_in(wanted.iter().copied()))
        .count(db)
        .await?;
    Ok(found == wanted.len() as u64)
}

async fn validate(db: &DatabaseConnection, input: &CompanyInput, creating: bool) -> Result<()> {
    let mut v = Validator::new();
    if creating || input.name.is_some() {
        v.required("name", input.name.as_deref());
    }
    v.url("website", input.website.as_deref());
    if let Some(admin_uuid) = input.admin_uuid.as_deref() {
        v.exists("admin_uuid", user::get_user_by_uuid(db, admin_uuid).await?.is_some());
    }
    if input.company_type_id.is_some() {
        let found = lookup::get_company_type(db, input.company_type_id).await?.is_some();
        v.exists("company_type_id", found);
    }
    if input.company_status_id.is_some() {
        let found = lookup::get_company_status(db, input.company_status_id).await?.is_some();
        v.exists("company_status_id", found);
    }
    if let Some(tags) = input.tags.as_deref() {
        v.exists("tags", tags_exist(db, tags).await?);
    }
    v.finish()
}

/// Replaces the tags of `company_uuid` with `tags`.
pub async fn sync_tags(db: &DatabaseConnection, company_uuid: &str, tags: &[String]) -> Result<()> {
    let unique: BTreeSet<&String> = tags.iter().collect();
    let txn = db.begin().await?;
    CompanyTag::delete_many()
        .filter(company_tag::Column::CompanyUuid.eq(company_uuid))
        .exec(&txn)
        .await?;
    for tag_uuid in &unique {
        company_tag::ActiveModel {
            company_uuid: Set(company_uuid.to_string()),
            tag_uuid: Set((*tag_uuid).clone()),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;
    debug!("Synced {} tags on company {}", unique.len(), company_uuid);
    Ok(())
}

/// Creates a company.
///
/// # Errors
/// Returns `Error::Validation` when the name is missing or a reference does
/// not exist.
pub async fn create_company(db: &DatabaseConnection, input: CompanyInput) -> Result<company::Model> {
    validate(db, &input, true).await?;

    let now = now();
    let company = company::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(input.name.unwrap_or_default()),
        status: Set(input.status.unwrap_or(STATUS_ACTIVE)),
        company_type_id: Set(input.company_type_id),
        company_status_id: Set(input.company_status_id),
        address: Set(input.address),
        address2: Set(input.address2),
        city: Set(input.city),
        state: Set(input.state),
        zip: Set(input.zip),
        country: Set(input.country),
        website: Set(input.website),
        notes: Set(input.notes),
        logo: Set(input.logo),
        admin_uuid: Set(input.admin_uuid),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if let Some(tags) = input.tags.as_deref() {
        sync_tags(db, &company.uuid, tags).await?;
    }
    info!("Created company '{}' ({})", company.name, company.uuid);
    Ok(company)
}

/// Applies the present fields of `input` to the company `uuid`.
///
/// # Errors
/// Returns `Error::NotFound` if the company does not exist and
/// `Error::Validation` for blank names or unknown references.
pub async fn update_company(
    db: &DatabaseConnection,
    uuid: &str,
    input: CompanyInput,
) -> Result<company::Model> {
    let existing = find_company(db, uuid).await?;
    validate(db, &input, false).await?;

    let mut company: company::ActiveModel = existing.into();
    if let Some(name) = input.name {
        company.name = Set(name);
    }
    if let Some(status) = input.status {
        company.status = Set(status);
    }
    macro_rules! set_present {
        ($($field:ident),*) => {
            $(if input.$field.is_some() {
                company.$field = Set(input.$field);
            })*
        };
    }
    set_present!(
        company_type_id,
        company_status_id,
        address,
        address2,
        city,
        state,
        zip,
        country,
        website,
        notes,
        logo,
        admin_uuid
    );
    company.updated_at = Set(now());
    let company = company.update(db).await?;

    if let Some(tags) = input.tags.as_deref() {
        sync_tags(db, &company.uuid, tags).await?;
    }
    Ok(company)
}

/// Deletes the company `uuid`. Members are detached, teams and tag links go
/// with it.
///
/// # Errors
/// Returns `Error::NotFound` if the company does not exist.
pub async fn delete_company(db: &DatabaseConnection, uuid: &str) -> Result<()> {
    let company = find_company(db, uuid).await?;
    let detached = User::update_many()
        .col_expr(user_entity::Column::CompanyUuid, Expr::value(Option::<String>::None))
        .filter(user_entity::Column::CompanyUuid.eq(uuid))
        .exec(db)
        .await?;
    company.delete(db).await?;
    info!(
        "Deleted company {} and detached {} members",
        uuid, detached.rows_affected
    );
    Ok(())
}

/// Loads what the company resource shows.
pub async fn load_details(
    db: &DatabaseConnection,
    company: company::Model,
    includes: CompanyIncludes,
) -> Result<CompanyDetails> {
    let members_query = User::find().filter(user_entity::Column::CompanyUuid.eq(company.uuid.as_str()));
    let members_count = members_query.clone().count(db).await?;
    let members = if includes.users {
        Some(members_query.order_by_asc(user_entity::Column::Id).all(db).await?)
    } else {
        None
    };

    let teams_count = company.find_related(Team).count(db).await?;
    let teams = if includes.teams {
        Some(
            company
                .find_related(Team)
                .order_by_asc(team::Column::Id)
                .all(db)
                .await?,
        )
    } else {
        None
    };

    let tags = company
        .find_related(Tag)
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?;
    let admin = if includes.admin {
        Some(user::get_optional_user(db, company.admin_uuid.as_deref()).await?)
    } else {
        None
    };

    Ok(CompanyDetails {
        members,
        members_count,
        teams,
        teams_count,
        tags,
        admin,
        company_types: lookup::get_company_types(db).await?,
        company_type: lookup::get_company_type(db, company.company_type_id).await?,
        company_status: lookup::get_company_status(db, company.company_status_id).await?,
        company,
    })
}

/// Loads a company for the detail page.
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown includes and `Error::NotFound`
/// if the company does not exist.
pub async fn show_company(
    db: &DatabaseConnection,
    uuid: &str,
    query: &ListQuery,
) -> Result<CompanyDetails> {
    query.allow_includes(INCLUDES)?;
    let company = find_company(db, uuid).await?;
    load_details(db, company, CompanyIncludes::from_query(query)).await
}
