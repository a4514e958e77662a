//! Document business logic - Handles the document lifecycle.
//!
//! Documents are created, updated, listed and deleted like any other resource.
//! The only state transition is `accept`, which stamps `signed_at` and moves
//! the status to Approved. A document can be accepted once.

use crate::{
    core::{new_uuid, now, store, user},
    entities::{
        Company, Document, DocumentTemplate, Event, document, document_template, company, event,
        user as user_entity,
    },
    errors::{Error, Result},
    query::{ListQuery, Page, apply_sorts, paginate},
    validation::Validator,
};
use sea_orm::{Condition, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Workflow status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DocumentStatus {
    /// Waiting for the assignee
    Pending = 1,
    /// Signed and accepted
    Approved = 2,
    /// Refused by an admin
    Rejected = 3,
    /// Expiration date is close
    Expiring = 4,
    /// Past its expiration date
    Expired = 5,
}

/// How the document body is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DocumentType {
    /// Uploaded file the assignee downloads
    Downloadable = 1,
    /// Rendered from a document template
    FromTemplate = 2,
}

/// Body accepted by create and update. Every field is optional at the type
/// level; required fields are checked by [`create_document`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentInput {
    /// Required on create
    pub title: Option<String>,
    /// `DocumentType` discriminant
    pub type_id: Option<i32>,
    /// `DocumentStatus` discriminant
    pub status_id: Option<i32>,
    /// Instructions shown to the assignee
    pub description: Option<String>,
    /// Internal notes
    pub notes: Option<String>,
    /// Date string, see [`crate::query::parse_datetime`]
    pub expiration_at: Option<String>,
    /// Kind of row `assigned_uuid` points at
    pub assigned_type: Option<String>,
    /// Assigned store, company, event or user
    pub assigned_uuid: Option<String>,
    /// Template the document was made from
    pub template_uuid: Option<String>,
    /// Event/store pivot the document belongs to
    pub event_store_uuid: Option<String>,
}

/// The row a document is assigned to
#[derive(Debug, Clone, PartialEq)]
pub enum Assignee {
    /// A store in the fleet
    Store(crate::entities::store::Model),
    /// A supplier company
    Company(company::Model),
    /// An event
    Event(event::Model),
}

/// Which relations to load alongside a document
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentIncludes {
    /// `owner`
    pub owner: bool,
    /// `assigned`
    pub assigned: bool,
    /// `template`
    pub template: bool,
}

impl DocumentIncludes {
    /// Every relation.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            owner: true,
            assigned: true,
            template: true,
        }
    }
}

/// A document with its loaded relations. A `None` outer option means the
/// relation was not requested.
#[derive(Debug, Clone)]
pub struct DocumentDetails {
    /// The document row
    pub document: document::Model,
    /// Creating user
    pub owner: Option<Option<user_entity::Model>>,
    /// Assigned row
    pub assigned: Option<Option<Assignee>>,
    /// Source template
    pub template: Option<Option<document_template::Model>>,
}

const ASSIGNED_TYPES: [&str; 3] = ["store", "company", "event"];

/// Allowed `filter[...]` names for the document list
pub const FILTERS: &[&str] = &[
    "title",
    "type_id",
    "status_id",
    "assigned_uuid",
    "event_store_uuid",
    "expiration_from",
    "expiration_to",
    "signed_from",
    "signed_to",
];

/// Allowed `sort` names for the document list
pub const SORTS: &[&str] = &[
    "title",
    "type_id",
    "status_id",
    "created_at",
    "expiration_at",
    "created_by",
    "signed_at",
];

/// Lists documents with the filters and sorts in `query`.
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown filters or sorts, or a database error.
pub async fn list_documents(
    db: &DatabaseConnection,
    query: &ListQuery,
) -> Result<Page<document::Model>> {
    query.allow_filters(FILTERS)?;
    query.allow_sorts(SORTS)?;

    let condition = Condition::all()
        .add_option(query.partial("title", document::Column::Title))
        .add_option(query.exact_int("type_id", document::Column::TypeId)?)
        .add_option(query.exact_int("status_id", document::Column::StatusId)?)
        .add_option(query.exact("assigned_uuid", document::Column::AssignedUuid))
        .add_option(query.exact("event_store_uuid", document::Column::EventStoreUuid))
        .add_option(query.date_from("expiration_from", document::Column::ExpirationAt)?)
        .add_option(query.date_to("expiration_to", document::Column::ExpirationAt)?)
        .add_option(query.date_from("signed_from", document::Column::SignedAt)?)
        .add_option(query.date_to("signed_to", document::Column::SignedAt)?);

    let select = apply_sorts(
        Document::find().filter(condition),
        query,
        &[
            ("title", document::Column::Title),
            ("type_id", document::Column::TypeId),
            ("status_id", document::Column::StatusId),
            ("created_at", document::Column::CreatedAt),
            ("expiration_at", document::Column::ExpirationAt),
            ("created_by", document::Column::CreatedByUuid),
            ("signed_at", document::Column::SignedAt),
        ],
        document::Column::Id,
    );

    paginate(db, select, query.page()).await
}

/// Finds a document by uuid.
pub async fn get_document_by_uuid(
    db: &DatabaseConnection,
    uuid: &str,
) -> Result<Option<document::Model>> {
    Document::find()
        .filter(document::Column::Uuid.eq(uuid))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a document by uuid or fails with `Error::NotFound`.
pub async fn find_document(db: &DatabaseConnection, uuid: &str) -> Result<document::Model> {
    get_document_by_uuid(db, uuid)
        .await?
        .ok_or_else(|| Error::not_found("document", uuid))
}

/// Unsaved document used to pre-fill the create form.
#[must_use]
pub fn new_document() -> document::Model {
    let now = now();
    document::Model {
        id: 0,
        uuid: String::new(),
        title: String::new(),
        type_id: DocumentType::Downloadable as i32,
        status_id: DocumentStatus::Pending as i32,
        description: String::new(),
        notes: None,
        expiration_at: None,
        signed_at: None,
        assigned_type: None,
        assigned_uuid: None,
        created_by_uuid: None,
        template_uuid: None,
        event_store_uuid: None,
        created_at: now,
        updated_at: now,
    }
}

async fn check_references(
    db: &DatabaseConnection,
    v: &mut Validator,
    input: &DocumentInput,
) -> Result<()> {
    if let Some(template_uuid) = input.template_uuid.as_deref() {
        let found = DocumentTemplate::find()
            .filter(document_template::Column::Uuid.eq(template_uuid))
            .one(db)
            .await?
            .is_some();
        v.exists("template_uuid", found);
    }
    if let Some(kind) = input.assigned_type.as_deref() {
        v.exists("assigned_type", ASSIGNED_TYPES.contains(&kind));
    }
    Ok(())
}

/// Creates a document owned by `created_by_uuid`.
///
/// # Errors
/// Returns `Error::Validation` if title, type, status or description is
/// missing, the expiration date is malformed, or a reference does not exist.
pub async fn create_document(
    db: &DatabaseConnection,
    input: DocumentInput,
    created_by_uuid: Option<String>,
) -> Result<document::Model> {
    let mut v = Validator::new();
    v.required("title", input.title.as_deref())
        .required_value("type_id", input.type_id.as_ref())
        .required_value("status_id", input.status_id.as_ref())
        .required("description", input.description.as_deref());
    let expiration_at = v.date("expiration_at", input.expiration_at.as_deref());
    check_references(db, &mut v, &input).await?;
    v.finish()?;

    let now = now();
    let document = document::ActiveModel {
        uuid: Set(new_uuid()),
        title: Set(input.title.unwrap_or_default()),
        type_id: Set(input.type_id.unwrap_or(DocumentType::Downloadable as i32)),
        status_id: Set(input.status_id.unwrap_or(DocumentStatus::Pending as i32)),
        description: Set(input.description.unwrap_or_default()),
        notes: Set(input.notes),
        expiration_at: Set(expiration_at),
        signed_at: Set(None),
        assigned_type: Set(input.assigned_type),
        assigned_uuid: Set(input.assigned_uuid),
        created_by_uuid: Set(created_by_uuid),
        template_uuid: Set(input.template_uuid),
        event_store_uuid: Set(input.event_store_uuid),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created document '{}' ({})", document.title, document.uuid);
    Ok(document)
}

/// Applies the present fields of `input` to the document `uuid`.
///
/// # Errors
/// Returns `Error::NotFound` if the document does not exist and
/// `Error::Validation` for malformed dates, blank strings or unknown templates.
pub async fn update_document(
    db: &DatabaseConnection,
    uuid: &str,
    input: DocumentInput,
) -> Result<document::Model> {
    let existing = find_document(db, uuid).await?;

    let mut v = Validator::new();
    if input.title.is_some() {
        v.required("title", input.title.as_deref());
    }
    if input.description.is_some() {
        v.required("description", input.description.as_deref());
    }
    let expiration_at = v.date("expiration_at", input.expiration_at.as_deref());
    check_references(db, &mut v, &input).await?;
    v.finish()?;

    let mut document: document::ActiveModel = existing.into();
    if let Some(title) = input.title {
        document.title = Set(title);
    }
    if let Some(type_id) = input.type_id {
        document.type_id = Set(type_id);
    }
    if let Some(status_id) = input.status_id {
        document.status_id = Set(status_id);
    }
    if let Some(description) = input.description {
        document.description = Set(description);
    }
    if input.notes.is_some() {
        document.notes = Set(input.notes);
    }
    if expiration_at.is_some() {
        document.expiration_at = Set(expiration_at);
    }
    if input.assigned_type.is_some() {
        document.assigned_type = Set(input.assigned_type);
    }
    if input.assigned_uuid.is_some() {
        document.assigned_uuid = Set(input.assigned_uuid);
    }
    if input.template_uuid.is_some() {
        document.template_uuid = Set(input.template_uuid);
    }
    if input.event_store_uuid.is_some() {
        document.event_store_uuid = Set(input.event_store_uuid);
    }
    document.updated_at = Set(now());

    document.update(db).await.map_err(Into::into)
}

/// Deletes the document `uuid`.
///
/// # Errors
/// Returns `Error::NotFound` if the document does not exist.
pub async fn delete_document(db: &DatabaseConnection, uuid: &str) -> Result<()> {
    let document = find_document(db, uuid).await?;
    document.delete(db).await?;
    info!("Deleted document {}", uuid);
    Ok(())
}

/// Signs the document: sets `signed_at` to now and the status to Approved.
///
/// # Errors
/// Returns `Error::NotFound` if the document does not exist and
/// `Error::AlreadySigned` if it was accepted before.
pub async fn accept_document(db: &DatabaseConnection, uuid: &str) -> Result<document::Model> {
    let existing = find_document(db, uuid).await?;
    if existing.signed_at.is_some() {
        return Err(Error::AlreadySigned {
            title: existing.title,
        });
    }

    let now = now();
    let mut document: document::ActiveModel = existing.into();
    document.signed_at = Set(Some(now));
    document.status_id = Set(DocumentStatus::Approved as i32);
    document.updated_at = Set(now);
    let document = document.update(db).await?;

    info!("Document '{}' ({}) accepted", document.title, document.uuid);
    Ok(document)
}

/// Resolves the polymorphic assignee of a document.
pub async fn get_assignee(
    db: &DatabaseConnection,
    document: &document::Model,
) -> Result<Option<Assignee>> {
    let (Some(kind), Some(uuid)) = (
        document.assigned_type.as_deref(),
        document.assigned_uuid.as_deref(),
    ) else {
        return Ok(None);
    };

    let assignee = match kind {
        "store" => store::get_store_by_uuid(db, uuid).await?.map(Assignee::Store),
        "company" => Company::find()
            .filter(company::Column::Uuid.eq(uuid))
            .one(db)
            .await?
            .map(Assignee::Company),
        "event" => Event::find()
            .filter(event::Column::Uuid.eq(uuid))
            .one(db)
            .await?
            .map(Assignee::Event),
        _ => None,
    };
    Ok(assignee)
}

/// Loads the requested relations of `document`.
pub async fn load_details(
    db: &DatabaseConnection,
    document: document::Model,
    includes: DocumentIncludes,
) -> Result<DocumentDetails> {
    let owner = if includes.owner {
        Some(user::get_optional_user(db, document.created_by_uuid.as_deref()).await?)
    } else {
        None
    };
    let assigned = if includes.assigned {
        Some(get_assignee(db, &document).await?)
    } else {
        None
    };
    let template = if includes.template {
        Some(document.find_related(DocumentTemplate).one(db).await?)
    } else {
        None
    };
    Ok(DocumentDetails {
        document,
        owner,
        assigned,
        template,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::PaginationConfig;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn list_query(pairs: &[(&str, &str)]) -> ListQuery {
        ListQuery::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            PaginationConfig::default(),
        )
    }

    fn input(title: &str) -> DocumentInput {
        DocumentInput {
            title: Some(title.to_string()),
            type_id: Some(DocumentType::Downloadable as i32),
            status_id: Some(DocumentStatus::Pending as i32),
            description: Some("Please sign".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_document_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_document(&db, DocumentInput::default(), None).await;
        let Err(Error::Validation { errors }) = result else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("type_id"));
        assert!(errors.contains_key("status_id"));
        assert!(errors.contains_key("description"));

        let mut bad_date = input("Lease");
        bad_date.expiration_at = Some("whenever".to_string());
        let result = create_document(&db, bad_date, None).await;
        assert!(matches!(result, Err(Error::Validation { errors: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_get_document_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Owner").await?;

        let mut payload = input("Health Permit");
        payload.expiration_at = Some("2021-06-30".to_string());
        let created = create_document(&db, payload, Some(user.uuid.clone())).await?;

        assert_eq!(created.title, "Health Permit");
        assert_eq!(created.created_by_uuid.as_deref(), Some(user.uuid.as_str()));
        assert!(created.signed_at.is_none());
        assert!(created.expiration_at.is_some());

        let fetched = find_document(&db, &created.uuid).await?;
        assert_eq!(fetched, created);

        let details = load_details(&db, fetched, DocumentIncludes::all()).await?;
        assert_eq!(details.owner.unwrap().unwrap().uuid, user.uuid);
        assert_eq!(details.template, Some(None));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_document_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let document = create_document(&db, input("Old"), None).await?;
        let template = create_test_template(&db, "Vendor Agreement").await?;

        let updated = update_document(
            &db,
            &document.uuid,
            DocumentInput {
                title: Some("New".to_string()),
                template_uuid: Some(template.uuid.clone()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, "Please sign");
        assert_eq!(updated.template_uuid.as_deref(), Some(template.uuid.as_str()));

        let missing_template = update_document(
            &db,
            &document.uuid,
            DocumentInput {
                template_uuid: Some("nope".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(missing_template, Err(Error::Validation { errors: _ })));

        let missing = update_document(&db, "nope", DocumentInput::default()).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_accept_document_once() -> Result<()> {
        let db = setup_test_db().await?;
        let document = create_document(&db, input("Contract"), None).await?;

        let accepted = accept_document(&db, &document.uuid).await?;
        assert!(accepted.signed_at.is_some());
        assert_eq!(accepted.status_id, DocumentStatus::Approved as i32);

        let again = accept_document(&db, &document.uuid).await;
        let Err(Error::AlreadySigned { title }) = again else {
            panic!("expected AlreadySigned");
        };
        assert_eq!(title, "Contract");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_document() -> Result<()> {
        let db = setup_test_db().await?;
        let document = create_document(&db, input("Temp"), None).await?;

        delete_document(&db, &document.uuid).await?;
        assert!(get_document_by_uuid(&db, &document.uuid).await?.is_none());
        assert!(matches!(
            delete_document(&db, &document.uuid).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_documents_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let mut a = input("Alpha lease");
        a.expiration_at = Some("2021-01-10".to_string());
        let a = create_document(&db, a, None).await?;
        let mut b = input("Beta permit");
        b.status_id = Some(DocumentStatus::Approved as i32);
        b.expiration_at = Some("2021-03-10".to_string());
        let b = create_document(&db, b, None).await?;

        let page = list_documents(&db, &list_query(&[("filter[title]", "lease")])).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].uuid, a.uuid);

        let page = list_documents(&db, &list_query(&[("filter[status_id]", "2")])).await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].uuid, b.uuid);

        let page = list_documents(
            &db,
            &list_query(&[
                ("filter[expiration_from]", "2021-02-01"),
                ("filter[expiration_to]", "2021-12-31"),
            ]),
        )
        .await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].uuid, b.uuid);

        let page = list_documents(&db, &list_query(&[("sort", "-title")])).await?;
        assert_eq!(page.items[0].uuid, b.uuid);
        assert_eq!(page.items[1].uuid, a.uuid);

        let unknown = list_documents(&db, &list_query(&[("filter[secret]", "x")])).await;
        assert!(matches!(unknown, Err(Error::InvalidQuery { message: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_documents_by_signed_range() -> Result<()> {
        let db = setup_test_db().await?;
        let signed = create_document(&db, input("Signed"), None).await?;
        create_document(&db, input("Unsigned"), None).await?;
        accept_document(&db, &signed.uuid).await?;

        let page = list_documents(&db, &list_query(&[("filter[signed_from]", "2000-01-01")])).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].uuid, signed.uuid);

        let page = list_documents(
            &db,
            &list_query(&[
                ("filter[signed_from]", "2000-01-01"),
                ("filter[signed_to]", "2999-12-31 23:59:59"),
            ]),
        )
        .await?;
        assert_eq!(page.total, 1);

        let page = list_documents(&db, &list_query(&[("filter[signed_to]", "2000-01-01")])).await?;
        assert_eq!(page.total, 0);

        let page = list_documents(&db, &list_query(&[("filter[signed_from]", "2999-01-01")])).await?;
        assert_eq!(page.total, 0);

        let bad = list_documents(&db, &list_query(&[("filter[signed_to]", "yesterday")])).await;
        assert!(matches!(bad, Err(Error::InvalidQuery { message: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_assignee_resolution() -> Result<()> {
        let db = setup_test_db().await?;
        let store = create_test_store(&db, "Taco Truck").await?;
        let mut payload = input("Store permit");
        payload.assigned_type = Some("store".to_string());
        payload.assigned_uuid = Some(store.uuid.clone());
        let document = create_document(&db, payload, None).await?;

        let assignee = get_assignee(&db, &document).await?;
        assert_eq!(assignee, Some(Assignee::Store(store)));

        let mut bad = input("Bad");
        bad.assigned_type = Some("planet".to_string());
        assert!(create_document(&db, bad, None).await.is_err());
        Ok(())
    }
}
