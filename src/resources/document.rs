//! Document resource.

use super::{
    optional_timestamp, timestamp,
    user::{UserResource, loaded},
};
use crate::core::document::{Assignee, DocumentDetails};
use crate::entities::{document, document_template};
use serde::Serialize;

/// The row a document is assigned to
#[derive(Debug, Clone, Serialize)]
pub struct AssignedResource {
    /// `store`, `company`, `event` or `user`
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Assignee uuid
    pub uuid: String,
    /// Assignee name
    pub name: String,
}

impl From<&Assignee> for AssignedResource {
    fn from(assignee: &Assignee) -> Self {
        let (kind, uuid, name) = match assignee {
            Assignee::Store(s) => ("store", &s.uuid, &s.name),
            Assignee::Company(c) => ("company", &c.uuid, &c.name),
            Assignee::Event(e) => ("event", &e.uuid, &e.name),
        };
        Self {
            kind,
            uuid: uuid.clone(),
            name: name.clone(),
        }
    }
}

/// JSON form of a document template
#[derive(Debug, Clone, Serialize)]
pub struct TemplateResource {
    /// Public identifier used in routes
    pub uuid: String,
    /// Template title
    pub title: String,
    /// Short description
    pub description: Option<String>,
    /// Template body
    pub content: Option<String>,
}

impl From<&document_template::Model> for TemplateResource {
    fn from(template: &document_template::Model) -> Self {
        Self {
            uuid: template.uuid.clone(),
            title: template.title.clone(),
            description: template.description.clone(),
            content: template.content.clone(),
        }
    }
}

/// JSON form of a document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResource {
    /// Public identifier used in routes
    pub uuid: String,
    /// Document title
    pub title: String,
    /// `DocumentType` discriminant
    pub type_id: i32,
    /// `DocumentStatus` discriminant
    pub status_id: i32,
    /// Instructions shown to the assignee
    pub description: String,
    /// Internal notes
    pub notes: Option<String>,
    /// When the document stops being valid
    pub expiration_at: Option<String>,
    /// When the document was accepted
    pub signed_at: Option<String>,
    /// Kind of assignee
    pub assigned_type: Option<String>,
    /// Assignee uuid
    pub assigned_uuid: Option<String>,
    /// Creating user
    pub created_by_uuid: Option<String>,
    /// Source template
    pub template_uuid: Option<String>,
    /// Event/store pivot
    pub event_store_uuid: Option<String>,
    /// Creation time
    pub created_at: String,
    /// Last modification time
    pub updated_at: String,
    /// Creating user, with `include=owner`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<UserResource>>,
    /// Assignee, with `include=assigned`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned: Option<Option<AssignedResource>>,
    /// Template, with `include=template`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Option<TemplateResource>>,
}

impl From<document::Model> for DocumentResource {
    fn from(document: document::Model) -> Self {
        Self::from(DocumentDetails {
            document,
            owner: None,
            assigned: None,
            template: None,
        })
    }
}

impl From<DocumentDetails> for DocumentResource {
    fn from(details: DocumentDetails) -> Self {
        let document = details.document;
        Self {
            uuid: document.uuid,
            title: document.title,
            type_id: document.type_id,
            status_id: document.status_id,
            description: document.description,
            notes: document.notes,
            expiration_at: optional_timestamp(document.expiration_at.as_ref()),
            signed_at: optional_timestamp(document.signed_at.as_ref()),
            assigned_type: document.assigned_type,
            assigned_uuid: document.assigned_uuid,
            created_by_uuid: document.created_by_uuid,
            template_uuid: document.template_uuid,
            event_store_uuid: document.event_store_uuid,
            created_at: timestamp(&document.created_at),
            updated_at: timestamp(&document.updated_at),
            owner: loaded(details.owner.as_ref()),
            assigned: details
                .assigned
                .map(|a| a.as_ref().map(AssignedResource::from)),
            template: details
                .template
                .map(|t| t.as_ref().map(TemplateResource::from)),
        }
    }
}
