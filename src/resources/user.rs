//! User resource.

use crate::entities::user;
use serde::Serialize;

/// Public fields of a user. The API token is never included.
#[derive(Debug, Clone, Serialize)]
pub struct UserResource {
    /// User uuid
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Company the user works for
    pub company_uuid: Option<String>,
}

impl From<&user::Model> for UserResource {
    fn from(user: &user::Model) -> Self {
        Self {
            uuid: user.uuid.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            company_uuid: user.company_uuid.clone(),
        }
    }
}

/// Maps a loaded optional relation, keeping "not loaded" apart from "no row".
pub fn loaded(user: Option<&Option<user::Model>>) -> Option<Option<UserResource>> {
    user.map(|u| u.as_ref().map(UserResource::from))
}
