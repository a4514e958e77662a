//! User lookups used by authentication and by `exists` rules.

use crate::{
    entities::{User, user},
    errors::Result,
};
use sea_orm::prelude::*;

/// Finds the user holding `token`, used to authenticate API requests.
pub async fn get_user_by_token(db: &DatabaseConnection, token: &str) -> Result<Option<user::Model>> {
    if token.is_empty() {
        return Ok(None);
    }
    User::find()
        .filter(user::Column::ApiToken.eq(token))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by uuid.
pub async fn get_user_by_uuid(db: &DatabaseConnection, uuid: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Uuid.eq(uuid))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads the user referenced by an optional uuid column.
pub async fn get_optional_user(
    db: &DatabaseConnection,
    uuid: Option<&str>,
) -> Result<Option<user::Model>> {
    match uuid {
        Some(uuid) => get_user_by_uuid(db, uuid).await,
        None => Ok(None),
    }
}
