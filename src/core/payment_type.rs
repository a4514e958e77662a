//! Payment types, read-only through the API.

use crate::{
    entities::{PaymentType, payment_type},
    errors::{Error, Result},
    query::{ListQuery, Page, apply_sorts, paginate},
};
use sea_orm::{Condition, prelude::*};

/// Allowed `filter[...]` names
pub const FILTERS: &[&str] = &["uuid", "name"];

/// Lists payment types filtered by `uuid` (exact) and `name` (partial).
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown filters.
pub async fn list_payment_types(
    db: &DatabaseConnection,
    query: &ListQuery,
) -> Result<Page<payment_type::Model>> {
    query.allow_filters(FILTERS)?;
    query.allow_sorts(&[])?;

    let condition = Condition::all()
        .add_option(query.exact("uuid", payment_type::Column::Uuid))
        .add_option(query.partial("name", payment_type::Column::Name));
    let select = apply_sorts(
        PaymentType::find().filter(condition),
        query,
        &[],
        payment_type::Column::Id,
    );
    paginate(db, select, query.page()).await
}

/// Finds a payment type by uuid or fails with `Error::NotFound`.
pub async fn find_payment_type(db: &DatabaseConnection, uuid: &str) -> Result<payment_type::Model> {
    PaymentType::find()
        .filter(payment_type::Column::Uuid.eq(uuid))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("payment type", uuid))
}
