//! Payment type resource.

use crate::entities::payment_type;
use serde::Serialize;

/// JSON form of a payment type
#[derive(Debug, Clone, Serialize)]
pub struct PaymentTypeResource {
    /// Numeric surrogate key
    pub id: i64,
    /// Public identifier used in routes
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Square tender type
    pub square_id: Option<String>,
}

impl From<payment_type::Model> for PaymentTypeResource {
    fn from(payment_type: payment_type::Model) -> Self {
        Self {
            id: payment_type.id,
            uuid: payment_type.uuid,
            name: payment_type.name,
            square_id: payment_type.square_id,
        }
    }
}
