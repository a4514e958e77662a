//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod company;
pub mod company_status;
pub mod company_tag;
pub mod company_type;
pub mod document;
pub mod document_template;
pub mod event;
pub mod event_store;
pub mod menu_item;
pub mod payment_type;
pub mod store;
pub mod store_status;
pub mod store_tag;
pub mod store_type;
pub mod tag;
pub mod team;
pub mod user;

// Re-export entity types under their table-facing names
pub use company::Entity as Company;
pub use company_status::Entity as CompanyStatus;
pub use company_tag::Entity as CompanyTag;
pub use company_type::Entity as CompanyType;
pub use document::Entity as Document;
pub use document_template::Entity as DocumentTemplate;
pub use event::Entity as Event;
pub use event_store::Entity as EventStore;
pub use menu_item::Entity as MenuItem;
pub use payment_type::Entity as PaymentType;
pub use store::Entity as Store;
pub use store_status::Entity as StoreStatus;
pub use store_tag::Entity as StoreTag;
pub use store_type::Entity as StoreType;
pub use tag::Entity as Tag;
pub use team::Entity as Team;
pub use user::Entity as User;
