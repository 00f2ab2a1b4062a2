pub mod handlers;
pub mod schema_org;
