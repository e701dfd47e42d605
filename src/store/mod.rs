pub mod json_store;
pub mod profiles;
pub mod schema;
