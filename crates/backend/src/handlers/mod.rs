pub mod auth;
pub mod table_items;
