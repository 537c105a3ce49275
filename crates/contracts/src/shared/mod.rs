pub mod commit;
pub mod field;
pub mod registry;
pub mod row;
