//! Paged CRUD grid over a registered table.

pub mod component;
pub mod controller;
pub mod fk_field;
pub mod pager;
pub mod transport;

pub use component::DataGrid;
