pub mod table_items;
