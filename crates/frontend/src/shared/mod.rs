pub mod api_utils;
pub mod grid;
pub mod icons;
pub mod list_utils;
pub mod notice;
pub mod picker;
