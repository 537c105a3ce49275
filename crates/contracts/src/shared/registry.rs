//! Static registry of the grid tables and their columns.
//!
//! The frontend builds grids and pickers from it, the backend builds SQL
//! statements and validates incoming rows against it.

use super::field::{FieldDescriptor, FieldKind};
use once_cell::sync::Lazy;
use thiserror::Error;

pub const CONTINENTS: &str = "continents";
pub const COUNTRIES: &str = "countries";
pub const REGIONS: &str = "regions";
pub const CITIES: &str = "cities";
pub const DISTRICTS: &str = "districts";

/// Registered tables with their ordered descriptors, in menu order.
static REGISTRY: Lazy<Vec<(&'static str, Vec<FieldDescriptor>)>> = Lazy::new(|| {
    vec![
        (
            CONTINENTS,
            vec![
                FieldDescriptor::text("name", "Name", 150).as_key(),
                FieldDescriptor::real("area_m2", "Area, m²", 120).required(),
                FieldDescriptor::control(),
            ],
        ),
        (
            COUNTRIES,
            vec![
                FieldDescriptor::text("name", "Name", 150).as_key(),
                FieldDescriptor::foreign_key(
                    "fg_continent_name",
                    "Continent",
                    150,
                    CONTINENTS,
                    "name",
                    false,
                ),
                FieldDescriptor::foreign_key(
                    "fg_capital_city_id",
                    "Capital city",
                    120,
                    CITIES,
                    "city_id",
                    true,
                ),
                FieldDescriptor::control(),
            ],
        ),
        (
            REGIONS,
            vec![
                FieldDescriptor::integer("region_id", "Id", 70).as_key(),
                FieldDescriptor::text("region_name", "Name", 150).required(),
                FieldDescriptor::foreign_key(
                    "fg_country_name",
                    "Country",
                    150,
                    COUNTRIES,
                    "name",
                    false,
                ),
                FieldDescriptor::integer("population", "Population", 110).required(),
                FieldDescriptor::real("area_m2", "Area, m²", 110).required(),
                FieldDescriptor::text("climate", "Climate", 110).required(),
                FieldDescriptor::foreign_key(
                    "fg_centre_city_id",
                    "Centre city",
                    110,
                    CITIES,
                    "city_id",
                    true,
                ),
                FieldDescriptor::control(),
            ],
        ),
        (
            CITIES,
            vec![
                FieldDescriptor::integer("city_id", "Id", 70).as_key(),
                FieldDescriptor::text("city_name", "Name", 150).required(),
                FieldDescriptor::foreign_key(
                    "fg_region_id",
                    "Region",
                    110,
                    REGIONS,
                    "region_id",
                    true,
                ),
                FieldDescriptor::control(),
            ],
        ),
        (
            DISTRICTS,
            vec![
                FieldDescriptor::integer("district_id", "Id", 70).as_key(),
                FieldDescriptor::text("district_name", "Name", 150).required(),
                FieldDescriptor::foreign_key("fg_city_id", "City", 110, CITIES, "city_id", true),
                FieldDescriptor::control(),
            ],
        ),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("table '{table}' has no key field")]
    MissingKey { table: &'static str },
    #[error("{table}.{field} references unregistered table '{target}'")]
    UnknownTargetTable {
        table: &'static str,
        field: &'static str,
        target: &'static str,
    },
    #[error("{table}.{field} references unknown column '{target}.{column}'")]
    UnknownTargetColumn {
        table: &'static str,
        field: &'static str,
        target: &'static str,
        column: &'static str,
    },
    #[error("{table}.{field} is a foreign key without a reference")]
    DanglingForeignKey {
        table: &'static str,
        field: &'static str,
    },
}

/// Names of all registered tables.
pub fn tables() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// Heading of a table: its name with the first letter capitalized.
pub fn table_title(table: &str) -> String {
    let mut chars = table.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Ordered descriptors of `table`, control column included.
pub fn fields(table: &str) -> Option<&'static [FieldDescriptor]> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, fields)| fields.as_slice())
}

pub fn find_field(table: &str, name: &str) -> Option<&'static FieldDescriptor> {
    fields(table)?
        .iter()
        .find(|f| !f.is_control() && f.name == name)
}

/// Descriptors that carry data (everything but the control column).
pub fn data_fields(table: &str) -> Vec<&'static FieldDescriptor> {
    fields(table)
        .map(|fs| fs.iter().filter(|f| !f.is_control()).collect())
        .unwrap_or_default()
}

pub fn key_fields(table: &str) -> Vec<&'static FieldDescriptor> {
    fields(table)
        .map(|fs| fs.iter().filter(|f| f.key).collect())
        .unwrap_or_default()
}

/// Resolves a table segment of a URL path. Anything after the first dot is
/// ignored, so `continents.tera` names `continents`.
pub fn resolve_table(segment: &str) -> Option<&'static str> {
    let name = segment.split('.').next()?;
    tables().find(|t| *t == name)
}

/// Checks that every table has a key and every foreign key points to a
/// registered table and column.
pub fn validate() -> Result<(), RegistryError> {
    for (table, fields) in REGISTRY.iter().map(|(t, f)| (*t, f)) {
        if !fields.iter().any(|f| f.key) {
            return Err(RegistryError::MissingKey { table });
        }
        for field in fields.iter() {
            if field.kind != FieldKind::ForeignKey {
                continue;
            }
            let fk = field.foreign_key.ok_or(RegistryError::DanglingForeignKey {
                table,
                field: field.name,
            })?;
            if self::fields(fk.table).is_none() {
                return Err(RegistryError::UnknownTargetTable {
                    table,
                    field: field.name,
                    target: fk.table,
                });
            }
            if find_field(fk.table, fk.column).is_none() {
                return Err(RegistryError::UnknownTargetColumn {
                    table,
                    field: field.name,
                    target: fk.table,
                    column: fk.column,
                });
            }
        }
    }
    Ok(())
}
