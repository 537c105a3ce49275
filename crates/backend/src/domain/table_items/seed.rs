use super::repository;
use contracts::shared::registry::{CITIES, CONTINENTS, COUNTRIES, DISTRICTS, REGIONS};
use contracts::shared::row::Row;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// Inserts sample rows when every table is empty.
///
/// Countries and regions reference cities, which reference regions, so the
/// city references are filled in with updates once the cities exist.
pub async fn insert_sample_data(db: &DatabaseConnection) -> anyhow::Result<()> {
    if repository::count(db, CONTINENTS).await? > 0 {
        return Ok(());
    }
    tracing::info!("Inserting sample data");

    let continents = [("Europe", 10_180_000e6), ("Asia", 44_579_000e6)];
    for (name, area) in continents {
        repository::insert(db, CONTINENTS, &row(json!({"name": name, "area_m2": area}))).await?;
    }

    let countries = [("France", "Europe"), ("Germany", "Europe"), ("Japan", "Asia")];
    for (name, continent) in countries {
        repository::insert(
            db,
            COUNTRIES,
            &row(json!({"name": name, "fg_continent_name": continent})),
        )
        .await?;
    }

    let regions = [
        (1, "Ile-de-France", "France", 12_262_544, 12_012e6, "oceanic"),
        (2, "Bavaria", "Germany", 13_176_989, 70_550e6, "continental"),
        (3, "Kanto", "Japan", 43_513_000, 32_423e6, "humid subtropical"),
    ];
    for (id, name, country, population, area, climate) in regions {
        repository::insert(
            db,
            REGIONS,
            &row(json!({
                "region_id": id,
                "region_name": name,
                "fg_country_name": country,
                "population": population,
                "area_m2": area,
                "climate": climate,
            })),
        )
        .await?;
    }

    let cities = [(1, "Paris", 1), (2, "Munich", 2), (3, "Tokyo", 3), (4, "Berlin", 2)];
    for (id, name, region) in cities {
        repository::insert(
            db,
            CITIES,
            &row(json!({"city_id": id, "city_name": name, "fg_region_id": region})),
        )
        .await?;
    }

    let districts = [(1, "Montmartre", 1), (2, "Schwabing", 2), (3, "Shibuya", 3)];
    for (id, name, city) in districts {
        repository::insert(
            db,
            DISTRICTS,
            &row(json!({"district_id": id, "district_name": name, "fg_city_id": city})),
        )
        .await?;
    }

    for (country, continent, capital) in [
        ("France", "Europe", 1),
        ("Germany", "Europe", 4),
        ("Japan", "Asia", 3),
    ] {
        let old = row(json!({"name": country}));
        let new = row(json!({
            "name": country,
            "fg_continent_name": continent,
            "fg_capital_city_id": capital,
        }));
        repository::update(db, COUNTRIES, &old, &new).await?;
    }

    for (id, name, country, population, area, climate) in regions {
        let old = row(json!({"region_id": id}));
        let new = row(json!({
            "region_id": id,
            "region_name": name,
            "fg_country_name": country,
            "population": population,
            "area_m2": area,
            "climate": climate,
            "fg_centre_city_id": id,
        }));
        repository::update(db, REGIONS, &old, &new).await?;
    }

    Ok(())
}
