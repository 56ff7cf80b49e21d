//! Seed the reference catalog from a YAML file.
//!
//! Entries that already exist (same name, or same name and manufacturer for
//! finishes) are skipped, so the command can be rerun after editing the file.
//!
//! ```yaml
//! door_styles:
//!   - name: Shaker
//! manufacturers:
//!   - name: Acme
//! finishes:
//!   - name: White
//!     manufacturer: Acme
//!     sqft_price: "12.00"
//! glass_types:
//!   - name: Clear
//!     sqft_price: "25.00"
//!     sqft_minimum: "2"
//! ```

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use door_portal::db::PgCatalogStore;
use door_portal_core::catalog::{DoorStyleInput, FinishInput, GlassTypeInput, ManufacturerInput};
use door_portal_core::{Actor, CatalogError, CatalogService, CatalogStore};

/// Door style entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DoorStyleSeed {
    pub name: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

/// Manufacturer entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ManufacturerSeed {
    pub name: String,
}

/// Finish entry; the manufacturer is referenced by name.
#[derive(Debug, Clone, Deserialize)]
pub struct FinishSeed {
    pub name: String,
    pub manufacturer: String,
    pub sqft_price: Decimal,
}

/// Glass type entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GlassTypeSeed {
    pub name: String,
    pub sqft_price: Decimal,
    #[serde(default)]
    pub sqft_minimum: Decimal,
}

/// Contents of a catalog seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub door_styles: Vec<DoorStyleSeed>,
    #[serde(default)]
    pub manufacturers: Vec<ManufacturerSeed>,
    #[serde(default)]
    pub finishes: Vec<FinishSeed>,
    #[serde(default)]
    pub glass_types: Vec<GlassTypeSeed>,
}

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Problems that would make seeding fail, found before touching the database.
#[must_use]
pub fn validate_seed(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let manufacturers: Vec<&str> = seed.manufacturers.iter().map(|m| m.name.trim()).collect();

    for finish in &seed.finishes {
        if !manufacturers.contains(&finish.manufacturer.trim()) {
            errors.push(format!(
                "finish '{}' references unknown manufacturer '{}'",
                finish.name, finish.manufacturer
            ));
        }
        if finish.sqft_price.is_sign_negative() {
            errors.push(format!("finish '{}' has a negative price", finish.name));
        }
    }
    for glass in &seed.glass_types {
        if glass.sqft_price.is_sign_negative() || glass.sqft_minimum.is_sign_negative() {
            errors.push(format!("glass type '{}' has a negative rate", glass.name));
        }
    }
    errors
}

/// Count a write, treating a uniqueness conflict as "already present".
fn tally<T>(report: &mut SeedReport, result: Result<T, CatalogError>) -> Result<(), CatalogError> {
    match result {
        Ok(_) => report.inserted += 1,
        Err(CatalogError::Conflict(msg)) => {
            info!("  skipped: {msg}");
            report.skipped += 1;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Write the seed through the catalog service as the system actor.
///
/// # Errors
///
/// Returns the first validation or store error; conflicts are skipped.
pub async fn seed_catalog<C: CatalogStore>(
    store: &C,
    seed: &CatalogSeed,
) -> Result<SeedReport, CatalogError> {
    let service = CatalogService::new(store);
    let actor = Actor::system();
    let mut report = SeedReport::default();

    for style in &seed.door_styles {
        let input = DoorStyleInput {
            name: style.name.clone(),
            available: style.available,
        };
        tally(&mut report, service.create_door_style(&actor, &input).await)?;
    }

    for manufacturer in &seed.manufacturers {
        let input = ManufacturerInput {
            name: manufacturer.name.clone(),
        };
        tally(&mut report, service.create_manufacturer(&actor, &input).await)?;
    }

    let manufacturer_ids: HashMap<String, _> = service
        .manufacturers()
        .await?
        .into_iter()
        .map(|m| (m.name, m.id))
        .collect();

    for finish in &seed.finishes {
        let input = FinishInput {
            name: finish.name.clone(),
            manufacturer_id: manufacturer_ids.get(finish.manufacturer.trim()).copied(),
            sqft_price: finish.sqft_price,
        };
        tally(&mut report, service.create_finish(&actor, &input).await)?;
    }

    for glass in &seed.glass_types {
        let input = GlassTypeInput {
            name: glass.name.clone(),
            sqft_price: glass.sqft_price,
            sqft_minimum: glass.sqft_minimum,
        };
        tally(&mut report, service.create_glass_type(&actor, &input).await)?;
    }

    Ok(report)
}

/// Seed the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or the database rejects a write.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    let errors = validate_seed(&seed);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = super::connect().await?;
    let store = PgCatalogStore::new(pool);
    let report = seed_catalog(&store, &seed).await?;

    info!("Seeding complete!");
    info!("  Entries inserted: {}", report.inserted);
    info!("  Entries skipped (already exist): {}", report.skipped);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use door_portal_core::memory::MemoryCatalogStore;

    use super::*;

    const SAMPLE: &str = include_str!("../../data/catalog.yaml");

    #[test]
    fn test_sample_file_parses_and_validates() {
        let seed: CatalogSeed = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(!seed.door_styles.is_empty());
        assert!(!seed.finishes.is_empty());
        assert!(validate_seed(&seed).is_empty());
    }

    #[test]
    fn test_unknown_manufacturer_is_reported() {
        let seed: CatalogSeed = serde_yaml::from_str(
            r#"
finishes:
  - name: White
    manufacturer: Nobody
    sqft_price: "10"
"#,
        )
        .unwrap();
        let errors = validate_seed(&seed);
        assert_eq!(errors.len(), 1);
        assert!(errors.first().unwrap().contains("Nobody"));
    }

    #[tokio::test]
    async fn test_seeding_twice_skips_existing_entries() {
        let seed: CatalogSeed = serde_yaml::from_str(SAMPLE).unwrap();
        let total = seed.door_styles.len()
            + seed.manufacturers.len()
            + seed.finishes.len()
            + seed.glass_types.len();
        let store = MemoryCatalogStore::default();

        let first = seed_catalog(&store, &seed).await.unwrap();
        assert_eq!(first, SeedReport { inserted: total, skipped: 0 });

        let second = seed_catalog(&store, &seed).await.unwrap();
        assert_eq!(second, SeedReport { inserted: 0, skipped: total });

        let snapshot = store.list_finishes().await.unwrap();
        assert_eq!(snapshot.len(), seed.finishes.len());
    }
}
