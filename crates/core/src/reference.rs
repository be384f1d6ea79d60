//! Static lookup tables consulted by the forecast engines: category keywords,
//! category base prices, and city affordability multipliers.
//!
//! The built-in defaults cover the Indian live-events market. A TOML reference
//! file can replace them wholesale:
//!
//! ```toml
//! [categories.Concert]
//! base_price = 3500
//! keywords = ["Coldplay India: (India)"]
//!
//! [cities]
//! Mumbai = 1.30
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::category::ShowCategory;

/// Multiplier applied to cities missing from the table.
pub const DEFAULT_CITY_MULTIPLIER: f64 = 1.00;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub base_price: u64,
    pub keywords: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    categories: BTreeMap<ShowCategory, CategoryProfile>,
    #[serde(default)]
    cities: BTreeMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("could not read reference file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse reference file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("reference table validation failed: {0}")]
    Validation(String),
}

impl ReferenceTables {
    pub fn new(
        categories: BTreeMap<ShowCategory, CategoryProfile>,
        cities: BTreeMap<String, f64>,
    ) -> Result<Self, ReferenceError> {
        let tables = Self { categories, cities };
        tables.validate()?;
        Ok(tables)
    }

    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ReferenceError::ReadFile { path: path.to_path_buf(), source })?;
        let tables = toml::from_str::<ReferenceTables>(&raw)
            .map_err(|source| ReferenceError::ParseFile { path: path.to_path_buf(), source })?;
        tables.validate()?;

        tracing::info!(
            event_name = "reference.tables.loaded",
            path = %path.display(),
            categories = tables.categories.len(),
            cities = tables.cities.len(),
            "reference tables loaded from file"
        );
        Ok(tables)
    }

    /// Loads `path` when given, otherwise falls back to the built-in tables.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ReferenceError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn keywords(&self, category: &ShowCategory) -> Option<&BTreeSet<String>> {
        self.categories.get(category).map(|profile| &profile.keywords)
    }

    pub fn base_price(&self, category: &ShowCategory) -> Option<u64> {
        self.categories.get(category).map(|profile| profile.base_price)
    }

    /// Unknown cities are neutral rather than an error.
    pub fn city_multiplier(&self, city: &str) -> f64 {
        self.cities.get(city).copied().unwrap_or(DEFAULT_CITY_MULTIPLIER)
    }

    pub fn is_known_city(&self, city: &str) -> bool {
        self.cities.contains_key(city)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&ShowCategory, &CategoryProfile)> {
        self.categories.iter()
    }

    pub fn cities(&self) -> impl Iterator<Item = (&str, f64)> {
        self.cities.iter().map(|(city, multiplier)| (city.as_str(), *multiplier))
    }

    pub fn validate(&self) -> Result<(), ReferenceError> {
        if self.categories.is_empty() {
            return Err(ReferenceError::Validation(
                "at least one show category must be defined".to_string(),
            ));
        }

        for (category, profile) in &self.categories {
            if profile.base_price == 0 {
                return Err(ReferenceError::Validation(format!(
                    "categories.{category}.base_price must be greater than zero"
                )));
            }
            if profile.keywords.iter().all(|keyword| keyword.trim().is_empty()) {
                return Err(ReferenceError::Validation(format!(
                    "categories.{category}.keywords must contain at least one keyword"
                )));
            }
        }

        for (city, multiplier) in &self.cities {
            if !multiplier.is_finite() || *multiplier <= 0.0 {
                return Err(ReferenceError::Validation(format!(
                    "cities.{city} multiplier must be a finite number greater than zero"
                )));
            }
        }

        Ok(())
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        let categories = [
            (
                "Concert",
                3500,
                &[
                    "Music Festival India: (India)",
                    "Sunburn Festival: (India)",
                    "Lollapalooza India: (India)",
                    "Coldplay India: (India)",
                    "Diljit Dosanjh tour: (India)",
                    "Karan Aujla concert: (India)",
                ][..],
            ),
            (
                "Standup",
                1200,
                &[
                    "Stand up comedy near me: (India)",
                    "Comedy show tickets: (India)",
                    "Comedy club: (India)",
                    "Zakir Khan: (India)",
                    "Samay Raina: (India)",
                    "Abhishek Upmanyu: (India)",
                    "Anubhav Singh Bassi: (India)",
                ][..],
            ),
            ("Workshop", 800, &["Pottery workshop: (India)", "Painting workshop: (India)"][..]),
        ]
        .into_iter()
        .map(|(name, base_price, keywords)| {
            (
                ShowCategory::new(name),
                CategoryProfile {
                    base_price,
                    keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
                },
            )
        })
        .collect();

        let cities = [
            ("Mumbai", 1.30),
            ("Delhi", 1.25),
            ("Bengaluru", 1.20),
            ("Bangalore", 1.20),
            ("Gurgaon", 1.20),
            ("Gurugram", 1.20),
            ("Noida", 1.15),
            ("Hyderabad", 1.15),
            ("Pune", 1.15),
            ("Chennai", 1.10),
            ("Kolkata", 1.05),
            ("Ahmedabad", 1.00),
            ("Surat", 0.98),
            ("Jaipur", 0.98),
            ("Chandigarh", 1.05),
            ("Lucknow", 0.95),
            ("Indore", 0.95),
            ("Vadodara", 0.95),
            ("Bhopal", 0.92),
            ("Nagpur", 0.92),
            ("Coimbatore", 0.92),
            ("Visakhapatnam", 0.92),
            ("Patna", 0.85),
            ("Ranchi", 0.85),
            ("Raipur", 0.88),
            ("Guwahati", 0.88),
            ("Bhubaneswar", 0.90),
            ("Kanpur", 0.88),
            ("Varanasi", 0.88),
            ("Ludhiana", 0.90),
            ("Amritsar", 0.90),
            ("Jalandhar", 0.90),
        ]
        .into_iter()
        .map(|(city, multiplier)| (city.to_string(), multiplier))
        .collect();

        Self { categories, cities }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::fs;

    use tempfile::TempDir;

    use super::{CategoryProfile, ReferenceError, ReferenceTables, DEFAULT_CITY_MULTIPLIER};
    use crate::domain::category::ShowCategory;

    #[test]
    fn defaults_cover_three_categories_and_known_cities() {
        let tables = ReferenceTables::default();

        assert_eq!(tables.categories().count(), 3);
        assert_eq!(tables.base_price(&ShowCategory::from("Concert")), Some(3500));
        assert_eq!(tables.base_price(&ShowCategory::from("Standup")), Some(1200));
        assert_eq!(tables.base_price(&ShowCategory::from("Workshop")), Some(800));
        assert_eq!(tables.keywords(&ShowCategory::from("Standup")).map(BTreeSet::len), Some(7));
        assert_eq!(tables.city_multiplier("Mumbai"), 1.30);
        assert_eq!(tables.city_multiplier("Patna"), 0.85);
        assert_eq!(tables.cities().count(), 32);
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn unknown_cities_are_neutral() {
        let tables = ReferenceTables::default();

        for city in ["Atlantis", "mumbai", "MUMBAI", " Mumbai", ""] {
            assert_eq!(tables.city_multiplier(city), DEFAULT_CITY_MULTIPLIER, "city `{city}`");
            assert!(!tables.is_known_city(city));
        }
    }

    #[test]
    fn unknown_category_has_no_keywords_or_price() {
        let tables = ReferenceTables::default();
        let opera = ShowCategory::from("Opera");

        assert!(tables.keywords(&opera).is_none());
        assert!(tables.base_price(&opera).is_none());
    }

    #[test]
    fn reference_file_replaces_builtin_tables() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("reference.toml");
        fs::write(
            &path,
            r#"
[categories.Opera]
base_price = 5000
keywords = ["Opera tickets: (India)"]

[cities]
Mumbai = 1.5
"#,
        )
        .map_err(|err| err.to_string())?;

        let tables = ReferenceTables::load(&path).map_err(|err| err.to_string())?;

        assert_eq!(tables.base_price(&ShowCategory::from("Opera")), Some(5000));
        assert!(tables.base_price(&ShowCategory::from("Concert")).is_none());
        assert_eq!(tables.city_multiplier("Mumbai"), 1.5);
        assert_eq!(tables.city_multiplier("Delhi"), DEFAULT_CITY_MULTIPLIER);
        Ok(())
    }

    #[test]
    fn non_positive_multiplier_is_rejected() {
        let categories = BTreeMap::from([(
            ShowCategory::from("Concert"),
            CategoryProfile {
                base_price: 3500,
                keywords: BTreeSet::from(["Coldplay India: (India)".to_string()]),
            },
        )]);
        let cities = BTreeMap::from([("Nowhere".to_string(), 0.0)]);

        let error = ReferenceTables::new(categories, cities).err();

        assert!(matches!(
            error,
            Some(ReferenceError::Validation(ref message)) if message.contains("cities.Nowhere")
        ));
    }

    #[test]
    fn zero_base_price_is_rejected() {
        let categories = BTreeMap::from([(
            ShowCategory::from("Workshop"),
            CategoryProfile {
                base_price: 0,
                keywords: BTreeSet::from(["Pottery workshop: (India)".to_string()]),
            },
        )]);

        let error = ReferenceTables::new(categories, BTreeMap::new()).err();

        assert!(matches!(
            error,
            Some(ReferenceError::Validation(ref message)) if message.contains("base_price")
        ));
    }

    #[test]
    fn missing_reference_file_reports_path() {
        let error = ReferenceTables::load_or_default(Some("does-not-exist.toml".as_ref())).err();

        assert!(matches!(error, Some(ReferenceError::ReadFile { ref path, .. })
            if path.ends_with("does-not-exist.toml")));
    }
}
