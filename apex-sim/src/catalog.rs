use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::{PerformanceProfile, ProfileError};

const BUILTIN_GARAGE: &str = include_str!("../assets/garage.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog has no cars")]
    Empty,
    #[error("car `{car}` has invalid color `{value}`, expected #rrggbb")]
    InvalidColor { car: String, value: String },
    #[error("car `{car}` has an invalid profile: {source}")]
    InvalidProfile {
        car: String,
        #[source]
        source: ProfileError,
    },
}

/// sRGB paint color of a catalog car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CarColor {
    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub color: CarColor,
    pub top_speed_label: String,
    pub price_label: String,
    pub profile: PerformanceProfile,
}

/// On-disk shape of one `[[cars]]` table.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct CarRecord {
    name: String,
    color: String,
    #[serde(default)]
    top_speed_label: String,
    #[serde(default)]
    price_label: String,
    acceleration: f32,
    top_speed: f32,
    brake_force: f32,
    steering_rate: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct CatalogFile {
    #[serde(default)]
    cars: Vec<CarRecord>,
}

impl TryFrom<CarRecord> for CatalogEntry {
    type Error = CatalogError;

    fn try_from(record: CarRecord) -> Result<Self, Self::Error> {
        let Some(color) = CarColor::from_hex(&record.color) else {
            return Err(CatalogError::InvalidColor {
                car: record.name,
                value: record.color,
            });
        };
        let profile = PerformanceProfile::new(
            record.acceleration,
            record.top_speed,
            record.brake_force,
            record.steering_rate,
        )
        .map_err(|source| CatalogError::InvalidProfile {
            car: record.name.clone(),
            source,
        })?;
        Ok(Self {
            name: record.name,
            color,
            top_speed_label: record.top_speed_label,
            price_label: record.price_label,
            profile,
        })
    }
}

/// Ordered, validated, non-empty list of selectable cars.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The eight showcase cars bundled with the crate.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_GARAGE)
            .unwrap_or_else(|err| panic!("Bundled garage.toml is invalid: {err}"))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        let entries = file
            .cars
            .into_iter()
            .map(CatalogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), cars = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_eight_cars_led_by_the_demo_tuning() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 8);
        let first = catalog.get(0).unwrap();
        assert_eq!(first.name, "Bugatti Chiron Super Sport");
        assert_eq!(first.profile, PerformanceProfile::default());
        assert_eq!(first.color.to_hex(), "#e11d48");
        assert_eq!(catalog.position_by_name("Rimac Nevera"), Some(7));
        assert!(catalog.get(8).is_none());
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            CarColor::from_hex("#0a10FF"),
            Some(CarColor {
                r: 10,
                g: 16,
                b: 255
            })
        );
        assert_eq!(CarColor::from_hex("0a10ff").map(|c| c.b), Some(255));
        assert!(CarColor::from_hex("#0a10f").is_none());
        assert!(CarColor::from_hex("#zz0000").is_none());
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            Catalog::from_toml_str(""),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn rejects_bad_entries_by_name() {
        let text = r##"
[[cars]]
name = "Broken"
color = "#ffffff"
acceleration = 10.0
top_speed = -5.0
brake_force = 10.0
steering_rate = 1.0
"##;
        let err = Catalog::from_toml_str(text).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidProfile { ref car, .. } if car == "Broken"));

        let text = text.replace("-5.0", "5.0").replace("#ffffff", "white");
        let err = Catalog::from_toml_str(&text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "car `Broken` has invalid color `white`, expected #rrggbb"
        );
    }

    #[test]
    fn labels_are_optional() {
        let text = r##"
[[cars]]
name = "Plain"
color = "#101010"
acceleration = 10.0
top_speed = 40.0
brake_force = 10.0
steering_rate = 1.0
"##;
        let catalog = Catalog::from_toml_str(text).unwrap();
        assert_eq!(catalog.get(0).unwrap().price_label, "");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Catalog::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
