//! Hazard and safe point sources.
//!
//! Records arrive as loosely shaped JSON documents. They are validated here,
//! at the boundary, and handed to the engine only as typed [`Hazard`] and
//! [`SafePoint`] values.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::hazard::{Hazard, HazardCategory};

/// File holding hazard reports inside a data directory.
pub const HAZARDS_FILENAME: &str = "hazards.json";

/// Safe point collections and the category their records receive.
pub const SAFE_POINT_COLLECTIONS: [(&str, &str); 2] = [
    ("hospitals.json", "hospitals"),
    ("safe_points.json", "safe_points"),
];

/// Name given to safe points stored without one.
const UNNAMED: &str = "Unnamed";

/// A destination users can be routed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePoint {
    pub id: String,
    pub name: String,
    pub category: String,
    pub coordinate: Coordinate,
}

/// Supplies the hazards currently marked active.
pub trait HazardSource: Send + Sync {
    fn active_hazards(&self) -> Result<Vec<Hazard>>;
}

/// Supplies every known safe point.
pub trait SafePointSource: Send + Sync {
    fn safe_points(&self) -> Result<Vec<SafePoint>>;
}

/// Hazard document as stored by the reporting app.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HazardRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl HazardRecord {
    /// Whether the record is flagged active, either by `active` or by
    /// `status == "active"`.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or_else(|| {
            self.status
                .as_deref()
                .is_some_and(|status| status.eq_ignore_ascii_case("active"))
        })
    }

    /// Convert into a typed hazard. `fallback_id` is used when the record has
    /// no identifier of its own.
    pub fn into_hazard(self, fallback_id: impl Into<String>) -> Hazard {
        let active = self.is_active();
        let id = self.id.unwrap_or_else(|| fallback_id.into());
        let coordinate = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => match Coordinate::checked(lat, lng) {
                Ok(coordinate) => Some(coordinate),
                Err(error) => {
                    warn!(hazard = %id, %error, "hazard has an invalid position");
                    None
                }
            },
            _ => None,
        };

        Hazard {
            id,
            category: HazardCategory::parse(self.category.as_deref().unwrap_or_default()),
            active,
            coordinate,
        }
    }
}

/// Safe point document as stored in a collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SafePointRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl SafePointRecord {
    /// Convert into a typed safe point, or `None` when the record has no
    /// usable position.
    pub fn into_safe_point(self, category: &str, fallback_id: impl Into<String>) -> Option<SafePoint> {
        let id = self.id.unwrap_or_else(|| fallback_id.into());
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            warn!(point = %id, category, "safe point has no position, skipping");
            return None;
        };
        let coordinate = match Coordinate::checked(lat, lng) {
            Ok(coordinate) => coordinate,
            Err(error) => {
                warn!(point = %id, category, %error, "safe point has an invalid position, skipping");
                return None;
            }
        };

        Some(SafePoint {
            id,
            name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNNAMED.to_string()),
            category: category.to_string(),
            coordinate,
        })
    }
}

/// Reads hazards and safe points from JSON files in a data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read one collection file. A missing file is an empty collection.
    fn read_collection<T>(&self, filename: &str) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let path = self.dir.join(filename);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "collection file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(error) => return Err(upstream(&path, error.to_string())),
        };

        serde_json::from_str(&contents).map_err(|error| upstream(&path, error.to_string()))
    }
}

fn upstream(path: &Path, message: String) -> Error {
    Error::UpstreamUnavailable {
        source_name: path.display().to_string(),
        message,
    }
}

impl HazardSource for JsonStore {
    fn active_hazards(&self) -> Result<Vec<Hazard>> {
        let records: Vec<HazardRecord> = self.read_collection(HAZARDS_FILENAME)?;
        Ok(records
            .into_iter()
            .enumerate()
            .filter(|(_, record)| record.is_active())
            .map(|(index, record)| record.into_hazard(format!("hazard-{index}")))
            .collect())
    }
}

impl SafePointSource for JsonStore {
    fn safe_points(&self) -> Result<Vec<SafePoint>> {
        let mut points = Vec::new();
        for (filename, category) in SAFE_POINT_COLLECTIONS {
            let records: Vec<SafePointRecord> = self.read_collection(filename)?;
            points.extend(
                records
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, record)| {
                        record.into_safe_point(category, format!("{category}-{index}"))
                    }),
            );
        }
        Ok(points)
    }
}

/// In-process store, used by tests and embedders that already hold the data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub hazards: Vec<Hazard>,
    pub safe_points: Vec<SafePoint>,
}

impl MemoryStore {
    pub fn new(hazards: Vec<Hazard>, safe_points: Vec<SafePoint>) -> Self {
        Self {
            hazards,
            safe_points,
        }
    }
}

impl HazardSource for MemoryStore {
    fn active_hazards(&self) -> Result<Vec<Hazard>> {
        Ok(self
            .hazards
            .iter()
            .filter(|hazard| hazard.active)
            .cloned()
            .collect())
    }
}

impl SafePointSource for MemoryStore {
    fn safe_points(&self) -> Result<Vec<SafePoint>> {
        Ok(self.safe_points.clone())
    }
}
