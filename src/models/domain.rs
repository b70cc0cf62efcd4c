use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Relative cost level of a florist
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceTier {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Premium,
}

impl PriceTier {
    pub const ALL: [PriceTier; 3] = [PriceTier::Budget, PriceTier::Moderate, PriceTier::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTier::Budget => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Premium => "$$$",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "$" => Ok(PriceTier::Budget),
            "$$" => Ok(PriceTier::Moderate),
            "$$$" => Ok(PriceTier::Premium),
            other => Err(format!("unknown price tier '{}'", other)),
        }
    }
}

/// Top-selling arrangement listed on a florist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
}

/// Customer review shown on the detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user: String,
    pub rating: u8,
    pub comment: String,
}

/// Florist record as stored in the bundled dataset
///
/// `services` and `categories` are optional in the data file and default to
/// empty lists here, so the filter engine never deals with missing tags.
/// `distance` is only present once a search location is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Florist {
    pub id: u32,
    pub name: String,
    #[serde(flatten)]
    pub location: Coordinate,
    pub rating: f64,
    pub price_tier: PriceTier,
    pub image: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub top_sellers: Vec<Product>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Center and zoom level of the map shown next to the list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Unit used for the distances attached to florists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    const KM_PER_MILE: f64 = 1.609_344;

    /// Convert a kilometre distance into this unit
    #[inline]
    pub fn from_km(&self, km: f64) -> f64 {
        match self {
            DistanceUnit::Miles => km / Self::KM_PER_MILE,
            DistanceUnit::Kilometers => km,
        }
    }
}
