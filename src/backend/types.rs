//! Request and response bodies of the chart / location backend

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the temporary chart calculation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub birth_date: String,
    pub birth_time: String,
    pub birth_location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl ChartRequest {
    /// Build a request, normalizing the birth time.
    ///
    /// A missing time is sent as `"unknown"`; `HH:MM` gains a seconds field.
    pub fn new(
        birth_date: impl Into<String>,
        birth_time: Option<&str>,
        place: &PlaceDetails,
    ) -> Self {
        Self {
            birth_date: birth_date.into(),
            birth_time: normalize_birth_time(birth_time),
            birth_location: place.formatted_address.clone(),
            latitude: place.geometry.lat,
            longitude: place.geometry.lng,
            timezone: place.timezone.clone(),
        }
    }
}

fn normalize_birth_time(time: Option<&str>) -> String {
    match time.map(str::trim).filter(|t| !t.is_empty()) {
        None => "unknown".to_string(),
        Some(t) if t.matches(':').count() == 1 => format!("{}:00", t),
        Some(t) => t.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemporaryChart {
    pub temporary_chart_id: String,
}

/// A calculated chart: scalar attributes plus its elements
#[derive(Debug, Clone, Deserialize)]
pub struct ChartDetails {
    #[serde(default)]
    pub elements: Vec<ChartElement>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ChartDetails {
    /// Attribute as text, e.g. `energy_type`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = &ChartElement> {
        self.elements.iter().filter(move |e| e.kind() == kind)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartElement {
    pub id: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// Element family, discriminated by id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Center,
    Channel,
    Gate,
    Other,
}

impl ChartElement {
    pub fn kind(&self) -> ElementKind {
        match self.id.split('_').next() {
            Some("center") => ElementKind::Center,
            Some("channel") => ElementKind::Channel,
            Some("gate") => ElementKind::Gate,
            _ => ElementKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredFormatting {
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePrediction {
    pub description: String,
    pub place_id: String,
    pub structured_formatting: StructuredFormatting,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesResponse {
    #[serde(default)]
    pub predictions: Vec<PlacePrediction>,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub geometry: Coordinates,
    pub formatted_address: String,
    pub timezone: String,
}
