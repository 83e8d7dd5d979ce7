//! Feature records and boundary validation.
//!
//! A [`FeatureRecord`] can only be obtained by validating a [`RawFeatures`]
//! value, so anything downstream of this module may assume every reading is
//! present, finite, and within its physical domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when loading feature files.
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Failed to read feature file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Categorical level of human activity near the assessed area
/// (campgrounds, power lines, roads).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum HumanActivity {
    Low,
    Medium,
    High,
}

impl HumanActivity {
    /// All levels, lowest first.
    pub fn all() -> [HumanActivity; 3] {
        [HumanActivity::Low, HumanActivity::Medium, HumanActivity::High]
    }

    /// Display label ("Low", "Medium", "High").
    pub fn label(self) -> &'static str {
        match self {
            HumanActivity::Low => "Low",
            HumanActivity::Medium => "Medium",
            HumanActivity::High => "High",
        }
    }
}

impl fmt::Display for HumanActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a string is not one of the three activity levels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown human activity level '{0}': expected Low, Medium or High")]
pub struct ParseActivityError(pub String);

impl FromStr for HumanActivity {
    type Err = ParseActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(HumanActivity::Low),
            "medium" => Ok(HumanActivity::Medium),
            "high" => Ok(HumanActivity::High),
            _ => Err(ParseActivityError(s.to_string())),
        }
    }
}

impl TryFrom<String> for HumanActivity {
    type Error = ParseActivityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The fields of a feature record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureField {
    Temperature,
    Humidity,
    WindSpeed,
    Precipitation,
    SoilMoisture,
    VegetationIndex,
    HumanActivity,
}

impl FeatureField {
    /// The six numeric readings, in form order.
    pub const NUMERIC: [FeatureField; 6] = [
        FeatureField::Temperature,
        FeatureField::Humidity,
        FeatureField::WindSpeed,
        FeatureField::Precipitation,
        FeatureField::SoilMoisture,
        FeatureField::VegetationIndex,
    ];

    /// Serialized key (camelCase).
    pub fn key(self) -> &'static str {
        match self {
            FeatureField::Temperature => "temperature",
            FeatureField::Humidity => "humidity",
            FeatureField::WindSpeed => "windSpeed",
            FeatureField::Precipitation => "precipitation",
            FeatureField::SoilMoisture => "soilMoisture",
            FeatureField::VegetationIndex => "vegetationIndex",
            FeatureField::HumanActivity => "humanActivity",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FeatureField::Temperature => "Temperature",
            FeatureField::Humidity => "Humidity",
            FeatureField::WindSpeed => "Wind Speed",
            FeatureField::Precipitation => "Precipitation",
            FeatureField::SoilMoisture => "Soil Moisture",
            FeatureField::VegetationIndex => "Vegetation Index",
            FeatureField::HumanActivity => "Human Activity Level",
        }
    }

    /// Measurement unit, `None` for the categorical field.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            FeatureField::Temperature => Some("°C"),
            FeatureField::Humidity | FeatureField::SoilMoisture => Some("%"),
            FeatureField::WindSpeed => Some("km/h"),
            FeatureField::Precipitation => Some("mm"),
            FeatureField::VegetationIndex => Some("NDVI"),
            FeatureField::HumanActivity => None,
        }
    }

    /// Inclusive domain of a numeric field.
    pub fn bounds(self) -> Option<(f64, f64)> {
        match self {
            FeatureField::Temperature => Some((-50.0, 60.0)),
            FeatureField::Humidity | FeatureField::SoilMoisture => Some((0.0, 100.0)),
            FeatureField::WindSpeed => Some((0.0, 200.0)),
            FeatureField::Precipitation => Some((0.0, 1000.0)),
            FeatureField::VegetationIndex => Some((-1.0, 1.0)),
            FeatureField::HumanActivity => None,
        }
    }

    fn range_message(self) -> &'static str {
        match self {
            FeatureField::Temperature => "Temperature must be between -50°C and 60°C.",
            FeatureField::Humidity => "Humidity must be between 0% and 100%.",
            FeatureField::WindSpeed => "Wind speed must be between 0 and 200 km/h.",
            FeatureField::Precipitation => "Precipitation must be between 0 and 1000 mm.",
            FeatureField::SoilMoisture => "Soil moisture must be between 0% and 100%.",
            FeatureField::VegetationIndex => "NDVI must be between -1.0 and 1.0.",
            FeatureField::HumanActivity => "Human activity must be Low, Medium or High.",
        }
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single rejected field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldViolation {
    #[error("{} is required.", .0.label())]
    Missing(FeatureField),

    #[error("{} must be a finite number.", .0.label())]
    NotFinite(FeatureField),

    #[error("{}", .field.range_message())]
    OutOfRange { field: FeatureField, value: f64 },
}

impl FieldViolation {
    /// The field this violation is about.
    pub fn field(&self) -> FeatureField {
        match self {
            FieldViolation::Missing(field) | FieldViolation::NotFinite(field) => *field,
            FieldViolation::OutOfRange { field, .. } => *field,
        }
    }
}

/// Every violation found in one submission.
///
/// Displays as the individual messages joined by spaces.
#[derive(Error, Debug, Clone, PartialEq, Default)]
#[error("{}", .violations.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "))]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// The rejected fields, in form order.
    pub fn fields(&self) -> Vec<FeatureField> {
        self.violations.iter().map(FieldViolation::field).collect()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}


/// Check one numeric reading against its domain.
///
/// This is the per-edit check; [`RawFeatures::validate`] runs it for every
/// field on submit.
pub fn validate_field(field: FeatureField, value: f64) -> Option<FieldViolation> {
    let (min, max) = field.bounds()?;

    if !value.is_finite() {
        return Some(FieldViolation::NotFinite(field));
    }
    if value < min || value > max {
        return Some(FieldViolation::OutOfRange { field, value });
    }
    None
}

/// User-entered values before validation.
///
/// Every field is optional so that partially filled files and command-line
/// overrides can be merged before the record is checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawFeatures {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub vegetation_index: Option<f64>,
    pub human_activity: Option<HumanActivity>,
}

impl RawFeatures {
    /// Parse raw features from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, FeatureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse raw features from JSON.
    pub fn from_json(json: &str) -> Result<Self, FeatureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load raw features from a file; `.json` files are read as JSON,
    /// everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Merge `overrides` on top of `self`; set fields in `overrides` win.
    pub fn overlay(self, overrides: RawFeatures) -> RawFeatures {
        RawFeatures {
            temperature: overrides.temperature.or(self.temperature),
            humidity: overrides.humidity.or(self.humidity),
            wind_speed: overrides.wind_speed.or(self.wind_speed),
            precipitation: overrides.precipitation.or(self.precipitation),
            soil_moisture: overrides.soil_moisture.or(self.soil_moisture),
            vegetation_index: overrides.vegetation_index.or(self.vegetation_index),
            human_activity: overrides.human_activity.or(self.human_activity),
        }
    }

    /// The entered value of a numeric field.
    pub fn get(&self, field: FeatureField) -> Option<f64> {
        match field {
            FeatureField::Temperature => self.temperature,
            FeatureField::Humidity => self.humidity,
            FeatureField::WindSpeed => self.wind_speed,
            FeatureField::Precipitation => self.precipitation,
            FeatureField::SoilMoisture => self.soil_moisture,
            FeatureField::VegetationIndex => self.vegetation_index,
            FeatureField::HumanActivity => None,
        }
    }

    /// Validate every field and build a [`FeatureRecord`].
    ///
    /// All violations are reported together, not just the first one.
    pub fn validate(&self) -> Result<FeatureRecord, ValidationErrors> {
        let mut violations = Vec::new();

        for field in FeatureField::NUMERIC {
            match self.get(field) {
                None => violations.push(FieldViolation::Missing(field)),
                Some(value) => violations.extend(validate_field(field, value)),
            }
        }
        if self.human_activity.is_none() {
            violations.push(FieldViolation::Missing(FeatureField::HumanActivity));
        }

        match (
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.precipitation,
            self.soil_moisture,
            self.vegetation_index,
            self.human_activity,
        ) {
            (
                Some(temperature),
                Some(humidity),
                Some(wind_speed),
                Some(precipitation),
                Some(soil_moisture),
                Some(vegetation_index),
                Some(human_activity),
            ) if violations.is_empty() => Ok(FeatureRecord {
                temperature,
                humidity,
                wind_speed,
                precipitation,
                soil_moisture,
                vegetation_index,
                human_activity,
            }),
            _ => Err(ValidationErrors { violations }),
        }
    }
}

impl From<&FeatureRecord> for RawFeatures {
    fn from(record: &FeatureRecord) -> Self {
        RawFeatures {
            temperature: Some(record.temperature),
            humidity: Some(record.humidity),
            wind_speed: Some(record.wind_speed),
            precipitation: Some(record.precipitation),
            soil_moisture: Some(record.soil_moisture),
            vegetation_index: Some(record.vegetation_index),
            human_activity: Some(record.human_activity),
        }
    }
}

/// One validated assessment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFeatures")]
pub struct FeatureRecord {
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    precipitation: f64,
    soil_moisture: f64,
    vegetation_index: f64,
    human_activity: HumanActivity,
}

impl FeatureRecord {
    /// Build and validate a record in one step.
    pub fn new(
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        precipitation: f64,
        soil_moisture: f64,
        vegetation_index: f64,
        human_activity: HumanActivity,
    ) -> Result<Self, ValidationErrors> {
        RawFeatures {
            temperature: Some(temperature),
            humidity: Some(humidity),
            wind_speed: Some(wind_speed),
            precipitation: Some(precipitation),
            soil_moisture: Some(soil_moisture),
            vegetation_index: Some(vegetation_index),
            human_activity: Some(human_activity),
        }
        .validate()
    }

    /// Air temperature in °C.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Relative humidity in %.
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    /// Wind speed in km/h.
    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    /// Precipitation over the last 7 days in mm.
    pub fn precipitation(&self) -> f64 {
        self.precipitation
    }

    /// Soil moisture in %.
    pub fn soil_moisture(&self) -> f64 {
        self.soil_moisture
    }

    /// Normalized Difference Vegetation Index.
    pub fn vegetation_index(&self) -> f64 {
        self.vegetation_index
    }

    pub fn human_activity(&self) -> HumanActivity {
        self.human_activity
    }

    /// Value of a numeric field (`None` for [`FeatureField::HumanActivity`]).
    pub fn value(&self, field: FeatureField) -> Option<f64> {
        match field {
            FeatureField::Temperature => Some(self.temperature),
            FeatureField::Humidity => Some(self.humidity),
            FeatureField::WindSpeed => Some(self.wind_speed),
            FeatureField::Precipitation => Some(self.precipitation),
            FeatureField::SoilMoisture => Some(self.soil_moisture),
            FeatureField::VegetationIndex => Some(self.vegetation_index),
            FeatureField::HumanActivity => None,
        }
    }

    /// Numeric readings paired with their field, in form order.
    pub fn numeric_values(&self) -> impl Iterator<Item = (FeatureField, f64)> + '_ {
        FeatureField::NUMERIC
            .into_iter()
            .filter_map(move |field| self.value(field).map(|v| (field, v)))
    }
}

impl Default for FeatureRecord {
    /// Mild late-spring conditions; the form's starting values.
    fn default() -> Self {
        Self {
            temperature: 25.0,
            humidity: 40.0,
            wind_speed: 15.0,
            precipitation: 5.0,
            soil_moisture: 30.0,
            vegetation_index: 0.6,
            human_activity: HumanActivity::Medium,
        }
    }
}

impl TryFrom<RawFeatures> for FeatureRecord {
    type Error = ValidationErrors;

    fn try_from(raw: RawFeatures) -> Result<Self, Self::Error> {
        raw.validate()
    }
}
