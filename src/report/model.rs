use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a logged application. Only `Completed` rows are reportable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Completed,
    Voided,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Voided => "voided",
        }
    }
}

/// Weather observed at application time. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatedArea {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicatorRef {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub license_number: Option<String>,
    pub license_state: Option<String>,
}

/// One completed pesticide application, joined with its customer and applicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub applied_at: DateTime<Utc>,
    pub chemical_name: String,
    pub epa_reg_number: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub target_pest: Option<String>,
    pub method: Option<String>,
    pub area: Option<TreatedArea>,
    pub weather: Option<WeatherSnapshot>,
    pub reentry_interval: Option<String>,
    #[serde(default)]
    pub customer_consent: bool,
    pub customer: CustomerRef,
    pub applicator: ApplicatorRef,
}
