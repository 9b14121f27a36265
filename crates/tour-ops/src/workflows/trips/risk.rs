//! Departure risk scoring.
//!
//! Pure computation: environmental and readiness inputs in, a 0-100 score with
//! an auditable component breakdown out. The caller persists the resulting
//! [`RiskAssessment`] snapshot; nothing here mutates trip state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wave heights beyond this are treated as sensor or entry errors.
pub const MAX_WAVE_HEIGHT_M: f32 = 30.0;
/// Wind speeds beyond this are treated as sensor or entry errors.
pub const MAX_WIND_SPEED_KMH: f32 = 250.0;

const SAFE_WAVE_HEIGHT_M: f32 = 0.5;
const SAFE_WIND_SPEED_KMH: f32 = 20.0;
const WAVE_POINTS_PER_METRE: f32 = 10.0;
const WIND_POINTS_PER_KMH: f32 = 0.5;
const WAVE_POINTS_CAP: u16 = 30;
const WIND_POINTS_CAP: u16 = 30;
const CREW_NOT_READY_POINTS: u16 = 15;
const EQUIPMENT_INCOMPLETE_POINTS: u16 = 10;

pub const DEFAULT_BLOCK_THRESHOLD: u8 = 70;

/// Forecast or observed weather condition at departure time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rainy,
    Stormy,
}

impl WeatherCondition {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Stormy => "stormy",
        }
    }

    const fn points(self) -> u16 {
        match self {
            Self::Clear => 0,
            Self::Cloudy => 10,
            Self::Rainy => 25,
            Self::Stormy => 50,
        }
    }
}

/// Optional departure-point coordinates captured with an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Inputs to the scorer. Absent numeric inputs contribute zero risk: unknown
/// conditions are scored as safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub wave_height_m: Option<f32>,
    pub wind_speed_kmh: Option<f32>,
    pub weather: Option<WeatherCondition>,
    pub crew_ready: bool,
    pub equipment_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsPoint>,
}

/// Rejected before any scoring happens; values are never silently clamped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskInputError {
    #[error("wave height {0} m is negative")]
    NegativeWaveHeight(f32),
    #[error("wave height {0} m exceeds the plausible maximum of {MAX_WAVE_HEIGHT_M} m")]
    ImplausibleWaveHeight(f32),
    #[error("wind speed {0} km/h is negative")]
    NegativeWindSpeed(f32),
    #[error("wind speed {0} km/h exceeds the plausible maximum of {MAX_WIND_SPEED_KMH} km/h")]
    ImplausibleWindSpeed(f32),
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

/// Factors permitted to contribute to the departure risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Weather,
    WaveHeight,
    WindSpeed,
    CrewReadiness,
    EquipmentReadiness,
}

/// Discrete contribution to a score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskComponent {
    pub factor: RiskFactor,
    pub points: u16,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Fixed partition of the 0-100 range.
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=24 => Self::Low,
            25..=49 => Self::Medium,
            50..=74 => Self::High,
            _ => Self::Critical,
        }
    }
}

/// Departure gate policy. The threshold is a hard block: a score strictly
/// above it forbids starting the trip regardless of other readiness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPolicy {
    pub block_threshold: u8,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            block_threshold: DEFAULT_BLOCK_THRESHOLD,
        }
    }
}

/// Scoring output: composite score, band, block decision, and the per-factor
/// breakdown that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: u8,
    pub level: RiskLevel,
    pub blocked: bool,
    pub components: Vec<RiskComponent>,
}

/// Immutable snapshot of one assessment. A trip accumulates these; only the
/// latest one gates departure, and gating re-scores from `inputs` rather than
/// trusting the stored `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub recorded_at: DateTime<Utc>,
    pub inputs: RiskInputs,
    pub score: RiskScore,
}

impl RiskAssessment {
    pub fn record(
        inputs: RiskInputs,
        policy: &RiskPolicy,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, RiskInputError> {
        let score = score(&inputs, policy)?;
        Ok(Self {
            recorded_at,
            inputs,
            score,
        })
    }
}

fn validate(inputs: &RiskInputs) -> Result<(), RiskInputError> {
    if let Some(height) = inputs.wave_height_m {
        if !height.is_finite() {
            return Err(RiskInputError::NonFinite("wave height"));
        }
        if height < 0.0 {
            return Err(RiskInputError::NegativeWaveHeight(height));
        }
        if height > MAX_WAVE_HEIGHT_M {
            return Err(RiskInputError::ImplausibleWaveHeight(height));
        }
    }

    if let Some(speed) = inputs.wind_speed_kmh {
        if !speed.is_finite() {
            return Err(RiskInputError::NonFinite("wind speed"));
        }
        if speed < 0.0 {
            return Err(RiskInputError::NegativeWindSpeed(speed));
        }
        if speed > MAX_WIND_SPEED_KMH {
            return Err(RiskInputError::ImplausibleWindSpeed(speed));
        }
    }

    Ok(())
}

fn excess_points(value: f32, safe_threshold: f32, per_unit: f32, cap: u16) -> u16 {
    let excess = value - safe_threshold;
    if excess <= 0.0 {
        return 0;
    }
    let points = (excess * per_unit).round() as u16;
    points.min(cap)
}

/// Score departure risk. Weighted contributions from each present factor are
/// summed and clamped to [0, 100]; `blocked` is `score > policy.block_threshold`
/// exactly.
pub fn score(inputs: &RiskInputs, policy: &RiskPolicy) -> Result<RiskScore, RiskInputError> {
    validate(inputs)?;

    let mut components = Vec::new();
    let mut total: u16 = 0;

    if let Some(weather) = inputs.weather {
        let points = weather.points();
        components.push(RiskComponent {
            factor: RiskFactor::Weather,
            points,
            notes: format!("{} conditions", weather.label()),
        });
        total += points;
    }

    if let Some(height) = inputs.wave_height_m {
        let points = excess_points(
            height,
            SAFE_WAVE_HEIGHT_M,
            WAVE_POINTS_PER_METRE,
            WAVE_POINTS_CAP,
        );
        let notes = if points == 0 {
            format!("wave height {height:.1} m within the {SAFE_WAVE_HEIGHT_M} m threshold")
        } else {
            format!("wave height {height:.1} m above the {SAFE_WAVE_HEIGHT_M} m threshold")
        };
        components.push(RiskComponent {
            factor: RiskFactor::WaveHeight,
            points,
            notes,
        });
        total += points;
    }

    if let Some(speed) = inputs.wind_speed_kmh {
        let points = excess_points(
            speed,
            SAFE_WIND_SPEED_KMH,
            WIND_POINTS_PER_KMH,
            WIND_POINTS_CAP,
        );
        let notes = if points == 0 {
            format!("wind speed {speed:.0} km/h within the {SAFE_WIND_SPEED_KMH} km/h threshold")
        } else {
            format!("wind speed {speed:.0} km/h above the {SAFE_WIND_SPEED_KMH} km/h threshold")
        };
        components.push(RiskComponent {
            factor: RiskFactor::WindSpeed,
            points,
            notes,
        });
        total += points;
    }

    let crew_points = if inputs.crew_ready {
        0
    } else {
        CREW_NOT_READY_POINTS
    };
    components.push(RiskComponent {
        factor: RiskFactor::CrewReadiness,
        points: crew_points,
        notes: if inputs.crew_ready {
            "crew confirmed ready".to_string()
        } else {
            "crew readiness not confirmed".to_string()
        },
    });
    total += crew_points;

    let equipment_points = if inputs.equipment_complete {
        0
    } else {
        EQUIPMENT_INCOMPLETE_POINTS
    };
    components.push(RiskComponent {
        factor: RiskFactor::EquipmentReadiness,
        points: equipment_points,
        notes: if inputs.equipment_complete {
            "equipment checks complete".to_string()
        } else {
            "equipment checks incomplete".to_string()
        },
    });
    total += equipment_points;

    let score = total.min(100) as u8;

    Ok(RiskScore {
        score,
        level: RiskLevel::from_score(score),
        blocked: score > policy.block_threshold,
        components,
    })
}
