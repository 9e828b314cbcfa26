//! Pure training-metrics calculations.
//!
//! Every function here is deterministic, side-effect free and safe to call
//! from any number of concurrent callers. Numeric preconditions are checked
//! up front and reported as [`Error::OutOfRangeInput`]; nothing in this
//! module panics for inputs the error taxonomy covers.

use crate::types::{DistanceUnit, WeightUnit};
use crate::{Error, Result};

/// Kilograms to pounds conversion factor
pub const KG_TO_LB: f64 = 2.20462;

/// Kilometres to miles conversion factor
pub const KM_TO_MI: f64 = 0.621371;

/// Standard olympic bar weight in kilograms
pub const DEFAULT_BAR_WEIGHT_KG: f64 = 20.0;

/// Standard plate denominations in kilograms, heaviest first
pub const DEFAULT_PLATES_KG: [f64; 7] = [25.0, 20.0, 15.0, 10.0, 5.0, 2.5, 1.25];

/// Formula used to estimate a one-rep max from a sub-maximal set
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneRepMaxFormula {
    Epley,
    Brzycki,
}

/// Estimate a one-rep max from a set's weight and rep count.
///
/// Epley: `w * (1 + r/30)`. Brzycki: `w * 36 / (37 - r)`. Both formulas
/// degenerate to the identity at one rep, so a single is returned unchanged.
/// Brzycki is undefined at 37 reps and beyond (the denominator reaches
/// zero); that range is rejected rather than returning an infinite or
/// negative estimate.
pub fn estimate_one_rep_max(weight: f64, reps: u32, formula: OneRepMaxFormula) -> Result<f64> {
    if weight < 0.0 || !weight.is_finite() {
        return Err(Error::OutOfRangeInput(format!(
            "weight must be a non-negative number, got {weight}"
        )));
    }
    if reps == 0 {
        return Err(Error::OutOfRangeInput("reps must be at least 1".into()));
    }

    let estimate = match formula {
        OneRepMaxFormula::Epley => weight * (1.0 + reps as f64 / 30.0),
        OneRepMaxFormula::Brzycki => {
            if reps >= 37 {
                return Err(Error::OutOfRangeInput(format!(
                    "Brzycki formula is undefined for {reps} reps (max 36)"
                )));
            }
            weight * 36.0 / (37.0 - reps as f64)
        }
    };

    Ok(estimate)
}

/// Training volume for a number of identical sets: `weight * reps * sets`.
///
/// Zero whenever any factor is zero.
pub fn training_volume(weight: f64, reps: u32, sets: u32) -> f64 {
    weight * reps as f64 * sets as f64
}

/// Volume of a single set
pub fn set_volume(weight: f64, reps: u32) -> f64 {
    training_volume(weight, reps, 1)
}

/// Pace in seconds per kilometre
pub fn pace(distance_km: f64, duration_seconds: f64) -> Result<f64> {
    if distance_km <= 0.0 || !distance_km.is_finite() {
        return Err(Error::OutOfRangeInput(format!(
            "distance must be positive, got {distance_km}"
        )));
    }
    if duration_seconds < 0.0 || !duration_seconds.is_finite() {
        return Err(Error::OutOfRangeInput(format!(
            "duration must be non-negative, got {duration_seconds}"
        )));
    }

    Ok(duration_seconds / distance_km)
}

/// Convert a weight between kilograms and pounds; identity when units match
pub fn convert_weight(value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    match (from, to) {
        (WeightUnit::Kg, WeightUnit::Lb) => value * KG_TO_LB,
        (WeightUnit::Lb, WeightUnit::Kg) => value / KG_TO_LB,
        _ => value,
    }
}

/// Convert a distance between kilometres and miles; identity when units match
pub fn convert_distance(value: f64, from: DistanceUnit, to: DistanceUnit) -> f64 {
    match (from, to) {
        (DistanceUnit::Km, DistanceUnit::Mi) => value * KM_TO_MI,
        (DistanceUnit::Mi, DistanceUnit::Km) => value / KM_TO_MI,
        _ => value,
    }
}

/// A plate denomination and how many of it to load per side
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlateCount {
    pub plate_weight: f64,
    pub count: u32,
}

/// Greedy per-side plate loadout for a target barbell weight.
///
/// `per_side = (target - bar) / 2`; plates are taken largest-first, as many
/// of each denomination as fit. This is best-reachable-not-exceeding, not an
/// exact solver: a remainder smaller than the smallest plate is simply left
/// unloaded. Targets at or below the bar weight produce an empty loadout.
pub fn plate_loadout(target_weight: f64, bar_weight: f64, plates: &[f64]) -> Vec<PlateCount> {
    let per_side = (target_weight - bar_weight) / 2.0;
    if per_side <= 0.0 {
        return Vec::new();
    }

    let mut denominations: Vec<f64> = plates
        .iter()
        .copied()
        .filter(|p| *p > 0.0 && p.is_finite())
        .collect();
    denominations.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut remaining = per_side;
    let mut loadout = Vec::new();

    for plate in denominations {
        let count = (remaining / plate).floor() as u32;
        if count > 0 {
            loadout.push(PlateCount {
                plate_weight: plate,
                count,
            });
            remaining -= plate * count as f64;
        }
    }

    loadout
}
