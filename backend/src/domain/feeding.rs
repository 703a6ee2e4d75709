//! Feeding guidance: how much food a pet needs over two days and how much of
//! that has already been logged.
//!
//! The estimate starts from the resting energy requirement,
//! `RER = 70 * weight_kg^0.75`, scaled by a species activity factor and
//! converted to grams with the food's energy density.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::{CareEvent, Pet};

const RER_COEFFICIENT: f64 = 70.0;
const RER_EXPONENT: f64 = 0.75;
const CAT_ACTIVITY_FACTOR: f64 = 1.2;
const DOG_ACTIVITY_FACTOR: f64 = 1.6;
const DEFAULT_ACTIVITY_FACTOR: f64 = 1.2;
const LOGGING_WINDOW_HOURS: i64 = 48;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingGuidance {
    pub resting_energy_kcal: f64,
    pub daily_calories: f64,
    /// Energy density actually used: the pet's override or the profile default
    pub kcal_per_100g: f64,
    pub daily_grams: f64,
    pub two_day_target_grams: f64,
    /// Grams logged by feeding events in the last 48 hours
    pub logged_grams: f64,
    /// Target minus logged; negative when the pet was overfed
    pub remaining_grams: f64,
}

impl FeedingGuidance {
    /// Guidance for `pet`, or None when its weight is missing or not positive.
    ///
    /// `feeding_events` should be the pet's own events; non-feeding events and
    /// events older than 48 hours before `now` contribute nothing.
    pub fn calculate(
        pet: &Pet,
        feeding_events: &[CareEvent],
        default_kcal_per_100g: f64,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let weight_kg = pet.weight_kg.filter(|w| *w > 0.0)?;
        let kcal_per_100g = pet.food_kcal_per_100g.unwrap_or(default_kcal_per_100g);
        if !(kcal_per_100g > 0.0) {
            return None;
        }

        let resting_energy_kcal = resting_energy_requirement(weight_kg);
        let daily_calories = resting_energy_kcal * activity_factor(&pet.species);
        let daily_grams = daily_calories / (kcal_per_100g / 100.0);
        let two_day_target_grams = daily_grams * 2.0;

        let window_start = now - Duration::hours(LOGGING_WINDOW_HOURS);
        let logged_grams: f64 = feeding_events
            .iter()
            .filter(|event| event.date >= window_start)
            .filter_map(|event| event.food_grams())
            .sum();

        Some(Self {
            resting_energy_kcal,
            daily_calories,
            kcal_per_100g,
            daily_grams,
            two_day_target_grams,
            logged_grams,
            remaining_grams: two_day_target_grams - logged_grams,
        })
    }
}

pub fn resting_energy_requirement(weight_kg: f64) -> f64 {
    RER_COEFFICIENT * weight_kg.powf(RER_EXPONENT)
}

/// Maintenance multiplier by species name, case-insensitive
pub fn activity_factor(species: &str) -> f64 {
    match species.trim().to_lowercase().as_str() {
        "cat" => CAT_ACTIVITY_FACTOR,
        "dog" => DOG_ACTIVITY_FACTOR,
        _ => DEFAULT_ACTIVITY_FACTOR,
    }
}
