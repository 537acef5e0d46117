//! Material rate lookup.
//!
//! The cost pass never reaches for a global price cache; callers pass a
//! [`RateProvider`] and pin it in tests with a [`RateTable`].

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Prices for one material at one thickness.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterialRate {
    /// Purchase price of one nominal sheet.
    pub sheet_cost: f64,
    /// Price per kilogram; 0 selects area-based pricing.
    pub price_per_kg: f64,
    /// Density in g/cm³.
    pub density_g_cm3: f64,
}

impl MaterialRate {
    /// Creates a rate.
    pub fn new(sheet_cost: f64, price_per_kg: f64, density_g_cm3: f64) -> Self {
        Self {
            sheet_cost,
            price_per_kg,
            density_g_cm3,
        }
    }
}

/// Read-only (material, thickness) -> rate lookup.
pub trait RateProvider {
    /// Returns the rate for `material` at `thickness_mm`, if known.
    fn rate(&self, material: &str, thickness_mm: f64) -> Option<MaterialRate>;
}

/// In-memory rate table keyed by material name and thickness.
///
/// Thicknesses are matched to the micrometer.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<(String, u64), MaterialRate>,
}

fn thickness_key(thickness_mm: f64) -> u64 {
    (thickness_mm * 1000.0).round().max(0.0) as u64
}

impl RateTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a rate.
    pub fn insert(&mut self, material: impl Into<String>, thickness_mm: f64, rate: MaterialRate) {
        self.rates
            .insert((material.into(), thickness_key(thickness_mm)), rate);
    }

    /// Adds a rate, builder style.
    pub fn with_rate(
        mut self,
        material: impl Into<String>,
        thickness_mm: f64,
        rate: MaterialRate,
    ) -> Self {
        self.insert(material, thickness_mm, rate);
        self
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Returns the distinct material names, sorted.
    pub fn materials(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rates.keys().map(|(m, _)| m.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl RateProvider for RateTable {
    fn rate(&self, material: &str, thickness_mm: f64) -> Option<MaterialRate> {
        self.rates
            .get(&(material.to_string(), thickness_key(thickness_mm)))
            .copied()
    }
}
