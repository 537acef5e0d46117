//! Pricing parameters for the cost pass.

use crate::rates::RateProvider;
use sheetnest_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Density of mild steel in g/cm³.
pub const STEEL_DENSITY: f64 = 7.85;

/// Which part of a sheet is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BillingMode {
    /// The sheet is cut off after the last row: `sheet_width * used_height`.
    #[default]
    CutToLength,
    /// The whole nominal sheet is charged.
    FullSheet,
}

/// Pricing inputs for [`crate::CostAllocator`].
///
/// With `price_per_kg > 0` the billed area is priced by mass; otherwise the
/// nominal `full_sheet_cost` is pro-rated by billed area. The two bases are
/// never mixed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostParams {
    /// Purchase price of one nominal sheet.
    pub full_sheet_cost: f64,

    /// Price per kilogram; 0 selects area-based pricing.
    pub price_per_kg: f64,

    /// Material thickness (mm).
    pub thickness_mm: f64,

    /// Material density (g/cm³).
    pub density_g_cm3: f64,

    /// Billing policy for partially used sheets.
    pub billing: BillingMode,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            full_sheet_cost: 0.0,
            price_per_kg: 0.0,
            thickness_mm: 1.0,
            density_g_cm3: STEEL_DENSITY,
            billing: BillingMode::CutToLength,
        }
    }
}

impl CostParams {
    /// Creates parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nominal sheet price.
    pub fn with_sheet_cost(mut self, cost: f64) -> Self {
        self.full_sheet_cost = cost;
        self
    }

    /// Sets the price per kilogram.
    pub fn with_price_per_kg(mut self, price: f64) -> Self {
        self.price_per_kg = price;
        self
    }

    /// Sets the material thickness.
    pub fn with_thickness(mut self, thickness_mm: f64) -> Self {
        self.thickness_mm = thickness_mm;
        self
    }

    /// Sets the material density.
    pub fn with_density(mut self, density_g_cm3: f64) -> Self {
        self.density_g_cm3 = density_g_cm3;
        self
    }

    /// Sets the billing policy.
    pub fn with_billing(mut self, billing: BillingMode) -> Self {
        self.billing = billing;
        self
    }

    /// Returns true if sheets are priced by mass.
    pub fn is_mass_based(&self) -> bool {
        self.price_per_kg > 0.0
    }

    /// Builds parameters from a rate lookup.
    pub fn from_rates<P: RateProvider + ?Sized>(
        provider: &P,
        material: &str,
        thickness_mm: f64,
    ) -> Result<Self> {
        let rate = provider.rate(material, thickness_mm).ok_or_else(|| {
            Error::MissingRate(format!("{} at {} mm", material, thickness_mm))
        })?;

        let params = Self {
            full_sheet_cost: rate.sheet_cost,
            price_per_kg: rate.price_per_kg,
            thickness_mm,
            density_g_cm3: rate.density_g_cm3,
            billing: BillingMode::default(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("full_sheet_cost", self.full_sheet_cost),
            ("price_per_kg", self.price_per_kg),
            ("thickness_mm", self.thickness_mm),
            ("density_g_cm3", self.density_g_cm3),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.thickness_mm <= 0.0 || self.density_g_cm3 <= 0.0 {
            return Err(Error::ConfigError(format!(
                "Thickness and density must be positive, got {} mm and {} g/cm³",
                self.thickness_mm, self.density_g_cm3
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{MaterialRate, RateTable};

    #[test]
    fn test_defaults() {
        let params = CostParams::default();
        assert!(params.validate().is_ok());
        assert!(!params.is_mass_based());
        assert_eq!(params.billing, BillingMode::CutToLength);
    }

    #[test]
    fn test_validation() {
        assert!(CostParams::new().with_sheet_cost(-1.0).validate().is_err());
        assert!(CostParams::new().with_price_per_kg(f64::NAN).validate().is_err());
        assert!(CostParams::new().with_thickness(0.0).validate().is_err());
        assert!(CostParams::new().with_density(0.0).validate().is_err());
    }

    #[test]
    fn test_from_rates() {
        let table = RateTable::new().with_rate(
            "S235",
            2.0,
            MaterialRate::new(320.0, 0.0, STEEL_DENSITY),
        );

        let params = CostParams::from_rates(&table, "S235", 2.0).unwrap();
        assert_eq!(params.full_sheet_cost, 320.0);
        assert_eq!(params.thickness_mm, 2.0);

        let missing = CostParams::from_rates(&table, "S235", 3.0);
        assert!(matches!(missing, Err(Error::MissingRate(_))));
    }
}
