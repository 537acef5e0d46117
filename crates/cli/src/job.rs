//! JSON job and rate files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sheetnest_core::{NestingConfig, PartGeometry};
use sheetnest_costing::{BillingMode, CostParams, MaterialRate, RateTable, STEEL_DENSITY};
use std::fs;
use std::path::Path;

/// A nesting job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    /// Stock sheet size.
    pub sheet: SheetSpec,

    /// Gap between parts (mm).
    #[serde(default = "default_spacing")]
    pub spacing: f64,

    /// Clear border on every sheet edge (mm).
    #[serde(default)]
    pub margin: f64,

    /// Sheet cap.
    #[serde(default)]
    pub max_sheets: Option<usize>,

    /// Allow 90 degree rotation.
    #[serde(default)]
    pub allow_rotation: Option<bool>,

    /// Seed for shuffled attempts.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Parts to nest.
    pub parts: Vec<PartSpec>,

    /// Pricing for the cost pass (optional).
    #[serde(default)]
    pub pricing: Option<PricingSpec>,
}

/// Stock sheet size (mm).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SheetSpec {
    /// Sheet width.
    pub width: f64,
    /// Sheet height.
    pub height: f64,
}

/// One part line of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartSpec {
    /// Part name.
    pub name: String,

    /// Bounding-box width (mm).
    pub width: f64,

    /// Bounding-box height (mm).
    pub height: f64,

    /// Copies to nest.
    #[serde(default = "default_quantity")]
    pub quantity: usize,

    /// True area (mm²), if known.
    #[serde(default)]
    pub contour_area: Option<f64>,

    /// Weight (kg), if known.
    #[serde(default)]
    pub weight_kg: Option<f64>,

    /// Outer contour as [[x, y], ...].
    #[serde(default)]
    pub contour: Vec<[f64; 2]>,

    /// Inner cutouts.
    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,
}

/// Pricing section of a job.
///
/// Either inline prices, or a `material` looked up in a rates file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSpec {
    /// Material thickness (mm).
    pub thickness_mm: f64,

    /// Nominal sheet price.
    #[serde(default)]
    pub sheet_cost: f64,

    /// Price per kilogram; 0 selects area pricing.
    #[serde(default)]
    pub price_per_kg: f64,

    /// Density (g/cm³).
    #[serde(default = "default_density")]
    pub density_g_cm3: f64,

    /// Billing policy.
    #[serde(default)]
    pub billing: BillingMode,

    /// Material name for rate lookup.
    #[serde(default)]
    pub material: Option<String>,
}

/// A rates file: `{ "rates": [ ... ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesFile {
    /// Rate entries.
    pub rates: Vec<RateEntry>,
}

/// One (material, thickness) price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateEntry {
    /// Material name.
    pub material: String,
    /// Thickness (mm).
    pub thickness_mm: f64,
    /// Nominal sheet price.
    #[serde(default)]
    pub sheet_cost: f64,
    /// Price per kilogram.
    #[serde(default)]
    pub price_per_kg: f64,
    /// Density (g/cm³).
    #[serde(default = "default_density")]
    pub density_g_cm3: f64,
}

fn default_spacing() -> f64 {
    NestingConfig::default().spacing
}

fn default_quantity() -> usize {
    1
}

fn default_density() -> f64 {
    STEEL_DENSITY
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

impl JobFile {
    /// Loads a job from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Builds the nesting configuration.
    pub fn to_config(&self) -> NestingConfig {
        let mut config = NestingConfig::new()
            .with_sheet(self.sheet.width, self.sheet.height)
            .with_spacing(self.spacing)
            .with_margin(self.margin);
        if let Some(max_sheets) = self.max_sheets {
            config = config.with_max_sheets(max_sheets);
        }
        if let Some(allow) = self.allow_rotation {
            config = config.with_rotation(allow);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    /// Resolves cost parameters from the pricing section and an optional
    /// rates table. Returns None when the job has no pricing.
    pub fn cost_params(
        &self,
        rates: Option<&RateTable>,
        material: Option<&str>,
    ) -> Result<Option<CostParams>> {
        let Some(pricing) = &self.pricing else {
            if rates.is_some() {
                bail!("A rates file needs a pricing section with thickness_mm");
            }
            return Ok(None);
        };

        let material = material.or(pricing.material.as_deref());
        let params = match (rates, material) {
            (Some(table), Some(material)) => {
                CostParams::from_rates(table, material, pricing.thickness_mm)?
                    .with_billing(pricing.billing)
            }
            (Some(_), None) => bail!("A rates file needs --material or pricing.material"),
            (None, Some(material)) => {
                bail!("Material '{}' needs a rates file (--rates)", material)
            }
            (None, None) => {
                let params = CostParams::new()
                    .with_sheet_cost(pricing.sheet_cost)
                    .with_price_per_kg(pricing.price_per_kg)
                    .with_thickness(pricing.thickness_mm)
                    .with_density(pricing.density_g_cm3)
                    .with_billing(pricing.billing);
                params.validate()?;
                params
            }
        };
        Ok(Some(params))
    }
}

impl PartSpec {
    /// Converts to the ingestion type.
    pub fn to_geometry(&self) -> PartGeometry {
        let to_points = |ring: &[[f64; 2]]| ring.iter().map(|p| (p[0], p[1])).collect::<Vec<_>>();

        let mut geometry = PartGeometry::new(self.name.clone(), self.width, self.height)
            .with_contour(to_points(&self.contour));
        for hole in &self.holes {
            geometry = geometry.with_hole(to_points(hole));
        }
        if let Some(area) = self.contour_area {
            geometry = geometry.with_contour_area(area);
        }
        if let Some(weight) = self.weight_kg {
            geometry = geometry.with_weight(weight);
        }
        geometry
    }
}

impl RatesFile {
    /// Loads rates from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Builds the lookup table.
    pub fn to_table(&self) -> RateTable {
        let mut table = RateTable::new();
        for entry in &self.rates {
            table.insert(
                entry.material.clone(),
                entry.thickness_mm,
                MaterialRate::new(entry.sheet_cost, entry.price_per_kg, entry.density_g_cm3),
            );
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"{
        "sheet": { "width": 1000, "height": 500 },
        "margin": 10,
        "seed": 5,
        "parts": [
            { "name": "plate", "width": 200, "height": 100, "quantity": 3 },
            {
                "name": "ring", "width": 100, "height": 100,
                "contour": [[0, 0], [100, 0], [100, 100], [0, 100]],
                "holes": [[[25, 25], [75, 25], [75, 75], [25, 75]]],
                "weight_kg": 0.4
            }
        ],
        "pricing": { "thickness_mm": 2, "sheet_cost": 120 }
    }"#;

    fn job() -> JobFile {
        serde_json::from_str(JOB).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let job = job();
        assert_eq!(job.spacing, 5.0);
        assert_eq!(job.parts[0].quantity, 3);
        assert_eq!(job.parts[1].quantity, 1);
        assert!(job.parts[0].contour.is_empty());

        let config = job.to_config();
        assert_eq!(config.sheet_width, 1000.0);
        assert_eq!(config.margin, 10.0);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.max_sheets, 100);
    }

    #[test]
    fn test_part_geometry() {
        let geometry = job().parts[1].to_geometry();
        assert_eq!(geometry.contour.len(), 4);
        assert_eq!(geometry.holes.len(), 1);
        assert_eq!(geometry.weight_kg, Some(0.4));
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn test_inline_pricing() {
        let params = job().cost_params(None, None).unwrap().unwrap();
        assert_eq!(params.full_sheet_cost, 120.0);
        assert_eq!(params.thickness_mm, 2.0);
        assert_eq!(params.density_g_cm3, STEEL_DENSITY);
        assert_eq!(params.billing, BillingMode::CutToLength);
    }

    #[test]
    fn test_rate_lookup() {
        let rates: RatesFile = serde_json::from_str(
            r#"{ "rates": [ { "material": "S235", "thickness_mm": 2, "price_per_kg": 4.2 } ] }"#,
        )
        .unwrap();
        let table = rates.to_table();

        let params = job().cost_params(Some(&table), Some("S235")).unwrap().unwrap();
        assert_eq!(params.price_per_kg, 4.2);

        assert!(job().cost_params(Some(&table), None).is_err());
        assert!(job().cost_params(Some(&table), Some("S355")).is_err());
        assert!(job().cost_params(None, Some("S235")).is_err());
    }

    #[test]
    fn test_no_pricing() {
        let mut job = job();
        job.pricing = None;
        assert!(job.cost_params(None, None).unwrap().is_none());
        assert!(job.cost_params(Some(&RateTable::new()), None).is_err());
    }
}
