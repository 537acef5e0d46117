//! Multi-sheet nesting driver.

use crate::layout;
use crate::optimizer::SingleSheetOptimizer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sheetnest_core::{
    Error, NestedPart, NestingConfig, NestingResult, PartGeometry, PartRecord, ProgressCallback,
    ProgressInfo, Result, SearchMode, SheetResult, UnplacedPart, UnplacedReason,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cloneable handle that stops a running nester from another thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Requests cancellation.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true if cancellation was requested.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Places queued parts across as many stock sheets as needed.
pub struct SheetNester {
    config: NestingConfig,
    parts: Vec<PartRecord>,
    cancelled: Arc<AtomicBool>,
}

impl SheetNester {
    /// Creates a new nester with the given configuration.
    pub fn new(config: NestingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            parts: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NestingConfig {
        &self.config
    }

    /// Queues `quantity` copies of a part.
    ///
    /// The geometry is validated once here; nothing is queued on error.
    pub fn add_part(&mut self, geometry: &PartGeometry, quantity: usize) -> Result<()> {
        if quantity == 0 {
            return Err(Error::ConfigError(format!(
                "Quantity of '{}' must be at least 1",
                geometry.name
            )));
        }

        let first_index = self.parts.len();
        let copies = (0..quantity)
            .map(|copy| {
                PartRecord::from_geometry(
                    geometry,
                    self.config.spacing,
                    first_index + copy,
                    copy,
                    quantity,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        self.parts.extend(copies);
        Ok(())
    }

    /// Returns the number of queued part instances.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Returns the queued part instances.
    pub fn parts(&self) -> &[PartRecord] {
        &self.parts
    }

    /// Removes every queued part.
    pub fn clear(&mut self) {
        self.parts.clear();
    }

    /// Requests cancellation of [`SheetNester::run_nesting`].
    ///
    /// A request made before a run starts cancels that run. The request is
    /// cleared when the run returns.
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns a handle that can stop this nester from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: self.cancelled.clone(),
        }
    }

    /// Nests every queued part.
    ///
    /// Always returns a well-formed result: parts that can never fit, parts
    /// left over when the sheet cap is reached and parts left over after
    /// [`SheetNester::stop`] are reported in `unplaced_parts`.
    pub fn run_nesting(
        &self,
        mode: SearchMode,
        progress: Option<&ProgressCallback>,
    ) -> NestingResult {
        let start = Instant::now();

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut result = NestingResult::new();
        result.seed = Some(seed);

        let total_items = self.parts.len();
        let bin_width = self.config.usable_width();
        let bin_height = self.config.usable_height();
        let margin = self.config.margin;

        log::info!(
            "Nesting {} parts on {} x {} sheets ({:?}, seed {})",
            total_items,
            self.config.sheet_width,
            self.config.sheet_height,
            mode,
            seed
        );

        let mut pool = self.parts.clone();
        pool.sort_by(|a, b| {
            b.area
                .total_cmp(&a.area)
                .then_with(|| a.part_index.cmp(&b.part_index))
        });

        let (mut remaining, too_large): (Vec<PartRecord>, Vec<PartRecord>) = pool
            .into_iter()
            .partition(|p| p.fits_within(bin_width, bin_height, self.config.allow_rotation));

        for part in too_large {
            log::warn!(
                "Part '{}' ({:.1} x {:.1}) fits no sheet orientation",
                part.name,
                part.width,
                part.height
            );
            let reason = UnplacedReason::TooLarge {
                part_width: part.width,
                part_height: part.height,
                sheet_width: bin_width,
                sheet_height: bin_height,
            };
            result.unplaced_parts.push(UnplacedPart::new(part, reason));
        }

        let optimizer = SingleSheetOptimizer::new(&self.config, self.cancelled.clone());

        while !remaining.is_empty() && result.sheets.len() < self.config.max_sheets {
            if self.cancelled.load(Ordering::Relaxed) {
                break;
            }

            let search = optimizer.optimize(&remaining, mode, &mut rng);
            result.attempts += search.attempts;

            let Some(best) = search.best else {
                break;
            };
            if best.placements.is_empty() {
                log::warn!(
                    "No part placed on sheet {}; stopping with {} parts left",
                    result.sheets.len() + 1,
                    remaining.len()
                );
                break;
            }

            let sheet_index = result.sheets.len();
            let placed_parts: Vec<NestedPart> = best
                .placements
                .iter()
                .map(|item| {
                    NestedPart::new(
                        remaining[item.index].clone(),
                        item.x + margin,
                        item.y + margin,
                        item.rotation,
                        sheet_index,
                    )
                })
                .collect();
            let sheet = SheetResult::from_placements(
                sheet_index,
                self.config.sheet_width,
                self.config.sheet_height,
                placed_parts,
            );

            let report = layout::validate_sheet(&sheet);
            if !report.is_valid() {
                log::error!(
                    "Sheet {} layout invalid: {} overlaps, {} out of bounds",
                    sheet_index + 1,
                    report.overlaps.len(),
                    report.out_of_bounds.len()
                );
            }

            log::info!(
                "Sheet {}: {} parts, used {:.1} x {:.1}, efficiency {:.1}%",
                sheet_index + 1,
                sheet.part_count(),
                sheet.used_width,
                sheet.used_height,
                sheet.efficiency * 100.0
            );

            let mut taken = vec![false; remaining.len()];
            for item in &best.placements {
                taken[item.index] = true;
            }
            let mut taken = taken.into_iter();
            remaining.retain(|_| !taken.next().unwrap_or(false));

            let efficiency = sheet.efficiency;
            result.sheets.push(sheet);

            if let Some(callback) = progress {
                let info = ProgressInfo::new()
                    .with_sheets(result.sheets.len())
                    .with_items(result.placed_count(), total_items)
                    .with_efficiency(efficiency)
                    .with_elapsed(start.elapsed().as_millis() as u64)
                    .with_phase(format!("Sheet {} complete", sheet_index + 1));
                callback(&info, &result.sheets);
            }
        }

        // Consumes the request so the next run starts clean.
        let cancelled = self.cancelled.swap(false, Ordering::Relaxed);
        let sheets_used = result.sheets.len();
        if !remaining.is_empty() {
            log::warn!("{} parts left unplaced after {} sheets", remaining.len(), sheets_used);
        }
        for part in remaining {
            let reason = if cancelled {
                UnplacedReason::Cancelled
            } else {
                UnplacedReason::NoRoom { sheets_used }
            };
            result.unplaced_parts.push(UnplacedPart::new(part, reason));
        }

        result.cancelled = cancelled;
        result.computation_time_ms = start.elapsed().as_millis() as u64;

        if let Some(callback) = progress {
            let info = ProgressInfo::new()
                .with_sheets(sheets_used)
                .with_items(result.placed_count(), total_items)
                .with_efficiency(result.total_efficiency())
                .with_elapsed(result.computation_time_ms)
                .with_phase(if cancelled { "Cancelled" } else { "Complete" })
                .finished();
            callback(&info, &result.sheets);
        }

        result
    }
}
