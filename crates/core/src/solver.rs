//! Nesting configuration and progress reporting.

use crate::result::SheetResult;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Search budget for the single-sheet optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchMode {
    /// A handful of attempts, for interactive use.
    #[default]
    Fast,
    /// Full algorithm/sort grid plus shuffled attempts, for final quotes.
    Deep,
}

impl SearchMode {
    /// Maps a `deep_analysis` flag to a search mode.
    pub fn from_deep(deep_analysis: bool) -> Self {
        if deep_analysis {
            Self::Deep
        } else {
            Self::Fast
        }
    }
}

/// Configuration for a nesting run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestingConfig {
    /// Nominal stock sheet width (mm).
    pub sheet_width: f64,

    /// Nominal stock sheet height (mm).
    pub sheet_height: f64,

    /// Gap kept between parts; added to each part's width and height (mm).
    pub spacing: f64,

    /// Border kept clear along every sheet edge (mm).
    pub margin: f64,

    /// Maximum number of sheets to open.
    pub max_sheets: usize,

    /// Whether parts may be turned by 90 degrees.
    pub allow_rotation: bool,

    /// Attempts per sheet in fast mode.
    pub fast_attempts: usize,

    /// Extra shuffled attempts per sheet in deep mode.
    pub deep_shuffle_attempts: usize,

    /// Seed for shuffled attempts (None = fresh seed per run).
    pub seed: Option<u64>,

    /// Evaluate independent attempts on the rayon thread pool.
    pub parallel: bool,
}

impl Default for NestingConfig {
    fn default() -> Self {
        Self {
            sheet_width: 3000.0,
            sheet_height: 1500.0,
            spacing: 5.0,
            margin: 0.0,
            max_sheets: 100,
            allow_rotation: true,
            fast_attempts: 3,
            deep_shuffle_attempts: 30,
            seed: None,
            parallel: true,
        }
    }
}

impl NestingConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nominal sheet size.
    pub fn with_sheet(mut self, width: f64, height: f64) -> Self {
        self.sheet_width = width;
        self.sheet_height = height;
        self
    }

    /// Sets the spacing between parts.
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets the margin from sheet edges.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the sheet cap.
    pub fn with_max_sheets(mut self, max_sheets: usize) -> Self {
        self.max_sheets = max_sheets;
        self
    }

    /// Allows or forbids 90 degree rotation.
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    /// Sets the number of fast-mode attempts.
    pub fn with_fast_attempts(mut self, attempts: usize) -> Self {
        self.fast_attempts = attempts;
        self
    }

    /// Sets the number of shuffled deep-mode attempts.
    pub fn with_deep_shuffle_attempts(mut self, attempts: usize) -> Self {
        self.deep_shuffle_attempts = attempts;
        self
    }

    /// Pins the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel attempt evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the width available to parts after margins.
    pub fn usable_width(&self) -> f64 {
        self.sheet_width - 2.0 * self.margin
    }

    /// Returns the height available to parts after margins.
    pub fn usable_height(&self) -> f64 {
        self.sheet_height - 2.0 * self.margin
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.sheet_width.is_finite() && self.sheet_height.is_finite())
            || self.sheet_width <= 0.0
            || self.sheet_height <= 0.0
        {
            return Err(Error::InvalidSheet(format!(
                "Sheet must have positive dimensions, got {} x {}",
                self.sheet_width, self.sheet_height
            )));
        }

        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(Error::ConfigError(format!(
                "Spacing must be non-negative, got {}",
                self.spacing
            )));
        }

        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::ConfigError(format!(
                "Margin must be non-negative, got {}",
                self.margin
            )));
        }

        if self.usable_width() <= 0.0 || self.usable_height() <= 0.0 {
            return Err(Error::InvalidSheet(format!(
                "Margin {} leaves no usable area on a {} x {} sheet",
                self.margin, self.sheet_width, self.sheet_height
            )));
        }

        if self.max_sheets == 0 {
            return Err(Error::ConfigError(
                "max_sheets must be at least 1".to_string(),
            ));
        }

        if self.fast_attempts == 0 {
            return Err(Error::ConfigError(
                "fast_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Progress callback invoked after each completed sheet.
///
/// Receives the progress snapshot and every sheet completed so far.
pub type ProgressCallback = Box<dyn Fn(&ProgressInfo, &[SheetResult]) + Send + Sync>;

/// Progress information during nesting.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressInfo {
    /// Sheets completed so far.
    pub sheets_completed: usize,
    /// Instances placed so far.
    pub items_placed: usize,
    /// Total instances queued.
    pub total_items: usize,
    /// Efficiency of the most recent sheet.
    pub last_sheet_efficiency: f64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase description.
    pub phase: String,
    /// Whether the nester is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info with default values.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the sheet count.
    pub fn with_sheets(mut self, completed: usize) -> Self {
        self.sheets_completed = completed;
        self
    }

    /// Sets the items placed info.
    pub fn with_items(mut self, placed: usize, total: usize) -> Self {
        self.items_placed = placed;
        self.total_items = total;
        self
    }

    /// Sets the last sheet efficiency.
    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.last_sheet_efficiency = efficiency;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks the nester as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Fraction of queued instances placed so far (0.0 to 1.0).
    pub fn placement_ratio(&self) -> f64 {
        if self.total_items > 0 {
            self.items_placed as f64 / self.total_items as f64
        } else {
            0.0
        }
    }
}
