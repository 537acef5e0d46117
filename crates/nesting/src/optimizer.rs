//! Best-of-many search for one sheet load.
//!
//! Fast mode runs `fast_attempts` packings with a fixed heuristic: the
//! caller's (largest-first) order, then variants that keep the largest third
//! in front and shuffle the rest. Deep mode runs the same fast attempts,
//! then every algorithm/sort-key pair on the caller's order, then
//! `deep_shuffle_attempts` fully shuffled orders with the best algorithm.
//!
//! Attempts of one phase are independent; with `parallel` set they are
//! evaluated on the rayon pool. Orders are drawn from the RNG before
//! evaluation and results are reduced in submission order, so a pinned seed
//! reproduces the same outcome with or without parallelism.

use crate::packer::{PackAttempt, PackingAlgorithm, SheetPacker, SortKey};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use sheetnest_core::{NestingConfig, PartRecord, SearchMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Heuristic pair used by fast mode.
const FAST_ALGORITHM: PackingAlgorithm = PackingAlgorithm::BestShortSideFit;
const FAST_SORT_KEY: SortKey = SortKey::Unsorted;

/// One queued packing attempt.
#[derive(Debug, Clone)]
struct AttemptJob {
    order: Vec<usize>,
    algorithm: PackingAlgorithm,
    sort_key: SortKey,
}

/// Outcome of searching one sheet.
#[derive(Debug, Clone, Default)]
pub struct SheetSearch {
    /// Best attempt, or None if cancellation came before the first attempt.
    pub best: Option<PackAttempt>,
    /// Attempts actually evaluated.
    pub attempts: usize,
}

impl SheetSearch {
    fn absorb(&mut self, results: Vec<Option<PackAttempt>>) {
        for attempt in results.into_iter().flatten() {
            self.attempts += 1;
            let replace = match &self.best {
                None => true,
                Some(best) => attempt.is_better_than(best),
            };
            if replace {
                self.best = Some(attempt);
            }
        }
    }
}

/// Searches for the best single-sheet packing of a part pool.
pub struct SingleSheetOptimizer {
    packer: SheetPacker,
    fast_attempts: usize,
    deep_shuffle_attempts: usize,
    parallel: bool,
    cancelled: Arc<AtomicBool>,
}

impl SingleSheetOptimizer {
    /// Creates an optimizer for the usable area of the configured sheet.
    pub fn new(config: &NestingConfig, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            packer: SheetPacker::from_config(config),
            fast_attempts: config.fast_attempts.max(1),
            deep_shuffle_attempts: config.deep_shuffle_attempts,
            parallel: config.parallel,
            cancelled,
        }
    }

    /// Returns the underlying packer.
    pub fn packer(&self) -> &SheetPacker {
        &self.packer
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Finds the best one-sheet packing of `parts` (given largest-first).
    ///
    /// Returns whatever was found before cancellation; every returned attempt
    /// is complete.
    pub fn optimize(
        &self,
        parts: &[PartRecord],
        mode: SearchMode,
        rng: &mut StdRng,
    ) -> SheetSearch {
        let mut search = SheetSearch::default();
        if parts.is_empty() {
            return search;
        }

        let identity: Vec<usize> = (0..parts.len()).collect();

        let fast_jobs = self.fast_jobs(&identity, rng);
        search.absorb(self.evaluate(parts, &fast_jobs));

        if mode == SearchMode::Deep && !self.is_cancelled() {
            let grid_jobs: Vec<AttemptJob> = PackingAlgorithm::ALL
                .into_iter()
                .flat_map(|algorithm| {
                    SortKey::ALL.into_iter().map(move |sort_key| (algorithm, sort_key))
                })
                .map(|(algorithm, sort_key)| AttemptJob {
                    order: identity.clone(),
                    algorithm,
                    sort_key,
                })
                .collect();
            search.absorb(self.evaluate(parts, &grid_jobs));

            // Shuffled orders go in unsorted; any sort key would undo the shuffle.
            if let Some(best_algorithm) = search.best.as_ref().map(|b| b.algorithm) {
                let shuffle_jobs: Vec<AttemptJob> = (0..self.deep_shuffle_attempts)
                    .map(|_| {
                        let mut order = identity.clone();
                        order.shuffle(rng);
                        AttemptJob {
                            order,
                            algorithm: best_algorithm,
                            sort_key: SortKey::Unsorted,
                        }
                    })
                    .collect();
                search.absorb(self.evaluate(parts, &shuffle_jobs));
            }
        }

        if let Some(best) = &search.best {
            log::debug!(
                "Sheet search: {} attempts, best {}/{} placed {} of {} at {:.1}%",
                search.attempts,
                best.algorithm.name(),
                best.sort_key.name(),
                best.placed_count(),
                parts.len(),
                best.efficiency * 100.0
            );
        }

        search
    }

    fn fast_jobs(&self, identity: &[usize], rng: &mut StdRng) -> Vec<AttemptJob> {
        let fixed = identity.len() / 3;
        (0..self.fast_attempts)
            .map(|attempt| {
                let mut order = identity.to_vec();
                if attempt > 0 {
                    order[fixed..].shuffle(rng);
                }
                AttemptJob {
                    order,
                    algorithm: FAST_ALGORITHM,
                    sort_key: FAST_SORT_KEY,
                }
            })
            .collect()
    }

    /// Runs the jobs, skipping those that start after cancellation.
    fn evaluate(&self, parts: &[PartRecord], jobs: &[AttemptJob]) -> Vec<Option<PackAttempt>> {
        let run = |job: &AttemptJob| {
            if self.is_cancelled() {
                return None;
            }
            Some(self.packer.pack(parts, &job.order, job.algorithm, job.sort_key))
        };

        if self.parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        }
    }
}
