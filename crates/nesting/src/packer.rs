//! Single-sheet rectangle packing.
//!
//! Parts are packed by their spacing-inflated bounding boxes into a MaxRects
//! bin: the free space is kept as a list of maximal, possibly overlapping
//! rectangles, and every insertion splits the rectangles it touches.
//!
//! # Placement heuristics
//!
//! | Algorithm | Score (lower is better) |
//! |-----------|-------------------------|
//! | `BestShortSideFit` | shorter leftover side, then longer |
//! | `BestLongSideFit` | longer leftover side, then shorter |
//! | `BestAreaFit` | leftover area, then shorter leftover side |
//! | `BottomLeft` | top edge of the placed box, then its x |
//!
//! # References
//!
//! - Jylänki (2010), "A Thousand Ways to Pack the Bin"

use sheetnest_core::geometry::EPSILON;
use sheetnest_core::result::ratio;
use sheetnest_core::{NestingConfig, PartRecord, Rotation};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Free-rectangle choice heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PackingAlgorithm {
    /// Minimize the shorter leftover side.
    BestShortSideFit,
    /// Minimize the longer leftover side.
    BestLongSideFit,
    /// Minimize the leftover area.
    BestAreaFit,
    /// Place as low, then as far left, as possible.
    BottomLeft,
}

impl PackingAlgorithm {
    /// Every available heuristic.
    pub const ALL: [Self; 4] = [
        Self::BestShortSideFit,
        Self::BestLongSideFit,
        Self::BestAreaFit,
        Self::BottomLeft,
    ];

    /// Short name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BestShortSideFit => "bssf",
            Self::BestLongSideFit => "blsf",
            Self::BestAreaFit => "baf",
            Self::BottomLeft => "bl",
        }
    }
}

/// Order in which parts are offered to the bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SortKey {
    /// Keep the given order.
    Unsorted,
    /// Descending inflated area.
    Area,
    /// Descending inflated perimeter.
    Perimeter,
    /// Descending difference between the sides.
    SideDifference,
    /// Descending shorter side.
    ShortSide,
    /// Descending longer side.
    LongSide,
    /// Descending aspect ratio (longer over shorter side).
    Ratio,
}

impl SortKey {
    /// The six sorting heuristics.
    pub const SORTED: [Self; 6] = [
        Self::Area,
        Self::Perimeter,
        Self::SideDifference,
        Self::ShortSide,
        Self::LongSide,
        Self::Ratio,
    ];

    /// Every key, including [`SortKey::Unsorted`].
    pub const ALL: [Self; 7] = [
        Self::Unsorted,
        Self::Area,
        Self::Perimeter,
        Self::SideDifference,
        Self::ShortSide,
        Self::LongSide,
        Self::Ratio,
    ];

    /// Short name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unsorted => "none",
            Self::Area => "area",
            Self::Perimeter => "peri",
            Self::SideDifference => "diff",
            Self::ShortSide => "sside",
            Self::LongSide => "lside",
            Self::Ratio => "ratio",
        }
    }

    fn value(&self, part: &PartRecord) -> f64 {
        let short = part.width.min(part.height);
        let long = part.width.max(part.height);
        match self {
            Self::Unsorted => 0.0,
            Self::Area => part.area,
            Self::Perimeter => part.perimeter(),
            Self::SideDifference => long - short,
            Self::ShortSide => short,
            Self::LongSide => long,
            Self::Ratio => ratio(long, short),
        }
    }

    /// Stable-sorts `order` (indices into `parts`) by this key, descending.
    pub fn apply(&self, parts: &[PartRecord], order: &mut [usize]) {
        if matches!(self, Self::Unsorted) {
            return;
        }
        order.sort_by(|&a, &b| self.value(&parts[b]).total_cmp(&self.value(&parts[a])));
    }
}

/// Axis-aligned rectangle in bin coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    fn right(&self) -> f64 {
        self.x + self.w
    }

    fn top(&self) -> f64 {
        self.y + self.h
    }

    fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.top() <= self.top() + EPSILON
    }
}

/// MaxRects bin with optional 90 degree rotation.
#[derive(Debug, Clone)]
pub struct MaxRectsBin {
    width: f64,
    height: f64,
    allow_rotation: bool,
    free: Vec<Rect>,
}

impl MaxRectsBin {
    /// Creates an empty bin.
    pub fn new(width: f64, height: f64, allow_rotation: bool) -> Self {
        Self {
            width,
            height,
            allow_rotation,
            free: vec![Rect {
                x: 0.0,
                y: 0.0,
                w: width,
                h: height,
            }],
        }
    }

    /// Returns the bin width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the bin height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the current free rectangles.
    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    /// Places a `w` x `h` box, possibly rotated, and returns where it went.
    pub fn insert(&mut self, w: f64, h: f64, algorithm: PackingAlgorithm) -> Option<Rect> {
        let node = self.find_position(w, h, algorithm)?;
        self.place(&node);
        Some(node)
    }

    fn find_position(&self, w: f64, h: f64, algorithm: PackingAlgorithm) -> Option<Rect> {
        let mut orientations = vec![(w, h)];
        if self.allow_rotation && (w - h).abs() > EPSILON {
            orientations.push((h, w));
        }

        let mut best: Option<(Rect, (f64, f64))> = None;
        for free in &self.free {
            for &(ow, oh) in &orientations {
                if ow > free.w + EPSILON || oh > free.h + EPSILON {
                    continue;
                }
                let score = score(free, ow, oh, algorithm);
                let is_better = match &best {
                    None => true,
                    Some((_, best_score)) => {
                        score.0 < best_score.0 - EPSILON
                            || (score.0 <= best_score.0 + EPSILON
                                && score.1 < best_score.1 - EPSILON)
                    }
                };
                if is_better {
                    let node = Rect {
                        x: free.x,
                        y: free.y,
                        w: ow,
                        h: oh,
                    };
                    best = Some((node, score));
                }
            }
        }

        best.map(|(node, _)| node)
    }

    fn place(&mut self, used: &Rect) {
        let mut next = Vec::with_capacity(self.free.len() + 4);
        for free in self.free.drain(..) {
            if !split_free_rect(&free, used, &mut next) {
                next.push(free);
            }
        }
        self.free = next;
        self.prune();
    }

    /// Drops degenerate rectangles and rectangles contained in another.
    fn prune(&mut self) {
        self.free.retain(|r| r.w > EPSILON && r.h > EPSILON);

        let n = self.free.len();
        let mut keep = vec![true; n];
        for i in 0..n {
            for j in 0..n {
                if i != j && keep[j] && self.free[j].contains(&self.free[i]) {
                    keep[i] = false;
                    break;
                }
            }
        }

        let mut flags = keep.into_iter();
        self.free.retain(|_| flags.next().unwrap_or(true));
    }
}

fn score(free: &Rect, w: f64, h: f64, algorithm: PackingAlgorithm) -> (f64, f64) {
    let leftover_h = free.w - w;
    let leftover_v = free.h - h;
    let short = leftover_h.min(leftover_v);
    let long = leftover_h.max(leftover_v);

    match algorithm {
        PackingAlgorithm::BestShortSideFit => (short, long),
        PackingAlgorithm::BestLongSideFit => (long, short),
        PackingAlgorithm::BestAreaFit => (free.w * free.h - w * h, short),
        PackingAlgorithm::BottomLeft => (free.y + h, free.x),
    }
}

/// Splits `free` around `used` into up to four maximal rectangles.
///
/// Returns false (and pushes nothing) if the two do not overlap.
fn split_free_rect(free: &Rect, used: &Rect, out: &mut Vec<Rect>) -> bool {
    if used.x >= free.right() - EPSILON
        || used.right() <= free.x + EPSILON
        || used.y >= free.top() - EPSILON
        || used.top() <= free.y + EPSILON
    {
        return false;
    }

    if used.x > free.x + EPSILON {
        out.push(Rect {
            x: free.x,
            y: free.y,
            w: used.x - free.x,
            h: free.h,
        });
    }
    if used.right() < free.right() - EPSILON {
        out.push(Rect {
            x: used.right(),
            y: free.y,
            w: free.right() - used.right(),
            h: free.h,
        });
    }
    if used.y > free.y + EPSILON {
        out.push(Rect {
            x: free.x,
            y: free.y,
            w: free.w,
            h: used.y - free.y,
        });
    }
    if used.top() < free.top() - EPSILON {
        out.push(Rect {
            x: free.x,
            y: used.top(),
            w: free.w,
            h: free.top() - used.top(),
        });
    }

    true
}

/// Infers the orientation of a placed box from its placed width.
///
/// A box whose placed width matches its inflated height instead of its
/// inflated width was turned.
pub fn detect_rotation(placed_width: f64, width: f64, height: f64) -> Rotation {
    if (placed_width - width).abs() > EPSILON && (placed_width - height).abs() <= EPSILON {
        Rotation::Quarter
    } else {
        Rotation::None
    }
}

/// One part placed by a packing attempt, in bin coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedItem {
    /// Index into the part slice given to [`SheetPacker::pack`].
    pub index: usize,
    /// Left edge of the inflated box.
    pub x: f64,
    /// Bottom edge of the inflated box.
    pub y: f64,
    /// Orientation.
    pub rotation: Rotation,
}

/// Outcome of one packing attempt on one sheet.
#[derive(Debug, Clone)]
pub struct PackAttempt {
    /// Placed parts in insertion order.
    pub placements: Vec<PackedItem>,
    /// Sum of inflated areas of the placed parts.
    pub packed_area: f64,
    /// Right-most extent of the placements.
    pub used_width: f64,
    /// Top-most extent of the placements.
    pub used_height: f64,
    /// `packed_area / (used_width * used_height)`.
    pub efficiency: f64,
    /// Heuristic used.
    pub algorithm: PackingAlgorithm,
    /// Sort key used.
    pub sort_key: SortKey,
}

impl PackAttempt {
    /// Returns the number of parts placed.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    /// Returns true if this attempt should replace `other` as the best so far.
    ///
    /// Higher efficiency wins; equal efficiency is broken by placed count,
    /// and a full tie keeps `other`.
    pub fn is_better_than(&self, other: &PackAttempt) -> bool {
        const TIE: f64 = 1e-12;
        if self.efficiency > other.efficiency + TIE {
            return true;
        }
        self.efficiency >= other.efficiency - TIE && self.placed_count() > other.placed_count()
    }
}

/// Packs spacing-inflated parts into one bin of fixed size.
#[derive(Debug, Clone, Copy)]
pub struct SheetPacker {
    bin_width: f64,
    bin_height: f64,
    allow_rotation: bool,
}

impl SheetPacker {
    /// Creates a packer for a `bin_width` x `bin_height` bin.
    pub fn new(bin_width: f64, bin_height: f64, allow_rotation: bool) -> Self {
        Self {
            bin_width,
            bin_height,
            allow_rotation,
        }
    }

    /// Creates a packer for the usable area of the configured sheet.
    pub fn from_config(config: &NestingConfig) -> Self {
        Self::new(
            config.usable_width(),
            config.usable_height(),
            config.allow_rotation,
        )
    }

    /// Returns the bin width.
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Returns the bin height.
    pub fn bin_height(&self) -> f64 {
        self.bin_height
    }

    /// Returns true if rotation is allowed.
    pub fn allow_rotation(&self) -> bool {
        self.allow_rotation
    }

    /// Runs one packing attempt.
    ///
    /// `order` lists indices into `parts`; it is sorted by `sort_key` before
    /// packing. Parts that do not fit are skipped. `parts` is not modified.
    pub fn pack(
        &self,
        parts: &[PartRecord],
        order: &[usize],
        algorithm: PackingAlgorithm,
        sort_key: SortKey,
    ) -> PackAttempt {
        let mut order = order.to_vec();
        sort_key.apply(parts, &mut order);

        let mut bin = MaxRectsBin::new(self.bin_width, self.bin_height, self.allow_rotation);
        let mut placements = Vec::with_capacity(order.len());
        let mut packed_area = 0.0;
        let mut used_width = 0.0_f64;
        let mut used_height = 0.0_f64;

        for index in order {
            let part = &parts[index];
            let Some(node) = bin.insert(part.width, part.height, algorithm) else {
                continue;
            };

            placements.push(PackedItem {
                index,
                x: node.x,
                y: node.y,
                rotation: detect_rotation(node.w, part.width, part.height),
            });
            packed_area += part.area;
            used_width = used_width.max(node.right());
            used_height = used_height.max(node.top());
        }

        PackAttempt {
            placements,
            packed_area,
            used_width,
            used_height,
            efficiency: ratio(packed_area, used_width * used_height),
            algorithm,
            sort_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sheetnest_core::PartGeometry;

    fn part(index: usize, w: f64, h: f64) -> PartRecord {
        let geom = PartGeometry::new(format!("P{}", index), w, h);
        PartRecord::from_geometry(&geom, 0.0, index, 0, 1).unwrap()
    }

    fn rects_overlap(a: &Rect, b: &Rect) -> bool {
        a.x < b.right() - EPSILON
            && b.x < a.right() - EPSILON
            && a.y < b.top() - EPSILON
            && b.y < a.top() - EPSILON
    }

    #[test]
    fn test_single_part_at_origin() {
        let mut bin = MaxRectsBin::new(100.0, 100.0, false);
        let node = bin.insert(30.0, 20.0, PackingAlgorithm::BestShortSideFit).unwrap();
        assert_eq!((node.x, node.y, node.w, node.h), (0.0, 0.0, 30.0, 20.0));
        assert_eq!(bin.free_rects().len(), 2);
    }

    #[test]
    fn test_part_too_large_is_rejected() {
        let mut bin = MaxRectsBin::new(100.0, 100.0, true);
        assert!(bin.insert(120.0, 20.0, PackingAlgorithm::BottomLeft).is_none());
    }

    #[test]
    fn test_rotation_used_when_needed() {
        let packer = SheetPacker::new(100.0, 300.0, true);
        let parts = vec![part(0, 250.0, 80.0)];
        let attempt = packer.pack(&parts, &[0], PackingAlgorithm::BestAreaFit, SortKey::Unsorted);

        assert_eq!(attempt.placed_count(), 1);
        assert_eq!(attempt.placements[0].rotation, Rotation::Quarter);
        assert_relative_eq!(attempt.used_width, 80.0);
        assert_relative_eq!(attempt.used_height, 250.0);
    }

    #[test]
    fn test_rotation_forbidden() {
        let packer = SheetPacker::new(100.0, 300.0, false);
        let parts = vec![part(0, 250.0, 80.0)];
        let attempt = packer.pack(&parts, &[0], PackingAlgorithm::BestAreaFit, SortKey::Unsorted);
        assert_eq!(attempt.placed_count(), 0);
        assert_eq!(attempt.efficiency, 0.0);
    }

    #[test]
    fn test_detect_rotation() {
        assert_eq!(detect_rotation(80.0, 250.0, 80.0), Rotation::Quarter);
        assert_eq!(detect_rotation(250.0, 250.0, 80.0), Rotation::None);
        assert_eq!(detect_rotation(50.0, 50.0, 50.0), Rotation::None);
    }

    #[test]
    fn test_efficiency_uses_tight_bounds() {
        let packer = SheetPacker::new(1000.0, 1000.0, false);
        let parts = vec![part(0, 50.0, 50.0), part(1, 50.0, 50.0)];
        let attempt = packer.pack(&parts, &[0, 1], PackingAlgorithm::BottomLeft, SortKey::Unsorted);

        assert_eq!(attempt.placed_count(), 2);
        assert_relative_eq!(attempt.used_width, 100.0);
        assert_relative_eq!(attempt.used_height, 50.0);
        assert_relative_eq!(attempt.efficiency, 1.0);
    }

    #[test]
    fn test_sort_keys_descending_and_stable() {
        let parts = vec![
            part(0, 10.0, 10.0),
            part(1, 40.0, 5.0),
            part(2, 20.0, 20.0),
            part(3, 10.0, 10.0),
        ];

        let mut order = vec![0, 1, 2, 3];
        SortKey::Area.apply(&parts, &mut order);
        assert_eq!(order, vec![2, 1, 0, 3]);

        let mut order = vec![0, 1, 2, 3];
        SortKey::LongSide.apply(&parts, &mut order);
        assert_eq!(order, vec![1, 2, 0, 3]);

        let mut order = vec![3, 2, 1, 0];
        SortKey::Unsorted.apply(&parts, &mut order);
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_no_overlap_for_every_heuristic() {
        let parts: Vec<PartRecord> = (0..40)
            .map(|i| {
                let w = 20.0 + (i as f64 * 37.0) % 90.0;
                let h = 15.0 + (i as f64 * 53.0) % 70.0;
                part(i, w, h)
            })
            .collect();
        let order: Vec<usize> = (0..parts.len()).collect();
        let packer = SheetPacker::new(400.0, 300.0, true);

        for algorithm in PackingAlgorithm::ALL {
            for sort_key in SortKey::ALL {
                let attempt = packer.pack(&parts, &order, algorithm, sort_key);
                assert!(attempt.placed_count() > 0);

                let rects: Vec<Rect> = attempt
                    .placements
                    .iter()
                    .map(|p| {
                        let part = &parts[p.index];
                        let (w, h) = match p.rotation {
                            Rotation::None => (part.width, part.height),
                            Rotation::Quarter => (part.height, part.width),
                        };
                        Rect { x: p.x, y: p.y, w, h }
                    })
                    .collect();

                for (i, a) in rects.iter().enumerate() {
                    assert!(a.right() <= 400.0 + EPSILON && a.top() <= 300.0 + EPSILON);
                    for b in rects.iter().skip(i + 1) {
                        assert!(
                            !rects_overlap(a, b),
                            "{}/{}: {:?} overlaps {:?}",
                            algorithm.name(),
                            sort_key.name(),
                            a,
                            b
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_attempt_ranking() {
        let packer = SheetPacker::new(1000.0, 1000.0, false);
        let parts = vec![part(0, 50.0, 50.0), part(1, 50.0, 50.0)];
        let both = packer.pack(&parts, &[0, 1], PackingAlgorithm::BottomLeft, SortKey::Unsorted);
        let one = packer.pack(&parts, &[0], PackingAlgorithm::BottomLeft, SortKey::Unsorted);

        // Both have efficiency 1.0; more placements wins, ties keep the incumbent.
        assert!(both.is_better_than(&one));
        assert!(!one.is_better_than(&both));
        assert!(!both.is_better_than(&both.clone()));
    }
}
