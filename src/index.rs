//! Long-lived point index with copy-on-rebuild updates.
//!
//! Readers take an [`Arc`] snapshot of the current tree and query it without
//! holding any lock. Writers are serialised, rebuild a fresh tree from the
//! previous snapshot plus the batch, and swap it in. A snapshot taken before
//! the swap keeps seeing the old points for as long as it is held.

use crate::cancel::CancellationToken;
use crate::compute::quadtree::QuadTree;
use crate::compute::validation::validate_config;
use crate::error::Result;
use crate::query::{JoinOutcome, run_on_tree, screen_points, screen_polygons};
use crate::stats::{JoinStats, millis};
use parking_lot::{Mutex, RwLock};
use quadjoin_types::config::JoinConfig;
use quadjoin_types::point::TaggedPoint;
use quadjoin_types::polygon::RingPolygon;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Inserts and deletes applied together by [`PointIndex::apply`].
///
/// Deletes are by point id. Inserting an id that is already indexed replaces
/// the old point; when one batch inserts an id more than once, the last insert
/// wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointBatch {
    pub inserts: Vec<TaggedPoint>,
    pub deletes: Vec<u64>,
}

impl PointBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, point: TaggedPoint) -> Self {
        self.inserts.push(point);
        self
    }

    pub fn delete(mut self, id: u64) -> Self {
        self.deletes.push(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.deletes.is_empty()
    }
}

/// What one [`PointIndex::apply`] call changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub inserted: usize,
    pub replaced: usize,
    pub removed: usize,
    /// Inserts skipped because of non-finite coordinates
    pub rejected: usize,
    pub num_points: usize,
    pub generation: u64,
    pub rebuild_ms: f64,
}

/// A point set indexed once and queried many times.
pub struct PointIndex {
    current: RwLock<Arc<QuadTree>>,
    /// Serialises writers so no batch is lost between read and swap.
    writer: Mutex<()>,
    generation: AtomicU64,
    config: JoinConfig,
}

impl PointIndex {
    /// Index `points`. Non-finite points are handled per
    /// `config.error_policy`. Ids are kept unique: a later point with the same
    /// id replaces an earlier one.
    pub fn new(points: Vec<TaggedPoint>, config: JoinConfig) -> Result<Self> {
        validate_config(&config)?;
        let mut rejected = Vec::new();
        let points = screen_points(&points, config.error_policy, &mut rejected)?;
        let (points, duplicates) = last_per_id(points);
        let tree = QuadTree::from_points(points, &config)?;
        log::debug!(
            "point index ready: {} points, {} leaves, {} rejected, {} duplicate ids",
            tree.len(),
            tree.num_leaves(),
            rejected.len(),
            duplicates
        );

        Ok(Self {
            current: RwLock::new(Arc::new(tree)),
            writer: Mutex::new(()),
            generation: AtomicU64::new(0),
            config,
        })
    }

    /// The tree as of now. Later updates do not affect it.
    pub fn snapshot(&self) -> Arc<QuadTree> {
        self.current.read().clone()
    }

    /// Number of updates applied since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// Apply a batch by rebuilding the tree and swapping it in.
    ///
    /// On error the current tree is left untouched.
    pub fn apply(&self, batch: PointBatch) -> Result<UpdateReport> {
        let _guard = self.writer.lock();
        let start = Instant::now();
        let old = self.snapshot();

        let mut rejected = Vec::new();
        let inserts = screen_points(&batch.inserts, self.config.error_policy, &mut rejected)?;
        let (inserts, duplicates) = last_per_id(inserts);
        let insert_ids: FxHashSet<u64> = inserts.iter().map(|p| p.id).collect();
        let deletes: FxHashSet<u64> = batch.deletes.into_iter().collect();

        let mut replaced = duplicates;
        let mut removed = 0;
        let mut points = Vec::with_capacity(old.len() + inserts.len());
        for point in old.points() {
            if insert_ids.contains(&point.id) {
                replaced += 1;
            } else if deletes.contains(&point.id) {
                removed += 1;
            } else {
                points.push(*point);
            }
        }
        let inserted = inserts.len();
        points.extend(inserts);

        let tree = QuadTree::from_points(points, &self.config)?;
        let num_points = tree.len();
        *self.current.write() = Arc::new(tree);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let report = UpdateReport {
            inserted,
            replaced,
            removed,
            rejected: rejected.len(),
            num_points,
            generation,
            rebuild_ms: millis(start.elapsed()),
        };
        log::debug!(
            "point index generation {}: +{} ~{} -{} ({} points)",
            generation,
            inserted,
            replaced,
            removed,
            num_points
        );
        Ok(report)
    }

    /// Containment join of `polygons` against the current snapshot.
    pub fn contains(&self, polygons: &[RingPolygon]) -> Result<JoinOutcome> {
        self.contains_with(polygons, &CancellationToken::new())
    }

    pub fn contains_with(
        &self,
        polygons: &[RingPolygon],
        cancel: &CancellationToken,
    ) -> Result<JoinOutcome> {
        let tree = self.snapshot();
        let mut rejected = Vec::new();
        let boxes = screen_polygons(polygons, self.config.error_policy, &mut rejected)?;

        let mut stats = JoinStats {
            num_points: tree.len(),
            num_polygons: polygons.len(),
            rejected_polygons: rejected.len(),
            ..Default::default()
        };
        if tree.is_empty() || boxes.is_empty() {
            return Ok(JoinOutcome {
                results: Vec::new(),
                stats,
                rejected,
            });
        }

        let results = run_on_tree(&tree, &boxes, polygons, &self.config, cancel, &mut stats)?;
        Ok(JoinOutcome {
            results,
            stats,
            rejected,
        })
    }
}

/// One point per id, keeping the last occurrence at the position of the
/// first. Also returns how many earlier copies were dropped.
fn last_per_id(points: Vec<TaggedPoint>) -> (Vec<TaggedPoint>, usize) {
    let mut slots: FxHashMap<u64, usize> = FxHashMap::default();
    let mut unique: Vec<TaggedPoint> = Vec::with_capacity(points.len());
    let mut duplicates = 0;
    for point in points {
        match slots.get(&point.id) {
            Some(&slot) => {
                unique[slot] = point;
                duplicates += 1;
            }
            None => {
                slots.insert(point.id, unique.len());
                unique.push(point);
            }
        }
    }
    (unique, duplicates)
}
