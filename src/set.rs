use parking_lot::{RwLock, RwLockWriteGuard};
use roaring::RoaringBitmap;
use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};
use tracing::{debug, warn};

use crate::{
    bitmap::Membership,
    error::Result,
    item::{Item, ItemList, SortOrder},
    snapshot::{self, SnapshotOptions},
};

struct Inner<B> {
    bitmap: B,
    items: ItemList,
}

impl<B: Membership> Inner<B> {
    /// Drop scores whose id is no longer a member.
    fn reconcile(&mut self) {
        let bitmap = &self.bitmap;
        let dropped = self.items.retain_ids(|id| bitmap.contains(id));
        debug!(dropped, kept = self.items.len(), "reconciled scores");
    }

    fn clear_scores(&mut self) {
        if !self.items.is_empty() {
            debug!(dropped = self.items.len(), "cleared scores");
        }
        self.items.clear();
    }
}

/// A set of `u32` ids with optional per-id scores.
///
/// Membership and set algebra are answered by the bitmap `B`; scored ids are
/// additionally kept in an [`ItemList`] so they can be paged through in rank
/// order. Rank order is ascending score with ties broken by ascending id, so
/// rank 0 is the smallest score.
///
/// Every operation takes the instance lock. Callbacks passed to
/// [`iterate`](Self::iterate) run while the lock is held and must not call
/// back into the same set.
pub struct RankedSet<B = RoaringBitmap> {
    inner: RwLock<Inner<B>>,
}

impl RankedSet<RoaringBitmap> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: Membership> Default for RankedSet<B> {
    fn default() -> Self {
        Self::from_bitmap(B::default())
    }
}

impl<B: Membership> Clone for RankedSet<B> {
    fn clone(&self) -> Self {
        let inner = self.inner.read();
        Self {
            inner: RwLock::new(Inner {
                bitmap: inner.bitmap.clone(),
                items: inner.items.clone(),
            }),
        }
    }
}

impl<B: Membership> fmt::Debug for RankedSet<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("RankedSet")
            .field("members", &inner.bitmap.cardinality())
            .field("scored", &inner.items.len())
            .field("order", &inner.items.order())
            .finish()
    }
}

impl<B: Membership> RankedSet<B> {
    /// Wrap an existing bitmap. Its members start out unscored.
    pub fn from_bitmap(bitmap: B) -> Self {
        Self {
            inner: RwLock::new(Inner {
                bitmap,
                items: ItemList::new(),
            }),
        }
    }

    /// Add unscored members. They take part in set algebra and unranked
    /// iteration but not in rank queries.
    pub fn add<I: IntoIterator<Item = u32>>(&self, ids: I) {
        self.inner.write().bitmap.insert_many(ids);
    }

    /// Add `id` as a member with `score`, replacing any previous score.
    pub fn insert(&self, id: u32, score: f32) {
        let mut inner = self.inner.write();
        inner.bitmap.insert(id);
        inner.items.upsert(id, score);
    }

    pub fn remove(&self, id: u32) {
        let mut inner = self.inner.write();
        inner.bitmap.remove(id);
        inner.items.delete(id);
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.bitmap.clear();
        inner.items.clear();
    }

    pub fn has(&self, id: u32) -> bool {
        self.inner.read().bitmap.contains(id)
    }

    pub fn count(&self) -> u64 {
        self.inner.read().bitmap.cardinality()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of members that carry a score.
    pub fn scored_len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn score(&self, id: u32) -> Option<f32> {
        self.inner.read().items.get(id)
    }

    /// Visit members until `visit` returns `false`: in ascending id order, or
    /// when `ranked`, only the scored members in rank order.
    pub fn iterate<F>(&self, ranked: bool, mut visit: F)
    where
        F: FnMut(u32) -> bool,
    {
        if !ranked {
            self.inner.read().bitmap.visit(visit);
            return;
        }
        let mut inner = self.inner.write();
        inner.items.sort_by_score();
        for it in inner.items.iter() {
            if !visit(it.id) {
                break;
            }
        }
    }

    /// Run `f` against the items in score order, re-sorting under the
    /// exclusive lock only when needed.
    fn with_score_order<R>(&self, f: impl FnOnce(&ItemList) -> R) -> R {
        let inner = self.inner.read();
        if inner.items.order() == SortOrder::ByScore {
            return f(&inner.items);
        }
        drop(inner);
        let mut inner = self.inner.write();
        inner.items.sort_by_score();
        let inner = RwLockWriteGuard::downgrade(inner);
        f(&inner.items)
    }

    /// Fill `out` with scored ids starting at rank position `offset`.
    /// Returns how many ids were written.
    pub fn rank(&self, offset: usize, out: &mut [u32]) -> usize {
        if out.is_empty() {
            return 0;
        }
        self.with_score_order(|items| {
            let Some(tail) = items.as_slice().get(offset..) else {
                return 0;
            };
            let mut n = 0;
            for (slot, it) in out.iter_mut().zip(tail) {
                *slot = it.id;
                n += 1;
            }
            n
        })
    }

    /// Up to `limit` scored items with their scores, starting at rank
    /// position `offset`.
    pub fn ranked_items(&self, offset: usize, limit: usize) -> Vec<Item> {
        self.with_score_order(|items| {
            items
                .as_slice()
                .iter()
                .skip(offset)
                .take(limit)
                .copied()
                .collect()
        })
    }

    /// Rank position of a scored member.
    pub fn rank_of(&self, id: u32) -> Option<usize> {
        self.with_score_order(|items| items.iter().position(|it| it.id == id))
    }

    /// Fill `out` with the smallest members greater than `last`.
    /// Returns how many ids were written.
    pub fn range(&self, last: u32, out: &mut [u32]) -> usize {
        let mut bitmap = self.inner.read().bitmap.clone();
        bitmap.remove_range(0..u64::from(last) + 1);
        bitmap.next_many(out)
    }

    /// Copy of `other`'s bitmap, taken under its own lock so that no two set
    /// locks are ever held together.
    fn operand(other: &Self) -> B {
        other.inner.read().bitmap.clone()
    }

    pub fn and(&self, other: &Self) {
        let rhs = Self::operand(other);
        let mut inner = self.inner.write();
        inner.bitmap.and_inplace(&rhs);
        inner.reconcile();
    }

    pub fn and_not(&self, other: &Self) {
        let rhs = Self::operand(other);
        let mut inner = self.inner.write();
        inner.bitmap.and_not_inplace(&rhs);
        inner.reconcile();
    }

    /// Intersect with the union of `others`. An empty `others` leaves the
    /// membership untouched.
    pub fn and_any(&self, others: &[&Self]) {
        let operands: Vec<B> = others.iter().map(|s| Self::operand(s)).collect();
        let refs: Vec<&B> = operands.iter().collect();
        let mut inner = self.inner.write();
        inner.bitmap.and_any_inplace(&refs);
        inner.reconcile();
    }

    /// Union with `other`. All scores are dropped, since unioned members have
    /// none; re-insert to rank again.
    pub fn or(&self, other: &Self) {
        let rhs = Self::operand(other);
        let mut inner = self.inner.write();
        inner.bitmap.or_inplace(&rhs);
        inner.clear_scores();
    }

    /// Symmetric difference with `other`. Drops all scores like [`or`](Self::or).
    pub fn xor(&self, other: &Self) {
        let rhs = Self::operand(other);
        let mut inner = self.inner.write();
        inner.bitmap.xor_inplace(&rhs);
        inner.clear_scores();
    }

    /// Replace the contents with a snapshot read from `r`. On error the set is
    /// left empty.
    pub fn load<R: Read>(&self, r: R) -> Result<()> {
        let mut inner = self.inner.write();
        inner.bitmap.clear();
        inner.items.clear();
        match snapshot::read::<B, R>(r) {
            Ok((bitmap, items)) => {
                inner.bitmap = bitmap;
                inner.items = items;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "snapshot load failed");
                Err(e)
            }
        }
    }

    pub fn save<W: Write>(&self, w: W) -> Result<()> {
        self.save_with(w, &SnapshotOptions::default())
    }

    pub fn save_with<W: Write>(&self, w: W, opts: &SnapshotOptions) -> Result<()> {
        let mut inner = self.inner.write();
        let Inner { bitmap, items } = &mut *inner;
        snapshot::write(bitmap, items, w, opts)
    }

    pub fn load_from_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::open(path)?;
        self.load(BufReader::new(file))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.save(&mut w)?;
        w.flush()?;
        Ok(())
    }
}
