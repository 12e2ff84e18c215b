use roaring::RoaringBitmap;
use std::{
    io::{self, Read, Write},
    ops::Range,
};

/// Compressed membership structure backing a [`RankedSet`](crate::RankedSet).
pub trait Membership: Clone + Default + Send + Sync {
    fn insert(&mut self, id: u32) -> bool;

    fn insert_many<I: IntoIterator<Item = u32>>(&mut self, ids: I);

    fn remove(&mut self, id: u32) -> bool;

    /// Remove every id in the half-open range. Bounds past `u32::MAX` are
    /// clamped; returns the number of ids removed.
    fn remove_range(&mut self, range: Range<u64>) -> u64;

    fn contains(&self, id: u32) -> bool;

    fn cardinality(&self) -> u64;

    fn clear(&mut self);

    /// Visit ids in ascending order until `visit` returns `false`.
    fn visit<F: FnMut(u32) -> bool>(&self, visit: F);

    /// Copy the smallest ids into `out`, returning how many were written.
    fn next_many(&self, out: &mut [u32]) -> usize {
        let mut n = 0;
        if out.is_empty() {
            return 0;
        }
        self.visit(|id| {
            out[n] = id;
            n += 1;
            n < out.len()
        });
        n
    }

    fn and_inplace(&mut self, other: &Self);

    fn or_inplace(&mut self, other: &Self);

    fn xor_inplace(&mut self, other: &Self);

    fn and_not_inplace(&mut self, other: &Self);

    /// Intersect with the union of `others`. No operands leaves `self`
    /// unchanged.
    fn and_any_inplace(&mut self, others: &[&Self]) {
        match others {
            [] => {}
            [only] => self.and_inplace(only),
            [first, rest @ ..] => {
                let mut union = (*first).clone();
                for other in rest {
                    union.or_inplace(other);
                }
                self.and_inplace(&union);
            }
        }
    }

    fn serialize_into<W: Write>(&self, w: W) -> io::Result<()>;

    fn deserialize_from<R: Read>(r: R) -> io::Result<Self>;
}

impl Membership for RoaringBitmap {
    #[inline]
    fn insert(&mut self, id: u32) -> bool {
        RoaringBitmap::insert(self, id)
    }

    fn insert_many<I: IntoIterator<Item = u32>>(&mut self, ids: I) {
        self.extend(ids);
    }

    #[inline]
    fn remove(&mut self, id: u32) -> bool {
        RoaringBitmap::remove(self, id)
    }

    fn remove_range(&mut self, range: Range<u64>) -> u64 {
        let limit = u64::from(u32::MAX);
        if range.start >= range.end || range.start > limit {
            return 0;
        }
        let lo = range.start as u32;
        let hi = (range.end - 1).min(limit) as u32;
        RoaringBitmap::remove_range(self, lo..=hi)
    }

    #[inline]
    fn contains(&self, id: u32) -> bool {
        RoaringBitmap::contains(self, id)
    }

    #[inline]
    fn cardinality(&self) -> u64 {
        self.len()
    }

    fn clear(&mut self) {
        RoaringBitmap::clear(self);
    }

    fn visit<F: FnMut(u32) -> bool>(&self, mut visit: F) {
        for id in self.iter() {
            if !visit(id) {
                break;
            }
        }
    }

    fn and_inplace(&mut self, other: &Self) {
        *self &= other;
    }

    fn or_inplace(&mut self, other: &Self) {
        *self |= other;
    }

    fn xor_inplace(&mut self, other: &Self) {
        *self ^= other;
    }

    fn and_not_inplace(&mut self, other: &Self) {
        *self -= other;
    }

    fn serialize_into<W: Write>(&self, w: W) -> io::Result<()> {
        RoaringBitmap::serialize_into(self, w)
    }

    fn deserialize_from<R: Read>(r: R) -> io::Result<Self> {
        RoaringBitmap::deserialize_from(r)
    }
}
