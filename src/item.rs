use ordered_float::OrderedFloat;
use std::{
    cmp::Ordering,
    collections::HashSet,
    io::{self, Read, Write},
};

use crate::error::{Error, Result};

/// Size of one encoded item: `u32` id followed by the `f32` score bits.
pub const RECORD_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Item {
    pub id: u32,
    pub score: f32,
}

impl Item {
    #[inline]
    pub const fn new(id: u32, score: f32) -> Self {
        Self { id, score }
    }

    #[inline]
    fn cmp_by_score(&self, other: &Self) -> Ordering {
        OrderedFloat(self.score)
            .cmp(&OrderedFloat(other.score))
            .then(self.id.cmp(&other.id))
    }
}

/// Which total order currently holds for an [`ItemList`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending by id. Required for point operations and encoding.
    #[default]
    ById,
    /// Ascending by score, ties broken by ascending id.
    ByScore,
    /// Neither order is known to hold.
    Unsorted,
}

/// Scored items kept in one of two lazily restored orders.
///
/// Point operations binary search the id order, rank queries index the score
/// order. Switching between the two is a full sort, done only when an
/// operation needs the other order.
#[derive(Clone, Debug, Default)]
pub struct ItemList {
    data: Vec<Item>,
    order: SortOrder,
}

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Items in whatever order currently holds.
    #[inline]
    pub fn as_slice(&self) -> &[Item] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.data.iter()
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.order = SortOrder::ById;
    }

    pub fn sort_by_id(&mut self) {
        match self.order {
            SortOrder::ById => {}
            SortOrder::ByScore => {
                self.data.sort_by_key(|it| it.id);
            }
            SortOrder::Unsorted => {
                self.data.sort_by_key(|it| it.id);
            }
        }
        self.order = SortOrder::ById;
    }

    pub fn sort_by_score(&mut self) {
        if self.order == SortOrder::ByScore {
            return;
        }
        if self.order == SortOrder::Unsorted {
            self.sort_by_id();
        }
        self.data.sort_by(Item::cmp_by_score);
        self.order = SortOrder::ByScore;
    }

    #[inline]
    fn search(&mut self, id: u32) -> std::result::Result<usize, usize> {
        self.sort_by_id();
        self.data.binary_search_by_key(&id, |it| it.id)
    }

    /// Set the score of `id`, inserting it if absent. Returns `true` when the
    /// id was not present before.
    pub fn upsert(&mut self, id: u32, score: f32) -> bool {
        match self.search(id) {
            Ok(pos) => {
                self.data[pos].score = score;
                false
            }
            Err(pos) => {
                self.data.insert(pos, Item::new(id, score));
                true
            }
        }
    }

    pub fn lookup(&mut self, id: u32) -> Option<f32> {
        let pos = self.search(id).ok()?;
        Some(self.data[pos].score)
    }

    /// Score of `id` without changing the current order.
    pub fn get(&self, id: u32) -> Option<f32> {
        match self.order {
            SortOrder::ById => self
                .data
                .binary_search_by_key(&id, |it| it.id)
                .ok()
                .map(|pos| self.data[pos].score),
            SortOrder::ByScore | SortOrder::Unsorted => {
                self.data.iter().find(|it| it.id == id).map(|it| it.score)
            }
        }
    }

    pub fn delete(&mut self, id: u32) -> bool {
        match self.search(id) {
            Ok(pos) => {
                self.data.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Keep only the items whose id satisfies `keep`, leaving the list in id
    /// order. Returns the number of items dropped.
    pub fn retain_ids<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(u32) -> bool,
    {
        let before = self.data.len();
        self.data.retain(|it| keep(it.id));
        self.sort_by_id();
        before - self.data.len()
    }

    /// Write every item as a little-endian record, always in id order.
    pub fn encode<W: Write>(&mut self, mut w: W) -> Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        self.sort_by_id();
        let mut buf = [0u8; RECORD_SIZE];
        let mut written = 0usize;
        for it in &self.data {
            buf[..4].copy_from_slice(&it.id.to_le_bytes());
            buf[4..].copy_from_slice(&it.score.to_bits().to_le_bytes());
            let n = loop {
                match w.write(&buf) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(source) => return Err(Error::Write { written, source }),
                }
            };
            if n != RECORD_SIZE {
                return Err(Error::ShortWrite {
                    expected: RECORD_SIZE,
                    written: n,
                });
            }
            written += n;
        }
        Ok(())
    }

    /// Read records until a clean end of stream. The result is marked id
    /// ordered only when the records arrived strictly ascending by id. A
    /// repeated id keeps its first record.
    pub fn decode<R: Read>(mut r: R) -> Result<Self> {
        let mut data = Vec::new();
        let mut buf = [0u8; RECORD_SIZE];
        let mut ascending = true;
        loop {
            let filled = read_record(&mut r, &mut buf)?;
            if filled == 0 {
                break;
            }
            if filled < RECORD_SIZE {
                return Err(Error::TruncatedRecord {
                    len: data.len() * RECORD_SIZE + filled,
                });
            }
            let id = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
            let score = f32::from_bits(u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]));
            if let Some(prev) = data.last().map(|it: &Item| it.id) {
                ascending &= prev < id;
            }
            data.push(Item::new(id, score));
        }
        let order = if ascending {
            SortOrder::ById
        } else {
            let mut seen = HashSet::with_capacity(data.len());
            data.retain(|it| seen.insert(it.id));
            SortOrder::Unsorted
        };
        Ok(Self { data, order })
    }
}

/// Fill `buf` from `r`, stopping early only at end of stream.
fn read_record<R: Read>(r: &mut R, buf: &mut [u8; RECORD_SIZE]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < RECORD_SIZE {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl FromIterator<(u32, f32)> for ItemList {
    fn from_iter<T: IntoIterator<Item = (u32, f32)>>(iter: T) -> Self {
        let mut list = ItemList::new();
        for (id, score) in iter {
            list.upsert(id, score);
        }
        list
    }
}
