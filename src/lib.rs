#![deny(clippy::uninlined_format_args)]
#![deny(clippy::to_string_in_format_args)]
//! Concurrent sets of `u32` ids backed by a roaring bitmap, with optional
//! per-id scores for ranked pagination.
//!
//! ```
//! use rankset::RankedSet;
//!
//! let set = RankedSet::new();
//! for id in 1..10 {
//!     set.insert(id, (10 - id) as f32);
//! }
//! let mut page = [0u32; 3];
//! assert_eq!(set.rank(0, &mut page), 3);
//! assert_eq!(page, [9, 8, 7]);
//! ```

pub mod bitmap;
pub mod error;
pub mod item;
pub mod set;
pub mod snapshot;

pub use bitmap::Membership;
pub use error::{Error, Result};
pub use item::{Item, ItemList, SortOrder};
pub use set::RankedSet;
pub use snapshot::SnapshotOptions;
