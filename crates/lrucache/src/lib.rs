//! # lrucache
//!
//! Fixed-capacity key-value cache with least-recently-used eviction.
//!
//! ## Architecture
//! - **HashMap**: AHash keyed map from key to arena slot (O(1) lookup)
//! - **LRU List**: Doubly-linked list over arena slots for recency (O(1) move and evict)
//! - **Free-list**: Evicted slots are reused, so the arena never outgrows capacity + 1
//!
//! ```
//! use lrucache::LruCache;
//!
//! let mut cache = LruCache::new(2)?;
//! cache.put(1, 1);
//! cache.put(2, 2);
//! assert_eq!(cache.get(1), Some(1));
//! cache.put(3, 3); // evicts 2
//! assert_eq!(cache.get(2), None);
//! # Ok::<(), lrucache::Error>(())
//! ```

#![warn(missing_docs)]

mod error;
mod lru;
mod stats;

pub use error::{Error, Result};
pub use lru::{Iter, Key, LruCache, Value};
pub use stats::CacheStats;
