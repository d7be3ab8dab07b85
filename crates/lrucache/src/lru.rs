//! LRU (Least Recently Used) cache implementation
//!
//! Nodes live in an arena of slots. Both the key map and the list links refer
//! to a node by its slot index, so a node can be spliced to the head in O(1)
//! without shared mutable references. Slots freed by eviction or removal are
//! handed out again through a free-list.

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::stats::CacheStats;

/// Key type stored by the cache
pub type Key = i64;

/// Value type stored by the cache
pub type Value = i64;

/// Upper bound on slots reserved up front; larger caches grow on demand.
const MAX_PREALLOC: usize = 1024;

/// Node in the LRU doubly-linked list
struct Node {
    key: Key,
    value: Value,
    /// Toward the head (more recently used)
    prev: Option<usize>,
    /// Toward the tail (less recently used)
    next: Option<usize>,
}

/// LRU cache with fixed capacity
///
/// `get` and `put` both mark the touched key as most recently used. Inserting
/// a new key into a full cache evicts exactly one entry, the least recently
/// used one.
///
/// The cache is not synchronized. Callers sharing it across threads must wrap
/// the whole cache in a lock.
pub struct LruCache {
    map: HashMap<Key, usize, RandomState>,
    nodes: Vec<Option<Node>>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
    stats: CacheStats,
}

impl LruCache {
    /// Create a new LRU cache with the given capacity
    ///
    /// # Errors
    /// * `Error::InvalidCapacity` if `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(0));
        }

        let prealloc = capacity.min(MAX_PREALLOC);
        debug!(capacity, "created LRU cache");

        Ok(Self {
            map: HashMap::with_capacity_and_hasher(prealloc, RandomState::new()),
            // One spare slot: a new node is linked before the tail is evicted.
            nodes: Vec::with_capacity(prealloc + 1),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Create a cache from a signed capacity, rejecting anything below 1
    pub fn try_from_signed(capacity: i64) -> Result<Self> {
        if capacity <= 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        let capacity = usize::try_from(capacity).map_err(|_| Error::InvalidCapacity(capacity))?;
        Self::new(capacity)
    }

    /// Get a value from the cache, marking the key as most recently used
    ///
    /// A miss returns `None` and leaves the recency order untouched.
    pub fn get(&mut self, key: Key) -> Option<Value> {
        let Some(&idx) = self.map.get(&key) else {
            self.stats.record_miss();
            return None;
        };

        self.move_to_head(idx);
        self.stats.record_hit();
        self.node(idx).map(|node| node.value)
    }

    /// Insert or overwrite a key-value pair, marking the key as most recently used
    ///
    /// Inserting a new key into a full cache evicts the least recently used
    /// entry. Overwriting an existing key never evicts.
    pub fn put(&mut self, key: Key, value: Value) {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = self.node_mut(idx) {
                node.value = value;
            }
            self.move_to_head(idx);
            self.stats.record_update();
            return;
        }

        let idx = self.alloc_node(Node {
            key,
            value,
            prev: None,
            next: None,
        });
        self.map.insert(key, idx);
        self.add_head(idx);
        self.stats.record_insert();

        if self.map.len() > self.capacity {
            if let Some(evicted) = self.pop_tail() {
                self.map.remove(&evicted.key);
                self.stats.record_eviction();
                trace!(
                    key = evicted.key,
                    capacity = self.capacity,
                    "evicted least recently used entry"
                );
            }
        }
    }

    /// Read a value without changing its recency or the statistics
    pub fn peek(&self, key: Key) -> Option<Value> {
        self.map
            .get(&key)
            .and_then(|&idx| self.node(idx))
            .map(|node| node.value)
    }

    /// Check whether a key is cached without changing its recency
    pub fn contains_key(&self, key: Key) -> bool {
        self.map.contains_key(&key)
    }

    /// Remove a key from the cache
    pub fn remove(&mut self, key: Key) -> Option<Value> {
        let idx = self.map.remove(&key)?;
        self.unlink(idx);
        self.release(idx).map(|node| node.value)
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the cache (capacity and statistics are kept)
    pub fn clear(&mut self) {
        debug!(entries = self.map.len(), "clearing LRU cache");
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterate over entries from most to least recently used
    ///
    /// Iteration does not count as an access.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            cache: self,
            next: self.head,
            remaining: self.map.len(),
        }
    }

    /// Iterate over keys from most to least recently used
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Reset cache statistics
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    fn add_head(&mut self, idx: usize) {
        let old_head = self.head;

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(head_idx) => {
                if let Some(head) = self.node_mut(head_idx) {
                    head.prev = Some(idx);
                }
            }
            None => {
                self.tail = Some(idx);
            }
        }

        self.head = Some(idx);
    }

    fn move_to_head(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);
        self.add_head(idx);
    }

    fn pop_tail(&mut self) -> Option<Node> {
        let tail_idx = self.tail?;
        self.unlink(tail_idx);
        self.release(tail_idx)
    }

    /// Detach a node, patching its neighbours (or head/tail) around it.
    fn unlink(&mut self, idx: usize) {
        let Some(node) = self.node_mut(idx) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = self.node_mut(prev_idx) {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = self.node_mut(next_idx) {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    fn alloc_node(&mut self, node: Node) -> usize {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    /// Take an unlinked node out of its slot and put the slot on the free-list.
    fn release(&mut self, idx: usize) -> Option<Node> {
        let node = self.nodes.get_mut(idx)?.take()?;
        self.free_list.push(idx);
        Some(node)
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a LruCache {
    type Item = (Key, Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a> {
    cache: &'a LruCache,
    next: Option<usize>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cache.node(self.next?)?;
        self.next = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
impl LruCache {
    /// Walk the list and assert every structural invariant.
    fn check_invariants(&self) {
        assert!(self.len() <= self.capacity, "over capacity");
        assert_eq!(self.head.is_none(), self.tail.is_none());

        let mut walked = Vec::new();
        let mut prev = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let node = self.node(idx).expect("linked slot must be live");
            assert_eq!(node.prev, prev, "back link of slot {idx}");
            assert_eq!(self.map.get(&node.key), Some(&idx), "map entry for {}", node.key);
            walked.push(idx);
            assert!(walked.len() <= self.map.len(), "list longer than map");
            prev = Some(idx);
            cur = node.next;
        }
        assert_eq!(self.tail, prev, "tail is not the last node");
        assert_eq!(walked.len(), self.map.len());

        let mut backward = Vec::new();
        let mut next = None;
        let mut cur = self.tail;
        while let Some(idx) = cur {
            let node = self.node(idx).expect("linked slot must be live");
            assert_eq!(node.next, next, "forward link of slot {idx}");
            backward.push(idx);
            assert!(backward.len() <= self.map.len(), "list longer than map");
            next = Some(idx);
            cur = node.prev;
        }
        assert_eq!(self.head, next, "head is not the first node");
        backward.reverse();
        assert_eq!(backward, walked, "walks disagree");

        let live = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(live, walked.len(), "orphaned live slot");

        let mut free = self.free_list.clone();
        free.sort_unstable();
        free.dedup();
        assert_eq!(free.len(), self.free_list.len(), "slot freed twice");
        assert!(free.iter().all(|&idx| self.nodes[idx].is_none()));
        assert_eq!(live + free.len(), self.nodes.len());
    }

    fn order(&self) -> Vec<Key> {
        self.keys().collect()
    }
}
