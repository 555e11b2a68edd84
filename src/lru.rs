//! LRU window: a bounded recency cache in front of the page store.
//!
//! Backed by the intrusive [`crate::list::List`] plus a hash map from key to
//! node pointer. `List::add` inserts at the front, so the front is the
//! freshest entry; hits are spliced to the front and the back is always the
//! eviction candidate, read off with `remove_last`.

use std::num::NonZeroUsize;

use hashbrown::HashMap;

use crate::key::{Expiration, Key};
use crate::list::{Entry, List};

#[derive(Debug, Clone, Copy)]
struct Node {
    key: Key,
    expiration: Expiration,
}

/// Bounded intrusive LRU window over `(Key, Expiration)` pairs.
pub struct LruWindow {
    list: List<Node>,
    index: HashMap<Key, *mut Entry<Node>>,
    ttl_eviction_prob: f64,
    rng: fastrand::Rng,
}

impl LruWindow {
    /// Builds a window holding at most `capacity` keys. `bernoulli_seed`
    /// seeds the Bernoulli sampler used when `ttl_eviction_prob > 0.0`; `0`
    /// means seed from the system's entropy source instead.
    pub fn new(capacity: usize, ttl_eviction_prob: f64, bernoulli_seed: u64) -> Self {
        let cap = NonZeroUsize::new(capacity).expect("LruWindow capacity must be nonzero");
        let rng = if bernoulli_seed == 0 {
            fastrand::Rng::new()
        } else {
            fastrand::Rng::with_seed(bernoulli_seed)
        };
        LruWindow {
            list: List::new(cap),
            index: HashMap::with_capacity(capacity),
            ttl_eviction_prob,
            rng,
        }
    }

    /// Inserts or refreshes `key` with expiration `exp`.
    ///
    /// - If `key` is already present, it is spliced to the MRU end and
    ///   nothing is returned: it is still warm in the window, not yet due
    ///   for admission into the page store.
    /// - If the window is at capacity, the LRU-end node is recycled in
    ///   place (its key/expiration overwritten) and moved to the MRU end;
    ///   the key that was evicted is returned so the caller can forward it
    ///   to the page store.
    /// - Otherwise a new node is allocated at the MRU end and `None` is
    ///   returned.
    pub fn update(&mut self, key: Key, exp: Expiration) -> Option<Key> {
        if let Some(&node) = self.index.get(&key) {
            // SAFETY: `node` was allocated by this window and is still live
            // because every removal path also removes it from `index`.
            unsafe {
                (*node).get_value_mut().expiration = exp;
                self.list.move_to_front(node);
            }
            return None;
        }

        if self.list.len() == self.list.cap().get() {
            let evicted_box = self
                .list
                .remove_last()
                .expect("len == cap > 0, so a last node exists");
            let evicted_key = unsafe { evicted_box.get_value().key };
            self.index.remove(&evicted_key);

            let raw = Box::into_raw(evicted_box);
            // SAFETY: `raw` was just detached and is not aliased elsewhere.
            unsafe {
                (*raw).get_value_mut().key = key;
                (*raw).get_value_mut().expiration = exp;
                self.list.attach_from_other_list(raw);
            }
            self.index.insert(key, raw);
            return Some(evicted_key);
        }

        let node = self
            .list
            .add(Node {
                key,
                expiration: exp,
            })
            .expect("capacity just checked above");
        self.index.insert(key, node);
        None
    }

    /// Looks up `key`. Absent keys miss. Present keys are evicted either
    /// deterministically (`expiration < now`) or, when `ttl_eviction_prob >
    /// 0`, by Bernoulli sampling at that probability; otherwise they are
    /// spliced to the MRU end and reported live.
    pub fn get(&mut self, key: Key, now: Expiration) -> bool {
        let Some(&node) = self.index.get(&key) else {
            return false;
        };

        // SAFETY: `node` is a live entry owned by this window.
        let expiration = unsafe { (*node).get_value().expiration };
        let evict = if self.ttl_eviction_prob > 0.0 {
            self.rng.f64() < self.ttl_eviction_prob
        } else {
            expiration < now
        };

        if evict {
            self.index.remove(&key);
            // SAFETY: `node` is a live entry in this list.
            unsafe {
                let _ = self.list.remove(node);
            }
            return false;
        }

        // SAFETY: `node` is a live entry in this list.
        unsafe { self.list.move_to_front(node) };
        true
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the window currently holds no keys.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl std::fmt::Debug for LruWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruWindow")
            .field("list", &self.list)
            .field("ttl_eviction_prob", &self.ttl_eviction_prob)
            .finish_non_exhaustive()
    }
}
