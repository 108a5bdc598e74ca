//! Bounded review queues
//!
//! Fixed-capacity ordered container used for the pending, approved and
//! rejected queues. Capacity and orientation are fixed at construction and
//! survive `clear()`.

use std::collections::VecDeque;
use twmod_common::events::Tweet;

/// Items that can be located in a queue by id
pub trait Identified {
    fn item_id(&self) -> u64;
}

impl Identified for Tweet {
    fn item_id(&self) -> u64 {
        self.id
    }
}

/// Upper bound on slots reserved up front
const PREALLOCATE_LIMIT: usize = 64;

/// Which end of the queue receives new items
///
/// Either way the element evicted at capacity is the oldest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Append at tail, evict head. Snapshot is oldest first.
    Fifo,
    /// Insert at head, evict tail. Snapshot is newest first.
    NewestFirst,
}

/// Fixed-capacity ordered queue
///
/// Invariant: `len() <= capacity` whenever `capacity > 0`.
#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    orientation: Orientation,
}

impl<T: Identified + Clone> BoundedQueue<T> {
    /// Create an empty queue; `capacity == 0` means unbounded
    pub fn new(capacity: usize, orientation: Orientation) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(PREALLOCATE_LIMIT)),
            capacity,
            orientation,
        }
    }

    /// Insert an item, evicting the oldest one first when full
    ///
    /// Returns the evicted item, if any.
    pub fn add(&mut self, item: T) -> Option<T> {
        let evicted = if self.capacity > 0 && self.items.len() >= self.capacity {
            match self.orientation {
                Orientation::Fifo => self.items.pop_front(),
                Orientation::NewestFirst => self.items.pop_back(),
            }
        } else {
            None
        };

        match self.orientation {
            Orientation::Fifo => self.items.push_back(item),
            Orientation::NewestFirst => self.items.push_front(item),
        }

        evicted
    }

    /// Remove and return the item with `id`, preserving the order of the rest
    pub fn remove_by_id(&mut self, id: u64) -> Option<T> {
        let index = self.items.iter().position(|item| item.item_id() == id)?;
        self.items.remove(index)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.items.iter().any(|item| item.item_id() == id)
    }

    /// Copy of the current contents in queue order
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    /// Take every item out, in queue order
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}
