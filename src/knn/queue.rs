use rust_decimal::Decimal;

use crate::error::{PointIndexError, Result};

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    priority: Decimal,
}

/// A priority queue whose number of elements is bounded by a fixed capacity.
///
/// Entries are kept in ascending priority order (lower is better), with ties
/// broken by insertion order. Enqueueing onto a full queue keeps the new entry
/// only when its priority is strictly better than the current worst entry's
/// priority, in which case the worst entry is evicted; otherwise the new entry
/// is dropped.
///
/// k-nearest-neighbor searches use a queue of capacity k keyed by distance to
/// the anchor: the queue itself decides whether a visited point is good enough
/// to keep, and its worst entry bounds the search radius.
///
/// Iterators borrow the queue, so the compiler rejects any structural
/// modification while one is live; the fail-fast iteration contract costs
/// nothing at run time.
#[derive(Debug, Clone)]
pub struct BoundedPriorityQueue<T> {
    entries: Vec<Entry<T>>,
    capacity: usize,
}

impl<T> BoundedPriorityQueue<T> {
    /// Create a queue holding at most `capacity` entries.
    ///
    /// Returns an error when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PointIndexError::InvalidConfig(
                "bounded queues need a positive capacity".to_string(),
            ));
        }
        Ok(Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        })
    }

    /// Insert `item` with the given priority, keeping entries ordered.
    ///
    /// Below capacity the item is always kept. At capacity it is kept only if
    /// its priority is strictly better than the current worst entry's, which
    /// is then evicted. Returns whether the item was kept.
    pub fn enqueue(&mut self, item: T, priority: Decimal) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| entry.priority > priority)
        {
            Some(index) => {
                if self.entries.len() == self.capacity {
                    self.entries.pop();
                }
                self.entries.insert(index, Entry { item, priority });
                true
            }
            None if self.entries.len() < self.capacity => {
                self.entries.push(Entry { item, priority });
                true
            }
            None => false,
        }
    }

    /// Remove and return the best (lowest-priority) item, or `None` when the
    /// queue is empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0).item)
        }
    }

    /// The best (lowest-priority) item, or `None` when the queue is empty.
    pub fn first(&self) -> Option<&T> {
        self.entries.first().map(|entry| &entry.item)
    }

    /// The worst (highest-priority) item, or `None` when the queue is empty.
    ///
    /// Useful for comparing a candidate against the worst retained priority,
    /// which in an ordered-buffer implementation takes constant time.
    pub fn last(&self) -> Option<&T> {
        self.entries.last().map(|entry| &entry.item)
    }

    /// The number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fixed capacity this queue was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over items in ascending priority order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

/// Iterator over queue items in ascending priority order.
#[derive(Debug)]
pub struct Iter<'a, T> {
    inner: std::slice::Iter<'a, Entry<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| &entry.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> IntoIterator for &'a BoundedPriorityQueue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Consuming iterator over queue items in ascending priority order.
#[derive(Debug)]
pub struct IntoIter<T> {
    inner: std::vec::IntoIter<Entry<T>>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| entry.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> IntoIterator for BoundedPriorityQueue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}
