use std::collections::VecDeque;

/// Fixed-capacity FIFO. Pushing into a full buffer evicts the oldest element.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// A zero-capacity buffer stores nothing: every push hands the value straight back.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `val` at the tail and returns the evicted head, if any.
    pub fn push(&mut self, val: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(val);
        }
        let evicted = if self.data.len() >= self.capacity {
            self.data.pop_front()
        } else {
            None
        };
        self.data.push_back(val);
        evicted
    }

    pub fn last(&self) -> Option<&T> {
        self.data.back()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn get_as_vec(&self) -> Vec<T> {
        self.data.iter().cloned().collect()
    }
}
