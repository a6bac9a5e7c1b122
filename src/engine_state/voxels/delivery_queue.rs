//! # Delivery Queue
//!
//! Unbounded multi-producer, single-consumer hand-off from extraction workers to the
//! owning thread. Producers never block; the consumer polls.
//!
//! `clear` may race with producers that have not yet noticed a cancellation, so an
//! item pushed concurrently with a clear can survive it. Nothing derives scheduling
//! state from the queue contents for that reason.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// The owning thread's end of the queue.
pub struct DeliveryQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

/// A producer handle, cloned into every worker task.
pub struct DeliverySender<T> {
    sender: Sender<T>,
}

impl<T> Clone for DeliverySender<T> {
    fn clone(&self) -> Self {
        DeliverySender {
            sender: self.sender.clone(),
        }
    }
}

impl<T> DeliverySender<T> {
    /// Pushes an item without blocking.
    ///
    /// Returns `false` if the queue has been dropped, in which case the item is
    /// discarded.
    pub fn push(&self, item: T) -> bool {
        self.sender.send(item).is_ok()
    }
}

impl<T> Default for DeliveryQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeliveryQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        DeliveryQueue { sender, receiver }
    }

    pub fn sender(&self) -> DeliverySender<T> {
        DeliverySender {
            sender: self.sender.clone(),
        }
    }

    /// Takes the oldest queued item, if any. Never blocks.
    pub fn pop(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Discards everything queued right now and returns how many items were dropped.
    pub fn clear(&self) -> usize {
        self.receiver.try_iter().count()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, thread};

    #[test]
    fn pop_on_empty_returns_none() {
        let queue: DeliveryQueue<u32> = DeliveryQueue::new();
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn single_producer_is_fifo() {
        let queue = DeliveryQueue::new();
        let sender = queue.sender();
        for i in 0..5 {
            assert!(sender.push(i));
        }
        assert_eq!(queue.len(), 5);
        let drained: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn many_producers_lose_nothing() {
        let queue = DeliveryQueue::new();
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for i in 0..250 {
                        sender.push(p * 1000 + i);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let items: HashSet<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(items.len(), 1000);
    }

    #[test]
    fn clear_discards_queued_items() {
        let queue = DeliveryQueue::new();
        let sender = queue.sender();
        sender.push("a");
        sender.push("b");
        assert_eq!(queue.clear(), 2);
        assert!(queue.pop().is_none());

        sender.push("c");
        assert_eq!(queue.pop(), Some("c"));
    }

    #[test]
    fn push_after_queue_dropped_reports_failure() {
        let queue = DeliveryQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.push(1));
    }
}
