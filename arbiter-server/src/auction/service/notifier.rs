use {
    crate::{
        auction::entities,
        kernel::entities::ItemId,
    },
    std::{
        collections::{
            HashMap,
            VecDeque,
        },
        sync::{
            atomic::{
                AtomicU64,
                Ordering,
            },
            Arc,
            Mutex,
        },
    },
    tokio::sync::oneshot,
};

/// Long-poll fan-out. Observers park a oneshot waiter per item keyed by the
/// bid count they have already seen; a bid-count advance wakes every waiter
/// behind the new count with the same immutable snapshot, in arrival order.
#[derive(Default)]
pub struct Notifier {
    next_waiter_id: AtomicU64,
    waiters:        Mutex<HashMap<ItemId, VecDeque<Entry>>>,
}

enum Entry {
    Waiter(Waiter),
    /// Delimits one wake round: entries parked behind the marker arrived
    /// while notification was in flight and wait for the next round.
    Marker,
}

struct Waiter {
    id:             u64,
    last_bid_count: u64,
    tx:             oneshot::Sender<Arc<entities::HighBid>>,
}

/// A parked observer. Dropping it (client disconnect, timeout) removes the
/// queue entry, leaving no state behind.
pub struct ParkedWaiter {
    notifier: Arc<Notifier>,
    item_id:  ItemId,
    id:       u64,
    pub rx:   oneshot::Receiver<Arc<entities::HighBid>>,
}

impl Drop for ParkedWaiter {
    fn drop(&mut self) {
        self.notifier.cancel(self.item_id, self.id);
    }
}

impl Notifier {
    pub fn park(self: &Arc<Self>, item_id: ItemId, last_bid_count: u64) -> ParkedWaiter {
        let id = self.next_waiter_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.waiters
            .lock()
            .expect("notifier lock poisoned")
            .entry(item_id)
            .or_default()
            .push_back(Entry::Waiter(Waiter {
                id,
                last_bid_count,
                tx,
            }));
        ParkedWaiter {
            notifier: self.clone(),
            item_id,
            id,
            rx,
        }
    }

    fn cancel(&self, item_id: ItemId, waiter_id: u64) {
        let mut waiters = self.waiters.lock().expect("notifier lock poisoned");
        if let Some(queue) = waiters.get_mut(&item_id) {
            queue.retain(
                |entry| !matches!(entry, Entry::Waiter(waiter) if waiter.id == waiter_id),
            );
            if queue.is_empty() {
                waiters.remove(&item_id);
            }
        }
    }

    /// Run one wake round against a post-write snapshot. Waiters whose
    /// recorded count is below the snapshot's receive it; the rest stay
    /// parked ahead of any arrivals from during the round.
    pub fn notify(&self, item_id: ItemId, snapshot: Arc<entities::HighBid>) {
        {
            let mut waiters = self.waiters.lock().expect("notifier lock poisoned");
            match waiters.get_mut(&item_id) {
                Some(queue) => queue.push_back(Entry::Marker),
                None => return,
            }
        }

        let mut still_parked = Vec::new();
        loop {
            let entry = {
                let mut waiters = self.waiters.lock().expect("notifier lock poisoned");
                waiters.get_mut(&item_id).and_then(VecDeque::pop_front)
            };
            match entry {
                Some(Entry::Waiter(waiter)) => {
                    if waiter.last_bid_count < snapshot.bid_count {
                        // A dropped receiver just means the observer left.
                        let _ = waiter.tx.send(snapshot.clone());
                    } else {
                        still_parked.push(waiter);
                    }
                }
                Some(Entry::Marker) | None => break,
            }
        }

        let mut waiters = self.waiters.lock().expect("notifier lock poisoned");
        if !still_parked.is_empty() {
            let queue = waiters.entry(item_id).or_default();
            for waiter in still_parked.into_iter().rev() {
                queue.push_front(Entry::Waiter(waiter));
            }
        }
        if let Some(queue) = waiters.get(&item_id) {
            if queue.is_empty() {
                waiters.remove(&item_id);
            }
        }
    }

    #[cfg(test)]
    pub fn parked_count(&self, item_id: ItemId) -> usize {
        self.waiters
            .lock()
            .unwrap()
            .get(&item_id)
            .map_or(0, |queue| {
                queue
                    .iter()
                    .filter(|entry| matches!(entry, Entry::Waiter(_)))
                    .count()
            })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::entities::{
            BiddingState,
            HighBid,
        },
        time::OffsetDateTime,
        uuid::Uuid,
    };

    fn snapshot(item_id: ItemId, bid_count: u64) -> Arc<HighBid> {
        Arc::new(HighBid {
            auction_id: Uuid::new_v4(),
            item_id,
            bid_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: 1000 + bid_count * 100,
            bid_count,
            current_bid_time: OffsetDateTime::now_utc(),
            bidding_end_time: OffsetDateTime::now_utc(),
            state: BiddingState::Open,
            version: bid_count as i64,
        })
    }

    #[tokio::test]
    async fn waiters_behind_the_count_wake_in_arrival_order() {
        let notifier = Arc::new(Notifier::default());
        let item_id = Uuid::new_v4();
        let mut first = notifier.park(item_id, 0);
        let mut second = notifier.park(item_id, 1);

        notifier.notify(item_id, snapshot(item_id, 2));

        let first_update = (&mut first.rx).await.unwrap();
        let second_update = (&mut second.rx).await.unwrap();
        assert_eq!(first_update.bid_count, 2);
        assert_eq!(second_update.bid_count, 2);
        assert_eq!(notifier.parked_count(item_id), 0);
    }

    #[tokio::test]
    async fn waiter_ahead_of_the_count_stays_parked() {
        let notifier = Arc::new(Notifier::default());
        let item_id = Uuid::new_v4();
        let mut ahead = notifier.park(item_id, 5);

        notifier.notify(item_id, snapshot(item_id, 3));
        assert_eq!(notifier.parked_count(item_id), 1);
        assert!(ahead.rx.try_recv().is_err());

        notifier.notify(item_id, snapshot(item_id, 6));
        assert_eq!((&mut ahead.rx).await.unwrap().bid_count, 6);
    }

    #[tokio::test]
    async fn dropping_a_parked_waiter_removes_its_entry() {
        let notifier = Arc::new(Notifier::default());
        let item_id = Uuid::new_v4();
        let waiter = notifier.park(item_id, 0);
        assert_eq!(notifier.parked_count(item_id), 1);
        drop(waiter);
        assert_eq!(notifier.parked_count(item_id), 0);
    }

    #[tokio::test]
    async fn notify_without_waiters_is_a_no_op() {
        let notifier = Arc::new(Notifier::default());
        let item_id = Uuid::new_v4();
        notifier.notify(item_id, snapshot(item_id, 1));
        assert_eq!(notifier.parked_count(item_id), 0);
    }

    #[tokio::test]
    async fn every_waiter_sees_the_same_snapshot() {
        let notifier = Arc::new(Notifier::default());
        let item_id = Uuid::new_v4();
        let waiters: Vec<_> = (0..8).map(|_| notifier.park(item_id, 0)).collect();

        let update = snapshot(item_id, 1);
        notifier.notify(item_id, update.clone());
        for mut waiter in waiters {
            let received = (&mut waiter.rx).await.unwrap();
            assert_eq!(received.amount, update.amount);
            assert_eq!(received.bid_count, 1);
        }
    }
}
