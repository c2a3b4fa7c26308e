use {
    super::{
        entities,
        repository::{
            Database,
            Repository,
        },
    },
    crate::{
        kernel::analytics_db::AnalyticsInserter,
        state::Store,
    },
    self::notifier::Notifier,
    std::{
        sync::Arc,
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

pub mod await_next_bid;
pub mod conclude_item;
pub mod conclude_items;
pub mod get_high_bid;
pub mod leave_auction;
pub mod notifier;
pub mod submit_bid;
pub mod verification;
pub mod workers;

#[derive(Clone, Debug)]
pub struct Config {
    pub timing:                     entities::TimingPolicy,
    /// Bound on a long-poll wait before releasing the observer empty-handed.
    pub long_poll_timeout:          Duration,
    /// Bound on item-lock acquisition; elapsing surfaces as an explicit
    /// retryable failure, never a silently dropped bid.
    pub lock_timeout:               Duration,
    pub sweep_interval:             Duration,
    pub ownership_refresh_interval: Duration,
}

pub struct ServiceInner {
    store:        Arc<Store>,
    config:       Config,
    repo:         Arc<Repository>,
    notifier:     Arc<Notifier>,
    task_tracker: TaskTracker,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(
        store: Arc<Store>,
        db: impl Database,
        stats: AnalyticsInserter<super::repository::CompletionStatsRow>,
        config: Config,
        task_tracker: TaskTracker,
    ) -> Self {
        Self(Arc::new(ServiceInner {
            store,
            config,
            repo: Arc::new(Repository::new(db, stats)),
            notifier: Arc::new(Notifier::default()),
            task_tracker,
        }))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

#[cfg(test)]
pub mod tests {
    use {
        super::*,
        crate::{
            api::RestError,
            auction::entities::{
                Attendance,
                AttendanceState,
                Auction,
                Bid,
                BidOutcome,
                BiddingState,
                HighBid,
                Item,
                ItemState,
            },
            kernel::{
                clock::SimulatedClock,
                entities::{
                    AuctionId,
                    BidAmount,
                    BidId,
                    ItemId,
                    NodeId,
                    UserId,
                },
                ownership::ShardMap,
            },
        },
        axum::async_trait,
        std::{
            collections::HashMap,
            sync::Mutex,
        },
        time::OffsetDateTime,
        uuid::Uuid,
    };

    pub fn test_config() -> Config {
        Config {
            timing:                     entities::TimingPolicy {
                last_call: Duration::from_secs(60),
                close:     Duration::from_secs(30),
            },
            long_poll_timeout:          Duration::from_millis(200),
            lock_timeout:               Duration::from_secs(2),
            sweep_interval:             Duration::from_millis(50),
            ownership_refresh_interval: Duration::from_secs(5),
        }
    }

    impl Service {
        pub fn new_with_mocks(db: impl Database, node_id: NodeId) -> Self {
            let store = Arc::new(Store {
                clock:     SimulatedClock::with_offset(time::Duration::ZERO),
                shard_map: ShardMap::new(node_id),
            });
            Service::new(
                store,
                db,
                AnalyticsInserter::disabled(),
                test_config(),
                TaskTracker::new(),
            )
        }
    }

    /// In-memory stand-in for the two storage roles, with real
    /// compare-and-swap semantics so concurrency tests exercise the same
    /// retry paths the Postgres implementation would.
    #[derive(Default)]
    pub struct FakeDbState {
        pub auctions:   Mutex<HashMap<AuctionId, Auction>>,
        pub items:      Mutex<HashMap<ItemId, Item>>,
        pub users:      Mutex<HashMap<UserId, BidAmount>>,
        pub bids:       Mutex<HashMap<BidId, Bid>>,
        pub high_bids:  Mutex<HashMap<(AuctionId, ItemId), HighBid>>,
        pub attendance: Mutex<HashMap<(UserId, AuctionId), Attendance>>,
        pub ownership:  Mutex<HashMap<AuctionId, NodeId>>,
    }

    #[derive(Clone, Default)]
    pub struct FakeDb(pub Arc<FakeDbState>);

    impl FakeDb {
        pub fn with_auction_item_user(
            now: OffsetDateTime,
            starting_bid: BidAmount,
            credit_limit: BidAmount,
        ) -> (Self, Auction, Item, UserId) {
            let db = FakeDb::default();
            let auction = Auction {
                id:              Uuid::new_v4(),
                start_time:      now - time::Duration::hours(1),
                end_time:        now + time::Duration::hours(1),
                conclusion_time: None,
            };
            let item = Item {
                id:             Uuid::new_v4(),
                auction_id:     auction.id,
                state:          ItemState::Active,
                starting_bid,
                purchase_price: None,
            };
            let user_id = Uuid::new_v4();
            db.0.auctions
                .lock()
                .unwrap()
                .insert(auction.id, auction.clone());
            db.0.items.lock().unwrap().insert(item.id, item.clone());
            db.0.users.lock().unwrap().insert(user_id, credit_limit);
            (db, auction, item, user_id)
        }

        pub fn add_user(&self, credit_limit: BidAmount) -> UserId {
            let user_id = Uuid::new_v4();
            self.0.users.lock().unwrap().insert(user_id, credit_limit);
            user_id
        }
    }

    #[async_trait]
    impl Database for FakeDb {
        async fn get_auction(
            &self,
            auction_id: AuctionId,
        ) -> Result<Option<Auction>, RestError> {
            Ok(self.0.auctions.lock().unwrap().get(&auction_id).cloned())
        }

        async fn get_item(&self, item_id: ItemId) -> Result<Option<Item>, RestError> {
            Ok(self.0.items.lock().unwrap().get(&item_id).cloned())
        }

        async fn get_user_credit_limit(
            &self,
            user_id: UserId,
        ) -> Result<Option<BidAmount>, RestError> {
            Ok(self.0.users.lock().unwrap().get(&user_id).copied())
        }

        async fn get_bid(&self, bid_id: BidId) -> Result<Option<Bid>, RestError> {
            Ok(self.0.bids.lock().unwrap().get(&bid_id).cloned())
        }

        async fn add_bid(&self, bid: &Bid) -> Result<(), RestError> {
            let mut bids = self.0.bids.lock().unwrap();
            if bids.contains_key(&bid.id) {
                return Err(RestError::TemporarilyUnavailable);
            }
            bids.insert(bid.id, bid.clone());
            Ok(())
        }

        async fn promote_winning_bid(&self, bid_id: BidId) -> Result<bool, RestError> {
            let mut bids = self.0.bids.lock().unwrap();
            match bids.get_mut(&bid_id) {
                Some(bid)
                    if matches!(bid.outcome, BidOutcome::Starting | BidOutcome::High) =>
                {
                    bid.outcome = BidOutcome::Winning;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn get_high_bid(
            &self,
            auction_id: AuctionId,
            item_id: ItemId,
        ) -> Result<Option<HighBid>, RestError> {
            Ok(self
                .0
                .high_bids
                .lock()
                .unwrap()
                .get(&(auction_id, item_id))
                .cloned())
        }

        async fn save_high_bid(&self, high_bid: &HighBid) -> Result<bool, RestError> {
            let mut high_bids = self.0.high_bids.lock().unwrap();
            let key = (high_bid.auction_id, high_bid.item_id);
            match high_bids.get_mut(&key) {
                None if high_bid.version == 0 => {
                    let mut stored = high_bid.clone();
                    stored.version = 1;
                    high_bids.insert(key, stored);
                    Ok(true)
                }
                None => Ok(false),
                Some(stored) if stored.version == high_bid.version => {
                    *stored = high_bid.clone();
                    stored.version += 1;
                    Ok(true)
                }
                Some(_) => Ok(false),
            }
        }

        async fn get_due_high_bids(
            &self,
            now: OffsetDateTime,
            limit: i64,
        ) -> Result<Vec<HighBid>, RestError> {
            let mut due: Vec<HighBid> = self
                .0
                .high_bids
                .lock()
                .unwrap()
                .values()
                .filter(|high| {
                    high.state != BiddingState::Sold && high.bidding_end_time <= now
                })
                .cloned()
                .collect();
            due.sort_by_key(|high| high.bidding_end_time);
            due.truncate(limit as usize);
            Ok(due)
        }

        async fn mark_item_sold(
            &self,
            item_id: ItemId,
            purchase_price: BidAmount,
        ) -> Result<(), RestError> {
            if let Some(item) = self.0.items.lock().unwrap().get_mut(&item_id) {
                if item.state == ItemState::Active {
                    item.state = ItemState::Sold;
                    item.purchase_price = Some(purchase_price);
                }
            }
            Ok(())
        }

        async fn conclude_auction_if_resolved(
            &self,
            auction_id: AuctionId,
            now: OffsetDateTime,
        ) -> Result<bool, RestError> {
            let items = self.0.items.lock().unwrap();
            let unresolved = items.values().any(|item| {
                item.auction_id == auction_id
                    && matches!(item.state, ItemState::NotStarted | ItemState::Active)
            });
            drop(items);
            let mut auctions = self.0.auctions.lock().unwrap();
            match auctions.get_mut(&auction_id) {
                Some(auction) if auction.conclusion_time.is_none() && !unresolved => {
                    auction.conclusion_time = Some(now);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn record_attendance(
            &self,
            user_id: UserId,
            auction_id: AuctionId,
            now: OffsetDateTime,
        ) -> Result<(), RestError> {
            self.0.attendance.lock().unwrap().insert(
                (user_id, auction_id),
                Attendance {
                    user_id,
                    auction_id,
                    attend_time: now,
                    state: AttendanceState::Attending,
                },
            );
            Ok(())
        }

        async fn mark_attendance_left(&self, user_id: UserId) -> Result<u64, RestError> {
            let mut attendance = self.0.attendance.lock().unwrap();
            let mut affected = 0;
            for record in attendance.values_mut() {
                if record.user_id == user_id && record.state == AttendanceState::Attending {
                    record.state = AttendanceState::Left;
                    affected += 1;
                }
            }
            Ok(affected)
        }

        async fn close_attendance(&self, auction_id: AuctionId) -> Result<u64, RestError> {
            let mut attendance = self.0.attendance.lock().unwrap();
            let mut affected = 0;
            for record in attendance.values_mut() {
                if record.auction_id == auction_id
                    && record.state == AttendanceState::Attending
                {
                    record.state = AttendanceState::AuctionComplete;
                    affected += 1;
                }
            }
            Ok(affected)
        }

        async fn get_ownership(&self) -> Result<HashMap<AuctionId, NodeId>, RestError> {
            Ok(self.0.ownership.lock().unwrap().clone())
        }
    }
}
