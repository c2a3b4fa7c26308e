use {
    super::{
        verification::{
            Verified,
            VerifyBidInput,
        },
        Service,
    },
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::{
            BidAmount,
            BidId,
        },
        metrics,
    },
    std::sync::Arc,
    time::OffsetDateTime,
    uuid::Uuid,
};

pub struct SubmitBidInput {
    pub bid_create: entities::BidCreate,
}

/// One arbitration's result: the durable ledger record plus the aggregate
/// snapshot to report (absent while the item has no high bid).
pub struct Arbitration {
    pub bid:      entities::Bid,
    pub high_bid: Option<entities::HighBid>,
}

const MAX_SAVE_ATTEMPTS: usize = 4;

impl Service {
    #[tracing::instrument(
        skip_all,
        fields(bid_id, item_id, outcome),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn submit_bid(&self, input: SubmitBidInput) -> Result<Arbitration, RestError> {
        let bid_create = input.bid_create;
        tracing::Span::current().record("item_id", bid_create.item_id.to_string());

        // Ownership gate before any lock or mutation: bids for an auction
        // assigned elsewhere are redirected, not arbitrated.
        if let Some(owner) = self.store.shard_map.owner_of(bid_create.auction_id) {
            if owner != self.store.node_id() {
                return Err(RestError::NotAuctionOwner(owner));
            }
        }

        // Replaying an already recorded bid id returns the recorded outcome
        // without touching the aggregate again.
        if let Some(bid_id) = bid_create.bid_id {
            if let Some(recorded) = self.repo.get_bid(bid_id).await? {
                tracing::Span::current().record("bid_id", bid_id.to_string());
                tracing::debug!("Replayed an already recorded bid.");
                let high_bid = self
                    .repo
                    .get_high_bid(recorded.auction_id, recorded.item_id)
                    .await?;
                return Ok(Arbitration {
                    bid: recorded,
                    high_bid,
                });
            }
        }
        let bid_id = bid_create.bid_id.unwrap_or_else(Uuid::new_v4);
        tracing::Span::current().record("bid_id", bid_id.to_string());

        let verified = self
            .verify_bid(VerifyBidInput {
                bid_create: bid_create.clone(),
            })
            .await?;
        let (item, credit_limit) = match verified {
            Verified::Rejected(outcome) => {
                let high_bid = self
                    .repo
                    .get_high_bid(bid_create.auction_id, bid_create.item_id)
                    .await?;
                let arbitration = self
                    .record_outcome(&bid_create, bid_id, outcome, high_bid)
                    .await?;
                tracing::Span::current().record("outcome", outcome.to_string());
                return Ok(arbitration);
            }
            Verified::Candidate { item, credit_limit } => (item, credit_limit),
        };

        let item_lock = self.repo.get_or_create_item_lock(item.id).await;
        let guard = tokio::time::timeout(self.config.lock_timeout, item_lock.lock())
            .await
            .map_err(|_| RestError::LockTimeout)?;
        let arbitration = self
            .arbitrate(&bid_create, bid_id, &item, credit_limit)
            .await;
        drop(guard);

        if let Ok(arbitration) = &arbitration {
            tracing::Span::current().record("outcome", arbitration.bid.outcome.to_string());
            let sold = arbitration
                .high_bid
                .as_ref()
                .is_some_and(|high| high.state == entities::BiddingState::Sold);
            if sold {
                self.repo.remove_item_lock(item.id).await;
            }
        }
        arbitration
    }

    /// The read-evaluate-write loop, run under the item lock. The lock
    /// serializes writers on this node; the version compare-and-swap in
    /// `save_high_bid` catches writers the lock cannot see, sending the
    /// loop back to a fresh read.
    async fn arbitrate(
        &self,
        bid_create: &entities::BidCreate,
        bid_id: BidId,
        item: &entities::Item,
        credit_limit: BidAmount,
    ) -> Result<Arbitration, RestError> {
        let policy = self.config.timing;
        for _attempt in 0..MAX_SAVE_ATTEMPTS {
            let mut current = self
                .repo
                .get_high_bid(bid_create.auction_id, bid_create.item_id)
                .await?;
            let now = self.store.clock.now();

            // Elapsed deadlines apply before the candidate is looked at, so
            // a late bid observes the sale instead of racing the sweeper.
            if let Some(high) = current.as_mut() {
                if high.advance(now, &policy) == Some(entities::BiddingState::Sold) {
                    if !self.repo.save_high_bid(high).await? {
                        continue;
                    }
                    high.version += 1;
                    let closed = high.clone();
                    self.finalize_sale(&closed).await?;
                    return self
                        .record_outcome(
                            bid_create,
                            bid_id,
                            entities::BidOutcome::ItemSold,
                            Some(closed),
                        )
                        .await;
                }
            }

            let (outcome, accepted) = Self::evaluate(
                current.as_ref(),
                item,
                bid_create,
                bid_id,
                credit_limit,
                now,
                &policy,
            );
            match accepted {
                None => {
                    return self
                        .record_outcome(bid_create, bid_id, outcome, current)
                        .await
                }
                Some(mut updated) => {
                    if !self.repo.save_high_bid(&updated).await? {
                        tracing::debug!(
                            item_id = %bid_create.item_id,
                            "High bid version conflict, re-evaluating."
                        );
                        continue;
                    }
                    updated.version += 1;
                    let arbitration = self
                        .record_outcome(bid_create, bid_id, outcome, Some(updated.clone()))
                        .await?;
                    self.notifier.notify(bid_create.item_id, Arc::new(updated));
                    return Ok(arbitration);
                }
            }
        }
        tracing::warn!(item_id = %bid_create.item_id, "Exhausted high bid save attempts.");
        Err(RestError::TemporarilyUnavailable)
    }

    /// Pure candidate evaluation against the aggregate at lock-acquisition
    /// time. Returns the outcome tag and, when accepted, the aggregate to
    /// persist.
    fn evaluate(
        current: Option<&entities::HighBid>,
        item: &entities::Item,
        bid_create: &entities::BidCreate,
        bid_id: BidId,
        credit_limit: BidAmount,
        now: OffsetDateTime,
        policy: &entities::TimingPolicy,
    ) -> (entities::BidOutcome, Option<entities::HighBid>) {
        match current {
            None => {
                if bid_create.amount < item.starting_bid {
                    (entities::BidOutcome::BelowStarting, None)
                } else if bid_create.amount > credit_limit {
                    (entities::BidOutcome::InsufficientFunds, None)
                } else {
                    (
                        entities::BidOutcome::Starting,
                        Some(entities::HighBid::starting(bid_create, bid_id, now, policy)),
                    )
                }
            }
            Some(high) if high.state == entities::BiddingState::Sold => {
                (entities::BidOutcome::ItemSold, None)
            }
            Some(high) => {
                if high.user_id == bid_create.user_id {
                    (entities::BidOutcome::AlreadyHighBidder, None)
                } else if bid_create.amount == high.amount {
                    (entities::BidOutcome::AfterMatching, None)
                } else if bid_create.amount < high.amount {
                    (entities::BidOutcome::AfterHigher, None)
                } else if bid_create.amount > credit_limit {
                    (entities::BidOutcome::InsufficientFunds, None)
                } else {
                    let mut updated = high.clone();
                    updated.record_high(
                        bid_id,
                        bid_create.user_id,
                        bid_create.amount,
                        now,
                        policy,
                    );
                    (entities::BidOutcome::High, Some(updated))
                }
            }
        }
    }

    /// Write the arbitrated bid to the ledger (durably, before the outcome
    /// is returned) and emit the best-effort telemetry record.
    async fn record_outcome(
        &self,
        bid_create: &entities::BidCreate,
        bid_id: BidId,
        outcome: entities::BidOutcome,
        high_bid: Option<entities::HighBid>,
    ) -> Result<Arbitration, RestError> {
        let bid = entities::Bid {
            id: bid_id,
            item_id: bid_create.item_id,
            auction_id: bid_create.auction_id,
            user_id: bid_create.user_id,
            amount: bid_create.amount,
            bid_time: bid_create.bid_time,
            receiving_node: self.store.node_id(),
            outcome,
        };
        self.repo.add_bid(&bid).await?;
        if outcome.is_accepted() {
            tracing::debug!(amount = bid.amount, "Accepted a new winning bid.");
        }

        let completion_time = self.store.clock.now();
        self.repo.add_completion_stats(
            &bid,
            high_bid.as_ref().map(|high| high.state),
            self.store.node_id(),
            completion_time,
        );
        metrics::observe_bid_completion(
            outcome,
            (completion_time - bid.bid_time).as_seconds_f64(),
        );
        Ok(Arbitration { bid, high_bid })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            auction::{
                entities::{
                    BidCreate,
                    BidOutcome,
                    BiddingState,
                    HighBid,
                    ItemState,
                },
                repository::MockDatabase,
                service::tests::FakeDb,
            },
        },
        std::collections::HashMap,
        uuid::Uuid,
    };

    fn bid_create(
        auction_id: Uuid,
        item_id: Uuid,
        user_id: Uuid,
        amount: u64,
    ) -> SubmitBidInput {
        SubmitBidInput {
            bid_create: BidCreate {
                bid_id: None,
                auction_id,
                item_id,
                user_id,
                amount,
                bid_time: OffsetDateTime::now_utc(),
            },
        }
    }

    #[tokio::test]
    async fn first_bid_above_starting_opens_bidding() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);

        let arbitration = service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();

        assert_eq!(arbitration.bid.outcome, BidOutcome::Starting);
        let high = arbitration.high_bid.unwrap();
        assert_eq!(high.amount, 1000);
        assert_eq!(high.bid_count, 1);
        assert_eq!(high.state, BiddingState::Open);
        assert_eq!(db.0.bids.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lower_bid_is_rejected_without_mutation() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);
        service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();

        let rival = db.add_user(100_000);
        let arbitration = service
            .submit_bid(bid_create(auction.id, item.id, rival, 800))
            .await
            .unwrap();

        assert_eq!(arbitration.bid.outcome, BidOutcome::AfterHigher);
        let high = arbitration.high_bid.unwrap();
        assert_eq!(high.amount, 1000);
        assert_eq!(high.bid_count, 1);
        // Rejections still land in the ledger.
        assert_eq!(db.0.bids.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn matching_bid_loses_to_the_earlier_one() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);
        service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();

        let rival = db.add_user(100_000);
        let arbitration = service
            .submit_bid(bid_create(auction.id, item.id, rival, 1000))
            .await
            .unwrap();
        assert_eq!(arbitration.bid.outcome, BidOutcome::AfterMatching);
        assert_eq!(arbitration.high_bid.unwrap().user_id, user);
    }

    #[tokio::test]
    async fn current_winner_cannot_raise_their_own_bid() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);
        service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();

        let arbitration = service
            .submit_bid(bid_create(auction.id, item.id, user, 1200))
            .await
            .unwrap();

        assert_eq!(arbitration.bid.outcome, BidOutcome::AlreadyHighBidder);
        let high = arbitration.high_bid.unwrap();
        assert_eq!(high.amount, 1000);
        assert_eq!(high.bid_count, 1);
    }

    #[tokio::test]
    async fn bid_below_starting_amount_is_rejected() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);

        let arbitration = service
            .submit_bid(bid_create(auction.id, item.id, user, 400))
            .await
            .unwrap();
        assert_eq!(arbitration.bid.outcome, BidOutcome::BelowStarting);
        assert!(arbitration.high_bid.is_none());
        assert!(db.0.high_bids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bid_over_credit_limit_is_rejected_without_mutation() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);
        service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();

        let poor_rival = db.add_user(1100);
        let arbitration = service
            .submit_bid(bid_create(auction.id, item.id, poor_rival, 1200))
            .await
            .unwrap();
        assert_eq!(arbitration.bid.outcome, BidOutcome::InsufficientFunds);
        assert_eq!(arbitration.high_bid.unwrap().amount, 1000);
    }

    #[tokio::test]
    async fn unknown_references_resolve_to_business_outcomes() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);

        let no_auction = service
            .submit_bid(bid_create(Uuid::new_v4(), item.id, user, 1000))
            .await
            .unwrap();
        assert_eq!(no_auction.bid.outcome, BidOutcome::NoSuchAuction);

        let no_item = service
            .submit_bid(bid_create(auction.id, Uuid::new_v4(), user, 1000))
            .await
            .unwrap();
        assert_eq!(no_item.bid.outcome, BidOutcome::NoSuchItem);

        let no_user = service
            .submit_bid(bid_create(auction.id, item.id, Uuid::new_v4(), 1000))
            .await
            .unwrap();
        assert_eq!(no_user.bid.outcome, BidOutcome::NoSuchUser);
    }

    #[tokio::test]
    async fn auction_outside_its_window_rejects_fresh_bidding() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);

        // Not yet started.
        db.0.auctions.lock().unwrap().get_mut(&auction.id).unwrap().start_time =
            now + time::Duration::hours(1);
        let early = service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();
        assert_eq!(early.bid.outcome, BidOutcome::AuctionNotRunning);

        // Past the scheduled end with no bidding underway.
        {
            let mut auctions = db.0.auctions.lock().unwrap();
            let row = auctions.get_mut(&auction.id).unwrap();
            row.start_time = now - time::Duration::hours(2);
            row.end_time = now - time::Duration::hours(1);
        }
        let late = service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();
        assert_eq!(late.bid.outcome, BidOutcome::AuctionNotRunning);
        assert!(db.0.high_bids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn raises_past_the_scheduled_end_ride_out_the_countdown() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);
        service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();

        // The window closes while the item still carries a live high bid.
        db.0.auctions.lock().unwrap().get_mut(&auction.id).unwrap().end_time =
            now - time::Duration::seconds(1);

        let rival = db.add_user(100_000);
        let raise = service
            .submit_bid(bid_create(auction.id, item.id, rival, 2000))
            .await
            .unwrap();
        assert_eq!(raise.bid.outcome, BidOutcome::High);
        assert_eq!(raise.high_bid.unwrap().bid_count, 2);
    }

    #[tokio::test]
    async fn zero_amount_is_a_bad_parameter_not_an_outcome() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db, 1);

        let result = service
            .submit_bid(bid_create(auction.id, item.id, user, 0))
            .await;
        assert!(matches!(result, Err(RestError::BadParameters(_))));
    }

    #[tokio::test]
    async fn foreign_auction_is_redirected_without_mutation() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);
        service
            .store()
            .shard_map
            .replace(HashMap::from([(auction.id, 7)]));

        let result = service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await;
        assert!(matches!(result, Err(RestError::NotAuctionOwner(7))));
        assert!(db.0.high_bids.lock().unwrap().is_empty());
        assert!(db.0.bids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn replaying_a_recorded_bid_id_never_mutates_twice() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);

        let bid_id = Uuid::new_v4();
        let mut input = bid_create(auction.id, item.id, user, 1000);
        input.bid_create.bid_id = Some(bid_id);
        let first = service.submit_bid(input).await.unwrap();
        assert_eq!(first.bid.outcome, BidOutcome::Starting);

        let mut replay = bid_create(auction.id, item.id, user, 1000);
        replay.bid_create.bid_id = Some(bid_id);
        let second = service.submit_bid(replay).await.unwrap();

        assert_eq!(second.bid, first.bid);
        assert_eq!(second.high_bid.unwrap().bid_count, 1);
        assert_eq!(db.0.bids.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn racing_raises_serialize_to_exactly_two_transitions() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);
        service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();

        let bidder_c = db.add_user(100_000);
        let bidder_d = db.add_user(100_000);
        let service_c = service.clone();
        let service_d = service.clone();
        let (auction_id, item_id) = (auction.id, item.id);
        let (c, d) = tokio::join!(
            tokio::spawn(async move {
                service_c
                    .submit_bid(bid_create(auction_id, item_id, bidder_c, 1500))
                    .await
            }),
            tokio::spawn(async move {
                service_d
                    .submit_bid(bid_create(auction_id, item_id, bidder_d, 2000))
                    .await
            }),
        );
        let c = c.unwrap().unwrap();
        let d = d.unwrap().unwrap();

        // The 2000 raise always wins; the 1500 raise wins only if it got
        // the lock first. Either way the count reflects exactly the
        // accepted transitions.
        assert_eq!(d.bid.outcome, BidOutcome::High);
        let final_high = db
            .0
            .high_bids
            .lock()
            .unwrap()
            .get(&(auction.id, item.id))
            .cloned()
            .unwrap();
        assert_eq!(final_high.amount, 2000);
        assert_eq!(final_high.user_id, bidder_d);
        match c.bid.outcome {
            BidOutcome::High => assert_eq!(final_high.bid_count, 3),
            BidOutcome::AfterHigher => assert_eq!(final_high.bid_count, 2),
            outcome => panic!("unexpected outcome for the slower raise: {outcome}"),
        }
    }

    #[tokio::test]
    async fn late_bid_closes_the_item_and_observes_the_sale() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db.clone(), 1);
        let first = service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();
        let winning_bid_id = first.bid.id;

        // Force both deadlines into the past, as if the quiet period and
        // the close countdown already elapsed.
        {
            let mut high_bids = db.0.high_bids.lock().unwrap();
            let high = high_bids.get_mut(&(auction.id, item.id)).unwrap();
            high.state = BiddingState::LastCall;
            high.bidding_end_time = now - time::Duration::seconds(1);
        }

        let rival = db.add_user(100_000);
        let arbitration = service
            .submit_bid(bid_create(auction.id, item.id, rival, 5000))
            .await
            .unwrap();

        assert_eq!(arbitration.bid.outcome, BidOutcome::ItemSold);
        assert_eq!(arbitration.high_bid.unwrap().state, BiddingState::Sold);

        let item_row = db.0.items.lock().unwrap().get(&item.id).cloned().unwrap();
        assert_eq!(item_row.state, ItemState::Sold);
        assert_eq!(item_row.purchase_price, Some(1000));
        assert_eq!(
            db.0.bids.lock().unwrap().get(&winning_bid_id).unwrap().outcome,
            BidOutcome::Winning
        );
        // The last item resolved, so the auction concluded.
        assert!(db
            .0
            .auctions
            .lock()
            .unwrap()
            .get(&auction.id)
            .unwrap()
            .conclusion_time
            .is_some());
    }

    #[tokio::test]
    async fn persistent_version_conflicts_surface_as_retryable_failure() {
        let auction_id = Uuid::new_v4();
        let item_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let mut db = MockDatabase::new();
        let auction = crate::auction::entities::Auction {
            id:              auction_id,
            start_time:      now - time::Duration::hours(1),
            end_time:        now + time::Duration::hours(1),
            conclusion_time: None,
        };
        let item = crate::auction::entities::Item {
            id:             item_id,
            auction_id,
            state:          ItemState::Active,
            starting_bid:   500,
            purchase_price: None,
        };
        db.expect_get_auction()
            .returning(move |_| Ok(Some(auction.clone())));
        db.expect_get_item().returning(move |_| Ok(Some(item.clone())));
        db.expect_get_user_credit_limit()
            .returning(|_| Ok(Some(100_000)));
        db.expect_get_high_bid().returning(|_, _| Ok(None));
        // Another node keeps winning the compare-and-swap.
        db.expect_save_high_bid().returning(|_| Ok(false));

        let service = Service::new_with_mocks(db, 1);
        let result = service
            .submit_bid(bid_create(auction_id, item_id, user_id, 1000))
            .await;
        assert!(matches!(result, Err(RestError::TemporarilyUnavailable)));
    }

    #[tokio::test]
    async fn accepted_bid_wakes_parked_observers() {
        let now = OffsetDateTime::now_utc();
        let (db, auction, item, user) = FakeDb::with_auction_item_user(now, 500, 100_000);
        let service = Service::new_with_mocks(db, 1);

        let mut parked = service.notifier.park(item.id, 0);
        service
            .submit_bid(bid_create(auction.id, item.id, user, 1000))
            .await
            .unwrap();

        let update = (&mut parked.rx).await.unwrap();
        assert_eq!(update.bid_count, 1);
        assert_eq!(update.amount, 1000);
    }

    #[test]
    fn evaluate_prefers_comparison_outcomes_over_credit() {
        let now = OffsetDateTime::now_utc();
        let policy = crate::auction::entities::TimingPolicy {
            last_call: std::time::Duration::from_secs(60),
            close:     std::time::Duration::from_secs(30),
        };
        let item = crate::auction::entities::Item {
            id:             Uuid::new_v4(),
            auction_id:     Uuid::new_v4(),
            state:          ItemState::Active,
            starting_bid:   500,
            purchase_price: None,
        };
        let holder = BidCreate {
            bid_id:     None,
            auction_id: item.auction_id,
            item_id:    item.id,
            user_id:    Uuid::new_v4(),
            amount:     1000,
            bid_time:   now,
        };
        let high = HighBid::starting(&holder, Uuid::new_v4(), now, &policy);

        // Too low and over the limit at once: the comparison wins.
        let broke_low = BidCreate {
            user_id: Uuid::new_v4(),
            amount: 800,
            ..holder.clone()
        };
        let (outcome, accepted) = Service::evaluate(
            Some(&high),
            &item,
            &broke_low,
            Uuid::new_v4(),
            100,
            now,
            &policy,
        );
        assert_eq!(outcome, BidOutcome::AfterHigher);
        assert!(accepted.is_none());
    }
}
