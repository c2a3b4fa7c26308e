use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::{
            ItemId,
            UserId,
        },
    },
};

pub struct AwaitNextBidInput {
    pub item_id:        ItemId,
    /// The bid count the observer has already seen.
    pub last_bid_count: u64,
    /// When known, the observer is recorded as attending the auction.
    pub observer:       Option<UserId>,
}

/// A long poll resolves with an update or, after the bounded wait, with a
/// distinct no-update result. Neither is an error.
pub enum NextBid {
    Update(entities::HighBid),
    TimedOut,
}

impl Service {
    /// Answer immediately when the stored bid count already exceeds the
    /// caller's; otherwise park until a bid advances it or the wait times
    /// out. The calling task suspends, no worker thread is held.
    #[tracing::instrument(skip_all, fields(item_id = %input.item_id, last_bid_count = input.last_bid_count))]
    pub async fn await_next_bid(&self, input: AwaitNextBidInput) -> Result<NextBid, RestError> {
        let item = self
            .repo
            .get_item(input.item_id)
            .await?
            .ok_or(RestError::ItemNotFound)?;

        if let Some(observer) = input.observer {
            if let Err(err) = self
                .repo
                .record_attendance(observer, item.auction_id, self.store.clock.now())
                .await
            {
                tracing::warn!(error = ?err, observer = %observer, "Failed to record attendance.");
            }
        }

        if let Some(high_bid) = self.repo.get_high_bid(item.auction_id, item.id).await? {
            if high_bid.bid_count > input.last_bid_count {
                return Ok(NextBid::Update(high_bid));
            }
        }

        let mut parked = self.notifier.park(input.item_id, input.last_bid_count);

        // Re-check after parking: a bid landing between the read above and
        // the park would otherwise wake nobody.
        if let Some(high_bid) = self.repo.get_high_bid(item.auction_id, item.id).await? {
            if high_bid.bid_count > input.last_bid_count {
                return Ok(NextBid::Update(high_bid));
            }
        }

        match tokio::time::timeout(self.config.long_poll_timeout, &mut parked.rx).await {
            Ok(Ok(snapshot)) => Ok(NextBid::Update((*snapshot).clone())),
            // The sender vanished without an update; treat it as the bounded
            // wait ending empty-handed.
            Ok(Err(_)) => Ok(NextBid::TimedOut),
            Err(_elapsed) => Ok(NextBid::TimedOut),
        }
        // Dropping the parked waiter removes its queue entry.
    }
}
