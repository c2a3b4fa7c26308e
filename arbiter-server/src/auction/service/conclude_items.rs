use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::{
            AuctionId,
            ItemId,
        },
    },
};

impl Service {
    /// One sweep of locally-owned items whose deadline elapsed with no new
    /// bids. Each item is advanced under its own lock; the sweeper never
    /// bypasses the critical section the bid path uses.
    #[tracing::instrument(skip_all, fields(due, advanced))]
    pub async fn conclude_due_items(&self) -> Result<(), RestError> {
        let now = self.store.clock.now();
        let due = self.repo.get_due_high_bids(now).await?;
        tracing::Span::current().record("due", due.len());

        let mut advanced = 0;
        for high_bid in due {
            if !self.store.shard_map.is_local_owner(high_bid.auction_id) {
                continue;
            }
            if self
                .conclude_due_item(high_bid.auction_id, high_bid.item_id)
                .await?
            {
                advanced += 1;
            }
        }
        tracing::Span::current().record("advanced", advanced);
        Ok(())
    }

    async fn conclude_due_item(
        &self,
        auction_id: AuctionId,
        item_id: ItemId,
    ) -> Result<bool, RestError> {
        let item_lock = self.repo.get_or_create_item_lock(item_id).await;
        let guard = tokio::time::timeout(self.config.lock_timeout, item_lock.lock())
            .await
            .map_err(|_| RestError::LockTimeout)?;

        // Re-read under the lock; a raise may have pushed the deadline out
        // since the sweep query ran.
        let Some(mut high_bid) = self.repo.get_high_bid(auction_id, item_id).await? else {
            return Ok(false);
        };
        let now = self.store.clock.now();
        let transition = high_bid.advance(now, &self.config.timing);
        let advanced = match transition {
            None => false,
            Some(state) => {
                if !self.repo.save_high_bid(&high_bid).await? {
                    // A concurrent writer moved the aggregate; the next
                    // sweep picks it up if it is still due.
                    return Ok(false);
                }
                high_bid.version += 1;
                if state == entities::BiddingState::Sold {
                    self.finalize_sale(&high_bid).await?;
                }
                true
            }
        };
        drop(guard);
        if high_bid.state == entities::BiddingState::Sold {
            self.repo.remove_item_lock(item_id).await;
        }
        Ok(advanced)
    }
}
