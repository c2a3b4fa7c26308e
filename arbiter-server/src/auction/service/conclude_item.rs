use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
    std::sync::Arc,
};

impl Service {
    /// The item has closed: fix the purchase price, promote the owning bid
    /// to winning exactly once, conclude the auction when this was its last
    /// unresolved item, and wake observers with the terminal snapshot.
    ///
    /// Callers persist the sold aggregate first; this only applies the
    /// consequences.
    pub(super) async fn finalize_sale(
        &self,
        high_bid: &entities::HighBid,
    ) -> Result<(), RestError> {
        debug_assert!(high_bid.state == entities::BiddingState::Sold);
        self.repo
            .mark_item_sold(high_bid.item_id, high_bid.amount)
            .await?;
        self.repo.promote_winning_bid(high_bid.bid_id).await?;
        self.repo
            .conclude_auction_if_resolved(high_bid.auction_id, self.store.clock.now())
            .await?;
        tracing::info!(
            item_id = %high_bid.item_id,
            purchase_price = high_bid.amount,
            winning_bid = %high_bid.bid_id,
            "Item sold."
        );
        self.notifier
            .notify(high_bid.item_id, Arc::new(high_bid.clone()));
        Ok(())
    }
}
