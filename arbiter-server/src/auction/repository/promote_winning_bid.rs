use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::BidId,
    },
};

impl Repository {
    /// The one sanctioned mutation of a ledger record: the owning bid's
    /// outcome becomes `winning` when its item closes. Guarded so a replay
    /// or a racing sweeper can apply it at most once.
    pub async fn promote_winning_bid(&self, bid_id: BidId) -> Result<bool, RestError> {
        let promoted = self.db.promote_winning_bid(bid_id).await?;
        if !promoted {
            tracing::debug!(bid_id = %bid_id, "Winning promotion already applied.");
        }
        Ok(promoted)
    }
}
