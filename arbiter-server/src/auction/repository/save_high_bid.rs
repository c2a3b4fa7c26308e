use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    /// Persist the aggregate with a compare-and-swap on its version. A
    /// `false` return means another writer got there first; the caller
    /// re-reads and re-evaluates.
    #[tracing::instrument(skip_all, fields(item_id = %high_bid.item_id, version = high_bid.version))]
    pub async fn save_high_bid(&self, high_bid: &entities::HighBid) -> Result<bool, RestError> {
        self.db.save_high_bid(high_bid).await
    }
}
