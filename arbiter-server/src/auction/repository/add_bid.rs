use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    /// Append one arbitrated bid to the ledger. Awaited on the bid path:
    /// the outcome is not returned to the caller until the record is
    /// durable.
    #[tracing::instrument(skip_all, fields(bid_id = %bid.id), err(level = tracing::Level::TRACE))]
    pub async fn add_bid(&self, bid: &entities::Bid) -> Result<(), RestError> {
        self.db.add_bid(bid).await
    }
}
