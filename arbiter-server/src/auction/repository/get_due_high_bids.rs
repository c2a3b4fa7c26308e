use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
    time::OffsetDateTime,
};

const DUE_PAGE_SIZE: i64 = 256;

impl Repository {
    /// Unsold aggregates whose deadline has elapsed, oldest first.
    pub async fn get_due_high_bids(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<entities::HighBid>, RestError> {
        self.db.get_due_high_bids(now, DUE_PAGE_SIZE).await
    }
}
