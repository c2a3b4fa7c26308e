use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::{
            AuctionId,
            UserId,
        },
    },
    time::OffsetDateTime,
};

impl Repository {
    /// A user observing an item is attending its auction. Re-attending
    /// after leaving flips the record back to attending.
    pub async fn record_attendance(
        &self,
        user_id: UserId,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<(), RestError> {
        self.db.record_attendance(user_id, auction_id, now).await
    }
}
