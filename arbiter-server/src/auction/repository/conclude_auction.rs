use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::AuctionId,
    },
    time::OffsetDateTime,
};

impl Repository {
    #[tracing::instrument(skip_all, fields(auction_id = %auction_id))]
    pub async fn conclude_auction_if_resolved(
        &self,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<bool, RestError> {
        let concluded = self.db.conclude_auction_if_resolved(auction_id, now).await?;
        if concluded {
            let closed = self.db.close_attendance(auction_id).await?;
            tracing::info!(
                auction_id = %auction_id,
                attendance_closed = closed,
                "Auction concluded, last item resolved."
            );
        }
        Ok(concluded)
    }
}
