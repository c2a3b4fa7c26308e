use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::{
            AuctionId,
            ItemId,
        },
    },
};

impl Repository {
    pub async fn get_high_bid(
        &self,
        auction_id: AuctionId,
        item_id: ItemId,
    ) -> Result<Option<entities::HighBid>, RestError> {
        self.db.get_high_bid(auction_id, item_id).await
    }
}
