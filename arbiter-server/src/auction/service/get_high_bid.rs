use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::ItemId,
    },
};

pub struct GetHighBidInput {
    pub item_id: ItemId,
}

impl Service {
    /// The observer's initial-state fetch before entering the long-poll
    /// loop.
    pub async fn get_high_bid(
        &self,
        input: GetHighBidInput,
    ) -> Result<entities::HighBid, RestError> {
        let item = self
            .repo
            .get_item(input.item_id)
            .await?
            .ok_or(RestError::ItemNotFound)?;
        self.repo
            .get_high_bid(item.auction_id, item.id)
            .await?
            .ok_or(RestError::BidNotFound)
    }
}
