use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::BidId,
    },
};

impl Repository {
    pub async fn get_bid(&self, bid_id: BidId) -> Result<Option<entities::Bid>, RestError> {
        self.db.get_bid(bid_id).await
    }
}
