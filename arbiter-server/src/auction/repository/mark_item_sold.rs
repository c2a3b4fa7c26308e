use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::{
            BidAmount,
            ItemId,
        },
    },
};

impl Repository {
    pub async fn mark_item_sold(
        &self,
        item_id: ItemId,
        purchase_price: BidAmount,
    ) -> Result<(), RestError> {
        self.db.mark_item_sold(item_id, purchase_price).await
    }
}
