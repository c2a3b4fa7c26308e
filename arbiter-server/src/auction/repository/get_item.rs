use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::ItemId,
    },
};

impl Repository {
    pub async fn get_item(&self, item_id: ItemId) -> Result<Option<entities::Item>, RestError> {
        self.db.get_item(item_id).await
    }
}
