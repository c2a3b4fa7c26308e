use {
    super::Repository,
    crate::{
        auction::entities,
        kernel::entities::ItemId,
    },
};

impl Repository {
    pub async fn get_or_create_item_lock(&self, item_id: ItemId) -> entities::ItemLock {
        self.in_memory_store
            .item_locks
            .lock()
            .await
            .entry(item_id)
            .or_default()
            .clone()
    }
}
