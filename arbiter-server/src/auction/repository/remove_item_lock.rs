use {
    super::Repository,
    crate::kernel::entities::ItemId,
    std::sync::Arc,
};

impl Repository {
    pub async fn remove_item_lock(&self, item_id: ItemId) {
        let mut mutex_guard = self.in_memory_store.item_locks.lock().await;
        if let Some(item_lock) = mutex_guard.get(&item_id) {
            // Only drop the entry once no task is still borrowing the lock.
            if Arc::strong_count(item_lock) == 1 {
                mutex_guard.remove(&item_id);
            }
        }
    }
}
