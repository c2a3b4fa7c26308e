use {
    crate::{
        auction::entities,
        kernel::{
            analytics_db::AnalyticsInserter,
            entities::ItemId,
        },
    },
    std::collections::HashMap,
    tokio::sync::Mutex,
};

mod add_bid;
mod add_completion_stats;
mod conclude_auction;
mod db;
mod get_auction;
mod get_bid;
mod get_due_high_bids;
mod get_high_bid;
mod get_item;
mod get_or_create_item_lock;
mod get_ownership;
mod get_user_credit_limit;
mod mark_attendance_left;
mod mark_item_sold;
mod models;
mod promote_winning_bid;
mod record_attendance;
mod remove_item_lock;
mod save_high_bid;

pub use {
    db::Database,
    models::CompletionStatsRow,
};

#[cfg(test)]
pub use db::MockDatabase;

#[derive(Default)]
pub struct InMemoryStore {
    pub item_locks: Mutex<HashMap<ItemId, entities::ItemLock>>,
}

pub struct Repository {
    pub in_memory_store: InMemoryStore,
    db:                  Box<dyn Database>,
    stats:               AnalyticsInserter<CompletionStatsRow>,
}

impl Repository {
    pub fn new(db: impl Database, stats: AnalyticsInserter<CompletionStatsRow>) -> Self {
        Self {
            in_memory_store: InMemoryStore::default(),
            db: Box::new(db),
            stats,
        }
    }
}
