use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::{
            AuctionId,
            NodeId,
        },
    },
    std::collections::HashMap,
};

impl Repository {
    /// The persisted shard map, written by the external rebalancer.
    pub async fn get_ownership(&self) -> Result<HashMap<AuctionId, NodeId>, RestError> {
        self.db.get_ownership().await
    }
}
