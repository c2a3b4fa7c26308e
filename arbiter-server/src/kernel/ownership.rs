use {
    super::entities::{
        AuctionId,
        NodeId,
    },
    arc_swap::ArcSwap,
    std::{
        collections::HashMap,
        sync::Arc,
    },
};

/// Read-mostly snapshot of the auction shard assignment: each auction is
/// arbitrated by exactly one node. The assignment table is written by an
/// external rebalancer; nodes only read it and periodically reload.
pub struct ShardMap {
    local_node:  NodeId,
    assignments: ArcSwap<HashMap<AuctionId, NodeId>>,
}

impl ShardMap {
    pub fn new(local_node: NodeId) -> Self {
        Self {
            local_node,
            assignments: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    pub fn local_node(&self) -> NodeId {
        self.local_node
    }

    pub fn replace(&self, assignments: HashMap<AuctionId, NodeId>) {
        self.assignments.store(Arc::new(assignments));
    }

    pub fn owner_of(&self, auction_id: AuctionId) -> Option<NodeId> {
        self.assignments.load().get(&auction_id).copied()
    }

    /// An auction with no assignment record yet is arbitrated wherever it
    /// shows up; once a record exists only the named node may arbitrate.
    pub fn is_local_owner(&self, auction_id: AuctionId) -> bool {
        self.owner_of(auction_id)
            .map_or(true, |node| node == self.local_node)
    }
}
