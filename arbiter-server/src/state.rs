use crate::kernel::{
    clock::SimulatedClock,
    entities::NodeId,
    ownership::ShardMap,
};

/// Process-wide state, initialized once at startup and immutable for the
/// rest of the run (the shard map swaps whole snapshots, never edits one).
pub struct Store {
    pub clock:     SimulatedClock,
    pub shard_map: ShardMap,
}

impl Store {
    pub fn node_id(&self) -> NodeId {
        self.shard_map.local_node()
    }
}
