use uuid::Uuid;

pub type AuctionId = Uuid;
pub type ItemId = Uuid;
pub type BidId = Uuid;
pub type UserId = Uuid;

/// Integer number identifying a processing node in the cluster.
pub type NodeId = i32;

/// Bid amounts are integer minor currency units (cents).
pub type BidAmount = u64;
