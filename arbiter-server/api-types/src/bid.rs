use {
    crate::NodeId,
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        IntoParams,
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type BidId = Uuid;
pub type AuctionId = Uuid;
pub type ItemId = Uuid;
pub type UserId = Uuid;

/// Bid amounts are integer minor currency units (cents).
pub type BidAmount = u64;

/// The bidding situation reported back to a client, combining the item's
/// current state with the disposition of the client's own request.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiddingState {
    /// The item is accepting bids normally.
    Open,
    /// The item is in its final countdown window; bids are still accepted.
    LastCall,
    /// The item is closed and its purchase price is fixed.
    Sold,
    /// The submitted bid was evaluated and rejected; see the message field.
    Info,
    /// The auction holding the item has concluded.
    AuctionComplete,
    /// The auction is not inside its sale window.
    AuctionNotActive,
    NoSuchAuction,
    ItemNotActive,
    NoSuchItem,
    NoSuchUser,
    /// The bid was recorded; no further evaluation detail is available.
    Accepted,
    Unknown,
}

/// A bid submission. The bid time is the client's clock reading on the
/// simulated timeline; arbitration order is decided by the server, not by
/// this timestamp.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct SubmitBid {
    #[schema(example = "f47ac10b-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id: AuctionId,
    #[schema(example = "2bd9cbb1-7b51-4d0a-97d4-6b2f1a08d7f6", value_type = String)]
    pub item_id:    ItemId,
    #[schema(example = "7fd305e5-0d1e-4c84-b8e6-6b36eb4c6d9d", value_type = String)]
    pub user_id:    UserId,
    /// Bid amount in minor currency units. Must be positive.
    #[schema(example = 1000)]
    pub amount:     BidAmount,
    /// Submission time on the simulated timeline.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub bid_time:   OffsetDateTime,
    /// Optional client-chosen bid id. Resubmitting with the same id returns
    /// the originally recorded outcome instead of re-arbitrating.
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = Option<String>)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_id:     Option<BidId>,
}

/// The shape every bid-facing response takes, for both submissions and
/// long-poll updates.
#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone, Debug)]
pub struct BidRepresentation {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:             BidId,
    #[schema(example = 1000)]
    pub amount:         BidAmount,
    pub bidding_state:  BiddingState,
    /// Number of accepted winning bids on the item so far. Pass this back as
    /// the cursor when long-polling for the next bid.
    #[schema(example = 3)]
    pub last_bid_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub bid_time:       OffsetDateTime,
    /// The node that received and arbitrated the request.
    #[schema(example = 1)]
    pub receiving_node: NodeId,
    #[schema(value_type = String)]
    pub user_id:        UserId,
    #[schema(value_type = String)]
    pub item_id:        ItemId,
    #[schema(value_type = String)]
    pub auction_id:     AuctionId,
    /// Human-readable disposition, e.g. why a bid was rejected.
    #[schema(example = "outbid by a higher bid")]
    pub message:        String,
}

#[derive(Serialize, Deserialize, IntoParams, Clone, Copy, Debug)]
pub struct NextBidParams {
    /// The bid count the caller has already seen. The request completes as
    /// soon as the item's bid count exceeds this value.
    #[param(example = 3)]
    pub last_bid_count: u64,
    /// When present, the caller is recorded as attending the item's
    /// auction.
    #[param(value_type = Option<String>)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id:        Option<UserId>,
}

#[derive(Serialize, Deserialize, IntoParams, Clone, Copy, Debug)]
pub struct ItemPathParams {
    #[param(value_type = String)]
    pub item_id: ItemId,
}
