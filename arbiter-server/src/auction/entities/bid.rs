use {
    crate::kernel::entities::{
        AuctionId,
        BidAmount,
        BidId,
        ItemId,
        NodeId,
        UserId,
    },
    strum::{
        Display,
        EnumString,
    },
    time::OffsetDateTime,
};

/// Terminal disposition of a submitted bid. These are expected, enumerable
/// results of arbitration, returned as data and never raised as errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum BidOutcome {
    /// First accepted bid on the item.
    Starting,
    /// Accepted as the new winning bid.
    High,
    /// Rejected: a higher bid already holds the item.
    AfterHigher,
    /// Rejected: a bid of the same amount already holds the item.
    AfterMatching,
    /// Rejected: the bidder already holds the winning bid.
    AlreadyHighBidder,
    /// Rejected: below the item's starting amount.
    BelowStarting,
    /// Rejected: the amount exceeds the bidder's credit limit.
    InsufficientFunds,
    /// The accepted bid that held when the item closed.
    Winning,
    AuctionComplete,
    AuctionNotRunning,
    NoSuchItem,
    ItemNotActive,
    ItemSold,
    NoSuchAuction,
    NoSuchUser,
    /// Synthetic marker, never produced by arbitration of a real bid.
    Dummy,
    Unknown,
}

impl BidOutcome {
    /// Whether arbitration made this bid the item's winning bid.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            BidOutcome::Starting | BidOutcome::High | BidOutcome::Winning
        )
    }

    pub fn message(&self) -> &'static str {
        match self {
            BidOutcome::Starting => "bid accepted, bidding opened",
            BidOutcome::High => "bid accepted as the new high bid",
            BidOutcome::AfterHigher => "outbid by a higher bid",
            BidOutcome::AfterMatching => "outbid by an equal, earlier bid",
            BidOutcome::AlreadyHighBidder => "you already hold the high bid",
            BidOutcome::BelowStarting => "bid is below the starting amount",
            BidOutcome::InsufficientFunds => "bid exceeds your credit limit",
            BidOutcome::Winning => "winning bid, item sold",
            BidOutcome::AuctionComplete => "the auction has completed",
            BidOutcome::AuctionNotRunning => "the auction is not running",
            BidOutcome::NoSuchItem => "no such item",
            BidOutcome::ItemNotActive => "the item is not open for bidding",
            BidOutcome::ItemSold => "the item has already sold",
            BidOutcome::NoSuchAuction => "no such auction",
            BidOutcome::NoSuchUser => "no such user",
            BidOutcome::Dummy => "marker record",
            BidOutcome::Unknown => "unknown outcome",
        }
    }
}

/// A bid as recorded in the ledger. Append-only: the single sanctioned
/// update is promoting the outcome to `Winning` when the item closes.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:             BidId,
    pub item_id:        ItemId,
    pub auction_id:     AuctionId,
    pub user_id:        UserId,
    pub amount:         BidAmount,
    pub bid_time:       OffsetDateTime,
    pub receiving_node: NodeId,
    pub outcome:        BidOutcome,
}

#[derive(Clone, Debug)]
pub struct BidCreate {
    /// Client-chosen id for idempotent replay; generated when absent.
    pub bid_id:     Option<BidId>,
    pub auction_id: AuctionId,
    pub item_id:    ItemId,
    pub user_id:    UserId,
    pub amount:     BidAmount,
    pub bid_time:   OffsetDateTime,
}
