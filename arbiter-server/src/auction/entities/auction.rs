use {
    crate::kernel::entities::{
        AuctionId,
        BidAmount,
        ItemId,
    },
    std::sync::Arc,
    strum::{
        Display,
        EnumString,
    },
    time::OffsetDateTime,
    tokio::sync::Mutex,
};

/// Exclusive critical section for one item's arbitration. Held for the
/// duration of a single submit call; bids on different items never contend.
pub type ItemLock = Arc<Mutex<()>>;

#[derive(Clone, Debug, PartialEq)]
pub struct Auction {
    pub id:              AuctionId,
    pub start_time:      OffsetDateTime,
    pub end_time:        OffsetDateTime,
    pub conclusion_time: Option<OffsetDateTime>,
}

impl Auction {
    /// An auction accepts bids inside its sale window until it concludes.
    /// The scheduled end is soft for items whose bidding is underway; the
    /// arbiter handles that exception, not this check.
    pub fn is_running(&self, now: OffsetDateTime) -> bool {
        self.conclusion_time.is_none() && self.start_time <= now && now < self.end_time
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ItemState {
    NotStarted,
    Active,
    Sold,
    Shipped,
    Paid,
    /// Tag for rows that fail validation on read.
    NoSuchItem,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id:             ItemId,
    pub auction_id:     AuctionId,
    pub state:          ItemState,
    pub starting_bid:   BidAmount,
    /// Fixed once the item sells; equals the winning high bid amount.
    pub purchase_price: Option<BidAmount>,
}
