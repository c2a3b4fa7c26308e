use {
    crate::{
        auction::entities,
        kernel::entities::{
            AuctionId,
            BidAmount,
            BidId,
            ItemId,
            NodeId,
            UserId,
        },
    },
    clickhouse::Row,
    serde::Serialize,
    sqlx::FromRow,
    time::{
        OffsetDateTime,
        PrimitiveDateTime,
    },
    uuid::Uuid,
};

pub fn to_primitive(time: OffsetDateTime) -> PrimitiveDateTime {
    let utc = time.to_offset(time::UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

fn to_amount(amount: i64, field: &str) -> anyhow::Result<BidAmount> {
    BidAmount::try_from(amount).map_err(|_| anyhow::anyhow!("Negative {} in row", field))
}

#[derive(Clone, FromRow, Debug)]
pub struct AuctionRow {
    pub id:              AuctionId,
    pub start_time:      PrimitiveDateTime,
    pub end_time:        PrimitiveDateTime,
    pub conclusion_time: Option<PrimitiveDateTime>,
}

impl AuctionRow {
    pub fn get_entity(&self) -> entities::Auction {
        entities::Auction {
            id:              self.id,
            start_time:      self.start_time.assume_utc(),
            end_time:        self.end_time.assume_utc(),
            conclusion_time: self.conclusion_time.map(|time| time.assume_utc()),
        }
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct ItemRow {
    pub id:             ItemId,
    pub auction_id:     AuctionId,
    pub state:          String,
    pub starting_bid:   i64,
    pub purchase_price: Option<i64>,
}

impl ItemRow {
    pub fn get_entity(&self) -> anyhow::Result<entities::Item> {
        Ok(entities::Item {
            id:             self.id,
            auction_id:     self.auction_id,
            state:          self
                .state
                .parse()
                .unwrap_or(entities::ItemState::NoSuchItem),
            starting_bid:   to_amount(self.starting_bid, "starting_bid")?,
            purchase_price: self
                .purchase_price
                .map(|price| to_amount(price, "purchase_price"))
                .transpose()?,
        })
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct BidRow {
    pub id:             BidId,
    pub item_id:        ItemId,
    pub auction_id:     AuctionId,
    pub usr_id:         UserId,
    pub amount:         i64,
    pub bid_time:       PrimitiveDateTime,
    pub receiving_node: NodeId,
    pub outcome:        String,
}

impl BidRow {
    pub fn new(bid: &entities::Bid) -> anyhow::Result<Self> {
        Ok(Self {
            id:             bid.id,
            item_id:        bid.item_id,
            auction_id:     bid.auction_id,
            usr_id:         bid.user_id,
            amount:         i64::try_from(bid.amount)
                .map_err(|_| anyhow::anyhow!("Bid amount does not fit the ledger column"))?,
            bid_time:       to_primitive(bid.bid_time),
            receiving_node: bid.receiving_node,
            outcome:        bid.outcome.to_string(),
        })
    }

    pub fn get_entity(&self) -> anyhow::Result<entities::Bid> {
        Ok(entities::Bid {
            id:             self.id,
            item_id:        self.item_id,
            auction_id:     self.auction_id,
            user_id:        self.usr_id,
            amount:         to_amount(self.amount, "amount")?,
            bid_time:       self.bid_time.assume_utc(),
            receiving_node: self.receiving_node,
            outcome:        self
                .outcome
                .parse()
                .unwrap_or(entities::BidOutcome::Unknown),
        })
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct HighBidRow {
    pub auction_id:       AuctionId,
    pub item_id:          ItemId,
    pub bid_id:           BidId,
    pub usr_id:           UserId,
    pub amount:           i64,
    pub bid_count:        i64,
    pub current_bid_time: PrimitiveDateTime,
    pub bidding_end_time: PrimitiveDateTime,
    pub state:            String,
    pub version:          i64,
}

impl HighBidRow {
    pub fn get_entity(&self) -> anyhow::Result<entities::HighBid> {
        Ok(entities::HighBid {
            auction_id:       self.auction_id,
            item_id:          self.item_id,
            bid_id:           self.bid_id,
            user_id:          self.usr_id,
            amount:           to_amount(self.amount, "amount")?,
            bid_count:        u64::try_from(self.bid_count)
                .map_err(|_| anyhow::anyhow!("Negative bid_count in row"))?,
            current_bid_time: self.current_bid_time.assume_utc(),
            bidding_end_time: self.bidding_end_time.assume_utc(),
            state:            self
                .state
                .parse()
                .map_err(|_| anyhow::anyhow!("Unrecognized bidding state {:?}", self.state))?,
            version:          self.version,
        })
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct AttendanceRow {
    pub usr_id:      UserId,
    pub auction_id:  AuctionId,
    pub attend_time: PrimitiveDateTime,
    pub state:       String,
}

impl AttendanceRow {
    pub fn get_entity(&self) -> entities::Attendance {
        entities::Attendance {
            user_id:     self.usr_id,
            auction_id:  self.auction_id,
            attend_time: self.attend_time.assume_utc(),
            state:       self
                .state
                .parse()
                .unwrap_or(entities::AttendanceState::BadRecord),
        }
    }
}

/// Per-bid processing telemetry. Write-once, never read by the core.
#[derive(Clone, Debug, Row, Serialize)]
pub struct CompletionStatsRow {
    #[serde(with = "clickhouse::serde::uuid")]
    pub bid_id:          Uuid,
    /// Microseconds between the client's submission time and arbitration
    /// completing on this node.
    pub delay_micros:    i64,
    pub receiving_node:  NodeId,
    pub completing_node: NodeId,
    pub bidding_state:   String,
    #[serde(with = "clickhouse::serde::time::datetime64::micros")]
    pub completion_time: OffsetDateTime,
}
