use {
    super::bid::BidCreate,
    crate::kernel::entities::{
        AuctionId,
        BidAmount,
        BidId,
        ItemId,
        UserId,
    },
    std::time::Duration,
    strum::{
        Display,
        EnumString,
    },
    time::OffsetDateTime,
};

/// Bidding state of one item. Transitions only ever move forward:
/// `Open -> LastCall -> Sold`, with `Sold` terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum BiddingState {
    Open,
    LastCall,
    Sold,
}

/// Deadline windows driving the state machine. Both come from
/// configuration; no duration is hard-coded.
#[derive(Clone, Copy, Debug)]
pub struct TimingPolicy {
    /// Quiet period after the latest accepted bid before the item enters
    /// its final countdown.
    pub last_call: Duration,
    /// Length of the final countdown. A new high bid restarts it.
    pub close:     Duration,
}

/// The current winning bid for one (auction, item): the single mutable
/// aggregate of the core. Mutated only by the arbiter under the item lock;
/// the version counter guards against writers on other nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct HighBid {
    pub auction_id:       AuctionId,
    pub item_id:          ItemId,
    /// The bid currently holding the item.
    pub bid_id:           BidId,
    pub user_id:          UserId,
    pub amount:           BidAmount,
    /// Count of accepted winning bids; strictly increases, never resets.
    pub bid_count:        u64,
    pub current_bid_time: OffsetDateTime,
    /// Next deadline the state machine acts on.
    pub bidding_end_time: OffsetDateTime,
    pub state:            BiddingState,
    /// Optimistic concurrency counter, bumped on every persisted write.
    pub version:          i64,
}

impl HighBid {
    /// Aggregate created by the first accepted bid on an item.
    pub fn starting(
        bid_create: &BidCreate,
        bid_id: BidId,
        now: OffsetDateTime,
        policy: &TimingPolicy,
    ) -> Self {
        Self {
            auction_id:       bid_create.auction_id,
            item_id:          bid_create.item_id,
            bid_id,
            user_id:          bid_create.user_id,
            amount:           bid_create.amount,
            bid_count:        1,
            current_bid_time: now,
            bidding_end_time: now + policy.last_call,
            state:            BiddingState::Open,
            version:          0,
        }
    }

    /// Install a new winning bid. Resets the deadline for the current
    /// state: the quiet-period window while `Open`, the close countdown
    /// while `LastCall` (active bidding keeps the item from closing).
    pub fn record_high(
        &mut self,
        bid_id: BidId,
        user_id: UserId,
        amount: BidAmount,
        now: OffsetDateTime,
        policy: &TimingPolicy,
    ) {
        debug_assert!(self.state != BiddingState::Sold);
        self.bid_id = bid_id;
        self.user_id = user_id;
        self.amount = amount;
        self.bid_count += 1;
        self.current_bid_time = now;
        self.bidding_end_time = now
            + match self.state {
                BiddingState::Open => policy.last_call,
                BiddingState::LastCall | BiddingState::Sold => policy.close,
            };
    }

    /// Apply every deadline that has elapsed by `now`, returning the final
    /// state if it changed. Never regresses; `Sold` is absorbing.
    pub fn advance(&mut self, now: OffsetDateTime, policy: &TimingPolicy) -> Option<BiddingState> {
        let mut changed = None;
        loop {
            match self.state {
                BiddingState::Open if now >= self.bidding_end_time => {
                    self.state = BiddingState::LastCall;
                    self.bidding_end_time = self.bidding_end_time + policy.close;
                    changed = Some(self.state);
                }
                BiddingState::LastCall if now >= self.bidding_end_time => {
                    self.state = BiddingState::Sold;
                    changed = Some(self.state);
                }
                _ => return changed,
            }
        }
    }
}
