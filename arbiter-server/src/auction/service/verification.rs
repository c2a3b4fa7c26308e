use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::BidAmount,
    },
};

pub struct VerifyBidInput {
    pub bid_create: entities::BidCreate,
}

/// What the checks outside the item lock concluded. Business rejections are
/// data, not errors: they still get written to the ledger and returned to
/// the caller as a recorded bid.
pub enum Verified {
    Rejected(entities::BidOutcome),
    Candidate {
        item:         entities::Item,
        credit_limit: BidAmount,
    },
}

impl Service {
    /// Resolve the candidate against auction, item, and identity state.
    /// Only the high-bid comparison and the credit check are deferred to
    /// the critical section.
    pub async fn verify_bid(&self, input: VerifyBidInput) -> Result<Verified, RestError> {
        let bid_create = &input.bid_create;
        if bid_create.amount == 0 {
            return Err(RestError::BadParameters(
                "bid amount must be positive".to_string(),
            ));
        }

        let auction = match self.repo.get_auction(bid_create.auction_id).await? {
            Some(auction) => auction,
            None => return Ok(Verified::Rejected(entities::BidOutcome::NoSuchAuction)),
        };
        let item = match self.repo.get_item(bid_create.item_id).await? {
            Some(item) => item,
            None => return Ok(Verified::Rejected(entities::BidOutcome::NoSuchItem)),
        };
        if item.auction_id != auction.id {
            return Ok(Verified::Rejected(entities::BidOutcome::NoSuchItem));
        }

        if auction.conclusion_time.is_some() {
            return Ok(Verified::Rejected(entities::BidOutcome::AuctionComplete));
        }
        let now = self.store.clock.now();
        if !auction.is_running(now) {
            // The scheduled end is soft while bidding is underway: an item
            // already carrying a high bid rides out its countdown, so
            // raises past the end of the window are still arbitrated.
            let bidding_underway = now >= auction.end_time
                && self
                    .repo
                    .get_high_bid(auction.id, item.id)
                    .await?
                    .is_some();
            if !bidding_underway {
                return Ok(Verified::Rejected(entities::BidOutcome::AuctionNotRunning));
            }
        }

        match item.state {
            entities::ItemState::Active => {}
            entities::ItemState::NotStarted => {
                return Ok(Verified::Rejected(entities::BidOutcome::ItemNotActive))
            }
            entities::ItemState::Sold
            | entities::ItemState::Shipped
            | entities::ItemState::Paid => {
                return Ok(Verified::Rejected(entities::BidOutcome::ItemSold))
            }
            entities::ItemState::NoSuchItem => {
                return Ok(Verified::Rejected(entities::BidOutcome::NoSuchItem))
            }
        }

        match self
            .repo
            .get_user_credit_limit(bid_create.user_id)
            .await?
        {
            Some(credit_limit) => Ok(Verified::Candidate { item, credit_limit }),
            None => Ok(Verified::Rejected(entities::BidOutcome::NoSuchUser)),
        }
    }
}
