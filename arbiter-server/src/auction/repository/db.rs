#[cfg(test)]
use mockall::automock;
use {
    super::models,
    crate::{
        api::RestError,
        auction::entities,
        kernel::{
            db::DB,
            entities::{
                AuctionId,
                BidAmount,
                BidId,
                ItemId,
                NodeId,
                UserId,
            },
        },
    },
    axum::async_trait,
    sqlx::Row as _,
    std::collections::HashMap,
    time::OffsetDateTime,
};

fn temporarily_unavailable<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> RestError {
    move |err| {
        tracing::error!(error = %err, "DB: {}", context);
        RestError::TemporarilyUnavailable
    }
}

/// Strongly-consistent keyed store plus the append-oriented bid ledger.
/// Business rows in, entities out; infrastructure failures surface as
/// retryable `RestError`s, never as business outcomes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Send + Sync + 'static {
    async fn get_auction(&self, auction_id: AuctionId)
        -> Result<Option<entities::Auction>, RestError>;
    async fn get_item(&self, item_id: ItemId) -> Result<Option<entities::Item>, RestError>;
    async fn get_user_credit_limit(
        &self,
        user_id: UserId,
    ) -> Result<Option<BidAmount>, RestError>;

    async fn get_bid(&self, bid_id: BidId) -> Result<Option<entities::Bid>, RestError>;
    async fn add_bid(&self, bid: &entities::Bid) -> Result<(), RestError>;
    /// Promote a recorded winning-capable bid to `winning`. Guarded so the
    /// promotion applies at most once; returns whether a row changed.
    async fn promote_winning_bid(&self, bid_id: BidId) -> Result<bool, RestError>;

    async fn get_high_bid(
        &self,
        auction_id: AuctionId,
        item_id: ItemId,
    ) -> Result<Option<entities::HighBid>, RestError>;
    /// Compare-and-swap write of the aggregate: an unpersisted entity
    /// (version 0) inserts, anything else updates only when the stored
    /// version still matches. Returns whether the write landed.
    async fn save_high_bid(&self, high_bid: &entities::HighBid) -> Result<bool, RestError>;
    async fn get_due_high_bids(
        &self,
        now: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<entities::HighBid>, RestError>;

    async fn mark_item_sold(
        &self,
        item_id: ItemId,
        purchase_price: BidAmount,
    ) -> Result<(), RestError>;
    /// Set the auction's conclusion time once no unresolved items remain.
    /// Returns whether this call concluded it.
    async fn conclude_auction_if_resolved(
        &self,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<bool, RestError>;

    async fn record_attendance(
        &self,
        user_id: UserId,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<(), RestError>;
    async fn mark_attendance_left(&self, user_id: UserId) -> Result<u64, RestError>;
    async fn close_attendance(&self, auction_id: AuctionId) -> Result<u64, RestError>;

    async fn get_ownership(&self) -> Result<HashMap<AuctionId, NodeId>, RestError>;
}

#[async_trait]
impl Database for DB {
    async fn get_auction(
        &self,
        auction_id: AuctionId,
    ) -> Result<Option<entities::Auction>, RestError> {
        let row: Option<models::AuctionRow> = sqlx::query_as(
            "SELECT id, start_time, end_time, conclusion_time FROM auction WHERE id = $1",
        )
        .bind(auction_id)
        .fetch_optional(self)
        .await
        .map_err(temporarily_unavailable("Failed to fetch auction"))?;
        Ok(row.map(|row| row.get_entity()))
    }

    async fn get_item(&self, item_id: ItemId) -> Result<Option<entities::Item>, RestError> {
        let row: Option<models::ItemRow> = sqlx::query_as(
            "SELECT id, auction_id, state, starting_bid, purchase_price FROM item WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(self)
        .await
        .map_err(temporarily_unavailable("Failed to fetch item"))?;
        row.map(|row| {
            row.get_entity()
                .map_err(temporarily_unavailable("Failed to convert item row"))
        })
        .transpose()
    }

    async fn get_user_credit_limit(
        &self,
        user_id: UserId,
    ) -> Result<Option<BidAmount>, RestError> {
        let row = sqlx::query("SELECT credit_limit FROM usr WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self)
            .await
            .map_err(temporarily_unavailable("Failed to fetch user"))?;
        row.map(|row| {
            BidAmount::try_from(row.get::<i64, _>("credit_limit"))
                .map_err(temporarily_unavailable("Negative credit limit in row"))
        })
        .transpose()
    }

    async fn get_bid(&self, bid_id: BidId) -> Result<Option<entities::Bid>, RestError> {
        let row: Option<models::BidRow> = sqlx::query_as(
            "SELECT id, item_id, auction_id, usr_id, amount, bid_time, receiving_node, outcome
             FROM bid WHERE id = $1",
        )
        .bind(bid_id)
        .fetch_optional(self)
        .await
        .map_err(temporarily_unavailable("Failed to fetch bid"))?;
        row.map(|row| {
            row.get_entity()
                .map_err(temporarily_unavailable("Failed to convert bid row"))
        })
        .transpose()
    }

    async fn add_bid(&self, bid: &entities::Bid) -> Result<(), RestError> {
        let row = models::BidRow::new(bid)
            .map_err(temporarily_unavailable("Failed to convert bid entity"))?;
        sqlx::query(
            "INSERT INTO bid (id, item_id, auction_id, usr_id, amount, bid_time, receiving_node, outcome)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(row.id)
        .bind(row.item_id)
        .bind(row.auction_id)
        .bind(row.usr_id)
        .bind(row.amount)
        .bind(row.bid_time)
        .bind(row.receiving_node)
        .bind(row.outcome)
        .execute(self)
        .await
        .map_err(temporarily_unavailable("Failed to insert bid"))?;
        Ok(())
    }

    async fn promote_winning_bid(&self, bid_id: BidId) -> Result<bool, RestError> {
        let result = sqlx::query(
            "UPDATE bid SET outcome = $1 WHERE id = $2 AND outcome IN ($3, $4)",
        )
        .bind(entities::BidOutcome::Winning.to_string())
        .bind(bid_id)
        .bind(entities::BidOutcome::Starting.to_string())
        .bind(entities::BidOutcome::High.to_string())
        .execute(self)
        .await
        .map_err(temporarily_unavailable("Failed to promote winning bid"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_high_bid(
        &self,
        auction_id: AuctionId,
        item_id: ItemId,
    ) -> Result<Option<entities::HighBid>, RestError> {
        let row: Option<models::HighBidRow> = sqlx::query_as(
            "SELECT auction_id, item_id, bid_id, usr_id, amount, bid_count,
                    current_bid_time, bidding_end_time, state, version
             FROM high_bid WHERE auction_id = $1 AND item_id = $2",
        )
        .bind(auction_id)
        .bind(item_id)
        .fetch_optional(self)
        .await
        .map_err(temporarily_unavailable("Failed to fetch high bid"))?;
        row.map(|row| {
            row.get_entity()
                .map_err(temporarily_unavailable("Failed to convert high bid row"))
        })
        .transpose()
    }

    async fn save_high_bid(&self, high_bid: &entities::HighBid) -> Result<bool, RestError> {
        let amount = i64::try_from(high_bid.amount)
            .map_err(temporarily_unavailable("High bid amount does not fit the column"))?;
        let bid_count = i64::try_from(high_bid.bid_count)
            .map_err(temporarily_unavailable("High bid count does not fit the column"))?;
        let result = if high_bid.version == 0 {
            sqlx::query(
                "INSERT INTO high_bid (auction_id, item_id, bid_id, usr_id, amount, bid_count,
                                       current_bid_time, bidding_end_time, state, version)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1)
                 ON CONFLICT (auction_id, item_id) DO NOTHING",
            )
            .bind(high_bid.auction_id)
            .bind(high_bid.item_id)
            .bind(high_bid.bid_id)
            .bind(high_bid.user_id)
            .bind(amount)
            .bind(bid_count)
            .bind(models::to_primitive(high_bid.current_bid_time))
            .bind(models::to_primitive(high_bid.bidding_end_time))
            .bind(high_bid.state.to_string())
            .execute(self)
            .await
        } else {
            sqlx::query(
                "UPDATE high_bid SET bid_id = $1, usr_id = $2, amount = $3, bid_count = $4,
                        current_bid_time = $5, bidding_end_time = $6, state = $7, version = $8
                 WHERE auction_id = $9 AND item_id = $10 AND version = $11",
            )
            .bind(high_bid.bid_id)
            .bind(high_bid.user_id)
            .bind(amount)
            .bind(bid_count)
            .bind(models::to_primitive(high_bid.current_bid_time))
            .bind(models::to_primitive(high_bid.bidding_end_time))
            .bind(high_bid.state.to_string())
            .bind(high_bid.version + 1)
            .bind(high_bid.auction_id)
            .bind(high_bid.item_id)
            .bind(high_bid.version)
            .execute(self)
            .await
        };
        let result = result.map_err(temporarily_unavailable("Failed to save high bid"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_due_high_bids(
        &self,
        now: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<entities::HighBid>, RestError> {
        let rows: Vec<models::HighBidRow> = sqlx::query_as(
            "SELECT auction_id, item_id, bid_id, usr_id, amount, bid_count,
                    current_bid_time, bidding_end_time, state, version
             FROM high_bid WHERE state <> $1 AND bidding_end_time <= $2
             ORDER BY bidding_end_time ASC LIMIT $3",
        )
        .bind(entities::BiddingState::Sold.to_string())
        .bind(models::to_primitive(now))
        .bind(limit)
        .fetch_all(self)
        .await
        .map_err(temporarily_unavailable("Failed to fetch due high bids"))?;
        rows.into_iter()
            .map(|row| {
                row.get_entity()
                    .map_err(temporarily_unavailable("Failed to convert high bid row"))
            })
            .collect()
    }

    async fn mark_item_sold(
        &self,
        item_id: ItemId,
        purchase_price: BidAmount,
    ) -> Result<(), RestError> {
        let price = i64::try_from(purchase_price)
            .map_err(temporarily_unavailable("Purchase price does not fit the column"))?;
        sqlx::query(
            "UPDATE item SET state = $1, purchase_price = $2 WHERE id = $3 AND state = $4",
        )
        .bind(entities::ItemState::Sold.to_string())
        .bind(price)
        .bind(item_id)
        .bind(entities::ItemState::Active.to_string())
        .execute(self)
        .await
        .map_err(temporarily_unavailable("Failed to mark item sold"))?;
        Ok(())
    }

    async fn conclude_auction_if_resolved(
        &self,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<bool, RestError> {
        let result = sqlx::query(
            "UPDATE auction SET conclusion_time = $1
             WHERE id = $2 AND conclusion_time IS NULL
               AND NOT EXISTS (
                   SELECT 1 FROM item
                   WHERE item.auction_id = auction.id AND item.state IN ($3, $4)
               )",
        )
        .bind(models::to_primitive(now))
        .bind(auction_id)
        .bind(entities::ItemState::NotStarted.to_string())
        .bind(entities::ItemState::Active.to_string())
        .execute(self)
        .await
        .map_err(temporarily_unavailable("Failed to conclude auction"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn record_attendance(
        &self,
        user_id: UserId,
        auction_id: AuctionId,
        now: OffsetDateTime,
    ) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO attendance (usr_id, auction_id, attend_time, state)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (usr_id, auction_id) DO UPDATE SET state = $4",
        )
        .bind(user_id)
        .bind(auction_id)
        .bind(models::to_primitive(now))
        .bind(entities::AttendanceState::Attending.to_string())
        .execute(self)
        .await
        .map_err(temporarily_unavailable("Failed to record attendance"))?;
        Ok(())
    }

    async fn mark_attendance_left(&self, user_id: UserId) -> Result<u64, RestError> {
        let result = sqlx::query(
            "UPDATE attendance SET state = $1 WHERE usr_id = $2 AND state = $3",
        )
        .bind(entities::AttendanceState::Left.to_string())
        .bind(user_id)
        .bind(entities::AttendanceState::Attending.to_string())
        .execute(self)
        .await
        .map_err(temporarily_unavailable("Failed to mark attendance left"))?;
        Ok(result.rows_affected())
    }

    async fn close_attendance(&self, auction_id: AuctionId) -> Result<u64, RestError> {
        let result = sqlx::query(
            "UPDATE attendance SET state = $1 WHERE auction_id = $2 AND state = $3",
        )
        .bind(entities::AttendanceState::AuctionComplete.to_string())
        .bind(auction_id)
        .bind(entities::AttendanceState::Attending.to_string())
        .execute(self)
        .await
        .map_err(temporarily_unavailable("Failed to close attendance"))?;
        Ok(result.rows_affected())
    }

    async fn get_ownership(&self) -> Result<HashMap<AuctionId, NodeId>, RestError> {
        let rows = sqlx::query("SELECT auction_id, node_id FROM auction_ownership")
            .fetch_all(self)
            .await
            .map_err(temporarily_unavailable("Failed to fetch ownership map"))?;
        Ok(rows
            .into_iter()
            .map(|row| (row.get("auction_id"), row.get("node_id")))
            .collect())
    }
}
