use {
    super::{
        models::CompletionStatsRow,
        Repository,
    },
    crate::{
        auction::entities,
        kernel::entities::NodeId,
    },
    time::OffsetDateTime,
};

impl Repository {
    /// Per-bid processing telemetry. Best-effort: never blocks and never
    /// fails the bid path.
    pub fn add_completion_stats(
        &self,
        bid: &entities::Bid,
        bidding_state: Option<entities::BiddingState>,
        completing_node: NodeId,
        completion_time: OffsetDateTime,
    ) {
        self.stats.write(CompletionStatsRow {
            bid_id: bid.id,
            delay_micros: (completion_time - bid.bid_time).whole_microseconds() as i64,
            receiving_node: bid.receiving_node,
            completing_node,
            bidding_state: bidding_state
                .map(|state| state.to_string())
                .unwrap_or_else(|| bid.outcome.to_string()),
            completion_time,
        });
    }
}
