use {
    super::RestError,
    crate::{
        auction::{
            entities,
            service::{
                await_next_bid::{
                    AwaitNextBidInput,
                    NextBid,
                },
                get_high_bid::GetHighBidInput,
                leave_auction::LeaveAuctionInput,
                submit_bid::{
                    Arbitration,
                    SubmitBidInput,
                },
                Service,
            },
        },
        kernel::entities::NodeId,
    },
    arbiter_api_types::{
        bid::{
            BidRepresentation,
            BiddingState,
            NextBidParams,
            ItemPathParams,
            SubmitBid,
            UserId,
        },
        ErrorBodyResponse,
    },
    axum::{
        extract::{
            Path,
            Query,
            State,
        },
        http::StatusCode,
        response::{
            IntoResponse,
            Response,
        },
        Json,
    },
};

/// Submit a bid for arbitration.
///
/// The bid is evaluated against the item's current high bid under the item's
/// exclusive lock and recorded with its outcome; rejections are ordinary
/// results, not errors. A bid for an auction owned by another node is
/// redirected with a 421 naming the owner.
#[utoipa::path(post, path = "/v1/bids", request_body = SubmitBid, responses(
    (status = 200, description = "The bid was arbitrated and recorded", body = BidRepresentation),
    (status = 400, response = ErrorBodyResponse),
    (status = 421, description = "The auction is arbitrated by another node", body = ErrorBodyResponse),
),)]
pub async fn post_bid(
    State(service): State<Service>,
    Json(submit_bid): Json<SubmitBid>,
) -> Result<Json<BidRepresentation>, RestError> {
    let arbitration = service
        .submit_bid(SubmitBidInput {
            bid_create: entities::BidCreate {
                bid_id:     submit_bid.bid_id,
                auction_id: submit_bid.auction_id,
                item_id:    submit_bid.item_id,
                user_id:    submit_bid.user_id,
                amount:     submit_bid.amount,
                bid_time:   submit_bid.bid_time,
            },
        })
        .await?;
    Ok(Json(arbitration_representation(&arbitration)))
}

/// Read the item's current high bid.
///
/// The observer's initial fetch before entering the long-poll loop.
#[utoipa::path(get, path = "/v1/items/{item_id}/bids/high", params(ItemPathParams), responses(
    (status = 200, description = "The current high bid", body = BidRepresentation),
    (status = 404, response = ErrorBodyResponse),
),)]
pub async fn get_item_high_bid(
    State(service): State<Service>,
    Path(path): Path<ItemPathParams>,
) -> Result<Json<BidRepresentation>, RestError> {
    let high_bid = service
        .get_high_bid(GetHighBidInput {
            item_id: path.item_id,
        })
        .await?;
    Ok(Json(high_bid_representation(
        &high_bid,
        service.store().node_id(),
    )))
}

/// Wait for the item's next accepted bid (long poll).
///
/// Responds as soon as the item's bid count exceeds `last_bid_count`, or
/// with 408 after the bounded wait. Held requests suspend on the server; the
/// client does not poll.
#[utoipa::path(get, path = "/v1/items/{item_id}/bids/next", params(ItemPathParams, NextBidParams), responses(
    (status = 200, description = "A newer high bid", body = BidRepresentation),
    (status = 404, response = ErrorBodyResponse),
    (status = 408, description = "Request timed out"),
),)]
pub async fn get_next_bid(
    State(service): State<Service>,
    Path(path): Path<ItemPathParams>,
    Query(params): Query<NextBidParams>,
) -> Result<Response, RestError> {
    let next = service
        .await_next_bid(AwaitNextBidInput {
            item_id:        path.item_id,
            last_bid_count: params.last_bid_count,
            observer:       params.user_id,
        })
        .await?;
    Ok(match next {
        NextBid::Update(high_bid) => Json(high_bid_representation(
            &high_bid,
            service.store().node_id(),
        ))
        .into_response(),
        NextBid::TimedOut => {
            (StatusCode::REQUEST_TIMEOUT, "request timed out").into_response()
        }
    })
}

/// Stop observing (logout cleanup).
///
/// Marks the user as having left every auction they were attending.
#[utoipa::path(delete, path = "/v1/users/{user_id}/attendance", params(
    ("user_id" = String, Path, description = "The user whose attendance records to close"),
), responses(
    (status = 200, description = "Attendance records were closed"),
),)]
pub async fn delete_attendance(
    State(service): State<Service>,
    Path(user_id): Path<UserId>,
) -> Result<Json<()>, RestError> {
    service.leave_auctions(LeaveAuctionInput { user_id }).await?;
    Ok(Json(()))
}

fn arbitration_representation(arbitration: &Arbitration) -> BidRepresentation {
    let high_bid = arbitration.high_bid.as_ref();
    BidRepresentation {
        id:             arbitration.bid.id,
        amount:         arbitration.bid.amount,
        bidding_state:  bidding_state_for(
            arbitration.bid.outcome,
            high_bid.map(|high| high.state),
        ),
        last_bid_count: high_bid.map_or(0, |high| high.bid_count),
        bid_time:       arbitration.bid.bid_time,
        receiving_node: arbitration.bid.receiving_node,
        user_id:        arbitration.bid.user_id,
        item_id:        arbitration.bid.item_id,
        auction_id:     arbitration.bid.auction_id,
        message:        arbitration.bid.outcome.message().to_string(),
    }
}

fn high_bid_representation(
    high_bid: &entities::HighBid,
    serving_node: NodeId,
) -> BidRepresentation {
    BidRepresentation {
        id:             high_bid.bid_id,
        amount:         high_bid.amount,
        bidding_state:  state_representation(high_bid.state),
        last_bid_count: high_bid.bid_count,
        bid_time:       high_bid.current_bid_time,
        receiving_node: serving_node,
        user_id:        high_bid.user_id,
        item_id:        high_bid.item_id,
        auction_id:     high_bid.auction_id,
        message:        "current high bid".to_string(),
    }
}

fn state_representation(state: entities::BiddingState) -> BiddingState {
    match state {
        entities::BiddingState::Open => BiddingState::Open,
        entities::BiddingState::LastCall => BiddingState::LastCall,
        entities::BiddingState::Sold => BiddingState::Sold,
    }
}

/// Collapse an outcome tag and the item state into the single
/// `bidding_state` the wire shape reports.
fn bidding_state_for(
    outcome: entities::BidOutcome,
    state: Option<entities::BiddingState>,
) -> BiddingState {
    match outcome {
        entities::BidOutcome::Starting
        | entities::BidOutcome::High
        | entities::BidOutcome::Winning => state
            .map(state_representation)
            .unwrap_or(BiddingState::Accepted),
        entities::BidOutcome::AfterHigher
        | entities::BidOutcome::AfterMatching
        | entities::BidOutcome::AlreadyHighBidder
        | entities::BidOutcome::BelowStarting
        | entities::BidOutcome::InsufficientFunds => BiddingState::Info,
        entities::BidOutcome::AuctionComplete => BiddingState::AuctionComplete,
        entities::BidOutcome::AuctionNotRunning => BiddingState::AuctionNotActive,
        entities::BidOutcome::NoSuchItem => BiddingState::NoSuchItem,
        entities::BidOutcome::ItemNotActive => BiddingState::ItemNotActive,
        entities::BidOutcome::ItemSold => BiddingState::Sold,
        entities::BidOutcome::NoSuchAuction => BiddingState::NoSuchAuction,
        entities::BidOutcome::NoSuchUser => BiddingState::NoSuchUser,
        entities::BidOutcome::Dummy | entities::BidOutcome::Unknown => BiddingState::Unknown,
    }
}
