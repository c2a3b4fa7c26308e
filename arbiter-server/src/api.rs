use {
    crate::{
        auction::service::Service,
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
    },
    anyhow::Result,
    arbiter_api_types::{
        bid::{
            BidRepresentation,
            BiddingState,
            SubmitBid,
        },
        ErrorBodyResponse,
        NodeId,
    },
    axum::{
        extract::{
            Request,
            State,
        },
        http::{
            HeaderValue,
            StatusCode,
        },
        middleware,
        response::{
            IntoResponse,
            Response,
        },
        routing::{
            delete,
            get,
            post,
        },
        Json,
        Router,
    },
    clap::crate_version,
    std::sync::atomic::Ordering,
    tower_http::cors::CorsLayer,
    utoipa::OpenApi,
    utoipa_redoc::{
        Redoc,
        Servable,
    },
};

pub(crate) mod bid;

/// Infrastructure faults surfaced to the HTTP layer. Business outcomes of
/// arbitration never appear here; they travel as recorded bids.
#[derive(Debug)]
pub enum RestError {
    /// The request contained invalid parameters
    BadParameters(String),
    /// The item was not found
    ItemNotFound,
    /// The item has no bids yet
    BidNotFound,
    /// The auction is arbitrated by another node
    NotAuctionOwner(NodeId),
    /// The item lock could not be acquired inside the configured bound
    LockTimeout,
    /// Internal error occurred during processing the request
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::ItemNotFound => (
                StatusCode::NOT_FOUND,
                "Item with the specified id was not found".to_string(),
            ),
            RestError::BidNotFound => (
                StatusCode::NOT_FOUND,
                "No bids were found for the specified item".to_string(),
            ),
            RestError::NotAuctionOwner(owner) => (
                StatusCode::MISDIRECTED_REQUEST,
                format!("The auction is arbitrated by node {}", owner),
            ),
            RestError::LockTimeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Timed out acquiring the item lock, please retry".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl std::fmt::Display for RestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_status_and_message().1)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

async fn root() -> String {
    format!("Bid Arbitration Server API {}", crate_version!())
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Every response names the serving node for cluster-behavior verification.
async fn node_id_header(
    State(service): State<Service>,
    request: Request,
    next: middleware::Next,
) -> Response {
    let node_id = service.store().node_id();
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert("x-node-id", HeaderValue::from(node_id));
    response
}

pub async fn start_api(run_options: RunOptions, service: Service) -> Result<()> {
    // Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    bid::post_bid,
    bid::get_item_high_bid,
    bid::get_next_bid,
    bid::delete_attendance,
    ),
    components(
    schemas(
    SubmitBid,
    BidRepresentation,
    BiddingState,
    ErrorBodyResponse,
    ),
    responses(
    BidRepresentation,
    ErrorBodyResponse,
    ),
    ),
    tags(
    (name = "Bid Arbitration Server", description = "The arbitration core of the benchmark auction \
    platform. It serializes concurrent bids per item, advances items through their bidding state \
    machine, and holds observer long polls open until the winning bid moves.")
    )
    )]
    struct ApiDoc;

    let bid_routes = Router::new().route("/", post(bid::post_bid));
    let item_routes = Router::new()
        .route("/:item_id/bids/high", get(bid::get_item_high_bid))
        .route("/:item_id/bids/next", get(bid::get_next_bid));
    let user_routes = Router::new().route("/:user_id/attendance", delete(bid::delete_attendance));

    let v1_routes = Router::new().nest(
        "/v1",
        Router::new()
            .nest("/bids", bid_routes)
            .nest("/items", item_routes)
            .nest("/users", user_routes),
    );

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url("/docs", ApiDoc::openapi()))
        .merge(v1_routes)
        .route("/", get(root))
        .route("/live", get(live))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(
            service.clone(),
            node_id_header,
        ))
        .with_state(service);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!(
        listen_addr = %run_options.server.listen_addr,
        "API server listening."
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down API server...");
        })
        .await?;
    Ok(())
}
