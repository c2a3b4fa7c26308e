use {
    crate::{
        api,
        auction::{
            entities,
            service::{
                self,
                Service,
            },
        },
        config::{
            Config,
            RunOptions,
        },
        kernel::{
            analytics_db::AnalyticsInserter,
            clock,
            ownership::ShardMap,
        },
        metrics,
        state::Store,
    },
    anyhow::anyhow,
    futures::future::join_all,
    sqlx::postgres::PgPoolOptions,
    std::{
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

const DB_MAX_CONNECTIONS: u32 = 32;
const COMPLETION_STATS_TABLE: &str = "completion_stats";

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        tokio::signal::ctrl_c().await.unwrap();
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .connect(&run_options.database_url)
        .await
        .map_err(|err| anyhow!("Failed to connect to the database: {:?}", err))?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // One offset for the whole cluster, regardless of node start order.
    let clock = clock::elect_cluster_offset(&pool, config.simulated_start).await?;
    tracing::info!(
        offset_micros = clock.offset_micros(),
        "Simulated clock initialized."
    );

    let stats = match &run_options.analytics_url {
        Some(url) => {
            let client = clickhouse::Client::default()
                .with_url(url)
                .with_database(&run_options.analytics_database);
            AnalyticsInserter::new(client, COMPLETION_STATS_TABLE.to_string())
        }
        None => {
            tracing::warn!("No analytics endpoint configured; completion stats are dropped.");
            AnalyticsInserter::disabled()
        }
    };

    let store = Arc::new(Store {
        clock,
        shard_map: ShardMap::new(run_options.node_id),
    });
    let service = Service::new(
        store,
        pool,
        stats,
        service::Config {
            timing:                     entities::TimingPolicy {
                last_call: config.timing.last_call,
                close:     config.timing.close,
            },
            long_poll_timeout:          config.long_poll_timeout,
            lock_timeout:               config.lock_timeout,
            sweep_interval:             config.sweep_interval,
            ownership_refresh_interval: config.ownership_refresh_interval,
        },
        TaskTracker::new(),
    );

    // Seed the shard map before the first bid is accepted.
    service
        .refresh_ownership()
        .await
        .map_err(|err| anyhow!("Failed to load the shard map: {:?}", err))?;

    let metrics_recorder = metrics::setup_metrics_recorder()?;

    let conclusion_loop = tokio::spawn({
        let service = service.clone();
        async move { service.run_conclusion_loop().await }
    });
    let ownership_loop = tokio::spawn({
        let service = service.clone();
        async move { service.run_ownership_refresh_loop().await }
    });
    let server_loop = tokio::spawn(api::start_api(run_options.clone(), service));
    let metrics_loop = tokio::spawn(metrics::start_metrics(run_options, metrics_recorder));
    join_all(vec![conclusion_loop, ownership_loop, server_loop, metrics_loop]).await;
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down. This is used to
// gracefully shutdown the application.
//
// NOTE: A more idiomatic approach would be to use a tokio::sync::broadcast channel, and to send a
// shutdown signal to all running tasks. However, this is a bit more complicated to implement and
// we don't rely on global state for anything else.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
