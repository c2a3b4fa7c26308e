use {
    clickhouse::Row,
    serde::Serialize,
    std::time::Duration,
    tokio::sync::mpsc,
};

const FLUSH_PERIOD: Duration = Duration::from_secs(1);
const CHANNEL_CAPACITY: usize = 1000;

/// Feeds write-once telemetry rows to ClickHouse through a bounded channel
/// and a batching inserter task. Rows are best-effort: a backlogged channel
/// or a failed insert drops them without surfacing an error to the caller.
pub struct AnalyticsInserter<T> {
    sender: mpsc::Sender<T>,
}

impl<T: Row + Serialize + Send + Sync + 'static> AnalyticsInserter<T> {
    pub fn new(client: clickhouse::Client, table_name: String) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(Self::run(client, table_name, rx));
        AnalyticsInserter::<T> { sender: tx }
    }

    /// Used where no analytics backend is wired up; every write is dropped.
    pub fn disabled() -> Self {
        let (tx, _rx) = mpsc::channel(1);
        AnalyticsInserter::<T> { sender: tx }
    }

    pub fn write(&self, row: T) {
        if self.sender.try_send(row).is_err() {
            tracing::warn!("Dropping analytics row, inserter unavailable or backlogged.");
        }
    }

    async fn run(client: clickhouse::Client, table_name: String, mut rx: mpsc::Receiver<T>) {
        let mut inserter = match client.inserter(&table_name) {
            Ok(inserter) => inserter
                .with_period(Some(FLUSH_PERIOD))
                .with_max_rows(100)
                .with_max_bytes(1_048_576),
            Err(err) => {
                tracing::error!(error = ?err, table_name, "Failed to create analytics inserter.");
                return;
            }
        };
        loop {
            tokio::select! {
                row = rx.recv() => {
                    match row {
                        Some(row) => {
                            if let Err(err) = inserter.write(&row) {
                                tracing::error!(error = ?err, "Failed to buffer analytics row.");
                            } else if let Err(err) = inserter.commit().await {
                                tracing::error!(error = ?err, "Failed to commit analytics batch.");
                            }
                        }
                        None => break,
                    }
                },
                _ = tokio::time::sleep(FLUSH_PERIOD) => {
                    if let Err(err) = inserter.commit().await {
                        tracing::error!(error = ?err, "Failed to commit analytics batch.");
                    }
                }
            }
        }
    }
}
