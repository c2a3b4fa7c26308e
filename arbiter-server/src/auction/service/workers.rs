use {
    super::Service,
    crate::server::{
        EXIT_CHECK_INTERVAL,
        SHOULD_EXIT,
    },
    anyhow::Result,
    std::sync::atomic::Ordering,
};

impl Service {
    /// Interval sweep advancing items whose deadline elapsed with no new
    /// bids; this is what closes an item nobody raises on.
    pub async fn run_conclusion_loop(&self) -> Result<()> {
        tracing::info!("Starting item conclusion sweeper...");
        let mut sweep_interval = tokio::time::interval(self.config.sweep_interval);
        let mut exit_check_interval = tokio::time::interval(EXIT_CHECK_INTERVAL);
        while !SHOULD_EXIT.load(Ordering::Acquire) {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    self.task_tracker.spawn({
                        let service = self.clone();
                        async move {
                            if let Err(err) = service.conclude_due_items().await {
                                tracing::error!(error = ?err, "Failed to sweep due items.");
                            }
                        }
                    });
                }
                _ = exit_check_interval.tick() => {}
            }
        }
        tracing::info!("Shutting down item conclusion sweeper...");
        self.task_tracker.close();
        self.task_tracker.wait().await;
        Ok(())
    }

    /// Swap in the latest persisted shard assignments. Run once at startup
    /// before the first bid is accepted, then on the refresh interval.
    pub async fn refresh_ownership(&self) -> Result<(), crate::api::RestError> {
        let assignments = self.repo.get_ownership().await?;
        tracing::debug!(assignments = assignments.len(), "Refreshed the shard map.");
        self.store.shard_map.replace(assignments);
        Ok(())
    }

    /// Periodic reload of the shard map written by the external rebalancer.
    pub async fn run_ownership_refresh_loop(&self) -> Result<()> {
        tracing::info!("Starting ownership refresh...");
        let mut refresh_interval =
            tokio::time::interval(self.config.ownership_refresh_interval);
        let mut exit_check_interval = tokio::time::interval(EXIT_CHECK_INTERVAL);
        while !SHOULD_EXIT.load(Ordering::Acquire) {
            tokio::select! {
                _ = refresh_interval.tick() => {
                    if let Err(err) = self.refresh_ownership().await {
                        tracing::error!(error = ?err, "Failed to refresh the shard map.");
                    }
                }
                _ = exit_check_interval.tick() => {}
            }
        }
        tracing::info!("Shutting down ownership refresh...");
        Ok(())
    }
}
