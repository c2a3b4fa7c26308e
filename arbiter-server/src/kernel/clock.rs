use {
    crate::kernel::db::DB,
    anyhow::Result,
    sqlx::Row as _,
    time::{
        Duration,
        OffsetDateTime,
    },
};

/// Process-wide deterministic time source. The offset is fixed at startup
/// and agreed cluster-wide, so nodes started at different wall-clock times
/// observe a single simulated timeline.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedClock {
    offset: Duration,
}

impl SimulatedClock {
    pub fn with_offset(offset: Duration) -> Self {
        Self { offset }
    }

    pub fn from_offset_micros(offset_micros: i64) -> Self {
        Self {
            offset: Duration::microseconds(offset_micros),
        }
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc() + self.offset
    }

    pub fn offset_micros(&self) -> i64 {
        self.offset.whole_microseconds() as i64
    }
}

/// Reconcile this process's offset candidate against the cluster.
///
/// The candidate is `simulated_start - wall clock now`. The first node to
/// write its candidate wins the test-and-set; every other node adopts the
/// stored value, regardless of start order.
pub async fn elect_cluster_offset(
    db: &DB,
    simulated_start: OffsetDateTime,
) -> Result<SimulatedClock> {
    let candidate_micros =
        (simulated_start - OffsetDateTime::now_utc()).whole_microseconds() as i64;
    sqlx::query(
        "INSERT INTO sim_clock (singleton, offset_micros) VALUES (TRUE, $1)
         ON CONFLICT (singleton) DO NOTHING",
    )
    .bind(candidate_micros)
    .execute(db)
    .await?;
    let row = sqlx::query("SELECT offset_micros FROM sim_clock WHERE singleton = TRUE")
        .fetch_one(db)
        .await?;
    let elected_micros: i64 = row.get("offset_micros");
    if elected_micros != candidate_micros {
        tracing::info!(
            candidate_micros,
            elected_micros,
            "Adopting clock offset elected by another node."
        );
    }
    Ok(SimulatedClock::from_offset_micros(elected_micros))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_applies_offset() {
        let clock = SimulatedClock::with_offset(Duration::hours(2));
        let skew = clock.now() - (OffsetDateTime::now_utc() + Duration::hours(2));
        assert!(skew.abs() < Duration::seconds(1));
    }

    #[test]
    fn offset_micros_round_trips() {
        let clock = SimulatedClock::from_offset_micros(-42_000_000);
        assert_eq!(clock.offset_micros(), -42_000_000);
    }
}
