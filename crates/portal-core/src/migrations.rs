use sqlx::{Pool, Postgres};

/// One additive schema step. Only `IF NOT EXISTS` forms belong here, so the
/// routine can run against every configured database on every startup and
/// each converges to the same schema.
pub struct MigrationStep {
    pub name: &'static str,
    pub sql: &'static str,
}

/// Applies every step against one target, logging per-statement failures
/// without halting: schema convergence is best-effort and must not block
/// startup. Returns the number of steps that applied cleanly.
pub async fn run(pool: &Pool<Postgres>, db_label: &str, steps: &[MigrationStep]) -> u32 {
    tracing::info!(db = db_label, steps = steps.len(), "running migrations");
    let mut applied = 0;
    for step in steps {
        match sqlx::query(step.sql).execute(pool).await {
            Ok(_) => {
                tracing::debug!(db = db_label, step = step.name, "migration step applied");
                applied += 1;
            }
            Err(err) => {
                tracing::warn!(db = db_label, step = step.name, error = %err, "migration step failed");
            }
        }
    }
    applied
}

/// Runs the same routine independently against the primary and, when
/// configured, the secondary, so either database could be promoted later
/// with an equivalent schema.
pub async fn run_for_replicas(replicas: &crate::replication::Replicas, steps: &[MigrationStep]) {
    run(&replicas.primary, "primary", steps).await;
    if let Some(secondary) = &replicas.secondary {
        run(secondary, "secondary", steps).await;
    }
}
