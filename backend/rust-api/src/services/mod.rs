use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client as MongoClient, Database, IndexModel};
use redis::aio::ConnectionManager;

use crate::config::Config;
use crate::models::{Submission, User};
use crate::utils::time::Clock;

pub struct AppState {
    pub config: Config,
    pub mongo: Database,
    pub redis: ConnectionManager,
    pub clock: Clock,
    // per-exam critical sections; see exam_lock()
    exam_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppState {
    pub async fn new(
        config: Config,
        mongo_client: MongoClient,
        redis_client: redis::Client,
    ) -> anyhow::Result<Self> {
        let mongo = mongo_client.database(&config.mongo_database);

        let clock = Clock::with_offset_minutes(config.tz_offset_minutes)
            .map_err(|e| anyhow::anyhow!("Invalid timezone configuration: {e}"))?;

        tracing::info!("Attempting to connect to Redis...");

        let redis = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            ConnectionManager::new(redis_client),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Redis connection timeout after 30s"))??;

        tracing::info!("Redis ConnectionManager created, testing with PING...");

        let mut conn = redis.clone();
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Redis PING timeout after 5s"))??;

        tracing::info!("Redis connection established successfully");

        ensure_indexes(&mongo).await?;

        Ok(Self {
            config,
            mongo,
            redis,
            clock,
            exam_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Serializes question renumbering (and numbering of new questions) per
    /// exam. Concurrent deletes on the same exam would otherwise corrupt the
    /// dense 1..N sequence.
    pub fn exam_lock(&self, exam_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .exam_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(exam_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

/// The submission uniqueness invariant lives in the store, not in
/// check-then-act application code: the unique index turns a concurrent
/// double submission into a duplicate-key error on the second insert.
async fn ensure_indexes(mongo: &Database) -> anyhow::Result<()> {
    let submissions_index = IndexModel::builder()
        .keys(doc! { "exam_id": 1, "student_id": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    mongo
        .collection::<Submission>("submissions")
        .create_index(submissions_index)
        .await?;

    let users_index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    mongo.collection::<User>("users").create_index(users_index).await?;

    tracing::info!("MongoDB indexes ensured");
    Ok(())
}

pub mod auth_service;
pub mod deadline;
pub mod exam_service;
pub mod exam_window;
pub mod grading;
pub mod grading_service;
pub mod question_service;
pub mod results_service;
pub mod schedule_rules;
pub mod submission_service;
