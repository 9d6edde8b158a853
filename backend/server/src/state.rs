use std::sync::Arc;

use tracing::info;

use super::{
    config::Config,
    database::{RedisStore, Store},
    error::StoreError,
    poll::ResultsPoller,
    service::{ElectionService, Policy},
};

pub struct AppState<S> {
    pub config: Config,
    pub service: Arc<ElectionService<S>>,
    pub poller: ResultsPoller,
}

impl AppState<RedisStore> {
    pub async fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store = RedisStore::connect(&config.redis_url).await?;

        Ok(Self::with_store(config, store))
    }
}

impl<S: Store> AppState<S> {
    /// Must be called inside a Tokio runtime, the results poller starts here.
    pub fn with_store(config: Config, store: S) -> Arc<Self> {
        info!(
            "Submission guard: {}, identity check: {}",
            config.submission_guard, config.verify_identity
        );

        let service = Arc::new(ElectionService::new(store, Policy::from(&config)));
        let poller = ResultsPoller::spawn(service.clone(), config.results_refresh);

        Arc::new(Self {
            config,
            service,
            poller,
        })
    }
}
