//! # Results Poller
//!
//! Keeps a results snapshot fresh on a fixed interval. Dropping the poller
//! stops the task. Failed refreshes are logged and the last good snapshot is
//! kept, the next tick tries again.
use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, warn};

use crate::{database::Store, results::ResultsStats, service::ElectionService};

pub struct ResultsPoller {
    receiver: watch::Receiver<Option<ResultsStats>>,
    handle: JoinHandle<()>,
}

impl ResultsPoller {
    /// First refresh happens immediately.
    pub fn spawn<S: Store>(service: Arc<ElectionService<S>>, period: Duration) -> Self {
        let (sender, receiver) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match service.results().await {
                    Ok(stats) => {
                        debug!("Refreshed results, {} votes", stats.total_voters);

                        if sender.send(Some(stats)).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to refresh results: {e}"),
                }
            }
        });

        Self { receiver, handle }
    }

    pub fn latest(&self) -> Option<ResultsStats> {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ResultsStats>> {
        self.receiver.clone()
    }
}

impl Drop for ResultsPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
