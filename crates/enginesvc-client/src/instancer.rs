use std::time::Duration;

use tokio::sync::watch;

use crate::discovery::{Discovery, DiscoveryError, InstanceQuery};

/// Live view of the addresses matching an [`InstanceQuery`].
///
/// Clones share one background watcher. The watcher stops once every clone
/// (and every endpointer built from one) has been dropped.
#[derive(Debug, Clone)]
pub struct Instancer {
    addresses: watch::Receiver<Vec<String>>,
}

impl Instancer {
    /// Runs the first lookup before returning, so an unusable backend fails
    /// here. After that the set is refreshed every `refresh`; a failed
    /// refresh keeps the last known set.
    pub async fn spawn<D: Discovery>(
        discovery: D,
        query: InstanceQuery,
        refresh: Duration,
    ) -> Result<Self, DiscoveryError> {
        let initial = query.select(&discovery.instances(&query).await?);
        tracing::info!(
            service = %query.service,
            instances = initial.len(),
            "instance watcher started"
        );

        let (tx, rx) = watch::channel(initial);
        tokio::spawn(watch_instances(discovery, query, tx, refresh));
        Ok(Self { addresses: rx })
    }

    /// A fixed set that never changes.
    pub fn fixed<I, T>(addresses: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut addresses: Vec<String> = addresses.into_iter().map(Into::into).collect();
        addresses.sort();
        addresses.dedup();
        let (_tx, rx) = watch::channel(addresses);
        Self { addresses: rx }
    }

    /// Follows a set published by someone else.
    pub fn from_receiver(addresses: watch::Receiver<Vec<String>>) -> Self {
        Self { addresses }
    }

    /// Current addresses.
    pub fn addresses(&self) -> Vec<String> {
        self.addresses.borrow().clone()
    }
}

async fn watch_instances<D: Discovery>(
    discovery: D,
    query: InstanceQuery,
    tx: watch::Sender<Vec<String>>,
    refresh: Duration,
) {
    let mut interval = tokio::time::interval(refresh);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first tick completes immediately and the initial lookup already ran
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tx.closed() => {
                tracing::debug!(service = %query.service, "instance watcher stopped");
                return;
            }
        }

        match discovery.instances(&query).await {
            Ok(listed) => {
                let next = query.select(&listed);
                let changed = tx.send_if_modified(|current| {
                    if *current == next {
                        return false;
                    }
                    *current = next;
                    true
                });
                if changed {
                    tracing::info!(
                        service = %query.service,
                        instances = ?tx.borrow().as_slice(),
                        "instance set changed"
                    );
                }
            }
            Err(err) => {
                tracing::warn!(
                    service = %query.service,
                    error = %err,
                    "discovery lookup failed, keeping last known instances"
                );
            }
        }
    }
}
