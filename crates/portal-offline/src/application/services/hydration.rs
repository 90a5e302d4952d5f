use std::sync::Arc;

use crate::application::ports::form_gateway::{FetchOutcome, FormGateway, GatewayError};
use crate::application::ports::offline_store::OfflineStore;
use crate::domain::entities::forms::{
    payload_is_empty, CacheSnapshot, HydrationResult, HydrationSource,
};
use crate::domain::value_objects::form_kind::FormKind;

/// Decides, per form mount, which of {queued draft, cached snapshot, live
/// fetch} is rendered: **outbox draft > cache > network > empty default**.
///
/// A queued-but-unsynced edit must never be silently overwritten by a stale
/// server read, and a cache hit must never block the UI on network latency.
/// Storage trouble degrades to "nothing cached"; it never propagates.
pub struct HydrationResolver {
    store: Arc<dyn OfflineStore>,
    gateway: Arc<dyn FormGateway>,
}

impl HydrationResolver {
    pub fn new(store: Arc<dyn OfflineStore>, gateway: Arc<dyn FormGateway>) -> Self {
        Self { store, gateway }
    }

    /// First-paint view from the cache alone. Never touches the network, so
    /// a populated cache renders without waiting for anything to settle.
    pub async fn cached_view(&self, user_id: &str, kind: FormKind) -> Option<HydrationResult> {
        match self.store.load_cache(user_id, kind).await {
            Ok(Some(snapshot)) => {
                let locked = !snapshot.is_empty();
                Some(HydrationResult {
                    source: HydrationSource::Cache,
                    data: snapshot.payload,
                    locked,
                })
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(form = %kind, error = %err, "cache read failed, degrading to empty");
                None
            }
        }
    }

    /// Full resolution pass. Infallible by design: every failure path falls
    /// back to whatever weaker source is available.
    pub async fn resolve(&self, user_id: &str, kind: FormKind) -> HydrationResult {
        let cached = self.cached_view(user_id, kind).await;

        // Queued edits represent unsaved user intent and outrank everything;
        // the view stays unlocked so the draft can be reworked.
        match self.store.find_queued(kind).await {
            Ok(Some(entry)) => {
                return HydrationResult {
                    source: HydrationSource::Draft,
                    data: entry.payload,
                    locked: false,
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(form = %kind, error = %err, "outbox check failed during hydration")
            }
        }

        match self.gateway.fetch_form(kind, user_id).await {
            Ok(FetchOutcome::Found(data)) => {
                let snapshot = CacheSnapshot::new(user_id, kind, data.clone());
                if let Err(err) = self.store.store_cache(snapshot).await {
                    tracing::warn!(form = %kind, error = %err, "write-through cache update failed");
                }
                let locked = !payload_is_empty(&data);
                HydrationResult {
                    source: HydrationSource::Network,
                    data,
                    locked,
                }
            }
            Ok(FetchOutcome::Missing) => cached.unwrap_or_else(HydrationResult::empty),
            Err(GatewayError::Status(status)) => {
                tracing::warn!(form = %kind, status, "server rejected hydration fetch");
                cached.unwrap_or_else(HydrationResult::empty)
            }
            Err(GatewayError::Unreachable(reason)) => {
                tracing::info!(form = %kind, %reason, "offline, rendering local view");
                cached.unwrap_or_else(HydrationResult::empty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{temp_store, MockGateway, UnreachableGateway};
    use crate::domain::entities::forms::OutboxDraft;
    use serde_json::json;

    const UID: &str = "user-77";

    #[tokio::test]
    async fn outbox_draft_outranks_cache() {
        let (store, _dir) = temp_store().await;
        store
            .store_cache(CacheSnapshot::new(
                UID,
                FormKind::OrganizedClasses,
                json!({"kinder": 3}),
            ))
            .await
            .unwrap();
        store
            .enqueue(OutboxDraft::new(
                FormKind::OrganizedClasses,
                json!({"kinder": 5}),
            ))
            .await
            .unwrap();

        let gateway = Arc::new(MockGateway::default());
        let resolver = HydrationResolver::new(store, gateway.clone());
        let view = resolver.resolve(UID, FormKind::OrganizedClasses).await;

        assert_eq!(view.source, HydrationSource::Draft);
        assert_eq!(view.data, json!({"kinder": 5}));
        assert!(!view.locked);
        // the draft settles hydration; no fetch is issued
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn cache_renders_without_network() {
        let (store, _dir) = temp_store().await;
        store
            .store_cache(CacheSnapshot::new(
                UID,
                FormKind::Enrolment,
                json!({"grandTotal": 250}),
            ))
            .await
            .unwrap();

        let resolver = HydrationResolver::new(store, Arc::new(UnreachableGateway));
        let view = resolver.cached_view(UID, FormKind::Enrolment).await.unwrap();

        assert_eq!(view.source, HydrationSource::Cache);
        assert_eq!(view.data, json!({"grandTotal": 250}));
        assert!(view.locked);
    }

    #[tokio::test]
    async fn network_truth_replaces_cache_and_is_persisted() {
        let (store, _dir) = temp_store().await;
        store
            .store_cache(CacheSnapshot::new(
                UID,
                FormKind::Enrolment,
                json!({"grandTotal": 100}),
            ))
            .await
            .unwrap();

        let gateway = Arc::new(MockGateway::default());
        gateway.push_fetch(Ok(FetchOutcome::Found(json!({"grandTotal": 180}))));

        let resolver = HydrationResolver::new(store.clone(), gateway);
        let view = resolver.resolve(UID, FormKind::Enrolment).await;

        assert_eq!(view.source, HydrationSource::Network);
        assert_eq!(view.data, json!({"grandTotal": 180}));
        assert!(view.locked);

        let snapshot = store
            .load_cache(UID, FormKind::Enrolment)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.payload, json!({"grandTotal": 180}));
    }

    #[tokio::test]
    async fn network_failure_falls_back_to_cache() {
        let (store, _dir) = temp_store().await;
        store
            .store_cache(CacheSnapshot::new(
                UID,
                FormKind::SchoolProfile,
                json!({"schoolName": "San Isidro ES"}),
            ))
            .await
            .unwrap();

        let gateway = Arc::new(MockGateway::default());
        gateway.push_fetch(Err(GatewayError::Unreachable("dns failure".into())));

        let resolver = HydrationResolver::new(store, gateway);
        let view = resolver.resolve(UID, FormKind::SchoolProfile).await;

        assert_eq!(view.source, HydrationSource::Cache);
        assert_eq!(view.data, json!({"schoolName": "San Isidro ES"}));
    }

    #[tokio::test]
    async fn nothing_anywhere_renders_empty_default() {
        let (store, _dir) = temp_store().await;
        let gateway = Arc::new(MockGateway::default());
        gateway.push_fetch(Ok(FetchOutcome::Missing));

        let resolver = HydrationResolver::new(store, gateway);
        let view = resolver.resolve(UID, FormKind::LearnerStatistics).await;

        assert_eq!(view.source, HydrationSource::Empty);
        assert!(!view.locked);
    }

    #[tokio::test]
    async fn server_rejection_falls_back_like_offline() {
        let (store, _dir) = temp_store().await;
        let gateway = Arc::new(MockGateway::default());
        gateway.push_fetch(Err(GatewayError::Status(500)));

        let resolver = HydrationResolver::new(store, gateway);
        let view = resolver.resolve(UID, FormKind::SchoolResources).await;

        assert_eq!(view.source, HydrationSource::Empty);
    }
}
