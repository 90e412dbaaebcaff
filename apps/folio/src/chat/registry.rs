use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::chat::session::SessionFactory;
use crate::chat::turn::{lock, SharedWidget};
use crate::chat::widget::{ChatWidget, SessionState};

struct Entry {
    widget: SharedWidget,
    last_seen: Instant,
}

/// Mounted chat widgets, one per browser tab. In memory only; widgets idle
/// for longer than the TTL are evicted by [`WidgetRegistry::spawn_sweeper`].
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    widgets: Arc<DashMap<Uuid, Entry>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a widget and its session. Session failures leave the widget in
    /// `Failed`; the widget is still registered so the page can show it.
    pub fn mount(&self, greeting: String, factory: &SessionFactory) -> (Uuid, SharedWidget) {
        let make = factory.as_ref();
        let mut widget = ChatWidget::new(greeting);
        let state = widget.mount(|| make());

        let id = Uuid::new_v4();
        let widget = Arc::new(Mutex::new(widget));
        self.widgets.insert(
            id,
            Entry {
                widget: Arc::clone(&widget),
                last_seen: Instant::now(),
            },
        );

        info!(
            "Chat widget {id} mounted (chat {})",
            if state == SessionState::Ready { "enabled" } else { "disabled" }
        );
        (id, widget)
    }

    /// Looks up a widget and marks it as used.
    pub fn get(&self, id: &Uuid) -> Option<SharedWidget> {
        self.widgets.get_mut(id).map(|mut entry| {
            entry.last_seen = Instant::now();
            Arc::clone(&entry.widget)
        })
    }

    /// Removes and tears down a widget. Returns `false` if it was unknown.
    pub fn unmount(&self, id: &Uuid) -> bool {
        match self.widgets.remove(id) {
            Some((_, entry)) => {
                lock(&entry.widget).teardown();
                info!("Chat widget {id} unmounted");
                true
            }
            None => false,
        }
    }

    /// Unmounts widgets not used for `ttl`. Widgets with a reply in flight
    /// are kept. Returns how many were evicted.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let is_stale = |entry: &Entry| {
            entry.last_seen.elapsed() >= ttl && !lock(&entry.widget).is_busy()
        };

        let candidates: Vec<Uuid> = self
            .widgets
            .iter()
            .filter(|entry| is_stale(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        let mut evicted = 0;
        for id in candidates {
            if let Some((_, entry)) = self.widgets.remove_if(&id, |_, entry| is_stale(entry)) {
                lock(&entry.widget).teardown();
                evicted += 1;
            }
        }
        evicted
    }

    /// Runs [`evict_idle`](Self::evict_idle) every `interval` until the
    /// runtime shuts down.
    pub fn spawn_sweeper(&self, ttl: Duration, interval: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(ttl);
                if evicted > 0 {
                    info!(
                        "Evicted {evicted} idle chat widget(s), {} remaining",
                        registry.len()
                    );
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }
}
