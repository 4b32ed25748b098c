use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::sync::watch;

use crate::controller::ErrorReporter;

/// How long a toast stays visible without manual dismissal
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// Single-slot transient error notification.
///
/// Showing a toast replaces whatever is visible. Each toast hides itself once
/// [`TOAST_DURATION`] has elapsed, unless it was replaced or dismissed first.
#[derive(Clone)]
pub struct ToastHub {
    inner: Arc<Inner>,
}

struct Inner {
    current: watch::Sender<Option<Toast>>,
    next_id: AtomicU64,
    duration: Duration,
}

impl ToastHub {
    pub fn new() -> Self {
        Self::with_duration(TOAST_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                current,
                next_id: AtomicU64::new(1),
                duration,
            }),
        }
    }

    pub fn show(&self, message: impl Into<String>) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.current.send_replace(Some(Toast {
            id,
            message: message.into(),
        }));

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let inner = self.inner.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(inner.duration).await;
                    inner.dismiss_id(id);
                });
            }
            Err(_) => tracing::warn!(id, "No async runtime; toast will not auto-dismiss"),
        }
        id
    }

    /// Hide the visible toast, if any
    pub fn dismiss(&self) {
        self.inner.current.send_if_modified(|current| current.take().is_some());
    }

    pub fn current(&self) -> Option<Toast> {
        self.inner.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.inner.current.subscribe()
    }
}

impl Inner {
    fn dismiss_id(&self, id: u64) {
        self.current.send_if_modified(|current| {
            if current.as_ref().is_some_and(|toast| toast.id == id) {
                *current = None;
                true
            } else {
                false
            }
        });
    }
}

impl Default for ToastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for ToastHub {
    fn report(&self, message: &str) {
        self.show(message);
    }
}
