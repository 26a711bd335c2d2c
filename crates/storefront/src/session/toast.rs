//! Toast notifications.
//!
//! [`ToastQueue`] is the plain container: toasts carry a deadline and are
//! dropped by [`ToastQueue::expire`] or [`ToastQueue::dismiss`]. Removal is by
//! id, so a timer firing for a toast that was already dismissed is a no-op.
//!
//! [`ToastBoard`] wraps a queue for async callers and spawns one `tokio`
//! timer per toast. Timers hold a weak reference, so dropping the last board
//! handle tears the queue down even with timers still pending.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};
use tokio::time::Instant;

/// Display duration used when none is requested.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Monotonically increasing toast identifier, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(u64);

impl ToastId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ToastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity, which drives the toast's colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

/// Optional settings for a new toast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToastOptions {
    pub kind: Option<ToastKind>,
    pub duration: Option<Duration>,
}

impl ToastOptions {
    #[must_use]
    pub const fn kind(kind: ToastKind) -> Self {
        Self {
            kind: Some(kind),
            duration: None,
        }
    }

    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// A visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    #[serde(serialize_with = "as_millis")]
    pub duration: Duration,
    #[serde(skip)]
    pub deadline: Instant,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Ordered toast container.
#[derive(Debug)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    last_id: u64,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            toasts: Vec::new(),
            last_id: 0,
        }
    }

    /// Append a toast created now.
    pub fn add(&mut self, message: impl Into<String>, options: ToastOptions) -> Toast {
        self.add_at(message, options, Instant::now())
    }

    /// Append a toast created at `now` and return a copy of it.
    pub fn add_at(&mut self, message: impl Into<String>, options: ToastOptions, now: Instant) -> Toast {
        self.last_id += 1;
        let duration = options.duration.unwrap_or(DEFAULT_TOAST_DURATION);
        let toast = Toast {
            id: ToastId(self.last_id),
            message: message.into(),
            kind: options.kind.unwrap_or_default(),
            duration,
            deadline: now + duration,
        };
        self.toasts.push(toast.clone());
        toast
    }

    /// Remove the toast with `id`. Returns `true` only for the call that
    /// actually removed it.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Drop every toast whose deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<ToastId> {
        let mut expired = Vec::new();
        self.toasts.retain(|toast| {
            let keep = toast.deadline > now;
            if !keep {
                expired.push(toast.id);
            }
            keep
        });
        expired
    }

    /// Toasts still on screen at `now`, oldest first.
    pub fn visible(&self, now: Instant) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().filter(move |toast| toast.deadline > now)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Shared toast queue with automatic dismissal.
#[derive(Debug, Clone, Default)]
pub struct ToastBoard {
    queue: Arc<Mutex<ToastQueue>>,
}

impl ToastBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ToastQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show a toast and schedule its removal after its duration.
    ///
    /// Must be called from within a `tokio` runtime.
    pub fn push(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        let Toast { id, duration, .. } = self.lock().add_at(message, options, Instant::now());

        let queue: Weak<Mutex<ToastQueue>> = Arc::downgrade(&self.queue);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(queue) = queue.upgrade() {
                let removed = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .dismiss(id);
                if removed {
                    tracing::trace!(%id, "toast expired");
                }
            }
        });

        id
    }

    /// Remove a toast before it expires.
    pub fn dismiss(&self, id: ToastId) -> bool {
        self.lock().dismiss(id)
    }

    /// Snapshot of the toasts currently on screen.
    #[must_use]
    pub fn visible(&self) -> Vec<Toast> {
        let now = Instant::now();
        self.lock().visible(now).cloned().collect()
    }
}
