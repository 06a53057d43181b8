//! # Notifications
//!
//! Transient user-visible toasts raised when a product is added.

use super::product::Product;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Currency label used in notification text
pub const NOTIFICATION_CURRENCY: &str = "PHP";

/// Toasts kept by a [`ToastQueue`] before the oldest is dropped
pub const DEFAULT_TOAST_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub raised_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            raised_at: Utc::now(),
        }
    }

    /// Toast announcing an accepted product
    pub fn item_added(product: &Product) -> Self {
        Self::new(
            "Item added",
            format!(
                "{} {}(s) with the price of {} {} was added to the products list",
                product.number_in_stock, product.product_name, NOTIFICATION_CURRENCY, product.price
            ),
        )
    }
}

/// Sink for toasts
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast)
    }
}

/// Writes toasts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        tracing::info!(title = %toast.title, "{}", toast.description);
    }
}

/// Bounded FIFO of pending toasts.
///
/// Each toast is returned by [`ToastQueue::drain`] at most once; toasts older
/// than the time-to-live are discarded instead of shown.
#[derive(Debug)]
pub struct ToastQueue {
    pending: Mutex<VecDeque<Toast>>,
    limit: usize,
    ttl: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_LIMIT, Duration::seconds(30))
    }
}

impl ToastQueue {
    pub fn new(limit: usize, ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            limit: limit.max(1),
            ttl,
        }
    }

    /// Take every pending toast that has not expired
    pub fn drain(&self) -> Vec<Toast> {
        let cutoff = Utc::now() - self.ttl;
        match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).filter(|t| t.raised_at >= cutoff).collect(),
            Err(e) => {
                tracing::warn!("Toast queue lock poisoned: {}", e);
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        if let Ok(mut pending) = self.pending.lock() {
            if pending.len() == self.limit {
                pending.pop_front();
            }
            pending.push_back(toast);
        }
    }
}
