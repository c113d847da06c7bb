//! Transient status messages shown over the picker.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a toast stays up unless told otherwise
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

/// Merge conflicts carry file lists worth reading
pub const CONFLICT_TOAST_DURATION: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Info,    // Cyan
    Success, // Green
    Warning, // Yellow
    Error,   // Red
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub toast_type: ToastType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType, duration: Duration) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

pub struct ToastManager {
    queue: VecDeque<Toast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, toast_type: ToastType) {
        self.push_for(message, toast_type, DEFAULT_TOAST_DURATION);
    }

    pub fn push_for(&mut self, message: impl Into<String>, toast_type: ToastType, duration: Duration) {
        self.queue.push_back(Toast::new(message, toast_type, duration));
        while self.queue.len() > self.max_visible {
            self.queue.pop_front();
        }
    }

    /// Drop expired toasts
    pub fn update(&mut self) {
        self.queue.retain(|t| !t.is_expired());
    }

    pub fn visible_toasts(&self) -> Vec<&Toast> {
        self.queue.iter().collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}
