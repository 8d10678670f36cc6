//! Transient user-facing outcome events.
//!
//! Every service-boundary outcome produces exactly one [`Notice`]. Drawing
//! it (toast, stderr line) is the receiver's business.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl Notice {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            detail: None,
        }
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Receiving half of the notice channel.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Sending half, shared by every service.
#[derive(Clone)]
pub struct Notices {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notices {
    pub fn channel() -> (Self, NoticeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::trace!("Notice receiver dropped");
        }
    }

    pub fn success(&self, title: impl Into<String>) {
        self.emit(Notice::success(title));
    }

    pub fn error(&self, title: impl Into<String>, detail: impl Into<String>) {
        self.emit(Notice::error(title, detail));
    }
}
