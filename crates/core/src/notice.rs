//! 全局通知横幅
//!
//! 同一时刻只显示一条通知，新通知覆盖旧通知；用户可以关闭。
//! 以服务实例注入到各控制器，而不是进程级单例。

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::events::{EventBus, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoticeEvent {
    Shown(Notice),
    Dismissed(Uuid),
}

#[derive(Debug, Clone, Default)]
pub struct NoticeService {
    current: Arc<Mutex<Option<Notice>>>,
    events: EventBus<NoticeEvent>,
}

impl NoticeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success<S: Into<String>>(&self, message: S) -> Notice {
        self.show(NoticeKind::Success, message.into())
    }

    pub fn error<S: Into<String>>(&self, message: S) -> Notice {
        self.show(NoticeKind::Error, message.into())
    }

    fn show(&self, kind: NoticeKind, message: String) -> Notice {
        let notice = Notice {
            id: Uuid::new_v4(),
            kind,
            message,
            created_at: Utc::now(),
        };

        match kind {
            NoticeKind::Success => info!("通知: {}", notice.message),
            NoticeKind::Error => warn!("错误通知: {}", notice.message),
        }

        *self.lock() = Some(notice.clone());
        self.events.publish(&NoticeEvent::Shown(notice.clone()));
        notice
    }

    /// 关闭当前通知；没有通知时返回 false
    pub fn dismiss(&self) -> bool {
        let dismissed = self.lock().take();
        match dismissed {
            Some(notice) => {
                self.events.publish(&NoticeEvent::Dismissed(notice.id));
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<Notice> {
        self.lock().clone()
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&NoticeEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Notice>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
