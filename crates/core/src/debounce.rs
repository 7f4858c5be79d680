//! 按名称去抖的延迟执行队列
//!
//! 同一名称在延迟到期前的多次入队只执行最后一次（last-writer-wins）。
//! 需要在 tokio 运行时内使用。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Slot {
    generation: u64,
    job: Option<Job>,
}

#[derive(Clone)]
pub struct DebounceRegistry {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    generations: Arc<AtomicU64>,
    delay: Duration,
}

impl std::fmt::Debug for DebounceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebounceRegistry")
            .field("delay", &self.delay)
            .field("pending", &lock(&self.slots).len())
            .finish()
    }
}

fn lock(slots: &Mutex<HashMap<String, Slot>>) -> MutexGuard<'_, HashMap<String, Slot>> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DebounceRegistry {
    pub fn new(delay: Duration) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 入队；覆盖同名的待执行任务并重新计时
    pub fn enqueue<F>(&self, key: &str, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // 代号全局递增，取消后重新入队的任务不会被旧计时器提前触发
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut slots = lock(&self.slots);
            let slot = slots.entry(key.to_string()).or_insert(Slot {
                generation: 0,
                job: None,
            });
            if slot.job.is_some() {
                debug!("去抖队列 {} 覆盖了尚未执行的任务", key);
            }
            slot.generation = generation;
            slot.job = Some(Box::new(job));
        }

        let slots = Arc::clone(&self.slots);
        let key = key.to_string();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let job = {
                let mut slots = lock(&slots);
                let current = slots
                    .get(&key)
                    .map(|slot| slot.generation == generation)
                    .unwrap_or(false);
                if current {
                    slots.remove(&key).and_then(|slot| slot.job)
                } else {
                    None
                }
            };
            if let Some(job) = job {
                job();
            }
        });
    }

    /// 取消同名的待执行任务
    pub fn cancel(&self, key: &str) -> bool {
        lock(&self.slots)
            .remove(key)
            .map(|slot| slot.job.is_some())
            .unwrap_or(false)
    }

    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.slots)
            .get(key)
            .map(|slot| slot.job.is_some())
            .unwrap_or(false)
    }
}
