use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub type OwnerId = u64;

struct TimerSlot {
    ticket: u64,
    owner: OwnerId,
    abort: AbortHandle,
}

struct InFlightSlot {
    ticket: u64,
    owner: OwnerId,
    token: CancellationToken,
}

#[derive(Debug, Clone)]
pub struct InFlight {
    key: String,
    ticket: u64,
    token: CancellationToken,
}

impl InFlight {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

pub struct RequestRegistry {
    handle: Handle,
    timers: Mutex<HashMap<String, TimerSlot>>,
    in_flight: Mutex<HashMap<String, InFlightSlot>>,
    next_ticket: AtomicU64,
    next_owner: AtomicU64,
}

impl RequestRegistry {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            timers: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(1),
            next_owner: AtomicU64::new(1),
        }
    }

    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    pub fn register_owner(&self) -> OwnerId {
        self.next_owner.fetch_add(1, Ordering::Relaxed)
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(task);
    }

    pub fn schedule<F>(self: &Arc<Self>, key: &str, owner: OwnerId, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(self);
        let timer_key = key.to_string();

        let mut timers = self.timers.lock();
        if let Some(previous) = timers.remove(key) {
            previous.abort.abort();
            debug!(data_source = key, "debounce timer rescheduled");
        }

        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            registry.fire(&timer_key, ticket);
            task.await;
        });

        timers.insert(
            key.to_string(),
            TimerSlot {
                ticket,
                owner,
                abort: join.abort_handle(),
            },
        );
    }

    fn fire(&self, key: &str, ticket: u64) {
        let mut timers = self.timers.lock();
        if timers.get(key).is_some_and(|slot| slot.ticket == ticket) {
            timers.remove(key);
        }
    }

    pub fn supersede(&self, key: &str, owner: OwnerId) -> InFlight {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = self.in_flight.lock().insert(
            key.to_string(),
            InFlightSlot {
                ticket,
                owner,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
            debug!(data_source = key, "in-flight request superseded");
        }

        InFlight {
            key: key.to_string(),
            ticket,
            token,
        }
    }

    pub fn complete(&self, request: &InFlight) {
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(&request.key)
            .is_some_and(|slot| slot.ticket == request.ticket)
        {
            in_flight.remove(&request.key);
        }
    }

    pub fn cancel(&self, key: &str) {
        self.remove_where(key, |_| true);
    }

    pub fn release(&self, key: &str, owner: OwnerId) {
        self.remove_where(key, |slot_owner| slot_owner == owner);
    }

    fn remove_where(&self, key: &str, matches: impl Fn(OwnerId) -> bool) {
        {
            let mut timers = self.timers.lock();
            if timers.get(key).is_some_and(|slot| matches(slot.owner)) {
                if let Some(slot) = timers.remove(key) {
                    slot.abort.abort();
                    debug!(data_source = key, "debounce timer cleared");
                }
            }
        }

        let mut in_flight = self.in_flight.lock();
        if in_flight.get(key).is_some_and(|slot| matches(slot.owner)) {
            if let Some(slot) = in_flight.remove(key) {
                slot.token.cancel();
                debug!(data_source = key, "in-flight request aborted");
            }
        }
    }

    pub fn has_pending_timer(&self, key: &str) -> bool {
        self.timers.lock().contains_key(key)
    }

    pub fn has_in_flight(&self, key: &str) -> bool {
        self.in_flight.lock().contains_key(key)
    }

    pub fn is_idle(&self) -> bool {
        self.timers.lock().is_empty() && self.in_flight.lock().is_empty()
    }
}

impl Drop for RequestRegistry {
    fn drop(&mut self) {
        for (_, slot) in self.timers.get_mut().drain() {
            slot.abort.abort();
        }
        for (_, slot) in self.in_flight.get_mut().drain() {
            slot.token.cancel();
        }
    }
}
