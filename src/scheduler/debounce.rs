use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

struct Slot {
    generation: u64,
    fired: bool,
    handle: Option<JoinHandle<()>>,
}

struct State<K> {
    next_generation: u64,
    slots: HashMap<K, Slot>,
    detached: Vec<JoinHandle<()>>,
}

struct Shared<K> {
    state: Mutex<State<K>>,
}

impl<K: Eq + Hash> Shared<K> {
    fn lock(&self) -> MutexGuard<'_, State<K>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, key: &K, generation: u64) -> bool {
        self.lock()
            .slots
            .get(key)
            .is_some_and(|slot| slot.generation == generation)
    }

    fn mark_fired(&self, key: &K, generation: u64) -> bool {
        match self.lock().slots.get_mut(key) {
            Some(slot) if slot.generation == generation => {
                slot.fired = true;
                true
            }
            _ => false,
        }
    }

    fn release(&self, key: &K, generation: u64) {
        let mut state = self.lock();
        if state
            .slots
            .get(key)
            .is_some_and(|slot| slot.generation == generation)
        {
            state.slots.remove(key);
        }
    }
}

/// Generation token handed to a debounced action. It stays current until a
/// newer `schedule` call for the same key supersedes it.
pub struct Ticket<K> {
    key: K,
    generation: u64,
    shared: Arc<Shared<K>>,
}

impl<K: Clone> Clone for Ticket<K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            generation: self.generation,
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Ticket<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Ticket")
            .field("key", &self.key)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<K: Eq + Hash> Ticket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.shared.is_current(&self.key, self.generation)
    }
}

/// Per-key cancel-and-reschedule timers. Must be used from inside a tokio runtime.
pub struct Debouncer<K> {
    shared: Arc<Shared<K>>,
}

impl<K> Clone for Debouncer<K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K> Default for Debouncer<K> {
    fn default() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    next_generation: 0,
                    slots: HashMap::new(),
                    detached: Vec::new(),
                }),
            }),
        }
    }
}

impl<K> fmt::Debug for Debouncer<K>
where
    K: Eq + Hash,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        formatter
            .debug_struct("Debouncer")
            .field("slots", &state.slots.len())
            .field("detached", &state.detached.len())
            .finish()
    }
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels any timer still pending under `key` and arms a new one. An
    /// action that already started keeps running, but its ticket goes stale.
    pub fn schedule<F, Fut>(&self, key: K, delay: Duration, action: F) -> Ticket<K>
    where
        F: FnOnce(Ticket<K>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.shared.lock();
        state.next_generation += 1;
        let generation = state.next_generation;

        if let Some(previous) = state.slots.remove(&key) {
            if let Some(handle) = previous.handle {
                if previous.fired {
                    state.detached.push(handle);
                } else {
                    handle.abort();
                    debug!(?key, superseded = previous.generation, "debounce timer replaced");
                }
            }
        }
        state.detached.retain(|handle| !handle.is_finished());

        let ticket = Ticket {
            key: key.clone(),
            generation,
            shared: Arc::clone(&self.shared),
        };
        let task_ticket = ticket.clone();
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let key = task_ticket.key.clone();
            if !shared.mark_fired(&key, generation) {
                return;
            }
            debug!(?key, generation, "debounce timer fired");
            action(task_ticket).await;
            shared.release(&key, generation);
        });

        debug!(?key, generation, delay_ms = delay.as_millis() as u64, "debounce timer armed");
        state.slots.insert(
            key,
            Slot {
                generation,
                fired: false,
                handle: Some(handle),
            },
        );
        ticket
    }

    /// Drops a pending timer without running it. Returns whether one was pending.
    pub fn cancel(&self, key: &K) -> bool {
        let mut state = self.shared.lock();
        match state.slots.get(key) {
            Some(slot) if !slot.fired => {
                if let Some(slot) = state.slots.remove(key) {
                    if let Some(handle) = slot.handle {
                        handle.abort();
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Drops every slot. Pending timers are aborted. Actions that already
    /// started run to completion under [`settle`](Self::settle), but their
    /// tickets go stale.
    pub fn cancel_all(&self) {
        let mut state = self.shared.lock();
        let slots = state.slots.drain().collect::<Vec<_>>();
        for (key, slot) in slots {
            let Some(handle) = slot.handle else {
                continue;
            };
            if slot.fired {
                debug!(?key, generation = slot.generation, "running action detached");
                state.detached.push(handle);
            } else {
                handle.abort();
            }
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.shared
            .lock()
            .slots
            .get(key)
            .is_some_and(|slot| !slot.fired)
    }

    pub fn pending_keys(&self) -> Vec<K> {
        self.shared
            .lock()
            .slots
            .iter()
            .filter(|(_, slot)| !slot.fired)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Waits until every armed timer has fired or been cancelled and every
    /// started action has finished, including work scheduled while waiting.
    pub async fn settle(&self) {
        loop {
            let handles = {
                let mut state = self.shared.lock();
                let mut handles = state.detached.drain(..).collect::<Vec<_>>();
                handles.extend(state.slots.values_mut().filter_map(|slot| slot.handle.take()));
                handles
            };
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                let _ = handle.await;
            }
        }
    }
}
