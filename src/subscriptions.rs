//! Subscription and timer registry.
//!
//! Process-wide bookkeeping for the stage's listener bindings and named
//! timers. Every handle created here is released exactly once, including on
//! abnormal teardown; double disconnects and double cancels are no-ops.
//!
//! Bindings are keyed by [`Signal`] and carry an explicit [`BindingId`]
//! unregister token. A one-shot binding is a first-class registration kind:
//! the registry removes it before its callback runs, so it can never fire
//! twice even if teardown races with the event. Timers are named calloop
//! sources; starting a name that is already running replaces the deadline.

use std::collections::{HashMap, HashSet};
use std::mem;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use tracing::trace;

use crate::stage::State;

/// Callback invoked when a bound signal is emitted.
pub type SignalCallback = Box<dyn FnMut(&mut State)>;

// =============================================================================
// Signal
// =============================================================================

/// Collaborator-raised notifications routed through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The dialog is verifying credentials; the watchdog must not interrupt.
    InhibitTimeout,
    /// Credential verification finished; re-arm the watchdog.
    UninhibitTimeout,
    AuthSuccess,
    AuthFailure,
    /// The unlock dialog's reveal/unreveal animation completed.
    UnlockRevealChanged,
    /// The background configuration changed; wallpapers need rebuilding.
    BackgroundChanged,
}

// =============================================================================
// Handles
// =============================================================================

/// Unregister token for one listener binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingKind {
    Persistent,
    OneShot,
}

struct Binding {
    id: BindingId,
    kind: BindingKind,
    callback: SignalCallback,
}

struct TimerEntry {
    token: RegistrationToken,
    serial: u64,
}

/// Running totals, exposed so tests can assert the single-release guarantee.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionStats {
    pub bindings_connected: u64,
    pub bindings_released: u64,
    pub timers_started: u64,
    pub timers_finished: u64,
}

// =============================================================================
// SubscriptionRegistry
// =============================================================================

pub struct SubscriptionRegistry {
    loop_handle: LoopHandle<'static, State>,
    timers: HashMap<&'static str, TimerEntry>,
    bindings: HashMap<Signal, Vec<Binding>>,
    /// Bindings currently checked out by an in-progress dispatch.
    in_flight: HashSet<BindingId>,
    /// In-flight bindings disconnected mid-dispatch; dropped on put-back.
    retired: HashSet<BindingId>,
    next_binding: u64,
    next_timer_serial: u64,
    shut_down: bool,
    stats: SubscriptionStats,
}

impl SubscriptionRegistry {
    pub fn new(loop_handle: LoopHandle<'static, State>) -> Self {
        Self {
            loop_handle,
            timers: HashMap::new(),
            bindings: HashMap::new(),
            in_flight: HashSet::new(),
            retired: HashSet::new(),
            next_binding: 0,
            next_timer_serial: 0,
            shut_down: false,
            stats: SubscriptionStats::default(),
        }
    }

    // =========================================================================
    // Listener bindings
    // =========================================================================

    /// Binds a callback to `signal` until disconnected or released.
    pub fn connect(&mut self, signal: Signal, callback: SignalCallback) -> BindingId {
        self.register(signal, BindingKind::Persistent, callback)
    }

    /// Binds a callback that fires at most once.
    pub fn connect_once(&mut self, signal: Signal, callback: SignalCallback) -> BindingId {
        self.register(signal, BindingKind::OneShot, callback)
    }

    fn register(
        &mut self,
        signal: Signal,
        kind: BindingKind,
        callback: SignalCallback,
    ) -> BindingId {
        let id = BindingId(self.next_binding);
        self.next_binding += 1;

        if self.shut_down {
            trace!("ignoring connect to {signal:?} after registry shutdown");
            return id;
        }

        self.bindings
            .entry(signal)
            .or_default()
            .push(Binding { id, kind, callback });
        self.stats.bindings_connected += 1;
        id
    }

    /// Removes one binding. Safe to call twice; the second call is a no-op.
    pub fn disconnect(&mut self, signal: Signal, id: BindingId) {
        if let Some(entries) = self.bindings.get_mut(&signal) {
            if let Some(pos) = entries.iter().position(|b| b.id == id) {
                entries.remove(pos);
                if entries.is_empty() {
                    self.bindings.remove(&signal);
                }
                self.stats.bindings_released += 1;
                return;
            }
        }

        // Checked out by a dispatch in progress: drop it on put-back instead.
        if self.in_flight.contains(&id) && self.retired.insert(id) {
            self.stats.bindings_released += 1;
        }
    }

    /// Returns whether any binding for `signal` is registered.
    pub fn has_binding(&self, signal: Signal) -> bool {
        self.bindings.contains_key(&signal)
    }

    fn take_bindings(&mut self, signal: Signal) -> Vec<Binding> {
        let batch = self.bindings.remove(&signal).unwrap_or_default();
        self.in_flight.extend(batch.iter().map(|b| b.id));
        batch
    }

    fn put_back(&mut self, signal: Signal, batch: Vec<Binding>) {
        let mut kept = Vec::new();
        for binding in batch {
            self.in_flight.remove(&binding.id);

            if self.retired.remove(&binding.id) {
                // Disconnected mid-dispatch; already counted.
                continue;
            }
            if self.shut_down || binding.kind == BindingKind::OneShot {
                self.stats.bindings_released += 1;
                continue;
            }
            kept.push(binding);
        }

        // Listeners registered during the dispatch were appended to a fresh
        // entry; they keep their position after the surviving originals.
        if let Some(added) = self.bindings.remove(&signal) {
            kept.extend(added);
        }
        if !kept.is_empty() {
            self.bindings.insert(signal, kept);
        }
    }

    fn is_retired(&self, id: BindingId) -> bool {
        self.retired.contains(&id)
    }

    // =========================================================================
    // Named timers
    // =========================================================================

    /// Starts (or restarts) the named timer. A running timer of the same name
    /// is replaced, never doubled. The callback's return value decides
    /// whether the timer repeats at the same interval.
    pub fn start<F>(&mut self, name: &'static str, duration: Duration, mut callback: F)
    where
        F: FnMut(&mut State) -> bool + 'static,
    {
        self.cancel(name);

        if self.shut_down {
            trace!("ignoring timer {name:?} after registry shutdown");
            return;
        }

        let serial = self.next_timer_serial;
        self.next_timer_serial += 1;

        let timer = Timer::from_duration(duration);
        let token = self
            .loop_handle
            .insert_source(timer, move |_, _, state| {
                if callback(state) {
                    TimeoutAction::ToDuration(duration)
                } else {
                    state.stage.subscriptions.expire_timer(name, serial);
                    TimeoutAction::Drop
                }
            })
            .unwrap();

        self.timers.insert(name, TimerEntry { token, serial });
        self.stats.timers_started += 1;
    }

    /// Cancels the named timer. Safe to call when absent.
    pub fn cancel(&mut self, name: &'static str) {
        if let Some(entry) = self.timers.remove(name) {
            self.loop_handle.remove(entry.token);
            self.stats.timers_finished += 1;
        }
    }

    /// Returns whether the named timer is currently scheduled.
    pub fn timer_active(&self, name: &'static str) -> bool {
        self.timers.contains_key(name)
    }

    /// Final-firing bookkeeping; the calloop source drops itself.
    fn expire_timer(&mut self, name: &'static str, serial: u64) {
        // A serial mismatch means the timer was replaced while firing; the
        // live entry belongs to the new timer.
        let expired = self
            .timers
            .get(name)
            .is_some_and(|entry| entry.serial == serial);
        if expired {
            self.timers.remove(name);
            self.stats.timers_finished += 1;
        }
    }

    // =========================================================================
    // Teardown and accounting
    // =========================================================================

    /// Releases every outstanding binding and timer, in unspecified order.
    /// Subsequent registrations are ignored; calling again is a no-op.
    pub fn release_all(&mut self) {
        self.shut_down = true;

        for (_, entry) in self.timers.drain() {
            self.loop_handle.remove(entry.token);
            self.stats.timers_finished += 1;
        }

        for (_, entries) in mem::take(&mut self.bindings) {
            self.stats.bindings_released += entries.len() as u64;
        }
        // In-flight bindings are counted when their dispatch puts them back.
    }

    pub fn live_bindings(&self) -> usize {
        self.bindings.values().map(Vec::len).sum::<usize>() + self.in_flight.len()
            - self.retired.len()
    }

    pub fn live_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn stats(&self) -> SubscriptionStats {
        self.stats
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Delivers `signal` to every binding registered for it.
///
/// One-shot bindings are checked out before their callback runs and never
/// put back. Listeners registered from inside a callback do not observe the
/// emission that registered them.
pub fn emit(state: &mut State, signal: Signal) {
    trace!("signal {signal:?}");

    let mut batch = state.stage.subscriptions.take_bindings(signal);
    for binding in &mut batch {
        if state.stage.subscriptions.is_retired(binding.id) {
            continue;
        }
        (binding.callback)(state);
    }
    state.stage.subscriptions.put_back(signal, batch);
}
