//! Reliable channel: ordered, synchronous publish/subscribe.
//!
//! Handlers subscribe per [`SignalKind`] and are called in subscription
//! order. A handler may emit further signals through its [`Outbox`]; those
//! are queued and delivered after the signal being dispatched has reached
//! every handler, in emission order. Nothing is ever dropped: a handler that
//! keeps re-emitting its own signal loops forever.

use std::collections::{HashMap, VecDeque};

use rampart_core::events::{Signal, SignalKind};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Queue a handler can emit follow-up signals into.
pub struct Outbox<'a> {
    queue: &'a mut VecDeque<Signal>,
}

impl Outbox<'_> {
    pub fn emit(&mut self, signal: Signal) {
        self.queue.push_back(signal);
    }
}

pub type Handler = Box<dyn FnMut(&Signal, &mut Outbox<'_>)>;

#[derive(Default)]
pub struct SignalBus {
    handlers: HashMap<SignalKind, Vec<(SubscriptionId, Handler)>>,
    pending: VecDeque<Signal>,
    /// Every delivered signal since the last `drain_journal`.
    journal: Vec<Signal>,
    next_id: u64,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: SignalKind,
        handler: impl FnMut(&Signal, &mut Outbox<'_>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(sub, _)| *sub == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver `signal` and anything its handlers emit, before returning.
    pub fn emit(&mut self, signal: Signal) {
        self.pending.push_back(signal);
        while let Some(signal) = self.pending.pop_front() {
            if let Some(list) = self.handlers.get_mut(&signal.kind()) {
                let mut outbox = Outbox {
                    queue: &mut self.pending,
                };
                for (_, handler) in list.iter_mut() {
                    handler(&signal, &mut outbox);
                }
            }
            self.journal.push(signal);
        }
    }

    /// Signals delivered since the last drain, in delivery order.
    pub fn drain_journal(&mut self) -> std::vec::Drain<'_, Signal> {
        self.journal.drain(..)
    }

    /// Forget delivered signals without reading them.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn journal(&self) -> &[Signal] {
        &self.journal
    }

    pub fn subscriber_count(&self, kind: SignalKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBus")
            .field("subscriptions", &self.handlers.values().map(Vec::len).sum::<usize>())
            .field("journal", &self.journal.len())
            .finish()
    }
}
