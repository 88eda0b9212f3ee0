use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::bus::lines::BusLines;
use crate::error::DavError;

/// Something observed on the shared bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// The other master pulled chip-select low.
    ChipSelectEdge { at: Instant },
}

/// Sending half handed to whatever watches the chip-select line.
#[derive(Debug, Clone)]
pub struct BusSignal {
    tx: mpsc::UnboundedSender<BusEvent>,
}

impl BusSignal {
    /// Reports an edge observed now.
    pub fn chip_select_edge(&self) {
        self.edge_at(Instant::now());
    }

    pub fn edge_at(&self, at: Instant) {
        if self.tx.send(BusEvent::ChipSelectEdge { at }).is_err() {
            tracing::debug!("bus arbiter gone, dropping chip-select edge");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BusState {
    Free,
    Held { since: Instant },
}

/// Cooperative ownership of the storage bus.
///
/// The server may touch storage only through a [`BusGuard`], and a guard is
/// only handed out once the blockout deadline has passed. Chip-select edges
/// arrive through [`BusSignal`] as queued events; an edge extends the
/// deadline by `window` unless it happened while the server itself held the
/// bus, in which case it is our own traffic.
///
/// Nothing here stops the other master from driving the bus anyway.
pub struct BusArbiter {
    state: BusState,
    blockout_until: Option<Instant>,
    window: Duration,
    events: mpsc::UnboundedReceiver<BusEvent>,
    lines: Box<dyn BusLines>,
}

impl BusArbiter {
    pub fn new(window: Duration, lines: Box<dyn BusLines>) -> (Self, BusSignal) {
        let (tx, events) = mpsc::unbounded_channel();
        let arbiter = Self {
            state: BusState::Free,
            blockout_until: None,
            window,
            events,
            lines,
        };
        (arbiter, BusSignal { tx })
    }

    /// Blocks the bus for one window from `now`, giving the other master the
    /// first chance to claim the card.
    pub fn start_blockout(&mut self, now: Instant) {
        self.extend_blockout(now);
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, BusState::Held { .. })
    }

    pub fn blockout_deadline(&self) -> Option<Instant> {
        self.blockout_until
    }

    pub fn can_take_bus(&mut self) -> bool {
        self.can_take_bus_at(Instant::now())
    }

    /// True iff `now` is past the blockout deadline.
    pub fn can_take_bus_at(&mut self, now: Instant) -> bool {
        self.drain_events();
        self.blockout_until.is_none_or(|deadline| now >= deadline)
    }

    pub fn take_bus_control(&mut self) -> Result<BusGuard<'_>, DavError> {
        self.take_bus_control_at(Instant::now())
    }

    /// Drives the lines and returns the owner token. Dropping the token
    /// releases the bus.
    pub fn take_bus_control_at(&mut self, now: Instant) -> Result<BusGuard<'_>, DavError> {
        if !self.can_take_bus_at(now) {
            return Err(DavError::BusUnavailable);
        }
        self.state = BusState::Held { since: now };
        self.lines.drive();
        tracing::trace!("bus taken");
        Ok(BusGuard { arbiter: self })
    }

    fn relinquish_bus_control(&mut self) {
        self.lines.release();
        self.drain_events();
        self.state = BusState::Free;
        tracing::trace!("bus relinquished");
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            let BusEvent::ChipSelectEdge { at } = event;
            match self.state {
                BusState::Held { since } if at >= since => {
                    tracing::trace!("ignoring chip-select edge from our own traffic");
                }
                _ => self.extend_blockout(at),
            }
        }
    }

    fn extend_blockout(&mut self, at: Instant) {
        let until = at + self.window;
        if self.blockout_until.is_none_or(|current| until > current) {
            tracing::debug!(window_ms = self.window.as_millis() as u64, "bus blocked out");
            self.blockout_until = Some(until);
        }
    }
}

/// Proof of bus ownership. Only one can exist at a time.
pub struct BusGuard<'a> {
    arbiter: &'a mut BusArbiter,
}

impl Drop for BusGuard<'_> {
    fn drop(&mut self) {
        self.arbiter.relinquish_bus_control();
    }
}
