/// Electrical side of bus ownership.
///
/// `drive` switches the clock, data and chip-select lines over to this
/// server; `release` turns them back into inputs so the other master can use
/// them.
pub trait BusLines: Send {
    fn drive(&mut self);
    fn release(&mut self);
}

/// Lines that need no reconfiguration, e.g. when the card is reached through
/// a host filesystem mount. Only records the transitions.
#[derive(Debug, Default)]
pub struct PassiveLines {
    driven: bool,
}

impl PassiveLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_driven(&self) -> bool {
        self.driven
    }
}

impl BusLines for PassiveLines {
    fn drive(&mut self) {
        self.driven = true;
        tracing::trace!("bus lines driven");
    }

    fn release(&mut self) {
        self.driven = false;
        tracing::trace!("bus lines released");
    }
}
