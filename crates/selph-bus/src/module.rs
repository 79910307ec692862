//! BusModule trait and capability descriptor
//!
//! A module states up front which deliveries it accepts. The bus reads the
//! descriptor once, at registration, and never probes per call.

use selph_core::{Envelope, Error, Result};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub receive: bool,
    pub update: bool,
}

impl Capabilities {
    pub const NONE: Self = Self { receive: false, update: false };
    pub const RECEIVE: Self = Self { receive: true, update: false };
    pub const UPDATE: Self = Self { receive: false, update: true };
    pub const BOTH: Self = Self { receive: true, update: true };
}

/// Anything the message bus can fan out to.
///
/// Implement `receive` for stimuli/events and `update` for configuration or
/// identity changes, and advertise them in `capabilities()`. Errors and
/// panics are isolated by the bus; they never reach other modules.
pub trait BusModule {
    /// Name used in logs and delivery reports.
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    fn receive(&mut self, _envelope: &Envelope) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _envelope: &Envelope) -> Result<()> {
        Ok(())
    }
}

impl<M: BusModule + ?Sized> BusModule for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn receive(&mut self, envelope: &Envelope) -> Result<()> {
        (**self).receive(envelope)
    }

    fn update(&mut self, envelope: &Envelope) -> Result<()> {
        (**self).update(envelope)
    }
}

/// A module shared between the bus and its owner.
///
/// Name and capabilities are captured when wrapped. A delivery that arrives
/// while the owner holds a borrow fails with `ModuleBusy`.
pub struct Shared<M> {
    inner: Rc<RefCell<M>>,
    name: String,
    capabilities: Capabilities,
}

impl<M: BusModule> Shared<M> {
    pub fn new(inner: Rc<RefCell<M>>) -> Self {
        let (name, capabilities) = {
            let module = inner.borrow();
            (module.name().to_string(), module.capabilities())
        };
        Self {
            inner,
            name,
            capabilities,
        }
    }

    pub fn handle(&self) -> Rc<RefCell<M>> {
        Rc::clone(&self.inner)
    }

    fn with<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut M) -> Result<()>,
    {
        let mut module = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::ModuleBusy(self.name.clone()))?;
        f(&mut *module)
    }
}

impl<M: BusModule> BusModule for Shared<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn receive(&mut self, envelope: &Envelope) -> Result<()> {
        self.with(|m| m.receive(envelope))
    }

    fn update(&mut self, envelope: &Envelope) -> Result<()> {
        self.with(|m| m.update(envelope))
    }
}
