//! Hand-written transport mocks shared by the unit tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use blc_hal::{ErrorKind, LockError, OpenError, PortLock, UartConfig, UartError, UartOpen, UartTx};

/// Scripted outcome of one `write` call
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Accept at most this many bytes
    Accept(usize),
    /// Fail with this kind
    Fail(ErrorKind),
}

#[derive(Debug)]
pub struct MockError(pub ErrorKind);

impl UartError for MockError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug, Default)]
struct WireState {
    bytes: Vec<u8>,
    script: VecDeque<Step>,
}

/// Shared view of everything written to a mock port
#[derive(Debug, Clone, Default)]
pub struct Wire(Rc<RefCell<WireState>>);

impl Wire {
    /// Outcomes for the next writes; unscripted writes accept everything
    pub fn script(&self, steps: impl IntoIterator<Item = Step>) {
        self.0.borrow_mut().script = steps.into_iter().collect();
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.borrow().bytes.clone()
    }

    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut self.0.borrow_mut().bytes)
    }
}

pub struct MockPort {
    wire: Wire,
}

impl UartTx for MockPort {
    type Error = MockError;

    fn write(&mut self, data: &[u8]) -> Result<usize, MockError> {
        let mut state = self.wire.0.borrow_mut();
        let n = match state.script.pop_front() {
            None => data.len(),
            Some(Step::Accept(n)) => n.min(data.len()),
            Some(Step::Fail(kind)) => return Err(MockError(kind)),
        };
        state.bytes.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), MockError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MockOpener {
    wire: Wire,
    failure: Option<OpenError>,
    config: Option<UartConfig>,
}

impl MockOpener {
    pub fn failing(failure: OpenError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// Handle on the wire of the port this opener produces
    pub fn wire(&self) -> Wire {
        self.wire.clone()
    }

    /// Line settings of the last successful open
    pub fn config(&self) -> Option<UartConfig> {
        self.config
    }
}

impl UartOpen for MockOpener {
    type Port = MockPort;

    fn open(&mut self, _path: &str, config: &UartConfig) -> Result<MockPort, OpenError> {
        if let Some(failure) = self.failure {
            return Err(failure);
        }
        self.config = Some(*config);
        Ok(MockPort {
            wire: self.wire.clone(),
        })
    }
}

#[derive(Debug, Default)]
struct LockState {
    held: Vec<String>,
    releases: usize,
    stray_releases: usize,
    refuse: Option<LockError>,
}

/// Lock manager recording acquire/release calls
#[derive(Debug, Clone, Default)]
pub struct MockLock(Rc<RefCell<LockState>>);

impl MockLock {
    pub fn busy(error: LockError) -> Self {
        let lock = Self::default();
        lock.0.borrow_mut().refuse = Some(error);
        lock
    }

    pub fn held(&self) -> Vec<String> {
        self.0.borrow().held.clone()
    }

    pub fn releases(&self) -> usize {
        self.0.borrow().releases
    }

    /// Releases of locks that were not held
    pub fn stray_releases(&self) -> usize {
        self.0.borrow().stray_releases
    }
}

impl PortLock for MockLock {
    fn acquire(&mut self, port: &str) -> Result<(), LockError> {
        let mut state = self.0.borrow_mut();
        if let Some(error) = state.refuse {
            return Err(error);
        }
        state.held.push(port.to_owned());
        Ok(())
    }

    fn release(&mut self, port: &str) {
        let mut state = self.0.borrow_mut();
        match state.held.iter().position(|p| p == port) {
            Some(i) => {
                state.held.remove(i);
                state.releases += 1;
            }
            None => state.stray_releases += 1,
        }
    }
}
