//! I/O objects and the reactor's poll result.

use std::any::Any;
use std::io;
use std::time::Duration;

/// Outcome of polling an I/O object once.
///
/// Replaces numeric handler return codes: terminal completion is explicit,
/// and a deferral carries its own re-check interval instead of a magic
/// value the loop has to interpret.
#[derive(Debug)]
pub enum IoPoll {
    /// The attempt finished, successfully or not. `Err` carries the fault
    /// that ended it.
    Done(io::Result<()>),

    /// Still in flight; poll again after `retry_after`.
    Pending { retry_after: Duration },
}

impl IoPoll {
    /// True for either terminal outcome.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// The `{event, error}` handler pair a component registers with the
/// reactor for one readiness source.
///
/// An object has exactly one owner at a time and moves between components
/// whole; the reactor owns it for the duration of a registration and hands
/// it back inside the acknowledgment message.
pub trait IoObject: Send + Any {
    /// Poll the underlying readiness source once.
    fn event(&mut self) -> IoPoll;

    /// The reactor observed an unrecoverable fault on this object.
    ///
    /// Diagnostic only. The handler must not tear down resources here;
    /// whichever component owns the object closes them on teardown.
    fn error(&mut self);

    /// Recover the concrete type once ownership returns to the caller.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}
