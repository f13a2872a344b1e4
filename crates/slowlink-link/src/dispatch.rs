use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use slowlink_frame::{code_name, is_reserved, is_user, Frame};
use tracing::{error, info, warn};

use crate::connection::Connection;
use crate::error::{LinkError, Result};

/// Number of dispatchable slots (action codes 0-254; 255 is unused).
const SLOT_COUNT: usize = 255;

/// A bound action-code handler.
///
/// Handlers run synchronously inside the connection's read loop: a slow
/// handler stalls subsequent frame reception, so hand long work off and
/// return quickly. The handler is taken out of the table for the duration
/// of the call, so binding, unbinding and sending on the handler's own
/// connection are all allowed from inside it.
///
/// Implemented for any `FnMut(&Frame, &Connection) -> Result<()> + Send`.
pub trait Handler: Send {
    fn handle(&mut self, frame: &Frame, link: &Connection) -> Result<()>;
}

impl<F> Handler for F
where
    F: FnMut(&Frame, &Connection) -> Result<()> + Send,
{
    fn handle(&mut self, frame: &Frame, link: &Connection) -> Result<()> {
        self(frame, link)
    }
}

impl std::fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

enum Slot {
    Vacant,
    Bound(Box<dyn Handler>),
    /// Taken out for a running invocation; counts as occupied.
    InFlight,
}

/// Fixed-size table of action-code handler bindings.
///
/// Codes 0-31 are reserved; the table pre-binds the protocol-internal
/// handlers (1 basic text, 3 timeout multiplier, 5 exit). Codes 32-254
/// take one user binding each. The bundle-header code stays vacant: the
/// frame reader expands bundles before dispatch, so a bundle arrives here
/// under its payload's action code.
pub struct SlotTable {
    slots: Vec<Slot>,
}

impl SlotTable {
    pub fn new() -> Self {
        let mut slots: Vec<Slot> = (0..SLOT_COUNT).map(|_| Slot::Vacant).collect();
        slots[usize::from(slowlink_frame::BASIC_TEXT)] = Slot::Bound(Box::new(basic_text));
        slots[usize::from(slowlink_frame::TIMEOUT_MULTIPLIER)] =
            Slot::Bound(Box::new(apply_timeout_multiplier));
        slots[usize::from(slowlink_frame::EXIT)] = Slot::Bound(Box::new(exit_process));
        Self { slots }
    }

    /// Take the handler bound to `code` out of the table for one
    /// invocation, leaving an in-flight marker in its place. Fails only
    /// for codes outside the table; a vacant slot yields `None`.
    pub fn take(&mut self, code: u8) -> Result<Option<Box<dyn Handler>>> {
        let Some(slot) = self.slots.get_mut(usize::from(code)) else {
            return Err(LinkError::CodeOutOfRange(code));
        };

        match std::mem::replace(slot, Slot::InFlight) {
            Slot::Bound(handler) => Ok(Some(handler)),
            other => {
                *slot = other;
                Ok(None)
            }
        }
    }

    /// Put a taken handler back, unless the slot was unbound or rebound
    /// while the invocation ran (the newer binding wins).
    pub fn restore(&mut self, code: u8, handler: Box<dyn Handler>) {
        if let Some(slot) = self.slots.get_mut(usize::from(code)) {
            if matches!(slot, Slot::InFlight) {
                *slot = Slot::Bound(handler);
            }
        }
    }

    /// Bind a handler to a user action code (32-254).
    pub fn bind(&mut self, code: u8, handler: Box<dyn Handler>) -> Result<()> {
        check_user_window(code)?;
        let slot = &mut self.slots[usize::from(code)];
        if !matches!(slot, Slot::Vacant) {
            return Err(LinkError::SlotAlreadyUsed(code));
        }
        *slot = Slot::Bound(handler);
        Ok(())
    }

    /// Remove the binding from a user action code.
    pub fn unbind(&mut self, code: u8) -> Result<()> {
        check_user_window(code)?;
        let slot = &mut self.slots[usize::from(code)];
        if matches!(slot, Slot::Vacant) {
            return Err(LinkError::EmptySlot(code));
        }
        *slot = Slot::Vacant;
        Ok(())
    }

    /// True iff the slot differs from the vacant placeholder.
    pub fn is_used(&self, code: u8) -> bool {
        matches!(
            self.slots.get(usize::from(code)),
            Some(Slot::Bound(_) | Slot::InFlight)
        )
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}

fn check_user_window(code: u8) -> Result<()> {
    if is_user(code) {
        Ok(())
    } else if is_reserved(code) {
        Err(LinkError::ReservedCode(code))
    } else {
        Err(LinkError::CodeOutOfRange(code))
    }
}

/// Run one handler invocation with fault isolation: errors and panics
/// are caught and logged here, never propagated. One misbehaving handler
/// must not stop the read loop.
pub(crate) fn invoke(code: u8, handler: &mut dyn Handler, frame: &Frame, link: &Connection) {
    match catch_unwind(AssertUnwindSafe(|| handler.handle(frame, link))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(code, name = code_name(code), %err, "handler failed")
        }
        Err(payload) => {
            error!(
                code,
                name = code_name(code),
                panic = %format_panic(payload.as_ref()),
                "handler panicked"
            )
        }
    }
}

fn format_panic(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

/// Code 1: surface the message body to the connection's text observer.
fn basic_text(frame: &Frame, link: &Connection) -> Result<()> {
    info!(
        sender = frame.sender(),
        broken = frame.is_broken(),
        body = %frame.body(),
        "text received"
    );
    link.notify_observer(frame);
    Ok(())
}

/// Code 3: apply a new read-timeout multiplier from the frame body.
///
/// The body is either `None` (wait indefinitely for declared body bytes)
/// or a positive float. Anything else is a handler failure, absorbed at
/// the dispatch boundary like any other.
fn apply_timeout_multiplier(frame: &Frame, link: &Connection) -> Result<()> {
    let body = frame.body();
    let value = body.trim();
    if value == "None" {
        link.set_timeout_multiplier(None);
        return Ok(());
    }
    match value.parse::<f64>() {
        Ok(m) if m.is_finite() && m > 0.0 => {
            link.set_timeout_multiplier(Some(m));
            Ok(())
        }
        _ => Err(LinkError::Handler(format!(
            "invalid timeout multiplier: {value:?}"
        ))),
    }
}

/// Code 5: terminate the process.
fn exit_process(frame: &Frame, _link: &Connection) -> Result<()> {
    warn!(sender = frame.sender(), "exit requested by peer");
    std::process::exit(0);
}
