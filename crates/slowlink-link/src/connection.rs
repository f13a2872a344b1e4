use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use slowlink_frame::{compose, Frame, FrameError, BROADCAST_ADDRESS};
use slowlink_transport::Channel;
use tracing::{debug, error, info, trace, warn};

use crate::config::LinkConfig;
use crate::dispatch::{self, Handler, SlotTable};
use crate::error::{LinkError, Result};
use crate::pacing::PacedWriter;
use crate::reader::FrameReader;

/// Observer invoked by the built-in basic-text handler.
type TextObserver = Box<dyn FnMut(&Frame) + Send>;

/// One messaging endpoint on a shared channel.
///
/// Owns the channel (split into a reader half for the background read
/// loop and a writer half behind the pacing lock), the dispatch table,
/// and the connection-local device address and timeout multiplier.
/// Cheap to clone; clones share the same endpoint.
///
/// The read loop starts at [`Connection::attach`] and runs until the
/// process ends, the peer requests exit (action code 5), or the channel
/// fails; there is no other teardown.
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

struct Shared {
    writer: Mutex<PacedWriter<Box<dyn Channel>>>,
    slots: Mutex<SlotTable>,
    address: AtomicU8,
    multiplier: Mutex<Option<f64>>,
    observer: Mutex<Option<TextObserver>>,
    bits_per_second: u32,
}

impl Connection {
    /// Attach to a channel and start the background read loop.
    ///
    /// The channel handle is cloned: the original becomes the paced
    /// writer half, the clone feeds the reader thread.
    pub fn attach(channel: Box<dyn Channel>, config: LinkConfig) -> Result<Self> {
        let reader_half = channel.try_clone()?;

        let connection = Self {
            shared: Arc::new(Shared {
                writer: Mutex::new(PacedWriter::new(
                    channel,
                    config.bits_per_second,
                    config.chunk_size,
                )),
                slots: Mutex::new(SlotTable::new()),
                address: AtomicU8::new(config.address),
                multiplier: Mutex::new(config.timeout_multiplier),
                observer: Mutex::new(None),
                bits_per_second: config.bits_per_second,
            }),
        };

        let reader = FrameReader::new(reader_half, config.bits_per_second);
        let endpoint = connection.clone();
        thread::Builder::new()
            .name("slowlink-reader".to_string())
            .spawn(move || read_loop(endpoint, reader))?;

        info!(
            address = connection.address(),
            bits_per_second = config.bits_per_second,
            "connection attached"
        );
        Ok(connection)
    }

    /// Serialize and send one frame.
    ///
    /// Takes the write-exclusion lock for the whole paced transmission:
    /// concurrent sends serialize and never interleave on the wire.
    pub fn send(&self, frame: &Frame) -> Result<usize> {
        let wire = frame.encode();
        let mut writer = lock(&self.shared.writer);
        let written = writer.write(&wire)?;
        debug!(
            bytes = written,
            target = frame.target(),
            action = frame.action(),
            "frame sent"
        );
        Ok(written)
    }

    /// Compose and send a payload from this device: a single message when
    /// it fits, a bundle otherwise.
    pub fn send_text(&self, target: u8, action: u8, body: &str) -> Result<usize> {
        let frame = compose(self.address(), target, action, body)?;
        self.send(&frame)
    }

    /// The address this endpoint accepts as `target` (besides broadcast).
    pub fn address(&self) -> u8 {
        self.shared.address.load(Ordering::Relaxed)
    }

    /// Change the device address; takes effect on the next inbound frame.
    pub fn set_address(&self, address: u8) {
        self.shared.address.store(address, Ordering::Relaxed);
        debug!(address, "device address changed");
    }

    /// The current read-timeout multiplier (`None` = wait indefinitely).
    pub fn timeout_multiplier(&self) -> Option<f64> {
        *lock(&self.shared.multiplier)
    }

    /// Change the multiplier; the read loop reloads it before each frame.
    pub fn set_timeout_multiplier(&self, multiplier: Option<f64>) {
        *lock(&self.shared.multiplier) = multiplier;
        debug!(?multiplier, "timeout multiplier changed");
    }

    /// Bind a handler to a user action code (32-254).
    pub fn bind(&self, code: u8, handler: impl Handler + 'static) -> Result<()> {
        lock(&self.shared.slots).bind(code, Box::new(handler))
    }

    /// Remove the binding from a user action code.
    pub fn unbind(&self, code: u8) -> Result<()> {
        lock(&self.shared.slots).unbind(code)
    }

    /// True iff a handler is bound to the code.
    pub fn is_bound(&self, code: u8) -> bool {
        lock(&self.shared.slots).is_used(code)
    }

    /// Register the observer the basic-text handler surfaces bodies to.
    pub fn set_text_observer(&self, observer: impl FnMut(&Frame) + Send + 'static) {
        *lock(&self.shared.observer) = Some(Box::new(observer));
    }

    pub(crate) fn notify_observer(&self, frame: &Frame) {
        if let Some(observer) = lock(&self.shared.observer).as_mut() {
            observer(frame);
        }
    }

    /// The slot lock is released before the handler runs, so handlers may
    /// bind, unbind or send on this connection without deadlocking.
    fn dispatch(&self, frame: &Frame) -> Result<()> {
        let code = frame.action();
        let Some(mut handler) = lock(&self.shared.slots).take(code)? else {
            trace!(code, "no handler bound, frame dropped");
            return Ok(());
        };
        dispatch::invoke(code, handler.as_mut(), frame, self);
        lock(&self.shared.slots).restore(code, handler);
        Ok(())
    }

    /// Bit rate this connection paces against.
    pub fn bits_per_second(&self) -> u32 {
        self.shared.bits_per_second
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.address())
            .field("bits_per_second", &self.shared.bits_per_second)
            .finish()
    }
}

/// Recover the guard even if a holder panicked; the protected state
/// stays usable (the dispatch boundary already contains handler panics).
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// The continuous read loop: decode, filter by destination, dispatch.
fn read_loop(link: Connection, mut reader: FrameReader) {
    loop {
        let multiplier = link.timeout_multiplier();
        match reader.read_frame(multiplier) {
            Ok(frame) => {
                let target = frame.target();
                let address = link.address();
                if target != address && target != BROADCAST_ADDRESS {
                    trace!(target, address, "frame for another device, discarded");
                    continue;
                }
                if let Err(err) = link.dispatch(&frame) {
                    // Only an out-of-table action code lands here.
                    warn!(%err, "frame not dispatchable");
                }
            }
            Err(LinkError::Frame(err @ FrameError::BadFragmentCount(_))) => {
                warn!(%err, "skipping malformed bundle header");
            }
            Err(LinkError::ChannelClosed) => {
                info!("channel closed, reader stopping");
                break;
            }
            Err(err) => {
                error!(%err, "read loop failed, connection no longer receiving");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::mpsc;
    use std::time::Duration;

    use slowlink_frame::{Header, Message, BASIC_TEXT, HEADER_SIZE};
    use slowlink_transport::loopback;

    use super::*;

    fn fast_config() -> LinkConfig {
        LinkConfig {
            bits_per_second: 1_000_000,
            ..LinkConfig::default()
        }
    }

    #[test]
    fn send_puts_paced_frame_bytes_on_the_wire() {
        let (mut far, near) = loopback::pair().unwrap();
        let link = Connection::attach(Box::new(near), fast_config()).unwrap();

        let message = Message::new(7, 9, BASIC_TEXT, "hi").unwrap();
        let written = link.send(&Frame::Message(message)).unwrap();
        assert_eq!(written, 6);

        let mut wire = [0u8; 6];
        far.read_exact(&mut wire).unwrap();
        assert_eq!(wire, [2, 7, 9, BASIC_TEXT, b'h', b'i']);
    }

    #[test]
    fn send_text_uses_the_device_address_as_sender() {
        let (mut far, near) = loopback::pair().unwrap();
        let link = Connection::attach(Box::new(near), fast_config()).unwrap();
        link.set_address(17);

        link.send_text(9, 40, "abc").unwrap();

        let mut header = [0u8; HEADER_SIZE];
        far.read_exact(&mut header).unwrap();
        let header = Header::decode(header);
        assert_eq!(header.sender(), 17);
        assert_eq!(header.target(), 9);
        assert_eq!(header.action(), 40);
    }

    #[test]
    fn concurrent_sends_do_not_interleave() {
        let (mut far, near) = loopback::pair().unwrap();
        let link = Connection::attach(Box::new(near), fast_config()).unwrap();

        let mut threads = Vec::new();
        for i in 0..4u8 {
            let link = link.clone();
            threads.push(thread::spawn(move || {
                let body = char::from(b'a' + i).to_string().repeat(50);
                link.send_text(9, 40, &body).unwrap();
            }));
        }

        let mut wire = vec![0u8; 4 * (HEADER_SIZE + 50)];
        far.read_exact(&mut wire).unwrap();
        for t in threads {
            t.join().unwrap();
        }

        // Each frame's 50-byte body must be a single repeated letter.
        let mut offset = 0;
        for _ in 0..4 {
            let header = Header::decode(wire[offset..offset + HEADER_SIZE].try_into().unwrap());
            assert_eq!(header.body_len(), 50);
            let body = &wire[offset + HEADER_SIZE..offset + HEADER_SIZE + 50];
            assert!(body.iter().all(|&b| b == body[0]));
            offset += HEADER_SIZE + 50;
        }
    }

    #[test]
    fn observer_receives_basic_text() {
        let (mut far, near) = loopback::pair().unwrap();
        let link = Connection::attach(Box::new(near), fast_config()).unwrap();

        let (tx, rx) = mpsc::channel();
        link.set_text_observer(move |frame: &Frame| {
            tx.send(frame.body().into_owned()).unwrap();
        });

        let message = Message::new(1, 255, BASIC_TEXT, "hello there").unwrap();
        std::io::Write::write_all(&mut far, &message.encode()).unwrap();

        let body = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(body, "hello there");
    }

    #[test]
    fn address_and_multiplier_are_runtime_adjustable() {
        let (_far, near) = loopback::pair().unwrap();
        let link = Connection::attach(Box::new(near), fast_config()).unwrap();

        assert_eq!(link.address(), 255);
        link.set_address(4);
        assert_eq!(link.address(), 4);

        assert_eq!(link.timeout_multiplier(), Some(1.5));
        link.set_timeout_multiplier(Some(3.0));
        assert_eq!(link.timeout_multiplier(), Some(3.0));
        link.set_timeout_multiplier(None);
        assert_eq!(link.timeout_multiplier(), None);
    }

    #[test]
    fn binding_through_the_connection() {
        let (_far, near) = loopback::pair().unwrap();
        let link = Connection::attach(Box::new(near), fast_config()).unwrap();

        assert!(!link.is_bound(40));
        link.bind(40, |_: &Frame, _: &Connection| Ok(())).unwrap();
        assert!(link.is_bound(40));
        assert!(matches!(
            link.bind(40, |_: &Frame, _: &Connection| Ok(())),
            Err(LinkError::SlotAlreadyUsed(40))
        ));
        link.unbind(40).unwrap();
        assert!(!link.is_bound(40));
    }
}
