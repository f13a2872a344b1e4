//! End-to-end tests for the connection engine over loopback channels.

#![cfg(unix)]

use std::io::Write;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use slowlink_frame::{Frame, Message, BASIC_TEXT, TIMEOUT_MULTIPLIER};
use slowlink_link::{Connection, LinkConfig, Result};
use slowlink_transport::loopback;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn attach(bits_per_second: u32) -> (slowlink_transport::LoopbackChannel, Connection) {
    let (far, near) = loopback::pair().unwrap();
    let config = LinkConfig {
        bits_per_second,
        ..LinkConfig::default()
    };
    let link = Connection::attach(Box::new(near), config).unwrap();
    (far, link)
}

#[test]
fn basic_text_scenario() {
    // sender=1, target=255 (device), action=1, body "hi".
    let (mut far, link) = attach(1_000_000);
    let (tx, rx) = mpsc::channel();
    link.set_text_observer(move |frame: &Frame| {
        tx.send(frame.body().into_owned()).unwrap();
    });

    far.write_all(&[2, 1, 255, 1, b'h', b'i']).unwrap();

    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "hi");
}

#[test]
fn frames_for_other_devices_are_discarded() {
    let (mut far, link) = attach(1_000_000);

    let (tx, rx) = mpsc::channel();
    link.bind(40, move |frame: &Frame, _: &Connection| -> Result<()> {
        tx.send(frame.body().into_owned()).unwrap();
        Ok(())
    })
    .unwrap();

    let other = Message::new(1, 9, 40, "not for us").unwrap();
    let broadcast = Message::new(1, 0, 40, "broadcast").unwrap();
    let direct = Message::new(1, 255, 40, "direct").unwrap();
    far.write_all(&other.encode()).unwrap();
    far.write_all(&broadcast.encode()).unwrap();
    far.write_all(&direct.encode()).unwrap();

    // Frames arrive in order; the filtered one must never show up.
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "broadcast");
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "direct");
    assert!(rx.try_recv().is_err());
}

#[test]
fn failing_handler_does_not_stop_the_loop() {
    let (mut far, link) = attach(1_000_000);

    link.bind(40, |_: &Frame, _: &Connection| -> Result<()> {
        Err(slowlink_link::LinkError::Handler("always fails".into()))
    })
    .unwrap();

    let (tx, rx) = mpsc::channel();
    link.bind(41, move |_: &Frame, _: &Connection| -> Result<()> {
        tx.send(()).unwrap();
        Ok(())
    })
    .unwrap();

    far.write_all(&Message::new(1, 255, 40, "boom").unwrap().encode())
        .unwrap();
    far.write_all(&Message::new(1, 255, 41, "after").unwrap().encode())
        .unwrap();

    rx.recv_timeout(RECV_TIMEOUT).unwrap();
}

#[test]
fn panicking_handler_does_not_stop_the_loop() {
    let (mut far, link) = attach(1_000_000);

    link.bind(40, |_: &Frame, _: &Connection| -> Result<()> {
        panic!("handler exploded");
    })
    .unwrap();

    let (tx, rx) = mpsc::channel();
    link.bind(41, move |_: &Frame, _: &Connection| -> Result<()> {
        tx.send(()).unwrap();
        Ok(())
    })
    .unwrap();

    far.write_all(&Message::new(1, 255, 40, "boom").unwrap().encode())
        .unwrap();
    far.write_all(&Message::new(1, 255, 41, "after").unwrap().encode())
        .unwrap();

    rx.recv_timeout(RECV_TIMEOUT).unwrap();
}

#[test]
fn handler_can_rebind_codes_on_its_own_connection() {
    let (mut far, link) = attach(1_000_000);

    let (tx, rx) = mpsc::channel();
    link.bind(40, move |_: &Frame, link: &Connection| -> Result<()> {
        link.unbind(40)?;
        let tx = tx.clone();
        link.bind(41, move |frame: &Frame, _: &Connection| -> Result<()> {
            tx.send(frame.body().into_owned()).unwrap();
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    far.write_all(&Message::new(1, 255, 40, "flip").unwrap().encode())
        .unwrap();
    far.write_all(&Message::new(1, 255, 41, "after").unwrap().encode())
        .unwrap();

    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "after");
    assert!(!link.is_bound(40));
    assert!(link.is_bound(41));
}

#[test]
fn bundles_travel_between_two_connections() {
    let (far, near) = loopback::pair().unwrap();
    let config = LinkConfig {
        bits_per_second: 1_000_000,
        ..LinkConfig::default()
    };
    let sender = Connection::attach(Box::new(far), config.clone()).unwrap();
    let receiver = Connection::attach(Box::new(near), config).unwrap();

    let (tx, rx) = mpsc::channel();
    receiver.set_text_observer(move |frame: &Frame| {
        tx.send((frame.body().into_owned(), frame.is_broken()))
            .unwrap();
    });

    let payload = "all work and no play makes a dull link ".repeat(20);
    sender.send_text(255, BASIC_TEXT, &payload).unwrap();

    let (body, broken) = rx.recv_timeout(RECV_TIMEOUT).unwrap();
    assert_eq!(body, payload);
    assert!(!broken);
}

#[test]
fn truncated_body_dispatches_as_broken() {
    // 8 kbit/s: a 10-byte body gets a 15ms deadline, generous for a
    // loopback but short for the test.
    let (mut far, link) = attach(8_000);

    let (tx, rx) = mpsc::channel();
    link.set_text_observer(move |frame: &Frame| {
        tx.send((frame.body().into_owned(), frame.is_broken()))
            .unwrap();
    });

    far.write_all(&[10, 1, 255, BASIC_TEXT]).unwrap();
    far.write_all(b"abcdef").unwrap();

    let (body, broken) = rx.recv_timeout(RECV_TIMEOUT).unwrap();
    assert!(broken);
    assert_eq!(body.len(), 10);
    assert_eq!(&body[..6], "abcdef");
}

#[test]
fn peer_can_adjust_the_timeout_multiplier() {
    let (mut far, link) = attach(1_000_000);
    assert_eq!(link.timeout_multiplier(), Some(1.5));

    far.write_all(&Message::new(1, 255, TIMEOUT_MULTIPLIER, "3.0").unwrap().encode())
        .unwrap();
    wait_for(|| link.timeout_multiplier() == Some(3.0));

    far.write_all(&Message::new(1, 255, TIMEOUT_MULTIPLIER, "None").unwrap().encode())
        .unwrap();
    wait_for(|| link.timeout_multiplier().is_none());

    // Garbage is a handler failure: logged, absorbed, value unchanged.
    far.write_all(&Message::new(1, 255, TIMEOUT_MULTIPLIER, "fast").unwrap().encode())
        .unwrap();
    far.write_all(&Message::new(1, 255, TIMEOUT_MULTIPLIER, "0.5").unwrap().encode())
        .unwrap();
    wait_for(|| link.timeout_multiplier() == Some(0.5));
}

fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + RECV_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("condition not reached in time");
}
