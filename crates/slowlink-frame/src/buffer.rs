//! Ordered containers used as internal frame storage.
//!
//! The element-type contract of the original containers is enforced at
//! compile time here: a `Queue<T>` only ever holds `T`. What remains
//! runtime-checked is emptiness and the lookup-by-code contract of
//! [`TransparentBuffer`].

use std::collections::VecDeque;

use crate::message::Frame;

/// Errors from container access.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// Peek or pop on an empty container.
    #[error("container is empty")]
    Empty,

    /// No buffered frame carries the requested action code.
    #[error("no buffered frame with action code {0}")]
    CodeNotFound(u8),
}

/// A FIFO queue: insert at the back, peek and pop at the front.
#[derive(Debug, Clone, Default)]
pub struct Queue<T> {
    data: VecDeque<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            data: VecDeque::new(),
        }
    }

    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            data: items.into_iter().collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn insert(&mut self, element: T) {
        self.data.push_back(element);
    }

    pub fn peek(&self) -> Result<&T, BufferError> {
        self.data.front().ok_or(BufferError::Empty)
    }

    pub fn pop(&mut self) -> Result<T, BufferError> {
        self.data.pop_front().ok_or(BufferError::Empty)
    }
}

/// A double-ended queue: the [`Queue`] operations plus insertion at the
/// front and peek/pop at the back.
#[derive(Debug, Clone, Default)]
pub struct Dequeue<T> {
    inner: Queue<T>,
}

impl<T> Dequeue<T> {
    pub fn new() -> Self {
        Self {
            inner: Queue::new(),
        }
    }

    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            inner: Queue::with_items(items),
        }
    }

    pub fn insert_first(&mut self, element: T) {
        self.inner.data.push_front(element);
    }

    pub fn peek_last(&self) -> Result<&T, BufferError> {
        self.inner.data.back().ok_or(BufferError::Empty)
    }

    pub fn pop_last(&mut self) -> Result<T, BufferError> {
        self.inner.data.pop_back().ok_or(BufferError::Empty)
    }
}

impl<T> std::ops::Deref for Dequeue<T> {
    type Target = Queue<T>;

    fn deref(&self) -> &Queue<T> {
        &self.inner
    }
}

impl<T> std::ops::DerefMut for Dequeue<T> {
    fn deref_mut(&mut self) -> &mut Queue<T> {
        &mut self.inner
    }
}

/// Frame storage: a double-ended queue restricted to sendable frames.
pub type Buffer = Dequeue<Frame>;

/// Frame storage with lookup by action code.
///
/// `peek`, `has` and `pop` match the first frame in insertion order whose
/// action code equals the requested one.
#[derive(Debug, Clone, Default)]
pub struct TransparentBuffer {
    data: VecDeque<Frame>,
}

impl TransparentBuffer {
    pub fn new() -> Self {
        Self {
            data: VecDeque::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn insert(&mut self, frame: Frame) {
        self.data.push_back(frame);
    }

    pub fn has(&self, code: u8) -> bool {
        self.position(code).is_some()
    }

    pub fn peek(&self, code: u8) -> Result<&Frame, BufferError> {
        self.position(code)
            .map(|idx| &self.data[idx])
            .ok_or(BufferError::CodeNotFound(code))
    }

    pub fn pop(&mut self, code: u8) -> Result<Frame, BufferError> {
        let idx = self
            .position(code)
            .ok_or(BufferError::CodeNotFound(code))?;
        Ok(self.data.remove(idx).expect("index from position"))
    }

    fn position(&self, code: u8) -> Option<usize> {
        self.data.iter().position(|frame| frame.action() == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    fn frame(code: u8, body: &str) -> Frame {
        Frame::Message(Message::new(1, 2, code, body).unwrap())
    }

    #[test]
    fn queue_is_fifo() {
        let mut queue = Queue::new();
        queue.insert(1);
        queue.insert(2);
        queue.insert(3);

        assert_eq!(queue.size(), 3);
        assert_eq!(queue.peek(), Ok(&1));
        assert_eq!(queue.pop(), Ok(1));
        assert_eq!(queue.pop(), Ok(2));
        assert_eq!(queue.pop(), Ok(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_queue_access_fails() {
        let mut queue: Queue<u8> = Queue::new();
        assert_eq!(queue.peek().unwrap_err(), BufferError::Empty);
        assert_eq!(queue.pop().unwrap_err(), BufferError::Empty);
    }

    #[test]
    fn dequeue_works_at_both_ends() {
        let mut dequeue = Dequeue::with_items([2, 3]);
        dequeue.insert_first(1);
        dequeue.insert(4);

        assert_eq!(dequeue.peek(), Ok(&1));
        assert_eq!(dequeue.peek_last(), Ok(&4));
        assert_eq!(dequeue.pop_last(), Ok(4));
        assert_eq!(dequeue.pop(), Ok(1));
        assert_eq!(dequeue.size(), 2);
    }

    #[test]
    fn buffer_holds_frames() {
        let mut buffer = Buffer::new();
        buffer.insert(frame(40, "a"));
        buffer.insert_first(frame(41, "b"));
        assert_eq!(buffer.peek().unwrap().action(), 41);
    }

    #[test]
    fn transparent_buffer_matches_first_in_insertion_order() {
        let mut buffer = TransparentBuffer::new();
        buffer.insert(frame(40, "first"));
        buffer.insert(frame(41, "other"));
        buffer.insert(frame(40, "second"));

        assert!(buffer.has(40));
        assert_eq!(buffer.peek(40).unwrap().body(), "first");

        let popped = buffer.pop(40).unwrap();
        assert_eq!(popped.body(), "first");
        assert_eq!(buffer.peek(40).unwrap().body(), "second");
        assert_eq!(buffer.size(), 2);
    }

    #[test]
    fn transparent_buffer_missing_code_fails() {
        let mut buffer = TransparentBuffer::new();
        buffer.insert(frame(40, "x"));

        assert!(!buffer.has(99));
        assert_eq!(buffer.peek(99).unwrap_err(), BufferError::CodeNotFound(99));
        assert_eq!(buffer.pop(99).unwrap_err(), BufferError::CodeNotFound(99));
    }
}
