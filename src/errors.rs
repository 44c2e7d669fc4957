//! Error handling.

use heapless::spsc::Queue;

/// All possible error types
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Error {
    /// A preset table was empty at startup. Fatal.
    EmptyPresetTable,
    /// Writing a status line to the USB serial port failed.
    SerialWriteFailed,
}

impl Error {
    /// Queue this error for later reporting.
    pub fn log<const N: usize>(&self, queue: &mut Queue<Self, N>) {
        match queue.enqueue(*self) {
            Ok(()) => { /* Enqueued */ }
            Err(e) => {
                // Queue full, drop the oldest value and try again
                queue.dequeue();
                queue.enqueue(e).ok();
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyPresetTable => "Config: empty preset table",
            Self::SerialWriteFailed => "Serial: writing status line failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_drain() {
        let mut queue: Queue<Error, 4> = Queue::new();
        Error::SerialWriteFailed.log(&mut queue);
        assert_eq!(queue.dequeue(), Some(Error::SerialWriteFailed));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_overflow_keeps_newest() {
        // Capacity of a heapless spsc queue is N - 1
        let mut queue: Queue<Error, 3> = Queue::new();
        Error::SerialWriteFailed.log(&mut queue);
        Error::SerialWriteFailed.log(&mut queue);
        Error::EmptyPresetTable.log(&mut queue);

        assert_eq!(queue.dequeue(), Some(Error::SerialWriteFailed));
        assert_eq!(queue.dequeue(), Some(Error::EmptyPresetTable));
        assert_eq!(queue.dequeue(), None);
    }
}
