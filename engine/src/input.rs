use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Cloneable handle for feeding inputs into an [`InputQueue`], possibly from
/// another thread.
#[derive(Debug)]
pub struct InputSender<I> {
    tx: Sender<I>,
}

impl<I> Clone for InputSender<I> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<I> InputSender<I> {
    /// Returns `false` once the owning queue has been closed.
    pub fn send(&self, input: I) -> bool {
        self.tx.send(input).is_ok()
    }
}

/// FIFO of pending inputs, drained once at the start of every frame.
#[derive(Debug)]
pub struct InputQueue<I> {
    tx: Sender<I>,
    rx: Option<Receiver<I>>,
}

impl<I> Default for InputQueue<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> InputQueue<I> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx: Some(rx) }
    }

    pub fn sender(&self) -> InputSender<I> {
        InputSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, input: I) -> bool {
        self.rx.is_some() && self.tx.send(input).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }

    /// Everything queued so far, in arrival order.
    pub fn drain(&mut self) -> Vec<I> {
        let Some(rx) = self.rx.as_ref() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(input) => out.push(input),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Drop the receiving end. Pending inputs are discarded and every
    /// outstanding sender starts failing.
    pub fn close(&mut self) {
        if let Some(rx) = self.rx.take() {
            let discarded = rx.try_iter().count();
            if discarded > 0 {
                log::debug!("input queue closed with {discarded} pending inputs");
            }
        }
    }
}
