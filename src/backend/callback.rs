//! One-shot completion handles for callback-style native APIs.
//!
//! Native cookie stores report many results through a completion handler
//! (`ValueCallback<Boolean>` on Android, completion blocks on WebKit). The
//! adapter creates a [`ValueCallback`] / [`Pending`] pair, hands the callback to
//! the native primitive and awaits the pending side.
use tokio::sync::oneshot;

use crate::errors::{CookieError, Result};

/// Completion handle passed to a native primitive. Consumed by the first answer.
#[derive(Debug)]
pub struct ValueCallback<T> {
    tx: oneshot::Sender<T>,
}

/// The awaiting side of a [`ValueCallback`].
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> ValueCallback<T> {
    pub fn channel() -> (ValueCallback<T>, Pending<T>) {
        let (tx, rx) = oneshot::channel();
        (ValueCallback { tx }, Pending { rx })
    }

    /// Delivers the native result. A caller that stopped waiting is ignored.
    pub fn on_receive_value(self, value: T) {
        let _ = self.tx.send(value);
    }
}

impl<T> Pending<T> {
    /// Waits for the native side to answer. Fails if the callback was dropped unanswered.
    pub async fn wait(self) -> Result<T> {
        self.rx.await.map_err(|_| CookieError::CallbackDropped)
    }
}
