//! Event delivery to the host.
//!
//! Every [`BridgeEvent`] the bridge produces goes through one [`EventBus`],
//! which supports three consumption patterns:
//!
//! - [`EventStream`] - subscribe and poll, with broadcast lag handled
//! - [`EventWaiter`] - one-shot capture of the first matching event
//! - [`EventSubscription`] - RAII handle for a callback-style handler
//!
//! [`BridgeEvent`]: wearbridge_protocol::BridgeEvent

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};
use wearbridge_runtime::{Error, Result};

/// Broadcast capacity used by [`Bridge::new`](crate::Bridge::new).
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// RAII handle that cancels an event callback when dropped.
///
/// Returned by [`Bridge::on_event`](crate::Bridge::on_event).
pub struct EventSubscription {
	cancel_tx: Option<oneshot::Sender<()>>,
}

impl EventSubscription {
	pub(crate) fn new(cancel_tx: oneshot::Sender<()>) -> Self {
		Self {
			cancel_tx: Some(cancel_tx),
		}
	}

	/// Explicitly cancels the subscription, equivalent to dropping it.
	pub fn unsubscribe(mut self) {
		if let Some(tx) = self.cancel_tx.take() {
			let _ = tx.send(());
		}
	}
}

impl Drop for EventSubscription {
	fn drop(&mut self) {
		if let Some(tx) = self.cancel_tx.take() {
			let _ = tx.send(());
		}
	}
}

impl std::fmt::Debug for EventSubscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventSubscription")
			.field("active", &self.cancel_tx.is_some())
			.finish()
	}
}

struct WaiterEntry<E> {
	predicate: Box<dyn Fn(&E) -> bool + Send + Sync>,
	complete_tx: oneshot::Sender<E>,
}

/// Broadcast channel combined with predicate-based waiters.
///
/// Waiters are checked first during [`emit`](Self::emit), so a waiter sees its
/// event even when broadcast receivers are lagging.
pub(crate) struct EventBus<E: Clone + Send + 'static> {
	tx: broadcast::Sender<E>,
	waiters: Mutex<Vec<WaiterEntry<E>>>,
}

impl<E: Clone + Send + 'static> EventBus<E> {
	pub fn new(capacity: usize) -> Self {
		let (tx, _) = broadcast::channel(capacity.max(1));
		Self {
			tx,
			waiters: Mutex::new(Vec::new()),
		}
	}

	/// Emits an event to matching waiters, then to all subscribers.
	pub fn emit(&self, event: E) {
		{
			let mut waiters = self.waiters.lock();
			let mut i = 0;
			while i < waiters.len() {
				if waiters[i].complete_tx.is_closed() {
					waiters.swap_remove(i);
				} else if (waiters[i].predicate)(&event) {
					let entry = waiters.swap_remove(i);
					let _ = entry.complete_tx.send(event.clone());
				} else {
					i += 1;
				}
			}
		}
		let _ = self.tx.send(event);
	}

	/// Subscribes to future events. Events emitted earlier are not received.
	pub fn subscribe(&self) -> broadcast::Receiver<E> {
		self.tx.subscribe()
	}

	/// Registers a waiter that receives the first matching event.
	pub fn register_waiter<F>(&self, predicate: F) -> oneshot::Receiver<E>
	where
		F: Fn(&E) -> bool + Send + Sync + 'static,
	{
		let (complete_tx, complete_rx) = oneshot::channel();
		self.waiters.lock().push(WaiterEntry {
			predicate: Box::new(predicate),
			complete_tx,
		});
		complete_rx
	}

	#[cfg(test)]
	pub fn waiter_count(&self) -> usize {
		self.waiters.lock().len()
	}
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
	fn default() -> Self {
		Self::new(DEFAULT_EVENT_CAPACITY)
	}
}

/// Wrapper around [`broadcast::Receiver`] that logs and skips over lag.
///
/// [`broadcast::Receiver`]: tokio::sync::broadcast::Receiver
pub struct EventStream<E: Clone + Send + 'static> {
	rx: broadcast::Receiver<E>,
}

impl<E: Clone + Send + 'static> EventStream<E> {
	pub(crate) fn new(rx: broadcast::Receiver<E>) -> Self {
		Self { rx }
	}

	/// Receives the next event.
	///
	/// Returns `None` once the bridge that owns the bus is dropped.
	pub async fn recv(&mut self) -> Option<E> {
		loop {
			match self.rx.recv().await {
				Ok(event) => return Some(event),
				Err(broadcast::error::RecvError::Lagged(n)) => {
					tracing::warn!(dropped = n, "Event stream lagged, dropped events");
				}
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}

	/// Returns an event if one is immediately available.
	pub fn try_recv(&mut self) -> Option<E> {
		loop {
			match self.rx.try_recv() {
				Ok(event) => return Some(event),
				Err(broadcast::error::TryRecvError::Lagged(n)) => {
					tracing::warn!(dropped = n, "Event stream lagged, dropped events");
				}
				Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => return None,
			}
		}
	}

	/// Drains every event that is immediately available.
	pub fn drain(&mut self) -> Vec<E> {
		std::iter::from_fn(|| self.try_recv()).collect()
	}
}

/// One-shot event waiter.
///
/// Call [`wait()`](Self::wait) to apply the configured timeout, or `.await`
/// the waiter directly to wait without one.
pub struct EventWaiter<E> {
	rx: oneshot::Receiver<E>,
	timeout: Duration,
}

impl<E: Send + 'static> EventWaiter<E> {
	pub(crate) fn new(rx: oneshot::Receiver<E>, timeout: Duration) -> Self {
		Self { rx, timeout }
	}

	/// Waits for the event with the configured timeout.
	///
	/// # Errors
	///
	/// - [`Error::Timeout`] if no matching event arrives in time
	/// - [`Error::ChannelClosed`] if the bridge is dropped first
	pub async fn wait(self) -> Result<E> {
		tokio::time::timeout(self.timeout, self.rx)
			.await
			.map_err(|_| Error::Timeout("Timeout waiting for event".to_string()))?
			.map_err(|_| Error::ChannelClosed)
	}
}

impl<E: Send + 'static> Future for EventWaiter<E> {
	type Output = Result<E>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match Pin::new(&mut self.rx).poll(cx) {
			Poll::Ready(Ok(event)) => Poll::Ready(Ok(event)),
			Poll::Ready(Err(_)) => Poll::Ready(Err(Error::ChannelClosed)),
			Poll::Pending => Poll::Pending,
		}
	}
}

/// Runs `handler` for every event on `rx` until the returned subscription is dropped.
pub(crate) fn spawn_handler<E, F>(mut rx: broadcast::Receiver<E>, handler: F) -> EventSubscription
where
	E: Clone + Send + 'static,
	F: Fn(E) + Send + Sync + 'static,
{
	let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

	tokio::spawn(async move {
		loop {
			tokio::select! {
				result = rx.recv() => {
					match result {
						Ok(event) => handler(event),
						Err(broadcast::error::RecvError::Lagged(n)) => {
							tracing::warn!(dropped = n, "Event callback lagged");
						}
						Err(broadcast::error::RecvError::Closed) => break,
					}
				}
				_ = &mut cancel_rx => break,
			}
		}
	});

	EventSubscription::new(cancel_tx)
}
