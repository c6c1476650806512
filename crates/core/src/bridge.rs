//! The host-facing [`Bridge`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use wearbridge_protocol::{BridgeEvent, DeviceListing};
use wearbridge_runtime::{BlobStore, CallbackSink, DeviceSdk, Error, Result};

use crate::config::BridgeConfig;
use crate::directory::DeviceDirectory;
use crate::events::{DEFAULT_EVENT_CAPACITY, EventBus, EventStream, EventSubscription, EventWaiter, spawn_handler};
use crate::pairing::match_device_selection;
use crate::worker::{Command, Worker};

struct Running {
	config: BridgeConfig,
	runtime: Handle,
	directory: Arc<DeviceDirectory>,
	commands: mpsc::UnboundedSender<Command>,
	worker: JoinHandle<()>,
}

/// Event-driven bridge between a host application and a vendor wearable SDK.
///
/// Outcomes of operations are reported as [`BridgeEvent`]s. Only caller
/// misuse, such as using the bridge before [`initialize`](Self::initialize),
/// is returned synchronously.
///
/// # Example
///
/// ```ignore
/// let bridge = Bridge::new(Arc::new(adapter), Arc::new(FileBlobStore::new(path)));
/// let mut events = bridge.subscribe();
/// bridge.initialize("myapp", APP_ID)?;
///
/// for device in bridge.list_devices()? {
///     if device.needs_repairing {
///         bridge.request_pairing_ui()?;
///     }
/// }
/// ```
pub struct Bridge {
	sdk: Arc<dyn DeviceSdk>,
	storage: Arc<dyn BlobStore>,
	events: Arc<EventBus<BridgeEvent>>,
	running: Mutex<Option<Running>>,
}

impl Bridge {
	pub fn new(sdk: Arc<dyn DeviceSdk>, storage: Arc<dyn BlobStore>) -> Self {
		Self::with_event_capacity(sdk, storage, DEFAULT_EVENT_CAPACITY)
	}

	/// Creates a bridge whose event subscribers buffer up to `capacity` events.
	pub fn with_event_capacity(sdk: Arc<dyn DeviceSdk>, storage: Arc<dyn BlobStore>, capacity: usize) -> Self {
		Self {
			sdk,
			storage,
			events: Arc::new(EventBus::new(capacity)),
			running: Mutex::new(None),
		}
	}

	/// Initializes the SDK and starts the bridge worker.
	///
	/// Must be called from within a tokio runtime; the worker is spawned on
	/// it. Emits `ready: true`.
	pub fn initialize(&self, url_scheme: &str, app_id: &str) -> Result<()> {
		self.initialize_with(BridgeConfig::new(url_scheme, app_id))
	}

	/// Like [`initialize`](Self::initialize), with every setting explicit.
	///
	/// A second call while initialized is a no-op.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidConfig`] if `config` fails validation and
	/// [`Error::NoRuntime`] if called outside a tokio runtime.
	pub fn initialize_with(&self, config: BridgeConfig) -> Result<()> {
		config.validate()?;
		let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

		{
			let mut running = self.running.lock();
			if running.is_some() {
				tracing::info!("Bridge already initialized, ignoring");
				return Ok(());
			}

			let (sink, callbacks) = CallbackSink::channel();
			self.sdk.initialize(&config.url_scheme, sink);

			let directory = Arc::new(DeviceDirectory::new(self.storage.clone(), config.storage_key.clone()));
			let (commands, command_rx) = mpsc::unbounded_channel();
			let worker = Worker::new(self.sdk.clone(), self.events.clone(), directory.clone(), &config.app_id);
			let worker = runtime.spawn(worker.run(command_rx, callbacks));

			tracing::info!(url_scheme = %config.url_scheme, app_id = %config.app_id, "Bridge initialized");
			*running = Some(Running {
				config,
				runtime,
				directory,
				commands,
				worker,
			});
		}

		self.events.emit(BridgeEvent::Ready(true));
		Ok(())
	}

	pub fn is_initialized(&self) -> bool {
		self.running.lock().is_some()
	}

	/// Persisted devices, each marked `ONLINE` if it has a live handle in this
	/// session and `OFFLINE` with `needsRepairing` otherwise.
	pub fn list_devices(&self) -> Result<Vec<DeviceListing>> {
		self.directory()?.list_devices()
	}

	/// True if at least one device has a live handle in this session.
	///
	/// Returns false before initialization.
	pub fn has_live_sessions(&self) -> bool {
		self.directory().is_ok_and(|directory| directory.has_live_sessions())
	}

	/// Opens the vendor's device-selection UI after the configured delay.
	pub fn request_pairing_ui(&self) -> Result<()> {
		let (delay, runtime) = self.with_running(|running| (running.config.pairing_ui_delay(), running.runtime.clone()))?;
		let sdk = self.sdk.clone();
		runtime.spawn(async move {
			tokio::time::sleep(delay).await;
			tracing::debug!("Showing device selection");
			sdk.show_device_selection();
		});
		Ok(())
	}

	/// Handles a URL opened on the host's scheme.
	///
	/// Returns true if the URL was a device-selection response. The paired
	/// devices then replace both the persisted list and the live handles.
	pub fn handle_open_url(&self, url: &str) -> bool {
		let Ok((scheme, directory)) =
			self.with_running(|running| (running.config.url_scheme.clone(), running.directory.clone()))
		else {
			tracing::debug!(url, "Ignoring URL before initialization");
			return false;
		};

		let url = match match_device_selection(url, &scheme) {
			Ok(url) => url,
			Err(err) => {
				self.report(&err, "Ignoring URL");
				return false;
			}
		};

		let handles = self.sdk.parse_device_selection(&url);
		match directory.apply_pairing(handles) {
			Ok(_) => {
				if let Err(err) = self.submit(Command::HandlesReplaced) {
					tracing::warn!(error = %err, "Worker not notified of new handles");
				}
			}
			Err(err) => self.report(&err, "Failed to apply pairing result"),
		}
		true
	}

	/// Connects to a paired device.
	///
	/// The outcome is reported as `deviceStatusChanged` events.
	pub fn connect(&self, id: &str, model: &str, name: &str) -> Result<()> {
		self.submit(Command::Connect {
			id: id.to_string(),
			model: model.to_string(),
			name: name.to_string(),
		})
	}

	/// Sends a message to the connected device app.
	///
	/// A JSON object is sent as-is; any other text is wrapped as a `DATA`
	/// message. Failures are reported as `error` events.
	pub fn send_message(&self, payload: &str) -> Result<()> {
		self.submit(Command::Send {
			payload: payload.to_string(),
		})
	}

	/// Waits until every command and SDK callback submitted before this call
	/// has been processed.
	pub async fn settle(&self) -> Result<()> {
		let (ack, done) = oneshot::channel();
		self.submit(Command::Settle(ack))?;
		done.await.map_err(|_| Error::ChannelClosed)
	}

	/// Removes every persisted device and drops the live handles.
	///
	/// A connected device loses its messaging session.
	pub fn forget_devices(&self) -> Result<()> {
		self.directory()?.forget_all()?;
		self.submit(Command::HandlesReplaced)
	}

	/// Unregisters every SDK callback, stops the worker, and drops the live
	/// handles. Persisted devices stay. The bridge can be initialized again.
	pub async fn teardown(&self) {
		let Some(running) = self.running.lock().take() else {
			return;
		};

		if running.commands.send(Command::Shutdown).is_err() {
			self.sdk.unregister_all_device_events();
			self.sdk.unregister_all_app_messages();
		}
		if let Err(err) = running.worker.await {
			tracing::error!(error = %err, "Bridge worker failed");
		}
		running.directory.clear_sessions();
		tracing::info!("Bridge torn down");
	}

	/// Subscribes to every event emitted from now on.
	pub fn subscribe(&self) -> EventStream<BridgeEvent> {
		EventStream::new(self.events.subscribe())
	}

	/// Registers a one-shot wait for the first event matching `predicate`.
	///
	/// Register before triggering the operation, then call
	/// [`EventWaiter::wait`].
	pub fn wait_for_event<F>(&self, predicate: F, timeout: Duration) -> EventWaiter<BridgeEvent>
	where
		F: Fn(&BridgeEvent) -> bool + Send + Sync + 'static,
	{
		EventWaiter::new(self.events.register_waiter(predicate), timeout)
	}

	/// Calls `handler` for every event until the subscription is dropped.
	///
	/// Must be called from within a tokio runtime.
	pub fn on_event<F>(&self, handler: F) -> EventSubscription
	where
		F: Fn(BridgeEvent) + Send + Sync + 'static,
	{
		spawn_handler(self.events.subscribe(), handler)
	}

	/// Logs `err`, and emits it as an `error` event unless it is silent.
	fn report(&self, err: &Error, context: &str) {
		if err.is_silent() {
			tracing::debug!(error = %err, "{context}");
		} else {
			tracing::warn!(error = %err, "{context}");
			self.events.emit(BridgeEvent::Error(err.to_string()));
		}
	}

	fn with_running<T>(&self, f: impl FnOnce(&Running) -> T) -> Result<T> {
		self.running.lock().as_ref().map(f).ok_or(Error::NotInitialized)
	}

	fn directory(&self) -> Result<Arc<DeviceDirectory>> {
		self.with_running(|running| running.directory.clone())
	}

	fn submit(&self, command: Command) -> Result<()> {
		self.with_running(|running| running.commands.send(command))?
			.map_err(|_| Error::ChannelClosed)
	}
}

impl std::fmt::Debug for Bridge {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Bridge")
			.field("initialized", &self.is_initialized())
			.finish()
	}
}
