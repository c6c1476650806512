//! The bridge worker: one task that owns all connection state.
//!
//! Host commands and SDK callbacks arrive on two unbounded channels and are
//! handled one at a time. Pending callbacks are drained before the next
//! command, so a [`Command::Settle`] acknowledges only after everything
//! submitted before it has been processed.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use wearbridge_protocol::BridgeEvent;
use wearbridge_runtime::{DeviceSdk, SdkCallback};

use crate::connection::ConnectionMachine;
use crate::directory::DeviceDirectory;
use crate::events::EventBus;
use crate::gateway::MessageGateway;

/// Text of the `info` event sent when the companion app is missing.
pub const COMPANION_APP_REQUIRED: &str = "Companion app is required.";

#[derive(Debug)]
pub(crate) enum Command {
	Connect { id: String, model: String, name: String },
	Send { payload: String },
	/// The live handles were replaced or cleared.
	HandlesReplaced,
	Settle(oneshot::Sender<()>),
	Shutdown,
}

pub(crate) struct Worker {
	sdk: Arc<dyn DeviceSdk>,
	events: Arc<EventBus<BridgeEvent>>,
	directory: Arc<DeviceDirectory>,
	machine: ConnectionMachine,
	gateway: MessageGateway,
}

impl Worker {
	pub fn new(
		sdk: Arc<dyn DeviceSdk>,
		events: Arc<EventBus<BridgeEvent>>,
		directory: Arc<DeviceDirectory>,
		app_id: &str,
	) -> Self {
		Self {
			machine: ConnectionMachine::new(sdk.clone(), events.clone(), app_id),
			gateway: MessageGateway::new(sdk.clone(), events.clone()),
			sdk,
			events,
			directory,
		}
	}

	pub async fn run(
		mut self,
		mut commands: mpsc::UnboundedReceiver<Command>,
		mut callbacks: mpsc::UnboundedReceiver<SdkCallback>,
	) {
		tracing::debug!("Bridge worker started");
		loop {
			tokio::select! {
				biased;
				Some(callback) = callbacks.recv() => self.on_callback(callback),
				command = commands.recv() => match command {
					Some(Command::Shutdown) | None => break,
					Some(command) => self.on_command(command),
				},
			}
		}

		self.sdk.unregister_all_device_events();
		self.sdk.unregister_all_app_messages();
		self.machine.reset();
		tracing::debug!("Bridge worker stopped");
	}

	fn on_command(&mut self, command: Command) {
		match command {
			Command::Connect { id, model, name } => {
				let handle = self.directory.resolve(&id);
				self.machine.connect(&id, &model, &name, handle);
			}
			Command::Send { payload } => self.gateway.send(self.machine.session(), &payload),
			Command::HandlesReplaced => {
				let directory = self.directory.clone();
				self.machine.drop_invalidated(|id| directory.resolve(id));
			}
			Command::Settle(ack) => {
				let _ = ack.send(());
			}
			Command::Shutdown => {}
		}
	}

	fn on_callback(&mut self, callback: SdkCallback) {
		match callback {
			SdkCallback::DeviceStatus { device, status } => self.machine.on_device_status(&device, &status),
			SdkCallback::Messages { app, messages } => {
				self.gateway.on_receive(self.machine.session(), &app, &messages)
			}
			SdkCallback::SendCompleted { app, outcome } => self.gateway.on_send_completed(&app, outcome),
			SdkCallback::CompanionAppMissing => {
				tracing::info!("Vendor SDK requires the companion app");
				self.events.emit(BridgeEvent::Info(COMPANION_APP_REQUIRED.to_string()));
			}
		}
	}
}
