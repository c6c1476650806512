use wearbridge_runtime::{SdkCall, SimDevice, SimulatedSdk};

use super::*;
use crate::events::EventStream;

struct Harness {
	sdk: Arc<SimulatedSdk>,
	machine: ConnectionMachine,
	events: EventStream<BridgeEvent>,
}

fn harness() -> Harness {
	let sdk = Arc::new(SimulatedSdk::new());
	let bus = Arc::new(EventBus::new(64));
	let events = EventStream::new(bus.subscribe());
	let machine = ConnectionMachine::new(sdk.clone(), bus, "app-1");
	Harness { sdk, machine, events }
}

fn statuses(events: &mut EventStream<BridgeEvent>) -> Vec<DeviceStatusPayload> {
	events
		.drain()
		.into_iter()
		.filter_map(|event| event.as_status().cloned())
		.collect()
}

fn watch(id: &str) -> LiveHandle {
	SimDevice::new(id, "Watch1", "X").into_handle()
}

#[test]
fn missing_handle_short_circuits_before_sdk() {
	let mut h = harness();
	h.machine.connect("A", "X", "Watch1", None);

	assert!(h.sdk.calls().is_empty());
	let emitted = statuses(&mut h.events);
	assert_eq!(emitted.len(), 1);
	assert_eq!(emitted[0].name, "Watch1");
	assert_eq!(emitted[0].status, LinkStatus::Offline);
	assert_eq!(emitted[0].needs_repairing, Some(true));
	assert_eq!(emitted[0].error.as_deref(), Some("Session expired. Tap to re-pair."));
}

#[test]
fn connect_subscribes_queries_and_emits() {
	let mut h = harness();
	h.machine.connect("A", "X", "Caller name", Some(watch("A")));

	assert_eq!(
		h.sdk.calls(),
		vec![
			SdkCall::RegisterDeviceEvents { device_id: "A".into() },
			SdkCall::DeviceStatus { device_id: "A".into() },
		]
	);
	let emitted = statuses(&mut h.events);
	assert_eq!(emitted.len(), 1);
	assert_eq!(emitted[0].name, "Watch1");
	assert_eq!(emitted[0].status, LinkStatus::Online);
	assert!(h.machine.session().is_none());
	assert_eq!(h.machine.state_of("A"), Some(ConnectionState::Reachable));
}

#[test]
fn unnamed_device_uses_caller_name() {
	let mut h = harness();
	let handle = SimDevice {
		id: "A".into(),
		name: None,
		model: "X".into(),
	}
	.into_handle();

	h.machine.connect("A", "X", "Kitchen watch", Some(handle));
	assert_eq!(statuses(&mut h.events)[0].name, "Kitchen watch");
}

#[test]
fn connected_status_arms_session_once() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	let handle = watch("A");
	h.machine.connect("A", "X", "Watch1", Some(handle.clone()));

	let session = h.machine.session().unwrap();
	assert_eq!(session.device_id(), "A");
	assert_eq!(session.app_id, "app-1");

	h.machine.on_device_status(&handle, &SdkDeviceStatus::Connected);
	let registrations = h
		.sdk
		.calls()
		.into_iter()
		.filter(|c| matches!(c, SdkCall::RegisterAppMessages { .. }))
		.count();
	assert_eq!(registrations, 1);

	let emitted = statuses(&mut h.events);
	assert_eq!(emitted.len(), 2);
	assert!(emitted.iter().all(|s| s.status == LinkStatus::Connected));
}

#[test]
fn leaving_connected_tears_session_down() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	let handle = watch("A");
	h.machine.connect("A", "X", "Watch1", Some(handle.clone()));
	h.events.drain();
	h.sdk.clear_calls();

	h.machine.on_device_status(&handle, &SdkDeviceStatus::NotConnected);

	assert!(h.machine.session().is_none());
	assert_eq!(h.sdk.calls(), vec![SdkCall::UnregisterAppMessages { device_id: "A".into() }]);
	let emitted = statuses(&mut h.events);
	assert_eq!(emitted.len(), 1);
	assert_eq!(emitted[0].status, LinkStatus::Online);
	assert!(emitted[0].reason.contains("app not open"));
}

#[test]
fn invalid_device_flags_repairing() {
	let mut h = harness();
	let handle = watch("A");
	h.machine.connect("A", "X", "Watch1", Some(handle.clone()));
	h.events.drain();

	h.machine.on_device_status(&handle, &SdkDeviceStatus::InvalidDevice);
	let emitted = statuses(&mut h.events);
	assert_eq!(emitted[0].status, LinkStatus::Offline);
	assert_eq!(emitted[0].needs_repairing, Some(true));
}

#[test]
fn untracked_and_stale_callbacks_are_ignored() {
	let mut h = harness();
	h.machine.on_device_status(&watch("Z"), &SdkDeviceStatus::Connected);
	assert!(h.events.drain().is_empty());

	h.machine.connect("A", "X", "Watch1", Some(watch("A")));
	h.events.drain();

	let stale = watch("A");
	h.machine.on_device_status(&stale, &SdkDeviceStatus::Connected);
	assert!(h.events.drain().is_empty());
	assert!(h.machine.session().is_none());
}

#[test]
fn arming_another_device_replaces_session() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	h.sdk.set_status("B", SdkDeviceStatus::Connected);

	h.machine.connect("A", "X", "Watch1", Some(watch("A")));
	h.machine.connect("B", "Y", "Watch2", Some(watch("B")));

	assert_eq!(h.machine.session().unwrap().device_id(), "B");
	assert!(!h.sdk.is_app_subscribed("A"));
	assert!(h.sdk.is_app_subscribed("B"));
}

#[test]
fn other_device_leaving_keeps_session() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	let b = watch("B");

	h.machine.connect("A", "X", "Watch1", Some(watch("A")));
	h.machine.connect("B", "Y", "Watch2", Some(b.clone()));
	h.machine.on_device_status(&b, &SdkDeviceStatus::NotFound);

	assert_eq!(h.machine.session().unwrap().device_id(), "A");
}

#[test]
fn reconnect_with_new_handle_drops_old_subscription() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	let old = watch("A");
	h.machine.connect("A", "X", "Watch1", Some(old.clone()));
	h.sdk.clear_calls();

	let fresh = watch("A");
	h.machine.connect("A", "X", "Watch1", Some(fresh.clone()));

	let calls = h.sdk.calls();
	assert_eq!(calls[0], SdkCall::UnregisterAppMessages { device_id: "A".into() });
	assert_eq!(calls[1], SdkCall::UnregisterDeviceEvents { device_id: "A".into() });
	assert!(h.machine.session().unwrap().device.same_object(&fresh));

	h.events.drain();
	h.machine.on_device_status(&old, &SdkDeviceStatus::NotFound);
	assert!(h.events.drain().is_empty());
}

#[test]
fn reset_forgets_everything() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	let handle = watch("A");
	h.machine.connect("A", "X", "Watch1", Some(handle.clone()));
	h.machine.reset();

	assert!(h.machine.session().is_none());
	h.events.drain();
	h.machine.on_device_status(&handle, &SdkDeviceStatus::Connected);
	assert!(h.events.drain().is_empty());
}

#[test]
fn dropping_invalidated_handles_tears_session_down() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	let a = watch("A");
	let b = watch("B");
	h.machine.connect("A", "X", "Watch1", Some(a.clone()));
	h.machine.connect("B", "X", "Watch1", Some(b.clone()));
	h.events.drain();
	h.sdk.clear_calls();

	h.machine.drop_invalidated(|id| (id == "B").then(|| b.clone()));

	assert!(h.machine.session().is_none());
	assert_eq!(h.machine.state_of("A"), None);
	assert_eq!(h.machine.state_of("B"), Some(ConnectionState::Reachable));
	let calls = h.sdk.calls();
	assert!(calls.contains(&SdkCall::UnregisterDeviceEvents { device_id: "A".into() }));
	assert!(calls.contains(&SdkCall::UnregisterAppMessages { device_id: "A".into() }));
	assert!(!calls.iter().any(|c| c.touches_device("B")));

	let emitted = statuses(&mut h.events);
	assert_eq!(emitted.len(), 1);
	assert_eq!(emitted[0].status, LinkStatus::Offline);
	assert_eq!(emitted[0].needs_repairing, Some(true));

	// Callbacks on the dropped handle can no longer re-arm a session.
	h.machine.on_device_status(&a, &SdkDeviceStatus::Connected);
	assert!(h.machine.session().is_none());
	assert!(h.events.drain().is_empty());
}

#[test]
fn replaced_handle_asks_for_reconnect_not_repairing() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	h.machine.connect("A", "X", "Watch1", Some(watch("A")));
	h.events.drain();

	let fresh = watch("A");
	h.machine.drop_invalidated(|_| Some(fresh.clone()));

	assert!(h.machine.session().is_none());
	let emitted = statuses(&mut h.events);
	assert_eq!(emitted.len(), 1);
	assert_eq!(emitted[0].status, LinkStatus::Offline);
	assert_eq!(emitted[0].needs_repairing, Some(false));
	assert_eq!(emitted[0].reason, HANDLE_REPLACED_REASON);
}

#[test]
fn unchanged_handles_survive() {
	let mut h = harness();
	h.sdk.set_status("A", SdkDeviceStatus::Connected);
	let a = watch("A");
	h.machine.connect("A", "X", "Watch1", Some(a.clone()));
	h.events.drain();
	h.sdk.clear_calls();

	h.machine.drop_invalidated(|_| Some(a.clone()));

	assert!(h.machine.session().is_some());
	assert!(h.sdk.calls().is_empty());
	assert!(h.events.drain().is_empty());
}
