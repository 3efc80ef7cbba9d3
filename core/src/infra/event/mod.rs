//! Event bus for decoupled communication
//!
//! Events are emitted after a transaction commits, so subscribers only ever
//! observe durable state.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
	Workspace,
	Member,
	Location,
	Box,
	QrCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
	/// A resource was created or updated
	ResourceChanged {
		workspace_id: Uuid,
		resource_type: ResourceType,
		resource_id: Uuid,
	},
	/// A resource was removed or tombstoned
	ResourceDeleted {
		workspace_id: Uuid,
		resource_type: ResourceType,
		resource_id: Uuid,
	},
	/// The workspace and everything in it is gone
	WorkspaceDeleted { workspace_id: Uuid },
}

impl Event {
	pub fn changed(workspace_id: Uuid, resource_type: ResourceType, resource_id: Uuid) -> Self {
		Event::ResourceChanged {
			workspace_id,
			resource_type,
			resource_id,
		}
	}

	pub fn deleted(workspace_id: Uuid, resource_type: ResourceType, resource_id: Uuid) -> Self {
		Event::ResourceDeleted {
			workspace_id,
			resource_type,
			resource_id,
		}
	}

	pub fn workspace_id(&self) -> Uuid {
		match self {
			Event::ResourceChanged { workspace_id, .. }
			| Event::ResourceDeleted { workspace_id, .. }
			| Event::WorkspaceDeleted { workspace_id } => *workspace_id,
		}
	}
}

/// Event bus for broadcasting events
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<Event>,
}

impl EventBus {
	/// Create a new event bus with specified capacity
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Emit an event to all subscribers
	pub fn emit(&self, event: Event) {
		// No subscribers is not an error
		if let Ok(count) = self.sender.send(event) {
			debug!("Event emitted to {} subscribers", count);
		}
	}

	/// Subscribe to all events
	pub fn subscribe(&self) -> EventSubscriber {
		EventSubscriber {
			receiver: self.sender.subscribe(),
			workspace_id: None,
		}
	}

	/// Subscribe to events of a single workspace
	pub fn subscribe_workspace(&self, workspace_id: Uuid) -> EventSubscriber {
		EventSubscriber {
			receiver: self.sender.subscribe(),
			workspace_id: Some(workspace_id),
		}
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}

/// Event subscriber for receiving events
#[derive(Debug)]
pub struct EventSubscriber {
	receiver: broadcast::Receiver<Event>,
	workspace_id: Option<Uuid>,
}

impl EventSubscriber {
	/// Receive the next matching event
	pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
		loop {
			let event = self.receiver.recv().await?;
			if self.matches(&event) {
				return Ok(event);
			}
		}
	}

	/// Try to receive a matching event without blocking
	pub fn try_recv(&mut self) -> Result<Event, broadcast::error::TryRecvError> {
		loop {
			let event = self.receiver.try_recv()?;
			if self.matches(&event) {
				return Ok(event);
			}
		}
	}

	fn matches(&self, event: &Event) -> bool {
		self.workspace_id
			.map_or(true, |workspace_id| event.workspace_id() == workspace_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn workspace_subscription_skips_other_workspaces() {
		let bus = EventBus::new(16);
		let mine = Uuid::new_v4();
		let theirs = Uuid::new_v4();
		let mut subscriber = bus.subscribe_workspace(mine);

		bus.emit(Event::WorkspaceDeleted {
			workspace_id: theirs,
		});
		bus.emit(Event::changed(mine, ResourceType::Box, Uuid::new_v4()));

		let event = subscriber.recv().await.unwrap();
		assert_eq!(event.workspace_id(), mine);
		assert!(subscriber.try_recv().is_err());
	}

	#[test]
	fn emit_without_subscribers_is_silent() {
		let bus = EventBus::default();
		bus.emit(Event::WorkspaceDeleted {
			workspace_id: Uuid::new_v4(),
		});
		assert_eq!(bus.subscriber_count(), 0);
	}
}
