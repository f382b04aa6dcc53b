//! Shared application state for the server.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::ProjectRegistry;

/// Events broadcast to companion clients when a project changes.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectEvent {
    /// A project was registered and its workspace created.
    ProjectCreated { project: String },
    /// A fresh archive was extracted and the previous snapshot rotated out.
    SnapshotRotated { project: String },
    /// A commit was recorded.
    Committed { project: String, message: String },
    /// The project was pushed to its remote.
    Pushed { project: String },
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Registry of tracked projects
    pub registry: Arc<RwLock<ProjectRegistry>>,
    /// Channel for broadcasting project events
    pub events_tx: broadcast::Sender<ProjectEvent>,
    /// Directory holding the project workspaces
    pub workspaces_root: PathBuf,
}

impl AppState {
    /// Subscribe to project events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProjectEvent> {
        self.events_tx.subscribe()
    }

    /// Broadcast a project event. Dropped silently when nobody listens.
    pub fn broadcast(&self, event: ProjectEvent) {
        let _ = self.events_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProjectEvent::Committed {
            project: "game".to_string(),
            message: "Stage: +2 blocks".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"committed\""));
        assert!(json.contains("Stage: +2 blocks"));
    }
}
