/// Execution events and observers
///
/// The engine publishes status transitions and per-node outcomes to an
/// observer so a UI can follow a run. This is an in-process contract; the
/// observer decides what to do with each event.

use crate::workflow::types::RunStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Events emitted during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ExecutionEvent {
    /// Engine status changed (IDLE -> PROCESSING -> DONE | ERROR)
    StatusChanged { status: RunStatus },

    /// A node is about to run
    NodeStarted { run_id: String, node_id: String },

    /// A node's output was recorded
    NodeOutput {
        run_id: String,
        node_id: String,
        output: Value,
    },

    /// A node was pruned by a closed gate
    NodeSkipped { run_id: String, node_id: String },
}

/// Receiver of execution events
pub trait ExecutionObserver: Send + Sync {
    fn notify(&self, event: ExecutionEvent);
}

/// Observer that discards all events
#[derive(Debug, Clone, Default)]
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {
    fn notify(&self, _event: ExecutionEvent) {}
}

/// Observer that forwards events to an unbounded channel
///
/// Unbounded so a slow consumer never holds up the run; event volume is a
/// handful per node.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
        Self { sender }
    }

    /// Create an observer together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl ExecutionObserver for ChannelObserver {
    fn notify(&self, event: ExecutionEvent) {
        // Receiver may have been dropped
        let _ = self.sender.send(event);
    }
}
