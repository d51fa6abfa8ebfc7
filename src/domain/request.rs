//! Deploy requests handed from the triggers to the deployer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::AppId;
use super::spec::AppSpec;

/// Which trigger produced a deploy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerReason {
    /// A new spec arrived on the event stream or the manual endpoint.
    Event,
    /// The periodic re-sync re-asserting the last applied spec.
    ScheduledResync,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerReason::Event => write!(f, "event"),
            TriggerReason::ScheduledResync => write!(f, "scheduled-resync"),
        }
    }
}

/// One unit of work for the deployer.
///
/// Created by a trigger, consumed exactly once, then discarded - deploy
/// history is never persisted.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub spec: AppSpec,
    pub trigger: TriggerReason,
    pub enqueued_at: DateTime<Utc>,
}

impl DeployRequest {
    /// Create a request stamped with the current time.
    pub fn new(spec: AppSpec, trigger: TriggerReason) -> Self {
        Self {
            spec,
            trigger,
            enqueued_at: Utc::now(),
        }
    }

    /// Identity of the application the request targets.
    #[must_use]
    pub fn app_id(&self) -> AppId {
        self.spec.app_id()
    }
}
