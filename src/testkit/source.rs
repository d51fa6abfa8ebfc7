//! Scripted event source for consumer tests.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::consumer::{EventSource, StreamEvent};
use crate::error::Result;

/// Plays back a fixed sequence of events, then ends the stream.
pub struct ScriptedEventSource {
    events: VecDeque<StreamEvent>,
}

impl ScriptedEventSource {
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedEventSource {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.pop_front()
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
