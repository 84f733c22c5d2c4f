//! Mutations requested from inside redraw callbacks.
//!
//! Listeners never get a handle on the chart while a redraw is running.
//! Whatever they want changed goes into a [`CommandQueue`], which the chart
//! drains once the redraw that triggered them has completed.

use crate::data_types::{Marker, MarkerKey, Segment};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub enum ChartCommand {
    Append(Segment),
    Trim(DateTime<Utc>),
    AddMarker(Marker),
    RemoveMarker(MarkerKey),
    ResetZoom,
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: VecDeque<ChartCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: ChartCommand) {
        self.commands.push_back(command);
    }

    pub fn pop(&mut self) -> Option<ChartCommand> {
        self.commands.pop_front()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
