//! HEVC (H.265) payload handoff.

use std::any::Any;
use std::collections::VecDeque;

use shared::error::Result;

use crate::assembler::{Assembler, OrderedDelivery};
use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

/// Delivers HEVC payloads in decode order, same contract as the AVC
/// assembler with the H.265 NAL layout handled downstream.
#[derive(Debug, Default)]
pub struct HevcAssembler {
    delivery: OrderedDelivery,
}

impl HevcAssembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Assembler for HevcAssembler {
    fn init_check(&self) -> Result<()> {
        Ok(())
    }

    fn on_packets_received(
        &mut self,
        queue: &mut ReorderQueue,
        events: &mut VecDeque<SourceEvent>,
    ) {
        self.delivery.deliver(queue, events);
    }

    fn on_bye_received(&mut self) {
        self.delivery.reset();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
