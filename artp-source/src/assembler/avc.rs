//! AVC (H.264) payload handoff.

use std::any::Any;
use std::collections::VecDeque;

use shared::error::Result;

use crate::assembler::{Assembler, OrderedDelivery};
use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

/// Delivers AVC payloads in decode order. NAL unit reassembly into access
/// units happens downstream in the elementary stream consumer.
#[derive(Debug, Default)]
pub struct AvcAssembler {
    delivery: OrderedDelivery,
}

impl AvcAssembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Assembler for AvcAssembler {
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
