//! MPEG-2 transport stream payload handoff.

use std::any::Any;
use std::collections::VecDeque;

use shared::error::Result;

use crate::assembler::{Assembler, OrderedDelivery};
use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

/// Each payload is a burst of 188-byte TS packets; the demuxer downstream
/// owns all further framing.
#[derive(Debug, Default)]
pub struct Mpeg2TsAssembler {
    delivery: OrderedDelivery,
}

impl Mpeg2TsAssembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Assembler for Mpeg2TsAssembler {
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
