//! H.263 payload handoff, covering the 1998 and 2000 profiles.

use std::any::Any;
use std::collections::VecDeque;

use shared::error::Result;

use crate::assembler::{Assembler, OrderedDelivery};
use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

#[derive(Debug, Default)]
pub struct H263Assembler {
    delivery: OrderedDelivery,
}

impl H263Assembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Assembler for H263Assembler {
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
