//! Raw audio payload handoff for the G.711 family.

use std::any::Any;
use std::collections::VecDeque;

use shared::error::Result;

use crate::assembler::{Assembler, OrderedDelivery};
use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

/// Uncompanded-framing audio: one payload is one run of samples, so the
/// handoff is a straight ordered copy.
#[derive(Debug)]
pub struct RawAudioAssembler {
    desc: String,
    delivery: OrderedDelivery,
}

impl RawAudioAssembler {
    /// Whether this family handles the given codec descriptor name.
    pub fn supports(desc: &str) -> bool {
        desc.starts_with("PCMU/") || desc.starts_with("PCMA/")
    }

    pub fn new(desc: &str, _params: &str) -> Self {
        Self {
            desc: desc.to_string(),
            delivery: OrderedDelivery::default(),
        }
    }
}

impl Assembler for RawAudioAssembler {
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
