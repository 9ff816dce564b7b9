//! MPEG-4 elementary stream payload handoff, also covering the generic
//! RTP payload alias used for out-of-band configured audio.

use std::any::Any;
use std::collections::VecDeque;

use shared::error::{Error, Result};

use crate::assembler::{Assembler, OrderedDelivery, fmtp_value};
use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

#[derive(Debug)]
pub struct Mpeg4ElementaryAssembler {
    /// True for the `mpeg4-generic` alias, which requires an explicit mode.
    is_generic: bool,
    mode: Option<String>,
    delivery: OrderedDelivery,
}

impl Mpeg4ElementaryAssembler {
    pub fn new(name: &str, params: &str) -> Self {
        let is_generic = !name.starts_with("MP4V-ES/");
        let mode = fmtp_value(params, "mode").map(str::to_string);
        Self {
            is_generic,
            mode,
            delivery: OrderedDelivery::default(),
        }
    }

    pub fn is_generic(&self) -> bool {
        self.is_generic
    }
}

impl Assembler for Mpeg4ElementaryAssembler {
    fn init_check(&self) -> Result<()> {
        if self.is_generic && self.mode.is_none() {
            return Err(Error::ErrInvalidFormatParameters(
                "mode required for mpeg4-generic".to_string(),
            ));
        }
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
