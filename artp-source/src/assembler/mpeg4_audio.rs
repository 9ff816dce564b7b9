//! MPEG-4 audio (LATM) payload handoff.

use std::any::Any;
use std::collections::VecDeque;

use shared::error::{Error, Result};

use crate::assembler::{Assembler, OrderedDelivery, fmtp_value};
use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

/// LATM-framed MPEG-4 audio. The StreamMuxConfig either travels in band
/// (`cpresent=1`, the default) or arrives out of band through the `config`
/// parameter.
#[derive(Debug)]
pub struct Mpeg4AudioAssembler {
    cpresent: bool,
    config: Option<String>,
    delivery: OrderedDelivery,
}

impl Mpeg4AudioAssembler {
    pub fn new(params: &str) -> Self {
        let cpresent = fmtp_value(params, "cpresent") != Some("0");
        let config = fmtp_value(params, "config").map(str::to_string);
        Self {
            cpresent,
            config,
            delivery: OrderedDelivery::default(),
        }
    }
}

impl Assembler for Mpeg4AudioAssembler {
    fn init_check(&self) -> Result<()> {
        match &self.config {
            None if !self.cpresent => Err(Error::ErrInvalidFormatParameters(
                "config required when cpresent=0".to_string(),
            )),
            Some(config) if !config.chars().all(|c| c.is_ascii_hexdigit()) => Err(
                Error::ErrInvalidFormatParameters("config is not hex".to_string()),
            ),
            _ => Ok(()),
        }
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
