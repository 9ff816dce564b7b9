//! AMR narrowband and wideband payload handoff.

use std::any::Any;
use std::collections::VecDeque;

use shared::error::{Error, Result};

use crate::assembler::{Assembler, OrderedDelivery, fmtp_value};
use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

/// One assembler for both AMR flavors; the wideband variant only changes
/// the frame geometry downstream.
#[derive(Debug)]
pub struct AmrAssembler {
    is_wide: bool,
    octet_aligned: bool,
    delivery: OrderedDelivery,
}

impl AmrAssembler {
    pub fn new(is_wide: bool, params: &str) -> Self {
        let octet_aligned = fmtp_value(params, "octet-align") == Some("1");
        Self {
            is_wide,
            octet_aligned,
            delivery: OrderedDelivery::default(),
        }
    }

    pub fn is_wide(&self) -> bool {
        self.is_wide
    }
}

impl Assembler for AmrAssembler {
    fn init_check(&self) -> Result<()> {
        // bandwidth-efficient packing is not supported
        if self.octet_aligned {
            Ok(())
        } else {
            Err(Error::ErrInvalidFormatParameters(
                "octet-align=1 required".to_string(),
            ))
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
