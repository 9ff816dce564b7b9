//! Payload assemblers and the codec dispatch that selects one.
//!
//! An assembler turns the ordered reorder queue into elementary-stream
//! access units for its codec family. Selection happens once, from the
//! session descriptor, against a closed set of implementations.

pub mod amr;
pub mod avc;
pub mod h263;
pub mod hevc;
pub mod mpeg2_ts;
pub mod mpeg4_audio;
pub mod mpeg4_elementary;
pub mod raw_audio;

use std::any::Any;
use std::collections::VecDeque;

use log::debug;

use shared::error::{Error, Result};

use crate::event::SourceEvent;
use crate::queue::ReorderQueue;

/// Codec-specific depacketizer boundary. Implementations consume the
/// reorder queue in extended-sequence order and emit access-unit events.
pub trait Assembler {
    /// Validates the format parameters the session descriptor promised.
    fn init_check(&self) -> Result<()>;

    /// Consumes newly queued packets; called after every accepted insertion.
    fn on_packets_received(
        &mut self,
        queue: &mut ReorderQueue,
        events: &mut VecDeque<SourceEvent>,
    );

    /// The sender said goodbye; drop any in-progress delivery state.
    fn on_bye_received(&mut self);

    fn as_any(&self) -> &dyn Any;
}

/// Selects the assembler for a codec descriptor. Returns the assembler and
/// whether the codec benefits from full-intra-request feedback.
///
/// Matching is by case-sensitive prefix except for the `mpeg4-generic` and
/// `MP2T` aliases, which session descriptors spell inconsistently.
pub(crate) fn make_assembler(name: &str, params: &str) -> Result<(Box<dyn Assembler>, bool)> {
    if name.starts_with("H264/") {
        Ok((Box::new(avc::AvcAssembler::new()), true))
    } else if name.starts_with("H265/") {
        Ok((Box::new(hevc::HevcAssembler::new()), true))
    } else if name.starts_with("MP4A-LATM/") {
        Ok((Box::new(mpeg4_audio::Mpeg4AudioAssembler::new(params)), false))
    } else if name.starts_with("H263-1998/") || name.starts_with("H263-2000/") {
        Ok((Box::new(h263::H263Assembler::new()), true))
    } else if name.starts_with("AMR/") {
        Ok((Box::new(amr::AmrAssembler::new(false, params)), false))
    } else if name.starts_with("AMR-WB/") {
        Ok((Box::new(amr::AmrAssembler::new(true, params)), false))
    } else if name.starts_with("MP4V-ES/") || starts_with_ignore_case(name, "mpeg4-generic/") {
        Ok((
            Box::new(mpeg4_elementary::Mpeg4ElementaryAssembler::new(name, params)),
            true,
        ))
    } else if raw_audio::RawAudioAssembler::supports(name) {
        Ok((Box::new(raw_audio::RawAudioAssembler::new(name, params)), false))
    } else if starts_with_ignore_case(name, "MP2T/") {
        Ok((Box::new(mpeg2_ts::Mpeg2TsAssembler::new()), false))
    } else {
        Err(Error::ErrUnsupportedCodec(name.to_string()))
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Looks up one key in a `key=value;key=value` format-parameter string.
pub(crate) fn fmtp_value<'a>(params: &'a str, key: &str) -> Option<&'a str> {
    params
        .split(';')
        .filter_map(|p| p.split_once('='))
        .find_map(|(k, v)| k.trim().eq_ignore_ascii_case(key).then(|| v.trim()))
}

/// Arrivals to wait on a sequence gap before treating it as loss.
const MAX_STALLED_ARRIVALS: u32 = 16;

/// Ordered delivery cursor shared by the assemblers: hands out consecutive
/// payloads, rides out a reordering gap for a bounded number of arrivals,
/// then declares the gap lost and resumes at the queue front. Entries below
/// the cursor arrived too late and are dropped.
#[derive(Debug, Default)]
pub(crate) struct OrderedDelivery {
    next_expected: Option<u32>,
    stalled_arrivals: u32,
}

impl OrderedDelivery {
    pub(crate) fn deliver(&mut self, queue: &mut ReorderQueue, events: &mut VecDeque<SourceEvent>) {
        while let Some(front) = queue.front() {
            let seq = front.extended_sequence_number;

            if let Some(expected) = self.next_expected {
                if seq < expected {
                    debug!("dropping superseded packet, seq {}", seq);
                    queue.pop_front();
                    continue;
                }
                if seq > expected {
                    self.stalled_arrivals += 1;
                    if self.stalled_arrivals <= MAX_STALLED_ARRIVALS {
                        return;
                    }
                    debug!("missing seq {}, resuming at {}", expected, seq);
                }
            }

            if let Some(entry) = queue.pop_front() {
                self.stalled_arrivals = 0;
                self.next_expected = Some(seq.wrapping_add(1));
                events.push_back(SourceEvent::AccessUnit {
                    rtp_time: entry.packet.timestamp,
                    payload: entry.packet.payload,
                });
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.next_expected = None;
        self.stalled_arrivals = 0;
    }
}
