//! Per-SSRC receiver state machine.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use log::{info, trace, warn};

use rtcp::{FullIntraRequest, ReceiverReport, TemporaryMaxMediaBitrate};
use shared::error::Result;
use shared::time::{compressed_ntp, delay_q16};

use crate::assembler::{Assembler, make_assembler};
use crate::config::{CodecDescriptor, SourceConfig};
use crate::event::SourceEvent;
use crate::packet::RtpPacket;
use crate::quality::QualityManager;
use crate::queue::ReorderQueue;
use crate::sequence::extend_sequence_number;

/// Minimum spacing between consecutive full intra requests.
const FIR_INTERVAL: Duration = Duration::from_secs(5);

/// Receiver-side state for one remote synchronization source: sequence
/// number reconstruction, ordered reassembly, interval loss statistics, and
/// the RTCP feedback derived from them.
///
/// One instance is driven by one session thread; nothing here blocks or
/// synchronizes internally.
pub struct RtpSource {
    id: u32,
    self_id: u32,
    clock_rate: u32,

    first_seq_number: u16,
    first_rtp_time: u32,
    first_sys_time: Option<Instant>,

    highest_seq_number: u32,
    base_seq_number: u32,
    prev_expected: u32,
    num_buffers_received: i64,
    prev_num_buffers_received: i64,

    last_ntp_time: u64,
    last_ntp_time_update: Option<Instant>,

    issue_fir_requests: bool,
    last_fir_request: Option<Instant>,
    next_fir_sequence_number: u8,

    assembler: Option<Box<dyn Assembler>>,
    quality: QualityManager,
    queue: ReorderQueue,
    events: VecDeque<SourceEvent>,
}

impl RtpSource {
    /// Builds the source for one remote SSRC. A codec descriptor naming no
    /// supported assembler is a configuration error and fails construction;
    /// an assembler failing its own init check leaves the source in
    /// degraded mode, silently dropping every packet.
    pub fn new(id: u32, codec: &CodecDescriptor, config: SourceConfig) -> Result<Self> {
        let (assembler, issue_fir_requests) =
            make_assembler(&codec.name, &codec.format_parameters)?;

        let assembler = match assembler.init_check() {
            Ok(()) => Some(assembler),
            Err(err) => {
                warn!("assembler init check failed for {}: {}", codec.name, err);
                None
            }
        };

        Ok(Self {
            id,
            self_id: config.self_id,
            clock_rate: 0,

            first_seq_number: 0,
            first_rtp_time: 0,
            first_sys_time: None,

            highest_seq_number: 0,
            base_seq_number: 0,
            prev_expected: 0,
            num_buffers_received: 0,
            prev_num_buffers_received: 0,

            last_ntp_time: 0,
            last_ntp_time_update: None,

            issue_fir_requests,
            last_fir_request: None,
            next_fir_sequence_number: config.fir_sequence_seed.unwrap_or_else(rand::random),

            assembler,
            quality: QualityManager::new(),
            queue: ReorderQueue::new(),
            events: VecDeque::new(),
        })
    }

    /// Ingests one RTP packet, then hands the queue to the assembler.
    pub fn process_rtp_packet(&mut self, now: Instant, packet: RtpPacket) {
        if self.assembler.is_none() || !self.queue_packet(now, packet) {
            return;
        }
        if let Some(assembler) = self.assembler.as_mut() {
            assembler.on_packets_received(&mut self.queue, &mut self.events);
        }
    }

    fn queue_packet(&mut self, now: Instant, packet: RtpPacket) -> bool {
        let mut seq = u32::from(packet.sequence_number);

        let first = self.num_buffers_received == 0 && self.first_sys_time.is_none();
        self.num_buffers_received += 1;

        if first {
            self.first_seq_number = packet.sequence_number;
            self.first_rtp_time = packet.timestamp;
            self.first_sys_time = Some(now);
            self.highest_seq_number = seq;
            self.base_seq_number = seq;
            self.clock_rate = 90000;
            trace!(
                "first packet arrived: rtp-time={}, seq-num={}",
                self.first_rtp_time, self.highest_seq_number
            );
            return self.queue.insert(seq, packet);
        }

        seq = extend_sequence_number(seq, self.highest_seq_number);
        if seq > self.highest_seq_number {
            self.highest_seq_number = seq;
        }

        self.queue.insert(seq, packet)
    }

    /// Records a sender-clock synchronization point and notifies the
    /// session layer.
    pub fn time_update(&mut self, now: Instant, rtp_time: u32, ntp_time: u64) {
        self.last_ntp_time = ntp_time;
        self.last_ntp_time_update = Some(now);

        self.events
            .push_back(SourceEvent::TimeUpdate { rtp_time, ntp_time });
    }

    /// The sender left the session.
    pub fn bye_received(&mut self) {
        if let Some(assembler) = self.assembler.as_mut() {
            assembler.on_bye_received();
        }
    }

    /// Computes the interval loss statistics and appends a receiver report
    /// to `buf`. The report snapshots and the bitrate target only advance
    /// when the report fits.
    pub fn append_receiver_report(&mut self, now: Instant, buf: &mut BytesMut) {
        // According to appendix A.3 in RFC 3550
        let expected = self.highest_seq_number - self.base_seq_number + 1;
        let interval_expected = i64::from(expected) - i64::from(self.prev_expected);
        let interval_received = self.num_buffers_received - self.prev_num_buffers_received;
        let interval_lost = interval_expected - interval_received;

        let fraction = if interval_expected > 0 && interval_lost > 0 {
            ((interval_lost << 8) / interval_expected) as u8
        } else {
            0
        };

        let total_lost = (i64::from(expected) - self.num_buffers_received) as i32;

        let (last_sender_report, delay) = if self.last_ntp_time != 0 {
            (
                compressed_ntp(self.last_ntp_time),
                self.last_ntp_time_update
                    .map(|at| delay_q16(now.duration_since(at)))
                    .unwrap_or(0),
            )
        } else {
            (0, 0)
        };

        let rr = ReceiverReport {
            sender_ssrc: self.self_id,
            ssrc: self.id,
            fraction_lost: fraction,
            total_lost,
            last_sequence_number: self.highest_seq_number,
            last_sender_report,
            delay,
        };
        if !rr.marshal_to(buf) {
            return;
        }

        info!(
            "ssrc {:08x}: interval expected {} lost {}",
            self.id, interval_expected, interval_lost
        );

        self.quality.update_target_bitrate(fraction);
        self.prev_expected = expected;
        self.prev_num_buffers_received = self.num_buffers_received;
    }

    /// Appends a full intra request when the codec supports one, rate
    /// limited to one per five seconds of transmit time.
    pub fn append_fir(&mut self, now: Instant, buf: &mut BytesMut) {
        if !self.issue_fir_requests {
            return;
        }

        if let Some(last) = self.last_fir_request {
            if now.duration_since(last) < FIR_INTERVAL {
                return;
            }
        }
        self.last_fir_request = Some(now);

        let fir = FullIntraRequest {
            sender_ssrc: self.self_id,
            media_ssrc: self.id,
            sequence_number: self.next_fir_sequence_number,
        };
        if !fir.marshal_to(buf) {
            return;
        }

        self.next_fir_sequence_number = self.next_fir_sequence_number.wrapping_add(1);
        trace!("appended fir request");
    }

    /// Appends a temporary max media bitrate request when a positive
    /// target bitrate is available.
    pub fn append_tmmbr(&mut self, buf: &mut BytesMut) {
        let bitrate = self.quality.target_bitrate();
        if bitrate <= 0 {
            return;
        }

        let tmmbr = TemporaryMaxMediaBitrate {
            sender_ssrc: self.self_id,
            media_ssrc: self.id,
            bitrate,
        };
        tmmbr.marshal_to(buf);
    }

    /// True when at least one new buffer arrived since the last report
    /// snapshot.
    pub fn needs_report(&self) -> bool {
        self.num_buffers_received - self.prev_num_buffers_received > 0
    }

    /// The transport discarded `count` buffers it had already counted
    /// towards this source.
    pub fn abandon_buffers(&mut self, count: i64) {
        self.num_buffers_received -= count;
    }

    /// Overrides the reporter SSRC used in feedback from this source.
    pub fn set_self_id(&mut self, self_id: u32) {
        self.self_id = self_id;
    }

    pub fn set_min_max_bitrate(&mut self, min: i32, max: i32) {
        self.quality.set_min_max_bitrate(min, max);
    }

    /// Drains the outbound notification queue.
    pub fn poll_event(&mut self) -> Option<SourceEvent> {
        self.events.pop_front()
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    pub fn first_sequence_number(&self) -> u16 {
        self.first_seq_number
    }

    pub fn first_rtp_time(&self) -> u32 {
        self.first_rtp_time
    }

    pub fn base_sequence_number(&self) -> u32 {
        self.base_seq_number
    }

    pub fn highest_sequence_number(&self) -> u32 {
        self.highest_seq_number
    }

    pub fn num_buffers_received(&self) -> i64 {
        self.num_buffers_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn video_source() -> RtpSource {
        RtpSource::new(
            0x11223344,
            &CodecDescriptor::new("H264/90000", ""),
            SourceConfig {
                self_id: 0xdeadbeef,
                fir_sequence_seed: Some(7),
            },
        )
        .unwrap()
    }

    fn packet(seq: u16, timestamp: u32) -> RtpPacket {
        RtpPacket {
            sequence_number: seq,
            timestamp,
            payload: Bytes::from_static(&[0xab]),
        }
    }

    #[test]
    fn test_first_packet_seeds_baselines() {
        let mut source = video_source();
        let now = Instant::now();

        source.process_rtp_packet(now, packet(100, 9000));

        assert_eq!(source.first_sequence_number(), 100);
        assert_eq!(source.first_rtp_time(), 9000);
        assert_eq!(source.base_sequence_number(), 100);
        assert_eq!(source.highest_sequence_number(), 100);
        assert_eq!(source.clock_rate(), 90000);
        assert_eq!(source.num_buffers_received(), 1);
    }

    #[test]
    fn test_highest_never_decreases() {
        let mut source = video_source();
        let now = Instant::now();

        let mut prev = 0;
        for seq in [100u16, 105, 103, 101, 104, 102] {
            source.process_rtp_packet(now, packet(seq, u32::from(seq) * 90));
            assert!(source.highest_sequence_number() >= prev);
            prev = source.highest_sequence_number();
        }
        assert_eq!(source.highest_sequence_number(), 105);
    }

    #[test]
    fn test_wraparound_extends_highest() {
        let mut source = video_source();
        let now = Instant::now();

        for seq in [65534u16, 65535, 0, 1] {
            source.process_rtp_packet(now, packet(seq, 0));
        }
        assert_eq!(source.highest_sequence_number(), 0x1_0001);
        assert_eq!(source.base_sequence_number(), 65534);
    }

    #[test]
    fn test_duplicate_counted_but_dropped() {
        let mut source = video_source();
        let now = Instant::now();

        source.process_rtp_packet(now, packet(100, 0));
        source.process_rtp_packet(now, packet(100, 0));

        // the arrival counter reflects the attempted delivery
        assert_eq!(source.num_buffers_received(), 2);

        // but only one access unit came out
        let mut units = 0;
        while let Some(event) = source.poll_event() {
            assert!(matches!(event, SourceEvent::AccessUnit { .. }));
            units += 1;
        }
        assert_eq!(units, 1);
    }

    #[test]
    fn test_duplicate_of_queued_packet_rejected() {
        let mut source = video_source();
        let now = Instant::now();

        source.process_rtp_packet(now, packet(100, 0));
        // 101 missing, so 102 parks in the queue
        source.process_rtp_packet(now, packet(102, 180));
        source.process_rtp_packet(now, packet(102, 180));
        assert_eq!(source.num_buffers_received(), 3);

        source.process_rtp_packet(now, packet(101, 90));

        let mut seen = Vec::new();
        while let Some(SourceEvent::AccessUnit { rtp_time, .. }) = source.poll_event() {
            seen.push(rtp_time);
        }
        assert_eq!(seen, vec![0, 90, 180]);
    }

    #[test]
    fn test_degraded_mode_drops_everything() {
        // AMR without octet-align fails its init check
        let mut source = RtpSource::new(
            1,
            &CodecDescriptor::new("AMR/8000", ""),
            SourceConfig::default(),
        )
        .unwrap();
        let now = Instant::now();

        source.process_rtp_packet(now, packet(1, 0));
        source.process_rtp_packet(now, packet(2, 0));

        assert_eq!(source.num_buffers_received(), 0);
        assert!(source.poll_event().is_none());
        assert!(!source.needs_report());
    }

    #[test]
    fn test_unsupported_codec_fails_construction() {
        let result = RtpSource::new(
            1,
            &CodecDescriptor::new("OPUS/48000", ""),
            SourceConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_needs_report_tracks_snapshot() {
        let mut source = video_source();
        let now = Instant::now();

        assert!(!source.needs_report());
        source.process_rtp_packet(now, packet(100, 0));
        assert!(source.needs_report());

        let mut buf = BytesMut::with_capacity(64);
        source.append_receiver_report(now, &mut buf);
        assert!(!source.needs_report());

        source.process_rtp_packet(now, packet(101, 90));
        assert!(source.needs_report());
    }

    #[test]
    fn test_report_skipped_on_full_buffer_keeps_snapshot() {
        let mut source = video_source();
        let now = Instant::now();

        source.process_rtp_packet(now, packet(100, 0));

        let mut tiny = BytesMut::with_capacity(8);
        source.append_receiver_report(now, &mut tiny);
        assert!(tiny.is_empty());
        // the interval snapshot did not advance
        assert!(source.needs_report());
    }

    #[test]
    fn test_abandoned_buffers_raise_cumulative_lost() {
        let mut source = video_source();
        let now = Instant::now();

        source.process_rtp_packet(now, packet(100, 0));
        source.abandon_buffers(3);
        assert_eq!(source.num_buffers_received(), -2);

        let mut buf = BytesMut::with_capacity(64);
        source.append_receiver_report(now, &mut buf);

        // expected 1, received -2: cumulative lost is 3
        assert_eq!(&buf[13..16], &[0, 0, 3]);
    }

    #[test]
    fn test_duplicates_can_push_cumulative_lost_negative() {
        let mut source = video_source();
        let now = Instant::now();

        // duplicates count as arrivals even though they are dropped, so the
        // received count overtakes the expected count
        source.process_rtp_packet(now, packet(100, 0));
        source.process_rtp_packet(now, packet(100, 0));
        source.process_rtp_packet(now, packet(100, 0));
        assert_eq!(source.num_buffers_received(), 3);

        let mut buf = BytesMut::with_capacity(64);
        source.append_receiver_report(now, &mut buf);

        // expected 1, received 3: cumulative lost is -2, carried signed
        assert_eq!(&buf[13..16], &[0xff, 0xff, 0xfe]);
    }

    #[test]
    fn test_time_update_posts_notification() {
        let mut source = video_source();
        let now = Instant::now();

        source.time_update(now, 1234, 0x1111_2222_3333_4444);

        assert_eq!(
            source.poll_event(),
            Some(SourceEvent::TimeUpdate {
                rtp_time: 1234,
                ntp_time: 0x1111_2222_3333_4444,
            })
        );
        assert!(source.poll_event().is_none());
    }
}
