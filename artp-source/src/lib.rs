#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod assembler;
pub mod config;
pub mod event;
pub mod packet;
pub mod quality;
pub mod queue;
pub mod sequence;
pub mod source;

pub use config::{CodecDescriptor, SourceConfig};
pub use event::SourceEvent;
pub use packet::RtpPacket;
pub use source::RtpSource;
