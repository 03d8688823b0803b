//! Media handling
//!
//! This module provides:
//! - JPEG frame-boundary demuxing of the encoder's continuous byte stream

pub mod demux;

pub use demux::{FrameDemuxer, SOI_MARKER};
