// lib.rs      animgif crate.
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! An encoder for animated GIF images.
//!
//! True color frames go in; a complete GIF89a byte buffer comes out.  Each
//! frame is quantized to at most 256 colors, LZW compressed and appended to
//! the animation by an [AnimationWriter].
//!
//! ## Example
//! ```
//! use animgif::{AnimationWriter, Frame};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = AnimationWriter::new(8, 8).with_loop_count(0);
//! writer.start()?;
//! for i in 0..4u8 {
//!     let pixels = [i * 60, 128, 255 - i * 60].repeat(64);
//!     let frame = Frame::with_rgb(8, 8, &pixels)?.with_delay_time_cs(25);
//!     writer.add_frame(&frame)?;
//! }
//! let gif = writer.finish()?;
//! assert_eq!(&gif[..6], b"GIF89a");
//! # Ok(())
//! # }
//! ```
//!
//! [AnimationWriter]: struct.AnimationWriter.html
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod bits;
pub mod block;
mod encode;
mod error;
mod frame;
mod lzw;
mod palette;
mod private;
mod quant;

pub use crate::bits::BitPacker;
pub use crate::encode::{BlockEnc, FrameEnc};
pub use crate::error::{Error, Result};
pub use crate::frame::{Frame, PixelFormat};
pub use crate::lzw::{Compressor, encode as lzw_encode};
pub use crate::palette::{IndexBuffer, MAX_COLORS, Palette};
pub use crate::private::{AnimationWriter, WriterState, frame_rate_to_delay_cs};
pub use crate::quant::{QuantMethod, Quantizer};
