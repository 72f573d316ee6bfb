// frame.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Input frames
use crate::block::DisposalMethod;
use crate::error::{Error, Result};
use pix::rgb::SRgba8;
use pix::Raster;

/// Pixel layout of a frame buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 channels: red, green, blue
    Rgb,
    /// 4 channels: red, green, blue, alpha
    Rgba,
}

impl PixelFormat {
    /// Get the number of channels per pixel
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// One frame of an animation.
///
/// The pixel buffer is borrowed from the caller, flat and row-major, with
/// `width × height × channels` bytes.  Dimensions are checked when the frame
/// is created.
///
/// Delay, quality and disposal are optional; when absent, the session
/// defaults of the [AnimationWriter] apply.
///
/// [AnimationWriter]: struct.AnimationWriter.html
#[derive(Clone, Debug)]
pub struct Frame<'a> {
    /// Pixel buffer
    pixels: &'a [u8],
    /// Pixel layout
    format: PixelFormat,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Left offset on canvas
    left: u16,
    /// Top offset on canvas
    top: u16,
    /// Delay override, in centiseconds
    delay_time_cs: Option<u16>,
    /// Quality (sampling stride) override
    quality: Option<u8>,
    /// Disposal method override
    disposal_method: Option<DisposalMethod>,
    /// Transparency flag
    transparent: bool,
}

impl<'a> Frame<'a> {
    /// Create a frame from a pixel buffer.
    ///
    /// Fails with `InvalidFrame` if either dimension is zero, or the buffer
    /// length does not match.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &'a [u8],
    ) -> Result<Self> {
        let frame = Frame {
            pixels,
            format,
            width,
            height,
            left: 0,
            top: 0,
            delay_time_cs: None,
            quality: None,
            disposal_method: None,
            transparent: false,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Create a frame from an RGBA buffer
    pub fn with_rgba(
        width: u32,
        height: u32,
        pixels: &'a [u8],
    ) -> Result<Self> {
        Self::new(width, height, PixelFormat::Rgba, pixels)
    }

    /// Create a frame from an RGB buffer
    pub fn with_rgb(width: u32, height: u32, pixels: &'a [u8]) -> Result<Self> {
        Self::new(width, height, PixelFormat::Rgb, pixels)
    }

    /// Create a frame from a true color raster
    pub fn with_raster(raster: &'a Raster<SRgba8>) -> Result<Self> {
        Self::new(
            raster.width(),
            raster.height(),
            PixelFormat::Rgba,
            raster.as_u8_slice(),
        )
    }

    /// Check frame dimensions against buffer length
    pub(crate) fn validate(&self) -> Result<()> {
        let len = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.format.channels()));
        match len {
            _ if self.width == 0 || self.height == 0 => {
                Err(Error::InvalidFrame)
            }
            Some(len) if len == self.pixels.len() => Ok(()),
            _ => Err(Error::InvalidFrame),
        }
    }

    /// Set the offset of the frame on the canvas
    pub fn with_offset(mut self, left: u16, top: u16) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Set the delay time (centiseconds) for this frame only
    pub fn with_delay_time_cs(mut self, delay: u16) -> Self {
        self.delay_time_cs = Some(delay);
        self
    }

    /// Set the quantization quality for this frame only
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the disposal method
    pub fn with_disposal_method(mut self, method: DisposalMethod) -> Self {
        self.disposal_method = Some(method);
        self
    }

    /// Enable transparency: pixels below the alpha threshold are mapped to
    /// a transparent palette slot.
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Get the pixel format
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Get the width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the left offset
    pub fn left(&self) -> u16 {
        self.left
    }

    /// Get the top offset
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Get the delay time override
    pub fn delay_time_cs(&self) -> Option<u16> {
        self.delay_time_cs
    }

    /// Get the quality override
    pub fn quality(&self) -> Option<u8> {
        self.quality
    }

    /// Get the disposal method override
    pub fn disposal_method(&self) -> Option<DisposalMethod> {
        self.disposal_method
    }

    /// Check if transparency is enabled
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Get the number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get the RGB components of one pixel
    pub(crate) fn rgb(&self, i: usize) -> [u8; 3] {
        let p = i * self.format.channels();
        [self.pixels[p], self.pixels[p + 1], self.pixels[p + 2]]
    }

    /// Get the alpha component of one pixel
    pub(crate) fn alpha(&self, i: usize) -> u8 {
        match self.format {
            PixelFormat::Rgb => 0xFF,
            PixelFormat::Rgba => self.pixels[i * 4 + 3],
        }
    }
}
