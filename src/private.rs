// private.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! Private module for top-level items
use crate::{
    Error, Result,
    block::{
        Application, ColorTableConfig, GlobalColorTable, Header,
        LogicalScreenDesc, Trailer,
    },
    encode::{BlockEnc, FrameEnc},
    frame::Frame,
    palette::{MAX_COLORS, Palette},
    quant::{QuantMethod, Quantizer},
};
use std::mem;

/// Default delay time (centiseconds)
const DEFAULT_DELAY_TIME_CS: u16 = 10;

/// Convert a frame rate to a delay time, in centiseconds
pub fn frame_rate_to_delay_cs(fps: u16) -> u16 {
    let fps = fps.max(1);
    ((100 + fps / 2) / fps).max(1)
}

/// Lifecycle state of an animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterState {
    /// Created, header not yet written
    NotStarted,
    /// Header written, accepting frames
    Started,
    /// Trailer written; no more calls allowed
    Finished,
}

/// Animated GIF writer
///
/// Holds one encoding session: canvas size, session defaults and the
/// output buffer.  Calls must follow the lifecycle
/// [start] → [add_frame] (any number) → [finish]; anything else fails with
/// `InvalidState`.
///
/// ## Example
/// ```
/// use animgif::{AnimationWriter, Frame};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let red = [0xFF, 0, 0, 0xFF].repeat(16);
/// let blue = [0, 0, 0xFF, 0xFF].repeat(16);
/// let mut writer = AnimationWriter::new(4, 4)
///     .with_loop_count(0)
///     .with_frame_rate(5);
/// writer.start()?;
/// writer.add_frame(&Frame::with_rgba(4, 4, &red)?)?;
/// writer.add_frame(&Frame::with_rgba(4, 4, &blue)?)?;
/// let gif = writer.finish()?;
/// assert!(gif.starts_with(b"GIF89a"));
/// assert_eq!(gif.last(), Some(&0x3B));
/// # Ok(())
/// # }
/// ```
///
/// [add_frame]: struct.AnimationWriter.html#method.add_frame
/// [finish]: struct.AnimationWriter.html#method.finish
/// [start]: struct.AnimationWriter.html#method.start
#[derive(Debug)]
pub struct AnimationWriter {
    /// Canvas width
    width: u16,
    /// Canvas height
    height: u16,
    /// Loop count (0 = forever); no looping extension if `None`
    loop_count: Option<u16>,
    /// Default delay time (centiseconds)
    delay_time_cs: u16,
    /// Quantizer settings
    quantizer: Quantizer,
    /// Global palette
    global_palette: Option<Palette>,
    /// Background color index
    background_color_idx: u8,
    /// Lifecycle state
    state: WriterState,
    /// Encoded output
    buffer: Vec<u8>,
    /// Number of frames added
    n_frames: usize,
}

impl AnimationWriter {
    /// Create a new animation writer for a canvas size
    pub fn new(width: u16, height: u16) -> Self {
        AnimationWriter {
            width,
            height,
            loop_count: None,
            delay_time_cs: DEFAULT_DELAY_TIME_CS,
            quantizer: Quantizer::default(),
            global_palette: None,
            background_color_idx: 0,
            state: WriterState::NotStarted,
            buffer: Vec::new(),
            n_frames: 0,
        }
    }

    /// Set the loop count (0 means loop forever)
    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = Some(loop_count);
        self
    }

    /// Set the quantization quality (sampling stride; 1 is best)
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.set_quality(quality);
        self
    }

    /// Set the default delay time (centiseconds)
    pub fn with_delay_time_cs(mut self, delay: u16) -> Self {
        self.set_delay_time_cs(delay);
        self
    }

    /// Set the default delay time from a frame rate
    pub fn with_frame_rate(mut self, fps: u16) -> Self {
        self.set_frame_rate(fps);
        self
    }

    /// Set the maximum number of colors per palette
    pub fn with_max_colors(mut self, max_colors: u16) -> Self {
        self.quantizer = self.quantizer.with_max_colors(max_colors);
        self
    }

    /// Set the quantization method
    pub fn with_quant_method(mut self, method: QuantMethod) -> Self {
        self.quantizer = self.quantizer.with_method(method);
        self
    }

    /// Set the alpha threshold for transparent pixels
    pub fn with_alpha_threshold(mut self, threshold: u8) -> Self {
        self.quantizer = self.quantizer.with_alpha_threshold(threshold);
        self
    }

    /// Use a global color table for all frames
    pub fn with_global_palette(mut self, palette: Palette) -> Self {
        self.global_palette = Some(palette);
        self
    }

    /// Use a global color table quantized from one frame.
    ///
    /// The current quantizer settings apply, so set quality, colors and
    /// method first.  A transparent frame also gets a transparent slot.
    ///
    /// ```
    /// use animgif::{AnimationWriter, Frame};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let first = [0x80, 0x40, 0x20].repeat(64);
    /// let frame = Frame::with_rgb(8, 8, &first)?;
    /// let mut writer = AnimationWriter::new(8, 8)
    ///     .with_quality(1)
    ///     .with_global_palette_from(&frame)?;
    /// writer.start()?;
    /// writer.add_frame(&frame)?;
    /// let gif = writer.finish()?;
    /// // global color table present
    /// assert_eq!(gif[10] & 0x80, 0x80);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_global_palette_from(mut self, frame: &Frame) -> Result<Self> {
        let transparent = frame.is_transparent();
        let mut quantizer = self.quantizer.clone();
        if transparent {
            let max_colors = quantizer.max_colors().min(MAX_COLORS as u16 - 1);
            quantizer = quantizer.with_max_colors(max_colors);
        }
        let (mut palette, _) = quantizer.quantize(frame)?;
        if transparent {
            palette = palette.with_transparent_slot()?;
        }
        debug!("global palette from frame: {} colors", palette.len());
        self.global_palette = Some(palette);
        Ok(self)
    }

    /// Set the background color index
    pub fn with_background_color_idx(mut self, idx: u8) -> Self {
        self.background_color_idx = idx;
        self
    }

    /// Change the loop count.
    ///
    /// Only allowed before `start`, since the looping extension is part of
    /// the file header.
    pub fn set_loop_count(&mut self, loop_count: Option<u16>) -> Result<()> {
        match self.state {
            WriterState::NotStarted => {
                self.loop_count = loop_count;
                Ok(())
            }
            _ => Err(Error::InvalidState),
        }
    }

    /// Change the default delay time for subsequent frames
    pub fn set_delay_time_cs(&mut self, delay: u16) {
        self.delay_time_cs = delay.max(1);
    }

    /// Change the default delay time for subsequent frames, from a frame
    /// rate
    pub fn set_frame_rate(&mut self, fps: u16) {
        self.delay_time_cs = frame_rate_to_delay_cs(fps);
    }

    /// Change the quality for subsequent frames
    pub fn set_quality(&mut self, quality: u8) {
        self.quantizer = self.quantizer.clone().with_quality(quality);
    }

    /// Get the lifecycle state
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Get the loop count
    pub fn loop_count(&self) -> Option<u16> {
        self.loop_count
    }

    /// Get the default delay time (centiseconds)
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    /// Get the quality
    pub fn quality(&self) -> u8 {
        self.quantizer.quality()
    }

    /// Get the number of frames added
    pub fn frame_count(&self) -> usize {
        self.n_frames
    }

    /// Check that the writer is in a given state
    fn check_state(&self, state: WriterState) -> Result<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(Error::InvalidState)
        }
    }

    /// Make a frame encoder with the current session defaults
    fn frame_enc(&self) -> FrameEnc<'_> {
        FrameEnc::new(self.width, self.height)
            .with_global_palette(self.global_palette.as_ref())
            .with_quantizer(self.quantizer.clone())
            .with_delay_time_cs(self.delay_time_cs)
    }

    /// Start the animation.
    ///
    /// Writes the header, logical screen descriptor, global color table (if
    /// any) and looping extension (if a loop count is set).
    pub fn start(&mut self) -> Result<()> {
        self.check_state(WriterState::NotStarted)?;
        let palette = self.global_palette.as_ref();
        let tbl = ColorTableConfig::from(palette);
        let desc = LogicalScreenDesc::default()
            .with_screen_width(self.width)
            .with_screen_height(self.height)
            .with_color_table_config(&tbl)
            .with_background_color_idx(self.background_color_idx);
        let mut enc = BlockEnc::new(Vec::with_capacity(1024));
        enc.encode(Header::default())?;
        enc.encode(desc)?;
        if let Some(palette) = palette {
            enc.encode(GlobalColorTable::with_palette(palette))?;
        }
        if let Some(loop_count) = self.loop_count {
            enc.encode(Application::with_loop_count(loop_count))?;
        }
        self.buffer = enc.into_inner();
        self.state = WriterState::Started;
        debug!(
            "start {}x{}, global table: {}, loop: {:?}",
            self.width,
            self.height,
            tbl.len(),
            self.loop_count
        );
        Ok(())
    }

    /// Add one frame.
    ///
    /// On error, nothing is appended and the writer stays started.
    pub fn add_frame(&mut self, frame: &Frame) -> Result<()> {
        self.check_state(WriterState::Started)?;
        let bytes = self.frame_enc().encode_frame(frame)?;
        self.append_frame(bytes);
        Ok(())
    }

    /// Add a batch of frames, in order.
    ///
    /// With the `parallel` feature, frames are encoded on the rayon thread
    /// pool.  If any frame fails, none of the batch is appended.
    pub fn add_frames(&mut self, frames: &[Frame]) -> Result<()> {
        self.check_state(WriterState::Started)?;
        let enc = self.frame_enc();
        let encoded = encode_frames(&enc, frames)?;
        for bytes in encoded {
            self.append_frame(bytes);
        }
        Ok(())
    }

    /// Append encoded frame bytes
    fn append_frame(&mut self, bytes: Vec<u8>) {
        self.n_frames += 1;
        debug!("frame {}: {} bytes", self.n_frames, bytes.len());
        self.buffer.extend_from_slice(&bytes);
    }

    /// Finish the animation and take the encoded bytes
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.check_state(WriterState::Started)?;
        let mut enc = BlockEnc::new(mem::take(&mut self.buffer));
        enc.encode(Trailer::default())?;
        self.state = WriterState::Finished;
        let buffer = enc.into_inner();
        debug!("finish: {} frames, {} bytes", self.n_frames, buffer.len());
        Ok(buffer)
    }
}

/// Encode frames on the thread pool
#[cfg(feature = "parallel")]
fn encode_frames(enc: &FrameEnc, frames: &[Frame]) -> Result<Vec<Vec<u8>>> {
    use rayon::prelude::*;
    frames
        .par_iter()
        .map(|frame| enc.encode_frame(frame))
        .collect()
}

/// Encode frames sequentially
#[cfg(not(feature = "parallel"))]
fn encode_frames(enc: &FrameEnc, frames: &[Frame]) -> Result<Vec<Vec<u8>>> {
    frames.iter().map(|frame| enc.encode_frame(frame)).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn frame_rate() {
        assert_eq!(frame_rate_to_delay_cs(10), 10);
        assert_eq!(frame_rate_to_delay_cs(30), 3);
        assert_eq!(frame_rate_to_delay_cs(24), 4);
        assert_eq!(frame_rate_to_delay_cs(15), 7);
        assert_eq!(frame_rate_to_delay_cs(1), 100);
        assert_eq!(frame_rate_to_delay_cs(0), 100);
        assert_eq!(frame_rate_to_delay_cs(200), 1);
    }

    #[test]
    fn header_only() {
        let mut w = AnimationWriter::new(3, 2).with_background_color_idx(1);
        w.start().unwrap();
        let gif = w.finish().unwrap();
        let mut expected = b"GIF89a".to_vec();
        expected.extend_from_slice(&[3, 0, 2, 0, 0, 1, 0, 0x3B]);
        assert_eq!(gif, expected);
    }

    #[test]
    fn header_loop() {
        let mut w = AnimationWriter::new(1, 1).with_loop_count(5);
        w.start().unwrap();
        let gif = w.finish().unwrap();
        assert_eq!(&gif[13..16], [0x21, 0xFF, 0x0B]);
        assert_eq!(&gif[16..27], b"NETSCAPE2.0");
        assert_eq!(&gif[27..32], [3, 1, 5, 0, 0]);
    }

    #[test]
    fn header_global_table() {
        let palette = Palette::with_rgb_bytes(&[1, 2, 3, 4, 5, 6, 7, 8, 9])
            .unwrap();
        let mut w = AnimationWriter::new(1, 1).with_global_palette(palette);
        w.start().unwrap();
        let gif = w.finish().unwrap();
        // global table flag, color resolution, 4 entries
        assert_eq!(gif[10], 0b1001_0001);
        assert_eq!(&gif[13..25], [1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 0, 0]);
        assert_eq!(gif.len(), 26);
    }

    #[test]
    fn global_palette_from_frame() {
        let buf = [
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 0, 0, 0, 0, 255, 255,
        ];
        let frame =
            Frame::with_rgba(2, 2, &buf).unwrap().with_transparent(true);
        let mut w = AnimationWriter::new(2, 2)
            .with_quality(1)
            .with_global_palette_from(&frame)
            .unwrap();
        w.start().unwrap();
        w.add_frame(&frame).unwrap();
        let gif = w.finish().unwrap();
        // global table: 3 colors + transparent slot
        assert_eq!(gif[10], 0b1001_0001);
        assert_eq!(
            &gif[13..25],
            [255, 0, 0, 0, 0, 255, 0, 255, 0, 0, 0, 0]
        );
        // transparent index is the slot
        assert_eq!(&gif[25..33], [0x21, 0xF9, 4, 0b0000_1001, 10, 0, 3, 0]);
        // no local table
        assert_eq!(gif[33 + 9], 0);
    }

    #[test]
    fn global_palette_from_opaque_frame() {
        let buf = [9; 12];
        let frame = Frame::with_rgb(2, 2, &buf).unwrap();
        let w = AnimationWriter::new(2, 2)
            .with_global_palette_from(&frame)
            .unwrap();
        let palette = w.global_palette.as_ref().unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.transparent_idx(), None);
        let w = AnimationWriter::new(2, 2).with_max_colors(0);
        assert!(matches!(
            w.with_global_palette_from(&frame),
            Err(Error::UnsupportedPaletteSize)
        ));
    }

    #[test]
    fn lifecycle() {
        let buf = [0; 3];
        let frame = Frame::with_rgb(1, 1, &buf).unwrap();
        let mut w = AnimationWriter::new(1, 1);
        assert_eq!(w.state(), WriterState::NotStarted);
        assert!(matches!(w.add_frame(&frame), Err(Error::InvalidState)));
        assert!(matches!(w.finish(), Err(Error::InvalidState)));
        w.start().unwrap();
        assert!(matches!(w.start(), Err(Error::InvalidState)));
        assert!(matches!(w.set_loop_count(Some(0)), Err(Error::InvalidState)));
        w.add_frame(&frame).unwrap();
        let gif = w.finish().unwrap();
        assert_eq!(w.state(), WriterState::Finished);
        assert_eq!(gif.last(), Some(&0x3B));
        assert!(matches!(w.finish(), Err(Error::InvalidState)));
        assert!(matches!(w.add_frame(&frame), Err(Error::InvalidState)));
        assert!(matches!(w.start(), Err(Error::InvalidState)));
        assert_eq!(w.frame_count(), 1);
    }

    #[test]
    fn failed_frame_appends_nothing() {
        let buf = [0; 12];
        let mut w = AnimationWriter::new(1, 1);
        w.start().unwrap();
        let frame = Frame::with_rgb(2, 2, &buf).unwrap();
        assert!(matches!(w.add_frame(&frame), Err(Error::DimensionMismatch)));
        assert_eq!(w.frame_count(), 0);
        let gif = w.finish().unwrap();
        assert_eq!(gif.len(), 6 + 7 + 1);
    }

    #[test]
    fn session_defaults() {
        let mut w = AnimationWriter::new(1, 1)
            .with_frame_rate(20)
            .with_quality(0);
        assert_eq!(w.delay_time_cs(), 5);
        assert_eq!(w.quality(), 1);
        w.set_delay_time_cs(0);
        assert_eq!(w.delay_time_cs(), 1);
        w.set_loop_count(Some(3)).unwrap();
        assert_eq!(w.loop_count(), Some(3));
        w.set_quality(20);
        assert_eq!(w.quality(), 20);
    }

    #[test]
    fn delay_changes_mid_session() {
        let buf = [0; 3];
        let frame = Frame::with_rgb(1, 1, &buf).unwrap();
        let mut w = AnimationWriter::new(1, 1).with_delay_time_cs(7);
        w.start().unwrap();
        w.add_frame(&frame).unwrap();
        w.set_frame_rate(50);
        w.add_frame(&frame).unwrap();
        w.add_frame(&frame.clone().with_delay_time_cs(300)).unwrap();
        let gif = w.finish().unwrap();
        let delays: Vec<u16> = gif
            .windows(3)
            .enumerate()
            .filter(|(_, b)| *b == [0x21, 0xF9, 4])
            .map(|(i, _)| u16::from_le_bytes([gif[i + 4], gif[i + 5]]))
            .collect();
        assert_eq!(delays, [7, 2, 300]);
    }

    #[test]
    fn batch_order() {
        let bufs: Vec<Vec<u8>> =
            (0..6u8).map(|i| vec![i * 40, 0, 255 - i * 40]).collect();
        let frames: Vec<Frame> = bufs
            .iter()
            .map(|b| Frame::with_rgb(1, 1, b).unwrap())
            .collect();
        let mut one = AnimationWriter::new(1, 1);
        one.start().unwrap();
        for frame in &frames {
            one.add_frame(frame).unwrap();
        }
        let mut batch = AnimationWriter::new(1, 1);
        batch.start().unwrap();
        batch.add_frames(&frames).unwrap();
        assert_eq!(batch.frame_count(), 6);
        assert_eq!(one.finish().unwrap(), batch.finish().unwrap());
    }

    #[test]
    fn batch_failure() {
        let good = [0; 3];
        let bad = [0; 12];
        let frames = [
            Frame::with_rgb(1, 1, &good).unwrap(),
            Frame::with_rgb(2, 2, &bad).unwrap(),
        ];
        let mut w = AnimationWriter::new(1, 1);
        w.start().unwrap();
        assert!(matches!(w.add_frames(&frames), Err(Error::DimensionMismatch)));
        assert_eq!(w.frame_count(), 0);
    }
}
