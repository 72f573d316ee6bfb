// encode.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! Block and frame encoders
use crate::block::*;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::lzw;
use crate::palette::Palette;
use crate::quant::Quantizer;
use std::borrow::Cow;
use std::io::{self, Write};

/// Block encoder
///
/// Writes low-level [Block]s.  No check is made that blocks are written in
/// a valid order.
///
/// [Block]: block/enum.Block.html
pub struct BlockEnc<W: Write> {
    /// Writer for blocks
    writer: W,
}

impl<W: Write> BlockEnc<W> {
    /// Create a new block encoder
    pub fn new(writer: W) -> Self {
        BlockEnc { writer }
    }

    /// Encode one block
    pub fn encode<B: Into<Block>>(&mut self, block: B) -> Result<()> {
        use crate::block::Block::*;
        let w = &mut self.writer;
        match block.into() {
            Header(b) => b.format(w)?,
            LogicalScreenDesc(b) => b.format(w)?,
            GlobalColorTable(b) => b.format(w)?,
            GraphicControl(b) => b.format(w)?,
            Application(b) => b.format(w)?,
            ImageDesc(b) => b.format(w)?,
            LocalColorTable(b) => b.format(w)?,
            ImageData(b) => b.format(w)?,
            Trailer(b) => b.format(w)?,
        }
        Ok(())
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl Header {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"GIF")?;
        w.write_all(&self.version())
    }
}

impl LogicalScreenDesc {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut buf = Vec::with_capacity(7);
        buf.extend_from_slice(&self.screen_width().to_le_bytes());
        buf.extend_from_slice(&self.screen_height().to_le_bytes());
        buf.push(self.flags());
        buf.push(self.background_color_idx());
        buf.push(self.pixel_aspect_ratio());
        w.write_all(&buf)
    }
}

impl GlobalColorTable {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.colors())
    }
}

impl GraphicControl {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        let mut buf = Vec::with_capacity(7);
        buf.push(ExtensionCode::GraphicControl_.into());
        buf.push(4); // block size
        buf.push(self.flags());
        buf.extend_from_slice(&self.delay_time_cs().to_le_bytes());
        buf.push(self.transparent_color_idx());
        buf.push(0); // block size
        w.write_all(&buf)
    }
}

impl Application {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[ExtensionCode::Application_.into()])?;
        for c in self.app_data() {
            assert!(c.len() < 256);
            let len = c.len() as u8;
            w.write_all(&[len])?; // block size
            w.write_all(c)?;
        }
        w.write_all(&[0]) // block size
    }
}

impl ImageDesc {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::ImageDesc_.signature())?;
        let mut buf = Vec::with_capacity(9);
        buf.extend_from_slice(&self.left().to_le_bytes());
        buf.extend_from_slice(&self.top().to_le_bytes());
        buf.extend_from_slice(&self.width().to_le_bytes());
        buf.extend_from_slice(&self.height().to_le_bytes());
        buf.push(self.flags());
        w.write_all(&buf)
    }
}

impl LocalColorTable {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.colors())
    }
}

impl ImageData {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[self.min_code_size()])?;
        // sub-blocks include the zero-length terminator
        w.write_all(&lzw::encode(self.indices(), self.min_code_size()))
    }
}

impl Trailer {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(BlockCode::Trailer_.signature())
    }
}

/// Frame encoder
///
/// Encodes one [Frame] into a graphic control extension, image descriptor,
/// optional local color table and image data.  Without a global palette,
/// each frame is quantized to its own local color table.
///
/// [Frame]: struct.Frame.html
#[derive(Clone, Debug)]
pub struct FrameEnc<'p> {
    /// Canvas width
    canvas_width: u16,
    /// Canvas height
    canvas_height: u16,
    /// Global palette
    global_palette: Option<&'p Palette>,
    /// Quantizer for local palettes
    quantizer: Quantizer,
    /// Default delay time (centiseconds)
    delay_time_cs: u16,
}

impl<'p> FrameEnc<'p> {
    /// Create a new frame encoder for a canvas
    pub fn new(canvas_width: u16, canvas_height: u16) -> Self {
        FrameEnc {
            canvas_width,
            canvas_height,
            global_palette: None,
            quantizer: Quantizer::default(),
            delay_time_cs: 1,
        }
    }

    /// Use a global palette instead of local palettes
    pub fn with_global_palette(mut self, palette: Option<&'p Palette>) -> Self {
        self.global_palette = palette;
        self
    }

    /// Set the quantizer
    pub fn with_quantizer(mut self, quantizer: Quantizer) -> Self {
        self.quantizer = quantizer;
        self
    }

    /// Set the default delay time (centiseconds)
    pub fn with_delay_time_cs(mut self, delay_time_cs: u16) -> Self {
        self.delay_time_cs = delay_time_cs;
        self
    }

    /// Check that a frame fits on the canvas
    fn check_dimensions(&self, frame: &Frame) -> Result<()> {
        let right = u32::from(frame.left()) + frame.width();
        let bottom = u32::from(frame.top()) + frame.height();
        if right > u32::from(self.canvas_width)
            || bottom > u32::from(self.canvas_height)
        {
            return Err(Error::DimensionMismatch);
        }
        Ok(())
    }

    /// Make the graphic control extension for a frame
    fn graphic_control(
        &self,
        frame: &Frame,
        transparent: Option<u8>,
    ) -> GraphicControl {
        let disposal = frame.disposal_method().unwrap_or(match transparent {
            Some(_) => DisposalMethod::Background,
            None => DisposalMethod::NoAction,
        });
        let delay = frame.delay_time_cs().unwrap_or(self.delay_time_cs);
        let mut control = GraphicControl::default();
        control.set_disposal_method(disposal);
        control.set_delay_time_cs(delay.max(1));
        control.set_transparent_color(transparent);
        control
    }

    /// Encode one frame to bytes
    pub fn encode_frame(&self, frame: &Frame) -> Result<Vec<u8>> {
        frame.validate()?;
        self.check_dimensions(frame)?;
        let quantizer = match frame.quality() {
            Some(q) => self.quantizer.clone().with_quality(q),
            None => self.quantizer.clone(),
        };
        let (palette, indices) = match self.global_palette {
            Some(palette) => {
                let indices = quantizer.map_to_palette(frame, palette)?;
                (Cow::Borrowed(palette), indices)
            }
            None => {
                let (palette, indices) = quantizer.quantize(frame)?;
                (Cow::Owned(palette), indices)
            }
        };
        let local_palette = match &palette {
            Cow::Owned(p) => Some(p),
            Cow::Borrowed(_) => None,
        };
        let transparent = match frame.is_transparent() {
            true => palette.transparent_idx(),
            false => None,
        };
        let min_code_size = palette.min_code_size();
        trace!(
            "frame {}x{}: {} colors, min code size {}",
            frame.width(),
            frame.height(),
            palette.len(),
            min_code_size
        );
        let tbl = ColorTableConfig::from(local_palette);
        let image_desc = ImageDesc::default()
            .with_left(frame.left())
            .with_top(frame.top())
            .with_width(u16::try_from(frame.width())?)
            .with_height(u16::try_from(frame.height())?)
            .with_color_table_config(&tbl);
        let len = indices.indices().len();
        let mut enc = BlockEnc::new(Vec::with_capacity(len / 2 + 1024));
        enc.encode(self.graphic_control(frame, transparent))?;
        enc.encode(image_desc)?;
        if let Some(palette) = local_palette {
            enc.encode(LocalColorTable::with_palette(palette))?;
        }
        let indices = indices.into_indices();
        enc.encode(ImageData::with_indices(min_code_size, indices))?;
        Ok(enc.into_inner())
    }
}
