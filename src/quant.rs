// quant.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Color quantization
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::palette::{IndexBuffer, Palette, MAX_COLORS};
use color_quant::NeuQuant;
use pix::rgb::SRgb8;

/// Maximum NeuQuant sample factor
const NEUQUANT_MAX_SAMPLE: u8 = 30;

/// Palette generation method
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuantMethod {
    /// Median-cut partitioning of RGB space
    #[default]
    MedianCut,
    /// NeuQuant neural-net quantization
    NeuQuant,
}

/// Color quantizer.
///
/// Reduces a true color frame to a palette of at most `max_colors` entries
/// plus one index per pixel.  `quality` is the pixel sampling stride used
/// to build the palette: 1 samples every pixel, higher values are faster.
/// Every pixel is then mapped to its nearest palette color.
#[derive(Clone, Debug)]
pub struct Quantizer {
    /// Maximum palette size
    max_colors: u16,
    /// Sampling stride
    quality: u8,
    /// Palette generation method
    method: QuantMethod,
    /// Pixels with alpha below this are transparent
    alpha_threshold: u8,
}

impl Default for Quantizer {
    fn default() -> Self {
        Quantizer {
            max_colors: MAX_COLORS as u16,
            quality: 10,
            method: QuantMethod::default(),
            alpha_threshold: 1,
        }
    }
}

/// Color with its sample count
#[derive(Clone, Copy, Debug)]
struct ColorCount {
    rgb: [u8; 3],
    count: u32,
}

/// Box of colors for median cut
#[derive(Debug)]
struct ColorBox {
    /// Distinct colors in box
    colors: Vec<ColorCount>,
    /// Minimum of each channel
    min: [u8; 3],
    /// Maximum of each channel
    max: [u8; 3],
}

impl ColorBox {
    /// Create a box bounding some colors
    fn with_colors(colors: Vec<ColorCount>) -> Self {
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        for c in &colors {
            for ch in 0..3 {
                min[ch] = min[ch].min(c.rgb[ch]);
                max[ch] = max[ch].max(c.rgb[ch]);
            }
        }
        ColorBox { colors, min, max }
    }

    /// Get the widest channel and its range
    fn widest(&self) -> (usize, u8) {
        (0..3)
            .map(|ch| (ch, self.max[ch].saturating_sub(self.min[ch])))
            .fold((0, 0), |best, r| if r.1 > best.1 { r } else { best })
    }

    /// Check if the box can be split
    fn can_split(&self) -> bool {
        self.colors.len() > 1
    }

    /// Split at the median of the widest channel
    fn split(self) -> (ColorBox, ColorBox) {
        let (ch, _) = self.widest();
        let mut colors = self.colors;
        colors.sort_by_key(|c| (c.rgb[ch], c.rgb));
        let total: u64 = colors.iter().map(|c| u64::from(c.count)).sum();
        let mut acc = 0;
        let mut split = 0;
        for (i, c) in colors.iter().enumerate() {
            acc += u64::from(c.count);
            if acc * 2 >= total {
                split = i;
                break;
            }
        }
        // both halves must be non-empty
        let split = split.min(colors.len() - 2);
        let right = colors.split_off(split + 1);
        (ColorBox::with_colors(colors), ColorBox::with_colors(right))
    }

    /// Get the weighted centroid
    fn centroid(&self) -> SRgb8 {
        let mut sum = [0u64; 3];
        let mut total = 0u64;
        for c in &self.colors {
            let n = u64::from(c.count);
            for ch in 0..3 {
                sum[ch] += u64::from(c.rgb[ch]) * n;
            }
            total += n;
        }
        let total = total.max(1);
        let avg = |s: u64| ((s + total / 2) / total) as u8;
        SRgb8::new(avg(sum[0]), avg(sum[1]), avg(sum[2]))
    }
}

/// Make a histogram of distinct colors
fn histogram(samples: &[[u8; 3]]) -> Vec<ColorCount> {
    let mut keys: Vec<u32> = samples
        .iter()
        .map(|c| u32::from(c[0]) << 16 | u32::from(c[1]) << 8 | u32::from(c[2]))
        .collect();
    keys.sort_unstable();
    let mut colors: Vec<ColorCount> = Vec::new();
    for key in keys {
        let rgb = [(key >> 16) as u8, (key >> 8) as u8, key as u8];
        match colors.last_mut() {
            Some(c) if c.rgb == rgb => c.count += 1,
            _ => colors.push(ColorCount { rgb, count: 1 }),
        }
    }
    colors
}

/// Build a palette with median cut
fn median_cut(samples: &[[u8; 3]], n_colors: usize) -> Vec<SRgb8> {
    let mut boxes = vec![ColorBox::with_colors(histogram(samples))];
    while boxes.len() < n_colors {
        let widest = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.can_split())
            .max_by_key(|(_, b)| b.widest().1)
            .map(|(i, _)| i);
        match widest {
            Some(i) => {
                let (left, right) = boxes.swap_remove(i).split();
                boxes.push(left);
                boxes.push(right);
            }
            None => break,
        }
    }
    boxes.iter().map(ColorBox::centroid).collect()
}

/// Build a palette with NeuQuant
fn neuquant(samples: &[[u8; 3]], n_colors: usize, quality: u8) -> Vec<SRgb8> {
    let rgba: Vec<u8> = samples
        .iter()
        .flat_map(|c| [c[0], c[1], c[2], 0xFF])
        .collect();
    let sample = i32::from(quality.clamp(1, NEUQUANT_MAX_SAMPLE));
    let nq = NeuQuant::new(sample, n_colors, &rgba);
    nq.color_map_rgb()
        .chunks_exact(3)
        .map(|c| SRgb8::new(c[0], c[1], c[2]))
        .collect()
}

impl Quantizer {
    /// Create a new quantizer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum palette size
    pub fn with_max_colors(mut self, max_colors: u16) -> Self {
        self.max_colors = max_colors;
        self
    }

    /// Set the quality (sampling stride); values below 1 are clamped
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.max(1);
        self
    }

    /// Set the palette generation method
    pub fn with_method(mut self, method: QuantMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the alpha threshold for transparent pixels
    pub fn with_alpha_threshold(mut self, alpha_threshold: u8) -> Self {
        self.alpha_threshold = alpha_threshold;
        self
    }

    /// Get the maximum palette size
    pub fn max_colors(&self) -> u16 {
        self.max_colors
    }

    /// Get the quality
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Get the palette generation method
    pub fn method(&self) -> QuantMethod {
        self.method
    }

    /// Get the alpha threshold
    pub fn alpha_threshold(&self) -> u8 {
        self.alpha_threshold
    }

    /// Check if a pixel is transparent
    fn is_clear(&self, frame: &Frame, i: usize) -> bool {
        frame.is_transparent() && frame.alpha(i) < self.alpha_threshold
    }

    /// Sample opaque pixels of a frame.
    ///
    /// NeuQuant does its own sampling, so it gets every opaque pixel.
    fn samples(&self, frame: &Frame) -> Vec<[u8; 3]> {
        let n = frame.pixel_count();
        let stride = match self.method {
            QuantMethod::MedianCut => usize::from(self.quality.max(1)),
            QuantMethod::NeuQuant => 1,
        };
        let mut samples: Vec<[u8; 3]> = (0..n)
            .step_by(stride)
            .filter(|i| !self.is_clear(frame, *i))
            .map(|i| frame.rgb(i))
            .collect();
        if samples.is_empty() {
            // stride skipped every opaque pixel
            if let Some(i) = (0..n).find(|i| !self.is_clear(frame, *i)) {
                samples.push(frame.rgb(i));
            }
        }
        samples
    }

    /// Quantize a frame to a new palette.
    ///
    /// If the frame is transparent and has any pixel below the alpha
    /// threshold, the last palette entry is reserved as a transparent slot.
    pub fn quantize(&self, frame: &Frame) -> Result<(Palette, IndexBuffer)> {
        frame.validate()?;
        let max_colors = usize::from(self.max_colors);
        if max_colors == 0 || max_colors > MAX_COLORS {
            return Err(Error::UnsupportedPaletteSize);
        }
        let n = frame.pixel_count();
        let clear = (0..n).any(|i| self.is_clear(frame, i));
        let n_colors = max_colors - usize::from(clear);
        if n_colors == 0 {
            return Err(Error::UnsupportedPaletteSize);
        }
        let samples = self.samples(frame);
        let colors = match (samples.is_empty(), self.method) {
            (true, _) => vec![SRgb8::new(0, 0, 0)],
            (false, QuantMethod::NeuQuant) if n_colors >= 2 => {
                neuquant(&samples, n_colors, self.quality)
            }
            _ => median_cut(&samples, n_colors),
        };
        let mut palette = Palette::with_colors(&colors)?;
        if clear {
            palette = palette.with_transparent_slot()?;
        }
        trace!(
            "quantized {} samples to {} colors ({:?})",
            samples.len(),
            palette.len(),
            self.method
        );
        let indices = self.map_pixels(frame, &palette);
        Ok((palette, indices))
    }

    /// Map a frame to an existing palette.
    ///
    /// Fails with `MissingTransparentIndex` if the frame is transparent but
    /// the palette has no transparent slot.
    pub fn map_to_palette(
        &self,
        frame: &Frame,
        palette: &Palette,
    ) -> Result<IndexBuffer> {
        frame.validate()?;
        if frame.is_transparent() && palette.transparent_idx().is_none() {
            return Err(Error::MissingTransparentIndex);
        }
        Ok(self.map_pixels(frame, palette))
    }

    /// Map every pixel to its nearest palette index
    fn map_pixels(&self, frame: &Frame, palette: &Palette) -> IndexBuffer {
        let mut lookup = palette.lookup();
        let transparent_idx = palette.transparent_idx();
        let indices = (0..frame.pixel_count())
            .map(|i| match transparent_idx {
                Some(t) if self.is_clear(frame, i) => t,
                _ => lookup.nearest(frame.rgb(i)),
            })
            .collect();
        IndexBuffer::new(frame.width(), frame.height(), indices)
    }
}
