// palette.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Color palettes and indexed pixel buffers
use crate::error::{Error, Result};
use pix::rgb::{Rgb, SRgb8};
use std::collections::HashMap;

/// Maximum number of palette entries
pub const MAX_COLORS: usize = 256;

/// Get the red / green / blue components of a color
pub(crate) fn components(clr: SRgb8) -> [u8; 3] {
    [
        u8::from(Rgb::red(clr)),
        u8::from(Rgb::green(clr)),
        u8::from(Rgb::blue(clr)),
    ]
}

/// Squared Euclidean distance in RGB space
pub(crate) fn distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(a, b)| {
            let d = i32::from(*a) - i32::from(*b);
            (d * d) as u32
        })
        .sum()
}

/// Ordered table of up to 256 colors.
///
/// When written to a color table, the palette is padded with black entries
/// up to the next power of two (minimum 2).
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    /// Palette colors
    colors: Vec<SRgb8>,
    /// Index of transparent slot
    transparent_idx: Option<u8>,
}

impl Palette {
    /// Create a palette from a slice of colors.
    ///
    /// Fails with `UnsupportedPaletteSize` if `colors` is empty or holds more
    /// than 256 entries.
    pub fn with_colors(colors: &[SRgb8]) -> Result<Self> {
        if colors.is_empty() || colors.len() > MAX_COLORS {
            return Err(Error::UnsupportedPaletteSize);
        }
        Ok(Palette {
            colors: colors.to_vec(),
            transparent_idx: None,
        })
    }

    /// Create a palette from packed RGB triples
    pub fn with_rgb_bytes(rgb: &[u8]) -> Result<Self> {
        if rgb.len() % 3 != 0 {
            return Err(Error::UnsupportedPaletteSize);
        }
        let colors: Vec<SRgb8> = rgb
            .chunks_exact(3)
            .map(|c| SRgb8::new(c[0], c[1], c[2]))
            .collect();
        Self::with_colors(&colors)
    }

    /// Append a reserved transparent slot to the palette.
    ///
    /// Pixels below the alpha threshold of transparent frames are mapped to
    /// this slot, and it is never chosen as a nearest color.
    pub fn with_transparent_slot(mut self) -> Result<Self> {
        if self.transparent_idx.is_some() {
            return Ok(self);
        }
        if self.colors.len() >= MAX_COLORS {
            return Err(Error::UnsupportedPaletteSize);
        }
        self.transparent_idx = Some(self.colors.len() as u8);
        self.colors.push(SRgb8::new(0, 0, 0));
        Ok(self)
    }

    /// Get the number of colors (including any transparent slot)
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get one palette entry
    pub fn entry(&self, idx: usize) -> Option<SRgb8> {
        self.colors.get(idx).copied()
    }

    /// Get all palette colors
    pub fn colors(&self) -> &[SRgb8] {
        &self.colors
    }

    /// Get the transparent slot index
    pub fn transparent_idx(&self) -> Option<u8> {
        self.transparent_idx
    }

    /// Get the color table length (power of two, 2 to 256)
    pub fn table_len(&self) -> usize {
        self.colors.len().max(2).next_power_of_two()
    }

    /// Get the LZW minimum code size for this palette
    pub fn min_code_size(&self) -> u8 {
        (self.table_len().trailing_zeros() as u8).max(2)
    }

    /// Get color table bytes, padded to the table length
    pub fn table_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.table_len() * 3);
        for clr in &self.colors {
            bytes.extend_from_slice(&components(*clr));
        }
        bytes.resize(self.table_len() * 3, 0);
        bytes
    }

    /// Make a nearest-color lookup for this palette
    pub(crate) fn lookup(&self) -> ColorLookup {
        let entries = self
            .colors
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i as u8) != self.transparent_idx)
            .map(|(i, c)| (i as u8, components(*c)))
            .collect();
        ColorLookup {
            entries,
            cache: HashMap::new(),
        }
    }
}

/// Nearest-color search over a palette.
///
/// Uses squared Euclidean distance in RGB space; ties go to the lowest
/// index.
pub(crate) struct ColorLookup {
    /// Candidate (index, color) entries
    entries: Vec<(u8, [u8; 3])>,
    /// Results of previous searches
    cache: HashMap<[u8; 3], u8>,
}

impl ColorLookup {
    /// Find the index of the nearest color
    pub fn nearest(&mut self, rgb: [u8; 3]) -> u8 {
        if let Some(idx) = self.cache.get(&rgb) {
            return *idx;
        }
        let mut best = (u32::MAX, 0);
        for (idx, clr) in &self.entries {
            let d = distance(rgb, *clr);
            if d < best.0 {
                best = (d, *idx);
                if d == 0 {
                    break;
                }
            }
        }
        self.cache.insert(rgb, best.1);
        best.1
    }
}

/// Palette indices for every pixel of a frame, in row-major order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexBuffer {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// One index per pixel
    indices: Vec<u8>,
}

impl IndexBuffer {
    /// Create an index buffer
    pub(crate) fn new(width: u32, height: u32, indices: Vec<u8>) -> Self {
        debug_assert_eq!(indices.len(), width as usize * height as usize);
        IndexBuffer {
            width,
            height,
            indices,
        }
    }

    /// Get the width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the indices
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Convert into a vec of indices
    pub fn into_indices(self) -> Vec<u8> {
        self.indices
    }

    /// Get the highest index used
    pub fn max_index(&self) -> Option<u8> {
        self.indices.iter().copied().max()
    }
}
