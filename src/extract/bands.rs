//! Horizontal band partitioning.

use std::num::NonZeroU32;

/// Default band height in pixels.
pub const DEFAULT_BAND_HEIGHT: u32 = 2000;

/// A full-width horizontal strip of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// First pixel row covered by the band.
    pub top: u32,
    /// Number of rows in the band.
    pub height: u32,
}

impl Band {
    /// One past the last row covered by the band.
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

/// Split `total_height` rows into consecutive bands of `band_height`.
///
/// The last band is truncated to the remaining rows. Bands never overlap and
/// together cover `[0, total_height)`.
pub fn split_bands(total_height: u32, band_height: NonZeroU32) -> Vec<Band> {
    let step = band_height.get();
    let mut bands = Vec::with_capacity(total_height.div_ceil(step) as usize);
    let mut top = 0;
    while top < total_height {
        let height = step.min(total_height - top);
        bands.push(Band { top, height });
        top += height;
    }
    bands
}
