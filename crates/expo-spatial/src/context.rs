//! `SpatialContext`: a snapped cell window plus a 0/1 mask.

use expo_core::Envelope;

use crate::CellWindow;

/// Ephemeral raster mask aligned to the dataset grid.
///
/// `mask` is row-major with `window.rows * window.cols` entries; a non-zero
/// entry marks a cell that contributes to the sample.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialContext {
    window:   CellWindow,
    envelope: Envelope,
    mask:     Vec<u8>,
}

impl SpatialContext {
    pub(crate) fn new(window: CellWindow, envelope: Envelope, mask: Vec<u8>) -> Self {
        debug_assert_eq!(mask.len(), window.len());
        Self { window, envelope, mask }
    }

    /// Position of the context in the dataset grid.
    #[inline]
    pub fn window(&self) -> CellWindow {
        self.window
    }

    /// Snapped extent in dataset coordinates.
    #[inline]
    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.window.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.window.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.window.rows, self.window.cols)
    }

    #[inline]
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Whether window cell `(row, col)` is part of the footprint.
    #[inline]
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        row < self.window.rows
            && col < self.window.cols
            && self.mask[row * self.window.cols + col] != 0
    }

    /// Number of masked-in cells.
    pub fn set_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m != 0).count()
    }
}
