use crate::enums::Orientation;
use crate::volume::Volume;

use image::ImageBuffer;
use image::Luma;
use ndarray::ArrayView2;

/// Tracks the current slice index along one volume axis.
///
/// Out-of-range seeks and steps clamp to the nearest valid index; they
/// never fail and never wrap around. Each displayed plane owns its own
/// navigator, so multi-planar views scroll independently.
#[derive(Clone, Copy, Debug)]
pub struct AxisNavigator {
    orientation: Orientation,
    current: usize,
    extent: usize,
}

impl AxisNavigator {
    /// Create a navigator over the given volume axis, positioned at the
    /// middle slice.
    pub fn new(orientation: Orientation, volume: &Volume) -> Self {
        let extent = volume.extent(orientation).max(1);
        Self {
            orientation,
            current: extent / 2,
            extent,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Absolute positioning from a continuous position in [0, 1], e.g. a
    /// scrollbar drag. Returns the new index.
    pub fn seek_fraction(&mut self, fraction: f64) -> usize {
        let fraction = fraction.clamp(0.0, 1.0);
        self.current = (fraction * (self.extent - 1) as f64).round() as usize;
        self.current
    }

    /// Relative positioning, e.g. a wheel scroll. Stepping past either end
    /// pins the index at the bound. Returns the new index.
    pub fn step(&mut self, delta: isize) -> usize {
        let target = (self.current as isize).saturating_add(delta);
        self.current = target.clamp(0, (self.extent - 1) as isize) as usize;
        self.current
    }

    /// Current position as a fraction of the axis; 0.0 on a single-slice
    /// axis (no division by a zero-length range).
    pub fn fraction(&self) -> f64 {
        if self.extent <= 1 {
            return 0.0;
        }
        self.current as f64 / (self.extent - 1) as f64
    }

    /// The plane currently selected by this navigator.
    pub fn plane<'a>(&self, volume: &'a Volume) -> Option<ArrayView2<'a, u16>> {
        volume.plane(self.current, self.orientation)
    }

    /// The current plane as an 8-bit grayscale image for display.
    pub fn plane_image(&self, volume: &Volume) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        volume.plane_image(self.current, self.orientation)
    }
}
