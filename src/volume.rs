use crate::enums::Orientation;

use image::ImageBuffer;
use image::Luma;
use ndarray::Array2;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray::s;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("no slices to assemble")]
    EmptyInput,

    #[error("inconsistent slice dimensions: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// A stack of 2D cross-sections, stored as (depth, height, width).
#[derive(Clone)]
pub struct Volume {
    data: Array3<u16>,
}

impl Volume {
    pub fn new(data: Array3<u16>) -> Self {
        Self { data }
    }

    /// Wrap a single 2D slice as a depth-1 volume.
    pub fn from_slice(slice: Array2<u16>) -> Self {
        Self {
            data: slice.insert_axis(Axis(0)),
        }
    }

    /// Stack independently decoded slices along a new leading axis,
    /// ordered by ascending key.
    ///
    /// File enumeration order is unspecified by the underlying storage, so
    /// the ordering key is the only trustworthy order signal. The sort is
    /// stable; slices sharing a key keep their input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or the slices disagree on
    /// their (height, width) dimensions.
    pub fn from_ordered_slices(
        mut slices: Vec<(i32, Array2<u16>)>,
    ) -> Result<Self, AssembleError> {
        if slices.is_empty() {
            return Err(AssembleError::EmptyInput);
        }
        slices.sort_by_key(|(key, _)| *key);

        let expected = slices[0].1.dim();
        if let Some((_, slice)) = slices.iter().find(|(_, slice)| slice.dim() != expected) {
            return Err(AssembleError::ShapeMismatch {
                expected,
                found: slice.dim(),
            });
        }

        let (height, width) = expected;
        let mut data = Array3::<u16>::zeros((slices.len(), height, width));
        for (i, (_, slice)) in slices.iter().enumerate() {
            data.slice_mut(s![i, .., ..]).assign(slice);
        }

        Ok(Self { data })
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    /// Number of planes available along the given orientation's axis.
    pub fn extent(&self, orientation: Orientation) -> usize {
        let dim = self.data.dim();
        match orientation {
            Orientation::Axial => dim.0,
            Orientation::Coronal => dim.1,
            Orientation::Sagittal => dim.2,
        }
    }

    /// Extract the 2D plane at `index` along the given orientation, leaving
    /// the other two axes full. Returns `None` when `index` is out of range.
    pub fn plane(&self, index: usize, orientation: Orientation) -> Option<ArrayView2<'_, u16>> {
        if index >= self.extent(orientation) {
            return None;
        }
        let view = match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![.., .., index]),
        };
        Some(view)
    }

    #[inline]
    fn normalize_to_u8(value: u16) -> u8 {
        ((value as f32 / 65535.0) * 255.0).clamp(0.0, 255.0) as u8
    }

    /// Convert the plane at `index` into an 8-bit grayscale image for the
    /// display layer.
    pub fn plane_image(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let plane = self.plane(index, orientation)?;
        let (height, width) = plane.dim();
        let pixel_data: Vec<u8> = plane
            .into_par_iter()
            .map(|&v| Self::normalize_to_u8(v))
            .collect();
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(height: usize, width: usize, value: u16) -> Array2<u16> {
        Array2::from_elem((height, width), value)
    }

    #[test]
    fn single_slice_becomes_depth_one_volume() {
        let volume = Volume::from_slice(filled(4, 6, 7));
        assert_eq!(volume.dim(), (1, 4, 6));
        assert_eq!(volume.data()[[0, 0, 0]], 7);
    }

    #[test]
    fn slices_are_stacked_in_key_order() {
        // Enumeration order 3, 1, 2; slice values mark their key.
        let slices = vec![
            (3, filled(10, 10, 3)),
            (1, filled(10, 10, 1)),
            (2, filled(10, 10, 2)),
        ];
        let volume = Volume::from_ordered_slices(slices).unwrap();

        assert_eq!(volume.dim(), (3, 10, 10));
        for (i, expected) in [1u16, 2, 3].into_iter().enumerate() {
            assert_eq!(volume.data()[[i, 5, 5]], expected);
        }
    }

    #[test]
    fn stacking_is_permutation_invariant() {
        let forward = Volume::from_ordered_slices(vec![
            (10, filled(2, 2, 10)),
            (20, filled(2, 2, 20)),
            (30, filled(2, 2, 30)),
        ])
        .unwrap();
        let shuffled = Volume::from_ordered_slices(vec![
            (30, filled(2, 2, 30)),
            (10, filled(2, 2, 10)),
            (20, filled(2, 2, 20)),
        ])
        .unwrap();

        assert_eq!(forward.data(), shuffled.data());
    }

    #[test]
    fn ties_keep_input_order() {
        let volume = Volume::from_ordered_slices(vec![
            (1, filled(2, 2, 100)),
            (1, filled(2, 2, 200)),
        ])
        .unwrap();
        assert_eq!(volume.data()[[0, 0, 0]], 100);
        assert_eq!(volume.data()[[1, 0, 0]], 200);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let result = Volume::from_ordered_slices(vec![
            (1, filled(4, 4, 0)),
            (2, filled(4, 5, 0)),
        ]);
        assert!(matches!(
            result,
            Err(AssembleError::ShapeMismatch {
                expected: (4, 4),
                found: (4, 5),
            })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            Volume::from_ordered_slices(Vec::new()),
            Err(AssembleError::EmptyInput)
        ));
    }

    #[test]
    fn plane_extraction_matches_orientation_axes() {
        let volume = Volume::new(Array3::zeros((3, 4, 5)));
        assert_eq!(volume.plane(0, Orientation::Axial).unwrap().dim(), (4, 5));
        assert_eq!(volume.plane(0, Orientation::Coronal).unwrap().dim(), (3, 5));
        assert_eq!(volume.plane(0, Orientation::Sagittal).unwrap().dim(), (3, 4));
    }

    #[test]
    fn out_of_range_plane_is_none() {
        let volume = Volume::new(Array3::zeros((3, 4, 5)));
        assert!(volume.plane(3, Orientation::Axial).is_none());
        assert!(volume.plane(4, Orientation::Coronal).is_none());
        assert!(volume.plane(5, Orientation::Sagittal).is_none());
    }

    #[test]
    fn plane_image_has_display_dimensions() {
        let volume = Volume::new(Array3::zeros((3, 4, 5)));
        let image = volume.plane_image(1, Orientation::Axial).unwrap();
        assert_eq!((image.width(), image.height()), (5, 4));
    }
}
