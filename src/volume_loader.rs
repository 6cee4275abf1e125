use crate::volume::{AssembleError, Volume};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Missing or unusable InstanceNumber")]
    MissingInstanceNumber,

    #[error("Failed to decode pixel data: {0}")]
    Decode(#[from] dicom::pixeldata::Error),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from DICOM objects, ordered by InstanceNumber.
    ///
    /// Objects whose pixel data is not a single grayscale frame are
    /// excluded from stacking. A decode failure or a missing
    /// InstanceNumber on a participating object is a hard error, never
    /// silently skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if no object yields a 2D frame, if an
    /// InstanceNumber is missing, or if the frames disagree in dimensions.
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
    ) -> Result<Volume, VolumeLoaderError> {
        let mut slices = Vec::new();
        for dicom_object in dicom_objects {
            let Some(slice) = Self::decode_planar_frame(dicom_object)? else {
                continue;
            };
            let instance_number = Self::instance_number(dicom_object)?;
            slices.push((instance_number, slice));
        }

        if slices.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        let volume = Volume::from_ordered_slices(slices)?;
        let (depth, height, width) = volume.dim();
        log::info!("assembled volume of {depth}x{height}x{width}");
        Ok(volume)
    }

    /// Load a volume from file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
    ) -> Result<Volume, VolumeLoaderError> {
        let objects: Result<Vec<_>, _> =
            paths.iter().map(|path| open_file(path.as_ref())).collect();

        Self::load_from_dicom_objects(&objects?)
    }

    /// Load a volume from a directory containing .dcm files
    pub fn load_from_directory(path: impl AsRef<Path>) -> Result<Volume, VolumeLoaderError> {
        let paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();

        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        log::info!("loading {} DICOM files", paths.len());
        Self::load_from_file_paths(&paths)
    }

    /// Load a single DICOM file as a depth-1 volume.
    pub fn load_single_file(path: impl AsRef<Path>) -> Result<Volume, VolumeLoaderError> {
        let dicom_object = open_file(path.as_ref())?;
        let slice = Self::decode_planar_frame(&dicom_object)?
            .ok_or(VolumeLoaderError::NoValidImages)?;
        Ok(Volume::from_slice(slice))
    }

    fn instance_number(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<i32, VolumeLoaderError> {
        dicom_object
            .element(tags::INSTANCE_NUMBER)
            .ok()
            .and_then(|element| element.to_int::<i32>().ok())
            .ok_or(VolumeLoaderError::MissingInstanceNumber)
    }

    /// Decode an object's pixel data as a single 2D grayscale frame.
    ///
    /// Returns `Ok(None)` for objects decoding to more than one frame or
    /// sample per pixel; those do not participate in stacking.
    fn decode_planar_frame(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Option<ndarray::Array2<u16>>, VolumeLoaderError> {
        let pixel_data = dicom_object.decode_pixel_data()?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::First);
        let array = pixel_data.to_ndarray_with_options::<u16>(&options)?;

        // Decoded layout is (frames, rows, columns, samples).
        let shape = array.shape();
        if shape[0] != 1 || shape[3] != 1 {
            return Ok(None);
        }
        Ok(Some(array.slice_move(ndarray::s![0, .., .., 0])))
    }
}
