//! # DICOM-ROI library
//!
//! Core workflow logic for a clinician-facing wizard that inspects a
//! stack of 2D DICOM slices, reconstructs them into a 3D volume, and
//! records rectangular regions of interest plus structured findings for
//! export.
//!
//! The crate covers everything except rendering and widget glue:
//!  - [`VolumeLoader`] and [`Volume`] assemble unordered, independently
//!    decoded slices into a volume ordered by InstanceNumber, and extract
//!    planes along the three medical axes (Axial, Coronal, Sagittal).
//!  - [`AxisNavigator`] tracks a clamped slice index per displayed plane
//!    and converts scroll and seek gestures into index updates.
//!  - [`AnnotationSession`] captures at most one axis-aligned rectangle
//!    per view from a press/drag/release gesture.
//!  - [`Workflow`] sequences the three wizard stages (whole-volume
//!    overview, single-plane detail, tri-planar review) with explicit
//!    data handoff and wholesale reset.
//!  - [`Measurements`] serializes both rectangles and six clinical
//!    parameter fields into a fixed-order CSV record.
//!
//! The display layer is expected to feed pointer events in plane data
//! coordinates (`None` for events outside the viewing area) and to
//! render the planes and rectangles the workflow exposes.
//!
//! # Examples
//!
//! ## Driving the wizard from decoded files to a CSV record
//!
//! ```no_run
//! # use dicom_roi::annotation::Point;
//! # use dicom_roi::enums::DetailPlane;
//! # use dicom_roi::volume_loader::VolumeLoader;
//! # use dicom_roi::workflow::Workflow;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let volume = VolumeLoader::load_from_directory("dicom")?;
//!
//! let mut workflow = Workflow::new();
//! workflow.load_volume(volume)?;
//! workflow.press(Some(Point::new(2.0, 3.0)));
//! workflow.drag(Some(Point::new(8.0, 9.0)));
//! workflow.release(Some(Point::new(8.0, 9.0)));
//! workflow.advance()?;
//!
//! workflow.select_plane(DetailPlane::Left)?;
//! workflow.press(Some(Point::new(1.0, 1.0)));
//! workflow.release(Some(Point::new(4.0, 4.0)));
//! workflow.advance()?;
//!
//! workflow.set_parameter(0, "mesioangular")?;
//! workflow.save_csv("case.csv")?;
//! # Ok(())
//! # }
//! ```
//!
//! [`VolumeLoader`]: volume_loader::VolumeLoader
//! [`Volume`]: volume::Volume
//! [`AxisNavigator`]: navigator::AxisNavigator
//! [`AnnotationSession`]: annotation::AnnotationSession
//! [`Workflow`]: workflow::Workflow
//! [`Measurements`]: export::Measurements

pub mod annotation;
pub mod enums;
pub mod export;
pub mod navigator;
pub mod volume;
pub mod volume_loader;
pub mod workflow;
