use crate::annotation::{AnnotationSession, PlanarAnnotation, Point, Rect};
use crate::enums::{DetailPlane, Orientation};
use crate::export::{Measurements, PARAMETER_COUNT, ParameterField, default_parameters};
use crate::navigator::AxisNavigator;
use crate::volume::Volume;

use image::ImageBuffer;
use image::Luma;
use ndarray::ArrayView2;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no volume has been loaded")]
    MissingVolume,

    #[error("the current stage has no finalized annotation")]
    MissingAnnotation,

    #[error("operation is not available in the current stage")]
    InvalidStage,

    #[error("no parameter field at index {0}")]
    UnknownParameter(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// View-facing discriminant of the wizard's three stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowStage {
    /// Whole-volume axial view; load a volume and capture the first
    /// rectangle.
    Overview,
    /// Single orthogonal detail plane (coronal or sagittal); capture the
    /// second rectangle.
    Detail,
    /// Tri-planar browsing, parameter entry and export.
    Review,
}

#[derive(Default)]
struct OverviewCapture {
    loaded: Option<(Volume, AxisNavigator)>,
    session: AnnotationSession,
    /// Slice index pinned when the rectangle's press landed; scrolling
    /// afterwards must not move the annotation to another slice.
    captured_at: Option<usize>,
}

struct DetailCapture {
    volume: Volume,
    /// Copy of the overview volume carried forward to review, taken at
    /// the stage handoff so later edits cannot corrupt it.
    snapshot: Volume,
    first: PlanarAnnotation,
    selected: Option<(DetailPlane, AxisNavigator)>,
    session: AnnotationSession,
    captured_at: Option<usize>,
}

struct Review {
    snapshot: Volume,
    first: PlanarAnnotation,
    second: PlanarAnnotation,
    navigators: [AxisNavigator; 3],
    parameters: [ParameterField; PARAMETER_COUNT],
}

enum Stage {
    Overview(OverviewCapture),
    Detail(DetailCapture),
    Review(Review),
}

/// The wizard's session state machine.
///
/// Owns the volume and both captured annotations, sequences the three
/// stages, and is the only mutator of their state: views route every
/// pointer, scroll and edit event through these methods. A failed stage
/// advance leaves the current stage untouched, and `reset` rebuilds the
/// whole workflow from scratch.
pub struct Workflow {
    stage: Stage,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    /// A fresh workflow at the overview stage with no volume loaded.
    pub fn new() -> Self {
        Self {
            stage: Stage::Overview(OverviewCapture::default()),
        }
    }

    pub fn stage(&self) -> WorkflowStage {
        match self.stage {
            Stage::Overview(_) => WorkflowStage::Overview,
            Stage::Detail(_) => WorkflowStage::Detail,
            Stage::Review(_) => WorkflowStage::Review,
        }
    }

    /// Install a freshly assembled volume in the overview stage,
    /// discarding any annotation in progress.
    pub fn load_volume(&mut self, volume: Volume) -> Result<(), WorkflowError> {
        let Stage::Overview(stage) = &mut self.stage else {
            return Err(WorkflowError::InvalidStage);
        };
        let navigator = AxisNavigator::new(Orientation::Axial, &volume);
        stage.loaded = Some((volume, navigator));
        stage.session.reset();
        stage.captured_at = None;
        Ok(())
    }

    /// Choose the detail plane. Re-selecting, even the same plane again,
    /// discards any in-progress rectangle: a rectangle is specific to the
    /// plane it was drawn on.
    pub fn select_plane(&mut self, plane: DetailPlane) -> Result<(), WorkflowError> {
        let Stage::Detail(stage) = &mut self.stage else {
            return Err(WorkflowError::InvalidStage);
        };
        let navigator = AxisNavigator::new(plane.orientation(), &stage.volume);
        stage.selected = Some((plane, navigator));
        stage.session.reset();
        stage.captured_at = None;
        Ok(())
    }

    pub fn selected_plane(&self) -> Option<DetailPlane> {
        match &self.stage {
            Stage::Detail(stage) => stage.selected.map(|(plane, _)| plane),
            _ => None,
        }
    }

    /// Advance to the next stage, handing the captured data forward.
    ///
    /// # Errors
    ///
    /// Rejected with the stage unchanged when no volume is loaded, when
    /// the active annotation is not finalized, or from the review stage.
    pub fn advance(&mut self) -> Result<(), WorkflowError> {
        let stage = std::mem::replace(&mut self.stage, Stage::Overview(OverviewCapture::default()));
        match stage {
            Stage::Overview(stage) => match Self::advance_from_overview(stage) {
                Ok(next) => {
                    self.stage = next;
                    Ok(())
                }
                Err((stage, error)) => {
                    self.stage = Stage::Overview(stage);
                    Err(error)
                }
            },
            Stage::Detail(stage) => match Self::advance_from_detail(stage) {
                Ok(next) => {
                    self.stage = next;
                    Ok(())
                }
                Err((stage, error)) => {
                    self.stage = Stage::Detail(stage);
                    Err(error)
                }
            },
            Stage::Review(stage) => {
                self.stage = Stage::Review(stage);
                Err(WorkflowError::InvalidStage)
            }
        }
    }

    fn advance_from_overview(
        stage: OverviewCapture,
    ) -> Result<Stage, (OverviewCapture, WorkflowError)> {
        let OverviewCapture {
            loaded,
            session,
            captured_at,
        } = stage;
        let Some((volume, navigator)) = loaded else {
            return Err((
                OverviewCapture {
                    loaded: None,
                    session,
                    captured_at,
                },
                WorkflowError::MissingVolume,
            ));
        };
        let (Some(record), Some(slice_index)) = (session.record().copied(), captured_at) else {
            return Err((
                OverviewCapture {
                    loaded: Some((volume, navigator)),
                    session,
                    captured_at,
                },
                WorkflowError::MissingAnnotation,
            ));
        };

        let first = PlanarAnnotation {
            record,
            orientation: navigator.orientation(),
            slice_index,
        };
        let snapshot = volume.clone();
        log::debug!("advancing to the detail capture stage");
        Ok(Stage::Detail(DetailCapture {
            volume,
            snapshot,
            first,
            selected: None,
            session: AnnotationSession::new(),
            captured_at: None,
        }))
    }

    fn advance_from_detail(
        stage: DetailCapture,
    ) -> Result<Stage, (DetailCapture, WorkflowError)> {
        let (Some((plane, _)), Some(record), Some(slice_index)) = (
            stage.selected,
            stage.session.record().copied(),
            stage.captured_at,
        ) else {
            return Err((stage, WorkflowError::MissingAnnotation));
        };

        let second = PlanarAnnotation {
            record,
            orientation: plane.orientation(),
            slice_index,
        };
        let DetailCapture {
            snapshot, first, ..
        } = stage;
        let navigators = [
            AxisNavigator::new(Orientation::Axial, &snapshot),
            AxisNavigator::new(Orientation::Coronal, &snapshot),
            AxisNavigator::new(Orientation::Sagittal, &snapshot),
        ];
        log::debug!("advancing to the review stage");
        Ok(Stage::Review(Review {
            snapshot,
            first,
            second,
            navigators,
            parameters: default_parameters(),
        }))
    }

    /// Return from detail capture to an empty overview, discarding the
    /// volume and the first annotation.
    pub fn back(&mut self) -> Result<(), WorkflowError> {
        match self.stage {
            Stage::Detail(_) => {
                self.stage = Stage::Overview(OverviewCapture::default());
                Ok(())
            }
            _ => Err(WorkflowError::InvalidStage),
        }
    }

    /// Tear the whole session down and start over at an empty overview.
    /// Available from any stage; nothing of the prior session survives.
    pub fn reset(&mut self) {
        log::info!("workflow reset");
        *self = Workflow::new();
    }

    fn active_session(&self) -> Option<&AnnotationSession> {
        match &self.stage {
            Stage::Overview(stage) => stage.loaded.is_some().then_some(&stage.session),
            Stage::Detail(stage) => stage.selected.is_some().then_some(&stage.session),
            Stage::Review(_) => None,
        }
    }

    fn active_session_mut(&mut self) -> Option<&mut AnnotationSession> {
        match &mut self.stage {
            Stage::Overview(stage) => stage.loaded.is_some().then(|| &mut stage.session),
            Stage::Detail(stage) => stage.selected.is_some().then(|| &mut stage.session),
            Stage::Review(_) => None,
        }
    }

    /// Pointer pressed over the active capture view. Ignored until a
    /// volume (overview) or plane (detail) is available. A press that
    /// starts a rectangle pins the slice index it was drawn on, so
    /// scrolling afterwards cannot move the annotation.
    pub fn press(&mut self, point: Option<Point>) {
        match &mut self.stage {
            Stage::Overview(stage) => {
                if let Some((_, navigator)) = &stage.loaded {
                    let was_idle = stage.session.is_idle();
                    stage.session.press(point);
                    if was_idle && stage.session.is_drawing() {
                        stage.captured_at = Some(navigator.current());
                    }
                }
            }
            Stage::Detail(stage) => {
                if let Some((_, navigator)) = &stage.selected {
                    let was_idle = stage.session.is_idle();
                    stage.session.press(point);
                    if was_idle && stage.session.is_drawing() {
                        stage.captured_at = Some(navigator.current());
                    }
                }
            }
            Stage::Review(_) => {}
        }
    }

    /// Pointer moved over the active capture view.
    pub fn drag(&mut self, point: Option<Point>) {
        if let Some(session) = self.active_session_mut() {
            session.drag(point);
        }
    }

    /// Pointer released over the active capture view.
    pub fn release(&mut self, point: Option<Point>) {
        if let Some(session) = self.active_session_mut() {
            session.release(point);
        }
    }

    /// Discard the active capture view's rectangle without leaving the
    /// stage. No-op in review.
    pub fn reset_annotation(&mut self) {
        match &mut self.stage {
            Stage::Overview(stage) => {
                stage.session.reset();
                stage.captured_at = None;
            }
            Stage::Detail(stage) => {
                stage.session.reset();
                stage.captured_at = None;
            }
            Stage::Review(_) => {}
        }
    }

    /// The displayed rectangle of the active capture view, if any.
    pub fn annotation_rect(&self) -> Option<Rect> {
        self.active_session().and_then(|session| session.rect())
    }

    pub fn is_annotation_finalized(&self) -> bool {
        self.active_session()
            .is_some_and(|session| session.is_finalized())
    }

    fn active_navigator_mut(&mut self) -> Option<&mut AxisNavigator> {
        match &mut self.stage {
            Stage::Overview(stage) => stage.loaded.as_mut().map(|(_, navigator)| navigator),
            Stage::Detail(stage) => stage.selected.as_mut().map(|(_, navigator)| navigator),
            Stage::Review(_) => None,
        }
    }

    /// Scroll the active capture view by `delta` slices.
    pub fn step(&mut self, delta: isize) -> Option<usize> {
        self.active_navigator_mut()
            .map(|navigator| navigator.step(delta))
    }

    /// Drag the active capture view's scrollbar to a [0, 1] position.
    pub fn seek_fraction(&mut self, fraction: f64) -> Option<usize> {
        self.active_navigator_mut()
            .map(|navigator| navigator.seek_fraction(fraction))
    }

    /// The volume backing the current stage, once one is loaded.
    pub fn volume(&self) -> Option<&Volume> {
        match &self.stage {
            Stage::Overview(stage) => stage.loaded.as_ref().map(|(volume, _)| volume),
            Stage::Detail(stage) => Some(&stage.volume),
            Stage::Review(stage) => Some(&stage.snapshot),
        }
    }

    /// The plane shown by the active capture view.
    pub fn current_plane(&self) -> Option<ArrayView2<'_, u16>> {
        match &self.stage {
            Stage::Overview(stage) => stage
                .loaded
                .as_ref()
                .and_then(|(volume, navigator)| navigator.plane(volume)),
            Stage::Detail(stage) => {
                let (_, navigator) = stage.selected.as_ref()?;
                navigator.plane(&stage.volume)
            }
            Stage::Review(_) => None,
        }
    }

    /// The active capture view's plane as a grayscale display image.
    pub fn current_plane_image(&self) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        match &self.stage {
            Stage::Overview(stage) => stage
                .loaded
                .as_ref()
                .and_then(|(volume, navigator)| navigator.plane_image(volume)),
            Stage::Detail(stage) => {
                let (_, navigator) = stage.selected.as_ref()?;
                navigator.plane_image(&stage.volume)
            }
            Stage::Review(_) => None,
        }
    }

    /// Scroll one of the three review navigators. A pure view operation:
    /// the carried annotations are never touched.
    pub fn review_step(&mut self, orientation: Orientation, delta: isize) -> Option<usize> {
        let Stage::Review(stage) = &mut self.stage else {
            return None;
        };
        Some(stage.navigators[orientation.axis()].step(delta))
    }

    /// Position one of the three review navigators absolutely.
    pub fn review_seek_fraction(&mut self, orientation: Orientation, fraction: f64) -> Option<usize> {
        let Stage::Review(stage) = &mut self.stage else {
            return None;
        };
        Some(stage.navigators[orientation.axis()].seek_fraction(fraction))
    }

    /// The review plane along the given orientation.
    pub fn review_plane(&self, orientation: Orientation) -> Option<ArrayView2<'_, u16>> {
        let Stage::Review(stage) = &self.stage else {
            return None;
        };
        stage.navigators[orientation.axis()].plane(&stage.snapshot)
    }

    /// The review plane along the given orientation as a display image.
    pub fn review_plane_image(
        &self,
        orientation: Orientation,
    ) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let Stage::Review(stage) = &self.stage else {
            return None;
        };
        stage.navigators[orientation.axis()].plane_image(&stage.snapshot)
    }

    /// Both carried-forward annotations, available in review.
    pub fn annotations(&self) -> Option<(&PlanarAnnotation, &PlanarAnnotation)> {
        match &self.stage {
            Stage::Review(stage) => Some((&stage.first, &stage.second)),
            _ => None,
        }
    }

    /// The six parameter fields, available in review.
    pub fn parameters(&self) -> Option<&[ParameterField; PARAMETER_COUNT]> {
        match &self.stage {
            Stage::Review(stage) => Some(&stage.parameters),
            _ => None,
        }
    }

    /// Edit the value of one parameter field.
    pub fn set_parameter(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        let Stage::Review(stage) = &mut self.stage else {
            return Err(WorkflowError::InvalidStage);
        };
        let field = stage
            .parameters
            .get_mut(index)
            .ok_or(WorkflowError::UnknownParameter(index))?;
        field.value = value.into();
        Ok(())
    }

    /// Build the export record from the review stage.
    ///
    /// # Errors
    ///
    /// Outside review there is nothing complete to export (either nothing
    /// has been captured yet or a reset cleared the captures).
    pub fn export(&self) -> Result<Measurements, WorkflowError> {
        let Stage::Review(stage) = &self.stage else {
            return Err(WorkflowError::MissingAnnotation);
        };
        Ok(Measurements {
            first: stage.first.record,
            second: stage.second.record,
            parameters: stage.parameters.clone(),
        })
    }

    /// Export the measurements as a CSV file.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), WorkflowError> {
        self.export()?.save_csv(path)?;
        Ok(())
    }
}
