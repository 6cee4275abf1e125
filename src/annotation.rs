use crate::enums::Orientation;

/// A pointer position in the data coordinates of a displayed plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box with ordered corners (x0 <= x1, y0 <= y1).
///
/// This is the displayed shape of an annotation; it is always a valid
/// rectangle regardless of which corner the drag started from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Raw press/release geometry of a finalized annotation.
///
/// The points are deliberately unnormalized: they preserve the drag
/// direction, and the export record reproduces exactly what was pressed
/// and released rather than the displayed min/max box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnotationRecord {
    pub start: Point,
    pub end: Point,
}

impl AnnotationRecord {
    /// The displayed box for this record.
    pub fn normalized(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }

    /// Map both points into volume space as [depth, row, column],
    /// given the plane the annotation was drawn on.
    pub fn to_volume(&self, orientation: Orientation, index: usize) -> ([f64; 3], [f64; 3]) {
        (
            plane_point_to_volume(self.start, orientation, index),
            plane_point_to_volume(self.end, orientation, index),
        )
    }
}

/// Map a plane point to [depth, row, column] volume coordinates.
///
/// Display convention per orientation (matching [`Volume::plane`]):
/// axial planes show (row, column), coronal planes (depth, column),
/// sagittal planes (depth, row).
///
/// [`Volume::plane`]: crate::volume::Volume::plane
fn plane_point_to_volume(point: Point, orientation: Orientation, index: usize) -> [f64; 3] {
    let fixed = index as f64;
    match orientation {
        Orientation::Axial => [fixed, point.y, point.x],
        Orientation::Coronal => [point.y, fixed, point.x],
        Orientation::Sagittal => [point.y, point.x, fixed],
    }
}

/// A finalized annotation together with the plane it was drawn on, so it
/// can be mapped into volume space downstream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarAnnotation {
    pub record: AnnotationRecord,
    pub orientation: Orientation,
    pub slice_index: usize,
}

impl PlanarAnnotation {
    pub fn to_volume(&self) -> ([f64; 3], [f64; 3]) {
        self.record.to_volume(self.orientation, self.slice_index)
    }
}

#[derive(Clone, Copy, Debug, Default)]
enum State {
    #[default]
    Idle,
    Drawing { anchor: Point, cursor: Point },
    Finalized(AnnotationRecord),
}

/// Captures at most one rectangle per view via a press/drag/release
/// gesture.
///
/// The session is a three-state machine, Idle -> Drawing -> Finalized,
/// with one mutation entry point per event kind. Event points are
/// `Option<Point>`: `None` means the pointer is outside the viewing
/// area. A drag that leaves the view keeps the last in-bounds position,
/// and a release outside the view finalizes with that position, so every
/// drawing session that sees a release reaches Finalized.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnnotationSession {
    state: State,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer pressed. Starts a zero-size rectangle anchored at the
    /// press point. A press after finalization is rejected as a no-op:
    /// the session holds at most one rectangle until `reset`.
    pub fn press(&mut self, point: Option<Point>) {
        let Some(point) = point else { return };
        match self.state {
            State::Idle => {
                self.state = State::Drawing {
                    anchor: point,
                    cursor: point,
                };
            }
            State::Drawing { .. } => {}
            State::Finalized(_) => {
                log::warn!("a rectangle already exists; reset before drawing a new one");
            }
        }
    }

    /// Pointer moved while drawing. Out-of-bounds positions are ignored,
    /// leaving the cursor at the last in-bounds point.
    pub fn drag(&mut self, point: Option<Point>) {
        if let (State::Drawing { cursor, .. }, Some(point)) = (&mut self.state, point) {
            *cursor = point;
        }
    }

    /// Pointer released. Freezes the rectangle and records the raw
    /// (anchor, release) pair; an out-of-bounds release falls back to the
    /// last in-bounds drag position.
    pub fn release(&mut self, point: Option<Point>) {
        if let State::Drawing { anchor, cursor } = self.state {
            let end = point.unwrap_or(cursor);
            self.state = State::Finalized(AnnotationRecord { start: anchor, end });
            log::debug!(
                "rectangle finalized from ({}, {}) to ({}, {})",
                anchor.x,
                anchor.y,
                end.x,
                end.y
            );
        }
    }

    /// Discard any rectangle and return to Idle.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, State::Drawing { .. })
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, State::Finalized(_))
    }

    /// The displayed box: the span between anchor and cursor while
    /// drawing, the frozen record once finalized.
    pub fn rect(&self) -> Option<Rect> {
        match self.state {
            State::Idle => None,
            State::Drawing { anchor, cursor } => Some(Rect::from_corners(anchor, cursor)),
            State::Finalized(record) => Some(record.normalized()),
        }
    }

    /// Signed (width, height) of the drag in progress, reflecting the
    /// drag direction.
    pub fn drag_span(&self) -> Option<(f64, f64)> {
        match self.state {
            State::Drawing { anchor, cursor } => {
                Some((cursor.x - anchor.x, cursor.y - anchor.y))
            }
            _ => None,
        }
    }

    /// The raw annotation, available only once finalized.
    pub fn record(&self) -> Option<&AnnotationRecord> {
        match &self.state {
            State::Finalized(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Option<Point> {
        Some(Point::new(x, y))
    }

    #[test]
    fn full_gesture_finalizes_with_raw_points() {
        let mut session = AnnotationSession::new();
        assert!(session.is_idle());

        session.press(p(2.0, 3.0));
        assert!(session.is_drawing());
        session.drag(p(5.0, 5.0));
        session.drag(p(8.0, 9.0));
        session.release(p(8.0, 9.0));

        assert!(session.is_finalized());
        assert_eq!(
            session.record(),
            Some(&AnnotationRecord {
                start: Point::new(2.0, 3.0),
                end: Point::new(8.0, 9.0),
            })
        );
    }

    #[test]
    fn press_starts_a_zero_size_rectangle() {
        let mut session = AnnotationSession::new();
        session.press(p(4.0, 4.0));
        let rect = session.rect().unwrap();
        assert_eq!((rect.width(), rect.height()), (0.0, 0.0));
    }

    #[test]
    fn displayed_rect_is_normalized_but_span_keeps_direction() {
        let mut session = AnnotationSession::new();
        session.press(p(10.0, 10.0));
        session.drag(p(4.0, 6.0));

        assert_eq!(session.drag_span(), Some((-6.0, -4.0)));
        let rect = session.rect().unwrap();
        assert_eq!((rect.x0, rect.y0, rect.x1, rect.y1), (4.0, 6.0, 10.0, 10.0));
    }

    #[test]
    fn second_press_after_finalize_is_a_no_op() {
        let mut session = AnnotationSession::new();
        session.press(p(1.0, 1.0));
        session.release(p(2.0, 2.0));
        let before = *session.record().unwrap();

        session.press(p(9.0, 9.0));
        assert!(session.is_finalized());
        assert_eq!(session.record(), Some(&before));
    }

    #[test]
    fn reset_allows_a_new_gesture() {
        let mut session = AnnotationSession::new();
        session.press(p(1.0, 1.0));
        session.release(p(2.0, 2.0));

        session.reset();
        assert!(session.is_idle());
        assert!(session.rect().is_none());

        session.press(p(3.0, 3.0));
        assert!(session.is_drawing());
    }

    #[test]
    fn out_of_bounds_release_uses_last_in_bounds_position() {
        let mut session = AnnotationSession::new();
        session.press(p(1.0, 1.0));
        session.drag(p(6.0, 7.0));
        session.drag(None);
        session.release(None);

        assert_eq!(
            session.record(),
            Some(&AnnotationRecord {
                start: Point::new(1.0, 1.0),
                end: Point::new(6.0, 7.0),
            })
        );
    }

    #[test]
    fn events_outside_drawing_have_no_effect() {
        let mut session = AnnotationSession::new();
        session.drag(p(5.0, 5.0));
        session.release(p(5.0, 5.0));
        assert!(session.is_idle());

        session.press(None);
        assert!(session.is_idle());

        session.press(p(1.0, 1.0));
        session.release(p(2.0, 2.0));
        session.drag(p(9.0, 9.0));
        assert_eq!(session.record().unwrap().end, Point::new(2.0, 2.0));
    }

    #[test]
    fn plane_points_map_into_volume_space() {
        let record = AnnotationRecord {
            start: Point::new(2.0, 3.0),
            end: Point::new(8.0, 9.0),
        };

        let (start, _) = record.to_volume(Orientation::Axial, 4);
        assert_eq!(start, [4.0, 3.0, 2.0]);

        let (start, _) = record.to_volume(Orientation::Coronal, 4);
        assert_eq!(start, [3.0, 4.0, 2.0]);

        let (start, end) = record.to_volume(Orientation::Sagittal, 4);
        assert_eq!(start, [3.0, 2.0, 4.0]);
        assert_eq!(end, [9.0, 8.0, 4.0]);
    }
}
