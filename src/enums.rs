/// Viewing orientation of a 2D plane extracted from a volume.
///
/// The volume is stored as (depth, height, width), so each orientation
/// fixes exactly one of the three axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    /// The volume axis this orientation slices along.
    pub fn axis(&self) -> usize {
        match self {
            Orientation::Axial => 0,
            Orientation::Coronal => 1,
            Orientation::Sagittal => 2,
        }
    }
}

/// The two alternate planes offered by the detail-capture stage.
///
/// "Left" and "Right" follow the selector labels of the capture UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailPlane {
    Left,
    Right,
}

impl DetailPlane {
    pub fn orientation(&self) -> Orientation {
        match self {
            DetailPlane::Left => Orientation::Coronal,
            DetailPlane::Right => Orientation::Sagittal,
        }
    }
}
