use crate::annotation::{AnnotationRecord, Point};

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One editable clinical parameter with a fixed label.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterField {
    pub label: &'static str,
    pub value: String,
}

impl ParameterField {
    fn new(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }
}

pub const PARAMETER_COUNT: usize = 6;

/// The six review-stage parameters in their fixed declaration order.
///
/// Values left unfilled are blank-padded with a single space so every
/// exported row carries two columns.
pub fn default_parameters() -> [ParameterField; PARAMETER_COUNT] {
    [
        ParameterField::new("Crown position", " "),
        ParameterField::new("Root position", " "),
        ParameterField::new("Long axis of the tooth", " "),
        ParameterField::new("External root resorption in adjacent teeth", " "),
        ParameterField::new("Relationship with the sinus and nasal floor", " "),
        ParameterField::new("Extra Parameter", "None"),
    ]
}

/// The completed measurements of one wizard session: both captured
/// rectangles (raw start/end geometry) and the six parameter fields.
#[derive(Clone, Debug)]
pub struct Measurements {
    pub first: AnnotationRecord,
    pub second: AnnotationRecord,
    pub parameters: [ParameterField; PARAMETER_COUNT],
}

impl Measurements {
    /// Flatten into (label, value) rows.
    ///
    /// The row order is a durable external contract: start and end of the
    /// first rectangle, start and end of the second, then the six
    /// parameters in declaration order. Points serialize as their
    /// two-component tuples, not flattened.
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            (
                "Start coordination for rect 1".to_string(),
                format_point(self.first.start),
            ),
            (
                "End coordination for rect 1".to_string(),
                format_point(self.first.end),
            ),
            (
                "Start coordination for rect 2".to_string(),
                format_point(self.second.start),
            ),
            (
                "End coordination for rect 2".to_string(),
                format_point(self.second.end),
            ),
        ];
        rows.extend(
            self.parameters
                .iter()
                .map(|parameter| (parameter.label.to_string(), parameter.value.clone())),
        );
        rows
    }

    /// Write the rows as two-column CSV: UTF-8, no header row, one
    /// newline-terminated record per row.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for (label, value) in self.rows() {
            writeln!(writer, "{},{}", csv_field(&label), csv_field(&value))?;
        }
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_csv(&mut writer)?;
        writer.flush()?;
        log::info!("measurements exported to {}", path.as_ref().display());
        Ok(())
    }
}

fn format_point(point: Point) -> String {
    format!("({}, {})", point.x, point.y)
}

/// Quote a field when it contains a delimiter, quote, or line break;
/// embedded quotes are doubled. Point tuples always contain a comma, so
/// they round-trip as a single field.
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains(['"', ',', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
