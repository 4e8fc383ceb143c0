use std::io::Write;

use serde::Serialize;

use crate::plot::{Figure, Renderer};
use crate::PkError;

#[derive(Serialize)]
struct Row<'a> {
    panel: usize,
    label: &'a str,
    time: f64,
    value: f64,
}

/// Writes every point of a figure as a CSV row `panel,label,time,value`.
pub struct CsvRenderer<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Flush pending rows and hand back the underlying writer
    pub fn into_inner(self) -> Result<W, PkError> {
        self.writer
            .into_inner()
            .map_err(|err| PkError::Io(err.into_error()))
    }
}

impl<W: Write> Renderer for CsvRenderer<W> {
    fn render(&mut self, figure: &Figure) -> Result<(), PkError> {
        for (panel, content) in figure.panels().iter().enumerate() {
            for series in &content.series {
                for (time, value) in series.points() {
                    self.writer.serialize(Row {
                        panel,
                        label: &series.label,
                        time,
                        value,
                    })?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Layout, Series};

    #[test]
    fn writes_header_and_rows() {
        let figure = Figure::new(
            Layout::SideBySide,
            vec![
                Series::new("iv", vec![0.0, 1.0], vec![1.0, 0.5]),
                Series::new("sc", vec![0.0], vec![0.0]),
            ],
        )
        .unwrap();
        let mut renderer = CsvRenderer::new(Vec::new());
        renderer.render(&figure).unwrap();
        let output = String::from_utf8(renderer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "panel,label,time,value",
                "0,iv,0.0,1.0",
                "0,iv,1.0,0.5",
                "1,sc,0.0,0.0",
            ]
        );
    }
}
