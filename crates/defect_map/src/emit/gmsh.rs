//! Gmsh post-processing output.
//!
//! Views become `$ElementData` blocks of an MSH 4.1 file that is merged on top
//! of the already loaded surface mesh. Hidden faces are left out of the block,
//! which the viewer draws as "no data". Style options go to a separate script
//! of `View[i].Option = value;` lines.
use std::io::Write;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::emit::ViewEmitter;
use crate::error::Result;
use crate::evaluate::View;
use crate::style::{is_option_name, StyleOptions};

const MESH_FORMAT: &str = "$MeshFormat\n4.1 0 8\n$EndMeshFormat\n";

struct EmittedView {
    name: String,
    style: Arc<StyleOptions>,
    min: Option<f64>,
    max: Option<f64>,
}

/// Writes views as MSH 4.1 element data.
pub struct GmshEmitter<W: Write> {
    writer: W,
    header_written: bool,
    view_offset: usize,
    emitted: Vec<EmittedView>,
}

impl<W: Write> GmshEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
            view_offset: 0,
            emitted: Vec::new(),
        }
    }

    /// Index of the first emitted view when the model already holds views.
    pub fn with_view_offset(mut self, offset: usize) -> Self {
        self.view_offset = offset;
        self
    }

    pub fn view_count(&self) -> usize {
        self.emitted.len()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes the option script for every view emitted so far.
    ///
    /// Every view but the last one is hidden. Bounds that are set (or inferred
    /// from the visible faces) become the view's custom range. Options whose name
    /// or value the script cannot hold are left out with a warning.
    pub fn write_options<O: Write>(&self, mut out: O) -> Result<()> {
        let last = self.emitted.len().saturating_sub(1);
        for (i, view) in self.emitted.iter().enumerate() {
            let index = self.view_offset + i;
            writeln!(out, "// {}", view.name)?;
            for (name, value) in view.style.iter() {
                let number = value.as_number();
                if !is_option_name(name) || !number.is_finite() {
                    warn!("Dropping option {:?} = {} of view '{}'.", name, number, view.name);
                    continue;
                }
                writeln!(out, "View[{index}].{name} = {number};")?;
            }
            if let Some(min) = view.min.filter(|v| v.is_finite()) {
                writeln!(out, "View[{index}].CustomMin = {min};")?;
            }
            if let Some(max) = view.max.filter(|v| v.is_finite()) {
                writeln!(out, "View[{index}].CustomMax = {max};")?;
            }
            if i != last {
                writeln!(out, "View[{index}].Visible = 0;")?;
            }
        }
        Ok(())
    }

    fn write_element_data(&mut self, view: &View) -> Result<usize> {
        let samples: Vec<_> = view
            .faces()
            .filter(|face| face.visible && face.value.is_finite())
            .collect();

        let w = &mut self.writer;
        writeln!(w, "$ElementData")?;
        writeln!(w, "1")?;
        writeln!(w, "\"{}\"", single_line(&view.name))?;
        writeln!(w, "1")?;
        writeln!(w, "0")?;
        writeln!(w, "3")?;
        writeln!(w, "0")?;
        writeln!(w, "1")?;
        writeln!(w, "{}", samples.len())?;
        for face in &samples {
            writeln!(w, "{} {}", face.tag, face.value)?;
        }
        writeln!(w, "$EndElementData")?;
        Ok(samples.len())
    }
}

impl<W: Write> ViewEmitter for GmshEmitter<W> {
    fn emit(&mut self, view: &View) -> Result<()> {
        if !self.header_written {
            self.writer.write_all(MESH_FORMAT.as_bytes())?;
            self.header_written = true;
        }
        let written = self.write_element_data(view)?;
        debug!(view = %view.name, faces = written, "wrote element data");

        let (min, max) = view.effective_range();
        self.emitted.push(EmittedView {
            name: single_line(&view.name),
            style: Arc::clone(&view.style),
            min,
            max,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// A display name that fits a quoted string tag on one line.
fn single_line(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::emit_all;
    use crate::emit::tests::sample_view;

    fn render(views: &[View]) -> (String, String) {
        let mut emitter = GmshEmitter::new(Vec::new());
        emit_all(views, &mut emitter).expect("emit");
        let mut script = Vec::new();
        emitter.write_options(&mut script).expect("options");
        let data = String::from_utf8(emitter.into_inner()).expect("utf8");
        (data, String::from_utf8(script).expect("utf8"))
    }

    #[test]
    fn hidden_faces_are_left_out() {
        let (data, _) = render(&[sample_view("inner_corner", "Kanten/Innen")]);
        let expected = "$MeshFormat\n4.1 0 8\n$EndMeshFormat\n\
            $ElementData\n1\n\"Kanten/Innen\"\n1\n0\n3\n0\n1\n2\n1 2\n3 4.8\n$EndElementData\n";
        assert_eq!(data, expected);
    }

    #[test]
    fn header_is_written_once() {
        let views = vec![sample_view("a", "A"), sample_view("b", "B")];
        let (data, _) = render(&views);
        assert_eq!(data.matches("$MeshFormat").count(), 1);
        assert_eq!(data.matches("$ElementData").count(), 2);
    }

    #[test]
    fn face_tags_replace_indices() {
        let mut view = sample_view("inner_corner", "Kanten/Innen");
        view.face_tags = Some(vec![101, 102, 103].into());
        let (data, _) = render(&[view]);
        assert!(data.contains("\n101 2\n103 4.8\n"));
    }

    #[test]
    fn empty_view_still_produces_a_block() {
        let mut view = sample_view("walls", "Waende");
        view.mask = vec![false, false, false].into();
        let (data, script) = render(&[view]);
        assert!(data.contains("\n1\n0\n$EndElementData\n"));
        assert!(!script.contains("CustomMin"));
        assert!(script.contains("View[0].CustomMax = 4.8;"));
    }

    #[test]
    fn options_script_hides_all_but_last_view() {
        let views = vec![sample_view("a", "A"), sample_view("b", "B")];
        let (_, script) = render(&views);

        assert!(script.contains("View[0].ColormapNumber = 17;"));
        assert!(script.contains("View[0].ColormapSwap = 1;"));
        assert!(script.contains("View[0].CustomMin = 2;"));
        assert!(script.contains("View[0].CustomMax = 4.8;"));
        assert!(script.contains("View[0].Visible = 0;"));
        assert!(!script.contains("View[1].Visible"));
    }

    #[test]
    fn view_offset_shifts_indices() {
        let mut emitter = GmshEmitter::new(Vec::new()).with_view_offset(3);
        emitter.emit(&sample_view("a", "A")).expect("emit");
        let mut script = Vec::new();
        emitter.write_options(&mut script).expect("options");
        let script = String::from_utf8(script).expect("utf8");
        assert!(script.contains("View[3].ColormapNumber = 17;"));
        assert_eq!(emitter.view_count(), 1);
    }

    #[test]
    fn multi_line_names_keep_the_header_layout() {
        let view = sample_view("inner_corner", "Kanten\nInnen \"scharf\"");
        let (data, script) = render(&[view]);

        let lines: Vec<&str> = data.lines().collect();
        assert_eq!(lines[3], "$ElementData");
        assert_eq!(lines[4], "1");
        assert_eq!(lines[5], "\"Kanten Innen 'scharf'\"");
        assert_eq!(lines[6..12], ["1", "0", "3", "0", "1", "2"]);
        assert!(script.starts_with("// Kanten Innen 'scharf'\n"));
    }

    #[test]
    fn unscriptable_options_are_left_out() {
        let mut view = sample_view("inner_corner", "Kanten/Innen");
        view.style = Arc::new(
            StyleOptions::new()
                .with("ColormapNumber", 17.0)
                .with("Colormap;Swap\nVisible", 1.0)
                .with("ColormapBias", f64::NAN),
        );
        let (_, script) = render(&[view]);

        assert_eq!(script.lines().filter(|l| l.starts_with("View[0].Colormap")).count(), 1);
        assert!(script.contains("View[0].ColormapNumber = 17;"));
        assert!(!script.contains("NaN"));
        assert!(!script.contains("Visible"));
        assert!(script.lines().all(|l| l.starts_with("//") || l.ends_with(';')));
    }
}
