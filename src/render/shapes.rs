//! Built-in shape renderers

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::WidgetOptions;
use crate::error::WidgetError;
use crate::render::renderer::{RenderFrame, ShapeRenderer};
use crate::render::surface::{Surface, SurfaceNode};

/// Horizontal track with a proportional fill
#[derive(Debug, Clone, Default)]
pub struct LinearShape;

impl LinearShape {
    pub fn new() -> Self {
        Self
    }
}

impl ShapeRenderer for LinearShape {
    fn name(&self) -> &str {
        "linear"
    }

    fn mount(&mut self, surface: &Surface, options: &WidgetOptions) -> Result<(), WidgetError> {
        surface.update(|root| {
            root.children.clear();
            root.set_attr("shape", "linear");
            let mut track = SurfaceNode::new("track");
            track.children.push(SurfaceNode::new("fill"));
            root.children.push(track);
            if options.show_text {
                root.children.push(SurfaceNode::new("label"));
            }
        });
        Ok(())
    }

    fn draw(
        &mut self,
        surface: &Surface,
        frame: &RenderFrame,
        _options: &WidgetOptions,
    ) -> Result<(), WidgetError> {
        surface.update(|root| {
            if let Some(fill) = root
                .find_child_mut("track")
                .and_then(|track| track.find_child_mut("fill"))
            {
                fill.set_attr("width", format!("{:.2}%", frame.percent));
            }
            if let Some(label) = root.find_child_mut("label") {
                label.text = frame.label.clone();
            }
        });
        Ok(())
    }

    fn unmount(&mut self, surface: &Surface) {
        surface.update(|root| {
            root.children.clear();
            root.attrs.remove("shape");
        });
    }
}

/// Rotating needle over a 270 degree sweep
#[derive(Debug, Clone, Default)]
pub struct DialShape;

impl DialShape {
    pub fn new() -> Self {
        Self
    }
}

impl ShapeRenderer for DialShape {
    fn name(&self) -> &str {
        "dial"
    }

    fn mount(&mut self, surface: &Surface, options: &WidgetOptions) -> Result<(), WidgetError> {
        surface.update(|root| {
            root.children.clear();
            root.set_attr("shape", "dial");
            let mut dial = SurfaceNode::new("dial").with_attr("sweep", "270");
            dial.children.push(SurfaceNode::new("needle"));
            root.children.push(dial);
            if options.show_text {
                root.children.push(SurfaceNode::new("label"));
            }
        });
        Ok(())
    }

    fn draw(
        &mut self,
        surface: &Surface,
        frame: &RenderFrame,
        _options: &WidgetOptions,
    ) -> Result<(), WidgetError> {
        let angle = -135.0 + frame.percent / 100.0 * 270.0;
        surface.update(|root| {
            if let Some(needle) = root
                .find_child_mut("dial")
                .and_then(|dial| dial.find_child_mut("needle"))
            {
                needle.set_attr("angle", format!("{angle:.1}"));
            }
            if let Some(label) = root.find_child_mut("label") {
                label.text = frame.label.clone();
            }
        });
        Ok(())
    }

    fn unmount(&mut self, surface: &Surface) {
        surface.update(|root| {
            root.children.clear();
            root.attrs.remove("shape");
        });
    }
}

/// A recorded renderer operation
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    Mount,
    Draw {
        value: f64,
        percent: f64,
        label: Option<String>,
    },
    Unmount,
}

/// Renderer double that records calls for tests; clones share the log
#[derive(Clone, Default)]
pub struct RecordingShape {
    ops: Rc<RefCell<Vec<RenderOp>>>,
}

impl RecordingShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<RenderOp> {
        self.ops.borrow().clone()
    }

    pub fn draw_count(&self) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, RenderOp::Draw { .. }))
            .count()
    }

    pub fn last_draw(&self) -> Option<RenderOp> {
        self.ops
            .borrow()
            .iter()
            .rev()
            .find(|op| matches!(op, RenderOp::Draw { .. }))
            .cloned()
    }

    pub fn drawn_values(&self) -> Vec<f64> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                RenderOp::Draw { value, .. } => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.ops.borrow_mut().clear();
    }
}

impl ShapeRenderer for RecordingShape {
    fn name(&self) -> &str {
        "recording"
    }

    fn mount(&mut self, _surface: &Surface, _options: &WidgetOptions) -> Result<(), WidgetError> {
        self.ops.borrow_mut().push(RenderOp::Mount);
        Ok(())
    }

    fn draw(
        &mut self,
        _surface: &Surface,
        frame: &RenderFrame,
        _options: &WidgetOptions,
    ) -> Result<(), WidgetError> {
        self.ops.borrow_mut().push(RenderOp::Draw {
            value: frame.value,
            percent: frame.percent,
            label: frame.label.clone(),
        });
        Ok(())
    }

    fn unmount(&mut self, _surface: &Surface) {
        self.ops.borrow_mut().push(RenderOp::Unmount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(value: f64, percent: f64) -> RenderFrame {
        RenderFrame {
            value,
            percent,
            label: None,
        }
    }

    #[test]
    fn test_linear_mount_and_draw() {
        let surface = Surface::detached();
        let mut shape = LinearShape::new();
        let options = WidgetOptions::default();

        shape.mount(&surface, &options).unwrap();
        shape.draw(&surface, &frame(50.0, 50.0), &options).unwrap();

        let snapshot = surface.snapshot();
        assert_eq!(snapshot.attr("shape"), Some("linear"));
        let fill = snapshot.find("fill").unwrap();
        assert_eq!(fill.attr("width"), Some("50.00%"));
        assert!(snapshot.find_child("label").is_none());
    }

    #[test]
    fn test_linear_label_when_show_text() {
        let surface = Surface::detached();
        let mut shape = LinearShape::new();
        let options = WidgetOptions {
            show_text: true,
            ..Default::default()
        };

        shape.mount(&surface, &options).unwrap();
        let mut with_label = frame(25.0, 25.0);
        with_label.label = Some("25%".to_string());
        shape.draw(&surface, &with_label, &options).unwrap();

        let snapshot = surface.snapshot();
        assert_eq!(
            snapshot.find_child("label").unwrap().text.as_deref(),
            Some("25%")
        );
    }

    #[test]
    fn test_linear_unmount_clears_markup() {
        let surface = Surface::detached();
        let mut shape = LinearShape::new();
        let options = WidgetOptions::default();

        shape.mount(&surface, &options).unwrap();
        shape.unmount(&surface);

        let snapshot = surface.snapshot();
        assert!(snapshot.children.is_empty());
        assert_eq!(snapshot.attr("shape"), None);
    }

    #[test]
    fn test_dial_needle_angle() {
        let surface = Surface::detached();
        let mut shape = DialShape::new();
        let options = WidgetOptions::default();

        shape.mount(&surface, &options).unwrap();
        shape.draw(&surface, &frame(0.0, 0.0), &options).unwrap();
        assert_eq!(
            surface.snapshot().find("needle").unwrap().attr("angle"),
            Some("-135.0")
        );

        shape.draw(&surface, &frame(100.0, 100.0), &options).unwrap();
        assert_eq!(
            surface.snapshot().find("needle").unwrap().attr("angle"),
            Some("135.0")
        );
    }

    #[test]
    fn test_recording_shape_logs_calls() {
        let surface = Surface::detached();
        let recorder = RecordingShape::new();
        let mut shape = recorder.clone();
        let options = WidgetOptions::default();

        shape.mount(&surface, &options).unwrap();
        shape.draw(&surface, &frame(10.0, 10.0), &options).unwrap();
        shape.unmount(&surface);

        assert_eq!(recorder.ops().len(), 3);
        assert_eq!(recorder.draw_count(), 1);
        assert_eq!(recorder.drawn_values(), vec![10.0]);
    }
}
