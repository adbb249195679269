//! Display layer interface
//!
//! A retained widget tree: rectangles and labels, positioned in pixels relative
//! to their parent. Implementations must accept calls from the simulation
//! thread, which is not the thread that created the screen.

use glam::{IVec2, UVec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Appearance of a rectangle widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectStyle {
    pub size: UVec2,
    pub fill: Color,
    pub corner_radius: u16,
    pub border_width: u16,
    pub border_color: Color,
}

impl RectStyle {
    pub fn filled(size: UVec2, fill: Color) -> Self {
        Self {
            size,
            fill,
            corner_radius: 0,
            border_width: 0,
            border_color: fill,
        }
    }

    pub fn with_radius(mut self, radius: u16) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_border(mut self, width: u16, color: Color) -> Self {
        self.border_width = width;
        self.border_color = color;
        self
    }
}

pub trait Display: Send + Sync {
    /// Create a rectangle; `None` parent attaches it to the screen root
    fn create_rect(&self, parent: Option<WidgetId>, style: RectStyle) -> WidgetId;
    fn create_label(&self, parent: WidgetId, text: &str, color: Color) -> WidgetId;
    fn set_position(&self, id: WidgetId, pos: IVec2);
    fn set_visible(&self, id: WidgetId, visible: bool);
    fn set_text(&self, id: WidgetId, text: &str);
    /// Delete a widget and all of its children
    fn remove(&self, id: WidgetId);
}
