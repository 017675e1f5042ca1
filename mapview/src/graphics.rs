use std::fmt;

use geom::LonLat;

use fleet::{RouteColor, RouteID, VehicleID};

/// A CSS-style color string, usually hex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Color(String);

impl Color {
    pub const WHITE: &'static str = "#ffffff";
    pub const BLACK: &'static str = "#000000";

    pub fn hex(x: &str) -> Self {
        Self(x.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&RouteColor> for Color {
    fn from(color: &RouteColor) -> Self {
        Self::hex(color.as_str())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    Polyline(Vec<LonLat>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    pub color: Color,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Symbol {
    Marker {
        color: Color,
        size: f64,
        outline: Outline,
    },
    Text {
        text: String,
        color: Color,
        font_size: f64,
        bold: bool,
        /// In screen points; negative is below the anchor
        y_offset: f64,
    },
    Line {
        color: Color,
        width: f64,
    },
}

/// Which entity a graphic was drawn for
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Vehicle(VehicleID),
    VehicleLabel(VehicleID),
    Route(RouteID),
    RouteStart(RouteID),
    RouteEnd(RouteID),
}

/// Shown when the user clicks a graphic
#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Graphic {
    pub geometry: Geometry,
    pub symbol: Symbol,
    pub tag: Tag,
    pub popup: Option<Popup>,
}

impl Graphic {
    pub fn color(&self) -> &Color {
        match self.symbol {
            Symbol::Marker { ref color, .. }
            | Symbol::Text { ref color, .. }
            | Symbol::Line { ref color, .. } => color,
        }
    }
}
