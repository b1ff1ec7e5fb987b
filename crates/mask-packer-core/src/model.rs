use serde::{Deserialize, Serialize};
use std::fmt;

/// Rotation in degrees. Not normalized: negative values and values past 360 are kept as written.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct Angle(pub f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);
    /// The rotation written as `rotate: true` in atlas text.
    pub const QUARTER_TURN: Angle = Angle(90.0);

    pub fn degrees(self) -> f64 {
        self.0
    }

    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Integer 2-D point, used both for positions and sizes (pixels).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Same point with the axes exchanged (`(y, x)`).
    pub const fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Placement rectangle of a sprite inside its packed page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bounds {
    /// Top-left corner on the page.
    pub position: Point,
    /// Packed size. Never negative once decoded.
    pub size: Point,
}

/// Trim metadata: the margin discarded during packing and the untrimmed size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offsets {
    /// Trimmed margin as (left, bottom); Y is measured from the bottom of the original image.
    pub offset: Point,
    /// Original (untrimmed) mask size.
    pub original_size: Point,
}

impl Offsets {
    /// True when no `offsets:` line set anything.
    pub fn is_unset(&self) -> bool {
        self.offset.is_zero() && self.original_size.is_zero()
    }
}

/// Min/mag filter names as written in the page header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Filter {
    pub x: String,
    pub y: String,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A named region of a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sprite {
    /// Join key against mask files. Uniqueness within a page is up to the atlas author.
    pub name: String,
    /// Advisory ordering metadata; draw order is list order.
    pub index: i32,
    pub bounds: Bounds,
    pub offsets: Offsets,
    pub rotate: Angle,
}

impl Sprite {
    /// True when the sprite was packed without trimming.
    pub fn is_untrimmed(&self) -> bool {
        self.offsets.offset.is_zero() && self.bounds.size == self.offsets.original_size
    }

    /// True for the `rotate: true` / `rotate: 90` case.
    pub fn is_quarter_turn(&self) -> bool {
        self.rotate == Angle::QUARTER_TURN
    }
}

/// One atlas page: the destination canvas description plus its sprites.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub name: String,
    /// Canvas size in pixels. Never negative once decoded.
    pub size: Point,
    pub format: String,
    pub filter: Filter,
    pub repeat: String,
    pub premultiplied_alpha: bool,
    pub sprites: Vec<Sprite>,
}

impl Page {
    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().rev().find(|s| s.name == name)
    }
}
