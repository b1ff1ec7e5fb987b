//! Field dispatch for atlas `key: value` lines.
//!
//! Each record type has a static table mapping a field name to the kind of value it holds and
//! a setter. Values are parsed by kind first, then handed to the setter; a setter that cannot
//! store the parsed kind is a table bug and surfaces as [`MaskPackerError::UnsupportedType`].

use serde::{Deserialize, Serialize};

use crate::error::{MaskPackerError, Result};
use crate::model::{Angle, Bounds, Filter, Offsets, Page, Point, Sprite};

/// Declared type of an atlas field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Str,
    Bool,
    Int,
    Filter,
    Angle,
    Point,
    Bounds,
    Offsets,
}

/// A parsed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Bool(bool),
    Int(i32),
    Filter(Filter),
    Angle(Angle),
    Point(Point),
    Bounds(Bounds),
    Offsets(Offsets),
}

/// Setter for one field. Returns the value back when it is of a kind the field cannot hold.
pub(crate) type Apply<T> = fn(&mut T, FieldValue) -> std::result::Result<(), FieldValue>;

pub(crate) struct FieldSpec<T: 'static> {
    pub key: &'static str,
    pub kind: FieldKind,
    pub apply: Apply<T>,
}

/// Builds a [`FieldSpec`] whose setter stores a `FieldValue::$kind` into `$field`.
macro_rules! field {
    ($ty:ty, $key:literal, $kind:ident => $field:ident) => {
        FieldSpec {
            key: $key,
            kind: FieldKind::$kind,
            apply: |target: &mut $ty, value: FieldValue| match value {
                FieldValue::$kind(v) => {
                    target.$field = v;
                    Ok(())
                }
                other => Err(other),
            },
        }
    };
}

pub(crate) static PAGE_FIELDS: &[FieldSpec<Page>] = &[
    field!(Page, "name", Str => name),
    field!(Page, "size", Point => size),
    field!(Page, "format", Str => format),
    field!(Page, "filter", Filter => filter),
    field!(Page, "repeat", Str => repeat),
    field!(Page, "pma", Bool => premultiplied_alpha),
];

pub(crate) static SPRITE_FIELDS: &[FieldSpec<Sprite>] = &[
    field!(Sprite, "name", Str => name),
    field!(Sprite, "index", Int => index),
    field!(Sprite, "bounds", Bounds => bounds),
    field!(Sprite, "offsets", Offsets => offsets),
    field!(Sprite, "rotate", Angle => rotate),
];

/// Looks `key` up in `table`, parses `raw` by the field's kind and stores it into `target`.
///
/// Returns `Ok(false)` for unknown keys; they are not an error.
pub(crate) fn assign<T>(
    table: &[FieldSpec<T>],
    target: &mut T,
    key: &str,
    raw: &str,
    line: usize,
) -> Result<bool> {
    let Some(spec) = table.iter().find(|f| f.key == key) else {
        return Ok(false);
    };
    let value = parse_value(spec.kind, raw)
        .map_err(|msg| MaskPackerError::format(line, format!("field `{key}`: {msg}")))?;
    (spec.apply)(target, value).map_err(|_| MaskPackerError::UnsupportedType {
        key: spec.key,
        kind: spec.kind,
    })?;
    Ok(true)
}

/// Parses a raw (already trimmed) field value as `kind`.
pub fn parse_value(kind: FieldKind, raw: &str) -> std::result::Result<FieldValue, String> {
    Ok(match kind {
        FieldKind::Str => FieldValue::Str(raw.to_string()),
        FieldKind::Bool => FieldValue::Bool(parse_bool(raw)?),
        FieldKind::Int => FieldValue::Int(parse_int(raw)?),
        FieldKind::Filter => FieldValue::Filter(parse_filter(raw)?),
        FieldKind::Angle => FieldValue::Angle(parse_angle(raw)?),
        FieldKind::Point => {
            let [x, y] = parse_ints::<2>(raw)?;
            FieldValue::Point(Point::new(x, y))
        }
        FieldKind::Bounds => {
            let [x, y, w, h] = parse_ints::<4>(raw)?;
            if w < 0 || h < 0 {
                return Err(format!("negative size {w},{h}"));
            }
            FieldValue::Bounds(Bounds {
                position: Point::new(x, y),
                size: Point::new(w, h),
            })
        }
        FieldKind::Offsets => {
            let [x, y, w, h] = parse_ints::<4>(raw)?;
            FieldValue::Offsets(Offsets {
                offset: Point::new(x, y),
                original_size: Point::new(w, h),
            })
        }
    })
}

fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    raw.parse::<bool>()
        .map_err(|_| format!("expected `true` or `false`, got {raw:?}"))
}

fn parse_int(raw: &str) -> std::result::Result<i32, String> {
    raw.trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid integer {raw:?}: {e}"))
}

fn parse_filter(raw: &str) -> std::result::Result<Filter, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `min,mag`, got {raw:?}"))?;
    Ok(Filter {
        x: x.trim().to_string(),
        y: y.trim().to_string(),
    })
}

/// `true` is a quarter turn, `false` none, anything else is degrees.
pub fn parse_angle(raw: &str) -> std::result::Result<Angle, String> {
    if let Ok(b) = raw.parse::<bool>() {
        return Ok(if b { Angle::QUARTER_TURN } else { Angle::ZERO });
    }
    let degrees: f64 = raw
        .parse()
        .map_err(|_| format!("expected a boolean or degrees, got {raw:?}"))?;
    if !degrees.is_finite() {
        return Err(format!("angle must be finite, got {raw:?}"));
    }
    Ok(Angle(degrees))
}

fn parse_ints<const N: usize>(raw: &str) -> std::result::Result<[i32; N], String> {
    let mut out = [0i32; N];
    let mut tokens = raw.split(',');
    for slot in out.iter_mut() {
        let tok = tokens
            .next()
            .ok_or_else(|| format!("expected {N} comma-separated integers, got {raw:?}"))?;
        *slot = parse_int(tok)?;
    }
    if tokens.next().is_some() {
        return Err(format!(
            "expected {N} comma-separated integers, got {raw:?}"
        ));
    }
    Ok(out)
}
