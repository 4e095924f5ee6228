//! Built-in stylesheet functions: color constructors, color operations, and
//! image filters that are passed through to the renderer untouched.

use crate::error::EvalError;
use mapstyle_types::{Color, StyleValue};

/// Image filter calls. These evaluate to [`StyleValue::Function`] so the
/// renderer can apply them, keeping argument order.
const IMAGE_FILTERS: &[&str] = &[
    "agg-stack-blur",
    "blur",
    "color-to-alpha",
    "colorize-alpha",
    "edge-detect",
    "emboss",
    "gray",
    "invert",
    "scale-hsla",
    "sharpen",
    "sobel",
    "x-gradient",
    "y-gradient",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFunction {
    Rgb,
    Rgba,
    Hsl,
    Hsla,
    Lighten,
    Darken,
    FadeIn,
    FadeOut,
    ImageFilter(&'static str),
}

impl BuiltinFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "rgb" => BuiltinFunction::Rgb,
            "rgba" => BuiltinFunction::Rgba,
            "hsl" => BuiltinFunction::Hsl,
            "hsla" => BuiltinFunction::Hsla,
            "lighten" => BuiltinFunction::Lighten,
            "darken" => BuiltinFunction::Darken,
            "fadein" => BuiltinFunction::FadeIn,
            "fadeout" => BuiltinFunction::FadeOut,
            other => {
                return IMAGE_FILTERS
                    .iter()
                    .copied()
                    .find(|f| *f == other)
                    .map(BuiltinFunction::ImageFilter);
            }
        };
        Some(func)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinFunction::Rgb => "rgb",
            BuiltinFunction::Rgba => "rgba",
            BuiltinFunction::Hsl => "hsl",
            BuiltinFunction::Hsla => "hsla",
            BuiltinFunction::Lighten => "lighten",
            BuiltinFunction::Darken => "darken",
            BuiltinFunction::FadeIn => "fadein",
            BuiltinFunction::FadeOut => "fadeout",
            BuiltinFunction::ImageFilter(name) => name,
        }
    }

    fn arity(&self) -> (usize, usize) {
        match self {
            BuiltinFunction::Rgb | BuiltinFunction::Hsl => (3, 3),
            BuiltinFunction::Rgba | BuiltinFunction::Hsla => (4, 4),
            BuiltinFunction::Lighten
            | BuiltinFunction::Darken
            | BuiltinFunction::FadeIn
            | BuiltinFunction::FadeOut => (2, 2),
            BuiltinFunction::ImageFilter(_) => (0, usize::MAX),
        }
    }

    pub fn check_arity(&self, got: usize) -> Result<(), EvalError> {
        let (min, max) = self.arity();
        if got < min || got > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            return Err(EvalError::Arity {
                function: self.name().to_string(),
                expected,
                got,
            });
        }
        Ok(())
    }

    /// Applies the function to already evaluated arguments. Arguments of the
    /// wrong type yield `Null` rather than an error, since this runs per feature.
    pub fn apply(&self, args: Vec<StyleValue>) -> StyleValue {
        let num = |i: usize| args.get(i).and_then(StyleValue::as_number);
        let color = |i: usize| args.get(i).and_then(StyleValue::as_color);
        let result = match self {
            BuiltinFunction::Rgb => {
                Some(Color::rgb(channel(num(0)), channel(num(1)), channel(num(2))))
            }
            BuiltinFunction::Rgba => num(3).map(|a| {
                Color::rgba(channel(num(0)), channel(num(1)), channel(num(2)), a as f32)
            }),
            BuiltinFunction::Hsl => match (num(0), num(1), num(2)) {
                (Some(h), Some(s), Some(l)) => Some(Color::from_hsla(h, percent(s), percent(l), 1.0)),
                _ => None,
            },
            BuiltinFunction::Hsla => match (num(0), num(1), num(2), num(3)) {
                (Some(h), Some(s), Some(l), Some(a)) => {
                    Some(Color::from_hsla(h, percent(s), percent(l), a as f32))
                }
                _ => None,
            },
            BuiltinFunction::Lighten => color(0).zip(num(1)).map(|(c, n)| c.lighten(percent(n))),
            BuiltinFunction::Darken => color(0).zip(num(1)).map(|(c, n)| c.darken(percent(n))),
            BuiltinFunction::FadeIn => color(0).zip(num(1)).map(|(c, n)| c.fade(percent(n) as f32)),
            BuiltinFunction::FadeOut => {
                color(0).zip(num(1)).map(|(c, n)| c.fade(-percent(n) as f32))
            }
            BuiltinFunction::ImageFilter(name) => {
                let args = args.into_iter().map(coerce_color).collect();
                return StyleValue::Function {
                    name: name.to_string(),
                    args,
                };
            }
        };
        result.map(StyleValue::Color).unwrap_or_default()
    }
}

fn channel(value: Option<f64>) -> u8 {
    value.unwrap_or(0.0).round().clamp(0.0, 255.0) as u8
}

/// Percent arguments arrive with their `%` unit dropped.
fn percent(value: f64) -> f64 {
    value / 100.0
}

/// Color keywords passed to filters are normalised to colors.
fn coerce_color(value: StyleValue) -> StyleValue {
    match value {
        StyleValue::Keyword(ref word) => Color::from_name(word)
            .map(StyleValue::Color)
            .unwrap_or(value),
        other => other,
    }
}
