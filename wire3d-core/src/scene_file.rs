/// Line-oriented scene description parser
///
/// ```text
/// # comment
/// box     <width> <height> <cx> <cy> <cz> <color> [spin]
/// pyramid <size> <cx> <cy> <cz> <color> [spin]
/// grid    <count> <cell_size> [color]
/// ```
///
/// Colours are either a name known to [`Color::named`] or `#rrggbb`.
use std::path::Path;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{alpha1, digit1, space1},
    combinator::{all_consuming, map, map_res, opt},
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::geometry::{Color, Shape};
use crate::scene::Scene;
use crate::transform::Vec3;

/// Largest accepted grid side; a grid holds `count * count` vertices
pub const MAX_GRID_COUNT: usize = 1024;

#[derive(Debug, Error)]
pub enum SceneFileError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: unknown colour `{name}`")]
    UnknownColor { line: usize, name: String },
    #[error("line {line}: {message}")]
    InvalidDimension { line: usize, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColorToken<'a> {
    Hex(Color),
    Name(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
enum Entry<'a> {
    Cuboid {
        width: f32,
        height: f32,
        center: Vec3,
        color: ColorToken<'a>,
        spin: bool,
    },
    Pyramid {
        size: f32,
        center: Vec3,
        color: ColorToken<'a>,
        spin: bool,
    },
    Grid {
        count: usize,
        cell_size: f32,
        color: Option<ColorToken<'a>>,
    },
}

/// Read and parse a scene file
pub fn load_scene(path: impl AsRef<Path>, config: &Config) -> Result<Scene, SceneFileError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let scene = parse_scene(&source, config)?;
    info!(path = %path.display(), shapes = scene.len(), "Loaded scene file");
    Ok(scene)
}

/// Parse scene text; grids are placed on the configured floor
pub fn parse_scene(source: &str, config: &Config) -> Result<Scene, SceneFileError> {
    let mut scene = Scene::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let entry = match all_consuming(entry)(text) {
            Ok((_, entry)) => entry,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(SceneFileError::Syntax {
                    line,
                    message: syntax_message(text, e.input),
                });
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(SceneFileError::Syntax {
                    line,
                    message: "unexpected end of line".to_string(),
                });
            }
        };

        scene.push(build_shape(entry, line, config)?);
    }

    Ok(scene)
}

fn syntax_message(text: &str, rest: &str) -> String {
    let rest = rest.trim_start();
    if rest.is_empty() {
        format!("incomplete entry `{}`", text)
    } else {
        format!("unexpected `{}`", rest)
    }
}

fn build_shape(entry: Entry<'_>, line: usize, config: &Config) -> Result<Shape, SceneFileError> {
    let shape = match entry {
        Entry::Cuboid {
            width,
            height,
            center,
            color,
            spin,
        } => {
            positive(width, "width", line)?;
            positive(height, "height", line)?;
            finite_center(center, line)?;
            with_spin(Shape::cuboid(width, height, center, resolve(color, line)?), spin)
        }
        Entry::Pyramid {
            size,
            center,
            color,
            spin,
        } => {
            positive(size, "size", line)?;
            finite_center(center, line)?;
            with_spin(Shape::pyramid(size, center, resolve(color, line)?), spin)
        }
        Entry::Grid {
            count,
            cell_size,
            color,
        } => {
            if count == 0 || count > MAX_GRID_COUNT {
                return Err(SceneFileError::InvalidDimension {
                    line,
                    message: format!(
                        "grid count must be between 1 and {}, got {}",
                        MAX_GRID_COUNT, count
                    ),
                });
            }
            positive(cell_size, "cell size", line)?;
            let color = match color {
                Some(token) => resolve(token, line)?,
                None => Color::GREY,
            };
            Shape::grid_floor(count, cell_size, config.floor_height(), color)
        }
    };
    Ok(shape)
}

fn with_spin(shape: Shape, spin: bool) -> Shape {
    if spin {
        shape.spinning()
    } else {
        shape
    }
}

fn positive(value: f32, what: &str, line: usize) -> Result<(), SceneFileError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneFileError::InvalidDimension {
            line,
            message: format!("{} must be positive, got {}", what, value),
        })
    }
}

fn finite_center(center: Vec3, line: usize) -> Result<(), SceneFileError> {
    if center.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(SceneFileError::InvalidDimension {
            line,
            message: format!(
                "centre must be finite, got ({}, {}, {})",
                center.x, center.y, center.z
            ),
        })
    }
}

fn resolve(token: ColorToken<'_>, line: usize) -> Result<Color, SceneFileError> {
    match token {
        ColorToken::Hex(color) => Ok(color),
        ColorToken::Name(name) => Color::named(name).ok_or_else(|| SceneFileError::UnknownColor {
            line,
            name: name.to_string(),
        }),
    }
}

fn entry(input: &str) -> IResult<&str, Entry<'_>> {
    alt((cuboid, pyramid, grid))(input)
}

fn cuboid(input: &str) -> IResult<&str, Entry<'_>> {
    let (input, _) = tag("box")(input)?;
    let (input, (width, height, center, color, spin)) =
        tuple((number, number, vector3, color, spin_flag))(input)?;
    Ok((
        input,
        Entry::Cuboid {
            width,
            height,
            center,
            color,
            spin,
        },
    ))
}

fn pyramid(input: &str) -> IResult<&str, Entry<'_>> {
    let (input, _) = tag("pyramid")(input)?;
    let (input, (size, center, color, spin)) = tuple((number, vector3, color, spin_flag))(input)?;
    Ok((
        input,
        Entry::Pyramid {
            size,
            center,
            color,
            spin,
        },
    ))
}

fn grid(input: &str) -> IResult<&str, Entry<'_>> {
    let (input, _) = tag("grid")(input)?;
    let (input, (count, cell_size, color)) = tuple((count, number, opt(color)))(input)?;
    Ok((
        input,
        Entry::Grid {
            count,
            cell_size,
            color,
        },
    ))
}

fn number(input: &str) -> IResult<&str, f32> {
    preceded(space1, float)(input)
}

fn count(input: &str) -> IResult<&str, usize> {
    preceded(space1, map_res(digit1, str::parse))(input)
}

fn vector3(input: &str) -> IResult<&str, Vec3> {
    map(tuple((number, number, number)), |(x, y, z)| Vec3::new(x, y, z))(input)
}

fn hex_byte(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |hex| {
        u8::from_str_radix(hex, 16)
    })(input)
}

fn color(input: &str) -> IResult<&str, ColorToken<'_>> {
    let hex = map(
        preceded(tag("#"), tuple((hex_byte, hex_byte, hex_byte))),
        |(r, g, b)| ColorToken::Hex(Color::rgb(r, g, b)),
    );
    preceded(space1, alt((hex, map(alpha1, ColorToken::Name))))(input)
}

fn spin_flag(input: &str) -> IResult<&str, bool> {
    map(opt(preceded(space1, tag("spin"))), |flag| flag.is_some())(input)
}
