//! Header dictionary grammar.
//!
//! The header is a Python dict literal such as
//! `{'descr': '<f4', 'fortran_order': False, 'shape': (240, 400), }`
//! padded with spaces and terminated by a newline. It is parsed with a small
//! fixed grammar into [`NpyHeader`]:
//!
//! ```text
//! dict  := '{' entry (',' entry)* ','? '}'
//! entry := string ':' value
//! value := string | 'True' | 'False' | '(' int (',' int)* ','? ')'
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, value},
    multi::separated_list0,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};

use crate::error::{DecodeError, DecodeResult};

/// The only dtype accepted: little-endian float32.
pub const FLOAT32_LE: &str = "<f4";

/// Typed header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    pub descr: String,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum HeaderValue {
    Str(String),
    Bool(bool),
    Tuple(Vec<usize>),
}

impl NpyHeader {
    /// Parse header text into typed fields.
    pub fn parse(text: &str) -> DecodeResult<Self> {
        let entries = match header_dict(text) {
            Ok((_, entries)) => entries,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(DecodeError::InvalidHeader(format!(
                    "unexpected input at {:?}",
                    snippet(e.input)
                )))
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(DecodeError::InvalidHeader("incomplete header".to_string()))
            }
        };

        let mut descr = None;
        let mut fortran_order = None;
        let mut shape = None;

        for (key, val) in entries {
            match (key, val) {
                ("descr", HeaderValue::Str(s)) => set_once(&mut descr, s, "descr")?,
                ("fortran_order", HeaderValue::Bool(b)) => {
                    set_once(&mut fortran_order, b, "fortran_order")?
                }
                ("shape", HeaderValue::Tuple(dims)) => set_once(&mut shape, dims, "shape")?,
                ("descr", other) | ("fortran_order", other) | ("shape", other) => {
                    return Err(DecodeError::InvalidHeader(format!(
                        "'{}' has the wrong type: {:?}",
                        key, other
                    )))
                }
                (unknown, _) => {
                    tracing::trace!(key = unknown, "Ignoring unknown npy header key");
                }
            }
        }

        Ok(Self {
            descr: descr.ok_or(DecodeError::MissingKey("descr"))?,
            fortran_order: fortran_order.ok_or(DecodeError::MissingKey("fortran_order"))?,
            shape: shape.ok_or(DecodeError::MissingKey("shape"))?,
        })
    }

    /// Rows and columns of a 2-D float32 array.
    pub fn dims(&self) -> DecodeResult<(usize, usize)> {
        match self.shape.as_slice() {
            [rows, cols] if *rows > 0 && *cols > 0 => Ok((*rows, *cols)),
            _ => Err(DecodeError::InvalidShape(self.shape.clone())),
        }
    }

    pub fn check_dtype(&self) -> DecodeResult<()> {
        if self.descr == FLOAT32_LE {
            Ok(())
        } else {
            Err(DecodeError::UnsupportedDtype(self.descr.clone()))
        }
    }

    /// Render the header back to its dict literal (unpadded).
    pub fn to_literal(&self) -> String {
        let dims: Vec<String> = self.shape.iter().map(|d| d.to_string()).collect();
        let shape = if dims.len() == 1 {
            format!("({},)", dims[0])
        } else {
            format!("({})", dims.join(", "))
        };
        format!(
            "{{'descr': '{}', 'fortran_order': {}, 'shape': {}, }}",
            self.descr,
            if self.fortran_order { "True" } else { "False" },
            shape
        )
    }
}

fn set_once<T>(slot: &mut Option<T>, val: T, key: &str) -> DecodeResult<()> {
    if slot.is_some() {
        return Err(DecodeError::InvalidHeader(format!("duplicate key '{}'", key)));
    }
    *slot = Some(val);
    Ok(())
}

fn snippet(input: &str) -> String {
    input.chars().take(24).collect()
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
    ))(input)
}

fn boolean(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("True")), value(false, tag("False"))))(input)
}

fn dimension(input: &str) -> IResult<&str, usize> {
    delimited(multispace0, map_res(digit1, str::parse::<usize>), multispace0)(input)
}

fn shape_tuple(input: &str) -> IResult<&str, Vec<usize>> {
    delimited(
        char('('),
        terminated(
            separated_list0(char(','), dimension),
            opt(terminated(char(','), multispace0)),
        ),
        preceded(multispace0, char(')')),
    )(input)
}

fn header_value(input: &str) -> IResult<&str, HeaderValue> {
    alt((
        map(quoted, |s| HeaderValue::Str(s.to_string())),
        map(boolean, HeaderValue::Bool),
        map(shape_tuple, HeaderValue::Tuple),
    ))(input)
}

fn entry(input: &str) -> IResult<&str, (&str, HeaderValue)> {
    delimited(
        multispace0,
        separated_pair(
            quoted,
            delimited(multispace0, char(':'), multispace0),
            header_value,
        ),
        multispace0,
    )(input)
}

fn header_dict(input: &str) -> IResult<&str, Vec<(&str, HeaderValue)>> {
    all_consuming(delimited(
        preceded(multispace0, char('{')),
        terminated(separated_list0(char(','), entry), opt(char(','))),
        delimited(multispace0, char('}'), multispace0),
    ))(input)
}
