use thiserror::Error;
use tracing::warn;

use crate::Coord;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseError;
use crate::rule_set;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;

#[derive(Default, Debug)]
pub struct RleFile<'a> {
    pub name: Option<&'a [u8]>,
    pub author: Option<&'a [u8]>,

    /// Top left corner of the pattern, from a `#P` or `#R` line
    pub offset: Option<Coord>,

    /// Bounding box from the header line
    pub size: Option<(u32, u32)>,

    /// Rule from a `#r` line or the header line, the header taking precedence
    pub rule: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleError {
    #[error("Comment line error: {0}")]
    CommentLine(#[from] RleCommentLineError),

    #[error("Header line error: {0}")]
    HeaderLine(#[from] RleHeaderLineError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] RleEncodingError),
}

/// Parse the RLE file format, calling `f` with the coordinate of every live cell. Rows grow
/// downwards. Assumes the bytes are valid Ascii.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle<F>(mut bytes: &'_ [u8], f: F) -> Result<RleFile<'_>, RleError>
where
    F: FnMut(Coord),
{
    let mut file = RleFile::default();

    // Parse as many comment lines as possible
    loop {
        let res = read_line_comment(parse_util::take_ws(bytes))?;
        let (Some(line), rest) = res else { break };

        match line {
            RleCommentLine::Comment => {}
            RleCommentLine::Name { name } => {
                if file.name.is_some() {
                    warn!("RLE file name already defined. Using latest");
                }

                file.name = Some(name);
            }
            RleCommentLine::Author { author } => {
                if file.author.is_some() {
                    warn!("RLE author already defined. Using latest");
                }

                file.author = Some(author);
            }
            RleCommentLine::Offset { x, y } => {
                if file.offset.is_some() {
                    warn!("RLE offset already defined. Using latest");
                }

                file.offset = Some((x, y))
            }
            RleCommentLine::Rule { rule } => {
                file.rule = Some(rule);
            }
        }

        bytes = rest;
    }

    bytes = parse_util::take_ws(bytes);

    // Parse header line, if it's present
    let res = read_line_header(bytes)?;
    if let (Some(header), rest) = res {
        let RleHeaderLine { x, y, rule } = header;

        file.size = Some((x, y));
        if rule.is_some() {
            file.rule = rule;
        }

        bytes = rest;
    }

    let (dx, dy) = file.offset.unwrap_or_default();

    read_encoding(bytes, dx, dy, f)?;

    Ok(file)
}

enum RleCommentLine<'a> {
    Comment,
    Name { name: &'a [u8] },
    Author { author: &'a [u8] },
    Offset { x: i32, y: i32 },
    Rule { rule: RuleSet },
}

#[derive(Debug, Error)]
pub enum RleCommentLineError {
    #[error("No comment type")]
    NoType,

    #[error("Empty name line")]
    EmptyName,

    #[error("Empty author line")]
    EmptyAuthor,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Invalid offset: {0}")]
    InvalidOffset(#[source] ConvertError),

    #[error("Missing offset coordinate")]
    MissingOffset,

    #[error("Invalid comment type, found '{got}'")]
    InvalidType { got: char },
}

/// Attempt to parse a comment line, otherwise leaves `bytes` as-is.
fn read_line_comment(
    bytes: &'_ [u8],
) -> Result<(Option<RleCommentLine<'_>>, &'_ [u8]), RleCommentLineError> {
    let Ok(bytes) = parse_util::expect(b'#', bytes) else {
        return Ok((None, bytes));
    };

    let (Some(b), bytes) = parse_util::take_1(bytes) else {
        return Err(RleCommentLineError::NoType);
    };

    match b {
        // Comment line
        b'C' | b'c' => {
            let (_, bytes) = parse_util::take_with(b'\n', bytes);

            Ok((Some(RleCommentLine::Comment), bytes))
        }

        // Pattern name
        b'N' => {
            let bytes = parse_util::take_blanks(bytes);
            let (name, bytes) = parse_util::take_with(b'\n', bytes);
            let Some(name) = name.map(<[u8]>::trim_ascii).filter(|n| !n.is_empty()) else {
                return Err(RleCommentLineError::EmptyName);
            };

            Ok((Some(RleCommentLine::Name { name }), bytes))
        }

        // Pattern author
        b'O' => {
            let bytes = parse_util::take_blanks(bytes);
            let (author, bytes) = parse_util::take_with(b'\n', bytes);
            let Some(author) = author.map(<[u8]>::trim_ascii).filter(|a| !a.is_empty()) else {
                return Err(RleCommentLineError::EmptyAuthor);
            };

            Ok((Some(RleCommentLine::Author { author }), bytes))
        }

        // Pattern offset, as two whitespace separated integers
        b'R' | b'P' => {
            let bytes = parse_util::take_blanks(bytes);
            let (Some(x), bytes) = parse_util::take_until_ws(bytes) else {
                return Err(RleCommentLineError::MissingOffset);
            };

            let bytes = parse_util::take_blanks(bytes);
            let (Some(y), bytes) = parse_util::take_until_ws(bytes) else {
                return Err(RleCommentLineError::MissingOffset);
            };

            let x = parse_util::convert(x).map_err(RleCommentLineError::InvalidOffset)?;
            let y = parse_util::convert(y).map_err(RleCommentLineError::InvalidOffset)?;
            let (_, bytes) = parse_util::take_with(b'\n', bytes);

            Ok((Some(RleCommentLine::Offset { x, y }), bytes))
        }

        // Pattern rules
        b'r' => {
            let bytes = parse_util::take_blanks(bytes);
            let (rule, bytes) = rule_set::parse_rule(bytes)?;
            let (_, bytes) = parse_util::take_with(b'\n', bytes);

            Ok((Some(RleCommentLine::Rule { rule }), bytes))
        }

        b => Err(RleCommentLineError::InvalidType { got: b as char }),
    }
}

struct RleHeaderLine {
    x: u32,
    y: u32,
    rule: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleHeaderLineError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Invalid token: expected ',' or a linebreak, found '{got}'")]
    InvalidToken { got: char },

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),
}

/// Attempt to parse a header line, otherwise leaves `bytes` as-is.
fn read_line_header(bytes: &[u8]) -> Result<(Option<RleHeaderLine>, &[u8]), RleHeaderLineError> {
    let Ok(((x, y), rest)) = read_coordinates(bytes) else {
        return Ok((None, bytes));
    };

    let rest = parse_util::take_blanks(rest);

    match parse_util::peek_1(rest) {
        Some(b',') => {
            let bytes = parse_util::take_ws(&rest[1..]);
            let bytes = parse_util::expect_slice(b"rule", bytes)?;
            let bytes = parse_util::take_ws(bytes);
            let bytes = parse_util::expect(b'=', bytes)?;
            let bytes = parse_util::take_ws(bytes);

            let (rule, bytes) = rule_set::parse_rule(bytes)?;

            let line = RleHeaderLine {
                x,
                y,
                rule: Some(rule),
            };

            Ok((Some(line), bytes))
        }
        None | Some(b'\r' | b'\n') => {
            let line = RleHeaderLine { x, y, rule: None };

            Ok((Some(line), rest))
        }
        Some(b) => Err(RleHeaderLineError::InvalidToken { got: b as char }),
    }
}

#[derive(Debug, Error)]
pub enum RleEncodingError {
    #[error("Unexpected EOF, missing '!'")]
    UnexpectedEof,

    #[error("Failed to convert run length: {0}")]
    RunLength(#[from] ConvertError),

    #[error("Run count is split from its tag")]
    SplitRun,

    #[error("Unrecognized byte: 0x{got:0X}")]
    UnrecognizedByte { got: u8 },

    #[error("Cell coordinate out of range")]
    OutOfRange,
}

fn advance(a: i32, b: i32) -> Result<i32, RleEncodingError> {
    a.checked_add(b).ok_or(RleEncodingError::OutOfRange)
}

fn read_encoding<F>(mut bytes: &[u8], dx: i32, dy: i32, mut f: F) -> Result<(), RleEncodingError>
where
    F: FnMut(Coord),
{
    let mut rep: i32 = 1;

    let (mut x, mut y) = (0, 0);

    loop {
        let Some(b) = parse_util::peek_1(bytes) else {
            return Err(RleEncodingError::UnexpectedEof);
        };

        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                bytes = &bytes[1..];
            }

            // End of input
            b'!' => break,

            // Dead cell
            b'b' => {
                bytes = &bytes[1..];

                x = advance(x, rep)?;
                rep = 1;
            }

            // Live cell
            b'o' => {
                bytes = &bytes[1..];

                let row = advance(dy, y)?;
                let end = advance(x, rep)?;
                for col in x..end {
                    f((advance(dx, col)?, row))
                }

                x = end;
                rep = 1;
            }

            // End of line
            b'$' => {
                bytes = &bytes[1..];

                y = advance(y, rep)?;
                x = 0;
                rep = 1;
            }

            n if n.is_ascii_digit() => {
                let (Some(n), rest) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes)
                else {
                    unreachable!("We peeked and found a digit")
                };
                bytes = rest;

                if let Some(b'\r' | b'\n') = parse_util::peek_1(bytes) {
                    return Err(RleEncodingError::SplitRun);
                };

                rep = parse_util::convert(n)?;
            }

            b => return Err(RleEncodingError::UnrecognizedByte { got: b }),
        }
    }

    Ok(())
}

fn read_coordinates(bytes: &[u8]) -> Result<((u32, u32), &[u8]), RleCoordError> {
    let bytes = parse_util::expect(b'x', bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    let (Some(x_bytes), bytes) = parse_util::take_with(b',', bytes) else {
        return Err(RleCoordError::NoX);
    };
    let x = parse_util::convert(x_bytes).map_err(RleCoordError::ParseX)?;

    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'y', bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    // Coordinates can be terminated with either `,` or a linebreak.
    let p = |b| b == b',' || b == b'\n' || b == b'\r';
    let (Some(y_bytes), bytes) = parse_util::take_until_fn(p, bytes) else {
        return Err(RleCoordError::NoY);
    };
    let y = parse_util::convert(y_bytes).map_err(RleCoordError::ParseY)?;

    Ok(((x, y), bytes))
}

#[derive(Debug, Error)]
enum RleCoordError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Expected x coordinate, found end of input")]
    NoX,

    #[error("Failed to parse x coordinate: {0}")]
    ParseX(#[source] ConvertError),

    #[error("Expected y coordinate, found end of input")]
    NoY,

    #[error("Failed to parse y coordinate: {0}")]
    ParseY(#[source] ConvertError),
}

#[cfg(test)]
mod test {
    use crate::rule_set::B3S23;

    use super::*;

    fn collect(bytes: &[u8]) -> (RleFile<'_>, Vec<Coord>) {
        let mut cells = Vec::new();
        let file = read_rle(bytes, |c| cells.push(c)).unwrap();

        (file, cells)
    }

    #[test]
    fn read_coordinates() {
        let bytes = b"x = 1, y = 1\n";
        let ((x, y), rest) = super::read_coordinates(bytes.as_slice()).unwrap();

        assert_eq!((x, y), (1, 1));
        assert_eq!(rest, b"\n");
    }

    #[test]
    fn glider() {
        let (file, cells) =
            collect(b"#N Glider\n#O Richard K. Guy\nx = 3, y = 3, rule = B3/S23\nbob$2bo$3o!\n");

        assert_eq!(file.name, Some(&b"Glider"[..]));
        assert_eq!(file.author, Some(&b"Richard K. Guy"[..]));
        assert_eq!(file.size, Some((3, 3)));
        assert_eq!(file.rule, Some(B3S23));
        assert_eq!(cells, vec![(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn offset_and_blank_rows() {
        let (file, cells) = collect(b"#P 10 -2\nx = 1, y = 3\no2$o!");

        assert_eq!(file.offset, Some((10, -2)));
        assert_eq!(file.rule, None);
        assert_eq!(cells, vec![(10, -2), (10, 0)]);
    }

    #[test]
    fn crlf_and_nameless_rule() {
        let (file, cells) = collect(b"#r 23/3\r\nx = 2, y = 1\r\n2o!\r\n");

        assert_eq!(file.rule, Some(RuleSet::new(0b1100, 0b1000)));
        assert_eq!(cells, vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn missing_terminator() {
        let res = read_rle(b"x = 1, y = 1\no", |_| {});

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::UnexpectedEof))
        ));
    }

    #[test]
    fn unknown_tag() {
        let res = read_rle(b"x = 1, y = 1\nz!", |_| {});

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::UnrecognizedByte { got: b'z' }))
        ));
    }

    #[test]
    fn offset_past_i32_max() {
        let mut cells = Vec::new();
        let res = read_rle(b"#P 2147483647 0\nx = 2, y = 1\n2o!", |c| cells.push(c));

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::OutOfRange))
        ));
        assert_eq!(cells, vec![(i32::MAX, 0)]);
    }

    #[test]
    fn run_lengths_past_i32_max() {
        let res = read_rle(b"x = 1, y = 1\n2147483647b2b!", |_| {});
        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::OutOfRange))
        ));

        let res = read_rle(b"x = 1, y = 1\n2147483647$2$o!", |_| {});
        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::OutOfRange))
        ));
    }
}
