use std::str::FromStr;

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of file, expected '{exp}'")]
    UnexpectedEof { exp: char },

    #[error("Expected '{exp}', but got '{got}'")]
    UnexpectedToken { exp: char, got: char },

    #[error("Expected \"{exp}\", but got \"{got}\"")]
    UnexpectedSlice { exp: String, got: String },
}

/// Consumes the slice until a non-ascii whitespace character is reached.
pub fn take_ws(bytes: &[u8]) -> &[u8] {
    let i = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());

    &bytes[i..]
}

/// Consumes spaces and tabs only, leaving linebreaks in place.
pub fn take_blanks(bytes: &[u8]) -> &[u8] {
    let i = bytes
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(bytes.len());

    &bytes[i..]
}

/// Takes the next character from the slice. If none is found, the slice is left as-is.
pub const fn take_1(bytes: &[u8]) -> (Option<u8>, &[u8]) {
    let [b, bytes @ ..] = bytes else {
        return (None, bytes);
    };

    (Some(*b), bytes)
}

/// Like `take_1`, but doesn't consume the token
pub fn peek_1(bytes: &[u8]) -> Option<u8> {
    bytes.first().copied()
}

/// Expects the next character in `bytes` to be `b`. Otherwise leaves `bytes` unchanged.
pub fn expect(b: u8, bytes: &[u8]) -> ParseResult<&[u8]> {
    let (Some(a), rest) = take_1(bytes) else {
        return Err(ParseError::UnexpectedEof { exp: b as char });
    };

    if a != b {
        return Err(ParseError::UnexpectedToken {
            exp: b as char,
            got: a as char,
        });
    }

    Ok(rest)
}

/// Expects `bytes` to start with `bs`.
pub fn expect_slice<'a>(bs: &[u8], bytes: &'a [u8]) -> ParseResult<&'a [u8]> {
    match bytes.strip_prefix(bs) {
        Some(rest) => Ok(rest),
        None => {
            let n = bs.len().min(bytes.len());

            Err(ParseError::UnexpectedSlice {
                exp: String::from_utf8_lossy(bs).to_string(),
                got: String::from_utf8_lossy(&bytes[..n]).to_string(),
            })
        }
    }
}

/// Advance the slice until `P` is satisfied, without consuming the matching byte.
///
/// If `P` is never satisfied, the whole slice is taken. Returns `None` when nothing would be
/// taken.
#[inline]
pub fn take_until_fn<P>(p: P, bytes: &[u8]) -> (Option<&[u8]>, &[u8])
where
    P: Fn(u8) -> bool,
{
    let i = bytes.iter().position(|&a| p(a)).unwrap_or(bytes.len());

    if i == 0 {
        (None, bytes)
    } else {
        let (res, bytes) = bytes.split_at(i);

        (Some(res), bytes)
    }
}

/// Advance the slice until byte `b` is found, without consuming it.
pub fn take_until(b: u8, bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    take_until_fn(|a| a == b, bytes)
}

/// Like `take_until`, but stops at the first ascii whitespace character found, without consuming
/// it.
pub fn take_until_ws(bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    take_until_fn(|a| a.is_ascii_whitespace(), bytes)
}

/// Like `take_until`, but also consumes `b` without adding it to the output.
pub fn take_with(b: u8, bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    let (res, bytes) = take_until(b, bytes);
    let bytes = match peek_1(bytes) {
        Some(a) if a == b => &bytes[1..],
        _ => bytes,
    };

    (res, bytes)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Bytes are not valid UTF-8")]
    InvalidUtf8,

    #[error("Failed to convert \"{str}\"")]
    ParseError { str: String },
}

/// Converts `&[u8]` to `T` if `T: FromStr`. Surrounding whitespace is ignored.
pub fn convert<T: FromStr>(bytes: &[u8]) -> Result<T, ConvertError> {
    let str = std::str::from_utf8(bytes).map_err(|_| ConvertError::InvalidUtf8)?;
    let str = str.trim();

    str.parse::<T>().map_err(|_| ConvertError::ParseError {
        str: str.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_ws_full_ws() {
        let bytes = b"  ";

        let res = take_ws(bytes);

        assert_eq!(res, b"")
    }

    #[test]
    fn take_until_runs_to_end() {
        assert_eq!(take_until_ws(b"B3/S23"), (Some(&b"B3/S23"[..]), &b""[..]));
        assert_eq!(take_until(b',', b",x"), (None, &b",x"[..]));
    }

    #[test]
    fn take_with_consumes_delimiter() {
        assert_eq!(take_with(b'\n', b"abc\ndef"), (Some(&b"abc"[..]), &b"def"[..]));
        assert_eq!(take_with(b'\n', b"abc"), (Some(&b"abc"[..]), &b""[..]));
    }

    #[test]
    fn expect_reports_mismatch() {
        assert_eq!(expect(b'x', b"x = 1"), Ok(&b" = 1"[..]));
        assert_eq!(
            expect(b'x', b"y"),
            Err(ParseError::UnexpectedToken { exp: 'x', got: 'y' })
        );
        assert_eq!(expect(b'x', b""), Err(ParseError::UnexpectedEof { exp: 'x' }));
        assert!(expect_slice(b"rule", b"rile").is_err());
    }

    #[test]
    fn convert_trims() {
        assert_eq!(convert::<i32>(b" 12\r"), Ok(12));
        assert_eq!(
            convert::<i32>(b"1x"),
            Err(ConvertError::ParseError { str: "1x".into() })
        );
    }
}
