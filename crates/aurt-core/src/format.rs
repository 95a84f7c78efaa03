//! printf-style formatting over typed arguments.
//!
//! Generated code hands the runtime a format string and an array of
//! already-widened [`FormatArg`]s. Directives follow the C grammar
//! `%[flags][width][.precision][length]conversion`; length modifiers are
//! accepted and ignored because every integer argument is 64 bits wide.
//! A `*` width or precision consumes the next argument as in C: a negative
//! width left-justifies, a negative precision counts as absent.
//!
//! Supported conversions: `d i u x X o c s p %`.

use thiserror::Error;

/// One formatted argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg<'a> {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Single byte.
    Char(u8),
    /// Raw byte string, no terminator.
    Bytes(&'a [u8]),
    /// Pointer value.
    Ptr(usize),
}

/// Errors raised while interpreting a format string.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A directive needed an argument that was not supplied.
    #[error("missing argument for directive {position}")]
    MissingArgument {
        /// Zero-based argument position.
        position: usize,
    },
    /// The argument kind cannot be rendered by the conversion.
    #[error("argument {position} cannot be formatted with %{conversion}")]
    ArgumentMismatch {
        /// Zero-based argument position.
        position: usize,
        /// The conversion character.
        conversion: char,
    },
    /// Unsupported conversion character.
    #[error("unknown conversion %{conversion} at byte {offset}")]
    UnknownConversion {
        /// The conversion character.
        conversion: char,
        /// Byte offset of the `%` that started the directive.
        offset: usize,
    },
    /// The format string ended inside a directive.
    #[error("incomplete directive at byte {offset}")]
    IncompleteDirective {
        /// Byte offset of the `%` that started the directive.
        offset: usize,
    },
    /// A boundary argument carried an unrecognised kind tag.
    #[error("argument {position} has unknown kind {kind}")]
    UnknownArgumentKind {
        /// Zero-based argument position.
        position: usize,
        /// The rejected tag.
        kind: i32,
    },
    /// More arguments were supplied than the format consumed.
    #[error("{supplied} arguments supplied but only {used} used")]
    UnusedArguments {
        /// Arguments consumed by directives.
        used: usize,
        /// Arguments supplied.
        supplied: usize,
    },
}

#[derive(Clone, Copy, Debug, Default)]
struct Directive {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
}

/// Format `fmt` with `args` into a fresh buffer.
pub fn format(fmt: &[u8], args: &[FormatArg<'_>]) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::with_capacity(fmt.len());
    format_into(&mut out, fmt, args)?;
    Ok(out)
}

/// Append the rendering of `fmt` with `args` to `out`.
///
/// Returns the number of bytes appended. On error `out` may hold a
/// partial rendering.
pub fn format_into(
    out: &mut Vec<u8>,
    fmt: &[u8],
    args: &[FormatArg<'_>],
) -> Result<usize, FormatError> {
    let start_len = out.len();
    let mut next_arg = 0usize;
    let mut i = 0usize;

    while i < fmt.len() {
        let b = fmt[i];
        if b != b'%' {
            let run_end = fmt[i..]
                .iter()
                .position(|&c| c == b'%')
                .map_or(fmt.len(), |p| i + p);
            out.extend_from_slice(&fmt[i..run_end]);
            i = run_end;
            continue;
        }

        let offset = i;
        i += 1;
        let incomplete = FormatError::IncompleteDirective { offset };
        let mut d = Directive::default();

        while let Some(&flag) = fmt.get(i) {
            match flag {
                b'-' => d.left = true,
                b'0' => d.zero = true,
                b'+' => d.plus = true,
                b' ' => d.space = true,
                b'#' => d.alt = true,
                _ => break,
            }
            i += 1;
        }
        if fmt.get(i) == Some(&b'*') {
            i += 1;
            let w = star_argument(args, &mut next_arg)?;
            d.left |= w < 0;
            d.width = usize::try_from(w.unsigned_abs()).unwrap_or(usize::MAX);
        } else {
            d.width = parse_decimal(fmt, &mut i);
        }
        if fmt.get(i) == Some(&b'.') {
            i += 1;
            if fmt.get(i) == Some(&b'*') {
                i += 1;
                let p = star_argument(args, &mut next_arg)?;
                d.precision = usize::try_from(p).ok();
            } else {
                d.precision = Some(parse_decimal(fmt, &mut i));
            }
        }
        while let Some(b'h' | b'l' | b'z' | b'j' | b't') = fmt.get(i) {
            i += 1;
        }

        let conv = *fmt.get(i).ok_or(incomplete)?;
        i += 1;

        if conv == b'%' {
            out.push(b'%');
            continue;
        }
        if !matches!(conv, b'd' | b'i' | b'u' | b'x' | b'X' | b'o' | b'c' | b's' | b'p') {
            return Err(FormatError::UnknownConversion {
                conversion: conv as char,
                offset,
            });
        }

        let position = next_arg;
        let arg = *args
            .get(position)
            .ok_or(FormatError::MissingArgument { position })?;
        next_arg += 1;
        let mismatch = FormatError::ArgumentMismatch {
            position,
            conversion: conv as char,
        };

        match conv {
            b'd' | b'i' => {
                let v = match arg {
                    FormatArg::Int(v) => v,
                    FormatArg::Uint(v) => v as i64,
                    FormatArg::Char(v) => i64::from(v),
                    _ => return Err(mismatch),
                };
                let sign: &[u8] = if v < 0 {
                    b"-"
                } else if d.plus {
                    b"+"
                } else if d.space {
                    b" "
                } else {
                    b""
                };
                let digits = render_digits(v.unsigned_abs(), 10, false, d.precision);
                emit_number(out, &d, sign, &digits);
            }
            b'u' | b'x' | b'X' | b'o' => {
                let v = match arg {
                    FormatArg::Int(v) => v as u64,
                    FormatArg::Uint(v) => v,
                    FormatArg::Char(v) => u64::from(v),
                    _ => return Err(mismatch),
                };
                let (radix, upper) = match conv {
                    b'x' => (16, false),
                    b'X' => (16, true),
                    b'o' => (8, false),
                    _ => (10, false),
                };
                let mut digits = render_digits(v, radix, upper, d.precision);
                let prefix: &[u8] = match conv {
                    b'x' if d.alt && v != 0 => b"0x",
                    b'X' if d.alt && v != 0 => b"0X",
                    _ => b"",
                };
                if conv == b'o' && d.alt && digits.first() != Some(&b'0') {
                    digits.insert(0, b'0');
                }
                emit_number(out, &d, prefix, &digits);
            }
            b'c' => {
                let c = match arg {
                    FormatArg::Char(c) => c,
                    FormatArg::Int(v) => v as u8,
                    FormatArg::Uint(v) => v as u8,
                    _ => return Err(mismatch),
                };
                emit_padded(out, &d, &[c]);
            }
            b's' => {
                let FormatArg::Bytes(s) = arg else {
                    return Err(mismatch);
                };
                let s = match d.precision {
                    Some(p) if p < s.len() => &s[..p],
                    _ => s,
                };
                emit_padded(out, &d, s);
            }
            b'p' => {
                let v = match arg {
                    FormatArg::Ptr(p) => p as u64,
                    FormatArg::Uint(v) => v,
                    _ => return Err(mismatch),
                };
                let digits = render_digits(v, 16, false, None);
                emit_number(out, &Directive { zero: false, ..d }, b"0x", &digits);
            }
            _ => unreachable!("conversion checked above"),
        }
    }

    if next_arg < args.len() {
        return Err(FormatError::UnusedArguments {
            used: next_arg,
            supplied: args.len(),
        });
    }
    Ok(out.len() - start_len)
}

/// Consume the next argument as a `*` width or precision.
fn star_argument(args: &[FormatArg<'_>], next_arg: &mut usize) -> Result<i64, FormatError> {
    let position = *next_arg;
    let arg = args
        .get(position)
        .ok_or(FormatError::MissingArgument { position })?;
    *next_arg += 1;
    match *arg {
        FormatArg::Int(v) => Ok(v),
        FormatArg::Uint(v) => Ok(i64::try_from(v).unwrap_or(i64::MAX)),
        _ => Err(FormatError::ArgumentMismatch {
            position,
            conversion: '*',
        }),
    }
}

fn parse_decimal(fmt: &[u8], i: &mut usize) -> usize {
    let mut n = 0usize;
    while let Some(&c) = fmt.get(*i) {
        if !c.is_ascii_digit() {
            break;
        }
        n = n.saturating_mul(10).saturating_add(usize::from(c - b'0'));
        *i += 1;
    }
    n
}

/// Digits of `v` in `radix`, left-padded with zeros to `precision`.
/// A zero value with precision 0 renders as nothing, as in C.
fn render_digits(mut v: u64, radix: u64, upper: bool, precision: Option<usize>) -> Vec<u8> {
    let table: &[u8; 16] = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };
    let mut digits = Vec::with_capacity(20);
    if v == 0 && precision == Some(0) {
        return digits;
    }
    loop {
        digits.push(table[(v % radix) as usize]);
        v /= radix;
        if v == 0 {
            break;
        }
    }
    let min = precision.unwrap_or(1);
    while digits.len() < min {
        digits.push(b'0');
    }
    digits.reverse();
    digits
}

fn emit_number(out: &mut Vec<u8>, d: &Directive, prefix: &[u8], digits: &[u8]) {
    let len = prefix.len() + digits.len();
    let pad = d.width.saturating_sub(len);
    if d.left {
        out.extend_from_slice(prefix);
        out.extend_from_slice(digits);
        out.resize(out.len() + pad, b' ');
    } else if d.zero && d.precision.is_none() {
        out.extend_from_slice(prefix);
        out.resize(out.len() + pad, b'0');
        out.extend_from_slice(digits);
    } else {
        out.resize(out.len() + pad, b' ');
        out.extend_from_slice(prefix);
        out.extend_from_slice(digits);
    }
}

fn emit_padded(out: &mut Vec<u8>, d: &Directive, body: &[u8]) {
    let pad = d.width.saturating_sub(body.len());
    if d.left {
        out.extend_from_slice(body);
        out.resize(out.len() + pad, b' ');
    } else {
        out.resize(out.len() + pad, b' ');
        out.extend_from_slice(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(fmt: &str, args: &[FormatArg<'_>]) -> String {
        String::from_utf8(format(fmt.as_bytes(), args).unwrap()).unwrap()
    }

    #[test]
    fn literal_text_passes_through() {
        assert_eq!(f("hello, world\n", &[]), "hello, world\n");
        assert_eq!(f("", &[]), "");
        assert_eq!(f("100%% sure", &[]), "100% sure");
    }

    #[test]
    fn signed_conversions() {
        assert_eq!(f("%d", &[FormatArg::Int(-42)]), "-42");
        assert_eq!(f("%i", &[FormatArg::Int(7)]), "7");
        assert_eq!(f("%+d", &[FormatArg::Int(7)]), "+7");
        assert_eq!(f("% d", &[FormatArg::Int(7)]), " 7");
        assert_eq!(f("%ld", &[FormatArg::Int(i64::MIN)]), "-9223372036854775808");
    }

    #[test]
    fn unsigned_conversions() {
        assert_eq!(f("%u", &[FormatArg::Uint(u64::MAX)]), "18446744073709551615");
        assert_eq!(f("%x", &[FormatArg::Uint(255)]), "ff");
        assert_eq!(f("%X", &[FormatArg::Uint(255)]), "FF");
        assert_eq!(f("%#x", &[FormatArg::Uint(255)]), "0xff");
        assert_eq!(f("%#x", &[FormatArg::Uint(0)]), "0");
        assert_eq!(f("%o", &[FormatArg::Uint(8)]), "10");
        assert_eq!(f("%#o", &[FormatArg::Uint(8)]), "010");
        assert_eq!(f("%u", &[FormatArg::Int(-1)]), "18446744073709551615");
    }

    #[test]
    fn width_and_flags() {
        assert_eq!(f("[%5d]", &[FormatArg::Int(42)]), "[   42]");
        assert_eq!(f("[%-5d]", &[FormatArg::Int(42)]), "[42   ]");
        assert_eq!(f("[%05d]", &[FormatArg::Int(-42)]), "[-0042]");
        assert_eq!(f("[%#06x]", &[FormatArg::Uint(255)]), "[0x00ff]");
    }

    #[test]
    fn precision() {
        assert_eq!(f("%.3d", &[FormatArg::Int(5)]), "005");
        assert_eq!(f("[%.0d]", &[FormatArg::Int(0)]), "[]");
        assert_eq!(f("[%6.3d]", &[FormatArg::Int(5)]), "[   005]");
        // Zero flag is ignored when a precision is given.
        assert_eq!(f("[%06.3d]", &[FormatArg::Int(5)]), "[   005]");
    }

    #[test]
    fn strings_and_chars() {
        assert_eq!(f("%s!", &[FormatArg::Bytes(b"bb")]), "bb!");
        assert_eq!(f("%.2s", &[FormatArg::Bytes(b"abcdef")]), "ab");
        assert_eq!(f("[%4s]", &[FormatArg::Bytes(b"ab")]), "[  ab]");
        assert_eq!(f("[%-4s]", &[FormatArg::Bytes(b"ab")]), "[ab  ]");
        assert_eq!(f("%c%c", &[FormatArg::Char(b'o'), FormatArg::Int(107)]), "ok");
    }

    #[test]
    fn pointers() {
        assert_eq!(f("%p", &[FormatArg::Ptr(0x1000)]), "0x1000");
        assert_eq!(f("%p", &[FormatArg::Ptr(0)]), "0x0");
    }

    #[test]
    fn length_modifiers_are_ignored() {
        assert_eq!(
            f(
                "%hhd %hd %lld %zu %lx",
                &[
                    FormatArg::Int(1),
                    FormatArg::Int(2),
                    FormatArg::Int(3),
                    FormatArg::Uint(4),
                    FormatArg::Uint(5),
                ]
            ),
            "1 2 3 4 5"
        );
    }

    #[test]
    fn raw_bytes_need_not_be_utf8() {
        let out = format(b"\xff%s\xfe", &[FormatArg::Bytes(b"\x80")]).unwrap();
        assert_eq!(out, b"\xff\x80\xfe");
    }

    #[test]
    fn format_into_appends_and_counts() {
        let mut out = b"> ".to_vec();
        let n = format_into(&mut out, b"%d", &[FormatArg::Int(123)]).unwrap();
        assert_eq!(n, 3);
        assert_eq!(out, b"> 123");
    }

    #[test]
    fn missing_argument() {
        assert_eq!(
            format(b"%d %d", &[FormatArg::Int(1)]),
            Err(FormatError::MissingArgument { position: 1 })
        );
    }

    #[test]
    fn mismatched_argument() {
        assert_eq!(
            format(b"%s", &[FormatArg::Int(1)]),
            Err(FormatError::ArgumentMismatch {
                position: 0,
                conversion: 's'
            })
        );
        assert!(format(b"%d", &[FormatArg::Bytes(b"x")]).is_err());
    }

    #[test]
    fn unknown_and_incomplete_directives() {
        assert_eq!(
            format(b"ab%q", &[FormatArg::Int(1)]),
            Err(FormatError::UnknownConversion {
                conversion: 'q',
                offset: 2
            })
        );
        assert_eq!(
            format(b"50%", &[]),
            Err(FormatError::IncompleteDirective { offset: 2 })
        );
        assert_eq!(
            format(b"%-08", &[]),
            Err(FormatError::IncompleteDirective { offset: 0 })
        );
    }

    #[test]
    fn unused_arguments() {
        assert_eq!(
            format(b"%d", &[FormatArg::Int(1), FormatArg::Int(2)]),
            Err(FormatError::UnusedArguments {
                used: 1,
                supplied: 2
            })
        );
    }

    #[test]
    fn star_width_and_precision_consume_arguments() {
        assert_eq!(f("[%*d]", &[FormatArg::Int(5), FormatArg::Int(42)]), "[   42]");
        assert_eq!(f("[%*d]", &[FormatArg::Int(-5), FormatArg::Int(42)]), "[42   ]");
        assert_eq!(
            f("[%.*s]", &[FormatArg::Int(3), FormatArg::Bytes(b"abcdef")]),
            "[abc]"
        );
        assert_eq!(
            f("[%.*s]", &[FormatArg::Int(-1), FormatArg::Bytes(b"abcdef")]),
            "[abcdef]"
        );
        assert_eq!(
            f("[%*.*d]", &[FormatArg::Uint(6), FormatArg::Int(4), FormatArg::Int(7)]),
            "[  0007]"
        );
    }

    #[test]
    fn star_needs_an_integer_argument() {
        assert_eq!(
            format(b"%*d", &[FormatArg::Bytes(b"x"), FormatArg::Int(1)]),
            Err(FormatError::ArgumentMismatch {
                position: 0,
                conversion: '*'
            })
        );
        assert_eq!(
            format(b"%*d", &[FormatArg::Int(3)]),
            Err(FormatError::MissingArgument { position: 1 })
        );
    }
}
