//! Message formatting
//!
//! Turns a variadic argument list into a single line. When the first
//! argument is a string carrying printf-style specifiers, exactly that many
//! following arguments are substituted into it and any extra arguments are
//! appended. When substitution fails, every argument is stringified and
//! joined with spaces instead, so formatting never fails the caller.
//!
//! Supported conversions: `d i u c x X o e E f g G q s`, with the
//! `- + space # 0` flags, a width and a precision. `%%` is a literal percent.

use serde::Serialize;
use serde_json::Value;

/// Widths and precisions above this are rejected rather than allocated
const MAX_FIELD_WIDTH: usize = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormatFailure {
    MissingArgument,
    TypeMismatch,
    OutOfRange,
    FieldTooWide,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    alt: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conv: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Percent,
    Spec(Spec),
}

/// Convert any serializable value into a formatter argument
///
/// Values that cannot be represented (maps with non-string keys, for
/// instance) become `null`.
pub fn to_arg<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Format an argument list into one message
///
/// # Examples
///
/// ```
/// use cc_logger::core::formatter::format_message;
/// use serde_json::json;
///
/// assert_eq!(format_message(&[json!("%d items"), json!(3)]), "3 items");
/// assert_eq!(format_message(&[json!("loaded"), json!({"id": 7})]), "loaded {\"id\":7}");
/// assert_eq!(
///     format_message(&[json!("value: %d items"), json!("not-a-number")]),
///     "value: %d items not-a-number"
/// );
/// ```
pub fn format_message(args: &[Value]) -> String {
    let Some((first, rest)) = args.split_first() else {
        return String::new();
    };

    if let Value::String(template) = first {
        let pieces = parse_template(template);
        let wanted = pieces
            .iter()
            .filter(|piece| matches!(piece, Piece::Spec(_)))
            .count();

        if wanted > 0 {
            if rest.len() < wanted {
                return join_raw(args);
            }
            return match substitute(&pieces, &rest[..wanted]) {
                Ok(mut message) => {
                    for extra in &rest[wanted..] {
                        message.push(' ');
                        message.push_str(&stringify_value(extra));
                    }
                    message
                }
                Err(_) => join_raw(args),
            };
        }
    }

    join_raw(args)
}

/// Number of argument-consuming specifiers in `template` (`%%` excluded)
pub fn count_specifiers(template: &str) -> usize {
    parse_template(template)
        .iter()
        .filter(|piece| matches!(piece, Piece::Spec(_)))
        .count()
}

/// Readable rendering of a single value
///
/// Strings render raw, `null` renders as `nil`, and maps and arrays render as
/// compact literals so nested values stay legible.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::from("nil"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

fn join_raw(args: &[Value]) -> String {
    args.iter()
        .map(stringify_value)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_template(template: &str) -> Vec<Piece<'_>> {
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        if i > literal_start {
            pieces.push(Piece::Literal(&template[literal_start..i]));
        }
        match parse_spec(&bytes[i + 1..]) {
            Some((piece, consumed)) => {
                pieces.push(piece);
                i += 1 + consumed;
            }
            None => {
                // Not a conversion; keep the percent sign as text
                pieces.push(Piece::Literal("%"));
                i += 1;
            }
        }
        literal_start = i;
    }

    if literal_start < bytes.len() {
        pieces.push(Piece::Literal(&template[literal_start..]));
    }
    pieces
}

fn parse_spec(bytes: &[u8]) -> Option<(Piece<'static>, usize)> {
    if bytes.first() == Some(&b'%') {
        return Some((Piece::Percent, 1));
    }

    let mut spec = Spec::default();
    let mut pos = 0;
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'-' => spec.left = true,
            b'+' => spec.plus = true,
            b' ' => spec.space = true,
            b'#' => spec.alt = true,
            b'0' => spec.zero = true,
            _ => break,
        }
        pos += 1;
    }

    let (width, used) = read_number(&bytes[pos..]);
    spec.width = width;
    pos += used;

    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let (precision, used) = read_number(&bytes[pos..]);
        spec.precision = Some(precision.unwrap_or(0));
        pos += used;
    }

    let conv = *bytes.get(pos)?;
    if !b"diucxXoeEfgGqs".contains(&conv) {
        return None;
    }
    spec.conv = conv as char;
    Some((Piece::Spec(spec), pos + 1))
}

fn read_number(bytes: &[u8]) -> (Option<usize>, usize) {
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return (None, 0);
    }
    let value = bytes[..digits].iter().fold(0usize, |acc, b| {
        acc.saturating_mul(10).saturating_add(usize::from(b - b'0'))
    });
    (Some(value), digits)
}

fn substitute(pieces: &[Piece<'_>], args: &[Value]) -> Result<String, FormatFailure> {
    let mut out = String::new();
    let mut args = args.iter();

    for piece in pieces {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Percent => out.push('%'),
            Piece::Spec(spec) => {
                let arg = args.next().ok_or(FormatFailure::MissingArgument)?;
                out.push_str(&render_spec(spec, arg)?);
            }
        }
    }
    Ok(out)
}

fn render_spec(spec: &Spec, arg: &Value) -> Result<String, FormatFailure> {
    if spec.width.unwrap_or(0) > MAX_FIELD_WIDTH || spec.precision.unwrap_or(0) > MAX_FIELD_WIDTH {
        return Err(FormatFailure::FieldTooWide);
    }

    match spec.conv {
        'd' | 'i' | 'u' => Ok(format_integer(spec, to_integer(arg)?)),
        'x' | 'X' | 'o' => Ok(format_unsigned(spec, to_integer(arg)?)),
        'c' => {
            let code = to_integer(arg)?;
            let ch = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or(FormatFailure::OutOfRange)?;
            Ok(pad(spec, "", &ch.to_string(), false))
        }
        'e' | 'E' | 'f' | 'g' | 'G' => Ok(format_float(spec, to_float(arg)?)),
        'q' => Ok(pad(spec, "", &quote(arg), false)),
        _ => {
            let text = stringify_value(arg);
            let text = match spec.precision {
                Some(limit) => text.chars().take(limit).collect(),
                None => text,
            };
            Ok(pad(spec, "", &text, false))
        }
    }
}

fn to_integer(arg: &Value) -> Result<i64, FormatFailure> {
    match arg {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).map_err(|_| FormatFailure::OutOfRange)
            } else {
                float_to_integer(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Ok(i)
            } else {
                let f = parse_finite(trimmed).ok_or(FormatFailure::TypeMismatch)?;
                float_to_integer(f)
            }
        }
        _ => Err(FormatFailure::TypeMismatch),
    }
}

fn float_to_integer(f: f64) -> Result<i64, FormatFailure> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(FormatFailure::OutOfRange)
    }
}

fn to_float(arg: &Value) -> Result<f64, FormatFailure> {
    match arg {
        Value::Number(n) => n.as_f64().ok_or(FormatFailure::TypeMismatch),
        Value::String(s) => parse_finite(s.trim()).ok_or(FormatFailure::TypeMismatch),
        _ => Err(FormatFailure::TypeMismatch),
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn sign_for(spec: &Spec, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

fn apply_precision(digits: String, precision: Option<usize>, is_zero: bool) -> String {
    match precision {
        Some(0) if is_zero => String::new(),
        Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
        _ => digits,
    }
}

fn format_integer(spec: &Spec, value: i64) -> String {
    let magnitude = value.unsigned_abs();
    let digits = apply_precision(magnitude.to_string(), spec.precision, magnitude == 0);
    pad(spec, sign_for(spec, value < 0), &digits, spec.precision.is_none())
}

fn format_unsigned(spec: &Spec, value: i64) -> String {
    // Negative values print as their two's complement bit pattern
    let bits = value as u64;
    let digits = match spec.conv {
        'x' => format!("{bits:x}"),
        'X' => format!("{bits:X}"),
        _ => format!("{bits:o}"),
    };
    let digits = apply_precision(digits, spec.precision, bits == 0);
    let prefix = match (spec.alt && bits != 0, spec.conv) {
        (true, 'x') => "0x",
        (true, 'X') => "0X",
        (true, _) if !digits.starts_with('0') => "0",
        _ => "",
    };
    pad(spec, prefix, &digits, spec.precision.is_none())
}

fn format_float(spec: &Spec, value: f64) -> String {
    let negative = value.is_sign_negative() && !value.is_nan();
    let magnitude = value.abs();
    let sign = sign_for(spec, negative);

    if !magnitude.is_finite() {
        let text = if magnitude.is_nan() { "nan" } else { "inf" };
        let text = if spec.conv.is_ascii_uppercase() {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        return pad(spec, sign, &text, false);
    }

    let precision = spec.precision.unwrap_or(6);
    let body = match spec.conv {
        'f' => format!("{:.*}", precision, magnitude),
        'e' | 'E' => exponential(magnitude, precision, spec.conv == 'E'),
        _ => general(magnitude, precision, spec.alt, spec.conv == 'G'),
    };
    pad(spec, sign, &body, true)
}

/// `1.500000e+02` style, with a signed exponent of at least two digits
fn exponential(value: f64, precision: usize, upper: bool) -> String {
    let raw = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let marker = if upper { 'E' } else { 'e' };
    format!("{mantissa}{marker}{sign}{:02}", exponent.abs())
}

fn general(value: f64, precision: usize, alt: bool, upper: bool) -> String {
    let precision = precision.max(1);
    let exponent = if value == 0.0 {
        0
    } else {
        let raw = format!("{:.*e}", precision - 1, value);
        raw.split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };

    let body = if exponent < -4 || exponent >= precision as i32 {
        exponential(value, precision - 1, upper)
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        format!("{:.*}", decimals, value)
    };

    if alt {
        body
    } else {
        strip_trailing_zeros(&body)
    }
}

fn strip_trailing_zeros(body: &str) -> String {
    let (number, suffix) = match body.find(['e', 'E']) {
        Some(idx) => body.split_at(idx),
        None => (body, ""),
    };
    if !number.contains('.') {
        return body.to_string();
    }
    let trimmed = number.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}{suffix}")
}

fn quote(arg: &Value) -> String {
    let Value::String(s) = arg else {
        return stringify_value(arg);
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn pad(spec: &Spec, prefix: &str, body: &str, zero_fill: bool) -> String {
    let len = prefix.chars().count() + body.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        return format!("{prefix}{body}");
    }

    let fill = width - len;
    if spec.left {
        format!("{prefix}{body}{}", " ".repeat(fill))
    } else if spec.zero && zero_fill {
        format!("{prefix}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{prefix}{body}", " ".repeat(fill))
    }
}
