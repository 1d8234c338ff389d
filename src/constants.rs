//! Constant table extraction
//!
//! The codelet generator declares its constants in the C companion output as
//! `DK(KP866025403, +0.866025403784438646763723170752936183471402627);` (or
//! `DVK(...)` for vector codelets). Everything else in that file is ignored.

use crate::ast::Constant;
use crate::error::{CompileError, CompileResult};

/// Declaration tags recognised in the companion file
pub const DECLARATION_TAGS: [&str; 2] = ["DK(", "DVK("];

/// True if the trimmed line starts with a declaration tag.
pub fn is_declaration(line: &str) -> bool {
    DECLARATION_TAGS.iter().any(|tag| line.starts_with(tag))
}

/// Collect every declared constant in file order.
pub fn extract_constants(source: &str) -> CompileResult<Vec<Constant>> {
    let mut constants = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if is_declaration(trimmed) {
            constants.push(parse_declaration(idx + 1, trimmed)?);
        }
    }

    Ok(constants)
}

/// Parse `TAG(Name, Value);`. The caller has checked the tag.
fn parse_declaration(line_no: usize, line: &str) -> CompileResult<Constant> {
    let fail = |msg: &str| CompileError::constant(line_no, line, msg);

    let body = DECLARATION_TAGS
        .iter()
        .find_map(|tag| line.strip_prefix(tag))
        .and_then(|rest| rest.strip_suffix(");"))
        .ok_or_else(|| fail("expected `TAG(Name, Value);`"))?;

    let (name, value) = body
        .split_once(',')
        .ok_or_else(|| fail("expected a name and a value separated by `,`"))?;
    let (name, value) = (name.trim(), value.trim());

    if !is_identifier(name) {
        return Err(fail("constant name is not an identifier"));
    }
    if !is_signed_decimal(value) {
        return Err(fail("constant value is not a signed decimal literal"));
    }

    Ok(Constant::literal(name, value))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `[+-]digits[.digits][e[+-]digits]`, with digits on at least one side of the point.
fn is_signed_decimal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = !(whole.is_empty() && fraction.is_empty()) && all_digits(whole) && all_digits(fraction);

    let exponent_ok = match exponent {
        Some(exponent) => {
            let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            !digits.is_empty() && all_digits(digits)
        }
        None => true,
    };

    mantissa_ok && exponent_ok
}
