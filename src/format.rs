//! Value-label format specifiers such as `"{:.1f}"`, `"{:.1f}%"` or `"${:.2f}"`.
//!
//! A specifier is literal text around exactly one `{...}` placeholder.
//! `{{` and `}}` produce literal braces. Inside the placeholder an optional
//! `:` introduces `[+][,][.N][f|%]`:
//!
//! - `+` always print a sign
//! - `,` group the integer part in thousands
//! - `.N` digits after the decimal point
//! - `f` fixed point (6 digits when `.N` is absent), `%` percentage
//!
//! An empty placeholder prints the shortest representation that round-trips
//! (`50.0`, `75.5`).

use crate::error::{GaugeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Shortest,
    Fixed,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Spec {
    plus: bool,
    grouping: bool,
    precision: Option<usize>,
    kind: Kind,
}

const DEFAULT_PRECISION: usize = 6;

/// A compiled value format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFormat {
    prefix: String,
    spec: Spec,
    suffix: String,
}

impl ValueFormat {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| GaugeError::InvalidFormat {
            spec: input.to_string(),
            reason: reason.to_string(),
        };

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut placeholder: Option<String> = None;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            let out = if placeholder.is_some() { &mut suffix } else { &mut prefix };
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    if placeholder.is_some() {
                        return Err(invalid("more than one placeholder"));
                    }
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => return Err(invalid("nested '{' in placeholder")),
                            Some(c) => body.push(c),
                            None => return Err(invalid("unterminated placeholder")),
                        }
                    }
                    placeholder = Some(body);
                }
                '}' => return Err(invalid("unmatched '}'")),
                c => out.push(c),
            }
        }

        let body = placeholder.ok_or_else(|| invalid("missing '{}' placeholder"))?;
        let spec = parse_spec(&body).map_err(|reason| invalid(reason))?;
        Ok(Self { prefix, spec, suffix })
    }

    pub fn render(&self, value: f64) -> String {
        let Spec { plus, grouping, precision, kind } = self.spec;
        let mut body = match kind {
            Kind::Shortest => format!("{:?}", value),
            Kind::Fixed => format!("{:.*}", precision.unwrap_or(DEFAULT_PRECISION), value),
            Kind::Percent => format!(
                "{:.*}%",
                precision.unwrap_or(DEFAULT_PRECISION),
                value * 100.0
            ),
        };
        if grouping {
            body = group_thousands(&body);
        }
        if plus && !body.starts_with('-') {
            body.insert(0, '+');
        }
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

impl std::str::FromStr for ValueFormat {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self> {
        ValueFormat::parse(s)
    }
}

fn parse_spec(body: &str) -> std::result::Result<Spec, &'static str> {
    // Positional index 0 is the only argument there is.
    let body = body.strip_prefix('0').unwrap_or(body);
    let mut spec = Spec {
        plus: false,
        grouping: false,
        precision: None,
        kind: Kind::Shortest,
    };
    if body.is_empty() {
        return Ok(spec);
    }
    let mut rest = body
        .strip_prefix(':')
        .ok_or("placeholder must be empty or start with ':'")?;

    if let Some(r) = rest.strip_prefix('+') {
        spec.plus = true;
        rest = r;
    }
    if let Some(r) = rest.strip_prefix(',') {
        spec.grouping = true;
        rest = r;
    }
    if let Some(r) = rest.strip_prefix('.') {
        let digits = r.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return Err("'.' must be followed by a precision");
        }
        spec.precision = Some(r[..digits].parse().map_err(|_| "precision out of range")?);
        rest = &r[digits..];
    }
    spec.kind = match rest {
        "f" | "F" => Kind::Fixed,
        "%" => Kind::Percent,
        "" if spec.precision.is_some() => return Err("precision requires a type ('f' or '%')"),
        "" => Kind::Shortest,
        _ => return Err("unsupported format type"),
    };
    Ok(spec)
}

fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let int_len = unsigned.chars().take_while(char::is_ascii_digit).count();
    let (int_part, tail) = unsigned.split_at(int_len);
    let mut grouped = String::with_capacity(number.len() + int_len / 3);
    grouped.push_str(sign);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push_str(tail);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(spec: &str, value: f64) -> String {
        ValueFormat::parse(spec).unwrap().render(value)
    }

    #[test]
    fn formats_documented_examples() {
        assert_eq!(render("{:.0f}", 50.0), "50");
        assert_eq!(render("{:.1f}%", 75.5), "75.5%");
        assert_eq!(render("${:.2f}", 99.99), "$99.99");
        assert_eq!(render("{:.1f}", 42.0), "42.0");
    }

    #[test]
    fn empty_placeholder_prints_shortest_float() {
        assert_eq!(render("{}", 50.0), "50.0");
        assert_eq!(render("{}", 75.5), "75.5");
        assert_eq!(render("{0}", 1.25), "1.25");
    }

    #[test]
    fn supports_sign_grouping_and_percent() {
        assert_eq!(render("{:+.1f}", 3.0), "+3.0");
        assert_eq!(render("{:+.1f}", -3.0), "-3.0");
        assert_eq!(render("{:,.0f} rpm", 12345.0), "12,345 rpm");
        assert_eq!(render("{:,.2f}", -1234567.891), "-1,234,567.89");
        assert_eq!(render("{:.0%}", 0.25), "25%");
        assert_eq!(render("{:f}", 1.5), "1.500000");
    }

    #[test]
    fn escaped_braces_are_literal() {
        assert_eq!(render("{{{:.0f}}}", 7.0), "{7}");
    }

    #[test]
    fn rejects_malformed_specifiers() {
        for bad in ["", "value", "{", "{:.1f", "}{:.0f}", "{:.1f}{}", "{:.x}", "{:.2}", "{:d}", "{x}"] {
            assert!(
                matches!(ValueFormat::parse(bad), Err(GaugeError::InvalidFormat { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
