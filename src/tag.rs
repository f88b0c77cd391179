//! Parser for the struct tag mini-language.
//!
//! A tag is a comma-separated list: the first element overrides the column
//! name (empty means no override), the remaining elements are options,
//! each either a bare keyword or a keyword with a parenthesized argument
//! list, e.g. `cost,optional,decimal(0,3)`.

use crate::error::{ErrorContext, ParquetError, Result};
use crate::node::{Compression, Encoding, TimeUnit};

/// One recognized tag option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOption {
    Optional,
    Compression(Compression),
    Encoding(Encoding),
    List,
    Enum,
    Uuid,
    Decimal { scale: i32, precision: i32 },
    Timestamp(TimeUnit),
}

/// A parsed tag string
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTag {
    pub name_override: Option<String>,
    pub options: Vec<TagOption>,
}

/// Parse a tag string. Unknown options and malformed argument lists are
/// schema-construction errors.
pub fn parse_tag(tag: &str) -> Result<ParsedTag> {
    let (name, mut rest) = split(tag);
    let name_override = if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    };

    let mut options = Vec::new();
    while !rest.is_empty() {
        let (option, tail) = split(rest);
        rest = tail;
        options.push(parse_option(option)?);
    }

    Ok(ParsedTag {
        name_override,
        options,
    })
}

fn parse_option(s: &str) -> Result<TagOption> {
    let (option, args) = split_option_args(s);

    match option {
        "optional" => Ok(TagOption::Optional),

        "snappy" => Ok(TagOption::Compression(Compression::Snappy)),
        "gzip" => Ok(TagOption::Compression(Compression::Gzip)),
        "brotli" => Ok(TagOption::Compression(Compression::Brotli)),
        "lz4" => Ok(TagOption::Compression(Compression::Lz4Raw)),
        "zstd" => Ok(TagOption::Compression(Compression::Zstd)),

        "plain" => Ok(TagOption::Encoding(Encoding::Plain)),
        "dict" => Ok(TagOption::Encoding(Encoding::RleDictionary)),
        "delta" => Ok(TagOption::Encoding(Encoding::DeltaBinaryPacked)),

        "list" => Ok(TagOption::List),
        "enum" => Ok(TagOption::Enum),
        "uuid" => Ok(TagOption::Uuid),

        "decimal" => {
            let (scale, precision) = parse_decimal_args(args)?;
            Ok(TagOption::Decimal { scale, precision })
        }

        "timestamp" => parse_timestamp_args(args).map(TagOption::Timestamp),

        _ => Err(ParquetError::schema(format!(
            "unrecognized option {:?} in parquet tag",
            option
        ))),
    }
}

// Splits on the next comma outside of parentheses, so argument lists like
// `decimal(0,3)` stay in one element.
fn split(s: &str) -> (&str, &str) {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return (&s[..i], &s[i + 1..]),
            _ => {}
        }
    }
    (s, "")
}

fn split_option_args(s: &str) -> (&str, &str) {
    match s.find('(') {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, "()"),
    }
}

fn strip_parens(args: &str) -> Result<&str> {
    args.strip_prefix('(')
        .and_then(|a| a.strip_suffix(')'))
        .ok_or_else(|| ParquetError::schema(format!("malformed option args: {}", args)))
}

fn parse_decimal_args(args: &str) -> Result<(i32, i32)> {
    let inner = strip_parens(args)?;
    let mut parts = inner.split(',');
    let (scale, precision) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scale), Some(precision), None) => (scale, precision),
        _ => {
            return Err(ParquetError::schema(format!(
                "malformed decimal args: {}",
                args
            )))
        }
    };
    let scale = scale
        .parse::<i32>()
        .with_context(|| format!("malformed decimal args: {}", args))?;
    let precision = precision
        .parse::<i32>()
        .with_context(|| format!("malformed decimal args: {}", args))?;
    Ok((scale, precision))
}

fn parse_timestamp_args(args: &str) -> Result<TimeUnit> {
    let inner = strip_parens(args)?;
    match inner {
        "millisecond" => Ok(TimeUnit::Millis),
        "microsecond" => Ok(TimeUnit::Micros),
        "nanosecond" => Ok(TimeUnit::Nanos),
        _ => Err(ParquetError::schema(format!(
            "unknown timestamp unit: {:?}",
            inner
        ))),
    }
}
