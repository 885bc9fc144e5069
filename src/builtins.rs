//! Built-in validators
//!
//! General-purpose validators registered by [`Registry::with_builtins`]. Each
//! accepts both raw strings and already-coerced values, so a cleaned document
//! validates again under the same schema.
//!
//! [`Registry::with_builtins`]: crate::registry::Registry::with_builtins

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{OnceLock, RwLock};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::error::ValidationFailure;
use crate::registry::{Args, Registry, value_text};

type Outcome = Result<Value, ValidationFailure>;

/// Register every built-in validator
pub fn register_all(registry: &mut Registry) {
    registry.register("bool", string_boolean);
    registry.register("int", integer);
    registry.register("float", floating_number);
    registry.register("str", string);
    registry.register("match", matches_regex);
    registry.register("one_of", one_of);
    registry.register("ip", ip);
    registry.register("strict_date", strict_date);
    registry.register("strict_datetime", strict_datetime);
    registry.register("postal", postal);
    registry.register("uuid", uuid);
    registry.register("email", |value, _| pattern_check(value, "email", email_regex()));
    registry.register("domain", |value, _| pattern_check(value, "domain", domain_regex()));
    registry.register("mac", |value, _| pattern_check(value, "MAC address", mac_regex()));
    registry.register("md5", |value, _| hex_digest(value, "md5", 32));
    registry.register("sha1", |value, _| hex_digest(value, "sha1", 40));
    registry.register("sha224", |value, _| hex_digest(value, "sha224", 56));
    registry.register("sha256", |value, _| hex_digest(value, "sha256", 64));
    registry.register("sha512", |value, _| hex_digest(value, "sha512", 128));
    registry.register("slug", |value, _| pattern_check(value, "slug", slug_regex()));
    registry.register("list", list);
    registry.register("dict", dict);
}

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static DOMAIN_REGEX: OnceLock<Regex> = OnceLock::new();
static MAC_REGEX: OnceLock<Regex> = OnceLock::new();
static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
static HEX_REGEX: OnceLock<Regex> = OnceLock::new();
static MATCH_PATTERNS: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
            .expect("Failed to compile email regex")
    })
}

fn domain_regex() -> &'static Regex {
    DOMAIN_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
            .expect("Failed to compile domain regex")
    })
}

fn mac_regex() -> &'static Regex {
    MAC_REGEX.get_or_init(|| {
        Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("Failed to compile MAC regex")
    })
}

fn slug_regex() -> &'static Regex {
    SLUG_REGEX
        .get_or_init(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("Failed to compile slug regex"))
}

fn hex_regex() -> &'static Regex {
    HEX_REGEX.get_or_init(|| Regex::new(r"^[0-9A-Fa-f]+$").expect("Failed to compile hex regex"))
}

/// Compiled form of a `match` pattern, built once per distinct pattern
fn match_pattern(pattern: &str) -> Result<Regex, ValidationFailure> {
    let patterns = MATCH_PATTERNS.get_or_init(|| RwLock::new(HashMap::new()));
    if let Ok(cached) = patterns.read()
        && let Some(regex) = cached.get(pattern)
    {
        return Ok(regex.clone());
    }

    let regex = Regex::new(pattern).map_err(|e| {
        ValidationFailure::new(format!("Invalid regular expression {pattern}: {e}"))
    })?;
    if let Ok(mut cached) = patterns.write() {
        cached.insert(pattern.to_string(), regex.clone());
    }
    Ok(regex)
}

/// Determines the boolean value for a value
fn string_boolean(value: Value, _args: &Args<'_>) -> Outcome {
    let flag = match &value {
        Value::Bool(flag) => *flag,
        Value::String(text) => !matches!(text.to_lowercase().as_str(), "false" | "f" | "0" | ""),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    };
    Ok(Value::Bool(flag))
}

/// Returns back an integer from the given value, optionally bounded
fn integer(value: Value, args: &Args<'_>) -> Outcome {
    let number = match &value {
        Value::Number(number) => match number.as_i64() {
            Some(n) => n,
            None => number
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
                .ok_or_else(|| ValidationFailure::new(format!("{number} is not an integer")))?,
        },
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| {
            ValidationFailure::new(format!("invalid literal for int: '{text}'"))
        })?,
        Value::Bool(flag) => i64::from(*flag),
        other => {
            return Err(ValidationFailure::new(format!(
                "{other} cannot be converted to an integer"
            )));
        }
    };

    if let Some(minimum) = args.integer("minimum")?
        && number < minimum
    {
        if args.flag("pad") {
            return Ok(Value::from(minimum));
        }
        return Err(ValidationFailure::new(format!(
            "Provided value of {number} is below specified minimum of {minimum}"
        )));
    }
    if let Some(maximum) = args.integer("maximum")?
        && number > maximum
    {
        if args.flag("cut") {
            return Ok(Value::from(maximum));
        }
        return Err(ValidationFailure::new(format!(
            "Provided value of {number} is above specified maximum of {maximum}"
        )));
    }

    Ok(Value::from(number))
}

/// Returns back a float from the given value, optionally bounded
fn floating_number(value: Value, args: &Args<'_>) -> Outcome {
    let number = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
    .ok_or_else(|| ValidationFailure::new(format!("could not convert {value} to float")))?;

    let bounded = |f: f64| {
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| ValidationFailure::new(format!("{f} is not a finite float")))
    };

    if let Some(minimum) = args.number("minimum")?
        && number < minimum
    {
        if args.flag("pad") {
            return bounded(minimum);
        }
        return Err(ValidationFailure::new(format!(
            "Provided value of {number} is below specified minimum of {minimum}"
        )));
    }
    if let Some(maximum) = args.number("maximum")?
        && number > maximum
    {
        if args.flag("cut") {
            return bounded(maximum);
        }
        return Err(ValidationFailure::new(format!(
            "Provided value of {number} is above specified maximum of {maximum}"
        )));
    }

    bounded(number)
}

/// Returns back a string from the given value
///
/// `shortest`/`longest` bound the length in characters; `pad` names a fill
/// character used with `align` (`<`, `>` or `^`) to reach `shortest`, and `cut`
/// truncates to `longest`.
fn string(value: Value, args: &Args<'_>) -> Outcome {
    let mut text = value_text(&value);

    if let Some(shortest) = args.integer("shortest")? {
        let shortest = shortest.max(0) as usize;
        let length = text.chars().count();
        if length < shortest {
            match pad_fill(args) {
                Some(fill) => {
                    let align = args.text("align").unwrap_or_else(|| "<".to_string());
                    text = pad_text(&text, shortest - length, fill, &align);
                }
                None => {
                    return Err(ValidationFailure::new(format!(
                        "Provided value of {text} is shorter than specified shortest length of {shortest}"
                    )));
                }
            }
        }
    }
    if let Some(longest) = args.integer("longest")? {
        let longest = longest.max(0) as usize;
        if text.chars().count() > longest {
            if args.flag("cut") {
                text = text.chars().take(longest).collect();
            } else {
                return Err(ValidationFailure::new(format!(
                    "Provided value of {text} is longer than specified longest length of {longest}"
                )));
            }
        }
    }
    if args.flag("lower") {
        text = text.to_lowercase();
    }
    if args.flag("upper") {
        text = text.to_uppercase();
    }
    if args.flag("strip") {
        text = text.trim().to_string();
    }

    Ok(Value::String(text))
}

fn pad_fill(args: &Args<'_>) -> Option<char> {
    match args.get("pad")? {
        Value::Bool(true) => Some(' '),
        Value::String(fill) if fill.eq_ignore_ascii_case("true") => Some(' '),
        Value::String(fill) if !fill.is_empty() && !fill.eq_ignore_ascii_case("false") => {
            fill.chars().next()
        }
        _ => None,
    }
}

fn pad_text(text: &str, missing: usize, fill: char, align: &str) -> String {
    let padding = |count: usize| std::iter::repeat_n(fill, count).collect::<String>();
    match align {
        ">" => format!("{}{text}", padding(missing)),
        "^" => {
            let left = missing / 2;
            format!("{}{text}{}", padding(left), padding(missing - left))
        }
        _ => format!("{text}{}", padding(missing)),
    }
}

/// Returns back the value if the regex matches at its start
fn matches_regex(value: Value, args: &Args<'_>) -> Outcome {
    let pattern = args
        .get_or_positional("regex", 0)
        .map(value_text)
        .ok_or_else(|| ValidationFailure::new("match requires a regular expression"))?;
    let regex = match_pattern(&pattern)?;

    let text = value_text(&value);
    // The leftmost match starts at zero exactly when a match anchored at the start exists
    match regex.find(&text) {
        Some(found) if found.start() == 0 => Ok(value),
        _ => Err(ValidationFailure::new(format!(
            "Provided value of {text} does not match specified regular expression {pattern}"
        ))),
    }
}

/// Returns back the value if it is one of the positional arguments
fn one_of(value: Value, args: &Args<'_>) -> Outcome {
    let case_insensitive = args.flag_or("case_insensitive", true);
    let normalize = |text: String| {
        if case_insensitive {
            text.to_lowercase()
        } else {
            text
        }
    };

    let candidate = normalize(value_text(&value));
    let allowed: Vec<String> = args
        .positional()
        .iter()
        .map(|allowed| normalize(value_text(allowed)))
        .collect();

    if allowed.contains(&candidate) {
        Ok(value)
    } else {
        Err(ValidationFailure::new(format!(
            "Provided value of {} is not one of the supported values: {}",
            value_text(&value),
            allowed.join(", ")
        )))
    }
}

/// Returns back a normalized IP address, optionally bounded and version checked
fn ip(value: Value, args: &Args<'_>) -> Outcome {
    let text = value_text(&value);
    let address: IpAddr = text
        .trim()
        .parse()
        .map_err(|_| ValidationFailure::new(format!("{text} does not appear to be an IP address")))?;

    if let Some(version) = args.integer("version")? {
        let actual = if address.is_ipv4() { 4 } else { 6 };
        if actual != version {
            return Err(ValidationFailure::new(format!(
                "IP Address provided of {text} is IPv{actual} only IPv{version} is supported"
            )));
        }
    }

    let bound = |key: &str| -> Result<Option<IpAddr>, ValidationFailure> {
        args.text(key)
            .map(|raw| {
                raw.parse::<IpAddr>().map_err(|_| {
                    ValidationFailure::new(format!("Argument {key} is not an IP address: {raw}"))
                })
            })
            .transpose()
    };

    if let Some(minimum) = bound("minimum")?
        && address < minimum
    {
        if args.flag("pad") {
            return Ok(Value::String(minimum.to_string()));
        }
        return Err(ValidationFailure::new(format!(
            "IP Address provided of {text} is below specified minimum of {minimum}"
        )));
    }
    if let Some(maximum) = bound("maximum")?
        && address > maximum
    {
        if args.flag("cut") {
            return Ok(Value::String(maximum.to_string()));
        }
        return Err(ValidationFailure::new(format!(
            "IP Address provided of {text} is above specified maximum of {maximum}"
        )));
    }

    Ok(Value::String(address.to_string()))
}

/// Reformats a date that must match `input_format` exactly
fn strict_date(value: Value, args: &Args<'_>) -> Outcome {
    let input_format = args
        .text("input_format")
        .unwrap_or_else(|| "%Y-%m-%d".to_string());
    let output_format = args
        .text("output_format")
        .unwrap_or_else(|| input_format.clone());

    let text = value_text(&value);
    let date = NaiveDate::parse_from_str(text.trim(), &input_format).map_err(|e| {
        ValidationFailure::new(format!("{text} does not match format {input_format}: {e}"))
    })?;
    Ok(Value::String(date.format(&output_format).to_string()))
}

/// Reformats a date and time that must match `input_format` exactly
fn strict_datetime(value: Value, args: &Args<'_>) -> Outcome {
    let input_format = args
        .text("input_format")
        .unwrap_or_else(|| "%Y-%m-%d %H:%M".to_string());
    let output_format = args
        .text("output_format")
        .unwrap_or_else(|| input_format.clone());

    let text = value_text(&value);
    let moment = NaiveDateTime::parse_from_str(text.trim(), &input_format).map_err(|e| {
        ValidationFailure::new(format!("{text} does not match format {input_format}: {e}"))
    })?;
    Ok(Value::String(moment.format(&output_format).to_string()))
}

/// A very generic postal code validator that lets all international postal codes through
fn postal(value: Value, args: &Args<'_>) -> Outcome {
    let mut text = value_text(&value);
    if args.flag("strip") {
        text = text.trim().to_string();
    }

    let characters: Vec<char> = text.chars().collect();
    let length = characters.len();
    if length < 2 {
        return Err(ValidationFailure::new(format!(
            "Provided value {text} is shorter than any official postal code standard allows"
        )));
    }
    if length > 15 {
        return Err(ValidationFailure::new(format!(
            "Provided value {text} is longer than any official postal code standard allows"
        )));
    }

    let mut seen_separator = false;
    for (index, character) in characters.iter().enumerate() {
        if matches!(character, '-' | ' ') {
            if seen_separator {
                return Err(ValidationFailure::new(format!(
                    "Provided value contains more than one separator: {character}"
                )));
            }
            if index == 0 || index == length - 1 {
                return Err(ValidationFailure::new(format!(
                    "Provided value starts or ends with an invalid postal character: {character}"
                )));
            }
            seen_separator = true;
        } else if !character.is_alphanumeric() {
            return Err(ValidationFailure::new(format!(
                "Provided value {text} contains an invalid postal character: {character}"
            )));
        }
    }

    Ok(Value::String(text))
}

/// Returns back the hyphenated lowercase form of a UUID
fn uuid(value: Value, _args: &Args<'_>) -> Outcome {
    let text = value_text(&value);
    Uuid::parse_str(text.trim())
        .map(|parsed| Value::String(parsed.hyphenated().to_string()))
        .map_err(|e| ValidationFailure::new(format!("{text} is not a valid UUID: {e}")))
}

fn pattern_check(value: Value, kind: &str, regex: &Regex) -> Outcome {
    let text = value_text(&value);
    if regex.is_match(&text) {
        Ok(value)
    } else {
        Err(ValidationFailure::new(format!(
            "{text} is not a valid {kind}"
        )))
    }
}

fn hex_digest(value: Value, kind: &str, length: usize) -> Outcome {
    let text = value_text(&value);
    if text.len() == length && hex_regex().is_match(&text) {
        Ok(value)
    } else {
        Err(ValidationFailure::new(format!(
            "{text} is not a valid {kind} digest"
        )))
    }
}

/// Wraps a scalar into a single-element list
fn list(value: Value, _args: &Args<'_>) -> Outcome {
    Ok(match value {
        Value::Array(items) => Value::Array(items),
        Value::Null => Value::Array(Vec::new()),
        other => Value::Array(vec![other]),
    })
}

/// Accepts mappings only
fn dict(value: Value, _args: &Args<'_>) -> Outcome {
    match value {
        Value::Object(map) => Ok(Value::Object(map)),
        Value::Null => Ok(Value::Object(Map::new())),
        other => Err(ValidationFailure::new(format!(
            "{other} is not a mapping"
        ))),
    }
}
