//! Schema-driven random event generation
//!
//! Walks a JSON Schema document and produces a value satisfying the
//! constraints the walker understands: `type`, `enum`, `properties` /
//! `required` / `additionalProperties`, numeric `minimum` / `maximum`,
//! string `minLength` / `maxLength` / `pattern` / `format`, and array
//! `items` / `minItems` / `maxItems`. Constructs outside that subset fall
//! back to unconstrained values instead of failing: a stub source should
//! keep feeding the pipeline, not die on an exotic schema.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Number, Value};
use std::iter::Peekable;
use std::str::Chars;
use tracing::debug;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const WORD_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// Extra draws allowed for `*`, `+`, and `{n,}` quantifiers
const OPEN_REPEAT_EXTRA: usize = 3;

/// Random JSON value generator driven by a JSON Schema
pub struct SchemaGenerator {
    schema: Value,
    rng: StdRng,
}

impl SchemaGenerator {
    /// Create a generator seeded from entropy
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator with a fixed seed
    ///
    /// Reproducible except for `format: date-time` and `format: uuid`
    /// strings, which draw from the clock and OS entropy.
    pub fn with_seed(schema: Value, seed: u64) -> Self {
        Self {
            schema,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Schema this generator draws from
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Generate one value conforming to the schema
    pub fn generate(&mut self) -> Value {
        from_schema(&self.schema, &mut self.rng)
    }
}

fn from_schema(schema: &Value, rng: &mut StdRng) -> Value {
    let obj = match schema.as_object() {
        Some(obj) => obj,
        // Boolean schemas (`true`/`false`) and junk carry no constraints
        None => return Value::Null,
    };

    // enum wins over type
    if let Some(options) = obj.get("enum").and_then(Value::as_array) {
        if !options.is_empty() {
            let idx = rng.gen_range(0..options.len());
            return options[idx].clone();
        }
    }

    match pick_type(obj, rng) {
        Some(ty) => match ty.as_str() {
            "object" => gen_object(obj, rng),
            "string" => Value::String(gen_string(obj, rng)),
            "integer" => gen_integer(obj, rng),
            "number" => gen_number(obj, rng),
            "boolean" => Value::Bool(rng.gen_bool(0.5)),
            "array" => gen_array(obj, rng),
            "null" => Value::Null,
            other => {
                debug!("unsupported schema type '{}', generating null", other);
                Value::Null
            }
        },
        None => {
            if obj.contains_key("properties") {
                gen_object(obj, rng)
            } else {
                Value::Null
            }
        }
    }
}

fn pick_type(obj: &Map<String, Value>, rng: &mut StdRng) -> Option<String> {
    match obj.get("type") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(types)) if !types.is_empty() => {
            let idx = rng.gen_range(0..types.len());
            types[idx].as_str().map(str::to_string)
        }
        _ => None,
    }
}

fn gen_object(obj: &Map<String, Value>, rng: &mut StdRng) -> Value {
    let empty = Map::new();
    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let required: Vec<&str> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    // Required properties always appear; the remaining declared ones are a
    // coin flip each.
    let mut out = Map::new();
    for (name, prop_schema) in properties {
        if required.contains(&name.as_str()) || rng.gen_bool(0.5) {
            out.insert(name.clone(), from_schema(prop_schema, rng));
        }
    }

    // `required` binds independently of `properties` in draft 7, so a
    // required name with no declared entry still has to appear. An
    // object-valued `additionalProperties` supplies its shape, anything
    // else gets null.
    for name in required {
        if !out.contains_key(name) {
            let value = match obj.get("additionalProperties") {
                Some(schema) if schema.is_object() => from_schema(schema, rng),
                _ => Value::Null,
            };
            out.insert(name.to_string(), value);
        }
    }
    Value::Object(out)
}

fn gen_integer(obj: &Map<String, Value>, rng: &mut StdRng) -> Value {
    let min = obj
        .get("minimum")
        .and_then(Value::as_f64)
        .map(|f| f.ceil() as i64)
        .unwrap_or(0);
    let max = obj
        .get("maximum")
        .and_then(Value::as_f64)
        .map(|f| f.floor() as i64)
        .unwrap_or_else(|| min.saturating_add(100))
        .max(min);
    Value::Number(Number::from(rng.gen_range(min..=max)))
}

fn gen_number(obj: &Map<String, Value>, rng: &mut StdRng) -> Value {
    let min = obj.get("minimum").and_then(Value::as_f64).unwrap_or(0.0);
    let max = obj
        .get("maximum")
        .and_then(Value::as_f64)
        .unwrap_or(min + 100.0)
        .max(min);
    Number::from_f64(rng.gen_range(min..=max))
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn gen_string(obj: &Map<String, Value>, rng: &mut StdRng) -> String {
    if let Some(pattern) = obj.get("pattern").and_then(Value::as_str) {
        return gen_pattern_string(pattern, rng);
    }

    if let Some(format) = obj.get("format").and_then(Value::as_str) {
        match format {
            "date-time" => return chrono::Utc::now().to_rfc3339(),
            "uuid" => return uuid::Uuid::new_v4().to_string(),
            _ => {}
        }
    }

    let min = obj
        .get("minLength")
        .and_then(Value::as_u64)
        .map(|v| v as usize);
    let max = obj
        .get("maxLength")
        .and_then(Value::as_u64)
        .map(|v| v as usize);
    let (lo, hi) = match (min, max) {
        (Some(lo), Some(hi)) => (lo, hi.max(lo)),
        (Some(lo), None) => (lo, lo.saturating_add(8)),
        (None, Some(hi)) => (usize::min(1, hi), hi),
        (None, None) => (8, 16),
    };
    random_chars(rng.gen_range(lo..=hi), rng)
}

fn gen_array(obj: &Map<String, Value>, rng: &mut StdRng) -> Value {
    let min = obj.get("minItems").and_then(Value::as_u64).unwrap_or(1) as usize;
    let max = (obj.get("maxItems").and_then(Value::as_u64).unwrap_or(3) as usize).max(min);
    let count = rng.gen_range(min..=max);
    let items_schema = obj.get("items").cloned().unwrap_or(Value::Null);
    Value::Array((0..count).map(|_| from_schema(&items_schema, rng)).collect())
}

fn random_chars(len: usize, rng: &mut StdRng) -> String {
    (0..len)
        .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char)
        .collect()
}

// ============================================================================
// Pattern sampling
// ============================================================================
//
// Supported subset: `^`/`$` anchors, literal characters, `\d`/`\w`/`\s`,
// bracket classes with ranges (no negation), and the quantifiers `*`, `+`,
// `?`, `{n}`, `{n,}`, `{n,m}` applied to the preceding element. Groups and
// alternation are out; patterns using them fall back to an unconstrained
// string.

enum PatternPiece {
    Literal(char),
    Digit,
    Word,
    Space,
    Class(Vec<char>),
}

struct Repeat {
    min: usize,
    max: usize,
}

fn gen_pattern_string(pattern: &str, rng: &mut StdRng) -> String {
    let pieces = match parse_pattern(pattern) {
        Some(pieces) => pieces,
        None => {
            debug!(
                "pattern '{}' is outside the supported subset, generating an unconstrained string",
                pattern
            );
            return random_chars(12, rng);
        }
    };

    let mut out = String::new();
    for (piece, repeat) in &pieces {
        let count = rng.gen_range(repeat.min..=repeat.max);
        for _ in 0..count {
            out.push(sample_piece(piece, rng));
        }
    }

    // A mismatch here is a sampler gap, not a caller error.
    if let Ok(re) = regex::Regex::new(pattern) {
        if !re.is_match(&out) {
            debug!("sampled '{}' does not match pattern '{}'", out, pattern);
        }
    }
    out
}

fn sample_piece(piece: &PatternPiece, rng: &mut StdRng) -> char {
    match piece {
        PatternPiece::Literal(c) => *c,
        PatternPiece::Digit => char::from(b'0' + rng.gen_range(0u8..10)),
        PatternPiece::Word => WORD_CHARS[rng.gen_range(0..WORD_CHARS.len())] as char,
        PatternPiece::Space => ' ',
        PatternPiece::Class(members) => members[rng.gen_range(0..members.len())],
    }
}

fn parse_pattern(pattern: &str) -> Option<Vec<(PatternPiece, Repeat)>> {
    let trimmed = pattern.strip_prefix('^').unwrap_or(pattern);
    let trimmed = trimmed.strip_suffix('$').unwrap_or(trimmed);

    let mut pieces = Vec::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        let piece = match c {
            '\\' => match chars.next()? {
                'd' => PatternPiece::Digit,
                'w' => PatternPiece::Word,
                's' => PatternPiece::Space,
                e @ ('.' | '-' | '_' | '/' | '\\' | '^' | '$' | '[' | ']' | '(' | ')' | '{'
                | '}' | '*' | '+' | '?' | '|') => PatternPiece::Literal(e),
                _ => return None,
            },
            '[' => PatternPiece::Class(parse_class(&mut chars)?),
            // Groups, alternation, and the wildcard are unsupported
            '(' | ')' | '|' | '.' => return None,
            // Dangling quantifiers and stray brackets
            '*' | '+' | '?' | '{' | '}' | ']' => return None,
            // Mid-pattern anchors
            '^' | '$' => return None,
            literal => PatternPiece::Literal(literal),
        };

        let repeat = match chars.peek() {
            Some('*') => {
                chars.next();
                Repeat {
                    min: 0,
                    max: OPEN_REPEAT_EXTRA,
                }
            }
            Some('+') => {
                chars.next();
                Repeat {
                    min: 1,
                    max: 1 + OPEN_REPEAT_EXTRA,
                }
            }
            Some('?') => {
                chars.next();
                Repeat { min: 0, max: 1 }
            }
            Some('{') => {
                chars.next();
                parse_counted(&mut chars)?
            }
            _ => Repeat { min: 1, max: 1 },
        };
        pieces.push((piece, repeat));
    }
    Some(pieces)
}

fn parse_class(chars: &mut Peekable<Chars<'_>>) -> Option<Vec<char>> {
    // Negated classes are unsupported
    if chars.peek() == Some(&'^') {
        return None;
    }

    let mut members = Vec::new();
    loop {
        let c = chars.next()?;
        if c == ']' {
            break;
        }
        let member = match c {
            '\\' => match chars.next()? {
                'd' => {
                    members.extend('0'..='9');
                    continue;
                }
                'w' => {
                    members.extend('a'..='z');
                    members.extend('A'..='Z');
                    members.extend('0'..='9');
                    members.push('_');
                    continue;
                }
                e @ ('-' | '\\' | '[' | ']' | '^') => e,
                _ => return None,
            },
            other => other,
        };

        if chars.peek() == Some(&'-') {
            chars.next();
            if chars.peek() == Some(&']') {
                // Trailing '-' is a literal member
                members.push(member);
                members.push('-');
            } else {
                let end = chars.next()?;
                if end == '\\' || end < member {
                    return None;
                }
                members.extend(member..=end);
            }
        } else {
            members.push(member);
        }
    }

    if members.is_empty() {
        None
    } else {
        Some(members)
    }
}

fn parse_counted(chars: &mut Peekable<Chars<'_>>) -> Option<Repeat> {
    let mut body = String::new();
    loop {
        match chars.next()? {
            '}' => break,
            c => body.push(c),
        }
    }

    if let Some((min_s, max_s)) = body.split_once(',') {
        let min = min_s.trim().parse::<usize>().ok()?;
        if max_s.trim().is_empty() {
            Some(Repeat {
                min,
                max: min.saturating_add(OPEN_REPEAT_EXTRA),
            })
        } else {
            let max = max_s.trim().parse::<usize>().ok()?;
            if max < min {
                None
            } else {
                Some(Repeat { min, max })
            }
        }
    } else {
        let n = body.trim().parse::<usize>().ok()?;
        Some(Repeat { min: n, max: n })
    }
}
