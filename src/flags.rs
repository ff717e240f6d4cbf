//! Raw command-line token parsing.
//!
//! [`parse_argv`] classifies a token sequence (argv with the program path
//! already removed) into positional arguments and named options in a single
//! left-to-right pass:
//!
//! - `--name=value` and `--name value` (two-token form) → named scalar
//! - `--flag` with no attached value → present boolean flag
//! - `-x` / `-xyz` → boolean short option(s); `-x=value` → named scalar
//! - `key=value` with no leading dash → named entry under `key`
//! - anything else without a leading dash → positional, input order kept
//!
//! A bare `--` ends option recognition; every later token is positional.
//! A bare `-` is positional (conventionally stdin).  Empty tokens are
//! skipped.  An explicit empty value (`--name=`) is stored as an empty
//! string, never dropped.
//!
//! With [`ParseOptions::merge_opts`] enabled, a repeated option name
//! collapses into one ordered list of all supplied values; a single
//! occurrence stays a scalar.  With merging disabled the last occurrence
//! wins.

use indexmap::IndexMap;

// ── Option values ─────────────────────────────────────────────────────────────

/// Value bound to a named option.
///
/// Bare flags are `Bool(true)`; `--name=value` forms are `Str`; repeated
/// occurrences under merging become `List` in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptValue {
    Bool(bool),
    Str(String),
    List(Vec<String>),
}

impl OptValue {
    /// The scalar string, if this value is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// All carried string values: a scalar yields one element, a list all
    /// of them, a bare flag none.
    pub fn values(&self) -> Vec<&str> {
        match self {
            OptValue::Bool(_) => Vec::new(),
            OptValue::Str(s) => vec![s.as_str()],
            OptValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// String coercion: flags become `"1"`/`""`, lists contribute their
    /// first element.
    pub fn coerce_string(&self) -> String {
        match self {
            OptValue::Bool(true) => "1".to_owned(),
            OptValue::Bool(false) => String::new(),
            OptValue::Str(s) => s.clone(),
            OptValue::List(items) => items.first().cloned().unwrap_or_default(),
        }
    }

    /// Integer coercion via the leading-digits rule of
    /// [`crate::util::int_prefix`].
    pub fn coerce_int(&self) -> i32 {
        crate::util::int_prefix(&self.coerce_string())
    }

    /// Truthiness: a set flag, a non-empty non-`"0"` scalar, or a non-empty
    /// list.
    pub fn coerce_bool(&self) -> bool {
        match self {
            OptValue::Bool(b) => *b,
            OptValue::Str(s) => !(s.is_empty() || s == "0"),
            OptValue::List(items) => !items.is_empty(),
        }
    }
}

// ── Parse configuration and output ────────────────────────────────────────────

/// Knobs for [`parse_argv`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Collapse repeated option names into one ordered list instead of
    /// overwriting.
    pub merge_opts: bool,
}

/// Parsed argv: positional arguments in input order plus named options
/// keyed uniquely, insertion-ordered.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedArgv {
    pub args: Vec<String>,
    pub opts: IndexMap<String, OptValue>,
}

// ── Parser ────────────────────────────────────────────────────────────────────

/// Classifies `tokens` left to right into positionals and named options.
pub fn parse_argv(tokens: &[String], options: &ParseOptions) -> ParsedArgv {
    let mut args: Vec<String> = Vec::new();
    let mut opts: IndexMap<String, OptValue> = IndexMap::new();
    let mut no_more_opts = false;

    let mut idx = 0usize;
    while idx < tokens.len() {
        let token = &tokens[idx];
        idx += 1;

        if token.is_empty() {
            continue;
        }

        // ── Past the `--` sentinel: everything is positional ──────────────
        if no_more_opts {
            args.push(token.clone());
            continue;
        }

        // ── Non-dash tokens: `key=value` pairs or plain positionals ───────
        if !token.starts_with('-') {
            match token.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    set_opt(&mut opts, key, OptValue::Str(value.to_owned()), options);
                }
                _ => args.push(token.clone()),
            }
            continue;
        }

        // ── `-` alone is positional; `--` ends option recognition ─────────
        if token == "-" {
            args.push(token.clone());
            continue;
        }
        if token == "--" {
            no_more_opts = true;
            continue;
        }

        // ── Long options (`--…`) ──────────────────────────────────────────
        if let Some(body) = token.strip_prefix("--") {
            match body.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    set_opt(&mut opts, name, OptValue::Str(value.to_owned()), options);
                }
                Some(_) => args.push(token.clone()),
                None => {
                    // Two-token form: the next token is the value unless it
                    // looks like another option.
                    match tokens.get(idx) {
                        Some(next) if !next.starts_with('-') => {
                            set_opt(&mut opts, body, OptValue::Str(next.clone()), options);
                            idx += 1;
                        }
                        _ => set_opt(&mut opts, body, OptValue::Bool(true), options),
                    }
                }
            }
            continue;
        }

        // ── Short options (`-x`, aggregated `-xyz`, `-x=value`) ───────────
        let body = &token[1..];
        match body.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                set_opt(&mut opts, name, OptValue::Str(value.to_owned()), options);
            }
            Some(_) => args.push(token.clone()),
            None => {
                for flag in body.chars() {
                    set_opt(
                        &mut opts,
                        flag.encode_utf8(&mut [0u8; 4]),
                        OptValue::Bool(true),
                        options,
                    );
                }
            }
        }
    }

    ParsedArgv { args, opts }
}

/// Stores `value` under `name`, applying the merge rule for repeats.
///
/// Merging only combines string scalars: a repeated string converts the
/// prior scalar to a two-element list, later repeats extend it.  Bare-flag
/// repeats and mixed shapes overwrite.
fn set_opt(
    opts: &mut IndexMap<String, OptValue>,
    name: &str,
    value: OptValue,
    options: &ParseOptions,
) {
    if options.merge_opts {
        if let Some(existing) = opts.get_mut(name) {
            if let OptValue::Str(new) = value {
                match existing {
                    OptValue::List(items) => items.push(new),
                    OptValue::Str(prev) => {
                        let first = std::mem::take(prev);
                        *existing = OptValue::List(vec![first, new]);
                    }
                    OptValue::Bool(_) => *existing = OptValue::Str(new),
                }
            } else {
                *existing = value;
            }
            return;
        }
    }
    opts.insert(name.to_owned(), value);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
