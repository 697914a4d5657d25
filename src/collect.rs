//! # Input Collection
//!
//! Gathers credentials and record identifiers, either from the command line
//! or interactively. Prompting works over any `BufRead`/`Write` pair, so the
//! CLI passes stdin/stdout and tests pass in-memory buffers.
//!
//! A [`Prefill`] carries what the user already entered into the next
//! attempt, e.g. after some identifiers failed to resolve.

use std::io::{BufRead, Write};

use crate::error::LabelError;

/// Values already known when (re)starting collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefill {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub ids: Vec<u64>,
}

/// Complete, validated input for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedInput {
    pub email: String,
    pub api_key: String,
    /// Deduplicated, in entry order
    pub ids: Vec<u64>,
}

impl CollectedInput {
    /// Validate that every field is present.
    pub fn new(email: &str, api_key: &str, ids: Vec<u64>) -> Result<Self, LabelError> {
        let email = email.trim();
        let api_key = api_key.trim();
        if email.is_empty() || api_key.is_empty() || ids.is_empty() {
            return Err(LabelError::Input(INCOMPLETE_INPUT.to_string()));
        }
        Ok(Self {
            email: email.to_string(),
            api_key: api_key.to_string(),
            ids: dedup_ids(ids),
        })
    }

    /// Carry this input forward, keeping only identifiers not in `invalid`.
    pub fn retry_prefill(&self, invalid: &[u64]) -> Prefill {
        Prefill {
            email: Some(self.email.clone()),
            api_key: Some(self.api_key.clone()),
            ids: self
                .ids
                .iter()
                .copied()
                .filter(|id| !invalid.contains(id))
                .collect(),
        }
    }
}

/// Shown when a form is submitted with a field or the ID list left empty.
pub const INCOMPLETE_INPUT: &str = "Please fill in all fields and add at least one ID.";

/// Parse a comma-separated list of identifiers.
///
/// Tokens are trimmed; tokens that are not plain positive integers are
/// dropped.
pub fn parse_ids(text: &str) -> Vec<u64> {
    text.split(',').filter_map(parse_id).collect()
}

fn parse_id(token: &str) -> Option<u64> {
    let token = token.trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u64>().ok().filter(|&id| id > 0)
}

/// Apply one line of edits to `ids`: `12` adds an identifier, `-12` removes
/// it. Tokens are comma separated; anything else is ignored.
pub fn edit_ids(ids: &mut Vec<u64>, line: &str) {
    for token in line.split(',').map(str::trim) {
        match token.strip_prefix('-') {
            Some(rest) => {
                if let Some(id) = parse_id(rest) {
                    ids.retain(|&kept| kept != id);
                }
            }
            None => {
                if let Some(id) = parse_id(token)
                    && !ids.contains(&id)
                {
                    ids.push(id);
                }
            }
        }
    }
}

/// Remove repeated identifiers, keeping the first occurrence.
pub fn dedup_ids(ids: Vec<u64>) -> Vec<u64> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Print `label` and read one trimmed line. End of input reads as empty.
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<String, LabelError> {
    Ok(prompt_answer(input, output, label)?.unwrap_or_default())
}

/// Print `label` and read one trimmed line, or `None` at end of input.
fn prompt_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<Option<String>, LabelError> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Like [`prompt_answer`], but running out of input is an error: the form
/// can never be completed.
fn require_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<String, LabelError> {
    prompt_answer(input, output, label)?
        .ok_or_else(|| LabelError::Input(format!("input ended. {}", INCOMPLETE_INPUT)))
}

/// Ask a yes/no question. Only `y`/`yes` (any case) count as yes.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<bool, LabelError> {
    let answer = prompt_line(input, output, &format!("{} [y/N] ", question))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Fill whatever `prefill` lacks by prompting.
///
/// Identifiers already in `prefill` are shown and kept unless removed with
/// `-<id>`; the user may add more, several at once separated by commas. An
/// empty line submits. Incomplete submissions print [`INCOMPLETE_INPUT`] and
/// ask again for whatever is missing; only end of input gives up.
pub fn collect_interactive<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prefill: &Prefill,
) -> Result<CollectedInput, LabelError> {
    let mut email = prefill.email.clone().unwrap_or_default();
    let mut api_key = prefill.api_key.clone().unwrap_or_default();
    let mut ids = dedup_ids(prefill.ids.clone());
    let mut key_hint_shown = false;

    loop {
        if email.trim().is_empty() {
            email = require_answer(input, output, "Labstep email: ")?;
        }
        if api_key.trim().is_empty() {
            if !key_hint_shown {
                writeln!(
                    output,
                    "Find or generate your API key in Labstep under Account Settings > API"
                )?;
                key_hint_shown = true;
            }
            api_key = require_answer(input, output, "Labstep API key: ")?;
        }

        if !ids.is_empty() {
            let listed: Vec<String> = ids.iter().map(u64::to_string).collect();
            writeln!(output, "IDs: {}", listed.join(", "))?;
        }
        loop {
            let line = require_answer(
                input,
                output,
                "Add resource/item ID(s), comma separated, -ID to remove (empty line to finish): ",
            )?;
            if line.is_empty() {
                break;
            }
            edit_ids(&mut ids, &line);
        }

        match CollectedInput::new(&email, &api_key, ids.clone()) {
            Ok(collected) => return Ok(collected),
            Err(_) => writeln!(output, "{}", INCOMPLETE_INPUT)?,
        }
    }
}

/// Ask for fresh credentials after an authentication failure, keeping the
/// identifiers. An empty email keeps the previous one; an empty key is asked
/// for again.
pub fn recollect_credentials<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    previous: &CollectedInput,
) -> Result<CollectedInput, LabelError> {
    let email = require_answer(
        input,
        output,
        &format!("Labstep email [{}]: ", previous.email),
    )?;
    let email = if email.is_empty() {
        previous.email.clone()
    } else {
        email
    };

    loop {
        let api_key = require_answer(input, output, "Labstep API key: ")?;
        match CollectedInput::new(&email, &api_key, previous.ids.clone()) {
            Ok(collected) => return Ok(collected),
            Err(_) => writeln!(output, "{}", INCOMPLETE_INPUT)?,
        }
    }
}
