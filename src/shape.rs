//! Response shaping: serialize tool payloads under a token budget.
//!
//! The shaper is deterministic: identical payload and budget always
//! produce identical output. Truncation drops whole rows from the tail,
//! never part of a row, and marks the envelope with `truncated` and
//! `rows_omitted` so the caller knows the result is partial.

use serde_json::{Map, Value as JsonValue};

use crate::error::AppError;

/// A payload ready for shaping: ordered result rows plus envelope
/// metadata (e.g. the execution summary) that is never truncated.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub rows: Vec<JsonValue>,
    pub meta: Map<String, JsonValue>,
}

/// A shaped, serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shaped {
    pub text: String,
    pub truncated: bool,
}

/// Rough token estimate for budget accounting: 4 characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Serialize `payload`, truncating the row sequence to fit `budget`
/// estimated tokens. `None` or zero budget disables truncation.
pub fn shape(payload: &Payload, budget: Option<usize>) -> Result<Shaped, AppError> {
    let full = render(&payload.rows, &payload.meta, None)?;

    let budget = match budget {
        None | Some(0) => {
            return Ok(Shaped {
                text: full,
                truncated: false,
            })
        }
        Some(limit) => limit,
    };

    if estimate_tokens(&full) <= budget {
        return Ok(Shaped {
            text: full,
            truncated: false,
        });
    }

    // Binary search for the largest row prefix that fits alongside the
    // truncation marker. Serialized size grows monotonically with the
    // number of kept rows.
    let total = payload.rows.len();
    let mut lo = 0usize;
    let mut hi = total;
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        let candidate = render(&payload.rows[..mid], &payload.meta, Some(total - mid))?;
        if estimate_tokens(&candidate) <= budget {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let text = render(&payload.rows[..lo], &payload.meta, Some(total - lo))?;

    // A budget below the size of the empty envelope cannot be met by
    // dropping rows alone; cut the serialized text itself.
    if estimate_tokens(&text) > budget {
        return Ok(Shaped {
            text: text.chars().take(budget * 4).collect(),
            truncated: true,
        });
    }

    Ok(Shaped {
        text,
        truncated: true,
    })
}

fn render(
    rows: &[JsonValue],
    meta: &Map<String, JsonValue>,
    omitted: Option<usize>,
) -> Result<String, AppError> {
    let mut envelope = meta.clone();
    envelope.insert("rows".to_string(), JsonValue::Array(rows.to_vec()));
    if let Some(omitted) = omitted {
        envelope.insert("truncated".to_string(), JsonValue::Bool(true));
        envelope.insert("rows_omitted".to_string(), JsonValue::from(omitted));
    }
    Ok(serde_json::to_string(&JsonValue::Object(envelope))?)
}
