use tooling::ToolCall;

pub const TOOL_CALL_MARKER: &str = "TOOL_CALL:";

/// What a model reply asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// Plain conversation; the reply is returned as is.
    NoCall,
    Call(ToolCall),
    /// The marker was present but no valid call followed it. `original` is
    /// the full model reply.
    ParseFailure { reason: String, original: String },
}

/// Finds a `TOOL_CALL: {"name": .., "arguments": {..}}` request in free text.
///
/// Only the first marker counts. The JSON object is delimited by brace depth,
/// ignoring braces that appear inside string literals.
pub struct ToolCallDetector {
    marker: String,
}

impl Default for ToolCallDetector {
    fn default() -> Self {
        Self::new(TOOL_CALL_MARKER)
    }
}

impl ToolCallDetector {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
        }
    }

    pub fn detect(&self, reply: &str) -> Detection {
        let Some(marker_at) = reply.find(&self.marker) else {
            return Detection::NoCall;
        };

        let payload = &reply[marker_at + self.marker.len()..];
        match extract_call(payload) {
            Ok(call) => Detection::Call(call),
            Err(reason) => Detection::ParseFailure {
                reason,
                original: reply.to_string(),
            },
        }
    }
}

fn extract_call(payload: &str) -> Result<ToolCall, String> {
    let start = payload
        .find('{')
        .ok_or_else(|| "no JSON object follows the TOOL_CALL marker".to_string())?;

    let end = matching_brace(&payload[start..])
        .ok_or_else(|| "unbalanced braces in tool call".to_string())?;

    let json = &payload[start..start + end + 1];
    serde_json::from_str::<ToolCall>(json).map_err(|e| format!("invalid tool call JSON: {e}"))
}

/// Byte offset of the brace closing the object that opens at `text[0]`.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
