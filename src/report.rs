//! Diagnostic rendering of call sequences.
//!
//! Rendering is all-or-nothing: a partial or truncated diagnostic is worse
//! than none, so any single call failing to stringify, or the output buffer
//! failing to grow, fails the whole render.

use crate::call::MockCall;
use crate::error::MockError;

/// Renders a sequence of calls as one concatenated diagnostic string.
///
/// Calls are rendered in iteration order. Each call's rendering carries its
/// own delimiters, so no separator is inserted between them; an empty
/// sequence renders as the empty string.
pub fn render_calls<'a, I>(calls: I) -> Result<String, MockError>
where
    I: IntoIterator<Item = &'a MockCall>,
{
    let mut out = String::new();
    for call in calls {
        let piece = call.render()?;
        if out.try_reserve(piece.len()).is_err() {
            return Err(MockError::out_of_memory("diagnostic buffer"));
        }
        out.push_str(&piece);
    }
    Ok(out)
}
