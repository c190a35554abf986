// Context assembly
// Renders retrieved snippets as a bulleted block for the prompt

use itertools::Itertools;

const BULLET: &str = "- ";
const SEPARATOR: &str = "\n";

/// Join snippets as `- text` lines, preserving order
///
/// An empty input yields an empty string; the prompt builder is responsible
/// for flagging that the context is empty.
#[inline]
pub fn assemble<S: AsRef<str>>(snippets: &[S]) -> String {
    snippets
        .iter()
        .map(|snippet| format!("{BULLET}{}", snippet.as_ref()))
        .join(SEPARATOR)
}
