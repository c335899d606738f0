//! Static boilerplate removal applied to extracted text before tokenizing.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Copyright footers printed on every manuscript page, e.g. `COPYRIGHT © 2004 ...` to end of line.
const STATIC_PATTERNS: &[&str] = &[r"COPYRIGHT © \d[^\n\r]*"];

static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();

fn patterns() -> &'static [Regex] {
    COMPILED.get_or_init(|| {
        STATIC_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Remove every static pattern match from `input`. Borrows when nothing matched.
pub fn strip_static_patterns(input: &str) -> Cow<'_, str> {
    let mut result = Cow::Borrowed(input);
    for re in patterns() {
        if re.is_match(&result) {
            result = Cow::Owned(re.replace_all(&result, "").into_owned());
        }
    }
    result
}
