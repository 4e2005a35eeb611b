//! Script synthesis for the child interpreter.
//!
//! Setup bindings from the exercise are rendered as plain assignments ahead
//! of the learner's code, so the child sees the same starting scope the
//! graded path builds inside the VM.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::value::render_json_literal;

/// Compose the program text to hand to the interpreter.
///
/// Setup keys that are not plain ASCII identifiers are skipped with a log
/// line; they cannot be expressed as an assignment target and exercises
/// have no business defining them.
pub(crate) fn compose(setup: &BTreeMap<String, JsonValue>, code: &str) -> String {
    let mut script = String::new();
    for (name, value) in setup {
        if !is_identifier(name) {
            warn!(name, "skipping setup binding with invalid identifier");
            continue;
        }
        script.push_str(name);
        script.push_str(" = ");
        script.push_str(&render_json_literal(value));
        script.push('\n');
    }
    script.push_str(code);
    if !script.ends_with('\n') {
        script.push('\n');
    }
    script
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn setup_precedes_learner_code() {
        let mut setup = BTreeMap::new();
        setup.insert("base".to_string(), json!(10));
        setup.insert("label".to_string(), json!("cm"));
        let script = compose(&setup, "total = base * 2");
        assert_eq!(script, "base = 10\nlabel = 'cm'\ntotal = base * 2\n");
    }

    #[test]
    fn invalid_identifiers_are_skipped() {
        let mut setup = BTreeMap::new();
        setup.insert("2bad".to_string(), json!(1));
        setup.insert("good".to_string(), json!(true));
        let script = compose(&setup, "x = good");
        assert_eq!(script, "good = True\nx = good\n");
    }

    #[test]
    fn empty_setup_is_just_the_code() {
        assert_eq!(compose(&BTreeMap::new(), "x = 1\n"), "x = 1\n");
    }
}
