//! The whitelisted built-in remapping table (`spec.md` §4.4, "Built-in
//! remapping table"). Kept as data rather than hardcoded match arms so a
//! driver can extend or replace it per `spec.md` §9's note on exposing a
//! configuration table.

/// Receiver identifiers the generator treats as JS built-ins rather than
/// user code, paired with the JS identifier they emit as.
pub fn remapped_namespace(name: &str) -> Option<&'static str> {
    match name {
        "console" => Some("console"),
        "math" => Some("Math"),
        "array" => Some("Array"),
        "string" => Some("String"),
        "object" => Some("Object"),
        _ => None,
    }
}

/// `console.<member>` names that pass through unchanged, plus the
/// console-on-the-error-keyword special case (`spec.md` §4.4).
pub fn remap_console_member(member: &str) -> &str {
    match member {
        "Error" => "error",
        other => other,
    }
}

const ARRAY_METHODS: &[&str] = &["push", "pop", "length", "map", "filter", "find", "slice"];
const STRING_METHODS: &[&str] = &["length", "concat", "replace", "split"];

/// Whether `member` is a remappable Array/String built-in method/property.
pub fn is_builtin_member(member: &str) -> bool {
    ARRAY_METHODS.contains(&member) || STRING_METHODS.contains(&member)
}

/// Heuristic from `spec.md` §4.4/§9: a receiver spelled with a leading
/// uppercase Cyrillic letter is treated as a user-defined namespace, so its
/// members are never remapped even if the name collides with a built-in
/// method name.
pub fn looks_user_defined(receiver: &str) -> bool {
    matches!(receiver.chars().next(), Some(c) if c.is_uppercase() && !c.is_ascii())
}

/// `member`'s canonical Array/String built-in spelling, generalizing the
/// `console.Error` -> `console.error` precedent (`spec.md` §4.4) to the rest
/// of the whitelist: a case-only mismatch (e.g. `Push`, `Length`) is
/// corrected to the whitelisted spelling. Returns `None` for a member that
/// isn't on the whitelist at all, case-insensitively.
pub fn canonical_builtin_member(member: &str) -> Option<&'static str> {
    if is_builtin_member(member) {
        return ARRAY_METHODS.iter().chain(STRING_METHODS.iter()).find(|&&m| m == member).copied();
    }
    ARRAY_METHODS.iter().chain(STRING_METHODS.iter()).find(|&&m| m.eq_ignore_ascii_case(member)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_error_specializes_to_lowercase() {
        assert_eq!(remap_console_member("Error"), "error");
        assert_eq!(remap_console_member("log"), "log");
    }

    #[test]
    fn uppercase_cyrillic_receiver_is_user_defined() {
        assert!(looks_user_defined("Массив"));
        assert!(!looks_user_defined("Array"));
        assert!(!looks_user_defined("массив"));
    }

    #[test]
    fn known_array_and_string_methods_are_recognized() {
        assert!(is_builtin_member("push"));
        assert!(is_builtin_member("concat"));
        assert!(!is_builtin_member("doSomethingCustom"));
    }

    #[test]
    fn canonical_builtin_member_corrects_case_mismatches() {
        assert_eq!(canonical_builtin_member("Push"), Some("push"));
        assert_eq!(canonical_builtin_member("push"), Some("push"));
        assert_eq!(canonical_builtin_member("doSomethingCustom"), None);
    }
}
