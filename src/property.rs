//! Predicates over property reference strings.
//!
//! A property reference addresses a location in conversation context. Four
//! namespaces are owned by the system and may never be written; three well-known
//! read-only references inside them may still be read through a `var` lookup.

use std::fmt;

/// A system-owned namespace that property references may not write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemNamespace {
    Bot,
    Dialogue,
    Language,
    UserAuthenticationToken,
}

impl fmt::Display for SystemNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SystemNamespace::Bot => "Bot/",
            SystemNamespace::Dialogue => "Dialogue/",
            SystemNamespace::Language => "Language/",
            SystemNamespace::UserAuthenticationToken => "User/AuthenticationToken",
        };
        write!(f, "{}", name)
    }
}

const MAX_KEY_LEN: usize = 128;

/// `^[a-zA-Z0-9]{1,128}$`
pub fn is_alphanumeric_key(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_KEY_LEN
        && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Returns the reserved namespace a reference points into, if any.
///
/// Matching ignores case and any number of leading or separating slashes, so
/// `//BOT//x` and `user/AuthenticationToken` are both caught.
pub fn reserved_namespace(reference: &str) -> Option<SystemNamespace> {
    let lower = reference.trim_start_matches('/').to_ascii_lowercase();
    let (head, rest) = match lower.split_once('/') {
        Some(parts) => parts,
        None => return None,
    };
    match head {
        "bot" => Some(SystemNamespace::Bot),
        "dialogue" => Some(SystemNamespace::Dialogue),
        "language" => Some(SystemNamespace::Language),
        "user" if rest.trim_start_matches('/').starts_with("authenticationtoken") => {
            Some(SystemNamespace::UserAuthenticationToken)
        }
        _ => None,
    }
}

/// A reference that may be used as a write target.
pub fn is_writable_reference(reference: &str) -> bool {
    reserved_namespace(reference).is_none()
}

/// `^/*Bot/<alnum>$`, `^/*Dialogue/LastApiStatusCode$` or `^/*Language/<alnum>$`.
pub fn is_system_read_reference(reference: &str) -> bool {
    let trimmed = reference.trim_start_matches('/');
    if trimmed == "Dialogue/LastApiStatusCode" {
        return true;
    }
    ["Bot/", "Language/"].iter().any(|prefix| {
        trimmed
            .strip_prefix(prefix)
            .is_some_and(is_alphanumeric_key)
    })
}

/// A reference that may be read: any writable reference, or one of the
/// well-known read-only system references.
pub fn is_context_data_reference(reference: &str) -> bool {
    is_writable_reference(reference) || is_system_read_reference(reference)
}

/// `^/*Language/[a-zA-Z0-9]{1,128}$`
pub fn is_language_reference(reference: &str) -> bool {
    reference
        .trim_start_matches('/')
        .strip_prefix("Language/")
        .is_some_and(is_alphanumeric_key)
}

/// `^(/*conversation/+)?[^/]+$`
pub fn is_blob_reference(reference: &str) -> bool {
    let is_segment = |s: &str| !s.is_empty() && !s.contains('/');
    if is_segment(reference) {
        return true;
    }
    reference
        .trim_start_matches('/')
        .strip_prefix("conversation/")
        .map(|rest| rest.trim_start_matches('/'))
        .is_some_and(is_segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_prefixes_ignore_case_and_slashes() {
        assert_eq!(reserved_namespace("Bot/Foo"), Some(SystemNamespace::Bot));
        assert_eq!(reserved_namespace("//bot//foo"), Some(SystemNamespace::Bot));
        assert_eq!(
            reserved_namespace("DIALOGUE/x"),
            Some(SystemNamespace::Dialogue)
        );
        assert_eq!(
            reserved_namespace("/User//AuthenticationToken"),
            Some(SystemNamespace::UserAuthenticationToken)
        );
        assert_eq!(reserved_namespace("User/Name"), None);
        assert_eq!(reserved_namespace("bots/x"), None);
        assert_eq!(reserved_namespace("bot"), None);
        assert_eq!(reserved_namespace("count"), None);
    }

    #[test]
    fn system_read_references_are_exact() {
        assert!(is_context_data_reference("Bot/SomeAlnum123"));
        assert!(is_context_data_reference("/Dialogue/LastApiStatusCode"));
        assert!(is_context_data_reference("Language/Greeting"));
        assert!(!is_context_data_reference("bot/lowercase"));
        assert!(!is_context_data_reference("Bot/has-dash"));
        assert!(!is_context_data_reference("Dialogue/Other"));
        assert!(!is_context_data_reference("User/AuthenticationToken"));
    }

    #[test]
    fn blob_references() {
        assert!(is_blob_reference("upload"));
        assert!(is_blob_reference("conversation/upload"));
        assert!(is_blob_reference("//conversation//upload"));
        assert!(!is_blob_reference("user/upload"));
        assert!(!is_blob_reference("conversation/"));
        assert!(!is_blob_reference("/upload"));
        assert!(!is_blob_reference(""));
    }

    #[test]
    fn alphanumeric_keys() {
        assert!(is_alphanumeric_key("abc123"));
        assert!(!is_alphanumeric_key(""));
        assert!(!is_alphanumeric_key("a_b"));
        assert!(!is_alphanumeric_key(&"a".repeat(129)));
    }
}
