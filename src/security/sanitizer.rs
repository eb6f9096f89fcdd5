//! Normalization and allow-list validation for employee input.
//!
//! Every function here is a pure function of its arguments. The only shared
//! state is the set of compiled patterns below, which is immutable after
//! first use, so callers can invoke these from any number of tasks at once.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::database::models::employee::SortField;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_ROLE_LENGTH: usize = 50;
pub const MAX_PAGE_SIZE: i32 = 1000;

// Whitespace is the ASCII set (tab through carriage return, plus space).
// Everything in that range except the space is a C0 control, so after
// normalization only U+0020 can actually reach these patterns.
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{M}\x09-\x0D\x20'.\-]+$").expect("name pattern compiles")
});

static ROLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{M}\p{N}\x09-\x0D\x20._\-]+$").expect("role pattern compiles")
});

static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern compiles"));

/// Rejection produced by every validator in this module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidInput {
    /// Input the rule applies to (`name`, `role`, `page`, `size`, `sortBy`).
    pub field: Option<&'static str>,
    pub message: String,
}

impl InvalidInput {
    pub fn for_field(field: &'static str, message: impl Into<String>) -> Self {
        Self { field: Some(field), message: message.into() }
    }
}

/// C0 controls, DEL and C1 controls.
fn is_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

/// Strips surrounding characters at or below U+0020 (ASCII whitespace and
/// C0 controls). Non-ASCII spaces such as U+00A0 are left in place.
fn trim_ascii_controls(input: &str) -> &str {
    input.trim_matches(|c: char| c <= '\u{20}')
}

/// NFC-normalizes `input` and removes control characters.
///
/// Removing a control can leave a base character directly in front of a
/// combining mark it was previously separated from, so the filtered stream
/// is composed a second time. The result is therefore always NFC and the
/// function is idempotent.
pub fn normalize_text(input: &str) -> String {
    input.nfc().filter(|c| !is_control(*c)).nfc().collect()
}

/// `normalize_text` lifted over an optional value. Absence propagates.
pub fn normalize_optional(input: Option<&str>) -> Option<String> {
    input.map(normalize_text)
}

pub fn validate_and_sanitize_name(name: Option<&str>) -> Result<String, InvalidInput> {
    sanitize_field(
        name,
        FieldRule {
            field: "name",
            label: "Name",
            max_length: MAX_NAME_LENGTH,
            pattern: &NAME_PATTERN,
        },
    )
}

pub fn validate_and_sanitize_role(role: Option<&str>) -> Result<String, InvalidInput> {
    sanitize_field(
        role,
        FieldRule {
            field: "role",
            label: "Role",
            max_length: MAX_ROLE_LENGTH,
            pattern: &ROLE_PATTERN,
        },
    )
}

struct FieldRule {
    field: &'static str,
    label: &'static str,
    max_length: usize,
    pattern: &'static Lazy<Regex>,
}

fn sanitize_field(value: Option<&str>, rule: FieldRule) -> Result<String, InvalidInput> {
    let trimmed = value.map(trim_ascii_controls).filter(|v| !v.is_empty()).ok_or_else(|| {
        InvalidInput::for_field(rule.field, format!("{} cannot be null or empty", rule.label))
    })?;

    let sanitized = normalize_optional(Some(trimmed)).ok_or_else(|| {
        InvalidInput::for_field(rule.field, format!("{} normalization failed", rule.label))
    })?;

    if sanitized.chars().count() > rule.max_length {
        return Err(InvalidInput::for_field(
            rule.field,
            format!("{} is too long (max {} characters)", rule.label, rule.max_length),
        ));
    }

    if !rule.pattern.is_match(&sanitized) {
        return Err(InvalidInput::for_field(
            rule.field,
            format!("{} contains invalid characters", rule.label),
        ));
    }

    Ok(sanitized)
}

pub fn validate_pagination_params(page: i32, size: i32) -> Result<(), InvalidInput> {
    if page < 0 {
        return Err(InvalidInput::for_field("page", "Page number cannot be negative"));
    }
    if size <= 0 {
        return Err(InvalidInput::for_field("size", "Page size must be positive"));
    }
    if size > MAX_PAGE_SIZE {
        return Err(InvalidInput::for_field(
            "size",
            format!("Page size too large (max {})", MAX_PAGE_SIZE),
        ));
    }
    Ok(())
}

/// Checks a requested sort attribute. Absent or blank means default order.
///
/// Syntax is checked before membership so that a malformed identifier and
/// an unknown-but-well-formed one carry different messages.
pub fn validate_sort_field(sort_by: Option<&str>) -> Result<(), InvalidInput> {
    let Some(sort_by) = sort_by.filter(|s| !trim_ascii_controls(s).is_empty()) else {
        return Ok(());
    };

    if !IDENTIFIER_PATTERN.is_match(sort_by) {
        return Err(InvalidInput::for_field("sortBy", format!("Invalid sort field: {}", sort_by)));
    }

    match SortField::from_attribute(sort_by) {
        Some(_) => Ok(()),
        None => Err(InvalidInput::for_field("sortBy", format!("Sort field not allowed: {}", sort_by))),
    }
}

/// Role comparison used by all business logic: normalized, case-insensitive.
pub fn role_equals(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) => fold_case(&normalize_text(l)) == fold_case(&normalize_text(r)),
        _ => false,
    }
}

/// Per-character case fold: upper-case, then lower-case each character.
///
/// `str::to_lowercase` maps a word-final capital sigma to `ς`, so two
/// spellings of the same Greek word could fold apart. Mapping through the
/// upper case first sends `Σ`, `σ` and `ς` to `σ`. Characters whose case
/// mapping is not one-to-one (`ß`, `İ`) are kept as they are.
pub fn fold_case(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    let upper = single_char(c.to_uppercase()).unwrap_or(c);
    single_char(upper.to_lowercase()).unwrap_or(upper)
}

fn single_char(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    let first = mapped.next()?;
    mapped.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_composes_decomposed_sequences() {
        assert_eq!(normalize_text("Jose\u{0301}"), "Jos\u{00E9}");
    }

    #[test]
    fn normalize_strips_c0_del_and_c1() {
        assert_eq!(normalize_text("a\u{0000}b\u{001B}c\u{007F}d\u{0085}e\u{009F}f"), "abcdef");
        assert_eq!(normalize_text("line\r\nbreak\ttab"), "linebreaktab");
    }

    #[test]
    fn normalize_recomposes_across_stripped_control() {
        assert_eq!(normalize_text("e\u{0007}\u{0301}"), "\u{00E9}");
    }

    #[test]
    fn normalize_optional_propagates_absence() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some("x")), Some("x".to_string()));
    }

    #[test]
    fn name_rejects_absent_empty_and_blank() {
        for input in [None, Some(""), Some("   ")] {
            let err = validate_and_sanitize_name(input).unwrap_err();
            assert_eq!(err.field, Some("name"));
            assert_eq!(err.message, "Name cannot be null or empty");
        }
    }

    #[test]
    fn name_length_boundary() {
        let ok = "A".repeat(100);
        assert_eq!(validate_and_sanitize_name(Some(ok.as_str())).unwrap(), ok);

        let err = validate_and_sanitize_name(Some("A".repeat(101).as_str())).unwrap_err();
        assert_eq!(err.message, "Name is too long (max 100 characters)");
    }

    #[test]
    fn name_length_counts_code_points() {
        let accented = "\u{00E9}".repeat(100);
        assert!(validate_and_sanitize_name(Some(accented.as_str())).is_ok());
    }

    #[test]
    fn name_bell_character_is_stripped() {
        assert_eq!(validate_and_sanitize_name(Some("John\u{0007}Doe")).unwrap(), "JohnDoe");
    }

    #[test]
    fn name_accepts_international_punctuated_names() {
        for name in ["O'Brien", "Jean-Luc Picard", "Dr. Smith", "Zoë Saldaña", "Ólafur", "李小龍"] {
            assert_eq!(validate_and_sanitize_name(Some(name)).unwrap(), name);
        }
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(validate_and_sanitize_name(Some("  Jane Doe \t")).unwrap(), "Jane Doe");
    }

    #[test]
    fn name_rejects_digits_and_symbols() {
        for name in ["R2D2", "John_Doe", "<script>", "Robert'); DROP TABLE employees;--", "a@b"] {
            let err = validate_and_sanitize_name(Some(name)).unwrap_err();
            assert_eq!(err.message, "Name contains invalid characters", "input: {name}");
        }
    }

    #[test]
    fn name_rejects_non_ascii_whitespace() {
        assert!(validate_and_sanitize_name(Some("Jane\u{00A0}Doe")).is_err());
        assert!(validate_and_sanitize_name(Some("Jane\u{2003}Doe")).is_err());
    }

    #[test]
    fn role_accepts_digits_underscore_hyphen() {
        assert_eq!(
            validate_and_sanitize_role(Some("Software_Engineer-2")).unwrap(),
            "Software_Engineer-2"
        );
        assert_eq!(validate_and_sanitize_role(Some("Sr. Dev III")).unwrap(), "Sr. Dev III");
    }

    #[test]
    fn role_rejects_exclamation_and_apostrophe() {
        assert_eq!(
            validate_and_sanitize_role(Some("Engineer!")).unwrap_err().message,
            "Role contains invalid characters"
        );
        assert!(validate_and_sanitize_role(Some("Boss's Assistant")).is_err());
    }

    #[test]
    fn role_length_boundary() {
        assert!(validate_and_sanitize_role(Some("r".repeat(50).as_str())).is_ok());
        let err = validate_and_sanitize_role(Some("r".repeat(51).as_str())).unwrap_err();
        assert_eq!(err.field, Some("role"));
        assert_eq!(err.message, "Role is too long (max 50 characters)");
    }

    #[test]
    fn role_rejects_blank() {
        assert_eq!(
            validate_and_sanitize_role(Some("\t\n")).unwrap_err().message,
            "Role cannot be null or empty"
        );
        assert!(validate_and_sanitize_role(None).is_err());
    }

    #[test]
    fn pagination_bounds() {
        assert!(validate_pagination_params(0, 10).is_ok());
        assert!(validate_pagination_params(0, 1000).is_ok());
        assert!(validate_pagination_params(7, 1).is_ok());

        assert_eq!(validate_pagination_params(-1, 10).unwrap_err().field, Some("page"));
        assert_eq!(validate_pagination_params(0, 0).unwrap_err().field, Some("size"));
        assert_eq!(
            validate_pagination_params(0, 1001).unwrap_err().message,
            "Page size too large (max 1000)"
        );
    }

    #[test]
    fn sort_field_defaults_allowed() {
        assert!(validate_sort_field(None).is_ok());
        assert!(validate_sort_field(Some("")).is_ok());
        assert!(validate_sort_field(Some("   ")).is_ok());
    }

    #[test]
    fn sort_field_allow_list() {
        for field in ["id", "name", "role", "createdAt", "updatedAt"] {
            assert!(validate_sort_field(Some(field)).is_ok(), "field: {field}");
        }
        assert_eq!(
            validate_sort_field(Some("password")).unwrap_err().message,
            "Sort field not allowed: password"
        );
        assert!(validate_sort_field(Some("Name")).is_err());
        assert!(validate_sort_field(Some("created_at")).is_err());
    }

    #[test]
    fn sort_field_syntax_rejected_before_allow_list() {
        assert_eq!(
            validate_sort_field(Some("1name")).unwrap_err().message,
            "Invalid sort field: 1name"
        );
        assert_eq!(
            validate_sort_field(Some("DROP TABLE")).unwrap_err().message,
            "Invalid sort field: DROP TABLE"
        );
        assert!(validate_sort_field(Some(" name")).unwrap_err().message.starts_with("Invalid"));
    }

    #[test]
    fn role_equality_is_normalized_and_case_insensitive() {
        assert!(role_equals(Some("Engineer"), Some("engineer")));
        assert!(role_equals(Some("Caf\u{00E9}"), Some("CAFE\u{0301}")));
        assert!(role_equals(Some("Dev\u{0000}Ops"), Some("devops")));
        assert!(!role_equals(Some("Engineer"), None));
        assert!(!role_equals(None, None));
        assert!(!role_equals(Some("Engineer"), Some("Manager")));
    }

    #[test]
    fn role_equality_folds_every_sigma() {
        assert!(role_equals(Some("ΟΔΟΣ"), Some("οδοσ")));
        assert!(role_equals(Some("ΟΔΟΣ"), Some("οδος")));
        assert!(role_equals(Some("Ingeniero ΟΔΟΣ"), Some("ingeniero οδοσ")));
        assert!(!role_equals(Some("ΟΔΟΣ"), Some("οδοι")));
    }

    #[test]
    fn fold_case_is_per_character() {
        assert_eq!(fold_case("ΣΊΣΥΦΟΣ"), "σίσυφοσ");
        assert_eq!(fold_case("Straße"), "straße");
        assert_eq!(fold_case("İstanbul"), "İstanbul");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in any::<String>()) {
            let once = normalize_text(&s);
            prop_assert_eq!(normalize_text(&once), once);
        }

        #[test]
        fn normalized_text_has_no_controls(s in any::<String>()) {
            prop_assert!(!normalize_text(&s).chars().any(is_control));
        }

        #[test]
        fn well_formed_names_pass_unchanged(
            name in "[A-Za-zÀ-ÖØ-öø-ÿ][A-Za-zÀ-ÖØ-öø-ÿ '.-]{0,96}[A-Za-zÀ-ÖØ-öø-ÿ]"
        ) {
            prop_assert_eq!(validate_and_sanitize_name(Some(name.as_str())).unwrap(), name);
        }
    }
}
