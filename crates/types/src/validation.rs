//! Declarative field validation for the onboarding wizard.
//!
//! Each form field declares a [`FieldRule`]; a wizard step is a plain list
//! of rules. [`validate_slice`] checks a data map against one list and
//! reports at most one message per invalid field, keyed by field name.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// A regex constraint paired with the message shown when it fails.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub pattern: &'static str,
    pub message: &'static str,
}

/// Declarative constraints applied to one field value.
///
/// Length, pattern, and email/url rules only apply to strings; a non-string
/// candidate is rejected when any of them is set.
#[derive(Debug, Clone, Default)]
pub struct FieldValidation {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub allowed_values: &'static [&'static str],
    pub patterns: &'static [PatternRule],
    pub email: bool,
    pub url: bool,
    /// Cross-field equality, checked against the named sibling in the same
    /// data map.
    pub must_equal: Option<&'static str>,
}

/// One field of a wizard step: its wire name plus its constraints.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    /// Fields that participate in validation but are stripped from the
    /// outbound payload (e.g. a password confirmation).
    pub confirmation_only: bool,
    pub validation: FieldValidation,
}

impl FieldRule {
    pub const fn required(name: &'static str, mut validation: FieldValidation) -> Self {
        validation.required = true;
        Self {
            name,
            confirmation_only: false,
            validation,
        }
    }

    pub const fn optional(name: &'static str, mut validation: FieldValidation) -> Self {
        validation.required = false;
        Self {
            name,
            confirmation_only: false,
            validation,
        }
    }
}

/// Validate one candidate value against a rule.
///
/// Absent values (missing key, `null`, or empty string) pass unless the rule
/// is required; all other constraints are skipped for them, mirroring
/// optional form inputs.
pub fn validate_field(
    rule: &FieldRule,
    candidate: Option<&Value>,
    all: &IndexMap<String, Value>,
) -> Result<(), String> {
    let validation = &rule.validation;

    let absent = matches!(candidate, None | Some(Value::Null))
        || matches!(candidate, Some(Value::String(text)) if text.is_empty());
    let Some(candidate) = candidate.filter(|_| !absent) else {
        if validation.required {
            return Err("is required".to_string());
        }
        return Ok(());
    };

    if let Some(expected_field) = validation.must_equal
        && all.get(expected_field) != Some(candidate)
    {
        return Err(format!("must match {expected_field}"));
    }

    match candidate {
        Value::String(text) => {
            if !validation.allowed_values.is_empty()
                && !validation.allowed_values.contains(&text.as_str())
            {
                return Err(format!(
                    "must be one of {}",
                    validation.allowed_values.join(", ")
                ));
            }

            if let Some(min_length) = validation.min_length
                && text.chars().count() < min_length
            {
                return Err(format!("must be at least {min_length} characters"));
            }

            if let Some(max_length) = validation.max_length
                && text.chars().count() > max_length
            {
                return Err(format!("must be at most {max_length} characters"));
            }

            if validation.email && !EMAIL_RE.is_match(text) {
                return Err("must be a valid email address".to_string());
            }

            if validation.url && Url::parse(text).is_err() {
                return Err("must be a valid URL".to_string());
            }

            for rule in validation.patterns {
                let regex = Regex::new(rule.pattern)
                    .map_err(|error| format!("invalid pattern '{}': {}", rule.pattern, error))?;
                if !regex.is_match(text) {
                    return Err(rule.message.to_string());
                }
            }
            Ok(())
        }
        other => {
            let has_text_rules = validation.min_length.is_some()
                || validation.max_length.is_some()
                || !validation.patterns.is_empty()
                || validation.email
                || validation.url;
            if has_text_rules {
                return Err("must be text".to_string());
            }
            if !validation.allowed_values.is_empty()
                && !validation
                    .allowed_values
                    .iter()
                    .any(|allowed| other == &Value::String((*allowed).to_string()))
            {
                return Err(format!(
                    "must be one of {}",
                    validation.allowed_values.join(", ")
                ));
            }
            Ok(())
        }
    }
}

/// Validate a data map against one step's rules.
///
/// Only declared fields are inspected; extraneous keys in `data` are
/// ignored. Returns one message per invalid field, in rule order.
pub fn validate_slice(
    rules: &[FieldRule],
    data: &IndexMap<String, Value>,
) -> Result<(), IndexMap<String, String>> {
    let mut errors = IndexMap::new();
    for rule in rules {
        if let Err(message) = validate_field(rule, data.get(rule.name), data) {
            errors.insert(rule.name.to_string(), message);
        }
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;
    use serde_json::json;

    const UPPERCASE: PatternRule = PatternRule {
        pattern: "[A-Z]",
        message: "must contain at least one uppercase letter",
    };

    fn text_rule(name: &'static str, min: usize) -> FieldRule {
        FieldRule::required(
            name,
            FieldValidation {
                required: true,
                min_length: Some(min),
                ..FieldValidation::default()
            },
        )
    }

    #[test]
    fn required_field_rejects_absent_and_empty() {
        let rule = text_rule("schoolName", 3);
        let empty = indexmap! {};
        assert_eq!(
            validate_field(&rule, None, &empty),
            Err("is required".to_string())
        );
        assert_eq!(
            validate_field(&rule, Some(&json!("")), &empty),
            Err("is required".to_string())
        );
    }

    #[test]
    fn optional_field_skips_checks_when_absent() {
        let rule = FieldRule::optional(
            "logoUrl",
            FieldValidation {
                url: true,
                ..FieldValidation::default()
            },
        );
        let empty = indexmap! {};
        assert!(validate_field(&rule, Some(&json!("")), &empty).is_ok());
        assert!(validate_field(&rule, Some(&json!("not a url")), &empty).is_err());
        assert!(validate_field(&rule, Some(&json!("https://acme.edu/logo.png")), &empty).is_ok());
    }

    #[test]
    fn length_bounds_count_characters() {
        let rule = text_rule("city", 2);
        let empty = indexmap! {};
        assert!(validate_field(&rule, Some(&json!("Ẹ")), &empty).is_err());
        assert!(validate_field(&rule, Some(&json!("Ẹdẹ")), &empty).is_ok());
    }

    #[test]
    fn pattern_rules_surface_their_message() {
        let rule = FieldRule::required(
            "password",
            FieldValidation {
                required: true,
                patterns: &[UPPERCASE],
                ..FieldValidation::default()
            },
        );
        let empty = indexmap! {};
        assert_eq!(
            validate_field(&rule, Some(&json!("lowercase1!")), &empty),
            Err("must contain at least one uppercase letter".to_string())
        );
    }

    #[test]
    fn enum_rule_rejects_unknown_values() {
        let rule = FieldRule::required(
            "schoolType",
            FieldValidation {
                required: true,
                allowed_values: &["PRIMARY", "SECONDARY"],
                ..FieldValidation::default()
            },
        );
        let empty = indexmap! {};
        assert!(validate_field(&rule, Some(&json!("PRIMARY")), &empty).is_ok());
        assert!(validate_field(&rule, Some(&json!("NURSERY")), &empty).is_err());
    }

    #[test]
    fn must_equal_checks_the_sibling_field() {
        let rule = FieldRule::required(
            "confirmPassword",
            FieldValidation {
                required: true,
                must_equal: Some("password"),
                ..FieldValidation::default()
            },
        );
        let data = indexmap! {
            "password".to_string() => json!("Secret1!"),
            "confirmPassword".to_string() => json!("Secret2!"),
        };
        assert_eq!(
            validate_field(&rule, data.get("confirmPassword"), &data),
            Err("must match password".to_string())
        );
    }

    #[test]
    fn non_string_rejected_when_text_rules_present() {
        let rule = text_rule("address", 5);
        let empty = indexmap! {};
        assert_eq!(
            validate_field(&rule, Some(&json!(42)), &empty),
            Err("must be text".to_string())
        );
    }

    #[test]
    fn validate_slice_reports_one_message_per_field() {
        let rules = vec![text_rule("schoolName", 3), text_rule("address", 5)];
        let data = indexmap! {
            "schoolName".to_string() => json!("Ok name"),
            "address".to_string() => json!("x"),
        };
        let errors = validate_slice(&rules, &data).expect_err("address is too short");
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("address"));
    }
}
