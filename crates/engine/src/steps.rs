//! Step tables for the onboarding wizard.
//!
//! Each step declares a fixed field set with its validation rules; the
//! wizard selects a step by index. Validation for a step only ever inspects
//! the fields declared here, so a half-filled later step can never block an
//! earlier one.

use edutage_types::validation::{FieldRule, FieldValidation, PatternRule};
use edutage_types::{SchoolCategory, SchoolType};
use once_cell::sync::Lazy;

/// One wizard step: a title for display and the fields it owns.
pub struct StepSchema {
    pub title: &'static str,
    pub fields: Vec<FieldRule>,
}

impl StepSchema {
    /// Names of the fields stripped from the outbound payload.
    pub fn confirmation_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|rule| rule.confirmation_only)
            .map(|rule| rule.name)
    }
}

/// Password policy shared by the school and administrator credentials:
/// 8-32 characters with an uppercase letter, a digit, and a special
/// character.
const PASSWORD_PATTERNS: &[PatternRule] = &[
    PatternRule {
        pattern: "[A-Z]",
        message: "must contain at least one uppercase letter",
    },
    PatternRule {
        pattern: "[0-9]",
        message: "must contain at least one number",
    },
    PatternRule {
        pattern: "[@$!%*?&]",
        message: "must contain at least one special character",
    },
];

fn password_validation() -> FieldValidation {
    FieldValidation {
        required: true,
        min_length: Some(8),
        max_length: Some(32),
        patterns: PASSWORD_PATTERNS,
        ..FieldValidation::default()
    }
}

fn text(min_length: usize) -> FieldValidation {
    FieldValidation {
        required: true,
        min_length: Some(min_length),
        ..FieldValidation::default()
    }
}

fn email() -> FieldValidation {
    FieldValidation {
        required: true,
        email: true,
        ..FieldValidation::default()
    }
}

static ONBOARDING_STEPS: Lazy<Vec<StepSchema>> = Lazy::new(|| {
    vec![
        StepSchema {
            title: "Registration",
            fields: vec![
                FieldRule::required("schoolName", text(3)),
                FieldRule::required(
                    "schoolType",
                    FieldValidation {
                        required: true,
                        allowed_values: SchoolType::WIRE_VALUES,
                        ..FieldValidation::default()
                    },
                ),
                FieldRule::required(
                    "schoolCategory",
                    FieldValidation {
                        required: true,
                        allowed_values: SchoolCategory::WIRE_VALUES,
                        ..FieldValidation::default()
                    },
                ),
                FieldRule::optional("registrationNumber", FieldValidation::default()),
            ],
        },
        StepSchema {
            title: "School Information",
            fields: vec![
                FieldRule::required("address", text(5)),
                FieldRule::required("country", text(2)),
                FieldRule::required("state", text(2)),
                FieldRule::required("city", text(2)),
                FieldRule::required("schoolEmail", email()),
                FieldRule::required("schoolPassword", password_validation()),
                FieldRule::optional("schoolPhone", FieldValidation::default()),
                FieldRule::optional(
                    "logoUrl",
                    FieldValidation {
                        url: true,
                        ..FieldValidation::default()
                    },
                ),
            ],
        },
        StepSchema {
            title: "Administrator Information",
            fields: vec![
                FieldRule::required("firstName", text(2)),
                FieldRule::required("lastName", text(2)),
                FieldRule::required("position", text(2)),
                FieldRule::required("adminEmail", email()),
                FieldRule::optional("adminPhone", FieldValidation::default()),
                FieldRule::required("password", password_validation()),
                FieldRule {
                    name: "confirmPassword",
                    confirmation_only: true,
                    validation: FieldValidation {
                        required: true,
                        must_equal: Some("password"),
                        ..FieldValidation::default()
                    },
                },
            ],
        },
    ]
});

/// The onboarding step table, in presentation order.
pub fn onboarding_steps() -> &'static [StepSchema] {
    &ONBOARDING_STEPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_has_three_steps_with_disjoint_fields() {
        let steps = onboarding_steps();
        assert_eq!(steps.len(), 3);

        let mut seen = std::collections::HashSet::new();
        for step in steps {
            for rule in &step.fields {
                assert!(seen.insert(rule.name), "field {} declared twice", rule.name);
            }
        }
    }

    #[test]
    fn only_the_confirmation_field_is_stripped() {
        let stripped: Vec<&str> = onboarding_steps()
            .iter()
            .flat_map(StepSchema::confirmation_fields)
            .collect();
        assert_eq!(stripped, ["confirmPassword"]);
    }
}
