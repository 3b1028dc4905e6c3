//! The wizard controller: cumulative form state across ordered steps.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use edutage_types::validation::validate_slice;

use crate::steps::{StepSchema, onboarding_steps};

/// Errors surfaced by wizard transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    /// The active step's data failed validation. One message per invalid
    /// field, keyed by field name, in declaration order.
    #[error("step {step} input is invalid")]
    Validation {
        step: usize,
        errors: IndexMap<String, String>,
    },
    /// `submit` was called before the final step was reached.
    #[error("the final step has not been reached")]
    NotAtFinalStep,
}

impl WizardError {
    /// The field-level messages of a validation failure.
    pub fn field_errors(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            Self::NotAtFinalStep => None,
        }
    }
}

/// Outcome of a successful [`FormWizard::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardProgress {
    /// Moved to the given step index.
    MovedTo(usize),
    /// The final step was validated and merged; the wizard is complete.
    Completed,
}

/// Controller over an ordered step table.
///
/// Validated step data merges into one accumulating field map. The map only
/// ever grows: later steps overwrite same-named fields but never drop
/// earlier ones, so navigating back and re-advancing loses nothing.
pub struct FormWizard {
    steps: &'static [StepSchema],
    step_index: usize,
    submitted: bool,
    accumulated: IndexMap<String, Value>,
}

/// The school onboarding flow.
pub type OnboardingWizard = FormWizard;

impl FormWizard {
    /// Wizard over the onboarding step table.
    pub fn onboarding() -> Self {
        Self::new(onboarding_steps())
    }

    pub fn new(steps: &'static [StepSchema]) -> Self {
        debug_assert!(!steps.is_empty(), "a wizard needs at least one step");
        Self {
            steps,
            step_index: 0,
            submitted: false,
            accumulated: IndexMap::new(),
        }
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_step(&self) -> &StepSchema {
        &self.steps[self.step_index]
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn at_final_step(&self) -> bool {
        self.step_index + 1 == self.steps.len()
    }

    /// Everything validated so far.
    pub fn accumulated(&self) -> &IndexMap<String, Value> {
        &self.accumulated
    }

    /// Previously entered values for the active step, used to re-seed the
    /// step's inputs so back-navigation shows what the user typed.
    pub fn step_defaults(&self) -> IndexMap<String, Value> {
        self.current_step()
            .fields
            .iter()
            .filter_map(|rule| {
                self.accumulated
                    .get(rule.name)
                    .map(|value| (rule.name.to_string(), value.clone()))
            })
            .collect()
    }

    /// Validate `step_data` against the active step and move forward.
    ///
    /// Only the fields declared for the active step are inspected. On
    /// failure nothing changes and the field-level messages are returned;
    /// on success the data merges into the accumulated map (later values
    /// overwrite earlier ones for the same field) and the wizard advances,
    /// completing if this was the final step.
    pub fn advance(
        &mut self,
        step_data: &IndexMap<String, Value>,
    ) -> Result<WizardProgress, WizardError> {
        let step = self.step_index;
        validate_slice(&self.steps[step].fields, step_data)
            .map_err(|errors| WizardError::Validation { step, errors })?;

        for rule in &self.steps[step].fields {
            if let Some(value) = step_data.get(rule.name) {
                self.accumulated.insert(rule.name.to_string(), value.clone());
            }
        }
        debug!(step, fields = self.accumulated.len(), "step accepted");

        if self.at_final_step() {
            self.submitted = true;
            Ok(WizardProgress::Completed)
        } else {
            self.step_index += 1;
            Ok(WizardProgress::MovedTo(self.step_index))
        }
    }

    /// Step back without validating; accumulated values are untouched.
    /// Returns `false` when already on the first step.
    pub fn retreat(&mut self) -> bool {
        if self.step_index == 0 {
            return false;
        }
        self.step_index -= 1;
        self.submitted = false;
        true
    }

    /// Produce the outbound payload.
    ///
    /// Only callable from the final step. Runs a final validation of the
    /// full merged field set, then strips confirmation-only fields that are
    /// not part of the wire contract. The caller forwards the payload to
    /// the mutation dispatcher.
    pub fn submit(&mut self) -> Result<Value, WizardError> {
        if !self.at_final_step() {
            return Err(WizardError::NotAtFinalStep);
        }

        for (index, step) in self.steps.iter().enumerate() {
            validate_slice(&step.fields, &self.accumulated).map_err(|errors| {
                WizardError::Validation {
                    step: index,
                    errors,
                }
            })?;
        }

        let confirmation: Vec<&str> = self
            .steps
            .iter()
            .flat_map(StepSchema::confirmation_fields)
            .collect();

        let payload: Map<String, Value> = self
            .accumulated
            .iter()
            .filter(|(name, _)| !confirmation.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        self.submitted = true;
        debug!(fields = payload.len(), "wizard payload assembled");
        Ok(Value::Object(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;
    use serde_json::json;

    fn step1_data() -> IndexMap<String, Value> {
        indexmap! {
            "schoolName".to_string() => json!("Acme Academy"),
            "schoolType".to_string() => json!("PRIMARY"),
            "schoolCategory".to_string() => json!("PRIVATE"),
        }
    }

    fn step2_data() -> IndexMap<String, Value> {
        indexmap! {
            "address".to_string() => json!("12 Marina Road"),
            "country".to_string() => json!("Nigeria"),
            "state".to_string() => json!("Lagos"),
            "city".to_string() => json!("Lagos"),
            "schoolEmail".to_string() => json!("office@acme.edu"),
            "schoolPassword".to_string() => json!("Sch00lpass!"),
        }
    }

    fn step3_data() -> IndexMap<String, Value> {
        indexmap! {
            "firstName".to_string() => json!("Ada"),
            "lastName".to_string() => json!("Obi"),
            "position".to_string() => json!("Principal"),
            "adminEmail".to_string() => json!("ada@acme.edu"),
            "password".to_string() => json!("Adm1npass!"),
            "confirmPassword".to_string() => json!("Adm1npass!"),
        }
    }

    #[test]
    fn invalid_step_leaves_state_untouched() {
        let mut wizard = FormWizard::onboarding();
        wizard.advance(&step1_data()).expect("step 1 passes");

        let bad_step2 = indexmap! {
            "address".to_string() => json!("x"),
            "city".to_string() => json!("Lagos"),
        };
        let error = wizard.advance(&bad_step2).expect_err("step 2 must fail");
        let errors = error.field_errors().expect("field messages");
        assert!(errors.contains_key("address"));
        assert!(errors.contains_key("country"), "missing required field reported");
        assert!(!errors.contains_key("city"), "valid fields carry no message");

        assert_eq!(wizard.step_index(), 1, "failed advance must not move");
        assert!(
            !wizard.accumulated().contains_key("city"),
            "failed advance must not merge anything"
        );
    }

    #[test]
    fn back_navigation_preserves_all_fields() {
        let mut wizard = FormWizard::onboarding();
        wizard.advance(&step1_data()).expect("step 1");
        wizard.advance(&step2_data()).expect("step 2");

        assert!(wizard.retreat());
        assert_eq!(wizard.step_index(), 1);

        // re-advance without changes: nothing may be lost
        wizard.advance(&step2_data()).expect("step 2 again");
        let accumulated = wizard.accumulated();
        assert_eq!(accumulated["schoolName"], json!("Acme Academy"));
        assert_eq!(accumulated["city"], json!("Lagos"));
    }

    #[test]
    fn step_defaults_reseed_previous_entries() {
        let mut wizard = FormWizard::onboarding();
        wizard.advance(&step1_data()).expect("step 1");
        wizard.advance(&step2_data()).expect("step 2");

        wizard.retreat();
        wizard.retreat();
        let defaults = wizard.step_defaults();
        assert_eq!(defaults["schoolName"], json!("Acme Academy"));
        assert_eq!(defaults.len(), 3, "only this step's entered fields are seeded");
    }

    #[test]
    fn re_editing_a_field_overwrites_the_earlier_value() {
        let mut wizard = FormWizard::onboarding();
        wizard.advance(&step1_data()).expect("step 1");
        wizard.retreat();

        let mut edited = step1_data();
        edited.insert("schoolName".to_string(), json!("Acme International"));
        wizard.advance(&edited).expect("edited step 1");
        assert_eq!(
            wizard.accumulated()["schoolName"],
            json!("Acme International")
        );
    }

    #[test]
    fn submit_before_final_step_is_rejected() {
        let mut wizard = FormWizard::onboarding();
        wizard.advance(&step1_data()).expect("step 1");

        assert_eq!(wizard.submit(), Err(WizardError::NotAtFinalStep));
        assert_eq!(wizard.step_index(), 1, "rejected submit must not move");
        assert!(!wizard.is_submitted());
    }

    #[test]
    fn completed_wizard_strips_confirmation_fields() {
        let mut wizard = FormWizard::onboarding();
        wizard.advance(&step1_data()).expect("step 1");
        wizard.advance(&step2_data()).expect("step 2");
        let progress = wizard.advance(&step3_data()).expect("step 3");
        assert_eq!(progress, WizardProgress::Completed);
        assert!(wizard.is_submitted());

        let payload = wizard.submit().expect("payload assembles");
        assert_eq!(payload["schoolName"], json!("Acme Academy"));
        assert_eq!(payload["password"], json!("Adm1npass!"));
        assert!(
            payload.get("confirmPassword").is_none(),
            "confirmation fields never reach the wire"
        );
    }

    #[test]
    fn mismatched_confirmation_blocks_the_final_step() {
        let mut wizard = FormWizard::onboarding();
        wizard.advance(&step1_data()).expect("step 1");
        wizard.advance(&step2_data()).expect("step 2");

        let mut mismatched = step3_data();
        mismatched.insert("confirmPassword".to_string(), json!("Different1!"));
        let error = wizard.advance(&mismatched).expect_err("mismatch must fail");
        let errors = error.field_errors().expect("field messages");
        assert_eq!(
            errors.get("confirmPassword").map(String::as_str),
            Some("must match password")
        );
    }

    #[test]
    fn weak_password_reports_policy_message() {
        let mut wizard = FormWizard::onboarding();
        wizard.advance(&step1_data()).expect("step 1");

        let mut weak = step2_data();
        weak.insert("schoolPassword".to_string(), json!("alllowercase1!"));
        let error = wizard.advance(&weak).expect_err("weak password must fail");
        let errors = error.field_errors().expect("field messages");
        assert_eq!(
            errors.get("schoolPassword").map(String::as_str),
            Some("must contain at least one uppercase letter")
        );
    }

    #[test]
    fn validation_ignores_fields_from_other_steps() {
        let mut wizard = FormWizard::onboarding();
        // step 1 data polluted with a (bogus) later-step field
        let mut data = step1_data();
        data.insert("adminEmail".to_string(), json!("not-an-email"));
        wizard
            .advance(&data)
            .expect("step 1 must ignore later-step fields");
        assert_eq!(wizard.step_index(), 1);
    }
}
