//! Multi-step form engine for the Edutage admin client.
//!
//! The only flow today is school onboarding: three validated steps that
//! accumulate into one payload for `auth/onboard-school`. The controller is
//! generic over its step table, so additional wizards are a new table away.

pub mod steps;
pub mod wizard;

pub use steps::{StepSchema, onboarding_steps};
pub use wizard::{FormWizard, OnboardingWizard, WizardError, WizardProgress};
