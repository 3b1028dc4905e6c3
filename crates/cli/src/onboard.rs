//! The onboarding subcommand: drives the three-step wizard from flags.
//!
//! Every flag maps to one wizard field. The data is fed through the wizard
//! step by step so the same validation that guards interactive use applies
//! here, with failures reported per field.

use anyhow::{Result, bail};
use clap::Args;
use edutage_client::SchoolApi;
use edutage_engine::{FormWizard, WizardError};
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Args)]
pub struct OnboardArgs {
    // step 1: registration
    #[arg(long)]
    pub school_name: String,
    /// PRIMARY, SECONDARY, COLLEGE, UNIVERSITY, or OTHER.
    #[arg(long)]
    pub school_type: String,
    /// PUBLIC, PRIVATE, RELIGIOUS, or OTHER.
    #[arg(long)]
    pub school_category: String,
    #[arg(long)]
    pub registration_number: Option<String>,

    // step 2: location
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub country: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub school_email: String,
    #[arg(long)]
    pub school_password: String,
    #[arg(long)]
    pub school_phone: Option<String>,
    #[arg(long)]
    pub logo_url: Option<String>,

    // step 3: administrator
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub position: String,
    #[arg(long)]
    pub admin_email: String,
    #[arg(long)]
    pub admin_phone: Option<String>,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
}

impl OnboardArgs {
    /// The three step slices, in wizard order.
    fn step_data(&self) -> [IndexMap<String, Value>; 3] {
        [
            fields(&[
                ("schoolName", Some(&self.school_name)),
                ("schoolType", Some(&self.school_type)),
                ("schoolCategory", Some(&self.school_category)),
                ("registrationNumber", self.registration_number.as_ref()),
            ]),
            fields(&[
                ("address", Some(&self.address)),
                ("country", Some(&self.country)),
                ("state", Some(&self.state)),
                ("city", Some(&self.city)),
                ("schoolEmail", Some(&self.school_email)),
                ("schoolPassword", Some(&self.school_password)),
                ("schoolPhone", self.school_phone.as_ref()),
                ("logoUrl", self.logo_url.as_ref()),
            ]),
            fields(&[
                ("firstName", Some(&self.first_name)),
                ("lastName", Some(&self.last_name)),
                ("position", Some(&self.position)),
                ("adminEmail", Some(&self.admin_email)),
                ("adminPhone", self.admin_phone.as_ref()),
                ("password", Some(&self.password)),
                ("confirmPassword", Some(&self.confirm_password)),
            ]),
        ]
    }
}

fn fields(pairs: &[(&str, Option<&String>)]) -> IndexMap<String, Value> {
    pairs
        .iter()
        .filter_map(|(name, value)| {
            value.map(|value| (name.to_string(), Value::String(value.clone())))
        })
        .collect()
}

pub async fn run(api: &SchoolApi, args: OnboardArgs) -> Result<()> {
    let mut wizard = FormWizard::onboarding();

    for step_data in args.step_data() {
        let title = wizard.current_step().title;
        if let Err(error) = wizard.advance(&step_data) {
            report_validation_failure(title, &error);
            bail!("onboarding input is invalid");
        }
    }

    let payload = match wizard.submit() {
        Ok(payload) => payload,
        Err(error) => {
            report_validation_failure("final review", &error);
            bail!("onboarding input is invalid");
        }
    };

    let auth = api.onboard_school(payload).await?;
    println!(
        "School '{}' onboarded. Signed in as {}.",
        auth.school.name,
        auth.user.full_name()
    );
    Ok(())
}

fn report_validation_failure(step_title: &str, error: &WizardError) {
    match error.field_errors() {
        Some(errors) => {
            eprintln!("{step_title}:");
            for (field, message) in errors {
                eprintln!("  --{}: {message}", flag_name(field));
            }
        }
        None => eprintln!("{step_title}: {error}"),
    }
}

/// Map a camelCase wizard field back to its kebab-case flag.
fn flag_name(field: &str) -> String {
    let mut flag = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_ascii_uppercase() {
            flag.push('-');
            flag.push(ch.to_ascii_lowercase());
        } else {
            flag.push(ch);
        }
    }
    flag
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_args() -> OnboardArgs {
        OnboardArgs {
            school_name: "Acme Academy".into(),
            school_type: "PRIMARY".into(),
            school_category: "PRIVATE".into(),
            registration_number: None,
            address: "12 Marina Road".into(),
            country: "Nigeria".into(),
            state: "Lagos".into(),
            city: "Lagos".into(),
            school_email: "office@acme.edu".into(),
            school_password: "Sch00lpass!".into(),
            school_phone: None,
            logo_url: None,
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            position: "Principal".into(),
            admin_email: "ada@acme.edu".into(),
            admin_phone: None,
            password: "Adm1npass!".into(),
            confirm_password: "Adm1npass!".into(),
        }
    }

    #[test]
    fn absent_optional_flags_are_omitted_from_step_data() {
        let [step1, _, step3] = sample_args().step_data();
        assert!(!step1.contains_key("registrationNumber"));
        assert_eq!(step1["schoolName"], Value::String("Acme Academy".into()));
        assert!(step3.contains_key("confirmPassword"));
    }

    #[test]
    fn sample_args_drive_the_wizard_to_completion() {
        let mut wizard = FormWizard::onboarding();
        for step_data in sample_args().step_data() {
            wizard.advance(&step_data).expect("sample data is valid");
        }
        let payload = wizard.submit().expect("payload assembles");
        assert!(payload.get("confirmPassword").is_none());
        assert_eq!(payload["city"], Value::String("Lagos".into()));
    }

    #[test]
    fn field_names_map_back_to_flags() {
        assert_eq!(flag_name("schoolName"), "school-name");
        assert_eq!(flag_name("address"), "address");
    }
}
