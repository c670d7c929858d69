//! Questionnaire validation that runs before a submission reaches the engine.

use std::fmt;

use serde::Serialize;

use crate::domain::lead::{LeadContact, LeadSubmission};
use crate::domain::profile::UserProfile;
use crate::errors::ApplicationError;
use crate::phone::digits_only;

pub const HEIGHT_RANGE_CM: std::ops::RangeInclusive<i32> = 140..=220;
pub const WEIGHT_RANGE_KG: std::ops::RangeInclusive<i32> = 40..=200;
pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_STATE_CHARS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> =
            self.errors.iter().map(|error| format!("{}: {}", error.field, error.message)).collect();
        f.write_str(&rendered.join("; "))
    }
}

impl From<ValidationReport> for ApplicationError {
    fn from(value: ValidationReport) -> Self {
        ApplicationError::Validation(value.to_string())
    }
}

pub fn validate_submission(submission: &LeadSubmission) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::default();
    check_contact(&submission.contact, &mut report);
    check_profile(&submission.profile, &mut report);
    report.into_result()
}

fn check_contact(contact: &LeadContact, report: &mut ValidationReport) {
    if contact.name.trim().chars().count() < MIN_NAME_CHARS {
        report.push("name", format!("name must have at least {MIN_NAME_CHARS} characters"));
    }

    if !is_valid_email(contact.email.trim()) {
        report.push("email", "email is invalid");
    }

    let phone_digits = digits_only(&contact.phone).len();
    if !matches!(phone_digits, 10 | 11) {
        report.push("phone", "phone must follow the format (XX) XXXXX-XXXX");
    }

    if let Some(state) = &contact.state {
        if state.trim().chars().count() > MAX_STATE_CHARS {
            report.push("state", format!("state must have at most {MAX_STATE_CHARS} characters"));
        }
    }

    if !contact.contact_consent {
        report.push("contact_consent", "contact consent is required");
    }
}

fn check_profile(profile: &UserProfile, report: &mut ValidationReport) {
    match profile.height_cm {
        None => report.push("height_cm", "height is required"),
        Some(height) if !HEIGHT_RANGE_CM.contains(&height) => report.push(
            "height_cm",
            format!(
                "height must be between {} and {} cm",
                HEIGHT_RANGE_CM.start(),
                HEIGHT_RANGE_CM.end()
            ),
        ),
        Some(_) => {}
    }

    match profile.weight_kg {
        None => report.push("weight_kg", "weight is required"),
        Some(weight) if !WEIGHT_RANGE_KG.contains(&weight) => report.push(
            "weight_kg",
            format!(
                "weight must be between {} and {} kg",
                WEIGHT_RANGE_KG.start(),
                WEIGHT_RANGE_KG.end()
            ),
        ),
        Some(_) => {}
    }

    if profile.postural_profile.as_str().trim().is_empty() {
        report.push("postural_profile", "select a postural profile");
    }
}

/// `local@domain.tld` with no whitespace and a dot inside the domain.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        check_contact, check_profile, is_valid_email, validate_submission, ValidationReport,
    };
    use crate::domain::lead::{LeadContact, LeadSubmission};
    use crate::domain::profile::{PosturalProfile, UserProfile};
    use crate::errors::ApplicationError;

    fn validate_contact(contact: &LeadContact) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::default();
        check_contact(contact, &mut report);
        report.into_result()
    }

    fn validate_profile(profile: &UserProfile) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::default();
        check_profile(profile, &mut report);
        report.into_result()
    }

    fn contact() -> LeadContact {
        LeadContact {
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            phone: "(11) 98765-4321".to_string(),
            city: Some("São Paulo".to_string()),
            state: Some("SP".to_string()),
            contact_consent: true,
        }
    }

    #[test]
    fn complete_submission_passes() {
        let submission = LeadSubmission {
            contact: contact(),
            profile: UserProfile::new(175, 80, PosturalProfile::Balanced),
        };
        assert_eq!(validate_submission(&submission), Ok(()));
    }

    #[test]
    fn every_contact_problem_is_reported() {
        let report = validate_contact(&LeadContact {
            name: " A ".to_string(),
            email: "not-an-email".to_string(),
            phone: "1234".to_string(),
            city: None,
            state: Some("SPX".to_string()),
            contact_consent: false,
        })
        .expect_err("contact should be rejected");

        for field in ["name", "email", "phone", "state", "contact_consent"] {
            assert!(report.has_error(field), "missing error for {field}");
        }
        assert_eq!(report.errors.len(), 5);
    }

    #[test]
    fn measurement_bounds_are_inclusive() {
        assert!(validate_profile(&UserProfile::new(140, 40, PosturalProfile::Balanced)).is_ok());
        assert!(validate_profile(&UserProfile::new(220, 200, PosturalProfile::Balanced)).is_ok());

        let report = validate_profile(&UserProfile::new(139, 201, PosturalProfile::Balanced))
            .expect_err("out of range");
        assert!(report.has_error("height_cm"));
        assert!(report.has_error("weight_kg"));
    }

    #[test]
    fn missing_measurements_and_profile_are_required() {
        let report = validate_profile(&UserProfile::from_raw("", "abc", " "))
            .expect_err("incomplete profile");
        assert!(report.has_error("height_cm"));
        assert!(report.has_error("weight_kg"));
        assert!(report.has_error("postural_profile"));
    }

    #[test]
    fn unrecognized_profile_is_not_a_validation_error() {
        assert!(validate_profile(&UserProfile::new(170, 70, PosturalProfile::parse("other"))).is_ok());
    }

    #[test]
    fn report_converts_into_application_error() {
        let report = validate_profile(&UserProfile::from_raw("", "70", "balanced"))
            .expect_err("missing height");
        let error = ApplicationError::from(report);
        assert!(matches!(error, ApplicationError::Validation(ref message) if message.contains("height_cm")));
    }

    #[test]
    fn email_shape_checks() {
        assert!(is_valid_email("ana@example.com.br"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana @example.com"));
        assert!(!is_valid_email("ana@@example.com"));
    }
}
