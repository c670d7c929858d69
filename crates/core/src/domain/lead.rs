use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::profile::UserProfile;
use crate::domain::recommendation::{RecommendationSet, RecommendationSummary};
use crate::phone::to_e164;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub Uuid);

impl LeadId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadContact {
    #[serde(alias = "nome")]
    pub name: String,
    pub email: String,
    #[serde(alias = "telefone")]
    pub phone: String,
    #[serde(default, alias = "cidade")]
    pub city: Option<String>,
    #[serde(default, alias = "estado")]
    pub state: Option<String>,
    #[serde(default, alias = "lgpdConsent")]
    pub contact_consent: bool,
}

/// Everything the questionnaire collects in one submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    #[serde(flatten)]
    pub contact: LeadContact,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Payload handed to the lead store once recommendations exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationRecord {
    pub lead_id: LeadId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub postural_profile: String,
    pub recommendations: Vec<RecommendationSummary>,
    pub contact_consent: bool,
    pub submitted_at: DateTime<Utc>,
}

impl ConsultationRecord {
    pub fn new(
        lead_id: LeadId,
        submission: &LeadSubmission,
        recommendations: &RecommendationSet<'_>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let contact = &submission.contact;
        Self {
            lead_id,
            name: contact.name.trim().to_owned(),
            email: contact.email.trim().to_owned(),
            phone: to_e164(&contact.phone),
            city: contact.city.as_deref().and_then(non_blank),
            state: contact.state.as_deref().and_then(non_blank),
            height_cm: submission.profile.height_cm,
            weight_kg: submission.profile.weight_kg,
            postural_profile: submission.profile.postural_profile.as_str().to_owned(),
            recommendations: recommendations.iter().map(RecommendationSummary::from).collect(),
            contact_consent: contact.contact_consent,
            submitted_at,
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{ConsultationRecord, LeadId, LeadSubmission};
    use crate::catalog::Catalog;
    use crate::domain::profile::PosturalProfile;
    use crate::recommendation::generate_recommendations;

    #[test]
    fn submission_parses_flat_payload_with_legacy_names() {
        let submission: LeadSubmission = serde_json::from_str(
            r#"{
                "nome": "Ana Souza",
                "email": "ana@example.com",
                "telefone": "(11) 98765-4321",
                "cidade": "",
                "estado": "SP",
                "lgpdConsent": true,
                "altura": "172",
                "peso": "68",
                "perfilPostural": "equilibrado"
            }"#,
        )
        .expect("legacy submission should parse");

        assert_eq!(submission.contact.name, "Ana Souza");
        assert!(submission.contact.contact_consent);
        assert_eq!(submission.profile.height_cm, Some(172));
        assert_eq!(submission.profile.postural_profile, PosturalProfile::Balanced);
    }

    #[test]
    fn consultation_record_trims_blanks_and_summarizes_recommendations() {
        let submission: LeadSubmission = serde_json::from_str(
            r#"{
                "name": " Bruno ",
                "email": "bruno@example.com",
                "phone": "  ",
                "city": " ",
                "contactConsent": true,
                "heightCm": 190,
                "weightKg": 80,
                "posturalProfile": "balanced"
            }"#,
        )
        .expect("submission should parse");
        let catalog = Catalog::builtin().expect("catalog");
        let set = generate_recommendations(&submission.profile, &catalog).expect("recommend");

        let record = ConsultationRecord::new(LeadId::generate(), &submission, &set, Utc::now());

        assert_eq!(record.name, "Bruno");
        assert_eq!(record.phone, None);
        assert_eq!(record.city, None);
        assert_eq!(record.postural_profile, "balanced");
        assert_eq!(record.recommendations.len(), 3);
        assert_eq!(record.recommendations[0].category_id.as_str(), "director-president");
    }

    #[test]
    fn consultation_record_stores_phone_in_e164() {
        let submission: LeadSubmission = serde_json::from_str(
            r#"{
                "name": "Ana",
                "email": "ana@example.com",
                "phone": "(11) 98765-4321",
                "contactConsent": true,
                "heightCm": 170,
                "weightKg": 70,
                "posturalProfile": "balanced"
            }"#,
        )
        .expect("submission should parse");
        let catalog = Catalog::builtin().expect("catalog");
        let set = generate_recommendations(&submission.profile, &catalog).expect("recommend");

        let record = ConsultationRecord::new(LeadId::generate(), &submission, &set, Utc::now());

        assert_eq!(record.phone.as_deref(), Some("+5511987654321"));
    }
}
