//! Outbound text composition for the messaging gateway.

use serde::{Deserialize, Serialize};

use crate::domain::lead::LeadContact;
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::{Recommendation, RecommendationSet};
use crate::phone::format_phone_mask;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub company_name: String,
    pub sales_email: String,
    pub website: String,
    pub offer_discount_pct: u8,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company_name: "ChairFit".to_string(),
            sales_email: "sales@chairfit.example".to_string(),
            website: "https://chairfit.example".to_string(),
            offer_discount_pct: 10,
        }
    }
}

pub fn customer_message(
    contact: &LeadContact,
    recommendation: &Recommendation<'_>,
    branding: &Branding,
) -> String {
    let mut message = format!("Hello {}! 👋\n\n", contact.name.trim());
    message.push_str(&format!(
        "We know how much everyday comfort matters, and based on your profile our special recommendation is the {}!\n\n",
        recommendation.category.label
    ));
    message.push_str("💡 *Why it is perfect for you:*\n");
    message.push_str(&format!("{}\n\n", recommendation.justification));
    push_contact_footer(&mut message, branding, &branding.website);
    message
}

/// Single-chair variant carrying the discount offer and the feature preview.
pub fn offer_message(
    contact: &LeadContact,
    recommendation: &Recommendation<'_>,
    branding: &Branding,
) -> String {
    let category = recommendation.category;
    let mut message = format!("*Hello {}! 👋*\n\n", contact.name.trim());
    message.push_str(&format!(
        "Based on your profile, our special recommendation is the *{}*!\n",
        category.label
    ));
    message.push_str(&format!("{}\n\n", category.description));

    if branding.offer_discount_pct > 0 {
        message.push_str("🎁 *SPECIAL OFFER FOR YOU:*\n");
        message.push_str(&format!("• *{}% exclusive discount*\n\n", branding.offer_discount_pct));
    }

    message.push_str("💡 *Why it is perfect for you:*\n");
    message.push_str(&format!("{}\n\n", recommendation.justification));

    let features = category.feature_preview();
    if !features.is_empty() {
        message.push_str("✅ *Main features:*\n");
        for feature in features {
            message.push_str(&format!("• {feature}\n"));
        }
        message.push('\n');
    }

    let chair_page = format!("{}/chair", branding.website.trim_end_matches('/'));
    push_contact_footer(&mut message, branding, &chair_page);
    message
}

/// Internal notification for the sales team.
pub fn team_summary(
    contact: &LeadContact,
    profile: &UserProfile,
    recommendations: &RecommendationSet<'_>,
    branding: &Branding,
) -> String {
    let highlights: Vec<&str> =
        recommendations.high_priority().map(|entry| entry.category.label.as_str()).collect();

    let mut message = format!("*New consultation - {}*\n\n", branding.company_name);
    message.push_str(&format!("👤 *Customer:* {}\n", contact.name.trim()));
    message.push_str(&format!("📧 *Email:* {}\n", contact.email.trim()));
    message.push_str(&format!("📱 *Phone:* {}\n", format_phone_mask(contact.phone.trim())));
    message.push_str(&format!(
        "📏 *Measurements:* {}cm x {}kg\n",
        display_measurement(profile.height_cm),
        display_measurement(profile.weight_kg)
    ));
    message.push_str(&format!("🎯 *Profile:* {}\n", profile.postural_profile.display_name()));
    message.push_str(&format!("🪑 *Top recommendations:* {}\n\n", highlights.join(", ")));
    message.push_str("*Awaiting contact for a personalized proposal*");
    message
}

fn push_contact_footer(message: &mut String, branding: &Branding, link: &str) {
    message.push_str("📞 *Get in touch now to secure your offer:*\n");
    message.push_str(&format!("Email: {}\n", branding.sales_email));
    message.push_str(&format!("Site: {link}\n\n"));
    message.push_str(&format!("*{} - Transforming your workspace!* 🪑✨", branding.company_name));
}

fn display_measurement(value: Option<i32>) -> String {
    value.map(|value| value.to_string()).unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::{customer_message, offer_message, team_summary, Branding};
    use crate::catalog::Catalog;
    use crate::domain::lead::LeadContact;
    use crate::domain::profile::{PosturalProfile, UserProfile};
    use crate::recommendation::generate_recommendations;

    fn contact() -> LeadContact {
        LeadContact {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "(11) 98765-4321".to_string(),
            contact_consent: true,
            ..LeadContact::default()
        }
    }

    #[test]
    fn customer_message_uses_primary_recommendation() {
        let catalog = Catalog::builtin().expect("catalog");
        let set = generate_recommendations(
            &UserProfile::new(170, 70, PosturalProfile::AccentuatedKyphosis),
            &catalog,
        )
        .expect("recommend");

        let message = customer_message(&contact(), set.primary(), &Branding::default());

        assert!(message.starts_with("Hello Ana!"));
        assert!(message.contains("Director / President Chair"));
        assert!(message.contains("BackSystem"));
        assert!(message.contains("sales@chairfit.example"));
    }

    #[test]
    fn offer_message_lists_feature_preview_and_discount() {
        let catalog = Catalog::builtin().expect("catalog");
        let set = generate_recommendations(
            &UserProfile::new(170, 110, PosturalProfile::Balanced),
            &catalog,
        )
        .expect("recommend");
        let branding = Branding { offer_discount_pct: 15, ..Branding::default() };

        let message = offer_message(&contact(), set.primary(), &branding);

        assert!(message.contains("15% exclusive discount"));
        let features = set.primary().category.feature_preview();
        for feature in features {
            assert!(message.contains(feature.as_str()));
        }
        assert!(!message.contains("Class 4 gas lift"), "only the preview is listed");
        assert!(message.contains("https://chairfit.example/chair"));
    }

    #[test]
    fn offer_message_omits_discount_when_disabled() {
        let catalog = Catalog::builtin().expect("catalog");
        let set = generate_recommendations(
            &UserProfile::new(170, 70, PosturalProfile::Balanced),
            &catalog,
        )
        .expect("recommend");
        let branding = Branding { offer_discount_pct: 0, ..Branding::default() };

        assert!(!offer_message(&contact(), set.primary(), &branding).contains("SPECIAL OFFER"));
    }

    #[test]
    fn team_summary_lists_only_high_priority_labels() {
        let catalog = Catalog::builtin().expect("catalog");
        let profile = UserProfile::new(190, 70, PosturalProfile::Balanced);
        let set = generate_recommendations(&profile, &catalog).expect("recommend");

        let summary = team_summary(&contact(), &profile, &set, &Branding::default());

        assert!(summary.contains("190cm x 70kg"));
        assert!(summary.contains("Director / President Chair, Executive Mesh Chair"));
        assert!(!summary.contains("Secretary Chair"));
        assert!(summary.contains("*Profile:* Balanced"));
        assert!(summary.contains("*Phone:* (11) 98765-4321"));
    }

    #[test]
    fn team_summary_masks_bare_mobile_digits() {
        let catalog = Catalog::builtin().expect("catalog");
        let profile = UserProfile::new(170, 70, PosturalProfile::Balanced);
        let set = generate_recommendations(&profile, &catalog).expect("recommend");
        let contact = LeadContact { phone: "11987654321".to_string(), ..contact() };

        let summary = team_summary(&contact, &profile, &set, &Branding::default());

        assert!(summary.contains("📱 *Phone:* (11) 98765-4321\n"));
    }
}
