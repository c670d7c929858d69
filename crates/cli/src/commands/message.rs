use chairfit_core::domain::lead::LeadContact;
use chairfit_core::domain::profile::UserProfile;
use chairfit_core::messaging::{customer_message, offer_message, team_summary};
use chairfit_core::phone::normalize_whatsapp_number;
use chairfit_core::recommendation::RecommendationEngine;
use chairfit_gateway::{HttpMessagingGateway, MessagingGateway};
use serde::Serialize;

use crate::commands::{load_catalog, CommandResult, EXIT_CONFIG, EXIT_ENGINE, EXIT_GATEWAY};

const COMMAND: &str = "message";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Customer,
    Offer,
    Team,
}

#[derive(Debug, Clone, Default)]
pub struct MessageArgs {
    pub name: String,
    pub email: String,
    pub height: String,
    pub weight: String,
    pub profile: String,
    pub kind: MessageKind,
    /// Deliver through the configured gateway instead of only printing.
    pub send_to: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeliveryReport {
    command: &'static str,
    status: &'static str,
    kind: MessageKind,
    number: String,
    message_id: Option<String>,
}

pub fn run(args: &MessageArgs) -> CommandResult {
    let (config, catalog) = match load_catalog(COMMAND) {
        Ok(loaded) => loaded,
        Err(result) => return result,
    };

    let contact = LeadContact {
        name: args.name.clone(),
        email: args.email.clone(),
        phone: args.send_to.clone().unwrap_or_default(),
        contact_consent: true,
        ..LeadContact::default()
    };
    let profile = UserProfile::from_raw(&args.height, &args.weight, &args.profile);
    let set = match RecommendationEngine::new().generate(&profile, &catalog) {
        Ok(set) => set,
        Err(error) => {
            return CommandResult::failure(COMMAND, "engine", error.to_string(), EXIT_ENGINE)
        }
    };

    let branding = config.contact.branding();
    let text = match args.kind {
        MessageKind::Customer => customer_message(&contact, set.primary(), &branding),
        MessageKind::Offer => offer_message(&contact, set.primary(), &branding),
        MessageKind::Team => team_summary(&contact, &profile, &set, &branding),
    };

    let Some(number) = args.send_to.as_deref() else {
        return CommandResult::text(text);
    };

    if !config.messaging.enabled {
        return CommandResult::failure(
            COMMAND,
            "config_validation",
            "messaging.enabled must be true to send messages",
            EXIT_CONFIG,
        );
    }
    let gateway = match HttpMessagingGateway::from_config(&config.messaging) {
        Ok(gateway) => gateway,
        Err(error) => {
            return CommandResult::failure(COMMAND, "gateway", error.to_string(), EXIT_GATEWAY)
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            )
        }
    };

    match runtime.block_on(gateway.send_text(number, &text)) {
        Ok(receipt) => CommandResult::json(
            COMMAND,
            &DeliveryReport {
                command: COMMAND,
                status: "ok",
                kind: args.kind,
                number: receipt.number,
                message_id: receipt.message_id,
            },
        ),
        Err(error) => CommandResult::failure(
            COMMAND,
            "gateway",
            format!("delivery to {} failed: {error}", normalize_whatsapp_number(number)),
            EXIT_GATEWAY,
        ),
    }
}
