pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

use commands::message::{MessageArgs, MessageKind};
use commands::recommend::RecommendArgs;

#[derive(Debug, Parser)]
#[command(
    name = "chairfit",
    about = "ChairFit operator CLI",
    long_about = "Run chair recommendations, preview outbound messages, inspect configuration, and check readiness.",
    after_help = "Examples:\n  chairfit recommend --height 190 --weight 80 --profile balanced\n  chairfit message --name Ana --height 170 --weight 70 --profile mild-asymmetry --kind team\n  chairfit doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[arg(long, help = "Height in centimeters (leading digits are used, e.g. 185cm)")]
    height: String,
    #[arg(long, help = "Weight in kilograms")]
    weight: String,
    #[arg(
        long,
        help = "Postural profile: balanced, accentuated-lordosis, accentuated-kyphosis, mild-asymmetry"
    )]
    profile: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Customer,
    Offer,
    Team,
}

impl From<KindArg> for MessageKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Customer => MessageKind::Customer,
            KindArg::Offer => MessageKind::Offer,
            KindArg::Team => MessageKind::Team,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute the ranked chair recommendations for a profile")]
    Recommend {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Include the per-rule evaluation trace")]
        explain: bool,
    },
    #[command(about = "List catalog categories and how many rules can select each")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Render (and optionally send) the WhatsApp message for a profile")]
    Message {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, help = "Customer name used in the greeting")]
        name: String,
        #[arg(long, default_value = "", help = "Customer email (shown in the team summary)")]
        email: String,
        #[arg(long, value_enum, default_value = "customer", help = "Message variant")]
        kind: KindArg,
        #[arg(long, value_name = "NUMBER", help = "Deliver through the configured gateway")]
        send_to: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog/rule consistency, and collaborator readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Recommend { profile, json, explain } => commands::recommend::run(&RecommendArgs {
            height: profile.height,
            weight: profile.weight,
            profile: profile.profile,
            json,
            explain,
        }),
        Command::Catalog { json } => commands::catalog::run(json),
        Command::Message { profile, name, email, kind, send_to } => {
            commands::message::run(&MessageArgs {
                name,
                email,
                height: profile.height,
                weight: profile.weight,
                profile: profile.profile,
                kind: kind.into(),
                send_to,
            })
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
