use anyhow::Context;
use clap::Parser;
use env_logger;
use log::{info, warn};
use std::sync::Arc;

use laurentia_invitation_service::{InviteStateMachine, SubmissionController};
use laurentia_shared::config::{ClientConfig, IdentityConfig};
use laurentia_shared::remote::RemoteInviteClient;
use laurentia_shared::store::file::FileIdentityStore;

mod render;

/// Look up an event invite and, if needed, ask for one.
#[derive(Parser, Debug)]
#[command(name = "laurentia-invite", version)]
struct Args {
    /// Event identifier
    id: String,
    /// Alias the event was shared under
    name: String,
    /// Request an invite for this email address
    #[arg(long, conflicts_with = "change_email")]
    email: Option<String>,
    /// Forget the stored email before loading
    #[arg(long)]
    change_email: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Resolving invite for event {}/{}", args.id, args.name);

    let client_config = ClientConfig::from_env().context("invite endpoint configuration")?;
    let identity_config = IdentityConfig::from_env().context("identity store configuration")?;

    let service = Arc::new(RemoteInviteClient::new(client_config));
    info!("Using invite endpoint {}", service.endpoint());
    let store = Arc::new(FileIdentityStore::from_config(&identity_config));
    let machine = Arc::new(InviteStateMachine::new(service, store));
    let controller = SubmissionController::new(machine.clone());

    let mut state = machine.load(&args.id, &args.name).await;

    if args.change_email {
        state = controller.change_email().await?;
    } else if let Some(email) = args.email.as_deref() {
        if state.offers_submission_form() {
            state = controller.submit(&args.id, &args.name, email).await?;
        } else {
            warn!(
                "Not submitting {}: invite state is {}",
                email,
                state.label()
            );
        }
    }

    println!("{}", render::render(&state));
    Ok(())
}
