//! Payment backend server binary.
//!
//! Loads configuration, constructs an adapter for each configured
//! integration, and serves the proxy API. A missing integration section
//! disables its endpoints instead of failing startup.

use std::sync::Arc;

use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use payment_backend::adapters::firebase::{
    FirebaseAuthClient, FirestoreRecordStore, ServiceAccountKey, TokenProvider,
};
use payment_backend::adapters::http::{app_router, AppState};
use payment_backend::adapters::mailersend::{MailerSendClient, MailerSendConfig};
use payment_backend::adapters::midtrans::{MidtransClient, MidtransClientConfig};
use payment_backend::config::AppConfig;
use payment_backend::ports::{EmailSender, IdentityProvider, PaymentGateway, PaymentRecordStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let state = build_state(&config);

    tracing::info!(
        port = config.server.port,
        environment = ?config.server.environment,
        "payment backend starting"
    );
    tracing::info!(
        firebase = state.firebase_enabled(),
        email = state.email_config_ok(),
        midtrans = state.midtrans_config_ok(),
        "integration status"
    );
    tracing::info!("payment records are created by the frontend; this service only updates status");

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Construct the shared state from whichever integrations are configured.
fn build_state(config: &AppConfig) -> AppState {
    let email_sender: Option<Arc<dyn EmailSender>> = config.email.as_ref().map(|email| {
        let mut client_config = MailerSendConfig::new(email.api_key.clone());
        if let Some(base_url) = &email.api_base_url {
            client_config = client_config.with_base_url(base_url.clone());
        }
        Arc::new(MailerSendClient::new(client_config)) as Arc<dyn EmailSender>
    });

    let gateway: Option<Arc<dyn PaymentGateway>> = config.midtrans.as_ref().map(|midtrans| {
        let mut client_config = MidtransClientConfig::new(midtrans.server_key.clone());
        if let Some(snap_url) = &midtrans.snap_base_url {
            client_config = client_config.with_snap_base_url(snap_url.clone());
        }
        if let Some(api_url) = &midtrans.api_base_url {
            client_config = client_config.with_api_base_url(api_url.clone());
        }
        Arc::new(MidtransClient::new(client_config)) as Arc<dyn PaymentGateway>
    });

    let gateway_server_key = config
        .midtrans
        .as_ref()
        .map(|midtrans| SecretString::new(midtrans.server_key.clone()));

    let (record_store, identity): (
        Option<Arc<dyn PaymentRecordStore>>,
        Option<Arc<dyn IdentityProvider>>,
    ) = match &config.firebase {
        Some(firebase) => {
            let mut key = ServiceAccountKey::new(
                firebase.project_id.clone(),
                firebase.client_email.clone(),
                firebase.normalized_private_key(),
            );
            if let Some(key_id) = &firebase.private_key_id {
                key = key.with_private_key_id(key_id.clone());
            }
            if let Some(token_uri) = &firebase.token_uri {
                key = key.with_token_uri(token_uri.clone());
            }

            let tokens = Arc::new(TokenProvider::new(key));
            let store = FirestoreRecordStore::new(firebase.project_id.clone(), tokens.clone());
            let auth = FirebaseAuthClient::new(tokens);

            (
                Some(Arc::new(store) as Arc<dyn PaymentRecordStore>),
                Some(Arc::new(auth) as Arc<dyn IdentityProvider>),
            )
        }
        None => (None, None),
    };

    AppState {
        email_sender,
        gateway,
        record_store,
        identity,
        gateway_server_key,
    }
}
