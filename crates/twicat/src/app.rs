//! Startup sequence
//!
//! Listener, tunnel, credentials, number, public URL, callback update, then
//! idle until the run is cancelled. Every step is fatal on failure.

use std::sync::Arc;

use tracing::{error, info};
use twicat_core::{Config, Credentials, RunContext};
use twicat_provider::{PhoneNumber, ProviderClient};
use twicat_tunnel::{TunnelHandle, TunnelInspector, TunnelLauncher};
use twicat_webhook::{CallbackListener, StdoutSink};

use crate::cli::Prompter;
use crate::error::{AppError, Result};

/// Map the operator's choice back to a fetched number
pub fn resolve_selection<'a>(numbers: &'a [PhoneNumber], sid: &str) -> Result<&'a PhoneNumber> {
    numbers
        .iter()
        .find(|n| n.sid == sid)
        .ok_or_else(|| AppError::NumberNotFound(sid.to_string()))
}

/// One twicat run
pub struct App<P: Prompter> {
    config: Config,
    ctx: RunContext,
    prompter: P,
    tunnel: Option<TunnelHandle>,
}

impl<P: Prompter> App<P> {
    pub fn new(config: Config, ctx: RunContext, prompter: P) -> Self {
        Self {
            config,
            ctx,
            prompter,
            tunnel: None,
        }
    }

    /// Run the whole sequence. Only returns `Ok` once the run is cancelled.
    pub async fn run(&mut self) -> Result<()> {
        let listener = CallbackListener::bind(
            &self.config.listener.host,
            Arc::new(StdoutSink),
            self.ctx.clone(),
        )
        .await
        .map_err(AppError::Server)?;
        let port = listener.port();

        tokio::spawn(async move {
            if let Err(e) = listener.serve().await {
                error!("Callback listener error: {}", e);
            }
        });

        let tunnel = TunnelLauncher::new(self.config.tunnel.binary.as_str())
            .launch(port, self.ctx.clone())
            .map_err(AppError::Tunnel)?;
        self.tunnel = Some(tunnel);

        let number = self.provision(port).await?;

        println!();
        println!(
            "Waiting for messages to {} (Ctrl+C to quit)",
            number.phone_number
        );

        self.ctx.cancelled().await;
        Ok(())
    }

    /// Credentials, number selection and callback configuration for an
    /// already exposed `port`
    pub async fn provision(&self, port: u16) -> Result<PhoneNumber> {
        let account_sid = self
            .prompter
            .account_sid()
            .await
            .map_err(AppError::AccountSid)?;
        let auth_token = self
            .prompter
            .auth_token()
            .await
            .map_err(AppError::AuthToken)?;

        let provider = ProviderClient::new(
            &self.config.provider.base_url,
            Credentials::new(account_sid, auth_token),
            self.config.provider.timeout(),
        )
        .map_err(AppError::FetchNumbers)?;

        let numbers = provider
            .list_numbers()
            .await
            .map_err(AppError::FetchNumbers)?;

        let choice = self
            .prompter
            .select_number(&numbers)
            .await
            .map_err(AppError::SelectPrompt)?;
        let number = resolve_selection(&numbers, &choice)?.clone();

        let public_url = TunnelInspector::new(
            &self.config.tunnel.inspector_url,
            self.config.provider.timeout(),
        )
        .map_err(AppError::TunnelUrl)?
        .with_retry(
            self.config.tunnel.inspect_attempts,
            self.config.tunnel.inspect_backoff(),
        )
        .public_url(port)
        .await
        .map_err(AppError::TunnelUrl)?;

        provider
            .update_sms_url(&number.sid, &public_url)
            .await
            .map_err(AppError::Callback)?;

        info!(
            number = %number.phone_number,
            url = %public_url,
            "SMS callback configured"
        );
        Ok(number)
    }

    /// Stop the tunnel and the listener after a fatal error.
    ///
    /// A tunnel that cannot be killed aborts the process.
    pub async fn teardown(&mut self) {
        if let Some(tunnel) = self.tunnel.take() {
            if let Err(e) = tunnel.shutdown().await {
                error!("Unable to kill tunnel: {}", e);
                std::process::abort();
            }
        }
        self.ctx.shutdown();
    }
}
