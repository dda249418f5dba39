//! The `serve` command: token exchange endpoint.

use std::sync::Arc;

use log::warn;
use tokio::net::TcpListener;

use mileage_core::oauth::TokenExchanger;

use crate::app::AppContext;
use crate::cli::ServeArgs;
use crate::constants::EXCHANGE_TOKEN_PATH;
use crate::errors::CliError;
use crate::server;
use crate::ui::{self, Badge};

pub fn handle_serve(app: &AppContext, args: &ServeArgs) -> anyhow::Result<()> {
    let ctx = app.ui(false);
    let oauth = app.config()?.oauth_config();
    if !oauth.has_credentials() {
        warn!("OAuth client id or secret missing; exchanges will fail until configured");
    }
    let exchanger = Arc::new(TokenExchanger::new(oauth)?);

    let runtime = app.runtime()?;
    let listener = runtime.block_on(TcpListener::bind(args.bind.as_str())).map_err(|e| {
        CliError::invalid_input(format!("Cannot listen on {}: {}", args.bind, e))
    })?;
    let addr = listener.local_addr()?;

    if !app.quiet() {
        ui::print(
            &ctx,
            &ui::badge(
                &ctx,
                Badge::Ok,
                &format!("Listening on http://{}{}", addr, EXCHANGE_TOKEN_PATH),
            ),
        );
    }

    runtime.block_on(server::run(listener, exchanger))
}
