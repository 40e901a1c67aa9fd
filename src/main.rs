#![allow(dead_code)]
use crate::api::*;
use crate::client::Client;
use crate::settings::Settings;
use anyhow::{Context, Result};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use axum_macros::debug_handler;
use chrono::Utc;
use clap::Parser;
use env_logger::{Builder, Env, WriteStyle};
use log::{debug, info};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::task::JoinHandle;

mod api;
mod client;
mod error;
#[cfg(test)]
mod mock;
mod settings;
mod ui;

struct AppState {
    client: Client,
}
type SharedState = Arc<AppState>;

#[debug_handler]
async fn index(State(state): State<SharedState>) -> Html<String> {
    let categories = state.client.categories().await;
    let values = TransactionForm {
        category: categories.first().cloned().unwrap_or_default(),
        ..Default::default()
    };
    Html(ui::page(
        state.client.url(),
        &ui::form(&categories, &values),
    ))
}
#[debug_handler]
async fn check_transaction(
    State(state): State<SharedState>,
    form: Result<Form<TransactionForm>, FormRejection>,
) -> Html<String> {
    let categories = state.client.categories().await;
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            debug!("Rejected form: {}", rejection);
            let body = ui::form(&categories, &TransactionForm::default())
                + &format!(
                    "<div class=\"warning\">Invalid input: {}</div>",
                    ui::escape(&rejection.body_text())
                );
            return Html(ui::page(state.client.url(), &body));
        }
    };
    debug!(
        "Checking {} transaction over {}",
        form.category, form.amount
    );
    let mut body = ui::form(&categories, &form);
    match state.client.submit(&form).await {
        Ok(response) => {
            info!(
                "Verdict {} ({}) for transaction {}",
                response.verdict,
                ui::percent(response.ensemble_probability),
                response.transaction_id.as_deref().unwrap_or("-")
            );
            body += &ui::verdict(&response, Utc::now());
        }
        Err(e) => {
            log_client_err(&e);
            body += &ui::prediction_error(&e);
        }
    }
    Html(ui::page(state.client.url(), &body))
}
#[debug_handler]
async fn stats(State(state): State<SharedState>) -> Html<String> {
    let mut body = String::from("<h2>Model Performance &amp; Monitoring</h2>");
    match state.client.model_info().await {
        Ok(info) => body += &ui::model_info(&info),
        Err(e) => {
            log_client_err(&e);
            body += &ui::stats_error(&e);
            if e.is_cold_start() {
                return Html(ui::page(state.client.url(), &body));
            }
        }
    }
    match state.client.log_summary().await {
        Ok(summary) => body += &ui::log_summary(&summary),
        Err(e) => {
            log_client_err(&e);
            body += &ui::stats_error(&e);
        }
    }
    Html(ui::page(state.client.url(), &body))
}

#[derive(Parser)]
struct Args {
    /// Base url of the prediction service, overrides API_URL
    #[arg(short, long)]
    url: Option<String>,
    #[arg(short, long)]
    port: Option<u16>,
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .write_style(WriteStyle::Always)
        .init();
    let cli = Args::parse();
    let settings = Settings::load()?.with_api_url(cli.url);
    let port = cli.port.unwrap_or(settings.port);
    info!("Forwarding predictions to {}", settings.api_url);
    let (_port, handle) = run_server(&cli.host, Some(port), &settings)?;
    handle.await?;
    Ok(())
}

fn app(settings: &Settings) -> Result<Router> {
    let state = Arc::new(AppState {
        client: Client::new(settings)?,
    });
    Ok(Router::new()
        .route("/", get(index))
        .route("/check", post(check_transaction))
        .route("/stats", get(stats))
        .with_state(state))
}

/// `host` is a bare ip address, v4 or v6, without port or brackets.
fn bind_addr(host: &str, port: Option<u16>) -> Result<SocketAddr> {
    let ip = host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid host address {}", host))?;
    Ok(SocketAddr::new(ip, port.unwrap_or(0)))
}

fn run_server(
    host: &str,
    port: Option<u16>,
    settings: &Settings,
) -> Result<(u16, JoinHandle<()>)> {
    let app = app(settings)?;
    let addr = bind_addr(host, port)?;
    let server = axum::Server::try_bind(&addr)?.serve(app.into_make_service());
    let port = server.local_addr().port();
    info!("Listening on {}", server.local_addr());
    let handle = tokio::spawn(async move {
        if let Err(e) = server.await {
            log::error!("Server stopped: {}", e);
        }
    });
    Ok((port, handle))
}
