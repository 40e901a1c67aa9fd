#![allow(dead_code)]
use std::process::ExitCode;

use anyhow::Result;
use api::*;
use chrono::Utc;
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env, WriteStyle};
use log::debug;

use crate::client_blocking::Client;
use crate::error::ClientError;
use crate::settings::Settings;

mod api;
mod client_blocking;
mod error;
#[cfg(test)]
mod mock;
mod settings;

#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Base url of the prediction service, overrides API_URL
    #[arg(short, long)]
    url: Option<String>,
}
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the service whether a transaction looks fraudulent
    Predict {
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value_t = default_amount())]
        amount: f64,
        #[arg(long, default_value_t = default_age())]
        age: u32,
        #[arg(long, default_value_t = default_days_until_expiry())]
        days_until_expiry: u32,
        #[arg(long, default_value_t = default_loc_delta())]
        loc_delta: f64,
        #[arg(long, default_value_t = default_loc_delta_mavg())]
        loc_delta_mavg: f64,
        #[arg(long, default_value_t = default_trans_volume_mavg())]
        trans_volume_mavg: f64,
        #[arg(long, default_value_t = default_trans_volume_mstd())]
        trans_volume_mstd: f64,
        #[arg(long, default_value_t = default_trans_freq())]
        trans_freq: u32,
        /// Print the service's response as is
        #[arg(long)]
        raw: bool,
    },
    ModelInfo,
    Stats,
    Categories,
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .write_style(WriteStyle::Auto)
        .init();
    let cli = Args::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ClientError>() {
                Some(e) => {
                    eprintln!("{}", e);
                    if let Some(hint) = e.hint() {
                        eprintln!("{}", hint);
                    }
                }
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Args) -> Result<()> {
    let settings = Settings::load()?.with_api_url(cli.url);
    let client = Client::new(&settings)?;
    debug!("Using API at {}", client.url());

    match cli.command {
        Commands::Predict {
            category,
            amount,
            age,
            days_until_expiry,
            loc_delta,
            loc_delta_mavg,
            trans_volume_mavg,
            trans_volume_mstd,
            trans_freq,
            raw,
        } => {
            let form = TransactionForm {
                category,
                amount,
                age,
                days_until_expiry,
                loc_delta,
                loc_delta_mavg,
                trans_volume_mavg,
                trans_volume_mstd,
                trans_freq,
            };
            let response = client.submit(&form).inspect_err(log_client_err)?;
            if raw {
                println!("{}", serde_json::to_string_pretty(&response.raw)?);
            } else {
                print!("{}", verdict_report(&response));
                println!("Checked at {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
        Commands::ModelInfo => {
            let info = client.model_info().inspect_err(log_client_err)?;
            print!("{}", model_info_report(&info));
        }
        Commands::Stats => {
            let summary = client.log_summary().inspect_err(log_client_err)?;
            println!("Total predictions: {}", summary.total_predictions);
            println!("Fraud detected:    {}", summary.fraud_predictions);
            println!("Fraud rate:        {:.1}%", summary.fraud_rate);
            println!("Drift warnings:    {}", summary.predictions_with_drift);
        }
        Commands::Categories => {
            for category in client.categories() {
                println!("{}", category);
            }
        }
    }
    Ok(())
}

fn verdict_report(response: &PredictionResponse) -> String {
    let mut output = format!(
        "{} [{} risk]\n",
        response.verdict,
        response.risk_level()
    );
    if let Some(id) = &response.transaction_id {
        output += &format!("Transaction ID: {}\n", id);
    }
    for (model, probability) in response.model_probabilities() {
        output += &format!(
            "{:<14}{:>7.1}%  {}\n",
            model.to_string(),
            probability * 100.0,
            ModelCall::from_probability(probability)
        );
    }
    output += &format!("Fraud probability: {}\n", response.ensemble_probability);
    for warning in &response.drift_warnings {
        output += &format!("Drift warning: {}\n", warning);
    }
    output
}
fn model_info_report(info: &ModelInfoResponse) -> String {
    let mut output = format!("{:<14}", "");
    for name in METRIC_NAMES {
        output += &format!("{:>10}", name);
    }
    output += "\n";
    for (model, values) in info.metric_rows() {
        output += &format!("{:<14}", model);
        for value in values {
            output += &format!("{:>10.4}", value);
        }
        output += "\n";
    }
    output += &format!(
        "Training samples: {}\nTest samples: {}\nFeatures: {}\n",
        info.training_samples,
        info.test_samples,
        info.feature_columns.len()
    );
    output
}
