//! HTML for the web front-end. Everything here is a pure function of its
//! inputs, the handlers in `main.rs` do the talking to the prediction service.

use chrono::{DateTime, Utc};

use crate::api::*;
use crate::error::ClientError;

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
main{flex:1;padding:1.5rem 2rem}aside{width:16rem;padding:1.5rem;background:#f0f2f6}\
nav a{margin-right:1rem}.columns{display:flex;gap:2rem}.columns>*{flex:1}\
label{display:block;margin:.6rem 0}input,select{width:100%}\
.error{background:#fde4e4}.warning{background:#fff4d6}.info{background:#e3f0fc}\
.success{background:#ddf4e4}.error,.warning,.info,.success{padding:.8rem;border-radius:.4rem;margin:.6rem 0}\
progress{width:100%}table{border-collapse:collapse}td,th{padding:.3rem .8rem;border-bottom:1px solid #ddd}";

pub fn escape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            c => output.push(c),
        }
    }
    output
}
pub fn percent(probability: Probability) -> String {
    format!("{:.1}%", probability * 100.0)
}
fn message(class: &str, text: &str) -> String {
    format!("<div class=\"{}\">{}</div>", class, escape(text))
}
fn banner_class(level: RiskLevel) -> (&'static str, &'static str) {
    match level {
        RiskLevel::Critical => ("error", "⚠️"),
        RiskLevel::High => ("warning", "⚠️"),
        RiskLevel::Elevated => ("info", "ℹ️"),
        RiskLevel::Low => ("success", "✅"),
    }
}

pub fn page(api_url: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Fraud Detection</title>\
<style>{style}</style></head><body><main>\
<h1>🔍 Fraud Detection System</h1>\
<p><em>Ensemble Model: XGBoost + Random Forest Pipelines</em></p>\
<p><small>API: <code>{api_url}</code></small></p>\
<nav><a href=\"/\">🎯 Prediction</a><a href=\"/stats\">📊 Model Stats</a></nav>\
{body}</main>{sidebar}</body></html>",
        style = STYLE,
        api_url = escape(api_url),
        body = body,
        sidebar = sidebar(),
    )
}
fn sidebar() -> String {
    "<aside><h3>About</h3>\
<p><strong>Ensemble Model</strong> combining:</p><ul><li>XGBoost Pipeline</li><li>Random Forest Pipeline</li></ul>\
<p><strong>Method</strong>: Soft Voting (Average)</p>\
<h3>Note</h3>\
<div class=\"info\">Free tier APIs may sleep after inactivity. First request may take 30-60 seconds to wake up.</div>\
</aside>"
        .to_string()
}

pub fn form(categories: &[String], values: &TransactionForm) -> String {
    let options: String = categories
        .iter()
        .map(|category| {
            let selected = if *category == values.category {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{0}\"{1}>{0}</option>",
                escape(category),
                selected
            )
        })
        .collect();
    let number = |label: &str, name: &str, value: String, min: &str, max: &str, step: &str| {
        format!(
            "<label>{label}<input type=\"number\" name=\"{name}\" value=\"{value}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" required></label>"
        )
    };
    format!(
        "<h2>Transaction Fraud Check</h2><form method=\"post\" action=\"/check\"><div class=\"columns\">\
<div><h3>Transaction Details</h3><label>Category<select name=\"category\">{options}</select></label>{amount}{age}{days}</div>\
<div><h3>Behavioral Features</h3>{loc_delta}{loc_delta_mavg}{volume_mavg}{volume_mstd}{freq}</div>\
</div><hr><button type=\"submit\">🔍 Check for Fraud</button></form>",
        options = options,
        amount = number("Amount ($)", "amount", values.amount.to_string(), "0.01", "50000", "0.01"),
        age = number("Customer Age", "age", values.age.to_string(), "18", "90", "1"),
        days = number(
            "Days Until Card Expires",
            "days_until_expiry",
            values.days_until_expiry.to_string(),
            "0",
            "3650",
            "1"
        ),
        loc_delta = number(
            "Location Delta (distance from last)",
            "loc_delta",
            values.loc_delta.to_string(),
            "0",
            "1",
            "0.01"
        ),
        loc_delta_mavg = number(
            "Location Delta Avg (4h window)",
            "loc_delta_mavg",
            values.loc_delta_mavg.to_string(),
            "0",
            "1",
            "0.01"
        ),
        volume_mavg = number(
            "Avg Transaction Amount (4h)",
            "trans_volume_mavg",
            values.trans_volume_mavg.to_string(),
            "0",
            "10000",
            "0.01"
        ),
        volume_mstd = number(
            "Transaction Std Dev (4h)",
            "trans_volume_mstd",
            values.trans_volume_mstd.to_string(),
            "0",
            "5000",
            "0.01"
        ),
        freq = number(
            "Transaction Frequency (4h)",
            "trans_freq",
            values.trans_freq.to_string(),
            "1",
            "50",
            "1"
        ),
    )
}

pub fn verdict(response: &PredictionResponse, checked_at: DateTime<Utc>) -> String {
    let (class, icon) = banner_class(response.risk_level());
    let mut output = format!(
        "<hr><div class=\"{}\"><h2>{} {}</h2></div>",
        class,
        icon,
        escape(&response.verdict)
    );
    if let Some(id) = &response.transaction_id {
        output += &format!("<p><small>Transaction ID: {}</small></p>", escape(id));
    }
    output += &format!(
        "<p><small>Checked at {}</small></p>",
        checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    output += "<div class=\"columns\">";
    for (model, probability) in response.model_probabilities() {
        output += &format!(
            "<div><p>{}</p><h3>{}</h3><p>{}</p></div>",
            model,
            percent(probability),
            ModelCall::from_probability(probability)
        );
    }
    output += "</div>";
    let probability = response.ensemble_probability.clamp(0.0, 1.0);
    output += &format!(
        "<h3>Fraud Probability</h3><p>{}</p><progress value=\"{}\" max=\"1\"></progress>",
        response.ensemble_probability, probability
    );
    if !response.drift_warnings.is_empty() {
        output += "<div class=\"warning\"><strong>Drift Warnings:</strong><ul>";
        for warning in &response.drift_warnings {
            output += &format!("<li>{}</li>", escape(warning));
        }
        output += "</ul></div>";
    }
    let raw = serde_json::to_string_pretty(&response.raw).unwrap_or_default();
    output += &format!(
        "<details><summary>Raw API Response</summary><pre>{}</pre></details>",
        escape(&raw)
    );
    output
}

pub fn prediction_error(e: &ClientError) -> String {
    let mut output = match e {
        ClientError::Timeout { .. } => message("warning", &e.to_string()),
        ClientError::Invalid(_) => message("warning", &e.to_string()),
        _ => message("error", &e.to_string()),
    };
    if let Some(hint) = e.hint() {
        output += &message("info", hint);
    }
    output
}
pub fn stats_error(e: &ClientError) -> String {
    match e {
        ClientError::Timeout { .. } => {
            message("warning", "⏰ API is waking up (free tier cold start)")
                + &message(
                    "info",
                    "This takes 30-60 seconds on first request. Please refresh the page in a moment.",
                )
        }
        ClientError::Connection { url, .. } => {
            message("warning", &format!("Cannot connect to API at {}", url))
                + &message(
                    "info",
                    "The API may be sleeping (free tier). Try again in 30 seconds.",
                )
        }
        e => message("error", &format!("Error: {}", e)),
    }
}

pub fn model_info(info: &ModelInfoResponse) -> String {
    let mut output = String::from("<h3>Model Metrics (Test Set)</h3>");
    let rows = info.metric_rows();
    if !rows.is_empty() {
        output += "<table><tr><th></th>";
        for name in METRIC_NAMES {
            output += &format!("<th>{}</th>", name);
        }
        output += "</tr>";
        for (model, values) in rows {
            output += &format!("<tr><th>{}</th>", escape(&model));
            for value in values {
                output += &format!("<td>{:.4}</td>", value);
            }
            output += "</tr>";
        }
        output += "</table>";
    }
    output += &format!(
        "<div class=\"columns\"><div><p>Training Samples</p><h3>{}</h3></div>\
<div><p>Test Samples</p><h3>{}</h3></div><div><p>Features</p><h3>{}</h3></div></div>",
        thousands(info.training_samples),
        thousands(info.test_samples),
        info.feature_columns.len()
    );
    output += "<h3>Features Used</h3><div class=\"columns\">";
    for (title, columns) in [
        ("Categorical", &info.categorical_columns),
        ("Numeric", &info.numeric_columns),
    ] {
        output += &format!("<div><strong>{}:</strong><ul>", title);
        for column in columns {
            output += &format!("<li><code>{}</code></li>", escape(column));
        }
        output += "</ul></div>";
    }
    output += "</div>";
    output
}
pub fn log_summary(summary: &LogSummaryResponse) -> String {
    format!(
        "<hr><h3>Inference Monitoring</h3><div class=\"columns\">\
<div><p>Total Predictions</p><h3>{}</h3></div>\
<div><p>Fraud Detected</p><h3>{}</h3></div>\
<div><p>Fraud Rate</p><h3>{:.1}%</h3></div>\
<div><p>Drift Warnings</p><h3>{}</h3></div></div>",
        summary.total_predictions,
        summary.fraud_predictions,
        summary.fraud_rate,
        summary.predictions_with_drift
    )
}
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            output.push(',');
        }
        output.push(c);
    }
    output
}
