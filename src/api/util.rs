use log::{debug, warn};
use serde_json::Value;

use super::*;
use crate::error::ClientError;

/// Joins the configured base url and an endpoint path. Base urls are usually
/// given with a trailing slash, which would otherwise produce `//predict`.
pub fn endpoint(base: &str, path: &str) -> String {
    base.trim_end_matches('/').to_string() + path
}
/// Category choices for the form, read from a raw `/model-info` body. The
/// service's own list wins when it can be fetched. Only `category_classes` is
/// looked at, so a sleeping service or an odd field elsewhere in the body must
/// not keep the form from rendering.
pub fn categories_or_fallback(info: Result<Value, ClientError>) -> Vec<String> {
    let mut categories: Vec<String> = match info {
        Ok(info) => info
            .get("category_classes")
            .and_then(Value::as_array)
            .map(|classes| {
                classes
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        Err(e) => {
            debug!("Using fallback categories: {}", error_chain(&e));
            vec![]
        }
    };
    if categories.is_empty() {
        categories = FALLBACK_CATEGORIES.iter().map(|c| c.to_string()).collect();
    }
    categories.sort();
    categories
}
pub fn log_client_err(e: &ClientError) {
    warn!("{}", error_chain(e));
}
/// The error and all of its sources on one line.
pub fn error_chain(e: &dyn std::error::Error) -> String {
    let mut output = e.to_string();
    let mut source = e.source();
    while let Some(e) = source {
        output += ": ";
        output += &e.to_string();
        source = e.source();
    }
    output
}
