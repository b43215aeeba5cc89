//! Rendering of check and listing results for API and CLI consumers, as
//! JSON or as plain text.

use crate::{CheckOutcome, Principal, PrincipalListing};
use serde::Serialize;
use std::fmt::Write as _;

const STATUS_OK: &str = "ok";
const STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct Response<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    principals: Option<ListResponse<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<CheckStatus<'a>>,
}

#[derive(Debug, Serialize)]
struct ListResponse<'a> {
    #[serde(skip_serializing_if = "<[Principal]>::is_empty")]
    list: &'a [Principal],
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CheckStatus<'a> {
    pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<&'a str>,
}

impl<'a> Response<'a> {
    fn ok() -> Self {
        Self {
            status: STATUS_OK,
            error: None,
            principals: None,
            check: None,
        }
    }
}

pub fn render_check(outcome: &CheckOutcome, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Json => {
            let response = Response {
                check: Some(CheckStatus {
                    pass: outcome.is_pass(),
                    reason: outcome.reason(),
                    checksum: outcome.checksum(),
                }),
                ..Response::ok()
            };
            Ok(serde_json::to_string(&response)?)
        }
        Format::Text => {
            let mut text = String::new();
            match outcome {
                CheckOutcome::Pass { .. } => writeln!(text, "pass")?,
                CheckOutcome::Fail { reason } => writeln!(text, "fail,{}", reason)?,
            }
            text.push_str(STATUS_OK);
            Ok(text)
        }
    }
}

pub fn render_listing(listing: &PrincipalListing, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Json => {
            let response = Response {
                principals: Some(ListResponse {
                    list: &listing.principals,
                    checksum: listing.checksum.as_deref(),
                }),
                ..Response::ok()
            };
            Ok(serde_json::to_string(&response)?)
        }
        Format::Text => {
            let mut text = String::new();
            for principal in &listing.principals {
                writeln!(text, "{}", principal)?;
            }
            text.push_str(STATUS_OK);
            Ok(text)
        }
    }
}

pub fn render_success(format: Format) -> anyhow::Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string(&Response::ok())?),
        Format::Text => Ok(STATUS_OK.to_owned()),
    }
}

pub fn render_error(message: &str, format: Format) -> String {
    match format {
        Format::Json => {
            let response = Response {
                status: STATUS_ERROR,
                error: Some(message),
                ..Response::ok()
            };
            serde_json::to_string(&response)
                .unwrap_or_else(|_| format!(r#"{{"status":"{}"}}"#, STATUS_ERROR))
        }
        Format::Text => format!("errr: {}", message),
    }
}
