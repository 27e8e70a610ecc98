use super::model::{DateRange, InvoiceList, QueryPayload};
use crate::conf::Conf;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

static INVOICE_LIST_ENDPOINT: &str = "/api/get_invoice_list";

/// Response body of `POST /api/get_invoice_list`. The upstream reports
/// failures either as a top-level `error` object or, for empty result sets,
/// as a message inside an otherwise successful `result`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    Failure { error: ApiErrorMessage },
    Success { result: ApiResult },
}

#[derive(Deserialize)]
struct ApiErrorMessage {
    message: String,
}

#[derive(Deserialize)]
struct ApiResult {
    #[serde(default)]
    data: Vec<Map<String, Value>>,
    error: Option<String>,
}

pub async fn fetch_invoice_list(range: &DateRange, conf: &Conf) -> Result<InvoiceList> {
    let query = QueryPayload::new(range)?;
    let res = reqwest::Client::new()
        .post(format!("{}{}", conf.api_url, INVOICE_LIST_ENDPOINT))
        .header("x-api-key", &conf.api_key)
        .json(&query)
        .send()
        .await?;
    info!(http_status_code = ?res.status(), "Got invoice API response");
    decode_invoice_list(res).await
}

async fn decode_invoice_list(res: reqwest::Response) -> Result<InvoiceList> {
    if !res.status().is_success() {
        return Err(Error::UpstreamStatus(res.status().as_u16()));
    }
    let res: ApiResponse = res.json().await?;
    match res {
        ApiResponse::Failure { error } => Err(Error::InvoiceApi(error.message)),
        ApiResponse::Success { result } => {
            if result.data.is_empty() {
                return Ok(InvoiceList::empty(result.error));
            }
            InvoiceList::shaped(result.data)
        }
    }
}
