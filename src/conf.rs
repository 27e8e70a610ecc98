use crate::Result;
use std::env;

#[derive(Clone)]
pub struct Conf {
    pub api_url: String,
    pub api_key: String,
    pub http_bind_addr: String,
}

const DEFAULT_API_URL: &str = "https://api.robolabs.lt";
const DEFAULT_HTTP_BIND_ADDR: &str = "127.0.0.1:8000";

impl Conf {
    pub fn from_env() -> Result<Conf> {
        let api_key = env::var("INVOICE_API_KEY")
            .map_err(|_| "INVOICE_API_KEY is not set".to_string())?;
        Ok(Conf {
            api_url: env::var("INVOICE_API_URL").unwrap_or(DEFAULT_API_URL.into()),
            api_key,
            http_bind_addr: env::var("HTTP_BIND_ADDR").unwrap_or(DEFAULT_HTTP_BIND_ADDR.into()),
        })
    }
}
