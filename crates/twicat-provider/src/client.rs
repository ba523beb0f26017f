//! Twilio REST API client

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, info};
use twicat_core::Credentials;

use crate::error::{ProviderError, Result};
use crate::types::{
    ApiErrorBody, IncomingPhoneNumbersResponse, PhoneNumber, UpdateSmsUrl, capable_numbers,
};

/// Twilio API client authenticated with HTTP Basic Auth
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl ProviderClient {
    /// Create a new client. `timeout` applies to every request.
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn numbers_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/IncomingPhoneNumbers",
            self.base_url, self.credentials.account_sid
        )
    }

    /// SMS-capable, in-use numbers in the order the provider returned them
    pub async fn list_numbers(&self) -> Result<Vec<PhoneNumber>> {
        let url = format!("{}.json", self.numbers_url());
        debug!("Fetching phone numbers from {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(
                self.credentials.account_sid.as_str(),
                Some(self.credentials.auth_token.expose()),
            )
            .send()
            .await?;
        let response = check_status(response).await?;

        let list: IncomingPhoneNumbersResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let total = list.incoming_phone_numbers.len();
        let numbers = capable_numbers(list.incoming_phone_numbers);
        info!("{} of {} numbers can receive SMS", numbers.len(), total);

        Ok(numbers)
    }

    /// Point the number's SMS webhook at `sms_url` (POST)
    pub async fn update_sms_url(&self, number_sid: &str, sms_url: &str) -> Result<()> {
        let url = format!("{}/{}.json", self.numbers_url(), number_sid);
        info!(number_sid, sms_url, "Configuring SMS callback");

        let form = UpdateSmsUrl {
            sid: number_sid,
            sms_method: "POST",
            sms_url,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(
                self.credentials.account_sid.as_str(),
                Some(self.credentials.auth_token.expose()),
            )
            .form(&form)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }
}

/// Turn non-2xx responses into `ProviderError::Api`
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => (body.code, body.message.unwrap_or(text)),
        Err(_) => (None, text),
    };

    Err(ProviderError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}
