use super::{AcknowledgerConfig, MessageDto};
use crate::error::{ExtensionError, ExtensionResult};
use reqwest::Client;
use shared_types::MessageRecord;
use tracing::{debug, warn};

/// HTTP client for message acknowledgements.
pub struct MessageAcknowledger {
    client: Client,
    config: AcknowledgerConfig,
}

impl MessageAcknowledger {
    pub fn new(config: AcknowledgerConfig) -> ExtensionResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AcknowledgerConfig {
        &self.config
    }

    pub async fn new_message_received(
        &self,
        record: &MessageRecord,
        as_sender: bool,
    ) -> ExtensionResult<()> {
        let dto = MessageDto::from_record(record, as_sender, false);
        self.post(&self.config.new_path, &dto).await
    }

    pub async fn message_transaction_signed(
        &self,
        record: &MessageRecord,
        as_sender: bool,
    ) -> ExtensionResult<()> {
        let dto = MessageDto::from_record(record, as_sender, false);
        self.post(&self.config.signed_path, &dto).await
    }

    pub async fn message_transaction_committed(
        &self,
        record: &MessageRecord,
        as_sender: bool,
    ) -> ExtensionResult<()> {
        let dto = MessageDto::from_record(record, as_sender, true);
        self.post(&self.config.committed_path, &dto).await
    }

    async fn post(&self, path: &str, dto: &MessageDto) -> ExtensionResult<()> {
        let url = self.config.url(path);
        let result = self
            .client
            .post(&url)
            .json(dto)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(response) => {
                debug!(%url, status = %response.status(), id = %dto.id, "Acknowledgement sent");
                Ok(())
            }
            Err(e) => {
                warn!(%url, error = %e, "Failed to send acknowledgement");
                Err(ExtensionError::Acknowledgement {
                    url,
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl std::fmt::Debug for MessageAcknowledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageAcknowledger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
