#[cfg(test)]
#[path = "models_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use super::decode;
use crate::domain::models::ChatModel;
use crate::domain::models::ClientError;
use crate::domain::models::RequestSpec;
use crate::infrastructure::gateway::Gateway;

pub struct ModelsApi {
    gateway: Arc<Gateway>,
    timeout: Option<Duration>,
}

impl ModelsApi {
    pub fn new(gateway: Arc<Gateway>, timeout: Option<Duration>) -> ModelsApi {
        return ModelsApi { gateway, timeout };
    }

    pub async fn list_models(&self) -> Result<Vec<ChatModel>, ClientError> {
        let spec = RequestSpec::get("/ollama/models").timeout(self.timeout);
        let res = self.gateway.execute(&spec).await?;

        return decode::<Vec<ChatModel>>(res).await;
    }

    /// Identifier of the first listed model, used when a chat is created
    /// without naming one.
    pub async fn default_model(&self) -> Result<Option<String>, ClientError> {
        let models = self.list_models().await?;
        return Ok(models.into_iter().next().map(|model| return model.model));
    }
}
