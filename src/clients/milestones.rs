use crate::errors::ServiceError;
use crate::models::GiftMilestone;
use async_trait::async_trait;
use tracing::instrument;

/// Gift-milestone collaborator.
#[async_trait]
pub trait MilestoneApi: Send + Sync {
    async fn gift_milestones(&self) -> Result<Vec<GiftMilestone>, ServiceError>;
}

#[derive(Clone)]
pub struct HttpMilestoneApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMilestoneApi {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl MilestoneApi for HttpMilestoneApi {
    #[instrument(skip(self))]
    async fn gift_milestones(&self) -> Result<Vec<GiftMilestone>, ServiceError> {
        let url = format!("{}/gift-milestones", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
