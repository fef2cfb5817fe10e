// Metrics API client: container-group metrics queries and group listing

mod transport;

pub use transport::{RETRY_STATUS, RetryPolicy, RetryTransport, TransportError};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::models::{ContainerGroup, GroupPhase, MetricsRequest, MetricsResponse};

/// API version pinned for both the metrics and the list endpoints.
pub const API_VERSION: &str = "2018-10-01";

const USER_AGENT: &str = concat!("fleetmon/", env!("CARGO_PKG_VERSION"));

/// Client for the remote metrics service. Clients should be reused; methods
/// are safe for concurrent use.
pub struct ApiClient {
    transport: RetryTransport,
    base: Url,
    subscription_id: String,
    resource_group: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        subscription_id: &str,
        resource_group: &str,
        token: Option<String>,
        policy: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)?;
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            transport: RetryTransport::new(http, policy),
            base,
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            token,
        })
    }

    fn groups_path(&self) -> String {
        format!(
            "subscriptions/{}/resourceGroups/{}/containerGroups",
            self.subscription_id, self.resource_group
        )
    }

    /// Time-series metrics for one container group.
    pub async fn group_metrics(
        &self,
        group_name: &str,
        request: &MetricsRequest,
        cancel: &CancellationToken,
    ) -> Result<MetricsResponse, TransportError> {
        let mut url = self
            .base
            .join(&format!("{}/{}/metrics", self.groups_path(), group_name))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", API_VERSION);
            query.append_pair("aggregation", request.aggregation.as_str());
            query.append_pair("metricnames", &request.metric_names());
            query.append_pair("timespan", &request.timespan());
            if let Some(dimension) = &request.dimension {
                query.append_pair("filter", dimension);
            }
        }
        let response = self
            .transport
            .get(url, self.token.as_deref(), cancel)
            .await?;
        response.json().await.map_err(TransportError::Decode)
    }

    /// All container groups in the resource group, with lifecycle phase and
    /// the identity tags written at provisioning time.
    pub async fn list_groups(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContainerGroup>, TransportError> {
        let mut url = self.base.join(&self.groups_path())?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        let response = self
            .transport
            .get(url, self.token.as_deref(), cancel)
            .await?;
        let list: GroupListResponse = response.json().await.map_err(TransportError::Decode)?;
        Ok(list.value.into_iter().map(GroupListItem::into_group).collect())
    }
}

#[derive(Debug, Deserialize)]
struct GroupListResponse {
    #[serde(default)]
    value: Vec<GroupListItem>,
}

#[derive(Debug, Deserialize)]
struct GroupListItem {
    name: String,
    id: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    properties: GroupProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupProperties {
    instance_view: Option<InstanceView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceView {
    state: Option<String>,
}

impl GroupListItem {
    fn into_group(self) -> ContainerGroup {
        let phase = self
            .properties
            .instance_view
            .as_ref()
            .and_then(|v| v.state.as_deref())
            .map(GroupPhase::parse)
            .unwrap_or(GroupPhase::Unknown);
        let namespace = self
            .tags
            .get("namespace")
            .cloned()
            .unwrap_or_else(|| "default".to_string());
        let uid = self
            .tags
            .get("uid")
            .cloned()
            .or(self.id)
            .unwrap_or_else(|| self.name.clone());
        let created_at = self
            .tags
            .get("creationTimestamp")
            .and_then(|t| t.parse::<DateTime<Utc>>().ok())
            .unwrap_or(DateTime::UNIX_EPOCH);
        ContainerGroup {
            name: self.name,
            namespace,
            uid,
            phase,
            created_at,
        }
    }
}
