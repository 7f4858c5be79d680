use std::sync::Arc;

use dashboard_domain::record::SIGNAL_ATTRIBUTE;
use dashboard_domain::{attributes_to_wire, AttributeMap, Counts, ListPage, Record};
use dashboard_errors::{DashboardError, DashboardResult};
use serde_json::{json, Value};
use tracing::debug;

use crate::transport::{ApiRequest, Transport};

pub const COUNTS_PATH: &str = "counts";

/// REST资源访问：列表、单条记录、增删改与信号
#[derive(Clone)]
pub struct ResourceClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient").finish_non_exhaustive()
    }
}

pub fn item_path(resource: &str, id: i64) -> String {
    format!("{resource}/{id}")
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn call(&self, request: ApiRequest) -> DashboardResult<Option<Value>> {
        self.transport.send(request).await?.into_result()
    }

    /// `GET {resource}?q=..&p=..`
    pub async fn list(&self, resource: &str, search: &str, page: i64) -> DashboardResult<ListPage> {
        let request = ApiRequest::get(resource)
            .with_query("q", search)
            .with_query("p", page.to_string());
        let body = self.call(request).await?.unwrap_or(Value::Null);
        let page = ListPage::from_wire(&body)?;
        debug!(
            "{} 第 {}/{} 页，共 {} 条",
            resource,
            page.page_number,
            page.page_count,
            page.total_count
        );
        Ok(page)
    }

    pub async fn get(&self, resource: &str, id: i64) -> DashboardResult<Record> {
        match self.call(ApiRequest::get(item_path(resource, id))).await? {
            Some(body) => Record::from_wire(&body),
            None => Err(DashboardError::record_not_found(id)),
        }
    }

    /// 服务端回显保存后的记录时返回它
    pub async fn create(
        &self,
        resource: &str,
        attributes: &AttributeMap,
    ) -> DashboardResult<Option<Record>> {
        let body = attributes_to_wire(attributes);
        self.call(ApiRequest::post(resource, body))
            .await?
            .filter(Value::is_object)
            .map(|record| Record::from_wire(&record))
            .transpose()
    }

    pub async fn update(
        &self,
        resource: &str,
        id: i64,
        attributes: &AttributeMap,
    ) -> DashboardResult<Option<Record>> {
        let body = attributes_to_wire(attributes);
        self.call(ApiRequest::put(item_path(resource, id), body))
            .await?
            .filter(Value::is_object)
            .map(|record| Record::from_wire(&record))
            .transpose()
    }

    pub async fn delete(&self, resource: &str, id: i64) -> DashboardResult<()> {
        self.call(ApiRequest::delete(item_path(resource, id))).await?;
        Ok(())
    }

    /// `POST {item}/signal`，请求体 `{"Signal": ..}`
    pub async fn signal(&self, resource: &str, id: i64, signal: &str) -> DashboardResult<()> {
        let path = format!("{}/signal", item_path(resource, id));
        self.call(ApiRequest::post(path, json!({ SIGNAL_ATTRIBUTE: signal })))
            .await?;
        Ok(())
    }

    pub async fn counts(&self) -> DashboardResult<Counts> {
        let body = self.call(ApiRequest::get(COUNTS_PATH)).await?;
        match body {
            Some(body) => Ok(serde_json::from_value(body)?),
            None => Ok(Counts::default()),
        }
    }
}
