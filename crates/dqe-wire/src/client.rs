//! HTTP client implementing the `node`-facing and `coordinator`-facing RPC
//! contracts over the axum routes in §6.1. This is the coordinator's and
//! the CLI's only window onto the network; a dropped connection or a
//! non-2xx reply both surface as `CoreError::Transport` (§7 "Transport
//! error"), which is exactly what a single-shot RPC-with-no-retries
//! contract needs the caller to see.

use async_trait::async_trait;
use dqe_core::{CoreError, Dataset, NodeRpc, Predicate, Row, TableSchema};
use tracing::{debug, warn};

use crate::requests::{
    BuildTableRequest, CreateFragmentRequest, ErrorBody, FragmentWriteRequest, FragmentWriteResponse,
    InsertRequest, JoinRequest, ScanByRowIdsRequest, ScanByRowIdsResponse, ScanBySchemaRequest,
    ScanBySchemaResponse,
};

/// Fronts one `node` process. `base_url` has no trailing slash, e.g.
/// `http://10.0.0.3:8081`.
pub struct HttpNodeClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpNodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn post_json<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CoreError::Transport(format!("{url}: {e}")))?;
        parse_response(url, resp).await
    }

    async fn get_json<Resp: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Resp, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Transport(format!("{url}: {e}")))?;
        parse_response(url, resp).await
    }
}

async fn parse_response<Resp: serde::de::DeserializeOwned>(url: String, resp: reqwest::Response) -> Result<Resp, CoreError> {
    let status = resp.status();
    if status.is_success() {
        debug!(%url, %status, "rpc ok");
        resp.json::<Resp>()
            .await
            .map_err(|e| CoreError::Transport(format!("{url}: malformed response body: {e}")))
    } else {
        let body: ErrorBody = resp
            .json()
            .await
            .unwrap_or_else(|_| ErrorBody { error: status.to_string() });
        warn!(%url, %status, error = %body.error, "rpc failed");
        Err(CoreError::Transport(format!("{url}: {}", body.error)))
    }
}

#[async_trait]
impl NodeRpc for HttpNodeClient {
    async fn create_fragment(
        &self,
        logical_schema: TableSchema,
        fragment_schema: TableSchema,
        projected_column_ids: Vec<usize>,
        predicates: Vec<Predicate>,
    ) -> Result<(), CoreError> {
        let req = CreateFragmentRequest {
            logical_schema,
            fragment_schema,
            projected_column_ids,
            predicates,
        };
        self.post_json::<_, serde_json::Value>("/api/fragments", &req).await?;
        Ok(())
    }

    async fn insert(&self, table_name: &str, row: Row, row_id: i64) -> Result<(), CoreError> {
        let req = InsertRequest { row, row_id };
        self.post_json::<_, serde_json::Value>(&format!("/api/tables/{table_name}/rows"), &req)
            .await?;
        Ok(())
    }

    async fn scan_by_row_ids(&self, table_name: &str, row_ids: &[i64]) -> Result<Vec<Dataset>, CoreError> {
        let req = ScanByRowIdsRequest {
            row_ids: row_ids.to_vec(),
        };
        let resp: ScanByRowIdsResponse = self
            .post_json(&format!("/api/tables/{table_name}/scan/row-ids"), &req)
            .await?;
        Ok(resp.datasets)
    }

    async fn scan_by_schema(&self, requested_schema: &TableSchema) -> Result<Vec<Dataset>, CoreError> {
        let req = ScanBySchemaRequest {
            requested_schema: requested_schema.clone(),
        };
        let resp: ScanBySchemaResponse = self
            .post_json(&format!("/api/tables/{}/scan/schema", requested_schema.table_name), &req)
            .await?;
        Ok(resp.datasets)
    }

    async fn scan_all(&self, table_name: &str) -> Result<Dataset, CoreError> {
        self.get_json(&format!("/api/tables/{table_name}/scan/all")).await
    }
}

/// Fronts the `coordinator` process for the `cli` binary.
pub struct CoordinatorClient {
    base_url: String,
    http: reqwest::Client,
}

impl CoordinatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn build_table(&self, logical_schema: TableSchema, partition_plan: serde_json::Value) -> Result<(), CoreError> {
        let req = BuildTableRequest {
            logical_schema,
            partition_plan,
        };
        self.post::<_, serde_json::Value>("/api/tables", &req).await?;
        Ok(())
    }

    pub async fn fragment_write(&self, table_name: &str, row: Row) -> Result<i64, CoreError> {
        let req = FragmentWriteRequest { row };
        let resp: FragmentWriteResponse = self.post(&format!("/api/tables/{table_name}/rows"), &req).await?;
        Ok(resp.row_id)
    }

    pub async fn join(&self, tables: Vec<String>) -> Result<Dataset, CoreError> {
        let req = JoinRequest { tables };
        self.post("/api/join", &req).await
    }

    async fn post<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CoreError::Transport(format!("{url}: {e}")))?;
        parse_response(url, resp).await
    }
}
