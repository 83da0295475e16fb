//! HTTP adapter for the internship-management REST API.
//!
//! Wraps the backend endpoints with [`reqwest`], attaching the bearer token
//! from an injected [`SessionProvider`] to every request.

mod error_body;

pub use error_body::error_message;

use crate::config::BackendConfig;
use crate::internship::{
    domain::{
        AssignedTask, DomainPricing, GithubRepoUrl, Internship, PaymentAmount, PaymentId,
        PaymentReceipt, PaymentStatus, RejectionReason, StudentId, StudentTaskId,
        TaskStatusSummary, TransactionReference,
    },
    ports::{AdminBackend, BackendError, BackendResult, SessionProvider, StudentBackend},
};
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// REST client for one backend deployment.
pub struct HttpBackend<S>
where
    S: SessionProvider,
{
    client: reqwest::Client,
    base_url: String,
    session: Arc<S>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitGithubBody<'a> {
    github_url: &'a GithubRepoUrl,
}

#[derive(Serialize)]
struct InitiatePaymentBody {
    amount: PaymentAmount,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitTransactionBody<'a> {
    payment_id: &'a PaymentId,
    transaction_reference: &'a TransactionReference,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverrideTaskBody<'a> {
    student_task_id: &'a StudentTaskId,
    approved: bool,
}

#[derive(Serialize)]
struct RejectPaymentBody<'a> {
    reason: &'a RejectionReason,
}

impl<S> HttpBackend<S>
where
    S: SessionProvider,
{
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Network`] when the underlying HTTP client
    /// cannot be built (for example, TLS initialisation fails).
    pub fn new(config: &BackendConfig, session: Arc<S>) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(BackendError::network)?;
        Ok(Self::with_client(client, config.base_url.as_str(), session))
    }

    /// Creates a client reusing an existing [`reqwest::Client`].
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str, session: Arc<S>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> BackendResult<reqwest::Response>
    where
        B: Serialize + Sync,
    {
        let token = self
            .session
            .bearer_token()
            .ok_or(BackendError::Unauthenticated)?;

        tracing::debug!(%method, path, "sending backend request");
        let mut request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token);
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(BackendError::network)?;
        Self::ensure_success(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        response.json::<T>().await.map_err(BackendError::decode)
    }

    async fn post<B>(&self, path: &str, body: Option<&B>) -> BackendResult<reqwest::Response>
    where
        B: Serialize + Sync,
    {
        self.send(Method::POST, path, body).await
    }

    /// Returns the response unchanged on success, or a
    /// [`BackendError::Rejected`] carrying the body's message.
    async fn ensure_success(response: reqwest::Response) -> BackendResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), %message, "backend rejected request");
        Err(BackendError::rejected(status.as_u16(), message))
    }
}

#[async_trait]
impl<S> StudentBackend for HttpBackend<S>
where
    S: SessionProvider,
{
    async fn internship_details(&self) -> BackendResult<Option<Internship>> {
        self.get("/internship/details").await
    }

    async fn assigned_tasks(&self) -> BackendResult<Vec<AssignedTask>> {
        self.get("/tasks/assigned").await
    }

    async fn task_status(&self) -> BackendResult<TaskStatusSummary> {
        self.get("/tasks/status").await
    }

    async fn domains(&self) -> BackendResult<Vec<DomainPricing>> {
        self.get("/domains").await
    }

    async fn payment_status(&self) -> BackendResult<PaymentStatus> {
        self.get("/payment/status").await
    }

    async fn submit_github(&self, url: &GithubRepoUrl) -> BackendResult<()> {
        let body = SubmitGithubBody { github_url: url };
        self.post("/tasks/submit-github", Some(&body)).await?;
        Ok(())
    }

    async fn initiate_payment(&self, amount: PaymentAmount) -> BackendResult<PaymentReceipt> {
        let body = InitiatePaymentBody { amount };
        let response = self.post("/payment/initiate", Some(&body)).await?;
        response
            .json::<PaymentReceipt>()
            .await
            .map_err(BackendError::decode)
    }

    async fn submit_transaction(
        &self,
        payment_id: &PaymentId,
        reference: &TransactionReference,
    ) -> BackendResult<()> {
        let body = SubmitTransactionBody {
            payment_id,
            transaction_reference: reference,
        };
        self.post("/payment/submit-transaction", Some(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl<S> AdminBackend for HttpBackend<S>
where
    S: SessionProvider,
{
    async fn start_batch(&self, student_id: &StudentId) -> BackendResult<()> {
        let path = format!("/admin/student/{student_id}/start-batch");
        self.post::<()>(&path, None).await?;
        Ok(())
    }

    async fn override_task(
        &self,
        student_task_id: &StudentTaskId,
        approved: bool,
    ) -> BackendResult<()> {
        let body = OverrideTaskBody {
            student_task_id,
            approved,
        };
        self.post("/admin/student-tasks/override", Some(&body)).await?;
        Ok(())
    }

    async fn approve_payment(&self, payment_id: &PaymentId) -> BackendResult<()> {
        let path = format!("/admin/payment/{payment_id}/approve");
        self.post::<()>(&path, None).await?;
        Ok(())
    }

    async fn reject_payment(
        &self,
        payment_id: &PaymentId,
        reason: &RejectionReason,
    ) -> BackendResult<()> {
        let path = format!("/admin/payment/{payment_id}/reject");
        let body = RejectPaymentBody { reason };
        self.post(&path, Some(&body)).await?;
        Ok(())
    }
}
