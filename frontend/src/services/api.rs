use gloo::net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::{
    ApiErrorBody, Budget, BudgetComparison, CategoryAggregate, CategorySet,
    CreateBudgetRequest, CreateCategoryRequest, CreateTransactionRequest, KindSelection,
    MonthlyPoint, Transaction, UpdateBudgetRequest, User,
};
use thiserror::Error;
use web_sys::RequestCredentials;

/// What went wrong talking to the backend.
///
/// `Network` and `Parse` degrade to empty data in the hooks; `Unauthorized`
/// always sends the browser back to the login page.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("session expired")]
    Unauthorized,
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// API client for communicating with the backend.
///
/// Every request carries the session cookie; the route guard in front of
/// the backend turns a missing or invalid session into a 401/redirect.
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Create a client for same-origin requests.
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
        }
    }

    /// Create a client with a custom base URL (dev server setups).
    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url }
    }

    pub async fn get_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        self.get_json("/api/transactions").await
    }

    pub async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<Transaction, ApiError> {
        let response = Request::post(&self.url("/api/transactions"))
            .credentials(RequestCredentials::Include)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<(), ApiError> {
        let response = Request::delete(&self.url(&format!("/api/transactions/{}", id)))
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(&response).await
    }

    pub async fn get_budgets(&self) -> Result<Vec<Budget>, ApiError> {
        self.get_json("/api/budgets").await
    }

    pub async fn create_budget(&self, request: &CreateBudgetRequest) -> Result<Budget, ApiError> {
        let response = Request::post(&self.url("/api/budgets"))
            .credentials(RequestCredentials::Include)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    pub async fn update_budget(
        &self,
        id: &str,
        request: &UpdateBudgetRequest,
    ) -> Result<Budget, ApiError> {
        let response = Request::put(&self.url(&format!("/api/budgets/{}", id)))
            .credentials(RequestCredentials::Include)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    pub async fn delete_budget(&self, id: &str) -> Result<(), ApiError> {
        let response = Request::delete(&self.url(&format!("/api/budgets/{}", id)))
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(&response).await
    }

    pub async fn get_categories(&self) -> Result<CategorySet, ApiError> {
        self.get_json("/api/categories").await
    }

    pub async fn add_category(&self, request: &CreateCategoryRequest) -> Result<(), ApiError> {
        let response = Request::post(&self.url("/api/categories"))
            .credentials(RequestCredentials::Include)
            .json(request)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(&response).await
    }

    /// Server-side category summary for one kind selection. The analytics
    /// view prefers this over the local aggregation when it returns data.
    pub async fn get_category_analytics(
        &self,
        kind: &KindSelection,
    ) -> Result<Vec<CategoryAggregate>, ApiError> {
        self.get_json(&format!("/api/analytics/categories?type={}", kind.as_query()))
            .await
    }

    /// Monthly expense series; display pass-through, never derived locally.
    pub async fn get_monthly_analytics(&self) -> Result<Vec<MonthlyPoint>, ApiError> {
        self.get_json("/api/analytics/monthly").await
    }

    pub async fn get_budget_comparison(&self) -> Result<Vec<BudgetComparison>, ApiError> {
        self.get_json("/api/analytics/budget-comparison").await
    }

    pub async fn get_profile(&self) -> Result<User, ApiError> {
        self.get_json("/api/user/profile").await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = Request::post(&self.url("/api/auth/logout"))
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(&response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = Request::get(&self.url(path))
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        Self::check_status(&response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn check_status(response: &Response) -> Result<(), ApiError> {
        if response.status() == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !response.ok() {
            let message = match response.text().await {
                Ok(body) => serde_json::from_str::<ApiErrorBody>(&body)
                    .map(|parsed| parsed.error)
                    .unwrap_or(body),
                Err(_) => "unknown error".to_string(),
            };
            return Err(ApiError::Server {
                status: response.status(),
                message,
            });
        }
        Ok(())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Send the browser to the login page. Called whenever a request comes back
/// 401: the session is gone and nothing else on the page can succeed.
pub fn redirect_to_login() {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_href("/auth/login");
    }
}
