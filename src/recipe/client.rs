//! Core `RecipeApi` trait and the `SpoonacularClient` implementation.
//!
//! All connection details come from [`RecipeApiConfig`]. A client without an
//! API key fails every call with [`RecipeError::MissingApiKey`] before any
//! request is made.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::RecipeApiConfig;
use crate::recipe::types::{QuerySearchResponse, Recipe, RecipeDetail};

// ---------------------------------------------------------------------------
// RecipeError
// ---------------------------------------------------------------------------

/// Failures surfaced by the recipe API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
    /// No key configured; nothing was sent.
    #[error("recipe API key is not configured")]
    MissingApiKey,

    /// The server rejected the key (401/403).
    #[error("recipe API rejected the API key")]
    InvalidApiKey,

    /// The request never got a response (connect failure, timeout, …).
    #[error("no response from recipe API: {0}")]
    Network(String),

    /// Any other non-success status.
    #[error("recipe API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The body could not be decoded.
    #[error("failed to parse recipe API response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RecipeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RecipeError::Parse(e.to_string())
        } else {
            RecipeError::Network(e.to_string())
        }
    }
}

impl RecipeError {
    /// Text for the error toast.
    pub fn user_message(&self) -> String {
        match self {
            RecipeError::MissingApiKey => {
                "API key is required. Please set your Spoonacular API key in the settings.".into()
            }
            RecipeError::InvalidApiKey => {
                "Invalid API key. Please check your Spoonacular API key in the settings.".into()
            }
            RecipeError::Network(_) => {
                "No response from API server. Please check your internet connection and try again."
                    .into()
            }
            RecipeError::Api { status, message } => format!("API Error ({status}): {message}"),
            RecipeError::Parse(_) => "The recipe service sent a response I couldn't read.".into(),
        }
    }

    /// Key problems the user can fix in the settings.
    pub fn is_key_problem(&self) -> bool {
        matches!(self, RecipeError::MissingApiKey | RecipeError::InvalidApiKey)
    }
}

// ---------------------------------------------------------------------------
// RecipeApi trait
// ---------------------------------------------------------------------------

/// Async recipe search and lookup.
///
/// Implementors are shared as `Arc<dyn RecipeApi>` across spawned tasks.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// Recipes that use as many of `ingredients` as possible.
    async fn search_by_ingredients(
        &self,
        ingredients: &[String],
        count: u32,
    ) -> Result<Vec<Recipe>, RecipeError>;

    async fn recipe_details(&self, id: u64) -> Result<RecipeDetail, RecipeError>;

    /// Free-text search.
    async fn search_by_query(&self, query: &str, count: u32) -> Result<Vec<Recipe>, RecipeError>;

    /// Cheapest authenticated call, to validate the key.
    async fn test_api_key(&self) -> Result<(), RecipeError>;
}

// ---------------------------------------------------------------------------
// SpoonacularClient
// ---------------------------------------------------------------------------

pub struct SpoonacularClient {
    client: reqwest::Client,
    config: RecipeApiConfig,
}

impl SpoonacularClient {
    /// Build a client with the per-request timeout from `config.timeout_secs`.
    pub fn from_config(config: &RecipeApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_ok()
    }

    fn api_key(&self) -> Result<&str, RecipeError> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(RecipeError::MissingApiKey),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET `path` with `query` plus the API key, decoding the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RecipeError> {
        let key = self.api_key()?;
        let url = self.url(path);
        log::debug!("recipe: GET {url}");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apiKey", key)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            log::warn!("recipe: API key rejected ({status})");
            return Err(RecipeError::InvalidApiKey);
        }
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["message"].as_str().unwrap_or("Unknown error").to_string();
            log::error!("recipe: {path} failed with {status}: {message}");
            return Err(RecipeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RecipeError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RecipeApi for SpoonacularClient {
    async fn search_by_ingredients(
        &self,
        ingredients: &[String],
        count: u32,
    ) -> Result<Vec<Recipe>, RecipeError> {
        self.get_json(
            "/recipes/findByIngredients",
            &[
                ("ingredients", ingredients.join(",")),
                ("number", count.to_string()),
                ("ranking", self.config.ranking.to_string()),
                ("ignorePantry", self.config.ignore_pantry.to_string()),
            ],
        )
        .await
    }

    async fn recipe_details(&self, id: u64) -> Result<RecipeDetail, RecipeError> {
        self.get_json(
            &format!("/recipes/{id}/information"),
            &[("includeNutrition", "false".to_string())],
        )
        .await
    }

    async fn search_by_query(&self, query: &str, count: u32) -> Result<Vec<Recipe>, RecipeError> {
        let response: QuerySearchResponse = self
            .get_json(
                "/recipes/complexSearch",
                &[
                    ("query", query.to_string()),
                    ("number", count.to_string()),
                    ("addRecipeInformation", "true".to_string()),
                    ("fillIngredients", "true".to_string()),
                ],
            )
            .await?;
        Ok(response.results)
    }

    async fn test_api_key(&self) -> Result<(), RecipeError> {
        let _: serde_json::Value = self
            .get_json("/recipes/random", &[("number", "1".to_string())])
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockRecipeApi;

#[cfg(test)]
mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Returns canned responses and records the ingredient lists it was asked
    /// about.
    pub struct MockRecipeApi {
        pub search: Mutex<Result<Vec<Recipe>, RecipeError>>,
        pub detail: Mutex<Result<RecipeDetail, RecipeError>>,
        pub searched: Mutex<Vec<Vec<String>>>,
        pub queries: Mutex<Vec<String>>,
    }

    impl MockRecipeApi {
        pub fn new(search: Result<Vec<Recipe>, RecipeError>, detail: Result<RecipeDetail, RecipeError>) -> Self {
            Self {
                search: Mutex::new(search),
                detail: Mutex::new(detail),
                searched: Mutex::new(Vec::new()),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecipeApi for MockRecipeApi {
        async fn search_by_ingredients(
            &self,
            ingredients: &[String],
            _count: u32,
        ) -> Result<Vec<Recipe>, RecipeError> {
            self.searched.lock().unwrap().push(ingredients.to_vec());
            self.search.lock().unwrap().clone()
        }

        async fn recipe_details(&self, _id: u64) -> Result<RecipeDetail, RecipeError> {
            self.detail.lock().unwrap().clone()
        }

        async fn search_by_query(&self, query: &str, _count: u32) -> Result<Vec<Recipe>, RecipeError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.search.lock().unwrap().clone()
        }

        async fn test_api_key(&self) -> Result<(), RecipeError> {
            self.search.lock().unwrap().clone().map(|_| ())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
