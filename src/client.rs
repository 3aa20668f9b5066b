//! Typed HTTP client for the users API, as used by the dashboard frontend.

use crate::error::ErrorBody;
use crate::model::{Role, Status, User, UserDraft};
use crate::response::{AllUsers, UserPage};
use crate::service::{aggregate, UserStats};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http(e) => e.status(),
            ClientError::Api { status, .. } => Some(*status),
        }
    }
}

/// Listing filters; unset fields are not sent.
#[derive(Clone, Debug, Default)]
pub struct Filters {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
    pub sort_by: Option<String>,
    pub descending: bool,
}

impl Filters {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref q) = self.search {
            params.push(("q", q.clone()));
        }
        if let Some(role) = self.role {
            params.push(("role", role.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(ref sort_by) = self.sort_by {
            params.push(("sortBy", sort_by.clone()));
            params.push(("sortOrder", if self.descending { "desc" } else { "asc" }.to_string()));
        }
        params
    }
}

#[derive(Clone, Debug)]
pub struct UsersClient {
    base_url: String,
    http: reqwest::Client,
}

impl UsersClient {
    /// `base_url` is the server root, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        UsersClient { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users{}", self.base_url, path)
    }

    pub async fn fetch_paginated(&self, page: u32, per_page: u32, filters: &Filters) -> Result<UserPage, ClientError> {
        let mut params = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        params.extend(filters.to_params());
        let resp = self.http.get(self.url("")).query(&params).send().await?;
        decode(resp).await
    }

    pub async fn fetch_user_by_id(&self, id: i64) -> Result<User, ClientError> {
        let resp = self.http.get(self.url(&format!("/{}", id))).send().await?;
        decode(resp).await
    }

    pub async fn fetch_all_users(&self) -> Result<Vec<User>, ClientError> {
        let resp = self.http.get(self.url("/allUsers")).send().await?;
        Ok(decode::<AllUsers>(resp).await?.users)
    }

    /// Folded locally over [`Self::fetch_all_users`].
    pub async fn fetch_stats(&self) -> Result<UserStats, ClientError> {
        Ok(aggregate(&self.fetch_all_users().await?))
    }

    pub async fn add_user(&self, user: &UserDraft) -> Result<User, ClientError> {
        let resp = self.http.post(self.url("")).json(user).send().await?;
        decode(resp).await
    }

    pub async fn update_user(&self, id: i64, user: &UserDraft) -> Result<User, ClientError> {
        let resp = self.http.put(self.url(&format!("/{}", id))).json(user).send().await?;
        decode(resp).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ClientError> {
        let resp = self.http.delete(self.url(&format!("/{}", id))).send().await?;
        check(resp).await.map(|_| ())
    }
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let (code, message) = match resp.json::<ErrorBody>().await {
        Ok(body) => (body.error.code, body.error.message),
        Err(_) => (
            "unknown".to_string(),
            status.canonical_reason().unwrap_or("request failed").to_string(),
        ),
    };
    tracing::debug!(%status, %code, %message, "api error");
    Err(ClientError::Api { status, code, message })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    Ok(check(resp).await?.json::<T>().await?)
}
