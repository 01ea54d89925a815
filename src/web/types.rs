// src/web/types.rs

use rocket::serde::{Deserialize, Serialize};

use crate::database::Job;

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl TextResponse {
    pub fn success(message: String) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

/// One page of search results as served to the feed.
#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct JobPageData {
    pub jobs: Vec<Job>,
    pub has_more: bool,
    pub page: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ServerConfig {
    pub page_size: i64,
}
