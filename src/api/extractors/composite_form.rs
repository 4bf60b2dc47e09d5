//! Body extractor for writes that may carry files.
//!
//! A `multipart/form-data` body holds the JSON fields in a `data` part,
//! any number of `images` parts and an optional `cover` part. Any other
//! body is read as plain JSON without files.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{multipart::Field, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;
use crate::infra::Upload;

const DATA_PART: &str = "data";
const IMAGES_PART: &str = "images";
const COVER_PART: &str = "cover";

pub struct CompositeForm<T> {
    pub data: T,
    pub images: Vec<Upload>,
    pub cover: Option<Upload>,
    /// Text parts other than `data`
    pub fields: HashMap<String, String>,
}

impl<T> CompositeForm<T> {
    /// A boolean text part; `true`, `1` and `on` count as set.
    pub fn flag(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on"))
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for CompositeForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(data) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            return Ok(Self {
                data,
                images: Vec::new(),
                cover: None,
                fields: HashMap::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        let mut data = None;
        let mut images = Vec::new();
        let mut cover = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                DATA_PART => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(e.body_text()))?;
                    let parsed = serde_json::from_str::<T>(&text)
                        .map_err(|e| AppError::validation(format!("Invalid data part: {}", e)))?;
                    data = Some(parsed);
                }
                IMAGES_PART => images.push(read_upload(field).await?),
                COVER_PART => cover = Some(read_upload(field).await?),
                _ => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(e.body_text()))?;
                    fields.insert(name, text);
                }
            }
        }

        // Without a `data` part the body carries files only.
        let data = match data {
            Some(data) => data,
            None => serde_json::from_value(serde_json::json!({}))
                .map_err(|_| AppError::validation("Missing data part"))?,
        };

        Ok(Self {
            data,
            images,
            cover,
            fields,
        })
    }
}

async fn read_upload(field: Field<'_>) -> Result<Upload, AppError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?;

    Ok(Upload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}
