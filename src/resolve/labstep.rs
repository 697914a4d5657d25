//! Labstep REST API record source.
//!
//! Every request carries the account's API key in an `apikey` header.
//!
//! | Lookup | Request |
//! |--------|---------|
//! | Authenticate | `GET /api/generic/user/{email}` |
//! | Item | `GET /api/generic/resource-item/{id}` |
//! | Group | `GET /api/generic/resource/{id}` |
//! | Group items | `GET /api/generic/resource-item?resource_id={id}&cursor=…` |
//!
//! A 404 means the record does not exist; any other non-success status is
//! an error.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::RecordSource;
use crate::error::LabelError;
use crate::record::{GroupRecord, ItemRecord};

/// Default API host.
pub const DEFAULT_API_URL: &str = "https://api.labstep.com";

/// Items requested per page when listing a group's items.
const PAGE_SIZE: u32 = 100;

/// An authenticated Labstep session.
pub struct LabstepClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct EntityDto {
    name: String,
    guid: String,
    #[serde(default)]
    resource_location: Option<LocationDto>,
}

#[derive(Debug, Deserialize)]
struct LocationDto {
    #[serde(default)]
    location_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageDto {
    #[serde(default)]
    items: Vec<EntityDto>,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl EntityDto {
    fn location_path(&self) -> Option<String> {
        self.resource_location
            .as_ref()
            .and_then(|loc| loc.location_path.clone())
    }

    fn into_item(self) -> ItemRecord {
        let location_path = self.location_path();
        ItemRecord {
            name: self.name,
            guid: self.guid,
            location_path,
        }
    }
}

impl LabstepClient {
    /// Build a client without checking the credentials.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, LabelError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LabelError::Config(format!("invalid API URL {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LabelError::Config(format!(
                "invalid API URL {:?}: not a base URL",
                base_url.as_str()
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("labelsheet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LabelError::Resolve(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    /// Log in with an account email and API key.
    pub async fn authenticate(
        base_url: &str,
        email: &str,
        api_key: &str,
    ) -> Result<Self, LabelError> {
        let client = Self::new(base_url, api_key)?;
        let url = client.endpoint(&["api", "generic", "user", email])?;

        let response = client
            .http
            .get(url.clone())
            .header("apikey", &client.api_key)
            .send()
            .await
            .map_err(|e| LabelError::Authentication(format!("could not reach {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LabelError::Authentication(format!(
                "server rejected credentials for {} (HTTP {})",
                email, status
            )));
        }

        tracing::info!(email, "Authenticated with Labstep");
        Ok(client)
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, LabelError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LabelError::Config(format!("invalid API URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Option<T>, LabelError> {
        let url = self.endpoint(segments)?;
        let response = self
            .http
            .get(url.clone())
            .header("apikey", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| LabelError::Resolve(format!("Failed to request {}: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LabelError::Resolve(format!(
                "Failed to request {}: HTTP {}",
                url, status
            )));
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| LabelError::Resolve(format!("Malformed response from {}: {}", url, e)))?;
        Ok(Some(body))
    }

    /// All location paths of a group's items, in listing order.
    async fn group_item_locations(&self, id: u64) -> Result<Vec<String>, LabelError> {
        let mut locations = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![
                ("resource_id", id.to_string()),
                ("count", PAGE_SIZE.to_string()),
            ];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let Some(page) = self
                .get_json::<PageDto>(&["api", "generic", "resource-item"], &query)
                .await?
            else {
                break;
            };

            let page_len = page.items.len();
            locations.extend(page.items.iter().filter_map(EntityDto::location_path));

            match page.next_cursor {
                Some(next) if page_len > 0 && cursor.as_deref() != Some(next.as_str()) => {
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(locations)
    }
}

#[async_trait]
impl RecordSource for LabstepClient {
    async fn item(&self, id: u64) -> Result<Option<ItemRecord>, LabelError> {
        let id = id.to_string();
        let entity = self
            .get_json::<EntityDto>(&["api", "generic", "resource-item", id.as_str()], &[])
            .await?;
        Ok(entity.map(EntityDto::into_item))
    }

    async fn group(&self, id: u64) -> Result<Option<GroupRecord>, LabelError> {
        let key = id.to_string();
        let Some(entity) = self
            .get_json::<EntityDto>(&["api", "generic", "resource", key.as_str()], &[])
            .await?
        else {
            return Ok(None);
        };

        let item_locations = self.group_item_locations(id).await?;
        Ok(Some(GroupRecord {
            name: entity.name,
            guid: entity.guid,
            item_locations,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_item_with_location() {
        let json = r#"{
            "id": 42,
            "name": "Centrifuge Tubes",
            "guid": "abc123",
            "resource_location": {"guid": "loc-1", "location_path": "Fridge A"}
        }"#;
        let dto: EntityDto = serde_json::from_str(json).unwrap();
        assert_eq!(
            dto.into_item(),
            ItemRecord {
                name: "Centrifuge Tubes".to_string(),
                guid: "abc123".to_string(),
                location_path: Some("Fridge A".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_item_without_location() {
        let json = r#"{"name": "Gloves", "guid": "g", "resource_location": null}"#;
        let dto: EntityDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.into_item().location_path, None);

        let json = r#"{"name": "Gloves", "guid": "g"}"#;
        let dto: EntityDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.location_path(), None);
    }

    #[test]
    fn test_parse_page() {
        let json = r#"{
            "items": [
                {"name": "a", "guid": "1", "resource_location": {"location_path": "Shelf 2"}},
                {"name": "b", "guid": "2", "resource_location": null},
                {"name": "c", "guid": "3", "resource_location": {"location_path": "Fridge A"}}
            ],
            "next_cursor": "xyz"
        }"#;
        let page: PageDto = serde_json::from_str(json).unwrap();
        let paths: Vec<String> = page.items.iter().filter_map(EntityDto::location_path).collect();
        assert_eq!(paths, vec!["Shelf 2".to_string(), "Fridge A".to_string()]);
        assert_eq!(page.next_cursor.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = LabstepClient::new("https://api.example.test/", "key").unwrap();
        assert_eq!(
            client.endpoint(&["api", "generic", "resource", "1"]).unwrap().as_str(),
            "https://api.example.test/api/generic/resource/1"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let client = LabstepClient::new("https://proxy.example.test/labstep/", "key").unwrap();
        assert_eq!(
            client.endpoint(&["api", "generic", "resource", "1"]).unwrap().as_str(),
            "https://proxy.example.test/labstep/api/generic/resource/1"
        );
    }

    #[test]
    fn test_email_is_percent_encoded() {
        let client = LabstepClient::new("https://api.example.test", "key").unwrap();
        let url = client
            .endpoint(&["api", "generic", "user", "first last/x?y#z@lab.org"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.test/api/generic/user/first%20last%2Fx%3Fy%23z@lab.org"
        );
        assert_eq!(url.path_segments().unwrap().count(), 4);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            LabstepClient::new("not a url", "key"),
            Err(LabelError::Config(_))
        ));
        assert!(matches!(
            LabstepClient::new("mailto:me@lab.org", "key"),
            Err(LabelError::Config(_))
        ));
    }
}
