use std::collections::BTreeMap;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::core::{AuthorInfo, PkgInfo, PkgName};
use crate::error::{Result, UpmError};
use crate::registry::{PackageMetadata, Registry};

#[derive(Debug, Clone)]
pub struct NpmRegistry {
    pub base_url: String,
    client: Client,
}

impl NpmRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!(url, "npm registry request");
        self.client
            .get(url)
            .header("Accept", "application/json")
            .header("User-Agent", "upm-yarn")
            .send()
            .map_err(|err| UpmError::Registry(format!("request to {} failed: {}", url, err)))
    }
}

impl Registry for NpmRegistry {
    fn search(&self, query: &str) -> Result<Vec<PkgInfo>> {
        let url = format!(
            "{}/-/v1/search?text={}",
            self.base_url,
            urlencoding::encode(query)
        );
        let (status, body) = read_response(self.get(&url)?)?;
        let value = parse_json_response(status, &url, &body)?;
        Ok(parse_search_results(&value))
    }

    fn package(&self, name: &PkgName) -> Result<Option<PackageMetadata>> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(name.as_str()));
        let (status, body) = read_response(self.get(&url)?)?;
        parse_package_response(status, &url, &body)
    }
}

fn read_response(response: Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| UpmError::Registry(format!("failed reading response body: {}", err)))?;
    Ok((status, body))
}

/// A 404 means the registry has no such package.
fn parse_package_response(
    status: StatusCode,
    url: &str,
    body: &str,
) -> Result<Option<PackageMetadata>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let value = parse_json_response(status, url, body)?;
    Ok(Some(parse_package_metadata(&value)))
}

fn parse_json_response(status: StatusCode, url: &str, body: &str) -> Result<Value> {
    if !status.is_success() {
        return Err(UpmError::Registry(format!(
            "{} returned {}: {}",
            url,
            status,
            body.trim()
        )));
    }

    serde_json::from_str(body).map_err(|err| UpmError::Registry(err.to_string()))
}

pub fn parse_search_results(value: &Value) -> Vec<PkgInfo> {
    value
        .get("objects")
        .and_then(|objects| objects.as_array())
        .map(|objects| {
            objects
                .iter()
                .filter_map(|object| object.get("package"))
                .map(parse_search_package)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_search_package(package: &Value) -> PkgInfo {
    let links = package.get("links");
    let author = package.get("author").map(|author| AuthorInfo {
        name: str_field(author, "username"),
        email: str_field(author, "email"),
        url: String::new(),
    });
    PkgInfo {
        name: str_field(package, "name"),
        description: str_field(package, "description"),
        version: str_field(package, "version"),
        homepage_url: links.map(|l| str_field(l, "homepage")).unwrap_or_default(),
        source_code_url: links.map(|l| str_field(l, "repository")).unwrap_or_default(),
        bug_tracker_url: links.map(|l| str_field(l, "bugs")).unwrap_or_default(),
        author: author.map(|a| a.to_string()).unwrap_or_default(),
        ..PkgInfo::default()
    }
}

pub fn parse_package_metadata(value: &Value) -> PackageMetadata {
    let versions = value
        .get("versions")
        .and_then(|versions| versions.as_object())
        .map(|versions| {
            versions
                .iter()
                .map(|(label, manifest)| (label.clone(), dependency_names(manifest)))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    let info = PkgInfo {
        name: str_field(value, "name"),
        description: str_field(value, "description"),
        homepage_url: str_field(value, "homepage"),
        source_code_url: url_field(value.get("repository")),
        bug_tracker_url: url_field(value.get("bugs")),
        author: value
            .get("author")
            .map(parse_author)
            .map(|author| author.to_string())
            .unwrap_or_default(),
        license: license_field(value.get("license")),
        ..PkgInfo::default()
    };

    PackageMetadata { info, versions }
}

fn dependency_names(manifest: &Value) -> Vec<String> {
    manifest
        .get("dependencies")
        .and_then(|deps| deps.as_object())
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

/// `repository` and `bugs` are either a bare string or an object with `url`.
fn url_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(url)) => url.clone(),
        Some(value) => str_field(value, "url"),
        None => String::new(),
    }
}

fn license_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(license)) => license.clone(),
        Some(value) => str_field(value, "type"),
        None => String::new(),
    }
}

fn parse_author(value: &Value) -> AuthorInfo {
    match value {
        Value::String(raw) => AuthorInfo {
            name: raw.clone(),
            ..AuthorInfo::default()
        },
        _ => AuthorInfo {
            name: str_field(value, "name"),
            email: str_field(value, "email"),
            url: str_field(value, "url"),
        },
    }
}
