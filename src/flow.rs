//! Flow data: the captured requests a simulated user replays.
//!
//! A flow file is a JSON document describing one or more simulated users. Each user
//! carries an ordered list of requests, and each request is the static tuple a load
//! test needs to replay it: method, path, headers, optional JSON body, expected
//! status code, a human-readable description and a task weight.
//!
//! ```rust
//! use flowload::flow::FlowSet;
//!
//! let flows = FlowSet::from_json(r#"{
//!     "users": [{
//!         "name": "Visitor",
//!         "requests": [
//!             { "path": "/", "description": "front page", "weight": 3 },
//!             { "method": "post", "path": "/search", "body": { "q": "goose" } }
//!         ]
//!     }]
//! }"#).unwrap();
//!
//! assert_eq!(flows.users[0].requests.len(), 2);
//! assert_eq!(flows.users[0].requests[1].name(), "POST /search");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use goose::goose::GooseMethod;

use crate::headers;
use crate::FlowError;

/// HTTP methods a flow request can use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlowMethod {
    Delete,
    Get,
    Head,
    Patch,
    Post,
    Put,
    /// Any other method found in a flow file, rejected by validation.
    Unsupported(String),
}
impl FlowMethod {
    /// The equivalent Goose method.
    pub fn goose_method(&self) -> Result<GooseMethod, FlowError> {
        match self {
            FlowMethod::Delete => Ok(GooseMethod::Delete),
            FlowMethod::Get => Ok(GooseMethod::Get),
            FlowMethod::Head => Ok(GooseMethod::Head),
            FlowMethod::Patch => Ok(GooseMethod::Patch),
            FlowMethod::Post => Ok(GooseMethod::Post),
            FlowMethod::Put => Ok(GooseMethod::Put),
            FlowMethod::Unsupported(method) => Err(FlowError::InvalidMethod {
                method: method.clone(),
                detail: "method must be one of DELETE, GET, HEAD, PATCH, POST or PUT".to_string(),
            }),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            FlowMethod::Delete => "DELETE",
            FlowMethod::Get => "GET",
            FlowMethod::Head => "HEAD",
            FlowMethod::Patch => "PATCH",
            FlowMethod::Post => "POST",
            FlowMethod::Put => "PUT",
            FlowMethod::Unsupported(method) => method,
        }
    }
}
impl Default for FlowMethod {
    fn default() -> Self {
        FlowMethod::Get
    }
}
impl From<String> for FlowMethod {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "DELETE" => FlowMethod::Delete,
            "GET" => FlowMethod::Get,
            "HEAD" => FlowMethod::Head,
            "PATCH" => FlowMethod::Patch,
            "POST" => FlowMethod::Post,
            "PUT" => FlowMethod::Put,
            _ => FlowMethod::Unsupported(s),
        }
    }
}
impl FromStr for FlowMethod {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = FlowMethod::from(s.to_string());
        method.goose_method()?;
        Ok(method)
    }
}
impl From<FlowMethod> for String {
    fn from(method: FlowMethod) -> Self {
        method.as_str().to_string()
    }
}
impl fmt::Display for FlowMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_weight() -> usize {
    1
}

fn default_expected_status() -> u16 {
    200
}

/// A single captured request, replayed as one weighted task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowRequest {
    #[serde(default)]
    pub method: FlowMethod,
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Sent as a JSON body when present.
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    /// The only status code treated as success.
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default)]
    pub description: String,
    /// Relative selection frequency among the user's tasks.
    #[serde(default = "default_weight")]
    pub weight: usize,
    /// Run once when the simulated user starts instead of repeatedly.
    #[serde(default)]
    pub on_start: bool,
}
impl FlowRequest {
    /// Create a GET request for `path` with every other field at its default.
    pub fn new(path: &str) -> Self {
        FlowRequest {
            method: FlowMethod::default(),
            path: path.to_string(),
            headers: BTreeMap::new(),
            body: None,
            expected_status: default_expected_status(),
            description: String::new(),
            weight: default_weight(),
            on_start: false,
        }
    }

    /// Name used for the task and its request metrics: the description if one was
    /// captured, otherwise `METHOD path`.
    pub fn name(&self) -> String {
        let description = self.description.trim();
        if description.is_empty() {
            format!("{} {}", self.method, self.path)
        } else {
            description.to_string()
        }
    }

    fn validate(&self) -> Result<(), FlowError> {
        self.method.goose_method()?;
        if !self.path.starts_with('/') {
            return Err(FlowError::InvalidPath {
                path: self.path.clone(),
                detail: format!("{}: path must start with '/'", self.name()),
            });
        }
        if self.path.chars().any(char::is_whitespace) {
            return Err(FlowError::InvalidPath {
                path: self.path.clone(),
                detail: format!("{}: path must not contain whitespace", self.name()),
            });
        }
        if http::StatusCode::from_u16(self.expected_status).is_err() {
            return Err(FlowError::InvalidStatus {
                status: self.expected_status,
                detail: format!("{}: expected_status must be from 100 to 999", self.name()),
            });
        }
        if self.weight == 0 {
            return Err(FlowError::InvalidWeight {
                weight: self.weight,
                detail: format!("{}: request weight must be greater than 0", self.name()),
            });
        }
        headers::validate_headers(&self.headers)
    }
}

/// Randomized pause between tasks, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitTime {
    pub min: u64,
    pub max: u64,
}

/// A simulated user: the equivalent of one load test user class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowUser {
    pub name: String,
    /// Relative share of launched users.
    #[serde(default = "default_weight")]
    pub weight: usize,
    #[serde(default)]
    pub wait_time: Option<WaitTime>,
    /// Overrides the load test host for this user only.
    #[serde(default)]
    pub host: Option<String>,
    /// Applied to every request, overridden by request headers of the same name.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub requests: Vec<FlowRequest>,
}
impl FlowUser {
    /// Create an empty user with weight 1.
    pub fn new(name: &str) -> Self {
        FlowUser {
            name: name.to_string(),
            weight: default_weight(),
            wait_time: None,
            host: None,
            headers: BTreeMap::new(),
            requests: Vec::new(),
        }
    }

    /// Append a request, builder style.
    pub fn request(mut self, request: FlowRequest) -> Self {
        self.requests.push(request);
        self
    }

    /// How often each repeating request is selected relative to the others, from 0.0
    /// to 1.0. Requests flagged `on_start` run once and are not included.
    pub fn selection_shares(&self) -> Vec<(String, f32)> {
        let total: usize = self
            .requests
            .iter()
            .filter(|r| !r.on_start)
            .map(|r| r.weight)
            .sum();
        if total == 0 {
            return Vec::new();
        }
        self.requests
            .iter()
            .filter(|r| !r.on_start)
            .map(|r| (r.name(), r.weight as f32 / total as f32))
            .collect()
    }

    fn validate(&self) -> Result<(), FlowError> {
        if self.name.trim().is_empty() {
            return Err(FlowError::InvalidOption {
                option: "users.name".to_string(),
                value: self.name.clone(),
                detail: "user name must not be empty".to_string(),
            });
        }
        if self.weight == 0 {
            return Err(FlowError::InvalidWeight {
                weight: self.weight,
                detail: format!("{}: user weight must be greater than 0", self.name),
            });
        }
        if let Some(wait_time) = self.wait_time {
            if wait_time.min > wait_time.max {
                return Err(FlowError::InvalidWaitTime {
                    min_wait: wait_time.min,
                    max_wait: wait_time.max,
                    detail: format!("{}: wait_time.min must not exceed wait_time.max", self.name),
                });
            }
        }
        if let Some(host) = &self.host {
            if host.trim().is_empty() {
                return Err(FlowError::InvalidOption {
                    option: "users.host".to_string(),
                    value: host.clone(),
                    detail: format!("{}: host must not be empty when set", self.name),
                });
            }
        }
        if self.requests.is_empty() {
            return Err(FlowError::NoRequests {
                user: self.name.clone(),
            });
        }
        headers::validate_headers(&self.headers)?;
        for request in &self.requests {
            request.validate()?;
        }
        Ok(())
    }
}

/// Load test defaults carried by a flow file. Command line options take precedence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDefaults {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub users: Option<usize>,
    #[serde(default)]
    pub hatch_rate: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub run_time: Option<usize>,
}

/// Every simulated user defined by one flow file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowSet {
    #[serde(default)]
    pub defaults: FlowDefaults,
    pub users: Vec<FlowUser>,
}
impl FlowSet {
    /// Parse and validate a flow document.
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let flow_set: FlowSet = serde_json::from_str(json)?;
        flow_set.validate()?;
        Ok(flow_set)
    }

    /// Read, parse and validate a flow file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FlowError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let flow_set = Self::from_json(&json)?;
        info!(
            "loaded {} flow users from {}",
            flow_set.users.len(),
            path.as_ref().display()
        );
        Ok(flow_set)
    }

    /// Look up a user by name.
    pub fn user(&self, name: &str) -> Option<&FlowUser> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        if self.users.is_empty() {
            return Err(FlowError::NoUsers {
                detail: "a flow file must define at least one user".to_string(),
            });
        }
        let mut names = HashSet::new();
        for user in &self.users {
            if !names.insert(user.name.as_str()) {
                return Err(FlowError::DuplicateUser {
                    name: user.name.clone(),
                });
            }
            user.validate()?;
        }
        if let Some(users) = self.defaults.users {
            if users == 0 {
                return Err(FlowError::InvalidOption {
                    option: "defaults.users".to_string(),
                    value: users.to_string(),
                    detail: "users must be greater than 0".to_string(),
                });
            }
        }
        if let Some(hatch_rate) = &self.defaults.hatch_rate {
            match hatch_rate.parse::<f32>() {
                Ok(rate) if rate > 0.0 => (),
                _ => {
                    return Err(FlowError::InvalidOption {
                        option: "defaults.hatch_rate".to_string(),
                        value: hatch_rate.clone(),
                        detail: "hatch_rate must be a number greater than 0".to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}
