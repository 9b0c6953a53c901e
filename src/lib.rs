//! # flowload
//!
//! Load tests built from captured HTTP request flows.
//!
//! `flowload` reads a *flow file*, a JSON description of one or more simulated users
//! and the requests each of them replays, and runs it as a
//! [Goose](https://docs.rs/goose/) load test. Every user becomes a Goose
//! [`Scenario`](goose::goose::Scenario) and every captured request becomes a weighted
//! [`Transaction`](goose::goose::Transaction). Goose schedules the users, paces them
//! and reports the metrics; `flowload` only describes what they do.
//!
//! ## Flow files
//!
//! ```json
//! {
//!   "defaults": { "host": "http://localhost:8080", "users": 10, "run_time": 60 },
//!   "users": [
//!     {
//!       "name": "ShopperUser",
//!       "weight": 3,
//!       "wait_time": { "min": 500, "max": 2000 },
//!       "headers": { "Accept": "application/json" },
//!       "requests": [
//!         { "path": "/login", "method": "POST", "body": { "user": "demo" }, "on_start": true },
//!         { "path": "/", "description": "front page", "weight": 5 },
//!         { "path": "/cart", "method": "POST", "body": { "sku": "A1" },
//!           "expected_status": 201, "description": "add to cart", "weight": 2 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Each request carries:
//!  - `method`: `GET` (default), `POST`, `PUT`, `PATCH`, `DELETE` or `HEAD`
//!  - `path`: relative to the load test host, starting with `/`
//!  - `headers`: merged over the user's `headers`, see [`headers`]
//!  - `body`: optional, sent as JSON
//!  - `expected_status`: the only status counted as success (default `200`)
//!  - `description`: names the transaction and its request metrics
//!  - `weight`: relative selection frequency among the user's requests (default `1`)
//!  - `on_start`: run once per user before anything else
//!
//! Any response with a status other than `expected_status` is marked failed with a
//! message naming both codes; see [`check`].
//!
//! ## Running
//!
//! ```bash
//! $ flowload --flow-file shop.json -- --host http://localhost:8080 --users 20 --run-time 5m
//! ```
//!
//! Everything after `--` is a regular Goose option. Values in the flow file's
//! `defaults` are used only where no option was given.
//!
//! ## Library use
//!
//! ```rust,no_run
//! use flowload::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), FlowError> {
//!     let flow_set = FlowSet::from_file("shop.json")?;
//!     let configuration = GooseConfiguration::default();
//!     let goose_metrics = flowload::run(&flow_set, configuration).await?;
//!     println!("{} requests", goose_metrics.requests.len());
//!     Ok(())
//! }
//! ```

#[macro_use]
extern crate log;

pub mod check;
pub mod config;
pub mod flow;
pub mod headers;
pub mod prelude;
pub mod scenario;

use std::{fmt, io};

use goose::config::{GooseConfiguration, GooseDefault, GooseDefaultType};
use goose::metrics::GooseMetrics;
use goose::{GooseAttack, GooseError};

use crate::flow::FlowSet;
use crate::scenario::build_scenarios;

/// An enumeration of all errors a flow load test can return.
#[derive(Debug)]
pub enum FlowError {
    /// Wraps a [`std::io::Error`](https://doc.rust-lang.org/std/io/struct.Error.html).
    Io(io::Error),
    /// Wraps a [`serde_json::Error`](https://docs.rs/serde_json/*/serde_json/struct.Error.html).
    Json(serde_json::Error),
    /// Wraps a [`goose::GooseError`](https://docs.rs/goose/*/goose/enum.GooseError.html).
    Goose(GooseError),
    /// Invalid option or value specified.
    InvalidOption {
        /// The invalid option that caused this error.
        option: String,
        /// The invalid value that caused this error.
        value: String,
        /// An optional explanation of the error.
        detail: String,
    },
    /// Unsupported HTTP method.
    InvalidMethod {
        method: String,
        /// An optional explanation of the error.
        detail: String,
    },
    /// Request path can't be appended to the load test host.
    InvalidPath {
        path: String,
        /// An optional explanation of the error.
        detail: String,
    },
    /// Header name or value can't be sent.
    InvalidHeader {
        name: String,
        /// An optional explanation of the error.
        detail: String,
    },
    /// Expected status is not a valid HTTP status code.
    InvalidStatus {
        status: u16,
        /// An optional explanation of the error.
        detail: String,
    },
    /// Invalid weight specified.
    InvalidWeight {
        weight: usize,
        /// An optional explanation of the error.
        detail: String,
    },
    /// Invalid wait time specified, in milliseconds.
    InvalidWaitTime {
        min_wait: u64,
        max_wait: u64,
        /// An optional explanation of the error.
        detail: String,
    },
    /// Two users share a name.
    DuplicateUser { name: String },
    /// No users defined.
    NoUsers {
        /// An optional explanation of the error.
        detail: String,
    },
    /// User defines no requests.
    NoRequests { user: String },
}
/// Implement a helper to provide a text description of all possible types of errors.
impl FlowError {
    fn describe(&self) -> &str {
        match *self {
            FlowError::Io(_) => "io::Error",
            FlowError::Json(_) => "serde_json::Error",
            FlowError::Goose(_) => "goose::GooseError",
            FlowError::InvalidOption { .. } => "invalid option or value specified",
            FlowError::InvalidMethod { .. } => "invalid method specified",
            FlowError::InvalidPath { .. } => "invalid path specified",
            FlowError::InvalidHeader { .. } => "invalid header specified",
            FlowError::InvalidStatus { .. } => "invalid expected status specified",
            FlowError::InvalidWeight { .. } => "invalid weight specified",
            FlowError::InvalidWaitTime { .. } => "invalid wait_time specified",
            FlowError::DuplicateUser { .. } => "duplicate user name",
            FlowError::NoUsers { .. } => "no users defined",
            FlowError::NoRequests { .. } => "user defines no requests",
        }
    }
}

/// Implement format trait to allow displaying errors.
impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FlowError::Io(ref source) => write!(f, "FlowError: {} ({})", self.describe(), source),
            FlowError::Json(ref source) => {
                write!(f, "FlowError: {} ({})", self.describe(), source)
            }
            FlowError::Goose(ref source) => {
                write!(f, "FlowError: {} ({})", self.describe(), source)
            }
            FlowError::InvalidOption { ref detail, .. }
            | FlowError::InvalidMethod { ref detail, .. }
            | FlowError::InvalidPath { ref detail, .. }
            | FlowError::InvalidHeader { ref detail, .. }
            | FlowError::InvalidStatus { ref detail, .. }
            | FlowError::InvalidWeight { ref detail, .. }
            | FlowError::InvalidWaitTime { ref detail, .. }
            | FlowError::NoUsers { ref detail } => {
                write!(f, "FlowError: {} ({})", self.describe(), detail)
            }
            FlowError::DuplicateUser { ref name } => {
                write!(f, "FlowError: {} ({})", self.describe(), name)
            }
            FlowError::NoRequests { ref user } => {
                write!(f, "FlowError: {} ({})", self.describe(), user)
            }
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            FlowError::Io(ref source) => Some(source),
            FlowError::Json(ref source) => Some(source),
            FlowError::Goose(ref source) => Some(source),
            _ => None,
        }
    }
}

/// Auto-convert IO errors.
impl From<io::Error> for FlowError {
    fn from(err: io::Error) -> FlowError {
        FlowError::Io(err)
    }
}

/// Auto-convert JSON errors.
impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> FlowError {
        FlowError::Json(err)
    }
}

/// Auto-convert Goose errors.
impl From<GooseError> for FlowError {
    fn from(err: GooseError) -> FlowError {
        FlowError::Goose(err)
    }
}

/// Register a scenario for every user in `flow_set` and apply the flow file's
/// defaults. Options already set in `configuration` take precedence over the defaults.
pub fn build_attack(
    flow_set: &FlowSet,
    configuration: GooseConfiguration,
) -> Result<GooseAttack, FlowError> {
    flow_set.validate()?;

    let mut goose_attack = GooseAttack::initialize_with_config(configuration)?;
    for scenario in build_scenarios(flow_set)? {
        goose_attack = goose_attack.register_scenario(scenario);
    }

    let defaults = &flow_set.defaults;
    if let Some(host) = &defaults.host {
        goose_attack = *goose_attack.set_default(GooseDefault::Host, host.as_str())?;
    }
    if let Some(users) = defaults.users {
        goose_attack = *goose_attack.set_default(GooseDefault::Users, users)?;
    }
    if let Some(hatch_rate) = &defaults.hatch_rate {
        goose_attack = *goose_attack.set_default(GooseDefault::HatchRate, hatch_rate.as_str())?;
    }
    if let Some(run_time) = defaults.run_time {
        goose_attack = *goose_attack.set_default(GooseDefault::RunTime, run_time)?;
    }

    Ok(goose_attack)
}

/// Run the flow load test to completion and return its metrics.
pub async fn run(
    flow_set: &FlowSet,
    configuration: GooseConfiguration,
) -> Result<GooseMetrics, FlowError> {
    let goose_attack = build_attack(flow_set, configuration)?;
    let goose_metrics = goose_attack.execute().await?;
    Ok(goose_metrics)
}
