//! Turning flow users into Goose scenarios.
//!
//! Each [`FlowUser`] becomes one [`Scenario`], and each of its requests becomes one
//! weighted [`Transaction`]. Transactions are closures sharing a read-only copy of the
//! request they replay, so no code is generated per flow.

use std::sync::Arc;
use std::time::Duration;

use goose::goose::GooseMethod;
use goose::prelude::*;

use crate::check::check_status;
use crate::flow::{FlowRequest, FlowSet, FlowUser};
use crate::headers;
use crate::FlowError;

/// A flow request with its headers merged and validated, ready to be sent repeatedly.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    pub name: String,
    pub method: GooseMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub expected_status: u16,
}
impl PreparedRequest {
    pub fn new(user: &FlowUser, request: &FlowRequest) -> Result<Self, FlowError> {
        Ok(PreparedRequest {
            name: request.name(),
            method: request.method.goose_method()?,
            path: request.path.clone(),
            headers: headers::merge_headers(&user.headers, &request.headers)?,
            body: request.body.clone(),
            expected_status: request.expected_status,
        })
    }

    /// Send the request as `user`. Only the expected status counts as success, and
    /// any other outcome is recorded as a failure with a fixed message.
    pub async fn send(&self, user: &mut GooseUser) -> TransactionResult {
        let mut request_builder = user.get_request_builder(&self.method, &self.path)?;
        for (name, value) in &self.headers {
            request_builder = request_builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &self.body {
            request_builder = request_builder.json(body);
        }

        // Goose keeps its first verdict, so no expected status code is set here.
        let goose_request = GooseRequest::builder()
            .method(self.method.clone())
            .path(self.path.as_str())
            .name(self.name.as_str())
            .set_request_builder(request_builder)
            .build();

        debug!("[user {}] sending {}", user.weighted_users_index, self.name);
        let mut goose = user.request(goose_request).await?;

        let observed = goose
            .response
            .as_ref()
            .ok()
            .map(|response| response.status().as_u16());
        let check = check_status(self.expected_status, observed);
        match check.failure_message(&self.name) {
            None => {
                // An expected non-2xx status was counted as a failure by Goose.
                goose.request.error.clear();
                user.set_success(&mut goose.request)
            }
            Some(message) => {
                let headers = goose
                    .response
                    .as_ref()
                    .ok()
                    .map(|response| response.headers().clone());
                user.set_failure(&message, &mut goose.request, headers.as_ref(), None)
            }
        }
    }
}

/// Build the weighted transaction that replays `request` on behalf of `user`.
pub fn build_transaction(
    user: &FlowUser,
    request: &FlowRequest,
) -> Result<Transaction, FlowError> {
    let prepared = Arc::new(PreparedRequest::new(user, request)?);
    let name = prepared.name.clone();

    let closure: TransactionFunction = Arc::new(move |goose_user| {
        let prepared = Arc::clone(&prepared);
        Box::pin(async move { prepared.send(goose_user).await })
    });

    let mut transaction = Transaction::new(closure)
        .set_name(&name)
        .set_weight(request.weight)?;
    if request.on_start {
        transaction = transaction.set_on_start();
    }
    Ok(transaction)
}

/// Build the scenario simulating `user`.
pub fn build_scenario(user: &FlowUser) -> Result<Scenario, FlowError> {
    let mut scenario = Scenario::new(&user.name).set_weight(user.weight)?;
    if let Some(wait_time) = user.wait_time {
        scenario = scenario.set_wait_time(
            Duration::from_millis(wait_time.min),
            Duration::from_millis(wait_time.max),
        )?;
    }
    if let Some(host) = &user.host {
        scenario = scenario.set_host(host);
    }
    for request in &user.requests {
        scenario = scenario.register_transaction(build_transaction(user, request)?);
    }
    Ok(scenario)
}

/// Build one scenario per user, in file order.
pub fn build_scenarios(flow_set: &FlowSet) -> Result<Vec<Scenario>, FlowError> {
    let scenarios = flow_set
        .users
        .iter()
        .map(build_scenario)
        .collect::<Result<Vec<_>, _>>()?;
    info!("built {} scenarios from flow data", scenarios.len());
    Ok(scenarios)
}
