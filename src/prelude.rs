pub use crate::check::{check_status, StatusCheck};
pub use crate::config::FlowloadConfiguration;
pub use crate::flow::{FlowDefaults, FlowMethod, FlowRequest, FlowSet, FlowUser, WaitTime};
pub use crate::scenario::{build_scenario, build_scenarios, build_transaction};
pub use crate::{build_attack, run, FlowError};
pub use goose::config::GooseConfiguration;
pub use goose::metrics::GooseMetrics;
