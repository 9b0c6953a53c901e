use gumdrop::Options;
use httpmock::MockServer;

use flowload::flow::FlowSet;
use goose::config::GooseConfiguration;
use goose::metrics::GooseMetrics;

/// Not all functions are used by all tests, so we enable allow(dead_code) to avoid
/// compiler warnings during testing.

/// The following options are configured by default, if not set to a custom value:
///  --host <mock-server>
///  --users 1
///  --hatch-rate 1
///  --run-time 1
#[allow(dead_code)]
pub fn build_configuration(server: &MockServer, custom: Vec<&str>) -> GooseConfiguration {
    // Start with an empty configuration.
    let mut configuration: Vec<&str> = vec![];
    // Declare server_url here no matter what, so its lifetime is sufficient when needed.
    let server_url = server.base_url();

    // Merge in all custom options first.
    configuration.extend_from_slice(&custom);

    // Default to using mock server if not otherwise configured.
    if !configuration.contains(&"--host") {
        configuration.extend_from_slice(&["--host", &server_url]);
    }

    // Default to testing with 1 user if not otherwise configured.
    if !configuration.contains(&"--users") {
        configuration.extend_from_slice(&["--users", "1"]);
    }

    // Default to hatch 1 user per second if not otherwise configured.
    if !configuration.contains(&"--hatch-rate") {
        configuration.extend_from_slice(&["--hatch-rate", "1"]);
    }

    // Default to running for 1 second if not otherwise configured.
    if !configuration.contains(&"--run-time") {
        configuration.extend_from_slice(&["--run-time", "1"]);
    }

    bare_configuration(configuration)
}

/// Build a configuration from exactly the options given, leaving everything else to
/// the flow file's defaults.
pub fn bare_configuration(options: Vec<&str>) -> GooseConfiguration {
    GooseConfiguration::parse_args_default(&options)
        .expect("failed to parse options and generate a configuration")
}

/// Run the flow load test, returning the GooseMetrics.
#[allow(dead_code)]
pub async fn run_flow_test(flow_set: &FlowSet, configuration: GooseConfiguration) -> GooseMetrics {
    flowload::run(flow_set, configuration)
        .await
        .expect("failed to run flow load test")
}

/// Helper to delete test artifacts, if existing.
#[allow(dead_code)]
pub fn cleanup_files(files: Vec<&str>) {
    for file in files {
        if std::path::Path::new(file).exists() {
            std::fs::remove_file(file).expect("failed to remove file");
        }
    }
}
