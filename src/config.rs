//! Command line options for the `flowload` binary.
//!
//! `flowload` adds a handful of options of its own and forwards everything after `--`
//! to Goose, so every Goose runtime option remains available:
//!
//! ```bash
//! $ flowload -f shop.json -- --host http://localhost:8080 -u 20 -r 4 -t 5m -v
//! ```

use gumdrop::Options;

use goose::config::GooseConfiguration;

use crate::flow::FlowSet;
use crate::FlowError;

/// Runtime options available when launching `flowload`.
#[derive(Options, Debug, Clone, Default)]
#[options(
    help = r#"Runs a Goose load test from a flow file of captured HTTP requests.

Goose options follow a `--` separator, for example:
  flowload -f shop.json -- --host http://localhost:8080 --users 10

The following options are available:"#
)]
pub struct FlowloadConfiguration {
    /// Displays this help
    #[options(short = "h")]
    pub help: bool,
    /// Loads simulated users from this JSON flow file
    #[options(short = "f", meta = "PATH")]
    pub flow_file: String,
    /// Validates the flow file, prints each user's request shares and exits
    #[options(short = "c")]
    pub check: bool,
    /// Options passed through to Goose
    #[options(free)]
    pub goose_options: Vec<String>,
}
impl FlowloadConfiguration {
    /// Parse command line arguments, excluding the program name.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, FlowError> {
        FlowloadConfiguration::parse_args_default(args).map_err(|e| FlowError::InvalidOption {
            option: "flowload".to_string(),
            value: args
                .iter()
                .map(|a| a.as_ref())
                .collect::<Vec<&str>>()
                .join(" "),
            detail: e.to_string(),
        })
    }

    /// Build the Goose configuration from the forwarded options.
    pub fn goose_configuration(&self) -> Result<GooseConfiguration, FlowError> {
        GooseConfiguration::parse_args_default(&self.goose_options).map_err(|e| {
            FlowError::InvalidOption {
                option: "goose".to_string(),
                value: self.goose_options.join(" "),
                detail: e.to_string(),
            }
        })
    }

    /// Load the configured flow file.
    pub fn flow_set(&self) -> Result<FlowSet, FlowError> {
        if self.flow_file.is_empty() {
            return Err(FlowError::InvalidOption {
                option: "--flow-file".to_string(),
                value: String::new(),
                detail: "a flow file is required, set it with --flow-file".to_string(),
            });
        }
        FlowSet::from_file(&self.flow_file)
    }
}

/// Summarize each user and how often each of its requests is selected.
pub fn check_summary(flow_set: &FlowSet) -> String {
    let total_weight: usize = flow_set.users.iter().map(|u| u.weight).sum();
    let mut summary = String::new();
    for user in &flow_set.users {
        summary.push_str(&format!(
            "{} (weight {}, {:.1}% of users)\n",
            user.name,
            user.weight,
            user.weight as f32 * 100.0 / total_weight as f32
        ));
        for request in user.requests.iter().filter(|r| r.on_start) {
            summary.push_str(&format!("  on start: {}\n", request.name()));
        }
        for (name, share) in user.selection_shares() {
            summary.push_str(&format!("  {:>5.1}%  {}\n", share * 100.0, name));
        }
    }
    summary
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn goose_options_follow_separator() {
        let configuration = FlowloadConfiguration::parse(&[
            "-f",
            "shop.json",
            "--",
            "--host",
            "http://localhost:8080",
            "--users",
            "3",
        ])
        .unwrap();
        assert_eq!(configuration.flow_file, "shop.json");
        assert!(!configuration.check);
        assert_eq!(
            configuration.goose_options,
            vec!["--host", "http://localhost:8080", "--users", "3"]
        );

        let goose_configuration = configuration.goose_configuration().unwrap();
        assert_eq!(goose_configuration.host, "http://localhost:8080");
        assert_eq!(goose_configuration.users, Some(3));
    }

    #[test]
    fn check_flag() {
        let configuration =
            FlowloadConfiguration::parse(&["--check", "--flow-file", "a.json"]).unwrap();
        assert!(configuration.check);
        assert!(configuration.goose_options.is_empty());
    }

    #[test]
    fn invalid_options() {
        assert!(matches!(
            FlowloadConfiguration::parse(&["--no-such-option"]),
            Err(FlowError::InvalidOption { .. })
        ));

        let configuration =
            FlowloadConfiguration::parse(&["--", "--no-such-goose-option"]).unwrap();
        assert!(matches!(
            configuration.goose_configuration(),
            Err(FlowError::InvalidOption { .. })
        ));

        // A flow file is required.
        assert!(matches!(
            FlowloadConfiguration::default().flow_set(),
            Err(FlowError::InvalidOption { .. })
        ));
    }

    #[test]
    fn summary() {
        let flow_set = FlowSet::from_json(
            r#"{ "users": [
                { "name": "Shopper", "weight": 3, "requests": [
                    {
                        "path": "/login",
                        "method": "POST",
                        "on_start": true,
                        "description": "log in"
                    },
                    { "path": "/", "weight": 3 },
                    { "path": "/cart" }
                ] },
                { "name": "Browser", "requests": [{ "path": "/about" }] }
            ] }"#,
        )
        .unwrap();
        assert_eq!(
            check_summary(&flow_set),
            "Shopper (weight 3, 75.0% of users)\n\
             \x20 on start: log in\n\
             \x20  75.0%  GET /\n\
             \x20  25.0%  GET /cart\n\
             Browser (weight 1, 25.0% of users)\n\
             \x20 100.0%  GET /about\n"
        );
    }
}
