//! The status check applied to every replayed request.

/// Outcome of comparing a response status with the one captured in the flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCheck {
    Passed,
    Failed {
        expected: u16,
        /// `None` when no response was received.
        observed: Option<u16>,
    },
}
impl StatusCheck {
    pub fn passed(&self) -> bool {
        *self == StatusCheck::Passed
    }

    /// The fixed message recorded when the request named `name` fails.
    pub fn failure_message(&self, name: &str) -> Option<String> {
        match *self {
            StatusCheck::Passed => None,
            StatusCheck::Failed {
                expected,
                observed: Some(status),
            } => Some(format!(
                "{}: expected status {}, got {}",
                name, expected, status
            )),
            StatusCheck::Failed {
                expected,
                observed: None,
            } => Some(format!(
                "{}: expected status {}, got no response",
                name, expected
            )),
        }
    }
}

/// Only an exact match with `expected` passes.
pub fn check_status(expected: u16, observed: Option<u16>) -> StatusCheck {
    match observed {
        Some(status) if status == expected => StatusCheck::Passed,
        _ => StatusCheck::Failed { expected, observed },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_match_passes() {
        assert_eq!(check_status(200, Some(200)), StatusCheck::Passed);
        assert!(check_status(404, Some(404)).passed());
        assert!(check_status(201, Some(201)).passed());
        assert_eq!(check_status(200, Some(200)).failure_message("index"), None);
    }

    #[test]
    fn any_other_status_fails() {
        // Another success code is still a failure.
        let check = check_status(201, Some(200));
        assert!(!check.passed());
        assert_eq!(
            check,
            StatusCheck::Failed {
                expected: 201,
                observed: Some(200)
            }
        );
        assert_eq!(
            check.failure_message("add to cart").unwrap(),
            "add to cart: expected status 201, got 200"
        );

        assert_eq!(
            check_status(200, Some(503)).failure_message("index").unwrap(),
            "index: expected status 200, got 503"
        );
    }

    #[test]
    fn no_response_fails() {
        let check = check_status(200, None);
        assert!(!check.passed());
        assert_eq!(
            check.failure_message("index").unwrap(),
            "index: expected status 200, got no response"
        );
    }
}
