use crate::error::FluentReqError;
use crate::http::Response;

pub fn exit_code_for_error(err: &FluentReqError) -> i32 {
    match err {
        FluentReqError::MissingUrlParameter { .. } | FluentReqError::InvalidUrl(_) => 3,
        FluentReqError::Config(_)
        | FluentReqError::InvalidMethod(_)
        | FluentReqError::InvalidHeader(_) => 2,
        FluentReqError::Json(_) => 26,
        FluentReqError::Io(_) => 23,
        FluentReqError::Runtime(_) => 1,
        FluentReqError::Http(err) => http_exit_code(err),
    }
}

/// Exit code for an exchange that completed on the error path.
pub fn exit_code_for_status(status: u16) -> i32 {
    match status {
        0 => 7,
        400.. => 22,
        _ => 0,
    }
}

/// Exit code for a response delivered on the error path.
///
/// Status `0` carries the transport failure in its status text, which is the
/// display form of the `FluentReqError` that stopped the exchange.
pub fn exit_code_for_failure(response: &Response) -> i32 {
    if response.status() != 0 {
        return exit_code_for_status(response.status());
    }
    let reason = response.status_text();
    if reason.starts_with("Invalid URL") {
        3
    } else if reason.starts_with("Invalid HTTP method")
        || reason.starts_with("Invalid header")
        || reason.starts_with("Configuration error")
    {
        2
    } else {
        exit_code_for_status(0)
    }
}

fn http_exit_code(err: &reqwest::Error) -> i32 {
    if err.is_timeout() {
        return 28;
    }
    if err.is_connect() {
        return 7;
    }
    if err.is_request() {
        return 2;
    }
    43
}

#[cfg(test)]
mod tests {
    use super::{exit_code_for_error, exit_code_for_failure, exit_code_for_status};
    use crate::config::RequestConfig;
    use crate::error::FluentReqError;
    use crate::http::{Completion, Response};
    use std::sync::Arc;

    fn failed(err: FluentReqError) -> Response {
        let completion = Completion::failed(err.to_string());
        Response::new(
            completion.body,
            completion.status,
            completion.status_text,
            Arc::new(RequestConfig::new("/")),
        )
    }

    #[test]
    fn exit_code_maps_missing_parameter() {
        let err = FluentReqError::MissingUrlParameter {
            name: "id".to_string(),
            template: "/users/{id}".to_string(),
        };
        assert_eq!(exit_code_for_error(&err), 3);
    }

    #[test]
    fn exit_code_maps_json() {
        let err: FluentReqError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(exit_code_for_error(&err), 26);
    }

    #[test]
    fn exit_code_maps_statuses() {
        assert_eq!(exit_code_for_status(0), 7);
        assert_eq!(exit_code_for_status(404), 22);
        assert_eq!(exit_code_for_status(503), 22);
        assert_eq!(exit_code_for_status(200), 0);
    }

    #[test]
    fn exit_code_for_failure_separates_url_errors_from_connect() {
        let relative = failed(FluentReqError::InvalidUrl(
            "Relative URL '/x' requires a base URL".to_string(),
        ));
        assert_eq!(exit_code_for_failure(&relative), 3);

        let method = failed(FluentReqError::InvalidMethod("B AD".to_string()));
        assert_eq!(exit_code_for_failure(&method), 2);

        let refused = Response::new("", 0, "error sending request", Arc::new(RequestConfig::new("/")));
        assert_eq!(exit_code_for_failure(&refused), 7);

        let not_found = Response::new("", 404, "Not Found", Arc::new(RequestConfig::new("/")));
        assert_eq!(exit_code_for_failure(&not_found), 22);
    }
}
