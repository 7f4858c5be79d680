#[cfg(test)]
mod error_tests {
    use crate::*;
    use serde_json::json;

    #[test]
    fn test_dashboard_error_display() {
        let http_error = DashboardError::http(404, None);
        assert_eq!(http_error.to_string(), "HTTP错误: 404");

        let transport_error = DashboardError::transport("connection refused");
        assert_eq!(transport_error.to_string(), "网络错误: connection refused");

        let not_found = DashboardError::record_not_found(42);
        assert_eq!(not_found.to_string(), "记录未找到: 42");

        let busy = DashboardError::SubmissionInFlight;
        assert_eq!(busy.to_string(), "表单正在提交中");
    }

    #[test]
    fn test_http_status_messages() {
        assert_eq!(http_status_message(400), "Bad request.");
        assert_eq!(http_status_message(403), "Forbidden.");
        assert_eq!(http_status_message(404), "Not found.");
        assert_eq!(http_status_message(500), "Server error.");
        assert_eq!(http_status_message(502), "Unknown error (502).");
        assert_eq!(http_status_message(0), "Unknown error (0).");
    }

    #[test]
    fn test_user_message_for_transport_failure() {
        let error = DashboardError::transport("dns failure");
        assert_eq!(error.status_code(), Some(0));
        assert_eq!(error.user_message(), "Unknown error (0).");
    }

    #[test]
    fn test_server_field_errors_nested() {
        let error = DashboardError::http(
            400,
            json!({"Errors": {"Name": "Name is taken.", "Other": ["first", "second"]}}),
        );
        let errors = error.server_field_errors().unwrap();
        assert_eq!(errors.get("Name").unwrap(), "Name is taken.");
        assert_eq!(errors.get("Other").unwrap(), "first");
        assert!(error.is_field_level());
    }

    #[test]
    fn test_server_field_errors_flat() {
        let error = DashboardError::http(400, json!({"JobType": "Unknown job type."}));
        let errors = error.server_field_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("JobType").unwrap(), "Unknown job type.");
    }

    #[test]
    fn test_server_field_errors_only_for_bad_request() {
        let error = DashboardError::http(500, json!({"Name": "boom"}));
        assert!(error.server_field_errors().is_none());
        assert!(!error.is_field_level());

        let empty = DashboardError::http(400, json!({}));
        assert!(empty.server_field_errors().is_none());
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let error: DashboardError = parse_error.into();
        assert!(matches!(error, DashboardError::Serialization(_)));
    }
}
