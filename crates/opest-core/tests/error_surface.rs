use opest_core::errors::{ErrorInfo, OpestError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("term", "X0Z1")
        .with_context("reason", "example")
}

#[test]
fn type_error_surface() {
    let err = OpestError::Type(sample_info("T001", "expected a sum"));
    assert_eq!(err.code(), "T001");
    assert!(err.info().context.contains_key("term"));
}

#[test]
fn commutation_error_surface() {
    let err = OpestError::Commutation(sample_info("C001", "kinds disagree"));
    assert_eq!(err.info().code, "C001");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn backend_error_surface() {
    let err = OpestError::Backend(sample_info("B001", "device offline").with_hint("retry later"));
    assert_eq!(err.info().hint.as_deref(), Some("retry later"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = OpestError::Estimate(
        ErrorInfo::new("insufficient-shots", "need two shots")
            .with_context("shots", "1")
            .with_hint("raise the batch size"),
    );
    assert_eq!(
        err.to_string(),
        "estimate error: need two shots (code: insufficient-shots) | context: [shots=1] | hint: raise the batch size"
    );
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = OpestError::Config(ErrorInfo::new("batch-too-small", "batch_size must be >= 2"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Config");
    assert_eq!(json["detail"]["code"], "batch-too-small");
    let decoded: OpestError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn context_can_be_added_after_the_fact() {
    let err = OpestError::Config(ErrorInfo::new("config-parse", "bad yaml"))
        .with_context("path", "estimator.yaml");
    assert!(matches!(err, OpestError::Config(_)));
    assert_eq!(
        err.info().context.get("path").map(String::as_str),
        Some("estimator.yaml")
    );
}
