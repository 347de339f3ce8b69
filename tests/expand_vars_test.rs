//! Tests for variable expansion in TLS certificate paths

use kviator::domain::expand_env_vars;

#[test]
fn given_cert_path_with_braced_var_when_expanding_then_substitutes() {
    // Arrange
    std::env::set_var("KVIATOR_TEST_CERT_DIR", "/etc/kviator/certs");

    // Act
    let result = expand_env_vars("${KVIATOR_TEST_CERT_DIR}/ca.pem");

    // Assert
    assert_eq!(result, "/etc/kviator/certs/ca.pem");

    // Cleanup
    std::env::remove_var("KVIATOR_TEST_CERT_DIR");
}

#[test]
fn given_undefined_var_when_expanding_then_returns_input() {
    // shellexpand fails on unknown variables; the raw path is kept
    let result = expand_env_vars("$KVIATOR_UNDEFINED_XYZ/client.pem");

    assert_eq!(result, "$KVIATOR_UNDEFINED_XYZ/client.pem");
}

#[test]
fn given_plain_path_when_expanding_then_unchanged() {
    assert_eq!(expand_env_vars("/certs/client-key.pem"), "/certs/client-key.pem");
}

#[test]
fn given_tilde_path_when_expanding_then_expands_home() {
    let result = expand_env_vars("~/certs/ca.pem");

    assert!(!result.starts_with('~'));
    assert!(result.ends_with("/certs/ca.pem"));
}
