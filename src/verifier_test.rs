use super::*;

fn verifier() -> StaticVerifier {
    StaticVerifier::new().with_account("a@b.com", "hunter2", "Alice")
}

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  A@B.COM "), Some("a@b.com".to_owned()));
}

#[test]
fn normalize_email_rejects_missing_at() {
    assert_eq!(normalize_email("nobody"), None);
}

#[test]
fn normalize_email_rejects_empty_local_part() {
    assert_eq!(normalize_email("@b.com"), None);
}

#[test]
fn normalize_email_rejects_empty_host() {
    assert_eq!(normalize_email("a@"), None);
}

#[test]
fn normalize_email_rejects_double_at() {
    assert_eq!(normalize_email("a@b@c"), None);
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// StaticVerifier
// =============================================================================

#[tokio::test]
async fn correct_credentials_verify() {
    let identity = verifier().verify("a@b.com", "hunter2").await.unwrap();
    assert_eq!(identity.user.email, "a@b.com");
    assert_eq!(identity.user.display_name, "Alice");
    assert_eq!(identity.token.len(), 64);
}

#[tokio::test]
async fn email_is_matched_case_insensitively() {
    let identity = verifier().verify(" A@B.com ", "hunter2").await.unwrap();
    assert_eq!(identity.user.email, "a@b.com");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let err = verifier().verify("a@b.com", "wrong").await.unwrap_err();
    assert!(matches!(err, VerifyError::Rejected));
}

#[tokio::test]
async fn unknown_email_is_rejected() {
    let err = verifier().verify("x@y.com", "hunter2").await.unwrap_err();
    assert!(matches!(err, VerifyError::Rejected));
}

#[tokio::test]
async fn each_login_issues_a_fresh_token() {
    let v = verifier();
    let a = v.verify("a@b.com", "hunter2").await.unwrap();
    let b = v.verify("a@b.com", "hunter2").await.unwrap();
    assert_ne!(a.token, b.token);
}

// =============================================================================
// Error display (user-presentable messages)
// =============================================================================

#[test]
fn rejected_message_is_user_presentable() {
    assert_eq!(VerifyError::Rejected.to_string(), "invalid email or password");
}

#[test]
fn unavailable_message_includes_cause() {
    let err = VerifyError::Unavailable("connection refused".into());
    assert!(err.to_string().contains("connection refused"));
}

// =============================================================================
// HttpVerifier construction
// =============================================================================

#[test]
fn http_verifier_strips_trailing_slash() {
    let v = HttpVerifier::new("https://blog.example.com/").unwrap();
    assert_eq!(v.login_url, "https://blog.example.com/api/auth/login");
}
