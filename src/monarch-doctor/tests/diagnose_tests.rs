use monarch_doctor::{CheckOutcome, Connectivity, Doctor, Recommendation, TokenPresence};
use monarch_keyring_store::MemoryStore;
use monarch_login::constants::DEFAULT_TOKEN_ACCOUNT;
use monarch_login::{ApiConfig, LoginCredentials, MonarchClient, TokenVault};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "a-long-enough-session-token-for-previews";

fn doctor(store: MemoryStore, server: &MockServer) -> Doctor<MemoryStore> {
    let client = MonarchClient::new(ApiConfig::new(server.uri())).unwrap();
    Doctor::new(TokenVault::new(store), client)
}

async fn mount_accounts(server: &MockServer, status: u16) {
    let response = if status == 200 {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"accounts": [{"id": "1"}, {"id": "2"}]}
        }))
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_valid_token_is_healthy() {
    let server = MockServer::start().await;
    mount_accounts(&server, 200).await;
    mount_root(&server).await;

    let report = doctor(MemoryStore::with_entry(DEFAULT_TOKEN_ACCOUNT, TOKEN), &server)
        .run(|| panic!("no prompt when a token is stored"))
        .await;

    assert!(report.healthy);
    assert_eq!(report.validity, Some(CheckOutcome::Passed { accounts: 2 }));
    assert_eq!(
        report.connectivity,
        Some(Connectivity::Reachable { status: 200 })
    );
    assert_eq!(report.recommendation, Recommendation::InspectCallers);
    assert_eq!(report.backend, "memory");
}

#[tokio::test]
async fn test_expired_token_needs_relogin() {
    let server = MockServer::start().await;
    mount_accounts(&server, 401).await;
    mount_root(&server).await;

    let report = doctor(MemoryStore::with_entry(DEFAULT_TOKEN_ACCOUNT, TOKEN), &server)
        .run(|| None)
        .await;

    assert!(!report.healthy);
    assert_eq!(report.recommendation, Recommendation::Relogin);
    assert_eq!(report.conclusion(), Some("Token is expired or invalid"));
}

#[tokio::test]
async fn test_rate_limited_token_is_indeterminate() {
    let server = MockServer::start().await;
    mount_accounts(&server, 429).await;
    mount_root(&server).await;

    let report = doctor(MemoryStore::with_entry(DEFAULT_TOKEN_ACCOUNT, TOKEN), &server)
        .run(|| None)
        .await;

    assert!(matches!(
        report.validity,
        Some(CheckOutcome::Indeterminate { .. })
    ));
    assert_eq!(report.recommendation, Recommendation::WaitThenLogin);
}

#[tokio::test]
async fn test_missing_token_without_prompt_stops_early() {
    let server = MockServer::start().await;

    let report = doctor(MemoryStore::new(), &server).run(|| None).await;

    assert_eq!(report.presence, TokenPresence::Missing);
    assert!(report.validity.is_none());
    assert!(report.fresh_login.is_none());
    assert!(report.connectivity.is_none());
    assert_eq!(report.recommendation, Recommendation::Login);
}

#[tokio::test]
async fn test_missing_token_with_working_fresh_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "fresh"})),
        )
        .mount(&server)
        .await;
    mount_accounts(&server, 200).await;

    let store = MemoryStore::new();
    let report = doctor(store, &server)
        .run(|| Some(LoginCredentials::new("me@example.com", "pw")))
        .await;

    assert_eq!(report.fresh_login, Some(CheckOutcome::Passed { accounts: 2 }));
    assert_eq!(report.recommendation, Recommendation::SaveSession);
    assert!(!report.healthy);
}

#[tokio::test]
async fn test_missing_token_with_refused_fresh_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let report = doctor(MemoryStore::new(), &server)
        .run(|| Some(LoginCredentials::new("me@example.com", "wrong")))
        .await;

    assert_eq!(report.recommendation, Recommendation::CheckCredentials);
}

#[tokio::test]
async fn test_fresh_login_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let report = doctor(MemoryStore::new(), &server)
        .run(|| Some(LoginCredentials::new("me@example.com", "pw")))
        .await;

    assert_eq!(report.recommendation, Recommendation::WaitThenLogin);
}
