use agora_probe::console::probe::app::run_with;
use agora_probe::console::probe::logger::Logger;
use agora_probe::console::probe::nagios::Status;
use axum::http::{Method, StatusCode};
use tracing::level_filters::LevelFilter;

use crate::common::logging::{tracing_stderr_init, INIT};
use crate::servers::agora::environment::{closed_address, Environment, Reply, LOGIN_PATH, RESOURCES_PATH};

/// Runs the checker against `url` and returns its status and output.
async fn check(url: &str, extra_args: &[&str]) -> (Status, String) {
    let mut args = vec!["agora-probe", "-U", url, "-u", "probe", "-p", "secret", "-t", "5"];
    args.extend_from_slice(extra_args);

    let logger = Logger::new();

    let status = run_with(args, &logger).await;

    (status, logger.log())
}

mod for_the_login {
    use super::*;

    #[tokio::test]
    async fn it_should_post_the_credentials_as_json() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(Reply::token("abc123"), Reply::ok(r#"[{"id": 1}]"#)).await;

        let _ = check(&env.url(), &[]).await;

        let login = &env.requests()[0];

        assert_eq!(login.method, Method::POST);
        assert_eq!(login.path, LOGIN_PATH);
        assert_eq!(login.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&login.body).unwrap(),
            serde_json::json!({"username": "probe", "password": "secret"})
        );

        env.stop();
    }

    #[tokio::test]
    async fn it_should_be_critical_when_the_login_is_rejected() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(
            Reply::new(StatusCode::UNAUTHORIZED, "Invalid credentials"),
            Reply::ok(r#"[{"id": 1}]"#),
        )
        .await;

        let (status, output) = check(&env.url(), &[]).await;

        assert_eq!(status, Status::Critical);
        assert_eq!(output, "CRITICAL - Cannot login.\n");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_not_check_the_resources_when_the_login_fails() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(
            Reply::new(StatusCode::FORBIDDEN, "Forbidden"),
            Reply::ok(r#"[{"id": 1}]"#),
        )
        .await;

        let _ = check(&env.url(), &[]).await;

        let requests = env.requests();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, LOGIN_PATH);

        env.stop();
    }

    #[tokio::test]
    async fn it_should_append_the_response_body_in_verbose_mode() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(
            Reply::new(StatusCode::UNAUTHORIZED, "Invalid credentials"),
            Reply::ok(r#"[{"id": 1}]"#),
        )
        .await;

        let (status, output) = check(&env.url(), &["--verbose"]).await;

        assert_eq!(status, Status::Critical);
        assert_eq!(output, "CRITICAL - Cannot login.Invalid credentials.\n");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_require_exactly_the_200_status_code() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(
            Reply::new(StatusCode::CREATED, r#"{"auth_token": "abc123"}"#),
            Reply::ok(r#"[{"id": 1}]"#),
        )
        .await;

        let (status, output) = check(&env.url(), &[]).await;

        assert_eq!(status, Status::Critical);
        assert_eq!(output, "CRITICAL - Cannot login.\n");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_be_critical_when_the_response_has_no_auth_token() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(Reply::ok(r#"{"detail": "ok"}"#), Reply::ok(r#"[{"id": 1}]"#)).await;

        let (status, output) = check(&env.url(), &[]).await;

        assert_eq!(status, Status::Critical);
        assert_eq!(output, "CRITICAL - Could not retrieve auth_token.\n");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_be_critical_when_the_response_is_not_json() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(Reply::ok("<html>maintenance</html>"), Reply::ok(r#"[{"id": 1}]"#)).await;

        let (status, output) = check(&env.url(), &[]).await;

        assert_eq!(status, Status::Critical);
        assert_eq!(
            output,
            format!("CRITICAL - Malformed JSON at {}{LOGIN_PATH}.\n", env.url())
        );

        env.stop();
    }
}

mod for_the_resources {
    use super::*;

    #[tokio::test]
    async fn it_should_be_ok_when_there_are_resources() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(Reply::token("abc123"), Reply::ok(r#"[{"id": 1}, {"id": 2}]"#)).await;

        let (status, output) = check(&env.url(), &[]).await;

        assert_eq!(status, Status::Ok);
        assert_eq!(output, "OK - Agora is up.\n");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_send_the_token_in_the_authorization_header() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(Reply::token("abc123"), Reply::ok(r#"[{"id": 1}]"#)).await;

        let _ = check(&env.url(), &[]).await;

        let requests = env.requests();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].authorization, None);
        assert_eq!(requests[1].method, Method::GET);
        assert_eq!(requests[1].path, RESOURCES_PATH);
        assert_eq!(requests[1].authorization.as_deref(), Some("Token abc123"));

        env.stop();
    }

    #[tokio::test]
    async fn it_should_be_a_warning_when_there_are_no_resources() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(Reply::token("abc123"), Reply::ok("[]")).await;

        let (status, output) = check(&env.url(), &[]).await;

        assert_eq!(status, Status::Warning);
        assert_eq!(output, "WARNING - No resources available.\n");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_append_the_empty_listing_in_verbose_mode() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(Reply::token("abc123"), Reply::ok("[]")).await;

        let (status, output) = check(&env.url(), &["-v"]).await;

        assert_eq!(status, Status::Warning);
        assert_eq!(output, "WARNING - No resources available.[].\n");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_be_critical_when_the_resources_cannot_be_retrieved() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(
            Reply::token("abc123"),
            Reply::new(StatusCode::INTERNAL_SERVER_ERROR, "[]"),
        )
        .await;

        let (status, output) = check(&env.url(), &[]).await;

        // The empty body of the failed response is not checked.
        assert_eq!(status, Status::Critical);
        assert_eq!(output, "CRITICAL - Could not retrieve resources.\n");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_be_critical_when_the_listing_is_not_a_collection() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let env = Environment::start(Reply::token("abc123"), Reply::ok("null")).await;

        let (status, output) = check(&env.url(), &[]).await;

        assert_eq!(status, Status::Critical);
        assert_eq!(
            output,
            format!("CRITICAL - Malformed JSON at {}{RESOURCES_PATH}.\n", env.url())
        );

        env.stop();
    }
}

mod for_transport_failures {
    use super::*;

    #[tokio::test]
    async fn it_should_report_an_ssl_error_when_the_tls_handshake_fails() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        // The fake API only speaks plain HTTP.
        let env = Environment::start(Reply::token("abc123"), Reply::ok(r#"[{"id": 1}]"#)).await;

        let (status, output) = check(&format!("https://{}", env.addr), &[]).await;

        assert_eq!(status, Status::Critical);
        assert!(output.starts_with("CRITICAL - SSL Error."), "unexpected output: {output}");

        env.stop();
    }

    #[tokio::test]
    async fn it_should_report_a_connection_error_when_nothing_is_listening() {
        INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

        let addr = closed_address().await;

        let (status, output) = check(&format!("http://{addr}"), &[]).await;

        assert_eq!(status, Status::Critical);
        assert!(output.starts_with("CRITICAL - Connection Error."), "unexpected output: {output}");
    }
}

#[tokio::test]
async fn it_should_produce_the_same_result_on_every_run() {
    INIT.call_once(|| tracing_stderr_init(LevelFilter::ERROR));

    let env = Environment::start(Reply::token("abc123"), Reply::ok("[]")).await;

    let first = check(&env.url(), &[]).await;
    let second = check(&env.url(), &[]).await;

    assert_eq!(first, second);
    assert_eq!(env.requests().len(), 4);

    env.stop();
}
