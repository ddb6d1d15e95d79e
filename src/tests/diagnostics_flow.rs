// End-to-end run over real HTTP: reqwest transport against httpmock servers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Result;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    use crate::auth::credentials::Credentials;
    use crate::auth::token_broker::{BrokerSettings, TokenBroker};
    use crate::config::proc_loader::parse_config;
    use crate::diagnostics::{Diagnostics, TokenStatus};
    use crate::probe::endpoint_prober::EndpointProber;
    use crate::probe::result::ProbeResult;
    use crate::resilience::deadline::run_with_deadline;
    use crate::tests::common::{json_response, token_body, ScriptedTransport, BASE_URL};
    use crate::transport::{AttemptOutcome, ReqwestTransport};
    use crate::ServiceConfig;

    fn config_yaml(base_url: &str) -> String {
        format!(
            r#"
settings:
  request_timeout_seconds: 5
  logging:
    level: debug
    format: compact
marketplace:
  base_url: "{base_url}"
  credentials:
    client_id: {{ value: "id1" }}
    client_secret: {{ value: "secret1" }}
  scopes: ["messenger"]
  vars:
    item_id: "42"
probes:
  - name: messenger
    endpoints:
      - /messenger/v1/chats
      - /messenger/v2/chats
  - name: item
    endpoints:
      - /core/v1/items/{{item_id}}
      - /core/v1/items/{{item_id}}/stats
"#
        )
    }

    async fn prepare_config(server: &MockServer) -> Result<ServiceConfig> {
        parse_config(config_yaml(&server.base_url())).await
    }

    fn mock_token_endpoint(server: &MockServer, status: u16) {
        server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .header("authorization", "Basic aWQxOnNlY3JldDE=");
            then.status(status)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "access_token": "T1",
                    "expires_in": 3600,
                    "scope": "messenger:read",
                    "token_type": "Bearer"
                }));
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn diagnostics_report_over_http() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_token_endpoint(&server, 200);
        server.mock(|when, then| {
            when.method(GET).path("/messenger/v1/chats");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/messenger/v2/chats")
                .header("authorization", "Bearer T1");
            then.status(200).json_body(json!({"items": []}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/core/v1/items/42");
            then.status(403);
        });
        server.mock(|when, then| {
            when.method(GET).path("/core/v1/items/42/stats");
            then.status(403);
        });

        let config = prepare_config(&server).await?;
        let diagnostics = Diagnostics::from_config(&config)?;
        let report = diagnostics.run(None).await;

        assert!(report.token_acquired());
        match &report.token {
            TokenStatus::Acquired { granted_scope, reported_scope, .. } => {
                assert_eq!(granted_scope, "messenger");
                assert_eq!(reported_scope.as_deref(), Some("messenger:read"));
            }
            other => panic!("unexpected token status {:?}", other),
        }

        let messenger = report.group("messenger").unwrap();
        assert_eq!(
            messenger.result,
            ProbeResult::Success { endpoint: "/messenger/v2/chats".into(), payload: json!({"items": []}) }
        );

        let item = report.group("item").unwrap();
        assert_eq!(
            item.result.attempted_statuses(),
            vec![("/core/v1/items/42", Some(403)), ("/core/v1/items/42/stats", Some(403))]
        );
        assert_eq!(report.reachable_groups(), vec!["messenger"]);

        let rendered = serde_json::to_value(&report)?;
        assert_eq!(rendered["token"]["status"], "acquired");
        assert_eq!(rendered["groups"][0]["result"]["result"], "success");
        Ok(())
    }

    #[tokio::test]
    async fn report_token_status_comes_from_the_acquired_token() -> Result<()> {
        let transport = ScriptedTransport::new(|req| {
            if req.method == reqwest::Method::POST {
                match req.form_value("scope") {
                    Some("messenger") => json_response(200, token_body("T1", 60)),
                    _ => json_response(403, json!({})),
                }
            } else {
                json_response(404, json!({}))
            }
        });
        let config = parse_config(config_yaml(BASE_URL)).await?;
        let diagnostics = Diagnostics::with_transport(&config, transport.clone())?;

        // token is stale the moment it is cached, so every group fetches a new one
        let report = diagnostics.run(None).await;
        match &report.token {
            TokenStatus::Acquired { granted_scope, .. } => assert_eq!(granted_scope, "messenger"),
            other => panic!("unexpected token status {:?}", other),
        }
        assert_eq!(report.groups.len(), 2);
        assert!(report.groups.iter().all(|group| !group.result.is_success()));
        assert_eq!(transport.scopes_tried().len(), 3);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn diagnostics_stop_after_auth_failure() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_token_endpoint(&server, 403);

        let config = prepare_config(&server).await?;
        let report = Diagnostics::from_config(&config)?.run(None).await;

        assert!(!report.token_acquired());
        assert!(report.groups.is_empty());
        match report.token {
            TokenStatus::Failed { attempts, .. } => {
                assert_eq!(attempts.len(), 1);
                assert_eq!(attempts[0].scope, "messenger");
                assert_eq!(attempts[0].outcome, AttemptOutcome::Forbidden);
            }
            other => panic!("unexpected token status {:?}", other),
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn group_filter_keeps_config_order() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_token_endpoint(&server, 200);
        server.mock(|when, then| {
            when.method(GET).path("/core/v1/items/42");
            then.status(200).json_body(json!({"id": 42}));
        });

        let config = prepare_config(&server).await?;
        let only = vec!["item".to_string()];
        let report = Diagnostics::from_config(&config)?.run(Some(only.as_slice())).await;

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.group("item").unwrap().result.payload(), Some(&json!({"id": 42})));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn request_timeout_counts_as_failed_attempt() -> Result<()> {
        let server = MockServer::start_async().await;
        mock_token_endpoint(&server, 200);
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(800)).json_body(json!({}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/fast");
            then.status(200).json_body(json!({"ok": true}));
        });

        let transport = Arc::new(ReqwestTransport::default());
        let mut settings = BrokerSettings::new(server.base_url(), vec!["messenger".to_string()]);
        settings.request_timeout = Duration::from_millis(200);
        let broker = Arc::new(TokenBroker::new(transport.clone(), Credentials::new("id1", "secret1"), settings));
        let prober = EndpointProber::new(broker, transport, server.base_url())
            .with_request_timeout(Duration::from_millis(200));

        let result = prober.probe(&["/slow".to_string(), "/fast".to_string()]).await;
        assert_eq!(result.payload(), Some(&json!({"ok": true})));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unreachable_host_is_reported_not_raised() -> Result<()> {
        let transport = Arc::new(ReqwestTransport::default());
        // nothing listens on port 9 on loopback
        let mut settings = BrokerSettings::new("http://127.0.0.1:9", vec!["a".to_string(), "b".to_string()]);
        settings.request_timeout = Duration::from_secs(2);
        let broker = TokenBroker::new(transport, Credentials::new("id1", "secret1"), settings);

        let err = run_with_deadline(Some(Duration::from_secs(10)), broker.get_token()).await?.unwrap_err();
        assert_eq!(err.attempts().len(), 2);
        assert!(err.attempts().iter().all(|a| matches!(a.outcome, AttemptOutcome::Transport(_))));
        Ok(())
    }
}
