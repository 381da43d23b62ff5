//! # Integration Tests
//!
//! End-to-end tests across the workspace crates: hub + built-in
//! dispatchers + settlement, driven the way an embedding application
//! would drive them.

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // contracts crate is usable standalone
        let name: contracts::ServiceName = "probe".into();
        assert_eq!(name.as_str(), "probe");
    }
}

#[cfg(test)]
mod e2e_tests {
    use coalescer::ServiceHub;
    use contracts::{CoreError, ServiceConfig, ServiceReply, ServiceStatus};
    use dispatcher::{register_builtins, serve_batches};

    fn doubling_hub() -> ServiceHub<u32, u32> {
        let hub = ServiceHub::new();
        register_builtins(&hub).unwrap();
        hub.register(
            "echo",
            ServiceConfig::call(|bodies: Vec<u32>| {
                Ok(bodies
                    .into_iter()
                    .map(|b| Some(ServiceReply::Success(b * 2)))
                    .collect())
            }),
            false,
        )
        .unwrap();
        hub
    }

    /// Submit 1,2,3 to a synchronous doubling service; expect 2,4,6 in
    /// submission order and status online.
    #[tokio::test]
    async fn test_call_service_end_to_end() {
        let hub = doubling_hub();

        let replies: Vec<_> = [1, 2, 3]
            .into_iter()
            .map(|n| hub.submit("echo", n).unwrap())
            .collect();
        hub.flush("echo").unwrap();

        let mut results = Vec::new();
        for reply in replies {
            results.push(reply.await.unwrap());
        }
        assert_eq!(results, vec![2, 4, 6]);
        assert_eq!(hub.status("echo"), Some(ServiceStatus::Online));
    }

    /// Same service shape, but the func fails: all three requests reject
    /// with the error and the service goes offline.
    #[tokio::test]
    async fn test_call_service_failure_end_to_end() {
        let hub: ServiceHub<u32, u32> = ServiceHub::new();
        register_builtins(&hub).unwrap();
        hub.register(
            "echo",
            ServiceConfig::call(|_bodies: Vec<u32>| Err(CoreError::other("kaput"))),
            false,
        )
        .unwrap();

        let replies: Vec<_> = [1, 2, 3]
            .into_iter()
            .map(|n| hub.submit("echo", n).unwrap())
            .collect();
        hub.flush("echo").unwrap();

        for reply in replies {
            let err = reply.await.unwrap_err();
            assert!(err.to_string().contains("kaput"));
        }
        assert_eq!(hub.status("echo"), Some(ServiceStatus::Offline));
    }

    /// Buffers are per service: flushing one leaves the other untouched.
    #[tokio::test]
    async fn test_no_cross_talk_between_services() {
        let hub = doubling_hub();
        hub.register(
            "other",
            ServiceConfig::call(|bodies: Vec<u32>| {
                Ok(bodies
                    .into_iter()
                    .map(|b| Some(ServiceReply::Success(b + 1)))
                    .collect())
            }),
            false,
        )
        .unwrap();

        let echo_reply = hub.submit("echo", 10).unwrap();
        let other_reply = hub.submit("other", 10).unwrap();

        hub.flush("echo").unwrap();
        assert_eq!(echo_reply.await.unwrap(), 20);

        // "other" has not been flushed yet
        assert_eq!(hub.pending_count("other"), 1);
        hub.flush("other").unwrap();
        assert_eq!(other_reply.await.unwrap(), 11);
    }

    /// Channel services round-trip through a serving task.
    #[tokio::test]
    async fn test_channel_service_end_to_end() {
        let hub: ServiceHub<String, String> = ServiceHub::new();
        register_builtins(&hub).unwrap();

        let endpoint = serve_batches(16, |bodies: Vec<String>| {
            bodies
                .into_iter()
                .map(|b| Some(ServiceReply::Success(b.to_uppercase())))
                .collect()
        });
        hub.register("shout", ServiceConfig::channel(endpoint), false)
            .unwrap();

        let reply = hub.submit("shout", "quiet words".to_string()).unwrap();
        hub.flush("shout").unwrap();

        assert_eq!(reply.await.unwrap(), "QUIET WORDS");
        assert_eq!(hub.status("shout"), Some(ServiceStatus::Online));
    }

    /// Deferred services settle after their future completes.
    #[tokio::test]
    async fn test_deferred_service_end_to_end() {
        let hub: ServiceHub<u32, u32> = ServiceHub::new();
        register_builtins(&hub).unwrap();
        hub.register(
            "slow-square",
            ServiceConfig::deferred(|bodies: Vec<u32>| async move {
                tokio::task::yield_now().await;
                Ok(bodies
                    .into_iter()
                    .map(|b| Some(ServiceReply::Success(b * b)))
                    .collect())
            }),
            false,
        )
        .unwrap();

        let replies: Vec<_> = [3, 4]
            .into_iter()
            .map(|n| hub.submit("slow-square", n).unwrap())
            .collect();
        hub.flush("slow-square").unwrap();

        let mut results = Vec::new();
        for reply in replies {
            results.push(reply.await.unwrap());
        }
        assert_eq!(results, vec![9, 16]);
        assert_eq!(hub.status("slow-square"), Some(ServiceStatus::Online));
    }

    /// Re-registration with the overwrite flag switches the config used by
    /// subsequent flushes.
    #[tokio::test]
    async fn test_overwrite_switches_config() {
        let hub = doubling_hub();

        let before = hub.submit("echo", 5).unwrap();
        hub.flush("echo").unwrap();
        assert_eq!(before.await.unwrap(), 10);

        hub.register(
            "echo",
            ServiceConfig::call(|bodies: Vec<u32>| {
                Ok(bodies
                    .into_iter()
                    .map(|b| Some(ServiceReply::Success(b * 3)))
                    .collect())
            }),
            true,
        )
        .unwrap();

        let after = hub.submit("echo", 5).unwrap();
        hub.flush("echo").unwrap();
        assert_eq!(after.await.unwrap(), 15);
    }

    /// Opaque payloads: the hub never inspects bodies, so JSON documents
    /// pass through untouched.
    #[tokio::test]
    async fn test_json_payloads_are_opaque() {
        let hub: ServiceHub<serde_json::Value, serde_json::Value> = ServiceHub::new();
        register_builtins(&hub).unwrap();
        hub.register(
            "tagger",
            ServiceConfig::call(|bodies: Vec<serde_json::Value>| {
                Ok(bodies
                    .into_iter()
                    .map(|mut doc| {
                        doc["seen"] = serde_json::json!(true);
                        Some(ServiceReply::Success(doc))
                    })
                    .collect())
            }),
            false,
        )
        .unwrap();

        let reply = hub
            .submit("tagger", serde_json::json!({"id": 42}))
            .unwrap();
        hub.flush("tagger").unwrap();

        let doc = reply.await.unwrap();
        assert_eq!(doc["id"], 42);
        assert_eq!(doc["seen"], true);
    }

    /// Per-request failures inside one batch do not poison the siblings.
    #[tokio::test]
    async fn test_mixed_outcomes_within_batch() {
        let hub: ServiceHub<u32, u32> = ServiceHub::new();
        register_builtins(&hub).unwrap();
        hub.register(
            "picky",
            ServiceConfig::call(|bodies: Vec<u32>| {
                Ok(bodies
                    .into_iter()
                    .map(|b| {
                        if b == 13 {
                            Some(ServiceReply::Failure("unlucky".into()))
                        } else {
                            Some(ServiceReply::Success(b))
                        }
                    })
                    .collect())
            }),
            false,
        )
        .unwrap();

        let ok = hub.submit("picky", 1).unwrap();
        let bad = hub.submit("picky", 13).unwrap();
        let also_ok = hub.submit("picky", 2).unwrap();
        hub.flush("picky").unwrap();

        assert_eq!(ok.await.unwrap(), 1);
        assert!(bad.await.unwrap_err().to_string().contains("unlucky"));
        assert_eq!(also_ok.await.unwrap(), 2);
    }
}
