//! Full CRUD lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every service
//! operation over real HTTP through `UreqTransport`. Validates that request
//! building, envelope unwrapping, and error mapping work end-to-end with the
//! actual server, whose routes mix bare and enveloped bodies.

use std::net::SocketAddr;

use bugtracker_core::{
    BugFilters, BugService, BugStatus, ClientConfig, CreateBug, EndpointSource, Environment,
    Priority, ResolveMode, UpdateBug, UreqTransport,
};

/// Start the mock server on a background thread and return its address.
fn start_mock_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn service_for(addr: SocketAddr) -> BugService<UreqTransport, Environment> {
    BugService::new(
        UreqTransport::new(),
        Environment::with_override(format!("http://{addr}")),
        ClientConfig::default().with_mode(ResolveMode::Strict),
    )
}

#[test]
fn crud_lifecycle() {
    // Step 1: start mock server on a random port.
    let addr = start_mock_server();
    let service = service_for(addr);

    let endpoint = service.endpoint().unwrap();
    assert_eq!(endpoint.api_url(), format!("http://{addr}/api"));
    assert_eq!(endpoint.source(), EndpointSource::Override);

    // Step 2: list (enveloped) should be empty.
    let bugs = service.list(&BugFilters::default()).unwrap();
    assert!(bugs.is_empty(), "expected empty list");

    // Step 3: create (bare object).
    let input = CreateBug {
        status: Some(BugStatus::Open),
        priority: Some(Priority::High),
        reporter: Some("qa".to_string()),
        ..CreateBug::new("Integration test", "created over HTTP")
    };
    let created = service.create(&input).unwrap();
    assert_eq!(created.title, input.title);
    assert_eq!(created.description, input.description);
    assert_eq!(Some(created.status), input.status);
    assert_eq!(Some(created.priority), input.priority);
    assert_eq!(created.reporter, input.reporter);
    assert!(created.created_at.is_some());
    let id = created.id.clone();

    // Step 4: get (enveloped) equals the created record.
    let fetched = service.get_by_id(&id).unwrap();
    assert_eq!(fetched, created);

    // Step 5: update status only.
    let patch = UpdateBug {
        status: Some(BugStatus::InProgress),
        ..UpdateBug::default()
    };
    let updated = service.update(&id, &patch).unwrap();
    assert_eq!(updated.status, BugStatus::InProgress);
    assert_eq!(updated.title, "Integration test");

    // Step 6: filters reach the server.
    let open = service
        .list(&BugFilters::new().with_status(BugStatus::Open))
        .unwrap();
    assert!(open.is_empty());
    let in_progress = service
        .list(&BugFilters::new().with_status(BugStatus::InProgress))
        .unwrap();
    assert_eq!(in_progress.len(), 1);

    // Step 7: delete.
    assert!(service.remove(&id).unwrap());

    // Step 8: get after delete is a 404 with the server's message.
    let err = service.get_by_id(&id).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Bug not found"));

    // Step 9: delete again is a 404.
    let err = service.remove(&id).unwrap_err();
    assert!(err.is_not_found());

    // Step 10: list is empty again.
    let bugs = service.list(&BugFilters::default()).unwrap();
    assert!(bugs.is_empty(), "expected empty list after delete");
}

#[test]
fn validation_errors_surface_server_message() {
    let service = service_for(start_mock_server());

    let err = service.create(&CreateBug::new("   ", "blank")).unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Title is required"));
}

#[test]
fn list_sorts_by_priority() {
    let service = service_for(start_mock_server());
    for (title, priority) in [
        ("medium", Priority::Medium),
        ("high", Priority::High),
        ("low", Priority::Low),
    ] {
        let input = CreateBug {
            priority: Some(priority),
            ..CreateBug::new(title, "")
        };
        service.create(&input).unwrap();
    }

    let bugs = service
        .list(&BugFilters::new().with_sort("-priority"))
        .unwrap();
    let titles: Vec<_> = bugs.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["high", "medium", "low"]);
}

#[test]
fn health_and_connection_tests_pass_against_live_server() {
    let service = service_for(start_mock_server());

    let report = service.probe_health().unwrap();
    assert!(report.reachable, "{report:?}");
    assert_eq!(report.status_code, Some(200));
    let details = report.details().unwrap();
    assert_eq!(details.environment.as_deref(), Some("development"));
    if cfg!(target_os = "linux") {
        let memory = details.memory.expect("memory usage in health payload");
        assert!(memory.total > 0);
        assert!(memory.used <= memory.total);
    }

    let tests = service.run_connection_tests().unwrap();
    assert!(tests.overall, "{tests:?}");
    assert_eq!(tests.checks.len(), 2);

    // Connection tests are read-only.
    assert!(service.list(&BugFilters::default()).unwrap().is_empty());
}
