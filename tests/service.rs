//! End-to-end tests against a running report server.

use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use build_report_server::{BuildReport, ReportHandle, ReportServer, ReportStore, ServiceError};

mod common;

use common::{
    body_of, get, get_with_host, pump_until, raw_request, sample_store, start_server,
    test_config, with_client, CountingStore,
};

fn parse(body: &str) -> Value {
    serde_json::from_str(body).expect("response is JSON")
}

#[test]
fn latest_summary_returns_only_summary_fields() {
    let port = 28111;
    let (mut server, mut pump) = start_server(test_config(port));
    let store = sample_store();

    let body = with_client(&mut pump, &store, move || {
        get(port, "/unity/build-report/latest/summary")
    });
    assert_eq!(
        parse(&body),
        json!({"result": "Succeeded", "platform": "Android", "totalSize": 300})
    );

    let body = with_client(&mut pump, &store, move || {
        get(port, "/unity/build-report/R0/report")
    });
    let report = parse(&body);
    assert_eq!(report["id"], "R0");
    assert_eq!(report["steps"][0]["name"], "Compile scripts");

    server.stop().unwrap();
}

#[test]
fn steps_and_depth_bounded_trees() {
    let port = 28112;
    let (mut server, mut pump) = start_server(test_config(port));
    let store = sample_store();

    let (steps, shallow, bad_depth, deep, subtree) = with_client(&mut pump, &store, move || {
        (
            get(port, "/unity/build-report/R1/steps"),
            get(port, "/unity/build-report/R1/assets"),
            get(port, "/unity/build-report/R1/assets?depth=lots"),
            get(port, "/unity/build-report/R1/assets?depth=2"),
            get(port, "/unity/build-report/R1/assets/Textures/UI?depth=1"),
        )
    });

    assert_eq!(parse(&steps)[1]["name"], "Write asset files");
    assert_eq!(
        parse(&shallow),
        json!([{"name": "Textures", "size": 300, "childCount": 2}])
    );
    assert_eq!(parse(&bad_depth), parse(&shallow));
    assert_eq!(
        parse(&deep)[0]["children"][0]["children"][0]["name"],
        "button.png"
    );
    assert_eq!(parse(&subtree)["children"][0]["size"], 20);

    server.stop().unwrap();
}

#[test]
fn appendix_list_instance_and_method() {
    let port = 28113;
    let (mut server, mut pump) = start_server(test_config(port));
    let store = sample_store();

    let (list, instance, invoked) = with_client(&mut pump, &store, move || {
        let client = common::http_client();
        let invoked = client
            .post(format!(
                "http://127.0.0.1:{port}/unity/build-report/R1/appendices/Foo/2/get"
            ))
            .body("/Bar/X")
            .send()
            .unwrap()
            .text()
            .unwrap();
        (
            get(port, "/unity/build-report/R1/appendices/Foo"),
            get(port, "/unity/build-report/R1/appendices/Foo/2"),
            invoked,
        )
    });

    assert_eq!(parse(&list).as_array().unwrap().len(), 3);
    assert_eq!(parse(&instance)["name"], "third");
    assert_eq!(parse(&invoked), json!("bar-of-x"));

    server.stop().unwrap();
}

#[test]
fn misses_return_empty_object() {
    let port = 28114;
    let (mut server, mut pump) = start_server(test_config(port));
    let store = sample_store();

    let bodies = with_client(&mut pump, &store, move || {
        [
            "/",
            "/unity/build-report/R1",
            "/unity/build-report/R1/logs",
            "/unity/build-report/R1/appendices",
            "/unity/build-report/R1/appendices/Foo/x",
            "/unity/build-report/R1/appendices/Foo/9",
            "/unity/build-report/R1/appendices/Foo/0/unknownMethod",
            "/unity/build-report/NOPE/summary",
            "/unity/build-report/R1/files/missing",
        ]
        .into_iter()
        .map(|path| (path, get(port, path)))
        .collect::<Vec<_>>()
    });

    for (path, body) in bodies {
        assert_eq!(body, "{}", "{path}");
    }

    server.stop().unwrap();
}

#[test]
fn disallowed_host_gets_no_response_and_store_is_untouched() {
    let port = 28115;
    let (mut server, mut pump) = start_server(test_config(port));
    let store = CountingStore::new(sample_store());

    let summary = "/unity/build-report/latest/summary";
    let responses = with_client(&mut pump, &store, move || {
        vec![
            raw_request(port, &get_with_host(summary, &format!("evil.example:{port}"))),
            raw_request(port, &get_with_host(summary, "localhost")),
            raw_request(port, &get_with_host(summary, "localhost:1")),
            raw_request(port, &format!("GET {summary} HTTP/1.1\r\nConnection: close\r\n\r\n")),
            raw_request(port, &get_with_host("/nonsense", "attacker.test")),
        ]
    });

    for response in responses {
        assert_eq!(response, None);
    }
    assert_eq!(store.resolves.get(), 0);

    // Both allowed names still work on the same server.
    let allowed = with_client(&mut pump, &store, move || {
        [format!("localhost:{port}"), format!("127.0.0.1:{port}")]
            .iter()
            .map(|host| raw_request(port, &get_with_host(summary, host)))
            .collect::<Vec<_>>()
    });
    for response in allowed {
        let response = response.expect("allowed host gets a response");
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert_eq!(parse(body_of(&response))["result"], "Succeeded");
    }
    assert_eq!(store.resolves.get(), 2);

    server.stop().unwrap();
}

#[test]
fn start_twice_is_rejected() {
    let port = 28116;
    let (mut server, _pump) = start_server(test_config(port));
    assert!(matches!(server.start(), Err(ServiceError::AlreadyRunning)));
    server.stop().unwrap();
    assert!(!server.is_running());
    // Stopping again is a no-op.
    server.stop().unwrap();
}

#[test]
fn restart_rebinds_the_same_port() {
    let port = 28117;
    let store = sample_store();
    let mut server = ReportServer::new(test_config(port));

    for round in 0..3 {
        let mut pump = server.start().unwrap();
        let state = server.wait_until_settled(Duration::from_secs(10));
        assert!(state.is_running(), "round {round}: {state:?}");

        let body = with_client(&mut pump, &store, move || {
            get(port, "/unity/build-report/latest/steps")
        });
        assert_eq!(parse(&body).as_array().unwrap().len(), 2);

        server.stop().unwrap();
        pump.drain(&store);
        assert!(pump.is_disconnected());
    }
}

#[test]
fn stop_abandons_a_request_waiting_on_the_owner() {
    let port = 28118;
    let (mut server, _pump) = start_server(test_config(port));

    let client = thread::spawn(move || {
        raw_request(
            port,
            &get_with_host("/unity/build-report/latest/summary", &format!("127.0.0.1:{port}")),
        )
    });
    // Never drain: the request stays parked on the owner queue.
    thread::sleep(Duration::from_millis(200));
    server.stop().unwrap();

    assert_eq!(client.join().unwrap(), None);
    assert!(std::net::TcpStream::connect(("127.0.0.1", port)).is_err());
}

/// Panics when asked for report `boom`.
struct FragileStore(build_report_server::report::MemoryReportStore);

impl ReportStore for FragileStore {
    fn resolve(&self, handle: &ReportHandle) -> Option<&dyn BuildReport> {
        if *handle == ReportHandle::Id("boom".into()) {
            panic!("corrupt report");
        }
        self.0.resolve(handle)
    }
}

#[test]
fn a_panicking_handler_faults_only_its_request() {
    let port = 28119;
    let (mut server, mut pump) = start_server(test_config(port));
    let store = FragileStore(sample_store());

    let (faulted, next) = with_client(&mut pump, &store, move || {
        (
            get(port, "/unity/build-report/boom/summary"),
            get(port, "/unity/build-report/R1/summary"),
        )
    });
    assert_eq!(faulted, "{}");
    assert_eq!(parse(&next)["platform"], "Android");

    server.stop().unwrap();
}

#[test]
fn a_second_client_waits_until_the_first_is_answered() {
    let port = 28120;
    let (mut server, mut pump) = start_server(test_config(port));
    let store = sample_store();

    let first = thread::spawn(move || get(port, "/unity/build-report/R0/summary"));
    thread::sleep(Duration::from_millis(200));
    let second = thread::spawn(move || get(port, "/unity/build-report/R1/summary"));
    thread::sleep(Duration::from_millis(200));

    // The second connection is not read while the first is still open.
    assert_eq!(pump.drain(&store), 1);

    let first = pump_until(&mut pump, &store, first);
    let second = pump_until(&mut pump, &store, second);
    assert_eq!(parse(&first)["platform"], "iOS");
    assert_eq!(parse(&second)["platform"], "Android");

    server.stop().unwrap();
}

#[test]
fn a_slow_owner_still_answers_after_the_read_timeout() {
    let port = 28121;
    let mut config = test_config(port);
    config.limits.read_timeout_secs = 1;
    let (mut server, mut pump) = start_server(config);
    let store = sample_store();

    let client = thread::spawn(move || get(port, "/unity/build-report/latest/summary"));
    // The owner skips its ticks for longer than the read timeout.
    thread::sleep(Duration::from_millis(1500));

    let body = pump_until(&mut pump, &store, client);
    assert_eq!(parse(&body)["platform"], "Android");

    server.stop().unwrap();
}

#[test]
fn stalled_headers_are_dropped_and_the_next_client_is_served() {
    let port = 28122;
    let mut config = test_config(port);
    config.limits.read_timeout_secs = 1;
    let (mut server, mut pump) = start_server(config);
    let store = sample_store();

    let started = Instant::now();
    let mut stalled = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stalled
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    stalled
        .write_all(b"GET /unity/build-report/latest/summary HTTP/1.1\r\n")
        .unwrap();
    let mut response = Vec::new();
    let _ = stalled.read_to_end(&mut response);
    let elapsed = started.elapsed();

    assert!(!response.starts_with(b"HTTP/1.1 200"), "{response:?}");
    assert!(elapsed >= Duration::from_millis(900), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "{elapsed:?}");

    let body = with_client(&mut pump, &store, move || {
        get(port, "/unity/build-report/R0/summary")
    });
    assert_eq!(parse(&body)["result"], "Failed");

    server.stop().unwrap();
}
