use assert_fs::TempDir;
use assert_fs::prelude::*;
use ffdl_e2e_tests::{TestServer, download_params, init_tracing, read_cache, write_channel_config};
use ffdl_lib::cli::run_download;
use ffdl_lib::error::FfdlError;
use predicates::prelude::*;

#[tokio::test]
async fn test_first_run_downloads_and_records_fingerprints() {
    init_tracing();

    let server = TestServer::start();
    server.serve("nightly", Some("\"n-1\""), b"nightly build 1");
    server.serve("beta", Some("W/\"b-1\""), b"beta build 1");

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");
    let config_path = write_channel_config(
        temp.path(),
        &[
            ("nightly", server.url("nightly").as_str(), "ff-nightly.bin"),
            ("beta", server.url("beta").as_str(), "ff-beta.bin"),
        ],
    )
    .unwrap();

    let results = run_download(download_params(&config_path, out.path(), false))
        .await
        .expect("First run should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].channel, "nightly");
    assert_eq!(results[1].channel, "beta");
    assert!(results.iter().all(|r| !r.skipped));
    assert_eq!(results[0].bytes_written, Some(15));

    out.child("ff-nightly.bin").assert("nightly build 1");
    out.child("ff-beta.bin").assert("beta build 1");

    let cache = read_cache(out.path()).unwrap();
    assert_eq!(cache.etags["nightly"], "\"n-1\"");
    assert_eq!(cache.etags["beta"], "W/\"b-1\"");
    assert_eq!(cache.cached["nightly"], false);
    assert_eq!(cache.cached["beta"], false);
}

#[tokio::test]
async fn test_unchanged_etag_skips_download_and_leaves_empty_file() {
    init_tracing();

    let server = TestServer::start();
    server.serve("nightly", Some("\"etag1\""), b"nightly body");

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");
    let config_path = write_channel_config(
        temp.path(),
        &[("nightly", server.url("nightly").as_str(), "ff-nightly.bin")],
    )
    .unwrap();

    run_download(download_params(&config_path, out.path(), false))
        .await
        .expect("First run should succeed");
    out.child("ff-nightly.bin").assert("nightly body");
    let first = read_cache(out.path()).unwrap();
    assert_eq!(first.etags["nightly"], "\"etag1\"");
    assert_eq!(first.cached["nightly"], false);

    let results = run_download(download_params(&config_path, out.path(), false))
        .await
        .expect("Second run should succeed");

    assert!(results[0].skipped);
    assert_eq!(results[0].bytes_written, None);
    // The destination is truncated before the request, even on a cache hit.
    out.child("ff-nightly.bin").assert("");

    let second = read_cache(out.path()).unwrap();
    assert_eq!(second.etags, first.etags);
    assert_eq!(second.cached["nightly"], true);
    assert_eq!(server.hits("nightly"), 2);
}

#[tokio::test]
async fn test_changed_etag_triggers_redownload() {
    init_tracing();

    let server = TestServer::start();
    server.serve("beta", Some("\"v1\""), b"beta v1");

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");
    let config_path =
        write_channel_config(temp.path(), &[("beta", server.url("beta").as_str(), "ff-beta.bin")])
            .unwrap();

    run_download(download_params(&config_path, out.path(), false))
        .await
        .unwrap();

    server.serve("beta", Some("\"v2\""), b"beta v2, a bit larger");
    let results = run_download(download_params(&config_path, out.path(), false))
        .await
        .unwrap();

    assert!(!results[0].skipped);
    assert_eq!(results[0].bytes_written, Some(21));
    out.child("ff-beta.bin").assert("beta v2, a bit larger");

    let cache = read_cache(out.path()).unwrap();
    assert_eq!(cache.etags["beta"], "\"v2\"");
    assert_eq!(cache.cached["beta"], false);
}

#[tokio::test]
async fn test_cache_holds_exactly_one_record_per_channel() {
    init_tracing();

    let server = TestServer::start();
    let channels = ["nightly", "aurora", "beta"];
    for channel in channels {
        server.serve(channel, Some(format!("\"{channel}\"").as_str()), channel.as_bytes());
    }

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");
    let urls: Vec<String> = channels.iter().map(|c| server.url(c)).collect();
    let filenames: Vec<String> = channels.iter().map(|c| format!("{c}.bin")).collect();
    let specs: Vec<(&str, &str, &str)> = channels
        .iter()
        .zip(&urls)
        .zip(&filenames)
        .map(|((c, u), f)| (*c, u.as_str(), f.as_str()))
        .collect();
    let config_path = write_channel_config(temp.path(), &specs).unwrap();

    for _ in 0..2 {
        run_download(download_params(&config_path, out.path(), false))
            .await
            .unwrap();
    }

    let cache = read_cache(out.path()).unwrap();
    let mut expected: Vec<&str> = channels.to_vec();
    expected.sort();
    assert_eq!(cache.etags.keys().map(String::as_str).collect::<Vec<_>>(), expected);
    assert_eq!(cache.cached.keys().map(String::as_str).collect::<Vec<_>>(), expected);
    assert!(cache.cached.values().all(|cached| *cached));
}

#[tokio::test]
async fn test_clean_run_discards_cache_and_outputs() {
    init_tracing();

    let server = TestServer::start();
    server.serve("nightly", Some("\"same\""), b"nightly body");

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");
    let config_path = write_channel_config(
        temp.path(),
        &[("nightly", server.url("nightly").as_str(), "ff-nightly.bin")],
    )
    .unwrap();

    run_download(download_params(&config_path, out.path(), false))
        .await
        .unwrap();
    out.child("stale-build.bin").write_str("left over").unwrap();

    let results = run_download(download_params(&config_path, out.path(), true))
        .await
        .unwrap();

    assert!(!results[0].skipped, "A clean run must download again");
    out.child("ff-nightly.bin").assert("nightly body");
    out.child("stale-build.bin").assert(predicate::path::missing());

    let cache = read_cache(out.path()).unwrap();
    assert_eq!(cache.etags.len(), 1);
    assert_eq!(cache.cached["nightly"], false);
}

#[tokio::test]
async fn test_fatal_error_keeps_earlier_channels_and_stops() {
    init_tracing();

    let server = TestServer::start();
    server.serve("a", Some("\"a-1\""), b"channel a");
    server.fail("b", 500);
    server.serve("c", Some("\"c-1\""), b"channel c");

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");
    let config_path = write_channel_config(
        temp.path(),
        &[
            ("a", server.url("a").as_str(), "a.bin"),
            ("b", server.url("b").as_str(), "b.bin"),
            ("c", server.url("c").as_str(), "c.bin"),
        ],
    )
    .unwrap();

    let err = run_download(download_params(&config_path, out.path(), false))
        .await
        .expect_err("Channel b should abort the run");

    match &err {
        FfdlError::Network { channel, url, .. } => {
            assert_eq!(channel, "b");
            assert_eq!(url, &server.url("b"));
        }
        other => panic!("Expected a network error, got {other:?}"),
    }
    assert!(err.to_string().contains("[b]"));

    let cache = read_cache(out.path()).unwrap();
    assert_eq!(cache.etags.len(), 1);
    assert_eq!(cache.etags["a"], "\"a-1\"");
    assert_eq!(cache.cached["a"], false);

    out.child("a.bin").assert("channel a");
    out.child("b.bin").assert("");
    out.child("c.bin").assert(predicate::path::missing());
    assert_eq!(server.hits("c"), 0);
}

#[tokio::test]
async fn test_missing_etag_is_recorded_as_empty_fingerprint() {
    init_tracing();

    let server = TestServer::start();
    server.serve("release", None, b"release body");

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");
    let config_path = write_channel_config(
        temp.path(),
        &[("release", server.url("release").as_str(), "ff-release.bin")],
    )
    .unwrap();

    let first = run_download(download_params(&config_path, out.path(), false))
        .await
        .unwrap();
    assert!(!first[0].skipped);
    out.child("ff-release.bin").assert("release body");
    assert_eq!(read_cache(out.path()).unwrap().etags["release"], "");

    let second = run_download(download_params(&config_path, out.path(), false))
        .await
        .unwrap();
    assert!(second[0].skipped);
}

#[tokio::test]
async fn test_unknown_resource_is_a_network_error() {
    init_tracing();

    let server = TestServer::start();

    let temp = TempDir::new().unwrap();
    let out = temp.child("out");
    let config_path = write_channel_config(
        temp.path(),
        &[("nightly", server.url("does-not-exist").as_str(), "ff-nightly.bin")],
    )
    .unwrap();

    let err = run_download(download_params(&config_path, out.path(), false))
        .await
        .unwrap_err();

    assert!(matches!(err, FfdlError::Network { ref channel, .. } if channel == "nightly"));
    out.child("cache.json").assert(predicate::str::contains("\"etags\": {}"));
}
