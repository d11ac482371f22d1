// ABOUTME: Integration tests for the asset fetcher and document rewriter.
// ABOUTME: Uses httpmock to verify caching, dedup, failure cleanup and relative path rewriting.

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use sitescrub_localize::{localize_document, AssetFetcher, FetchOutcome, Rewriter};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fetcher_for(images_dir: &Path) -> AssetFetcher {
    AssetFetcher::builder()
        .images_dir(images_dir)
        .user_agent("sitescrub-test")
        .build()
        .unwrap()
}

#[test]
fn fetch_saves_body_and_reuses_it() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/content/v1/studio.jpg")
            .header("user-agent", "sitescrub-test");
        then.status(200)
            .header("content-type", "image/jpeg")
            .body("jpeg-bytes");
    });

    let temp_dir = TempDir::new().unwrap();
    let images_dir = temp_dir.path().join("images");
    let mut fetcher = fetcher_for(&images_dir);
    let url = server.url("/content/v1/studio.jpg?format=1500w");

    let first = fetcher.fetch(&url);
    let expected_path = images_dir.join("studio.jpg");
    match &first {
        FetchOutcome::Fetched { path, record } => {
            assert_eq!(path, &expected_path);
            assert_eq!(record.status, 200);
            assert_eq!(record.bytes, 10);
        }
        other => panic!("expected a fresh download, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&expected_path).unwrap(), "jpeg-bytes");

    let second = fetcher.fetch(&url);
    assert_eq!(second, FetchOutcome::Cached(expected_path));
    mock.assert_calls(1);
    assert_eq!(fetcher.fetch_count(), 1);
}

#[test]
fn existing_file_skips_network() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/pic.jpg");
        then.status(200).body("fresh");
    });

    let temp_dir = TempDir::new().unwrap();
    let images_dir = temp_dir.path().join("images");
    fs::create_dir_all(&images_dir).unwrap();
    fs::write(images_dir.join("pic.jpg"), "from an earlier run").unwrap();

    let mut fetcher = fetcher_for(&images_dir);
    let outcome = fetcher.fetch(&server.url("/pic.jpg"));

    assert_eq!(outcome, FetchOutcome::Cached(images_dir.join("pic.jpg")));
    assert_eq!(
        fs::read_to_string(images_dir.join("pic.jpg")).unwrap(),
        "from an earlier run"
    );
    mock.assert_calls(0);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[test]
fn not_found_is_reported_once_and_leaves_no_file() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/missing.jpg");
        then.status(404).body("not found");
    });

    let temp_dir = TempDir::new().unwrap();
    let images_dir = temp_dir.path().join("images");
    let mut fetcher = fetcher_for(&images_dir);
    let url = server.url("/missing.jpg");

    let outcome = fetcher.fetch(&url);
    assert!(outcome.is_failed());
    assert!(!images_dir.join("missing.jpg").exists());

    // No retry within the same run
    assert!(fetcher.fetch(&url).is_failed());
    mock.assert_calls(1);
}

#[test]
fn empty_body_is_a_failure_and_is_cleaned_up() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/empty.png");
        then.status(200).body("");
    });

    let temp_dir = TempDir::new().unwrap();
    let images_dir = temp_dir.path().join("images");
    let mut fetcher = fetcher_for(&images_dir);

    let outcome = fetcher.fetch(&server.url("/empty.png"));
    mock.assert();

    match outcome {
        FetchOutcome::Failed { reason, .. } => assert!(reason.contains("empty response")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!images_dir.join("empty.png").exists());
}

#[test]
fn download_to_creates_parent_dir() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/static.css");
        then.status(200).body("body { margin: 0 }");
    });

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("css").join("site.css");
    let mut fetcher = fetcher_for(&temp_dir.path().join("images"));

    let record = fetcher.download_to(&server.url("/static.css"), &dest).unwrap();
    mock.assert();
    assert_eq!(record.bytes, 18);
    assert_eq!(fs::read_to_string(&dest).unwrap(), "body { margin: 0 }");
}

#[test]
fn failed_download_keeps_existing_destination() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/static.css");
        then.status(503);
    });

    let temp_dir = TempDir::new().unwrap();
    let css_dir = temp_dir.path().join("css");
    fs::create_dir_all(&css_dir).unwrap();
    let dest = css_dir.join("site.css");
    fs::write(&dest, "from the last run").unwrap();
    let mut fetcher = fetcher_for(&temp_dir.path().join("images"));

    let err = fetcher
        .download_to(&server.url("/static.css"), &dest)
        .expect_err("503 should fail");
    mock.assert();
    assert!(err.is_status());
    assert_eq!(fs::read_to_string(&dest).unwrap(), "from the last run");
    assert_eq!(fs::read_dir(&css_dir).unwrap().count(), 1);
}

#[test]
fn empty_download_keeps_existing_destination() {
    let server = MockServer::start();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/static.css");
        then.status(200).body("");
    });

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("site.css");
    fs::write(&dest, "from the last run").unwrap();
    let mut fetcher = fetcher_for(&temp_dir.path().join("images"));

    let err = fetcher
        .download_to(&server.url("/static.css"), &dest)
        .expect_err("empty body should fail");
    assert!(err.is_empty());
    assert_eq!(fs::read_to_string(&dest).unwrap(), "from the last run");
    // Only the destination remains; the staged body is gone
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[test]
fn successful_download_replaces_existing_destination() {
    let server = MockServer::start();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/static.css");
        then.status(200).body("p { margin: 1em }");
    });

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("site.css");
    fs::write(&dest, "stale").unwrap();
    let mut fetcher = fetcher_for(&temp_dir.path().join("images"));

    fetcher.download_to(&server.url("/static.css"), &dest).unwrap();
    assert_eq!(fs::read_to_string(&dest).unwrap(), "p { margin: 1em }");
}

#[test]
fn percent_encoded_filename_is_decoded() {
    let server = MockServer::start();
    let _mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("photo");
    });

    let temp_dir = TempDir::new().unwrap();
    let images_dir = temp_dir.path().join("images");
    let mut fetcher = fetcher_for(&images_dir);

    let outcome = fetcher.fetch(&server.url("/content/v1/My%20Photo.jpg?format=750w"));
    assert_eq!(outcome.local_path(), Some(images_dir.join("My Photo.jpg").as_path()));
    assert_eq!(fs::read_to_string(images_dir.join("My Photo.jpg")).unwrap(), "photo");
}

#[test]
fn download_to_rejects_non_http_schemes() {
    let temp_dir = TempDir::new().unwrap();
    let mut fetcher = fetcher_for(&temp_dir.path().join("images"));

    let err = fetcher
        .download_to("ftp://example.com/site.css", &temp_dir.path().join("site.css"))
        .expect_err("ftp should be rejected");
    assert!(err.is_invalid_url());
    assert_eq!(fetcher.fetch_count(), 0);
}

#[test]
fn shared_image_is_fetched_once_for_two_documents() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/content/v1/5c5a/hero.jpg");
        then.status(200).body("hero");
    });

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let url = server.url("/content/v1/5c5a/hero.jpg?format=2500w");

    let index = root.join("index.html");
    let nested = root.join("a").join("b").join("page.html");
    fs::create_dir_all(nested.parent().unwrap()).unwrap();
    fs::write(&index, format!("<img src=\"{}\" alt=\"hero\">\n", url)).unwrap();
    fs::write(
        &nested,
        format!("<img src=\"{url}\">\n<img class=\"thumb\" src=\"{url}\">\n", url = url),
    )
    .unwrap();

    let mut fetcher = fetcher_for(&root.join("images"));
    let rewriter = Rewriter::with_host_prefix(&server.base_url()).unwrap();

    let first = localize_document(&mut fetcher, &rewriter, &index, true).unwrap();
    let second = localize_document(&mut fetcher, &rewriter, &nested, true).unwrap();

    mock.assert_calls(1);
    assert!(first.modified);
    assert_eq!(first.stats.fetched, 1);
    assert!(second.modified);
    assert_eq!(second.stats.cached, 1);
    assert_eq!(second.stats.replacements, 2);

    assert_eq!(
        fs::read_to_string(&index).unwrap(),
        "<img src=\"images/hero.jpg\" alt=\"hero\">\n"
    );
    assert_eq!(
        fs::read_to_string(&nested).unwrap(),
        "<img src=\"../../images/hero.jpg\">\n<img class=\"thumb\" src=\"../../images/hero.jpg\">\n"
    );

    // Rewritten documents no longer reference the remote host
    let again = localize_document(&mut fetcher, &rewriter, &nested, true).unwrap();
    assert!(!again.modified);
    assert_eq!(again.stats.found, 0);
}

#[test]
fn failed_image_leaves_document_untouched() {
    let server = MockServer::start();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/broken.jpg");
        then.status(500);
    });

    let temp_dir = TempDir::new().unwrap();
    let doc = temp_dir.path().join("index.html");
    let original = format!("<img src=\"{}\">\n", server.url("/broken.jpg"));
    fs::write(&doc, &original).unwrap();

    let mut fetcher = fetcher_for(&temp_dir.path().join("images"));
    let rewriter = Rewriter::with_host_prefix(&server.base_url()).unwrap();
    let outcome = localize_document(&mut fetcher, &rewriter, &doc, true).unwrap();

    assert!(!outcome.modified);
    assert_eq!(outcome.stats.found, 1);
    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(fs::read_to_string(&doc).unwrap(), original);
}

#[test]
fn undecodable_document_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let doc = temp_dir.path().join("latin1.html");
    fs::write(&doc, [0x63, 0x61, 0x66, 0xe9]).unwrap();

    let mut fetcher = fetcher_for(&temp_dir.path().join("images"));
    let err = localize_document(&mut fetcher, &Rewriter::default(), &doc, true)
        .expect_err("invalid UTF-8 should fail");
    assert!(err.is_decode());
}
