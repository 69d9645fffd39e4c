//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for a listing site and a geocoding
//! endpoint, and exercise the full crawl cycle end-to-end: pagination,
//! extraction, normalization, geocoding and CSV export.

use immoharvest::config::{
    Config, CrawlConfig, EngineConfig, GeocodingConfig, OutputConfig, SourceConfig,
};
use immoharvest::crawl::{Orchestrator, PaginationError};
use immoharvest::engine::{EngineError, HttpEngine};
use immoharvest::extract::ProfileKind;
use immoharvest::geocode::NominatimGeocoder;
use immoharvest::normalize::TransactionType;
use immoharvest::HarvestError;
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches requests whose URL carries no `page` query parameter
///
/// The first navigation of a run goes to the bare query URL; every walked
/// listing page carries `page=<n>`. Separate matchers keep the two mock
/// responses from shadowing each other.
struct WithoutPageParam;

impl Match for WithoutPageParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "page")
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_dir: &Path, profile: ProfileKind) -> Config {
    Config {
        crawl: CrawlConfig {
            max_attempts: 3,
            request_delay_ms: 10, // Very short for testing
            max_workers: 2,
        },
        engine: EngineConfig {
            user_agent: "immoharvest-test/1.0".to_string(),
            navigation_timeout_secs: 5,
            wait_timeout_secs: 1,
        },
        geocoding: GeocodingConfig {
            endpoint: format!("{}/geocode", base_url),
            timeout_secs: 5,
            user_agent: "immoharvest-test/1.0".to_string(),
        },
        output: OutputConfig {
            directory: output_dir.to_string_lossy().into_owned(),
        },
        sources: vec![SourceConfig {
            name: "mock-site".to_string(),
            url: format!("{}/search?tr=buy", base_url),
            profile,
            page_size: 2,
            first_page: 1,
        }],
    }
}

fn build_orchestrator(config: &Config) -> Orchestrator {
    let engine = Arc::new(HttpEngine::new(&config.engine).expect("Failed to build engine"));
    let geocoder =
        Arc::new(NominatimGeocoder::new(&config.geocoding).expect("Failed to build geocoder"));
    Orchestrator::new(engine, geocoder, config)
}

/// Catalog-card listing page with the given count text and property links
fn catalog_listing(count_text: &str, ids: &[usize]) -> String {
    let mut body = String::from("<html><body>");
    body.push_str(&format!(
        "<header class=\"block-alert\"><h2>{}</h2></header>",
        count_text
    ));
    body.push_str("<a class=\"handle\">Buy</a>");
    for id in ids {
        body.push_str(&format!(
            "<a class=\"property-card-link property-price\" href=\"/p/{}.html\">850 000 €</a>",
            id
        ));
    }
    body.push_str("</body></html>");
    body
}

/// Catalog-card property page
fn catalog_property(id: usize, price: &str) -> String {
    format!(
        concat!(
            "<html><head>",
            "<meta name=\"og:title\" content=\"Maison {id} à vendre à Mamer\">",
            "</head><body><div class=\"property-card\">",
            "<span class=\"property-card-price\">{price}</span>",
            "<div class=\"block-localisation-address\">{id} Rue de la Gare, Mamer</div>",
            "<div class=\"collapsed\"><p>Belle maison familiale.</p></div>",
            "<ul class=\"property-card-info-icons\">",
            "<li><i class=\"icon icon-agency_area02\"></i><span>180 m²</span></li>",
            "<li><i class=\"icon icon-agency_bed02\"></i><span>4</span></li>",
            "</ul></div></body></html>",
        ),
        id = id,
        price = price
    )
}

async fn mount_listing_page(server: &MockServer, page: Option<u32>, body: String) {
    let builder = Mock::given(method("GET")).and(path("/search"));
    let builder = match page {
        Some(n) => builder.and(query_param("page", n.to_string())),
        None => builder.and(WithoutPageParam),
    };
    builder
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

async fn mount_property(server: &MockServer, id: usize, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/p/{}.html", id)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

async fn mount_geocoder(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"[{"lat": "49.6116", "lon": "6.1319"}]"#, "application/json"),
        )
        .mount(server)
        .await;
}

/// Mounts five catalog-card properties behind three listing pages
async fn mount_catalog_site(server: &MockServer) {
    mount_listing_page(server, None, catalog_listing("5 annonces", &[1, 2])).await;
    mount_listing_page(server, Some(1), catalog_listing("5 annonces", &[1, 2])).await;
    mount_listing_page(server, Some(2), catalog_listing("5 annonces", &[3, 4])).await;
    mount_listing_page(server, Some(3), catalog_listing("5 annonces", &[5])).await;
    for id in 1..=5 {
        mount_property(server, id, catalog_property(id, "850 000 €")).await;
    }
    mount_geocoder(server).await;
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open artifact");
    let headers = reader
        .headers()
        .expect("Failed to read headers")
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = reader
        .records()
        .map(|r| {
            r.expect("Failed to read row")
                .iter()
                .map(|c| c.to_string())
                .collect()
        })
        .collect();
    (headers, rows)
}

#[tokio::test]
async fn test_full_harvest_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_catalog_site(&mock_server).await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), output_dir.path(), ProfileKind::CatalogCard);
    let orchestrator = build_orchestrator(&config);

    let run = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect("Harvest failed");

    // Five properties discovered across three listing pages, in page order
    assert!(run.is_complete());
    assert_eq!(run.refs.len(), 5);
    assert_eq!(run.records.len(), 5);
    assert!(run.failures.is_empty());
    for (i, record) in run.records.iter().enumerate() {
        assert!(record.url.path().ends_with(&format!("/p/{}.html", i + 1)));
    }

    // Records are normalized and geocoded
    let record = &run.records[0];
    assert_eq!(record.name.as_deref(), Some("Maison 1 à vendre à Mamer"));
    assert_eq!(record.price.as_deref(), Some("850000"));
    assert_eq!(record.area.as_deref(), Some("180"));
    assert_eq!(record.transaction_type, Some(TransactionType::Sale));
    assert_eq!(record.latitude, Some(49.6116));
    assert_eq!(record.longitude, Some(6.1319));

    // The artifact holds a header and one row per record
    let artifact = run.artifact.expect("No artifact path");
    let (headers, rows) = read_csv(&artifact);
    assert_eq!(headers[0], "URL");
    assert_eq!(headers.len(), 11);
    assert_eq!(rows.len(), 5);
    assert!(rows[0][0].ends_with("/p/1.html"));
}

#[tokio::test]
async fn test_first_page_is_walked_again_with_page_parameter() {
    let mock_server = MockServer::start().await;

    // One listing page worth of data: the bare query URL is fetched once
    // for the count, then the walk fetches page=1 exactly once
    mount_listing_page(&mock_server, None, catalog_listing("2 annonces", &[1, 2])).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(catalog_listing("2 annonces", &[1, 2]), "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    for id in 1..=2 {
        mount_property(&mock_server, id, catalog_property(id, "850 000 €")).await;
    }
    mount_geocoder(&mock_server).await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), output_dir.path(), ProfileKind::CatalogCard);
    let orchestrator = build_orchestrator(&config);

    let run = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect("Harvest failed");

    assert_eq!(run.records.len(), 2);
    // Wiremock verifies the expect(1) when the mock server drops
}

#[tokio::test]
async fn test_failed_property_does_not_abort_run() {
    let mock_server = MockServer::start().await;

    mount_listing_page(&mock_server, None, catalog_listing("3 annonces", &[1, 2])).await;
    mount_listing_page(&mock_server, Some(1), catalog_listing("3 annonces", &[1, 2])).await;
    mount_listing_page(&mock_server, Some(2), catalog_listing("3 annonces", &[3])).await;
    mount_property(&mock_server, 1, catalog_property(1, "850 000 €")).await;
    mount_property(&mock_server, 3, catalog_property(3, "650 000 €")).await;
    mount_geocoder(&mock_server).await;

    // Property 2 always answers 500; the attempt budget is 3
    Mock::given(method("GET"))
        .and(path("/p/2.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), output_dir.path(), ProfileKind::CatalogCard);
    let orchestrator = build_orchestrator(&config);

    let run = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect("Harvest failed");

    assert!(run.is_complete());
    assert_eq!(run.records.len(), 2);
    assert_eq!(run.failures.len(), 1);
    assert!(run.failures[0].url.path().ends_with("/p/2.html"));
    assert_eq!(run.failures[0].attempts, 3);

    // The failed property is absent from the artifact
    let artifact = run.artifact.expect("No artifact path");
    let (_, rows) = read_csv(&artifact);
    assert_eq!(rows.len(), 2);
    assert!(rows[0][0].ends_with("/p/1.html"));
    assert!(rows[1][0].ends_with("/p/3.html"));
}

#[tokio::test]
async fn test_empty_count_indicator_aborts_run() {
    let mock_server = MockServer::start().await;

    // The indicator element exists but holds no text
    mount_listing_page(
        &mock_server,
        None,
        "<html><body><header class=\"block-alert\"><h2></h2></header></body></html>".to_string(),
    )
    .await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), output_dir.path(), ProfileKind::CatalogCard);
    let orchestrator = build_orchestrator(&config);

    let err = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect_err("Run should abort");

    match err {
        HarvestError::Aborted { source, cause } => {
            assert_eq!(source, "mock-site");
            assert!(matches!(
                *cause,
                HarvestError::Pagination(PaginationError::IndicatorMissing)
            ));
        }
        other => panic!("Expected abort, got: {}", other),
    }
}

#[tokio::test]
async fn test_missing_wait_target_aborts_without_retry() {
    let mock_server = MockServer::start().await;

    // A maintenance page: valid HTML, but no count indicator to wait for.
    // Listing-page navigation is fatal on first failure, so exactly one
    // request reaches the server
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><p>Back soon</p></body></html>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), output_dir.path(), ProfileKind::CatalogCard);
    let orchestrator = build_orchestrator(&config);

    let err = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect_err("Run should abort");

    match err {
        HarvestError::Aborted { cause, .. } => {
            assert!(matches!(
                *cause,
                HarvestError::Engine(EngineError::WaitTarget { .. })
            ));
        }
        other => panic!("Expected abort, got: {}", other),
    }
}

#[tokio::test]
async fn test_non_html_listing_page_aborts() {
    let mock_server = MockServer::start().await;

    // An API gateway answering where the site should be
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"error": "moved"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), output_dir.path(), ProfileKind::CatalogCard);
    let orchestrator = build_orchestrator(&config);

    let err = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect_err("Run should abort");

    match err {
        HarvestError::Aborted { cause, .. } => {
            assert!(matches!(
                *cause,
                HarvestError::Engine(EngineError::NotHtml { .. })
            ));
        }
        other => panic!("Expected abort, got: {}", other),
    }
}

#[tokio::test]
async fn test_export_is_idempotent_per_query_url() {
    let mock_server = MockServer::start().await;
    mount_catalog_site(&mock_server).await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), output_dir.path(), ProfileKind::CatalogCard);
    let orchestrator = build_orchestrator(&config);

    let first_run = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect("First harvest failed");
    let first_path = first_run.artifact.expect("No artifact path");
    let first_content = std::fs::read_to_string(&first_path).expect("Failed to read artifact");

    let second_run = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect("Second harvest failed");
    let second_path = second_run.artifact.expect("No artifact path");
    let second_content = std::fs::read_to_string(&second_path).expect("Failed to read artifact");

    // Same query URL, same artifact, same content, exactly one header
    assert_eq!(first_path, second_path);
    assert_eq!(first_content, second_content);
    assert_eq!(first_content.matches("URL,Name").count(), 1);
}

#[tokio::test]
async fn test_geocoding_failure_degrades_to_unknown_coordinates() {
    let mock_server = MockServer::start().await;

    mount_listing_page(&mock_server, None, catalog_listing("1 annonce", &[1])).await;
    mount_listing_page(&mock_server, Some(1), catalog_listing("1 annonce", &[1])).await;
    mount_property(&mock_server, 1, catalog_property(1, "850 000 €")).await;

    // Geocoding endpoint is down for the day
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), output_dir.path(), ProfileKind::CatalogCard);
    let orchestrator = build_orchestrator(&config);

    let run = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect("Harvest failed");

    // The property survives with empty coordinates
    assert_eq!(run.records.len(), 1);
    assert!(run.records[0].latitude.is_none());
    assert!(run.records[0].longitude.is_none());
    assert_eq!(run.records[0].name.as_deref(), Some("Maison 1 à vendre à Mamer"));
}

#[tokio::test]
async fn test_attribute_table_profile_end_to_end() {
    let mock_server = MockServer::start().await;

    let listing = concat!(
        "<html><body>",
        "<span class=\"results-count\">2 résultats</span>",
        "<a class=\"listing-item-link\" href=\"/p/1.html\">Appartement 1</a>",
        "<a class=\"listing-item-link\" href=\"/p/2.html\">Appartement 2</a>",
        "</body></html>",
    );
    mount_listing_page(&mock_server, None, listing.to_string()).await;
    mount_listing_page(&mock_server, Some(1), listing.to_string()).await;

    for id in 1..=2 {
        let body = format!(
            concat!(
                "<html><body><div class=\"listing-detail\">",
                "<h1 class=\"listing-title\">Appartement lumineux {id}</h1>",
                "<div class=\"listing-price\">1 250 €</div>",
                "<span class=\"listing-address\">{id} Avenue de la Liberté, Luxembourg</span>",
                "<div class=\"listing-description\">Proche de la gare.</div>",
                "<table class=\"listing-features\">",
                "<tr><th>Superficie totale</th><td>85 m²</td></tr>",
                "<tr><th>Chambres</th><td>2</td></tr>",
                "<tr><th>Pièces</th><td>4</td></tr>",
                "</table></div></body></html>",
            ),
            id = id
        );
        mount_property(&mock_server, id, body).await;
    }
    mount_geocoder(&mock_server).await;

    let output_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(
        &mock_server.uri(),
        output_dir.path(),
        ProfileKind::AttributeTable,
    );
    let orchestrator = build_orchestrator(&config);

    let run = orchestrator
        .run_source(&config.sources[0])
        .await
        .expect("Harvest failed");

    assert_eq!(run.records.len(), 2);
    let record = &run.records[0];
    assert_eq!(record.name.as_deref(), Some("Appartement lumineux 1"));
    assert_eq!(record.price.as_deref(), Some("1250"));
    assert_eq!(record.area.as_deref(), Some("85"));
    assert_eq!(record.characteristics.get("Chambres"), Some("2"));
    assert_eq!(record.characteristics.get("Pièces"), Some("4"));
    // No explicit transaction signal on this profile; the price decides
    assert_eq!(record.transaction_type, Some(TransactionType::Rent));
}
