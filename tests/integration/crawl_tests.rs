//! Integration tests for the crawler
//!
//! These tests use wiremock to serve shop pages and run the full
//! orchestrator -> crawler -> store cycle against a SQLite file.

use shelf_scout::config::{Config, CrawlerConfig, ExtractionConfig, FetcherConfig, OutputConfig};
use shelf_scout::crawler::{CrawlOrchestrator, ProductCrawler, RunOptions};
use shelf_scout::storage::{FailureKind, ImageType, Store};
use shelf_scout::PriceMode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `db_path`
fn create_test_config(db_path: &str, image_dir: &str, download_images: bool) -> Config {
    Config {
        crawler: CrawlerConfig {
            delay_seconds: 0.0,
            max_urls: 10,
            stop_on_error: false,
        },
        fetcher: FetcherConfig {
            user_agent: "shelf-scout-tests".to_string(),
            timeout_seconds: 5,
        },
        extraction: ExtractionConfig {
            price_mode: PriceMode::Integer,
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
            image_directory: image_dir.to_string(),
            download_images,
        },
    }
}

fn product_page(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta property="og:type" content="product">
  <meta name="product_id" content="4021">
  <meta name="product_brand" content="Acme">
  <script type="application/ld+json">
  {{"@context": "https://schema.org", "@type": "Product", "name": "{name}",
    "description": "Two settings<br>with timer", "sku": "AC-4021"}}
  </script>
</head>
<body>
  <ul itemscope itemtype="http://schema.org/BreadcrumbList">
    <li itemprop="itemListElement"><a href="/"><span itemprop="name">Home</span></a></li>
    <li itemprop="itemListElement"><a href="/kitchen"><span itemprop="name">Kitchen</span></a></li>
  </ul>
  <h1 itemprop="name">{name}</h1>
  <span itemprop="price">1,290,000 Toman</span>
  <div class="km-price km-discounted"><span class="km-value">1,490,000</span></div>
  <div class="km-product-gallery">
    <img data-src="/media/kettle-front.jpg" src="/media/placeholder.gif">
    <img data-src="/media/kettle-side.jpg" src="/media/placeholder.gif">
  </div>
  <div class="km-product-variations">
    <div data-variation-code="RED" data-variation-id="1"><img src="/media/kettle-red.jpg"></div>
    <div data-variation-code="STEEL" data-variation-id="2" data-image="/media/kettle-steel.jpg"></div>
  </div>
</body>
</html>"#
    )
}

async fn mount_page(server: &MockServer, page_path: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

async fn run(config: &Config, urls: &[String]) -> shelf_scout::RunStatistics {
    let store = Store::open(std::path::Path::new(&config.output.database_path))
        .expect("Failed to open store");
    let crawler = ProductCrawler::from_config(config, store).expect("Failed to build crawler");
    let mut orchestrator = CrawlOrchestrator::new(crawler, RunOptions::from(&config.crawler));
    orchestrator.run(urls).await.expect("Crawl failed")
}

#[tokio::test]
async fn test_full_crawl_and_idempotent_rerun() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/product/kettle", 200, product_page("Electric Kettle")).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("shop.db");
    let config = create_test_config(
        db_path.to_str().unwrap(),
        temp_dir.path().join("images").to_str().unwrap(),
        false,
    );
    let product_url = format!("{}/product/kettle", mock_server.uri());

    let first = run(&config, &[product_url.clone()]).await;
    assert_eq!(first.successful, 1);
    assert_eq!(first.failed, 0);

    let second = run(&config, &[product_url.clone()]).await;
    assert_eq!(second.successful, 0);
    assert_eq!(second.skipped, 1);

    let store = Store::open(&db_path).unwrap();
    assert_eq!(store.products.count().unwrap(), 1);

    let product = store.products.get_by_url(&product_url).unwrap().unwrap();
    assert_eq!(product.title, "Electric Kettle");
    assert_eq!(product.price, "1490000");
    assert_eq!(product.sales_price.as_deref(), Some("1290000"));
    assert_eq!(product.brand.as_deref(), Some("Acme"));
    assert_eq!(product.category.as_deref(), Some("Home > Kitchen"));
    assert_eq!(product.short_desc.as_deref(), Some("Two settings with timer"));
    assert!(product.has_variations);
}

#[tokio::test]
async fn test_variations_persist_with_linked_images() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/product/kettle", 200, product_page("Kettle")).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("shop.db");
    let config = create_test_config(db_path.to_str().unwrap(), "images", false);
    let product_url = format!("{}/product/kettle", mock_server.uri());

    run(&config, &[product_url.clone()]).await;

    let store = Store::open(&db_path).unwrap();
    let product = store.products.get_by_url(&product_url).unwrap().unwrap();

    let variations = store.variations.list_by_product(product.id).unwrap();
    assert_eq!(variations.len(), 2);

    let variation_images = store
        .images
        .list_by_product(product.id, Some(ImageType::Variation))
        .unwrap();
    assert_eq!(variation_images.len(), 2);

    for variation in &variations {
        let image_id = variation.image_id.expect("variation image linked");
        let image = store.images.get_by_id(image_id).unwrap().unwrap();
        assert_eq!(image.variation_id, Some(variation.id));
        assert_eq!(image.image_type, ImageType::Variation);
    }

    let steel = store.variations.get_by_code(product.id, "STEEL").unwrap().unwrap();
    let steel_image = store.images.get_by_id(steel.image_id.unwrap()).unwrap().unwrap();
    assert_eq!(
        steel_image.image_url,
        format!("{}/media/kettle-steel.jpg", mock_server.uri())
    );

    let gallery = store
        .images
        .list_by_product(product.id, Some(ImageType::Product))
        .unwrap();
    let gallery_urls: Vec<_> = gallery.iter().map(|i| i.image_url.clone()).collect();
    assert_eq!(
        gallery_urls,
        vec![
            format!("{}/media/kettle-front.jpg", mock_server.uri()),
            format!("{}/media/kettle-side.jpg", mock_server.uri()),
        ]
    );

    // Cascade removes the whole graph
    assert!(store.products.delete(product.id).unwrap());
    assert!(store.variations.list_by_product(product.id).unwrap().is_empty());
    assert!(store.images.list_by_product(product.id, None).unwrap().is_empty());
}

#[tokio::test]
async fn test_failures_are_recorded_and_run_continues() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/product/gone", 404, "Not found".to_string()).await;
    mount_page(
        &mock_server,
        "/about",
        200,
        "<html><head><title>About</title></head><body>We sell kettles</body></html>".to_string(),
    )
    .await;
    mount_page(&mock_server, "/product/kettle", 200, product_page("Kettle")).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("shop.db");
    let config = create_test_config(db_path.to_str().unwrap(), "images", false);

    let gone = format!("{}/product/gone", mock_server.uri());
    let about = format!("{}/about", mock_server.uri());
    let kettle = format!("{}/product/kettle", mock_server.uri());

    let stats = run(&config, &[gone.clone(), about.clone(), kettle.clone()]).await;
    assert_eq!(stats.total_urls, 3);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.failed_urls, vec![gone.clone(), about.clone()]);

    let store = Store::open(&db_path).unwrap();
    let failures = store.failed_crawls.list_by_kind(FailureKind::Product).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].url, gone);

    assert!(store.non_crawlable.is_non_crawlable(&about).unwrap());

    // The non-product page is skipped next time, the 404 is retried
    let rerun = run(&config, &[gone, about, kettle]).await;
    assert_eq!(rerun.skipped, 2);
    assert_eq!(rerun.failed, 1);
}

#[tokio::test]
async fn test_stop_on_error_and_max_urls() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/product/a", 200, product_page("A")).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("shop.db");
    let mut config = create_test_config(db_path.to_str().unwrap(), "images", false);
    config.crawler.stop_on_error = true;
    config.crawler.max_urls = 2;

    let urls: Vec<String> = ["/product/missing", "/product/a", "/product/b"]
        .iter()
        .map(|p| format!("{}{}", mock_server.uri(), p))
        .collect();

    let stats = run(&config, &urls).await;
    assert_eq!(stats.total_urls, 3);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.successful, 0);
    assert_eq!(stats.skipped, 0);
}

#[tokio::test]
async fn test_image_download_writes_files_and_records_failures() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/product/kettle", 200, product_page("Kettle")).await;
    for image in ["/media/kettle-front.jpg", "/media/kettle-red.jpg", "/media/kettle-steel.jpg"] {
        Mock::given(method("GET"))
            .and(path(image))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0xFFu8, 0xD8, 0xFF]),
            )
            .mount(&mock_server)
            .await;
    }

    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("shop.db");
    let image_dir = temp_dir.path().join("images");
    let config = create_test_config(db_path.to_str().unwrap(), image_dir.to_str().unwrap(), true);

    let stats = run(&config, &[format!("{}/product/kettle", mock_server.uri())]).await;
    assert_eq!(stats.successful, 1);

    assert!(image_dir.join("kettle-front.jpg").exists());
    assert!(image_dir.join("kettle-red.jpg").exists());
    assert!(!image_dir.join("kettle-side.jpg").exists());

    let store = Store::open(&db_path).unwrap();
    let download_failures = store
        .failed_crawls
        .list_by_kind(FailureKind::ImageDownload)
        .unwrap();
    assert_eq!(download_failures.len(), 1);
    assert!(download_failures[0].url.ends_with("/media/kettle-side.jpg"));
}
