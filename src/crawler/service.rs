//! Per-URL product crawling
//!
//! [`ProductCrawler`] fetches one page, classifies and extracts it, then
//! writes the product graph row by row. Every failure on the way is turned
//! into a failed-crawl ledger entry and a non-success [`CrawlOutcome`].

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use url::Url;

use super::fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
use super::{CrawlOutcome, Crawler};
use crate::config::Config;
use crate::extract::{
    self, format_price, resolve_prices, ExtractionOutcome, PriceMode, ProductRecord,
    VariationRecord,
};
use crate::media::ImageDownloader;
use crate::storage::{
    FailureKind, ImageType, NewFailedCrawl, NewImage, NewProduct, NewVariation, StorageResult,
    Store, UrlKind,
};
use crate::{Result, ScoutError};

/// `url_type` recorded for pages ruled out as non-product pages
pub const NON_PRODUCT_URL_TYPE: &str = "page";

const NOT_PRODUCT_REASON: &str = "not a product page";

/// Crawls single product pages into a [`Store`]
pub struct ProductCrawler<F: PageFetcher = HttpFetcher> {
    fetcher: F,
    store: Store,
    price_mode: PriceMode,
    downloader: Option<ImageDownloader>,
}

impl ProductCrawler<HttpFetcher> {
    /// Builds an HTTP-backed crawler from the loaded configuration
    pub fn from_config(config: &Config, store: Store) -> Result<Self> {
        let mut crawler = ProductCrawler::new(HttpFetcher::new(config.fetcher.clone()), store)
            .with_price_mode(config.extraction.price_mode);

        if config.output.download_images {
            let client = build_http_client(&config.fetcher).map_err(FetchError::from)?;
            crawler = crawler.with_downloader(ImageDownloader::new(
                client,
                &config.output.image_directory,
            ));
        }

        Ok(crawler)
    }
}

impl<F: PageFetcher> ProductCrawler<F> {
    pub fn new(fetcher: F, store: Store) -> Self {
        Self {
            fetcher,
            store,
            price_mode: PriceMode::default(),
            downloader: None,
        }
    }

    pub fn with_price_mode(mut self, price_mode: PriceMode) -> Self {
        self.price_mode = price_mode;
        self
    }

    /// Also download every newly stored image
    pub fn with_downloader(mut self, downloader: ImageDownloader) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Whether a resource of `kind` still needs crawling
    ///
    /// Product URLs are also ruled out once they are in the negative cache.
    pub fn not_crawled_before_kind(&self, url: &str, kind: UrlKind) -> Result<bool> {
        if self.store.exists_by_url(kind, url)? {
            return Ok(false);
        }
        if kind == UrlKind::Product && self.store.non_crawlable.is_non_crawlable(url)? {
            return Ok(false);
        }
        Ok(true)
    }

    /// Same as [`not_crawled_before_kind`](Self::not_crawled_before_kind)
    /// with the kind given by name (`product` or `image`)
    pub fn not_crawled_before_named(&self, url: &str, kind: &str) -> Result<bool> {
        let kind: UrlKind = kind
            .parse()
            .map_err(|e: crate::storage::StorageError| ScoutError::InvalidArgument(e.to_string()))?;
        self.not_crawled_before_kind(url, kind)
    }

    fn record_failure(&self, failure: NewFailedCrawl) -> Result<()> {
        warn!(
            "Recording {} failure for {}: {}",
            failure.kind.to_db_string(),
            failure.url,
            failure.error
        );
        self.store.failed_crawls.create(&failure)?;
        Ok(())
    }

    async fn persist(&mut self, url: &str, record: ProductRecord) -> Result<CrawlOutcome> {
        let current = record.price.as_deref().map(|p| format_price(p, self.price_mode));
        let comparison = record
            .comparison_price
            .as_deref()
            .map(|p| format_price(p, self.price_mode));
        let prices = resolve_prices(current.as_deref(), comparison.as_deref());

        let product = NewProduct {
            title: record.name.clone(),
            price: prices.price,
            sales_price: prices.sales_price,
            category: record.category.clone(),
            short_desc: record.description.clone(),
            brand: record.brand.clone(),
            url: url.to_string(),
            has_variations: false,
            parent_id: None,
        };

        let product_id = match self.store.products.create(&product) {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to save product {}: {}", url, e);
                self.record_failure(NewFailedCrawl::new(url, FailureKind::DbSave, &e))?;
                return Ok(CrawlOutcome::SaveFailed(e.to_string()));
            }
        };
        debug!("Saved product {} as #{}", url, product_id);

        let mut stored_images = Vec::new();

        for image_url in record.product_images() {
            match self.save_product_image(product_id, image_url) {
                Ok(true) => stored_images.push(image_url.to_string()),
                Ok(false) => debug!("Image already stored: {}", image_url),
                Err(e) => self.record_failure(
                    NewFailedCrawl::new(image_url, FailureKind::Image, &e).with_foreign_id(product_id),
                )?,
            }
        }

        if record.has_variations {
            for variation in &record.variations {
                match self.save_variation(product_id, variation) {
                    Ok(()) => stored_images.push(variation.image_url.clone()),
                    Err(e) => self.record_failure(
                        NewFailedCrawl::new(&variation.image_url, FailureKind::VariationImage, &e)
                            .with_foreign_id(product_id),
                    )?,
                }
            }

            let flagged = self
                .store
                .variations
                .list_by_product(product_id)
                .and_then(|rows| {
                    self.store
                        .products
                        .mark_has_variations(product_id, !rows.is_empty())
                });
            if let Err(e) = flagged {
                self.record_failure(
                    NewFailedCrawl::new(url, FailureKind::DbSave, &e).with_foreign_id(product_id),
                )?;
            }
        }

        self.download_images(product_id, &stored_images).await?;

        info!(
            "Saved product #{} '{}' with {} image(s), {} variation(s)",
            product_id,
            record.name,
            stored_images.len(),
            record.variations.len()
        );
        Ok(CrawlOutcome::Saved(product_id))
    }

    /// Inserts a product image unless its URL is already stored
    fn save_product_image(&self, product_id: i64, image_url: &str) -> StorageResult<bool> {
        if self.store.images.exists_by_url(image_url)? {
            return Ok(false);
        }
        self.store.images.create(&NewImage {
            product_id,
            image_url: image_url.to_string(),
            image_type: ImageType::Product,
            variation_id: None,
        })?;
        Ok(true)
    }

    /// Inserts a variation and its image, then links the two
    fn save_variation(&self, product_id: i64, variation: &VariationRecord) -> StorageResult<()> {
        let variation_id = self.store.variations.create(&NewVariation {
            product_id,
            variation_code: variation.code.clone(),
            image_id: None,
        })?;
        let image_id = self.store.images.create(&NewImage {
            product_id,
            image_url: variation.image_url.clone(),
            image_type: ImageType::Variation,
            variation_id: Some(variation_id),
        })?;
        self.store.variations.set_image(variation_id, image_id)
    }

    async fn download_images(&mut self, product_id: i64, image_urls: &[String]) -> Result<()> {
        let Some(downloader) = self.downloader.as_mut() else {
            return Ok(());
        };

        let mut failures = Vec::new();
        for image_url in image_urls {
            if let Err(e) = downloader.download(image_url).await {
                failures.push(
                    NewFailedCrawl::new(image_url, FailureKind::ImageDownload, &e)
                        .with_foreign_id(product_id),
                );
            }
        }

        for failure in failures {
            self.record_failure(failure)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<F: PageFetcher> Crawler for ProductCrawler<F> {
    async fn initialize(&mut self) -> Result<()> {
        self.fetcher
            .open()
            .await
            .map_err(|e| ScoutError::Initialization(e.to_string()))
    }

    async fn close(&mut self) {
        self.fetcher.close().await;
    }

    fn not_crawled_before(&self, url: &str) -> Result<bool> {
        self.not_crawled_before_kind(url, UrlKind::Product)
    }

    async fn crawl(&mut self, url: &str) -> Result<CrawlOutcome> {
        info!("Crawling {}", url);

        let page_url = match Url::parse(url) {
            Ok(page_url) => page_url,
            Err(e) => {
                self.record_failure(NewFailedCrawl::new(url, FailureKind::Product, &e))?;
                return Ok(CrawlOutcome::FetchFailed(e.to_string()));
            }
        };

        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                self.record_failure(NewFailedCrawl::new(url, FailureKind::Product, &e))?;
                return Ok(CrawlOutcome::FetchFailed(e.to_string()));
            }
        };

        match extract::analyze(&html, &page_url) {
            ExtractionOutcome::Product(record) => self.persist(url, record).await,
            ExtractionOutcome::NotProduct => {
                info!("Skipping non-product page {}", url);
                if let Err(e) = self.store.non_crawlable.create(
                    url,
                    NON_PRODUCT_URL_TYPE,
                    Some(NOT_PRODUCT_REASON),
                ) {
                    warn!("Could not cache non-product URL {}: {}", url, e);
                }
                Ok(CrawlOutcome::NotProduct)
            }
            ExtractionOutcome::ParseFailed(reason) => {
                self.record_failure(NewFailedCrawl::new(url, FailureKind::Product, &reason))?;
                Ok(CrawlOutcome::ParseFailed(reason))
            }
        }
    }
}
