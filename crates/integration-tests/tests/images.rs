mod harness;

use harness::config::ConfigBuilder;
use harness::image_server::ImageServer;
use harness::{JPEG, PNG, image_file};
use prism_config::ImageContract;
use prism_core::{Classify, ErrorKind, ImageFormat, TransportForm};
use prism_images::{ImageHandler, ImageSource};

#[tokio::test]
async fn handler_from_config_lists_enabled_sources_in_order() {
    let config = ConfigBuilder::new().build();
    let handler = ImageHandler::from_config(&config.images).await;
    assert_eq!(handler.source_names(), vec!["local", "http"]);

    let config = ConfigBuilder::new().without_local().build();
    let handler = ImageHandler::from_config(&config.images).await;
    assert_eq!(handler.source_names(), vec!["http"]);
}

#[tokio::test]
async fn s3_section_appends_the_s3_source() {
    let config = ConfigBuilder::new().with_s3("http://127.0.0.1:9000").build();
    let handler = ImageHandler::from_config(&config.images).await;

    assert_eq!(handler.source_names(), vec!["local", "http", "s3"]);
    assert_eq!(handler.source_for("s3://bucket/cat.png").unwrap().name(), "s3");
}

#[tokio::test]
async fn fetches_over_http_and_from_disk() {
    let server = ImageServer::start().await;
    let url = server.serve("cat.jpg", JPEG, 1).await;
    let file = image_file(PNG, ".png");

    let config = ConfigBuilder::new().build();
    let handler = ImageHandler::from_config(&config.images).await;

    assert_eq!(handler.fetch_async(&url).await.unwrap().as_ref(), JPEG);
    assert_eq!(
        handler.fetch_async(file.path().to_str().unwrap()).await.unwrap().as_ref(),
        PNG
    );

    server.verify().await;
}

#[tokio::test]
async fn http_errors_surface_as_source_failures() {
    let server = ImageServer::start().await;
    let url = server.fail("gone.png", 404).await;

    let handler = ImageHandler::from_config(&ConfigBuilder::new().build().images).await;
    let err = handler.fetch_async(&url).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ImageSource);
    assert!(!err.is_caller_fault());
}

#[tokio::test]
async fn disabled_http_source_leaves_urls_unresolvable() {
    let server = ImageServer::start().await;
    let url = server.url("cat.png");

    let config = ConfigBuilder::new().without_http().build();
    let handler = ImageHandler::from_config(&config.images).await;
    let err = handler.fetch_async(&url).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnresolvableReference);
}

#[tokio::test]
async fn process_image_applies_the_contract() {
    let server = ImageServer::start().await;
    let url = server.serve("cat.png", PNG, 2).await;
    let handler = ImageHandler::from_config(&ConfigBuilder::new().build().images).await;

    let contract = ImageContract::new(true, 1_000, [ImageFormat::Png]);
    let image = handler.process_image_async(&url, &contract).await.unwrap();
    assert_eq!(image.format, ImageFormat::Png);
    assert!(matches!(image.data, TransportForm::Base64(ref text) if text.starts_with("iVBORw0KGgo")));

    let tiny = ImageContract::new(false, 4, [ImageFormat::Png]);
    let err = handler.process_image_async(&url, &tiny).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContractViolation);

    server.verify().await;
}
