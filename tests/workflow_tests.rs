//! End-to-end workflow tests
//!
//! Scan, publish and clean against the real registry and Telegram client,
//! with wiremock standing in for the Bot API.

mod common;

use common::{random_image_name, write_other, TestEnv};
use image_pub_core::ImageStatus;
use image_pub_db::ImageRepository;
use image_pub_service::PublishOutcome;

#[tokio::test]
async fn test_scan_registers_only_supported_images() {
    let env = TestEnv::new().await;
    let accepted: Vec<String> = ["jpg", "JPG", "jpeg", "png", "PnG"]
        .iter()
        .map(|ext| random_image_name(ext))
        .collect();
    for name in &accepted {
        env.add_image(name);
    }
    for name in ["notes.txt", "Makefile", "photo.gif", "backup.jpg.bak"] {
        write_other(&env.images(), name);
    }

    let report = env.services.discovery().scan(&env.images()).await.unwrap();
    assert_eq!(report.count(), accepted.len());
    assert_eq!(report.ignored, 4);

    for name in &accepted {
        assert_eq!(env.status_of(name).await, Some(ImageStatus::NotPublished));
    }
}

#[tokio::test]
async fn test_scan_twice_keeps_record_count() {
    let env = TestEnv::new().await;
    for _ in 0..3 {
        env.add_image(&random_image_name("png"));
    }

    env.services.discovery().scan(&env.images()).await.unwrap();
    let second = env.services.discovery().scan(&env.images()).await.unwrap();

    assert_eq!(second.count(), 0);
    assert_eq!(second.duplicates, 3);
    assert_eq!(env.repository.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_full_cycle() {
    let env = TestEnv::new().await;
    env.accept_all().await;
    env.add_image("first.jpg");
    env.add_image("second.png");

    let scan = env.services.discovery().scan(&env.images()).await.unwrap();
    assert_eq!(scan.count(), 2);

    let publication = env.services.publication().unwrap();
    let mut published = Vec::new();
    for _ in 0..2 {
        let report = publication.publish_next(&env.images()).await.unwrap();
        published.push(report.published_name().unwrap().to_string());
    }
    published.sort();
    assert_eq!(published, vec!["first.jpg", "second.png"]);

    let report = publication.publish_next(&env.images()).await.unwrap();
    assert_eq!(report.outcome, PublishOutcome::NoPendingImages);
    assert_eq!(env.request_count().await, 2);

    let cleanup = env.services.cleanup().clean_published(&env.images()).await.unwrap();
    assert_eq!(cleanup.count(), 2);
    assert!(!env.exists("first.jpg"));
    assert!(!env.exists("second.png"));

    // Rows survive cleanup, so a rescan cannot re-register the names
    assert_eq!(env.repository.count().await.unwrap(), 2);
    env.add_image("first.jpg");
    let rescan = env.services.discovery().scan(&env.images()).await.unwrap();
    assert_eq!(rescan.count(), 0);
    assert_eq!(env.status_of("first.jpg").await, Some(ImageStatus::Published));
}

#[tokio::test]
async fn test_status_codes_persisted() {
    let env = TestEnv::new().await;
    env.seed("a.jpg", ImageStatus::NotPublished).await;
    env.seed("b.jpg", ImageStatus::Published).await;
    env.seed("c.png", ImageStatus::NotFound).await;
    env.seed("d.png", ImageStatus::NotValid).await;

    assert_eq!(env.stored_code("a.jpg").await, 0);
    assert_eq!(env.stored_code("b.jpg").await, 1);
    assert_eq!(env.stored_code("c.png").await, 2);
    assert_eq!(env.stored_code("d.png").await, 4);

    for status in ImageStatus::ALL {
        assert_eq!(env.repository.count_by_status(status).await.unwrap(), 1);
    }
}
