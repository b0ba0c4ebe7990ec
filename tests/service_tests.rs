//! Service and query-layer tests against an in-memory SQLite database with
//! the real migrations applied. Outbound collaborators are pointed at
//! unroutable endpoints (geo) or disabled outright (notifications), so every
//! external call degrades exactly like a production failure would.

use chrono::{Duration, Utc};
use sea_orm::{ConnectOptions, Database, SqlErr};
use sea_orm_migration::MigratorTrait;

use droply::config::{GeoSettings, S3Config};
use droply::db::DbPool;
use droply::db::access_logs::NewAccess;
use droply::db::files::NewFile;
use droply::entity::file;
use droply::error::AppError;
use droply::migration::Migrator;
use droply::models::{AccessType, ToggleField};
use droply::services::admin::CSV_HEADER;
use droply::services::{AdminService, FileService, GeoClient, Notifier, Storage};

async fn test_pool() -> DbPool {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    // A single connection keeps the in-memory database alive and shared
    opts.max_connections(1).sqlx_logging(false);

    let conn = Database::connect(opts)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&conn, None)
        .await
        .expect("failed to run migrations");

    DbPool::from_connection(conn)
}

fn test_storage() -> Storage {
    Storage::offline(&S3Config {
        endpoint: Some("http://127.0.0.1:1".to_string()),
        bucket: "test".to_string(),
        region: "us-east-1".to_string(),
        access_key: "testkey".to_string(),
        secret_key: "testsecret".to_string(),
    })
}

fn test_geo() -> GeoClient {
    GeoClient::new(&GeoSettings {
        base_url: "http://127.0.0.1:1/json".to_string(),
        timeout_ms: 200,
    })
}

const BASE_URL: &str = "http://test.local";

fn file_service(pool: &DbPool) -> FileService {
    FileService::new(
        pool.clone(),
        test_storage(),
        test_geo(),
        Notifier::disabled(),
        BASE_URL,
    )
}

fn admin_service(pool: &DbPool) -> AdminService {
    AdminService::new(
        pool.clone(),
        test_storage(),
        Notifier::disabled(),
        BASE_URL,
    )
}

async fn seed_file(
    pool: &DbPool,
    code: &str,
    name: &str,
    size: i64,
    owner: Option<i64>,
    minutes_ago: i64,
) -> file::Model {
    pool.insert_file(NewFile {
        file_code: code.to_string(),
        original_filename: name.to_string(),
        stored_filename: format!("{}-stored", code),
        file_size: size,
        owner_id: owner,
        uploaded_at: Utc::now() - Duration::minutes(minutes_ago),
    })
    .await
    .expect("failed to seed file")
}

async fn seed_access(pool: &DbPool, code: &str, access_type: AccessType, minutes_ago: i64) {
    pool.insert_access(NewAccess {
        file_code: code.to_string(),
        access_type,
        ip_address: "203.0.113.7".to_string(),
        user_agent: "curl/8.0".to_string(),
        access_time: Utc::now() - Duration::minutes(minutes_ago),
        country: String::new(),
        city: String::new(),
    })
    .await
    .expect("failed to seed access");
}

// ---------------------------------------------------------------------------
// File rows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_starts_active_with_notifications_on() {
    let pool = test_pool().await;
    let inserted = seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 0).await;

    assert_eq!(inserted.file_size, 5);
    assert!(inserted.is_active);
    assert!(inserted.notify_on_visit);
    assert!(inserted.notify_on_download);
    assert_eq!(inserted.owner_id, Some(42));
}

#[tokio::test]
async fn duplicate_short_code_is_a_detectable_unique_violation() {
    let pool = test_pool().await;
    seed_file(&pool, "Ab3dE", "a.txt", 5, None, 0).await;

    let err = pool
        .insert_file(NewFile {
            file_code: "Ab3dE".to_string(),
            original_filename: "b.txt".to_string(),
            stored_filename: "other-stored".to_string(),
            file_size: 9,
            owner_id: None,
            uploaded_at: Utc::now(),
        })
        .await
        .expect_err("duplicate code must be rejected");

    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
async fn deactivated_files_disappear_from_active_lookups() {
    let pool = test_pool().await;
    let f = seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 0).await;

    assert!(pool.find_active_by_code("Ab3dE").await.unwrap().is_some());

    pool.deactivate_file(f).await.unwrap();

    // Gone from the public path, still visible to the admin lookup
    assert!(pool.find_active_by_code("Ab3dE").await.unwrap().is_none());
    let row = pool.find_by_code("Ab3dE").await.unwrap().unwrap();
    assert!(!row.is_active);
}

#[tokio::test]
async fn download_after_delete_is_not_found() {
    let pool = test_pool().await;
    let files = file_service(&pool);
    let f = seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 0).await;

    pool.deactivate_file(f).await.unwrap();

    let err = files.download("Ab3dE").await.expect_err("must be gone");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn owner_listing_is_active_only_and_newest_first() {
    let pool = test_pool().await;
    let files = file_service(&pool);

    seed_file(&pool, "old11", "old.txt", 1, Some(42), 60).await;
    seed_file(&pool, "new11", "new.txt", 2, Some(42), 1).await;
    seed_file(&pool, "mid11", "mid.txt", 3, Some(42), 30).await;
    seed_file(&pool, "oth11", "other.txt", 4, Some(7), 5).await;
    let dead = seed_file(&pool, "dead1", "dead.txt", 5, Some(42), 2).await;
    pool.deactivate_file(dead).await.unwrap();

    let listing = files.list_by_owner(42).await.unwrap();
    let codes: Vec<&str> = listing.iter().map(|f| f.file_code.as_str()).collect();

    assert_eq!(codes, vec!["new11", "mid11", "old11"]);
    assert!(listing.iter().all(|f| f.is_active));
    assert!(listing.iter().all(|f| f.owner_id == Some(42)));
}

#[tokio::test]
async fn replacement_keeps_code_owner_and_flags() {
    let pool = test_pool().await;
    let f = seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 60).await;

    // Flip one flag first so we can see it survive
    let f = pool
        .set_notify_flag(f, ToggleField::NotifyVisits, false)
        .await
        .unwrap();

    let before = f.uploaded_at;
    let updated = pool
        .apply_replacement(
            f,
            "b.pdf".to_string(),
            "fresh-stored.pdf".to_string(),
            99,
            Utc::now(),
        )
        .await
        .unwrap();

    assert_eq!(updated.file_code, "Ab3dE");
    assert_eq!(updated.owner_id, Some(42));
    assert_eq!(updated.original_filename, "b.pdf");
    assert_eq!(updated.stored_filename, "fresh-stored.pdf");
    assert_eq!(updated.file_size, 99);
    assert!(updated.uploaded_at > before);
    assert!(!updated.notify_on_visit);
    assert!(updated.notify_on_download);
}

// ---------------------------------------------------------------------------
// Owner mutations through the file service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toggle_is_an_involution() {
    let pool = test_pool().await;
    let files = file_service(&pool);
    seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 0).await;

    let first = files
        .toggle_owned("Ab3dE", 42, ToggleField::NotifyVisits)
        .await
        .unwrap();
    assert!(!first);

    let second = files
        .toggle_owned("Ab3dE", 42, ToggleField::NotifyVisits)
        .await
        .unwrap();
    assert!(second);

    // The other flag never moved
    let row = pool.find_active_by_code("Ab3dE").await.unwrap().unwrap();
    assert!(row.notify_on_visit);
    assert!(row.notify_on_download);
}

#[tokio::test]
async fn ownership_is_enforced_on_mutations() {
    let pool = test_pool().await;
    let files = file_service(&pool);
    seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 0).await;

    let err = files
        .toggle_owned("Ab3dE", 99, ToggleField::NotifyDownloads)
        .await
        .expect_err("wrong owner");
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = files.delete_owned("Ab3dE", 99).await.expect_err("wrong owner");
    assert!(matches!(err, AppError::Forbidden(_)));

    // Unknown codes are NotFound, not Forbidden
    let err = files
        .toggle_owned("zzzzz", 42, ToggleField::NotifyVisits)
        .await
        .expect_err("unknown code");
    assert!(matches!(err, AppError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Access recording
// ---------------------------------------------------------------------------

#[tokio::test]
async fn access_is_logged_even_when_geo_lookup_fails() {
    let pool = test_pool().await;
    let files = file_service(&pool);
    let f = seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 0).await;

    files
        .record_access_and_notify(&f, AccessType::Visit, "203.0.113.7", "curl/8.0")
        .await
        .unwrap();
    files
        .record_access_and_notify(&f, AccessType::Download, "203.0.113.7", "")
        .await
        .unwrap();

    let visits = pool
        .count_accesses(Some("Ab3dE"), AccessType::Visit, None)
        .await
        .unwrap();
    let downloads = pool
        .count_accesses(Some("Ab3dE"), AccessType::Download, None)
        .await
        .unwrap();
    assert_eq!(visits, 1);
    assert_eq!(downloads, 1);

    // Geo failure degraded to empty strings, never an error
    let rows = pool.recent_accesses("Ab3dE", 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.country.is_empty() && r.city.is_empty()));
}

#[tokio::test]
async fn logs_survive_file_deactivation() {
    let pool = test_pool().await;
    let admin = admin_service(&pool);
    let f = seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 0).await;

    seed_access(&pool, "Ab3dE", AccessType::Visit, 10).await;
    seed_access(&pool, "Ab3dE", AccessType::Download, 5).await;
    pool.deactivate_file(f).await.unwrap();

    let page = admin.logs("Ab3dE", 1, 20).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.logs.len(), 2);
    // Newest first
    assert_eq!(page.logs[0].access_type, "download");
    assert_eq!(page.logs[1].access_type, "visit");
}

#[tokio::test]
async fn per_file_stats_count_and_cap_recent_activity() {
    let pool = test_pool().await;
    let files = file_service(&pool);
    seed_file(&pool, "Ab3dE", "a.txt", 5, None, 0).await;

    for i in 0..12 {
        seed_access(&pool, "Ab3dE", AccessType::Visit, 60 - i).await;
    }
    seed_access(&pool, "Ab3dE", AccessType::Download, 1).await;

    let stats = files.stats("Ab3dE").await.unwrap();
    assert_eq!(stats.visits, 12);
    assert_eq!(stats.downloads, 1);
    assert_eq!(stats.recent_activity.len(), 10);
    // Most recent row is the download
    assert_eq!(stats.recent_activity[0].access_type, "download");
}

// ---------------------------------------------------------------------------
// Admin surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_listing_searches_and_paginates() {
    let pool = test_pool().await;
    let admin = admin_service(&pool);

    seed_file(&pool, "aaaa1", "report.pdf", 10, Some(1), 30).await;
    seed_file(&pool, "bbbb1", "REPORT-final.pdf", 20, Some(2), 20).await;
    seed_file(&pool, "cccc1", "photo.jpg", 30, None, 10).await;

    // Case-insensitive name search
    let page = admin.list_files(Some("report"), 1, 10).await.unwrap();
    assert_eq!(page.total, 2);
    let names: Vec<&str> = page.files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["REPORT-final.pdf", "report.pdf"]);

    // Code search
    let page = admin.list_files(Some("CCCC"), 1, 10).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.files[0].file_code, "cccc1");
    assert_eq!(page.files[0].download_url, format!("{}/cccc1", BASE_URL));

    // Pagination: newest first, one per page
    let page = admin.list_files(None, 2, 1).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.files.len(), 1);
    assert_eq!(page.files[0].file_code, "bbbb1");
}

#[tokio::test]
async fn admin_listing_excludes_deleted_files() {
    let pool = test_pool().await;
    let admin = admin_service(&pool);

    let f = seed_file(&pool, "aaaa1", "a.txt", 10, Some(42), 0).await;
    let page = admin.list_files(Some("a.txt"), 1, 10).await.unwrap();
    assert_eq!(page.total, 1);

    pool.deactivate_file(f).await.unwrap();
    let page = admin.list_files(Some("a.txt"), 1, 10).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(page.files.is_empty());
}

#[tokio::test]
async fn pagination_bounds_are_rejected() {
    let pool = test_pool().await;
    let admin = admin_service(&pool);

    assert!(matches!(
        admin.list_files(None, 0, 10).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        admin.list_files(None, 1, 0).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        admin.list_files(None, 1, 101).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        admin.logs("Ab3dE", 1, 201).await,
        Err(AppError::InvalidInput(_))
    ));
    // Log pages may be larger than file pages
    assert!(admin.logs("Ab3dE", 1, 200).await.is_ok());
}

#[tokio::test]
async fn csv_export_is_ascending_with_exact_header() {
    let pool = test_pool().await;
    let admin = admin_service(&pool);
    seed_file(&pool, "Ab3dE", "a.txt", 5, None, 0).await;

    seed_access(&pool, "Ab3dE", AccessType::Download, 5).await;
    seed_access(&pool, "Ab3dE", AccessType::Visit, 50).await;
    seed_access(&pool, "Ab3dE", AccessType::Visit, 500).await;

    let csv = admin.export_logs_csv("Ab3dE").await.unwrap();
    let lines: Vec<&str> = csv.trim_end().split("\r\n").collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], CSV_HEADER);
    // Oldest first: visit, visit, download
    assert!(lines[1].contains(",visit,"));
    assert!(lines[2].contains(",visit,"));
    assert!(lines[3].contains(",download,"));
}

#[tokio::test]
async fn admin_toggle_validates_field_and_state() {
    let pool = test_pool().await;
    let admin = admin_service(&pool);
    seed_file(&pool, "Ab3dE", "a.txt", 5, Some(42), 0).await;

    let (field, value) = admin.toggle("Ab3dE", "notify_downloads").await.unwrap();
    assert_eq!(field, ToggleField::NotifyDownloads);
    assert!(!value);

    assert!(matches!(
        admin.toggle("Ab3dE", "is_active").await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        admin.toggle("zzzzz", "notify_visits").await,
        Err(AppError::NotFound(_))
    ));

    // Inactive files are invisible to the toggle path
    pool.deactivate_file(pool.find_by_code("Ab3dE").await.unwrap().unwrap())
        .await
        .unwrap();
    assert!(matches!(
        admin.toggle("Ab3dE", "notify_visits").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn admin_stats_aggregate_totals_week_and_top_files() {
    let pool = test_pool().await;
    let admin = admin_service(&pool);

    // Two active files (one old), one deactivated
    seed_file(&pool, "aaaa1", "a.txt", 100, Some(1), 10).await;
    seed_file(&pool, "bbbb1", "b.txt", 200, Some(2), 60 * 24 * 10).await;
    let dead = seed_file(&pool, "dead1", "dead.txt", 400, Some(3), 10).await;
    pool.deactivate_file(dead).await.unwrap();

    // Downloads: 2 for aaaa1, 1 for bbbb1, 1 for the dead file; one old visit
    seed_access(&pool, "aaaa1", AccessType::Download, 5).await;
    seed_access(&pool, "aaaa1", AccessType::Download, 6).await;
    seed_access(&pool, "bbbb1", AccessType::Download, 7).await;
    seed_access(&pool, "dead1", AccessType::Download, 8).await;
    seed_access(&pool, "aaaa1", AccessType::Visit, 60 * 24 * 9).await;

    let stats = admin.stats().await.unwrap();

    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_bytes, 300);
    // All-time counters span active and inactive files
    assert_eq!(stats.total_downloads, 4);
    assert_eq!(stats.total_visits, 1);

    // Last 7 days: only the recent upload and the recent downloads
    assert_eq!(stats.files_this_week, 1);
    assert_eq!(stats.bytes_this_week, 100);
    assert_eq!(stats.downloads_this_week, 4);
    assert_eq!(stats.visits_this_week, 0);

    // Top files rank active files only, most downloaded first
    let top: Vec<(&str, i64)> = stats
        .top_files
        .iter()
        .map(|t| (t.file_code.as_str(), t.downloads))
        .collect();
    assert_eq!(top, vec![("aaaa1", 2), ("bbbb1", 1)]);
}

#[tokio::test]
async fn broadcast_attempts_every_distinct_owner_once() {
    let pool = test_pool().await;
    let admin = admin_service(&pool);

    seed_file(&pool, "aaaa1", "a.txt", 1, Some(1), 0).await;
    seed_file(&pool, "bbbb1", "b.txt", 1, Some(1), 0).await;
    seed_file(&pool, "cccc1", "c.txt", 1, Some(2), 0).await;
    seed_file(&pool, "dddd1", "d.txt", 1, None, 0).await;
    // Owners of deactivated files still count
    let dead = seed_file(&pool, "dead1", "dead.txt", 1, Some(3), 0).await;
    pool.deactivate_file(dead).await.unwrap();

    let result = admin.broadcast("hello").await.unwrap();

    assert!(result.success);
    assert_eq!(result.attempted, 3);
    // The disabled dispatcher delivers nothing; failures only count, never abort
    assert_eq!(result.delivered, 0);
}
