mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use common::{application, applicator, at, body_bytes, body_json, contains, customer, page_contents, TestApp};
use spraylog_api::report::ApplicationStatus;
use uuid::Uuid;

const MAY: &str = "date_from=2024-05-01&date_to=2024-05-31";

#[tokio::test]
async fn california_report_downloads_as_pdf() -> Result<()> {
    let app = TestApp::new();
    let who = applicator();
    let acme = customer("Acme Vineyards");
    app.insert(app.tenant_id, ApplicationStatus::Completed, application(&acme, &who, at(5, 14, 9)));

    let res = app.get(&format!("/api/reports/ca/pdf?{}", MAY), Some(&app.token())).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/pdf");

    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str()?.to_string();
    assert!(disposition.starts_with("attachment; filename=\"report-CA-"), "{}", disposition);
    assert!(disposition.ends_with(".pdf\""));

    let pdf = body_bytes(res).await?;
    assert!(pdf.starts_with(b"%PDF-"));

    let pages = page_contents(&pdf)?;
    assert_eq!(pages.len(), 1);
    assert!(contains(&pages[0], "Monthly Pesticide Use Report"));
    assert!(contains(&pages[0], "Acme Vineyards"));
    assert!(contains(&pages[0], "Page 1 of 1"));
    Ok(())
}

#[tokio::test]
async fn reversed_range_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let res = app
        .get("/api/reports/CA/pdf?date_from=2024-05-31&date_to=2024-05-01", Some(&app.token()))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await?["code"], "INVALID_RANGE");
    Ok(())
}

#[tokio::test]
async fn unknown_jurisdiction_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let res = app.get(&format!("/api/reports/NY/pdf?{}", MAY), Some(&app.token())).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = body_json(res).await?;
    assert_eq!(body["code"], "UNKNOWN_JURISDICTION");
    assert!(body["message"].as_str().unwrap_or_default().contains("NY"));
    Ok(())
}

#[tokio::test]
async fn malformed_dates_are_a_bad_request() -> Result<()> {
    let app = TestApp::new();
    let res = app
        .get("/api/reports/CA/pdf?date_from=May+1&date_to=2024-05-31", Some(&app.token()))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await?["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn unknown_customer_filter_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let uri = format!("/api/reports/TX/pdf?{}&customer_id={}", MAY, Uuid::new_v4());
    let res = app.get(&uri, Some(&app.token())).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await?["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn other_tenants_records_stay_invisible() -> Result<()> {
    let app = TestApp::new();
    let who = applicator();
    let mine = customer("Mine Orchard");
    let theirs = customer("Their Orchard");
    let other_tenant = Uuid::new_v4();

    app.insert(app.tenant_id, ApplicationStatus::Completed, application(&mine, &who, at(5, 2, 8)));
    app.insert(other_tenant, ApplicationStatus::Completed, application(&theirs, &who, at(5, 3, 8)));

    let pdf = body_bytes(app.get(&format!("/api/reports/CA/pdf?{}", MAY), Some(&app.token())).await?).await?;
    let pages = page_contents(&pdf)?;
    assert!(pages.iter().any(|p| contains(p, "Mine Orchard")));
    assert!(!pages.iter().any(|p| contains(p, "Their Orchard")));

    // Filtering by the other tenant's customer looks like a missing customer
    let uri = format!("/api/reports/CA/pdf?{}&customer_id={}", MAY, theirs.id);
    let res = app.get(&uri, Some(&app.token())).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn voided_and_out_of_range_records_leave_a_placeholder() -> Result<()> {
    let app = TestApp::new();
    let who = applicator();
    let acme = customer("Acme Vineyards");
    app.insert(app.tenant_id, ApplicationStatus::Voided, application(&acme, &who, at(5, 10, 9)));
    app.insert(app.tenant_id, ApplicationStatus::Completed, application(&acme, &who, at(6, 1, 0)));

    let res = app.get(&format!("/api/reports/FL/pdf?{}", MAY), Some(&app.token())).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let pages = page_contents(&body_bytes(res).await?)?;
    assert_eq!(pages.len(), 1);
    assert!(contains(&pages[0], "No completed applications found"));
    assert!(!contains(&pages[0], "Acme Vineyards"));
    Ok(())
}

#[tokio::test]
async fn long_reports_paginate_with_totals_in_every_footer() -> Result<()> {
    let app = TestApp::new();
    let who = applicator();
    for day in 1..=20 {
        let c = customer(&format!("Customer {:02}", day));
        app.insert(app.tenant_id, ApplicationStatus::Completed, application(&c, &who, at(5, day, 10)));
    }

    let res = app.get(&format!("/api/reports/TX/pdf?{}", MAY), Some(&app.token())).await?;
    let pages = page_contents(&body_bytes(res).await?)?;
    let total = pages.len();
    assert!(total > 1);

    for (i, page) in pages.iter().enumerate() {
        assert!(contains(page, &format!("Page {} of {}", i + 1, total)));
    }
    // By-date grouping puts the newest day first
    assert!(contains(&pages[0], "Monday, May 20, 2024"));
    Ok(())
}
