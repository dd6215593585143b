#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use spraylog_api::auth::{generate_jwt, Claims};
use spraylog_api::handlers::{self, AppState};
use spraylog_api::report::model::{ApplicatorRef, CustomerRef, TreatedArea, WeatherSnapshot};
use spraylog_api::report::{
    ApplicationRecord, ApplicationStatus, MemoryApplicationSource, ReportGenerator, ReportSettings,
    StoredApplication,
};

/// Router over an in-memory store, plus the ids tests need to address it.
pub struct TestApp {
    pub router: Router,
    pub source: Arc<MemoryApplicationSource>,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

impl TestApp {
    pub fn new() -> Self {
        let source = Arc::new(MemoryApplicationSource::default());
        let generator = ReportGenerator::new(source.clone(), ReportSettings::default());
        let router = handlers::router(AppState::new(generator, false));

        Self {
            router,
            source,
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        }
    }

    pub fn token(&self) -> String {
        token_for(self.tenant_id, self.user_id)
    }

    pub fn insert(&self, tenant_id: Uuid, status: ApplicationStatus, record: ApplicationRecord) {
        self.source
            .insert(StoredApplication {
                tenant_id,
                status,
                record,
            })
            .expect("memory store accepts rows");
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<Response<Body>> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = self.router.clone().oneshot(builder.body(Body::empty())?).await?;
        Ok(response)
    }
}

pub fn token_for(tenant_id: Uuid, user_id: Uuid) -> String {
    generate_jwt(&Claims::new(user_id, tenant_id, "user")).expect("development secret signs tokens")
}

pub async fn body_bytes(response: Response<Body>) -> Result<Vec<u8>> {
    Ok(to_bytes(response.into_body(), usize::MAX).await?.to_vec())
}

pub async fn body_json(response: Response<Body>) -> Result<serde_json::Value> {
    Ok(serde_json::from_slice(&body_bytes(response).await?)?)
}

pub fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap()
}

pub fn customer(name: &str) -> CustomerRef {
    CustomerRef {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: Some("410 Orchard Rd".into()),
        city: Some("Visalia".into()),
        state: Some("CA".into()),
        zip: Some("93291".into()),
    }
}

pub fn applicator() -> ApplicatorRef {
    ApplicatorRef {
        id: Uuid::new_v4(),
        first_name: "Dana".into(),
        last_name: "Reyes".into(),
        license_number: Some("QAL-20411".into()),
        license_state: Some("CA".into()),
    }
}

pub fn application(customer: &CustomerRef, applicator: &ApplicatorRef, applied_at: DateTime<Utc>) -> ApplicationRecord {
    ApplicationRecord {
        id: Uuid::new_v4(),
        applied_at,
        chemical_name: "Talstar P".into(),
        epa_reg_number: Some("279-3206".into()),
        quantity: 2.5,
        unit: "gal".into(),
        target_pest: Some("Ants".into()),
        method: Some("Perimeter spray".into()),
        area: Some(TreatedArea {
            value: 1200.0,
            unit: "sq ft".into(),
        }),
        weather: Some(WeatherSnapshot {
            temperature: Some(72.0),
            humidity: Some(40.0),
            wind_speed: Some(5.0),
            wind_direction: Some("NW".into()),
            condition: Some("Sunny".into()),
        }),
        reentry_interval: Some("Until dry".into()),
        customer_consent: true,
        customer: customer.clone(),
        applicator: applicator.clone(),
    }
}

/// Raw content streams of every page, in page order.
pub fn page_contents(pdf: &[u8]) -> Result<Vec<Vec<u8>>> {
    let doc = lopdf::Document::load_mem(pdf)?;
    let mut pages = Vec::new();
    for (_, page_id) in doc.get_pages() {
        pages.push(doc.get_page_content(page_id)?);
    }
    Ok(pages)
}

pub fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle.as_bytes())
}
