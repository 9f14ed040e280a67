use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{NailShape, PortfolioItem, Service};
use crate::state::AppState;

static INDEX_HTML: &str = include_str!("../web/index.html");
static DASHBOARD_HTML: &str = include_str!("../web/dashboard.html");

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

#[derive(Serialize)]
pub struct ServiceResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub display_price: String,
    pub duration_minutes: i32,
    pub is_active: bool,
}

impl From<Service> for ServiceResponse {
    fn from(s: Service) -> Self {
        let display_price = s.display_price();
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            price_cents: s.price_cents,
            display_price,
            duration_minutes: s.duration_minutes,
            is_active: s.is_active,
        }
    }
}

#[derive(Serialize)]
pub struct PortfolioResponse {
    pub id: i64,
    pub title: String,
    pub image_path: String,
    pub description: String,
    pub nail_shape: Option<&'static str>,
    pub tags: Vec<String>,
    pub featured: bool,
}

impl From<PortfolioItem> for PortfolioResponse {
    fn from(item: PortfolioItem) -> Self {
        let tags = item.tag_list();
        Self {
            id: item.id,
            title: item.title,
            image_path: item.image_path,
            description: item.description,
            nail_shape: item.nail_shape.map(|s| s.as_str()),
            tags,
            featured: item.featured,
        }
    }
}

// GET /api/home
#[derive(Serialize)]
pub struct HomeResponse {
    pub featured: Vec<PortfolioResponse>,
    pub services: Vec<ServiceResponse>,
}

pub async fn get_home(State(state): State<Arc<AppState>>) -> Result<Json<HomeResponse>, AppError> {
    let db = state.db.lock().unwrap();
    let featured = queries::get_featured_portfolio(&db, 6)?;
    let services = queries::get_active_services(&db)?;

    Ok(Json(HomeResponse {
        featured: featured.into_iter().map(Into::into).collect(),
        services: services.into_iter().map(Into::into).collect(),
    }))
}

// GET /api/services
pub async fn get_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let db = state.db.lock().unwrap();
    let services = queries::get_active_services(&db)?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

// GET /api/portfolio
#[derive(Deserialize)]
pub struct PortfolioQuery {
    pub shape: Option<String>,
    pub featured: Option<bool>,
}

pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<Vec<PortfolioResponse>>, AppError> {
    let shape = match query.shape.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            NailShape::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown nail shape: {s}")))?,
        ),
        None => None,
    };

    let db = state.db.lock().unwrap();
    let items = queries::get_portfolio(&db, shape, query.featured.unwrap_or(false))?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}
