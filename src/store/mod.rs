pub mod json;

pub use json::JsonFileStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Path;
use crate::error::StoreError;

/// Result type for route library operations
pub type StoreResult<T> = Result<T, StoreError>;

/// How the route was travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMethod {
    #[default]
    Driving,
    Transit,
}

/// A route saved for replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRoute {
    /// Origin as the user entered it
    pub from: String,
    /// Destination as the user entered it
    pub to: String,
    pub travel_method: TravelMethod,
    /// Model drawn on this route, if any
    pub model_url: Option<String>,
    pub path: Path,
    pub saved_at: DateTime<Utc>,
}

impl SavedRoute {
    pub fn new(from: &str, to: &str, travel_method: TravelMethod, path: Path) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            travel_method,
            model_url: None,
            path,
            saved_at: Utc::now(),
        }
    }

    /// Library key: origin and destination joined by `;`
    pub fn name(&self) -> String {
        route_name(&self.from, &self.to)
    }
}

pub fn route_name(from: &str, to: &str) -> String {
    format!("{};{}", from, to)
}

/// A 3D model available for simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub name: String,
    pub url: String,
    pub travel_method: TravelMethod,
}

impl SavedModel {
    /// Name the model after the file stem of its URL
    pub fn from_url(url: &str, travel_method: TravelMethod) -> Self {
        Self {
            name: model_name(url),
            url: url.to_string(),
            travel_method,
        }
    }
}

/// `https://host/models/red_car.dae?v=2` -> `red_car`
pub fn model_name(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let file = without_query.trim_end_matches('/').rsplit('/').next().unwrap_or(without_query);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

/// Storage for custom routes and models
///
/// Saving a route replaces any route with the same origin and destination;
/// saving a model replaces any model with the same URL.
#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn save_route(&self, route: SavedRoute) -> StoreResult<()>;

    async fn load_route(&self, name: &str) -> StoreResult<SavedRoute>;

    async fn list_routes(&self) -> StoreResult<Vec<SavedRoute>>;

    /// Returns whether a route was removed
    async fn delete_route(&self, name: &str) -> StoreResult<bool>;

    async fn save_model(&self, model: SavedModel) -> StoreResult<()>;

    async fn list_models(&self) -> StoreResult<Vec<SavedModel>>;
}
