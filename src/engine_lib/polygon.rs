// src/engine_lib/polygon.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{self, Vertex};

/// Opaque polygon identifier. Serialised as a plain string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolygonId(String);

impl PolygonId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PolygonId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for PolygonId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredPolygon")]
pub struct Polygon {
    id: PolygonId,
    points: Vec<Vertex>,
    pub name: String,
    created_at: DateTime<Utc>,
}

impl Polygon {
    /// Callers have run `points` through [`geometry::check_ring`].
    pub(crate) fn new(points: Vec<Vertex>, name: String) -> Self {
        debug_assert!(geometry::check_ring(&points).is_ok());
        Self {
            id: PolygonId::fresh(),
            points,
            name,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &PolygonId {
        &self.id
    }

    pub fn points(&self) -> &[Vertex] {
        &self.points
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn area(&self) -> f64 {
        geometry::area(&self.points)
    }

    pub fn perimeter(&self) -> f64 {
        geometry::perimeter(&self.points)
    }

    pub fn centroid(&self) -> Option<Vertex> {
        geometry::centroid(&self.points)
    }

    pub fn contains(&self, point: Vertex) -> bool {
        geometry::contains(&self.points, point)
    }

    pub(crate) fn set_points(&mut self, points: Vec<Vertex>) {
        debug_assert!(geometry::check_ring(&points).is_ok());
        self.points = points;
    }
}

/// Wire shape of a polygon; validated into [`Polygon`] on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPolygon {
    id: PolygonId,
    points: Vec<Vertex>,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoredPolygon> for Polygon {
    type Error = String;

    fn try_from(stored: StoredPolygon) -> Result<Self, Self::Error> {
        if let Err(defect) = geometry::check_ring(&stored.points) {
            return Err(format!("polygon {}: {defect}", stored.id));
        }
        Ok(Self {
            id: stored.id,
            points: stored.points,
            name: stored.name,
            created_at: stored.created_at,
        })
    }
}

/// Shallow field update for [`crate::engine_lib::store::PolygonStore::update`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolygonPatch {
    pub name: Option<String>,
    pub points: Option<Vec<Vertex>>,
}

impl PolygonPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            points: None,
        }
    }

    pub fn reshape(points: Vec<Vertex>) -> Self {
        Self {
            name: None,
            points: Some(points),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.points.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_with_camel_case_and_iso_timestamp() {
        let polygon = Polygon::new(
            vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0), Vertex::new(0.0, 1.0)],
            "Field".into(),
        );
        let json = serde_json::to_value(&polygon).unwrap();
        assert_eq!(json["id"], polygon.id().as_str());
        assert_eq!(json["name"], "Field");
        assert_eq!(json["points"][1]["x"], 1.0);
        let created = json["createdAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[test]
    fn stored_ring_with_two_points_is_rejected() {
        let raw = r#"{"id":"a","points":[{"x":0,"y":0},{"x":1,"y":1}],"name":"bad","createdAt":"2024-01-01T00:00:00Z"}"#;
        let err = serde_json::from_str::<Polygon>(raw).unwrap_err();
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn stored_ring_with_unrepresentable_coordinate_is_rejected() {
        let raw = r#"{"id":"a","points":[{"x":0,"y":0},{"x":1e400,"y":0},{"x":0,"y":1}],"name":"bad","createdAt":"2024-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Polygon>(raw).is_err());
    }

    #[test]
    fn non_finite_stored_ring_fails_conversion() {
        let stored = StoredPolygon {
            id: PolygonId::from("a"),
            points: vec![Vertex::new(0.0, 0.0), Vertex::new(f64::NAN, 0.0), Vertex::new(0.0, 1.0)],
            name: "bad".into(),
            created_at: Utc::now(),
        };
        let err = Polygon::try_from(stored).unwrap_err();
        assert!(err.contains("non-finite"));
    }

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(PolygonId::fresh(), PolygonId::fresh());
    }
}
