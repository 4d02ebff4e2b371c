//! Asset ingestion for the collision registry.
//!
//! Meshes arrive already reduced to positions/indices (or plain boxes); parsing
//! glTF and drawing anything is the renderer's business. Each asset is a
//! separate load whose failure only drops that asset's colliders.

use std::future::Future;
use std::path::PathBuf;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{Aabb, Collider, ColliderKind, CollisionWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRole {
    /// Blocks movement.
    Collider,
    /// Snapped onto by the downward ground probe.
    WalkableSurface,
    /// Render-only; never registered.
    Decoration,
}

impl AssetRole {
    pub fn collider_kind(self) -> Option<ColliderKind> {
        match self {
            AssetRole::Collider => Some(ColliderKind::Blocking),
            AssetRole::WalkableSurface => Some(ColliderKind::Walkable),
            AssetRole::Decoration => None,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "collider" => Some(AssetRole::Collider),
            "walkable_surface" => Some(AssetRole::WalkableSurface),
            "decoration" => Some(AssetRole::Decoration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub path: String,
    pub role: AssetRole,
    /// Applied to every vertex, like a model root offset.
    #[serde(default)]
    pub offset: Vec3,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Shorthand for a closed box; takes precedence over `positions`.
    pub cuboid: Option<Aabb>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadedAsset {
    pub meshes: Vec<MeshData>,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed asset {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("fetch of {path} failed: {message}")]
    Fetch { path: String, message: String },
    #[error("mesh '{name}' is malformed: {reason}")]
    MalformedMesh { name: String, reason: String },
}

impl MeshData {
    pub fn to_collider(&self, offset: Vec3) -> Result<Collider, AssetError> {
        let malformed = |reason: &str| AssetError::MalformedMesh {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        let collider = match self.cuboid {
            Some(bounds) => {
                if !bounds.is_valid() {
                    return Err(malformed("cuboid must be finite with min <= max"));
                }
                Collider::cuboid(self.name.clone(), bounds)
            }
            None => {
                if self.positions.is_empty() {
                    return Err(malformed("no positions"));
                }
                if self.positions.iter().any(|p| !p.is_finite()) {
                    return Err(malformed("non-finite position"));
                }
                if self.indices.len() % 3 != 0 {
                    return Err(malformed("index count is not a multiple of 3"));
                }
                if self.indices.iter().any(|&i| i as usize >= self.positions.len()) {
                    return Err(malformed("index out of range"));
                }
                Collider::new(self.name.clone(), self.positions.clone(), self.indices.clone())
            }
        };
        Ok(collider.translated(offset))
    }
}

impl LoadedAsset {
    pub fn from_json(path: &str, text: &str) -> Result<Self, AssetError> {
        serde_json::from_str(text).map_err(|source| AssetError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

/// Where asset payloads come from. Implementations only fetch and decode;
/// registration happens in the completion step.
pub trait AssetSource {
    fn load(&self, descriptor: &AssetDescriptor) -> impl Future<Output = Result<LoadedAsset, AssetError>>;
}

/// Reads JSON mesh files from disk.
#[derive(Debug, Clone, Default)]
pub struct FsAssetSource;

impl AssetSource for FsAssetSource {
    fn load(&self, descriptor: &AssetDescriptor) -> impl Future<Output = Result<LoadedAsset, AssetError>> {
        let path = descriptor.path.clone();
        async move {
            let text = std::fs::read_to_string(&path).map_err(|source| AssetError::Io {
                path: PathBuf::from(&path),
                source,
            })?;
            LoadedAsset::from_json(&path, &text)
        }
    }
}

/// Completion step: append an asset's meshes to the registry.
/// Returns how many colliders were added.
pub fn register_asset(world: &mut CollisionWorld, descriptor: &AssetDescriptor, asset: &LoadedAsset) -> usize {
    let Some(kind) = descriptor.role.collider_kind() else {
        debug!(path = %descriptor.path, "decoration asset, nothing to register");
        return 0;
    };
    let mut added = 0;
    for mesh in &asset.meshes {
        match mesh.to_collider(descriptor.offset) {
            Ok(collider) => {
                world.insert(kind, collider);
                added += 1;
            }
            Err(err) => warn!(path = %descriptor.path, %err, "skipping mesh"),
        }
    }
    info!(path = %descriptor.path, role = ?descriptor.role, added, "asset registered");
    added
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: usize,
    pub colliders: usize,
}

/// Load every descriptor in turn. A failed load is logged and skipped.
pub async fn load_scene_assets<S: AssetSource>(
    source: &S,
    descriptors: &[AssetDescriptor],
    world: &mut CollisionWorld,
) -> LoadReport {
    let mut report = LoadReport::default();
    for descriptor in descriptors {
        match source.load(descriptor).await {
            Ok(asset) => {
                report.loaded += 1;
                report.colliders += register_asset(world, descriptor, &asset);
            }
            Err(err) => {
                report.failed += 1;
                warn!(path = %descriptor.path, %err, "asset load failed");
            }
        }
    }
    report
}
