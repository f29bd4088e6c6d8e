//! 3D model import.
//!
//! Files are validated up front (extension and size), then parsed on a worker
//! thread. A load that fails or runs past the timeout resolves to a
//! placeholder instead of an error so the surrounding scene keeps working.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_JSON_CHUNK: u32 = 0x4E4F_534A;

/// Import errors.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported model format: {0:?} (expected .gltf, .glb or .obj)")]
    UnsupportedFormat(String),
    #[error("Model is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse model: {0}")]
    Parse(String),
    #[error("Model load timed out after {0:?}")]
    Timeout(Duration),
    #[error("Model loader stopped without a result")]
    Disconnected,
}

/// Accepted model formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    Gltf,
    Glb,
    Obj,
}

impl ModelFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "gltf" => Some(ModelFormat::Gltf),
            "glb" => Some(ModelFormat::Glb),
            "obj" => Some(ModelFormat::Obj),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ModelFormat::Gltf => "gltf",
            ModelFormat::Glb => "glb",
            ModelFormat::Obj => "obj",
        }
    }
}

/// Format implied by a file name's extension.
pub fn model_format(name: &str) -> Result<ModelFormat, ImportError> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ModelFormat::from_extension)
        .ok_or_else(|| ImportError::UnsupportedFormat(name.to_string()))
}

/// Check a user-supplied file before reading it.
pub fn validate_model_file(name: &str, size: u64, max_bytes: u64) -> Result<ModelFormat, ImportError> {
    let format = model_format(name)?;
    if size > max_bytes {
        return Err(ImportError::TooLarge { size, max: max_bytes });
    }
    Ok(format)
}

/// A loaded model, reduced to what the scene needs for placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    pub name: String,
    pub format: ModelFormat,
    pub vertex_count: usize,
    pub min: Vec3,
    pub max: Vec3,
}

impl ModelNode {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Offset that puts the model's base center on the ground origin.
    pub fn ground_offset(&self) -> Vec3 {
        let center = (self.min + self.max) / 2.0;
        Vec3::new(-center.x, -self.min.y, -center.z)
    }
}

/// Parses model bytes. Runs on a worker thread.
pub trait ModelLoader: Send + Sync {
    fn load(&self, name: &str, format: ModelFormat, bytes: &[u8]) -> Result<ModelNode, ImportError>;
}

/// Built-in loader that extracts vertex count and bounds.
///
/// OBJ is read from its `v` records. glTF and GLB use the POSITION accessors'
/// `min`/`max`, which the format requires writers to fill in.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundsLoader;

impl ModelLoader for BoundsLoader {
    fn load(&self, name: &str, format: ModelFormat, bytes: &[u8]) -> Result<ModelNode, ImportError> {
        let (vertex_count, min, max) = match format {
            ModelFormat::Obj => obj_bounds(bytes)?,
            ModelFormat::Gltf => gltf_bounds(bytes)?,
            ModelFormat::Glb => gltf_bounds(glb_json_chunk(bytes)?)?,
        };
        Ok(ModelNode {
            name: name.to_string(),
            format,
            vertex_count,
            min,
            max,
        })
    }
}

fn obj_bounds(bytes: &[u8]) -> Result<(usize, Vec3, Vec3), ImportError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ImportError::Parse(e.to_string()))?;
    let mut count = 0;
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("v") {
            continue;
        }
        let mut coords = [0.0f32; 3];
        for coord in &mut coords {
            *coord = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ImportError::Parse(format!("bad vertex on line {}", line_no + 1)))?;
        }
        let v = Vec3::from_array(coords);
        min = min.min(v);
        max = max.max(v);
        count += 1;
    }
    if count == 0 {
        return Err(ImportError::Parse("no vertices".into()));
    }
    Ok((count, min, max))
}

#[derive(Deserialize)]
struct GltfDocument {
    #[serde(default)]
    accessors: Vec<GltfAccessor>,
    #[serde(default)]
    meshes: Vec<GltfMesh>,
}

#[derive(Deserialize)]
struct GltfAccessor {
    count: usize,
    #[serde(default)]
    min: Option<[f32; 3]>,
    #[serde(default)]
    max: Option<[f32; 3]>,
}

#[derive(Deserialize)]
struct GltfMesh {
    primitives: Vec<GltfPrimitive>,
}

#[derive(Deserialize)]
struct GltfPrimitive {
    attributes: std::collections::HashMap<String, usize>,
}

fn gltf_bounds(json: &[u8]) -> Result<(usize, Vec3, Vec3), ImportError> {
    let doc: GltfDocument = serde_json::from_slice(json).map_err(|e| ImportError::Parse(e.to_string()))?;
    let mut count = 0;
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    let positions = doc
        .meshes
        .iter()
        .flat_map(|mesh| &mesh.primitives)
        .filter_map(|prim| prim.attributes.get("POSITION"));
    for &accessor_index in positions {
        let accessor = doc
            .accessors
            .get(accessor_index)
            .ok_or_else(|| ImportError::Parse(format!("missing accessor {accessor_index}")))?;
        let (Some(lo), Some(hi)) = (accessor.min, accessor.max) else {
            return Err(ImportError::Parse(format!("accessor {accessor_index} has no bounds")));
        };
        min = min.min(Vec3::from_array(lo));
        max = max.max(Vec3::from_array(hi));
        count += accessor.count;
    }
    if count == 0 {
        return Err(ImportError::Parse("no mesh positions".into()));
    }
    Ok((count, min, max))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let chunk = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

fn glb_json_chunk(bytes: &[u8]) -> Result<&[u8], ImportError> {
    if bytes.get(0..4) != Some(GLB_MAGIC.as_slice()) {
        return Err(ImportError::Parse("missing glTF magic".into()));
    }
    let truncated = || ImportError::Parse("truncated GLB header".into());
    let length = read_u32(bytes, 12).ok_or_else(truncated)? as usize;
    let kind = read_u32(bytes, 16).ok_or_else(truncated)?;
    if kind != GLB_JSON_CHUNK {
        return Err(ImportError::Parse("first GLB chunk is not JSON".into()));
    }
    bytes.get(20..20 + length).ok_or_else(truncated)
}

/// Final result of a load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(ModelNode),
    /// Shown in place of the model; `reason` is surfaced to the user.
    Placeholder { reason: String },
}

/// A load running on a worker thread.
#[derive(Debug)]
pub struct LoadHandle {
    receiver: mpsc::Receiver<Result<ModelNode, ImportError>>,
    cancelled: Arc<AtomicBool>,
    timeout: Duration,
    started: Instant,
}

impl LoadHandle {
    /// Ignore whatever the worker produces from now on.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Block until the load resolves or the timeout, counted from when the
    /// load started, runs out. Returns `None` if it was cancelled.
    pub fn wait(self) -> Option<LoadOutcome> {
        let remaining = self.timeout.saturating_sub(self.started.elapsed());
        let result = match self.receiver.recv_timeout(remaining) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ImportError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ImportError::Disconnected),
        };
        if self.is_cancelled() {
            log::debug!("Dropping result of cancelled model load");
            return None;
        }
        Some(match result {
            Ok(node) => {
                log::info!("Loaded model {} ({} vertices)", node.name, node.vertex_count);
                LoadOutcome::Loaded(node)
            }
            Err(err) => {
                log::warn!("Model load failed: {err}");
                LoadOutcome::Placeholder { reason: err.to_string() }
            }
        })
    }
}

/// Start parsing `bytes` on a worker thread.
pub fn load_model(
    loader: Arc<dyn ModelLoader>,
    name: impl Into<String>,
    format: ModelFormat,
    bytes: Vec<u8>,
    timeout: Duration,
) -> LoadHandle {
    let started = Instant::now();
    let (sender, receiver) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    let guard = Arc::clone(&cancelled);
    let name = name.into();
    std::thread::spawn(move || {
        let result = loader.load(&name, format, &bytes);
        if !guard.load(Ordering::SeqCst) {
            // The receiver may already be gone after a timeout.
            let _ = sender.send(result);
        }
    });
    LoadHandle {
        receiver,
        cancelled,
        started,
        timeout,
    }
}

/// Validate, read and start loading a model file from disk.
pub fn import_model_file(
    path: impl AsRef<Path>,
    loader: Arc<dyn ModelLoader>,
    max_bytes: u64,
    timeout: Duration,
) -> Result<LoadHandle, ImportError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    model_format(&name)?;
    let size = std::fs::metadata(path)?.len();
    let format = validate_model_file(&name, size, max_bytes)?;
    let bytes = std::fs::read(path)?;
    log::info!("Importing {name} ({size} bytes, {})", format.extension());
    Ok(load_model(loader, name, format, bytes, timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MAX: u64 = 50 * 1024 * 1024;

    #[test]
    fn test_validate_accepts_known_extensions() {
        assert_eq!(validate_model_file("chair.gltf", 10, MAX).unwrap(), ModelFormat::Gltf);
        assert_eq!(validate_model_file("CHAIR.GLB", 10, MAX).unwrap(), ModelFormat::Glb);
        assert_eq!(validate_model_file("dir/teapot.obj", MAX, MAX).unwrap(), ModelFormat::Obj);
    }

    #[test]
    fn test_validate_rejects_unknown_and_oversized() {
        assert!(matches!(
            validate_model_file("scene.fbx", 10, MAX),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            validate_model_file("noext", 10, MAX),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            validate_model_file("big.glb", MAX + 1, MAX),
            Err(ImportError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_obj_bounds() {
        let obj = b"# cube corner\nv 0 0 0\nv 1 2 3\nvn 0 1 0\nv -1 0.5 0\nf 1 2 3\n";
        let node = BoundsLoader.load("c.obj", ModelFormat::Obj, obj).unwrap();
        assert_eq!(node.vertex_count, 3);
        assert_eq!(node.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(node.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.ground_offset(), Vec3::new(0.0, 0.0, -1.5));
    }

    #[test]
    fn test_obj_bad_vertex() {
        let err = BoundsLoader.load("c.obj", ModelFormat::Obj, b"v 1 two 3\n").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    const GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0, "NORMAL": 1 } }] }],
        "accessors": [
            { "count": 24, "min": [-1, 0, -1], "max": [1, 2, 1] },
            { "count": 24 }
        ]
    }"#;

    #[test]
    fn test_gltf_bounds() {
        let node = BoundsLoader.load("box.gltf", ModelFormat::Gltf, GLTF.as_bytes()).unwrap();
        assert_eq!(node.vertex_count, 24);
        assert_eq!(node.size(), Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_glb_json_chunk() {
        let json = GLTF.as_bytes();
        let mut glb = Vec::new();
        glb.extend_from_slice(GLB_MAGIC);
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&((20 + json.len()) as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(&GLB_JSON_CHUNK.to_le_bytes());
        glb.extend_from_slice(json);
        let node = BoundsLoader.load("box.glb", ModelFormat::Glb, &glb).unwrap();
        assert_eq!(node.vertex_count, 24);

        let err = BoundsLoader.load("box.glb", ModelFormat::Glb, b"nope").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    struct SlowLoader(Duration);

    impl ModelLoader for SlowLoader {
        fn load(&self, name: &str, format: ModelFormat, _bytes: &[u8]) -> Result<ModelNode, ImportError> {
            std::thread::sleep(self.0);
            Ok(ModelNode {
                name: name.to_string(),
                format,
                vertex_count: 1,
                min: Vec3::ZERO,
                max: Vec3::ONE,
            })
        }
    }

    #[test]
    fn test_load_resolves() {
        let handle = load_model(
            Arc::new(SlowLoader(Duration::ZERO)),
            "m.obj",
            ModelFormat::Obj,
            Vec::new(),
            Duration::from_secs(5),
        );
        assert!(matches!(handle.wait(), Some(LoadOutcome::Loaded(node)) if node.name == "m.obj"));
    }

    #[test]
    fn test_timeout_becomes_placeholder() {
        let handle = load_model(
            Arc::new(SlowLoader(Duration::from_millis(500))),
            "m.obj",
            ModelFormat::Obj,
            Vec::new(),
            Duration::from_millis(10),
        );
        match handle.wait() {
            Some(LoadOutcome::Placeholder { reason }) => assert!(reason.contains("timed out")),
            other => panic!("expected placeholder, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_failure_becomes_placeholder() {
        let handle = load_model(
            Arc::new(BoundsLoader),
            "empty.obj",
            ModelFormat::Obj,
            b"# nothing\n".to_vec(),
            Duration::from_secs(5),
        );
        assert!(matches!(handle.wait(), Some(LoadOutcome::Placeholder { .. })));
    }

    #[test]
    fn test_cancelled_load_is_ignored() {
        let handle = load_model(
            Arc::new(SlowLoader(Duration::from_millis(20))),
            "m.obj",
            ModelFormat::Obj,
            Vec::new(),
            Duration::from_secs(5),
        );
        handle.cancel();
        assert!(handle.wait().is_none());
    }

    #[test]
    fn test_timeout_counts_from_spawn() {
        let handle = load_model(
            Arc::new(SlowLoader(Duration::from_millis(400))),
            "m.obj",
            ModelFormat::Obj,
            Vec::new(),
            Duration::from_millis(200),
        );
        // Waiting late must not extend the limit past 200ms after spawn.
        std::thread::sleep(Duration::from_millis(300));
        assert!(matches!(handle.wait(), Some(LoadOutcome::Placeholder { .. })));
    }

    #[test]
    fn test_import_checks_extension_before_touching_disk() {
        let err = import_model_file("missing/model.fbx", Arc::new(BoundsLoader), MAX, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
        let err = import_model_file("missing/model.obj", Arc::new(BoundsLoader), MAX, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[test]
    fn test_import_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        writeln!(file, "v 0 0 0\nv 1 1 1").unwrap();
        let handle = import_model_file(file.path(), Arc::new(BoundsLoader), MAX, Duration::from_secs(5)).unwrap();
        assert!(matches!(handle.wait(), Some(LoadOutcome::Loaded(node)) if node.vertex_count == 2));

        let err = import_model_file(file.path(), Arc::new(BoundsLoader), 1, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ImportError::TooLarge { .. }));
    }
}
