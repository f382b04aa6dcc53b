//! HTTP routes and handlers for the blocktrack daemon API.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use anyhow::{bail, Context, Result};
use blocktrack_core::{commits, costume_diff, CostumeChange, Snapshot};

use super::state::{AppState, ProjectEvent};
use super::websocket::websocket_handler;
use crate::archive;
use crate::config::ProjectEntry;
use crate::git::GitRepo;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health))
        // Project lifecycle
        .route("/create_project", get(create_project))
        .route("/:project/unzip", get(unzip))
        .route("/:project/commit", get(commit))
        .route("/:project/commits", get(commit_history))
        .route("/:project/push", get(push))
        .route("/:project/sprites", get(sprites))
        // WebSocket for companion-client notifications
        .route("/ws", get(websocket_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    duration_ms: u64,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T, start: Instant) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn err(error: impl ToString, start: Instant) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "blocktrack-daemon"
    }))
}

// =============================================================================
// Helpers
// =============================================================================

/// Clone the registry entry for a project, or fail for unknown names.
async fn lookup(state: &AppState, project: &str) -> Result<ProjectEntry> {
    let registry = state.registry.read().await;
    registry
        .get(project)
        .cloned()
        .with_context(|| format!("unknown project `{}`", project))
}

/// Read and parse one snapshot file.
fn read_snapshot(path: &PathBuf) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let data = serde_json::from_str(&raw)
        .with_context(|| format!("invalid snapshot {}", path.display()))?;
    Ok(Snapshot::new(data))
}

// =============================================================================
// Project lifecycle handlers
// =============================================================================

#[derive(Deserialize)]
struct CreateParams {
    file_name: String,
}

async fn create_project(
    State(state): State<AppState>,
    Query(params): Query<CreateParams>,
) -> impl IntoResponse {
    let start = Instant::now();
    match create_project_inner(&state, &params.file_name).await {
        Ok(data) => ApiResponse::ok(data, start),
        Err(err) => ApiResponse::err(format!("{:#}", err), start),
    }
}

async fn create_project_inner(state: &AppState, file_name: &str) -> Result<Value> {
    let file_path = PathBuf::from(file_name);
    let stem = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("file_name has no usable stem")?
        .to_string();
    let file_path = file_path.canonicalize().unwrap_or(file_path);

    let mut registry = state.registry.write().await;
    let (name, entry) = registry.register(&stem, &state.workspaces_root, file_path);
    registry.save()?;
    drop(registry);

    fs::create_dir_all(&entry.base)?;
    archive::extract(&entry.project_file, &entry.base)?;
    GitRepo::new(&entry.base).init()?;

    info!("created project `{}` at {}", name, entry.base.display());
    state.broadcast(ProjectEvent::ProjectCreated {
        project: name.clone(),
    });

    Ok(json!({ "project_name": name }))
}

async fn unzip(State(state): State<AppState>, Path(project): Path<String>) -> impl IntoResponse {
    let start = Instant::now();
    match unzip_inner(&state, &project).await {
        Ok(data) => ApiResponse::ok(data, start),
        Err(err) => ApiResponse::err(format!("{:#}", err), start),
    }
}

/// Rotate the current snapshot to `project.old.json` and re-extract the
/// archive.
async fn unzip_inner(state: &AppState, project: &str) -> Result<Value> {
    let entry = lookup(state, project).await?;

    let current = entry.base.join("project.json");
    let previous = entry.base.join("project.old.json");
    if let Err(err) = fs::copy(&current, &previous) {
        // A project that was never unzipped before has no current snapshot.
        if err.kind() != io::ErrorKind::NotFound {
            return Err(err).with_context(|| format!("failed to rotate {}", current.display()));
        }
    }

    archive::extract(&entry.project_file, &entry.base)?;

    state.broadcast(ProjectEvent::SnapshotRotated {
        project: project.to_string(),
    });

    Ok(json!({}))
}

async fn commit(State(state): State<AppState>, Path(project): Path<String>) -> impl IntoResponse {
    let start = Instant::now();
    match commit_inner(&state, &project).await {
        Ok(data) => ApiResponse::ok(data, start),
        Err(err) => ApiResponse::err(format!("{:#}", err), start),
    }
}

/// Diff the two snapshots in a workspace and produce the commit message
/// plus the orphaned costume files. Mutates nothing: a malformed snapshot
/// or an empty diff aborts here, before any deletion or git operation.
fn plan_commit(base: &std::path::Path) -> Result<(String, Vec<CostumeChange>)> {
    let old = read_snapshot(&base.join("project.old.json"))?;
    let new = read_snapshot(&base.join("project.json"))?;

    let lines = commits(&old, &new)?;
    // The raw removal direction names every identity path the new snapshot
    // no longer references, including the old path of a re-keyed costume.
    let orphaned = costume_diff(&new, &old)?;

    if lines.is_empty() {
        bail!("no changes to commit");
    }
    Ok((lines.join(", "), orphaned))
}

/// Unlink orphaned costume files from the workspace.
fn remove_orphaned(base: &std::path::Path, orphaned: &[CostumeChange]) -> Result<()> {
    for change in orphaned {
        if let Err(err) = fs::remove_file(base.join(&change.path)) {
            // Already gone is fine.
            if err.kind() != io::ErrorKind::NotFound {
                return Err(err).with_context(|| format!("failed to unlink {}", change.path));
            }
        }
    }
    Ok(())
}

/// Diff the two snapshots, unlink orphaned costume files, and record a
/// commit.
async fn commit_inner(state: &AppState, project: &str) -> Result<Value> {
    let entry = lookup(state, project).await?;

    let (message, orphaned) = plan_commit(&entry.base)?;
    remove_orphaned(&entry.base, &orphaned)?;

    let repo = GitRepo::new(&entry.base);
    repo.stage_all()?;
    repo.commit(&message)?;

    info!("committed `{}`: {}", project, message);
    state.broadcast(ProjectEvent::Committed {
        project: project.to_string(),
        message: message.clone(),
    });

    Ok(json!({ "message": message }))
}

async fn commit_history(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> impl IntoResponse {
    let start = Instant::now();
    match commit_history_inner(&state, &project).await {
        Ok(data) => ApiResponse::ok(data, start),
        Err(err) => ApiResponse::err(format!("{:#}", err), start),
    }
}

/// Recorded commits for a project, newest first.
async fn commit_history_inner(state: &AppState, project: &str) -> Result<Value> {
    let entry = lookup(state, project).await?;
    let log = GitRepo::new(&entry.base).log()?;
    Ok(json!({ "commits": log }))
}

async fn push(State(state): State<AppState>, Path(project): Path<String>) -> impl IntoResponse {
    let start = Instant::now();
    match push_inner(&state, &project).await {
        Ok(data) => ApiResponse::ok(data, start),
        Err(err) => ApiResponse::err(format!("{:#}", err), start),
    }
}

async fn push_inner(state: &AppState, project: &str) -> Result<Value> {
    let entry = lookup(state, project).await?;
    GitRepo::new(&entry.base).push()?;

    state.broadcast(ProjectEvent::Pushed {
        project: project.to_string(),
    });

    Ok(json!({}))
}

async fn sprites(State(state): State<AppState>, Path(project): Path<String>) -> impl IntoResponse {
    let start = Instant::now();
    match sprites_inner(&state, &project).await {
        Ok(data) => ApiResponse::ok(data, start),
        Err(err) => ApiResponse::err(format!("{:#}", err), start),
    }
}

/// Names of the sprites changed since the last snapshot rotation.
async fn sprites_inner(state: &AppState, project: &str) -> Result<Value> {
    let entry = lookup(state, project).await?;

    let old = read_snapshot(&entry.base.join("project.old.json"))?;
    let new = read_snapshot(&entry.base.join("project.json"))?;

    let sprites: Vec<String> = commits(&old, &new)?
        .iter()
        .map(|line| line.split(':').next().unwrap_or_default().to_string())
        .collect();

    Ok(json!({ "sprites": sprites }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn make_target(name: &str, block_count: usize, costumes: &[(&str, &str)]) -> Value {
        let mut blocks = serde_json::Map::new();
        for i in 0..block_count {
            blocks.insert(format!("block{}", i), json!({"opcode": "event_whenflagclicked"}));
        }
        let costumes: Vec<Value> = costumes
            .iter()
            .map(|(path, name)| json!({"name": name, "md5ext": path}))
            .collect();
        json!({"name": name, "blocks": blocks, "costumes": costumes})
    }

    fn write_snapshot(base: &Path, file: &str, targets: Vec<Value>) {
        let doc = json!({ "targets": targets });
        fs::write(base.join(file), serde_json::to_string(&doc).unwrap()).unwrap();
    }

    #[test]
    fn test_remove_orphaned_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        fs::write(base.join("a1.svg"), "<svg/>").unwrap();

        let orphaned = vec![
            CostumeChange::new("Sprite1", "a1.svg", "cat"),
            CostumeChange::new("Sprite1", "gone.svg", "dog"),
        ];

        remove_orphaned(base, &orphaned).unwrap();
        assert!(!base.join("a1.svg").exists());
    }

    #[test]
    fn test_plan_commit_message_and_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write_snapshot(
            base,
            "project.old.json",
            vec![make_target("Stage", 3, &[("bg1.png", "backdrop1")])],
        );
        write_snapshot(
            base,
            "project.json",
            vec![make_target(
                "Stage",
                5,
                &[("bg2.png", "backdrop1"), ("sfx1.png", "pop")],
            )],
        );

        let (message, orphaned) = plan_commit(base).unwrap();
        assert_eq!(message, "Stage: +2 blocks, add pop, modify backdrop1");
        assert_eq!(orphaned, vec![CostumeChange::new("Stage", "bg1.png", "backdrop1")]);
    }

    #[test]
    fn test_plan_commit_rejects_malformed_snapshot_without_deleting() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write_snapshot(
            base,
            "project.old.json",
            vec![make_target("Stage", 3, &[("bg1.png", "backdrop1")])],
        );
        // Current snapshot lost its blocks map.
        fs::write(
            base.join("project.json"),
            serde_json::to_string(&json!({"targets": [{"name": "Stage"}]})).unwrap(),
        )
        .unwrap();
        fs::write(base.join("bg1.png"), "png").unwrap();

        assert!(plan_commit(base).is_err());
        assert!(base.join("bg1.png").exists());
    }

    #[test]
    fn test_plan_commit_with_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let targets = vec![make_target("Stage", 3, &[("bg1.png", "backdrop1")])];
        write_snapshot(base, "project.old.json", targets.clone());
        write_snapshot(base, "project.json", targets);

        let err = plan_commit(base).unwrap_err();
        assert!(err.to_string().contains("no changes to commit"));
    }
}
