pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;

use crate::assistant::handlers as assistant;
use crate::autosave::handlers as autosave;
use crate::documents::handlers as documents;
use crate::export::handlers as export;
use crate::settings;
use crate::state::AppState;
use crate::templates;
use crate::versions::handlers as versions;

/// Body of operations that may target an unknown identifier.
#[derive(Debug, Serialize)]
pub struct Applied {
    pub applied: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Live CV and saved CVs
        .route(
            "/api/v1/cv",
            get(documents::handle_get_cv).patch(documents::handle_update_cv),
        )
        .route("/api/v1/cv/save", post(documents::handle_save_cv))
        .route("/api/v1/cv/reset", post(documents::handle_reset_cv))
        .route("/api/v1/cv/export", get(documents::handle_export_cv))
        .route("/api/v1/cvs", get(documents::handle_list_cvs))
        .route("/api/v1/cvs/:id/load", post(documents::handle_load_cv))
        .route("/api/v1/cvs/:id", delete(documents::handle_delete_cv))
        // Cover letters
        .route(
            "/api/v1/letter",
            get(documents::handle_get_letter).patch(documents::handle_update_letter),
        )
        .route("/api/v1/letter/save", post(documents::handle_save_letter))
        .route("/api/v1/letter/reset", post(documents::handle_reset_letter))
        .route("/api/v1/letters", get(documents::handle_list_letters))
        .route(
            "/api/v1/letters/:id/load",
            post(documents::handle_load_letter),
        )
        .route("/api/v1/letters/:id", delete(documents::handle_delete_letter))
        // Version history
        .route(
            "/api/v1/versions",
            get(versions::handle_version_history).post(versions::handle_create_version),
        )
        .route("/api/v1/versions/latest", get(versions::handle_latest_version))
        .route("/api/v1/versions/prune", post(versions::handle_prune_versions))
        .route(
            "/api/v1/versions/:id/restore",
            post(versions::handle_restore_version),
        )
        .route("/api/v1/versions/:id", delete(versions::handle_delete_version))
        // Autosave
        .route(
            "/api/v1/autosave",
            get(autosave::handle_autosave_status).put(autosave::handle_set_autosave),
        )
        .route("/api/v1/autosave/flush", post(autosave::handle_flush))
        .route("/api/v1/autosave/exit-guard", get(autosave::handle_exit_guard))
        // Backup and export
        .route(
            "/api/v1/backup",
            get(export::handle_export_backup).post(export::handle_import_backup),
        )
        .route("/api/v1/export/pdf", post(export::handle_export_pdf))
        .route("/api/v1/export/status", get(export::handle_export_status))
        // Writing suggestions
        .route("/api/v1/ai/suggestions", post(assistant::handle_suggest))
        // Preferences and auth
        .route(
            "/api/v1/preferences",
            get(settings::handle_get_preferences).put(settings::handle_set_preferences),
        )
        .route(
            "/api/v1/preferences/theme/toggle",
            post(settings::handle_toggle_theme),
        )
        .route("/api/v1/auth", get(settings::handle_get_auth))
        .route("/api/v1/auth/login", post(settings::handle_login))
        .route("/api/v1/auth/logout", post(settings::handle_logout))
        .route("/api/v1/templates", get(templates::handle_templates))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::assistant::CannedAssistant;
    use crate::autosave::{self, AutosaveConfig};
    use crate::config::{Config, StorageBackend};
    use crate::storage::MemoryBlobStore;
    use crate::workspace::Workspace;

    async fn app() -> Router {
        let workspace = Arc::new(
            Workspace::hydrate(Arc::new(MemoryBlobStore::default()), 50)
                .await
                .unwrap(),
        );
        let autosave = autosave::spawn(
            workspace.clone(),
            AutosaveConfig {
                enabled: false,
                delay: Duration::from_millis(2000),
            },
        )
        .await;
        let config = Config {
            storage: StorageBackend::Fs {
                data_dir: PathBuf::from("./data"),
            },
            autosave_enabled: false,
            autosave_delay: Duration::from_millis(2000),
            max_versions: 50,
            ai_latency_scale: 0.0,
            port: 0,
            rust_log: "info".to_string(),
        };
        build_router(AppState {
            workspace,
            autosave,
            assistant: Arc::new(CannedAssistant::new(0.0)),
            config,
        })
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "procv-api");
        assert_eq!(body["storage"], "fs");
    }

    #[tokio::test]
    async fn test_edit_save_and_version_flow() {
        let app = app().await;

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/api/v1/cv",
            Some(json!({"op": "add_experience", "value": {"company": "Initech"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], true);
        let exp_id = body["entryId"].as_str().unwrap().to_string();
        assert!(exp_id.starts_with("exp-"));

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/v1/cv",
            Some(json!({
                "op": "update_experience",
                "id": exp_id,
                "value": {"current": true, "endDate": "2020-01"}
            })),
        )
        .await;
        assert_eq!(body["applied"], true);

        let (_, cv) = call(&app, Method::GET, "/api/v1/cv", None).await;
        assert_eq!(cv["experiences"][0]["current"], true);
        assert!(cv["experiences"][0].get("endDate").map_or(true, Value::is_null));

        let (status, saved) = call(
            &app,
            Method::POST,
            "/api/v1/cv/save",
            Some(json!({"title": "My CV"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = saved["id"].as_str().unwrap();
        assert!(id.starts_with("cv-"));

        let (_, list) = call(&app, Method::GET, "/api/v1/cvs", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["title"], "My CV");

        let (_, history) = call(&app, Method::GET, "/api/v1/versions", None).await;
        assert_eq!(history["versions"].as_array().unwrap().len(), 1);
        assert_eq!(history["versions"][0]["isAutoSave"], false);
        assert_eq!(history["versions"][0]["id"], saved["versionId"]);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_errors() {
        let app = app().await;

        let (status, body) = call(&app, Method::DELETE, "/api/v1/cvs/cv-nope", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);

        let (status, body) = call(&app, Method::POST, "/api/v1/cvs/cv-nope/load", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());

        let (status, body) =
            call(&app, Method::POST, "/api/v1/versions/v-nope/restore", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/v1/cv",
            Some(json!({"op": "remove_skill", "id": "skill-nope"})),
        )
        .await;
        assert_eq!(body["applied"], false);
    }

    #[tokio::test]
    async fn test_backup_import_rejects_foreign_json() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/backup")
            .body(Body::from(r#"{"foo": 1}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let (status, backup) = call(&app, Method::GET, "/api/v1/backup", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(backup["version"], "1.0");
        assert!(backup["data"]["personalInfo"].is_object());
    }

    #[tokio::test]
    async fn test_pdf_export_rejects_empty_preview() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/export/pdf",
            Some(json!({"imageWidthPx": 0, "imageHeightPx": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, status) = call(&app, Method::GET, "/api/v1/export/status", None).await;
        assert_eq!(status["isExporting"], false);
    }

    #[tokio::test]
    async fn test_suggestion_and_exit_guard() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/ai/suggestions",
            Some(json!({"type": "skill", "industry": "Technology"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "skill");

        let (_, guard) = call(&app, Method::GET, "/api/v1/autosave/exit-guard", None).await;
        assert_eq!(guard["requiresConfirmation"], false);

        call(
            &app,
            Method::PATCH,
            "/api/v1/cv",
            Some(json!({"op": "summary", "value": "draft"})),
        )
        .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let (_, guard) = call(&app, Method::GET, "/api/v1/autosave/exit-guard", None).await;
        assert_eq!(guard["requiresConfirmation"], true);
    }
}
