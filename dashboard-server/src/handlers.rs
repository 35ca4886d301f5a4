use std::sync::Arc;

use actix_web::{get, http::StatusCode, post, web, HttpRequest, HttpResponse, Responder};
use runboard_runtime::RunboardRuntime;
use runboard_sdk::{
    client::{ClientError, ResourceKind, ALL_NAMESPACES},
    command::CommandContext,
    document::RunDocumentError,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::actors::ws_handler;
use crate::routing::ResourceDescriptor;

const VALIDATION_ERROR_TITLE: &str = "Please fix errors, then resubmit";
const DEFAULT_EDITOR_KIND: &str = "pipelinerun";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(version_handler)
        .service(editor_handler)
        .service(create_handler)
        .route("/ws", web::get().to(ws_handler))
        .route("/api/{tail:.*}", web::get().to(api_handler));
}

fn message(status: StatusCode, title: Option<&str>, message: impl Into<String>) -> HttpResponse {
    let mut body = json!({ "message": message.into() });
    if let Some(title) = title {
        body["title"] = json!(title);
    }

    HttpResponse::build(status).json(body)
}

/// Presents a failed command: invalid documents are the caller's fault, API
/// errors keep their upstream status, anything else is ours.
fn error_response(err: &anyhow::Error, title: &str) -> HttpResponse {
    if let Some(e) = err.downcast_ref::<RunDocumentError>() {
        return message(StatusCode::BAD_REQUEST, Some(VALIDATION_ERROR_TITLE), e.to_string());
    }

    if let Some(e) = err.downcast_ref::<ClientError>() {
        let status = e.status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        return message(status, Some(title), e.to_string());
    }

    tracing::error!("Command failed: {:#}", err);
    message(StatusCode::INTERNAL_SERVER_ERROR, Some(title), format!("{:#}", err))
}

fn resolve_kind(alias: &str) -> Result<ResourceKind, HttpResponse> {
    ResourceKind::from_alias(alias)
        .ok_or_else(|| message(StatusCode::NOT_FOUND, None, format!("Unknown resource type: {}", alias)))
}

#[get("/version")]
async fn version_handler(runtime: web::Data<Arc<RunboardRuntime>>) -> impl Responder {
    let mut ctx = CommandContext::new("version");

    match runtime.execute(&mut ctx).await {
        Ok(Some(result)) => HttpResponse::Ok().json(result),
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct EditorQuery {
    kind: Option<String>,
    name: Option<String>,
    namespace: Option<String>,
}

/// The document shown in the editor: the re-run document of `name`, or an
/// empty document when no run was picked.
#[get("/api/editor")]
async fn editor_handler(
    runtime: web::Data<Arc<RunboardRuntime>>,
    query: web::Query<EditorQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let alias = query.kind.unwrap_or_else(|| DEFAULT_EDITOR_KIND.to_string());
    let kind = match resolve_kind(&alias) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let default_namespace = &runtime.config().default_namespace;
    let namespace = query.namespace
        .filter(|ns| !ns.is_empty())
        .or_else(|| (default_namespace != ALL_NAMESPACES).then(|| default_namespace.clone()))
        .unwrap_or_default();

    let Some(name) = query.name.filter(|n| !n.is_empty()) else {
        return HttpResponse::Ok().json(json!({
            "kind": kind.kind,
            "namespace": namespace,
            "name": "",
            "document": "",
        }));
    };

    if namespace.is_empty() {
        return message(StatusCode::BAD_REQUEST, None, "Namespace cannot be empty");
    }

    let mut ctx = CommandContext::new("rerun")
        .with_param("resource", alias)
        .with_param("name", name.as_str())
        .with_namespace(namespace.as_str());

    match runtime.execute(&mut ctx).await {
        Ok(Some(result)) => HttpResponse::Ok().json(json!({
            "kind": result["kind"],
            "namespace": namespace,
            "name": name,
            "document": result["document"],
        })),
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e, &format!("Error loading {}", kind.kind)),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    document: String,
}

#[post("/api/{kind}/create")]
async fn create_handler(
    runtime: web::Data<Arc<RunboardRuntime>>,
    path: web::Path<String>,
    body: web::Json<CreateRequest>,
) -> HttpResponse {
    let alias = path.into_inner();
    let kind = match resolve_kind(&alias) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let mut ctx = CommandContext::new("create")
        .with_param("resource", alias)
        .with_param("document", body.into_inner().document);

    match runtime.execute(&mut ctx).await {
        Ok(Some(created)) => {
            let namespace = created.get("metadata")
                .and_then(|m| m.get("namespace"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let plural = ResourceKind::from_object(&created)
                .map(|k| k.plural)
                .unwrap_or(kind.plural);

            tracing::info!(activity_id = %ctx.activity_id, "Created {} in {}", kind.kind, namespace);

            HttpResponse::Created().json(json!({
                "resource": created,
                "redirect": format!("/namespaces/{}/{}", namespace, plural),
            }))
        },
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e, &format!("Error creating {}", kind.kind)),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "labelSelector")]
    label_selector: Option<String>,
}

async fn api_handler(
    runtime: web::Data<Arc<RunboardRuntime>>,
    req: HttpRequest,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let descriptor = match ResourceDescriptor::parse(req.path()) {
        Ok(descriptor) => descriptor,
        Err(e) => return message(StatusCode::BAD_REQUEST, None, format!("Invalid path: {}, {}", req.path(), e)),
    };

    let kind = match resolve_kind(&descriptor.resource) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let mut ctx = match descriptor.name {
        Some(name) => {
            let Some(namespace) = descriptor.namespace else {
                return message(StatusCode::BAD_REQUEST, None, "Namespace cannot be empty");
            };

            CommandContext::new("get")
                .with_param("resource", descriptor.resource)
                .with_param("name", name)
                .with_namespace(namespace)
        },
        None => {
            let filters: Vec<String> = query.label_selector
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();

            CommandContext::new("list")
                .with_param("resource", descriptor.resource)
                .with_param("filters", filters)
                .with_namespace(descriptor.namespace.unwrap_or_else(|| ALL_NAMESPACES.to_string()))
        },
    };

    match runtime.execute(&mut ctx).await {
        Ok(Some(result)) => HttpResponse::Ok().json(result),
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e, &format!("Error loading {}", kind.plural)),
    }
}
