use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, RawQuery, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Id of the seeded administrator that `me` resolves to.
pub const ME_ID: &str = "d57c10f5-639d-5160-9c81-8a0c6c4ec856";
pub const ADMIN_ROLE_ID: &str = "0d6490e8-32e2-4bc6-a7f7-7d8b5e6c8b8e";
pub const USER_ROLE_ID: &str = "a58de6d3-f52c-5080-b79b-a601a647ac85";
/// Group the seeded administrator belongs to.
pub const OPS_GROUP_ID: &str = "469edf9d-ca1e-5003-91d6-3a46755d5a50";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub created: String,
    pub modified: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role_id: String,
    pub active: bool,
    pub deleted: bool,
    pub locale: String,
    pub created: String,
    pub modified: String,
    pub last_logged_in: Option<String>,
    pub profile: Profile,
    pub role: Role,
    #[serde(skip)]
    pub groups: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub role_id: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub profile: ProfileInput,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub role_id: Option<String>,
    pub locale: Option<String>,
    pub profile: Option<ProfileInput>,
}

pub type Db = Arc<RwLock<HashMap<String, User>>>;

pub fn app() -> Router {
    app_with_db(seeded_db())
}

pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route("/users.json", get(list_users).post(create_user))
        .route(
            "/users/{file}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/dry-run.json", delete(delete_user_dry_run))
        .with_state(db)
}

/// Store holding only the administrator `me` resolves to.
pub fn seeded_db() -> Db {
    let now = now();
    let admin = User {
        id: ME_ID.to_string(),
        username: "admin@cipherguard.test".to_string(),
        role_id: ADMIN_ROLE_ID.to_string(),
        active: true,
        deleted: false,
        locale: "en-UK".to_string(),
        created: now.clone(),
        modified: now.clone(),
        last_logged_in: Some(now.clone()),
        profile: Profile {
            id: Uuid::new_v4().to_string(),
            user_id: ME_ID.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
            created: now.clone(),
            modified: now,
        },
        role: Role {
            id: ADMIN_ROLE_ID.to_string(),
            name: "admin".to_string(),
        },
        groups: vec![OPS_GROUP_ID.to_string()],
    };
    let mut users = HashMap::new();
    users.insert(admin.id.clone(), admin);
    Arc::new(RwLock::new(users))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn role(id: &str) -> Option<Role> {
    let name = match id {
        ADMIN_ROLE_ID => "admin",
        USER_ROLE_ID => "user",
        _ => return None,
    };
    Some(Role {
        id: id.to_string(),
        name: name.to_string(),
    })
}

fn envelope(code: StatusCode, uri: &Uri, message: &str, body: Value) -> Response {
    let status = if code.is_success() { "success" } else { "error" };
    let payload = json!({
        "header": {
            "id": Uuid::new_v4().to_string(),
            "status": status,
            "servertime": Utc::now().timestamp(),
            "action": Uuid::new_v4().to_string(),
            "message": message,
            "url": uri.to_string(),
            "code": code.as_u16(),
        },
        "body": body,
    });
    (code, Json(payload)).into_response()
}

fn success(uri: &Uri, body: Value) -> Response {
    envelope(StatusCode::OK, uri, "The operation was successful.", body)
}

fn failure(code: StatusCode, uri: &Uri, message: &str) -> Response {
    envelope(code, uri, message, Value::Null)
}

/// Encode a response body, answering 500 if it cannot be represented as JSON.
fn to_body<T: Serialize>(value: &T, uri: &Uri) -> Result<Value, Response> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, uri = %uri, "failed to encode response body");
        failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            uri,
            "The response could not be encoded.",
        )
    })
}

/// Filters and includes understood by the users endpoints.
#[derive(Debug, Default)]
struct UserQuery {
    search: Option<String>,
    has_group: Vec<String>,
    is_admin: bool,
    contain_last_logged_in: bool,
}

impl UserQuery {
    fn parse(raw: Option<&str>) -> Self {
        let mut query = UserQuery::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "filter[search]" => query.search = Some(value.to_lowercase()),
                "filter[has-group][]" => query.has_group.push(value.into_owned()),
                "filter[is-admin]" => query.is_admin = truthy(&value),
                "contain[LastLoggedIn]" => query.contain_last_logged_in = truthy(&value),
                // resource permissions are not modelled, filter[has-access][] is accepted as a no-op
                _ => {}
            }
        }
        query
    }

    fn matches(&self, user: &User) -> bool {
        if user.deleted {
            return false;
        }
        if let Some(needle) = &self.search {
            let hit = [
                &user.username,
                &user.profile.first_name,
                &user.profile.last_name,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(needle.as_str()));
            if !hit {
                return false;
            }
        }
        if !self.has_group.iter().all(|g| user.groups.contains(g)) {
            return false;
        }
        !self.is_admin || user.role.name == "admin"
    }

    fn render(&self, user: &User, uri: &Uri) -> Result<Value, Response> {
        let mut value = to_body(user, uri)?;
        if !self.contain_last_logged_in {
            if let Some(obj) = value.as_object_mut() {
                obj.remove("last_logged_in");
            }
        }
        Ok(value)
    }
}

fn truthy(value: &str) -> bool {
    matches!(value, "1" | "true")
}

/// Resolve a `{id}.json` path segment to a user id, mapping `me` to the
/// seeded administrator.
fn resolve_id(segment: &str, uri: &Uri) -> Result<String, Response> {
    let id = segment
        .strip_suffix(".json")
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, uri, "Page not found."))?;
    check_id(id, uri)
}

fn check_id(id: &str, uri: &Uri) -> Result<String, Response> {
    if id == "me" {
        return Ok(ME_ID.to_string());
    }
    Uuid::parse_str(id).map(|_| id.to_string()).map_err(|_| {
        failure(
            StatusCode::BAD_REQUEST,
            uri,
            "The user identifier should be a valid UUID.",
        )
    })
}

fn not_found(uri: &Uri) -> Response {
    failure(StatusCode::NOT_FOUND, uri, "The user does not exist.")
}

async fn list_users(State(db): State<Db>, uri: Uri, RawQuery(raw): RawQuery) -> Response {
    let query = UserQuery::parse(raw.as_deref());
    let users = db.read().await;
    let mut matching: Vec<&User> = users.values().filter(|u| query.matches(u)).collect();
    matching.sort_by(|a, b| a.username.cmp(&b.username));
    let body: Result<Vec<Value>, Response> =
        matching.into_iter().map(|u| query.render(u, &uri)).collect();
    match body {
        Ok(body) => success(&uri, Value::Array(body)),
        Err(resp) => resp,
    }
}

async fn create_user(State(db): State<Db>, uri: Uri, Json(input): Json<CreateUser>) -> Response {
    let username = input.username.trim().to_lowercase();
    if username.is_empty() {
        return failure(StatusCode::BAD_REQUEST, &uri, "A username is required.");
    }
    let role_id = input.role_id.unwrap_or_else(|| USER_ROLE_ID.to_string());
    let Some(role) = role(&role_id) else {
        return failure(StatusCode::BAD_REQUEST, &uri, "The role does not exist.");
    };

    let mut users = db.write().await;
    if users.values().any(|u| u.username == username) {
        return failure(StatusCode::BAD_REQUEST, &uri, "The username is already in use.");
    }

    let id = Uuid::new_v4().to_string();
    let now = now();
    let user = User {
        id: id.clone(),
        username,
        role_id,
        active: false,
        deleted: false,
        locale: input.locale.unwrap_or_else(|| "en-UK".to_string()),
        created: now.clone(),
        modified: now.clone(),
        last_logged_in: None,
        profile: Profile {
            id: Uuid::new_v4().to_string(),
            user_id: id.clone(),
            first_name: input.profile.first_name.unwrap_or_default(),
            last_name: input.profile.last_name.unwrap_or_default(),
            created: now.clone(),
            modified: now,
        },
        role,
        groups: Vec::new(),
    };
    let body = match to_body(&user, &uri) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    users.insert(id, user);
    success(&uri, body)
}

async fn get_user(
    State(db): State<Db>,
    uri: Uri,
    Path(segment): Path<String>,
    RawQuery(raw): RawQuery,
) -> Response {
    let id = match resolve_id(&segment, &uri) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let query = UserQuery::parse(raw.as_deref());
    let users = db.read().await;
    let Some(user) = users.get(&id) else {
        return not_found(&uri);
    };
    match query.render(user, &uri) {
        Ok(body) => success(&uri, body),
        Err(resp) => resp,
    }
}

async fn update_user(
    State(db): State<Db>,
    uri: Uri,
    Path(segment): Path<String>,
    Json(input): Json<UpdateUser>,
) -> Response {
    let id = match resolve_id(&segment, &uri) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let new_role = match input.role_id.as_deref() {
        Some(role_id) => match role(role_id) {
            Some(role) => Some(role),
            None => return failure(StatusCode::BAD_REQUEST, &uri, "The role does not exist."),
        },
        None => None,
    };

    let mut users = db.write().await;
    let Some(user) = users.get_mut(&id) else {
        return not_found(&uri);
    };
    let now = now();
    if let Some(role) = new_role {
        user.role_id = role.id.clone();
        user.role = role;
    }
    if let Some(locale) = input.locale {
        user.locale = locale;
    }
    if let Some(profile) = input.profile {
        if let Some(first_name) = profile.first_name {
            user.profile.first_name = first_name;
        }
        if let Some(last_name) = profile.last_name {
            user.profile.last_name = last_name;
        }
        user.profile.modified = now.clone();
    }
    user.modified = now;
    match to_body(&*user, &uri) {
        Ok(body) => success(&uri, body),
        Err(resp) => resp,
    }
}

/// Shared checks for delete and its dry-run.
fn check_deletable(users: &HashMap<String, User>, id: &str, uri: &Uri) -> Result<(), Response> {
    if id == ME_ID {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            uri,
            "You are not allowed to delete yourself.",
        ));
    }
    if !users.contains_key(id) {
        return Err(not_found(uri));
    }
    Ok(())
}

async fn delete_user(State(db): State<Db>, uri: Uri, Path(segment): Path<String>) -> Response {
    let id = match resolve_id(&segment, &uri) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let mut users = db.write().await;
    if let Err(resp) = check_deletable(&users, &id, &uri) {
        return resp;
    }
    users.remove(&id);
    tracing::info!(user_id = %id, "user deleted");
    success(&uri, Value::Null)
}

async fn delete_user_dry_run(State(db): State<Db>, uri: Uri, Path(id): Path<String>) -> Response {
    let id = match check_id(&id, &uri) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let users = db.read().await;
    match check_deletable(&users, &id, &uri) {
        Ok(()) => success(&uri, Value::Null),
        Err(resp) => resp,
    }
}
