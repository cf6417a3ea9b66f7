//! User resource handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Resource, User};
use quill_core::policy::ensure_can_modify;
use quill_core::ports::{BaseRepository, DataPersister, UserRepository};
use quill_core::validation::{WriteMode, validate_user_write};
use quill_shared::dto::{ArticleSummary, PageQuery, PageResponse, UserView, UserWriteRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Read view of a stored user. Password material never leaves here.
pub(super) fn user_view(user: &User) -> AppResult<UserView> {
    let id = user
        .id
        .ok_or_else(|| AppError::Internal("user without id in read view".to_string()))?;

    Ok(UserView {
        id,
        email: user.user_identifier().to_string(),
        display_name: user.display_name.clone(),
        roles: user.effective_roles().into_iter().collect(),
        articles: user
            .articles
            .iter()
            .filter_map(|a| {
                a.id.map(|id| ArticleSummary {
                    id,
                    title: a.title.clone(),
                })
            })
            .collect(),
    })
}

/// Copy the fields present in a write request onto a record.
fn apply_write(user: &mut User, req: UserWriteRequest) {
    if let Some(email) = req.email {
        user.email = Some(email);
    }
    if let Some(name) = req.display_name {
        user.display_name = Some(name);
    }
    user.plain_password = req.password;
    user.password_confirmation = req.confirmed_password;
}

async fn load(state: &AppState, id: i64) -> AppResult<User> {
    state.users.find_by_id(id).await?.ok_or_else(|| {
        AppError::NotFound(format!("user with id {} not found", id))
    })
}

async fn persist(state: &AppState, user: User) -> AppResult<User> {
    match state.persisters.persist(Resource::User(user)).await? {
        Resource::User(saved) => Ok(saved),
        other => Err(AppError::Internal(format!(
            "persister returned a {} for a user write",
            other.kind()
        ))),
    }
}

/// GET /api/users
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = state.pagination.resolve(query.into_inner());
    let page = state.users.list(request).await?;

    let items = page
        .items
        .iter()
        .map(user_view)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(PageResponse {
        items,
        total_items: page.total,
        page: page.page,
        items_per_page: page.per_page,
    }))
}

/// POST /api/users
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<UserWriteRequest>,
) -> AppResult<HttpResponse> {
    let mut user = User::new();
    apply_write(&mut user, body.into_inner());
    validate_user_write(&user, WriteMode::Create)?;

    let saved = persist(&state, user).await?;
    Ok(HttpResponse::Created().json(user_view(&saved)?))
}

/// GET /api/users/{id}
pub async fn read(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let user = load(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user_view(&user)?))
}

/// PUT /api/users/{id} - owner only
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<UserWriteRequest>,
) -> AppResult<HttpResponse> {
    let mut user = load(&state, path.into_inner()).await?;
    ensure_can_modify(&identity.as_user(), &user)?;

    apply_write(&mut user, body.into_inner());
    validate_user_write(&user, WriteMode::Update)?;

    let saved = persist(&state, user).await?;
    Ok(HttpResponse::Ok().json(user_view(&saved)?))
}

/// DELETE /api/users/{id} - owner only
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = load(&state, path.into_inner()).await?;
    ensure_can_modify(&identity.as_user(), &user)?;

    state.persisters.remove(Resource::User(user)).await?;
    Ok(HttpResponse::NoContent().finish())
}
