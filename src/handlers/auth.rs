// src/handlers/auth.rs

use axum::Json;

use crate::{middleware::auth::AuthenticatedUser, models::auth::CurrentUser};

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado, cargos e empresa", body = CurrentUser),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<CurrentUser> {
    Json(user)
}
