use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{UserResponse, parse_optional_enum};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use db::filters::UserFilter;
use serde::Deserialize;
use services::user_service::UserService;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// GET /api/users
///
/// ### Query Parameters
/// - `role`: `end_user`, `it_staff`, `manager` or `admin`
/// - `isActive`: `true` / `false`
/// - `search`: matches name or email, case-insensitive
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let filter = UserFilter {
        role: parse_optional_enum("role", query.role.as_deref())?,
        is_active: query.is_active,
        search: query.search,
    };
    let users = UserService::list(state.db(), &user.0, &filter)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(ApiResponse::success(
        users,
        "Users retrieved successfully",
    )))
}

/// GET /api/users/staff
///
/// Active staff who can take ticket assignments.
pub async fn list_staff(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let staff = UserService::list_assignable(state.db(), &user.0)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(ApiResponse::success(
        staff,
        "Staff retrieved successfully",
    )))
}

/// GET /api/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let found = UserService::get(state.db(), user_id).await?;
    Ok(Json(ApiResponse::success(
        UserResponse::from(found),
        "User retrieved successfully",
    )))
}
