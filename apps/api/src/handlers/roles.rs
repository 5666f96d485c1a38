use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_service
        .list_roles(&user, OrgId::from_uuid(org_id))
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((org_id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .get_role(&user, OrgId::from_uuid(org_id), RoleId::from_uuid(role_id))
        .await?;

    Ok(Json(role.into()))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_service
        .create_role(&user, OrgId::from_uuid(org_id), payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(role.into())))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((org_id, role_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .update_role(
            &user,
            OrgId::from_uuid(org_id),
            RoleId::from_uuid(role_id),
            payload.into(),
        )
        .await?;

    Ok(Json(role.into()))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((org_id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .delete_role(&user, OrgId::from_uuid(org_id), RoleId::from_uuid(role_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
