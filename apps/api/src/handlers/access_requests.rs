use super::*;

pub async fn list_access_requests_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AccessRequestRecordResponse>>> {
    let records = state
        .access_request_service
        .list_pending(&user, OrgId::from_uuid(org_id))
        .await?
        .into_iter()
        .map(AccessRequestRecordResponse::from)
        .collect();

    Ok(Json(records))
}

pub async fn issue_access_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(org_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<AccessRequestResponse>)> {
    let request = state
        .access_request_service
        .issue(&user, OrgId::from_uuid(org_id))
        .await?;

    Ok((StatusCode::CREATED, Json(request.into())))
}

pub async fn cancel_access_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(org_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .access_request_service
        .cancel(&user, OrgId::from_uuid(org_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn approve_access_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<ApproveAccessRequestRequest>,
) -> ApiResult<Json<ApproveAccessRequestResponse>> {
    let approved = state
        .access_request_service
        .approve(
            &user,
            OrgId::from_uuid(org_id),
            RequestId::from_uuid(payload.request_id),
            RoleId::from_uuid(payload.role_id),
        )
        .await?;

    Ok(Json(approved.into()))
}

pub async fn deny_access_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<DenyAccessRequestRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let denied = state
        .access_request_service
        .deny(
            &user,
            OrgId::from_uuid(org_id),
            RequestId::from_uuid(payload.request_id),
        )
        .await?;

    Ok(Json(denied.into()))
}
