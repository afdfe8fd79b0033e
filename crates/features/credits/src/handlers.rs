use crate::Credits;
use crate::ledger::LedgerEntry;
use crate::models::{
    BalanceResponse, PackageResponse, PurchaseResult, SummaryResponse, TransactionQuery,
    TransactionResponse,
};
use axum::Json;
use axum::extract::State;
use lvai_domain::constants::CREDITS_TAG;
use lvai_domain::credits::{ReferenceType, TransactionType};
use lvai_identity::CurrentUser;
use lvai_kernel::error::ErrorEnvelope;
use lvai_kernel::prelude::*;
use tracing::info;

#[api_handler(
    get,
    path = "/balance",
    responses(
        (status = OK, body = BalanceResponse),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = CREDITS_TAG,
)]
pub(crate) async fn balance(current: CurrentUser) -> Json<BalanceResponse> {
    Json(BalanceResponse {
        success: true,
        message: "Balance loaded".to_owned(),
        credits: current.user.credits,
        user_id: current.user.uid,
    })
}

#[api_handler(
    get,
    path = "/transactions",
    params(TransactionQuery),
    responses(
        (status = OK, description = "Ledger entries, newest first", body = Paginated<TransactionResponse>),
        (status = BAD_REQUEST, body = ErrorEnvelope),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = CREDITS_TAG,
)]
pub(crate) async fn transactions(
    State(state): State<ApiState>,
    current: CurrentUser,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> ApiResult<Json<Paginated<TransactionResponse>>> {
    let page = PageRequest::new(query.page, query.page_size)?;
    let transaction_type = query
        .transaction_type
        .as_deref()
        .map(|raw| {
            raw.parse::<TransactionType>()
                .map_err(|_| ApiError::validation(format!("Unknown transaction type: {raw}")))
        })
        .transpose()?;

    let (entries, total) = Credits::from_state(&state)?
        .ledger
        .transactions(current.id(), transaction_type, page)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(Paginated::new(entries.iter().map(TransactionResponse::from).collect(), total, page)))
}

#[api_handler(
    get,
    path = "/packages",
    responses((status = OK, description = "Packages on sale", body = Envelope<Vec<PackageResponse>>)),
    tag = CREDITS_TAG,
)]
pub(crate) async fn packages(
    State(state): State<ApiState>,
) -> ApiResult<Json<Envelope<Vec<PackageResponse>>>> {
    let packages = Credits::from_state(&state)?.packages.active().await.map_err(ApiError::internal)?;
    Ok(Json(Envelope::ok(packages.iter().map(PackageResponse::from).collect())))
}

#[api_handler(
    post,
    path = "/purchase/{package_id}",
    params(("package_id" = String, Path, description = "Package id")),
    responses(
        (status = OK, description = "Credits added", body = Envelope<PurchaseResult>),
        (status = NOT_FOUND, body = ErrorEnvelope),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = CREDITS_TAG,
)]
pub(crate) async fn purchase(
    State(state): State<ApiState>,
    current: CurrentUser,
    ApiPath(package_id): ApiPath<String>,
) -> ApiResult<Json<Envelope<PurchaseResult>>> {
    let credits = Credits::from_state(&state)?;

    let package = credits
        .packages
        .find_active(&package_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found(ErrorCode::PackageNotFound, "Credit package not found"))?;

    let amount = package.total_credits();
    let entry = LedgerEntry::new(TransactionType::Purchase)
        .description(format!("Purchased package: {}", package.name))
        .reference(ReferenceType::CreditPackage, package.uid.clone());
    let new_balance = credits.ledger.credit(current.id(), amount, entry).await?;

    info!(user_id = %current.id(), package = %package.uid, amount, new_balance, "Credits purchased");

    Ok(Json(
        Envelope::ok(PurchaseResult { credits_added: amount, new_balance })
            .with_message(format!("Purchase complete, {amount} credits added")),
    ))
}

#[api_handler(
    get,
    path = "/summary",
    responses(
        (status = OK, body = Envelope<SummaryResponse>),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = CREDITS_TAG,
)]
pub(crate) async fn summary(
    State(state): State<ApiState>,
    current: CurrentUser,
) -> ApiResult<Json<Envelope<SummaryResponse>>> {
    let summary = Credits::from_state(&state)?
        .ledger
        .summary(current.id())
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(Envelope::ok(SummaryResponse::new(current.user.credits, summary))))
}
