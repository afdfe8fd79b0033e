use crate::Recommender;
use crate::models::{RecommendationQuery, RecommendationRequest, RecommendationResponse, StrategyInfo};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use lvai_credits::{Credits, Ledger, LedgerEntry};
use lvai_domain::constants::RECOMMENDATION_TAG;
use lvai_domain::credits::{ReferenceType, TransactionType};
use lvai_domain::strategy::Strategy;
use lvai_identity::CurrentUser;
use lvai_kernel::error::ErrorEnvelope;
use lvai_kernel::prelude::*;
use lvai_lottery::{Lottery, parse_lottery_type};
use strum::IntoEnumIterator;
use tracing::{error, info};

#[api_handler(
    post,
    path = "/",
    request_body = RecommendationRequest,
    responses(
        (status = OK, description = "Stored recommendation", body = RecommendationResponse),
        (status = BAD_REQUEST, description = "Unknown lottery or strategy", body = ErrorEnvelope),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
        (status = PAYMENT_REQUIRED, description = "Balance below the cost", body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = RECOMMENDATION_TAG,
)]
pub(crate) async fn create(
    State(state): State<ApiState>,
    current: CurrentUser,
    ApiJson(body): ApiJson<RecommendationRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    body.validate()?;
    let lottery_type = parse_lottery_type(&body.lottery_type)?;
    let strategy = body.strategy()?;

    let cost = state.config.credits.recommendation_cost * i64::from(body.count);
    if current.user.credits < cost {
        return Err(ApiError::insufficient_credits(cost, current.user.credits));
    }

    let recommender = Recommender::from_state(&state)?;
    let credits = Credits::from_state(&state)?;
    let stats = Lottery::from_state(&state)?
        .number_statistics(lottery_type)
        .await
        .map_err(ApiError::internal)?;

    let record =
        recommender.draft(current.id(), lottery_type, strategy, &stats, cost, now_millis()).await;

    let entry = LedgerEntry::new(TransactionType::Recommendation)
        .description(format!("{} recommendation x{}", lottery_type.rules().name, body.count))
        .reference(ReferenceType::Recommendation, record.uid.clone());
    let balance = credits.ledger.debit(current.id(), cost, entry).await?;

    if let Err(err) = recommender.records.insert(record.clone()).await {
        error!(error = %err, user_id = %current.id(), "Storing recommendation failed, refunding");
        return Err(refund_unstored(&credits.ledger, current.id(), cost, &record.uid).await);
    }

    info!(
        user_id = %current.id(),
        %lottery_type,
        %strategy,
        recommendation_id = %record.uid,
        cost,
        balance,
        "Recommendation created"
    );

    Ok(Json(RecommendationResponse::from(&record)))
}

/// Credits `cost` back after a failed store. Answers `E5000` whether or not the refund lands.
async fn refund_unstored(
    ledger: &Ledger,
    user_id: &str,
    cost: i64,
    recommendation_id: &str,
) -> ApiError {
    let refund = LedgerEntry::new(TransactionType::Refund)
        .description("Refund for failed recommendation")
        .reference(ReferenceType::Recommendation, recommendation_id.to_owned());
    if let Err(err) = ledger.credit(user_id, cost, refund).await {
        error!(error = %err, user_id, cost, recommendation_id, "Refund for unstored recommendation failed");
    }

    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::RecommendationFailed,
        "Recommendation could not be stored",
    )
}

#[api_handler(
    get,
    path = "/",
    params(RecommendationQuery),
    responses(
        (status = OK, description = "Own recommendations, newest first", body = Paginated<RecommendationResponse>),
        (status = BAD_REQUEST, body = ErrorEnvelope),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = RECOMMENDATION_TAG,
)]
pub(crate) async fn list(
    State(state): State<ApiState>,
    current: CurrentUser,
    ApiQuery(query): ApiQuery<RecommendationQuery>,
) -> ApiResult<Json<Paginated<RecommendationResponse>>> {
    let page = PageRequest::new(query.page, query.page_size)?;
    let lottery_type = query.lottery_type.as_deref().map(parse_lottery_type).transpose()?;

    let (records, total) = Recommender::from_state(&state)?
        .records
        .list(current.id(), lottery_type, page)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(Paginated::new(records.iter().map(RecommendationResponse::from).collect(), total, page)))
}

#[api_handler(
    get,
    path = "/{recommendation_id}",
    params(("recommendation_id" = String, Path, description = "Recommendation id")),
    responses(
        (status = OK, body = RecommendationResponse),
        (status = NOT_FOUND, body = ErrorEnvelope),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = RECOMMENDATION_TAG,
)]
pub(crate) async fn get_one(
    State(state): State<ApiState>,
    current: CurrentUser,
    ApiPath(recommendation_id): ApiPath<String>,
) -> ApiResult<Json<RecommendationResponse>> {
    let record = Recommender::from_state(&state)?
        .records
        .find_owned(current.id(), &recommendation_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found(ErrorCode::NotFound, "Recommendation not found"))?;

    Ok(Json(RecommendationResponse::from(&record)))
}

#[api_handler(
    get,
    path = "/strategies/list",
    responses((status = OK, description = "Available strategies", body = Envelope<Vec<StrategyInfo>>)),
    tag = RECOMMENDATION_TAG,
)]
pub(crate) async fn strategies() -> Json<Envelope<Vec<StrategyInfo>>> {
    Json(Envelope::ok(Strategy::iter().map(StrategyInfo::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvai_database::Database;
    use lvai_identity::{UserRecord, UserRepository};

    async fn ledger_with_user() -> (Ledger, String) {
        let db = Database::builder().url("mem://").session("test", "refund").init().await.unwrap();
        let user = UserRepository::new(db.clone())
            .create(UserRecord::new("eve@example.com".into(), "eve".into(), "hash".into(), None, 1), 100)
            .await
            .unwrap();
        (Ledger::new(db), user.uid)
    }

    #[tokio::test]
    async fn unstored_recommendations_are_refunded() {
        let (ledger, user) = ledger_with_user().await;
        let entry = LedgerEntry::new(TransactionType::Recommendation);
        assert_eq!(ledger.debit(&user, 30, entry).await.unwrap(), 70);

        let err = refund_unstored(&ledger, &user, 30, "rec-1").await;
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code.to_string(), "E5000");
        assert_eq!(ledger.balance(&user).await.unwrap(), Some(100));
    }

    #[tokio::test]
    async fn a_failed_refund_still_reports_the_storage_failure() {
        let (ledger, _) = ledger_with_user().await;

        let err = refund_unstored(&ledger, "ghost", 30, "rec-2").await;
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code.to_string(), "E5000");
    }
}
