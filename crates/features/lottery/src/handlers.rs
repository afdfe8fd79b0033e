use crate::analysis::{RECENT_DRAWS, analyze};
use crate::models::{
    AnalysisResponse, CreateDrawRequest, DrawListQuery, DrawResponse, LotteryTypeInfo,
    StatisticsResponse,
};
use crate::repository::DrawRecord;
use crate::{Lottery, date_millis, parse_lottery_type};
use axum::Json;
use axum::extract::State;
use lvai_domain::constants::LOTTERY_TAG;
use lvai_domain::lottery::LotteryType;
use lvai_identity::AdminUser;
use lvai_kernel::error::ErrorEnvelope;
use lvai_kernel::prelude::*;
use strum::IntoEnumIterator;
use tracing::info;

#[api_handler(
    get,
    path = "/types",
    responses((status = OK, description = "Supported games", body = Envelope<Vec<LotteryTypeInfo>>)),
    tag = LOTTERY_TAG,
)]
pub(crate) async fn types() -> Json<Envelope<Vec<LotteryTypeInfo>>> {
    Json(Envelope::ok(LotteryType::iter().map(LotteryTypeInfo::from).collect()))
}

#[api_handler(
    get,
    path = "/draws",
    params(DrawListQuery),
    responses(
        (status = OK, description = "Draws, newest first", body = Paginated<DrawResponse>),
        (status = BAD_REQUEST, body = ErrorEnvelope),
    ),
    tag = LOTTERY_TAG,
)]
pub(crate) async fn list_draws(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<DrawListQuery>,
) -> ApiResult<Json<Paginated<DrawResponse>>> {
    let page = PageRequest::new(query.page, query.page_size)?;
    let lottery_type = query.lottery_type.as_deref().map(parse_lottery_type).transpose()?;

    let (draws, total) = Lottery::from_state(&state)?
        .draws
        .list_draws(lottery_type, page)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(Paginated::new(draws.iter().map(DrawResponse::from).collect(), total, page)))
}

#[api_handler(
    post,
    path = "/draws",
    request_body = CreateDrawRequest,
    responses(
        (status = OK, description = "Stored draw", body = DrawResponse),
        (status = BAD_REQUEST, description = "Invalid or duplicate draw", body = ErrorEnvelope),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
        (status = FORBIDDEN, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = LOTTERY_TAG,
)]
pub(crate) async fn create_draw(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    ApiJson(body): ApiJson<CreateDrawRequest>,
) -> ApiResult<Json<DrawResponse>> {
    body.validate()?;
    let lottery_type = parse_lottery_type(&body.lottery_type)?;

    let mut record = DrawRecord::new(
        lottery_type,
        body.draw_number.trim().to_owned(),
        date_millis(body.draw_date),
        &body.numbers,
        body.special_number,
        now_millis(),
    );
    record.prize_info = body.prize_info.map(|info| info.to_string());
    record.total_sales = body.total_sales;

    let draw = Lottery::from_state(&state)?.ingest(lottery_type, record).await?;
    info!(user_id = %admin.id(), %lottery_type, draw_id = %draw.uid, "Draw submitted");

    Ok(Json(DrawResponse::from(&draw)))
}

#[api_handler(
    get,
    path = "/draws/{draw_id}",
    params(("draw_id" = String, Path, description = "Draw id")),
    responses(
        (status = OK, body = DrawResponse),
        (status = NOT_FOUND, body = ErrorEnvelope),
    ),
    tag = LOTTERY_TAG,
)]
pub(crate) async fn get_draw(
    State(state): State<ApiState>,
    ApiPath(draw_id): ApiPath<String>,
) -> ApiResult<Json<DrawResponse>> {
    let draw = Lottery::from_state(&state)?
        .draws
        .find_draw(&draw_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found(ErrorCode::DrawNotFound, "Draw not found"))?;

    Ok(Json(DrawResponse::from(&draw)))
}

#[api_handler(
    get,
    path = "/latest/{lottery_type}",
    params(("lottery_type" = String, Path, description = "Lottery id, e.g. `big_lottery`")),
    responses(
        (status = OK, description = "Newest draw", body = DrawResponse),
        (status = BAD_REQUEST, body = ErrorEnvelope),
        (status = NOT_FOUND, body = ErrorEnvelope),
    ),
    tag = LOTTERY_TAG,
)]
pub(crate) async fn latest(
    State(state): State<ApiState>,
    ApiPath(lottery_type): ApiPath<String>,
) -> ApiResult<Json<DrawResponse>> {
    let lottery_type = parse_lottery_type(&lottery_type)?;

    let draw = Lottery::from_state(&state)?
        .draws
        .latest_draws(lottery_type, 1)
        .await
        .map_err(ApiError::internal)?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found(ErrorCode::DrawNotFound, "No draws yet"))?;

    Ok(Json(DrawResponse::from(&draw)))
}

#[api_handler(
    get,
    path = "/statistics/{lottery_type}",
    params(("lottery_type" = String, Path, description = "Lottery id")),
    responses(
        (status = OK, description = "Per-number statistics, most frequent first", body = Envelope<Vec<StatisticsResponse>>),
        (status = BAD_REQUEST, body = ErrorEnvelope),
    ),
    tag = LOTTERY_TAG,
)]
pub(crate) async fn statistics(
    State(state): State<ApiState>,
    ApiPath(lottery_type): ApiPath<String>,
) -> ApiResult<Json<Envelope<Vec<StatisticsResponse>>>> {
    let lottery_type = parse_lottery_type(&lottery_type)?;

    let rows = Lottery::from_state(&state)?
        .draws
        .statistics(lottery_type)
        .await
        .map_err(ApiError::internal)?;

    let envelope = Envelope::ok(rows.iter().map(StatisticsResponse::from).collect::<Vec<_>>());
    if envelope.data.is_empty() {
        return Ok(Json(envelope.with_message("No statistics yet")));
    }
    Ok(Json(envelope))
}

#[api_handler(
    get,
    path = "/analysis/{lottery_type}",
    params(("lottery_type" = String, Path, description = "Lottery id")),
    responses(
        (status = OK, description = "Hot, cold and overdue numbers", body = AnalysisResponse),
        (status = BAD_REQUEST, body = ErrorEnvelope),
    ),
    tag = LOTTERY_TAG,
)]
pub(crate) async fn analysis(
    State(state): State<ApiState>,
    ApiPath(lottery_type): ApiPath<String>,
) -> ApiResult<Json<AnalysisResponse>> {
    let lottery_type = parse_lottery_type(&lottery_type)?;
    let lottery = Lottery::from_state(&state)?;

    let total_draws = lottery.draws.count_draws(lottery_type).await.map_err(ApiError::internal)?;
    let stats = lottery.number_statistics(lottery_type).await.map_err(ApiError::internal)?;
    let recent = lottery
        .draws
        .latest_draws(lottery_type, RECENT_DRAWS)
        .await
        .map_err(ApiError::internal)?
        .iter()
        .map(DrawRecord::main_numbers)
        .collect();

    Ok(Json(analyze(lottery_type, total_draws, stats, recent)))
}
