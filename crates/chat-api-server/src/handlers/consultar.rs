use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::models::chat::{ConsultarRequest, ConsultarResponse};
use crate::services::AnswerService;
use crate::utils::client_ip::resolve_user_id;
use crate::utils::error::ApiError;

pub async fn consultar_handler(
    State(query_service): State<Arc<dyn AnswerService>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<ConsultarRequest>, JsonRejection>,
) -> Result<Json<ConsultarResponse>, ApiError> {
    let Json(request) = payload?;
    let user_id = resolve_user_id(&headers, addr);
    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("consultar", %request_id, %user_id);

    async move {
        info!("Prompt received: {} chars", request.prompt.chars().count());

        let respuesta = query_service.answer(&user_id, &request.prompt).await?;
        Ok(Json(ConsultarResponse { respuesta }))
    }
    .instrument(span)
    .await
}
