//! Sync API for merchant systems
//!
//! Bearer-token surface with its own wire format: PascalCase Spanish field
//! names and a `{Mensaje}` / `{EsValido, Mensaje}` envelope instead of the
//! back-office `ApiResponse`.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{PaymentCreate, SinpePayment};
use shared::util::now_millis;
use validator::Validate;

use crate::auth::Principal;
use crate::db::payments;
use crate::error::ServiceError;
use crate::service::{access, ledger};
use crate::state::AppState;

pub const PHONE_REQUIRED: &str = "Debe proporcionar el teléfono de la caja (telefonoCaja).";
pub const INVALID_ID: &str = "El IdSinpe es inválido.";
pub const INVALID_BODY: &str = "Datos inválidos. Verifique los campos requeridos.";
pub const RECEIVED: &str = "SINPE recibido y registrado correctamente.";
pub const CONSULT_FAILED: &str = "Ocurrió un error al consultar los SINPE.";
pub const SYNC_FAILED: &str = "Ocurrió un error al sincronizar el SINPE.";
pub const TOKEN_FAILED: &str = "Ocurrió un error al generar el token.";

// ── Wire types ──

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncMessage {
    pub mensaje: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncResult {
    pub es_valido: bool,
    pub mensaje: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenResponse {
    pub token: String,
}

/// Payment as seen by merchant systems
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SinpeRecord {
    pub id_sinpe: i64,
    pub telefono_origen: String,
    pub nombre_origen: String,
    pub telefono_destinatario: String,
    pub nombre_destinatario: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub monto: Decimal,
    pub descripcion: Option<String>,
    pub fecha: DateTime<Utc>,
    /// `true` once synchronized
    pub estado: bool,
}

impl From<SinpePayment> for SinpeRecord {
    fn from(payment: SinpePayment) -> Self {
        Self {
            id_sinpe: payment.id,
            telefono_origen: payment.origin_phone,
            nombre_origen: payment.origin_name,
            telefono_destinatario: payment.destination_phone,
            nombre_destinatario: payment.destination_name,
            monto: payment.amount,
            descripcion: payment.description,
            fecha: DateTime::from_timestamp_millis(payment.registered_at).unwrap_or_default(),
            estado: payment.synchronized,
        }
    }
}

/// POST /api/sinpe/recibir body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiveRequest {
    pub telefono_origen: String,
    pub nombre_origen: String,
    pub telefono_destinatario: String,
    pub nombre_destinatario: String,
    pub monto: Decimal,
    #[serde(default)]
    pub descripcion: Option<String>,
}

impl From<ReceiveRequest> for PaymentCreate {
    fn from(req: ReceiveRequest) -> Self {
        Self {
            origin_phone: req.telefono_origen,
            origin_name: req.nombre_origen,
            destination_phone: req.telefono_destinatario,
            destination_name: req.nombre_destinatario,
            amount: req.monto,
            description: req.descripcion,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConsultQuery {
    #[serde(rename = "telefonoCaja", default)]
    pub telefono_caja: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(rename = "idComercio", default)]
    pub id_comercio: Option<i64>,
}

// ── Refusals ──

#[derive(Debug, Clone, Copy)]
enum Envelope {
    Message,
    Result,
}

/// A refused Sync API call, rendered in the caller's envelope
#[derive(Debug)]
pub struct Refusal {
    status: StatusCode,
    envelope: Envelope,
    mensaje: String,
}

impl Refusal {
    fn message(status: StatusCode, mensaje: impl Into<String>) -> Self {
        Self {
            status,
            envelope: Envelope::Message,
            mensaje: mensaje.into(),
        }
    }

    fn result(status: StatusCode, mensaje: impl Into<String>) -> Self {
        Self {
            status,
            envelope: Envelope::Result,
            mensaje: mensaje.into(),
        }
    }

    /// Business refusals keep their status and message; system failures become 500 `failure`
    fn from_service(
        err: ServiceError,
        envelope: Envelope,
        failure: impl FnOnce(String) -> String,
    ) -> Self {
        let (status, mensaje) = match err {
            ServiceError::App(app) => (app.http_status(), app.message),
            ServiceError::Db(db) => {
                tracing::error!(error = %db, "Sync API failure");
                (StatusCode::INTERNAL_SERVER_ERROR, failure(db.to_string()))
            }
        };
        Self {
            status,
            envelope,
            mensaje,
        }
    }
}

impl IntoResponse for Refusal {
    fn into_response(self) -> Response {
        match self.envelope {
            Envelope::Message => {
                (self.status, Json(SyncMessage { mensaje: self.mensaje })).into_response()
            }
            Envelope::Result => (
                self.status,
                Json(SyncResult {
                    es_valido: false,
                    mensaje: self.mensaje,
                }),
            )
                .into_response(),
        }
    }
}

/// Merchant the bearer token was issued for
fn caller(principal: &Principal, envelope: Envelope) -> Result<i64, Refusal> {
    principal.merchant_id.ok_or_else(|| Refusal {
        status: StatusCode::UNAUTHORIZED,
        envelope,
        mensaje: "Token inválido o expirado.".into(),
    })
}

// ── Handlers ──

/// GET /api/auth/token?idComercio=
pub async fn issue_token(
    State(state): State<AppState>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<TokenResponse>, Refusal> {
    let merchant_id = query
        .ok()
        .and_then(|Query(q)| q.id_comercio)
        .unwrap_or_default();

    match access::issue_api_token(&state.pool, &state.jwt, merchant_id).await {
        Ok(token) => Ok(Json(TokenResponse { token })),
        Err(ServiceError::App(app)) => Err(Refusal::message(StatusCode::UNAUTHORIZED, app.message)),
        Err(err) => Err(Refusal::from_service(err, Envelope::Message, |_| {
            TOKEN_FAILED.to_string()
        })),
    }
}

/// GET /api/sinpe/consultar?telefonoCaja=
pub async fn consult(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<ConsultQuery>, QueryRejection>,
) -> Result<Json<Vec<SinpeRecord>>, Refusal> {
    let merchant_id = caller(&principal, Envelope::Message)?;
    let phone = query
        .ok()
        .and_then(|Query(q)| q.telefono_caja)
        .map(|p| p.trim().to_string())
        .unwrap_or_default();
    if phone.is_empty() {
        return Err(Refusal::message(StatusCode::BAD_REQUEST, PHONE_REQUIRED));
    }

    let failed = |err: ServiceError| {
        Refusal::from_service(err, Envelope::Message, |_| CONSULT_FAILED.to_string())
    };
    access::authorize_register(&state.pool, &phone, merchant_id)
        .await
        .map_err(failed)?;
    let records = payments::list_by_destination(&state.pool, &phone)
        .await
        .map_err(|e| failed(e.into()))?;

    tracing::info!(merchant_id, count = records.len(), "Sync API consult");
    Ok(Json(records.into_iter().map(SinpeRecord::from).collect()))
}

/// POST /api/sinpe/sincronizar/{idSinpe}
pub async fn synchronize(
    State(state): State<AppState>,
    principal: Principal,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SyncResult>, Refusal> {
    let merchant_id = caller(&principal, Envelope::Result)?;
    let id = match id {
        Ok(Path(id)) if id > 0 => id,
        _ => return Err(Refusal::result(StatusCode::BAD_REQUEST, INVALID_ID)),
    };

    let failed = |err: ServiceError| {
        Refusal::from_service(err, Envelope::Result, |_| SYNC_FAILED.to_string())
    };
    let payment = ledger::find_payment(&state.pool, id).await.map_err(failed)?;
    access::authorize_register(&state.pool, &payment.destination_phone, merchant_id)
        .await
        .map_err(failed)?;
    let outcome = ledger::synchronize(&state.pool, id).await.map_err(failed)?;

    Ok(Json(SyncResult {
        es_valido: true,
        mensaje: ledger::outcome_message(outcome).to_string(),
    }))
}

/// POST /api/sinpe/recibir
pub async fn receive(
    State(state): State<AppState>,
    principal: Principal,
    body: Result<Json<ReceiveRequest>, JsonRejection>,
) -> Result<Json<SyncResult>, Refusal> {
    let merchant_id = caller(&principal, Envelope::Result)?;
    let Ok(Json(body)) = body else {
        return Err(Refusal::result(StatusCode::BAD_REQUEST, INVALID_BODY));
    };
    let form = PaymentCreate::from(body).trimmed();
    if form.validate().is_err() {
        return Err(Refusal::result(StatusCode::BAD_REQUEST, INVALID_BODY));
    }

    let failed = |err: ServiceError| {
        Refusal::from_service(err, Envelope::Result, |detail| {
            format!("Error al registrar SINPE: {detail}")
        })
    };
    access::authorize_register(&state.pool, &form.destination_phone, merchant_id)
        .await
        .map_err(failed)?;
    let payment = ledger::register_payment(&state.pool, form, Some(merchant_id), now_millis())
        .await
        .map_err(failed)?;

    tracing::info!(merchant_id, payment_id = payment.id, "Sync API payment received");
    Ok(Json(SyncResult {
        es_valido: true,
        mensaje: RECEIVED.to_string(),
    }))
}
