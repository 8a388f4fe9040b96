//! Sync API authorization
//!
//! Every Sync API call re-derives access from storage:
//! register -> merchant -> configuration. Nothing is cached between calls.

use shared::error::{AppError, ErrorCode};
use shared::models::{CashRegister, ConfigType};
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::db::{cash_registers, configurations};
use crate::error::ServiceResult;

pub const REGISTER_MISSING: &str = "La caja consultada no existe.";
pub const REGISTER_INACTIVE: &str = "La caja consultada está inactiva.";
pub const NO_SYNC_CONFIGURATION: &str =
    "El comercio no tiene configuración para sincronización externa.";
pub const PLATFORM_ONLY: &str =
    "Este comercio no está habilitado para sincronización externa (solo Externa o Ambas).";
pub const FOREIGN_REGISTER: &str = "La caja consultada pertenece a otro comercio.";

pub const MERCHANT_ID_REQUIRED: &str = "IdComercio es requerido y debe ser positivo.";
pub const MERCHANT_NOT_CONFIGURED: &str = "Comercio no encontrado o sin configuración activa.";
pub const API_NOT_ALLOWED: &str = "El comercio no tiene permisos de autenticación API (Configuración debe ser Externa o Ambas).";

/// Resolve the register behind `sinpe_phone` and confirm the calling merchant may use it
pub async fn authorize_register(
    pool: &SqlitePool,
    sinpe_phone: &str,
    caller_merchant_id: i64,
) -> ServiceResult<CashRegister> {
    let register = cash_registers::find_by_phone(pool, sinpe_phone)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::CashRegisterNotFound, REGISTER_MISSING))?;

    if register.merchant_id != caller_merchant_id {
        tracing::warn!(
            register_id = register.id,
            caller_merchant_id,
            "Sync API call for another merchant's register"
        );
        return Err(AppError::with_message(ErrorCode::CashRegisterForeign, FOREIGN_REGISTER).into());
    }

    if !register.active {
        return Err(AppError::with_message(ErrorCode::CashRegisterInactive, REGISTER_INACTIVE).into());
    }

    let config = configurations::find_active_by_merchant(pool, register.merchant_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ConfigurationInactive, NO_SYNC_CONFIGURATION)
        })?;

    if !config.kind().is_some_and(ConfigType::allows_external_api) {
        return Err(AppError::with_message(ErrorCode::ExternalSyncNotAllowed, PLATFORM_ONLY).into());
    }

    Ok(register)
}

/// Issue a bearer token for a merchant configured for external sync
pub async fn issue_api_token(
    pool: &SqlitePool,
    jwt: &JwtService,
    merchant_id: i64,
) -> ServiceResult<String> {
    if merchant_id <= 0 {
        return Err(AppError::with_message(ErrorCode::InvalidRequest, MERCHANT_ID_REQUIRED).into());
    }

    let config = configurations::find_active_by_merchant(pool, merchant_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ConfigurationNotFound, MERCHANT_NOT_CONFIGURED)
        })?;

    if !config.allows_external_api() {
        tracing::warn!(merchant_id, "API token refused for platform-only merchant");
        return Err(AppError::with_message(ErrorCode::ExternalSyncNotAllowed, API_NOT_ALLOWED).into());
    }

    let token = jwt
        .issue_api_token(merchant_id)
        .map_err(|e| AppError::internal(e.to_string()))?;
    tracing::info!(merchant_id, "API token issued");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ServiceError;
    use crate::db::testing;
    use shared::models::{CashRegisterUpdate, ConfigurationUpdate};

    fn code(err: ServiceError) -> (ErrorCode, String) {
        match err {
            ServiceError::App(app) => (app.code, app.message),
            ServiceError::Db(db) => panic!("unexpected system error: {db}"),
        }
    }

    fn jwt() -> JwtService {
        JwtService::with_config((&Config::for_tests()).into())
    }

    #[tokio::test]
    async fn test_external_merchant_is_authorized() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        testing::configuration(&pool, merchant.id, 2, 10).await;
        let register = testing::register(&pool, merchant.id, "88887777").await;

        let found = authorize_register(&pool, "88887777", merchant.id).await.unwrap();
        assert_eq!(found, register);
    }

    #[tokio::test]
    async fn test_refusals_in_order() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        let other = testing::merchant(&pool, "3-101-000002").await;

        let err = authorize_register(&pool, "88887777", merchant.id).await.unwrap_err();
        assert_eq!(code(err), (ErrorCode::CashRegisterNotFound, REGISTER_MISSING.into()));

        let register = testing::register(&pool, merchant.id, "88887777").await;
        let err = authorize_register(&pool, "88887777", other.id).await.unwrap_err();
        assert_eq!(code(err).0, ErrorCode::CashRegisterForeign);

        let err = authorize_register(&pool, "88887777", merchant.id).await.unwrap_err();
        assert_eq!(code(err), (ErrorCode::ConfigurationInactive, NO_SYNC_CONFIGURATION.into()));

        let config = testing::configuration(&pool, merchant.id, 1, 10).await;
        let err = authorize_register(&pool, "88887777", merchant.id).await.unwrap_err();
        assert_eq!(code(err), (ErrorCode::ExternalSyncNotAllowed, PLATFORM_ONLY.into()));

        let inactive = CashRegisterUpdate {
            name: register.name.clone(),
            description: None,
            sinpe_phone: register.sinpe_phone.clone(),
            active: false,
        };
        cash_registers::update(&pool, register.id, &inactive, 1).await.unwrap();
        let both = ConfigurationUpdate {
            config_type: 3,
            commission_percent: 10,
            active: true,
        };
        configurations::update(&pool, config.id, &both, 1).await.unwrap();
        let err = authorize_register(&pool, "88887777", merchant.id).await.unwrap_err();
        assert_eq!(code(err), (ErrorCode::CashRegisterInactive, REGISTER_INACTIVE.into()));
    }

    #[tokio::test]
    async fn test_token_for_external_merchant() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        testing::configuration(&pool, merchant.id, 3, 10).await;

        let jwt = jwt();
        let token = issue_api_token(&pool, &jwt, merchant.id).await.unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, merchant.id.to_string());
    }

    #[tokio::test]
    async fn test_token_refusals() {
        let pool = testing::pool().await;
        let merchant = testing::merchant(&pool, "3-101-000001").await;
        let jwt = jwt();

        let err = issue_api_token(&pool, &jwt, 0).await.unwrap_err();
        assert_eq!(code(err).1, MERCHANT_ID_REQUIRED);

        let err = issue_api_token(&pool, &jwt, merchant.id).await.unwrap_err();
        assert_eq!(code(err).1, MERCHANT_NOT_CONFIGURED);

        testing::configuration(&pool, merchant.id, 1, 10).await;
        let err = issue_api_token(&pool, &jwt, merchant.id).await.unwrap_err();
        assert_eq!(code(err).1, API_NOT_ALLOWED);
    }
}
