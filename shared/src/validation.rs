//! Custom field rules used by the `validator` derives in [`crate::models`]

use rust_decimal::Decimal;
use std::borrow::Cow;
use validator::ValidationError;

/// Largest amount a single SINPE transfer may carry (decimal(18,2)).
pub const MAX_PAYMENT_AMOUNT: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 2);

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// SINPE phone numbers are 8 to 10 ASCII digits.
pub fn sinpe_phone(value: &str) -> Result<(), ValidationError> {
    let valid = (8..=10).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(rule("sinpe_phone", "El teléfono debe tener 8 a 10 dígitos."))
    }
}

/// Amounts are positive, at most 2 decimals and within decimal(18,2).
pub fn payment_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() > 2 {
        return Err(rule("amount_scale", "El monto admite como máximo 2 decimales."));
    }
    if *value < Decimal::new(1, 2) || *value > MAX_PAYMENT_AMOUNT {
        return Err(rule(
            "amount_range",
            "El monto debe estar entre 0.01 y 9999999999999999.99.",
        ));
    }
    Ok(())
}
