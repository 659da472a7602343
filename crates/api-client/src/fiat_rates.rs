//! Response parsing for the fixer-style fiat cross rate endpoint
//! (`{"base": "EUR", "rates": {"USD": 1.08, ...}}`).

use crate::error::ApiError;
use crate::responses::FiatRatesResponse;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Parses the rate table and adds the base currency itself at rate 1.
pub fn parse_rates(body: &Value) -> Result<HashMap<String, Decimal>, ApiError> {
    let response = FiatRatesResponse::deserialize(body)
        .map_err(|e| ApiError::InvalidData(format!("fiat rate response: {}", e)))?;

    let mut rates = HashMap::with_capacity(response.rates.len() + 1);
    for (code, rate) in response.rates {
        match rate {
            Some(rate) if rate > Decimal::ZERO => {
                rates.insert(code.to_ascii_uppercase(), rate);
            }
            _ => debug!(code = code.as_str(), "Ignoring unusable fiat rate"),
        }
    }
    if let Some(base) = response.base {
        rates.insert(base.to_ascii_uppercase(), Decimal::ONE);
    }
    Ok(rates)
}
