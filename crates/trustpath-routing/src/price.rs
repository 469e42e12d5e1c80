//! Quote-to-base conversion through a trustline price.
//!
//! A trustline priced `pB/pQ` exchanges `pB` units of its base asset for `pQ`
//! units of its quote asset. Delivering `q` quote units therefore costs
//! `q * pB / pQ` base units. When that does not divide evenly the result is
//! rounded up: the payer never under-pays relative to the trustline's rate,
//! and the residual fraction is the cost of crossing an incongruent price.

use num_bigint::BigUint;
use num_traits::Zero;
use trustpath_core::{Amount, Price};

use crate::error::RoutingError;

/// The smallest `b` such that `b * quote_price >= quote_amount * base_price`.
pub fn base_amount_for(
    quote_amount: &Amount,
    base_price: &BigUint,
    quote_price: &BigUint,
) -> Result<Amount, RoutingError> {
    if quote_price.is_zero() {
        return Err(RoutingError::ZeroQuotePrice);
    }

    let scaled = quote_amount.value() * base_price;
    let mut base = &scaled / quote_price;
    if !(&scaled % quote_price).is_zero() {
        base += 1u32;
    }
    Ok(Amount::from(base))
}

/// [`base_amount_for`] at a trustline price.
pub fn convert(quote_amount: &Amount, price: &Price) -> Result<Amount, RoutingError> {
    base_amount_for(quote_amount, price.base(), price.quote())
}

/// Rounding cost of paying `base_amount` for `quote_amount` at `price`,
/// in units of `1 / pQ` base asset: `base * pQ - quote * pB`.
///
/// Zero when the price divides evenly; saturates at zero if `base_amount`
/// under-pays.
pub fn surcharge(quote_amount: &Amount, base_amount: &Amount, price: &Price) -> Amount {
    let paid = base_amount.value() * price.quote();
    let owed = quote_amount.value() * price.base();
    if paid > owed {
        Amount::from(paid - owed)
    } else {
        Amount::zero()
    }
}
