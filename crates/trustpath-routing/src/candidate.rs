use serde::{Deserialize, Serialize};
use std::fmt;
use trustpath_core::{Amount, Asset, TrustlineResource};

/// Where the base amount of a candidate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Funding {
    /// Debited from a balance the payer holds.
    Balance,
    /// Issued by the payer, who owns the base asset.
    Issuance,
}

/// A proposed route: zero or one trustline crossings, the base asset debited
/// from the payer, and how much of it.
///
/// Candidates are snapshots. Trustline remainders can move between
/// resolution and settlement, so the settlement layer must re-validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Trustlines crossed, in order from payer toward the quote asset.
    path: Vec<TrustlineResource>,
    /// The asset debited from the payer.
    pub base_asset: Asset,
    /// Base asset amount debited.
    pub amount: Amount,
    /// Quote asset amount delivered.
    pub quote_amount: Amount,
    pub funding: Funding,
    /// Rounding cost of the crossing, `amount * pQ - quote_amount * pB`.
    pub surcharge: Amount,
}

impl Candidate {
    /// A direct payment out of an existing balance of the quote asset.
    pub fn direct(asset: Asset, amount: Amount) -> Self {
        Self {
            path: Vec::new(),
            base_asset: asset,
            quote_amount: amount.clone(),
            amount,
            funding: Funding::Balance,
            surcharge: Amount::zero(),
        }
    }

    /// A payment crossing `trustline`: `amount` of `base_asset` buys
    /// `quote_amount` of the trustline's quote asset, overpaying by
    /// `surcharge`.
    pub fn crossing(
        trustline: TrustlineResource,
        base_asset: Asset,
        amount: Amount,
        quote_amount: Amount,
        surcharge: Amount,
        funding: Funding,
    ) -> Self {
        Self {
            path: vec![trustline],
            base_asset,
            amount,
            quote_amount,
            funding,
            surcharge,
        }
    }

    /// The trustlines crossed.
    pub fn path(&self) -> &[TrustlineResource] {
        &self.path
    }

    /// Number of trustline crossings.
    pub fn hop_count(&self) -> usize {
        self.path.len()
    }

    pub fn is_direct(&self) -> bool {
        self.path.is_empty()
    }

    /// Trustline ids in crossing order, as a settlement request expects them.
    pub fn path_ids(&self) -> Vec<String> {
        self.path.iter().map(|t| t.id.clone()).collect()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.base_asset)?;
        if self.path.is_empty() {
            return write!(f, " (direct)");
        }
        for hop in &self.path {
            write!(f, " via {} (pair={} price={})", hop.id, hop.pair, hop.price)?;
        }
        if self.funding == Funding::Issuance {
            write!(f, " [issued]")?;
        }
        Ok(())
    }
}
