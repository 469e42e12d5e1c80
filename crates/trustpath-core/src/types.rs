use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::CoreError;

/// Largest asset scale a ledger accepts.
pub const MAX_ASSET_SCALE: u8 = 24;

/// Exclusive upper bound on amounts and price components accepted from
/// user input (2^128).
pub fn max_asset_amount() -> &'static BigUint {
    static MAX: OnceLock<BigUint> = OnceLock::new();
    MAX.get_or_init(|| BigUint::one() << 128u32)
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.')
}

/// A user address on a ledger, `username@host[:port]`.
///
/// Usernames may carry a `+tag` suffix (`alice+savings@mint.example`); the
/// tag is dropped when the address is parsed, so two addresses differing
/// only by tag compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    username: String,
    host: String,
}

impl Address {
    /// Parse and normalize an address.
    pub fn parse(address: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidAddress(address.to_string());

        let (user, host) = address.split_once('@').ok_or_else(invalid)?;

        let username = match user.split_once('+') {
            Some((name, tag)) => {
                if tag.is_empty() || !tag.chars().all(is_username_char) {
                    return Err(invalid());
                }
                name
            }
            None => user,
        };
        if username.is_empty() || username.len() > 256 || !username.chars().all(is_username_char)
        {
            return Err(invalid());
        }

        let domain = match host.rsplit_once(':') {
            Some((domain, port)) => {
                if port.is_empty() || port.len() > 5 || !port.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                domain
            }
            None => host,
        };
        match domain.split_once('.') {
            Some((label, rest))
                if !label.is_empty()
                    && !rest.is_empty()
                    && domain.chars().all(is_host_char) => {}
            _ => return Err(invalid()),
        }

        Ok(Self {
            username: username.to_string(),
            host: host.to_string(),
        })
    }

    /// The username, without any `+tag`.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The ledger host, including the port when one was given.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.host)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// An issuable unit identified by `(owner, code, scale)`.
///
/// Canonical name: `owner[CODE.scale]`, e.g. `alice@mint.example[USD.2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    owner: Address,
    code: String,
    scale: u8,
}

impl Asset {
    /// Create an asset from its components.
    pub fn new(owner: Address, code: &str, scale: u8) -> Result<Self, CoreError> {
        if code.is_empty()
            || code.len() > 64
            || !code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(CoreError::InvalidAssetName(format!("{}[{}.{}]", owner, code, scale)));
        }
        if scale > MAX_ASSET_SCALE {
            return Err(CoreError::InvalidScale(scale.to_string()));
        }
        Ok(Self {
            owner,
            code: code.to_string(),
            scale,
        })
    }

    /// Parse a canonical asset name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidAssetName(name.to_string());

        let body = name.strip_suffix(']').ok_or_else(invalid)?;
        let (owner, code_scale) = body.rsplit_once('[').ok_or_else(invalid)?;
        let (code, scale) = code_scale.rsplit_once('.').ok_or_else(invalid)?;

        if scale.is_empty() || scale.len() > 2 || !scale.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let scale: u8 = scale
            .parse()
            .map_err(|_| CoreError::InvalidScale(scale.to_string()))?;

        let owner = Address::parse(owner).map_err(|_| invalid())?;
        Self::new(owner, code, scale).map_err(|e| match e {
            CoreError::InvalidScale(_) => e,
            _ => invalid(),
        })
    }

    /// The issuer of this asset.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// The asset code, e.g. `USD`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Number of decimal digits of the smallest unit.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// The canonical name.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}.{}]", self.owner, self.code, self.scale)
    }
}

impl FromStr for Asset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<String> for Asset {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}

/// The `base/quote` asset pair of a trustline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetPair {
    pub base: Asset,
    pub quote: Asset,
}

impl AssetPair {
    /// Parse a `base/quote` pair.
    pub fn parse(pair: &str) -> Result<Self, CoreError> {
        let invalid = |_| CoreError::InvalidPair(pair.to_string());

        let mut sides = pair.split('/');
        match (sides.next(), sides.next(), sides.next()) {
            (Some(base), Some(quote), None) => Ok(Self {
                base: Asset::from_name(base).map_err(invalid)?,
                quote: Asset::from_name(quote).map_err(invalid)?,
            }),
            _ => Err(CoreError::InvalidPair(pair.to_string())),
        }
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// A non-negative, arbitrary-precision quantity in an asset's smallest unit.
///
/// Serialized as a decimal string; deserializes from a decimal string or a
/// JSON integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(BigUint);

impl Amount {
    /// Parse user input: a plain decimal integer strictly below 2^128.
    pub fn parse(amount: &str) -> Result<Self, CoreError> {
        let value = parse_decimal(amount)
            .ok_or_else(|| CoreError::InvalidAmount(amount.to_string()))?;
        if &value >= max_asset_amount() {
            return Err(CoreError::InvalidAmount(amount.to_string()));
        }
        Ok(Self(value))
    }

    /// Zero amount.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The underlying integer.
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }

    /// `self - other`, or `None` when `other` is larger.
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if other.0 > self.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }
}

/// Digits only: no sign, no whitespace, no separators.
fn parse_decimal(s: &str) -> Option<BigUint> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(s.as_bytes(), 10)
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl serde::de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative decimal integer or integer string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
                parse_decimal(v)
                    .map(Amount)
                    .ok_or_else(|| E::custom(format!("invalid amount: {}", v)))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
                u64::try_from(v)
                    .map(Amount::from)
                    .map_err(|_| E::custom(format!("negative amount: {}", v)))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// A trustline exchange rate, `base/quote`: `base` units of the base asset
/// are worth `quote` units of the quote asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Price {
    base: BigUint,
    quote: BigUint,
}

impl Price {
    /// Create a price from its components. Both must be positive and below
    /// 2^128.
    pub fn new(base: impl Into<BigUint>, quote: impl Into<BigUint>) -> Result<Self, CoreError> {
        let (base, quote) = (base.into(), quote.into());
        for component in [&base, &quote] {
            if component.is_zero() || component >= max_asset_amount() {
                return Err(CoreError::InvalidPrice(format!("{}/{}", base, quote)));
            }
        }
        Ok(Self { base, quote })
    }

    /// Parse a `pB/pQ` price string.
    pub fn parse(price: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidPrice(price.to_string());

        let (base, quote) = price.split_once('/').ok_or_else(invalid)?;
        let base = parse_decimal(base).ok_or_else(invalid)?;
        let quote = parse_decimal(quote).ok_or_else(invalid)?;
        Self::new(base, quote).map_err(|_| invalid())
    }

    /// The base asset price component.
    pub fn base(&self) -> &BigUint {
        &self.base
    }

    /// The quote asset price component.
    pub fn quote(&self) -> &BigUint {
        &self.quote
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Which side of a trustline a listing is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Propagation {
    /// Owned by the quote asset's owner.
    #[default]
    Canonical,
    /// The reciprocal copy held on the base asset owner's side.
    Propagated,
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => write!(f, "canonical"),
            Self::Propagated => write!(f, "propagated"),
        }
    }
}

/// Lifecycle status of a trustline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustlineStatus {
    #[default]
    Active,
    /// Terminal: closed by its owner.
    Closed,
    /// Remainder reached zero.
    Consumed,
}

impl fmt::Display for TrustlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
            Self::Consumed => write!(f, "consumed"),
        }
    }
}

/// Identifier of a ledger resource: `owner[token]`, e.g.
/// `alice@mint.example[offer_1a2b]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub owner: Address,
    pub token: String,
}

impl ResourceId {
    pub fn new(owner: Address, token: impl Into<String>) -> Self {
        Self {
            owner,
            token: token.into(),
        }
    }

    /// Parse an id, normalizing its owner address.
    pub fn parse(id: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidId(id.to_string());

        let body = id.strip_suffix(']').ok_or_else(invalid)?;
        let (owner, token) = body.rsplit_once('[').ok_or_else(invalid)?;
        let (prefix, suffix) = token.split_once('_').ok_or_else(invalid)?;
        if prefix.is_empty()
            || !prefix.chars().all(|c| c.is_ascii_lowercase())
            || suffix.is_empty()
            || !suffix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(invalid());
        }

        Ok(Self {
            owner: Address::parse(owner).map_err(|_| invalid())?,
            token: token.to_string(),
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.owner, self.token)
    }
}
