//! Primitive types shared across the client.
//!
//! Strongly-typed wrappers for marketplace codes, environments and item
//! identifiers so that they cannot be mixed up with free-form strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A strongly-typed eBay RESTful item identifier (e.g. `v1|110552191234|0`).
///
/// # Example
///
/// ```
/// use browse_batch::ItemId;
///
/// let item = ItemId::new("v1|110552191234|0");
/// assert_eq!(item.as_str(), "v1|110552191234|0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new item ID.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the item ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// eBay API environment.
///
/// Determines which hosts serve the token exchange and the Browse API.
///
/// # Example
///
/// ```
/// use browse_batch::Environment;
///
/// let env = Environment::Sandbox;
/// assert_eq!(env.api_base_url(), "https://api.sandbox.ebay.com");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Live marketplace data.
    Production,
    /// Developer sandbox.
    #[default]
    Sandbox,
}

impl Environment {
    /// Get the API host for this environment.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.ebay.com",
            Environment::Sandbox => "https://api.sandbox.ebay.com",
        }
    }

    /// Returns `true` if this is the sandbox environment.
    pub fn is_sandbox(&self) -> bool {
        matches!(self, Environment::Sandbox)
    }

    /// Prefix of the credential environment variables for this environment.
    pub(crate) fn env_prefix(&self) -> &'static str {
        match self {
            Environment::Production => "EBAY_PROD",
            Environment::Sandbox => "EBAY_SANDBOX",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Sandbox => write!(f, "sandbox"),
        }
    }
}

macro_rules! marketplaces {
    ($($(#[$doc:meta])* $variant:ident => $code:literal,)+) => {
        /// An eBay marketplace, sent as `X-EBAY-C-MARKETPLACE-ID`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum Marketplace {
            $(
                $(#[$doc])*
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl Marketplace {
            /// Every supported marketplace.
            pub const ALL: &'static [Marketplace] = &[$(Marketplace::$variant),+];

            /// Get the wire code (e.g. `EBAY_US`).
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Marketplace::$variant => $code,)+
                }
            }
        }

        impl FromStr for Marketplace {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                match s {
                    $($code => Ok(Marketplace::$variant),)+
                    _ => Err(crate::Error::Param(format!(
                        "marketplace_id: unknown marketplace {}",
                        s
                    ))),
                }
            }
        }
    };
}

marketplaces! {
    /// United States
    #[default]
    Us => "EBAY_US",
    /// Austria
    At => "EBAY_AT",
    /// Australia
    Au => "EBAY_AU",
    /// Belgium
    Be => "EBAY_BE",
    /// Canada
    Ca => "EBAY_CA",
    /// Switzerland
    Ch => "EBAY_CH",
    /// Germany
    De => "EBAY_DE",
    /// Spain
    Es => "EBAY_ES",
    /// France
    Fr => "EBAY_FR",
    /// Great Britain
    Gb => "EBAY_GB",
    /// Hong Kong
    Hk => "EBAY_HK",
    /// Ireland
    Ie => "EBAY_IE",
    /// India
    In => "EBAY_IN",
    /// Italy
    It => "EBAY_IT",
    /// Malaysia
    My => "EBAY_MY",
    /// Netherlands
    Nl => "EBAY_NL",
    /// Philippines
    Ph => "EBAY_PH",
    /// Poland
    Pl => "EBAY_PL",
    /// Singapore
    Sg => "EBAY_SG",
    /// Thailand
    Th => "EBAY_TH",
    /// Taiwan
    Tw => "EBAY_TW",
    /// Vietnam
    Vn => "EBAY_VN",
    /// eBay Motors (US)
    MotorsUs => "EBAY_MOTORS_US",
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketplace_codes() {
        assert_eq!(Marketplace::ALL.len(), 23);
        assert_eq!("EBAY_US".parse::<Marketplace>().unwrap(), Marketplace::Us);
        assert_eq!(
            "EBAY_MOTORS_US".parse::<Marketplace>().unwrap(),
            Marketplace::MotorsUs
        );
        for marketplace in Marketplace::ALL {
            assert_eq!(
                marketplace.as_str().parse::<Marketplace>().unwrap(),
                *marketplace
            );
        }
    }

    #[test]
    fn test_unknown_marketplace() {
        let err = "EBAY_MARS".parse::<Marketplace>().unwrap_err();
        assert!(matches!(err, crate::Error::Param(_)));
        // Codes are case sensitive on the wire
        assert!("ebay_us".parse::<Marketplace>().is_err());
    }

    #[test]
    fn test_marketplace_serde() {
        let json = serde_json::to_string(&Marketplace::Gb).unwrap();
        assert_eq!(json, "\"EBAY_GB\"");
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(Environment::Production.api_base_url(), "https://api.ebay.com");
        assert_eq!(
            Environment::Sandbox.api_base_url(),
            "https://api.sandbox.ebay.com"
        );
        assert_eq!(Environment::default(), Environment::Sandbox);
    }
}
