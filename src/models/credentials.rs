//! Application credentials and per-call context.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use super::primitives::{Environment, Marketplace};
use crate::{Error, Result};

/// Application identity plus the contextual parameters sent with every
/// Browse API call.
///
/// Credentials are validated once, when built, and are immutable afterwards.
/// The `X-EBAY-C-ENDUSERCTX` value is derived at the same time.
///
/// # Example
///
/// ```
/// use browse_batch::Credentials;
///
/// let credentials = Credentials::builder("app-id", "cert-id")
///     .marketplace("EBAY_DE")
///     .affiliate("5338xxxxxx", Some("campaign-42"))
///     .locale("DE", "10115")
///     .build()?;
///
/// assert_eq!(credentials.marketplace().as_str(), "EBAY_DE");
/// assert!(credentials.context_header().is_some());
/// # Ok::<(), browse_batch::Error>(())
/// ```
#[derive(Clone)]
pub struct Credentials {
    app_id: String,
    secret: SecretString,
    marketplace: Marketplace,
    affiliate_id: Option<String>,
    affiliate_reference: Option<String>,
    locale: Option<(String, String)>,
    context_header: Option<String>,
}

impl Credentials {
    /// Credentials for the given marketplace with no affiliate or locale
    /// context.
    pub fn new(
        app_id: impl Into<String>,
        secret: impl Into<String>,
        marketplace_id: &str,
    ) -> Result<Self> {
        Self::builder(app_id, secret).marketplace(marketplace_id).build()
    }

    /// Start building credentials. The marketplace defaults to `EBAY_US`.
    pub fn builder(app_id: impl Into<String>, secret: impl Into<String>) -> CredentialsBuilder {
        CredentialsBuilder {
            app_id: app_id.into(),
            secret: secret.into(),
            marketplace_id: Marketplace::default().as_str().to_string(),
            affiliate_id: None,
            affiliate_reference: None,
            country: None,
            postal_code: None,
        }
    }

    /// Read credentials from the environment.
    ///
    /// Uses `EBAY_PROD_APP_ID`/`EBAY_PROD_CERT_ID` or
    /// `EBAY_SANDBOX_APP_ID`/`EBAY_SANDBOX_CERT_ID` depending on `env`, and
    /// `EBAY_MARKETPLACE_ID` when set.
    pub fn from_env(env: Environment) -> Result<Self> {
        let prefix = env.env_prefix();
        let read = |name: String| {
            std::env::var(&name)
                .ok()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Param(format!("{name} is not set")))
        };

        let app_id = read(format!("{prefix}_APP_ID"))?;
        let secret = read(format!("{prefix}_CERT_ID"))?;
        let mut builder = Self::builder(app_id, secret);
        if let Ok(marketplace_id) = std::env::var("EBAY_MARKETPLACE_ID") {
            builder = builder.marketplace(marketplace_id);
        }
        builder.build()
    }

    /// Application (client) id.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Target marketplace.
    pub fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    /// eBay Partner Network campaign id.
    pub fn affiliate_id(&self) -> Option<&str> {
        self.affiliate_id.as_deref()
    }

    /// Affiliate reference id.
    pub fn affiliate_reference(&self) -> Option<&str> {
        self.affiliate_reference.as_deref()
    }

    /// Shipping locale as `(country, postal_code)`.
    pub fn locale(&self) -> Option<(&str, &str)> {
        self.locale
            .as_ref()
            .map(|(country, postal_code)| (country.as_str(), postal_code.as_str()))
    }

    /// Composite `X-EBAY-C-ENDUSERCTX` value, if any context was given.
    pub fn context_header(&self) -> Option<&str> {
        self.context_header.as_deref()
    }

    /// `Basic base64(app_id:secret)` for the token exchange.
    pub(crate) fn basic_authorization(&self) -> SecretString {
        let raw = format!("{}:{}", self.app_id, self.secret.expose_secret());
        SecretString::from(format!("Basic {}", STANDARD.encode(raw)))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("secret", &"[REDACTED]")
            .field("marketplace", &self.marketplace)
            .field("context_header", &self.context_header)
            .finish()
    }
}

/// Builder for [`Credentials`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct CredentialsBuilder {
    app_id: String,
    secret: String,
    marketplace_id: String,
    affiliate_id: Option<String>,
    affiliate_reference: Option<String>,
    country: Option<String>,
    postal_code: Option<String>,
}

impl CredentialsBuilder {
    /// Set the marketplace code (e.g. `EBAY_GB`).
    pub fn marketplace(mut self, marketplace_id: impl Into<String>) -> Self {
        self.marketplace_id = marketplace_id.into();
        self
    }

    /// Set the affiliate campaign id and an optional reference id.
    pub fn affiliate(mut self, affiliate_id: impl Into<String>, reference: Option<&str>) -> Self {
        self.affiliate_id = Some(affiliate_id.into());
        self.affiliate_reference = reference.map(String::from);
        self
    }

    /// Set the affiliate reference id alone.
    ///
    /// Building fails unless an affiliate id is also set.
    pub fn affiliate_reference(mut self, reference: impl Into<String>) -> Self {
        self.affiliate_reference = Some(reference.into());
        self
    }

    /// Set both halves of the shipping locale.
    pub fn locale(mut self, country: impl Into<String>, postal_code: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Set the shipping country alone.
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Set the shipping postal code alone.
    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Validate and build the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Param`] if the marketplace is unknown, an affiliate
    /// reference is given without an affiliate id, or only one half of the
    /// locale is set.
    pub fn build(self) -> Result<Credentials> {
        let marketplace: Marketplace = self.marketplace_id.parse()?;

        if self.affiliate_reference.is_some() && self.affiliate_id.is_none() {
            return Err(Error::Param(
                "partner_id. For reference_id partner_id is required".to_string(),
            ));
        }

        let locale = match (self.country, self.postal_code) {
            (Some(country), Some(postal_code)) => Some((country, postal_code)),
            (None, None) => None,
            _ => {
                return Err(Error::Param(
                    "country or zip_code. These parameters can only both None or filled"
                        .to_string(),
                ))
            }
        };

        let context_header = context_header(
            self.affiliate_id.as_deref(),
            self.affiliate_reference.as_deref(),
            locale.as_ref(),
        );

        Ok(Credentials {
            app_id: self.app_id,
            secret: SecretString::from(self.secret),
            marketplace,
            affiliate_id: self.affiliate_id,
            affiliate_reference: self.affiliate_reference,
            locale,
            context_header,
        })
    }
}

fn context_header(
    affiliate_id: Option<&str>,
    affiliate_reference: Option<&str>,
    locale: Option<&(String, String)>,
) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(affiliate_id) = affiliate_id {
        parts.push(format!("affiliateCampaignId={affiliate_id}"));
        if let Some(reference) = affiliate_reference {
            parts.push(format!("affiliateReferenceId={reference}"));
        }
    }

    if let Some((country, postal_code)) = locale {
        let location = format!("country={country},zip={postal_code}");
        // Form encoding: spaces become '+'
        let encoded = urlencoding::encode(&location).replace("%20", "+");
        parts.push(format!("contextualLocation={encoded}"));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_us_without_context() {
        let credentials = Credentials::builder("app", "cert").build().unwrap();
        assert_eq!(credentials.marketplace(), Marketplace::Us);
        assert_eq!(credentials.context_header(), None);
        assert_eq!(credentials.locale(), None);
    }

    #[test]
    fn test_unknown_marketplace_rejected() {
        let err = Credentials::new("app", "cert", "EBAY_XX").unwrap_err();
        assert!(matches!(err, Error::Param(ref msg) if msg.contains("marketplace_id")));
    }

    #[test]
    fn test_reference_requires_affiliate_id() {
        let err = Credentials::builder("app", "cert")
            .affiliate_reference("ref-1")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Param(ref msg) if msg.contains("partner_id")));
    }

    #[test]
    fn test_locale_is_both_or_neither() {
        let only_country = Credentials::builder("app", "cert").country("US").build();
        assert!(matches!(only_country, Err(Error::Param(_))));

        let only_zip = Credentials::builder("app", "cert")
            .postal_code("19406")
            .build();
        assert!(matches!(only_zip, Err(Error::Param(_))));
    }

    #[test]
    fn test_context_header_affiliate_and_locale() {
        let credentials = Credentials::builder("app", "cert")
            .affiliate("5338000000", Some("ref-1"))
            .locale("US", "19406")
            .build()
            .unwrap();

        assert_eq!(
            credentials.context_header(),
            Some(
                "affiliateCampaignId=5338000000,affiliateReferenceId=ref-1,\
                 contextualLocation=country%3DUS%2Czip%3D19406"
            )
        );
    }

    #[test]
    fn test_context_header_form_encodes_spaces() {
        let credentials = Credentials::builder("app", "cert")
            .locale("GB", "SW1A 1AA")
            .build()
            .unwrap();

        assert_eq!(
            credentials.context_header(),
            Some("contextualLocation=country%3DGB%2Czip%3DSW1A+1AA")
        );
    }

    #[test]
    fn test_basic_authorization() {
        let credentials = Credentials::new("app", "cert", "EBAY_US").unwrap();
        // base64("app:cert")
        assert_eq!(
            credentials.basic_authorization().expose_secret(),
            "Basic YXBwOmNlcnQ="
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("app", "super-secret-cert", "EBAY_US").unwrap();
        let debug_str = format!("{:?}", credentials);
        assert!(!debug_str.contains("super-secret-cert"));
        assert!(debug_str.contains("REDACTED"));
    }
}
