//! Canonical target fields and mapping slots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix used to synthesize the key of a custom-field slot.
pub const CUSTOM_FIELD_PREFIX: &str = "custom_";

/// The fixed set of target fields an imported row can be mapped onto.
///
/// Variant order is the canonical field order used for composite keys,
/// column listings and payload output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    AppName,
    AppId,
    Developer,
    Category,
    Country,
    CompanyWebsite,
    CompanyLinkedinUrl,
    SensorTowerId,
    GooglePlayId,
    DeveloperId,
}

impl CanonicalField {
    /// All canonical fields in canonical order.
    pub const ALL: [CanonicalField; 10] = [
        Self::AppName,
        Self::AppId,
        Self::Developer,
        Self::Category,
        Self::Country,
        Self::CompanyWebsite,
        Self::CompanyLinkedinUrl,
        Self::SensorTowerId,
        Self::GooglePlayId,
        Self::DeveloperId,
    ];

    /// Stable camelCase key (e.g. `appName`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AppName => "appName",
            Self::AppId => "appId",
            Self::Developer => "developer",
            Self::Category => "category",
            Self::Country => "country",
            Self::CompanyWebsite => "companyWebsite",
            Self::CompanyLinkedinUrl => "companyLinkedinUrl",
            Self::SensorTowerId => "sensorTowerId",
            Self::GooglePlayId => "googlePlayId",
            Self::DeveloperId => "developerId",
        }
    }

    /// Column label as it appears in the sample file and the remote table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AppName => "App Name",
            Self::AppId => "App ID",
            Self::Developer => "Developer",
            Self::Category => "Category",
            Self::Country => "Country",
            Self::CompanyWebsite => "Company Website",
            Self::CompanyLinkedinUrl => "Company LinkedIn URL",
            Self::SensorTowerId => "Sensor Tower ID",
            Self::GooglePlayId => "Google Play ID",
            Self::DeveloperId => "Developer ID",
        }
    }

    /// Only the app name must be present on every row.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::AppName)
    }

    /// Look up a field by its camelCase key (case-insensitive).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }

    /// Look up a field by its display label (case-insensitive, trimmed).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Destination of a source column: a canonical field or a custom slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSlot {
    Canonical(CanonicalField),
    /// Custom slot named after the original header text.
    Custom(String),
}

impl FieldSlot {
    /// Custom slot for a header.
    pub fn custom(header: impl Into<String>) -> Self {
        Self::Custom(header.into())
    }

    /// Slot key: the canonical key or `custom_<header>`.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Canonical(field) => field.key().to_string(),
            Self::Custom(header) => format!("{CUSTOM_FIELD_PREFIX}{header}"),
        }
    }

    /// Parse a slot key produced by [`FieldSlot::key`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        if let Some(header) = key.strip_prefix(CUSTOM_FIELD_PREFIX) {
            return Some(Self::Custom(header.to_string()));
        }
        CanonicalField::from_key(key).map(Self::Canonical)
    }

    #[must_use]
    pub fn canonical(&self) -> Option<CanonicalField> {
        match self {
            Self::Canonical(field) => Some(*field),
            Self::Custom(_) => None,
        }
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for FieldSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
