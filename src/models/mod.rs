// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures used by the REST API. Types that cross the
//! HTTP boundary serialize with camelCase field names; their snake_case storage
//! counterparts live in [`crate::storage::schema`].
//!
//! ## Model Categories
//!
//! - **Users**: platform accounts keyed by wallet address
//! - **Properties**: tokenized real-estate listings
//! - **Envelope**: the `{success, data, total, error}` response wrapper

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Declares a closed string enum whose wire form is shared by the API, the
/// query string and the storage records.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, utoipa::ToSchema,
        )]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// Wire representation of this value.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown {} `{}` (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($wire),+].join(", ")
                    )),
                }
            }
        }
    };
}

// Declared after the macro so both modules see it in textual scope.
pub mod property;
pub mod user;

pub use property::{
    Coordinates, CoordinatesPatch, CreatePropertyRequest, Property, PropertyStatus, PropertyType,
    UpdatePropertyRequest,
};
pub use user::{
    CreateUserRequest, KycStatus, NotificationPreferences, NotificationPreferencesPatch,
    SocialLinks, SocialLinksPatch, UpdateUserRequest, User, UserRole, UserStatus,
};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// The address is a *claim* supplied by the client; nothing here verifies
/// that the caller controls it.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::from("0xAD95fBF311a6EE0221a4BaDe4ae7DEfd8cE98eBb");
/// assert_eq!(addr.normalized().as_str(), "0xad95fbf311a6ee0221a4bade4ae7defd8ce98ebb");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used for storage and every comparison.
    pub fn normalized(&self) -> WalletAddress {
        WalletAddress(self.0.to_lowercase())
    }

    /// Whether the address carries the `0x` prefix.
    pub fn has_hex_prefix(&self) -> bool {
        self.0.starts_with("0x")
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Response Envelope
// =============================================================================

/// Uniform response wrapper for every resource endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Number of matching items before pagination (list endpoints only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
        }
    }

    pub fn page(data: T, total: usize) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: Some(total),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload (e.g. after a delete).
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            total: None,
            error: None,
        }
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Deserialize a query-string value, treating a missing or blank value as
/// "not provided" rather than as a parse error.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Trim entries, drop blanks and duplicates, keep first-seen order.
pub(crate) fn string_set(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut set: Vec<String> = Vec::new();
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !set.iter().any(|existing| existing == value) {
            set.push(value.to_string());
        }
    }
    set
}
