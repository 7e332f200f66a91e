// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{string_set, WalletAddress};

/// Display name given to accounts registered without one.
pub const DEFAULT_DISPLAY_NAME: &str = "Unknown User";

wire_enum! {
    /// Platform role of a user.
    #[derive(Default)]
    pub enum UserRole {
        Admin => "admin",
        #[default]
        User => "user",
        Investor => "investor",
    }
}

wire_enum! {
    /// Account lifecycle status.
    #[derive(Default)]
    pub enum UserStatus {
        Active => "active",
        #[default]
        Pending => "pending",
        Suspended => "suspended",
        Rejected => "rejected",
    }
}

wire_enum! {
    /// Know-your-customer verification state.
    #[derive(Default)]
    pub enum KycStatus {
        #[default]
        Pending => "pending",
        Verified => "verified",
        Rejected => "rejected",
        NotRequired => "not_required",
    }
}

/// Per-channel notification opt-ins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NotificationPreferences {
    pub email: bool,
    pub sms: bool,
    pub push: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
            push: true,
        }
    }
}

/// Partial update for [`NotificationPreferences`]; absent keys are kept.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NotificationPreferencesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,
}

impl NotificationPreferences {
    pub fn merge(&mut self, patch: &NotificationPreferencesPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(sms) = patch.sms {
            self.sms = sms;
        }
        if let Some(push) = patch.push {
            self.push = push;
        }
    }
}

/// Public profile links. Empty strings mean "not set".
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SocialLinks {
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub discord: String,
}

/// Partial update for [`SocialLinks`]; absent keys are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SocialLinksPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
}

impl SocialLinks {
    pub fn merge(&mut self, patch: &SocialLinksPatch) {
        let fields = [
            (&mut self.twitter, &patch.twitter),
            (&mut self.linkedin, &patch.linkedin),
            (&mut self.website, &patch.website),
            (&mut self.discord, &patch.discord),
        ];
        for (current, update) in fields {
            if let Some(value) = update {
                *current = value.trim().to_string();
            }
        }
    }
}

/// A platform user.
///
/// The wallet address is the identity key: unique across all users and always
/// stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque record identifier (UUID).
    pub id: String,
    /// Lowercase wallet address.
    pub wallet_address: WalletAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: String,
    pub status: UserStatus,
    pub role: UserRole,
    /// Cumulative invested amount (decimal string, ETH).
    pub total_investments: String,
    pub properties_owned: u32,
    pub join_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    pub kyc_status: KycStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub investment_preferences: Vec<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    pub notifications: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Wallet address (must start with `0x`).
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub investment_preferences: Option<Vec<String>>,
}

/// Partial update of a user. The wallet address cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub kyc_status: Option<KycStatus>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub investment_preferences: Option<Vec<String>>,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notifications: Option<NotificationPreferencesPatch>,
    #[serde(default)]
    pub social_links: Option<SocialLinksPatch>,
}

impl User {
    /// Build a new pending user from a request whose address was validated.
    pub fn register(
        id: String,
        wallet_address: &WalletAddress,
        request: CreateUserRequest,
        now: DateTime<Utc>,
    ) -> Self {
        let display_name = request
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        Self {
            id,
            wallet_address: wallet_address.normalized(),
            email: request.email,
            display_name,
            status: UserStatus::Pending,
            role: request.role.unwrap_or_default(),
            total_investments: "0.0".to_string(),
            properties_owned: 0,
            join_date: now,
            last_active: None,
            kyc_status: KycStatus::Pending,
            profile_image: None,
            bio: request.bio,
            location: request.location,
            investment_preferences: string_set(request.investment_preferences.unwrap_or_default()),
            social_links: SocialLinks::default(),
            notifications: NotificationPreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge an update; nested preference objects merge key-by-key.
    pub fn apply_update(&mut self, update: &UpdateUserRequest, now: DateTime<Utc>) -> Result<(), String> {
        if let Some(name) = &update.display_name {
            let name = name.trim();
            if name.is_empty() {
                return Err("Display name cannot be empty".to_string());
            }
            self.display_name = name.to_string();
        }
        if let Some(email) = &update.email {
            self.email = Some(email.clone());
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(kyc_status) = update.kyc_status {
            self.kyc_status = kyc_status;
        }
        if let Some(bio) = &update.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(location) = &update.location {
            self.location = Some(location.clone());
        }
        if let Some(image) = &update.profile_image {
            self.profile_image = Some(image.clone());
        }
        if let Some(preferences) = &update.investment_preferences {
            self.investment_preferences = string_set(preferences.iter().cloned());
        }
        if let Some(last_active) = update.last_active {
            self.last_active = Some(last_active);
        }
        if let Some(notifications) = &update.notifications {
            self.notifications.merge(notifications);
        }
        if let Some(links) = &update.social_links {
            self.social_links.merge(links);
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn registered() -> User {
        User::register(
            "u-1".to_string(),
            &WalletAddress::from("0xABCdef"),
            CreateUserRequest {
                wallet_address: Some("0xABCdef".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn register_applies_defaults() {
        let user = registered();
        assert_eq!(user.wallet_address.as_str(), "0xabcdef");
        assert_eq!(user.display_name, DEFAULT_DISPLAY_NAME);
        assert_eq!(user.status, UserStatus::Pending);
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.kyc_status, KycStatus::Pending);
        assert_eq!(user.total_investments, "0.0");
        assert_eq!(user.properties_owned, 0);
        assert_eq!(user.notifications, NotificationPreferences::default());
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(user.join_date, user.created_at);
    }

    #[test]
    fn notifications_merge_key_by_key() {
        let mut user = registered();
        let later = user.updated_at + Duration::seconds(5);
        let update = UpdateUserRequest {
            notifications: Some(NotificationPreferencesPatch {
                sms: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        user.apply_update(&update, later).unwrap();

        assert_eq!(
            user.notifications,
            NotificationPreferences {
                email: true,
                sms: true,
                push: true,
            }
        );
        assert_eq!(user.updated_at, later);
    }

    #[test]
    fn update_is_shallow_for_scalars() {
        let mut user = registered();
        let update = UpdateUserRequest {
            status: Some(UserStatus::Active),
            kyc_status: Some(KycStatus::Verified),
            ..Default::default()
        };
        user.apply_update(&update, Utc::now()).unwrap();

        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.kyc_status, KycStatus::Verified);
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.display_name, DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn blank_display_name_is_rejected() {
        let mut user = registered();
        let update = UpdateUserRequest {
            display_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(user.apply_update(&update, Utc::now()).is_err());
        assert_eq!(user.display_name, DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn wire_enums_round_trip_through_strings() {
        assert_eq!(KycStatus::NotRequired.as_str(), "not_required");
        assert_eq!("investor".parse::<UserRole>(), Ok(UserRole::Investor));
        assert!("superuser".parse::<UserRole>().is_err());
        assert_eq!(
            serde_json::to_value(UserStatus::Suspended).unwrap(),
            serde_json::json!("suspended")
        );
    }

    #[test]
    fn user_serializes_camel_case() {
        let json = serde_json::to_value(registered()).unwrap();
        assert!(json.get("walletAddress").is_some());
        assert!(json.get("kycStatus").is_some());
        assert!(json.get("wallet_address").is_none());
    }
}
