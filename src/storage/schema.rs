// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted record layout.
//!
//! Each resource has exactly one mapping pair between its API type and its
//! snake_case record. Exact-match conditions in [`crate::query`] name the
//! fields declared here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;
use crate::models::{
    Coordinates, KycStatus, NotificationPreferences, Property, PropertyStatus, PropertyType,
    SocialLinks, UpdatePropertyRequest, UpdateUserRequest, User, UserRole, UserStatus,
    WalletAddress,
};

/// Stored form of a [`User`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub wallet_address: String,
    #[serde(default)]
    pub email: Option<String>,
    pub display_name: String,
    pub status: UserStatus,
    pub role: UserRole,
    pub total_investments: String,
    pub properties_owned: u32,
    pub join_date: DateTime<Utc>,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub investment_preferences: Vec<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub notifications: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored form of a [`Property`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub price: String,
    pub total_shares: u64,
    pub available_shares: u64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub roi: String,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    pub owner_address: String,
    pub status: PropertyStatus,
    #[serde(default)]
    pub monthly_income: Option<String>,
    #[serde(default)]
    pub total_area: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for User {
    type Record = UserRecord;
    type Patch = UpdateUserRequest;

    const NAME: &'static str = "User";
    const COLLECTION: &'static str = "users";
    const CREATED_INDEX: &'static str = "users_by_created";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id.clone(),
            wallet_address: self.wallet_address.normalized().into(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            status: self.status,
            role: self.role,
            total_investments: self.total_investments.clone(),
            properties_owned: self.properties_owned,
            join_date: self.join_date,
            last_active: self.last_active,
            kyc_status: self.kyc_status,
            profile_image: self.profile_image.clone(),
            bio: self.bio.clone(),
            location: self.location.clone(),
            investment_preferences: self.investment_preferences.clone(),
            social_links: self.social_links.clone(),
            notifications: self.notifications,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_record(record: UserRecord) -> Self {
        Self {
            id: record.id,
            wallet_address: WalletAddress::from(record.wallet_address),
            email: record.email,
            display_name: record.display_name,
            status: record.status,
            role: record.role,
            total_investments: record.total_investments,
            properties_owned: record.properties_owned,
            join_date: record.join_date,
            last_active: record.last_active,
            kyc_status: record.kyc_status,
            profile_image: record.profile_image,
            bio: record.bio,
            location: record.location,
            investment_preferences: record.investment_preferences,
            social_links: record.social_links,
            notifications: record.notifications,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn apply_patch(&mut self, patch: &UpdateUserRequest, now: DateTime<Utc>) -> Result<(), String> {
        self.apply_update(patch, now)
    }
}

impl Resource for Property {
    type Record = PropertyRecord;
    type Patch = UpdatePropertyRequest;

    const NAME: &'static str = "Property";
    const COLLECTION: &'static str = "properties";
    const CREATED_INDEX: &'static str = "properties_by_created";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_record(&self) -> PropertyRecord {
        PropertyRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            price: self.price.clone(),
            total_shares: self.shares,
            available_shares: self.available_shares,
            image: self.image.clone(),
            images: self.images.clone(),
            tags: self.tags.clone(),
            roi: self.roi.clone(),
            property_type: self.property_type,
            owner_address: self.owner_address.normalized().into(),
            status: self.status,
            monthly_income: self.monthly_income.clone(),
            total_area: self.total_area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            year_built: self.year_built,
            amenities: self.amenities.clone(),
            coordinates: self.coordinates,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_record(record: PropertyRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            location: record.location,
            price: record.price,
            shares: record.total_shares,
            available_shares: record.available_shares,
            image: record.image,
            images: record.images,
            tags: record.tags,
            roi: record.roi,
            property_type: record.property_type,
            owner_address: WalletAddress::from(record.owner_address),
            status: record.status,
            monthly_income: record.monthly_income,
            total_area: record.total_area,
            bedrooms: record.bedrooms,
            bathrooms: record.bathrooms,
            year_built: record.year_built,
            amenities: record.amenities,
            coordinates: record.coordinates,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn apply_patch(
        &mut self,
        patch: &UpdatePropertyRequest,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        self.apply_update(patch, now)
    }
}
