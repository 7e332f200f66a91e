// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tokenized property models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{string_set, WalletAddress};

wire_enum! {
    /// Kind of real estate behind a listing.
    pub enum PropertyType {
        Residential => "Residential",
        Commercial => "Commercial",
        Industrial => "Industrial",
        Retail => "Retail",
        Office => "Office",
        Luxury => "Luxury",
    }
}

wire_enum! {
    /// Listing status.
    #[derive(Default)]
    pub enum PropertyStatus {
        #[default]
        Active => "active",
        Pending => "pending",
        Sold => "sold",
        Draft => "draft",
    }
}

/// Geographic position of a property.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Partial update for [`Coordinates`]; absent keys are kept.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CoordinatesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// A tokenized property listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Opaque record identifier (UUID).
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: String,
    /// Listing price (decimal string).
    pub price: String,
    /// Total number of shares issued.
    pub shares: u64,
    /// Shares still available for purchase (`0 <= available <= shares`).
    pub available_shares: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Expected return on investment (decimal string, percent).
    pub roi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    /// Lowercase wallet address of the creator.
    pub owner_address: WalletAddress,
    pub status: PropertyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to list a new property.
///
/// `price` and `shares` are kept loosely typed so that validation can report
/// field problems in a fixed order instead of failing on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Price as a decimal string (numbers are accepted too).
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price: Option<serde_json::Value>,
    /// Total shares to issue (positive integer).
    #[serde(default)]
    #[schema(value_type = Option<u64>)]
    pub shares: Option<serde_json::Value>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub roi: Option<String>,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
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
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Partial update of a property. The owner cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub shares: Option<u64>,
    #[serde(default)]
    pub available_shares: Option<u64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub roi: Option<String>,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub status: Option<PropertyStatus>,
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
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub coordinates: Option<CoordinatesPatch>,
}

/// Parse a strictly positive decimal price.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|price| *price > Decimal::ZERO)
}

/// Fields of a create request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedListing {
    pub title: String,
    pub location: String,
    pub price: String,
    pub shares: u64,
}

impl Property {
    /// Build a new active listing; every share starts out available.
    pub fn list(
        id: String,
        owner: &WalletAddress,
        listing: ValidatedListing,
        request: CreatePropertyRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: listing.title,
            description: request
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            location: listing.location,
            price: listing.price,
            shares: listing.shares,
            available_shares: listing.shares,
            image: request.image,
            images: string_set(request.images.unwrap_or_default()),
            tags: string_set(request.tags.unwrap_or_default()),
            roi: request.roi.unwrap_or_else(|| "0".to_string()),
            property_type: request.property_type,
            owner_address: owner.normalized(),
            status: PropertyStatus::Active,
            monthly_income: request.monthly_income,
            total_area: request.total_area,
            bedrooms: request.bedrooms,
            bathrooms: request.bathrooms,
            year_built: request.year_built,
            amenities: string_set(request.amenities.unwrap_or_default()),
            coordinates: request.coordinates,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge an update and re-check the share invariants.
    ///
    /// Lowering `shares` without an explicit `availableShares` clamps the
    /// available count to the new total.
    pub fn apply_update(
        &mut self,
        update: &UpdatePropertyRequest,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        let mut next = self.clone();

        if let Some(title) = &update.title {
            next.title = title.trim().to_string();
            if next.title.is_empty() {
                return Err("Property title is required".to_string());
            }
        }
        if let Some(location) = &update.location {
            next.location = location.trim().to_string();
            if next.location.is_empty() {
                return Err("Property location is required".to_string());
            }
        }
        if let Some(price) = &update.price {
            if parse_price(price).is_none() {
                return Err("Valid property price is required".to_string());
            }
            next.price = price.trim().to_string();
        }
        if let Some(shares) = update.shares {
            if shares == 0 {
                return Err("Valid number of shares is required".to_string());
            }
            next.shares = shares;
            next.available_shares = next.available_shares.min(shares);
        }
        if let Some(available) = update.available_shares {
            if available > next.shares {
                return Err(format!(
                    "Available shares ({available}) cannot exceed total shares ({})",
                    next.shares
                ));
            }
            next.available_shares = available;
        }
        if let Some(description) = &update.description {
            next.description = Some(description.trim().to_string());
        }
        if let Some(image) = &update.image {
            next.image = Some(image.clone());
        }
        if let Some(images) = &update.images {
            next.images = string_set(images.iter().cloned());
        }
        if let Some(tags) = &update.tags {
            next.tags = string_set(tags.iter().cloned());
        }
        if let Some(roi) = &update.roi {
            next.roi = roi.clone();
        }
        if let Some(property_type) = update.property_type {
            next.property_type = Some(property_type);
        }
        if let Some(status) = update.status {
            next.status = status;
        }
        if let Some(income) = &update.monthly_income {
            next.monthly_income = Some(income.clone());
        }
        if let Some(area) = update.total_area {
            next.total_area = Some(area);
        }
        if let Some(bedrooms) = update.bedrooms {
            next.bedrooms = Some(bedrooms);
        }
        if let Some(bathrooms) = update.bathrooms {
            next.bathrooms = Some(bathrooms);
        }
        if let Some(year) = update.year_built {
            next.year_built = Some(year);
        }
        if let Some(amenities) = &update.amenities {
            next.amenities = string_set(amenities.iter().cloned());
        }
        if let Some(patch) = update.coordinates {
            next.coordinates = match (next.coordinates, patch) {
                (Some(current), patch) => Some(Coordinates {
                    lat: patch.lat.unwrap_or(current.lat),
                    lng: patch.lng.unwrap_or(current.lng),
                }),
                (None, CoordinatesPatch { lat: Some(lat), lng: Some(lng) }) => {
                    Some(Coordinates { lat, lng })
                }
                (None, _) => {
                    return Err("Coordinates require both lat and lng".to_string());
                }
            };
        }

        next.updated_at = now;
        *self = next;
        Ok(())
    }
}
