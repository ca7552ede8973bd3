// src/services/assembler.rs
// DOCUMENTATION: View model assembly
// PURPOSE: Join summaries, media and verdicts into ordered views plus a map payload

use crate::models::{
    AccessibilityVerdict, Coordinates, MapView, PlaceMedia, PlaceSummary, PlaceView,
    METERS_PER_MILE,
};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::json;
use std::collections::HashMap;

/// Zoom level used for a one mile radius
const BASE_ZOOM: u8 = 15;

/// Radius beyond which the zoom stops decreasing
const MAX_ZOOM_MILES: u32 = 10;

/// Pure transformations from pipeline output to presentation models
pub struct PresentationAssembler;

impl PresentationAssembler {
    /// Combine per-place results, preserving search order
    /// DOCUMENTATION: Media and verdicts are looked up by place id; a missing
    /// entry yields empty media or a "no signal" verdict
    pub fn assemble(
        summaries: Vec<PlaceSummary>,
        media: &HashMap<String, PlaceMedia>,
        verdicts: &HashMap<String, AccessibilityVerdict>,
    ) -> Vec<PlaceView> {
        summaries
            .into_iter()
            .map(|summary| {
                let place_media = media.get(&summary.id).cloned().unwrap_or_default();
                let verdict = verdicts.get(&summary.id).cloned().unwrap_or_default();
                Self::to_view(summary, place_media, verdict)
            })
            .collect()
    }

    fn to_view(
        summary: PlaceSummary,
        media: PlaceMedia,
        verdict: AccessibilityVerdict,
    ) -> PlaceView {
        PlaceView {
            photo_url: media.photos.first().cloned(),
            id: summary.id,
            name: summary.name,
            address: summary.address,
            coordinates: summary.coordinates,
            rating: summary.rating,
            rating_count: summary.rating_count,
            photos: media.photos,
            reviews: media.reviews,
            accessible: verdict.accessible,
            accessibility_source: verdict.source,
            sensory_matches: verdict.sensory_matches,
        }
    }

    /// 15 at one mile, one level less per extra mile, capped at ten miles
    pub fn zoom_for_radius(radius_m: u32) -> u8 {
        let miles = radius_m
            .div_ceil(METERS_PER_MILE)
            .clamp(1, MAX_ZOOM_MILES);
        BASE_ZOOM + 1 - miles as u8
    }

    /// Map payload; places without coordinates are left off the map
    pub fn map_view(center: Coordinates, radius_m: u32, views: &[PlaceView]) -> MapView {
        let features = views
            .iter()
            .filter_map(|view| {
                view.coordinates
                    .map(|coordinates| Self::marker(view, coordinates))
            })
            .collect();

        MapView {
            center,
            zoom: Self::zoom_for_radius(radius_m),
            markers: FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
        }
    }

    fn marker(view: &PlaceView, coordinates: Coordinates) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), json!(view.name));
        properties.insert("address".to_string(), json!(view.address));
        properties.insert("accessible".to_string(), json!(view.accessible));
        properties.insert(
            "icon".to_string(),
            json!(if view.accessible { "wheelchair" } else { "smile" }),
        );

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&coordinates.to_point()))),
            id: Some(Id::String(view.id.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}
