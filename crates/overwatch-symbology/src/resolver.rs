//! Entity to representation-variant resolution.
//!
//! Resolution is a pure read of an [`Entity`]; it never mutates the record
//! and never renders. The renderer decides what a variant looks like.

use overwatch_types::{Affiliation, Entity, EntityKind, IconRef};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// CoT type published by video-stream sources.
pub const VIDEO_STREAM_TYPE: &str = "b-m-p-s-p-loc";

/// Pin colour used when nothing more specific is known.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// How an entity should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "variant", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RepresentationVariant {
    /// A MIL-STD-2525 symbol.
    ArmySymbol {
        /// Symbol code.
        code: String,
        /// Facing in degrees, when known.
        direction_deg: Option<f64>,
        /// Affiliation colour.
        color_hex: String,
    },
    /// A video-stream glyph.
    VideoGlyph,
    /// A small filled circle.
    SpotCircle {
        /// Fill colour.
        color_hex: String,
    },
    /// An explicit icon asset, passed through unchanged.
    IconAsset {
        /// The icon reference.
        icon: IconRef,
    },
    /// The medical evacuation marker.
    Medevac {
        /// Icon published with the request, if any.
        icon: Option<IconRef>,
    },
    /// A range and bearing line.
    RangeLine {
        /// Stroke colour.
        color_hex: Option<String>,
        /// Stroke weight.
        stroke_weight: Option<f64>,
    },
    /// The plain default marker.
    DefaultPin,
}

/// Colour for an affiliation.
///
/// Friendly is cyan, hostile red, neutral green and unknown orange.
pub const fn affiliation_color(affiliation: Affiliation) -> &'static str {
    match affiliation {
        Affiliation::Friendly => "#00ffff",
        Affiliation::Hostile => "#ff0000",
        Affiliation::Neutral => "#00ff00",
        Affiliation::Unknown => "#ffa500",
    }
}

/// Pick the representation variant for an entity.
///
/// Casevac requests and range/bearing lines have fixed variants. Everything
/// else goes through these rules, first match wins:
///
/// 1. a unit track whose type is the video sentinel is a [`VideoGlyph`];
/// 2. a classification code with no explicit icon is an [`ArmySymbol`],
///    facing azimuth else course, coloured by affiliation;
/// 3. an explicit icon is passed through as [`IconAsset`];
/// 4. a spot marker is a [`SpotCircle`] in the entity's colour;
/// 5. anything else is a [`DefaultPin`].
///
/// [`VideoGlyph`]: RepresentationVariant::VideoGlyph
/// [`ArmySymbol`]: RepresentationVariant::ArmySymbol
/// [`IconAsset`]: RepresentationVariant::IconAsset
/// [`SpotCircle`]: RepresentationVariant::SpotCircle
/// [`DefaultPin`]: RepresentationVariant::DefaultPin
pub fn resolve(entity: &Entity) -> RepresentationVariant {
    let style = &entity.style;

    match entity.kind {
        EntityKind::CasevacRequest => {
            return RepresentationVariant::Medevac {
                icon: style.icon.clone(),
            };
        }
        EntityKind::RangeBearingLine => {
            return RepresentationVariant::RangeLine {
                color_hex: style.color_hex.clone(),
                stroke_weight: style.stroke_weight,
            };
        }
        _ => {}
    }

    if entity.kind == EntityKind::UnitTrack && style.cot_type.as_deref() == Some(VIDEO_STREAM_TYPE) {
        return RepresentationVariant::VideoGlyph;
    }

    if let Some(code) = style.classification.as_deref().filter(|c| !c.is_empty())
        && style.icon.is_none()
    {
        return RepresentationVariant::ArmySymbol {
            code: code.to_owned(),
            direction_deg: entity.heading.facing(),
            color_hex: affiliation_color(style.affiliation).to_owned(),
        };
    }

    if let Some(icon) = &style.icon {
        return RepresentationVariant::IconAsset { icon: icon.clone() };
    }

    if entity.kind == EntityKind::SpotMarker {
        let color_hex = style
            .color_hex
            .clone()
            .unwrap_or_else(|| DEFAULT_COLOR.to_owned());
        return RepresentationVariant::SpotCircle { color_hex };
    }

    RepresentationVariant::DefaultPin
}

#[cfg(test)]
mod tests {
    use overwatch_types::{EntityUid, Heading};

    use super::*;

    fn entity(kind: EntityKind) -> Entity {
        Entity::new(EntityUid::from("e-1"), kind)
    }

    #[test]
    fn video_sentinel_wins_for_unit_tracks() {
        let mut e = entity(EntityKind::UnitTrack);
        e.style.cot_type = Some(VIDEO_STREAM_TYPE.to_owned());
        e.style.classification = Some("SFGPUCI----".to_owned());
        assert_eq!(resolve(&e), RepresentationVariant::VideoGlyph);

        e.kind = EntityKind::StaticMarker;
        assert!(matches!(resolve(&e), RepresentationVariant::ArmySymbol { .. }));
    }

    #[test]
    fn army_symbol_faces_azimuth_then_course() {
        let mut e = entity(EntityKind::StaticMarker);
        e.style.classification = Some("SHGPUCI----".to_owned());
        e.style.affiliation = Affiliation::Hostile;
        e.heading = Heading {
            azimuth: None,
            course: Some(270.0),
        };
        assert_eq!(
            resolve(&e),
            RepresentationVariant::ArmySymbol {
                code: "SHGPUCI----".to_owned(),
                direction_deg: Some(270.0),
                color_hex: "#ff0000".to_owned(),
            }
        );

        e.heading.azimuth = Some(15.0);
        assert!(matches!(
            resolve(&e),
            RepresentationVariant::ArmySymbol { direction_deg: Some(d), .. } if (d - 15.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn explicit_icon_beats_classification() {
        let mut e = entity(EntityKind::StaticMarker);
        let icon = IconRef {
            bitmap: Some("icons/hq.png".to_owned()),
            shadow: None,
        };
        e.style.classification = Some("SFGPUCI----".to_owned());
        e.style.icon = Some(icon.clone());
        assert_eq!(resolve(&e), RepresentationVariant::IconAsset { icon });
    }

    #[test]
    fn spot_marker_uses_entity_colour() {
        let mut e = entity(EntityKind::SpotMarker);
        e.style.color_hex = Some("#ff00ff".to_owned());
        assert_eq!(
            resolve(&e),
            RepresentationVariant::SpotCircle {
                color_hex: "#ff00ff".to_owned()
            }
        );
    }

    #[test]
    fn fixed_variants_for_casevac_and_lines() {
        let mut casevac = entity(EntityKind::CasevacRequest);
        casevac.style.classification = Some("SFGPUCI----".to_owned());
        assert_eq!(resolve(&casevac), RepresentationVariant::Medevac { icon: None });

        let mut line = entity(EntityKind::RangeBearingLine);
        line.style.stroke_weight = Some(3.0);
        assert_eq!(
            resolve(&line),
            RepresentationVariant::RangeLine {
                color_hex: None,
                stroke_weight: Some(3.0)
            }
        );
    }

    #[test]
    fn plain_entities_get_default_pin() {
        assert_eq!(
            resolve(&entity(EntityKind::UnitTrack)),
            RepresentationVariant::DefaultPin
        );
        let mut e = entity(EntityKind::StaticMarker);
        e.style.classification = Some(String::new());
        assert_eq!(resolve(&e), RepresentationVariant::DefaultPin);
    }

    #[test]
    fn resolve_does_not_mutate() {
        let mut e = entity(EntityKind::StaticMarker);
        e.style.classification = Some("SNGPUCI----".to_owned());
        let before = e.clone();
        let _ = resolve(&e);
        assert_eq!(e, before);
    }

    #[test]
    fn four_way_affiliation_colours_are_distinct() {
        let colours = [
            affiliation_color(Affiliation::Friendly),
            affiliation_color(Affiliation::Hostile),
            affiliation_color(Affiliation::Neutral),
            affiliation_color(Affiliation::Unknown),
        ];
        for (i, a) in colours.iter().enumerate() {
            for b in colours.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
