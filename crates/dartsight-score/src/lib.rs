//! Board-space coordinate to score mapping.
//!
//! The input is a position in millimetres relative to the board center,
//! which makes the mapping resolution independent and shared between the
//! vision pipeline and manual tap entry. The function is pure: identical
//! coordinates always produce identical scores.

use serde::{Deserialize, Serialize};

use dartsight_core::board::{radii, SEGMENT_ARC_DEG, SEGMENT_ORDER};

/// Score of a single dart.
///
/// `segment` is 0 for a miss, 1..=20 for numbered segments and 25 for
/// either bull ring. `label` is the usual call (`T20`, `D16`, `BULL`,
/// `25`, `MISS`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DartScore {
    pub segment: u32,
    pub multiplier: u32,
    pub value: u32,
    pub label: String,
}

/// Map a board-space offset (mm from center) to a score.
pub fn calculate_score(x_mm: f32, y_mm: f32) -> DartScore {
    let distance = x_mm.hypot(y_mm);

    if distance <= radii::BULL {
        return DartScore {
            segment: 25,
            multiplier: 2,
            value: 50,
            label: "BULL".to_owned(),
        };
    }
    if distance <= radii::OUTER_BULL {
        return DartScore {
            segment: 25,
            multiplier: 1,
            value: 25,
            label: "25".to_owned(),
        };
    }
    if distance > radii::DOUBLE_OUTER {
        return DartScore {
            segment: 0,
            multiplier: 1,
            value: 0,
            label: "MISS".to_owned(),
        };
    }

    // 0 deg at 12 o'clock, growing clockwise; y points down in board space
    let mut angle_deg = x_mm.atan2(-y_mm).to_degrees();
    if angle_deg < 0.0 {
        angle_deg += 360.0;
    }

    // segment 20 straddles 12 o'clock, hence the half-arc shift
    let segment_index = (((angle_deg + SEGMENT_ARC_DEG / 2.0) % 360.0) / SEGMENT_ARC_DEG) as usize;
    let segment = SEGMENT_ORDER[segment_index.min(SEGMENT_ORDER.len() - 1)];

    let multiplier = if (radii::TREBLE_INNER..=radii::TREBLE_OUTER).contains(&distance) {
        3
    } else if (radii::DOUBLE_INNER..=radii::DOUBLE_OUTER).contains(&distance) {
        2
    } else {
        1
    };

    let prefix = match multiplier {
        3 => "T",
        2 => "D",
        _ => "S",
    };
    DartScore {
        segment,
        multiplier,
        value: segment * multiplier,
        label: format!("{prefix}{segment}"),
    }
}
