// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Display colors per object category.

use crate::messages::ColorRGBA;

pub const RED: ColorRGBA = ColorRGBA::new(1.0, 0.239, 0.388, 1.0);
pub const ORANGE: ColorRGBA = ColorRGBA::new(1.0, 0.619, 0.0, 1.0);
pub const BLUE: ColorRGBA = ColorRGBA::new(0.0, 0.0, 0.901, 1.0);
pub const BLACK: ColorRGBA = ColorRGBA::new(0.0, 0.0, 0.0, 1.0);
pub const MAGENTA: ColorRGBA = ColorRGBA::new(1.0, 0.0, 1.0, 1.0);

/// Substring rules, checked in order.
const COLOR_RULES: &[(&str, ColorRGBA)] = &[
    ("bicycle", RED),
    ("motorcycle", RED),
    ("vehicle", ORANGE),
    ("bus", ORANGE),
    ("car", ORANGE),
    ("construction_vehicle", ORANGE),
    ("trailer", ORANGE),
    ("truck", ORANGE),
    ("pedestrian", BLUE),
    ("cone", BLACK),
    ("barrier", BLACK),
];

/// Color for a category name such as `vehicle.car`. Unknown categories are magenta.
pub fn category_color(category_name: &str) -> ColorRGBA {
    COLOR_RULES
        .iter()
        .find(|(needle, _)| category_name.contains(needle))
        .map_or(MAGENTA, |&(_, color)| color)
}
