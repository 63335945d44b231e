//! Deterministic circular layout for diagram tables.

use core::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::model::{PositionedTable, TableRef};

/// Geometry of the circular layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Horizontal center of the circle.
    pub center_x: f64,
    /// Vertical center of the circle.
    pub center_y: f64,
    /// Radius never drops below this.
    pub min_radius: f64,
    /// Radius contributed by each table.
    pub radius_per_table: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            center_x: 400.0,
            center_y: 300.0,
            min_radius: 150.0,
            radius_per_table: 40.0,
        }
    }
}

impl LayoutOptions {
    /// Radius used for `count` tables: `max(min_radius, radius_per_table * count)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn radius_for(&self, count: usize) -> f64 {
        self.min_radius.max(self.radius_per_table * count as f64)
    }
}

/// Places tables on a circle, starting at 12 o'clock and going clockwise.
///
/// A single table sits at the center. The same input order always yields
/// the same positions.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout(tables: &[TableRef], options: &LayoutOptions) -> Vec<PositionedTable> {
    let count = tables.len();
    if count == 1 {
        return vec![PositionedTable {
            table: tables[0].clone(),
            x: options.center_x,
            y: options.center_y,
        }];
    }

    let radius = options.radius_for(count);
    tables
        .iter()
        .enumerate()
        .map(|(i, table)| {
            let angle = 2.0 * PI * i as f64 / count as f64 - PI / 2.0;
            PositionedTable {
                table: table.clone(),
                x: radius.mul_add(angle.cos(), options.center_x),
                y: radius.mul_add(angle.sin(), options.center_y),
            }
        })
        .collect()
}
