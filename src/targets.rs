//! Clickable target regions and the screen's gesture bindings.
//!
//! Regions are captured once from the rendered layout and never re-measured.

use crate::cursor::CursorPosition;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Edges count as inside
    #[must_use]
    pub fn contains(&self, cursor: &CursorPosition) -> bool {
        cursor.x >= self.left && cursor.x <= self.right && cursor.y >= self.top && cursor.y <= self.bottom
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|v| v.is_finite())
            && self.left <= self.right
            && self.top <= self.bottom
    }
}

/// A named on-screen element the cursor can click
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRegion {
    pub name: String,
    pub bounds: Rect,
}

/// A region together with the route a click on it opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetBinding {
    pub region: TargetRegion,
    pub route: String,
    /// Shown in the confirmation message; defaults to the region name
    #[serde(default)]
    pub label: Option<String>,
}

impl TargetBinding {
    #[must_use]
    pub fn new(name: &str, bounds: Rect, route: &str) -> Self {
        Self {
            region: TargetRegion {
                name: name.to_string(),
                bounds,
            },
            route: route.to_string(),
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.region.name)
    }
}

/// Route opened by a confirmed V-sign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateBinding {
    pub route: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl NavigateBinding {
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.route)
    }
}

/// Everything a screen declares to the gesture engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bindings {
    /// Click targets, in priority order
    pub targets: Vec<TargetBinding>,
    /// Action for a confirmed V-sign
    pub v_sign: Option<NavigateBinding>,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn target(mut self, binding: TargetBinding) -> Self {
        self.targets.push(binding);
        self
    }

    #[must_use]
    pub fn on_v_sign(mut self, route: &str, label: &str) -> Self {
        self.v_sign = Some(NavigateBinding {
            route: route.to_string(),
            label: Some(label.to_string()),
        });
        self
    }

    /// First target, in priority order, whose bounds contain the cursor
    #[must_use]
    pub fn hit_test(&self, cursor: &CursorPosition) -> Option<&TargetBinding> {
        self.targets.iter().find(|t| t.region.bounds.contains(cursor))
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` for an inverted or non-finite rectangle, an
    /// empty route, or a duplicated region name.
    pub fn validate(&self) -> Result<()> {
        for (i, binding) in self.targets.iter().enumerate() {
            let name = &binding.region.name;
            if !binding.region.bounds.is_valid() {
                return Err(Error::InvalidInput(format!("Target '{name}' has invalid bounds")));
            }
            if binding.route.is_empty() {
                return Err(Error::InvalidInput(format!("Target '{name}' has no route")));
            }
            if self.targets[..i].iter().any(|b| &b.region.name == name) {
                return Err(Error::InvalidInput(format!("Target '{name}' is registered twice")));
            }
        }
        if matches!(&self.v_sign, Some(nav) if nav.route.is_empty()) {
            return Err(Error::InvalidInput("V-sign binding has no route".to_string()));
        }
        Ok(())
    }
}
