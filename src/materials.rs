//! Propagation media and the name → medium catalog.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::constants::{FREE_SPACE_IMPEDANCE, LIGHT_SPEED, SPEED_OF_LIGHT};
use crate::errors::{require_positive, EmWaveError};
use crate::math::Scalar;

/// Linear isotropic propagation medium.
///
/// Only the refractive index enters the field model (it sets the phase
/// speed). The relative permittivity and permeability are descriptive.
#[derive(Debug, Clone, PartialEq)]
pub struct Medium {
    name: Cow<'static, str>,
    refractive_index: Scalar,
    permittivity_relative: Scalar,
    permeability_relative: Scalar,
}

/// Free space.
pub const VACUUM: Medium = Medium::preset("Vacuum", 1.0, 1.0, 1.0);
/// Dry air at standard conditions.
pub const AIR: Medium = Medium::preset("Air", 1.0003, 1.0006, 1.000_000_4);
/// Water at optical frequencies.
pub const WATER: Medium = Medium::preset("Water", 1.33, 1.77, 1.0);
/// Crown glass.
pub const GLASS: Medium = Medium::preset("Glass", 1.5, 2.25, 1.0);
/// Diamond.
pub const DIAMOND: Medium = Medium::preset("Diamond", 2.4, 5.76, 1.0);

/// Built-in media, in comparison order.
pub const PRESETS: [Medium; 5] = [VACUUM, AIR, WATER, GLASS, DIAMOND];

impl Medium {
    const fn preset(
        name: &'static str,
        refractive_index: Scalar,
        permittivity_relative: Scalar,
        permeability_relative: Scalar,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            refractive_index,
            permittivity_relative,
            permeability_relative,
        }
    }

    /// Creates a non-magnetic medium with `εr = n²`.
    ///
    /// # Errors
    /// `InvalidParameter` when the name is blank or `refractive_index` is not a finite value ≥ 1.
    pub fn new(name: impl Into<String>, refractive_index: Scalar) -> Result<Self, EmWaveError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EmWaveError::invalid("medium", "name must not be empty"));
        }
        if !refractive_index.is_finite() || refractive_index < 1.0 {
            return Err(EmWaveError::invalid(
                "refractive_index",
                format!("must be a finite value >= 1, got {refractive_index}"),
            ));
        }
        Ok(Self {
            name: Cow::Owned(name),
            refractive_index,
            permittivity_relative: refractive_index * refractive_index,
            permeability_relative: 1.0,
        })
    }

    /// Overrides the relative permittivity and permeability.
    ///
    /// # Errors
    /// `InvalidParameter` when either value is not finite and positive.
    pub fn with_constitutive(
        mut self,
        permittivity_relative: Scalar,
        permeability_relative: Scalar,
    ) -> Result<Self, EmWaveError> {
        self.permittivity_relative = require_positive("permittivity_relative", permittivity_relative)?;
        self.permeability_relative = require_positive("permeability_relative", permeability_relative)?;
        Ok(self)
    }

    /// Looks up a built-in medium by case-insensitive name.
    ///
    /// # Errors
    /// `InvalidParameter` for names outside [`PRESETS`].
    pub fn from_name(name: &str) -> Result<Self, EmWaveError> {
        MediumCatalog::with_presets().get(name).cloned()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Refractive index n.
    #[must_use]
    pub const fn refractive_index(&self) -> Scalar {
        self.refractive_index
    }

    /// Relative permittivity εr.
    #[must_use]
    pub const fn permittivity_relative(&self) -> Scalar {
        self.permittivity_relative
    }

    /// Relative permeability μr.
    #[must_use]
    pub const fn permeability_relative(&self) -> Scalar {
        self.permeability_relative
    }

    /// Phase speed `c / n` in normalized units.
    #[must_use]
    pub fn phase_speed(&self) -> Scalar {
        LIGHT_SPEED / self.refractive_index
    }

    /// Phase speed in meters per second.
    #[must_use]
    pub fn phase_speed_si(&self) -> Scalar {
        SPEED_OF_LIGHT / self.refractive_index
    }

    /// Impedance relative to free space, √(μr / εr).
    #[must_use]
    pub fn impedance_relative(&self) -> Scalar {
        (self.permeability_relative / self.permittivity_relative).sqrt()
    }

    /// Intrinsic impedance in ohms.
    #[must_use]
    pub fn intrinsic_impedance(&self) -> Scalar {
        FREE_SPACE_IMPEDANCE * self.impedance_relative()
    }
}

impl Default for Medium {
    fn default() -> Self {
        VACUUM
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (n = {})", self.name, self.refractive_index)
    }
}

impl FromStr for Medium {
    type Err = EmWaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Ordered name → medium mapping.
///
/// Seeded with [`PRESETS`]; custom media registered later replace a preset
/// of the same name in place and otherwise append.
#[derive(Debug, Clone, PartialEq)]
pub struct MediumCatalog {
    media: Vec<Medium>,
}

impl MediumCatalog {
    /// Catalog holding only the built-in media.
    #[must_use]
    pub fn with_presets() -> Self {
        Self {
            media: PRESETS.to_vec(),
        }
    }

    /// Adds or replaces a medium.
    pub fn register(&mut self, medium: Medium) {
        match self.position(medium.name()) {
            Some(idx) => self.media[idx] = medium,
            None => self.media.push(medium),
        }
    }

    /// Case-insensitive lookup.
    ///
    /// # Errors
    /// `InvalidParameter` listing the known names.
    pub fn get(&self, name: &str) -> Result<&Medium, EmWaveError> {
        self.position(name).map(|idx| &self.media[idx]).ok_or_else(|| {
            EmWaveError::invalid(
                "medium",
                format!("unknown medium `{}`; expected one of: {}", name.trim(), self.names().join(", ")),
            )
        })
    }

    /// Lower-case names in catalog order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.media.iter().map(|m| m.name().to_lowercase()).collect()
    }

    /// Iterates over the media in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Medium> {
        self.media.iter()
    }

    /// Number of media.
    #[must_use]
    pub fn len(&self) -> usize {
        self.media.len()
    }

    /// Always false for catalogs built through [`Self::with_presets`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.media.iter().position(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl Default for MediumCatalog {
    fn default() -> Self {
        Self::with_presets()
    }
}
