//! Visualization configuration.
//!
//! Everything here is optional in JSON form; missing fields take the defaults
//! the dark investigation theme ships with.

use force_graph::SimulationParameters;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::color::{Color, Palette};

/// Physics and framing parameters for [`crate::ForceLayout`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	/// World units of radius per unit of node size.
	pub node_scale: f64,
	/// Radius of the ring new nodes are seeded on.
	pub seed_radius: f64,
	/// Screen pixels kept free around a focused bounding box.
	pub fit_padding: f64,
}

impl LayoutConfig {
	pub fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_scale: 0.5,
			seed_radius: 150.0,
			fit_padding: 40.0,
		}
	}
}

/// Colors and layout for one visualization session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
	/// Cycled over person names in collision graphs.
	pub person_palette: Palette,
	/// Cycled over communities when highlighting them.
	pub community_palette: Palette,
	pub path_accent: Color,
	pub search_accent: Color,
	pub background: Color,
	pub label_color: Color,
	pub layout: LayoutConfig,
}

impl VizConfig {
	/// Parses a JSON configuration and checks it.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		let layout = &self.layout;
		if layout.node_scale.is_nan() || layout.node_scale <= 0.0 {
			return Err(Error::Config(format!(
				"layout.node_scale must be positive, got {}",
				layout.node_scale
			)));
		}
		if !(0.0..=1.0).contains(&layout.damping_factor) {
			return Err(Error::Config(format!(
				"layout.damping_factor must be within 0..=1, got {}",
				layout.damping_factor
			)));
		}
		Ok(())
	}
}

impl Default for VizConfig {
	fn default() -> Self {
		Self {
			person_palette: Palette::persons(),
			community_palette: Palette::communities(),
			path_accent: Color::hex(0x64ffda),
			search_accent: Color::hex(0xf15bb5),
			background: Color::hex(0x0a192f),
			label_color: Color::hex(0xccd6f6),
			layout: LayoutConfig::default(),
		}
	}
}
