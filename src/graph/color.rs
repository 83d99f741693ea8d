//! Color assignment for closed and open category domains.
//!
//! Closed kinds (node categories, relation types, strength tiers) map to fixed
//! colors so that the same meaning looks the same in every view. The open kind
//! (person identity) draws from a palette on first sight and cycles once the
//! palette is exhausted.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{NodeCategory, RelationType, StrengthTier};
use crate::error::{Error, Result};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Builds a color from a `0xRRGGBB` literal.
	pub const fn hex(value: u32) -> Self {
		Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Parses `#RRGGBB` or `#RRGGBBAA`.
	pub fn parse_hex(s: &str) -> Option<Self> {
		let digits = s.trim().strip_prefix('#')?;
		if !digits.is_ascii() {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
		match digits.len() {
			6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
			8 => Some(Self::rgba(
				channel(0)?,
				channel(2)?,
				channel(4)?,
				channel(6)? as f64 / 255.0,
			)),
			_ => None,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_css())
	}
}

impl TryFrom<String> for Color {
	type Error = String;

	fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
		Self::parse_hex(&value).ok_or_else(|| format!("invalid hex color `{value}`"))
	}
}

impl From<Color> for String {
	fn from(color: Color) -> Self {
		if (color.a - 1.0).abs() < 0.001 {
			color.to_css()
		} else {
			let alpha = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
			format!("#{:02x}{:02x}{:02x}{:02x}", color.r, color.g, color.b, alpha)
		}
	}
}

/// A non-empty ordered color sequence, indexed cyclically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette {
	colors: Vec<Color>,
}

impl Palette {
	pub fn new(colors: Vec<Color>) -> Result<Self> {
		if colors.is_empty() {
			return Err(Error::Config("palette must hold at least one color".into()));
		}
		Ok(Self { colors })
	}

	/// Default palette for individual persons.
	pub fn persons() -> Self {
		Self {
			colors: vec![
				Color::hex(0x6366f1), // Indigo
				Color::hex(0x8b5cf6), // Violet
				Color::hex(0xec4899), // Pink
				Color::hex(0xf43f5e), // Rose
				Color::hex(0xf97316), // Orange
				Color::hex(0xeab308), // Amber
				Color::hex(0x22c55e), // Green
				Color::hex(0x14b8a6), // Teal
			],
		}
	}

	/// Default palette for community highlighting.
	pub fn communities() -> Self {
		Self {
			colors: vec![
				Color::hex(0x64ffda),
				Color::hex(0xffd166),
				Color::hex(0x06d6a0),
				Color::hex(0xef476f),
				Color::hex(0x00b4d8),
				Color::hex(0x9b5de5),
				Color::hex(0xf15bb5),
				Color::hex(0xfee440),
			],
		}
	}

	pub fn get(&self, index: usize) -> Color {
		self.colors[index % self.colors.len()]
	}

	pub fn len(&self) -> usize {
		self.colors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}
}

impl TryFrom<Vec<Color>> for Palette {
	type Error = Error;

	fn try_from(colors: Vec<Color>) -> Result<Self> {
		Self::new(colors)
	}
}

impl From<Palette> for Vec<Color> {
	fn from(palette: Palette) -> Self {
		palette.colors
	}
}

/// What a color is being asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorKey<'a> {
	Category(NodeCategory),
	Relation(RelationType),
	Strength(StrengthTier),
	/// Open kind: one slot per distinct person name.
	Person(&'a str),
}

/// Deterministic color lookup with a session-scoped person mapping.
#[derive(Clone, Debug)]
pub struct ColorAssigner {
	palette: Palette,
	slots: HashMap<String, usize>,
}

impl ColorAssigner {
	pub fn new(palette: Palette) -> Self {
		Self {
			palette,
			slots: HashMap::new(),
		}
	}

	/// The pre-declared color of a closed kind. `None` for [`ColorKey::Person`].
	pub fn fixed(key: ColorKey<'_>) -> Option<Color> {
		let color = match key {
			ColorKey::Category(category) => match category {
				NodeCategory::Phone => Color::hex(0xffd166),
				NodeCategory::WeChat => Color::hex(0x06d6a0),
				NodeCategory::Target => Color::hex(0xef4444),
				NodeCategory::Person => Color::hex(0x6366f1),
				NodeCategory::Unknown => Color::hex(0x64ffda),
			},
			ColorKey::Relation(relation) => match relation {
				RelationType::Contact => Color::hex(0x22c55e),
				RelationType::Knows => Color::hex(0x6366f1),
				RelationType::HasContact => Color::hex(0x64748b),
				RelationType::Common => Self::tier_color(StrengthTier::Medium),
				RelationType::Inferred => Self::tier_color(StrengthTier::Weak),
			},
			ColorKey::Strength(tier) => Self::tier_color(tier),
			ColorKey::Person(_) => return None,
		};
		Some(color)
	}

	fn tier_color(tier: StrengthTier) -> Color {
		match tier {
			StrengthTier::Strong => Color::hex(0xef4444),
			StrengthTier::Medium => Color::hex(0xf97316),
			StrengthTier::Weak => Color::hex(0x94a3b8),
		}
	}

	/// Resolves a color, assigning a palette slot to unseen person names.
	pub fn color_for(&mut self, key: ColorKey<'_>) -> Color {
		match key {
			ColorKey::Person(name) => {
				let next = self.slots.len();
				let slot = *self.slots.entry(name.to_string()).or_insert(next);
				self.palette.get(slot)
			}
			closed => Self::fixed(closed).unwrap_or(Color::hex(0x64ffda)),
		}
	}

	/// Number of person names seen since the last reset.
	pub fn assigned(&self) -> usize {
		self.slots.len()
	}

	/// Forgets every person assignment. Closed kinds are unaffected.
	pub fn reset(&mut self) {
		self.slots.clear();
	}
}

impl Default for ColorAssigner {
	fn default() -> Self {
		Self::new(Palette::persons())
	}
}
