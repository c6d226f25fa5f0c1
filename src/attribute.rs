// src/attribute.rs

//! Text attributes: style masks bound to indexed color pairs.
//!
//! The registry hands out [`AttrId`] handles. Each attribute owns one slot of
//! the color-pair table; slots are allocated in order and never recycled,
//! so the table capacity bounds the number of attributes ever created.
//! Slot 0 belongs to the `"Default"` attribute, which cannot be destroyed.

use log::{debug, info, trace, warn};

use crate::arena::{Arena, Handle};
use crate::backends::Driver;
use crate::color::{ColorPair, NamedColor, Rgb1000};
use crate::compositor::Compositor;
use crate::error::{Error, Result};
use crate::glyph::AttrFlags;

pub type AttrId = Handle<TextAttribute>;

pub const DEFAULT_ATTRIBUTE_LABEL: &str = "Default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAttribute {
    label: String,
    flags: AttrFlags,
    pair: u16,
}

impl TextAttribute {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn flags(&self) -> AttrFlags {
        self.flags
    }

    /// Index of the color pair this attribute draws with.
    pub fn pair(&self) -> u16 {
        self.pair
    }
}

/// Pair-index to colors map.
#[derive(Debug, Clone)]
pub struct ColorPairTable {
    pairs: Vec<ColorPair>,
    capacity: u16,
}

impl ColorPairTable {
    /// Creates the table with `default` bound to index 0.
    pub fn new(default: ColorPair, capacity: u16) -> Self {
        Self {
            pairs: vec![default],
            capacity: capacity.max(1),
        }
    }

    fn allocate(&mut self, pair: ColorPair) -> Result<u16> {
        if self.pairs.len() >= self.capacity as usize {
            return Err(Error::ColorPairsExhausted {
                capacity: self.capacity,
            });
        }
        self.pairs.push(pair);
        Ok((self.pairs.len() - 1) as u16)
    }

    fn rebind(&mut self, index: u16, pair: ColorPair) {
        if let Some(slot) = self.pairs.get_mut(index as usize) {
            *slot = pair;
        }
    }

    /// Colors bound to `index`; unknown indices resolve to pair 0.
    pub fn resolve(&self, index: u16) -> ColorPair {
        match self.pairs.get(index as usize) {
            Some(pair) => *pair,
            None => {
                warn!("ColorPairTable: unknown pair {}, using default", index);
                self.pairs[0]
            }
        }
    }

    /// Indices allocated so far, including the default.
    pub fn allocated(&self) -> usize {
        self.pairs.len()
    }

    pub fn capacity(&self) -> u16 {
        self.capacity
    }
}

/// Style currently applied to new cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveStyle {
    pub flags: AttrFlags,
    pub pair: u16,
}

impl Default for ActiveStyle {
    fn default() -> Self {
        ActiveStyle {
            flags: AttrFlags::NORMAL,
            pair: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveEntry {
    id: AttrId,
    style: ActiveStyle,
}

pub struct AttributeRegistry {
    attributes: Arena<TextAttribute>,
    pairs: ColorPairTable,
    active: Vec<ActiveEntry>,
    default: AttrId,
}

impl AttributeRegistry {
    pub fn new(default_colors: ColorPair, capacity: u16) -> Self {
        let mut attributes = Arena::new();
        let default = attributes.insert(TextAttribute {
            label: DEFAULT_ATTRIBUTE_LABEL.to_string(),
            flags: AttrFlags::NORMAL,
            pair: 0,
        });
        debug!(
            "AttributeRegistry: {} color pairs available, default {:?}",
            capacity, default_colors
        );
        Self {
            attributes,
            pairs: ColorPairTable::new(default_colors, capacity),
            active: Vec::new(),
            default,
        }
    }

    pub fn create(&mut self, label: &str, flags: AttrFlags, pair: ColorPair) -> Result<AttrId> {
        let index = self.pairs.allocate(pair)?;
        let id = self.attributes.insert(TextAttribute {
            label: label.to_string(),
            flags,
            pair: index,
        });
        info!(
            "Created attribute '{}' {:?} on pair {} ({:?} on {:?})",
            label, flags, index, pair.fg, pair.bg
        );
        Ok(id)
    }

    pub fn get(&self, id: AttrId) -> Result<&TextAttribute> {
        self.attributes
            .get(id)
            .ok_or_else(|| Error::stale("attribute", id))
    }

    /// Rebinds the attribute's pair index to new colors.
    pub fn change_color(&mut self, id: AttrId, pair: ColorPair) -> Result<()> {
        let index = self.get(id)?.pair;
        self.pairs.rebind(index, pair);
        debug!("Pair {} rebound to {:?} on {:?}", index, pair.fg, pair.bg);
        Ok(())
    }

    /// Removes the attribute. Its pair index stays allocated.
    pub fn destroy(&mut self, id: AttrId) -> Result<()> {
        if id == self.default {
            return Err(Error::DefaultAttribute);
        }
        let attribute = self
            .attributes
            .remove(id)
            .ok_or_else(|| Error::stale("attribute", id))?;
        info!("Destroyed attribute '{}'", attribute.label);
        Ok(())
    }

    pub fn enable(&mut self, id: AttrId) -> Result<()> {
        let attribute = self.get(id)?;
        let style = ActiveStyle {
            flags: attribute.flags,
            pair: attribute.pair,
        };
        trace!("Enable attribute '{}'", attribute.label);
        self.active.push(ActiveEntry { id, style });
        Ok(())
    }

    /// Pops `id` off the active stack; it must be the most recently enabled.
    pub fn disable(&mut self, id: AttrId) -> Result<()> {
        match self.active.last() {
            Some(entry) if entry.id == id => {
                self.active.pop();
                Ok(())
            }
            _ => {
                let label = self
                    .attributes
                    .get(id)
                    .map_or_else(|| format!("{:?}", id), |a| a.label.clone());
                Err(Error::UnbalancedAttribute { label })
            }
        }
    }

    pub fn active(&self) -> ActiveStyle {
        self.active
            .last()
            .map(|entry| entry.style)
            .unwrap_or_default()
    }

    pub fn active_depth(&self) -> usize {
        self.active.len()
    }

    pub fn default_attribute(&self) -> AttrId {
        self.default
    }

    pub fn pairs(&self) -> &ColorPairTable {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<D: Driver> Compositor<D> {
    pub fn create_attribute(
        &mut self,
        label: &str,
        flags: AttrFlags,
        pair: ColorPair,
    ) -> Result<AttrId> {
        self.attributes.create(label, flags, pair)
    }

    /// Rebinds an attribute's colors; cells already drawn with it repaint
    /// on the next present.
    pub fn change_attribute_color(&mut self, id: AttrId, pair: ColorPair) -> Result<()> {
        self.attributes.change_color(id, pair)?;
        self.screen.mark_all_dirty();
        Ok(())
    }

    pub fn destroy_attribute(&mut self, id: AttrId) -> Result<()> {
        self.attributes.destroy(id)
    }

    pub fn enable_attribute(&mut self, id: AttrId) -> Result<()> {
        self.attributes.enable(id)
    }

    pub fn disable_attribute(&mut self, id: AttrId) -> Result<()> {
        self.attributes.disable(id)
    }

    /// Runs `f` with `id` enabled. The attribute is disabled afterwards even
    /// when `f` fails; `f`'s error takes precedence.
    pub fn with_attribute<R>(
        &mut self,
        id: AttrId,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.attributes.enable(id)?;
        let result = f(self);
        let disabled = self.attributes.disable(id);
        let value = result?;
        disabled?;
        Ok(value)
    }

    pub fn attribute(&self, id: AttrId) -> Result<&TextAttribute> {
        self.attributes.get(id)
    }

    pub fn default_attribute(&self) -> AttrId {
        self.attributes.default_attribute()
    }

    pub fn attributes(&self) -> &AttributeRegistry {
        &self.attributes
    }

    /// Remaps one of the eight indexed colors. Channels range over `0..=1000`.
    pub fn change_palette_color(&mut self, color: NamedColor, rgb: Rgb1000) -> Result<()> {
        let rgb = Rgb1000::new(rgb.r, rgb.g, rgb.b)?;
        if !self.driver.can_change_color() {
            return Err(Error::ColorChangeUnsupported);
        }
        self.driver.change_color(color, rgb)?;
        info!("Palette color {:?} remapped to {:?}", color, rgb);
        self.screen.mark_all_dirty();
        Ok(())
    }
}
