// src/window/mod.rs

//! The window tree.
//!
//! Every window lives in the compositor's arena and is addressed by a
//! [`WindowId`]. A window stores its position relative to its parent and a
//! derived global position, kept so that
//! `global = parent.global + relative` and the window never extends past
//! the terminal. Requests that would overflow are translated back by the
//! overflow and recorded as a [`Correction`].
//!
//! Geometry setters only store the new values; `update_appearance` applies
//! them, rebuilding the window's surface and those of all its descendants.

use log::{debug, info, warn};

use crate::arena::Handle;
use crate::attribute::AttrId;
use crate::backends::Driver;
use crate::compositor::{Compositor, Correction};
use crate::error::{Error, Result};
use crate::geometry::Vec2;
use crate::glyph::{AttrFlags, BorderGlyphs, Glyph};

mod surface;

pub use surface::{DirtySpan, Surface};

pub type WindowId = Handle<Window>;

#[derive(Debug, Clone)]
pub struct Window {
    pub(crate) title: String,
    pub(crate) size: Vec2,
    pub(crate) relative: Vec2,
    pub(crate) global: Vec2,
    pub(crate) default_attr: AttrId,
    pub(crate) border: Option<BorderGlyphs>,
    pub(crate) surface: Surface,
    pub(crate) parent: Option<WindowId>,
    pub(crate) children: Vec<WindowId>,
}

impl Window {
    pub(crate) fn new(
        title: &str,
        relative: Vec2,
        size: Vec2,
        default_attr: AttrId,
        border: Option<BorderGlyphs>,
        parent: Option<WindowId>,
    ) -> Self {
        Self {
            title: title.to_string(),
            size,
            relative,
            global: relative,
            default_attr,
            border,
            surface: Surface::new(size),
            parent,
            children: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn relative_position(&self) -> Vec2 {
        self.relative
    }

    pub fn global_position(&self) -> Vec2 {
        self.global
    }

    pub fn default_attribute(&self) -> AttrId {
        self.default_attr
    }

    pub fn border(&self) -> Option<BorderGlyphs> {
        self.border
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    pub fn children(&self) -> &[WindowId] {
        &self.children
    }
}

/// Moves `global` back so that `global + size` fits inside `terminal`.
///
/// Positions that already fit are returned unchanged, so applying the
/// clamp twice gives the same result as applying it once.
pub fn clamp_to_terminal(global: Vec2, size: Vec2, terminal: Vec2) -> Vec2 {
    let axis = |pos: i32, extent: i32, bound: i32| {
        let overflow = pos + extent - bound;
        if overflow > 0 {
            (pos - overflow).max(0)
        } else {
            pos
        }
    };
    Vec2::new(
        axis(global.x, size.x, terminal.x),
        axis(global.y, size.y, terminal.y),
    )
}

impl<D: Driver> Compositor<D> {
    pub fn window(&self, id: WindowId) -> Result<&Window> {
        self.windows
            .get(id)
            .ok_or_else(|| Error::stale("window", id))
    }

    pub(crate) fn window_mut(&mut self, id: WindowId) -> Result<&mut Window> {
        self.windows
            .get_mut(id)
            .ok_or_else(|| Error::stale("window", id))
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    fn validate_size(&self, title: &str, size: Vec2) -> Result<()> {
        let terminal = self.terminal_size();
        if size.x < 1 || size.y < 1 || size.x > terminal.x || size.y > terminal.y {
            return Err(Error::InvalidGeometry {
                title: title.to_string(),
                reason: format!("size {} outside 1..={}", size, terminal),
            });
        }
        Ok(())
    }

    fn validate_position(&self, title: &str, pos: Vec2) -> Result<()> {
        if !pos.is_within(self.terminal_size()) {
            return Err(Error::InvalidGeometry {
                title: title.to_string(),
                reason: format!("position {} outside terminal {}", pos, self.terminal_size()),
            });
        }
        Ok(())
    }

    /// Creates a bordered window at `relative` inside `parent` and draws it.
    pub fn create_window(
        &mut self,
        title: &str,
        relative: Vec2,
        size: Vec2,
        parent: WindowId,
    ) -> Result<WindowId> {
        self.validate_size(title, size)?;
        self.validate_position(title, relative)?;
        self.window(parent)?;
        let window = Window::new(
            title,
            relative,
            size,
            self.attributes.default_attribute(),
            Some(self.config.render.border),
            Some(parent),
        );
        let id = self.windows.insert(window);
        self.window_mut(parent)?.children.push(id);
        info!("Created window '{}' {:?} at {} size {}", title, id, relative, size);
        self.rebuild_window(id)?;
        Ok(id)
    }

    /// Pre-order list of `id` and all its descendants.
    pub(crate) fn subtree(&self, id: WindowId) -> Result<Vec<WindowId>> {
        self.window(id)?;
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(window) = self.windows.get(current) else {
                warn!("Skipping stale child {:?} during traversal", current);
                continue;
            };
            order.push(current);
            stack.extend(window.children.iter().rev().copied());
        }
        Ok(order)
    }

    /// Destroys `id` and every descendant, parents before children, and
    /// repaints the screen area the window covered.
    pub fn destroy_window(&mut self, id: WindowId) -> Result<()> {
        if id == self.root {
            return Err(Error::RootWindow("destroyed"));
        }
        let order = self.subtree(id)?;
        let parent = self.window(id)?.parent;
        if let Some(parent) = parent {
            if let Some(parent) = self.windows.get_mut(parent) {
                parent.children.retain(|&child| child != id);
            }
        }
        let (origin, size) = {
            let window = self.window(id)?;
            (window.global, window.size)
        };
        for current in order {
            if let Some(window) = self.windows.remove(current) {
                info!("Destroyed window '{}' {:?}", window.title, current);
            }
            if self.cursor_window == Some(current) {
                self.cursor_window = None;
            }
        }
        self.repaint_area(origin, size)
    }

    /// Redraws a screen area from the root down, so whatever the area now
    /// shows comes from the windows still covering it.
    fn repaint_area(&mut self, origin: Vec2, size: Vec2) -> Result<()> {
        let root = self.root;
        // The root sits at the origin, so screen and root-local cells agree.
        self.window_mut(root)?.surface.mark_rect(origin, size);
        self.flush_window(root)
    }

    /// Stores a new size; applied by `update_appearance`.
    pub fn set_window_size(&mut self, id: WindowId, size: Vec2) -> Result<()> {
        if id == self.root {
            return Err(Error::RootWindow("resized"));
        }
        let title = self.window(id)?.title.clone();
        self.validate_size(&title, size)?;
        self.window_mut(id)?.size = size;
        Ok(())
    }

    /// Stores a new relative position, or offsets the current one when
    /// `add` is set; applied by `update_appearance`.
    pub fn set_window_position(&mut self, id: WindowId, pos: Vec2, add: bool) -> Result<()> {
        if id == self.root {
            return Err(Error::RootWindow("moved"));
        }
        let window = self.window(id)?;
        let title = window.title.clone();
        let target = if add {
            window
                .relative
                .checked_add(pos)
                .ok_or_else(|| Error::InvalidGeometry {
                    title: title.clone(),
                    reason: format!("offset {} overflows position {}", pos, window.relative),
                })?
        } else {
            pos
        };
        self.validate_position(&title, target)?;
        self.window_mut(id)?.relative = target;
        Ok(())
    }

    /// Recomputes the global position of `id`, rebuilds its surface, then
    /// does the same for every descendant, parents first.
    pub fn update_appearance(&mut self, id: WindowId) -> Result<()> {
        let (old_origin, old_size) = {
            let window = self.window(id)?;
            (window.global, window.size)
        };
        for current in self.subtree(id)? {
            self.rebuild_window(current)?;
        }
        let window = self.window(id)?;
        if id != self.root && (window.global, window.size) != (old_origin, old_size) {
            self.repaint_area(old_origin, old_size)?;
        }
        Ok(())
    }

    /// Derives the clamped global position of one window from its parent.
    fn resolve_global(&mut self, id: WindowId) -> Result<()> {
        let window = self.window(id)?;
        let Some(parent) = window.parent else {
            return Ok(());
        };
        let parent_global = self.window(parent)?.global;
        let requested = parent_global + window.relative;
        let corrected = clamp_to_terminal(requested, window.size, self.terminal_size());
        if corrected != requested {
            warn!(
                "Window '{}' exceeds the terminal at {}; translated to {}",
                window.title, requested, corrected
            );
            self.record(Correction::WindowTranslated {
                window: id,
                requested,
                corrected,
            });
        }
        let window = self.window_mut(id)?;
        window.global = corrected;
        window.relative = corrected - parent_global;
        Ok(())
    }

    /// Fill glyph and border style for a window, from its default attribute.
    pub(crate) fn base_glyph(&self, id: WindowId) -> Result<(Glyph, Glyph)> {
        let attr = self.attributes.get(self.window(id)?.default_attr)?;
        let fill = Glyph::new(' ', AttrFlags::NORMAL, attr.pair());
        let border = Glyph::new(' ', attr.flags(), attr.pair());
        Ok((fill, border))
    }

    fn rebuild_window(&mut self, id: WindowId) -> Result<()> {
        self.resolve_global(id)?;
        let (fill, border_style) = self.base_glyph(id)?;
        let window = self.window_mut(id)?;
        let size = window.size;
        window.surface.rebuild(size, fill);
        if let Some(border) = window.border {
            window.surface.draw_border(&border, border_style);
        }
        debug!(
            "Rebuilt surface of '{}' (generation {}) at {}",
            window.title,
            window.surface.generation(),
            window.global
        );
        self.flush_window(id)
    }

    /// Replaces the border drawn on the next rebuild; `None` removes it.
    pub fn set_border_chars(&mut self, id: WindowId, border: Option<BorderGlyphs>) -> Result<()> {
        self.window_mut(id)?.border = border;
        Ok(())
    }

    pub fn set_default_attribute(&mut self, id: WindowId, attr: AttrId) -> Result<()> {
        self.attributes.get(attr)?;
        self.window_mut(id)?.default_attr = attr;
        Ok(())
    }

    /// Moves `id` under `parent`. The root cannot be re-parented and a
    /// window cannot be moved under itself or one of its descendants.
    pub fn set_parent(&mut self, id: WindowId, parent: WindowId) -> Result<()> {
        if id == self.root {
            return Err(Error::RootWindow("re-parented"));
        }
        let child_title = self.window(id)?.title.clone();
        let parent_title = self.window(parent)?.title.clone();
        let invalid = |reason| Error::InvalidParent {
            child: child_title.clone(),
            parent: parent_title.clone(),
            reason,
        };
        if id == parent {
            return Err(invalid("a window cannot be its own parent"));
        }
        if self.subtree(id)?.contains(&parent) {
            return Err(invalid("the new parent is a descendant"));
        }
        let old_parent = self.window(id)?.parent;
        if let Some(old) = old_parent {
            if let Some(old) = self.windows.get_mut(old) {
                old.children.retain(|&child| child != id);
            }
        }
        self.window_mut(parent)?.children.push(id);
        self.window_mut(id)?.parent = Some(parent);
        debug!("Window '{}' re-parented under '{}'", child_title, parent_title);
        Ok(())
    }

    pub fn window_size(&self, id: WindowId) -> Result<Vec2> {
        Ok(self.window(id)?.size)
    }

    pub fn relative_position(&self, id: WindowId) -> Result<Vec2> {
        Ok(self.window(id)?.relative)
    }

    pub fn global_position(&self, id: WindowId) -> Result<Vec2> {
        Ok(self.window(id)?.global)
    }

    pub fn window_title(&self, id: WindowId) -> Result<&str> {
        Ok(&self.window(id)?.title)
    }

    pub fn window_parent(&self, id: WindowId) -> Result<Option<WindowId>> {
        Ok(self.window(id)?.parent)
    }

    pub fn window_children(&self, id: WindowId) -> Result<&[WindowId]> {
        Ok(&self.window(id)?.children)
    }

    pub fn surface_generation(&self, id: WindowId) -> Result<u64> {
        Ok(self.window(id)?.surface.generation())
    }

    /// The cell at a window-local position, `None` outside the window.
    pub fn window_cell(&self, id: WindowId, pos: Vec2) -> Result<Option<Glyph>> {
        Ok(self.window(id)?.surface.get(pos))
    }
}

#[cfg(test)]
mod tests;
