// src/window/tests.rs

use super::*;
use crate::backends::HeadlessDriver;
use crate::config::Config;
use test_log::test;

fn compositor() -> Compositor<HeadlessDriver> {
    Compositor::new(HeadlessDriver::new(80, 24), Config::default()).unwrap()
}

fn translations(comp: &Compositor<HeadlessDriver>) -> Vec<(Vec2, Vec2)> {
    comp.corrections()
        .filter_map(|c| match c {
            Correction::WindowTranslated {
                requested,
                corrected,
                ..
            } => Some((*requested, *corrected)),
            Correction::CursorClamped { .. } => None,
        })
        .collect()
}

#[test]
fn in_bounds_window_is_unmodified() {
    let mut comp = compositor();
    let root = comp.root();
    let w = comp
        .create_window("w", Vec2::new(0, 0), Vec2::new(10, 5), root)
        .unwrap();
    assert_eq!(comp.global_position(w).unwrap(), Vec2::new(0, 0));
    assert_eq!(comp.relative_position(w).unwrap(), Vec2::new(0, 0));
    assert!(translations(&comp).is_empty());
}

#[test]
fn overflowing_window_is_translated_back() {
    let mut comp = compositor();
    let root = comp.root();
    let w = comp
        .create_window("edge", Vec2::new(75, 0), Vec2::new(10, 5), root)
        .unwrap();
    assert_eq!(comp.global_position(w).unwrap(), Vec2::new(70, 0));
    assert_eq!(comp.relative_position(w).unwrap(), Vec2::new(70, 0));
    assert_eq!(
        translations(&comp),
        vec![(Vec2::new(75, 0), Vec2::new(70, 0))]
    );
}

#[test]
fn child_relative_is_rewritten_to_keep_the_sum() {
    let mut comp = compositor();
    let root = comp.root();
    let parent = comp
        .create_window("parent", Vec2::new(60, 10), Vec2::new(20, 10), root)
        .unwrap();
    let child = comp
        .create_window("child", Vec2::new(15, 12), Vec2::new(10, 4), parent)
        .unwrap();
    let parent_global = comp.global_position(parent).unwrap();
    let child_global = comp.global_position(child).unwrap();
    assert_eq!(child_global, Vec2::new(70, 20));
    assert_eq!(
        child_global,
        parent_global + comp.relative_position(child).unwrap()
    );
}

#[test]
fn invalid_geometry_is_rejected() {
    let mut comp = compositor();
    let root = comp.root();
    for (pos, size) in [
        (Vec2::new(0, 0), Vec2::new(0, 5)),
        (Vec2::new(0, 0), Vec2::new(81, 5)),
        (Vec2::new(-1, 0), Vec2::new(5, 5)),
        (Vec2::new(80, 0), Vec2::new(5, 5)),
        (Vec2::new(0, 24), Vec2::new(5, 5)),
    ] {
        assert!(matches!(
            comp.create_window("bad", pos, size, root),
            Err(Error::InvalidGeometry { .. })
        ));
    }
    assert_eq!(comp.window_count(), 1);
}

#[test]
fn offset_that_overflows_is_invalid_geometry() {
    let mut comp = compositor();
    let root = comp.root();
    let w = comp
        .create_window("w", Vec2::new(3, 2), Vec2::new(5, 5), root)
        .unwrap();
    for offset in [Vec2::new(i32::MAX, 0), Vec2::new(0, i32::MAX)] {
        assert!(matches!(
            comp.set_window_position(w, offset, true),
            Err(Error::InvalidGeometry { .. })
        ));
    }
    assert_eq!(comp.relative_position(w).unwrap(), Vec2::new(3, 2));
    comp.set_window_position(w, Vec2::new(2, -1), true).unwrap();
    assert_eq!(comp.relative_position(w).unwrap(), Vec2::new(5, 1));
}

#[test]
fn new_window_draws_its_border() {
    let mut comp = compositor();
    let root = comp.root();
    let w = comp
        .create_window("box", Vec2::new(2, 1), Vec2::new(4, 3), root)
        .unwrap();
    assert_eq!(comp.surface_generation(w).unwrap(), 1);
    assert_eq!(&comp.screen().row_text(1)[2..6], "+--+");
    assert_eq!(&comp.screen().row_text(2)[2..6], "|  |");
    assert_eq!(
        comp.window_cell(w, Vec2::new(0, 1)).unwrap().map(|g| g.c),
        Some('|')
    );
    assert_eq!(comp.window_cell(w, Vec2::new(4, 0)).unwrap(), None);
}

#[test]
fn destroy_cascades_to_descendants() {
    let mut comp = compositor();
    let root = comp.root();
    let a = comp
        .create_window("a", Vec2::new(0, 0), Vec2::new(20, 10), root)
        .unwrap();
    let b = comp
        .create_window("b", Vec2::new(1, 1), Vec2::new(10, 5), a)
        .unwrap();
    let c = comp
        .create_window("c", Vec2::new(1, 1), Vec2::new(5, 3), b)
        .unwrap();
    comp.destroy_window(a).unwrap();
    for id in [a, b, c] {
        assert!(matches!(comp.window(id), Err(Error::StaleHandle { .. })));
    }
    assert!(comp.window_children(root).unwrap().is_empty());
    assert_eq!(comp.window_count(), 1);
    assert_eq!(comp.screen().row_text(0).trim(), "");
}

#[test]
fn root_cannot_be_destroyed_or_moved() {
    let mut comp = compositor();
    let root = comp.root();
    assert!(matches!(comp.destroy_window(root), Err(Error::RootWindow(_))));
    assert!(matches!(
        comp.set_window_position(root, Vec2::new(1, 1), false),
        Err(Error::RootWindow(_))
    ));
    let w = comp
        .create_window("w", Vec2::new(0, 0), Vec2::new(5, 5), root)
        .unwrap();
    assert!(matches!(comp.set_parent(root, w), Err(Error::RootWindow(_))));
}

#[test]
fn set_parent_rejects_cycles() {
    let mut comp = compositor();
    let root = comp.root();
    let a = comp
        .create_window("a", Vec2::new(0, 0), Vec2::new(20, 10), root)
        .unwrap();
    let b = comp
        .create_window("b", Vec2::new(1, 1), Vec2::new(10, 5), a)
        .unwrap();
    assert!(matches!(
        comp.set_parent(a, a),
        Err(Error::InvalidParent { .. })
    ));
    assert!(matches!(
        comp.set_parent(a, b),
        Err(Error::InvalidParent { reason, .. }) if reason.contains("descendant")
    ));
    comp.set_parent(b, root).unwrap();
    assert_eq!(comp.window_parent(b).unwrap(), Some(root));
    assert!(comp.window_children(a).unwrap().is_empty());
    assert!(comp.window_children(root).unwrap().contains(&b));
}

#[test]
fn geometry_changes_apply_on_update_appearance() {
    let mut comp = compositor();
    let root = comp.root();
    let parent = comp
        .create_window("parent", Vec2::new(0, 0), Vec2::new(30, 10), root)
        .unwrap();
    let child = comp
        .create_window("child", Vec2::new(2, 2), Vec2::new(5, 3), parent)
        .unwrap();
    comp.set_window_position(parent, Vec2::new(10, 5), true).unwrap();
    comp.set_window_size(parent, Vec2::new(20, 8)).unwrap();
    // Stored, not yet applied.
    assert_eq!(comp.global_position(parent).unwrap(), Vec2::new(0, 0));

    let child_generation = comp.surface_generation(child).unwrap();
    comp.update_appearance(parent).unwrap();
    assert_eq!(comp.global_position(parent).unwrap(), Vec2::new(10, 5));
    assert_eq!(comp.window_size(parent).unwrap(), Vec2::new(20, 8));
    assert_eq!(comp.global_position(child).unwrap(), Vec2::new(12, 7));
    assert_eq!(comp.surface_generation(child).unwrap(), child_generation + 1);
}

#[test]
fn stale_handles_are_reported() {
    let mut comp = compositor();
    let root = comp.root();
    let w = comp
        .create_window("w", Vec2::new(0, 0), Vec2::new(5, 5), root)
        .unwrap();
    comp.destroy_window(w).unwrap();
    assert!(matches!(comp.window_size(w), Err(Error::StaleHandle { .. })));
    assert!(matches!(
        comp.create_window("orphan", Vec2::new(0, 0), Vec2::new(5, 5), w),
        Err(Error::StaleHandle { .. })
    ));
    let reused = comp
        .create_window("reused", Vec2::new(0, 0), Vec2::new(5, 5), root)
        .unwrap();
    assert_eq!(reused.index(), w.index());
    assert!(comp.window(w).is_err());
}

#[test]
fn border_and_default_attribute_setters() {
    let mut comp = compositor();
    let root = comp.root();
    let w = comp
        .create_window("w", Vec2::new(0, 0), Vec2::new(4, 3), root)
        .unwrap();
    let glyphs = BorderGlyphs {
        vertical: '#',
        horizontal: '=',
        corner: '*',
    };
    comp.set_border_chars(w, Some(glyphs)).unwrap();
    comp.update_appearance(w).unwrap();
    assert_eq!(&comp.screen().row_text(0)[..4], "*==*");

    let attr = comp
        .create_attribute("alert", AttrFlags::BOLD, Default::default())
        .unwrap();
    comp.set_default_attribute(w, attr).unwrap();
    comp.destroy_attribute(attr).unwrap();
    assert!(matches!(
        comp.update_appearance(w),
        Err(Error::StaleHandle { .. })
    ));
    assert!(matches!(
        comp.set_default_attribute(w, attr),
        Err(Error::StaleHandle { .. })
    ));
}

#[test]
fn destroying_a_child_reveals_the_parent() {
    let mut comp = compositor();
    let root = comp.root();
    let parent = comp
        .create_window("parent", Vec2::new(0, 0), Vec2::new(20, 6), root)
        .unwrap();
    comp.put_string(parent, Vec2::new(1, 2), None, format_args!("underneath"))
        .unwrap();
    let child = comp
        .create_window("child", Vec2::new(0, 1), Vec2::new(8, 3), parent)
        .unwrap();
    assert_eq!(&comp.screen().row_text(2)[..11], "|      |ath");

    comp.destroy_window(child).unwrap();
    assert_eq!(&comp.screen().row_text(2)[..12], "|underneath ");
    assert_eq!(&comp.screen().row_text(0)[..20], "+------------------+");
}

#[test]
fn moving_a_window_repaints_the_area_it_left() {
    let mut comp = compositor();
    let root = comp.root();
    let w = comp
        .create_window("w", Vec2::new(0, 0), Vec2::new(4, 3), root)
        .unwrap();
    comp.set_window_position(w, Vec2::new(10, 0), false).unwrap();
    comp.update_appearance(w).unwrap();
    assert_eq!(&comp.screen().row_text(0)[..14], "          +--+");
}
