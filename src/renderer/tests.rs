// src/renderer/tests.rs

#[cfg(test)]
mod render_tests {
    use crate::attribute::ColorPairTable;
    use crate::backends::{CellCoords, CursorVisibility, Driver, KeyPoll, TextRunStyle};
    use crate::color::{ColorPair, NamedColor, Rgb1000};
    use crate::error::Result;
    use crate::glyph::{AttrFlags, Glyph};
    use crate::renderer::Renderer;
    use crate::screen::ScreenBuffer;
    use std::time::Duration;
    use test_log::test;

    // --- RecordingDriver Definition ---
    #[derive(Default)]
    struct RecordingDriver {
        runs: Vec<(CellCoords, String, TextRunStyle)>,
    }

    impl Driver for RecordingDriver {
        fn dimensions(&self) -> (u16, u16) {
            (0, 0)
        }
        fn poll_key(&mut self) -> Result<KeyPoll> {
            Ok(KeyPoll::Empty)
        }
        fn wait_for_input(&mut self, _timeout: Duration) -> Result<()> {
            Ok(())
        }
        fn draw_text_run(
            &mut self,
            coords: CellCoords,
            text: &str,
            style: TextRunStyle,
        ) -> Result<()> {
            self.runs.push((coords, text.to_string(), style));
            Ok(())
        }
        fn set_cursor(&mut self, _pos: Option<CellCoords>, _v: CursorVisibility) -> Result<()> {
            Ok(())
        }
        fn max_color_pairs(&self) -> u16 {
            256
        }
        fn can_change_color(&self) -> bool {
            false
        }
        fn change_color(&mut self, _color: NamedColor, _rgb: Rgb1000) -> Result<()> {
            Ok(())
        }
        fn present(&mut self) -> Result<()> {
            Ok(())
        }
        fn cleanup(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn pairs() -> ColorPairTable {
        ColorPairTable::new(ColorPair::default(), 8)
    }

    fn write(screen: &mut ScreenBuffer, x: i32, y: i32, text: &str, flags: AttrFlags, pair: u16) {
        for (i, c) in text.chars().enumerate() {
            screen.set(x + i as i32, y, Glyph::new(c, flags, pair));
        }
    }

    #[test]
    fn first_draw_covers_every_row() {
        let mut screen = ScreenBuffer::new(3, 2);
        let mut driver = RecordingDriver::default();
        let mut renderer = Renderer::new();
        assert!(renderer.draw(&mut screen, &pairs(), &mut driver).unwrap());
        assert_eq!(driver.runs.len(), 2);
        assert_eq!(driver.runs[1].0, CellCoords { x: 0, y: 1 });
        assert_eq!(driver.runs[1].1, "   ");
    }

    #[test]
    fn clean_screen_draws_nothing() {
        let mut screen = ScreenBuffer::new(3, 2);
        let mut driver = RecordingDriver::default();
        let mut renderer = Renderer::new();
        renderer.draw(&mut screen, &pairs(), &mut driver).unwrap();
        driver.runs.clear();
        assert!(!renderer.draw(&mut screen, &pairs(), &mut driver).unwrap());
        assert!(driver.runs.is_empty());
    }

    #[test]
    fn runs_split_on_style_change() {
        let mut screen = ScreenBuffer::new(6, 1);
        screen.take_dirty_rows();
        write(&mut screen, 0, 0, "ab", AttrFlags::BOLD, 0);
        write(&mut screen, 2, 0, "cd", AttrFlags::BOLD, 0);
        write(&mut screen, 4, 0, "e", AttrFlags::UNDERLINE, 0);
        let mut driver = RecordingDriver::default();
        let mut renderer = Renderer::new();
        renderer.draw(&mut screen, &pairs(), &mut driver).unwrap();
        let texts: Vec<_> = driver.runs.iter().map(|r| r.1.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "e", " "]);
        assert_eq!(renderer.runs_last_frame(), 3);
    }

    #[test]
    fn pair_indices_resolve_at_draw_time() {
        let mut table = ColorPairTable::new(ColorPair::default(), 8);
        let mut screen = ScreenBuffer::new(2, 1);
        screen.take_dirty_rows();
        // Pair 5 is never allocated and falls back to the default pair.
        write(&mut screen, 0, 0, "x", AttrFlags::NORMAL, 5);
        let mut driver = RecordingDriver::default();
        Renderer::new().draw(&mut screen, &table, &mut driver).unwrap();
        assert_eq!(driver.runs[0].2.fg, NamedColor::White);
        assert_eq!(driver.runs[0].2.bg, NamedColor::Black);

        table = ColorPairTable::new(ColorPair::new(NamedColor::Red, NamedColor::Cyan), 8);
        screen.mark_all_dirty();
        driver.runs.clear();
        Renderer::new().draw(&mut screen, &table, &mut driver).unwrap();
        assert_eq!(driver.runs[0].2.fg, NamedColor::Red);
        assert_eq!(driver.runs[0].2.bg, NamedColor::Cyan);
    }

    #[test]
    fn alt_charset_cells_draw_line_glyphs() {
        let mut screen = ScreenBuffer::new(1, 1);
        write(&mut screen, 0, 0, "q", AttrFlags::ALT_CHARSET, 0);
        let mut driver = RecordingDriver::default();
        Renderer::new().draw(&mut screen, &pairs(), &mut driver).unwrap();
        assert_eq!(driver.runs[0].1, "─");
    }
}
