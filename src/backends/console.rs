// src/backends/console.rs

//! Driver for a real terminal on stdin/stdout using ANSI escape sequences.

use crate::backends::decode::decode_keys;
use crate::backends::{CellCoords, CursorVisibility, Driver, KeyPoll, TextRunStyle};
use crate::color::{NamedColor, Rgb1000};
use crate::config::TerminalConfig;
use crate::error::{Error, Result};
use crate::glyph::AttrFlags;

use libc::{winsize, STDIN_FILENO, TIOCGWINSZ};
use std::collections::VecDeque;
use std::io::{self, stdin, stdout, Read, Write};
use std::mem;
use std::os::unix::io::RawFd;
use std::time::Duration;
use termios::{tcflag_t, tcsetattr, Termios, ECHO, ICANON, TCSANOW, VMIN, VTIME};

use log::{debug, error, info, trace, warn};

/// Local-mode bits cleared in raw mode. `ISIG` stays set so Ctrl-C raises
/// SIGINT instead of arriving as a key.
const RAW_LFLAG_CLEAR: tcflag_t = ECHO | ICANON;

const CURSOR_HIDE: &str = "\x1b[?25l";
const CURSOR_SHOW: &str = "\x1b[?25h";
const CURSOR_BLINK_ON: &str = "\x1b[?12h";
const CURSOR_BLINK_OFF: &str = "\x1b[?12l";
const SGR_PREFIX: &str = "\x1b[";
const SGR_SUFFIX: char = 'm';
const SGR_SEPARATOR: char = ';';
const SGR_RESET_ALL: u16 = 0;
const CLEAR_SCREEN_AND_HOME: &str = "\x1b[2J\x1b[H";

const CONSOLE_MAX_COLOR_PAIRS: u16 = 256;

pub struct ConsoleDriver {
    original_termios: Option<Termios>,
    width_cells: u16,
    height_cells: u16,
    can_change_color: bool,
    input_buffer: [u8; 128],
    pending_keys: VecDeque<i32>,
    decoded: Vec<i32>,
    out: String,
    cleaned_up: bool,
}

impl ConsoleDriver {
    /// Puts stdin in raw, non-blocking mode and measures the terminal.
    pub fn new(config: &TerminalConfig) -> Result<Self> {
        info!("Creating new ConsoleDriver.");
        let original_termios = match Termios::from_fd(STDIN_FILENO) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(
                    "Failed to get initial termios: {}. Proceeding without raw mode.",
                    e
                );
                None
            }
        };

        if let Some(ref ots) = original_termios {
            let mut raw_termios = *ots;
            raw_termios.c_lflag &= !RAW_LFLAG_CLEAR;
            raw_termios.c_iflag &=
                !(libc::IXON | libc::IXOFF | libc::ICRNL | libc::INLCR | libc::IGNCR);
            raw_termios.c_oflag &= !libc::OPOST;
            raw_termios.c_cc[VMIN] = 0;
            raw_termios.c_cc[VTIME] = 0;
            if let Err(e) = tcsetattr(STDIN_FILENO, TCSANOW, &raw_termios) {
                error!("ConsoleDriver: Failed to set raw terminal attributes: {}", e);
                return Err(e.into());
            }
            debug!("ConsoleDriver: Terminal set to raw mode.");
        }

        let (width_cells, height_cells) = match get_terminal_size_cells(STDIN_FILENO, config) {
            Ok(size) => size,
            Err(e) => {
                warn!(
                    "ConsoleDriver: ioctl(TIOCGWINSZ) failed: {}. Using {}x{}.",
                    e, config.fallback_columns, config.fallback_rows
                );
                (config.fallback_columns, config.fallback_rows)
            }
        };
        info!(
            "ConsoleDriver: Initial terminal size: {}x{} cells.",
            width_cells, height_cells
        );

        let mut driver = ConsoleDriver {
            original_termios,
            width_cells,
            height_cells,
            can_change_color: config.can_change_color,
            input_buffer: [0u8; 128],
            pending_keys: VecDeque::new(),
            decoded: Vec::new(),
            out: String::new(),
            cleaned_up: false,
        };
        driver.out.push_str(CLEAR_SCREEN_AND_HOME);
        driver.present()?;
        Ok(driver)
    }

    /// Waits up to `timeout_ms` for stdin to become readable.
    fn stdin_ready(timeout_ms: i32) -> Result<bool> {
        let mut fds = libc::pollfd {
            fd: STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: `fds` is a valid pollfd for the duration of the call.
        let ready = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                trace!("ConsoleDriver: poll interrupted.");
                return Ok(false);
            }
            return Err(err.into());
        }
        Ok(ready > 0 && fds.revents & (libc::POLLIN | libc::POLLHUP) != 0)
    }

    fn sgr_append_attributes(codes: &mut Vec<u16>, style: TextRunStyle) {
        let flags = style.flags;
        if flags.contains(AttrFlags::BOLD) {
            codes.push(1);
        }
        if flags.contains(AttrFlags::DIM) {
            codes.push(2);
        }
        if flags.contains(AttrFlags::UNDERLINE) {
            codes.push(4);
        }
        if flags.contains(AttrFlags::BLINK) {
            codes.push(5);
        }
        if flags.intersects(AttrFlags::REVERSED | AttrFlags::STANDOUT) {
            codes.push(7);
        }
        if flags.contains(AttrFlags::INVISIBLE) {
            codes.push(8);
        }
        codes.push(30 + style.fg.index() as u16);
        codes.push(40 + style.bg.index() as u16);
    }

    fn push_sgr(&mut self, codes: &[u16]) {
        self.out.push_str(SGR_PREFIX);
        self.out.push_str(
            &codes
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(&SGR_SEPARATOR.to_string()),
        );
        self.out.push(SGR_SUFFIX);
    }

    fn format_cursor_position(row_1_based: usize, col_1_based: usize) -> String {
        format!("\x1b[{};{}H", row_1_based, col_1_based)
    }
}

impl Driver for ConsoleDriver {
    fn dimensions(&self) -> (u16, u16) {
        (self.width_cells, self.height_cells)
    }

    fn poll_key(&mut self) -> Result<KeyPoll> {
        if let Some(key) = self.pending_keys.pop_front() {
            return Ok(KeyPoll::Key(key));
        }
        // With VMIN = 0 a read of zero bytes also means "nothing yet", so
        // only a readable descriptor yielding zero bytes is end of input.
        if !Self::stdin_ready(0)? {
            return Ok(KeyPoll::Empty);
        }
        match stdin().read(&mut self.input_buffer) {
            Ok(0) => {
                info!("ConsoleDriver: EOF on stdin.");
                Ok(KeyPoll::Closed)
            }
            Ok(bytes_read) => {
                trace!("ConsoleDriver: Read {} bytes from stdin.", bytes_read);
                self.decoded.clear();
                decode_keys(&self.input_buffer[..bytes_read], &mut self.decoded);
                self.pending_keys.extend(self.decoded.drain(..));
                Ok(self
                    .pending_keys
                    .pop_front()
                    .map_or(KeyPoll::Empty, KeyPoll::Key))
            }
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::Interrupted =>
            {
                trace!("ConsoleDriver: stdin read {:?}.", e.kind());
                Ok(KeyPoll::Empty)
            }
            Err(e) => {
                error!("ConsoleDriver: Error reading from stdin: {}", e);
                Err(e.into())
            }
        }
    }

    fn wait_for_input(&mut self, timeout: Duration) -> Result<()> {
        if !self.pending_keys.is_empty() {
            return Ok(());
        }
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;
        Self::stdin_ready(timeout_ms).map(|_| ())
    }

    fn draw_text_run(
        &mut self,
        coords: CellCoords,
        text: &str,
        style: TextRunStyle,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.out
            .push_str(&Self::format_cursor_position(coords.y + 1, coords.x + 1));
        let mut sgr_codes = vec![SGR_RESET_ALL];
        Self::sgr_append_attributes(&mut sgr_codes, style);
        self.push_sgr(&sgr_codes);
        self.out.push_str(text);
        trace!(
            "ConsoleDriver: draw_text_run at ({},{}) text '{}' style {:?}",
            coords.x, coords.y, text, style
        );
        Ok(())
    }

    fn set_cursor(&mut self, pos: Option<CellCoords>, visibility: CursorVisibility) -> Result<()> {
        if let Some(pos) = pos {
            self.out
                .push_str(&Self::format_cursor_position(pos.y + 1, pos.x + 1));
        }
        match visibility {
            CursorVisibility::Invisible => self.out.push_str(CURSOR_HIDE),
            CursorVisibility::Default => {
                self.out.push_str(CURSOR_SHOW);
                self.out.push_str(CURSOR_BLINK_OFF);
            }
            CursorVisibility::Visible => {
                self.out.push_str(CURSOR_SHOW);
                self.out.push_str(CURSOR_BLINK_ON);
            }
        }
        Ok(())
    }

    fn max_color_pairs(&self) -> u16 {
        CONSOLE_MAX_COLOR_PAIRS
    }

    fn can_change_color(&self) -> bool {
        self.can_change_color
    }

    /// Remaps a palette entry with OSC 4.
    fn change_color(&mut self, color: NamedColor, rgb: Rgb1000) -> Result<()> {
        if !self.can_change_color {
            return Err(Error::ColorChangeUnsupported);
        }
        let (r, g, b) = rgb.to_rgb8();
        self.out.push_str(&format!(
            "\x1b]4;{};rgb:{:02x}/{:02x}/{:02x}\x07",
            color.index(),
            r,
            g,
            b
        ));
        debug!("ConsoleDriver: palette {:?} -> #{:02x}{:02x}{:02x}", color, r, g, b);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        if self.out.is_empty() {
            return Ok(());
        }
        let mut handle = stdout().lock();
        handle.write_all(self.out.as_bytes())?;
        handle.flush()?;
        self.out.clear();
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;
        info!("ConsoleDriver: Cleaning up...");
        self.out.push_str(SGR_PREFIX);
        self.out.push_str(&SGR_RESET_ALL.to_string());
        self.out.push(SGR_SUFFIX);
        self.out.push_str(CLEAR_SCREEN_AND_HOME);
        self.out.push_str(CURSOR_SHOW);
        self.present()?;
        if let Some(original_termios) = self.original_termios.take() {
            debug!("ConsoleDriver: Restoring original terminal attributes.");
            tcsetattr(STDIN_FILENO, TCSANOW, &original_termios)?;
        } else {
            warn!("ConsoleDriver: No original termios to restore.");
        }
        info!("ConsoleDriver: Cleanup complete.");
        Ok(())
    }
}

fn get_terminal_size_cells(fd: RawFd, config: &TerminalConfig) -> io::Result<(u16, u16)> {
    // SAFETY: `winsz` is a valid, zeroed winsize that the ioctl fills in.
    unsafe {
        let mut winsz: winsize = mem::zeroed();
        if libc::ioctl(fd, TIOCGWINSZ, &mut winsz) == -1 {
            return Err(io::Error::last_os_error());
        }
        let cols = if winsz.ws_col == 0 {
            config.fallback_columns
        } else {
            winsz.ws_col
        };
        let rows = if winsz.ws_row == 0 {
            config.fallback_rows
        } else {
            winsz.ws_row
        };
        Ok((cols, rows))
    }
}

impl Drop for ConsoleDriver {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            error!("ConsoleDriver: Error during cleanup in drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgr_codes_cover_style_bits() {
        let mut codes = Vec::new();
        ConsoleDriver::sgr_append_attributes(
            &mut codes,
            TextRunStyle {
                fg: NamedColor::Red,
                bg: NamedColor::Blue,
                flags: AttrFlags::BOLD | AttrFlags::UNDERLINE | AttrFlags::STANDOUT,
            },
        );
        assert_eq!(codes, vec![1, 4, 7, 31, 44]);
    }

    #[test]
    fn raw_mode_keeps_ctrl_c_as_a_signal() {
        assert_eq!(RAW_LFLAG_CLEAR & termios::ISIG, 0);
        assert_eq!(RAW_LFLAG_CLEAR & ECHO, ECHO);
        assert_eq!(RAW_LFLAG_CLEAR & ICANON, ICANON);
    }

    #[test]
    fn cursor_position_is_one_based() {
        assert_eq!(ConsoleDriver::format_cursor_position(1, 1), "\x1b[1;1H");
        assert_eq!(ConsoleDriver::format_cursor_position(24, 80), "\x1b[24;80H");
    }
}
