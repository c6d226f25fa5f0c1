// src/main.rs

//! Interactive demo: a status bar, an output pane showing live key states,
//! and an F1 prompt that reads a line of wrapped text.

use cellwin::backends::ConsoleDriver;
use cellwin::keys::code;
use cellwin::{
    AttrFlags, AttrId, CancelToken, ColorPair, Compositor, Config, Driver, KeyState, LineOutcome,
    NamedColor, Vec2, WindowId,
};

use anyhow::Context;
use log::{error, info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};

const STATUS_ROWS: i32 = 3;
const PROMPT_ROWS: i32 = 5;

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = std::fs::File::create(&config.logging.file).with_context(|| {
        format!(
            "Failed to create log file {}",
            config.logging.file.display()
        )
    })?;
    // The terminal is the display, so logs go to a file.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.default_filter.as_str()),
    )
    .format_timestamp_millis()
    .target(env_logger::Target::Pipe(Box::new(file)))
    .init();
    Ok(())
}

/// Main entry point for the `cellwin-demo` application.
fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_logging(&config)?;
    info!("Starting cellwin-demo...");

    let cancel = CancelToken::new();
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, cancel.flag())
            .with_context(|| format!("Failed to register handler for signal {}", signal))?;
    }

    let driver = ConsoleDriver::new(&config.terminal).context("Failed to initialise console")?;
    let mut comp = Compositor::new(driver, config).context("Failed to create compositor")?;

    let result = run(&mut comp, &cancel);
    if let Err(e) = &result {
        error!("Demo failed: {:#}", e);
    }
    if let Err(e) = comp.shutdown() {
        error!("Failed to restore terminal: {}", e);
    }
    info!("cellwin-demo exited.");
    result
}

struct Panes {
    status: WindowId,
    output: WindowId,
    title: AttrId,
    highlight: AttrId,
}

fn build_panes(comp: &mut Compositor<ConsoleDriver>) -> anyhow::Result<Panes> {
    let root = comp.root();
    let size = comp.terminal_size();
    let title = comp
        .create_attribute(
            "Title",
            AttrFlags::BOLD | AttrFlags::UNDERLINE,
            ColorPair::new(NamedColor::Yellow, NamedColor::Black),
        )
        .context("Out of color pairs")?;
    let highlight = comp
        .create_attribute(
            "Highlight",
            AttrFlags::REVERSED,
            ColorPair::new(NamedColor::Green, NamedColor::Black),
        )
        .context("Out of color pairs")?;

    let status = comp
        .create_window("status", Vec2::ZERO, Vec2::new(size.x, STATUS_ROWS), root)
        .context("Failed to create status window")?;
    let output_rows = (size.y - STATUS_ROWS - PROMPT_ROWS).max(3);
    let output = comp
        .create_window(
            "output",
            Vec2::new(0, STATUS_ROWS),
            Vec2::new(size.x, output_rows),
            root,
        )
        .context("Failed to create output window")?;
    comp.put_string(
        status,
        Vec2::new(1, 1),
        Some(title),
        format_args!("cellwin demo   F1: prompt   Esc: quit"),
    )?;
    Ok(Panes {
        status,
        output,
        title,
        highlight,
    })
}

fn show_key_states(comp: &mut Compositor<ConsoleDriver>, panes: &Panes) -> anyhow::Result<()> {
    let arrows = [
        ("Up", code::UP),
        ("Down", code::DOWN),
        ("Left", code::LEFT),
        ("Right", code::RIGHT),
    ];
    let mut x = 1;
    for (name, key) in arrows {
        let state = comp.key_state(key);
        let attr = (state != KeyState::Released).then_some(panes.highlight);
        let report = comp.put_string(
            panes.output,
            Vec2::new(x, 1),
            attr,
            format_args!("{:>5}: {:<8}", name, state),
        )?;
        x += report.written as i32 + 1;
    }
    Ok(())
}

fn prompt(
    comp: &mut Compositor<ConsoleDriver>,
    panes: &Panes,
    cancel: &CancelToken,
) -> anyhow::Result<()> {
    let root = comp.root();
    let size = comp.terminal_size();
    let window = comp
        .create_window(
            "prompt",
            Vec2::new(0, size.y - PROMPT_ROWS),
            Vec2::new(size.x, PROMPT_ROWS),
            root,
        )
        .context("Failed to create prompt window")?;
    comp.put_string(
        window,
        Vec2::new(2, 0),
        Some(panes.title),
        format_args!(" Type, Enter to send "),
    )?;
    let line = comp.read_line_wrapped(window, Vec2::new(1, 1), cancel)?;
    comp.destroy_window(window)?;

    comp.clear(panes.output)?;
    let report = comp.put_string_wrapped(
        panes.output,
        Vec2::new(1, 3),
        None,
        format_args!("You typed ({:?}): {}", line.outcome, line.text),
    )?;
    if !report.skipped.is_empty() {
        warn!("{} words did not fit in the output pane", report.skipped.len());
    }
    if line.outcome != LineOutcome::Completed {
        comp.put_string(
            panes.status,
            Vec2::new(1, 1),
            Some(panes.highlight),
            format_args!("input ended: {:?}", line.outcome),
        )?;
    }
    Ok(())
}

fn run(comp: &mut Compositor<ConsoleDriver>, cancel: &CancelToken) -> anyhow::Result<()> {
    let panes = build_panes(comp)?;
    let interval = comp.config().input.tick_interval();
    loop {
        if cancel.is_cancelled() {
            info!("Cancelled by signal.");
            break;
        }
        comp.tick()?;
        if comp.input_closed() || comp.get_key(KeyState::Down, code::ESCAPE) {
            break;
        }
        if comp.get_key(KeyState::Down, code::F1) {
            prompt(comp, &panes, cancel)?;
        }
        show_key_states(comp, &panes)?;
        comp.present()?;
        comp.driver_mut().wait_for_input(interval)?;
    }
    Ok(())
}
