//! Terminal host for plum runs: refresh loop, keys and print mode

use crate::canvas::BrailleCanvas;
use crate::config::PlumConfig;
use crate::error::{PlumError, PlumResult};
use crate::help::show_help_modal;
use crate::platform::{FrameHost, MonotonicClock, NoFrames, PendingFrames};
use crate::scheduler::Plum;
use crate::terminal::{colors, Terminal};
use crossterm::event::KeyCode;
use rand::prelude::*;
use std::time::{Duration, Instant};

const HELP: &str = "\
PLUM
─────────────────
Space  Pause/resume
r      Restart
q/Esc  Quit
?      Close help";

/// Display refresh interval of the host loop (~60 Hz)
const REFRESH: f32 = 1.0 / 60.0;

/// Upper bound on ticks for a print-mode run
const MAX_PRINT_TICKS: usize = 100_000;

fn initial_seed(config: &PlumConfig) -> u64 {
    config.seed.unwrap_or_else(clock_seed)
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0) // Fallback seed for misconfigured system clocks
}

fn new_plum<H: FrameHost>(
    config: &PlumConfig,
    host: H,
    seed: u64,
) -> Plum<BrailleCanvas, H, MonotonicClock> {
    let mut plum = Plum::new(
        config.growth.clone(),
        host,
        MonotonicClock::new(),
        StdRng::seed_from_u64(seed),
    );
    plum.add_root_steps(config.roots.iter().copied());
    plum
}

fn start_on<H: FrameHost>(plum: &mut Plum<BrailleCanvas, H, MonotonicClock>, cols: u16, rows: u16) {
    let size = BrailleCanvas::logical_size(cols, rows, plum.host().device_pixel_ratio());
    plum.start(BrailleCanvas::for_cells(cols, rows), size);
}

/// Pause between infinite-mode drawings. Negative or NaN waits are zero,
/// overlong ones saturate.
fn wait_between(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Grow one drawing to completion and print it to stdout
pub fn print(config: &PlumConfig, cols: u16, rows: u16) -> PlumResult<()> {
    if cols == 0 || rows == 0 {
        return Err(PlumError::InvalidSize { cols, rows });
    }

    let mut seed = initial_seed(config);
    loop {
        tracing::info!(seed, cols, rows, "printing plum");
        let mut plum = new_plum(config, NoFrames::new(config.density), seed);
        start_on(&mut plum, cols, rows);
        let ticks = plum.run_to_completion(MAX_PRINT_TICKS);
        tracing::debug!(ticks, stopped = plum.is_stopped(), "print run finished");

        let mut term = Terminal::headless(cols, rows);
        if let Some(canvas) = plum.surface() {
            canvas.blit(&mut term);
        }
        term.print_to_stdout()?;

        if !config.infinite {
            break;
        }
        std::thread::sleep(wait_between(config.time_wait));
        seed = clock_seed();
    }
    Ok(())
}

/// Animate plum runs in the alternate screen until the user quits
pub fn run(config: &PlumConfig) -> PlumResult<()> {
    let mut term = Terminal::new(true)?;
    term.clear_screen()?;

    let seed = initial_seed(config);
    tracing::info!(seed, "starting interactive plum");
    let mut plum = new_plum(config, PendingFrames::new(config.density), seed);

    let (mut cols, mut rows) = term.size();
    start_on(&mut plum, cols, rows);
    let mut stopped_at: Option<Instant> = None;

    loop {
        if let Some((code, _)) = term.check_key()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => {
                    if plum.is_active() {
                        plum.pause();
                    } else if !plum.is_stopped() {
                        plum.resume();
                    }
                    draw(&mut term, &plum)?;
                }
                KeyCode::Char('r') => {
                    tracing::debug!("restart requested");
                    term.clear_screen()?;
                    start_on(&mut plum, cols, rows);
                    stopped_at = None;
                }
                KeyCode::Char('?') => {
                    let was_active = plum.is_active();
                    plum.pause();
                    if show_help_modal(&mut term, HELP)? {
                        break;
                    }
                    if was_active {
                        plum.resume();
                    }
                }
                _ => {}
            }
        }

        let (new_cols, new_rows) = crossterm::terminal::size().unwrap_or((cols, rows));
        if new_cols != cols || new_rows != rows {
            tracing::debug!(cols = new_cols, rows = new_rows, "terminal resized");
            cols = new_cols;
            rows = new_rows;
            term.resize(cols, rows);
            term.clear_screen()?;
            start_on(&mut plum, cols, rows);
            stopped_at = None;
        }

        if let Some(handle) = plum.host_mut().take_pending() {
            if plum.on_frame(handle).is_some() {
                draw(&mut term, &plum)?;
            }
        }

        if plum.is_stopped() {
            let since = *stopped_at.get_or_insert_with(Instant::now);
            if config.infinite && since.elapsed().as_secs_f64() >= config.time_wait {
                term.clear_screen()?;
                start_on(&mut plum, cols, rows);
                stopped_at = None;
            }
        }

        term.sleep(REFRESH);
    }

    Ok(())
}

fn draw<H: FrameHost>(
    term: &mut Terminal,
    plum: &Plum<BrailleCanvas, H, MonotonicClock>,
) -> PlumResult<()> {
    term.clear();
    if let Some(canvas) = plum.surface() {
        canvas.blit(term);
    }
    if !plum.is_active() && !plum.is_stopped() {
        term.set_str(1, 0, " paused ", Some(colors::STATUS), true);
    }
    term.render()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GrowthParams, RootStep};

    fn config(seed: u64) -> PlumConfig {
        PlumConfig {
            growth: GrowthParams {
                min_branch: 6,
                ..GrowthParams::default()
            },
            infinite: false,
            time_wait: 0.0,
            seed: Some(seed),
            density: 1.0,
            roots: Vec::new(),
        }
    }

    #[test]
    fn print_run_fills_the_canvas() {
        let cfg = config(42);
        let mut plum = new_plum(&cfg, NoFrames::new(cfg.density), 42);
        start_on(&mut plum, 40, 12);
        assert!(!plum.is_active());

        plum.run_to_completion(MAX_PRINT_TICKS);
        assert!(plum.is_stopped());
        assert!(plum.surface().unwrap().lit_count() > 0);
    }

    #[test]
    fn same_seed_draws_the_same_picture() {
        let cfg = config(7);
        let render = || {
            let mut plum = new_plum(&cfg, NoFrames::new(cfg.density), 7);
            start_on(&mut plum, 30, 10);
            plum.run_to_completion(MAX_PRINT_TICKS);
            let mut term = Terminal::headless(30, 10);
            plum.surface().unwrap().blit(&mut term);
            let mut out = Vec::new();
            term.write_ansi(&mut out).unwrap();
            out
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn configured_roots_are_used() {
        let mut cfg = config(1);
        cfg.roots = vec![RootStep {
            x: 5.0,
            y: 5.0,
            heading: 0.0,
        }];
        let mut plum = new_plum(&cfg, NoFrames::new(1.0), 1);
        start_on(&mut plum, 10, 4);
        assert_eq!(plum.queued().len(), 1);
    }

    #[test]
    fn density_shrinks_logical_canvas() {
        let cfg = config(3);
        let mut plum = new_plum(&cfg, NoFrames::new(2.0), 3);
        start_on(&mut plum, 20, 10);
        let size = plum.size().unwrap();
        assert_eq!((size.width, size.height), (20.0, 20.0));
        assert_eq!(plum.surface().unwrap().dot_size(), (40, 40));
    }

    #[test]
    fn zero_density_prints_at_unit_ratio() {
        let cfg = PlumConfig {
            density: 0.0,
            ..config(5)
        };
        assert!(print(&cfg, 10, 4).is_ok());

        let mut plum = new_plum(&cfg, NoFrames::new(cfg.density), 5);
        start_on(&mut plum, 10, 4);
        assert_eq!(plum.surface().unwrap().dot_size(), (20, 16));
    }

    #[test]
    fn bad_waits_do_not_panic() {
        assert_eq!(wait_between(-1.0), Duration::ZERO);
        assert_eq!(wait_between(f64::NAN), Duration::ZERO);
        assert_eq!(wait_between(f64::INFINITY), Duration::MAX);
        assert_eq!(wait_between(1e30), Duration::MAX);
        assert_eq!(wait_between(0.25), Duration::from_millis(250));
    }

    #[test]
    fn print_rejects_empty_canvas() {
        assert!(matches!(
            print(&config(0), 0, 10),
            Err(PlumError::InvalidSize { cols: 0, rows: 10 })
        ));
    }
}
