//! Main control loop.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{debug, info};

use crate::aggregate::aggregate_results;
use crate::collector::{StatsSource, collect_cluster};
use crate::model::{ClusterSnapshot, HostEndpoint};
use crate::rates::ClusterRates;
use crate::util::{local_clock, now_secs};
use crate::view::{self, Mode, RenderBuffer};

use super::input::{KeyAction, handle_key};
use super::render;
use super::session::TerminalSession;
use super::state::ViewState;

/// Keyboard poll cadence while waiting for the next tick.
pub const POLL_SLICE: Duration = Duration::from_millis(50);

/// Wait used when a tick took longer than the interval.
pub const MIN_WAIT: Duration = Duration::from_millis(100);

enum Phase {
    NextTick,
    Quit,
}

/// Collects, renders and displays the cluster every `interval`.
pub struct App<S: StatsSource> {
    source: S,
    endpoints: Vec<HostEndpoint>,
    interval: Duration,
    state: ViewState,
    /// This tick's snapshot; the baseline for the next tick's rates.
    previous: Option<ClusterSnapshot>,
    rates: Option<ClusterRates>,
    buffer: RenderBuffer,
}

impl<S: StatsSource> App<S> {
    pub fn new(source: S, endpoints: Vec<HostEndpoint>, mode: Mode, interval: Duration) -> Self {
        Self {
            source,
            endpoints,
            interval,
            state: ViewState::new(mode),
            previous: None,
            rates: None,
            buffer: RenderBuffer::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    pub fn previous(&self) -> Option<&ClusterSnapshot> {
        self.previous.as_ref()
    }

    /// Sets the terminal size and re-renders the current snapshot for it.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.state.resize(cols, rows);
        self.rebuild();
    }

    /// One pass of the pipeline: collect, aggregate, compute rates, render.
    pub fn tick(&mut self) {
        let results = collect_cluster(&self.source, &self.endpoints);
        let cluster = aggregate_results(results, now_secs());
        let rates = ClusterRates::compute(&cluster, self.previous.as_ref());
        debug!(
            hosts = cluster.hosts.len(),
            slabs = cluster.slabs.len(),
            first = !rates.has_previous,
            "tick"
        );
        self.previous = Some(cluster);
        self.rates = Some(rates);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let (Some(cluster), Some(rates)) = (&self.previous, &self.rates) else {
            return;
        };
        self.buffer = view::render(
            self.state.mode,
            cluster,
            rates,
            self.state.cols as usize,
            &local_clock(),
        );
        self.state.set_total_rows(self.buffer.rows.len());
    }

    fn wait_budget(&self, started: Instant) -> Duration {
        self.interval
            .checked_sub(started.elapsed())
            .filter(|d| !d.is_zero())
            .unwrap_or(MIN_WAIT)
    }

    /// Interactive mode: raw terminal, keyboard commands, redraw per tick.
    ///
    /// `stop` is raised by the signal handler; the loop returns at the next
    /// poll slice so the session guard restores the terminal.
    pub fn run(mut self, stop: &AtomicBool) -> io::Result<()> {
        let _session = TerminalSession::start()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let size = terminal.size()?;
        self.state.resize(size.width, size.height);
        info!(
            hosts = self.endpoints.len(),
            mode = %self.state.mode,
            interval_ms = self.interval.as_millis() as u64,
            "starting interactive monitor"
        );

        loop {
            let started = Instant::now();
            self.tick();
            self.draw(&mut terminal)?;
            let budget = self.wait_budget(started);
            if let Phase::Quit = self.poll_phase(&mut terminal, budget, stop)? {
                info!("quit requested");
                return Ok(());
            }
        }
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        if self.state.resize_pending {
            let size = terminal.size()?;
            debug!(cols = size.width, rows = size.height, "terminal resized");
            self.resize(size.width, size.height);
        }
        let (buf, state) = (&self.buffer, &self.state);
        terminal.draw(|frame| render::draw(frame, buf, state))?;
        Ok(())
    }

    /// Polls the keyboard in short slices until `budget` runs out or a key
    /// ends the phase.
    fn poll_phase<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        budget: Duration,
        stop: &AtomicBool,
    ) -> io::Result<Phase> {
        let deadline = Instant::now() + budget;
        loop {
            if stop.load(Ordering::Relaxed) {
                return Ok(Phase::Quit);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(Phase::NextTick);
            }
            if event::poll(POLL_SLICE.min(deadline - now))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match handle_key(&mut self.state, key) {
                            KeyAction::Quit => return Ok(Phase::Quit),
                            KeyAction::NextTick => return Ok(Phase::NextTick),
                            KeyAction::Redraw => self.draw(terminal)?,
                            KeyAction::Help => {
                                if let Phase::Quit = self.show_help(terminal, stop)? {
                                    return Ok(Phase::Quit);
                                }
                            }
                            KeyAction::None => {}
                        }
                    }
                    Event::Resize(..) => self.state.resize_pending = true,
                    _ => {}
                }
            }
            if self.state.resize_pending {
                self.draw(terminal)?;
            }
        }
    }

    /// Shows the help screen until one key is pressed, then redraws.
    fn show_help<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        stop: &AtomicBool,
    ) -> io::Result<Phase> {
        terminal.draw(|frame| render::draw_help(frame))?;
        loop {
            if stop.load(Ordering::Relaxed) {
                return Ok(Phase::Quit);
            }
            if !event::poll(POLL_SLICE)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => break,
                Event::Resize(..) => {
                    self.state.resize_pending = true;
                    terminal.draw(|frame| render::draw_help(frame))?;
                }
                _ => {}
            }
        }
        self.draw(terminal)?;
        Ok(Phase::NextTick)
    }

    /// Plain mode: print every tick as text until `stop` is set.
    pub fn run_plain<W: Write>(mut self, out: &mut W, stop: &AtomicBool) -> io::Result<()> {
        info!(hosts = self.endpoints.len(), mode = %self.state.mode, "starting plain output");
        loop {
            let started = Instant::now();
            self.tick();
            render::print_buffer(out, &self.buffer, false)?;
            writeln!(out)?;
            out.flush()?;

            let deadline = started + self.wait_budget(started);
            while Instant::now() < deadline {
                if stop.load(Ordering::Relaxed) {
                    return Ok(());
                }
                std::thread::sleep(POLL_SLICE.min(deadline - Instant::now()));
            }
            if stop.load(Ordering::Relaxed) {
                return Ok(());
            }
        }
    }

    /// Single-shot mode: one tick, printed once.
    pub fn run_once<W: Write>(mut self, out: &mut W, color: bool) -> io::Result<()> {
        self.tick();
        render::print_buffer(out, &self.buffer, color)
    }
}
