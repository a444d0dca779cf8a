use crate::config::{
    save_settings_atomic, Options, Paths, Settings, SEAWEED_PLANTS, TANK_HEIGHT, TANK_WIDTH,
};
use crate::input::{cell_to_world, collect_input_nonblocking, map_event_to_action, Action};
use crate::render::{canvas_to_cells, draw_scene, draw_text, CanvasRenderer, CleanupGuard, Terminal, BACKGROUND};
use crate::scene::{plant_bed, Seaweed};
use crate::tank::Aquarium;
use anyhow::Context;
use crossterm::style::Color;
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const HUD_FG: Color = Color::Rgb {
    r: 200,
    g: 235,
    b: 250,
};

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    aq: Aquarium,
    plants: Vec<Seaweed>,
    rng: StdRng,
    term: Terminal,
    frame_dt: Duration,
    started: Instant,
    paused: bool,
    should_quit: bool,
}

impl App {
    fn init(opts: Options, settings: Settings, paths: Paths) -> anyhow::Result<Self> {
        let frame_dt = opts.frame_delay(&settings);
        let seed = match opts.seed.unwrap_or(settings.seed) {
            0 => clock_seed(),
            s => s,
        };
        info!("starting with {} fish, seed {seed}", opts.fish);

        let mut rng = StdRng::seed_from_u64(seed);
        let aq = Aquarium::populate(&mut rng, opts.fish, TANK_WIDTH, TANK_HEIGHT);
        let plants = plant_bed(&mut rng, SEAWEED_PLANTS, TANK_WIDTH);

        let term = Terminal::begin().context("setting up the terminal")?;

        Ok(Self {
            settings,
            paths,
            aq,
            plants,
            rng,
            term,
            frame_dt,
            started: Instant::now(),
            paused: false,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = self.frame_dt;

        while !self.should_quit {
            let frame_start = Instant::now();

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(&ev) {
                    self.apply(action);
                }
                if self.should_quit {
                    break;
                }
            }

            if !self.paused {
                self.aq.advance_frame();
            }

            self.render_frame()?;
            spin_sleep(frame_dt, frame_start);
        }

        info!(
            "quitting after {} frames: {} eaten, {} expired",
            self.aq.frames(),
            self.aq.foods_eaten(),
            self.aq.foods_expired()
        );
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::DropFoodAt { col, row } => {
                let p = cell_to_world(
                    col,
                    row,
                    self.term.cols,
                    self.term.rows,
                    self.aq.width(),
                    self.aq.height(),
                );
                self.aq.spawn_food_at(p.x, p.y);
            }
            Action::DropFoodAnywhere => {
                let x = self.rng.gen_range(0.1..0.9) * self.aq.width();
                let y = self.rng.gen_range(0.15..0.5) * self.aq.height();
                self.aq.spawn_food_at(x, y);
            }
            Action::PauseToggle => self.paused = !self.paused,
            Action::HudToggle => self.settings.show_hud = !self.settings.show_hud,
            Action::Redraw => self.term.force_redraw(),
            Action::Resize(w, h) => {
                debug!("resize to {w}x{h}");
                self.term.resize(w, h);
            }
            Action::Quit => self.should_quit = true,
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let ticks_ms = self.started.elapsed().as_millis() as u64;
        {
            let mut r = CanvasRenderer::new(&mut self.term.canvas, self.aq.width(), self.aq.height());
            draw_scene(&mut r, &self.aq, &self.plants, ticks_ms, &mut self.rng);
        }
        canvas_to_cells(&self.term.canvas, &mut self.term.cur, self.settings.enable_color);

        if self.settings.show_hud && self.term.rows >= 2 {
            self.draw_hud();
        }

        self.term.present()
    }

    fn draw_hud(&mut self) {
        let c = self.aq.census();
        let line = format!(
            "  Fishtank  | fish: {}  | cruising: {}  | chasing: {}  | turning: {}  | food: {}  | eaten: {}  | expired: {}  | {}  ",
            self.aq.fishes().len(),
            c.patrolling,
            c.seeking,
            c.realigning,
            self.aq.foods().len(),
            self.aq.foods_eaten(),
            self.aq.foods_expired(),
            if self.paused { "paused" } else { "running" },
        );
        let hint = "  keys: right-click drop food  F feed  P pause  H hud  Q quit  ";

        let bg = BACKGROUND.to_color();
        draw_text(&mut self.term.cur, 0, 0, &line, HUD_FG, bg);
        draw_text(&mut self.term.cur, 0, 1, hint, HUD_FG, bg);
    }
}

pub(crate) fn run(opts: Options, settings: Settings, paths: Paths) -> anyhow::Result<()> {
    // Restores the terminal exactly once, on success or error.
    let _cleanup = CleanupGuard;
    let mut app = App::init(opts, settings, paths)?;
    app.run()
}

fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ 0xF15_7A4C_u64
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
