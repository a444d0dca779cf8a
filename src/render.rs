use crate::fish::Facing;
use crate::math::Vec2;
use crate::scene::Seaweed;
use crate::tank::Aquarium;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use rand::Rng;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn to_color(self) -> Color {
        Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

pub(crate) const BACKGROUND: Rgb = Rgb::new(0, 105, 148);
pub(crate) const EYE: Rgb = Rgb::new(0, 0, 0);
pub(crate) const FIN: Rgb = Rgb::new(255, 140, 0);
pub(crate) const FOOD: Rgb = Rgb::new(139, 69, 19);
pub(crate) const SEAWEED: Rgb = Rgb::new(34, 139, 34);

const SEAWEED_THICKNESS: f32 = 5.0;
const EYE_RADIUS: f32 = 3.0;

/// Drawing sink for one frame of the tank. Coordinates are world units.
pub(crate) trait Renderer {
    fn draw_background(&mut self);
    fn draw_plant(&mut self, segments: &[(Vec2, Vec2)], color: Rgb, thickness: f32);
    fn draw_fish(&mut self, pos: Vec2, heading: f32, facing: Facing, color: Rgb, size: (f32, f32));
    fn draw_food(&mut self, pos: Vec2, size: f32, color: Rgb);
}

/// Paint one frame: water, plants, fish, then food on top.
pub(crate) fn draw_scene<R: Renderer, G: Rng>(
    r: &mut R,
    aq: &Aquarium,
    plants: &[Seaweed],
    ticks_ms: u64,
    rng: &mut G,
) {
    r.draw_background();
    for plant in plants {
        let segments = plant.segments(ticks_ms, aq.height(), rng);
        r.draw_plant(&segments, SEAWEED, SEAWEED_THICKNESS);
    }
    for f in aq.fishes() {
        r.draw_fish(
            f.pos,
            f.heading,
            f.facing(),
            f.species.color,
            (f.species.width, f.species.height),
        );
    }
    for food in aq.foods() {
        r.draw_food(food.pos, food.size, FOOD);
    }
}

/* -----------------------------
   Sprite geometry (local sprite box, y down)
------------------------------ */

fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let cross = |o: Vec2, u: Vec2, v: Vec2| (u.x - o.x) * (v.y - o.y) - (u.y - o.y) * (v.x - o.x);
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Color of the fish sprite at local point `p`, if any part covers it.
/// Later layers win: body, tail, fins, eye.
fn sprite_sample(p: Vec2, w: f32, h: f32, facing: Facing, color: Rgb) -> Option<Rgb> {
    if p.x < 0.0 || p.y < 0.0 || p.x > w || p.y > h {
        return None;
    }

    let eye_x = match facing {
        Facing::Right => w - 15.0,
        Facing::Left => 15.0,
    };
    if p.distance(Vec2::new(eye_x, h * 0.3)) <= EYE_RADIUS {
        return Some(EYE);
    }

    let top_fin = in_triangle(
        p,
        Vec2::new(w / 3.0, 2.0),
        Vec2::new(w / 2.0, -5.0),
        Vec2::new(w / 1.8, 10.0),
    );
    let bottom_fin = in_triangle(
        p,
        Vec2::new(w / 3.0, h - 2.0),
        Vec2::new(w / 2.0, h + 5.0),
        Vec2::new(w / 1.8, h - 10.0),
    );
    if top_fin || bottom_fin {
        return Some(FIN);
    }

    let tail = in_triangle(
        p,
        Vec2::new(5.0, h / 2.0),
        Vec2::new(0.0, h - 10.0),
        Vec2::new(0.0, 10.0),
    );
    let rx = (w - 20.0) / 2.0;
    let ry = (h - 10.0) / 2.0;
    let ex = (p.x - w / 2.0) / rx;
    let ey = (p.y - h / 2.0) / ry;
    if tail || ex * ex + ey * ey <= 1.0 {
        return Some(color);
    }
    None
}

/* -----------------------------
   Braille pixel canvas (2×4 sub-pixels per cell)
------------------------------ */

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Option<Rgb>>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![None; (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn clear(&mut self) {
        self.px.fill(None);
    }

    fn plot(&mut self, x: i32, y: i32, c: Rgb) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        self.px[i] = Some(c);
    }
}

/// Renders world-space entities into a pixel canvas scaled to the terminal.
pub(crate) struct CanvasRenderer<'a> {
    canvas: &'a mut PixelCanvas,
    sx: f32,
    sy: f32,
}

impl<'a> CanvasRenderer<'a> {
    pub(crate) fn new(canvas: &'a mut PixelCanvas, world_w: f32, world_h: f32) -> Self {
        let sx = canvas.w as f32 / world_w.max(1.0);
        let sy = canvas.h as f32 / world_h.max(1.0);
        Self { canvas, sx, sy }
    }

    fn to_world(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new((x as f32 + 0.5) / self.sx, (y as f32 + 0.5) / self.sy)
    }

    fn fill_disc(&mut self, c: Vec2, r: f32, color: Rgb) {
        let minx = ((c.x - r) * self.sx).floor() as i32 - 1;
        let maxx = ((c.x + r) * self.sx).ceil() as i32 + 1;
        let miny = ((c.y - r) * self.sy).floor() as i32 - 1;
        let maxy = ((c.y + r) * self.sy).ceil() as i32 + 1;

        let mut any = false;
        for y in miny..=maxy {
            for x in minx..=maxx {
                if self.to_world(x, y).distance(c) <= r {
                    self.canvas.plot(x, y, color);
                    any = true;
                }
            }
        }
        // Anything smaller than a sub-pixel still shows up as one dot.
        if !any {
            self.canvas
                .plot((c.x * self.sx) as i32, (c.y * self.sy) as i32, color);
        }
    }
}

impl Renderer for CanvasRenderer<'_> {
    fn draw_background(&mut self) {
        // Water is the cell background; only ink lives in the canvas.
        self.canvas.clear();
    }

    fn draw_plant(&mut self, segments: &[(Vec2, Vec2)], color: Rgb, thickness: f32) {
        for &(a, b) in segments {
            let ab = b - a;
            let len_px = (ab.x * self.sx).hypot(ab.y * self.sy);
            let steps = (len_px * 1.5).clamp(2.0, 200.0) as i32;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                self.fill_disc(a + ab * t, thickness * 0.5, color);
            }
        }
    }

    fn draw_fish(&mut self, pos: Vec2, heading: f32, facing: Facing, color: Rgb, size: (f32, f32)) {
        let (w, h) = size;
        let half = Vec2::new(w * 0.5, h * 0.5);
        // The unrotated sprite box has its top-left corner at `pos`.
        let center = pos + half;
        let reach = half.len() + 6.0;

        let minx = ((center.x - reach) * self.sx).floor() as i32;
        let maxx = ((center.x + reach) * self.sx).ceil() as i32;
        let miny = ((center.y - reach) * self.sy).floor() as i32;
        let maxy = ((center.y + reach) * self.sy).ceil() as i32;

        let rad = heading.to_radians();
        let (sin, cos) = rad.sin_cos();

        for y in miny..=maxy {
            for x in minx..=maxx {
                let q = self.to_world(x, y) - center;
                // Undo the heading rotation to land back in sprite space.
                let local = q.rotate(cos, -sin) + half;
                if let Some(c) = sprite_sample(local, w, h, facing, color) {
                    self.canvas.plot(x, y, c);
                }
            }
        }
    }

    fn draw_food(&mut self, pos: Vec2, size: f32, color: Rgb) {
        self.fill_disc(pos, size, color);
    }
}

/* -----------------------------
   Terminal cells + diffed output
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    pub(crate) fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::blank(Color::Reset); (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

pub(crate) fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer, enable_color: bool) {
    let bg = BACKGROUND.to_color();
    let cols = out.w as u32;
    let rows = out.h as u32;

    for cy in 0..rows {
        for cx in 0..cols {
            let mut mask: u8 = 0;
            let (mut sum_r, mut sum_g, mut sum_b) = (0u32, 0u32, 0u32);
            let mut ink = 0u32;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = cx * 2 + dx;
                    let y = cy * 4 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    if let Some(p) = canvas.px[canvas.idx(x, y)] {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        ink += 1;
                    }
                }
            }

            let ch = char::from_u32(0x2800 + mask as u32).unwrap_or(' ');
            let fg = if enable_color && ink > 0 {
                Color::Rgb {
                    r: (sum_r / ink) as u8,
                    g: (sum_g / ink) as u8,
                    b: (sum_b / ink) as u8,
                }
            } else {
                Color::White
            };

            out.set(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
    full_redraw: bool,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            canvas: PixelCanvas::new(cols as u32 * 2, rows as u32 * 4),
            full_redraw: true,
        })
    }

    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.prev = CellBuffer::new(cols, rows);
        self.cur = CellBuffer::new(cols, rows);
        self.canvas = PixelCanvas::new(cols as u32 * 2, rows as u32 * 4);
        self.full_redraw = true;
    }

    pub(crate) fn force_redraw(&mut self) {
        self.full_redraw = true;
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if !self.full_redraw && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        self.full_redraw = false;
        Ok(())
    }
}

fn write_teardown<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(
        out,
        EndSynchronizedUpdate,
        ResetColor,
        Clear(ClearType::All),
        cursor::Show,
        EnableLineWrap,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    out.flush()
}

/// Restores the terminal when dropped. This is the only teardown path.
pub(crate) struct CleanupGuard;

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = write_teardown(&mut io::stdout());
        let _ = terminal::disable_raw_mode();
    }
}
