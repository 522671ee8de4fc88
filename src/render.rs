use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::game::{Game, Pipe, PipeImage};

pub const BIRD_IMAGE_URL: &str = "./img/flappy.png";
pub const PIPE_TOP_IMAGE_URL: &str = "./img/pipeup.png";
pub const PIPE_BOTTOM_IMAGE_URL: &str = "./img/pipedown.png";

const HUD_FONT: &str = "30px sans-serif";
const GAME_OVER_FONT: &str = "50px sans-serif";

pub struct Sprites {
    pub bird: HtmlImageElement,
    pub pipe_top: HtmlImageElement,
    pub pipe_bottom: HtmlImageElement,
}

impl Sprites {
    pub fn new() -> Result<Self, JsValue> {
        Ok(Self {
            bird: HtmlImageElement::new()?,
            pipe_top: HtmlImageElement::new()?,
            pipe_bottom: HtmlImageElement::new()?,
        })
    }

    fn pipe(&self, image: PipeImage) -> &HtmlImageElement {
        match image {
            PipeImage::Top => &self.pipe_top,
            PipeImage::Bottom => &self.pipe_bottom,
        }
    }
}

// A sprite that failed to load or is still decoding makes drawImage throw;
// the frame goes on without it.
fn draw_sprite(ctx: &CanvasRenderingContext2d, image: &HtmlImageElement, x: f64, y: f64, w: f64, h: f64) {
    if !image.complete() || image.natural_width() == 0 {
        return;
    }
    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(image, x, y, w, h);
}

fn draw_pipe(ctx: &CanvasRenderingContext2d, sprites: &Sprites, pipe: &Pipe) {
    draw_sprite(ctx, sprites.pipe(pipe.image), pipe.x, pipe.y, pipe.width, pipe.height);
}

pub fn score_line(score: u32) -> String {
    format!("Score: {}", score)
}

pub fn high_score_line(high_score: u32) -> String {
    format!("High Score: {}", high_score)
}

pub fn draw_frame(ctx: &CanvasRenderingContext2d, game: &Game, sprites: &Sprites) {
    let config = game.config();
    ctx.clear_rect(0.0, 0.0, config.board_width, config.board_height);

    let bird = &game.bird;
    draw_sprite(ctx, &sprites.bird, bird.x, bird.y, bird.width, bird.height);

    for pair in &game.pipes {
        draw_pipe(ctx, sprites, &pair.top);
        draw_pipe(ctx, sprites, &pair.bottom);
    }

    ctx.set_fill_style_str("white");
    ctx.set_font(HUD_FONT);
    let _ = ctx.fill_text(&score_line(game.score), 10.0, 40.0);
    let _ = ctx.fill_text(
        &high_score_line(game.high_score),
        config.board_width - 180.0,
        40.0,
    );
}

/// Drawn over the last running frame; the board underneath is left as is.
pub fn draw_game_over(ctx: &CanvasRenderingContext2d, game: &Game) {
    let config = game.config();
    let (w, h) = (config.board_width, config.board_height);

    ctx.set_fill_style_str("red");
    ctx.set_font(GAME_OVER_FONT);
    let _ = ctx.fill_text("Game Over", w / 4.0, h / 2.0);

    ctx.set_fill_style_str("white");
    ctx.set_font(HUD_FONT);
    let _ = ctx.fill_text(&score_line(game.score), w / 3.0, h / 2.0 + 50.0);
    let _ = ctx.fill_text(&high_score_line(game.high_score), w / 5.0, h / 2.0 + 100.0);
}
