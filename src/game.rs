use crate::browser;
use crate::config::GameConfig;
use crate::engine;
use crate::engine::input::{KeyState, SPACE};
use crate::engine::{Game, Image, Point, Rect, Renderer, Size, Sound};
use crate::world::{Outcome, World, WorldEvent, WorldLayout};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::join;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use web_sys::HtmlImageElement;

/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │  engine.rs  │  update  │   game.rs   │   step   │  world.rs   │    │
/// │    │  GameLoop   ├─────────►│  RuffiRun   ├─────────►│   World     │    │
/// │    │  (rAF, dt)  │          │  (assets)   │◄─────────┤  (pure sim) │    │
/// │    └─────────────┘          └──────┬──────┘  events  └─────────────┘    │
/// │                                    │                                    │
/// │                              ┌─────┴──────┐                             │
/// │                              │  Renderer  │ parallax -> sprites | text  │
/// │                              │  Sound     │ music, jump meows           │
/// │                              └────────────┘                             │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum RuffiRun {
    /// Assets are being fetched, `initialize` replaces this with `Loaded`
    Loading,
    Loaded(Run),
}

mod assets {
    pub const CONFIG: &str = "config.json";
    pub const MUSIC: &str = "music/8-bit-arcade-138828.wav";
    pub const JUMP_SOUNDS: [&str; 4] = [
        "sound/cat-purr-meow-8327.wav",
        "sound/cat-growl-96248.wav",
        "sound/cat-3-43850.wav",
        "sound/angry-cat-meow-82091.wav",
    ];
    pub const BACKGROUND: &str = "textures/far-buildings.png";
    pub const MIDGROUND: &str = "textures/back-buildings.png";
    pub const FOREGROUND: &str = "textures/foreground.png";
    pub const TITLE: &str = "textures/ruffi-run-image.png";
    pub const RUFFI: &str = "textures/Cat-Sprite-Sheet1.png";
    pub const DUST_BUNNY: &str = "textures/12_nebula_spritesheet.png";
}

const FONT_SIZE: u32 = 42;
const TITLE_SCALE: f32 = 0.5;
const RED: &str = "#E62937";
const GREEN: &str = "#00E430";

impl RuffiRun {
    pub fn new() -> Self {
        RuffiRun::Loading
    }

    /// `config.json` is optional, anything wrong with it means defaults
    async fn load_config() -> GameConfig {
        match browser::fetch_json::<GameConfig>(assets::CONFIG).await {
            Ok(config) => {
                log::info!("Loaded {}", assets::CONFIG);
                config
            }
            Err(err) => {
                log::warn!("Using default config, {} unavailable : {:#}", assets::CONFIG, err);
                GameConfig::default()
            }
        }
    }

    async fn load_texture(path: &str) -> Result<HtmlImageElement> {
        engine::load_image(path)
            .await
            .with_context(|| format!("Failed to load texture from : {}", path))
    }

    fn load_sounds() -> Result<(Sound, Vec<Sound>)> {
        let music = engine::load_sound(assets::MUSIC)
            .with_context(|| format!("Failed to load music from : {}", assets::MUSIC))?;
        let jump_sounds = assets::JUMP_SOUNDS
            .iter()
            .map(|path| {
                engine::load_sound(path)
                    .with_context(|| format!("Failed to load sound from : {}", path))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((music, jump_sounds))
    }
}

impl Default for RuffiRun {
    fn default() -> Self {
        RuffiRun::new()
    }
}

#[async_trait(?Send)]
impl Game for RuffiRun {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            RuffiRun::Loading => {
                // textures load in parallel, total time is the slowest one
                let (config, background, midground, foreground, title, ruffi, dust_bunny) = join!(
                    Self::load_config(),
                    Self::load_texture(assets::BACKGROUND),
                    Self::load_texture(assets::MIDGROUND),
                    Self::load_texture(assets::FOREGROUND),
                    Self::load_texture(assets::TITLE),
                    Self::load_texture(assets::RUFFI),
                    Self::load_texture(assets::DUST_BUNNY),
                );
                let origin = Point::default();
                let layers = [
                    Image::new(background?, origin),
                    Image::new(midground?, origin),
                    Image::new(foreground?, origin),
                ];
                let title = Image::new(title?, origin);
                let ruffi = Image::new(ruffi?, origin);
                let dust_bunny = Image::new(dust_bunny?, origin);
                let (music, jump_sounds) = Self::load_sounds()?;

                let mut rng = match config.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                let scale = config.background_scale;
                let layout = WorldLayout {
                    player_frame: config.player_sheet.frame_size(ruffi.size()),
                    obstacle_frame: config.obstacle_sheet.frame_size(dust_bunny.size()),
                    layer_tile_widths: [
                        layers[0].size().width * scale,
                        layers[1].size().width * scale,
                        layers[2].size().width * scale,
                    ],
                };
                let world = World::new(&config, layout, &mut rng);
                log::info!(
                    "Level ready : {} dust bunnies, finish line at x = {}",
                    world.obstacles().len(),
                    world.finish_line()
                );

                Ok(Box::new(RuffiRun::Loaded(Run {
                    phase: Phase::Title,
                    world,
                    config,
                    rng,
                    assets: Assets {
                        layers,
                        title,
                        ruffi,
                        dust_bunny,
                        music,
                        jump_sounds,
                    },
                })))
            }
            RuffiRun::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState, delta: f32) {
        if let RuffiRun::Loaded(run) = self {
            run.update(keystate, delta);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let RuffiRun::Loaded(run) = self {
            run.draw(renderer);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// title image and "PRESS SPACE"
    Title,
    Playing,
}

struct Assets {
    /// far, mid, near
    layers: [Image; 3],
    title: Image,
    ruffi: Image,
    dust_bunny: Image,
    music: Sound,
    jump_sounds: Vec<Sound>,
}

pub struct Run {
    phase: Phase,
    world: World,
    config: GameConfig,
    rng: StdRng,
    assets: Assets,
}

impl Run {
    fn update(&mut self, keystate: &KeyState, delta: f32) {
        match self.phase {
            Phase::Title => {
                if keystate.was_pressed(SPACE) {
                    self.phase = Phase::Playing;
                    // audio needs a user gesture, this key press is the first
                    if let Err(err) = self.assets.music.play_looping() {
                        log::warn!("{:#}", err);
                    }
                    log::info!("Run started");
                }
            }
            Phase::Playing => {
                let events = self.world.step(delta, keystate.was_pressed(SPACE));
                for event in events {
                    self.handle(event);
                }
            }
        }
    }

    fn handle(&mut self, event: WorldEvent) {
        match event {
            WorldEvent::Jumped => {
                if self.assets.jump_sounds.is_empty() {
                    return;
                }
                let index = self.rng.gen_range(0..self.assets.jump_sounds.len());
                let sound = &self.assets.jump_sounds[index];
                log::debug!(
                    "Jump at x = {}, playing {}",
                    self.world.ruffi().position().x,
                    sound.source()
                );
                if let Err(err) = sound.play() {
                    log::warn!("{:#}", err);
                }
            }
            WorldEvent::Collided => {
                log::info!("Ruffi hit a dust bunny");
            }
            WorldEvent::OutcomeChanged(outcome) => {
                log::info!("Outcome : {:?}", outcome);
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        let width = self.config.window_width;
        let height = self.config.window_height;
        renderer.clear(&Rect::new(Point::default(), Size { width, height }));

        match self.phase {
            Phase::Title => {
                self.assets.title.draw_scaled(renderer, TITLE_SCALE);
                renderer.draw_text(
                    "PRESS SPACE",
                    &Point {
                        x: width / 6.0,
                        y: height / 4.0 * 3.0,
                    },
                    FONT_SIZE,
                    RED,
                );
            }
            Phase::Playing => {
                self.draw_layers(renderer);

                let message_position = Point {
                    x: width / 3.0,
                    y: height / 2.0,
                };
                match self.world.outcome() {
                    Outcome::Lost => {
                        renderer.draw_text("Game Over!", &message_position, FONT_SIZE, RED)
                    }
                    Outcome::Won => {
                        renderer.draw_text("You Win!", &message_position, FONT_SIZE, GREEN)
                    }
                    Outcome::Playing => self.draw_sprites(renderer),
                }
            }
        }
    }

    fn draw_layers(&self, renderer: &Renderer) {
        let scale = self.config.background_scale;
        for (image, layer) in self.assets.layers.iter().zip(self.world.layers()) {
            for x in layer.tile_positions() {
                image.draw_at(renderer, Point { x, y: 0.0 }, scale);
            }
        }
    }

    fn draw_sprites(&self, renderer: &Renderer) {
        let sheet = self.assets.dust_bunny.element();
        for obstacle in self.world.obstacles() {
            obstacle.draw(renderer, sheet);
            #[cfg(debug_assertions)]
            obstacle.draw_hitbox(renderer, self.world.hitbox_padding());
        }

        let ruffi = self.world.ruffi().sprite();
        ruffi.draw(renderer, self.assets.ruffi.element());
        #[cfg(debug_assertions)]
        ruffi.draw_hitbox(renderer, 0.0);
    }
}
