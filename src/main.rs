//! GSX Arcade demo entry point
//!
//! Runs the frame loop headlessly. Without arguments it shows a "Hello, World"
//! label whose font grows by 2px on every simulated click; every frame goes
//! through `Renderer::display`, so only frames after a click re-render.
//!
//! Usage: `gsx-arcade [settings.json] [scene.json]`

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::Cell;
    use std::error::Error;
    use std::path::Path;
    use std::rc::Rc;

    use gsx_arcade::gsx::{Component, Renderer, TextProps, text};
    use gsx_arcade::sim::{Game, GameContext, GameMode, GamePlugin};
    use gsx_arcade::{RenderError, Settings};

    /// Simulated clicks arrive this often
    const CLICK_INTERVAL: u64 = 30;
    const CLICK_KEY: &str = "Click";
    const START_FONT_SIZE: f64 = 16.0;

    /// Displays one descriptor tree per frame
    struct HelloPlugin {
        renderer: Option<Renderer>,
        font_size: f64,
        /// Fixed tree loaded from disk, if any
        scene_file: Option<Component>,
        rendered: Rc<Cell<u64>>,
    }

    impl HelloPlugin {
        fn tree(&self) -> Component {
            match &self.scene_file {
                Some(component) => component.clone(),
                None => text(TextProps::new("Hello, World").font_size(self.font_size)),
            }
        }
    }

    impl GamePlugin for HelloPlugin {
        fn name(&self) -> &str {
            "hello"
        }

        fn on_init(&mut self, ctx: &mut GameContext) -> Result<(), RenderError> {
            let renderer = Renderer::new(&mut ctx.scene);
            ctx.scene.append_child(ctx.stage, renderer.root())?;
            self.renderer = Some(renderer);
            ctx.mode = GameMode::Play;
            Ok(())
        }

        fn on_render(&mut self, ctx: &mut GameContext) -> Result<(), RenderError> {
            if ctx.keys.just_pressed(CLICK_KEY) {
                self.font_size += 2.0;
            }
            let tree = self.tree();
            let Some(renderer) = self.renderer.as_mut() else {
                return Ok(());
            };
            if renderer.display(&mut ctx.scene, &tree)? {
                self.rendered.set(self.rendered.get() + 1);
            }
            Ok(())
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(path) => Settings::load_from(Path::new(&path)),
            None => Settings::default(),
        };
        let scene_file = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                log::info!("Loaded descriptor tree from {}", path);
                Some(Component::from_json(&json)?)
            }
            None => None,
        };

        let rendered = Rc::new(Cell::new(0));
        let mut game = Game::new(&settings).with_plugin(HelloPlugin {
            renderer: None,
            font_size: START_FONT_SIZE,
            scene_file,
            rendered: rendered.clone(),
        });
        game.init()?;

        log::info!(
            "Running {} frames at {} fps",
            settings.frames,
            settings.frame_rate
        );
        for frame in 0..u64::from(settings.frames) {
            let keys = &mut game.context_mut().keys;
            if frame > 0 && frame % CLICK_INTERVAL == 0 {
                keys.press(CLICK_KEY);
            } else {
                keys.release(CLICK_KEY);
            }
            game.render()?;
        }

        let ctx = game.context();
        let stats = ctx.scene.stats();
        log::info!(
            "{} of {} frames re-rendered over {:.2}s simulated ({} scene mutations, {} content writes)",
            rendered.get(),
            ctx.frame,
            ctx.elapsed(),
            stats.mutations(),
            stats.content_writes
        );
        println!("{}", ctx.scene.dump(ctx.stage));
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("GSX Arcade (native) starting...");

    if let Err(e) = demo::run() {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by the page; there is no standalone wasm binary
}
