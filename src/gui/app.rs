//! Main GUI application.

use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::Config;
use crate::lattice::Lattice;
use crate::runner::{LatticeRunner, SharedLattice};
use crate::stats::MovingAverage;

/// Samples retained for the generations-per-second readout
const RATE_WINDOW: usize = 60;

/// Main application state
pub struct PetriApp {
    /// Shared lattice, also held by the simulation thread
    lattice: SharedLattice,
    /// Background simulation thread; stopped on drop
    runner: LatticeRunner,
    /// GPU texture holding the latest lattice image
    texture: Option<egui::TextureHandle>,
    /// Throughput tracker fed with generation deltas per frame
    throughput: MovingAverage,
    last_generation: u64,
    started: Instant,
    rate: f64,
}

impl PetriApp {
    pub fn new(lattice: SharedLattice, runner: LatticeRunner, throughput: MovingAverage) -> Self {
        Self {
            lattice,
            runner,
            texture: None,
            throughput,
            last_generation: 0,
            started: Instant::now(),
            rate: 0.0,
        }
    }
}

impl eframe::App for PetriApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One consistent copy-out per frame; the lock is released before
        // any painting happens
        let snapshot = self.lattice.snapshot();

        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let delta = snapshot.generation.saturating_sub(self.last_generation);
        self.last_generation = snapshot.generation;
        let (_, rate) = self.throughput.add(delta as f64, elapsed_ms);
        self.rate = rate;

        let image =
            egui::ColorImage::from_rgb([snapshot.width, snapshot.height], &snapshot.pixels);
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture(
                    "lattice",
                    image,
                    egui::TextureOptions::NEAREST,
                ))
            }
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let filled = snapshot.counts.red + snapshot.counts.blue;
                let blue_share = if filled > 0 {
                    100.0 * snapshot.counts.blue as f64 / filled as f64
                } else {
                    0.0
                };
                ui.label(format!(
                    "Gen: {} | R: {} B: {} ({:.0}% blue) | {:.0} gen/s",
                    snapshot.generation,
                    snapshot.counts.red,
                    snapshot.counts.blue,
                    blue_share,
                    self.rate,
                ));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let state = if self.runner.is_running() {
                        "running"
                    } else {
                        "finished"
                    };
                    ui.label(state);
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(texture) = &self.texture {
                let size = texture.size_vec2();
                let available = ui.available_size();
                let scale = (available.x / size.x).min(available.y / size.y);
                let target = size * scale;
                ui.centered_and_justified(|ui| {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(target));
                });
            }
        });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // Render cadence is independent of the simulation cadence
        ctx.request_repaint_after(Duration::from_millis(16));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.runner.stop();
    }
}

/// Run the GUI application
pub fn run_gui(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let lattice = match config.run.seed {
        Some(seed) => Lattice::new_with_seed(&config, seed)?,
        None => Lattice::new(&config)?,
    };
    let (rows, cols) = lattice.dims();
    log::info!("starting viewer for a {}x{} lattice", rows, cols);

    let shared = SharedLattice::new(lattice);
    let runner = LatticeRunner::spawn(shared.clone(), config.run.evolutions);
    let throughput = MovingAverage::new(RATE_WINDOW)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 860.0])
            .with_min_inner_size([300.0, 340.0])
            .with_title("petri"),
        ..Default::default()
    };

    eframe::run_native(
        "petri",
        native_options,
        Box::new(move |_cc| Box::new(PetriApp::new(shared, runner, throughput))),
    )?;
    Ok(())
}
