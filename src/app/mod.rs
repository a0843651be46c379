use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Align2, Color32, Context, FontId};
use rand::thread_rng;

use crate::config::{PresentationConfig, load_presentation_config};

mod anim;
mod causal;
mod deck;
mod fermi;
mod graph;
mod render_utils;
mod ui;
mod workflow;

use causal::CausalScene;
use deck::{Direction, STEPS, SectionKind, StepTracker};
use fermi::FermiScene;
use graph::GraphScene;
use workflow::WorkflowScene;

pub struct PresentationApp {
    data_path: String,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<PresentationConfig, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    config: PresentationConfig,
    tracker: StepTracker,
    clock: f64,
    active_section: SectionKind,
    graph: Option<GraphScene>,
    fermi: FermiScene,
    causal: CausalScene,
    workflow: WorkflowScene,
}

impl PresentationApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: String) -> Self {
        let state = Self::start_load(data_path.clone());
        Self { data_path, state }
    }

    fn spawn_load(data_path: String) -> Receiver<Result<PresentationConfig, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_presentation_config(&data_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for PresentationApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(config) => AppState::Ready(Box::new(ViewModel::new(config))),
                        Err(message) => AppState::Error(message),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading presentation data...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load presentation data");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                model.show(ctx);
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(config: PresentationConfig) -> Self {
        let graph = (!config.clusters.is_empty())
            .then(|| GraphScene::new(&config, &mut thread_rng()));
        if graph.is_none() {
            log::warn!("presentation data has no clusters; the force-graph stage stays empty");
        }

        Self {
            config,
            tracker: StepTracker::new(),
            clock: 0.0,
            active_section: SectionKind::ForceGraph,
            graph,
            fermi: FermiScene::new(),
            causal: CausalScene::new(),
            workflow: WorkflowScene::new(),
        }
    }

    fn show(&mut self, ctx: &Context) {
        let delta = ctx
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        self.clock += delta as f64;
        let clock = self.clock;

        egui::TopBottomPanel::top("deck_header").show(ctx, |ui| self.draw_header(ui));

        let mut event = None;
        egui::SidePanel::left("narrative")
            .resizable(true)
            .default_width(430.0)
            .min_width(320.0)
            .show(ctx, |ui| {
                event = self.draw_narrative(ui);
            });

        if let Some((index, direction)) = event {
            self.dispatch_step(index, direction);
        }

        // The simulation keeps iterating whichever stage is on screen.
        let graph_busy = match self.graph.as_mut() {
            Some(graph) => graph.update(clock),
            None => false,
        };

        let mut stage_busy = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, _response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());

            match self.active_section {
                SectionKind::ForceGraph => match &self.graph {
                    Some(graph) => graph.draw(ui, rect),
                    None => {
                        let painter = ui.painter_at(rect);
                        painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));
                        painter.text(
                            rect.center(),
                            Align2::CENTER_CENTER,
                            "No cluster data loaded",
                            FontId::proportional(14.0),
                            Color32::from_gray(140),
                        );
                    }
                },
                SectionKind::MarketSizing => {
                    self.fermi.draw(ui, rect, clock);
                    stage_busy = self.fermi.animating(clock);
                }
                SectionKind::Causal => {
                    self.causal.draw(ui, rect, clock);
                    stage_busy = self.causal.animating(clock);
                }
                SectionKind::Workflow => {
                    self.workflow.draw(ui, rect, clock);
                    stage_busy = self.workflow.animating(clock);
                }
            }
        });

        if graph_busy || stage_busy {
            ctx.request_repaint();
        }
    }

    fn dispatch_step(&mut self, index: usize, direction: Direction) {
        let Some(step) = STEPS.get(index) else {
            return;
        };
        log::debug!(
            "entering step {:?} ({:?}, {:?})",
            step.id,
            step.section,
            direction
        );

        self.active_section = step.section;
        let clock = self.clock;
        match step.section {
            SectionKind::ForceGraph => {
                if let Some(graph) = self.graph.as_mut() {
                    graph.enter_step(step.id, clock);
                }
            }
            SectionKind::MarketSizing => self.fermi.enter_step(step.id, clock),
            SectionKind::Causal => self.causal.enter_step(step.id, clock),
            SectionKind::Workflow => self.workflow.enter_step(step.id, clock),
        }
    }
}
