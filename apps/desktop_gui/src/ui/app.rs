use std::time::Duration;

use eframe::egui;
use gesture_core::{
    settings::{CLICK_THRESHOLD_RANGE, FRAME_MARGIN_RANGE, SMOOTHING_RANGE},
    GestureSettings,
};

use crate::{
    backend_bridge::{commands::EngineCommand, runtime::EngineRuntime},
    controller::{
        events::{ConsoleState, EngineStatus},
        orchestration::dispatch_engine_command,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppView {
    Welcome,
    Console,
}

const GESTURE_GUIDE: [(&str, &str); 4] = [
    ("Index finger", "move the pointer"),
    ("Index + thumb pinch", "press and drag"),
    ("Index + middle, thumb pinch", "right click"),
    ("Three fingers at a frame edge", "previous / next page"),
];

pub struct GestureApp {
    runtime: EngineRuntime,
    view: AppView,
    console: ConsoleState,
    controls: GestureSettings,
    video: Option<egui::TextureHandle>,
    gesture_label: &'static str,
    status: String,
}

impl GestureApp {
    pub fn new(runtime: EngineRuntime) -> Self {
        let controls = runtime.settings().snapshot();
        Self {
            runtime,
            view: AppView::Welcome,
            console: ConsoleState::default(),
            controls,
            video: None,
            gesture_label: "",
            status: String::new(),
        }
    }

    fn send(&mut self, cmd: EngineCommand) {
        dispatch_engine_command(&mut self.runtime, &mut self.console, cmd, &mut self.status);
    }

    fn process_engine_output(&mut self, ctx: &egui::Context) {
        for event in self.runtime.drain_events() {
            self.console.apply(event);
        }

        let Some(frame) = self.runtime.latest_frame() else {
            return;
        };
        let size = [frame.image.width() as usize, frame.image.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, frame.image.as_raw());
        match &mut self.video {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.video =
                    Some(ctx.load_texture("camera-feed", color_image, egui::TextureOptions::LINEAR));
            }
        }
        self.gesture_label = frame.gesture;
    }

    fn show_welcome(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.heading(egui::RichText::new("Gesture Control").size(32.0));
                ui.label("Drive the mouse and turn pages with hand gestures in front of your webcam.");
                ui.add_space(24.0);

                egui::Grid::new("gesture_guide")
                    .num_columns(2)
                    .spacing([24.0, 8.0])
                    .show(ui, |ui| {
                        for (pose, effect) in GESTURE_GUIDE {
                            ui.label(egui::RichText::new(pose).strong());
                            ui.label(effect);
                            ui.end_row();
                        }
                    });

                ui.add_space(32.0);
                let start = egui::Button::new(egui::RichText::new("Start").size(20.0))
                    .min_size(egui::vec2(180.0, 44.0));
                if ui.add(start).clicked() {
                    self.send(EngineCommand::Start);
                    if self.status.is_empty() {
                        self.console.clear();
                        self.view = AppView::Console;
                    }
                }

                if !self.status.is_empty() {
                    ui.add_space(12.0);
                    ui.colored_label(egui::Color32::LIGHT_RED, &self.status);
                }
            });
        });
    }

    fn show_console(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("console_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    self.send(EngineCommand::Stop);
                    self.video = None;
                    self.view = AppView::Welcome;
                }
                ui.separator();
                ui.label(format!("engine: {}", self.console.status.label()));
                if !self.gesture_label.is_empty() {
                    ui.separator();
                    ui.label(format!("gesture: {}", self.gesture_label));
                }
            });
        });

        egui::SidePanel::right("console_controls")
            .resizable(false)
            .default_width(260.0)
            .show(ctx, |ui| self.show_controls(ui));

        egui::TopBottomPanel::bottom("console_log")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Log").strong());
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in self.console.lines() {
                            ui.monospace(line);
                        }
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| match &self.video {
            Some(texture) => {
                let available = ui.available_size();
                ui.centered_and_justified(|ui| {
                    ui.add(
                        egui::Image::new(texture)
                            .max_size(available)
                            .maintain_aspect_ratio(true),
                    );
                });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("Waiting for camera frames…");
                });
            }
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);

        let mut commands = Vec::new();
        if ui
            .add(egui::Slider::new(&mut self.controls.smoothing, SMOOTHING_RANGE).text("smoothing"))
            .changed()
        {
            commands.push(EngineCommand::SetSmoothing(self.controls.smoothing));
        }
        if ui
            .add(egui::Slider::new(&mut self.controls.frame_margin, FRAME_MARGIN_RANGE).text("frame margin"))
            .changed()
        {
            commands.push(EngineCommand::SetFrameMargin(self.controls.frame_margin));
        }
        if ui
            .add(
                egui::Slider::new(&mut self.controls.click_threshold, CLICK_THRESHOLD_RANGE)
                    .text("click threshold"),
            )
            .changed()
        {
            commands.push(EngineCommand::SetClickThreshold(self.controls.click_threshold));
        }
        if ui
            .checkbox(&mut self.controls.sound_enabled, "Sound feedback")
            .changed()
        {
            commands.push(EngineCommand::SetSoundEnabled(self.controls.sound_enabled));
        }
        if ui
            .checkbox(&mut self.controls.show_landmarks, "Show hand skeleton")
            .changed()
        {
            commands.push(EngineCommand::SetShowLandmarks(self.controls.show_landmarks));
        }

        ui.add_space(16.0);
        let running = matches!(self.console.status, EngineStatus::Running);
        if running {
            if ui.button("Stop").clicked() {
                commands.push(EngineCommand::Stop);
            }
        } else if ui.button("Restart").clicked() {
            commands.push(EngineCommand::Start);
        }

        if !self.status.is_empty() {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::LIGHT_RED, &self.status);
        }

        for cmd in commands {
            self.send(cmd);
        }
    }
}

impl eframe::App for GestureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_engine_output(ctx);

        match self.view {
            AppView::Welcome => self.show_welcome(ctx),
            AppView::Console => self.show_console(ctx),
        }

        if self.runtime.is_running() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
