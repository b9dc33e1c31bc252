//! # Guitar Tab Generator GUI
//!
//! Desktop front end for the tab generator. It records from the microphone or
//! loads a WAV file, runs the transcription pipeline from `tab-core` and shows
//! the resulting tablature, which can then be saved as text.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application
//! - **Recording Thread**: Captures audio until told to stop, then hands the
//!   finished recording back through its join handle
//! - **Analysis Thread**: Runs pitch tracking and tab layout for one recording
//! - **Communication**: Crossbeam channels carrying the stop signal and the
//!   finished transcription, polled on a timer subscription

mod ui;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use iced::{Element, Subscription, Theme};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tab_core::{Recording, TabConfig, Transcriber, Transcription, audio, render, wav};
use tracing::{error, info, warn};
use ui::main_display::create_main_view;

/// Optional configuration file read at startup.
const CONFIG_PATH: &str = "tab_config.json";
/// Directory new recordings are written to.
const RECORDINGS_DIR: &str = "data";
/// Default directory offered when saving a tab.
const OUTPUT_DIR: &str = "output";
/// How often the worker threads are polled.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Main entry point for the tab generator application.
pub fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("[MAIN] Starting Guitar Tab Generator...");
    let result = iced::application("Guitar Tab Generator", TabApp::update, TabApp::view)
        .subscription(TabApp::subscription)
        .theme(TabApp::theme)
        .run();
    info!("[MAIN] Application finished with result: {:?}", result);
    result
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    ToggleRecording, // Start or stop microphone capture
    Analyze,         // Transcribe the current audio
    LoadAudioFile,   // Pick a WAV file to analyse
    SaveTab,         // Write the current tab to a text file
    Tick,            // Poll the recording and analysis threads
}

/// UI-specific data needed for rendering the interface.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub status: String,
    pub tab_text: String,
    /// One line per detected note, empty before the first analysis.
    pub notes: Vec<String>,
    /// Whether an analysis has run (distinguishes "nothing yet" from "no notes").
    pub analyzed: bool,
    pub is_recording: bool,
    pub is_analyzing: bool,
    pub has_audio: bool,
    pub has_tab: bool,
}

/// Audio that is ready to be analysed, with the name shown in the status bar.
#[derive(Debug)]
struct LoadedAudio {
    label: String,
    recording: Arc<Recording>,
}

/// Recording thread management structure.
#[derive(Debug)]
struct RecordingWorker {
    shutdown_tx: Sender<()>,
    thread_handle: JoinHandle<Result<Recording>>,
}

/// Analysis thread management structure.
#[derive(Debug)]
struct AnalysisWorker {
    result_rx: Receiver<Transcription>,
    thread_handle: JoinHandle<()>,
}

#[derive(Debug)]
struct TabApp {
    transcriber: Transcriber,
    recording_worker: Option<RecordingWorker>,
    analysis_worker: Option<AnalysisWorker>,
    current_audio: Option<LoadedAudio>,
    // Single source of truth for all display data
    display_data: AppDisplayData,
}

impl Default for TabApp {
    fn default() -> Self {
        let config = load_config(Path::new(CONFIG_PATH));
        let transcriber = Transcriber::new(config);
        let display_data = AppDisplayData {
            status: "Ready".to_string(),
            tab_text: transcriber.empty_tab(),
            notes: Vec::new(),
            analyzed: false,
            is_recording: false,
            is_analyzing: false,
            has_audio: false,
            has_tab: false,
        };
        Self {
            transcriber,
            recording_worker: None,
            analysis_worker: None,
            current_audio: None,
            display_data,
        }
    }
}

impl TabApp {
    fn update(&mut self, message: Message) {
        match message {
            Message::ToggleRecording => {
                if self.recording_worker.is_some() {
                    self.stop_recording();
                } else {
                    self.start_recording();
                }
            }
            Message::Analyze => self.analyze(),
            Message::LoadAudioFile => self.load_audio_file(),
            Message::SaveTab => self.save_tab(),
            Message::Tick => self.poll_workers(),
        }
    }

    /// Collects results from whichever worker threads have finished.
    fn poll_workers(&mut self) {
        // A capture that ends on its own, e.g. no input device, is reported
        // without waiting for Stop.
        if self
            .recording_worker
            .as_ref()
            .is_some_and(|w| w.thread_handle.is_finished())
        {
            if let Some(worker) = self.recording_worker.take() {
                self.finish_recording(worker);
            }
        }

        let Some(worker) = &self.analysis_worker else {
            return;
        };
        match worker.result_rx.try_recv() {
            Ok(transcription) => {
                self.analysis_worker = None;
                self.show_transcription(transcription);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                if let Some(worker) = self.analysis_worker.take() {
                    let _ = worker.thread_handle.join();
                }
                error!("[MAIN] Analysis thread stopped without a result");
                self.display_data.is_analyzing = false;
                self.display_data.status = "Analysis failed.".to_string();
            }
        }
    }

    /// Spawns the recording thread and clears the previous results.
    fn start_recording(&mut self) {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let thread_handle = thread::spawn(move || audio::record_until(shutdown_rx));
        self.recording_worker = Some(RecordingWorker {
            shutdown_tx,
            thread_handle,
        });

        self.current_audio = None;
        let data = &mut self.display_data;
        data.is_recording = true;
        data.has_audio = false;
        data.has_tab = false;
        data.analyzed = false;
        data.notes.clear();
        data.tab_text = self.transcriber.empty_tab();
        data.status = "Recording...".to_string();
    }

    /// Signals the recording thread to stop and collects its recording.
    fn stop_recording(&mut self) {
        let Some(worker) = self.recording_worker.take() else {
            return;
        };
        let _ = worker.shutdown_tx.send(());
        self.finish_recording(worker);
    }

    fn finish_recording(&mut self, worker: RecordingWorker) {
        self.display_data.is_recording = false;
        let recording = match worker.thread_handle.join() {
            Ok(Ok(recording)) => recording,
            Ok(Err(e)) => {
                error!("[MAIN] Recording failed: {:#}", e);
                self.display_data.status = format!("Recording failed: {e}");
                return;
            }
            Err(_) => {
                error!("[MAIN] Recording thread panicked");
                self.display_data.status = "Recording failed.".to_string();
                return;
            }
        };

        let label = match save_recording(&recording) {
            Ok(Some(path)) => path.display().to_string(),
            Ok(None) => "recording".to_string(),
            Err(e) => {
                warn!("[MAIN] Could not save recording: {:#}", e);
                "recording (unsaved)".to_string()
            }
        };
        self.set_audio(label, recording);
        self.display_data.status = "Recording stopped. Ready to analyze.".to_string();
    }

    fn set_audio(&mut self, label: String, recording: Recording) {
        self.display_data.has_audio = !recording.is_empty();
        self.current_audio = Some(LoadedAudio {
            label,
            recording: Arc::new(recording),
        });
    }

    /// Starts transcribing the current audio on a worker thread.
    fn analyze(&mut self) {
        if self.analysis_worker.is_some() {
            return;
        }
        let Some(audio) = &self.current_audio else {
            self.display_data.status = "No audio to analyze.".to_string();
            return;
        };
        info!("[MAIN] Analyzing {}", audio.label);

        let transcriber = self.transcriber.clone();
        let recording = Arc::clone(&audio.recording);
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let thread_handle = thread::spawn(move || {
            let _ = result_tx.send(transcriber.transcribe_recording(&recording));
        });
        self.analysis_worker = Some(AnalysisWorker {
            result_rx,
            thread_handle,
        });
        self.display_data.is_analyzing = true;
        self.display_data.status = "Analyzing...".to_string();
    }

    fn show_transcription(&mut self, transcription: Transcription) {
        if transcription.report.overflowed > 0 {
            warn!(
                "[MAIN] {} notes did not fit on the tab",
                transcription.report.overflowed
            );
        }
        let data = &mut self.display_data;
        data.notes = transcription
            .detections
            .iter()
            .map(ui::notes_display::describe_detection)
            .collect();
        data.analyzed = true;
        data.is_analyzing = false;
        data.tab_text = transcription.tab;
        data.has_tab = true;
        data.status = "Analysis complete. Tab generated.".to_string();
    }

    fn load_audio_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select Audio File")
            .add_filter("WAV files", &["wav"])
            .add_filter("All files", &["*"])
            .pick_file()
        else {
            return;
        };

        match wav::read_wav(&path) {
            Ok(recording) => {
                let name = file_name(&path);
                self.display_data.status = format!("Audio file loaded: {name}");
                self.set_audio(name, recording);
            }
            Err(e) => {
                error!("[MAIN] {:#}", e);
                self.display_data.status = format!("Could not load audio: {e}");
            }
        }
    }

    fn save_tab(&mut self) {
        if self.display_data.tab_text.trim().is_empty() {
            self.display_data.status = "No tab to save.".to_string();
            return;
        }
        if let Err(e) = fs::create_dir_all(OUTPUT_DIR) {
            warn!("[MAIN] Could not create {}: {}", OUTPUT_DIR, e);
        }
        let Some(path) = rfd::FileDialog::new()
            .set_title("Save Tab As")
            .add_filter("Text files", &["txt"])
            .add_filter("All files", &["*"])
            .set_directory(OUTPUT_DIR)
            .set_file_name("tab.txt")
            .save_file()
        else {
            return;
        };

        match render::save_tab(&self.display_data.tab_text, &path) {
            Ok(()) => self.display_data.status = format!("Tab saved to {}", file_name(&path)),
            Err(e) => {
                error!("[MAIN] {:#}", e);
                self.display_data.status = format!("Failed to save tab: {e}");
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.recording_worker.is_some() || self.analysis_worker.is_some() {
            iced::time::every(POLL_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Loads the optional config file, falling back to defaults.
fn load_config(path: &Path) -> TabConfig {
    if !path.exists() {
        return TabConfig::default();
    }
    match TabConfig::load(path) {
        Ok(config) => {
            info!("[MAIN] Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            warn!("[MAIN] Ignoring {}: {:#}", path.display(), e);
            TabConfig::default()
        }
    }
}

/// Writes a finished recording to `data/recording_<timestamp>.wav`.
fn save_recording(recording: &Recording) -> Result<Option<PathBuf>> {
    fs::create_dir_all(RECORDINGS_DIR)
        .with_context(|| format!("failed to create {RECORDINGS_DIR}"))?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = Path::new(RECORDINGS_DIR).join(format!("recording_{timestamp}.wav"));
    if wav::write_wav(recording, &path)? {
        info!("[MAIN] Recording saved to {}", path.display());
        Ok(Some(path))
    } else {
        Ok(None)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
