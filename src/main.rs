use clap::Parser;
use iced::widget::{button, column, container, text, text_input, Column};
use iced::{event, keyboard, window, Alignment, Element, Event, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod ui;

use config::Config;
use state::store::CaptionStore;
use state::session::Prepared;
use state::{CurrentView, Session};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "caption-curator")]
#[command(about = "Caption a folder of images, least-captioned first")]
#[command(version)]
struct Args {
    /// Folder of images to caption (a folder picker is shown if omitted)
    #[arg(env = "CAPTION_CURATOR_ROOT")]
    root: Option<PathBuf>,

    /// Size of the square the preview image is fitted into
    #[arg(long)]
    preview_size: Option<u32>,
}

/// Main application state
struct CaptionCurator {
    config: Config,
    /// Active session, `None` until a folder has been scanned
    session: Option<Session>,
    /// Snapshot of the current entry, refreshed after every change
    view: Option<CurrentView>,
    /// On-screen preview size of the current image
    preview: Option<(u32, u32)>,
    /// Weight of the current entry, read with the view
    weight: i64,
    /// Caption being typed
    caption: String,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User asked to open a folder
    PickFolder,
    /// Background scan finished
    FolderScanned(Result<Prepared, String>),
    /// Caption text box edited
    CaptionChanged(String),
    /// Enter pressed: save the caption (if any) and advance
    Submit,
    Next,
    Previous,
    /// Mark the current image DELETE_ME
    Exclude,
}

impl CaptionCurator {
    /// Create a new instance of the application
    fn new(config: Config) -> (Self, Task<Message>) {
        let task = match &config.root_folder {
            Some(root) => Task::perform(scan_folder_async(root.clone()), Message::FolderScanned),
            None => Task::done(Message::PickFolder),
        };
        let status = match &config.root_folder {
            Some(root) => format!("Scanning {}...", root.display()),
            None => "Pick a folder of images to caption.".to_string(),
        };

        (
            CaptionCurator {
                config,
                session: None,
                view: None,
                preview: None,
                weight: 0,
                caption: String::new(),
                status,
            },
            task,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFolder => {
                let folder = FileDialog::new()
                    .set_title("Select Folder with Images to Caption")
                    .pick_folder();

                if let Some(folder_path) = folder {
                    self.status = format!("Scanning {}...", folder_path.display());
                    return Task::perform(scan_folder_async(folder_path), Message::FolderScanned);
                }

                Task::none()
            }
            Message::FolderScanned(Ok(prepared)) => {
                match Session::new(prepared.set, CaptionStore::new()) {
                    Ok(session) => {
                        let (_, total) = session.position();
                        self.session = Some(session);
                        self.status = format!(
                            "✅ Loaded {} images ({} new caption logs).",
                            total, prepared.created_logs
                        );
                        self.after_change()
                    }
                    Err(e) => self.fail(e.to_string()),
                }
            }
            Message::FolderScanned(Err(e)) => self.fail(e),
            Message::CaptionChanged(caption) => {
                self.caption = caption;
                Task::none()
            }
            Message::Submit => self.with_session(|session, caption| {
                let saved_to = session.current()?.log_path;
                if session.submit_caption(caption)? {
                    Ok(format!("💾 Saved caption to {}", file_name(&saved_to)))
                } else {
                    Ok(String::new())
                }
            }),
            Message::Exclude => self.with_session(|session, _| {
                let excluded = session.current()?.image_path;
                session.exclude_current()?;
                Ok(format!("🗑️  Excluded {}", file_name(&excluded)))
            }),
            Message::Next => self.with_session(|session, _| {
                session.go_next();
                Ok(String::new())
            }),
            Message::Previous => self.with_session(|session, _| {
                session.go_previous();
                Ok(String::new())
            }),
        }
    }

    /// Run one session operation, then re-render from disk
    ///
    /// The operation returns the status line to show afterwards.
    fn with_session(
        &mut self,
        op: impl FnOnce(&mut Session, &str) -> error::Result<String>,
    ) -> Task<Message> {
        let Some(session) = self.session.as_mut() else {
            tracing::warn!("Ignoring input: no folder open");
            return Task::none();
        };

        match op(session, &self.caption) {
            Ok(status) => {
                self.status = status;
                self.after_change()
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Reload the current entry, clear the caption box and focus it
    fn after_change(&mut self) -> Task<Message> {
        self.caption.clear();

        let Some(session) = &self.session else {
            return Task::none();
        };
        match session.current().and_then(|view| Ok((session.current_weight()?, view))) {
            Ok((weight, view)) => {
                self.preview = ui::render::preview_size(&view.image_path, self.config.preview_size);
                self.weight = weight;
                self.view = Some(view);
            }
            Err(e) => {
                self.view = None;
                return self.fail(e.to_string());
            }
        }

        text_input::focus(ui::render::caption_input_id())
    }

    fn fail(&mut self, message: String) -> Task<Message> {
        tracing::error!("❌ {}", message);
        self.status = format!("❌ {}", message);
        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        if let Some(view) = &self.view {
            return ui::render::render(
                view,
                ui::render::RenderInputs {
                    caption: &self.caption,
                    status: &self.status,
                    preview: self.preview,
                    weight: self.weight,
                    preview_box: self.config.preview_size,
                },
            );
        }

        let content: Column<Message> = column![
            text("Caption Curator").size(48),
            button("Open Folder")
                .on_press(Message::PickFolder)
                .padding(10),
            text(&self.status).size(16),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(handle_event)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn handle_event(event: Event, status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => key_message(&key, status),
        _ => None,
    }
}

/// Window-wide key bindings
///
/// Arrow keys navigate even while the caption box has focus. Enter
/// submits from anywhere, unless a widget (the caption box) already
/// handled it.
fn key_message(key: &keyboard::Key, status: event::Status) -> Option<Message> {
    use keyboard::key::Named;

    match key {
        keyboard::Key::Named(Named::ArrowLeft) => Some(Message::Previous),
        keyboard::Key::Named(Named::ArrowRight) => Some(Message::Next),
        keyboard::Key::Named(Named::Enter) if status == event::Status::Ignored => {
            Some(Message::Submit)
        }
        _ => None,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .to_string()
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caption_curator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match config::load(args.root, args.preview_size) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    tracing::info!("🎨 Caption Curator starting (preview {}px)", config.preview_size);

    iced::application("Caption Curator", CaptionCurator::update, CaptionCurator::view)
        .subscription(CaptionCurator::subscription)
        .theme(CaptionCurator::theme)
        .centered()
        .run_with(move || CaptionCurator::new(config))
}

/// Scan a folder and order its entries
/// Runs on a blocking worker to avoid freezing the UI
async fn scan_folder_async(folder_path: PathBuf) -> Result<Prepared, String> {
    tokio::task::spawn_blocking(move || {
        Session::prepare(&folder_path, &CaptionStore::new()).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}
