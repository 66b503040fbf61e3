mod backend;
mod config;
mod error;
mod form;
mod selection;
mod theme;

use iced::{
    widget::{button, column, container, horizontal_space, row, scrollable, text, text_input},
    Element, Length, Task, Theme, Subscription,
    time, clipboard,
    alignment, Padding,
    window,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use backend::BackendClient;
use error::{Action, RequestError};
use form::Form;
use selection::SelectedFile;
use theme::{ThemePreference, ThemeStore};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn init_logging() {
    let filter = EnvFilter::try_from_env("SMARTENERGY_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> iced::Result {
    init_logging();

    let config = config::Config::load();

    iced::application("SmartEnergy Hub", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: iced::Size::new(config.window.width as f32, config.window.height as f32),
            min_size: Some(iced::Size::new(
                config.window.min_width as f32,
                config.window.min_height as f32,
            )),
            position: window::Position::Centered,
            ..Default::default()
        })
        .run_with(move || App::new(config))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Analyze,
    About,
}

#[derive(Debug, Clone)]
enum Message {
    PickFile,
    FilePicked(Option<SelectedFile>),
    TableQueryChanged(String),
    ChatQueryChanged(String),
    Upload,
    Chat,
    Finished(Action, Result<String, RequestError>),
    Reset,
    ToggleTheme,
    ShowPage(Page),
    CopyOutput,
    Tick,
}

struct App {
    form: Form,
    backend: BackendClient,
    theme: ThemePreference,
    theme_store: ThemeStore,
    page: Page,
    loading_frame: usize,
}

impl App {
    fn new(config: config::Config) -> (Self, Task<Message>) {
        let theme_store = ThemeStore::default_location();
        let theme = theme_store.load();
        let backend = BackendClient::with_config(&config.backend);
        tracing::info!(
            backend = %backend.base_url(),
            theme = theme.as_str(),
            "starting SmartEnergy Hub"
        );

        let app = App {
            form: Form::default(),
            backend,
            theme,
            theme_store,
            page: Page::Analyze,
            loading_frame: 0,
        };

        (app, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFile => Task::perform(selection::pick_file(), Message::FilePicked),
            Message::FilePicked(picked) => {
                // A cancelled dialog leaves the form untouched.
                if let Some(file) = picked {
                    self.form.select_file(file);
                }
                Task::none()
            }
            Message::TableQueryChanged(value) => {
                self.form.table_query = value;
                Task::none()
            }
            Message::ChatQueryChanged(value) => {
                self.form.chat_query = value;
                Task::none()
            }
            Message::Upload => {
                let Some(job) = self.form.begin_upload() else {
                    return Task::none();
                };
                let client = self.backend.clone();

                Task::perform(
                    async move { client.upload(&job.file, job.query.as_deref()).await },
                    |result| Message::Finished(Action::Upload, result),
                )
            }
            Message::Chat => {
                let Some(job) = self.form.begin_chat() else {
                    return Task::none();
                };
                let client = self.backend.clone();

                Task::perform(
                    async move { client.chat(&job.query).await },
                    |result| Message::Finished(Action::Chat, result),
                )
            }
            Message::Finished(action, result) => {
                self.form.finish(action, result);
                Task::none()
            }
            Message::Reset => {
                self.form.reset();
                Task::none()
            }
            Message::ToggleTheme => {
                let next = self.theme.toggled();
                if let Err(e) = self.theme_store.save(next) {
                    tracing::warn!(
                        "Could not save theme preference to {}: {}",
                        self.theme_store.path().display(),
                        e
                    );
                }
                self.theme = next;
                Task::none()
            }
            Message::ShowPage(page) => {
                self.page = page;
                Task::none()
            }
            Message::CopyOutput => clipboard::write(self.form.response.clone()),
            Message::Tick => {
                if self.form.is_loading() {
                    self.loading_frame = (self.loading_frame + 1) % SPINNER_FRAMES.len();
                }
                Task::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.form.is_loading() {
            time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn view(&self) -> Element<Message> {
        let (page_label, other_page) = match self.page {
            Page::Analyze => ("About", Page::About),
            Page::About => ("Analyze", Page::Analyze),
        };
        let theme_label = match self.theme {
            ThemePreference::Light => "☾ Dark",
            ThemePreference::Dark => "☀ Light",
        };

        let header = row![
            text("SmartEnergy Hub").size(24),
            horizontal_space(),
            button(text(page_label)).on_press(Message::ShowPage(other_page)),
            button(text(theme_label))
                .on_press(Message::ToggleTheme)
                .style(button::secondary),
        ]
        .spacing(10)
        .align_y(alignment::Vertical::Center);

        let body = match self.page {
            Page::Analyze => self.analyze_view(),
            Page::About => about_view(),
        };

        container(column![header, body].spacing(20).padding(20))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn analyze_view(&self) -> Element<Message> {
        let mut content = column![text("AI Data Analysis Chatbot").size(20)].spacing(16);

        if !self.form.error.is_empty() {
            content = content.push(text(&self.form.error).style(text::danger));
        }

        let file_label = self
            .form
            .file
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or("No file chosen");
        let mut file_row = row![
            button(text("Choose File")).on_press(Message::PickFile),
            text(file_label),
        ]
        .spacing(10)
        .align_y(alignment::Vertical::Center);
        if self.form.file.is_some() {
            file_row = file_row.push(
                button(text("Clear"))
                    .on_press(Message::Reset)
                    .style(button::danger),
            );
        }

        let upload_label = if self.form.is_uploading() {
            "Uploading..."
        } else {
            "Upload and Analyze"
        };
        let table_row = row![
            text_input("Which appliance uses most energy?", &self.form.table_query)
                .on_input(Message::TableQueryChanged)
                .on_submit(Message::Upload)
                .padding(10),
            button(text(upload_label))
                .on_press_maybe(self.form.can_upload().then_some(Message::Upload)),
        ]
        .spacing(10);

        let chat_label = if self.form.is_chatting() {
            "Processing..."
        } else {
            "Chat with Mini AI"
        };
        let chat_row = row![
            text_input("Ask a general question", &self.form.chat_query)
                .on_input(Message::ChatQueryChanged)
                .on_submit(Message::Chat)
                .padding(10),
            button(text(chat_label))
                .on_press_maybe(self.form.can_chat().then_some(Message::Chat))
                .style(button::success),
        ]
        .spacing(10);

        content = content
            .push(column![text("Upload File").size(14), file_row].spacing(6))
            .push(column![text("Tapas AI Table Query").size(14), table_row].spacing(6))
            .push(column![text("Mini Chat AI General Query").size(14), chat_row].spacing(6))
            .push(text("Response").size(18))
            .push(self.response_view());

        content.into()
    }

    fn response_view(&self) -> Element<Message> {
        if self.form.is_loading() && self.form.response.is_empty() {
            let status = if self.form.is_uploading() {
                "Analyzing your data..."
            } else {
                "Asking the assistant..."
            };

            return container(
                column![
                    text(SPINNER_FRAMES[self.loading_frame % SPINNER_FRAMES.len()]).size(32),
                    text(status).size(15)
                ]
                .spacing(10)
                .align_x(alignment::Horizontal::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center)
            .into();
        }

        let shown = if self.form.response.is_empty() {
            "Your response will appear here."
        } else {
            self.form.response.as_str()
        };

        let mut panel = column![scrollable(
            container(text(shown).size(15))
                .padding(15)
                .width(Length::Fill)
        )
        .height(Length::Fill)];

        if !self.form.response.is_empty() {
            panel = panel.push(
                container(
                    button(text("[Copy]").size(14))
                        .on_press(Message::CopyOutput)
                        .padding(10),
                )
                .width(Length::Fill)
                .align_x(alignment::Horizontal::Right)
                .padding(Padding::from([10, 10])),
            );
        }

        panel.height(Length::Fill).into()
    }

    fn theme(&self) -> Theme {
        self.theme.iced_theme()
    }
}

fn about_view<'a>() -> Element<'a, Message> {
    column![
        text("About Data Analysis Chatbot").size(22),
        text(
            "An AI-powered data analysis and chat client. Upload an energy \
             consumption file to get insights, or ask the assistant a general question."
        ),
        text("Features").size(18),
        text("• File upload analysis"),
        text("• Tapas AI table querying"),
        text("• Mini chat AI interaction"),
    ]
    .spacing(10)
    .into()
}
