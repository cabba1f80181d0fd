use iced::widget::{Column, button, column, scrollable, text, text_editor};
use iced::{Element, Length, Task};
use tracing_subscriber::EnvFilter;

use lecture_notes_core::{Config, NotesGenerator, StudyNotes, Surface};

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    iced::application(App::new, App::update, App::view)
        .title("LectureAI")
        .run()
}

struct App {
    editor: text_editor::Content,
    surface: Surface,
    generator: Option<NotesGenerator>,
    config_error: Option<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Edit(text_editor::Action),
    Generate,
    Generated(Result<StudyNotes, String>),
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let generator = Config::from_env().and_then(|config| config.build_generator());
        (Self::with_generator(generator.map_err(|e| e.to_string())), Task::none())
    }

    fn with_generator(generator: Result<NotesGenerator, String>) -> Self {
        let (generator, config_error) = match generator {
            Ok(generator) => (Some(generator), None),
            Err(e) => {
                tracing::error!(error = %e, "failed to load configuration");
                (None, Some(format!("Configuration error: {e}")))
            }
        };
        Self {
            editor: text_editor::Content::new(),
            surface: Surface::new(),
            generator,
            config_error,
        }
    }

    fn can_generate(&self) -> bool {
        self.generator.is_some() && self.surface.can_submit()
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Edit(action) => {
                self.editor.perform(action);
                self.surface.set_notes(self.editor.text());
                Task::none()
            }
            Message::Generate => {
                let Some(generator) = self.generator.clone() else {
                    return Task::none();
                };
                let Some(notes) = self.surface.begin() else {
                    return Task::none();
                };
                Task::perform(
                    async move { generator.generate(&notes).await.map_err(|e| e.to_string()) },
                    Message::Generated,
                )
            }
            Message::Generated(outcome) => {
                self.surface.complete(outcome);
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let editor = text_editor(&self.editor)
            .placeholder("Paste your lecture notes here...")
            .height(Length::Fixed(220.0))
            .on_action(Message::Edit);

        let label = if self.surface.is_loading() {
            "Generating..."
        } else {
            "Generate Study Notes"
        };
        let generate =
            button(text(label)).on_press_maybe(self.can_generate().then_some(Message::Generate));

        let mut content = column![
            text("LectureAI").size(28),
            text("Lecture Notes").size(18),
            editor,
            generate,
        ]
        .spacing(12)
        .padding(24);

        if let Some(error) = self.config_error.as_deref().or(self.surface.error()) {
            content = content.push(text(error));
        }

        if let Some(notes) = self.surface.result() {
            content = content
                .push(text("Summary").size(20))
                .push(text(notes.summary.as_str()))
                .push(numbered("Key Points", &notes.key_points))
                .push(numbered("Exam Questions", &notes.exam_questions));
        }

        scrollable(content).into()
    }
}

fn numbered<'a>(title: &'a str, items: &'a [String]) -> Column<'a, Message> {
    items.iter().enumerate().fold(
        column![text(title).size(20)].spacing(6),
        |col, (i, item)| col.push(text(format!("{}. {}", i + 1, item))),
    )
}
