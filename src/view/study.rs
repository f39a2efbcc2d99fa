use crate::card::Status;
use crate::session::{Action, Mode, Notice, Session, SessionError};
use crate::store::{CardStore, ResolvedConfig};
use ratatui::prelude::*;
use std::io;
use std::time::{Duration, Instant};

use super::formatting::{format_elapsed, format_position, parse_color};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    symbols::border,
    widgets::{Block, Gauge, Paragraph, Wrap},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Message {
    Success(String),
    Warning(String),
}

pub struct App {
    config: ResolvedConfig,
    exit: bool,
    help: bool,
    message: Option<Message>,
    selected: usize,
    session: Session,
    set_names: Vec<String>,
    started: Instant,
    store: CardStore,
}

impl App {
    pub fn new(session: Session, store: CardStore, set_names: Vec<String>) -> Self {
        let (selected, config) = match session.set_name() {
            Some(name) => (
                set_names.iter().position(|n| n == name).unwrap_or(0),
                store.load_set_config(name),
            ),
            None => (
                0,
                ResolvedConfig {
                    title: "Flashcards".to_string(),
                    background_color: crate::store::DEFAULT_COLOR.to_string(),
                },
            ),
        };
        Self {
            config,
            exit: false,
            help: false,
            message: None,
            selected,
            session,
            set_names,
            started: Instant::now(),
            store,
        }
    }

    /// runs the application's main loop until the user quits
    pub fn run(&mut self, terminal: &mut super::Tui) -> io::Result<()> {
        while !self.exit {
            terminal.draw(|frame| self.render_frame(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn render_frame(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    /// updates the application's state based on user input
    fn handle_events(&mut self) -> io::Result<()> {
        if let Ok(true) = event::poll(Duration::from_secs(1)) {
            match event::read()? {
                // it's important to check that the event is a key press event as
                // crossterm also emits key release and repeat events on Windows.
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    self.handle_key_event(key_event)
                }
                _ => {}
            };
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if self.help {
            if matches!(
                key_event.code,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('?') | KeyCode::Esc
            ) {
                self.help = false;
            }
            return;
        }
        let revealed = self.session.is_revealed();
        let action = match key_event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return self.exit(),
            KeyCode::Char('?') => {
                self.help = true;
                return;
            }
            KeyCode::Tab => return self.select(1),
            KeyCode::BackTab => return self.select(-1),
            KeyCode::Enter => return self.load_selected(),
            KeyCode::Char(' ') => Action::ToggleAnswer,
            KeyCode::Char('k') | KeyCode::Char('K') if revealed => Action::Mark(Status::Known),
            KeyCode::Char('u') | KeyCode::Char('U') if revealed => Action::Mark(Status::Unknown),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Right => Action::Advance,
            KeyCode::Char('s') | KeyCode::Char('S') => Action::Shuffle,
            KeyCode::Char('r') | KeyCode::Char('R') => Action::ResetOrder,
            KeyCode::Char('v') | KeyCode::Char('V') => Action::ReviewUnknown,
            KeyCode::Char('a') | KeyCode::Char('A') if self.session.mode() == Mode::Review => {
                Action::BackToAll
            }
            _ => return,
        };
        let result = self.session.apply(action);
        self.report(result);
    }

    fn report(&mut self, result: Result<Option<Notice>, SessionError>) {
        self.message = match result {
            Ok(Some(notice)) => Some(Message::Success(notice.to_string())),
            Ok(None) => None,
            Err(err) => {
                log::debug!("action rejected: {}", err);
                Some(Message::Warning(err.to_string()))
            }
        };
    }

    fn select(&mut self, step: isize) {
        if self.set_names.is_empty() {
            return;
        }
        let len = self.set_names.len() as isize;
        self.selected = (self.selected as isize + step).rem_euclid(len) as usize;
    }

    /// Re-reads the store and loads the highlighted set into the session.
    fn load_selected(&mut self) {
        let Some(name) = self.set_names.get(self.selected).cloned() else {
            self.message = Some(Message::Warning("No sets available.".to_string()));
            return;
        };
        let mut sets = self.store.list_sets();
        self.set_names = sets.keys().cloned().collect();
        self.selected = self
            .set_names
            .iter()
            .position(|n| *n == name)
            .unwrap_or(0);
        let cards = sets.remove(&name).unwrap_or_default();
        let result = self.session.apply(Action::LoadSet {
            name: name.clone(),
            cards,
        });
        if result.is_ok() {
            self.config = self.store.load_set_config(&name);
        }
        self.report(result);
    }

    fn exit(&mut self) {
        self.exit = true;
    }

    fn frame_block(&self) -> Block<'_> {
        let color = parse_color(&self.config.background_color);
        let mut title = vec![" ".into(), self.config.title.as_str().bold()];
        if self.session.mode() == Mode::Review {
            title.push(" [Review Unknown]".yellow().bold());
        }
        title.push(" ".into());
        let elapsed = format_elapsed(self.started.elapsed().as_secs());
        let instructions = if self.help {
            Line::from(vec![" Close ".into(), "<Q> ".bold()])
        } else {
            let mut spans = vec![
                " Quit ".into(),
                "<Q> ".bold(),
                "Answer ".into(),
                "<Space> ".blue().bold(),
                "Known ".into(),
                "<K> ".green().bold(),
                "Unknown ".into(),
                "<U> ".red().bold(),
                "Shuffle ".into(),
                "<S> ".bold(),
                "Reset ".into(),
                "<R> ".bold(),
                "Review ".into(),
                "<V> ".bold(),
            ];
            if self.session.mode() == Mode::Review {
                spans.push("All ".into());
                spans.push("<A> ".bold());
            }
            spans.push("Help ".into());
            spans.push("<?> ".bold());
            spans.push("Elapsed ".into());
            spans.push(format!("{} ", elapsed).bold());
            Line::from(spans)
        };
        Block::bordered()
            .title(Line::from(title).centered())
            .title_bottom(instructions.centered())
            .border_set(border::ROUNDED)
            .border_style(Style::new().fg(color))
    }

    fn help_text(&self) -> Text<'_> {
        let binding = |key: &'static str, what: &'static str| {
            Line::from(vec![format!("{:>9}", key).bold(), "  ".into(), what.into()])
        };
        Text::from(vec![
            Line::from(vec![]),
            Line::from(vec!["Key Bindings".bold()]),
            Line::from(vec![]),
            binding("Space", "Show or hide the answer"),
            binding("K", "Mark the card as known (answer shown)"),
            binding("U", "Mark the card as unknown (answer shown)"),
            binding("N", "Next card"),
            binding("S", "Shuffle all cards"),
            binding("R", "Reset to the original order"),
            binding("V", "Review only unknown cards"),
            binding("A", "Back to all cards (while reviewing)"),
            binding("Tab", "Select the next set"),
            binding("Enter", "Load the selected set"),
            binding("Q", "Quit"),
        ])
    }

    fn card_text(&self) -> Text<'_> {
        let view = self.session.view();
        let Some(question) = view.question else {
            return Text::from(vec![
                Line::from(vec![]),
                Line::from(vec!["No cards loaded".into()]),
                Line::from(vec!["Select a set with <Tab> and load it with <Enter>".into()]),
            ]);
        };
        let mut lines: Vec<Line> = vec![
            Line::from(vec![format!(
                "Card {} of {}",
                view.position, view.total
            )
            .bold()]),
            Line::from(vec![]),
            Line::from(vec!["Question".bold()]),
        ];
        for l in question.lines() {
            lines.push(Line::from(vec![l.cyan()]));
        }
        lines.push(Line::from(vec![]));
        lines.push(Line::from(vec!["Answer".bold()]));
        match view.answer {
            Some(answer) => {
                for l in answer.lines() {
                    lines.push(Line::from(vec![l.green()]));
                }
            }
            None => lines.push(Line::from(vec!["<hidden>".dark_gray()])),
        }
        Text::from(lines)
    }

    fn stats_line(&self) -> Line<'_> {
        let view = self.session.view();
        Line::from(vec![
            "Viewed ".into(),
            view.viewed.to_string().bold(),
            "  Known ".into(),
            view.known.to_string().green().bold(),
            "  Unknown ".into(),
            view.unknown.to_string().red().bold(),
            "  Unseen ".into(),
            view.unseen.to_string().bold(),
        ])
    }

    fn sets_line(&self) -> Line<'_> {
        match self.set_names.get(self.selected) {
            Some(name) => Line::from(vec![
                "Set ".into(),
                format!(
                    "[{}] ",
                    format_position(self.selected + 1, self.set_names.len())
                )
                .into(),
                name.as_str().bold(),
                "  Select ".into(),
                "<Tab> ".bold(),
                "Load ".into(),
                "<Enter>".bold(),
            ]),
            None => Line::from(vec!["No sets found".into()]),
        }
    }

    fn message_line(&self) -> Line<'_> {
        match &self.message {
            Some(Message::Success(msg)) => Line::from(vec![msg.as_str().green()]),
            Some(Message::Warning(msg)) => Line::from(vec![msg.as_str().yellow().bold()]),
            None => Line::from(vec![]),
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.frame_block();
        let inner = block.inner(area);
        block.render(area, buf);

        if self.help {
            Paragraph::new(self.help_text())
                .centered()
                .render(inner, buf);
            return;
        }

        let [card_area, gauge_area, stats_area, sets_area, message_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        Paragraph::new(self.card_text())
            .wrap(Wrap { trim: true })
            .centered()
            .render(card_area, buf);

        let view = self.session.view();
        Gauge::default()
            .gauge_style(Style::new().fg(parse_color(&self.config.background_color)))
            .ratio(view.progress)
            .label(format_position(view.position, view.total))
            .render(gauge_area, buf);

        Paragraph::new(self.stats_line())
            .centered()
            .render(stats_area, buf);
        Paragraph::new(self.sets_line())
            .centered()
            .render(sets_area, buf);
        Paragraph::new(self.message_line())
            .centered()
            .render(message_area, buf);
    }
}
