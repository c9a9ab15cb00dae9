use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use range_marker_engine::{Action, Choice, LabelCandidate, LabelChooser, LabelVocabulary};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::io::{Stdout, stdout};

/// Label list shown by the picker, with the current selection.
pub struct PickerState {
    candidates: Vec<LabelCandidate>,
    list_state: ListState,
}

impl PickerState {
    pub fn new(candidates: &[LabelCandidate]) -> Self {
        let mut list_state = ListState::default();
        if !candidates.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            candidates: candidates.to_vec(),
            list_state,
        }
    }

    fn next(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.candidates.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.candidates.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    /// React to a key. `Some` ends the picker with that choice.
    pub fn handle_key(&mut self, code: KeyCode, vocabulary: &LabelVocabulary) -> Option<Choice> {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Choice::Cancelled),
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous();
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self
                .list_state
                .selected()
                .and_then(|i| self.candidates.get(i))
                .map(|candidate| Choice::Chosen(Action::toggle(candidate))),
            KeyCode::Char('c') => Some(Choice::Chosen(Action::apply(
                vocabulary.new_comment_label(),
            ))),
            _ => None,
        }
    }
}

/// Interactive [`LabelChooser`] drawing a list of candidates in the terminal.
pub struct TerminalPicker {
    vocabulary: LabelVocabulary,
}

impl TerminalPicker {
    pub fn new(vocabulary: LabelVocabulary) -> Self {
        Self { vocabulary }
    }

    fn pick(&self, candidates: &[LabelCandidate]) -> Result<Choice> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let mut state = PickerState::new(candidates);
        let res = run_picker(&mut terminal, &mut state, &self.vocabulary);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }
}

impl LabelChooser for TerminalPicker {
    fn choose(&mut self, candidates: &[LabelCandidate]) -> Choice {
        match self.pick(candidates) {
            Ok(choice) => choice,
            Err(err) => {
                log::error!("label picker failed: {err:?}");
                Choice::Cancelled
            }
        }
    }
}

fn run_picker(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut PickerState,
    vocabulary: &LabelVocabulary,
) -> Result<Choice> {
    loop {
        terminal.draw(|f| ui(f, state))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(choice) = state.handle_key(key.code, vocabulary)
        {
            return Ok(choice);
        }
    }
}

fn ui(f: &mut Frame, state: &mut PickerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(f.area());

    let items: Vec<ListItem> = state
        .candidates
        .iter()
        .map(|candidate| {
            let check = if candidate.already_applied {
                "[x] "
            } else {
                "[ ] "
            };
            ListItem::new(Line::from(vec![
                Span::raw(check),
                Span::styled(
                    candidate.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}", candidate.label)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Labels"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(list, chunks[0], &mut state.list_state);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("↑/k ↓/j: Move | "),
        Span::raw("Enter: Toggle | "),
        Span::raw("c: New comment | "),
        Span::raw("Esc/q: Cancel"),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use range_marker_engine::Direction as LabelDirection;

    fn candidates() -> Vec<LabelCandidate> {
        vec![
            LabelCandidate {
                label: "rtm-underline".into(),
                title: "Underline".to_string(),
                already_applied: false,
            },
            LabelCandidate {
                label: "rtm-mark-1".into(),
                title: "Comment: hi".to_string(),
                already_applied: true,
            },
        ]
    }

    #[test]
    fn enter_toggles_selected_candidate() {
        let vocabulary = LabelVocabulary::default();
        let mut state = PickerState::new(&candidates());

        assert_eq!(state.handle_key(KeyCode::Down, &vocabulary), None);
        let Some(Choice::Chosen(action)) = state.handle_key(KeyCode::Enter, &vocabulary) else {
            panic!("expected a choice");
        };
        assert_eq!(action.label.as_str(), "rtm-mark-1");
        assert_eq!(action.direction, LabelDirection::Remove);
    }

    #[test]
    fn selection_wraps_around() {
        let vocabulary = LabelVocabulary::default();
        let mut state = PickerState::new(&candidates());

        state.handle_key(KeyCode::Up, &vocabulary);
        assert_eq!(state.list_state.selected(), Some(1));
        state.handle_key(KeyCode::Char('j'), &vocabulary);
        assert_eq!(state.list_state.selected(), Some(0));
    }

    #[test]
    fn c_creates_comment_label() {
        let vocabulary = LabelVocabulary::default();
        let mut state = PickerState::new(&candidates());

        let Some(Choice::Chosen(action)) = state.handle_key(KeyCode::Char('c'), &vocabulary)
        else {
            panic!("expected a choice");
        };
        assert!(vocabulary.is_comment_label(action.label.as_str()));
        assert_eq!(action.direction, LabelDirection::Apply);
    }

    #[test]
    fn escape_cancels() {
        let vocabulary = LabelVocabulary::default();
        let mut state = PickerState::new(&[]);

        assert_eq!(state.handle_key(KeyCode::Enter, &vocabulary), None);
        assert_eq!(
            state.handle_key(KeyCode::Esc, &vocabulary),
            Some(Choice::Cancelled)
        );
    }
}
