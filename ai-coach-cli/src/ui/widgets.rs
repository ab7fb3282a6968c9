use ai_coach_session::{ExitPrompt, ExitReason, Phase, Snapshot};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Widget, Wrap},
};

/// Human label for a phase
pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::NotStarted => "Ready",
        Phase::Preparing => "Get ready",
        Phase::ExercisingTimed => "Go!",
        Phase::ExercisingReps => "Your set",
        Phase::Paused => "Paused",
        Phase::RestingBetweenSets => "Rest",
        Phase::RestingBetweenExercises => "Rest",
        Phase::CompletedExercisePendingNext => "Exercise done",
        Phase::WorkoutComplete => "Workout complete",
    }
}

/// Format seconds as m:ss
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Render the plan header with overall progress
pub fn render_header(area: Rect, buf: &mut Buffer, snapshot: &Snapshot, accent: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" 🏋 {} ", snapshot.plan_name))
        .border_style(Style::default().fg(accent));

    let inner = block.inner(area);
    block.render(area, buf);

    let line = Line::from(vec![
        Span::styled("Exercise ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}/{}", snapshot.exercise_index + 1, snapshot.exercise_count),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Elapsed ", Style::default().fg(Color::Gray)),
        Span::styled(
            format_clock(snapshot.elapsed_seconds),
            Style::default().fg(Color::Yellow),
        ),
    ]);

    Paragraph::new(line).render(inner, buf);
}

/// Render the current exercise panel
pub fn render_exercise(area: Rect, buf: &mut Buffer, snapshot: &Snapshot, accent: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", phase_label(snapshot.phase)))
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    block.render(area, buf);

    let mut lines = vec![
        Line::from(Span::styled(
            snapshot.exercise_name.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Set: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} of {}", snapshot.current_set, snapshot.total_sets),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    match (snapshot.duration_seconds, &snapshot.reps) {
        (Some(seconds), _) => lines.push(Line::from(vec![
            Span::styled("Duration: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{}s", seconds)),
        ])),
        (None, Some(reps)) => lines.push(Line::from(vec![
            Span::styled("Reps: ", Style::default().fg(Color::Gray)),
            Span::raw(reps.clone()),
        ])),
        (None, None) => {}
    }

    if let Some(description) = &snapshot.media.description {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            description.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(url) = &snapshot.media.video_url {
        lines.push(Line::from(Span::styled(
            format!("▶ {}", url),
            Style::default().fg(Color::Blue),
        )));
    }

    if let Some(next) = &snapshot.next_exercise {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Next: ", Style::default().fg(Color::Gray)),
            Span::raw(next.clone()),
        ]));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

/// Render the countdown, or a prompt when nothing is counting
pub fn render_timer(area: Rect, buf: &mut Buffer, snapshot: &Snapshot, accent: Color) {
    let phase = snapshot.display_phase();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ⏱ Timer ")
        .border_style(Style::default().fg(Color::Gray));

    if !phase.is_counting() {
        let inner = block.inner(area);
        block.render(area, buf);
        let text = match phase {
            Phase::NotStarted => "Press space to start",
            Phase::ExercisingReps => "Press enter when the set is done",
            Phase::CompletedExercisePendingNext => "Press enter to continue",
            _ => "",
        };
        Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray))).render(inner, buf);
        return;
    }

    let label = if snapshot.is_paused() {
        format!("{}s (paused)", snapshot.timer_value)
    } else {
        format!("{}s", snapshot.timer_value)
    };

    let ratio = timer_ratio(snapshot);

    let color = if snapshot.is_paused() {
        Color::DarkGray
    } else if phase.is_resting() {
        Color::Green
    } else {
        accent
    };

    Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(label)
        .render(area, buf);
}

/// Share of the running countdown still left
pub fn timer_ratio(snapshot: &Snapshot) -> f64 {
    if snapshot.timer_total == 0 {
        return 0.0;
    }
    (f64::from(snapshot.timer_value) / f64::from(snapshot.timer_total)).clamp(0.0, 1.0)
}

/// Render the exit feedback prompt as an overlay
pub fn render_exit_prompt(area: Rect, buf: &mut Buffer, prompt: &ExitPrompt, accent: Color) {
    Clear.render(area, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Why are you stopping? ")
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(area);
    block.render(area, buf);

    let mut items: Vec<ListItem> = ExitReason::ALL
        .iter()
        .enumerate()
        .map(|(idx, reason)| {
            let selected = prompt.reason == Some(*reason);
            let style = if selected {
                Style::default()
                    .fg(accent)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(
                format!("  [{}] {}", idx + 1, reason.label()),
                style,
            )))
        })
        .collect();

    if prompt.reason == Some(ExitReason::Other) {
        items.push(ListItem::new(""));
        items.push(ListItem::new(Line::from(vec![
            Span::styled("  > ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}_", prompt.custom_text),
                Style::default().fg(Color::Yellow),
            ),
        ])));
    }

    if !prompt.can_submit {
        items.push(ListItem::new(""));
        items.push(ListItem::new(Span::styled(
            "  Pick a reason to submit",
            Style::default().fg(Color::DarkGray),
        )));
    }

    List::new(items).render(inner, buf);
}

/// Render the latest notice and key hints at the bottom
pub fn render_status_bar(area: Rect, buf: &mut Buffer, notice: Option<&str>, hints: Option<&str>) {
    let mut spans = Vec::new();

    if let Some(notice) = notice {
        spans.push(Span::styled(
            format!(" {} ", notice),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        ));
    }

    if let Some(hints) = hints {
        spans.push(Span::styled(
            format!(" {} ", hints),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        ));
    }

    Paragraph::new(Line::from(spans)).render(area, buf);
}
