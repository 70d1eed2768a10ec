//! Line-driven interactive screen.
//!
//! Each line typed on stdin stands in for a touch or a keystroke:
//! `/` toggles the search box, text while it is open edits the query, a
//! number picks that candidate, `r` retries a failed load and `q` quits.

use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use weatherview_core::{Action, ViewState, WeatherView};

#[derive(Debug, PartialEq)]
enum Input {
    Action(Action),
    Quit,
    Ignored,
}

fn parse_input(line: &str, state: &ViewState) -> Input {
    let text = line.trim();

    match text {
        "q" | ":q" => return Input::Quit,
        "/" => return Input::Action(Action::ToggleSearch),
        _ => {}
    }

    if state.search_open {
        if let Ok(n) = text.parse::<usize>() {
            if (1..=state.candidates.len()).contains(&n) {
                return Input::Action(Action::SelectCandidate(n - 1));
            }
        }
        return Input::Action(Action::QueryEdited(text.to_string()));
    }

    if text == "r" && state.failure.is_some() {
        return Input::Action(Action::Retry);
    }

    Input::Ignored
}

fn draw(view: &WeatherView) -> Result<()> {
    let mut out = std::io::stdout().lock();
    // Clear and home the cursor.
    write!(out, "\x1B[2J\x1B[H{}\n> ", view.screen())?;
    out.flush()?;
    Ok(())
}

pub async fn run(mut view: WeatherView) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    view.start();
    draw(&view)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match parse_input(&line, view.state()) {
                    Input::Action(action) => view.dispatch(action),
                    Input::Quit => break,
                    Input::Ignored => {}
                }
            }
            () = view.step() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        draw(&view)?;
    }

    view.flush().await;
    Ok(())
}
