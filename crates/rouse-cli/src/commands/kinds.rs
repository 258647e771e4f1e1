use rouse_core::challenge::{starts_on_first_input, time_budget};
use rouse_core::{ChallengeKind, Difficulty};
use serde::Serialize;

const LEVELS: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

#[derive(Serialize)]
struct KindInfo {
    kind: ChallengeKind,
    title: &'static str,
    /// Seconds per difficulty, easy first.
    budget_secs: [u32; 3],
    timer_starts_on_first_input: bool,
}

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let kinds: Vec<KindInfo> = ChallengeKind::ALL
        .into_iter()
        .map(|kind| KindInfo {
            kind,
            title: kind.title(),
            budget_secs: LEVELS.map(|d| time_budget(kind, d)),
            timer_starts_on_first_input: starts_on_first_input(kind),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&kinds)?);
        return Ok(());
    }

    for info in &kinds {
        let [easy, medium, hard] = info.budget_secs;
        let timer = if info.timer_starts_on_first_input {
            "on first input"
        } else {
            "immediately"
        };
        println!(
            "{:<10} {:<16} {easy}s / {medium}s / {hard}s  (timer starts {timer})",
            info.kind.as_str(),
            info.title,
        );
    }
    Ok(())
}
