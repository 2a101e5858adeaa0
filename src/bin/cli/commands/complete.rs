use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use kaizen_lib::session::LessonAttempt;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    user: Uuid,
    lesson: Uuid,
    attempt: &LessonAttempt,
    timezone: &str,
    format: &OutputFormat,
) -> Result<()> {
    app.ensure_profile(user, timezone)?;

    let (outcome, report) = app
        .engine
        .complete_lesson_and_unlock(&app.storage, &app.catalog, user, lesson, attempt, Utc::now())
        .context("Failed to complete lesson")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "outcome": outcome,
                "unlocks": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Completed \"{}\" with {}%",
                app.lesson_title(outcome.lesson_id),
                attempt.score
            );

            let bonuses = outcome.xp.bonuses;
            let mut extras = Vec::new();
            if bonuses.perfect > 0 {
                extras.push(format!("perfect +{}", bonuses.perfect));
            }
            if bonuses.daily_goal > 0 {
                extras.push(format!("daily goal +{}", bonuses.daily_goal));
            }
            if bonuses.streak_bonus > 0 {
                extras.push(format!("streak +{}", bonuses.streak_bonus));
            }
            if extras.is_empty() {
                println!("  XP:      +{} ({} total)", outcome.xp.total, outcome.total_xp);
            } else {
                println!(
                    "  XP:      +{} ({}; {} total)",
                    outcome.xp.total,
                    extras.join(", "),
                    outcome.total_xp
                );
            }

            if outcome.leveled_up {
                println!("  Level:   {} -> {}", outcome.level_before, outcome.level.current_level);
            } else {
                println!("  Level:   {}", outcome.level.current_level);
            }

            println!("  Hearts:  {}", outcome.hearts);
            match outcome.streak.milestone {
                Some(days) => println!("  Streak:  {} day(s), milestone reached!", days),
                None => println!("  Streak:  {} day(s)", outcome.streak.current_streak),
            }
            println!(
                "  Mastery: {} -> {} (review {})",
                outcome.mastery.previous,
                outcome.mastery.level,
                outcome.mastery.next_review_at.format("%Y-%m-%d")
            );
            if outcome.daily_goal.reached_now {
                println!("  Daily goal reached!");
            }

            for card_id in &report.unlocked {
                let name = app
                    .catalog
                    .card(*card_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| card_id.to_string());
                println!("  Unlocked card: {}", name);
            }
            for diagnostic in &report.diagnostics {
                eprintln!("warning: card {}: {}", diagnostic.card_id, diagnostic.diagnostic);
            }
        }
    }

    Ok(())
}
