use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use kaizen_lib::session::SessionError;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    user: Uuid,
    lesson: Uuid,
    timezone: &str,
    format: &OutputFormat,
) -> Result<()> {
    app.ensure_profile(user, timezone)?;

    let started = match app
        .engine
        .start_lesson_stored(&app.storage, &app.catalog, user, lesson, Utc::now())
    {
        Ok(started) => started,
        Err(SessionError::NotEnoughHearts {
            hearts,
            required,
            next_refill_at,
        }) => {
            let next = next_refill_at
                .map(|d| format!(", next heart at {}", d.format("%Y-%m-%d %H:%M UTC")))
                .unwrap_or_default();
            anyhow::bail!("Not enough hearts ({} of {} needed){}", hearts, required, next);
        }
        Err(e) => return Err(e).context("Failed to start lesson"),
    };

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "lessonId": started.lesson_id.to_string(),
                "hearts": started.hearts,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Started \"{}\"", app.lesson_title(started.lesson_id));
            println!("  Hearts: {}", started.hearts.hearts);
        }
    }

    Ok(())
}
