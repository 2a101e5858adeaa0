use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use kaizen_lib::streaks::local_day;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, user: Uuid, format: &OutputFormat) -> Result<()> {
    let profile = app.load_profile(user)?;
    let now = Utc::now();

    // Read-only view: regeneration is applied to a copy and not saved
    let mut heart_state = profile.hearts.clone();
    let hearts = heart_state.refresh(app.engine.heart_economy(), now);
    let max_hearts = heart_state.max_hearts;
    let level = app.engine.level_ladder().progress(profile.total_xp);
    let today = local_day(&profile.streak.timezone, now);
    let xp_today = profile.daily_goal.xp_on(today);
    let goal_days = profile.daily_goal.consecutive_days(today);
    let due = profile.due_reviews(now);
    let completed = profile.progress.values().filter(|p| p.is_completed()).count();

    match format {
        OutputFormat::Json => {
            let reviews: Vec<serde_json::Value> = due
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "lessonId": p.lesson_id.to_string(),
                        "title": app.lesson_title(p.lesson_id),
                        "masteryLevel": p.mastery_level,
                        "effectiveMastery": p.effective_mastery(app.engine.mastery_schedule(), now),
                        "nextReviewAt": p.next_review_at.map(|d| d.to_rfc3339()),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "userId": profile.user_id.to_string(),
                "hearts": hearts,
                "maxHearts": max_hearts,
                "streak": {
                    "current": profile.streak.current_streak,
                    "longest": profile.streak.longest_streak,
                    "timezone": profile.streak.timezone,
                },
                "totalXp": profile.total_xp,
                "level": level,
                "dailyGoal": {
                    "xpToday": xp_today,
                    "goalXp": app.config.daily_goal_xp,
                    "consecutiveDays": goal_days,
                },
                "completedLessons": completed,
                "dueReviews": reviews,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("User {}", profile.user_id);
            match hearts.next_refill_at {
                Some(next) => println!(
                    "  Hearts:  {}/{} (next at {})",
                    hearts.hearts,
                    max_hearts,
                    next.format("%Y-%m-%d %H:%M UTC")
                ),
                None => println!("  Hearts:  {}/{}", hearts.hearts, max_hearts),
            }
            println!(
                "  Streak:  {} day(s) (longest {}, {})",
                profile.streak.current_streak,
                profile.streak.longest_streak,
                profile.streak.timezone
            );
            match level.xp_for_next_level {
                Some(span) => println!(
                    "  Level:   {} ({}/{} XP, {:.0}%)",
                    level.current_level, level.xp_in_level, span, level.progress_percent
                ),
                None => println!("  Level:   {} (max)", level.current_level),
            }
            println!("  XP:      {} total", profile.total_xp);
            println!(
                "  Goal:    {}/{} XP today, {} day(s) in a row",
                xp_today, app.config.daily_goal_xp, goal_days
            );
            println!("  Lessons: {} completed", completed);

            if due.is_empty() {
                println!("  No reviews due.");
            } else {
                println!("  Due for review:");
                for p in &due {
                    println!(
                        "    {} (mastery {})",
                        app.lesson_title(p.lesson_id),
                        p.effective_mastery(app.engine.mastery_schedule(), now)
                    );
                }
            }
        }
    }

    Ok(())
}
