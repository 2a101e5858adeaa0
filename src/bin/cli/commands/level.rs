use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, xp: u64, format: &OutputFormat) -> Result<()> {
    let ladder = app.engine.level_ladder();
    let progress = ladder.progress(xp);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        OutputFormat::Plain => {
            print!("Level {} of {}", progress.current_level, ladder.max_level());
            match progress.xp_for_next_level {
                Some(span) => println!(
                    ": {}/{} XP into the level ({:.1}%)",
                    progress.xp_in_level, span, progress.progress_percent
                ),
                None => println!(" (max level)"),
            }
        }
    }

    Ok(())
}
