use crate::state::SharedState;

pub async fn cmd_clean(state: &SharedState) -> anyhow::Result<()> {
    let settings = state.catalog.cache_settings();
    println!(
        "Purging actors older than {} days and movies older than {} days...",
        settings.purge_actor_after_days, settings.purge_movie_after_days
    );

    match state.catalog.purge().await {
        Some(report) => {
            println!("✓ Removed {} actors", report.actors);
            println!("✓ Removed {} movies", report.movies);
            println!("✓ Removed {} associations", report.associations);
        }
        None => println!("⚠ Purge failed, see log for details"),
    }

    Ok(())
}
