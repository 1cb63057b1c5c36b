use crate::state::SharedState;

pub async fn cmd_history(state: &SharedState, limit: u64) -> anyhow::Result<()> {
    let history = state.catalog.search_history(Some(limit)).await;

    if history.is_empty() {
        println!("No search history.");
        return Ok(());
    }

    println!("Recent searches (last {}):", history.len());
    println!("{:-<40}", "");

    for (i, keyword) in history.iter().enumerate() {
        println!("{:>3}. {keyword}", i + 1);
    }

    Ok(())
}
