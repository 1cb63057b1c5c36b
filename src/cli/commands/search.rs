use crate::state::SharedState;

pub async fn cmd_search(
    state: &SharedState,
    keyword: &str,
    max_pages: Option<u32>,
) -> anyhow::Result<()> {
    println!("Searching for: {keyword}");

    let actors = state.catalog.search_actors(keyword, max_pages).await;

    if actors.is_empty() {
        println!("No actors found matching '{keyword}'");
        return Ok(());
    }

    println!();
    println!("Actors ({}):", actors.len());
    println!("{:-<60}", "");

    for actor in &actors {
        let age = actor
            .age
            .as_deref()
            .map_or_else(String::new, |a| format!(" | Age: {a}"));
        println!("• {} (ID: {}){}", actor.name, actor.id, age);
    }

    println!();
    println!("To list movies: javshelf star-movies <id>");

    Ok(())
}
