use crate::state::SharedState;

pub async fn cmd_star_movies(
    state: &SharedState,
    id: &str,
    max_pages: Option<u32>,
) -> anyhow::Result<()> {
    let id = id.trim();
    let movies = state.catalog.actor_movies(id, max_pages).await;

    if movies.is_empty() {
        println!("No movies found for actor '{id}'.");
        return Ok(());
    }

    println!("Movies of {id} ({}):", movies.len());
    println!("{:-<70}", "");

    for movie in &movies {
        let date = movie.date.as_deref().unwrap_or("----------");
        println!("• {date}  {:<12} {}", movie.id, movie.title);
    }

    Ok(())
}
