use crate::models::Movie;
use crate::state::SharedState;

pub async fn cmd_movie(state: &SharedState, id: &str) -> anyhow::Result<()> {
    let Some((movie, cast)) = state.catalog.movie_with_cast(id.trim()).await else {
        println!("Movie '{id}' not found.");
        return Ok(());
    };

    print_movie(&movie);

    if !cast.is_empty() {
        println!();
        println!("Cast profiles cached: {}", cast.len());
    }

    let watch_url = state.config.read().await.watch_url(&movie.id);
    println!("Watch:     {watch_url}");
    Ok(())
}

pub(super) fn print_movie(movie: &Movie) {
    println!("{} {}", movie.id, movie.title);
    println!("{:-<60}", "");

    if let Some(date) = &movie.date {
        println!("Date:      {date}");
    }

    let publisher = movie.publisher_name();
    if !publisher.is_empty() {
        println!("Publisher: {publisher}");
    }

    if !movie.stars.is_empty() {
        let names: Vec<&str> = movie.stars.iter().map(|s| s.name.as_str()).collect();
        println!("Stars:     {}", names.join(", "));
    }

    if !movie.genres.is_empty() {
        let names: Vec<&str> = movie.genres.iter().map(|g| g.name.as_str()).collect();
        println!("Genres:    {}", names.join(", "));
    }

    if let Some(title) = &movie.translated_title {
        println!("Title (translated): {title}");
    }

    if !movie.magnets.is_empty() {
        println!("Magnets:   {}", movie.magnets.len());
    }
}
