use crate::models::Actor;
use crate::state::SharedState;

pub async fn cmd_star(state: &SharedState, id: &str) -> anyhow::Result<()> {
    let Some(actor) = state.catalog.actor(id.trim()).await else {
        println!("Actor '{id}' not found.");
        return Ok(());
    };

    print_actor(&actor);
    Ok(())
}

pub(super) fn print_actor(actor: &Actor) {
    println!("{} ({})", actor.name, actor.id);
    println!("{:-<60}", "");

    let fields = [
        ("Birthday", &actor.birthday),
        ("Age", &actor.age),
        ("Height", &actor.height),
        ("Bust", &actor.bust),
        ("Waist", &actor.waistline),
        ("Hips", &actor.hipline),
        ("Birthplace", &actor.birthplace),
        ("Hobby", &actor.hobby),
    ];

    for (label, value) in fields {
        if let Some(value) = value {
            println!("{:<11} {}", format!("{label}:"), value);
        }
    }
}
