//! Line-oriented game session.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use craft_client::{Action, Controller, CraftState};

const HELP: &str = "\
  Commands:
    click <name>   select a card, or pair it with the selected one
    add <name>     move a discovered element into the crafting area
    drag <name>    pick up a card
    drop <name>    release it on another card
    delete         enter delete mode, or confirm and leave it
    clear          empty the crafting area
    reset          forget everything except the starter elements
    sort           cycle sidebar order (time, name, emoji)
    show           redraw
    quit           leave";

pub async fn run(mut controller: Controller) -> Result<()> {
    println!("\n  INFINITE CRAFT");
    println!("  ==============");
    println!("  Type 'help' for commands.\n");
    render(controller.state());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  craft> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        controller.drain_timers().await;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let action = match (command.to_lowercase().as_str(), arg) {
            ("quit" | "exit" | "q", _) => break,
            ("help", _) => {
                println!("{}", HELP);
                continue;
            }
            ("show", _) => {
                render(controller.state());
                continue;
            }
            ("click", name) if !name.is_empty() => Action::ClickCard(name.to_string()),
            ("add", name) if !name.is_empty() => Action::SidebarClick(name.to_string()),
            ("drag", name) if !name.is_empty() => Action::DragStart(name.to_string()),
            ("drop", name) if !name.is_empty() => Action::Drop(name.to_string()),
            ("delete", _) => Action::ToggleDeleteMode,
            ("clear", _) => Action::ClearCraftingArea,
            ("reset", _) => Action::Reset,
            ("sort", _) => Action::CycleSort,
            _ => {
                println!("  Unknown command '{}'. Type 'help'.", line);
                continue;
            }
        };

        controller.dispatch(action).await;
        render(controller.state());
    }

    println!("  Bye!");
    Ok(())
}

fn render(state: &CraftState) {
    let sidebar: Vec<String> = state
        .sidebar_view()
        .into_iter()
        .map(|known| known.element.to_string())
        .collect();
    println!("  Discovered ({}): {}", state.sort(), sidebar.join(", "));

    let cards: Vec<String> = state
        .crafting_view()
        .into_iter()
        .map(|known| {
            let mut card = format!("[{}]", known.element);
            if known.is_new {
                card.push('*');
            }
            if state.is_marked(known.name()) {
                card = format!("x{}", card);
            }
            if state.selected() == Some(known.name()) {
                card = format!(">{}", card);
            }
            card
        })
        .collect();
    if cards.is_empty() {
        println!("  Crafting area: (empty)");
    } else {
        println!("  Crafting area: {}", cards.join(" "));
    }

    if state.delete_mode() {
        println!("  DELETE MODE: click cards to mark them, 'delete' again to remove");
    }
    if let Some(error) = state.error() {
        println!("  ! {}", error);
    }
}
