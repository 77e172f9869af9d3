//! Line-oriented shell over a [`Gallery`].
//!
//! Every line is one command. Output lines are tagged (`[VIEW]`, `[FOCUS]`,
//! `[ERROR]`, ...) so scripts can follow along. Introductions are generated
//! in background tasks and printed as `[INTRO]` when they arrive, so the
//! shell keeps reading commands meanwhile.

use crate::audio::LogAudio;
use std::io::{self, Write};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use zaitouna_core::media::image_mime_for;
use zaitouna_core::{
    Attention, AudioDeck, ExhibitionId, Gallery, GenerateError, IntroGenerator, KvStore,
    LayoutPolicy, NarrativeId, Point, Role, View,
};

type IntroOutcome = (ExhibitionId, Result<String, GenerateError>);

const HELP: &str = "\
  list                     - List exhibitions
  enter <n|id|slug>        - Open an exhibition's landing screen
  create <name>            - Create an exhibition and enter it
  remove <n|id|slug>       - Remove an exhibition
  visit | curate           - Enter the canvas as visitor or curator
  back                     - Canvas to landing, landing to gallery
  move <x> <y>             - Move the probe (0-100 on both axes)
  leave                    - Pointer leaves the canvas
  open <id> | close        - Open or close a narrative
  layout <policy>          - circle, square, rectangle or linear (curator)
  add                      - Add a narrative at the center (curator)
  image <id> <file>        - Replace a narrative's image (curator)
  context <field> <text>   - Edit name, location or story (curator)
  share <id>               - Print a share link
  reflect <text>           - Ask the curator for a reply
  status                   - Show the current state
  help                     - Show this help
  quit                     - Exit";

/// Run the shell on stdin until `quit` or end of input.
pub async fn run_shell<S, G>(gallery: &mut Gallery<S, G>) -> anyhow::Result<()>
where
    S: KvStore,
    G: IntroGenerator + 'static,
{
    let mut deck = AudioDeck::new(LogAudio);

    println!("=== Zaitouna ===");
    print_exhibitions(gallery);
    println!();
    println!("Commands:");
    println!("{HELP}");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    let (intro_tx, mut intro_rx) = mpsc::unbounded_channel::<IntroOutcome>();

    loop {
        spawn_intros(gallery, &intro_tx);
        stdout.flush().ok();

        let line = tokio::select! {
            line = lines.next_line() => line,
            Some((id, result)) = intro_rx.recv() => {
                finish_intro(gallery, &id, result).await;
                continue;
            }
        };
        let line = match line {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));

        match command {
            "quit" | "exit" => {
                deck.silence();
                println!("Goodbye!");
                break;
            }
            "help" => {
                println!("[HELP]");
                println!("{HELP}");
            }
            "list" => print_exhibitions(gallery),
            "status" => print_status(gallery),
            "enter" => match resolve_exhibition(gallery, rest) {
                Some(id) => {
                    deck.silence();
                    gallery.enter_exhibition(&id);
                    print_landing(gallery);
                }
                None => println!("[ERROR] No exhibition matches '{rest}'"),
            },
            "create" => match gallery.create_exhibition(rest).await {
                Ok(Some(id)) => {
                    println!("[CREATED] {id}");
                    print_landing(gallery);
                }
                Ok(None) => println!("[ERROR] Usage: create <name>"),
                Err(e) => println!("[ERROR] Create failed: {e}"),
            },
            "remove" => match resolve_exhibition(gallery, rest) {
                Some(id) => match gallery.remove_exhibition(&id).await {
                    Ok(_) => println!("[REMOVED] {id}"),
                    Err(e) => println!("[ERROR] Remove failed: {e}"),
                },
                None => println!("[ERROR] No exhibition matches '{rest}'"),
            },
            "visit" | "curate" => {
                let role = if command == "curate" {
                    Role::Curator
                } else {
                    Role::Visitor
                };
                if gallery.open_as(role) {
                    println!("[VIEW] canvas as {role:?}");
                    if let Some(attention) = gallery.attention() {
                        deck.sync(&attention);
                    }
                } else {
                    println!("[ERROR] Enter an exhibition first");
                }
            }
            "back" => {
                deck.silence();
                match gallery.state().view {
                    View::Exhibition => {
                        gallery.back_to_landing();
                        print_landing(gallery);
                    }
                    _ => {
                        gallery.back_to_gallery();
                        println!("[VIEW] gallery");
                    }
                }
            }
            "move" => match parse_point(rest) {
                Some(probe) => match gallery.probe_at(probe) {
                    Some(attention) => {
                        deck.sync(&attention);
                        print_attention(gallery, &attention);
                    }
                    None => println!("[IGNORED] Probe only moves on the canvas with no narrative open"),
                },
                None => println!("[ERROR] Usage: move <x> <y>"),
            },
            "leave" => {
                gallery.pointer_left();
                println!("[WALK] stopped");
            }
            "open" => match parse_narrative(rest) {
                Some(id) if gallery.select(&id) => print_narrative(gallery),
                _ => println!("[ERROR] No narrative '{rest}' on the canvas"),
            },
            "close" => {
                gallery.close_overlay();
                println!("[VIEW] canvas");
            }
            "layout" => match rest.parse::<LayoutPolicy>() {
                Ok(policy) => report(gallery.apply_layout(policy).await, &format!("layout {policy}")),
                Err(e) => println!("[ERROR] {e}"),
            },
            "add" => match gallery.add_narrative().await {
                Ok(Some(id)) => {
                    println!("[ADDED] narrative {id}");
                    print_narrative(gallery);
                }
                Ok(None) => println!("[IGNORED] Curator mode only"),
                Err(e) => println!("[ERROR] Add failed: {e}"),
            },
            "image" => {
                let Some((id, path)) = rest
                    .split_once(char::is_whitespace)
                    .and_then(|(id, path)| Some((parse_narrative(id)?, path.trim())))
                else {
                    println!("[ERROR] Usage: image <id> <file>");
                    continue;
                };
                match tokio::fs::read(path).await {
                    Ok(bytes) => {
                        let mime = image_mime_for(path);
                        report(
                            gallery.replace_image(&id, mime, &bytes).await,
                            &format!("image of {id}"),
                        );
                    }
                    Err(e) => println!("[ERROR] Cannot read {}: {e}", Path::new(path).display()),
                }
            }
            "context" => {
                let Some(mut context) = gallery.active().map(|ex| ex.context.clone()) else {
                    println!("[ERROR] Enter an exhibition first");
                    continue;
                };
                let (field, text) = rest
                    .split_once(char::is_whitespace)
                    .map(|(f, t)| (f, t.trim().to_string()))
                    .unwrap_or((rest, String::new()));
                match field {
                    "name" => context.name = text,
                    "location" => context.location = text,
                    "story" => context.story = text,
                    _ => {
                        println!("[ERROR] Usage: context <name|location|story> <text>");
                        continue;
                    }
                }
                report(gallery.edit_context(context).await, "context");
            }
            "share" => match parse_narrative(rest).and_then(|id| gallery.share(&id)) {
                Some(payload) => {
                    println!("[SHARE] {}", payload.title);
                    println!("  {}", payload.text);
                    println!("  {}", payload.url);
                }
                None => println!("[ERROR] No narrative '{rest}' in this exhibition"),
            },
            "reflect" => {
                print!("[PROCESSING]");
                stdout.flush().ok();
                let reply = gallery.reflect(rest).await;
                print!("\r            \r");
                match reply {
                    Some(text) => {
                        println!("[CURATOR]");
                        println!("{text}");
                    }
                    None => println!("[ERROR] No reply"),
                }
            }
            _ => println!("[ERROR] Unknown command. Type help for help."),
        }
    }

    Ok(())
}

/// Start a background generation for every queued introduction request.
fn spawn_intros<S, G>(gallery: &mut Gallery<S, G>, tx: &mpsc::UnboundedSender<IntroOutcome>)
where
    S: KvStore,
    G: IntroGenerator + 'static,
{
    for request in gallery.take_intro_requests() {
        let generator = gallery.shared_generator();
        let tx = tx.clone();
        tracing::debug!(exhibition = %request.exhibition, "generating introduction");
        tokio::spawn(async move {
            let result = generator.generate(&request.prompt).await;
            // The shell may have exited; nobody is left to show the text.
            let _ = tx.send((request.exhibition, result));
        });
    }
}

async fn finish_intro<S: KvStore, G: IntroGenerator>(
    gallery: &mut Gallery<S, G>,
    id: &ExhibitionId,
    result: Result<String, GenerateError>,
) {
    gallery.complete_intro(id, result).await;

    let showing = gallery.state().view == View::Landing && gallery.state().active.as_ref() == Some(id);
    if !showing {
        return;
    }
    if let Some(intro) = gallery.active().and_then(|ex| ex.intro.as_deref()) {
        println!("[INTRO]");
        println!("{intro}");
    }
}

fn report<E: std::fmt::Display>(result: Result<bool, E>, what: &str) {
    match result {
        Ok(true) => println!("[SAVED] {what}"),
        Ok(false) => println!("[IGNORED] Curator mode only"),
        Err(e) => println!("[ERROR] {what} failed: {e}"),
    }
}

/// Print the exhibition list, newest first.
pub fn print_exhibitions<S: KvStore, G: IntroGenerator>(gallery: &Gallery<S, G>) {
    println!("[EXHIBITIONS]");
    for (i, ex) in gallery.exhibitions().iter().enumerate() {
        println!(
            "  {}. {} ({}) - {} narratives [{}]",
            i + 1,
            ex.context.name,
            ex.context.location,
            ex.items.len(),
            ex.slug
        );
    }
}

fn print_landing<S: KvStore, G: IntroGenerator>(gallery: &Gallery<S, G>) {
    let Some(ex) = gallery.active() else {
        return;
    };
    println!("[VIEW] landing: {}", ex.context.name);
    println!("  {}", ex.context.location);
    match &ex.intro {
        Some(intro) => println!("{intro}"),
        None => {
            println!("{}", ex.context.story);
            if gallery.intro_pending(&ex.id) {
                println!("[PENDING] introduction");
            }
        }
    }
}

fn print_status<S: KvStore, G: IntroGenerator>(gallery: &Gallery<S, G>) {
    let state = gallery.state();
    println!("[STATUS]");
    println!("  View: {:?}", state.view);
    println!("  Role: {:?}", state.role);
    if let Some(ex) = gallery.active() {
        println!("  Exhibition: {} ({})", ex.context.name, ex.id);
    }
    println!("  Probe: ({:.1}, {:.1})", state.probe.x, state.probe.y);
    println!("  Walking: {}", state.walking);
    if let Some(n) = gallery.hovered() {
        println!("  Focused: {} - {}", n.id, n.title);
    }
    if let Some(n) = gallery.selected() {
        println!("  Open: {} - {}", n.id, n.title);
    }
}

fn print_attention<S: KvStore, G: IntroGenerator>(gallery: &Gallery<S, G>, attention: &Attention) {
    match gallery.hovered() {
        Some(n) => println!("[FOCUS] {} - {} ({})", n.id, n.title, n.writer),
        None => println!("[FOCUS] none"),
    }
    for w in attention.audible() {
        println!(
            "  {} d={:.1} opacity={:.2} scale={:.2} volume={:.2}",
            w.id, w.distance, w.opacity, w.scale, w.volume
        );
    }
}

fn print_narrative<S: KvStore, G: IntroGenerator>(gallery: &Gallery<S, G>) {
    let Some(n) = gallery.selected() else {
        return;
    };
    println!("[NARRATIVE] {} - {}", n.id, n.title);
    println!("  By: {}", n.writer);
    println!("  At: ({:.1}, {:.1})", n.x, n.y);
    println!("  {}", n.description);
}

/// Match a list position (1-based), an id, or a slug.
fn resolve_exhibition<S: KvStore, G: IntroGenerator>(
    gallery: &Gallery<S, G>,
    arg: &str,
) -> Option<ExhibitionId> {
    let list = gallery.exhibitions();
    let by_index = arg
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| list.get(i));
    by_index
        .or_else(|| list.iter().find(|ex| ex.id.as_str() == arg))
        .or_else(|| gallery.store().find_by_slug(arg))
        .map(|ex| ex.id.clone())
}

fn parse_narrative(arg: &str) -> Option<NarrativeId> {
    let arg = arg.trim();
    if arg.is_empty() {
        return None;
    }
    arg.parse().ok()
}

fn parse_point(arg: &str) -> Option<Point> {
    let mut parts = arg
        .split_whitespace()
        .map(|p| p.parse::<f64>().ok().filter(|v| v.is_finite()));
    match (parts.next().flatten(), parts.next().flatten(), parts.next()) {
        (Some(x), Some(y), None) => Some(Point::new(x, y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("85 50"), Some(Point::new(85.0, 50.0)));
        assert_eq!(parse_point("  12.5   7 "), Some(Point::new(12.5, 7.0)));
        assert_eq!(parse_point("85"), None);
        assert_eq!(parse_point("1 2 3"), None);
        assert_eq!(parse_point("a b"), None);
    }

    #[test]
    fn test_parse_point_rejects_non_finite() {
        assert_eq!(parse_point("nan nan"), None);
        assert_eq!(parse_point("inf 5"), None);
        assert_eq!(parse_point("5 -infinity"), None);
        assert_eq!(parse_point("1e400 5"), None);
    }

    #[test]
    fn test_parse_narrative() {
        assert_eq!(parse_narrative("7"), Some(NarrativeId::new(7)));
        assert_eq!(parse_narrative(" 0.4721 "), Some("0.4721".parse().unwrap()));
        assert_eq!(parse_narrative("n-3"), Some(NarrativeId::from("n-3")));
        assert_eq!(parse_narrative("  "), None);
    }
}
