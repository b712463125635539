use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;

use loom_graph::{GraphLayout, ReaderState, StoryGraph};
use loom_sdk::{Loom, LoomConfig, NodeDraft, StoryDraft, UserId};
use loom_types::{NodeId, StoryNode, StorySnapshot};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => LoomConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LoomConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Command::Layout(args) => cmd_layout(args, &config, &format),
        Command::Branches(args) => cmd_branches(args, &format),
        Command::Read(args) => cmd_read(args, &format),
        Command::Summary(args) => cmd_summary(args, &format),
        Command::Demo => cmd_demo(config, &format),
    }
}

fn load_graph(path: &Path) -> anyhow::Result<StoryGraph> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let snapshot = StorySnapshot::from_json(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    if let Some(story) = &snapshot.story {
        tracing::debug!(story = %story.id, title = %story.title, "loaded story snapshot");
    }
    Ok(StoryGraph::from_nodes(snapshot.nodes))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn node_line(node: &StoryNode) -> String {
    let canon = if node.is_canon { "★ ".yellow().to_string() } else { "  ".into() };
    format!(
        "{}{} {} {}",
        canon,
        node.id.short_id().cyan(),
        format!("({} votes)", node.votes()).dimmed(),
        node.excerpt(60),
    )
}

fn cmd_layout(args: SnapshotArgs, config: &LoomConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;
    let layout = graph.layout(&config.layout);
    match format {
        OutputFormat::Json => print_json(&layout),
        OutputFormat::Text => {
            print_layout(&layout);
            Ok(())
        }
    }
}

fn print_layout(layout: &GraphLayout) {
    if layout.is_empty() {
        println!("Empty story.");
        return;
    }
    for level in 0..layout.depth() {
        println!("{} {}", "Level".bold(), level.to_string().bold());
        for p in layout.level(level) {
            println!("  ({:>7.1}, {:>7.1}) {}", p.x, p.y, node_line(&p.source_node));
        }
    }
    let canon_edges = layout.edges.iter().filter(|e| e.is_canon_path).count();
    println!(
        "\n{} nodes, {} edges ({} on the canon path)",
        layout.positioned_nodes.len().to_string().bold(),
        layout.edges.len().to_string().bold(),
        canon_edges.to_string().yellow(),
    );
}

fn cmd_branches(args: BranchesArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;
    let id = NodeId::parse(&args.node)?;
    if !graph.contains(&id) {
        anyhow::bail!("node {} is not in {}", id, args.file.display());
    }
    let branches = graph.branches(&id);
    match format {
        OutputFormat::Json => print_json(&branches),
        OutputFormat::Text => {
            if branches.is_empty() {
                println!("No branches from {}. End of path.", id.short_id().cyan());
            }
            for (i, node) in branches.iter().enumerate() {
                println!("{:>3}. {}", i + 1, node_line(node));
            }
            Ok(())
        }
    }
}

/// Apply `--canon`, each `--choose`, then `--back` to a fresh reader.
fn read_state(graph: &StoryGraph, args: &ReadArgs) -> anyhow::Result<ReaderState> {
    let mut state = if args.canon {
        graph
            .canonical_path()
            .map(ReaderState::AtNode)
            .unwrap_or_default()
    } else {
        ReaderState::start(graph)
    };
    for choice in &args.choices {
        let child = NodeId::parse(choice)?;
        state
            .choose_branch(graph, &child)
            .with_context(|| format!("choosing {choice}"))?;
    }
    for _ in 0..args.back {
        state.go_back().context("going back")?;
    }
    Ok(state)
}

fn cmd_read(args: ReadArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;
    let state = read_state(&graph, &args)?;
    let view = state.view(&graph);
    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Text => {
            let Some(current) = view.current_node else {
                println!("This story has no beginning yet.");
                return Ok(());
            };
            let crumbs: Vec<String> = view.cursor.iter().map(|id| id.short_id().to_string()).collect();
            println!("{} {}", "Path:".bold(), crumbs.join(" → ").cyan());
            println!("\n{}\n", current.content);
            if view.is_end_of_path() {
                println!("{}", "End of path. Restart or write what happens next.".dimmed());
            } else {
                println!("{}", "What happens next?".bold());
                for (i, node) in view.branches.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, node_line(node));
                }
            }
            Ok(())
        }
    }
}

fn cmd_summary(args: SnapshotArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;
    let summary = graph.summary();
    match format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Text => {
            println!("Nodes:    {}", summary.node_count.to_string().bold());
            println!("Roots:    {}", summary.root_count);
            println!("Leaves:   {}", summary.leaf_count);
            println!("Canon:    {}", summary.canon_count.to_string().yellow());
            println!("Depth:    {}", summary.max_level);
            println!("Votes:    {}", summary.total_votes);
            if summary.has_dangling_references() {
                println!(
                    "{} {} node(s) name a parent missing from the snapshot",
                    "!".red().bold(),
                    summary.dangling_parents
                );
            }
            Ok(())
        }
    }
}

fn cmd_demo(config: LoomConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let loom = Loom::with_config(config)?;
    let story = loom.create_story(
        StoryDraft::new("The Lighthouse Keeper", "alice")
            .with_owner_name("Alice")
            .with_genre("mystery")
            .with_starter_prompt("The lamp went dark at midnight, and the keeper was gone."),
    )?;
    let root = loom
        .graph(&story.id)?
        .primary_root()
        .map(|n| n.id.clone())
        .context("demo story has no root")?;

    let contribute = |parent: &NodeId, who: &str, text: &str| {
        loom.contribute(NodeDraft::new(story.id.clone(), Some(parent.clone()), text, who, who))
    };
    let storm = contribute(&root, "bob", "A storm rolled in from the north.")?;
    let ship = contribute(&root, "carol", "A ship ran aground on the rocks below.")?;
    contribute(&storm.id, "dave", "Lightning lit a figure on the gallery.")?;
    contribute(&ship.id, "erin", "Its crew swore they had followed a light.")?;

    loom.vote(&ship.id, &UserId::new("frank"))?;
    loom.vote(&ship.id, &UserId::new("grace"))?;
    loom.mark_canon(&storm.id)?;

    let layout = loom.layout(&story.id)?;
    let text = loom.canonical_text(&story.id)?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "story": story,
            "layout": layout,
            "canonicalText": text,
        })),
        OutputFormat::Text => {
            println!("{} {}\n", "✓".green().bold(), story.title.bold());
            print_layout(&layout);
            println!("\n{}\n{}", "Canonical text".bold(), text);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const SNAPSHOT: &str = r#"[
        {"id": "root", "storyId": "s", "parentId": null, "content": "Start.", "authorId": "a", "isCanon": true, "order": 0},
        {"id": "a", "storyId": "s", "parentId": "root", "content": "Left.", "authorId": "b", "order": 1},
        {"id": "b", "storyId": "s", "parentId": "root", "content": "Right.", "authorId": "c", "voters": ["x"], "order": 2},
        {"id": "a1", "storyId": "s", "parentId": "a", "content": "Deeper.", "authorId": "d", "order": 3}
    ]"#;

    fn snapshot_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SNAPSHOT}").unwrap();
        file
    }

    fn read_args(file: PathBuf) -> ReadArgs {
        ReadArgs {
            file,
            canon: false,
            choices: Vec::new(),
            back: 0,
        }
    }

    #[test]
    fn loads_node_array() {
        let file = snapshot_file();
        let graph = load_graph(file.path()).unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.summary().max_level, 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_graph(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn read_applies_choices_then_back() {
        let file = snapshot_file();
        let graph = load_graph(file.path()).unwrap();
        let mut args = read_args(file.path().to_path_buf());
        args.choices = vec!["a".into(), "a1".into()];
        args.back = 1;

        let state = read_state(&graph, &args).unwrap();
        assert_eq!(state.current(), Some(&NodeId::new("a")));
    }

    #[test]
    fn read_canon_follows_votes() {
        let file = snapshot_file();
        let graph = load_graph(file.path()).unwrap();
        let mut args = read_args(file.path().to_path_buf());
        args.canon = true;

        let state = read_state(&graph, &args).unwrap();
        assert_eq!(state.current(), Some(&NodeId::new("b")));
    }

    #[test]
    fn read_rejects_non_child() {
        let file = snapshot_file();
        let graph = load_graph(file.path()).unwrap();
        let mut args = read_args(file.path().to_path_buf());
        args.choices = vec!["a1".into()];
        assert!(read_state(&graph, &args).is_err());
    }

    #[test]
    fn read_back_past_root_fails() {
        let file = snapshot_file();
        let graph = load_graph(file.path()).unwrap();
        let mut args = read_args(file.path().to_path_buf());
        args.back = 1;
        assert!(read_state(&graph, &args).is_err());
    }

    #[test]
    fn demo_runs() {
        cmd_demo(LoomConfig::default(), &OutputFormat::Json).unwrap();
    }
}
