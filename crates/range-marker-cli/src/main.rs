mod picker;

use anyhow::{Context, Result, anyhow};
use picker::TerminalPicker;
use range_marker_config::Config;
use range_marker_engine::{
    Action, AnnotationOptions, Annotator, AtomicSet, HostPoint, HostRange, LabelSpec,
    LabelVocabulary, NodePath, Outcome, StatusClass, model::outline,
};
use std::{env, fs, ops::Range, path::PathBuf, process};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Apply(StatusClass),
    Remove(StatusClass),
    Query,
    Pick,
    Strip(StatusClass),
    Outline,
}

/// A selection given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SelectionArg {
    /// `<start-path> <start-offset> <end-path> <end-offset>`
    Host(HostRange),
    /// `<start>..<end>` over the fragment's text
    Chars(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    command: Command,
    file: PathBuf,
    selection: Option<SelectionArg>,
    write: bool,
    config: Option<PathBuf>,
}

fn usage(program: &str) -> String {
    [
        format!("Usage: {program} [--config <path>] [--write] <command> <file> [args]"),
        String::new(),
        "Commands:".to_string(),
        "  apply <label> <selection>   add a label over the selection".to_string(),
        "  remove <label> <selection>  remove a label over the selection".to_string(),
        "  query <selection>           list labels and whether they cover the selection"
            .to_string(),
        "  pick <selection>            choose a label to toggle interactively".to_string(),
        "  strip <label>               remove a label from the whole fragment".to_string(),
        "  outline                     print the parsed tree".to_string(),
        String::new(),
        "A selection is either <start>..<end> (character offsets into the text)".to_string(),
        "or <start-path> <start-offset> <end-path> <end-offset>, e.g. 0/1 3 0/2 0".to_string(),
    ]
    .join("\n")
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut write = false;
    let mut config = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--write" | "-w" => write = true,
            "--config" | "-c" => {
                let path = iter.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            _ => positional.push(arg.as_str()),
        }
    }

    let [command, file, rest @ ..] = positional.as_slice() else {
        return Err("expected a command and a file".to_string());
    };
    let file = PathBuf::from(file);

    let (command, selection) = match (*command, rest) {
        ("apply", [label, selection @ ..]) => (
            Command::Apply(StatusClass::new(*label)),
            Some(parse_selection(selection)?),
        ),
        ("remove", [label, selection @ ..]) => (
            Command::Remove(StatusClass::new(*label)),
            Some(parse_selection(selection)?),
        ),
        ("query", selection) => (Command::Query, Some(parse_selection(selection)?)),
        ("pick", selection) => (Command::Pick, Some(parse_selection(selection)?)),
        ("strip", [label]) => (Command::Strip(StatusClass::new(*label)), None),
        ("outline", []) => (Command::Outline, None),
        (command, _) => return Err(format!("unknown command or wrong arguments: {command}")),
    };

    Ok(CliArgs {
        command,
        file,
        selection,
        write,
        config,
    })
}

fn parse_selection(args: &[&str]) -> Result<SelectionArg, String> {
    match args {
        [chars] => {
            let (start, end) = chars
                .split_once("..")
                .ok_or_else(|| format!("expected <start>..<end>, got {chars}"))?;
            Ok(SelectionArg::Chars(parse_offset(start)?..parse_offset(end)?))
        }
        [start_path, start_offset, end_path, end_offset] => Ok(SelectionArg::Host(HostRange::new(
            HostPoint::new(parse_path(start_path)?, parse_offset(start_offset)?),
            HostPoint::new(parse_path(end_path)?, parse_offset(end_offset)?),
        ))),
        _ => Err("expected a selection".to_string()),
    }
}

fn parse_path(s: &str) -> Result<NodePath, String> {
    s.parse().map_err(|e: range_marker_engine::model::NodePathError| e.to_string())
}

fn parse_offset(s: &str) -> Result<usize, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("invalid offset {s:?}"))
}

/// Build the engine from process-wide configuration.
fn annotator_from(config: &Config) -> Annotator {
    let options = AnnotationOptions::new(
        AtomicSet::new(config.atomic_tags.clone(), config.atomic_classes.clone()),
        config.wrapper_tag.clone(),
    );
    let labels = config
        .labels
        .iter()
        .fold(LabelVocabulary::new(config.class_prefix.clone()), |v, l| {
            v.with_label(LabelSpec::new(l.class.clone(), l.title.clone()))
        });
    Annotator::new(options, labels)
}

fn resolve_selection(
    annotator: &Annotator,
    markup: &str,
    selection: &SelectionArg,
) -> Result<HostRange> {
    match selection {
        SelectionArg::Host(range) => Ok(range.clone()),
        SelectionArg::Chars(chars) => {
            let tree = annotator.parse(markup)?;
            HostRange::from_char_range(&tree, chars.clone(), annotator.options()).ok_or_else(
                || anyhow!("character range {}..{} is outside the text", chars.start, chars.end),
            )
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("range-marker-cli");
    let cli = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", usage(program));
            process::exit(1);
        }
    };

    let config = Config::load_or_default(cli.config.as_deref()).with_context(|| {
        format!(
            "Failed to load config (default location {})",
            Config::config_path().display()
        )
    })?;
    let annotator = annotator_from(&config);

    let file = Config::expand_path(&cli.file).unwrap_or(cli.file.clone());
    let markup = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let range = cli
        .selection
        .as_ref()
        .map(|selection| resolve_selection(&annotator, &markup, selection))
        .transpose()?;

    let outcome = match (&cli.command, range) {
        (Command::Apply(label), Some(range)) => {
            annotator.run(&markup, &range, &Action::apply(label.clone()))?
        }
        (Command::Remove(label), Some(range)) => {
            annotator.run(&markup, &range, &Action::remove(label.clone()))?
        }
        (Command::Pick, Some(range)) => {
            let mut picker = TerminalPicker::new(annotator.labels().clone());
            annotator.run_with_chooser(&markup, &range, &mut picker)?
        }
        (Command::Query, Some(range)) => {
            print_candidates(&annotator, &markup, &range)?;
            return Ok(());
        }
        (Command::Strip(label), _) => annotator.strip(&markup, label)?,
        (Command::Outline, _) => {
            println!("{}", outline(&annotator.parse(&markup)?));
            return Ok(());
        }
        (command, None) => return Err(anyhow!("{command:?} needs a selection")),
    };

    match outcome {
        Outcome::Updated(updated) if cli.write => {
            fs::write(&file, updated)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            log::info!("Updated {}", file.display());
        }
        Outcome::Updated(updated) => println!("{updated}"),
        Outcome::Unchanged => {
            log::info!("No change to {}", file.display());
            if !cli.write {
                println!("{markup}");
            }
        }
    }

    Ok(())
}

fn print_candidates(annotator: &Annotator, markup: &str, range: &HostRange) -> Result<()> {
    let mut tree = annotator.parse(markup)?;
    let corridor = annotator
        .locate(&mut tree, range)
        .context("Selection does not map onto the fragment")?;
    for candidate in annotator.candidates(&tree, &corridor)? {
        let check = if candidate.already_applied { "x" } else { " " };
        println!("[{check}] {}  {}", candidate.label, candidate.title);
    }
    Ok(())
}
