use anyhow::{Context, Result, bail};
use study_buddy_config::Config;
use study_buddy_engine::{
    Action, AppState, Feature, HttpGenerator, LatexTypesetter, MemoryStore, Shell,
    math::{render_segments, segments, to_html},
};
use std::{env, path::Path, path::PathBuf, process};

const USAGE: &str = "\
Usage: study-buddy [--config PATH] <command>

Commands:
  render <file>                 Print the file as HTML with math typeset
  segments <file>               List the text and math segments of the file
  ask <feature> [file | text]   Run a study feature (see below)
  task add <title> [category] [--due DATE]
                                Add a task
  task list                     List tasks
  task done <id>                Toggle a task's completion
  task category <id> [category] Set a task's category, or suggest one
  task rm <id>                  Delete a task
  resource add <title> <url>    Save a study link
  resource list                 List saved links
  resource rm <id>              Delete a saved link
  config init                   Write a default config file

Features: summarize, elaborate, simplify, rephrase, generate-quiz,
generate-plan, explain, suggest-category, progress-insight";

type AppShell = Shell<HttpGenerator, MemoryStore>;

struct App {
    config: Config,
    shell: AppShell,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        let store = MemoryStore::load_from_path(&config.data_path).with_context(|| {
            format!("Failed to load study data from {}", config.data_path.display())
        })?;
        let generation = &config.generation;
        let api_key = generation.api_key();
        if api_key.is_none() {
            log::debug!("No API key in ${}", generation.api_key_env);
        }
        let generator = HttpGenerator::new(&generation.endpoint, &generation.model, api_key);
        Ok(Self {
            shell: Shell::new(generator, store),
            config,
        })
    }

    fn state(&self) -> &AppState {
        self.shell.state()
    }

    async fn dispatch(&mut self, action: Action) {
        self.shell.dispatch(action).await;
        if let Some(notice) = &self.state().notice {
            eprintln!("{notice}");
        }
    }

    fn save(&self) -> Result<()> {
        self.shell
            .store()
            .save_to_path(&self.config.data_path)
            .with_context(|| {
                format!("Failed to save study data to {}", self.config.data_path.display())
            })
    }

    async fn ask(&mut self, feature: Feature, input: &[String]) -> Result<()> {
        let input = match input {
            [] => None,
            [path] if Path::new(path).is_file() => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {path}"))?,
            ),
            words => Some(words.join(" ")),
        };

        match (feature, input) {
            (Feature::ProgressInsight, input) => {
                self.dispatch(Action::Generate { feature, input }).await;
            }
            (_, Some(text)) => {
                self.dispatch(Action::SetNote(text)).await;
                self.dispatch(Action::Generate {
                    feature,
                    input: None,
                })
                .await;
            }
            (_, None) => bail!("{feature} needs a file or some text"),
        }

        if let Some(output) = self.state().output(feature) {
            println!("{output}");
        }
        if feature == Feature::GenerateQuiz {
            for (i, card) in self.state().flashcards.iter().enumerate() {
                println!("\n{}. {}\n   → {}", i + 1, card.question, card.answer);
            }
        }
        Ok(())
    }

    async fn task(&mut self, args: &[String]) -> Result<()> {
        match args {
            [cmd] if cmd == "list" => {
                for task in &self.state().tasks {
                    let mark = if task.completed { "x" } else { " " };
                    let category = task
                        .category
                        .as_deref()
                        .map(|c| format!(" ({c})"))
                        .unwrap_or_default();
                    let due = task
                        .due
                        .as_deref()
                        .map(|d| format!(" due {d}"))
                        .unwrap_or_default();
                    println!(
                        "[{mark}] {}  {}{category}{due}",
                        short_id(&task.id),
                        task.title
                    );
                }
            }
            [cmd, rest @ ..] if cmd == "add" => {
                let NewTask {
                    title,
                    category,
                    due,
                } = parse_new_task(rest)?;
                self.dispatch(Action::AddTask {
                    title,
                    category,
                    due,
                })
                .await;
                self.save()?;
            }
            [cmd, prefix, category @ ..] if cmd == "category" && category.len() <= 1 => {
                let id = resolve_id(self.state().tasks.iter().map(|t| t.id.as_str()), prefix)?;
                match category.first() {
                    Some(category) => {
                        self.dispatch(Action::SetTaskCategory {
                            id: id.clone(),
                            category: Some(category.clone()),
                        })
                        .await;
                    }
                    None => self.dispatch(Action::SuggestTaskCategory(id.clone())).await,
                }
                self.save()?;
                if let Some(task) = self.state().tasks.iter().find(|t| t.id == id) {
                    println!("{}: {}", task.title, task.category.as_deref().unwrap_or("-"));
                }
            }
            [cmd, prefix] if cmd == "done" => {
                let id = resolve_id(self.state().tasks.iter().map(|t| t.id.as_str()), prefix)?;
                self.dispatch(Action::ToggleTask(id)).await;
                self.save()?;
            }
            [cmd, prefix] if cmd == "rm" => {
                let id = resolve_id(self.state().tasks.iter().map(|t| t.id.as_str()), prefix)?;
                self.dispatch(Action::DeleteTask(id)).await;
                self.save()?;
            }
            _ => bail!("Unknown task command\n\n{USAGE}"),
        }
        Ok(())
    }

    async fn resource(&mut self, args: &[String]) -> Result<()> {
        match args {
            [cmd] if cmd == "list" => {
                for resource in &self.state().resources {
                    println!("{}  {} <{}>", short_id(&resource.id), resource.title, resource.url);
                }
            }
            [cmd, title, url] if cmd == "add" => {
                self.dispatch(Action::AddResource {
                    title: title.clone(),
                    url: url.clone(),
                })
                .await;
                self.save()?;
            }
            [cmd, prefix] if cmd == "rm" => {
                let id = resolve_id(
                    self.state().resources.iter().map(|r| r.id.as_str()),
                    prefix,
                )?;
                self.dispatch(Action::DeleteResource(id)).await;
                self.save()?;
            }
            _ => bail!("Unknown resource command\n\n{USAGE}"),
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
struct NewTask {
    title: String,
    category: Option<String>,
    due: Option<String>,
}

/// Parses `<title> [category] [--due DATE]`.
fn parse_new_task(args: &[String]) -> Result<NewTask> {
    let mut positional = Vec::new();
    let mut due = None;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        if arg == "--due" {
            let Some(date) = args.next() else {
                bail!("--due needs a date");
            };
            due = Some(date.clone());
        } else {
            positional.push(arg.clone());
        }
    }

    let mut positional = positional.into_iter();
    let (Some(title), category, None) = (positional.next(), positional.next(), positional.next())
    else {
        bail!("Usage: task add <title> [category] [--due DATE]");
    };
    Ok(NewTask {
        title,
        category,
        due,
    })
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Finds the single id starting with `prefix`.
fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> Result<String> {
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(prefix)).collect();
    match matches[..] {
        [id] => Ok(id.to_string()),
        [] => bail!("No entry with id {prefix}"),
        _ => bail!("Id prefix {prefix} is ambiguous"),
    }
}

fn read_input(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config_path = explicit.map_or_else(Config::config_path, Path::to_path_buf);
    log::debug!("Config path: {}", config_path.display());

    match Config::load_from_path(&config_path)? {
        Some(config) => Ok(config),
        None if explicit.is_some() => bail!("Config file {} not found", config_path.display()),
        None => Ok(Config::default()),
    }
}

/// Writes the default config to `config_path`, refusing to overwrite.
fn init_config(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        bail!("Config file {} already exists", config_path.display());
    }
    Config::default().save_to_path(config_path)?;
    println!("Wrote {}", config_path.display());
    Ok(())
}

async fn run(mut args: Vec<String>) -> Result<()> {
    let mut config_path: Option<PathBuf> = None;
    if args.first().is_some_and(|a| a == "--config") {
        if args.len() < 2 {
            bail!("--config needs a path\n\n{USAGE}");
        }
        config_path = Some(PathBuf::from(args.remove(1)));
        args.remove(0);
    }

    match args.as_slice() {
        [cmd, file] if cmd == "render" => {
            let text = read_input(file)?;
            let rendered = render_segments(&text, Some(&LatexTypesetter));
            println!("{}", to_html(&rendered));
        }
        [cmd, file] if cmd == "segments" => {
            let text = read_input(file)?;
            for seg in segments(&text) {
                println!("{:>6}  {:?}  {:?}", seg.source_offset, seg.kind, seg.content);
            }
        }
        [cmd, feature, input @ ..] if cmd == "ask" => {
            let feature: Feature = feature.parse()?;
            let mut app = App::new(load_config(config_path.as_deref())?)?;
            app.ask(feature, input).await?;
        }
        [cmd, rest @ ..] if cmd == "task" => {
            let mut app = App::new(load_config(config_path.as_deref())?)?;
            app.task(rest).await?;
        }
        [cmd, rest @ ..] if cmd == "resource" => {
            let mut app = App::new(load_config(config_path.as_deref())?)?;
            app.resource(rest).await?;
        }
        [cmd, sub] if cmd == "config" && sub == "init" => {
            init_config(&config_path.unwrap_or_else(Config::config_path))?;
        }
        _ => bail!("{USAGE}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
