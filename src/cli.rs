use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use mkpp3::config::AppConfig;
use mkpp3::model::Reference;
use mkpp3::render::{collect_tags, fa_tags, weasyl_tags};
use mkpp3::pipeline::{
    ProfileRequest, Profiler, ScriptEntry, parse_character, read_profile_script,
};
use mkpp3::source::{ChangeEvent, DataSource, FileSystemDataSource, RecordKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "mkpp3",
    version,
    about = "Generate RawTherapee sidecar profiles crediting cosplayers and fursuiters"
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for values in the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Path to the config file. Defaults to `{config_dir}/mkpp3/config.json`.
    #[arg(long, global = true, env = "MKPP3_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the character/performer/maker/species/event records
    #[arg(long, global = true, env = "MKPP3_DATA_PATH")]
    pub data_path: Option<PathBuf>,

    /// Root sidecar profiles are written under
    #[arg(long, global = true, env = "MKPP3_PROFILE_PATH")]
    pub profile_path: Option<PathBuf>,

    /// Photographer credited as Artist/Author
    #[arg(long, global = true)]
    pub artist: Option<String>,

    /// Copyright notice
    #[arg(long, global = true)]
    pub copyright: Option<String>,

    /// Fail instead of backing up and replacing existing profiles
    #[arg(long, global = true)]
    pub no_overwrite: bool,
}

/// What goes into one profile.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Character keys. `name/performer` replaces the performer.
    #[arg(required = true)]
    pub characters: Vec<String>,

    /// Event the photo was taken at
    #[arg(short, long)]
    pub event: Option<String>,

    /// Filename to use instead of the character keys
    #[arg(short, long)]
    pub label: Option<String>,

    /// Headline to use instead of the character names
    #[arg(short, long)]
    pub title: Option<String>,

    /// Extra keyword, placed before the derived ones (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl ProfileArgs {
    fn into_request(self) -> ProfileRequest {
        ProfileRequest {
            characters: self.characters.iter().map(|c| parse_character(c)).collect(),
            event: self.event.map(Reference::Key),
            label: self.label,
            title: self.title,
            tags: self.tags,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write one profile and print its path
    Write(ProfileArgs),
    /// Print a profile without writing it
    Preview(ProfileArgs),
    /// Write every profile listed in a profile script
    Script {
        /// One profile per line: `label:character,character/performer`
        file: PathBuf,

        /// Event all profiles in the script belong to
        #[arg(short, long)]
        event: Option<String>,
    },
    /// Print a profile's keywords as FurAffinity tags, then as Weasyl tags
    Tags(ProfileArgs),
    /// Print a resolved character as JSON
    Show {
        /// Character key, or `name/performer`
        character: String,
    },
    /// List stored records of a kind
    List {
        /// character, performer, maker, species or event
        kind: RecordKind,
    },
    /// Print record changes until interrupted
    Watch,
}

impl SettingsArgs {
    /// The config file with command-line overrides applied. The file is
    /// optional when both paths are given on the command line.
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = match (&self.config, &self.data_path, &self.profile_path) {
            (Some(path), _, _) => AppConfig::load(path)?,
            (None, Some(data), Some(profiles)) => AppConfig::new(data, profiles),
            (None, _, _) => AppConfig::load_default()
                .context("No config file; pass --data-path and --profile-path or --config")?,
        };

        if let Some(data_path) = &self.data_path {
            config.data_path.clone_from(data_path);
        }
        if let Some(profile_path) = &self.profile_path {
            config.profile_path.clone_from(profile_path);
        }
        if self.artist.is_some() {
            config.artist.clone_from(&self.artist);
        }
        if self.copyright.is_some() {
            config.copyright.clone_from(&self.copyright);
        }
        if self.no_overwrite {
            config.overwrite = Some(false);
        }
        Ok(config)
    }
}

fn profiler(config: &AppConfig) -> Profiler {
    let source: Arc<dyn DataSource> = Arc::new(FileSystemDataSource::new(&config.data_path));
    Profiler::new(source, &config.profile_path)
        .with_overwrite(config.overwrite())
        .with_artist(config.artist.clone())
        .with_copyright(config.copyright.clone())
}

pub async fn run_command(settings: &SettingsArgs, command: Commands) -> Result<()> {
    let config = settings.load_config()?;
    let profiler = profiler(&config);

    match command {
        Commands::Write(args) => handle_write(&profiler, args).await,
        Commands::Preview(args) => handle_preview(&profiler, args).await,
        Commands::Tags(args) => handle_tags(&profiler, args).await,
        Commands::Script { file, event } => handle_script(&profiler, &file, event).await,
        Commands::Show { character } => handle_show(&profiler, &character).await,
        Commands::List { kind } => handle_list(&profiler, kind).await,
        Commands::Watch => handle_watch(&profiler).await,
    }
}

async fn handle_write(profiler: &Profiler, args: ProfileArgs) -> Result<()> {
    let path = profiler.write(&args.into_request()).await?;
    println!("{}", path.display());
    Ok(())
}

async fn handle_preview(profiler: &Profiler, args: ProfileArgs) -> Result<()> {
    let profile = profiler.render(&args.into_request()).await?;
    println!("# {}.pp3", profile.filename);
    println!("{}", profile.text);
    Ok(())
}

async fn handle_tags(profiler: &Profiler, args: ProfileArgs) -> Result<()> {
    let options = profiler.options(&args.into_request()).await?;
    let keywords = collect_tags(&options);
    println!("{}", fa_tags(&keywords));
    println!("{}", weasyl_tags(&keywords));
    Ok(())
}

async fn handle_script(profiler: &Profiler, file: &Path, event: Option<String>) -> Result<()> {
    let script = read_profile_script(file).await?;
    let base = ProfileRequest {
        event: event.map(Reference::Key),
        ..ProfileRequest::default()
    };

    let report = profiler.write_script(&script, &base).await;

    for (entry, result) in script.iter().zip(&report.results) {
        match result {
            Ok(path) => println!("{}", path.display()),
            Err(e) => println!("FAILED {}: {e}", describe(entry)),
        }
    }
    println!("{}", report.summary());

    if !report.is_success() {
        anyhow::bail!("{} of {} profiles failed", report.failed(), report.results.len());
    }
    Ok(())
}

fn describe(entry: &ScriptEntry) -> String {
    let names: Vec<String> = entry
        .characters
        .iter()
        .map(|c| match c {
            Reference::Key(key) => key.clone(),
            Reference::Inline(over) => over.lookup_key().unwrap_or("?").to_owned(),
        })
        .collect();
    if entry.label.is_empty() {
        names.join(",")
    } else {
        format!("{}:{}", entry.label, names.join(","))
    }
}

async fn handle_show(profiler: &Profiler, character: &str) -> Result<()> {
    let resolved = profiler
        .resolver()
        .resolve_character(&parse_character(character))
        .await?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

async fn handle_list(profiler: &Profiler, kind: RecordKind) -> Result<()> {
    for name in profiler.source().list_all(kind).await? {
        println!("{name}");
    }
    Ok(())
}

async fn handle_watch(profiler: &Profiler) -> Result<()> {
    let watcher = profiler.source().watch_changes(Box::new(|event: ChangeEvent| {
        println!("{} {}", event.kind, event.path.display());
    }))?;
    if !watcher.is_active() {
        anyhow::bail!("This data source does not report changes");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for interrupt")?;
    drop(watcher);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_write_args_parse_overrides() {
        let cli = Cli::parse_from([
            "mkpp3", "write", "fizz", "buzz/sam", "--event", "ExpoCon", "--tag", "a", "--tag",
            "b", "--no-overwrite",
        ]);
        assert!(cli.settings.no_overwrite);
        let Commands::Write(args) = cli.command else {
            panic!("expected write");
        };
        let request = args.into_request();
        assert_eq!(request.characters.len(), 2);
        assert_eq!(request.event_name(), Some("ExpoCon"));
        assert_eq!(request.tags, ["a", "b"]);
    }

    #[test]
    fn test_tags_takes_profile_args() {
        let cli = Cli::parse_from(["mkpp3", "tags", "fizz", "--event", "ExpoCon"]);
        let Commands::Tags(args) = cli.command else {
            panic!("expected tags");
        };
        assert_eq!(args.characters, ["fizz"]);
        assert!(Cli::try_parse_from(["mkpp3", "tags"]).is_err());
    }

    #[test]
    fn test_list_kind_is_validated() {
        assert!(Cli::try_parse_from(["mkpp3", "list", "maker"]).is_ok());
        assert!(Cli::try_parse_from(["mkpp3", "list", "fursuit"]).is_err());
    }

    #[test]
    fn test_command_line_paths_skip_config_file() {
        let settings = SettingsArgs {
            data_path: Some(PathBuf::from("/data")),
            profile_path: Some(PathBuf::from("/profiles")),
            artist: Some("Jo".to_owned()),
            no_overwrite: true,
            ..SettingsArgs::default()
        };
        let config = settings.load_config().unwrap();
        assert_eq!(config.data_path, PathBuf::from("/data"));
        assert_eq!(config.artist.as_deref(), Some("Jo"));
        assert!(!config.overwrite());
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        AppConfig::new("/data", "/profiles").save(&path).unwrap();
        let settings = SettingsArgs {
            config: Some(path),
            profile_path: Some(PathBuf::from("/elsewhere")),
            ..SettingsArgs::default()
        };

        let config = settings.load_config().unwrap();

        assert_eq!(config.data_path, PathBuf::from("/data"));
        assert_eq!(config.profile_path, PathBuf::from("/elsewhere"));
        assert!(config.overwrite());
    }
}
