use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use flexi_logger::Logger;
use log::{debug, info};
use tabled::{builder::Builder, settings::Style};

use listsift::context::AppContext;
use listsift::record::load_records;
use listsift::{
    DynRecord, ListSiftError, ListView, ListViewAction, ListViewConfig, Page, Record,
    SearchField, SortRule,
};

#[derive(Parser)]
#[command(
    name = "listsift",
    version,
    about = "listsift: sort, filter and page through JSON record files"
)]
pub struct Cli {
    /// Config file to use instead of the one in the data directory
    #[arg(long = "config", short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Preferences file to use instead of the one in the data directory
    #[arg(long = "prefs", global = true)]
    pub prefs: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print one page of a JSON array of records
    Page(PageArgs),
}

#[derive(Args)]
pub struct PageArgs {
    /// JSON file holding an array of objects, each with an `id`
    #[arg(long = "file", short = 'f')]
    pub file: PathBuf,

    /// Free-text search
    #[arg(long = "search", short = 's')]
    pub search: Option<String>,

    /// Field to sort by (defaults to the configured initial sort)
    #[arg(long = "sort")]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long = "desc", default_value_t = false)]
    pub desc: bool,

    /// Zero-based page index
    #[arg(long = "page", short = 'p', default_value_t = 0)]
    pub page: usize,

    /// Rows per page (defaults to the remembered or configured page size)
    #[arg(long = "page-size", short = 'n')]
    pub page_size: Option<usize>,

    /// Field searched by substring (repeatable)
    #[arg(long = "field")]
    pub field: Vec<String>,

    /// Field searched by exact match (repeatable)
    #[arg(long = "exact")]
    pub exact: Vec<String>,

    /// View id used to look up hidden columns
    #[arg(long = "view", default_value = "default")]
    pub view: String,

    /// Remember the page size for later runs
    #[arg(long = "save-page-size", default_value_t = false, requires = "page_size")]
    pub save_page_size: bool,
}

impl Cli {
    pub fn handle_command_line() -> Result<(), ListSiftError> {
        let args = Cli::parse();
        let data_dir = AppContext::data_dir();
        let mut ctx = Self::build_context(&args, data_dir.as_deref())?;

        let _logger = Logger::try_with_env_or_str(ctx.config().logging.log_spec())
            .and_then(|logger| logger.start())
            .map_err(|e| ListSiftError::Error(format!("Failed to start logger: {}", e)))?;
        debug!(
            "Command-line args: {:?}",
            std::env::args_os().collect::<Vec<_>>()
        );
        info!(
            "Preferences at {}",
            ctx.preferences().path().display()
        );

        match args.command {
            Command::Page(page_args) => Self::print_page(&mut ctx, page_args),
        }
    }

    /// Explicit `--config` and `--prefs` files win; whichever is not named
    /// comes from `data_dir`.
    fn build_context(args: &Cli, data_dir: Option<&Path>) -> Result<AppContext, ListSiftError> {
        AppContext::load(data_dir, args.config.as_deref(), args.prefs.as_deref())
    }

    fn list_view_config(ctx: &AppContext, args: &PageArgs) -> ListViewConfig {
        let mut config = ctx.list_view_config();

        if let Some(page_size) = args.page_size {
            config.page_size = page_size;
        }

        match &args.sort {
            Some(key) => config.initial_sort_by = SortRule::new(key.as_str(), args.desc),
            None if args.desc => config.initial_sort_by.is_desc = true,
            None => {}
        }

        for key in &args.field {
            config.search_fields.insert(SearchField::substring(key.as_str()));
        }
        for key in &args.exact {
            config.search_fields.insert(SearchField::exact(key.as_str()));
        }

        config
    }

    fn print_page(ctx: &mut AppContext, args: PageArgs) -> Result<(), ListSiftError> {
        let config = Self::list_view_config(ctx, &args);
        let records = load_records(BufReader::new(File::open(&args.file)?))?;
        info!(
            "Loaded {} records from {}",
            records.len(),
            args.file.display()
        );

        let mut view = ListView::new(&config)?;
        if let Some(search) = &args.search {
            view.dispatch(ListViewAction::FilterChange(search.clone()));
        }
        if args.page > 0 {
            view.dispatch(ListViewAction::PageChange(args.page));
        }

        let page = view.page(&records);
        println!(
            "{}",
            render_page(&page, ctx.preferences().hidden_columns(&args.view))
        );

        if args.save_page_size {
            ctx.preferences_mut().set_rows_per_page(config.page_size)?;
            ctx.preferences().save()?;
        }

        Ok(())
    }
}

/// Column keys present on the page, `id` first and the rest in key order.
fn page_columns(page: &Page<&DynRecord>, hidden: &[String]) -> Vec<String> {
    let mut columns = vec![DynRecord::ID_FIELD.to_owned()];
    for record in &page.rows {
        for key in record.fields().keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns.retain(|c| c == DynRecord::ID_FIELD || !hidden.contains(c));
    columns
}

fn render_page(page: &Page<&DynRecord>, hidden: &[String]) -> String {
    let pages = page.page_count().max(1);
    if page.page >= pages {
        return format!(
            "No records on page {}\nLast page is {} ({} total)",
            page.page + 1,
            pages,
            page.total
        );
    }

    let footer = format!("Page {} of {} ({} total)", page.page + 1, pages, page.total);

    if page.rows.is_empty() {
        return format!("No records\n{footer}");
    }

    let columns = page_columns(page, hidden);
    let mut builder = Builder::default();
    builder.push_record(columns.iter().cloned());
    for record in &page.rows {
        builder.push_record(
            columns
                .iter()
                .map(|key| record.field(key).map(|v| v.to_string()).unwrap_or_default()),
        );
    }

    let mut table = builder.build();
    table.with(Style::modern());

    format!("{table}\n{footer}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use listsift::preferences::{Preferences, PreferencesStore};
    use listsift::{Config, PaginationState};
    use serial_test::serial;
    use std::fs;

    fn assets() -> Vec<DynRecord> {
        vec![
            DynRecord::new("a1").with("assetNumber", "10").with("notes", "ok"),
            DynRecord::new("a2").with("assetNumber", "2"),
        ]
    }

    #[test]
    fn test_cli_parsing_page_command() {
        let cli = Cli::try_parse_from([
            "listsift", "page", "--file", "assets.json", "--sort", "assetNumber", "--desc",
            "--field", "name", "--exact", "code", "-n", "25",
        ])
        .unwrap();

        let Command::Page(args) = cli.command;
        assert_eq!(args.file, PathBuf::from("assets.json"));
        assert_eq!(args.sort.as_deref(), Some("assetNumber"));
        assert!(args.desc);
        assert_eq!(args.page_size, Some(25));
        assert_eq!(args.field, vec!["name"]);
        assert_eq!(args.exact, vec!["code"]);
    }

    #[test]
    fn test_cli_parsing_invalid_arguments() {
        assert!(Cli::try_parse_from(["listsift"]).is_err(), "Command is required");
        assert!(Cli::try_parse_from(["listsift", "page"]).is_err(), "File is required");
        assert!(
            Cli::try_parse_from(["listsift", "page", "-f", "x.json", "--save-page-size"]).is_err(),
            "Saving needs a page size"
        );
    }

    #[test]
    fn test_list_view_config_overrides() {
        let ctx = AppContext::new(
            Config::default(),
            PreferencesStore::in_memory(Preferences::default()),
        );
        let cli = Cli::try_parse_from([
            "listsift", "page", "-f", "x.json", "--desc", "--field", "name",
        ])
        .unwrap();
        let Command::Page(args) = cli.command;

        let config = Cli::list_view_config(&ctx, &args);
        assert_eq!(config.initial_sort_by, SortRule::desc("id"));
        assert_eq!(config.page_size, 100);
        assert_eq!(config.search_fields.len(), 1);
    }

    #[test]
    fn test_render_page() {
        let records = assets();
        let refs: Vec<&DynRecord> = records.iter().collect();
        let page = Page::from_rows(refs, &PaginationState::default(), 2);

        let out = render_page(&page, &[]);
        assert!(out.contains("assetNumber"));
        assert!(out.contains("notes"));
        assert!(out.ends_with("Page 1 of 1 (2 total)"));

        let out = render_page(&page, &["notes".to_string(), "id".to_string()]);
        assert!(!out.contains("notes"));
        assert!(out.contains("id"));
    }

    #[test]
    #[serial]
    fn test_save_page_size_with_explicit_config() {
        let data = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let config_path = work.path().join("cfg.toml");
        fs::write(&config_path, "[list_view]\npage_size = 50\n").unwrap();
        let records_path = work.path().join("assets.json");
        fs::write(&records_path, r#"[{"id": "a1"}, {"id": "a2"}]"#).unwrap();

        let cli = Cli::try_parse_from([
            "listsift",
            "-c",
            config_path.to_str().unwrap(),
            "page",
            "-f",
            records_path.to_str().unwrap(),
            "-n",
            "20",
            "--save-page-size",
        ])
        .unwrap();
        let mut ctx = Cli::build_context(&cli, Some(data.path())).unwrap();
        let Command::Page(args) = cli.command;
        Cli::print_page(&mut ctx, args).unwrap();

        let reloaded = PreferencesStore::load(data.path().join(PreferencesStore::FILE_NAME)).unwrap();
        assert_eq!(reloaded.rows_per_page(), Some(20));
    }

    #[test]
    fn test_render_page_past_the_end() {
        let records = assets();
        let refs: Vec<&DynRecord> = Vec::new();
        let state = PaginationState::new(4, 100).unwrap();
        let page = Page::from_rows(refs, &state, records.len());
        assert_eq!(
            render_page(&page, &[]),
            "No records on page 5\nLast page is 1 (2 total)"
        );
    }

    #[test]
    fn test_render_empty_page() {
        let page: Page<&DynRecord> = Page::from_rows(Vec::new(), &PaginationState::default(), 0);
        assert_eq!(render_page(&page, &[]), "No records\nPage 1 of 1 (0 total)");
    }
}
